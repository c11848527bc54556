//! The process-wide single-active-call slot.

use std::sync::{Arc, Mutex, Weak};

use tracing::debug;

use crate::error::CoordinatorError;

type ActiveSlot = Mutex<Option<String>>;

/// Owner of the active-call slot.
///
/// Constructed once per application (or per test) and kept alive for the
/// session lifetime. Widgets never touch the scope directly; they receive a
/// [`CallCoordinator`] handle from [`CallScope::coordinator`]. Dropping the
/// scope invalidates every outstanding handle, which then fails with
/// [`CoordinatorError::ContextMissing`] instead of silently reporting an
/// empty slot.
#[derive(Debug, Default)]
pub struct CallScope {
    active: Arc<ActiveSlot>,
}

impl CallScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out a coordinator handle bound to this scope.
    pub fn coordinator(&self) -> CallCoordinator {
        CallCoordinator {
            active: Arc::downgrade(&self.active),
        }
    }
}

/// A widget's handle to the active-call slot.
///
/// All mutation goes through [`start_call`](Self::start_call) /
/// [`end_call`](Self::end_call); observations are synchronous, so a caller
/// that just mutated the slot sees its own write. Locking is a brief
/// critical section around a plain `Option`, never held across an await
/// point.
#[derive(Debug, Clone)]
pub struct CallCoordinator {
    active: Weak<ActiveSlot>,
}

impl CallCoordinator {
    fn slot(&self) -> Result<Arc<ActiveSlot>, CoordinatorError> {
        self.active
            .upgrade()
            .ok_or(CoordinatorError::ContextMissing)
    }

    /// Claims the slot for `widget_id`.
    ///
    /// Returns `false` without mutating when a *different* widget already
    /// holds the slot; re-claiming by the current holder succeeds, so
    /// retries are idempotent. A refused claim is the caller's signal to
    /// render the disabled start affordance.
    pub fn start_call(&self, widget_id: &str) -> Result<bool, CoordinatorError> {
        let slot = self.slot()?;
        let mut active = slot.lock().unwrap_or_else(|e| e.into_inner());
        match active.as_deref() {
            Some(current) if current != widget_id => {
                debug!(widget_id, current, "call slot busy, claim refused");
                Ok(false)
            }
            _ => {
                *active = Some(widget_id.to_string());
                Ok(true)
            }
        }
    }

    /// Clears the slot. Idempotent: clearing an empty slot is a no-op.
    pub fn end_call(&self) -> Result<(), CoordinatorError> {
        let slot = self.slot()?;
        let mut active = slot.lock().unwrap_or_else(|e| e.into_inner());
        *active = None;
        Ok(())
    }

    /// True iff `widget_id` currently holds the slot.
    pub fn is_call_active(&self, widget_id: &str) -> Result<bool, CoordinatorError> {
        Ok(self.active_widget()?.as_deref() == Some(widget_id))
    }

    /// True iff any widget currently holds the slot.
    pub fn has_active_call(&self) -> Result<bool, CoordinatorError> {
        Ok(self.active_widget()?.is_some())
    }

    /// The id of the widget holding the slot, if any.
    pub fn active_widget(&self) -> Result<Option<String>, CoordinatorError> {
        let slot = self.slot()?;
        let active = slot.lock().unwrap_or_else(|e| e.into_inner());
        Ok(active.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_then_query() {
        let scope = CallScope::new();
        let coordinator = scope.coordinator();

        assert!(coordinator.start_call("sales").unwrap());
        assert!(coordinator.has_active_call().unwrap());
        assert!(coordinator.is_call_active("sales").unwrap());
        assert!(!coordinator.is_call_active("support").unwrap());
    }

    #[test]
    fn test_claim_refused_while_other_widget_active() {
        let scope = CallScope::new();
        let coordinator = scope.coordinator();

        assert!(coordinator.start_call("sales").unwrap());
        assert!(!coordinator.start_call("support").unwrap());
        assert_eq!(
            coordinator.active_widget().unwrap().as_deref(),
            Some("sales")
        );

        // The current holder may re-claim.
        assert!(coordinator.start_call("sales").unwrap());
    }

    #[test]
    fn test_end_call_is_idempotent() {
        let scope = CallScope::new();
        let coordinator = scope.coordinator();

        coordinator.start_call("sales").unwrap();
        coordinator.end_call().unwrap();
        let after_one = coordinator.active_widget().unwrap();
        coordinator.end_call().unwrap();
        let after_two = coordinator.active_widget().unwrap();

        assert_eq!(after_one, None);
        assert_eq!(after_one, after_two);
        assert!(!coordinator.has_active_call().unwrap());
    }

    #[test]
    fn test_active_iff_last_operation_was_start() {
        let scope = CallScope::new();
        let coordinator = scope.coordinator();

        // Interleaved sequence: active exactly when the most recent
        // operation was a successful start with no end after it.
        assert!(!coordinator.has_active_call().unwrap());
        coordinator.start_call("a").unwrap();
        assert!(coordinator.has_active_call().unwrap());
        coordinator.end_call().unwrap();
        assert!(!coordinator.has_active_call().unwrap());
        coordinator.start_call("b").unwrap();
        coordinator.start_call("b").unwrap();
        assert!(coordinator.has_active_call().unwrap());
        coordinator.end_call().unwrap();
        coordinator.end_call().unwrap();
        assert!(!coordinator.has_active_call().unwrap());
    }

    #[test]
    fn test_at_most_one_widget_active() {
        let scope = CallScope::new();
        let coordinator = scope.coordinator();
        let ids = ["sales", "support", "demo"];

        coordinator.start_call("support").unwrap();
        let active: Vec<&str> = ids
            .iter()
            .copied()
            .filter(|id| coordinator.is_call_active(id).unwrap())
            .collect();
        assert_eq!(active, vec!["support"]);
    }

    #[test]
    fn test_handle_outliving_scope_fails_loudly() {
        let scope = CallScope::new();
        let coordinator = scope.coordinator();
        coordinator.start_call("sales").unwrap();

        drop(scope);

        assert_eq!(
            coordinator.start_call("sales"),
            Err(CoordinatorError::ContextMissing)
        );
        assert_eq!(
            coordinator.has_active_call(),
            Err(CoordinatorError::ContextMissing)
        );
        assert_eq!(coordinator.end_call(), Err(CoordinatorError::ContextMissing));
    }

    #[test]
    fn test_clones_share_the_slot() {
        let scope = CallScope::new();
        let first = scope.coordinator();
        let second = first.clone();

        first.start_call("sales").unwrap();
        assert!(second.is_call_active("sales").unwrap());
        second.end_call().unwrap();
        assert!(!first.has_active_call().unwrap());
    }
}
