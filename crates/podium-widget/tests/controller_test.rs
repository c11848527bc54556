use std::sync::Arc;

use podium_types::{ConnectionPhase, Role, SdkEvent, SdkMessage, WidgetConfig};
use podium_voice::{NullTransport, TransportCommand};
use podium_widget::view::CALL_IN_PROGRESS_MESSAGE;
use podium_widget::{CallScope, CoordinatorError, WidgetController, WidgetError};

fn mount(widget_id: &str, scope: &CallScope) -> (WidgetController, Arc<NullTransport>) {
    let transport = Arc::new(NullTransport::new());
    let config = WidgetConfig::new(widget_id, "pk_test", format!("asst_{widget_id}"));
    let controller = WidgetController::new(config, scope.coordinator(), transport.clone())
        .expect("controller mounts");
    (controller, transport)
}

fn transcript_event(role: Role, text: &str) -> SdkEvent {
    SdkEvent::Message {
        message: SdkMessage::transcript(role, text),
    }
}

#[test]
fn test_start_claims_slot_before_sdk_confirms() {
    let scope = CallScope::new();
    let coordinator = scope.coordinator();
    let (mut sales, transport) = mount("sales", &scope);

    assert!(sales.start_call().unwrap());

    // Slot is held and the phase is Connecting while the SDK is still silent.
    assert_eq!(sales.phase(), ConnectionPhase::Connecting);
    assert!(coordinator.is_call_active("sales").unwrap());
    assert_eq!(
        transport.commands(),
        vec![TransportCommand::Start("asst_sales".to_string())]
    );

    sales.handle_event(SdkEvent::CallStart).unwrap();
    assert_eq!(sales.phase(), ConnectionPhase::Connected);
}

#[test]
fn test_start_is_idempotent_while_in_call() {
    let scope = CallScope::new();
    let (mut sales, transport) = mount("sales", &scope);

    assert!(sales.start_call().unwrap());
    assert!(sales.start_call().unwrap());

    // No second SDK start was issued.
    assert_eq!(transport.commands().len(), 1);
}

#[test]
fn test_second_widget_blocked_while_call_active() {
    let scope = CallScope::new();
    let coordinator = scope.coordinator();
    let (mut sales, _) = mount("sales", &scope);
    let (mut support, support_transport) = mount("support", &scope);

    assert!(sales.start_call().unwrap());
    assert!(!support.start_call().unwrap());

    // Soft guard: nothing started, nothing mutated, the view explains why.
    assert_eq!(support.phase(), ConnectionPhase::Idle);
    assert!(support_transport.commands().is_empty());
    assert_eq!(
        coordinator.active_widget().unwrap().as_deref(),
        Some("sales")
    );

    let view = support.view().unwrap();
    assert!(view.start_disabled);
    assert_eq!(
        view.start_disabled_reason.as_deref(),
        Some(CALL_IN_PROGRESS_MESSAGE)
    );

    let sales_view = sales.view().unwrap();
    assert!(!sales_view.start_disabled);
}

#[test]
fn test_transcript_appended_in_arrival_order() {
    let scope = CallScope::new();
    let (mut sales, _) = mount("sales", &scope);

    sales.start_call().unwrap();
    sales
        .replay([
            SdkEvent::CallStart,
            transcript_event(Role::User, "hi"),
            SdkEvent::Message {
                message: SdkMessage {
                    kind: "function-call".to_string(),
                    role: None,
                    transcript: None,
                },
            },
            transcript_event(Role::Assistant, "hello"),
        ])
        .unwrap();

    let turns: Vec<(Role, &str)> = sales
        .transcript()
        .iter()
        .map(|t| (t.role, t.text.as_str()))
        .collect();
    assert_eq!(
        turns,
        vec![(Role::User, "hi"), (Role::Assistant, "hello")]
    );
}

#[test]
fn test_cancel_then_late_call_start_stays_idle() {
    let scope = CallScope::new();
    let coordinator = scope.coordinator();
    let (mut sales, transport) = mount("sales", &scope);

    sales.start_call().unwrap();
    sales.cancel_call().unwrap();
    assert_eq!(sales.phase(), ConnectionPhase::Idle);
    assert!(!coordinator.has_active_call().unwrap());

    // The SDK confirmed anyway; the controller must resync, not reopen.
    sales.handle_event(SdkEvent::CallStart).unwrap();
    assert_eq!(sales.phase(), ConnectionPhase::Idle);
    assert_eq!(
        transport.commands(),
        vec![
            TransportCommand::Start("asst_sales".to_string()),
            TransportCommand::Stop,
            TransportCommand::Stop,
        ]
    );
}

#[test]
fn test_late_call_start_does_not_steal_another_widgets_slot() {
    let scope = CallScope::new();
    let coordinator = scope.coordinator();
    let (mut sales, _) = mount("sales", &scope);
    let (mut support, _) = mount("support", &scope);

    sales.start_call().unwrap();
    sales.cancel_call().unwrap();
    assert!(support.start_call().unwrap());

    // Sales' stale confirmation arrives after support claimed the slot.
    sales.handle_event(SdkEvent::CallStart).unwrap();
    assert_eq!(sales.phase(), ConnectionPhase::Idle);
    assert!(coordinator.is_call_active("support").unwrap());
}

#[test]
fn test_toggle_mute_without_session() {
    let scope = CallScope::new();
    let (mut sales, transport) = mount("sales", &scope);

    // No session exists; the flag still flips locally and the transport
    // command is harmless.
    assert!(sales.toggle_mute());
    assert!(sales.muted());
    assert!(!sales.toggle_mute());
    assert_eq!(
        transport.commands(),
        vec![
            TransportCommand::SetMuted(true),
            TransportCommand::SetMuted(false),
        ]
    );
}

#[test]
fn test_call_end_resets_speaking_and_mute() {
    let scope = CallScope::new();
    let coordinator = scope.coordinator();
    let (mut sales, _) = mount("sales", &scope);

    sales.start_call().unwrap();
    sales.handle_event(SdkEvent::CallStart).unwrap();
    sales.handle_event(SdkEvent::SpeechStart).unwrap();
    sales.toggle_mute();
    assert!(sales.speaking());
    assert!(sales.muted());

    sales.handle_event(SdkEvent::CallEnd).unwrap();
    assert_eq!(sales.phase(), ConnectionPhase::Idle);
    assert!(!sales.speaking());
    assert!(!sales.muted());
    assert!(!coordinator.has_active_call().unwrap());
}

#[test]
fn test_user_end_call_stops_sdk_and_releases_slot() {
    let scope = CallScope::new();
    let coordinator = scope.coordinator();
    let (mut sales, transport) = mount("sales", &scope);

    sales.start_call().unwrap();
    sales.handle_event(SdkEvent::CallStart).unwrap();
    sales.end_call().unwrap();

    assert_eq!(sales.phase(), ConnectionPhase::Idle);
    assert!(!coordinator.has_active_call().unwrap());
    assert!(transport.commands().contains(&TransportCommand::Stop));
}

#[test]
fn test_error_event_folds_into_end_of_call() {
    let scope = CallScope::new();
    let coordinator = scope.coordinator();
    let (mut sales, transport) = mount("sales", &scope);

    sales.start_call().unwrap();
    sales.handle_event(SdkEvent::CallStart).unwrap();
    sales
        .handle_event(SdkEvent::Error {
            message: "assistant unavailable".to_string(),
        })
        .unwrap();

    assert_eq!(sales.phase(), ConnectionPhase::Idle);
    assert!(!coordinator.has_active_call().unwrap());
    assert!(transport.commands().contains(&TransportCommand::Stop));

    let view = sales.view().unwrap();
    assert!(view
        .last_error
        .as_deref()
        .is_some_and(|e| e.contains("assistant unavailable")));
}

#[test]
fn test_error_event_while_idle_is_recorded_only() {
    let scope = CallScope::new();
    let (mut sales, transport) = mount("sales", &scope);

    sales
        .handle_event(SdkEvent::Error {
            message: "network failure".to_string(),
        })
        .unwrap();

    assert_eq!(sales.phase(), ConnectionPhase::Idle);
    assert!(sales.last_error().is_some());
    assert!(transport.commands().is_empty());
}

#[test]
fn test_new_session_clears_previous_transcript_and_error() {
    let scope = CallScope::new();
    let (mut sales, _) = mount("sales", &scope);

    sales.start_call().unwrap();
    sales
        .replay([
            SdkEvent::CallStart,
            transcript_event(Role::User, "hi"),
            SdkEvent::Error {
                message: "dropped".to_string(),
            },
        ])
        .unwrap();
    assert_eq!(sales.transcript().len(), 1);
    assert!(sales.last_error().is_some());

    sales.start_call().unwrap();
    assert!(sales.transcript().is_empty());
    assert!(sales.last_error().is_none());
}

#[test]
fn test_unmount_force_stops_even_without_session() {
    let scope = CallScope::new();
    let (sales, transport) = mount("sales", &scope);

    drop(sales);
    assert_eq!(transport.commands(), vec![TransportCommand::Stop]);
}

#[test]
fn test_unmount_mid_call_releases_slot() {
    let scope = CallScope::new();
    let coordinator = scope.coordinator();
    let (mut sales, transport) = mount("sales", &scope);

    sales.start_call().unwrap();
    sales.handle_event(SdkEvent::CallStart).unwrap();
    drop(sales);

    assert!(!coordinator.has_active_call().unwrap());
    assert!(transport.commands().contains(&TransportCommand::Stop));
}

#[test]
fn test_dropped_scope_fails_loudly() {
    let scope = CallScope::new();
    let (mut sales, _) = mount("sales", &scope);
    drop(scope);

    let err = sales.start_call().unwrap_err();
    assert!(matches!(
        err,
        WidgetError::Coordinator(CoordinatorError::ContextMissing)
    ));
}

#[test]
fn test_view_serializes_camel_case_wire_shape() {
    let scope = CallScope::new();
    let (mut sales, _) = mount("sales", &scope);
    sales.start_call().unwrap();

    let view = sales.view().unwrap();
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["widgetId"], "sales");
    assert_eq!(json["phase"], "connecting");
    assert_eq!(json["startButtonText"], "Start Conversation");
    assert_eq!(json["startDisabled"], false);
    assert_eq!(json["statusTitle"], "Connecting");
}

#[test]
fn test_full_session_replay_is_deterministic() {
    let events = [
        SdkEvent::CallStart,
        SdkEvent::SpeechStart,
        transcript_event(Role::Assistant, "Hello, how can I help?"),
        SdkEvent::SpeechEnd,
        transcript_event(Role::User, "Just looking around."),
        SdkEvent::CallEnd,
    ];

    for _ in 0..2 {
        let scope = CallScope::new();
        let (mut sales, _) = mount("sales", &scope);
        sales.start_call().unwrap();
        sales.replay(events.clone()).unwrap();

        assert_eq!(sales.phase(), ConnectionPhase::Idle);
        assert!(!sales.speaking());
        assert_eq!(sales.transcript().len(), 2);
    }
}
