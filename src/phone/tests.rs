//! Controller tests against a scripted agent

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use super::*;
use crate::agent::{
    AgentEvent, AgentResult, AnswerOptions, CallOptions, Originator, RtcSession, SessionEvent,
    SessionHandle, SessionId, TerminateOptions, UserAgent,
};
use crate::settings::{MemoryStorage, PcConfig, Settings, SettingsManager};
use crate::state::{Notification, NotificationType};

// ==================== Fakes ====================

struct FakeSession {
    id: SessionId,
    remote: String,
    answers: RefCell<Vec<AnswerOptions>>,
    terminations: RefCell<Vec<Option<TerminateOptions>>>,
    gather_finished: Cell<u32>,
}

impl FakeSession {
    fn new(id: u64, remote: &str) -> Rc<Self> {
        Rc::new(Self {
            id: SessionId(id),
            remote: remote.to_string(),
            answers: RefCell::new(Vec::new()),
            terminations: RefCell::new(Vec::new()),
            gather_finished: Cell::new(0),
        })
    }
}

impl RtcSession for FakeSession {
    fn id(&self) -> SessionId {
        self.id
    }

    fn remote_identity(&self) -> String {
        self.remote.clone()
    }

    fn answer(&self, options: AnswerOptions) -> AgentResult<()> {
        self.answers.borrow_mut().push(options);
        Ok(())
    }

    fn terminate(&self, options: Option<TerminateOptions>) -> AgentResult<()> {
        self.terminations.borrow_mut().push(options);
        Ok(())
    }

    fn finish_ice_gathering(&self) {
        self.gather_finished.set(self.gather_finished.get() + 1);
    }
}

#[derive(Default)]
struct FakeAgent {
    connected: Cell<bool>,
    stopped: Cell<bool>,
    unsubscribed: Cell<u32>,
    calls: RefCell<Vec<(String, CallOptions)>>,
    sessions: RefCell<Vec<Rc<FakeSession>>>,
}

impl FakeAgent {
    fn last_session(&self) -> Rc<FakeSession> {
        Rc::clone(self.sessions.borrow().last().unwrap())
    }
}

impl UserAgent for FakeAgent {
    fn start(&self) {}

    fn stop(&self) {
        self.stopped.set(true);
    }

    fn is_connected(&self) -> bool {
        self.connected.get()
    }

    fn call(&self, target: &str, options: CallOptions) -> AgentResult<SessionHandle> {
        self.calls.borrow_mut().push((target.to_string(), options));
        let session = FakeSession::new(100 + self.sessions.borrow().len() as u64, target);
        self.sessions.borrow_mut().push(Rc::clone(&session));
        Ok(session)
    }

    fn unsubscribe(&self) {
        self.unsubscribed.set(self.unsubscribed.get() + 1);
    }
}

#[derive(Default)]
struct FakeTones {
    log: RefCell<Vec<(&'static str, Tone)>>,
}

impl FakeTones {
    fn take(&self) -> Vec<(&'static str, Tone)> {
        std::mem::take(&mut *self.log.borrow_mut())
    }
}

impl TonePlayer for FakeTones {
    fn play(&self, tone: Tone) {
        self.log.borrow_mut().push(("play", tone));
    }

    fn stop(&self, tone: Tone) {
        self.log.borrow_mut().push(("stop", tone));
    }
}

#[derive(Default)]
struct FakeNotifier {
    notifications: RefCell<Vec<Notification>>,
}

impl Notifier for FakeNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.borrow_mut().push(notification);
    }
}

struct PendingTimer {
    after: Duration,
    on_expire: Option<Box<dyn FnOnce()>>,
    cancelled: Rc<Cell<bool>>,
}

/// Timer fired by hand
#[derive(Default)]
struct ManualTimer {
    pending: RefCell<Vec<PendingTimer>>,
}

impl ManualTimer {
    fn armed(&self) -> usize {
        self.pending.borrow().len()
    }

    fn is_cancelled(&self, index: usize) -> bool {
        self.pending.borrow()[index].cancelled.get()
    }

    fn fire(&self, index: usize) {
        let (on_expire, cancelled) = {
            let mut pending = self.pending.borrow_mut();
            let timer = &mut pending[index];
            (timer.on_expire.take(), timer.cancelled.get())
        };
        if let (Some(on_expire), false) = (on_expire, cancelled) {
            on_expire();
        }
    }
}

impl DeadlineTimer for ManualTimer {
    fn arm(&self, after: Duration, on_expire: Box<dyn FnOnce()>) -> TimerGuard {
        let cancelled = Rc::new(Cell::new(false));
        self.pending.borrow_mut().push(PendingTimer {
            after,
            on_expire: Some(on_expire),
            cancelled: Rc::clone(&cancelled),
        });
        TimerGuard::new(move || cancelled.set(true))
    }
}

struct Fixture {
    agent: Rc<FakeAgent>,
    tones: Rc<FakeTones>,
    notifier: Rc<FakeNotifier>,
    timer: Rc<ManualTimer>,
    controller: PhoneController,
}

impl Fixture {
    fn new() -> Self {
        Self::with_settings(Settings {
            uri: Some("sip:alice@example.com".to_string()),
            ..Settings::default()
        })
    }

    fn with_settings(settings: Settings) -> Self {
        let manager = SettingsManager::load(Box::new(MemoryStorage::with_settings(settings)), None);
        let agent = Rc::new(FakeAgent::default());
        let tones = Rc::new(FakeTones::default());
        let notifier = Rc::new(FakeNotifier::default());
        let timer = Rc::new(ManualTimer::default());

        let controller = PhoneController::new(
            agent.clone(),
            &manager,
            PhoneServices {
                tones: tones.clone(),
                notifier: notifier.clone(),
                timer: timer.clone(),
            },
        );

        Self {
            agent,
            tones,
            notifier,
            timer,
            controller,
        }
    }

    fn registered() -> Self {
        let mut fixture = Self::new();
        fixture.agent.connected.set(true);
        fixture.send(AgentEvent::Connecting);
        fixture.send(AgentEvent::Connected);
        fixture.send(AgentEvent::Registered);
        fixture
    }

    fn send(&mut self, event: AgentEvent) {
        self.controller.handle_event(event);
    }

    fn session_event(&mut self, id: SessionId, event: SessionEvent) {
        self.send(AgentEvent::Session { id, event });
    }

    fn incoming(&mut self, id: u64) -> Rc<FakeSession> {
        let session = FakeSession::new(id, "sip:bob@example.com");
        self.send(AgentEvent::NewSession {
            session: session.clone(),
            originator: Originator::Remote,
        });
        session
    }

    /// Place a call and let the agent report it as connecting
    fn outgoing(&mut self, raw: &str) -> Rc<FakeSession> {
        let id = self
            .controller
            .call(&DialRequest::Direct(raw.to_string()))
            .unwrap();
        let session = self.agent.last_session();
        self.send(AgentEvent::NewSession {
            session: session.clone(),
            originator: Originator::Local,
        });
        self.session_event(id, SessionEvent::Connecting);
        session
    }
}

fn failed(cause: &str) -> SessionEvent {
    SessionEvent::Failed {
        originator: Originator::Remote,
        cause: cause.to_string(),
    }
}

fn ended() -> SessionEvent {
    SessionEvent::Ended {
        originator: Originator::Remote,
        cause: "Terminated".to_string(),
    }
}

// ==================== Connection status ====================

#[test]
fn test_initial_state() {
    let fixture = Fixture::new();
    let view = fixture.controller.snapshot();

    assert_eq!(view.status, ConnectionStatus::Disconnected);
    assert!(view.session.is_none());
    assert!(view.incoming.is_none());
    assert!(!view.can_call());
}

#[test]
fn test_status_follows_agent_events() {
    let mut fixture = Fixture::new();

    fixture.send(AgentEvent::Connecting);
    assert_eq!(fixture.controller.status(), ConnectionStatus::Connecting);
    fixture.send(AgentEvent::Connected);
    assert_eq!(fixture.controller.status(), ConnectionStatus::Connected);
    fixture.send(AgentEvent::Registered);
    assert_eq!(fixture.controller.status(), ConnectionStatus::Registered);
    fixture.send(AgentEvent::Disconnected);
    assert_eq!(fixture.controller.status(), ConnectionStatus::Disconnected);
}

#[test]
fn test_unregistered_while_connected() {
    let mut fixture = Fixture::registered();

    fixture.agent.connected.set(true);
    fixture.send(AgentEvent::Unregistered);

    assert_eq!(fixture.controller.status(), ConnectionStatus::Connected);
}

#[test]
fn test_unregistered_while_disconnected() {
    let mut fixture = Fixture::registered();

    fixture.agent.connected.set(false);
    fixture.send(AgentEvent::Unregistered);

    assert_eq!(fixture.controller.status(), ConnectionStatus::Disconnected);
}

#[test]
fn test_registration_failed_notifies_cause() {
    let mut fixture = Fixture::new();
    fixture.agent.connected.set(true);
    fixture.send(AgentEvent::Connected);

    fixture.send(AgentEvent::RegistrationFailed {
        cause: "Authentication Error".to_string(),
    });

    assert_eq!(fixture.controller.status(), ConnectionStatus::Connected);
    let notifications = fixture.notifier.notifications.borrow();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].title, "Registration failed");
    assert_eq!(notifications[0].message, "Authentication Error");
    assert_eq!(notifications[0].notification_type, NotificationType::Error);
}

#[test]
fn test_registration_failed_without_transport() {
    let mut fixture = Fixture::new();
    fixture.send(AgentEvent::RegistrationFailed {
        cause: "Connection Error".to_string(),
    });

    assert_eq!(fixture.controller.status(), ConnectionStatus::Disconnected);
}

// ==================== Busy predicate ====================

#[test]
fn test_can_call_all_combinations() {
    let statuses = [
        ConnectionStatus::Disconnected,
        ConnectionStatus::Connecting,
        ConnectionStatus::Connected,
        ConnectionStatus::Registered,
    ];

    for status in statuses {
        for has_session in [false, true] {
            for has_incoming in [false, true] {
                let expected = matches!(
                    status,
                    ConnectionStatus::Connected | ConnectionStatus::Registered
                ) && !has_session
                    && !has_incoming;
                assert_eq!(
                    can_call(status, has_session, has_incoming),
                    expected,
                    "{:?} session={} incoming={}",
                    status,
                    has_session,
                    has_incoming
                );
            }
        }
    }
}

#[test]
fn test_call_refused_when_not_connected() {
    let mut fixture = Fixture::new();
    fixture.send(AgentEvent::Connecting);

    let result = fixture.controller.call(&DialRequest::Direct("bob".to_string()));

    assert!(matches!(
        result,
        Err(PhoneError::NotConnected(ConnectionStatus::Connecting))
    ));
    assert!(fixture.agent.calls.borrow().is_empty());
}

#[test]
fn test_call_refused_while_busy() {
    let mut fixture = Fixture::registered();
    fixture.incoming(1);

    let result = fixture.controller.call(&DialRequest::Direct("carol".to_string()));

    assert!(matches!(result, Err(PhoneError::Busy)));
    assert!(fixture.agent.calls.borrow().is_empty());
}

#[test]
fn test_second_call_refused_before_connecting() {
    let mut fixture = Fixture::registered();
    fixture
        .controller
        .call(&DialRequest::Direct("bob".to_string()))
        .unwrap();

    assert!(fixture.controller.is_dialing());
    assert!(!fixture.controller.can_call());
    assert!(!fixture.controller.snapshot().can_call());

    let result = fixture.controller.call(&DialRequest::Direct("carol".to_string()));

    assert!(matches!(result, Err(PhoneError::Busy)));
    assert_eq!(fixture.agent.calls.borrow().len(), 1);
}

#[test]
fn test_dialing_ends_when_call_connects_or_fails() {
    let mut fixture = Fixture::registered();
    let session = fixture.outgoing("bob");

    // Now held in the session slot
    assert!(!fixture.controller.is_dialing());
    assert!(!fixture.controller.can_call());

    fixture.session_event(session.id, failed("Busy"));
    assert!(fixture.controller.can_call());

    let id = fixture
        .controller
        .call(&DialRequest::Direct("carol".to_string()))
        .unwrap();
    fixture.session_event(id, failed("Not Found"));

    assert!(!fixture.controller.is_dialing());
    assert!(fixture.controller.snapshot().can_call());
}

#[test]
fn test_call_refused_for_empty_input() {
    let mut fixture = Fixture::registered();

    let result = fixture.controller.call(&DialRequest::Direct("  ".to_string()));

    assert!(matches!(result, Err(PhoneError::EmptyTarget)));
}

// ==================== Outgoing calls ====================

#[test]
fn test_outgoing_call_options() {
    let mut fixture = Fixture::registered();

    fixture
        .controller
        .call(&DialRequest::Direct("bob".to_string()))
        .unwrap();

    let calls = fixture.agent.calls.borrow();
    let (target, options) = &calls[0];
    assert_eq!(target, "sip:bob@vrs.qa.sip.svrs.net");
    assert!(options.media_constraints.audio);
    assert!(options.media_constraints.video);
    assert_eq!(options.offer_constraints.offer_to_receive_audio, 1);
    assert_eq!(options.offer_constraints.offer_to_receive_video, 1);
    assert_eq!(options.pc_config, PcConfig::default());
}

#[test]
fn test_outgoing_call_without_pc_config() {
    let mut fixture = Fixture::with_settings(Settings {
        uri: Some("sip:alice@example.com".to_string()),
        pc_config: None,
        ..Settings::default()
    });
    fixture.send(AgentEvent::Connected);

    fixture
        .controller
        .call(&DialRequest::Vrs("bob@example.com".to_string()))
        .unwrap();

    let calls = fixture.agent.calls.borrow();
    assert_eq!(calls[0].0, "sip:bob@vrs-eng.qa.sip.svrs.net");
    assert!(calls[0].1.pc_config.ice_servers.is_empty());
}

#[test]
fn test_outgoing_lifecycle() {
    let mut fixture = Fixture::registered();
    let session = fixture.outgoing("bob");
    let id = session.id;

    let view = fixture.controller.snapshot();
    assert_eq!(view.session.as_ref().map(|s| s.id), Some(id));
    assert!(!view.can_call());

    fixture.session_event(id, SessionEvent::Progress);
    assert_eq!(fixture.tones.take(), vec![("play", Tone::Ringback)]);

    fixture.session_event(id, SessionEvent::Accepted);
    assert_eq!(
        fixture.tones.take(),
        vec![("stop", Tone::Ringback), ("play", Tone::Answered)]
    );
    assert!(fixture.controller.snapshot().answered_at.is_some());

    fixture.session_event(id, ended());
    assert_eq!(fixture.tones.take(), vec![("stop", Tone::Ringback)]);

    let view = fixture.controller.snapshot();
    assert!(view.session.is_none());
    assert!(view.answered_at.is_none());
    assert!(view.can_call());
    assert!(fixture.notifier.notifications.borrow().is_empty());
}

#[test]
fn test_outgoing_failure() {
    let mut fixture = Fixture::registered();
    let session = fixture.outgoing("bob");

    fixture.session_event(session.id, failed("Busy"));

    assert_eq!(
        fixture.tones.take(),
        vec![("stop", Tone::Ringback), ("play", Tone::Rejected)]
    );
    assert!(fixture.controller.session().is_none());

    let notifications = fixture.notifier.notifications.borrow();
    assert_eq!(notifications[0].title, "Call failed");
    assert_eq!(notifications[0].message, "Busy");
}

#[test]
fn test_failure_before_connecting_notifies() {
    let mut fixture = Fixture::registered();
    let id = fixture
        .controller
        .call(&DialRequest::Direct("bob".to_string()))
        .unwrap();

    fixture.session_event(id, failed("User Denied Media Access"));

    assert!(fixture.controller.session().is_none());
    assert_eq!(fixture.notifier.notifications.borrow().len(), 1);
}

#[test]
fn test_hangup_terminates_active_session() {
    let mut fixture = Fixture::registered();
    let session = fixture.outgoing("bob");

    fixture.controller.hangup().unwrap();

    assert_eq!(*session.terminations.borrow(), vec![None]);
}

#[test]
fn test_hangup_without_session() {
    let mut fixture = Fixture::registered();

    assert!(matches!(
        fixture.controller.hangup(),
        Err(PhoneError::NoActiveCall)
    ));
}

// ==================== Incoming calls ====================

#[test]
fn test_incoming_admitted_when_idle() {
    let mut fixture = Fixture::registered();

    let session = fixture.incoming(1);

    let view = fixture.controller.snapshot();
    assert_eq!(view.incoming.as_ref().map(|s| s.id), Some(session.id));
    assert_eq!(view.incoming.as_ref().unwrap().remote, "sip:bob@example.com");
    assert!(view.session.is_none());
    assert_eq!(fixture.tones.take(), vec![("play", Tone::Ringing)]);
    assert!(session.terminations.borrow().is_empty());
}

#[test]
fn test_second_incoming_rejected_busy() {
    let mut fixture = Fixture::registered();
    let first = fixture.incoming(1);
    fixture.tones.take();

    let second = fixture.incoming(2);

    let view = fixture.controller.snapshot();
    assert_eq!(view.incoming.as_ref().map(|s| s.id), Some(first.id));
    assert!(view.session.is_none());
    assert_eq!(
        *second.terminations.borrow(),
        vec![Some(TerminateOptions {
            status_code: 486,
            reason_phrase: "Busy Here".to_string(),
        })]
    );
    assert!(fixture.tones.take().is_empty());
    assert!(fixture.notifier.notifications.borrow().is_empty());
}

#[test]
fn test_incoming_rejected_during_active_call() {
    let mut fixture = Fixture::registered();
    let active = fixture.outgoing("carol");

    let incoming = fixture.incoming(7);

    assert_eq!(
        fixture.controller.session().map(|s| s.id()),
        Some(active.id)
    );
    assert!(fixture.controller.incoming().is_none());
    assert_eq!(incoming.terminations.borrow().len(), 1);

    // Events of the rejected session do not touch the slots
    fixture.session_event(incoming.id, failed("Busy"));
    assert!(fixture.controller.session().is_some());
}

#[test]
fn test_incoming_rejected_while_dialing() {
    let mut fixture = Fixture::registered();
    fixture
        .controller
        .call(&DialRequest::Direct("carol".to_string()))
        .unwrap();

    let incoming = fixture.incoming(7);

    assert!(fixture.controller.incoming().is_none());
    assert_eq!(
        *incoming.terminations.borrow(),
        vec![Some(TerminateOptions {
            status_code: 486,
            reason_phrase: "Busy Here".to_string(),
        })]
    );
    assert!(fixture.tones.take().is_empty());
}

#[test]
fn test_incoming_ended_while_ringing() {
    let mut fixture = Fixture::registered();
    let session = fixture.incoming(1);
    fixture.tones.take();

    // Caller hung up before anyone answered
    fixture.session_event(session.id, ended());

    assert_eq!(fixture.tones.take(), vec![("stop", Tone::Ringing)]);
    assert!(!fixture.controller.snapshot().is_busy());
    assert!(fixture.controller.can_call());
}

#[test]
fn test_incoming_answered() {
    let mut fixture = Fixture::registered();
    let session = fixture.incoming(1);
    fixture.tones.take();

    fixture.controller.answer().unwrap();
    assert_eq!(session.answers.borrow()[0].pc_config, PcConfig::default());

    fixture.session_event(session.id, SessionEvent::Accepted);

    let view = fixture.controller.snapshot();
    assert_eq!(view.session.as_ref().map(|s| s.id), Some(session.id));
    assert!(view.incoming.is_none());
    assert_eq!(fixture.tones.take(), vec![("stop", Tone::Ringing)]);

    fixture.session_event(session.id, ended());
    assert!(!fixture.controller.snapshot().is_busy());
}

#[test]
fn test_incoming_rejected_by_user() {
    let mut fixture = Fixture::registered();
    let session = fixture.incoming(1);
    fixture.tones.take();

    fixture.controller.reject().unwrap();
    assert_eq!(*session.terminations.borrow(), vec![None]);

    fixture.session_event(session.id, failed("Rejected"));

    assert!(!fixture.controller.snapshot().is_busy());
    assert_eq!(fixture.tones.take(), vec![("stop", Tone::Ringing)]);
    // Incoming failures are not reported
    assert!(fixture.notifier.notifications.borrow().is_empty());
}

#[test]
fn test_answer_without_incoming() {
    let mut fixture = Fixture::registered();

    assert!(matches!(
        fixture.controller.answer(),
        Err(PhoneError::NoIncomingCall)
    ));
    assert!(matches!(
        fixture.controller.reject(),
        Err(PhoneError::NoIncomingCall)
    ));
}

// ==================== ICE gathering deadline ====================

fn with_ice_timeout(ms: u64) -> Fixture {
    let mut fixture = Fixture::with_settings(Settings {
        uri: Some("sip:alice@example.com".to_string()),
        ice_gather_timeout: Some(ms),
        ..Settings::default()
    });
    fixture.agent.connected.set(true);
    fixture.send(AgentEvent::Registered);
    fixture
}

#[test]
fn test_ice_deadline_forces_gathering() {
    let mut fixture = with_ice_timeout(500);
    let session = fixture.outgoing("bob");

    fixture.session_event(session.id, SessionEvent::IceCandidate);
    fixture.session_event(session.id, SessionEvent::IceCandidate);

    // Armed once, on the first candidate
    assert_eq!(fixture.timer.armed(), 1);
    assert_eq!(fixture.timer.pending.borrow()[0].after, Duration::from_millis(500));

    fixture.timer.fire(0);
    assert_eq!(session.gather_finished.get(), 1);
}

#[test]
fn test_ice_deadline_cancelled_by_local_sdp() {
    let mut fixture = with_ice_timeout(500);
    let session = fixture.outgoing("bob");

    fixture.session_event(session.id, SessionEvent::IceCandidate);
    fixture.session_event(
        session.id,
        SessionEvent::Sdp {
            originator: Originator::Local,
        },
    );

    assert!(fixture.timer.is_cancelled(0));
    fixture.timer.fire(0);
    assert_eq!(session.gather_finished.get(), 0);
}

#[test]
fn test_remote_sdp_keeps_deadline() {
    let mut fixture = with_ice_timeout(500);
    let session = fixture.outgoing("bob");

    fixture.session_event(session.id, SessionEvent::IceCandidate);
    fixture.session_event(
        session.id,
        SessionEvent::Sdp {
            originator: Originator::Remote,
        },
    );

    assert!(!fixture.timer.is_cancelled(0));
}

#[test]
fn test_ice_deadline_cancelled_on_termination() {
    let mut fixture = with_ice_timeout(500);
    let session = fixture.outgoing("bob");

    fixture.session_event(session.id, SessionEvent::IceCandidate);
    fixture.session_event(session.id, ended());

    assert!(fixture.timer.is_cancelled(0));
}

#[test]
fn test_no_deadline_without_timeout() {
    let mut fixture = Fixture::registered();
    let session = fixture.outgoing("bob");

    fixture.session_event(session.id, SessionEvent::IceCandidate);

    assert_eq!(fixture.timer.armed(), 0);
}

#[test]
fn test_zero_timeout_disables_deadline() {
    let mut fixture = with_ice_timeout(0);
    let session = fixture.outgoing("bob");

    fixture.session_event(session.id, SessionEvent::IceCandidate);

    assert_eq!(fixture.timer.armed(), 0);
}

#[test]
fn test_answered_incoming_is_watched() {
    let mut fixture = with_ice_timeout(300);
    let session = fixture.incoming(1);

    // Not watched before answering
    fixture.session_event(session.id, SessionEvent::IceCandidate);
    assert_eq!(fixture.timer.armed(), 0);

    fixture.controller.answer().unwrap();
    fixture.session_event(session.id, SessionEvent::IceCandidate);
    assert_eq!(fixture.timer.armed(), 1);
}

// ==================== Teardown ====================

#[test]
fn test_dispose_ignores_late_events() {
    let mut fixture = with_ice_timeout(500);
    let session = fixture.outgoing("bob");
    fixture.session_event(session.id, SessionEvent::IceCandidate);

    fixture.controller.dispose();
    fixture.controller.dispose();

    assert_eq!(fixture.agent.unsubscribed.get(), 1);
    assert!(fixture.timer.is_cancelled(0));

    let before = fixture.controller.snapshot();
    fixture.send(AgentEvent::Disconnected);
    fixture.send(AgentEvent::RegistrationFailed {
        cause: "late".to_string(),
    });
    assert_eq!(fixture.controller.snapshot(), before);
    assert!(fixture.notifier.notifications.borrow().is_empty());

    assert!(matches!(
        fixture.controller.call(&DialRequest::Direct("bob".to_string())),
        Err(PhoneError::Disposed)
    ));
}

#[test]
fn test_exit_stops_agent() {
    let mut fixture = Fixture::registered();

    fixture.controller.exit();

    assert!(fixture.agent.stopped.get());
    assert!(fixture.controller.is_disposed());
}
