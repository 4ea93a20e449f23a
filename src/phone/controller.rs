//! Call view-state controller

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::dial::DialRequest;
use super::ice::{DeadlineTimer, IceWatch};
use super::tones::{Tone, TonePlayer};
use super::{CallInfo, ConnectionStatus, Notifier, PhoneError, PhoneResult, PhoneView};
use crate::agent::{
    AgentEvent, AnswerOptions, CallOptions, Originator, SessionEvent, SessionHandle, SessionId,
    TerminateOptions, UserAgent,
};
use crate::settings::{Settings, SettingsManager};
use crate::state::Notification;

/// Whether a new call may be started
pub fn can_call(status: ConnectionStatus, has_session: bool, has_incoming: bool) -> bool {
    status.is_online() && !has_session && !has_incoming
}

/// Side-effect collaborators of the controller
pub struct PhoneServices {
    pub tones: Rc<dyn TonePlayer>,
    pub notifier: Rc<dyn Notifier>,
    pub timer: Rc<dyn DeadlineTimer>,
}

/// Sessions whose lifecycle the controller follows
enum Tracked {
    Outgoing(SessionHandle),
    Incoming(SessionHandle),
}

pub struct PhoneController {
    agent: Rc<dyn UserAgent>,
    settings: Arc<Settings>,
    default_domain: String,
    vrs_domain: String,
    services: PhoneServices,
    status: ConnectionStatus,
    session: Option<SessionHandle>,
    incoming: Option<SessionHandle>,
    answered_at: Option<DateTime<Utc>>,
    tracked: HashMap<SessionId, Tracked>,
    ice_watches: HashMap<SessionId, IceWatch>,
    disposed: bool,
}

impl PhoneController {
    pub fn new(agent: Rc<dyn UserAgent>, settings: &SettingsManager, services: PhoneServices) -> Self {
        Self {
            agent,
            settings: settings.get(),
            default_domain: settings.default_domain().to_string(),
            vrs_domain: settings.default_vrs_domain().to_string(),
            services,
            status: ConnectionStatus::Disconnected,
            session: None,
            incoming: None,
            answered_at: None,
            tracked: HashMap::new(),
            ice_watches: HashMap::new(),
            disposed: false,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn session(&self) -> Option<&SessionHandle> {
        self.session.as_ref()
    }

    pub fn incoming(&self) -> Option<&SessionHandle> {
        self.incoming.as_ref()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// An outgoing call was placed but has not reached `connecting` yet
    pub fn is_dialing(&self) -> bool {
        self.tracked.values().any(|tracked| match tracked {
            Tracked::Outgoing(session) => !self.is_current(session),
            Tracked::Incoming(_) => false,
        })
    }

    /// Either slot is taken or a placed call is about to take one
    fn is_busy(&self) -> bool {
        self.session.is_some() || self.incoming.is_some() || self.is_dialing()
    }

    pub fn can_call(&self) -> bool {
        can_call(
            self.status,
            self.session.is_some() || self.is_dialing(),
            self.incoming.is_some(),
        )
    }

    /// Current state for rendering
    pub fn snapshot(&self) -> PhoneView {
        let info = |session: &SessionHandle| CallInfo {
            id: session.id(),
            remote: session.remote_identity(),
        };

        PhoneView {
            status: self.status,
            session: self.session.as_ref().map(info),
            incoming: self.incoming.as_ref().map(info),
            dialing: self.is_dialing(),
            answered_at: self.answered_at,
        }
    }

    /// Status after losing registration: whatever the transport still allows
    fn fallback_status(&self) -> ConnectionStatus {
        if self.agent.is_connected() {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Disconnected
        }
    }

    fn notify_error(&self, title: &str, message: &str) {
        self.services.notifier.notify(Notification::error(title, message));
    }

    /// Apply one agent event
    pub fn handle_event(&mut self, event: AgentEvent) {
        if self.disposed {
            tracing::debug!("ignoring {:?} after dispose", event);
            return;
        }

        match event {
            AgentEvent::Connecting => {
                tracing::debug!("UA \"connecting\" event");
                self.status = ConnectionStatus::Connecting;
            }
            AgentEvent::Connected => {
                tracing::debug!("UA \"connected\" event");
                self.status = ConnectionStatus::Connected;
            }
            AgentEvent::Disconnected => {
                tracing::debug!("UA \"disconnected\" event");
                self.status = ConnectionStatus::Disconnected;
            }
            AgentEvent::Registered => {
                tracing::debug!("UA \"registered\" event");
                self.status = ConnectionStatus::Registered;
            }
            AgentEvent::Unregistered => {
                tracing::debug!("UA \"unregistered\" event");
                self.status = self.fallback_status();
            }
            AgentEvent::RegistrationFailed { cause } => {
                tracing::debug!("UA \"registrationFailed\" event");
                self.status = self.fallback_status();
                self.notify_error("Registration failed", &cause);
            }
            AgentEvent::NewSession {
                session,
                originator: Originator::Local,
            } => {
                self.watch_ice(&session);
            }
            AgentEvent::NewSession { session, .. } => self.on_incoming_session(session),
            AgentEvent::Session { id, event } => self.on_session_event(id, event),
        }
    }

    fn on_incoming_session(&mut self, session: SessionHandle) {
        tracing::debug!("UA \"newRTCSession\" event");

        if self.is_busy() {
            tracing::debug!("incoming call replied with 486 \"Busy Here\"");
            if let Err(e) = session.terminate(Some(TerminateOptions::busy_here())) {
                tracing::warn!("Failed to reject {}: {}", session.id(), e);
            }
            return;
        }

        self.services.tones.play(Tone::Ringing);
        self.tracked
            .insert(session.id(), Tracked::Incoming(Rc::clone(&session)));
        self.incoming = Some(session);
    }

    /// Start following candidate gathering when a deadline is configured
    fn watch_ice(&mut self, session: &SessionHandle) {
        if self.settings.ice_gather_deadline().is_none() {
            return;
        }
        self.ice_watches
            .entry(session.id())
            .or_insert_with(|| IceWatch::new(Rc::clone(session)));
    }

    fn on_session_event(&mut self, id: SessionId, event: SessionEvent) {
        match &event {
            SessionEvent::IceCandidate => {
                if let (Some(watch), Some(deadline)) = (
                    self.ice_watches.get_mut(&id),
                    self.settings.ice_gather_deadline(),
                ) {
                    watch.on_candidate(deadline, self.services.timer.as_ref());
                }
                return;
            }
            SessionEvent::Sdp {
                originator: Originator::Local,
            } => {
                if let Some(watch) = self.ice_watches.get_mut(&id) {
                    watch.on_local_sdp();
                }
                return;
            }
            SessionEvent::Sdp { .. } => return,
            event if event.is_terminal() => {
                self.ice_watches.remove(&id);
            }
            _ => {}
        }

        let (outgoing, session) = match self.tracked.get(&id) {
            Some(Tracked::Outgoing(session)) => (true, Rc::clone(session)),
            Some(Tracked::Incoming(session)) => (false, Rc::clone(session)),
            None => {
                tracing::trace!("event for untracked {}: {:?}", id, event);
                return;
            }
        };

        if outgoing {
            self.on_outgoing_event(session, event);
        } else {
            self.on_incoming_event(session, event);
        }
    }

    fn is_current(&self, session: &SessionHandle) -> bool {
        self.session
            .as_ref()
            .is_some_and(|current| current.id() == session.id())
    }

    fn on_outgoing_event(&mut self, session: SessionHandle, event: SessionEvent) {
        let tones = Rc::clone(&self.services.tones);

        match event {
            SessionEvent::Connecting => {
                self.session = Some(session);
            }
            SessionEvent::Progress => tones.play(Tone::Ringback),
            SessionEvent::Failed { cause, .. } => {
                tones.stop(Tone::Ringback);
                tones.play(Tone::Rejected);
                if self.is_current(&session) {
                    self.session = None;
                    self.answered_at = None;
                }
                self.tracked.remove(&session.id());
                self.notify_error("Call failed", &cause);
            }
            SessionEvent::Ended { .. } => {
                tones.stop(Tone::Ringback);
                if self.is_current(&session) {
                    self.session = None;
                    self.answered_at = None;
                }
                self.tracked.remove(&session.id());
            }
            SessionEvent::Accepted => {
                tones.stop(Tone::Ringback);
                tones.play(Tone::Answered);
                self.answered_at = Some(Utc::now());
            }
            SessionEvent::IceCandidate | SessionEvent::Sdp { .. } => {}
        }
    }

    fn on_incoming_event(&mut self, session: SessionHandle, event: SessionEvent) {
        match event {
            SessionEvent::Failed { .. } | SessionEvent::Ended { .. } => {
                self.services.tones.stop(Tone::Ringing);
                self.clear_slots();
                self.tracked.remove(&session.id());
            }
            SessionEvent::Accepted => {
                self.services.tones.stop(Tone::Ringing);
                self.incoming = None;
                self.session = Some(session);
                self.answered_at = Some(Utc::now());
            }
            _ => {}
        }
    }

    fn clear_slots(&mut self) {
        self.session = None;
        self.incoming = None;
        self.answered_at = None;
    }

    /// Start an outgoing call.
    ///
    /// Refused unless connected or registered with both session slots free
    /// and no earlier call still waiting for `connecting`.
    pub fn call(&mut self, request: &DialRequest) -> PhoneResult<SessionId> {
        if self.disposed {
            return Err(PhoneError::Disposed);
        }
        if !self.status.is_online() {
            return Err(PhoneError::NotConnected(self.status));
        }
        if !self.can_call() {
            return Err(PhoneError::Busy);
        }
        if request.raw().trim().is_empty() {
            return Err(PhoneError::EmptyTarget);
        }

        let target = request.target(&self.default_domain, &self.vrs_domain);
        tracing::debug!("handleOutgoingCall() [uri:\"{}\"]", target);

        let options = CallOptions::audio_video(self.settings.pc_config_or_empty());
        let session = self.agent.call(&target, options)?;
        let id = session.id();
        self.tracked.insert(id, Tracked::Outgoing(session));

        Ok(id)
    }

    /// Answer the incoming call
    pub fn answer(&mut self) -> PhoneResult<()> {
        let session = self.incoming.clone().ok_or(PhoneError::NoIncomingCall)?;
        tracing::debug!("answering {}", session.id());

        self.watch_ice(&session);
        session.answer(AnswerOptions {
            pc_config: self.settings.pc_config_or_empty(),
        })?;
        Ok(())
    }

    /// Reject the incoming call
    pub fn reject(&mut self) -> PhoneResult<()> {
        let session = self.incoming.as_ref().ok_or(PhoneError::NoIncomingCall)?;
        tracing::debug!("rejecting {}", session.id());

        session.terminate(None)?;
        Ok(())
    }

    /// Hang up the active call
    pub fn hangup(&mut self) -> PhoneResult<()> {
        let session = self.session.as_ref().ok_or(PhoneError::NoActiveCall)?;
        tracing::debug!("hanging up {}", session.id());

        session.terminate(None)?;
        Ok(())
    }

    /// Stop the agent and tear the controller down
    pub fn exit(&mut self) {
        if !self.disposed {
            self.agent.stop();
        }
        self.dispose();
    }

    /// Unsubscribe from the agent and cancel pending timers.
    ///
    /// Events arriving afterwards are ignored.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        self.agent.unsubscribe();
        self.ice_watches.clear();
        self.tracked.clear();
        self.services.tones.stop(Tone::Ringing);
        self.services.tones.stop(Tone::Ringback);

        tracing::info!("phone controller disposed");
    }
}
