//! JsSIP bindings
//!
//! Rust side of the JsSIP `UA` and `RTCSession` objects. Every JsSIP event
//! is translated to an [`AgentEvent`] and pushed into the agent channel.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use js_sys::{Function, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use super::{
    event_channel, AgentError, AgentEvent, AgentEventSender, AgentEvents, AgentResult,
    AnswerOptions, CallOptions, Originator, RtcSession, SessionEvent, SessionHandle, SessionId,
    TerminateOptions, UaConfig, UserAgent,
};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = JsSIP)]
    type WebSocketInterface;

    #[wasm_bindgen(constructor, catch, js_namespace = JsSIP)]
    fn new(url: &str) -> Result<WebSocketInterface, JsValue>;

    #[wasm_bindgen(js_namespace = JsSIP, js_name = UA)]
    type JsUa;

    #[wasm_bindgen(constructor, catch, js_namespace = JsSIP, js_class = "UA")]
    fn new(configuration: &JsValue) -> Result<JsUa, JsValue>;

    #[wasm_bindgen(method)]
    fn start(this: &JsUa);

    #[wasm_bindgen(method)]
    fn stop(this: &JsUa);

    #[wasm_bindgen(method, js_name = isConnected)]
    fn is_connected(this: &JsUa) -> bool;

    #[wasm_bindgen(method)]
    fn on(this: &JsUa, event: &str, callback: &Function);

    #[wasm_bindgen(method, js_name = removeAllListeners)]
    fn remove_all_listeners(this: &JsUa);

    #[wasm_bindgen(method, catch)]
    fn call(this: &JsUa, target: &str, options: &JsValue) -> Result<JsRtcSession, JsValue>;

    #[derive(Clone)]
    type JsRtcSession;

    #[wasm_bindgen(method)]
    fn on(this: &JsRtcSession, event: &str, callback: &Function);

    #[wasm_bindgen(method, js_name = removeAllListeners)]
    fn remove_all_listeners(this: &JsRtcSession);

    #[wasm_bindgen(method, catch)]
    fn answer(this: &JsRtcSession, options: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch)]
    fn terminate(this: &JsRtcSession, options: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, getter)]
    fn remote_identity(this: &JsRtcSession) -> JsValue;
}

/// Property used to tag JsSIP session objects with our id
const SESSION_TAG: &str = "__softphoneSessionId";

type Listener = Closure<dyn FnMut(JsValue)>;

fn to_js<T: serde::Serialize>(value: &T) -> AgentResult<JsValue> {
    let json = serde_json::to_string(value)?;
    js_sys::JSON::parse(&json).map_err(|e| AgentError::InvalidConfig(js_message(&e)))
}

fn js_message(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

fn string_field(data: &JsValue, field: &str) -> Option<String> {
    Reflect::get(data, &field.into()).ok().and_then(|v| v.as_string())
}

fn originator_of(data: &JsValue) -> Originator {
    string_field(data, "originator")
        .as_deref()
        .map(Originator::from)
        .unwrap_or(Originator::System)
}

/// State shared between the agent and its listeners.
///
/// Sessions stay registered until [`UserAgent::unsubscribe`], a listener
/// must never drop the closure that is running it.
struct Shared {
    events: AgentEventSender,
    sessions: RefCell<HashMap<SessionId, Rc<JsSipSession>>>,
    next_id: Cell<u64>,
}

impl Shared {
    fn emit(&self, event: AgentEvent) {
        if self.events.unbounded_send(event).is_err() {
            tracing::debug!("agent event dropped, nobody is listening");
        }
    }

    /// Wrap a JsSIP session, reusing the wrapper when the object was seen before
    fn session_for(self: &Rc<Self>, raw: JsRtcSession) -> Rc<JsSipSession> {
        let tagged = Reflect::get(&raw, &SESSION_TAG.into())
            .ok()
            .and_then(|v| v.as_f64())
            .map(|id| SessionId(id as u64));

        if let Some(id) = tagged {
            if let Some(session) = self.sessions.borrow().get(&id) {
                return Rc::clone(session);
            }
        }

        let id = SessionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let _ = Reflect::set(&raw, &SESSION_TAG.into(), &JsValue::from_f64(id.0 as f64));

        let session = Rc::new(JsSipSession {
            id,
            inner: raw,
            ice_candidate: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
        });
        self.attach_session_listeners(&session);
        self.sessions.borrow_mut().insert(id, Rc::clone(&session));

        session
    }

    fn attach_session_listeners(self: &Rc<Self>, session: &Rc<JsSipSession>) {
        let names = [
            "connecting",
            "progress",
            "failed",
            "ended",
            "accepted",
            "icecandidate",
            "sdp",
        ];

        let mut listeners = session.listeners.borrow_mut();
        for name in names {
            let shared = Rc::downgrade(self);
            let weak_session: Weak<JsSipSession> = Rc::downgrade(session);
            let id = session.id;

            let listener = Closure::wrap(Box::new(move |data: JsValue| {
                let Some(shared) = shared.upgrade() else {
                    return;
                };

                let event = match name {
                    "connecting" => SessionEvent::Connecting,
                    "progress" => SessionEvent::Progress,
                    "failed" => SessionEvent::Failed {
                        originator: originator_of(&data),
                        cause: string_field(&data, "cause").unwrap_or_default(),
                    },
                    "ended" => SessionEvent::Ended {
                        originator: originator_of(&data),
                        cause: string_field(&data, "cause").unwrap_or_default(),
                    },
                    "accepted" => SessionEvent::Accepted,
                    "icecandidate" => {
                        if let Some(session) = weak_session.upgrade() {
                            *session.ice_candidate.borrow_mut() = Some(data.clone());
                        }
                        SessionEvent::IceCandidate
                    }
                    _ => SessionEvent::Sdp {
                        originator: originator_of(&data),
                    },
                };

                shared.emit(AgentEvent::Session { id, event });
            }) as Box<dyn FnMut(JsValue)>);

            session
                .inner
                .on(name, listener.as_ref().unchecked_ref());
            listeners.push(listener);
        }
    }
}

/// JsSIP `RTCSession` wrapper
pub struct JsSipSession {
    id: SessionId,
    inner: JsRtcSession,
    /// Last `icecandidate` event payload, its `ready()` ends gathering
    ice_candidate: RefCell<Option<JsValue>>,
    listeners: RefCell<Vec<Listener>>,
}

impl RtcSession for JsSipSession {
    fn id(&self) -> SessionId {
        self.id
    }

    fn remote_identity(&self) -> String {
        let identity = self.inner.remote_identity();
        Reflect::get(&identity, &"uri".into())
            .ok()
            .filter(|uri| !uri.is_undefined())
            .and_then(|uri| {
                Reflect::get(&uri, &"toString".into())
                    .ok()
                    .and_then(|f| f.dyn_into::<Function>().ok())
                    .and_then(|f| f.call0(&uri).ok())
                    .and_then(|s| s.as_string())
            })
            .unwrap_or_default()
    }

    fn answer(&self, options: AnswerOptions) -> AgentResult<()> {
        self.inner
            .answer(&to_js(&options)?)
            .map_err(|e| AgentError::Session(js_message(&e)))
    }

    fn terminate(&self, options: Option<TerminateOptions>) -> AgentResult<()> {
        let options = match options {
            Some(options) => to_js(&options)?,
            None => JsValue::UNDEFINED,
        };
        self.inner
            .terminate(&options)
            .map_err(|e| AgentError::Session(js_message(&e)))
    }

    fn finish_ice_gathering(&self) {
        let Some(data) = self.ice_candidate.borrow_mut().take() else {
            return;
        };

        let ready = Reflect::get(&data, &"ready".into())
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok());
        match ready {
            Some(ready) => {
                if let Err(e) = ready.call0(&data) {
                    tracing::warn!("icecandidate ready() failed: {}", js_message(&e));
                }
            }
            None => tracing::warn!("icecandidate event without ready()"),
        }
    }
}

/// JsSIP `UA` wrapper
pub struct JsSipAgent {
    ua: JsUa,
    shared: Rc<Shared>,
    listeners: RefCell<Vec<Listener>>,
}

impl JsSipAgent {
    /// Construct the JsSIP UA and subscribe to its events
    pub fn new(config: &UaConfig) -> AgentResult<(Self, AgentEvents)> {
        let socket = WebSocketInterface::new(&config.socket.uri)
            .map_err(|e| AgentError::InvalidConfig(js_message(&e)))?;
        if let Some(via) = &config.socket.via_transport {
            let _ = Reflect::set(&socket, &"via_transport".into(), &via.into());
        }

        let configuration = to_js(config)?;
        let sockets = js_sys::Array::of1(&socket);
        Reflect::set(&configuration, &"sockets".into(), &sockets)
            .map_err(|e| AgentError::InvalidConfig(js_message(&e)))?;

        let ua = JsUa::new(&configuration).map_err(|e| AgentError::InvalidConfig(js_message(&e)))?;

        let (tx, rx) = event_channel();
        let agent = Self {
            ua,
            shared: Rc::new(Shared {
                events: tx,
                sessions: RefCell::new(HashMap::new()),
                next_id: Cell::new(1),
            }),
            listeners: RefCell::new(Vec::new()),
        };
        agent.subscribe();

        tracing::info!("JsSIP UA created for {}", config.uri);
        Ok((agent, rx))
    }

    fn listen(&self, name: &str, mut handler: impl FnMut(&Rc<Shared>, JsValue) + 'static) {
        let shared = Rc::downgrade(&self.shared);
        let listener = Closure::wrap(Box::new(move |data: JsValue| {
            if let Some(shared) = shared.upgrade() {
                handler(&shared, data);
            }
        }) as Box<dyn FnMut(JsValue)>);

        self.ua.on(name, listener.as_ref().unchecked_ref());
        self.listeners.borrow_mut().push(listener);
    }

    fn subscribe(&self) {
        self.listen("connecting", |shared, _| shared.emit(AgentEvent::Connecting));
        self.listen("connected", |shared, _| shared.emit(AgentEvent::Connected));
        self.listen("disconnected", |shared, _| shared.emit(AgentEvent::Disconnected));
        self.listen("registered", |shared, _| shared.emit(AgentEvent::Registered));
        self.listen("unregistered", |shared, _| shared.emit(AgentEvent::Unregistered));
        self.listen("registrationFailed", |shared, data| {
            shared.emit(AgentEvent::RegistrationFailed {
                cause: string_field(&data, "cause").unwrap_or_default(),
            })
        });
        self.listen("newRTCSession", |shared, data| {
            let Ok(raw) = Reflect::get(&data, &"session".into()) else {
                return;
            };
            let session = shared.session_for(raw.unchecked_into::<JsRtcSession>());
            shared.emit(AgentEvent::NewSession {
                session,
                originator: originator_of(&data),
            });
        });
    }

    /// Hook the callstats.io integration onto the UA when the page loaded it
    pub fn attach_callstats(&self, app_id: &str, app_secret: &str) {
        let hook = web_sys::window()
            .and_then(|w| Reflect::get(&w, &"callstatsjssip".into()).ok())
            .and_then(|f| f.dyn_into::<Function>().ok());

        match hook {
            Some(hook) => {
                if let Err(e) = hook.call3(&JsValue::NULL, &self.ua, &app_id.into(), &app_secret.into()) {
                    tracing::warn!("callstats setup failed: {}", js_message(&e));
                }
            }
            None => tracing::warn!("callstats enabled but callstatsjssip is not loaded"),
        }
    }
}

impl UserAgent for JsSipAgent {
    fn start(&self) {
        self.ua.start();
    }

    fn stop(&self) {
        self.ua.stop();
    }

    fn is_connected(&self) -> bool {
        self.ua.is_connected()
    }

    fn call(&self, target: &str, options: CallOptions) -> AgentResult<SessionHandle> {
        let raw = self
            .ua
            .call(target, &to_js(&options)?)
            .map_err(|e| AgentError::CallFailed(js_message(&e)))?;

        Ok(self.shared.session_for(raw))
    }

    fn unsubscribe(&self) {
        self.ua.remove_all_listeners();
        self.listeners.borrow_mut().clear();
        for (_, session) in self.shared.sessions.borrow_mut().drain() {
            session.inner.remove_all_listeners();
            session.listeners.borrow_mut().clear();
        }
        self.shared.events.close_channel();
    }
}
