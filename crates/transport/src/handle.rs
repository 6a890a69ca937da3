//! Live view of an in-flight widget request.
//!
//! A [`RequestHandle`] is returned as soon as a request has been opened. Its
//! state advances `Opened → HeadersReceived → Loading → Done` (or straight to
//! `Done` on a transport error) and the caller's callback runs after every
//! transition.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;

use crate::{HttpResponse, Method};

/// Called after every state transition of a request.
pub type StateChangeCallback = Arc<dyn Fn(&RequestHandle) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReadyState {
    Unsent = 0,
    Opened = 1,
    HeadersReceived = 2,
    Loading = 3,
    Done = 4,
}

#[derive(Debug, Clone)]
struct HandleState {
    ready_state: ReadyState,
    /// 0 until headers arrive, and after a transport error.
    status: u16,
    headers: Vec<(String, String)>,
    response_text: String,
    error: Option<String>,
}

struct Inner {
    method: Method,
    url: String,
    state: Mutex<HandleState>,
    ready_tx: watch::Sender<ReadyState>,
    callback: Option<StateChangeCallback>,
}

#[derive(Clone)]
pub struct RequestHandle {
    inner: Arc<Inner>,
}

impl RequestHandle {
    pub(crate) fn new(method: Method, url: String, callback: Option<StateChangeCallback>) -> Self {
        let (ready_tx, _) = watch::channel(ReadyState::Unsent);
        Self {
            inner: Arc::new(Inner {
                method,
                url,
                state: Mutex::new(HandleState {
                    ready_state: ReadyState::Unsent,
                    status: 0,
                    headers: Vec::new(),
                    response_text: String::new(),
                    error: None,
                }),
                ready_tx,
                callback,
            }),
        }
    }

    pub fn method(&self) -> Method {
        self.inner.method
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    pub fn is_async(&self) -> bool {
        self.inner.callback.is_some()
    }

    pub fn ready_state(&self) -> ReadyState {
        self.lock().ready_state
    }

    pub fn status(&self) -> u16 {
        self.lock().status
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.lock()
            .headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }

    pub fn response_text(&self) -> String {
        self.lock().response_text.clone()
    }

    /// The transport error that ended the request, if any.
    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn is_done(&self) -> bool {
        self.ready_state() == ReadyState::Done
    }

    /// Done with a 2xx status.
    pub fn is_success(&self) -> bool {
        let state = self.lock();
        state.ready_state == ReadyState::Done && (200..300).contains(&state.status)
    }

    /// Resolves once the request reached `Done` and the callback has seen it.
    pub async fn wait(&self) {
        let mut rx = self.inner.ready_tx.subscribe();
        // The sender lives in `inner`, so the channel cannot close here.
        let _ = rx.wait_for(|state| *state == ReadyState::Done).await;
    }

    pub(crate) fn open(&self) {
        self.transition(ReadyState::Opened, |_| {});
    }

    pub(crate) fn complete(&self, response: HttpResponse) {
        let HttpResponse {
            status,
            headers,
            body,
        } = response;
        self.transition(ReadyState::HeadersReceived, |state| {
            state.status = status;
            state.headers = headers;
        });
        self.transition(ReadyState::Loading, |_| {});
        self.transition(ReadyState::Done, |state| state.response_text = body);
    }

    pub(crate) fn fail(&self, error: String) {
        self.transition(ReadyState::Done, |state| {
            state.status = 0;
            state.error = Some(error);
        });
    }

    /// Releases waiters when the task driving the request died. The
    /// callback is not invoked; a response that already reached `Done` is
    /// kept.
    pub(crate) fn abandon(&self, error: String) {
        if *self.inner.ready_tx.borrow() == ReadyState::Done {
            return;
        }
        {
            let mut state = self.lock();
            if state.ready_state != ReadyState::Done {
                state.status = 0;
                state.error = Some(error);
                state.ready_state = ReadyState::Done;
            }
        }
        self.inner.ready_tx.send_replace(ReadyState::Done);
    }

    fn transition(&self, next: ReadyState, update: impl FnOnce(&mut HandleState)) {
        {
            let mut state = self.lock();
            update(&mut state);
            state.ready_state = next;
        }
        if let Some(callback) = &self.inner.callback {
            callback(self);
        }
        self.inner.ready_tx.send_replace(next);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HandleState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for RequestHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("RequestHandle")
            .field("method", &self.inner.method)
            .field("url", &self.inner.url)
            .field("ready_state", &state.ready_state)
            .field("status", &state.status)
            .finish()
    }
}
