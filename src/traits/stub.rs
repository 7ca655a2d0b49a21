//! Stub engine seam and the handles it hands back.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::{RequestDescription, UrlPattern, Verb};
use crate::resolver::Responder;

/// An HTTP interception engine that can start stubs.
///
/// Activation calls [`StubEngine::create_stub`] once per fixture and
/// finishes the stub with [`StubBuilder::set_response`]. Implement this
/// for any engine that can intercept requests; the crate ships one in
/// [`crate::mock_server::MockServer`].
pub trait StubEngine {
    /// Builder returned for a single stub.
    type Builder: StubBuilder;

    /// Begin a stub for requests matching `verb` and `pattern`.
    fn create_stub(&self, verb: Verb, pattern: UrlPattern) -> Self::Builder;
}

/// Second half of stub creation: attaches the response and starts the stub.
pub trait StubBuilder {
    /// Start the stub and return its handle.
    fn set_response(self, responder: Responder) -> StubHandle;
}

/// Handle to one live stub.
///
/// Cloning is cheap; clones observe the same request history. Engines
/// record every request they answer through [`StubHandle::record`].
#[derive(Clone)]
pub struct StubHandle {
    inner: Arc<StubRecord>,
}

struct StubRecord {
    verb: Verb,
    pattern: UrlPattern,
    requests: Mutex<Vec<RequestDescription>>,
}

impl StubHandle {
    /// Create a handle with an empty request history.
    pub fn new(verb: Verb, pattern: UrlPattern) -> Self {
        Self {
            inner: Arc::new(StubRecord {
                verb,
                pattern,
                requests: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn verb(&self) -> Verb {
        self.inner.verb
    }

    pub fn pattern(&self) -> &UrlPattern {
        &self.inner.pattern
    }

    /// Check whether a request falls under this stub.
    pub fn matches(&self, method: &str, url: &str) -> bool {
        self.inner.verb.matches(method) && self.inner.pattern.matches(url)
    }

    /// Record a request answered by this stub.
    pub fn record(&self, request: RequestDescription) {
        self.requests().push(request);
    }

    /// Number of requests answered so far.
    pub fn hits(&self) -> usize {
        self.requests().len()
    }

    /// Copies of every request answered so far, oldest first.
    pub fn received_requests(&self) -> Vec<RequestDescription> {
        self.requests().clone()
    }

    /// Whether exactly `times` requests were answered.
    pub fn was_requested(&self, times: usize) -> bool {
        self.hits() == times
    }

    /// Whether two handles refer to the same stub.
    pub fn same_stub(&self, other: &StubHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // History is plain data, so a poisoned lock is still usable.
    fn requests(&self) -> MutexGuard<'_, Vec<RequestDescription>> {
        self.inner
            .requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for StubHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StubHandle")
            .field("verb", &self.inner.verb)
            .field("pattern", &self.inner.pattern.to_string())
            .field("hits", &self.hits())
            .finish()
    }
}
