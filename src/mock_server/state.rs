//! Active stub table.
//!
//! Holds every stub started on a mock server. Stubs are created from
//! synchronous activation code and read from request handlers, so the
//! table sits behind a `std::sync::Mutex` rather than an async lock.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::resolver::Responder;
use crate::traits::StubHandle;

/// A started stub and the responder that answers for it.
#[derive(Debug, Clone)]
pub struct ActiveStub {
    pub handle: StubHandle,
    pub responder: Responder,
}

/// Shared state for the mock server.
#[derive(Debug)]
pub struct MockState {
    stubs: Vec<ActiveStub>,
    unmatched_status: u16,
}

/// State shared between the server and its stub builders.
pub type SharedState = Arc<Mutex<MockState>>;

impl MockState {
    /// Create a table with no stubs.
    pub fn new(unmatched_status: u16) -> Self {
        Self {
            stubs: Vec::new(),
            unmatched_status,
        }
    }

    /// Wrap the state for sharing.
    pub fn shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }

    /// Add a started stub.
    pub fn add_stub(&mut self, handle: StubHandle, responder: Responder) {
        self.stubs.push(ActiveStub { handle, responder });
    }

    /// The most recently added stub matching the request.
    pub fn find(&self, method: &str, url: &str) -> Option<ActiveStub> {
        self.stubs
            .iter()
            .rev()
            .find(|stub| stub.handle.matches(method, url))
            .cloned()
    }

    /// Drop every stub.
    pub fn clear(&mut self) {
        self.stubs.clear();
    }

    pub fn len(&self) -> usize {
        self.stubs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stubs.is_empty()
    }

    pub fn unmatched_status(&self) -> u16 {
        self.unmatched_status
    }
}

/// Lock shared state, recovering from poisoning.
pub fn lock(state: &SharedState) -> MutexGuard<'_, MockState> {
    state
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
