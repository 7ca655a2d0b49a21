//! Fixture activation.
//!
//! [`FixtureManager::activate`] turns catalog definitions into live stubs
//! and keeps one handle per fixture name. Activation is all-or-nothing:
//! every name is looked up before the first stub is created.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::catalog::{Catalog, FixtureDefinition};
use crate::error::{FixtureError, Result};
use crate::resolver::resolve;
use crate::traits::{StubBuilder, StubEngine, StubHandle};

/// The value held in a manager slot.
#[derive(Debug, Clone)]
pub enum Activation {
    /// A live stub started by activation.
    Stub(StubHandle),
    /// An arbitrary value stored with [`FixtureManager::set`].
    Substitute(serde_json::Value),
}

impl Activation {
    pub fn as_stub(&self) -> Option<&StubHandle> {
        match self {
            Self::Stub(handle) => Some(handle),
            Self::Substitute(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Stub(_) => None,
            Self::Substitute(value) => Some(value),
        }
    }

    /// The substituted string, if the slot holds one.
    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(|v| v.as_str())
    }
}

impl From<StubHandle> for Activation {
    fn from(handle: StubHandle) -> Self {
        Self::Stub(handle)
    }
}

impl From<serde_json::Value> for Activation {
    fn from(value: serde_json::Value) -> Self {
        Self::Substitute(value)
    }
}

impl From<&str> for Activation {
    fn from(value: &str) -> Self {
        Self::Substitute(serde_json::Value::String(value.to_string()))
    }
}

impl From<String> for Activation {
    fn from(value: String) -> Self {
        Self::Substitute(serde_json::Value::String(value))
    }
}

impl PartialEq<&str> for Activation {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

#[derive(Default)]
struct Slots {
    order: Vec<String>,
    entries: HashMap<String, Activation>,
}

impl Slots {
    fn insert(&mut self, name: &str, activation: Activation) {
        if self.entries.insert(name.to_string(), activation).is_none() {
            self.order.push(name.to_string());
        }
    }
}

/// The fixtures started by one activation.
///
/// This is a handle: clones refer to the same manager, which is what
/// dynamic fixture handlers receive. Separate calls to
/// [`FixtureManager::new`] or [`FixtureManager::activate`] produce
/// independent managers.
#[derive(Clone, Default)]
pub struct FixtureManager {
    slots: Arc<Mutex<Slots>>,
}

impl FixtureManager {
    /// Create a manager with no started fixtures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the named fixtures from `catalog` on `engine`.
    ///
    /// Names are processed in order. Every name is looked up before any
    /// stub is created, so a missing name leaves the engine untouched.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::NotFound`] for the first name that is not
    /// registered in `catalog`.
    #[tracing::instrument(skip(catalog, engine, names), fields(namespace = %catalog.namespace()))]
    pub fn activate<E, S>(catalog: &Catalog, engine: &E, names: &[S]) -> Result<Self>
    where
        E: StubEngine,
        S: AsRef<str>,
    {
        let definitions: Vec<(&str, FixtureDefinition)> = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                catalog
                    .get(name)
                    .map(|definition| (name, definition))
                    .ok_or_else(|| FixtureError::NotFound {
                        entity_type: "Fixture",
                        name: name.to_string(),
                        hint: format!(
                            "register it in namespace '{}' before activating",
                            catalog.namespace()
                        ),
                    })
            })
            .collect::<Result<_>>()?;

        let manager = Self::new();
        for (name, definition) in definitions {
            let responder = resolve(&definition.response, &manager);
            let handle = engine
                .create_stub(definition.verb, definition.pattern)
                .set_response(responder);

            tracing::trace!(fixture = name, "Started stub");
            manager.set(name, handle);
        }

        tracing::info!(fixtures = ?manager.started_fixtures(), "Activated fixtures");
        Ok(manager)
    }

    /// The value stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::NotFound`] if nothing was activated or set
    /// under `name` on this manager, even if the catalog knows the name.
    pub fn get(&self, name: &str) -> Result<Activation> {
        self.slots()
            .entries
            .get(name)
            .cloned()
            .ok_or_else(|| FixtureError::NotFound {
                entity_type: "Activated fixture",
                name: name.to_string(),
                hint: "it was not started on this manager".to_string(),
            })
    }

    /// The stub handle stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::NotFound`] as [`FixtureManager::get`] does,
    /// or [`FixtureError::NotAStub`] if the slot holds a substitute.
    pub fn stub(&self, name: &str) -> Result<StubHandle> {
        match self.get(name)? {
            Activation::Stub(handle) => Ok(handle),
            Activation::Substitute(_) => Err(FixtureError::NotAStub(name.to_string())),
        }
    }

    /// Store `value` under `name`, replacing whatever was there.
    pub fn set(&self, name: &str, value: impl Into<Activation>) {
        self.slots().insert(name, value.into());
    }

    /// Names with a slot, in the order they were first stored.
    pub fn started_fixtures(&self) -> Vec<String> {
        self.slots().order.clone()
    }

    pub fn len(&self) -> usize {
        self.slots().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots().entries.is_empty()
    }

    /// Whether two handles refer to the same manager.
    pub fn same_manager(&self, other: &FixtureManager) -> bool {
        Arc::ptr_eq(&self.slots, &other.slots)
    }

    fn slots(&self) -> MutexGuard<'_, Slots> {
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for FixtureManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixtureManager")
            .field("started_fixtures", &self.started_fixtures())
            .finish()
    }
}
