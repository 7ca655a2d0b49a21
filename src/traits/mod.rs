//! Boundary traits for stub engines.

mod stub;

pub use stub::{StubBuilder, StubEngine, StubHandle};
