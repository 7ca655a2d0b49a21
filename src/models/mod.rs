//! Value types shared by the catalog, the manager and stub engines.

mod pattern;
mod request;
mod response;
mod verb;

pub use pattern::*;
pub use request::*;
pub use response::*;
pub use verb::*;
