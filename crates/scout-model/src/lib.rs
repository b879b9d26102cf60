mod domain;
pub use domain::*;

mod event;
pub use event::{Event, EventKind};
