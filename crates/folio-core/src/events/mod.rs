//! Storage lifecycle events
//!
//! Six named events bracket every hydration, save and delete. They are the
//! only extension point of a repository besides the mapping strategies.

pub mod dispatcher;
pub mod event;

pub use dispatcher::{EventDispatcher, Listener};
pub use event::{StorageEvent, StorageEventKind, Subject};
