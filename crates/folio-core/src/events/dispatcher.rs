//! Event dispatcher shared by repositories

use crate::errors::{ExError, FolioError, Result};
use crate::events::{StorageEvent, StorageEventKind};
use std::collections::BTreeMap;

/// A registered event listener
///
/// Returning an error aborts the surrounding repository operation.
pub type Listener = Box<dyn Fn(&mut StorageEvent<'_>) -> Result<()> + Send + Sync>;

struct Registered {
    priority: i32,
    listener: Listener,
}

/// Routes storage events to listeners
///
/// Listeners with a higher priority run first; equal priorities run in
/// registration order. A listener may call `stop_propagation()` to skip the
/// rest.
///
/// # Example
///
/// ```
/// use folio_core::events::{EventDispatcher, StorageEventKind};
///
/// let mut events = EventDispatcher::new();
/// events.add_listener(StorageEventKind::PreSave, 0, |event| {
///     assert!(event.is_create().is_some());
///     Ok(())
/// });
/// assert!(events.has_listeners(StorageEventKind::PreSave));
/// assert!(!events.has_listeners(StorageEventKind::PreDelete));
/// ```
#[derive(Default)]
pub struct EventDispatcher {
    listeners: BTreeMap<StorageEventKind, Vec<Registered>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener<F>(&mut self, kind: StorageEventKind, priority: i32, listener: F)
    where
        F: Fn(&mut StorageEvent<'_>) -> Result<()> + Send + Sync + 'static,
    {
        let slot = self.listeners.entry(kind).or_default();
        let position = slot
            .iter()
            .position(|r| r.priority < priority)
            .unwrap_or(slot.len());
        slot.insert(
            position,
            Registered {
                priority,
                listener: Box::new(listener),
            },
        );
    }

    pub fn has_listeners(&self, kind: StorageEventKind) -> bool {
        self.listener_count(kind) > 0
    }

    pub fn listener_count(&self, kind: StorageEventKind) -> usize {
        self.listeners.get(&kind).map(Vec::len).unwrap_or(0)
    }

    /// Run every listener registered for `kind`
    ///
    /// # Errors
    ///
    /// The first listener error, wrapped as `ExErrorKind::Listener` with the
    /// original error as its source. Later listeners do not run.
    pub fn dispatch(&self, kind: StorageEventKind, event: &mut StorageEvent<'_>) -> Result<()> {
        let Some(listeners) = self.listeners.get(&kind) else {
            return Ok(());
        };

        tracing::debug!(
            event = kind.name(),
            entity = event.entity_name(),
            listeners = listeners.len(),
            "dispatching storage event"
        );

        for registered in listeners {
            if event.is_propagation_stopped() {
                tracing::debug!(event = kind.name(), "propagation stopped");
                break;
            }
            (registered.listener)(event).map_err(|source| {
                ExError::from(FolioError::ListenerFailed {
                    event: kind.name().to_string(),
                    reason: source.message().to_string(),
                })
                .with_entity(event.entity_name())
                .with_source(source)
            })?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: BTreeMap<&str, usize> = self
            .listeners
            .iter()
            .map(|(kind, l)| (kind.name(), l.len()))
            .collect();
        f.debug_struct("EventDispatcher")
            .field("listeners", &counts)
            .finish()
    }
}
