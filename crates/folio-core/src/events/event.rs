//! Event names and payloads

use crate::model::Row;
use crate::query::QueryBuilder;
use std::any::Any;

/// The six lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StorageEventKind {
    PreHydrate,
    PostHydrate,
    PreSave,
    PostSave,
    PreDelete,
    PostDelete,
}

impl StorageEventKind {
    pub const ALL: [StorageEventKind; 6] = [
        StorageEventKind::PreHydrate,
        StorageEventKind::PostHydrate,
        StorageEventKind::PreSave,
        StorageEventKind::PostSave,
        StorageEventKind::PreDelete,
        StorageEventKind::PostDelete,
    ];

    /// Stable event name
    pub fn name(&self) -> &'static str {
        match self {
            StorageEventKind::PreHydrate => "preHydrate",
            StorageEventKind::PostHydrate => "postHydrate",
            StorageEventKind::PreSave => "preSave",
            StorageEventKind::PostSave => "postSave",
            StorageEventKind::PreDelete => "preDelete",
            StorageEventKind::PostDelete => "postDelete",
        }
    }
}

impl std::fmt::Display for StorageEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// What an event is about
pub enum Subject<'a> {
    /// Raw row before hydration; listeners may rewrite it
    Row(&'a mut Row),
    /// Entity that listeners may modify (post-hydrate, pre-save)
    EntityMut(&'a mut dyn Any),
    /// Entity that is only observed (post-save, pre/post-delete)
    Entity(&'a dyn Any),
}

/// Payload passed to listeners
pub struct StorageEvent<'a> {
    kind: StorageEventKind,
    entity_name: &'a str,
    subject: Subject<'a>,
    query: Option<&'a QueryBuilder>,
    create: Option<bool>,
    propagation_stopped: bool,
}

impl<'a> StorageEvent<'a> {
    pub fn new(kind: StorageEventKind, entity_name: &'a str, subject: Subject<'a>) -> Self {
        Self {
            kind,
            entity_name,
            subject,
            query: None,
            create: None,
            propagation_stopped: false,
        }
    }

    /// Attach the query that produced (or will write) the subject
    pub fn with_query(mut self, query: &'a QueryBuilder) -> Self {
        self.query = Some(query);
        self
    }

    /// Mark a save event as insert (`true`) or update (`false`)
    pub fn with_create(mut self, create: bool) -> Self {
        self.create = Some(create);
        self
    }

    pub fn kind(&self) -> StorageEventKind {
        self.kind
    }

    pub fn entity_name(&self) -> &str {
        self.entity_name
    }

    pub fn subject(&self) -> &Subject<'a> {
        &self.subject
    }

    pub fn query(&self) -> Option<&QueryBuilder> {
        self.query
    }

    /// `Some(true)` for inserts, `Some(false)` for updates, `None` outside
    /// save events
    pub fn is_create(&self) -> Option<bool> {
        self.create
    }

    pub fn row(&self) -> Option<&Row> {
        match &self.subject {
            Subject::Row(row) => Some(&**row),
            _ => None,
        }
    }

    pub fn row_mut(&mut self) -> Option<&mut Row> {
        match &mut self.subject {
            Subject::Row(row) => Some(&mut **row),
            _ => None,
        }
    }

    /// The subject entity, if it is a `T`
    pub fn entity<T: Any>(&self) -> Option<&T> {
        match &self.subject {
            Subject::EntityMut(e) => e.downcast_ref::<T>(),
            Subject::Entity(e) => e.downcast_ref::<T>(),
            Subject::Row(_) => None,
        }
    }

    /// The subject entity, if it is a `T` and the event allows modification
    pub fn entity_mut<T: Any>(&mut self) -> Option<&mut T> {
        match &mut self.subject {
            Subject::EntityMut(e) => e.downcast_mut::<T>(),
            _ => None,
        }
    }

    /// Skip the remaining listeners for this dispatch
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}
