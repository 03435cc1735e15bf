use folio_core::{
    ClassMetadata, Entity, EventDispatcher, ExError, Executor, FieldType, QueryBuilder,
    QueryKind, Result, Row, StorageEventKind, Value,
};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Test entity mapped onto a `pages` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: Option<i64>,
    pub title: String,
    pub slug: String,
    pub published: bool,
    pub parent_id: Option<i64>,
}

impl Entity for Page {
    fn entity_name() -> &'static str {
        "page"
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

#[allow(dead_code)]
pub fn new_page(title: &str) -> Page {
    Page {
        id: None,
        title: title.to_string(),
        slug: title.to_lowercase().replace(' ', "-"),
        published: false,
        parent_id: None,
    }
}

#[allow(dead_code)]
pub fn page_metadata() -> ClassMetadata {
    ClassMetadata::new("page", "pages")
        .with_alias("p")
        .with_field("title", "title", FieldType::Text)
        .with_field("slug", "slug", FieldType::Text)
        .with_field("published", "is_published", FieldType::Boolean)
        .with_field("parent_id", "parent_id", FieldType::Integer)
}

/// A row as the database would return it for `page_metadata()`
#[allow(dead_code)]
pub fn page_row(id: i64, title: &str) -> Row {
    let mut row = Row::new();
    row.insert("id", id);
    row.insert("title", title);
    row.insert("slug", title.to_lowercase().replace(' ', "-"));
    row.insert("is_published", 1);
    row.insert("parent_id", Value::Null);
    row
}

/// A statement seen by `FakeExecutor`
#[derive(Debug, Clone)]
pub struct Recorded {
    pub kind: QueryKind,
    pub sql: String,
    pub parameters: BTreeMap<String, Value>,
}

/// In-memory executor that records every statement
///
/// Selects return queued result sets in order (empty once exhausted). Writes
/// return `affected`. Inserts advance the generated id.
#[derive(Default)]
pub struct FakeExecutor {
    pub statements: RefCell<Vec<Recorded>>,
    results: RefCell<VecDeque<Vec<Row>>>,
    affected: Cell<usize>,
    next_id: Cell<i64>,
    failure: RefCell<Option<ExError>>,
}

#[allow(dead_code)]
impl FakeExecutor {
    pub fn new() -> Self {
        let exec = Self::default();
        exec.affected.set(1);
        exec
    }

    pub fn queue_rows(&self, rows: Vec<Row>) {
        self.results.borrow_mut().push_back(rows);
    }

    pub fn set_affected(&self, affected: usize) {
        self.affected.set(affected);
    }

    pub fn fail_with(&self, err: ExError) {
        *self.failure.borrow_mut() = Some(err);
    }

    pub fn last(&self) -> Recorded {
        self.statements
            .borrow()
            .last()
            .cloned()
            .expect("no statement recorded")
    }

    pub fn count(&self) -> usize {
        self.statements.borrow().len()
    }

    fn record(&self, query: &QueryBuilder) -> Result<()> {
        let sql = query.get_sql()?;
        self.statements.borrow_mut().push(Recorded {
            kind: query.kind(),
            sql,
            parameters: query.parameters().clone(),
        });
        match self.failure.borrow().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Executor for FakeExecutor {
    fn fetch_all(&self, query: &QueryBuilder) -> Result<Vec<Row>> {
        self.record(query)?;
        Ok(self.results.borrow_mut().pop_front().unwrap_or_default())
    }

    fn execute(&self, query: &QueryBuilder) -> Result<usize> {
        self.record(query)?;
        if query.kind() == QueryKind::Insert {
            self.next_id.set(self.next_id.get() + 1);
        }
        Ok(self.affected.get())
    }

    fn last_insert_id(&self) -> i64 {
        self.next_id.get()
    }
}

pub type EventLog = Arc<Mutex<Vec<String>>>;

/// Dispatcher that records the name of every event it sees
#[allow(dead_code)]
pub fn recording_dispatcher() -> (EventDispatcher, EventLog) {
    let log: EventLog = Arc::new(Mutex::new(Vec::new()));
    let mut events = EventDispatcher::new();
    for kind in StorageEventKind::ALL {
        let log = log.clone();
        events.add_listener(kind, 0, move |event| {
            log.lock().unwrap().push(event.kind().name().to_string());
            Ok(())
        });
    }
    (events, log)
}

#[allow(dead_code)]
pub fn drain(log: &EventLog) -> Vec<String> {
    std::mem::take(&mut *log.lock().unwrap())
}
