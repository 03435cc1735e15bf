use folio_core::{ClassMetadata, Entity, FieldType};
use folio_store::EntityManager;
use serde::{Deserialize, Serialize};

pub const SCHEMA: &str = "
    CREATE TABLE pages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        slug TEXT NOT NULL UNIQUE,
        is_published INTEGER NOT NULL DEFAULT 0,
        parent_id INTEGER REFERENCES pages(id),
        rating REAL,
        tags TEXT
    );
";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: Option<i64>,
    pub title: String,
    pub slug: String,
    pub published: bool,
    pub parent_id: Option<i64>,
    pub rating: Option<f64>,
    pub tags: Vec<String>,
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
pub fn page(title: &str) -> Page {
    Page {
        id: None,
        title: title.to_string(),
        slug: title.to_lowercase().replace(' ', "-"),
        published: false,
        parent_id: None,
        rating: None,
        tags: Vec::new(),
    }
}

pub fn page_metadata() -> ClassMetadata {
    ClassMetadata::new("page", "pages")
        .with_alias("p")
        .with_field("title", "title", FieldType::Text)
        .with_field("slug", "slug", FieldType::Text)
        .with_field("published", "is_published", FieldType::Boolean)
        .with_field("parent_id", "parent_id", FieldType::Integer)
        .with_field("rating", "rating", FieldType::Float)
        .with_field("tags", "tags", FieldType::Json)
}

/// In-memory manager with the pages table and metadata registered
#[allow(dead_code)]
pub fn setup_manager() -> EntityManager {
    let mut manager = EntityManager::open_in_memory().unwrap();
    folio_store::db::configure(manager.connection()).unwrap();
    manager.connection().execute_batch(SCHEMA).unwrap();
    manager.register(page_metadata()).unwrap();
    manager
}

/// Save one page per title, in order
#[allow(dead_code)]
pub fn seed(manager: &EntityManager, titles: &[&str]) -> Vec<Page> {
    let repo = manager.repository::<Page>().unwrap();
    titles
        .iter()
        .map(|title| {
            let mut p = page(title);
            repo.save(&mut p).unwrap();
            p
        })
        .collect()
}
