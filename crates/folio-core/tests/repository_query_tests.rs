mod common;

use common::{new_page, page_metadata, page_row, FakeExecutor, Page};
use folio_core::{
    Criteria, EventDispatcher, ExErrorKind, OrderBy, QueryKind, Repository, Row, Value,
};

const LOAD_SQL: &str = "SELECT p.id AS id, p.title AS title, p.slug AS slug, \
                        p.is_published AS is_published, p.parent_id AS parent_id FROM pages p";

// ===== FIND =====

#[test]
fn test_find_constrains_the_identifier() {
    let exec = FakeExecutor::new();
    exec.queue_rows(vec![page_row(7, "Contact")]);
    let meta = page_metadata();
    let events = EventDispatcher::new();
    let repo: Repository<Page> = Repository::new(&exec, &meta, &events);

    let page = repo.find(7).unwrap().unwrap();

    assert_eq!(page.id, Some(7));
    assert_eq!(page.title, "Contact");
    assert!(page.published);
    assert_eq!(page.parent_id, None);

    let stmt = exec.last();
    assert_eq!(stmt.sql, format!("{} WHERE p.id = :__identifier", LOAD_SQL));
    assert_eq!(stmt.parameters.get("__identifier"), Some(&Value::Integer(7)));
}

#[test]
fn test_find_missing_is_none() {
    let exec = FakeExecutor::new();
    let meta = page_metadata();
    let events = EventDispatcher::new();
    let repo: Repository<Page> = Repository::new(&exec, &meta, &events);

    assert_eq!(repo.find(12345).unwrap(), None);
}

#[test]
fn test_find_uses_the_first_row() {
    let exec = FakeExecutor::new();
    exec.queue_rows(vec![page_row(1, "First"), page_row(1, "Second")]);
    let meta = page_metadata();
    let events = EventDispatcher::new();
    let repo: Repository<Page> = Repository::new(&exec, &meta, &events);

    assert_eq!(repo.find(1).unwrap().unwrap().title, "First");
}

// ===== FIND_BY =====

#[test]
fn test_find_by_renders_equality_order_and_window() {
    let exec = FakeExecutor::new();
    let meta = page_metadata();
    let events = EventDispatcher::new();
    let repo: Repository<Page> = Repository::new(&exec, &meta, &events);

    let criteria = Criteria::new().with("published", true).with("slug", "home");
    repo.find_by(&criteria, Some(&OrderBy::desc("title")), Some(10), Some(20))
        .unwrap();

    let stmt = exec.last();
    assert_eq!(
        stmt.sql,
        format!(
            "{} WHERE p.is_published = :__criteria_is_published \
             AND p.slug = :__criteria_slug \
             ORDER BY p.title DESC LIMIT 10 OFFSET 20",
            LOAD_SQL
        )
    );
    assert_eq!(stmt.parameters.len(), 2);
    assert_eq!(stmt.parameters.get("__criteria_is_published"), Some(&Value::Integer(1)));
    assert_eq!(stmt.parameters.get("__criteria_slug"), Some(&Value::from("home")));
}

#[test]
fn test_find_by_null_criteria_uses_is_null() {
    let exec = FakeExecutor::new();
    let meta = page_metadata();
    let events = EventDispatcher::new();
    let repo: Repository<Page> = Repository::new(&exec, &meta, &events);

    let criteria = Criteria::new().with("parent_id", Value::Null);
    repo.find_by(&criteria, None, None, None).unwrap();

    let stmt = exec.last();
    assert_eq!(stmt.sql, format!("{} WHERE p.parent_id IS NULL", LOAD_SQL));
    assert!(stmt.parameters.is_empty());
}

#[test]
fn test_find_all_equals_find_by_with_no_criteria() {
    let exec = FakeExecutor::new();
    exec.queue_rows(vec![page_row(1, "A"), page_row(2, "B")]);
    exec.queue_rows(vec![page_row(1, "A"), page_row(2, "B")]);
    let meta = page_metadata();
    let events = EventDispatcher::new();
    let repo: Repository<Page> = Repository::new(&exec, &meta, &events);

    let all = repo.find_all().unwrap();
    let all_sql = exec.last().sql;
    let by = repo.find_by(&Criteria::new(), None, None, None).unwrap();
    let by_sql = exec.last().sql;

    assert_eq!(all, by);
    assert_eq!(all_sql, by_sql);
    assert_eq!(all_sql, LOAD_SQL);
}

#[test]
fn test_find_one_by_limits_to_one_row() {
    let exec = FakeExecutor::new();
    exec.queue_rows(vec![page_row(4, "Only")]);
    let meta = page_metadata();
    let events = EventDispatcher::new();
    let repo: Repository<Page> = Repository::new(&exec, &meta, &events);

    let page = repo
        .find_one_by(&Criteria::new().with("slug", "only"), Some(&OrderBy::asc("id")))
        .unwrap();

    assert_eq!(page.map(|p| p.id), Some(Some(4)));
    assert_eq!(
        exec.last().sql,
        format!("{} WHERE p.slug = :__criteria_slug ORDER BY p.id ASC LIMIT 1", LOAD_SQL)
    );
    assert_eq!(repo.find_one_by(&Criteria::new(), None).unwrap(), None);
}

#[test]
fn test_unsafe_criteria_key_never_reaches_the_executor() {
    let exec = FakeExecutor::new();
    let meta = page_metadata();
    let events = EventDispatcher::new();
    let repo: Repository<Page> = Repository::new(&exec, &meta, &events);

    let criteria = Criteria::new().with("slug OR 1=1 --", "x");
    let err = repo.find_by(&criteria, None, None, None).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::InvalidIdentifier);
    assert_eq!(exec.count(), 0);
}

#[test]
fn test_find_with_runs_a_caller_query() {
    let exec = FakeExecutor::new();
    exec.queue_rows(vec![page_row(2, "Child")]);
    let meta = page_metadata();
    let events = EventDispatcher::new();
    let repo: Repository<Page> = Repository::new(&exec, &meta, &events);

    let mut query = repo.create_query_builder();
    query.where_clause("p.parent_id = :parent").set_parameter("parent", 1);
    let pages = repo.find_with(&query).unwrap();

    assert_eq!(pages.len(), 1);
    assert_eq!(
        exec.last().sql,
        "SELECT p.* FROM pages p WHERE p.parent_id = :parent"
    );
}

// ===== WRITES =====

#[test]
fn test_insert_binds_every_mapped_field() {
    let exec = FakeExecutor::new();
    let meta = page_metadata();
    let events = EventDispatcher::new();
    let repo: Repository<Page> = Repository::new(&exec, &meta, &events);

    let mut page = new_page("Blog Index");
    page.parent_id = Some(1);
    repo.save(&mut page).unwrap();

    let stmt = exec.last();
    assert_eq!(stmt.kind, QueryKind::Insert);
    assert_eq!(
        stmt.sql,
        "INSERT INTO pages (title, slug, is_published, parent_id) \
         VALUES (:title, :slug, :is_published, :parent_id)"
    );
    assert_eq!(stmt.parameters.get("slug"), Some(&Value::from("blog-index")));
    assert_eq!(stmt.parameters.get("__criteria_is_published"), Some(&Value::Integer(0)));
    assert_eq!(stmt.parameters.get("parent_id"), Some(&Value::Integer(1)));
}

#[test]
fn test_update_targets_the_identifier() {
    let exec = FakeExecutor::new();
    let meta = page_metadata();
    let events = EventDispatcher::new();
    let repo: Repository<Page> = Repository::new(&exec, &meta, &events);

    let mut page = new_page("Pricing");
    page.id = Some(8);
    repo.save(&mut page).unwrap();

    let stmt = exec.last();
    assert_eq!(
        stmt.sql,
        "UPDATE pages SET title = :title, slug = :slug, is_published = :is_published, \
         parent_id = :parent_id WHERE id = :__identifier"
    );
    assert_eq!(stmt.parameters.get("__identifier"), Some(&Value::Integer(8)));
    assert!(!stmt.parameters.contains_key("id"));
}

#[test]
fn test_update_without_identifier_matches_nothing() {
    let exec = FakeExecutor::new();
    exec.set_affected(0);
    let meta = page_metadata();
    let events = EventDispatcher::new();
    let repo: Repository<Page> = Repository::new(&exec, &meta, &events);

    let mut page = new_page("Detached");
    assert_eq!(repo.update(&mut page).unwrap(), 0);
    assert_eq!(exec.last().parameters.get("__identifier"), Some(&Value::Null));
    assert_eq!(page.id, None);
}

#[test]
fn test_delete_targets_the_identifier() {
    let exec = FakeExecutor::new();
    let meta = page_metadata();
    let events = EventDispatcher::new();
    let repo: Repository<Page> = Repository::new(&exec, &meta, &events);

    let mut page = new_page("Gone");
    page.id = Some(11);
    repo.delete(&page).unwrap();

    let stmt = exec.last();
    assert_eq!(stmt.sql, "DELETE FROM pages WHERE id = :__identifier");
    assert_eq!(stmt.parameters.get("__identifier"), Some(&Value::Integer(11)));
}

// ===== HYDRATION FAILURES =====

#[test]
fn test_row_missing_a_required_column_fails_hydration() {
    let exec = FakeExecutor::new();
    let mut row = Row::new();
    row.insert("id", 1);
    row.insert("slug", "no-title");
    row.insert("is_published", 0);
    exec.queue_rows(vec![row]);
    let meta = page_metadata();
    let events = EventDispatcher::new();
    let repo: Repository<Page> = Repository::new(&exec, &meta, &events);

    let err = repo.find(1).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Hydration);
    assert_eq!(err.entity(), Some("page"));
}
