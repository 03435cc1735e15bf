//! Entity repository
//!
//! A `Repository` binds one entity type to its metadata and orchestrates the
//! loader, persister and hydrator around the storage lifecycle events.
//!
//! ## Logging Ownership
//!
//! Public operations own their boundary events (`log_op_start!`,
//! `log_op_end!`, `log_op_error!`). Operations that call each other go through
//! private `*_impl` helpers so every call logs exactly one start and one end.
//!
//! ## Event Ordering
//!
//! - `save`: insert-or-update is decided from `Entity::id()`, then
//!   `PreSave` → statement → `PostSave`
//! - `insert` / `update`: the same pair, with the branch fixed by the caller
//! - `delete`: `PreDelete` → statement → `PostDelete`
//! - every hydrated row: `PreHydrate` → hydrator → `PostHydrate`
//!
//! Events fire whether or not the statement touched any row. A failing
//! statement or listener aborts the sequence and the error reaches the
//! caller unchanged.

use crate::errors::Result;
use crate::events::{EventDispatcher, StorageEvent, StorageEventKind, Subject};
use crate::executor::Executor;
use crate::mapping::{FieldHydrator, FieldPersister, Hydrator, Loader, MetadataLoader, Persister};
use crate::model::{ClassMetadata, Entity, Row, Value};
use crate::query::{validate_identifier, Criteria, OrderBy, QueryBuilder};
use crate::{log_op_end, log_op_error, log_op_start};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Instant;

const IDENTIFIER_PARAM: &str = "__identifier";

/// CRUD mapper for one entity type
///
/// Borrows the executor, metadata and event dispatcher, which may be shared
/// with other repositories. Owns its three mapping strategies.
pub struct Repository<'a, E> {
    executor: &'a dyn Executor,
    metadata: &'a ClassMetadata,
    events: &'a EventDispatcher,
    loader: Box<dyn Loader>,
    persister: Box<dyn Persister<E>>,
    hydrator: Box<dyn Hydrator<E>>,
}

impl<'a, E> Repository<'a, E>
where
    E: Entity + Serialize + DeserializeOwned,
{
    /// Repository with the metadata-driven default strategies
    pub fn new(
        executor: &'a dyn Executor,
        metadata: &'a ClassMetadata,
        events: &'a EventDispatcher,
    ) -> Self {
        Self::with_strategies(
            executor,
            metadata,
            events,
            MetadataLoader,
            FieldPersister,
            FieldHydrator,
        )
    }
}

impl<'a, E: Entity> Repository<'a, E> {
    /// Repository with caller-supplied strategies
    pub fn with_strategies(
        executor: &'a dyn Executor,
        metadata: &'a ClassMetadata,
        events: &'a EventDispatcher,
        loader: impl Loader + 'static,
        persister: impl Persister<E> + 'static,
        hydrator: impl Hydrator<E> + 'static,
    ) -> Self {
        Self {
            executor,
            metadata,
            events,
            loader: Box::new(loader),
            persister: Box::new(persister),
            hydrator: Box::new(hydrator),
        }
    }

    // ---------- accessors ----------

    pub fn metadata(&self) -> &ClassMetadata {
        self.metadata
    }

    pub fn entity_name(&self) -> &str {
        self.metadata.name()
    }

    pub fn table_name(&self) -> &str {
        self.metadata.table_name()
    }

    pub fn alias(&self) -> &str {
        self.metadata.alias_name()
    }

    pub fn loader(&self) -> &dyn Loader {
        self.loader.as_ref()
    }

    pub fn set_loader(&mut self, loader: impl Loader + 'static) {
        self.loader = Box::new(loader);
    }

    pub fn persister(&self) -> &dyn Persister<E> {
        self.persister.as_ref()
    }

    pub fn set_persister(&mut self, persister: impl Persister<E> + 'static) {
        self.persister = Box::new(persister);
    }

    pub fn hydrator(&self) -> &dyn Hydrator<E> {
        self.hydrator.as_ref()
    }

    pub fn set_hydrator(&mut self, hydrator: impl Hydrator<E> + 'static) {
        self.hydrator = Box::new(hydrator);
    }

    // ---------- query construction ----------

    /// `SELECT alias.* FROM table alias`
    pub fn create_query_builder(&self) -> QueryBuilder {
        let alias = self.metadata.alias_name();
        let mut qb = QueryBuilder::new();
        qb.select([format!("{}.*", alias)])
            .from(self.metadata.table_name(), alias);
        qb
    }

    /// Base query shaped by the loader
    ///
    /// # Errors
    ///
    /// Whatever the loader returns.
    pub fn get_load_query(&self) -> Result<QueryBuilder> {
        let mut qb = self.create_query_builder();
        self.loader.load(&mut qb, self.metadata)?;
        Ok(qb)
    }

    // ---------- reads ----------

    /// Load one entity by identifier; `None` when no row matches
    ///
    /// # Errors
    ///
    /// Driver, loader, hydrator or listener failures.
    pub fn find(&self, id: i64) -> Result<Option<E>> {
        self.instrumented("find", || {
            let mut qb = self.get_load_query()?;
            qb.and_where(self.identifier_condition(true)?)
                .set_parameter(IDENTIFIER_PARAM, id);
            self.fetch_one(&qb)
        })
    }

    /// Every entity of this type
    ///
    /// # Errors
    ///
    /// Same as [`Repository::find_by`].
    pub fn find_all(&self) -> Result<Vec<E>> {
        self.instrumented("find_all", || {
            self.find_by_impl(&Criteria::new(), None, None, None)
        })
    }

    /// Entities matching every `criteria` key by equality
    ///
    /// An empty result is `Ok(vec![])`, never an error.
    ///
    /// # Errors
    ///
    /// `InvalidIdentifier` for criteria or order keys that are not plain
    /// column names; driver, loader, hydrator or listener failures.
    pub fn find_by(
        &self,
        criteria: &Criteria,
        order_by: Option<&OrderBy>,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<Vec<E>> {
        self.instrumented("find_by", || {
            self.find_by_impl(criteria, order_by, limit, offset)
        })
    }

    /// First entity matching `criteria`, if any
    ///
    /// # Errors
    ///
    /// Same as [`Repository::find_by`].
    pub fn find_one_by(&self, criteria: &Criteria, order_by: Option<&OrderBy>) -> Result<Option<E>> {
        self.instrumented("find_one_by", || {
            Ok(self
                .find_by_impl(criteria, order_by, Some(1), None)?
                .into_iter()
                .next())
        })
    }

    /// Run a caller-built select and hydrate every row
    ///
    /// # Errors
    ///
    /// Driver, hydrator or listener failures.
    pub fn find_with(&self, query: &QueryBuilder) -> Result<Vec<E>> {
        self.instrumented("find_with", || self.fetch_all(query))
    }

    /// Run a caller-built select and hydrate its first row
    ///
    /// # Errors
    ///
    /// Driver, hydrator or listener failures.
    pub fn find_one_with(&self, query: &QueryBuilder) -> Result<Option<E>> {
        self.instrumented("find_one_with", || self.fetch_one(query))
    }

    // ---------- hydration ----------

    /// Convert one row, firing `PreHydrate` and `PostHydrate`
    ///
    /// # Errors
    ///
    /// Hydrator or listener failures.
    pub fn hydrate(&self, row: Row, query: &QueryBuilder) -> Result<E> {
        self.instrumented("hydrate", || self.hydrate_impl(row, query))
    }

    /// Convert every row in order
    ///
    /// # Errors
    ///
    /// The first hydrator or listener failure.
    pub fn hydrate_all(&self, rows: Vec<Row>, query: &QueryBuilder) -> Result<Vec<E>> {
        self.instrumented("hydrate_all", || self.hydrate_all_impl(rows, query))
    }

    // ---------- writes ----------

    /// Insert when the entity has no identifier, update otherwise
    ///
    /// Returns the affected row count.
    ///
    /// # Errors
    ///
    /// Driver, persister or listener failures.
    pub fn save(&self, entity: &mut E) -> Result<usize> {
        self.instrumented("save", || {
            let create = entity.id().is_none();
            self.save_with_events(entity, create)
        })
    }

    /// Insert unconditionally; assigns the generated identifier when the
    /// entity had none
    ///
    /// # Errors
    ///
    /// Driver, persister or listener failures.
    pub fn insert(&self, entity: &mut E) -> Result<usize> {
        self.instrumented("insert", || self.save_with_events(entity, true))
    }

    /// Update the row matching the entity's identifier
    ///
    /// An entity without identifier matches nothing; events still fire.
    ///
    /// # Errors
    ///
    /// Driver, persister or listener failures.
    pub fn update(&self, entity: &mut E) -> Result<usize> {
        self.instrumented("update", || self.save_with_events(entity, false))
    }

    /// Delete the row matching the entity's identifier
    ///
    /// # Errors
    ///
    /// Driver or listener failures.
    pub fn delete(&self, entity: &E) -> Result<usize> {
        self.instrumented("delete", || {
            let name = self.metadata.name();

            let mut pre = StorageEvent::new(StorageEventKind::PreDelete, name, Subject::Entity(entity));
            self.events.dispatch(StorageEventKind::PreDelete, &mut pre)?;

            let mut qb = QueryBuilder::new();
            qb.delete(self.metadata.table_name())
                .where_clause(self.identifier_condition(false)?)
                .set_parameter(IDENTIFIER_PARAM, Value::from(entity.id()));
            let affected = qb.execute(self.executor)?;

            let mut post = StorageEvent::new(StorageEventKind::PostDelete, name, Subject::Entity(entity))
                .with_query(&qb);
            self.events.dispatch(StorageEventKind::PostDelete, &mut post)?;

            Ok(affected)
        })
    }

    // ---------- internals ----------

    fn instrumented<T>(&self, op: &'static str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let entity = self.metadata.name();
        log_op_start!(op, entity = entity);
        let start = Instant::now();

        match f() {
            Ok(value) => {
                log_op_end!(
                    op,
                    duration_ms = start.elapsed().as_millis() as u64,
                    entity = entity
                );
                Ok(value)
            }
            Err(err) => {
                log_op_error!(
                    op,
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    entity = entity
                );
                Err(err)
            }
        }
    }

    fn identifier_condition(&self, qualified: bool) -> Result<String> {
        let column = validate_identifier(&self.metadata.identifier().column)?;
        Ok(if qualified {
            format!(
                "{}.{} = :{}",
                self.metadata.alias_name(),
                column,
                IDENTIFIER_PARAM
            )
        } else {
            format!("{} = :{}", column, IDENTIFIER_PARAM)
        })
    }

    fn find_by_impl(
        &self,
        criteria: &Criteria,
        order_by: Option<&OrderBy>,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<Vec<E>> {
        let mut qb = self.get_load_query()?;
        criteria.apply(&mut qb, self.metadata)?;
        if let Some(order_by) = order_by {
            order_by.apply(&mut qb, self.metadata)?;
        }
        if let Some(limit) = limit {
            qb.set_max_results(limit);
        }
        if let Some(offset) = offset {
            qb.set_first_result(offset);
        }
        self.fetch_all(&qb)
    }

    fn fetch_all(&self, query: &QueryBuilder) -> Result<Vec<E>> {
        let rows = query.fetch_all(self.executor)?;
        self.hydrate_all_impl(rows, query)
    }

    fn fetch_one(&self, query: &QueryBuilder) -> Result<Option<E>> {
        match query.fetch_all(self.executor)?.into_iter().next() {
            Some(row) => self.hydrate_impl(row, query).map(Some),
            None => Ok(None),
        }
    }

    fn hydrate_all_impl(&self, rows: Vec<Row>, query: &QueryBuilder) -> Result<Vec<E>> {
        rows.into_iter()
            .map(|row| self.hydrate_impl(row, query))
            .collect()
    }

    fn hydrate_impl(&self, mut row: Row, query: &QueryBuilder) -> Result<E> {
        let name = self.metadata.name();

        let mut pre = StorageEvent::new(StorageEventKind::PreHydrate, name, Subject::Row(&mut row))
            .with_query(query);
        self.events.dispatch(StorageEventKind::PreHydrate, &mut pre)?;

        let mut entity = self.hydrator.hydrate(&row, query, self.metadata)?;

        let mut post =
            StorageEvent::new(StorageEventKind::PostHydrate, name, Subject::EntityMut(&mut entity))
                .with_query(query);
        self.events.dispatch(StorageEventKind::PostHydrate, &mut post)?;

        Ok(entity)
    }

    fn save_with_events(&self, entity: &mut E, create: bool) -> Result<usize> {
        let name = self.metadata.name();

        let mut pre = StorageEvent::new(StorageEventKind::PreSave, name, Subject::EntityMut(&mut *entity))
            .with_create(create);
        self.events.dispatch(StorageEventKind::PreSave, &mut pre)?;

        let (qb, affected) = if create {
            self.insert_impl(entity)?
        } else {
            self.update_impl(entity)?
        };

        let mut post = StorageEvent::new(StorageEventKind::PostSave, name, Subject::Entity(&*entity))
            .with_query(&qb)
            .with_create(create);
        self.events.dispatch(StorageEventKind::PostSave, &mut post)?;

        Ok(affected)
    }

    fn insert_impl(&self, entity: &mut E) -> Result<(QueryBuilder, usize)> {
        let mut qb = QueryBuilder::new();
        qb.insert(self.metadata.table_name());
        self.persister.persist(&mut qb, entity, self.metadata)?;

        let affected = qb.execute(self.executor)?;
        if entity.id().is_none() {
            entity.set_id(self.executor.last_insert_id());
        }
        Ok((qb, affected))
    }

    fn update_impl(&self, entity: &E) -> Result<(QueryBuilder, usize)> {
        let mut qb = QueryBuilder::new();
        qb.update(self.metadata.table_name());
        self.persister.persist(&mut qb, entity, self.metadata)?;
        qb.and_where(self.identifier_condition(false)?)
            .set_parameter(IDENTIFIER_PARAM, Value::from(entity.id()));

        let affected = qb.execute(self.executor)?;
        Ok((qb, affected))
    }
}

impl<E> std::fmt::Debug for Repository<'_, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("entity", &self.metadata.name())
            .field("table", &self.metadata.table_name())
            .finish_non_exhaustive()
    }
}

