//! Entity contract

/// A domain object persisted to and from one table row
///
/// The identifier getter returns `None` for entities that were never stored.
/// `Repository::save` reads that as "insert", never as an error.
///
/// # Example
///
/// ```
/// use folio_core::model::Entity;
///
/// struct Page {
///     id: Option<i64>,
///     title: String,
/// }
///
/// impl Entity for Page {
///     fn entity_name() -> &'static str {
///         "page"
///     }
///
///     fn id(&self) -> Option<i64> {
///         self.id
///     }
///
///     fn set_id(&mut self, id: i64) {
///         self.id = Some(id);
///     }
/// }
/// ```
pub trait Entity: Sized + 'static {
    /// Name under which this entity's `ClassMetadata` is registered
    fn entity_name() -> &'static str;

    fn id(&self) -> Option<i64>;

    /// Called after an insert with the identifier the database assigned
    fn set_id(&mut self, id: i64);
}
