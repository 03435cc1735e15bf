use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers can match on without
/// parsing messages. Driver failures all land in `Persistence`; the other
/// kinds are raised by Folio itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    InvalidInput,
    InvalidIdentifier,
    InvalidQuery,
    MissingMapping,
    DuplicateMapping,

    // Mapping
    Hydration,
    Serialization,

    // Events
    Listener,

    // Integration/IO
    Config,
    Io,
    Persistence,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidIdentifier => "ERR_INVALID_IDENTIFIER",
            ExErrorKind::InvalidQuery => "ERR_INVALID_QUERY",
            ExErrorKind::MissingMapping => "ERR_MISSING_MAPPING",
            ExErrorKind::DuplicateMapping => "ERR_DUPLICATE_MAPPING",
            ExErrorKind::Hydration => "ERR_HYDRATION",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Listener => "ERR_LISTENER",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind for programmatic handling and optional
/// context (operation, entity, column) for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity: Option<String>,
    column: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity: None,
            column: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity name context
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Add column context
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity name context, if any
    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    /// Get the column context, if any
    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity) = &self.entity {
            write!(f, " (entity: {})", entity)?;
        }
        if let Some(column) = &self.column {
            write!(f, " (column: {})", column)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Failures raised by Folio itself, as opposed to the database driver
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FolioError {
    /// A table, alias, column or parameter name is not a plain SQL identifier
    #[error("Invalid SQL identifier: {name:?}")]
    InvalidIdentifier { name: String },

    /// A write statement was rendered before its target table was set
    #[error("{statement} statement has no target table")]
    MissingTable { statement: String },

    /// A select statement was rendered without a FROM clause
    #[error("SELECT statement has no FROM clause")]
    MissingFrom,

    /// An insert or update statement has nothing to write
    #[error("{statement} statement on {table} has no column assignments")]
    EmptyAssignments { statement: String, table: String },

    /// No metadata registered for an entity
    #[error("No class metadata registered for entity {entity}")]
    MetadataNotFound { entity: String },

    /// Metadata registered twice for the same entity
    #[error("Class metadata already registered for entity {entity}")]
    MetadataAlreadyRegistered { entity: String },

    /// Two field mappings share a column or field name
    #[error("Entity {entity} maps {name} more than once")]
    DuplicateFieldMapping { entity: String, name: String },

    /// A row could not be converted into an entity
    #[error("Failed to hydrate {entity}: {reason}")]
    HydrationFailed { entity: String, reason: String },

    /// A column value does not fit the mapped field type
    #[error("Column {column} of {entity} holds a value incompatible with {expected}")]
    TypeMismatch {
        entity: String,
        column: String,
        expected: String,
    },

    /// An entity could not be turned into column values
    #[error("Failed to serialize {entity}: {reason}")]
    SerializationFailed { entity: String, reason: String },

    /// A storage event listener returned an error
    #[error("Listener for {event} failed: {reason}")]
    ListenerFailed { event: String, reason: String },
}

/// Conversion from FolioError to ExError
impl From<FolioError> for ExError {
    fn from(err: FolioError) -> Self {
        let message = err.to_string();
        match err {
            FolioError::InvalidIdentifier { .. } => {
                ExError::new(ExErrorKind::InvalidIdentifier).with_message(message)
            }
            FolioError::MissingTable { .. }
            | FolioError::MissingFrom
            | FolioError::EmptyAssignments { .. } => {
                ExError::new(ExErrorKind::InvalidQuery).with_message(message)
            }
            FolioError::MetadataNotFound { entity } => ExError::new(ExErrorKind::MissingMapping)
                .with_entity(entity)
                .with_message(message),
            FolioError::MetadataAlreadyRegistered { entity } => {
                ExError::new(ExErrorKind::DuplicateMapping)
                    .with_entity(entity)
                    .with_message(message)
            }
            FolioError::DuplicateFieldMapping { entity, .. } => {
                ExError::new(ExErrorKind::DuplicateMapping)
                    .with_entity(entity)
                    .with_message(message)
            }
            FolioError::HydrationFailed { entity, .. } => ExError::new(ExErrorKind::Hydration)
                .with_entity(entity)
                .with_message(message),
            FolioError::TypeMismatch { entity, column, .. } => {
                ExError::new(ExErrorKind::Hydration)
                    .with_entity(entity)
                    .with_column(column)
                    .with_message(message)
            }
            FolioError::SerializationFailed { entity, .. } => {
                ExError::new(ExErrorKind::Serialization)
                    .with_entity(entity)
                    .with_message(message)
            }
            FolioError::ListenerFailed { .. } => {
                ExError::new(ExErrorKind::Listener).with_message(message)
            }
        }
    }
}
