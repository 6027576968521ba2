//! Error types and result definitions for synchronization.
//!
//! [`SyncError`] carries an [`ErrorKind`] for programmatic handling together with a static
//! description, optional dynamic detail, an optional source error and the callsite it was
//! created at. Integrity violations (out-of-order ids) are distinguishable from collaborator
//! failures through [`ErrorKind::is_integrity_violation`].

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::error;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use content_mapping_config::LoadConfigError;
use content_mapping_config::shared::ValidationError;

/// Convenient result type for synchronization operations using [`SyncError`].
pub type SyncResult<T> = Result<T, SyncError>;

/// Specific categories of errors that can occur while synchronizing.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    // Integrity Errors
    SourceIdsOutOfOrder,
    DestinationIdsOutOfOrder,

    // Mapping Errors
    InvalidMapResult,
    MappingError,

    // Collaborator Errors
    SourceError,
    DestinationError,

    // Configuration Errors
    ConfigError,

    // Serialization Errors
    SerializationError,
}

impl ErrorKind {
    /// Returns `true` for kinds raised when a collaborator breaks the ascending id contract.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(
            self,
            ErrorKind::SourceIdsOutOfOrder | ErrorKind::DestinationIdsOutOfOrder
        )
    }
}

/// Main error type for synchronization.
#[derive(Debug, Clone)]
pub struct SyncError {
    kind: ErrorKind,
    description: Cow<'static, str>,
    detail: Option<Cow<'static, str>>,
    source: Option<Arc<dyn error::Error + Send + Sync>>,
    location: &'static Location<'static>,
    backtrace: Arc<Backtrace>,
}

impl SyncError {
    /// Returns the [`ErrorKind`] of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the static description of this error.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the dynamic detail, if any was attached.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Returns the captured backtrace for this error.
    pub fn backtrace(&self) -> &Backtrace {
        self.backtrace.as_ref()
    }

    /// Returns the callsite this error was created at.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Returns `true` if this error reports an out-of-order id.
    pub fn is_integrity_violation(&self) -> bool {
        self.kind.is_integrity_violation()
    }

    /// Attaches an originating [`error::Error`] and returns the modified instance.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: error::Error + Send + Sync + 'static,
    {
        self.source = Some(Arc::new(source));
        self
    }

    #[track_caller]
    fn from_components(
        kind: ErrorKind,
        description: Cow<'static, str>,
        detail: Option<Cow<'static, str>>,
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    ) -> Self {
        SyncError {
            kind,
            description,
            detail,
            source,
            location: Location::caller(),
            backtrace: Arc::new(Backtrace::capture()),
        }
    }
}

impl PartialEq for SyncError {
    fn eq(&self, other: &SyncError) -> bool {
        self.kind == other.kind
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(
            f,
            "[{:?}] {} @ {}:{}:{}",
            self.kind,
            self.description,
            self.location.file(),
            self.location.line(),
            self.location.column()
        )?;

        if let Some(detail) = self.detail.as_deref() {
            if detail.trim().is_empty() {
                write!(f, "\n  Detail: <empty>")?;
            } else {
                write!(f, "\n  Detail:")?;
                for line in detail.lines() {
                    write!(f, "\n    {line}")?;
                }
            }
        }

        let rendered_backtrace = self.backtrace.to_string();
        if !rendered_backtrace.trim().is_empty() {
            write!(f, "\n  Backtrace:")?;
            for line in rendered_backtrace.lines() {
                write!(f, "\n    {line}")?;
            }
        }

        Ok(())
    }
}

impl error::Error for SyncError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn error::Error + 'static))
    }
}

/// Creates a [`SyncError`] from an error kind and static description.
impl From<(ErrorKind, &'static str)> for SyncError {
    #[track_caller]
    fn from((kind, desc): (ErrorKind, &'static str)) -> SyncError {
        SyncError::from_components(kind, Cow::Borrowed(desc), None, None)
    }
}

/// Creates a [`SyncError`] from an error kind, static description, and dynamic detail.
impl<D> From<(ErrorKind, &'static str, D)> for SyncError
where
    D: Into<Cow<'static, str>>,
{
    #[track_caller]
    fn from((kind, desc, detail): (ErrorKind, &'static str, D)) -> SyncError {
        SyncError::from_components(kind, Cow::Borrowed(desc), Some(detail.into()), None)
    }
}

/// Maps JSON failures, e.g. from building document fields with [`serde_json::to_value`], to
/// [`ErrorKind::SerializationError`].
impl From<serde_json::Error> for SyncError {
    #[track_caller]
    fn from(err: serde_json::Error) -> SyncError {
        let detail = err.to_string();
        SyncError::from_components(
            ErrorKind::SerializationError,
            Cow::Borrowed("JSON conversion failed"),
            Some(Cow::Owned(detail)),
            Some(Arc::new(err)),
        )
    }
}

impl From<ValidationError> for SyncError {
    #[track_caller]
    fn from(err: ValidationError) -> SyncError {
        let detail = err.to_string();
        SyncError::from_components(
            ErrorKind::ConfigError,
            Cow::Borrowed("Invalid synchronizer configuration"),
            Some(Cow::Owned(detail)),
            Some(Arc::new(err)),
        )
    }
}

impl From<LoadConfigError> for SyncError {
    #[track_caller]
    fn from(err: LoadConfigError) -> SyncError {
        let detail = err.to_string();
        SyncError::from_components(
            ErrorKind::ConfigError,
            Cow::Borrowed("Loading configuration failed"),
            Some(Cow::Owned(detail)),
            Some(Arc::new(err)),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;
    use crate::sync_error;

    #[test]
    fn out_of_order_kinds_are_integrity_violations() {
        assert!(ErrorKind::SourceIdsOutOfOrder.is_integrity_violation());
        assert!(ErrorKind::DestinationIdsOutOfOrder.is_integrity_violation());
        assert!(!ErrorKind::DestinationError.is_integrity_violation());
        assert!(!ErrorKind::InvalidMapResult.is_integrity_violation());
    }

    #[test]
    fn display_contains_kind_description_and_detail() {
        let err = sync_error!(
            ErrorKind::SourceIdsOutOfOrder,
            "Source ids are out of order",
            "id 1 after id 2"
        );

        let rendered = err.to_string();
        assert!(rendered.starts_with("[SourceIdsOutOfOrder] Source ids are out of order @ "));
        assert!(rendered.contains("id 1 after id 2"));
        assert_eq!(err.detail(), Some("id 1 after id 2"));
    }

    #[test]
    fn location_points_at_the_callsite() {
        let err = sync_error!(ErrorKind::MappingError, "boom");

        assert!(err.location().file().ends_with("error.rs"));
    }

    #[test]
    fn source_is_exposed() {
        let io = std::io::Error::other("disk on fire");
        let err = sync_error!(ErrorKind::DestinationError, "Flush failed", source: io);

        assert_eq!(err.source().unwrap().to_string(), "disk on fire");
    }

    #[test]
    fn validation_errors_become_config_errors() {
        let err = SyncError::from(ValidationError::EmptyClassName);

        assert_eq!(err.kind(), ErrorKind::ConfigError);
        assert!(err.detail().unwrap().contains("class_name"));
    }

    #[test]
    fn json_errors_are_serialization_errors() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = SyncError::from(json_err);

        assert_eq!(err.kind(), ErrorKind::SerializationError);
        assert!(err.source().is_some());
    }

    #[test]
    fn load_errors_become_config_errors() {
        let err = SyncError::from(LoadConfigError::Invalid(ValidationError::EmptyClassName));

        assert_eq!(err.kind(), ErrorKind::ConfigError);
        assert_eq!(err.description(), "Loading configuration failed");
    }

    #[test]
    fn equality_compares_kinds() {
        let a = sync_error!(ErrorKind::MappingError, "a");
        let b = sync_error!(ErrorKind::MappingError, "b");
        let c = sync_error!(ErrorKind::SourceError, "a");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
