use context_error::{BoxedError, Context, CreateError, ErrorKind};

/// The kind of error that can occur when rebuilding identifications or matching fragments
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum TandemErrorKind {
    /// A field was present but its value could not be parsed as the expected type
    #[default]
    MalformedValue,
    /// A composite record key did not follow the `s{spectrum}_p{rank}[_d{domain}]` layout
    MalformedKey,
    /// A domain has a start offset after its end offset
    InconsistentRange,
    /// A spectrum, peptide rank, or domain was requested that was never built
    NotFound,
    /// A matching tolerance was negative or not finite
    InvalidTolerance,
}

impl ErrorKind for TandemErrorKind {
    type Settings = ();
    fn descriptor(&self) -> &'static str {
        "error"
    }
    fn ignored(&self, _settings: Self::Settings) -> bool {
        false
    }
    fn is_error(&self, _settings: Self::Settings) -> bool {
        true
    }
}

/// The error type used throughout this crate
pub type TandemError = BoxedError<'static, TandemErrorKind>;

/// Create a [`TandemErrorKind::NotFound`] error for the given (rendered) key.
pub(crate) fn not_found(what: &'static str, key: &str) -> TandemError {
    BoxedError::new(
        TandemErrorKind::NotFound,
        format!("Unknown {what}"),
        format!("The {what} '{key}' was not part of the built peptide map"),
        Context::none().lines(0, key).to_owned(),
    )
}
