use std::fmt;
use std::io;

use smol_str::SmolStr;

/// Failure to release the upload stored under a single form field.
#[derive(Debug)]
pub struct FieldCloseError {
    field: SmolStr,
    source: io::Error,
}

impl FieldCloseError {
    pub(crate) fn new(field: impl Into<SmolStr>, source: io::Error) -> Self {
        Self {
            field: field.into(),
            source,
        }
    }

    /// The form field whose upload failed to release.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    #[must_use]
    pub fn io_error(&self) -> &io::Error {
        &self.source
    }
}

impl fmt::Display for FieldCloseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to release upload for form field {:?}",
            self.field.as_str()
        )
    }
}

impl std::error::Error for FieldCloseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// One or more upload releases failed during [`FormMultiDict::close`].
///
/// Every entry was still attempted; the per-field failures are collected
/// here in iteration order.
///
/// [`FormMultiDict::close`]: crate::FormMultiDict::close
#[derive(Debug)]
pub struct FormCloseError {
    failures: Vec<FieldCloseError>,
}

impl FormCloseError {
    pub(crate) fn new(failures: Vec<FieldCloseError>) -> Self {
        Self { failures }
    }

    #[must_use]
    pub fn failures(&self) -> &[FieldCloseError] {
        &self.failures
    }

    #[must_use]
    pub fn into_failures(self) -> Vec<FieldCloseError> {
        self.failures
    }
}

impl fmt::Display for FormCloseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to release {} upload(s)", self.failures.len())
    }
}

impl std::error::Error for FormCloseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.failures
            .first()
            .map(|failure| failure as &(dyn std::error::Error + 'static))
    }
}
