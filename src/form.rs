use smol_str::SmolStr;

use crate::{
    FieldCloseError, FormCloseError, ImmutableMultiDict, MultiDict, MultiMapping, UploadFile,
};

/// A single parsed form field value: plain decoded text or an uploaded file.
#[derive(Debug, Clone)]
pub enum FormValue {
    Text(String),
    File(UploadFile),
}

impl FormValue {
    /// The decoded text, if this is a plain field.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::File(_) => None,
        }
    }

    #[must_use]
    pub fn as_file(&self) -> Option<&UploadFile> {
        match self {
            Self::Text(_) => None,
            Self::File(file) => Some(file),
        }
    }

    #[must_use]
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }
}

impl From<&str> for FormValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for FormValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<UploadFile> for FormValue {
    fn from(file: UploadFile) -> Self {
        Self::File(file)
    }
}

/// An immutable multi-value map of parsed form data.
///
/// Thin specialization of [`ImmutableMultiDict`] (which it derefs to): the
/// values may be [`UploadFile`] handles holding I/O resources, and
/// [`close`](Self::close) is how those get released once the form has been
/// handled.
#[derive(Debug, Clone, Default)]
pub struct FormMultiDict(ImmutableMultiDict<FormValue>);

impl_deref!(FormMultiDict: ImmutableMultiDict<FormValue>);

impl FormMultiDict {
    #[must_use]
    pub fn new() -> Self {
        Self(ImmutableMultiDict::new())
    }

    /// Release every uploaded file stored in this form.
    ///
    /// Visits every stored `(field, value)` pair, duplicates included, and
    /// awaits the release of each file handle sequentially in iteration
    /// order; plain values are skipped silently. A release failure does not
    /// stop the sweep: every entry is attempted, and the per-field failures
    /// are collected into the returned [`FormCloseError`]. Handle release
    /// is idempotent, so a partially-failed `close` may be retried.
    pub async fn close(&self) -> Result<(), FormCloseError> {
        let mut failures = Vec::new();
        for (field, value) in self.0.multi_items() {
            let FormValue::File(file) = value else {
                continue;
            };
            if let Err(source) = file.close().await {
                tracing::debug!(field, error = %source, "failed to release form upload");
                failures.push(FieldCloseError::new(field, source));
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(FormCloseError::new(failures))
        }
    }
}

impl MultiMapping<FormValue> for FormMultiDict {
    fn get_all(&self, key: &str) -> &[FormValue] {
        self.0.get_all(key)
    }

    fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys()
    }
}

impl From<ImmutableMultiDict<FormValue>> for FormMultiDict {
    fn from(dict: ImmutableMultiDict<FormValue>) -> Self {
        Self(dict)
    }
}

impl From<MultiDict<FormValue>> for FormMultiDict {
    fn from(dict: MultiDict<FormValue>) -> Self {
        Self(dict.into_immutable())
    }
}

impl<K: Into<SmolStr>, V: Into<FormValue>> FromIterator<(K, V)> for FormMultiDict {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key, value.into()))
                .collect(),
        )
    }
}
