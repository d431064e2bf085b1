//! Ordered multi-value dictionaries for web data.
//!
//! A web framework keeps running into the same shape of data: query strings,
//! form fields and header-like structures where a single key can carry several
//! values and the order of those values matters. This crate provides that shape
//! once, as plain in-memory value types:
//!
//! - [`MultiDict`]: the mutable ordered multi-value map;
//! - [`ImmutableMultiDict`]: a read-only snapshot of the same data;
//! - [`QueryMultiDict`]: a [`MultiDict`] parsed from a raw query string;
//! - [`FormMultiDict`]: an [`ImmutableMultiDict`] of parsed form fields whose
//!   values may be [`UploadFile`] handles that have to be released explicitly.
//!
//! The shared read surface lives in the [`MultiMapping`] trait, implemented by
//! both the mutable and the immutable variant.
//!
//! # Example
//!
//! ```
//! use multidict::{MultiDict, MultiMapping};
//!
//! let mut dict = MultiDict::new();
//! dict.append("tag", "a");
//! dict.append("name", "example");
//! dict.append("tag", "b");
//!
//! assert_eq!(dict.get("tag"), Some(&"a"));
//! assert_eq!(dict.get_all("tag"), ["a", "b"]);
//! assert_eq!(
//!     dict.multi_items().collect::<Vec<_>>(),
//!     [("tag", &"a"), ("tag", &"b"), ("name", &"example")],
//! );
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg, doc_cfg))]
#![cfg_attr(not(test), warn(clippy::print_stdout, clippy::dbg_macro))]

#[macro_use]
mod macros;

mod mapping;
pub use mapping::MultiMapping;

mod dict;
pub use dict::{IntoIter, MultiDict};

mod immutable;
pub use immutable::ImmutableMultiDict;

mod query;
pub use query::{QueryMultiDict, QueryValue};

mod form;
pub use form::{FormMultiDict, FormValue};

mod upload;
pub use upload::UploadFile;

mod error;
pub use error::{FieldCloseError, FormCloseError};
