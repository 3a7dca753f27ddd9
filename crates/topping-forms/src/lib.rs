//! Form configuration layer for Topping
//!
//! This crate sits on top of a form's declared fields and provides:
//! - Per-class declarations (lowercase, uppercase, no-strip, exclude, alias)
//!   merged across a class chain
//! - Classification of fields into select, radio, boolean, file, date,
//!   submit and renderable buckets
//! - Normalization of bound values into a record ready for persistence
//! - Extraction of uploaded files, deduplicated by sanitized filename
//! - A conditional requirement validator driven by other fields' values

pub mod class;
pub mod classify;
pub mod field;
pub mod files;
pub mod form;
pub mod record;
pub mod settings;
pub mod validators;

pub use class::{AttrKind, FormClass, FormConfig, ResolvedAttr, ResolvedConfig};
pub use field::{Field, FieldBucket, FieldError, FieldKind, FieldValidator, is_truthy};
pub use files::{
	FileDescriptor, FileSource, FilenameSanitizer, RequestFiles, SecureFilename, UploadedFile,
	secure_filename,
};
pub use form::{Form, FormError, FormResult, NormalizeOptions};
pub use record::NormalizedRecord;
pub use settings::FormSettings;
pub use validators::{Check, Operator, RequiredIf, required_if};
