//! Form fields and their kinds
//!
//! A [`Field`] is a named input slot with a [`FieldKind`] and the value bound
//! from the current submission. Kinds form a closed set; every kind maps to
//! exactly one [`FieldBucket`], which is what the classifier and the
//! normalizer branch on.

use crate::form::{Form, FormResult};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Per-field error surfaced to the end user
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
	/// The field was left empty while a requirement on it held
	#[error("{0}")]
	Required(String),
}

/// The kind of a field, identified on the wire by its type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
	String,
	TextArea,
	Password,
	Email,
	Search,
	Tel,
	Url,
	Integer,
	Decimal,
	Float,
	IntegerRange,
	DecimalRange,
	Boolean,
	Select,
	SelectMultiple,
	Radio,
	File,
	MultipleFile,
	Date,
	DateTime,
	DateTimeLocal,
	Time,
	Month,
	Color,
	Submit,
	CsrfToken,
	Hidden,
	FormField,
	FieldList,
}

/// Semantic bucket a kind belongs to.
///
/// `NonHtml` covers the kinds that never render as a visible input
/// (hidden, csrf token, composite form, field list). Submit buttons have a
/// bucket of their own but are not rendered as value inputs either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldBucket {
	Select,
	Radio,
	Boolean,
	File,
	Date,
	Submit,
	NonHtml,
	Other,
}

impl FieldKind {
	pub const ALL: [FieldKind; 29] = [
		FieldKind::String,
		FieldKind::TextArea,
		FieldKind::Password,
		FieldKind::Email,
		FieldKind::Search,
		FieldKind::Tel,
		FieldKind::Url,
		FieldKind::Integer,
		FieldKind::Decimal,
		FieldKind::Float,
		FieldKind::IntegerRange,
		FieldKind::DecimalRange,
		FieldKind::Boolean,
		FieldKind::Select,
		FieldKind::SelectMultiple,
		FieldKind::Radio,
		FieldKind::File,
		FieldKind::MultipleFile,
		FieldKind::Date,
		FieldKind::DateTime,
		FieldKind::DateTimeLocal,
		FieldKind::Time,
		FieldKind::Month,
		FieldKind::Color,
		FieldKind::Submit,
		FieldKind::CsrfToken,
		FieldKind::Hidden,
		FieldKind::FormField,
		FieldKind::FieldList,
	];

	/// Type tag of the kind
	///
	/// # Examples
	///
	/// ```
	/// use topping_forms::FieldKind;
	///
	/// assert_eq!(FieldKind::MultipleFile.type_tag(), "MultipleFileField");
	/// assert_eq!(FieldKind::CsrfToken.type_tag(), "CSRFTokenField");
	/// ```
	pub fn type_tag(self) -> &'static str {
		match self {
			FieldKind::String => "StringField",
			FieldKind::TextArea => "TextAreaField",
			FieldKind::Password => "PasswordField",
			FieldKind::Email => "EmailField",
			FieldKind::Search => "SearchField",
			FieldKind::Tel => "TelField",
			FieldKind::Url => "URLField",
			FieldKind::Integer => "IntegerField",
			FieldKind::Decimal => "DecimalField",
			FieldKind::Float => "FloatField",
			FieldKind::IntegerRange => "IntegerRangeField",
			FieldKind::DecimalRange => "DecimalRangeField",
			FieldKind::Boolean => "BooleanField",
			FieldKind::Select => "SelectField",
			FieldKind::SelectMultiple => "SelectMultipleField",
			FieldKind::Radio => "RadioField",
			FieldKind::File => "FileField",
			FieldKind::MultipleFile => "MultipleFileField",
			FieldKind::Date => "DateField",
			FieldKind::DateTime => "DateTimeField",
			FieldKind::DateTimeLocal => "DateTimeLocalField",
			FieldKind::Time => "TimeField",
			FieldKind::Month => "MonthField",
			FieldKind::Color => "ColorField",
			FieldKind::Submit => "SubmitField",
			FieldKind::CsrfToken => "CSRFTokenField",
			FieldKind::Hidden => "HiddenField",
			FieldKind::FormField => "FormField",
			FieldKind::FieldList => "FieldList",
		}
	}

	/// Look a kind up by its type tag
	///
	/// # Examples
	///
	/// ```
	/// use topping_forms::FieldKind;
	///
	/// assert_eq!(FieldKind::from_tag("BooleanField"), Some(FieldKind::Boolean));
	/// assert_eq!(FieldKind::from_tag("NoSuchField"), None);
	/// ```
	pub fn from_tag(tag: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|kind| kind.type_tag() == tag)
	}

	pub fn bucket(self) -> FieldBucket {
		match self {
			FieldKind::Select | FieldKind::SelectMultiple => FieldBucket::Select,
			FieldKind::Radio => FieldBucket::Radio,
			FieldKind::Boolean => FieldBucket::Boolean,
			FieldKind::File | FieldKind::MultipleFile => FieldBucket::File,
			FieldKind::Date | FieldKind::DateTime | FieldKind::DateTimeLocal => FieldBucket::Date,
			FieldKind::Submit => FieldBucket::Submit,
			FieldKind::CsrfToken | FieldKind::Hidden | FieldKind::FormField | FieldKind::FieldList => {
				FieldBucket::NonHtml
			}
			FieldKind::String
			| FieldKind::TextArea
			| FieldKind::Password
			| FieldKind::Email
			| FieldKind::Search
			| FieldKind::Tel
			| FieldKind::Url
			| FieldKind::Integer
			| FieldKind::Decimal
			| FieldKind::Float
			| FieldKind::IntegerRange
			| FieldKind::DecimalRange
			| FieldKind::Time
			| FieldKind::Month
			| FieldKind::Color => FieldBucket::Other,
		}
	}

	pub fn is_password(self) -> bool {
		self == FieldKind::Password
	}

	/// Whether the type tag ends in `FileField`.
	pub fn is_file(self) -> bool {
		self.type_tag().ends_with("FileField")
	}

	/// Whether the field carries a value that belongs in a normalized record.
	///
	/// Submit buttons and uploads never do; uploads are extracted separately.
	pub fn is_value_field(self) -> bool {
		!matches!(self.bucket(), FieldBucket::Submit | FieldBucket::File)
	}

	/// Whether the field renders as a visible HTML input.
	pub fn is_html(self) -> bool {
		!matches!(self.bucket(), FieldBucket::Submit | FieldBucket::NonHtml)
	}
}

impl fmt::Display for FieldKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.type_tag())
	}
}

/// A check run against one field with access to the whole form.
///
/// Returning `Err(FormError::Validation(_))` or `Err(FormError::Field { .. })`
/// marks a field invalid; any other error is a declaration defect and aborts
/// validation.
pub trait FieldValidator: Send + Sync {
	fn validate(&self, form: &Form, field: &Field) -> FormResult<()>;
}

impl<F> FieldValidator for F
where
	F: Fn(&Form, &Field) -> FormResult<()> + Send + Sync,
{
	fn validate(&self, form: &Form, field: &Field) -> FormResult<()> {
		self(form, field)
	}
}

/// A named input slot on a form
#[derive(Clone)]
pub struct Field {
	pub name: String,
	pub kind: FieldKind,
	pub data: Option<Value>,
	validators: Vec<Arc<dyn FieldValidator>>,
}

impl Field {
	/// Create an unbound field
	///
	/// # Examples
	///
	/// ```
	/// use topping_forms::{Field, FieldKind};
	///
	/// let field = Field::new("email", FieldKind::Email);
	/// assert_eq!(field.name, "email");
	/// assert_eq!(field.type_tag(), "EmailField");
	/// assert!(field.data.is_none());
	/// ```
	pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
		Self {
			name: name.into(),
			kind,
			data: None,
			validators: vec![],
		}
	}

	/// Bind a value to the field
	///
	/// # Examples
	///
	/// ```
	/// use topping_forms::{Field, FieldKind};
	/// use serde_json::json;
	///
	/// let field = Field::new("age", FieldKind::Integer).with_data(json!(42));
	/// assert_eq!(field.data, Some(json!(42)));
	/// ```
	pub fn with_data(mut self, data: Value) -> Self {
		self.data = Some(data);
		self
	}

	pub fn with_validator(mut self, validator: impl FieldValidator + 'static) -> Self {
		self.validators.push(Arc::new(validator));
		self
	}

	pub fn validators(&self) -> &[Arc<dyn FieldValidator>] {
		&self.validators
	}

	pub fn type_tag(&self) -> &'static str {
		self.kind.type_tag()
	}

	pub fn is_password(&self) -> bool {
		self.kind.is_password()
	}

	/// Whether the bound value is truthy.
	pub fn has_data(&self) -> bool {
		self.data.as_ref().is_some_and(is_truthy)
	}
}

impl fmt::Debug for Field {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Field")
			.field("name", &self.name)
			.field("kind", &self.kind)
			.field("data", &self.data)
			.field("validators", &self.validators.len())
			.finish()
	}
}

/// Truthiness of a submitted value.
///
/// Null, `false`, zero, and empty strings, arrays, or objects are falsy.
pub fn is_truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(b) => *b,
		Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
		Value::String(s) => !s.is_empty(),
		Value::Array(items) => !items.is_empty(),
		Value::Object(map) => !map.is_empty(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_every_kind_round_trips_through_its_tag() {
		for kind in FieldKind::ALL {
			assert_eq!(FieldKind::from_tag(kind.type_tag()), Some(kind));
		}
	}

	#[rstest]
	#[case(FieldKind::File, true)]
	#[case(FieldKind::MultipleFile, true)]
	#[case(FieldKind::String, false)]
	#[case(FieldKind::FormField, false)]
	fn test_is_file(#[case] kind: FieldKind, #[case] expected: bool) {
		assert_eq!(kind.is_file(), expected);
	}

	#[rstest]
	#[case(FieldKind::Submit, false)]
	#[case(FieldKind::File, false)]
	#[case(FieldKind::MultipleFile, false)]
	#[case(FieldKind::Hidden, true)]
	#[case(FieldKind::Password, true)]
	fn test_is_value_field(#[case] kind: FieldKind, #[case] expected: bool) {
		assert_eq!(kind.is_value_field(), expected);
	}

	#[rstest]
	#[case(json!(null), false)]
	#[case(json!(false), false)]
	#[case(json!(0), false)]
	#[case(json!(0.0), false)]
	#[case(json!(""), false)]
	#[case(json!([]), false)]
	#[case(json!({}), false)]
	#[case(json!(true), true)]
	#[case(json!(-1), true)]
	#[case(json!(" "), true)]
	#[case(json!(["a"]), true)]
	fn test_is_truthy(#[case] value: Value, #[case] expected: bool) {
		assert_eq!(is_truthy(&value), expected);
	}

	#[rstest]
	fn test_has_data() {
		// Arrange
		let unbound = Field::new("upload", FieldKind::File);
		let empty = Field::new("upload", FieldKind::File).with_data(json!(""));
		let bound = Field::new("upload", FieldKind::File).with_data(json!("report.pdf"));

		// Assert
		assert!(!unbound.has_data());
		assert!(!empty.has_data());
		assert!(bound.has_data());
	}
}
