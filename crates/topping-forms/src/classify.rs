//! Field classification by kind
//!
//! Partitions the fields of a form into the buckets templates care about.
//! The derived views are computed on first use and kept for the lifetime of
//! the form; [`FieldViews::clear`] drops them when the field set changes.

use crate::field::{Field, FieldBucket, FieldKind};
use std::sync::OnceLock;

/// Kinds that never render as a visible input
pub const NON_HTML_KINDS: [FieldKind; 5] = [
	FieldKind::Submit,
	FieldKind::CsrfToken,
	FieldKind::Hidden,
	FieldKind::FormField,
	FieldKind::FieldList,
];

pub const SELECT_KINDS: [FieldKind; 2] = [FieldKind::Select, FieldKind::SelectMultiple];
pub const RADIO_KINDS: [FieldKind; 1] = [FieldKind::Radio];
pub const BOOLEAN_KINDS: [FieldKind; 1] = [FieldKind::Boolean];
pub const FILE_KINDS: [FieldKind; 2] = [FieldKind::File, FieldKind::MultipleFile];
pub const DATE_KINDS: [FieldKind; 3] = [
	FieldKind::Date,
	FieldKind::DateTime,
	FieldKind::DateTimeLocal,
];
pub const SUBMIT_KINDS: [FieldKind; 1] = [FieldKind::Submit];

/// Names of the fields whose kind is (or, with `contains = false`, is not)
/// one of `kinds`, in declaration order
///
/// # Examples
///
/// ```
/// use topping_forms::{Field, FieldKind};
/// use topping_forms::classify::filter_fields;
///
/// let fields = vec![
///     Field::new("agree", FieldKind::Boolean),
///     Field::new("name", FieldKind::String),
/// ];
///
/// assert_eq!(filter_fields(&fields, &[FieldKind::Boolean], true), vec!["agree"]);
/// assert_eq!(filter_fields(&fields, &[FieldKind::Boolean], false), vec!["name"]);
/// ```
pub fn filter_fields(fields: &[Field], kinds: &[FieldKind], contains: bool) -> Vec<String> {
	fields
		.iter()
		.filter(|field| kinds.contains(&field.kind) == contains)
		.map(|field| field.name.clone())
		.collect()
}

fn in_bucket(fields: &[Field], bucket: FieldBucket) -> Vec<String> {
	fields
		.iter()
		.filter(|field| field.kind.bucket() == bucket)
		.map(|field| field.name.clone())
		.collect()
}

/// Lazily computed classifier views for one form
#[derive(Debug, Default)]
pub struct FieldViews {
	html: OnceLock<Vec<String>>,
	select: OnceLock<Vec<String>>,
	radio: OnceLock<Vec<String>>,
	boolean: OnceLock<Vec<String>>,
	file: OnceLock<Vec<String>>,
	date: OnceLock<Vec<String>>,
	submit: OnceLock<Vec<String>>,
}

impl FieldViews {
	pub fn html<'a>(&'a self, fields: &[Field]) -> &'a [String] {
		self.html.get_or_init(|| {
			fields
				.iter()
				.filter(|field| field.kind.is_html())
				.map(|field| field.name.clone())
				.collect()
		})
	}

	pub fn select<'a>(&'a self, fields: &[Field]) -> &'a [String] {
		self.select.get_or_init(|| in_bucket(fields, FieldBucket::Select))
	}

	pub fn radio<'a>(&'a self, fields: &[Field]) -> &'a [String] {
		self.radio.get_or_init(|| in_bucket(fields, FieldBucket::Radio))
	}

	pub fn boolean<'a>(&'a self, fields: &[Field]) -> &'a [String] {
		self.boolean.get_or_init(|| in_bucket(fields, FieldBucket::Boolean))
	}

	pub fn file<'a>(&'a self, fields: &[Field]) -> &'a [String] {
		self.file.get_or_init(|| in_bucket(fields, FieldBucket::File))
	}

	pub fn date<'a>(&'a self, fields: &[Field]) -> &'a [String] {
		self.date.get_or_init(|| in_bucket(fields, FieldBucket::Date))
	}

	pub fn submit<'a>(&'a self, fields: &[Field]) -> &'a [String] {
		self.submit.get_or_init(|| in_bucket(fields, FieldBucket::Submit))
	}

	pub fn clear(&mut self) {
		*self = Self::default();
	}
}
