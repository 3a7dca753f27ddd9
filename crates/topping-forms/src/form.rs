use crate::class::{AttrKind, FormClass, ResolvedAttr, ResolvedConfig};
use crate::classify::{FieldViews, filter_fields};
use crate::field::{Field, FieldError, FieldKind};
use crate::files::{
	FileDescriptor, FileSource, FilenameSanitizer, RequestFiles, SecureFilename, extract_files,
};
use crate::record::NormalizedRecord;
use crate::settings::FormSettings;
use chrono::Utc;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use std::ops::Index;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum FormError {
	#[error("Field error in {field}: {error}")]
	Field { field: String, error: FieldError },
	#[error("{0}")]
	Validation(String),
	#[error("Form has no field named '{0}'")]
	FieldNotFound(String),
	#[error("Unsupported comparison operator '{0}'")]
	UnknownOperator(String),
}

pub type FormResult<T> = Result<T, FormError>;

/// Options for [`Form::normalize`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
	/// Allow attribute-style access on the result
	pub box_wrap: bool,
	/// Add `created_at` and `updated_at`
	pub use_timestamps: bool,
}

impl NormalizeOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn box_wrap(mut self) -> Self {
		self.box_wrap = true;
		self
	}

	pub fn use_timestamps(mut self) -> Self {
		self.use_timestamps = true;
		self
	}
}

/// A form instance: an ordered set of fields bound to one request
pub struct Form {
	class: Arc<FormClass>,
	fields: Vec<Field>,
	settings: FormSettings,
	files: Arc<dyn FileSource>,
	sanitizer: Arc<dyn FilenameSanitizer>,
	errors: HashMap<String, Vec<String>>,
	views: FieldViews,
}

impl Form {
	/// Create an empty form of the given class
	///
	/// # Examples
	///
	/// ```
	/// use std::sync::Arc;
	/// use topping_forms::{Form, FormClass, FormConfig};
	///
	/// let form = Form::new(Arc::new(FormClass::new("LoginForm", FormConfig::new())));
	/// assert_eq!(form.class().name(), "LoginForm");
	/// assert!(form.fields().is_empty());
	/// ```
	pub fn new(class: Arc<FormClass>) -> Self {
		Self {
			class,
			fields: vec![],
			settings: FormSettings::default(),
			files: Arc::new(RequestFiles::new()),
			sanitizer: Arc::new(SecureFilename),
			errors: HashMap::new(),
			views: FieldViews::default(),
		}
	}

	pub fn with_settings(mut self, settings: FormSettings) -> Self {
		self.settings = settings;
		self
	}

	/// Attach the uploads of the current request.
	pub fn with_files(mut self, files: impl FileSource + 'static) -> Self {
		self.files = Arc::new(files);
		self
	}

	pub fn with_sanitizer(mut self, sanitizer: impl FilenameSanitizer + 'static) -> Self {
		self.sanitizer = Arc::new(sanitizer);
		self
	}

	pub fn add_field(&mut self, field: Field) {
		self.fields.push(field);
		self.views.clear();
	}

	pub fn remove_field(&mut self, name: &str) -> Option<Field> {
		let pos = self.fields.iter().position(|f| f.name == name)?;
		self.views.clear();
		Some(self.fields.remove(pos))
	}

	/// Bind submitted data to the declared fields
	///
	/// Fields missing from `data` are left without a value; keys that match
	/// no field are ignored.
	///
	/// # Examples
	///
	/// ```
	/// use std::collections::HashMap;
	/// use std::sync::Arc;
	/// use serde_json::json;
	/// use topping_forms::{Field, FieldKind, Form, FormClass, FormConfig};
	///
	/// let mut form = Form::new(Arc::new(FormClass::new("Profile", FormConfig::new())));
	/// form.add_field(Field::new("name", FieldKind::String));
	/// form.add_field(Field::new("bio", FieldKind::TextArea));
	///
	/// form.bind(HashMap::from([("name".to_string(), json!("Ada"))]));
	///
	/// assert_eq!(form["name"].data, Some(json!("Ada")));
	/// assert_eq!(form["bio"].data, None);
	/// ```
	pub fn bind(&mut self, mut data: HashMap<String, Value>) {
		for field in &mut self.fields {
			field.data = data.remove(&field.name);
		}
		self.errors.clear();
	}

	pub fn class(&self) -> &FormClass {
		&self.class
	}

	pub fn settings(&self) -> &FormSettings {
		&self.settings
	}

	pub fn fields(&self) -> &[Field] {
		&self.fields
	}

	pub fn get_field(&self, name: &str) -> Option<&Field> {
		self.fields.iter().find(|f| f.name == name)
	}

	/// Look a field up by name, treating absence as a declaration defect.
	pub fn field(&self, name: &str) -> FormResult<&Field> {
		self.get_field(name)
			.ok_or_else(|| FormError::FieldNotFound(name.to_string()))
	}

	pub fn field_count(&self) -> usize {
		self.fields.len()
	}

	/// Resolve one declaration across the form's class chain.
	pub fn resolve(&self, kind: AttrKind) -> ResolvedAttr {
		self.class.resolve(kind)
	}

	pub fn resolved_config(&self) -> ResolvedConfig {
		self.class.resolved()
	}

	pub fn filter_fields(&self, kinds: &[FieldKind], contains: bool) -> Vec<String> {
		filter_fields(&self.fields, kinds, contains)
	}

	/// Fields rendered as visible inputs.
	pub fn html_fields(&self) -> &[String] {
		self.views.html(&self.fields)
	}

	pub fn select_fields(&self) -> &[String] {
		self.views.select(&self.fields)
	}

	pub fn radio_fields(&self) -> &[String] {
		self.views.radio(&self.fields)
	}

	pub fn boolean_fields(&self) -> &[String] {
		self.views.boolean(&self.fields)
	}

	pub fn file_fields(&self) -> &[String] {
		self.views.file(&self.fields)
	}

	pub fn date_fields(&self) -> &[String] {
		self.views.date(&self.fields)
	}

	pub fn submit_fields(&self) -> &[String] {
		self.views.submit(&self.fields)
	}

	/// Run every field validator
	///
	/// Validation failures are collected per field and reported through
	/// [`Form::errors`]. Any other error aborts and is returned.
	///
	/// # Errors
	///
	/// Returns the first configuration error raised by a validator, such as
	/// [`FormError::FieldNotFound`] for an undeclared dependency field.
	pub fn validate(&mut self) -> FormResult<bool> {
		let mut errors: HashMap<String, Vec<String>> = HashMap::new();

		for field in &self.fields {
			for validator in field.validators() {
				match validator.validate(self, field) {
					Ok(()) => {}
					Err(FormError::Validation(msg)) => {
						errors.entry(field.name.clone()).or_default().push(msg);
					}
					Err(FormError::Field { field: name, error }) => {
						errors.entry(name).or_default().push(error.to_string());
					}
					Err(e) => return Err(e),
				}
			}
		}

		self.errors = errors;
		Ok(self.errors.is_empty())
	}

	pub fn errors(&self) -> &HashMap<String, Vec<String>> {
		&self.errors
	}

	/// Turn the bound values into a record ready for persistence
	///
	/// Excluded, submit and upload fields and the anti-forgery token are left
	/// out. Strings are trimmed unless the field is a password or is listed in
	/// `nostrips`, then lowercased or uppercased as configured, lowercase
	/// first. Each value is stored under the field's alias when it has one;
	/// fields sharing an output name overwrite in declaration order.
	///
	/// # Examples
	///
	/// ```
	/// use std::sync::Arc;
	/// use serde_json::json;
	/// use topping_forms::{Field, FieldKind, Form, FormClass, FormConfig, NormalizeOptions};
	///
	/// let class = FormClass::new(
	///     "Signup",
	///     FormConfig::new().lowers(["email"]).aliases([("name", "full_name")]),
	/// );
	/// let mut form = Form::new(Arc::new(class));
	/// form.add_field(Field::new("name", FieldKind::String).with_data(json!(" Bob ")));
	/// form.add_field(Field::new("email", FieldKind::Email).with_data(json!("A@B.com")));
	/// form.add_field(Field::new("csrf_token", FieldKind::CsrfToken).with_data(json!("t0k3n")));
	///
	/// let record = form.normalize(NormalizeOptions::new());
	/// assert_eq!(record["full_name"], json!("Bob"));
	/// assert_eq!(record["email"], json!("a@b.com"));
	/// assert!(!record.contains_key("csrf_token"));
	/// ```
	pub fn normalize(&self, options: NormalizeOptions) -> NormalizedRecord {
		let config = self.class.resolved();
		let mut excludes = config.excludes;
		let csrf = self.settings.csrf_field_name();
		if !csrf.is_empty() {
			excludes.insert(csrf.to_string());
		}

		let mut record = NormalizedRecord::new();
		for field in &self.fields {
			if excludes.contains(&field.name) || !field.kind.is_value_field() {
				tracing::trace!(field = %field.name, kind = %field.kind, "skipping field");
				continue;
			}

			let strip = !config.nostrips.contains(&field.name) && !field.is_password();
			let value = match field.data.clone() {
				Some(Value::String(s)) if strip => Value::String(s.trim().to_string()),
				Some(value) => value,
				None => Value::Null,
			};
			let value = if config.lowers.contains(&field.name) {
				map_strings(value, str::to_lowercase)
			} else if config.uppers.contains(&field.name) {
				map_strings(value, str::to_uppercase)
			} else {
				value
			};

			let key = config.aliases.get(&field.name).unwrap_or(&field.name);
			record.insert(key.clone(), value);
		}

		if options.use_timestamps {
			record.stamp(Utc::now());
		}

		tracing::debug!(
			form = self.class.name(),
			entries = record.len(),
			"normalized form data"
		);

		if options.box_wrap {
			record.boxed()
		} else {
			record
		}
	}

	/// Uploads submitted under `name`, deduplicated by sanitized filename.
	pub fn extract(&self, name: &str) -> Vec<FileDescriptor> {
		extract_files(self.files.as_ref(), self.sanitizer.as_ref(), name)
	}

	/// Uploads for `names` plus every upload field that currently has data
	///
	/// Names with no accepted uploads are left out of the result.
	pub fn extract_many(&self, names: &[&str]) -> IndexMap<String, Vec<FileDescriptor>> {
		let uploads = self
			.fields
			.iter()
			.filter(|field| field.kind.is_file() && field.has_data())
			.map(|field| field.name.as_str());

		let mut extracted = IndexMap::new();
		for name in names.iter().copied().chain(uploads) {
			if extracted.contains_key(name) {
				continue;
			}
			let files = self.extract(name);
			if !files.is_empty() {
				extracted.insert(name.to_string(), files);
			}
		}
		extracted
	}
}

// Applies `f` to a string, or to each string of an array; anything else is
// returned unchanged.
fn map_strings(value: Value, f: fn(&str) -> String) -> Value {
	match value {
		Value::String(s) => Value::String(f(&s)),
		Value::Array(items) => Value::Array(items.into_iter().map(|item| map_strings(item, f)).collect()),
		other => other,
	}
}

impl Index<&str> for Form {
	type Output = Field;

	fn index(&self, name: &str) -> &Self::Output {
		self.get_field(name)
			.unwrap_or_else(|| panic!("Field '{}' not found", name))
	}
}
