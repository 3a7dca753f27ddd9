//! Normalized form output

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::ser::{Serialize, Serializer};
use serde_json::Value;
use std::ops::Index;

/// Key holding the creation time of a stamped record.
pub const CREATED_AT_KEY: &str = "created_at";

/// Key holding the update time of a stamped record.
pub const UPDATED_AT_KEY: &str = "updated_at";

/// Output of [`Form::normalize`](crate::Form::normalize)
///
/// Entries keep field declaration order. Both `record["key"]` and
/// `record.get("key")` are always available; a record built with
/// `box_wrap` additionally resolves attribute paths through
/// [`NormalizedRecord::attr`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRecord {
	values: IndexMap<String, Value>,
	boxed: bool,
}

impl NormalizedRecord {
	pub fn new() -> Self {
		Self::default()
	}

	/// Store a value, replacing any earlier value under the same key.
	pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
		self.values.insert(key.into(), value)
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.values.get(key)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.values.contains_key(key)
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.values.keys().map(String::as_str)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.values.iter().map(|(k, v)| (k.as_str(), v))
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	pub fn values(&self) -> &IndexMap<String, Value> {
		&self.values
	}

	pub fn into_values(self) -> IndexMap<String, Value> {
		self.values
	}

	/// Stamp creation and update time with the same instant
	///
	/// Both are stored as RFC 3339 strings under [`CREATED_AT_KEY`] and
	/// [`UPDATED_AT_KEY`], replacing any value already held there.
	///
	/// # Examples
	///
	/// ```
	/// use chrono::{TimeZone, Utc};
	/// use serde_json::json;
	/// use topping_forms::NormalizedRecord;
	///
	/// let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
	/// let mut record = NormalizedRecord::new();
	/// record.stamp(now);
	///
	/// assert_eq!(record["created_at"], json!("2026-01-02T03:04:05+00:00"));
	/// assert_eq!(record.updated_at(), Some(now));
	/// ```
	pub fn stamp(&mut self, now: DateTime<Utc>) {
		let stamp = Value::String(now.to_rfc3339());
		self.values.insert(CREATED_AT_KEY.to_string(), stamp.clone());
		self.values.insert(UPDATED_AT_KEY.to_string(), stamp);
	}

	/// Creation time, if the entry holds an RFC 3339 timestamp.
	pub fn created_at(&self) -> Option<DateTime<Utc>> {
		self.timestamp(CREATED_AT_KEY)
	}

	pub fn updated_at(&self) -> Option<DateTime<Utc>> {
		self.timestamp(UPDATED_AT_KEY)
	}

	fn timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
		let raw = self.values.get(key)?.as_str()?;
		DateTime::parse_from_rfc3339(raw)
			.ok()
			.map(|stamp| stamp.with_timezone(&Utc))
	}

	/// Enable attribute-style access.
	pub fn boxed(mut self) -> Self {
		self.boxed = true;
		self
	}

	pub fn is_boxed(&self) -> bool {
		self.boxed
	}

	/// Attribute-style lookup through nested objects
	///
	/// Only boxed records support it; a plain record always returns `None`.
	///
	/// # Examples
	///
	/// ```
	/// use serde_json::json;
	/// use topping_forms::NormalizedRecord;
	///
	/// let mut record = NormalizedRecord::new();
	/// record.insert("address", json!({"city": "Lyon"}));
	/// assert_eq!(record.attr("address.city"), None);
	///
	/// let record = record.boxed();
	/// assert_eq!(record.attr("address.city"), Some(&json!("Lyon")));
	/// assert_eq!(record.attr("address"), record.get("address"));
	/// ```
	pub fn attr(&self, path: &str) -> Option<&Value> {
		if !self.boxed {
			return None;
		}
		let mut segments = path.split('.');
		let mut current = self.values.get(segments.next()?)?;
		for segment in segments {
			current = current.as_object()?.get(segment)?;
		}
		Some(current)
	}

	/// Flat JSON object of every entry.
	pub fn to_json(&self) -> Value {
		Value::Object(
			self.values
				.iter()
				.map(|(k, v)| (k.clone(), v.clone()))
				.collect(),
		)
	}
}

impl Index<&str> for NormalizedRecord {
	type Output = Value;

	fn index(&self, key: &str) -> &Self::Output {
		self.values
			.get(key)
			.unwrap_or_else(|| panic!("Key '{}' not found", key))
	}
}

impl Serialize for NormalizedRecord {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_map(&self.values)
	}
}
