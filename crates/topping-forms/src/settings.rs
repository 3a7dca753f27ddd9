//! Application settings consumed by forms

use serde::{Deserialize, Serialize};

/// Field name used for the anti-forgery token when none is configured.
pub const DEFAULT_CSRF_FIELD_NAME: &str = "csrf_token";

/// Environment variable read by [`FormSettings::from_env`].
pub const CSRF_FIELD_NAME_ENV: &str = "TOPPING_CSRF_FIELD_NAME";

/// Form-related application settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSettings {
	/// Name of the anti-forgery token field
	#[serde(default)]
	pub csrf_field_name: Option<String>,
}

impl FormSettings {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_csrf_field_name(mut self, name: impl Into<String>) -> Self {
		self.csrf_field_name = Some(name.into());
		self
	}

	/// Load settings from the process environment.
	///
	/// A blank variable counts as unset.
	pub fn from_env() -> Self {
		let csrf_field_name = std::env::var(CSRF_FIELD_NAME_ENV)
			.ok()
			.filter(|name| !name.trim().is_empty());
		Self { csrf_field_name }
	}

	/// The anti-forgery field name in effect
	///
	/// # Examples
	///
	/// ```
	/// use topping_forms::FormSettings;
	///
	/// assert_eq!(FormSettings::new().csrf_field_name(), "csrf_token");
	/// assert_eq!(FormSettings::new().with_csrf_field_name("").csrf_field_name(), "csrf_token");
	/// assert_eq!(FormSettings::new().with_csrf_field_name("_token").csrf_field_name(), "_token");
	/// ```
	pub fn csrf_field_name(&self) -> &str {
		self.csrf_field_name
			.as_deref()
			.filter(|name| !name.is_empty())
			.unwrap_or(DEFAULT_CSRF_FIELD_NAME)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serial_test::serial;
	use std::env;

	#[rstest]
	fn test_deserialize_without_csrf_field_name() {
		// Act
		let settings: FormSettings = serde_json::from_str("{}").unwrap();

		// Assert
		assert_eq!(settings.csrf_field_name, None);
		assert_eq!(settings.csrf_field_name(), DEFAULT_CSRF_FIELD_NAME);
	}

	#[rstest]
	fn test_deserialize_with_csrf_field_name() {
		let settings: FormSettings =
			serde_json::from_str(r#"{"csrf_field_name": "authenticity_token"}"#).unwrap();

		assert_eq!(settings.csrf_field_name(), "authenticity_token");
	}

	#[rstest]
	#[case(Some("authenticity_token"), Some("authenticity_token"), "authenticity_token")]
	#[case(Some("   "), None, DEFAULT_CSRF_FIELD_NAME)]
	#[case(Some(""), None, DEFAULT_CSRF_FIELD_NAME)]
	#[case(None, None, DEFAULT_CSRF_FIELD_NAME)]
	#[serial]
	fn test_from_env(
		#[case] raw: Option<&str>,
		#[case] expected_setting: Option<&str>,
		#[case] expected_name: &str,
	) {
		// Arrange
		// SAFETY: Mutating environment variables is unsafe in multi-threaded programs.
		// This test uses #[serial] to ensure exclusive access to environment variables.
		unsafe {
			match raw {
				Some(value) => env::set_var(CSRF_FIELD_NAME_ENV, value),
				None => env::remove_var(CSRF_FIELD_NAME_ENV),
			}
		}

		// Act
		let settings = FormSettings::from_env();

		// Assert
		assert_eq!(settings.csrf_field_name.as_deref(), expected_setting);
		assert_eq!(settings.csrf_field_name(), expected_name);

		// SAFETY: See above.
		unsafe {
			env::remove_var(CSRF_FIELD_NAME_ENV);
		}
	}
}
