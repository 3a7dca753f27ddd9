//! Conditional requirement validator
//!
//! [`required_if`] builds a validator that makes a field mandatory when every
//! one of a list of checks over *other* fields of the same form holds.
//!
//! ```
//! use serde_json::json;
//! use topping_forms::{Field, FieldKind, Form, FormClass, FormConfig, Operator};
//! use topping_forms::validators::required_if;
//! use std::sync::Arc;
//!
//! let mut form = Form::new(Arc::new(FormClass::new("Contact", FormConfig::new())));
//! form.add_field(Field::new("email", FieldKind::Email).with_data(json!("a@b.com")));
//! form.add_field(
//!     Field::new("confirm_email", FieldKind::Email)
//!         .with_data(json!(""))
//!         .with_validator(required_if("email", Some(Operator::Ne), json!(""), vec![], "Please confirm")),
//! );
//!
//! assert!(!form.validate().unwrap());
//! assert_eq!(form.errors()["confirm_email"], vec!["Please confirm".to_string()]);
//! ```

use crate::field::{Field, FieldError, FieldValidator, is_truthy};
use crate::form::{Form, FormError, FormResult};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Default message raised by [`required_if`]
pub const DEFAULT_REQUIRED_MESSAGE: &str = "This field is required";

/// Comparison applied as `operator(dependency_value, expected_value)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
	Eq,
	Ne,
	Lt,
	Le,
	Gt,
	Ge,
	/// The dependency value contains the expected value
	Contains,
	/// The dependency value is contained in the expected value
	In,
	StartsWith,
	EndsWith,
}

impl Operator {
	pub fn as_str(self) -> &'static str {
		match self {
			Operator::Eq => "eq",
			Operator::Ne => "ne",
			Operator::Lt => "lt",
			Operator::Le => "le",
			Operator::Gt => "gt",
			Operator::Ge => "ge",
			Operator::Contains => "contains",
			Operator::In => "in",
			Operator::StartsWith => "startswith",
			Operator::EndsWith => "endswith",
		}
	}

	/// Evaluate the operator
	///
	/// Ordering comparisons are only defined between two numbers or two
	/// strings; any other pairing evaluates to false.
	///
	/// # Examples
	///
	/// ```
	/// use serde_json::json;
	/// use topping_forms::Operator;
	///
	/// assert!(Operator::Gt.evaluate(&json!(10), &json!(3.5)));
	/// assert!(Operator::In.evaluate(&json!("b"), &json!(["a", "b"])));
	/// assert!(!Operator::Lt.evaluate(&json!("1"), &json!(2)));
	/// ```
	pub fn evaluate(self, left: &Value, right: &Value) -> bool {
		match self {
			Operator::Eq => loose_eq(left, right),
			Operator::Ne => !loose_eq(left, right),
			Operator::Lt => compare(left, right) == Some(Ordering::Less),
			Operator::Le => matches!(compare(left, right), Some(Ordering::Less | Ordering::Equal)),
			Operator::Gt => compare(left, right) == Some(Ordering::Greater),
			Operator::Ge => matches!(
				compare(left, right),
				Some(Ordering::Greater | Ordering::Equal)
			),
			Operator::Contains => contains(left, right),
			Operator::In => contains(right, left),
			Operator::StartsWith => match (left, right) {
				(Value::String(l), Value::String(r)) => l.starts_with(r.as_str()),
				_ => false,
			},
			Operator::EndsWith => match (left, right) {
				(Value::String(l), Value::String(r)) => l.ends_with(r.as_str()),
				_ => false,
			},
		}
	}
}

impl FromStr for Operator {
	type Err = FormError;

	fn from_str(name: &str) -> Result<Self, Self::Err> {
		match name {
			"eq" => Ok(Operator::Eq),
			"ne" => Ok(Operator::Ne),
			"lt" => Ok(Operator::Lt),
			"le" => Ok(Operator::Le),
			"gt" => Ok(Operator::Gt),
			"ge" => Ok(Operator::Ge),
			"contains" => Ok(Operator::Contains),
			"in" | "in_" => Ok(Operator::In),
			"startswith" => Ok(Operator::StartsWith),
			"endswith" => Ok(Operator::EndsWith),
			other => Err(FormError::UnknownOperator(other.to_string())),
		}
	}
}

impl fmt::Display for Operator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

// Numbers compare by value so that 1 and 1.0 are equal.
fn loose_eq(left: &Value, right: &Value) -> bool {
	match (left, right) {
		(Value::Number(l), Value::Number(r)) => l.as_f64() == r.as_f64(),
		_ => left == right,
	}
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
	match (left, right) {
		(Value::Number(l), Value::Number(r)) => l.as_f64()?.partial_cmp(&r.as_f64()?),
		(Value::String(l), Value::String(r)) => Some(l.cmp(r)),
		(Value::Bool(l), Value::Bool(r)) => Some(l.cmp(r)),
		_ => None,
	}
}

fn contains(haystack: &Value, needle: &Value) -> bool {
	match (haystack, needle) {
		(Value::String(h), Value::String(n)) => h.contains(n.as_str()),
		(Value::Array(items), _) => items.iter().any(|item| loose_eq(item, needle)),
		(Value::Object(map), Value::String(key)) => map.contains_key(key),
		_ => false,
	}
}

/// One condition over a dependency field
#[derive(Debug, Clone, PartialEq)]
pub struct Check {
	pub field: String,
	/// `None` never counts as satisfied
	pub op: Option<Operator>,
	pub value: Value,
}

impl Check {
	pub fn new(field: impl Into<String>, op: Operator, value: Value) -> Self {
		Self {
			field: field.into(),
			op: Some(op),
			value,
		}
	}

	/// Build a check from an operator name; an empty name means no operator.
	///
	/// # Errors
	///
	/// Returns [`FormError::UnknownOperator`] for names outside the supported set.
	pub fn parse(field: impl Into<String>, op: &str, value: Value) -> FormResult<Self> {
		let op = if op.is_empty() {
			None
		} else {
			Some(op.parse()?)
		};
		Ok(Self {
			field: field.into(),
			op,
			value,
		})
	}

	/// Whether the check holds against the current state of `form`.
	///
	/// # Errors
	///
	/// Returns [`FormError::FieldNotFound`] when the dependency field is not
	/// declared on the form.
	pub fn is_satisfied(&self, form: &Form) -> FormResult<bool> {
		let dependency = form.field(&self.field)?;
		let data = match &dependency.data {
			Some(Value::String(s)) if !dependency.is_password() => Value::String(s.trim().to_string()),
			Some(value) => value.clone(),
			None => Value::Null,
		};

		let Some(op) = self.op else {
			return Ok(false);
		};
		if !is_truthy(&data) {
			return Ok(false);
		}
		Ok(op.evaluate(&data, &self.value))
	}
}

/// Field is required when all of its checks are satisfied
#[derive(Debug, Clone, PartialEq)]
pub struct RequiredIf {
	checks: Vec<Check>,
	message: String,
}

impl RequiredIf {
	pub fn new(checks: Vec<Check>, message: impl Into<String>) -> Self {
		Self {
			checks,
			message: message.into(),
		}
	}

	pub fn checks(&self) -> &[Check] {
		&self.checks
	}

	pub fn message(&self) -> &str {
		&self.message
	}
}

impl FieldValidator for RequiredIf {
	fn validate(&self, form: &Form, field: &Field) -> FormResult<()> {
		let filled = match &field.data {
			Some(Value::String(s)) => !s.trim().is_empty(),
			Some(value) => is_truthy(value),
			None => false,
		};
		if filled {
			return Ok(());
		}

		let mut satisfied = 0;
		for check in &self.checks {
			if check.is_satisfied(form)? {
				satisfied += 1;
			}
		}

		// An empty check list is vacuously satisfied.
		if satisfied == self.checks.len() {
			tracing::trace!(field = %field.name, checks = satisfied, "conditional requirement triggered");
			return Err(FormError::Field {
				field: field.name.clone(),
				error: FieldError::Required(self.message.clone()),
			});
		}
		Ok(())
	}
}

/// Build a conditional requirement for a field
///
/// `checks` takes precedence; when it is empty and `depend_name` is not, the
/// single check `(depend_name, op, value)` is used. With neither, the rule
/// has no checks at all and fails whenever the field is empty.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use topping_forms::Operator;
/// use topping_forms::validators::{Check, required_if};
///
/// let single = required_if("country", Some(Operator::Eq), json!("US"), vec![], "State is required");
/// assert_eq!(single.checks(), [Check::new("country", Operator::Eq, json!("US"))]);
///
/// let explicit = required_if(
///     "ignored",
///     None,
///     json!(null),
///     vec![Check::new("plan", Operator::Eq, json!("pro")), Check::new("seats", Operator::Gt, json!(5))],
///     "Billing contact is required",
/// );
/// assert_eq!(explicit.checks().len(), 2);
/// ```
pub fn required_if(
	depend_name: impl Into<String>,
	op: Option<Operator>,
	value: Value,
	checks: Vec<Check>,
	error_message: impl Into<String>,
) -> RequiredIf {
	let depend_name = depend_name.into();
	let checks = if !checks.is_empty() {
		checks
	} else if !depend_name.is_empty() {
		vec![Check {
			field: depend_name,
			op,
			value,
		}]
	} else {
		vec![]
	};
	RequiredIf::new(checks, error_message)
}
