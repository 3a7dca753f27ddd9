//! Conditional requirement tests
//!
//! Decision tables for `required_if` evaluated through `Form::validate`.

use rstest::rstest;
use serde_json::{Value, json};
use std::sync::Arc;
use topping_forms::validators::DEFAULT_REQUIRED_MESSAGE;
use topping_forms::{
	Check, Field, FieldKind, Form, FormClass, FormConfig, FormError, Operator, required_if,
};

fn contact_form(email: Value, confirm_email: Value) -> Form {
	let mut form = Form::new(Arc::new(FormClass::new("ContactForm", FormConfig::new())));
	form.add_field(Field::new("email", FieldKind::Email).with_data(email));
	form.add_field(
		Field::new("confirm_email", FieldKind::Email)
			.with_data(confirm_email)
			.with_validator(required_if(
				"email",
				Some(Operator::Ne),
				json!(""),
				vec![],
				"Please confirm your email",
			)),
	);
	form
}

/// DT-001 to DT-006: confirm_email required when email is set.
///
/// | Case | email | confirm_email | Expected |
/// |------|-------|---------------|----------|
/// | DT-001 | "a@b.com" | "" | invalid |
/// | DT-002 | "a@b.com" | "   " | invalid |
/// | DT-003 | "a@b.com" | "a@b.com" | valid |
/// | DT-004 | "" | "" | valid |
/// | DT-005 | "  " | "" | valid |
/// | DT-006 | "" | "a@b.com" | valid |
#[rstest]
#[case(json!("a@b.com"), json!(""), false)] // DT-001
#[case(json!("a@b.com"), json!("   "), false)] // DT-002
#[case(json!("a@b.com"), json!("a@b.com"), true)] // DT-003
#[case(json!(""), json!(""), true)] // DT-004
#[case(json!("  "), json!(""), true)] // DT-005
#[case(json!(""), json!("a@b.com"), true)] // DT-006
fn test_confirm_email_decision_table(
	#[case] email: Value,
	#[case] confirm_email: Value,
	#[case] expected_valid: bool,
) {
	// Arrange
	let mut form = contact_form(email, confirm_email);

	// Act
	let valid = form.validate().unwrap();

	// Assert
	assert_eq!(valid, expected_valid);
	if !expected_valid {
		assert_eq!(
			form.errors()["confirm_email"],
			vec!["Please confirm your email".to_string()]
		);
	}
}

#[rstest]
fn test_unbound_target_counts_as_empty() {
	let mut form = contact_form(json!("a@b.com"), Value::Null);

	assert!(!form.validate().unwrap());
}

/// The rule has no checks when neither `checks` nor `depend_name` is given,
/// so "all checks satisfied" holds vacuously and every empty submission
/// fails. Kept deliberately although it is easy to trip over.
#[rstest]
#[case(json!(""), false)]
#[case(Value::Null, false)]
#[case(json!("filled"), true)]
fn test_rule_without_checks_always_requires(#[case] data: Value, #[case] expected_valid: bool) {
	// Arrange
	let mut form = Form::new(Arc::new(FormClass::new("Survey", FormConfig::new())));
	form.add_field(Field::new("answer", FieldKind::String).with_data(data).with_validator(
		required_if("", None, Value::Null, vec![], DEFAULT_REQUIRED_MESSAGE),
	));

	// Act
	let valid = form.validate().unwrap();

	// Assert
	assert_eq!(valid, expected_valid);
}

#[rstest]
fn test_check_without_operator_never_triggers() {
	// Arrange
	let mut form = Form::new(Arc::new(FormClass::new("Survey", FormConfig::new())));
	form.add_field(Field::new("other", FieldKind::String).with_data(json!("yes")));
	form.add_field(
		Field::new("details", FieldKind::String)
			.with_data(json!(""))
			.with_validator(required_if("other", None, json!("yes"), vec![], "Required")),
	);

	// Act + Assert
	assert!(form.validate().unwrap());
}

#[rstest]
#[case(json!("pro"), json!(10), false)]
#[case(json!("pro"), json!(2), true)]
#[case(json!("basic"), json!(10), true)]
fn test_every_check_must_hold(#[case] plan: Value, #[case] seats: Value, #[case] expected_valid: bool) {
	// Arrange
	let mut form = Form::new(Arc::new(FormClass::new("Billing", FormConfig::new())));
	form.add_field(Field::new("plan", FieldKind::Radio).with_data(plan));
	form.add_field(Field::new("seats", FieldKind::Integer).with_data(seats));
	form.add_field(
		Field::new("billing_contact", FieldKind::Email)
			.with_data(json!(""))
			.with_validator(required_if(
				"",
				None,
				Value::Null,
				vec![
					Check::parse("plan", "in", json!(["pro", "enterprise"])).unwrap(),
					Check::parse("seats", "ge", json!(5)).unwrap(),
				],
				"A billing contact is required",
			)),
	);

	// Act
	let valid = form.validate().unwrap();

	// Assert
	assert_eq!(valid, expected_valid);
}

#[rstest]
fn test_unknown_dependency_field_propagates() {
	// Arrange
	let mut form = Form::new(Arc::new(FormClass::new("Broken", FormConfig::new())));
	form.add_field(
		Field::new("state", FieldKind::String)
			.with_data(json!(""))
			.with_validator(required_if(
				"countr",
				Some(Operator::Eq),
				json!("US"),
				vec![],
				"State is required",
			)),
	);

	// Act
	let result = form.validate();

	// Assert
	assert!(matches!(result, Err(FormError::FieldNotFound(name)) if name == "countr"));
}

#[rstest]
fn test_unknown_operator_name_is_rejected() {
	let result = Check::parse("plan", "matches", json!("pro"));

	assert!(matches!(result, Err(FormError::UnknownOperator(op)) if op == "matches"));
}
