//! # Topping
//!
//! Declarative configuration for server-side web forms.
//!
//! A form class declares which fields are lowercased, uppercased, left
//! unstripped, excluded or renamed. Declarations are merged across the class
//! chain and applied when the bound data is turned into a record.
//!
//! ## Feature Flags
//!
//! - `forms` (default) - Form configuration layer
//!
//! ## Quick Example
//!
//! ```rust
//! # #[cfg(feature = "forms")]
//! # {
//! use std::sync::Arc;
//! use serde_json::json;
//! use topping::forms::{Field, FieldKind, Form, FormClass, FormConfig, NormalizeOptions};
//!
//! let class = FormClass::new("Signup", FormConfig::new().lowers(["email"]));
//! let mut form = Form::new(Arc::new(class));
//! form.add_field(Field::new("email", FieldKind::Email).with_data(json!(" Me@Example.com ")));
//!
//! let record = form.normalize(NormalizeOptions::new());
//! assert_eq!(record["email"], json!("me@example.com"));
//! # }
//! ```

#[cfg(feature = "forms")]
pub mod forms;

#[cfg(feature = "forms")]
pub use topping_forms::{Form, FormClass, FormConfig, FormError, FormResult, NormalizeOptions};
