//! Form configuration layer.
//!
//! # Examples
//!
//! ```rust,no_run
//! # #[cfg(feature = "forms")]
//! use topping::forms::{Operator, required_if};
//! # #[cfg(feature = "forms")]
//! use topping::forms::files::extract_files;
//! ```

#[cfg(feature = "forms")]
pub use topping_forms::*;
