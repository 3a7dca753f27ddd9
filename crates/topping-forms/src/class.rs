//! Form class declarations and their resolution
//!
//! Every form is an instance of a [`FormClass`]. A class declares a
//! [`FormConfig`] of its own and may extend a parent class; the settings that
//! apply to a form are the merge of the whole chain, leaf first:
//!
//! - the four name sets (`lowers`, `uppers`, `nostrips`, `excludes`) are
//!   unioned across every class in the chain
//! - for `aliases`, the class nearest to the leaf that declares a key wins
//!
//! Resolution is recomputed on every call; nothing is cached on the class.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use topping_forms::{FormClass, FormConfig};
//!
//! let base = Arc::new(FormClass::new("AccountForm", FormConfig::new().lowers(["email"])));
//! let signup = FormClass::new("SignupForm", FormConfig::new().excludes(["accept_terms"]))
//!     .extends(base);
//!
//! let resolved = signup.resolved();
//! assert!(resolved.lowers.contains("email"));
//! assert!(resolved.excludes.contains("accept_terms"));
//! ```

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Per-class declarations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormConfig {
	pub lowers: BTreeSet<String>,
	pub uppers: BTreeSet<String>,
	pub nostrips: BTreeSet<String>,
	pub excludes: BTreeSet<String>,
	pub aliases: HashMap<String, String>,
}

fn names<I, S>(names: I) -> impl Iterator<Item = String>
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	names.into_iter().map(Into::into)
}

impl FormConfig {
	pub fn new() -> Self {
		Self::default()
	}

	/// Fields whose string values are lowercased.
	pub fn lowers<I, S>(mut self, fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.lowers.extend(names(fields));
		self
	}

	/// Fields whose string values are uppercased.
	pub fn uppers<I, S>(mut self, fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.uppers.extend(names(fields));
		self
	}

	/// Fields whose string values keep surrounding whitespace.
	pub fn nostrips<I, S>(mut self, fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.nostrips.extend(names(fields));
		self
	}

	/// Fields left out of the normalized record.
	pub fn excludes<I, S>(mut self, fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.excludes.extend(names(fields));
		self
	}

	/// Output names substituted for field names.
	pub fn aliases<I, K, V>(mut self, aliases: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self.aliases
			.extend(aliases.into_iter().map(|(k, v)| (k.into(), v.into())));
		self
	}

	/// Merge `self` (the more derived declaration) over `parent`.
	///
	/// Sets are unioned. An alias declared by `self` shadows the parent's
	/// alias for the same field.
	///
	/// # Examples
	///
	/// ```
	/// use topping_forms::FormConfig;
	///
	/// let parent = FormConfig::new().excludes(["p"]).aliases([("x", "parent_out")]);
	/// let child = FormConfig::new().excludes(["q"]).aliases([("x", "child_out")]);
	///
	/// let merged = child.merge(&parent);
	/// assert_eq!(merged.excludes.len(), 2);
	/// assert_eq!(merged.aliases["x"], "child_out");
	/// ```
	pub fn merge(&self, parent: &FormConfig) -> FormConfig {
		let mut merged = self.clone();
		merged.lowers.extend(parent.lowers.iter().cloned());
		merged.uppers.extend(parent.uppers.iter().cloned());
		merged.nostrips.extend(parent.nostrips.iter().cloned());
		merged.excludes.extend(parent.excludes.iter().cloned());
		for (field, alias) in &parent.aliases {
			merged
				.aliases
				.entry(field.clone())
				.or_insert_with(|| alias.clone());
		}
		merged
	}
}

/// Which declaration to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
	Lowers,
	Uppers,
	NoStrips,
	Excludes,
	Aliases,
}

/// Result of resolving one [`AttrKind`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedAttr {
	Names(BTreeSet<String>),
	Aliases(HashMap<String, String>),
}

impl ResolvedAttr {
	pub fn as_names(&self) -> Option<&BTreeSet<String>> {
		match self {
			ResolvedAttr::Names(names) => Some(names),
			ResolvedAttr::Aliases(_) => None,
		}
	}

	pub fn as_aliases(&self) -> Option<&HashMap<String, String>> {
		match self {
			ResolvedAttr::Aliases(aliases) => Some(aliases),
			ResolvedAttr::Names(_) => None,
		}
	}
}

/// Configuration in effect for one form instance, merged across its chain.
pub type ResolvedConfig = FormConfig;

/// A form class: a name, its own declarations, and an optional parent
#[derive(Debug, Clone)]
pub struct FormClass {
	name: String,
	config: FormConfig,
	parent: Option<Arc<FormClass>>,
}

impl FormClass {
	pub fn new(name: impl Into<String>, config: FormConfig) -> Self {
		Self {
			name: name.into(),
			config,
			parent: None,
		}
	}

	pub fn extends(mut self, parent: Arc<FormClass>) -> Self {
		self.parent = Some(parent);
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Declarations made by this class alone.
	pub fn config(&self) -> &FormConfig {
		&self.config
	}

	pub fn parent(&self) -> Option<&Arc<FormClass>> {
		self.parent.as_ref()
	}

	/// Walk the chain from this class up to the root, leaf first.
	pub fn ancestry(&self) -> Ancestry<'_> {
		Ancestry { next: Some(self) }
	}

	/// Merge the declarations of the whole chain.
	pub fn resolved(&self) -> ResolvedConfig {
		self.ancestry()
			.fold(FormConfig::default(), |acc, class| acc.merge(&class.config))
	}

	/// Resolve a single declaration across the chain
	///
	/// # Examples
	///
	/// ```
	/// use std::sync::Arc;
	/// use topping_forms::{AttrKind, FormClass, FormConfig};
	///
	/// let a = Arc::new(FormClass::new("A", FormConfig::new().aliases([("x", "a_out")])));
	/// let b = Arc::new(FormClass::new("B", FormConfig::new().aliases([("x", "b_out")])).extends(a));
	/// let c = FormClass::new("C", FormConfig::new()).extends(b);
	///
	/// let aliases = c.resolve(AttrKind::Aliases);
	/// assert_eq!(aliases.as_aliases().unwrap()["x"], "b_out");
	/// ```
	pub fn resolve(&self, kind: AttrKind) -> ResolvedAttr {
		let resolved = self.resolved();
		match kind {
			AttrKind::Lowers => ResolvedAttr::Names(resolved.lowers),
			AttrKind::Uppers => ResolvedAttr::Names(resolved.uppers),
			AttrKind::NoStrips => ResolvedAttr::Names(resolved.nostrips),
			AttrKind::Excludes => ResolvedAttr::Names(resolved.excludes),
			AttrKind::Aliases => ResolvedAttr::Aliases(resolved.aliases),
		}
	}
}

/// Leaf-first iterator over a class chain
pub struct Ancestry<'a> {
	next: Option<&'a FormClass>,
}

impl<'a> Iterator for Ancestry<'a> {
	type Item = &'a FormClass;

	fn next(&mut self) -> Option<Self::Item> {
		let current = self.next?;
		self.next = current.parent.as_deref();
		Some(current)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn set(items: &[&str]) -> BTreeSet<String> {
		items.iter().map(|s| s.to_string()).collect()
	}

	fn chain(a: FormConfig, b: FormConfig, c: FormConfig) -> FormClass {
		let a = Arc::new(FormClass::new("A", a));
		let b = Arc::new(FormClass::new("B", b).extends(a));
		FormClass::new("C", c).extends(b)
	}

	#[rstest]
	fn test_ancestry_is_leaf_first() {
		// Arrange
		let c = chain(FormConfig::new(), FormConfig::new(), FormConfig::new());

		// Act
		let names: Vec<&str> = c.ancestry().map(FormClass::name).collect();

		// Assert
		assert_eq!(names, vec!["C", "B", "A"]);
	}

	#[rstest]
	fn test_nearest_alias_declaration_wins() {
		// Arrange
		let c = chain(
			FormConfig::new().aliases([("x", "a_out"), ("y", "a_y")]),
			FormConfig::new().aliases([("x", "b_out")]),
			FormConfig::new(),
		);

		// Act
		let resolved = c.resolve(AttrKind::Aliases);

		// Assert
		let aliases = resolved.as_aliases().unwrap();
		assert_eq!(aliases["x"], "b_out");
		assert_eq!(aliases["y"], "a_y");
	}

	#[rstest]
	fn test_leaf_alias_beats_every_ancestor() {
		let c = chain(
			FormConfig::new().aliases([("x", "a_out")]),
			FormConfig::new().aliases([("x", "b_out")]),
			FormConfig::new().aliases([("x", "c_out")]),
		);

		assert_eq!(c.resolved().aliases["x"], "c_out");
	}

	#[rstest]
	#[case(AttrKind::Lowers)]
	#[case(AttrKind::Uppers)]
	#[case(AttrKind::NoStrips)]
	#[case(AttrKind::Excludes)]
	fn test_name_sets_are_unioned(#[case] kind: AttrKind) {
		// Arrange
		let declare = |config: FormConfig, names: &[&str]| match kind {
			AttrKind::Lowers => config.lowers(names.iter().copied()),
			AttrKind::Uppers => config.uppers(names.iter().copied()),
			AttrKind::NoStrips => config.nostrips(names.iter().copied()),
			AttrKind::Excludes => config.excludes(names.iter().copied()),
			AttrKind::Aliases => unreachable!(),
		};
		let c = chain(
			declare(FormConfig::new(), &["p"]),
			declare(FormConfig::new(), &["q", "p"]),
			FormConfig::new(),
		);

		// Act
		let resolved = c.resolve(kind);

		// Assert
		assert_eq!(resolved.as_names(), Some(&set(&["p", "q"])));
	}

	#[rstest]
	fn test_missing_declarations_resolve_empty() {
		let class = FormClass::new("Bare", FormConfig::new());

		assert_eq!(class.resolved(), FormConfig::default());
		assert!(class.resolve(AttrKind::Excludes).as_names().unwrap().is_empty());
	}

	#[rstest]
	fn test_resolution_reflects_current_declarations() {
		// Arrange
		let mut class = FormClass::new("Profile", FormConfig::new().lowers(["email"]));
		assert_eq!(class.resolved().lowers, set(&["email"]));

		// Act
		class.config = class.config.clone().lowers(["username"]);

		// Assert
		assert_eq!(class.resolved().lowers, set(&["email", "username"]));
	}
}
