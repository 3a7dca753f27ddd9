//! Uploaded file extraction
//!
//! Reads the uploads submitted under a field name, drops entries without a
//! filename, and deduplicates by sanitized filename keeping the first entry
//! seen. Upload payloads are shared [`Bytes`] handles owned by the request;
//! nothing here consumes or closes them.

use bytes::Bytes;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

// Anything outside this set is removed from sanitized filenames.
static FILENAME_STRIP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"[^A-Za-z0-9_.-]").expect("FILENAME_STRIP_REGEX: invalid regex pattern")
});

const WINDOWS_DEVICE_NAMES: [&str; 22] = [
	"CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
	"COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// One uploaded file entry as delivered by the request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedFile {
	/// Client-supplied filename; `None` or empty when no file was chosen
	pub filename: Option<String>,
	pub content_type: Option<String>,
	pub content: Bytes,
}

impl UploadedFile {
	pub fn new(filename: impl Into<String>, content: impl Into<Bytes>) -> Self {
		Self {
			filename: Some(filename.into()),
			content_type: None,
			content: content.into(),
		}
	}

	/// An entry submitted with no file chosen.
	pub fn empty() -> Self {
		Self::default()
	}

	pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
		self.content_type = Some(content_type.into());
		self
	}

	/// The filename, if one was submitted and it is non-empty.
	pub fn filename(&self) -> Option<&str> {
		self.filename.as_deref().filter(|name| !name.is_empty())
	}

	pub fn size(&self) -> usize {
		self.content.len()
	}
}

/// Source of uploaded files for the current request
pub trait FileSource: Send + Sync {
	/// Every entry submitted under `name`, in submission order.
	fn files(&self, name: &str) -> Vec<UploadedFile>;
}

/// Multi-value collection of uploads keyed by field name
///
/// # Examples
///
/// ```
/// use topping_forms::{FileSource, RequestFiles, UploadedFile};
///
/// let mut files = RequestFiles::new();
/// files.add("docs", UploadedFile::new("a.txt", "a"));
/// files.add("docs", UploadedFile::new("b.txt", "b"));
///
/// assert_eq!(files.getlist("docs").len(), 2);
/// assert!(files.files("missing").is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestFiles {
	entries: Vec<(String, UploadedFile)>,
}

impl RequestFiles {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(&mut self, name: impl Into<String>, file: UploadedFile) {
		self.entries.push((name.into(), file));
	}

	pub fn with(mut self, name: impl Into<String>, file: UploadedFile) -> Self {
		self.add(name, file);
		self
	}

	pub fn getlist(&self, name: &str) -> Vec<&UploadedFile> {
		self.entries
			.iter()
			.filter(|(key, _)| key == name)
			.map(|(_, file)| file)
			.collect()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}
}

impl FileSource for RequestFiles {
	fn files(&self, name: &str) -> Vec<UploadedFile> {
		self.getlist(name).into_iter().cloned().collect()
	}
}

/// Turns a client-supplied filename into one safe to store
pub trait FilenameSanitizer: Send + Sync {
	fn sanitize(&self, filename: &str) -> String;
}

impl<F> FilenameSanitizer for F
where
	F: Fn(&str) -> String + Send + Sync,
{
	fn sanitize(&self, filename: &str) -> String {
		self(filename)
	}
}

/// The default sanitizer, see [`secure_filename`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SecureFilename;

impl FilenameSanitizer for SecureFilename {
	fn sanitize(&self, filename: &str) -> String {
		secure_filename(filename)
	}
}

/// Reduce a filename to ASCII letters, digits, `_`, `.` and `-`
///
/// Accents are decomposed and dropped, path separators and whitespace runs
/// become a single `_`, and leading or trailing dots and underscores are
/// trimmed. Windows device names get a `_` prefix. The result may be empty.
///
/// # Examples
///
/// ```
/// use topping_forms::secure_filename;
///
/// assert_eq!(secure_filename("My cool movie.mov"), "My_cool_movie.mov");
/// assert_eq!(secure_filename("../../../etc/passwd"), "etc_passwd");
/// assert_eq!(secure_filename("i contain cool \u{fc}ml\u{e4}uts.txt"), "i_contain_cool_umlauts.txt");
/// assert_eq!(secure_filename("con.txt"), "_con.txt");
/// ```
pub fn secure_filename(filename: &str) -> String {
	let ascii: String = filename.nfkd().filter(char::is_ascii).collect();
	let ascii = ascii.replace(['/', '\\'], " ");
	let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
	let stripped = FILENAME_STRIP_REGEX.replace_all(&joined, "");
	let cleaned = stripped.trim_matches(|c: char| c == '.' || c == '_').to_string();

	let stem = cleaned.split('.').next().unwrap_or_default().to_uppercase();
	if !cleaned.is_empty() && WINDOWS_DEVICE_NAMES.contains(&stem.as_str()) {
		return format!("_{cleaned}");
	}
	cleaned
}

/// An accepted upload with its original and sanitized filenames
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
	pub file: UploadedFile,
	pub filename: String,
	pub secure_filename: String,
}

impl FileDescriptor {
	/// Describe one upload; `None` when it carries no filename.
	pub fn from_upload(file: UploadedFile, sanitizer: &dyn FilenameSanitizer) -> Option<Self> {
		let filename = file.filename()?.to_string();
		let secure_filename = sanitizer.sanitize(&filename);
		Some(Self {
			file,
			filename,
			secure_filename,
		})
	}
}

/// Extract the uploads submitted under `name`
///
/// Entries without a filename are skipped. Among entries whose sanitized
/// filenames collide only the first one submitted is kept.
///
/// # Examples
///
/// ```
/// use topping_forms::{RequestFiles, SecureFilename, UploadedFile};
/// use topping_forms::files::extract_files;
///
/// let files = RequestFiles::new()
///     .with("docs", UploadedFile::new("report.pdf", "v1"))
///     .with("docs", UploadedFile::empty())
///     .with("docs", UploadedFile::new("../report.pdf", "v2"));
///
/// let extracted = extract_files(&files, &SecureFilename, "docs");
/// assert_eq!(extracted.len(), 1);
/// assert_eq!(extracted[0].file.content, "v1");
/// ```
pub fn extract_files(
	source: &dyn FileSource,
	sanitizer: &dyn FilenameSanitizer,
	name: &str,
) -> Vec<FileDescriptor> {
	let mut seen = HashSet::new();
	let mut accepted = Vec::new();

	for file in source.files(name) {
		let Some(descriptor) = FileDescriptor::from_upload(file, sanitizer) else {
			tracing::trace!(field = name, "skipping upload without filename");
			continue;
		};
		if seen.insert(descriptor.secure_filename.clone()) {
			accepted.push(descriptor);
		} else {
			tracing::trace!(
				field = name,
				filename = %descriptor.filename,
				secure_filename = %descriptor.secure_filename,
				"dropping duplicate upload"
			);
		}
	}

	tracing::debug!(field = name, accepted = accepted.len(), "extracted uploads");
	accepted
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("My File.txt", "My_File.txt")]
	#[case("  spaced   out  .txt ", "spaced_out_.txt")]
	#[case("..\\..\\windows\\system.ini", "windows_system.ini")]
	#[case("résumé.pdf", "resume.pdf")]
	#[case("...", "")]
	#[case("日本語", "")]
	#[case("NUL", "_NUL")]
	#[case("com1.log", "_com1.log")]
	#[case("console.log", "console.log")]
	#[case("a$b%c.tar.gz", "abc.tar.gz")]
	fn test_secure_filename(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(secure_filename(input), expected);
	}

	#[rstest]
	fn test_upload_filename_treats_empty_as_missing() {
		assert_eq!(UploadedFile::new("", "x").filename(), None);
		assert_eq!(UploadedFile::empty().filename(), None);
		assert_eq!(UploadedFile::new("a.txt", "x").filename(), Some("a.txt"));
	}

	#[rstest]
	fn test_descriptor_from_upload() {
		// Arrange
		let upload = UploadedFile::new("My Photo.png", vec![1u8, 2, 3]).with_content_type("image/png");

		// Act
		let descriptor = FileDescriptor::from_upload(upload.clone(), &SecureFilename).unwrap();

		// Assert
		assert_eq!(descriptor.filename, "My Photo.png");
		assert_eq!(descriptor.secure_filename, "My_Photo.png");
		assert_eq!(descriptor.file, upload);
		assert_eq!(descriptor.file.size(), 3);
	}

	#[rstest]
	fn test_extract_keeps_first_of_colliding_names() {
		// Arrange
		let files = RequestFiles::new()
			.with("docs", UploadedFile::new("My File.txt", "first"))
			.with("docs", UploadedFile::new("My/File.txt", "second"))
			.with("docs", UploadedFile::new("other.txt", "third"));

		// Act
		let extracted = extract_files(&files, &SecureFilename, "docs");

		// Assert
		let names: Vec<&str> = extracted.iter().map(|d| d.filename.as_str()).collect();
		assert_eq!(names, vec!["My File.txt", "other.txt"]);
		assert_eq!(extracted[0].file.content, "first");
	}

	#[rstest]
	fn test_extract_with_case_folding_sanitizer() {
		// Arrange
		let lowercase = |name: &str| secure_filename(name).to_lowercase();
		let files = RequestFiles::new()
			.with("docs", UploadedFile::new("My File.txt", "first"))
			.with("docs", UploadedFile::new("my file.txt", "second"));

		// Act
		let extracted = extract_files(&files, &lowercase, "docs");

		// Assert
		assert_eq!(extracted.len(), 1);
		assert_eq!(extracted[0].filename, "My File.txt");
		assert_eq!(extracted[0].secure_filename, "my_file.txt");
	}

	#[rstest]
	fn test_extract_skips_entries_without_filename() {
		let files = RequestFiles::new()
			.with("docs", UploadedFile::empty())
			.with("docs", UploadedFile::new("", "no name"));

		assert!(extract_files(&files, &SecureFilename, "docs").is_empty());
	}

	#[rstest]
	fn test_extract_ignores_other_field_names() {
		let files = RequestFiles::new()
			.with("avatar", UploadedFile::new("me.png", "png"))
			.with("docs", UploadedFile::new("cv.pdf", "pdf"));

		let extracted = extract_files(&files, &SecureFilename, "docs");

		assert_eq!(extracted.len(), 1);
		assert_eq!(extracted[0].filename, "cv.pdf");
	}
}
