/// Request validation
///
/// Each operation runs a declarative list of per-field checks before any
/// mutation. Failing fields are collected, never short-circuited, into a
/// field -> message-list map that becomes the 422 response envelope.
/// Database-backed checks (uniqueness, foreign-key existence) live here
/// too so a handler sees a single validated result.
mod categories;
mod comments;
mod posts;

pub use categories::{validate_category, CategoryData};
pub use comments::{validate_comment, CommentData};
pub use posts::{validate_post, PostData};

use crate::requests::UploadedFile;
use image::ImageFormat;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Image uploads are capped at 2048 kilobytes
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// Accepted upload formats
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["jpeg", "png", "jpg", "gif"];

/// Ordered field -> message-list map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for one field; empty when the field passed.
    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, messages.join(", "))?;
            first = false;
        }
        Ok(())
    }
}

/// Validation message catalog, worded the way API clients already
/// expect them
pub mod messages {
    fn display(field: &str) -> String {
        field.replace('_', " ")
    }

    pub fn required(field: &str) -> String {
        format!("The {} field is required.", display(field))
    }

    pub fn max_chars(field: &str, max: usize) -> String {
        format!(
            "The {} field must not be greater than {} characters.",
            display(field),
            max
        )
    }

    pub fn taken(field: &str) -> String {
        format!("The {} has already been taken.", display(field))
    }

    pub fn invalid_selection(field: &str) -> String {
        format!("The selected {} is invalid.", display(field))
    }

    pub fn image(field: &str) -> String {
        format!("The {} field must be an image.", display(field))
    }

    pub fn mimes(field: &str, types: &[&str]) -> String {
        format!(
            "The {} field must be a file of type: {}.",
            display(field),
            types.join(", ")
        )
    }

    pub fn max_kilobytes(field: &str, max_kb: usize) -> String {
        format!(
            "The {} field must not be greater than {} kilobytes.",
            display(field),
            max_kb
        )
    }

    pub fn email(field: &str) -> String {
        format!("The {} field must be a valid email address.", display(field))
    }

    pub fn boolean(field: &str) -> String {
        format!("The {} field must be true or false.", display(field))
    }

    pub fn date(field: &str) -> String {
        format!("The {} field must be a valid date.", display(field))
    }

    pub fn integer(field: &str) -> String {
        format!("The {} field must be an integer.", display(field))
    }

    pub fn category_cycle(field: &str) -> String {
        format!(
            "The {} must not reference the category itself or one of its descendants.",
            display(field)
        )
    }
}

/// True when a required text field is effectively missing
pub(crate) fn is_blank(value: Option<&str>) -> bool {
    value.map(str::trim).map_or(true, str::is_empty)
}

pub(crate) fn check_required(field: &str, value: Option<&str>, errors: &mut FieldErrors) {
    if is_blank(value) {
        errors.add(field, messages::required(field));
    }
}

pub(crate) fn check_max_chars(
    field: &str,
    value: Option<&str>,
    max: usize,
    errors: &mut FieldErrors,
) {
    if let Some(value) = value {
        if value.chars().count() > max {
            errors.add(field, messages::max_chars(field, max));
        }
    }
}

/// File constraints for an uploaded image: content must sniff as an
/// image, the format must be in the accepted set, and the size must be
/// under the cap. The client-declared content type is not trusted.
pub(crate) fn check_image(field: &str, file: &UploadedFile, errors: &mut FieldErrors) {
    match image::guess_format(&file.data) {
        Ok(ImageFormat::Jpeg) | Ok(ImageFormat::Png) | Ok(ImageFormat::Gif) => {}
        Ok(_) => errors.add(field, messages::mimes(field, &ALLOWED_IMAGE_TYPES)),
        Err(_) => errors.add(field, messages::image(field)),
    }
    if file.data.len() > MAX_IMAGE_BYTES {
        errors.add(field, messages::max_kilobytes(field, 2048));
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::requests::UploadedFile;

    pub const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
    pub const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0];
    pub const GIF_MAGIC: &[u8] = b"GIF89a";
    pub const BMP_MAGIC: &[u8] = b"BM";

    pub fn upload(file_name: &str, data: &[u8]) -> UploadedFile {
        UploadedFile {
            file_name: file_name.to_string(),
            content_type: None,
            data: data.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn field_errors_collects_in_field_order() {
        let mut errors = FieldErrors::new();
        errors.add("title", messages::required("title"));
        errors.add("author", messages::required("author"));
        errors.add("title", messages::max_chars("title", 255));

        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["author", "title"]);
        assert_eq!(errors.messages("title").len(), 2);
        assert_eq!(
            serde_json::to_value(&errors).unwrap()["author"],
            serde_json::json!(["The author field is required."])
        );
    }

    #[test]
    fn blank_detection_treats_whitespace_as_missing() {
        assert!(is_blank(None));
        assert!(is_blank(Some("")));
        assert!(is_blank(Some("   ")));
        assert!(!is_blank(Some("x")));
    }

    #[test]
    fn max_chars_counts_characters_not_bytes() {
        let mut errors = FieldErrors::new();
        let value = "é".repeat(255);
        check_max_chars("name", Some(&value), 255, &mut errors);
        assert!(errors.is_empty());

        let value = "é".repeat(256);
        check_max_chars("name", Some(&value), 255, &mut errors);
        assert_eq!(
            errors.messages("name"),
            &["The name field must not be greater than 255 characters."]
        );
    }

    #[test]
    fn image_check_accepts_allowed_formats() {
        for magic in [PNG_MAGIC, JPEG_MAGIC, GIF_MAGIC] {
            let mut errors = FieldErrors::new();
            check_image("image", &upload("pic.png", magic), &mut errors);
            assert!(errors.is_empty(), "rejected {:?}", &magic[..2]);
        }
    }

    #[test]
    fn image_check_rejects_non_image_content() {
        let mut errors = FieldErrors::new();
        check_image("image", &upload("pic.png", b"plain text"), &mut errors);
        assert_eq!(
            errors.messages("image"),
            &["The image field must be an image."]
        );
    }

    #[test]
    fn image_check_rejects_disallowed_image_format() {
        let mut errors = FieldErrors::new();
        check_image("image", &upload("pic.bmp", BMP_MAGIC), &mut errors);
        assert_eq!(
            errors.messages("image"),
            &["The image field must be a file of type: jpeg, png, jpg, gif."]
        );
    }

    #[test]
    fn image_check_rejects_oversized_file() {
        let mut data = PNG_MAGIC.to_vec();
        data.resize(MAX_IMAGE_BYTES + 1, 0);

        let mut errors = FieldErrors::new();
        check_image("image", &upload("big.png", &data), &mut errors);
        assert_eq!(
            errors.messages("image"),
            &["The image field must not be greater than 2048 kilobytes."]
        );
    }
}
