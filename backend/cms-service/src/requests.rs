/// Typed request payloads
///
/// Handlers never touch the raw framework request: each operation parses
/// its body once into one of the payload structs below, from either a
/// JSON document or a `multipart/form-data` submission (the only way to
/// attach image files). Scalar multipart fields arrive as text; type
/// conversion failures are collected per field so they surface together
/// with the other validation messages.
use crate::error::{AppError, Result};
use crate::validators::{messages, FieldErrors};
use actix_multipart::Multipart;
use actix_web::{web, HttpMessage, HttpRequest};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;

/// Upper bound on any request body; two 2MB images plus fields fit well
/// under this.
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// An uploaded file received as a multipart part
#[derive(Clone)]
pub struct UploadedFile {
    /// Client-supplied file name (only its extension is trusted)
    pub file_name: String,
    /// Content type declared by the client, if any
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Fields accepted when creating or updating a category
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct CategoryPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_published: Option<bool>,
    pub parent_id: Option<i64>,
    #[serde(skip)]
    pub image: Option<UploadedFile>,
    /// Type conversion failures from the multipart path
    #[serde(skip)]
    pub type_errors: FieldErrors,
}

/// Fields accepted when creating or updating a post
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PostPayload {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<i64>,
    pub user_id: Option<i64>,
    pub is_published: Option<bool>,
    pub published_at: Option<DateTime<Utc>>,
    pub author: Option<String>,
    #[serde(skip)]
    pub image_thumbnail: Option<UploadedFile>,
    #[serde(skip)]
    pub image_content: Option<UploadedFile>,
    #[serde(skip)]
    pub type_errors: FieldErrors,
}

/// Fields accepted when creating or updating a comment
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct CommentPayload {
    pub post_id: Option<i64>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub content: Option<String>,
    pub is_published: Option<bool>,
    pub published_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub type_errors: FieldErrors,
}

impl CategoryPayload {
    pub async fn parse(req: &HttpRequest, body: web::Payload) -> Result<Self> {
        match read_body(req, body).await? {
            RequestBody::Json(bytes) => parse_json(&bytes),
            RequestBody::Form(mut form) => {
                let mut errors = FieldErrors::new();
                Ok(Self {
                    name: form.take_text("name"),
                    description: form.take_text("description"),
                    is_published: form
                        .take_text("is_published")
                        .and_then(|v| parse_bool("is_published", &v, &mut errors)),
                    parent_id: form
                        .take_text("parent_id")
                        .and_then(|v| parse_id("parent_id", &v, &mut errors)),
                    image: form.take_file("image"),
                    type_errors: errors,
                })
            }
        }
    }
}

impl PostPayload {
    pub async fn parse(req: &HttpRequest, body: web::Payload) -> Result<Self> {
        match read_body(req, body).await? {
            RequestBody::Json(bytes) => parse_json(&bytes),
            RequestBody::Form(mut form) => {
                let mut errors = FieldErrors::new();
                Ok(Self {
                    title: form.take_text("title"),
                    content: form.take_text("content"),
                    category_id: form
                        .take_text("category_id")
                        .and_then(|v| parse_id("category_id", &v, &mut errors)),
                    user_id: form
                        .take_text("user_id")
                        .and_then(|v| parse_id("user_id", &v, &mut errors)),
                    is_published: form
                        .take_text("is_published")
                        .and_then(|v| parse_bool("is_published", &v, &mut errors)),
                    published_at: form
                        .take_text("published_at")
                        .and_then(|v| parse_datetime("published_at", &v, &mut errors)),
                    author: form.take_text("author"),
                    image_thumbnail: form.take_file("image_thumbnail"),
                    image_content: form.take_file("image_content"),
                    type_errors: errors,
                })
            }
        }
    }
}

impl CommentPayload {
    pub async fn parse(req: &HttpRequest, body: web::Payload) -> Result<Self> {
        match read_body(req, body).await? {
            RequestBody::Json(bytes) => parse_json(&bytes),
            RequestBody::Form(mut form) => {
                let mut errors = FieldErrors::new();
                Ok(Self {
                    post_id: form
                        .take_text("post_id")
                        .and_then(|v| parse_id("post_id", &v, &mut errors)),
                    name: form.take_text("name"),
                    email: form.take_text("email"),
                    content: form.take_text("content"),
                    is_published: form
                        .take_text("is_published")
                        .and_then(|v| parse_bool("is_published", &v, &mut errors)),
                    published_at: form
                        .take_text("published_at")
                        .and_then(|v| parse_datetime("published_at", &v, &mut errors)),
                    type_errors: errors,
                })
            }
        }
    }
}

// ========================================
// Body reading
// ========================================

enum RequestBody {
    Json(web::Bytes),
    Form(RawForm),
}

/// Multipart fields collected before typing
#[derive(Default)]
struct RawForm {
    texts: Vec<(String, String)>,
    files: Vec<(String, UploadedFile)>,
}

impl RawForm {
    /// Last occurrence wins, mirroring form submission semantics.
    /// Empty strings count as absent (HTML forms send them for blank
    /// inputs).
    fn take_text(&mut self, name: &str) -> Option<String> {
        let mut value = None;
        self.texts.retain(|(key, text)| {
            if key == name {
                value = Some(text.clone());
                false
            } else {
                true
            }
        });
        value.filter(|v| !v.trim().is_empty())
    }

    fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        let mut value = None;
        self.files.retain(|(key, file)| {
            if key == name {
                value = Some(file.clone());
                false
            } else {
                true
            }
        });
        value.filter(|f| !f.data.is_empty())
    }
}

async fn read_body(req: &HttpRequest, mut body: web::Payload) -> Result<RequestBody> {
    if req
        .content_type()
        .starts_with(mime::MULTIPART_FORM_DATA.essence_str())
    {
        let mut multipart = Multipart::new(req.headers(), body);
        let mut form = RawForm::default();
        let mut total = 0usize;

        while let Some(item) = multipart.next().await {
            let mut field =
                item.map_err(|e| AppError::BadRequest(format!("Multipart error: {}", e)))?;
            let name = field.name().to_string();
            let file_name = field
                .content_disposition()
                .get_filename()
                .map(|f| f.to_string());
            let content_type = field.content_type().map(|m| m.to_string());

            let mut data = Vec::new();
            while let Some(chunk) = field.next().await {
                let bytes =
                    chunk.map_err(|e| AppError::BadRequest(format!("Multipart read error: {}", e)))?;
                total += bytes.len();
                if total > MAX_BODY_BYTES {
                    return Err(AppError::BadRequest("Request body too large".to_string()));
                }
                data.extend_from_slice(&bytes);
            }

            match file_name {
                Some(file_name) => form.files.push((
                    name,
                    UploadedFile {
                        file_name,
                        content_type,
                        data,
                    },
                )),
                None => form
                    .texts
                    .push((name, String::from_utf8_lossy(&data).into_owned())),
            }
        }

        Ok(RequestBody::Form(form))
    } else {
        let mut buffer = web::BytesMut::new();
        while let Some(chunk) = body.next().await {
            let bytes =
                chunk.map_err(|e| AppError::BadRequest(format!("Error reading body: {}", e)))?;
            if buffer.len() + bytes.len() > MAX_BODY_BYTES {
                return Err(AppError::BadRequest("Request body too large".to_string()));
            }
            buffer.extend_from_slice(&bytes);
        }
        Ok(RequestBody::Json(buffer.freeze()))
    }
}

fn parse_json<T: DeserializeOwned + Default>(bytes: &[u8]) -> Result<T> {
    if bytes.is_empty() {
        return Ok(T::default());
    }
    serde_json::from_slice(bytes)
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e)))
}

// ========================================
// Scalar field conversion
// ========================================

fn parse_bool(field: &str, value: &str, errors: &mut FieldErrors) -> Option<bool> {
    match value {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => {
            errors.add(field, messages::boolean(field));
            None
        }
    }
}

fn parse_id(field: &str, value: &str, errors: &mut FieldErrors) -> Option<i64> {
    match value.parse::<i64>() {
        Ok(id) => Some(id),
        Err(_) => {
            errors.add(field, messages::integer(field));
            None
        }
    }
}

fn parse_datetime(field: &str, value: &str, errors: &mut FieldErrors) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Some(naive.and_utc());
        }
    }
    errors.add(field, messages::date(field));
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_payload_from_json() {
        let body = br#"{"name":"Tech","description":"All tech","is_published":true,"parent_id":3}"#;
        let payload: CategoryPayload = parse_json(body).unwrap();

        assert_eq!(payload.name.as_deref(), Some("Tech"));
        assert_eq!(payload.description.as_deref(), Some("All tech"));
        assert_eq!(payload.is_published, Some(true));
        assert_eq!(payload.parent_id, Some(3));
        assert!(payload.image.is_none());
        assert!(payload.type_errors.is_empty());
    }

    #[test]
    fn missing_json_fields_stay_absent() {
        let payload: CategoryPayload = parse_json(br#"{"name":"Tech"}"#).unwrap();

        assert_eq!(payload.name.as_deref(), Some("Tech"));
        assert!(payload.description.is_none());
        assert!(payload.is_published.is_none());
    }

    #[test]
    fn empty_body_parses_to_default() {
        let payload: PostPayload = parse_json(b"").unwrap();
        assert!(payload.title.is_none());
        assert!(payload.category_id.is_none());
    }

    #[test]
    fn malformed_json_is_a_bad_request() {
        let result: Result<CommentPayload> = parse_json(b"{not json");
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn post_payload_parses_rfc3339_published_at() {
        let payload: PostPayload =
            parse_json(br#"{"title":"Hi","published_at":"2024-03-01T10:30:00Z"}"#).unwrap();
        assert_eq!(
            payload.published_at.unwrap().to_rfc3339(),
            "2024-03-01T10:30:00+00:00"
        );
    }

    #[test]
    fn form_scalar_conversion_accepts_common_boolean_spellings() {
        let mut errors = FieldErrors::new();
        assert_eq!(parse_bool("is_published", "1", &mut errors), Some(true));
        assert_eq!(parse_bool("is_published", "false", &mut errors), Some(false));
        assert!(errors.is_empty());

        assert_eq!(parse_bool("is_published", "yep", &mut errors), None);
        assert_eq!(
            errors.messages("is_published"),
            &["The is published field must be true or false."]
        );
    }

    #[test]
    fn form_scalar_conversion_collects_integer_errors() {
        let mut errors = FieldErrors::new();
        assert_eq!(parse_id("parent_id", "42", &mut errors), Some(42));
        assert_eq!(parse_id("parent_id", "abc", &mut errors), None);
        assert_eq!(
            errors.messages("parent_id"),
            &["The parent id field must be an integer."]
        );
    }

    #[test]
    fn form_datetime_accepts_three_formats() {
        let mut errors = FieldErrors::new();
        assert!(parse_datetime("published_at", "2024-03-01T10:30:00Z", &mut errors).is_some());
        assert!(parse_datetime("published_at", "2024-03-01 10:30:00", &mut errors).is_some());
        let midnight = parse_datetime("published_at", "2024-03-01", &mut errors).unwrap();
        assert_eq!(midnight.to_rfc3339(), "2024-03-01T00:00:00+00:00");
        assert!(errors.is_empty());

        assert!(parse_datetime("published_at", "next tuesday", &mut errors).is_none());
        assert_eq!(
            errors.messages("published_at"),
            &["The published at field must be a valid date."]
        );
    }

    #[test]
    fn raw_form_last_occurrence_wins_and_blanks_are_absent() {
        let mut form = RawForm::default();
        form.texts.push(("name".into(), "First".into()));
        form.texts.push(("name".into(), "Second".into()));
        form.texts.push(("description".into(), "   ".into()));

        assert_eq!(form.take_text("name").as_deref(), Some("Second"));
        assert!(form.take_text("name").is_none());
        assert!(form.take_text("description").is_none());
    }

    #[test]
    fn raw_form_drops_empty_file_parts() {
        let mut form = RawForm::default();
        form.files.push((
            "image".into(),
            UploadedFile {
                file_name: "empty.png".into(),
                content_type: None,
                data: vec![],
            },
        ));

        assert!(form.take_file("image").is_none());
    }
}
