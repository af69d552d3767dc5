/// CMS Service Library
///
/// REST API for managing categories, posts and comments, backed by
/// PostgreSQL with uploaded images stored on a public file tier.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers, one set per resource
/// - `models`: Database entity structures
/// - `requests`: Typed request payloads parsed from JSON or multipart
/// - `validators`: Per-operation field constraint checks
/// - `resources`: JSON serialization shapes for API responses
/// - `db`: Database access layer and repositories
/// - `error`: Error types and response envelopes
/// - `config`: Configuration management
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod requests;
pub mod resources;
pub mod validators;

pub use config::Config;
pub use error::{AppError, Result};
