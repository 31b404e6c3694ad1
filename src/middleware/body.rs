//! Body parsing middleware
//!
//! Reads a bounded request body and decodes URL-encoded or JSON payloads
//! into a flat field map. Undecodable bodies become an empty map so the
//! handler sees missing fields instead of a failed request.

use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::logger;
use crate::store::ArticleFields;

pub type FormFields = HashMap<String, String>;

#[derive(Debug, Error)]
pub enum BodyError {
    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("failed to read request body: {0}")]
    Read(String),
}

/// Why a body decoded to nothing
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BodyParseFailure {
    #[error("unsupported content type '{0}'")]
    UnsupportedContentType(String),

    #[error("malformed url-encoded body: {0}")]
    UrlEncoded(String),

    #[error("malformed JSON body: {0}")]
    Json(String),

    #[error("JSON body is not an object")]
    NotAnObject,
}

/// Collect the body, failing once more than `limit` bytes arrive
pub async fn read_body<B>(body: B, limit: u64) -> Result<Bytes, BodyError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let max = usize::try_from(limit).unwrap_or(usize::MAX);
    match Limited::new(body, max).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err(BodyError::TooLarge { limit })
        }
        Err(e) => Err(BodyError::Read(e.to_string())),
    }
}

/// Decode by `Content-Type`; parameters such as `charset` are ignored
pub fn parse_fields(content_type: Option<&str>, bytes: &[u8]) -> Result<FormFields, BodyParseFailure> {
    if bytes.is_empty() {
        return Ok(FormFields::new());
    }

    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|m| m.trim().to_ascii_lowercase())
        .unwrap_or_default();

    match mime.as_str() {
        "application/x-www-form-urlencoded" => {
            serde_urlencoded::from_bytes::<Vec<(String, String)>>(bytes)
                .map(|pairs| pairs.into_iter().collect())
                .map_err(|e| BodyParseFailure::UrlEncoded(e.to_string()))
        }
        "application/json" => {
            let value: serde_json::Value = serde_json::from_slice(bytes)
                .map_err(|e| BodyParseFailure::Json(e.to_string()))?;
            let serde_json::Value::Object(map) = value else {
                return Err(BodyParseFailure::NotAnObject);
            };
            Ok(map
                .into_iter()
                .filter_map(|(k, v)| match v {
                    serde_json::Value::String(s) => Some((k, s)),
                    serde_json::Value::Number(n) => Some((k, n.to_string())),
                    serde_json::Value::Bool(b) => Some((k, b.to_string())),
                    _ => None,
                })
                .collect())
        }
        other => Err(BodyParseFailure::UnsupportedContentType(other.to_string())),
    }
}

/// `parse_fields`, degrading to an empty map with a warning
pub fn parse_fields_or_empty(content_type: Option<&str>, bytes: &[u8]) -> FormFields {
    parse_fields(content_type, bytes).unwrap_or_else(|e| {
        logger::log_warning(&format!("Body parse failure: {e}"));
        FormFields::new()
    })
}

/// Field-level validation message shown next to the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Submitted article form for the add and edit routes
///
/// All three fields are required and must not be blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArticleForm {
    pub title: String,
    pub author: String,
    pub body: String,
}

impl ArticleForm {
    pub fn from_fields(fields: &FormFields) -> Self {
        let get = |name: &str| fields.get(name).cloned().unwrap_or_default();
        Self {
            title: get("title"),
            author: get("author"),
            body: get("body"),
        }
    }

    pub fn validate(&self) -> Result<ArticleFields, Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push(FieldError { field: "title", message: "Title is required" });
        }
        if self.author.trim().is_empty() {
            errors.push(FieldError { field: "author", message: "Author is required" });
        }
        if self.body.trim().is_empty() {
            errors.push(FieldError { field: "body", message: "Body is required" });
        }

        if errors.is_empty() {
            Ok(ArticleFields {
                title: self.title.trim().to_string(),
                author: self.author.trim().to_string(),
                body: self.body.clone(),
            })
        } else {
            Err(errors)
        }
    }
}
