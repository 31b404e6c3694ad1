// Article data model
// Identifier scheme and the mutable field set

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::error::StoreError;

/// Store-generated article identifier
///
/// Rendered in hyphenated form. Parsing also accepts the 32-char simple form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(Uuid);

impl ArticleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ArticleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for ArticleId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Uuid::parse_str also takes braced and urn forms; keep the scheme narrow
        let s = s.trim();
        if s.len() != 32 && s.len() != 36 {
            return Err(StoreError::InvalidId(s.to_string()));
        }
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| StoreError::InvalidId(s.to_string()))
    }
}

/// Mutable part of an article
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleFields {
    pub title: String,
    pub author: String,
    pub body: String,
}

/// Persisted article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub author: String,
    pub body: String,
}

impl Article {
    pub fn new(id: ArticleId, fields: ArticleFields) -> Self {
        Self {
            id,
            title: fields.title,
            author: fields.author,
            body: fields.body,
        }
    }

    /// Overwrite every mutable field, keeping the id
    pub fn replace_fields(&mut self, fields: ArticleFields) {
        self.title = fields.title;
        self.author = fields.author;
        self.body = fields.body;
    }

    pub fn fields(&self) -> ArticleFields {
        ArticleFields {
            title: self.title.clone(),
            author: self.author.clone(),
            body: self.body.clone(),
        }
    }
}
