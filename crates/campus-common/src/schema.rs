use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::Collection;

/// JSON shape accepted for a single field of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    DateTime,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

/// A record kind stored in its own collection.
pub trait Record: Serialize + Validate {
    const COLLECTION: Collection;
    const FIELDS: &'static [FieldSpec];
}

#[derive(Serialize, Deserialize, Validate, Debug, Clone, PartialEq)]
pub struct Faculty {
    pub name: String,
    pub description: Option<String>,
    pub dean: Option<String>,
    pub website: Option<String>,
    pub featured_image: Option<String>,
}

impl Record for Faculty {
    const COLLECTION: Collection = Collection::Faculty;
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("name", FieldKind::Text),
        FieldSpec::optional("description", FieldKind::Text),
        FieldSpec::optional("dean", FieldKind::Text),
        FieldSpec::optional("website", FieldKind::Text),
        FieldSpec::optional("featured_image", FieldKind::Text),
    ];
}

#[derive(Serialize, Deserialize, Validate, Debug, Clone, PartialEq)]
pub struct Program {
    pub title: String,
    /// e.g. "Undergraduate", "Postgraduate".
    pub level: String,
    /// Loose reference to a faculty id. Never checked against the faculty collection.
    pub faculty_id: Option<String>,
    #[validate(range(min = 1, max = 8, message = "Input should be between 1 and 8"))]
    pub duration_years: Option<i64>,
    pub overview: Option<String>,
}

impl Record for Program {
    const COLLECTION: Collection = Collection::Program;
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("title", FieldKind::Text),
        FieldSpec::required("level", FieldKind::Text),
        FieldSpec::optional("faculty_id", FieldKind::Text),
        FieldSpec::optional("duration_years", FieldKind::Integer),
        FieldSpec::optional("overview", FieldKind::Text),
    ];
}

#[derive(Serialize, Deserialize, Validate, Debug, Clone, PartialEq)]
pub struct News {
    pub title: String,
    pub content: String,
    pub author: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub cover_image: Option<String>,
}

impl Record for News {
    const COLLECTION: Collection = Collection::News;
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("title", FieldKind::Text),
        FieldSpec::required("content", FieldKind::Text),
        FieldSpec::optional("author", FieldKind::Text),
        FieldSpec::optional("published_at", FieldKind::DateTime),
        FieldSpec::optional("cover_image", FieldKind::Text),
    ];
}

/// Contact request from a prospective student. Write-only.
#[derive(Serialize, Deserialize, Validate, Debug, Clone, PartialEq)]
pub struct Inquiry {
    pub full_name: String,
    #[validate(
        email(message = "value is not a valid email address"),
        custom(function = "deliverable_domain")
    )]
    pub email: String,
    pub phone: Option<String>,
    pub interest_program: Option<String>,
    pub message: Option<String>,
}

/// Rejects domains that can't be reached from the public internet: the part
/// after the last `@` needs at least two non-empty dot-separated labels.
fn deliverable_domain(email: &str) -> Result<(), ValidationError> {
    let Some((_, domain)) = email.rsplit_once('@') else {
        // Left to the email rule.
        return Ok(());
    };

    if domain.contains('.') && domain.split('.').all(|label| !label.is_empty()) {
        return Ok(());
    }

    Err(ValidationError::new("email").with_message(Cow::Borrowed(
        "value is not a valid email address: The part after the @-sign is not valid. It should have a period.",
    )))
}

impl Record for Inquiry {
    const COLLECTION: Collection = Collection::Inquiry;
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("full_name", FieldKind::Text),
        FieldSpec::required("email", FieldKind::Text),
        FieldSpec::optional("phone", FieldKind::Text),
        FieldSpec::optional("interest_program", FieldKind::Text),
        FieldSpec::optional("message", FieldKind::Text),
    ];
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SeedRequest {
    #[serde(default = "include_samples_default")]
    pub include_samples: bool,
}

fn include_samples_default() -> bool {
    true
}

impl Default for SeedRequest {
    fn default() -> Self {
        Self {
            include_samples: include_samples_default(),
        }
    }
}
