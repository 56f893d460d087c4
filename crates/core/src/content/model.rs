use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::slug;

/// Content type partition. The featured flag is tracked independently per
/// kind: the site shows one featured article and one featured recipe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "content_kind", rename_all = "UPPERCASE")]
pub enum ContentKind {
    #[default]
    Article,
    Recipe,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Article => "ARTICLE",
            ContentKind::Recipe => "RECIPE",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An article or recipe as stored in the `content_items` table.
///
/// `is_featured` is meaningful only while `published` is true; `published_at`
/// is stamped on every draft-to-live transition and survives unpublishing.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub author: Option<String>,
    pub body: String,
    pub featured_image: Option<String>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub kind: ContentKind,
    pub published: bool,
    pub is_featured: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields of a brand-new draft. Everything else starts empty or false.
#[derive(Debug, Clone)]
pub struct NewContent {
    pub title: String,
    pub slug: String,
    pub kind: ContentKind,
}

impl NewContent {
    /// Build a draft from a title, deriving the URL slug at creation time.
    pub fn draft(title: impl Into<String>, kind: ContentKind) -> Self {
        let title = title.into();
        let slug = slug::derive(&title, Utc::now());
        Self { title, slug, kind }
    }
}

/// The editable payload of an item. Publish/feature flag transitions go
/// through the featured service instead.
#[derive(Debug, Clone, Default)]
pub struct EditorFields {
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub author: Option<String>,
    pub body: String,
    pub featured_image: Option<String>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
}
