use serde::{Deserialize, Serialize};

use crate::content::model::ContentKind;

/// Events emitted after successful mutations. The rendering layer
/// subscribes to invalidate whatever it has cached for the affected pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentEvent {
    Created {
        id: i64,
        kind: ContentKind,
        slug: String,
    },
    Updated {
        id: i64,
        slug: String,
    },
    Published {
        id: i64,
        kind: ContentKind,
    },
    Unpublished {
        id: i64,
        kind: ContentKind,
    },
    Featured {
        id: i64,
        kind: ContentKind,
    },
    Deleted {
        id: i64,
        kind: ContentKind,
    },
    SettingsUpdated,
    SocialLinksUpdated,
    ImageUploaded {
        id: i64,
    },
    ImageDeleted {
        id: i64,
    },
}
