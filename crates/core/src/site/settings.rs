use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// Site branding configuration. One logical row; the admin form overwrites
/// the whole thing on save.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub id: i64,
    pub logo_url: Option<String>,
    pub favicon_url: Option<String>,
    pub logo_styles: Option<String>,
    pub logo_text: Option<String>,
    pub google_font_import: Option<String>,
    pub google_font_css: Option<String>,
    pub logo_text_styles: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Incoming settings payload from the style form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettingsInput {
    pub logo_url: Option<String>,
    pub favicon_url: Option<String>,
    pub logo_styles: Option<String>,
    pub logo_text: Option<String>,
    pub google_font_import: Option<String>,
    pub google_font_css: Option<String>,
    pub logo_text_styles: Option<String>,
}

pub async fn fetch(pool: &PgPool) -> Result<Option<SiteSettings>, sqlx::Error> {
    sqlx::query_as::<_, SiteSettings>("SELECT * FROM site_settings ORDER BY id LIMIT 1")
        .fetch_optional(pool)
        .await
}

/// Update the settings row, creating it on first save.
pub async fn upsert(pool: &PgPool, input: SiteSettingsInput) -> Result<SiteSettings, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let existing: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM site_settings ORDER BY id LIMIT 1")
            .fetch_optional(&mut *tx)
            .await?;

    let settings = match existing {
        Some((id,)) => {
            sqlx::query_as::<_, SiteSettings>(
                "UPDATE site_settings SET \
                    logo_url = $2, favicon_url = $3, logo_styles = $4, logo_text = $5, \
                    google_font_import = $6, google_font_css = $7, logo_text_styles = $8, \
                    updated_at = now() \
                 WHERE id = $1 RETURNING *",
            )
            .bind(id)
            .bind(&input.logo_url)
            .bind(&input.favicon_url)
            .bind(&input.logo_styles)
            .bind(&input.logo_text)
            .bind(&input.google_font_import)
            .bind(&input.google_font_css)
            .bind(&input.logo_text_styles)
            .fetch_one(&mut *tx)
            .await?
        }
        None => {
            sqlx::query_as::<_, SiteSettings>(
                "INSERT INTO site_settings \
                    (logo_url, favicon_url, logo_styles, logo_text, \
                     google_font_import, google_font_css, logo_text_styles) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
            )
            .bind(&input.logo_url)
            .bind(&input.favicon_url)
            .bind(&input.logo_styles)
            .bind(&input.logo_text)
            .bind(&input.google_font_import)
            .bind(&input.google_font_css)
            .bind(&input.logo_text_styles)
            .fetch_one(&mut *tx)
            .await?
        }
    };

    tx.commit().await?;
    Ok(settings)
}
