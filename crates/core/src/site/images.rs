use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

/// An uploaded image: `url` is the public path, `filename` the name the
/// editor uploaded it under.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: i64,
    pub url: String,
    pub filename: String,
    pub created_at: DateTime<Utc>,
}

pub async fn insert(pool: &PgPool, url: &str, filename: &str) -> Result<Image, sqlx::Error> {
    sqlx::query_as::<_, Image>(
        "INSERT INTO images (url, filename) VALUES ($1, $2) RETURNING *",
    )
    .bind(url)
    .bind(filename)
    .fetch_one(pool)
    .await
}

pub async fn list(pool: &PgPool) -> Result<Vec<Image>, sqlx::Error> {
    sqlx::query_as::<_, Image>("SELECT * FROM images ORDER BY created_at DESC, id DESC")
        .fetch_all(pool)
        .await
}

/// Delete a row, returning it so the caller can remove the file too.
pub async fn delete(pool: &PgPool, id: i64) -> Result<Option<Image>, sqlx::Error> {
    sqlx::query_as::<_, Image>("DELETE FROM images WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(pool)
        .await
}
