use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// A footer social link, ordered by `position`.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SocialLink {
    pub id: i64,
    pub app: String,
    pub url: String,
    pub icon_url: String,
    pub position: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLinkInput {
    pub app: String,
    pub url: String,
    pub icon_url: String,
}

impl SocialLinkInput {
    /// The submission form pads unused slots; a row with any empty field is
    /// dropped rather than rejected.
    pub fn is_complete(&self) -> bool {
        !self.app.trim().is_empty()
            && !self.url.trim().is_empty()
            && !self.icon_url.trim().is_empty()
    }
}

pub async fn list(pool: &PgPool) -> Result<Vec<SocialLink>, sqlx::Error> {
    sqlx::query_as::<_, SocialLink>("SELECT * FROM social_links ORDER BY position, id")
        .fetch_all(pool)
        .await
}

/// Replace the whole link set in one transaction. Positions follow
/// submission order, including slots later dropped as incomplete.
pub async fn replace_all(
    pool: &PgPool,
    links: Vec<SocialLinkInput>,
) -> Result<Vec<SocialLink>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM social_links")
        .execute(&mut *tx)
        .await?;

    let mut saved = Vec::new();
    for (position, link) in links.into_iter().enumerate() {
        if !link.is_complete() {
            continue;
        }
        let row = sqlx::query_as::<_, SocialLink>(
            "INSERT INTO social_links (app, url, icon_url, position) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&link.app)
        .bind(&link.url)
        .bind(&link.icon_url)
        .bind(position as i32)
        .fetch_one(&mut *tx)
        .await?;
        saved.push(row);
    }

    tx.commit().await?;
    Ok(saved)
}
