use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

use super::clean;
use crate::ordering::OrderColumn;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct NewsArticle {
    pub id: Uuid,
    pub title_spanish: Option<String>,
    pub description_spanish: Option<String>,
    pub editorial_spanish: Option<String>,
    pub title_english: Option<String>,
    pub description_english: Option<String>,
    pub editorial_english: Option<String>,
    pub title_portuguese: Option<String>,
    pub description_portuguese: Option<String>,
    pub editorial_portuguese: Option<String>,
    pub media_url: Option<String>,
    pub news_link: Option<String>,
    pub client_id: Option<Uuid>,
    pub order_number: i64,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct NewsText {
    pub title: Option<String>,
    pub description: Option<String>,
    pub editorial: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateNewsArticle {
    #[serde(default)]
    pub spanish: NewsText,
    #[serde(default)]
    pub english: NewsText,
    #[serde(default)]
    pub portuguese: NewsText,
    pub media_url: Option<String>,
    pub news_link: Option<String>,
    /// Optional link to the client this piece was published for.
    pub client_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateNewsArticle {
    #[serde(default)]
    pub spanish: NewsText,
    #[serde(default)]
    pub english: NewsText,
    #[serde(default)]
    pub portuguese: NewsText,
    pub media_url: Option<String>,
    pub news_link: Option<String>,
    pub client_id: Option<Uuid>,
    pub order_number: Option<i64>,
    pub version: Option<i64>,
}

impl NewsArticle {
    pub const TABLE: &'static str = "news";

    pub fn order_rows(pool: &SqlitePool) -> OrderColumn {
        OrderColumn::new(pool.clone(), Self::TABLE)
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM news ORDER BY order_number ASC, version DESC")
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM news WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateNewsArticle,
        order_number: i64,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO news (
                   id,
                   title_spanish, description_spanish, editorial_spanish,
                   title_english, description_english, editorial_english,
                   title_portuguese, description_portuguese, editorial_portuguese,
                   media_url, news_link, client_id, order_number
               ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
               RETURNING *"#,
        )
        .bind(id)
        .bind(clean(&data.spanish.title))
        .bind(clean(&data.spanish.description))
        .bind(clean(&data.spanish.editorial))
        .bind(clean(&data.english.title))
        .bind(clean(&data.english.description))
        .bind(clean(&data.english.editorial))
        .bind(clean(&data.portuguese.title))
        .bind(clean(&data.portuguese.description))
        .bind(clean(&data.portuguese.editorial))
        .bind(clean(&data.media_url))
        .bind(clean(&data.news_link))
        .bind(data.client_id)
        .bind(order_number)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateNewsArticle,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"UPDATE news SET
                   title_spanish = $2, description_spanish = $3, editorial_spanish = $4,
                   title_english = $5, description_english = $6, editorial_english = $7,
                   title_portuguese = $8, description_portuguese = $9, editorial_portuguese = $10,
                   media_url = $11, news_link = $12, client_id = $13,
                   version = version + 1,
                   updated_at = CURRENT_TIMESTAMP
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(clean(&data.spanish.title))
        .bind(clean(&data.spanish.description))
        .bind(clean(&data.spanish.editorial))
        .bind(clean(&data.english.title))
        .bind(clean(&data.english.description))
        .bind(clean(&data.english.editorial))
        .bind(clean(&data.portuguese.title))
        .bind(clean(&data.portuguese.description))
        .bind(clean(&data.portuguese.editorial))
        .bind(clean(&data.media_url))
        .bind(clean(&data.news_link))
        .bind(data.client_id)
        .fetch_optional(pool)
        .await
    }
}
