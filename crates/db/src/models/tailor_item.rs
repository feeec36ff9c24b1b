use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

use super::clean;
use crate::ordering::OrderColumn;

/// One "tailor made" service offering.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct TailorItem {
    pub id: Uuid,
    pub title_spanish: Option<String>,
    pub subtitle_spanish: Option<String>,
    pub description_spanish: Option<String>,
    pub title_english: Option<String>,
    pub subtitle_english: Option<String>,
    pub description_english: Option<String>,
    pub title_portuguese: Option<String>,
    pub subtitle_portuguese: Option<String>,
    pub description_portuguese: Option<String>,
    pub image: Option<String>,
    pub order_number: i64,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct TailorText {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateTailorItem {
    #[serde(default)]
    pub spanish: TailorText,
    #[serde(default)]
    pub english: TailorText,
    #[serde(default)]
    pub portuguese: TailorText,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateTailorItem {
    #[serde(default)]
    pub spanish: TailorText,
    #[serde(default)]
    pub english: TailorText,
    #[serde(default)]
    pub portuguese: TailorText,
    pub image: Option<String>,
    pub order_number: Option<i64>,
    pub version: Option<i64>,
}

impl TailorItem {
    pub const TABLE: &'static str = "tailor_made";

    pub fn order_rows(pool: &SqlitePool) -> OrderColumn {
        OrderColumn::new(pool.clone(), Self::TABLE)
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM tailor_made ORDER BY order_number ASC, version DESC",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM tailor_made WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateTailorItem,
        order_number: i64,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO tailor_made (
                   id,
                   title_spanish, subtitle_spanish, description_spanish,
                   title_english, subtitle_english, description_english,
                   title_portuguese, subtitle_portuguese, description_portuguese,
                   image, order_number
               ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
               RETURNING *"#,
        )
        .bind(id)
        .bind(clean(&data.spanish.title))
        .bind(clean(&data.spanish.subtitle))
        .bind(clean(&data.spanish.description))
        .bind(clean(&data.english.title))
        .bind(clean(&data.english.subtitle))
        .bind(clean(&data.english.description))
        .bind(clean(&data.portuguese.title))
        .bind(clean(&data.portuguese.subtitle))
        .bind(clean(&data.portuguese.description))
        .bind(clean(&data.image))
        .bind(order_number)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateTailorItem,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"UPDATE tailor_made SET
                   title_spanish = $2, subtitle_spanish = $3, description_spanish = $4,
                   title_english = $5, subtitle_english = $6, description_english = $7,
                   title_portuguese = $8, subtitle_portuguese = $9, description_portuguese = $10,
                   image = $11,
                   version = version + 1,
                   updated_at = CURRENT_TIMESTAMP
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(clean(&data.spanish.title))
        .bind(clean(&data.spanish.subtitle))
        .bind(clean(&data.spanish.description))
        .bind(clean(&data.english.title))
        .bind(clean(&data.english.subtitle))
        .bind(clean(&data.english.description))
        .bind(clean(&data.portuguese.title))
        .bind(clean(&data.portuguese.subtitle))
        .bind(clean(&data.portuguese.description))
        .bind(clean(&data.image))
        .fetch_optional(pool)
        .await
    }
}
