use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

use super::clean;
use crate::ordering::OrderColumn;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Event {
    pub id: Uuid,
    pub name_spanish: Option<String>,
    pub location_spanish: Option<String>,
    pub category_spanish: Option<String>,
    pub description_spanish: Option<String>,
    pub name_english: Option<String>,
    pub location_english: Option<String>,
    pub category_english: Option<String>,
    pub description_english: Option<String>,
    pub name_portuguese: Option<String>,
    pub location_portuguese: Option<String>,
    pub category_portuguese: Option<String>,
    pub description_portuguese: Option<String>,
    pub media_url: Option<String>,
    pub date_time: Option<DateTime<Utc>>,
    pub duration: Option<String>,
    pub cost: Option<String>,
    pub register_link: Option<String>,
    pub order_number: i64,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct EventText {
    pub name: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateEvent {
    #[serde(default)]
    pub spanish: EventText,
    #[serde(default)]
    pub english: EventText,
    #[serde(default)]
    pub portuguese: EventText,
    pub media_url: Option<String>,
    pub date_time: Option<DateTime<Utc>>,
    pub duration: Option<String>,
    pub cost: Option<String>,
    pub register_link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateEvent {
    #[serde(default)]
    pub spanish: EventText,
    #[serde(default)]
    pub english: EventText,
    #[serde(default)]
    pub portuguese: EventText,
    pub media_url: Option<String>,
    pub date_time: Option<DateTime<Utc>>,
    pub duration: Option<String>,
    pub cost: Option<String>,
    pub register_link: Option<String>,
    pub order_number: Option<i64>,
    pub version: Option<i64>,
}

impl Event {
    pub const TABLE: &'static str = "events";

    pub fn order_rows(pool: &SqlitePool) -> OrderColumn {
        OrderColumn::new(pool.clone(), Self::TABLE)
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM events ORDER BY order_number ASC, version DESC")
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateEvent,
        order_number: i64,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO events (
                   id,
                   name_spanish, location_spanish, category_spanish, description_spanish,
                   name_english, location_english, category_english, description_english,
                   name_portuguese, location_portuguese, category_portuguese, description_portuguese,
                   media_url, date_time, duration, cost, register_link, order_number
               ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
               RETURNING *"#,
        )
        .bind(id)
        .bind(clean(&data.spanish.name))
        .bind(clean(&data.spanish.location))
        .bind(clean(&data.spanish.category))
        .bind(clean(&data.spanish.description))
        .bind(clean(&data.english.name))
        .bind(clean(&data.english.location))
        .bind(clean(&data.english.category))
        .bind(clean(&data.english.description))
        .bind(clean(&data.portuguese.name))
        .bind(clean(&data.portuguese.location))
        .bind(clean(&data.portuguese.category))
        .bind(clean(&data.portuguese.description))
        .bind(clean(&data.media_url))
        .bind(data.date_time)
        .bind(clean(&data.duration))
        .bind(clean(&data.cost))
        .bind(clean(&data.register_link))
        .bind(order_number)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateEvent,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"UPDATE events SET
                   name_spanish = $2, location_spanish = $3, category_spanish = $4, description_spanish = $5,
                   name_english = $6, location_english = $7, category_english = $8, description_english = $9,
                   name_portuguese = $10, location_portuguese = $11, category_portuguese = $12, description_portuguese = $13,
                   media_url = $14, date_time = $15, duration = $16, cost = $17, register_link = $18,
                   version = version + 1,
                   updated_at = CURRENT_TIMESTAMP
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(clean(&data.spanish.name))
        .bind(clean(&data.spanish.location))
        .bind(clean(&data.spanish.category))
        .bind(clean(&data.spanish.description))
        .bind(clean(&data.english.name))
        .bind(clean(&data.english.location))
        .bind(clean(&data.english.category))
        .bind(clean(&data.english.description))
        .bind(clean(&data.portuguese.name))
        .bind(clean(&data.portuguese.location))
        .bind(clean(&data.portuguese.category))
        .bind(clean(&data.portuguese.description))
        .bind(clean(&data.media_url))
        .bind(data.date_time)
        .bind(clean(&data.duration))
        .bind(clean(&data.cost))
        .bind(clean(&data.register_link))
        .fetch_optional(pool)
        .await
    }
}
