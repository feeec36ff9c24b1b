use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

use super::clean;
use crate::ordering::OrderColumn;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Client {
    pub id: Uuid,
    pub name_spanish: Option<String>,
    pub country_spanish: Option<String>,
    pub job_title_spanish: Option<String>,
    pub description_spanish: Option<String>,
    pub name_english: Option<String>,
    pub country_english: Option<String>,
    pub job_title_english: Option<String>,
    pub description_english: Option<String>,
    pub name_portuguese: Option<String>,
    pub country_portuguese: Option<String>,
    pub job_title_portuguese: Option<String>,
    pub description_portuguese: Option<String>,
    pub media_url: Option<String>,
    pub order_number: i64,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-language fields of a client card.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct ClientText {
    pub name: Option<String>,
    pub country: Option<String>,
    pub job_title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateClient {
    #[serde(default)]
    pub spanish: ClientText,
    #[serde(default)]
    pub english: ClientText,
    #[serde(default)]
    pub portuguese: ClientText,
    pub media_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateClient {
    #[serde(default)]
    pub spanish: ClientText,
    #[serde(default)]
    pub english: ClientText,
    #[serde(default)]
    pub portuguese: ClientText,
    pub media_url: Option<String>,
    /// Present when the edit also repositions the record.
    pub order_number: Option<i64>,
    /// Caller's last-seen version, checked when repositioning.
    pub version: Option<i64>,
}

impl Client {
    pub const TABLE: &'static str = "clients";

    pub fn order_rows(pool: &SqlitePool) -> OrderColumn {
        OrderColumn::new(pool.clone(), Self::TABLE)
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM clients ORDER BY order_number ASC, version DESC",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateClient,
        order_number: i64,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO clients (
                   id,
                   name_spanish, country_spanish, job_title_spanish, description_spanish,
                   name_english, country_english, job_title_english, description_english,
                   name_portuguese, country_portuguese, job_title_portuguese, description_portuguese,
                   media_url, order_number
               ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
               RETURNING *"#,
        )
        .bind(id)
        .bind(clean(&data.spanish.name))
        .bind(clean(&data.spanish.country))
        .bind(clean(&data.spanish.job_title))
        .bind(clean(&data.spanish.description))
        .bind(clean(&data.english.name))
        .bind(clean(&data.english.country))
        .bind(clean(&data.english.job_title))
        .bind(clean(&data.english.description))
        .bind(clean(&data.portuguese.name))
        .bind(clean(&data.portuguese.country))
        .bind(clean(&data.portuguese.job_title))
        .bind(clean(&data.portuguese.description))
        .bind(clean(&data.media_url))
        .bind(order_number)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateClient,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"UPDATE clients SET
                   name_spanish = $2, country_spanish = $3, job_title_spanish = $4, description_spanish = $5,
                   name_english = $6, country_english = $7, job_title_english = $8, description_english = $9,
                   name_portuguese = $10, country_portuguese = $11, job_title_portuguese = $12, description_portuguese = $13,
                   media_url = $14,
                   version = version + 1,
                   updated_at = CURRENT_TIMESTAMP
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(clean(&data.spanish.name))
        .bind(clean(&data.spanish.country))
        .bind(clean(&data.spanish.job_title))
        .bind(clean(&data.spanish.description))
        .bind(clean(&data.english.name))
        .bind(clean(&data.english.country))
        .bind(clean(&data.english.job_title))
        .bind(clean(&data.english.description))
        .bind(clean(&data.portuguese.name))
        .bind(clean(&data.portuguese.country))
        .bind(clean(&data.portuguese.job_title))
        .bind(clean(&data.portuguese.description))
        .bind(clean(&data.media_url))
        .fetch_optional(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_pool;

    fn sample() -> CreateClient {
        CreateClient {
            spanish: ClientText {
                name: Some("  Cliente Uno  ".into()),
                country: Some("Argentina".into()),
                job_title: None,
                description: Some("".into()),
            },
            english: ClientText::default(),
            portuguese: ClientText::default(),
            media_url: Some("https://cdn.example.com/logo.png".into()),
        }
    }

    #[tokio::test]
    async fn create_trims_text_and_assigns_order() {
        let pool = test_pool().await;
        let client = Client::create(&pool, &sample(), 0).await.unwrap();
        assert_eq!(client.name_spanish.as_deref(), Some("Cliente Uno"));
        assert_eq!(client.description_spanish, None);
        assert_eq!(client.order_number, 0);
        assert_eq!(client.version, 0);

        let found = Client::find_by_id(&pool, client.id).await.unwrap();
        assert_eq!(found.map(|c| c.id), Some(client.id));
    }

    #[tokio::test]
    async fn update_bumps_version_and_misses_unknown_ids() {
        let pool = test_pool().await;
        let client = Client::create(&pool, &sample(), 0).await.unwrap();

        let mut data = UpdateClient {
            spanish: ClientText::default(),
            english: ClientText::default(),
            portuguese: ClientText::default(),
            media_url: None,
            order_number: None,
            version: None,
        };
        data.english.name = Some("Client One".into());

        let updated = Client::update(&pool, client.id, &data).await.unwrap().unwrap();
        assert_eq!(updated.name_english.as_deref(), Some("Client One"));
        assert_eq!(updated.media_url, None);
        assert_eq!(updated.version, 1);

        let missing = Client::update(&pool, Uuid::new_v4(), &data).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn find_all_sorts_by_order_number() {
        let pool = test_pool().await;
        let first = Client::create(&pool, &sample(), 1).await.unwrap();
        let second = Client::create(&pool, &sample(), 0).await.unwrap();

        let all = Client::find_all(&pool).await.unwrap();
        assert_eq!(
            all.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![second.id, first.id]
        );
    }
}
