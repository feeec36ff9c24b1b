use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, types::Json};
use ts_rs::TS;
use uuid::Uuid;

use super::clean;
use crate::ordering::OrderColumn;

/// Blog record as stored. Tags and social links are JSON-encoded TEXT
/// columns; SEO fields exist per language.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct BlogPost {
    pub id: Uuid,
    pub slug: String,
    pub title_spanish: Option<String>,
    pub excerpt_spanish: Option<String>,
    pub content_spanish: Option<String>,
    pub meta_title_spanish: Option<String>,
    pub meta_description_spanish: Option<String>,
    pub category_spanish: Option<String>,
    #[ts(as = "Option<Vec<String>>")]
    pub tags_spanish: Option<Json<Vec<String>>>,
    pub title_english: Option<String>,
    pub excerpt_english: Option<String>,
    pub content_english: Option<String>,
    pub meta_title_english: Option<String>,
    pub meta_description_english: Option<String>,
    pub category_english: Option<String>,
    #[ts(as = "Option<Vec<String>>")]
    pub tags_english: Option<Json<Vec<String>>>,
    pub title_portuguese: Option<String>,
    pub excerpt_portuguese: Option<String>,
    pub content_portuguese: Option<String>,
    pub meta_title_portuguese: Option<String>,
    pub meta_description_portuguese: Option<String>,
    pub category_portuguese: Option<String>,
    #[ts(as = "Option<Vec<String>>")]
    pub tags_portuguese: Option<Json<Vec<String>>>,
    pub cover_image_url: Option<String>,
    pub og_image_url: Option<String>,
    pub canonical_url: Option<String>,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<serde_json::Value>")]
    pub social_links: Option<Json<serde_json::Value>>,
    pub client_id: Option<Uuid>,
    pub order_number: i64,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct BlogText {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateBlogPost {
    #[serde(default)]
    pub spanish: BlogText,
    #[serde(default)]
    pub english: BlogText,
    #[serde(default)]
    pub portuguese: BlogText,
    pub slug: String,
    pub cover_image_url: Option<String>,
    pub og_image_url: Option<String>,
    pub canonical_url: Option<String>,
    #[serde(default)]
    pub published: bool,
    pub social_links: Option<serde_json::Value>,
    pub client_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateBlogPost {
    #[serde(default)]
    pub spanish: BlogText,
    #[serde(default)]
    pub english: BlogText,
    #[serde(default)]
    pub portuguese: BlogText,
    pub slug: String,
    pub cover_image_url: Option<String>,
    pub og_image_url: Option<String>,
    pub canonical_url: Option<String>,
    #[serde(default)]
    pub published: bool,
    pub social_links: Option<serde_json::Value>,
    pub client_id: Option<Uuid>,
    pub order_number: Option<i64>,
    pub version: Option<i64>,
}

fn tags(value: &Option<Vec<String>>) -> Option<Json<Vec<String>>> {
    value.clone().map(Json)
}

impl BlogPost {
    pub const TABLE: &'static str = "blog_posts";

    pub fn order_rows(pool: &SqlitePool) -> OrderColumn {
        OrderColumn::new(pool.clone(), Self::TABLE)
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM blog_posts ORDER BY order_number ASC, version DESC",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM blog_posts WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateBlogPost,
        order_number: i64,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO blog_posts (
                   id, slug,
                   title_spanish, excerpt_spanish, content_spanish,
                   meta_title_spanish, meta_description_spanish, category_spanish, tags_spanish,
                   title_english, excerpt_english, content_english,
                   meta_title_english, meta_description_english, category_english, tags_english,
                   title_portuguese, excerpt_portuguese, content_portuguese,
                   meta_title_portuguese, meta_description_portuguese, category_portuguese, tags_portuguese,
                   cover_image_url, og_image_url, canonical_url,
                   published, published_at, social_links, client_id, order_number
               ) VALUES (
                   $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                   $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27,
                   CASE WHEN $27 THEN CURRENT_TIMESTAMP ELSE NULL END, $28, $29, $30
               )
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.slug.trim())
        .bind(clean(&data.spanish.title))
        .bind(clean(&data.spanish.excerpt))
        .bind(clean(&data.spanish.content))
        .bind(clean(&data.spanish.meta_title))
        .bind(clean(&data.spanish.meta_description))
        .bind(clean(&data.spanish.category))
        .bind(tags(&data.spanish.tags))
        .bind(clean(&data.english.title))
        .bind(clean(&data.english.excerpt))
        .bind(clean(&data.english.content))
        .bind(clean(&data.english.meta_title))
        .bind(clean(&data.english.meta_description))
        .bind(clean(&data.english.category))
        .bind(tags(&data.english.tags))
        .bind(clean(&data.portuguese.title))
        .bind(clean(&data.portuguese.excerpt))
        .bind(clean(&data.portuguese.content))
        .bind(clean(&data.portuguese.meta_title))
        .bind(clean(&data.portuguese.meta_description))
        .bind(clean(&data.portuguese.category))
        .bind(tags(&data.portuguese.tags))
        .bind(clean(&data.cover_image_url))
        .bind(clean(&data.og_image_url))
        .bind(clean(&data.canonical_url))
        .bind(data.published)
        .bind(data.social_links.clone().map(Json))
        .bind(data.client_id)
        .bind(order_number)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateBlogPost,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"UPDATE blog_posts SET
                   slug = $2,
                   title_spanish = $3, excerpt_spanish = $4, content_spanish = $5,
                   meta_title_spanish = $6, meta_description_spanish = $7,
                   category_spanish = $8, tags_spanish = $9,
                   title_english = $10, excerpt_english = $11, content_english = $12,
                   meta_title_english = $13, meta_description_english = $14,
                   category_english = $15, tags_english = $16,
                   title_portuguese = $17, excerpt_portuguese = $18, content_portuguese = $19,
                   meta_title_portuguese = $20, meta_description_portuguese = $21,
                   category_portuguese = $22, tags_portuguese = $23,
                   cover_image_url = $24, og_image_url = $25, canonical_url = $26,
                   published = $27,
                   published_at = CASE WHEN $27 THEN COALESCE(published_at, CURRENT_TIMESTAMP) ELSE NULL END,
                   social_links = $28, client_id = $29,
                   version = version + 1,
                   updated_at = CURRENT_TIMESTAMP
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.slug.trim())
        .bind(clean(&data.spanish.title))
        .bind(clean(&data.spanish.excerpt))
        .bind(clean(&data.spanish.content))
        .bind(clean(&data.spanish.meta_title))
        .bind(clean(&data.spanish.meta_description))
        .bind(clean(&data.spanish.category))
        .bind(tags(&data.spanish.tags))
        .bind(clean(&data.english.title))
        .bind(clean(&data.english.excerpt))
        .bind(clean(&data.english.content))
        .bind(clean(&data.english.meta_title))
        .bind(clean(&data.english.meta_description))
        .bind(clean(&data.english.category))
        .bind(tags(&data.english.tags))
        .bind(clean(&data.portuguese.title))
        .bind(clean(&data.portuguese.excerpt))
        .bind(clean(&data.portuguese.content))
        .bind(clean(&data.portuguese.meta_title))
        .bind(clean(&data.portuguese.meta_description))
        .bind(clean(&data.portuguese.category))
        .bind(tags(&data.portuguese.tags))
        .bind(clean(&data.cover_image_url))
        .bind(clean(&data.og_image_url))
        .bind(clean(&data.canonical_url))
        .bind(data.published)
        .bind(data.social_links.clone().map(Json))
        .bind(data.client_id)
        .fetch_optional(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_pool;

    fn sample(slug: &str) -> CreateBlogPost {
        let mut spanish = BlogText::default();
        spanish.title = Some("Lanzamiento".into());
        spanish.tags = Some(vec!["retail".into(), "prensa".into()]);
        CreateBlogPost {
            spanish,
            english: BlogText::default(),
            portuguese: BlogText::default(),
            slug: slug.into(),
            cover_image_url: Some("https://cdn.example.com/cover.jpg".into()),
            og_image_url: None,
            canonical_url: None,
            published: true,
            social_links: Some(serde_json::json!({ "instagram": "https://instagram.com/agency" })),
            client_id: None,
        }
    }

    #[tokio::test]
    async fn create_round_trips_json_columns() {
        let pool = test_pool().await;
        let post = BlogPost::create(&pool, &sample("launch"), 0).await.unwrap();
        assert_eq!(post.slug, "launch");
        assert_eq!(
            post.tags_spanish.as_ref().map(|t| t.0.clone()),
            Some(vec!["retail".to_string(), "prensa".to_string()])
        );
        assert!(post.published);
        assert!(post.published_at.is_some());

        let found = BlogPost::find_by_id(&pool, post.id).await.unwrap().unwrap();
        assert_eq!(
            found.social_links.as_ref().map(|s| s.0.clone()),
            Some(serde_json::json!({ "instagram": "https://instagram.com/agency" }))
        );
    }

    #[tokio::test]
    async fn unpublishing_clears_published_at() {
        let pool = test_pool().await;
        let post = BlogPost::create(&pool, &sample("launch"), 0).await.unwrap();

        let data = UpdateBlogPost {
            spanish: BlogText::default(),
            english: BlogText::default(),
            portuguese: BlogText::default(),
            slug: "launch".into(),
            cover_image_url: None,
            og_image_url: None,
            canonical_url: None,
            published: false,
            social_links: None,
            client_id: None,
            order_number: None,
            version: None,
        };
        let updated = BlogPost::update(&pool, post.id, &data).await.unwrap().unwrap();
        assert!(!updated.published);
        assert!(updated.published_at.is_none());
    }
}
