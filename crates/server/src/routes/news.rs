use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, patch, put},
};
use db::{
    models::news_article::{CreateNewsArticle, NewsArticle, UpdateNewsArticle},
    ordering::OrderColumn,
};
use services::services::ordering::{OrderedCollection, ReorderEntry};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

fn ordering(state: &AppState) -> OrderedCollection<OrderColumn> {
    OrderedCollection::new(NewsArticle::TABLE, NewsArticle::order_rows(&state.db().pool))
}

/// GET /api/news
pub async fn list_news(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<NewsArticle>>>, ApiError> {
    let news = NewsArticle::find_all(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(news)))
}

/// POST /api/news — latest coverage goes first.
pub async fn create_news(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateNewsArticle>,
) -> Result<ResponseJson<ApiResponse<NewsArticle>>, ApiError> {
    let pool = state.db().pool.clone();
    let article = ordering(&state)
        .insert_at_front(|order_number| {
            let pool = pool.clone();
            let payload = &payload;
            async move { Ok(NewsArticle::create(&pool, payload, order_number).await?) }
        })
        .await?;
    Ok(ResponseJson(ApiResponse::success(article)))
}

/// PATCH /api/news/{id}
pub async fn update_news(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateNewsArticle>,
) -> Result<ResponseJson<ApiResponse<NewsArticle>>, ApiError> {
    if let Some(order_number) = payload.order_number {
        ordering(&state)
            .set_explicit_order(id, order_number, payload.version)
            .await?;
    }
    let article = NewsArticle::update(&state.db().pool, id, &payload)
        .await?
        .ok_or(ApiError::RecordNotFound("news article"))?;
    Ok(ResponseJson(ApiResponse::success(article)))
}

/// DELETE /api/news/{id}
pub async fn delete_news(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    ordering(&state).delete(id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

/// PUT /api/news/order
pub async fn reorder_news(
    State(state): State<AppState>,
    axum::Json(entries): axum::Json<Vec<ReorderEntry>>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    ordering(&state).permute(&entries).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/news",
        Router::new()
            .route("/", get(list_news).post(create_news))
            .route("/order", put(reorder_news))
            .route("/{id}", patch(update_news).delete(delete_news)),
    )
}
