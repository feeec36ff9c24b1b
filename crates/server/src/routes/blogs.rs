use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, patch, put},
};
use db::{
    models::blog_post::{BlogPost, CreateBlogPost, UpdateBlogPost},
    ordering::OrderColumn,
};
use services::services::ordering::{OrderedCollection, ReorderEntry};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

fn ordering(state: &AppState) -> OrderedCollection<OrderColumn> {
    OrderedCollection::new(BlogPost::TABLE, BlogPost::order_rows(&state.db().pool))
}

/// GET /api/blogs
pub async fn list_blogs(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<BlogPost>>>, ApiError> {
    let posts = BlogPost::find_all(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(posts)))
}

/// POST /api/blogs — appended at the end of the list.
pub async fn create_blog(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateBlogPost>,
) -> Result<ResponseJson<ApiResponse<BlogPost>>, ApiError> {
    if payload.slug.trim().is_empty() {
        return Err(ApiError::BadRequest("slug is required".to_string()));
    }
    let pool = state.db().pool.clone();
    let post = ordering(&state)
        .insert_at_end(|order_number| {
            let pool = pool.clone();
            let payload = &payload;
            async move { Ok(BlogPost::create(&pool, payload, order_number).await?) }
        })
        .await?;
    Ok(ResponseJson(ApiResponse::success(post)))
}

/// PATCH /api/blogs/{id}
pub async fn update_blog(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateBlogPost>,
) -> Result<ResponseJson<ApiResponse<BlogPost>>, ApiError> {
    if payload.slug.trim().is_empty() {
        return Err(ApiError::BadRequest("slug is required".to_string()));
    }
    if let Some(order_number) = payload.order_number {
        ordering(&state)
            .set_explicit_order(id, order_number, payload.version)
            .await?;
    }
    let post = BlogPost::update(&state.db().pool, id, &payload)
        .await?
        .ok_or(ApiError::RecordNotFound("blog post"))?;
    Ok(ResponseJson(ApiResponse::success(post)))
}

/// DELETE /api/blogs/{id}
pub async fn delete_blog(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    ordering(&state).delete(id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

/// PUT /api/blogs/order
pub async fn reorder_blogs(
    State(state): State<AppState>,
    axum::Json(entries): axum::Json<Vec<ReorderEntry>>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    ordering(&state).permute(&entries).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/blogs",
        Router::new()
            .route("/", get(list_blogs).post(create_blog))
            .route("/order", put(reorder_blogs))
            .route("/{id}", patch(update_blog).delete(delete_blog)),
    )
}
