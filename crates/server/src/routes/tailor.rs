use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, patch, put},
};
use db::{
    models::tailor_item::{CreateTailorItem, TailorItem, UpdateTailorItem},
    ordering::OrderColumn,
};
use services::services::ordering::{OrderedCollection, ReorderEntry};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

fn ordering(state: &AppState) -> OrderedCollection<OrderColumn> {
    OrderedCollection::new(TailorItem::TABLE, TailorItem::order_rows(&state.db().pool))
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

/// GET /api/tailor
pub async fn list_tailor_items(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<TailorItem>>>, ApiError> {
    let items = TailorItem::find_all(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(items)))
}

/// POST /api/tailor — appended at the end of the list. A Spanish title and
/// an image are mandatory for these cards.
pub async fn create_tailor_item(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateTailorItem>,
) -> Result<ResponseJson<ApiResponse<TailorItem>>, ApiError> {
    if is_blank(&payload.spanish.title) {
        return Err(ApiError::BadRequest("spanish title is required".to_string()));
    }
    if is_blank(&payload.image) {
        return Err(ApiError::BadRequest("image is required".to_string()));
    }
    let pool = state.db().pool.clone();
    let item = ordering(&state)
        .insert_at_end(|order_number| {
            let pool = pool.clone();
            let payload = &payload;
            async move { Ok(TailorItem::create(&pool, payload, order_number).await?) }
        })
        .await?;
    Ok(ResponseJson(ApiResponse::success(item)))
}

/// PATCH /api/tailor/{id}
pub async fn update_tailor_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateTailorItem>,
) -> Result<ResponseJson<ApiResponse<TailorItem>>, ApiError> {
    if let Some(order_number) = payload.order_number {
        ordering(&state)
            .set_explicit_order(id, order_number, payload.version)
            .await?;
    }
    let item = TailorItem::update(&state.db().pool, id, &payload)
        .await?
        .ok_or(ApiError::RecordNotFound("tailor made item"))?;
    Ok(ResponseJson(ApiResponse::success(item)))
}

/// DELETE /api/tailor/{id}
pub async fn delete_tailor_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    ordering(&state).delete(id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

/// PUT /api/tailor/order
pub async fn reorder_tailor_items(
    State(state): State<AppState>,
    axum::Json(entries): axum::Json<Vec<ReorderEntry>>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    ordering(&state).permute(&entries).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/tailor",
        Router::new()
            .route("/", get(list_tailor_items).post(create_tailor_item))
            .route("/order", put(reorder_tailor_items))
            .route("/{id}", patch(update_tailor_item).delete(delete_tailor_item)),
    )
}
