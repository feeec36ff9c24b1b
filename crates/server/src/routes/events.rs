use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, patch, put},
};
use db::{
    models::event::{CreateEvent, Event, UpdateEvent},
    ordering::OrderColumn,
};
use services::services::ordering::{OrderedCollection, ReorderEntry};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

fn ordering(state: &AppState) -> OrderedCollection<OrderColumn> {
    OrderedCollection::new(Event::TABLE, Event::order_rows(&state.db().pool))
}

/// GET /api/events
pub async fn list_events(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Event>>>, ApiError> {
    let events = Event::find_all(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(events)))
}

/// POST /api/events — appended at the end of the list.
pub async fn create_event(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateEvent>,
) -> Result<ResponseJson<ApiResponse<Event>>, ApiError> {
    let pool = state.db().pool.clone();
    let event = ordering(&state)
        .insert_at_end(|order_number| {
            let pool = pool.clone();
            let payload = &payload;
            async move { Ok(Event::create(&pool, payload, order_number).await?) }
        })
        .await?;
    Ok(ResponseJson(ApiResponse::success(event)))
}

/// PATCH /api/events/{id}
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateEvent>,
) -> Result<ResponseJson<ApiResponse<Event>>, ApiError> {
    if let Some(order_number) = payload.order_number {
        ordering(&state)
            .set_explicit_order(id, order_number, payload.version)
            .await?;
    }
    let event = Event::update(&state.db().pool, id, &payload)
        .await?
        .ok_or(ApiError::RecordNotFound("event"))?;
    Ok(ResponseJson(ApiResponse::success(event)))
}

/// DELETE /api/events/{id}
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    ordering(&state).delete(id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

/// PUT /api/events/order
pub async fn reorder_events(
    State(state): State<AppState>,
    axum::Json(entries): axum::Json<Vec<ReorderEntry>>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    ordering(&state).permute(&entries).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/events",
        Router::new()
            .route("/", get(list_events).post(create_event))
            .route("/order", put(reorder_events))
            .route("/{id}", patch(update_event).delete(delete_event)),
    )
}
