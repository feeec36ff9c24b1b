use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, patch, put},
};
use db::{
    models::client::{Client, CreateClient, UpdateClient},
    ordering::OrderColumn,
};
use services::services::ordering::{OrderedCollection, ReorderEntry};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

fn ordering(state: &AppState) -> OrderedCollection<OrderColumn> {
    OrderedCollection::new(Client::TABLE, Client::order_rows(&state.db().pool))
}

/// GET /api/clients
pub async fn list_clients(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Client>>>, ApiError> {
    let clients = Client::find_all(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(clients)))
}

/// POST /api/clients — new cards appear first on the dashboard.
pub async fn create_client(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateClient>,
) -> Result<ResponseJson<ApiResponse<Client>>, ApiError> {
    let pool = state.db().pool.clone();
    let client = ordering(&state)
        .insert_at_front(|order_number| {
            let pool = pool.clone();
            let payload = &payload;
            async move { Ok(Client::create(&pool, payload, order_number).await?) }
        })
        .await?;
    Ok(ResponseJson(ApiResponse::success(client)))
}

/// PATCH /api/clients/{id} — full field rewrite; an `order_number` in the
/// body also repositions the card.
pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateClient>,
) -> Result<ResponseJson<ApiResponse<Client>>, ApiError> {
    if let Some(order_number) = payload.order_number {
        ordering(&state)
            .set_explicit_order(id, order_number, payload.version)
            .await?;
    }
    let client = Client::update(&state.db().pool, id, &payload)
        .await?
        .ok_or(ApiError::RecordNotFound("client"))?;
    Ok(ResponseJson(ApiResponse::success(client)))
}

/// DELETE /api/clients/{id}
pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    ordering(&state).delete(id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

/// PUT /api/clients/order — drag-and-drop result, the full list in its new
/// order.
pub async fn reorder_clients(
    State(state): State<AppState>,
    axum::Json(entries): axum::Json<Vec<ReorderEntry>>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    ordering(&state).permute(&entries).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/clients",
        Router::new()
            .route("/", get(list_clients).post(create_client))
            .route("/order", put(reorder_clients))
            .route("/{id}", patch(update_client).delete(delete_client)),
    )
}
