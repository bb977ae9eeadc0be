//! Table-facing routes. Every table owns one cart and one chat history.
//!
//! - `GET    /api/v1/menu`
//! - `GET    /api/v1/deals`
//! - `GET    /api/v1/tables/{table}/cart`
//! - `DELETE /api/v1/tables/{table}/cart`
//! - `POST   /api/v1/tables/{table}/cart/items`
//! - `PUT    /api/v1/tables/{table}/cart/items/{line_id}`
//! - `DELETE /api/v1/tables/{table}/cart/items/{line_id}`
//! - `GET    /api/v1/tables/{table}/cart/receipt`
//! - `POST   /api/v1/tables/{table}/chat`
//! - `POST   /api/v1/tables/{table}/orders`
//! - `POST   /api/v1/tables/{table}/reset`
//! - `GET    /api/v1/orders/{id}`

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tableside_agent::{resolve_and_apply, ApplyOutcome, ExtractedInstruction, IgnoreReason};
use tableside_core::{DealLookup, OrderId, TableId};
use tracing::info;

use crate::error::{ApiError, ApiJson};
use crate::state::AppState;
use crate::views::{CartView, ChatView, DealView, MenuSectionView, MenuView, OrderView};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/menu", get(menu))
        .route("/api/v1/deals", get(deals))
        .route("/api/v1/tables/{table}/cart", get(cart).delete(clear_cart))
        .route("/api/v1/tables/{table}/cart/items", post(add_item))
        .route("/api/v1/tables/{table}/cart/items/{line_id}", put(update_item).delete(remove_item))
        .route("/api/v1/tables/{table}/cart/receipt", get(receipt))
        .route("/api/v1/tables/{table}/chat", post(chat))
        .route("/api/v1/tables/{table}/orders", post(submit_order))
        .route("/api/v1/tables/{table}/reset", post(reset))
        .route("/api/v1/orders/{id}", get(order_status))
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub id: String,
    #[serde(default = "one")]
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub table_id: u32,
    pub welcome: String,
}

async fn menu(State(state): State<AppState>) -> Result<Json<MenuView>, ApiError> {
    let snapshot = state.snapshot().await?;
    Ok(Json(MenuView {
        restaurant: state.restaurant.name.clone(),
        currency: state.restaurant.currency.clone(),
        sections: snapshot.menu_by_category().into_iter().map(MenuSectionView::from).collect(),
    }))
}

async fn deals(State(state): State<AppState>) -> Result<Json<Vec<DealView>>, ApiError> {
    let snapshot = state.snapshot().await?;
    let active = snapshot.active_deals()?;
    Ok(Json(active.iter().map(|deal| DealView::new(deal, &snapshot)).collect()))
}

async fn cart(
    Path(table): Path<u32>,
    State(state): State<AppState>,
) -> Result<Json<CartView>, ApiError> {
    let session = state.sessions.get(TableId(table)).await;
    let session = session.lock().await;
    Ok(Json(CartView::new(table, &session.cart)))
}

async fn clear_cart(
    Path(table): Path<u32>,
    State(state): State<AppState>,
) -> Result<Json<CartView>, ApiError> {
    let session = state.sessions.get(TableId(table)).await;
    let mut session = session.lock().await;
    session.cart.clear();
    Ok(Json(CartView::new(table, &session.cart)))
}

/// Quick-menu add. Resolution matches the chat path, but a rejected id is an error here
/// because the customer picked it directly.
async fn add_item(
    Path(table): Path<u32>,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<AddItemRequest>,
) -> Result<Json<CartView>, ApiError> {
    let snapshot = state.snapshot().await?;
    let instruction =
        ExtractedInstruction { raw_id: body.id.trim().to_string(), quantity: body.quantity };

    let session = state.sessions.get(TableId(table)).await;
    let mut session = session.lock().await;
    match resolve_and_apply(&instruction, &snapshot, &snapshot, &mut session.cart)? {
        ApplyOutcome::Added { .. } => Ok(Json(CartView::new(table, &session.cart))),
        ApplyOutcome::Ignored(reason) => Err(rejection(&instruction.raw_id, reason)),
    }
}

fn rejection(id: &str, reason: IgnoreReason) -> ApiError {
    match reason {
        IgnoreReason::ZeroQuantity => ApiError::bad_request("quantity must be at least 1"),
        IgnoreReason::InvalidEntry => ApiError::bad_request(format!("`{id}` cannot be ordered")),
        IgnoreReason::UnavailableItem => {
            ApiError::conflict(format!("`{id}` is currently unavailable"))
        }
        IgnoreReason::InactiveDeal => ApiError::conflict(format!("deal `{id}` is not active")),
        IgnoreReason::NotFound => ApiError::not_found(format!("`{id}` is not on the menu")),
    }
}

async fn update_item(
    Path((table, line_id)): Path<(u32, String)>,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UpdateItemRequest>,
) -> Result<Json<CartView>, ApiError> {
    let session = state.sessions.get(TableId(table)).await;
    let mut session = session.lock().await;
    session.cart.set_quantity(&line_id, body.quantity)?;
    Ok(Json(CartView::new(table, &session.cart)))
}

async fn remove_item(
    Path((table, line_id)): Path<(u32, String)>,
    State(state): State<AppState>,
) -> Result<Json<CartView>, ApiError> {
    let session = state.sessions.get(TableId(table)).await;
    let mut session = session.lock().await;
    session.cart.remove(&line_id);
    Ok(Json(CartView::new(table, &session.cart)))
}

async fn receipt(
    Path(table): Path<u32>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state.snapshot().await?;
    let session = state.sessions.get(TableId(table)).await;
    let session = session.lock().await;
    let text = session.cart.render_receipt(&snapshot, &snapshot)?;
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text))
}

async fn chat(
    Path(table): Path<u32>,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ChatRequest>,
) -> Result<Json<ChatView>, ApiError> {
    let message = body.message.trim();
    if message.is_empty() {
        return Err(ApiError::bad_request("message must not be empty"));
    }

    let snapshot = state.snapshot().await?;
    let session = state.sessions.get(TableId(table)).await;
    let mut session = session.lock().await;
    let session = &mut *session;
    let turn = state
        .agent
        .handle_customer_message(&mut session.chat, &mut session.cart, &snapshot, message)
        .await?;

    Ok(Json(ChatView::new(&turn, CartView::new(table, &session.cart))))
}

/// Hands the cart to the order store once. The cart is only cleared after the
/// store accepted the order, so a failed submit can be retried.
async fn submit_order(
    Path(table): Path<u32>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<OrderView>), ApiError> {
    let table_id = TableId(table);
    let session = state.sessions.get(table_id).await;
    let mut session = session.lock().await;

    let draft = session.cart.to_order_draft(table_id)?;
    let order = state.orders.create(draft).await?;
    session.cart.clear();

    info!(
        event_name = "order.submitted",
        table_id = table,
        order_id = %order.id.0,
        total = %order.total,
        lines = order.items.len(),
        "order handed to the kitchen"
    );
    Ok((StatusCode::CREATED, Json(OrderView::from(&order))))
}

async fn reset(
    Path(table): Path<u32>,
    State(state): State<AppState>,
) -> Result<Json<ResetResponse>, ApiError> {
    let table_id = TableId(table);
    let existed = state.sessions.reset(table_id).await;
    let snapshot = state.snapshot().await?;

    let session = state.sessions.get(table_id).await;
    let session = session.lock().await;
    info!(event_name = "table.session.reset", table_id = table, existed, "table session reset");
    let welcome = state.agent.welcome(&session.chat, &snapshot);
    Ok(Json(ResetResponse { table_id: table, welcome }))
}

async fn order_status(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<OrderView>, ApiError> {
    let order = state
        .orders
        .find(&OrderId(id.clone()))
        .await?
        .ok_or_else(|| ApiError::not_found(format!("order `{id}`")))?;
    Ok(Json(OrderView::from(&order)))
}
