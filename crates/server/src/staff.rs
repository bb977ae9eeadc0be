//! Staff console routes: order queue, payments, bills and catalog edits.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tableside_core::cart::receipt::render_order_bill;
use tableside_core::pricing::{bundle_price, constituents_total, MAX_UNIT_PRICE};
use tableside_core::{
    Category, CategoryId, Deal, DealId, LocalizedText, MenuItem, MenuItemId, OrderId, OrderStatus,
    PaymentMethod,
};
use tracing::info;

use crate::error::{ApiError, ApiJson};
use crate::state::AppState;
use crate::views::{DealView, OrderView};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/staff/orders", get(list_orders))
        .route("/api/v1/staff/orders/{id}/payment", post(record_payment))
        .route("/api/v1/staff/orders/{id}/bill", get(bill))
        .route("/api/v1/staff/menu/items/{id}", put(save_item).delete(delete_item))
        .route("/api/v1/staff/categories/{id}", put(save_category).delete(delete_category))
        .route("/api/v1/staff/deals/{id}", put(save_deal).delete(delete_deal))
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub payment_method: String,
}

#[derive(Debug, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(default = "enabled")]
    pub active: bool,
    #[serde(default)]
    pub position: u32,
}

#[derive(Debug, Deserialize)]
pub struct MenuItemInput {
    pub category: String,
    pub name: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    pub price: Decimal,
    #[serde(default = "enabled")]
    pub available: bool,
}

#[derive(Debug, Deserialize)]
pub struct DealInput {
    pub name: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    pub items: Vec<String>,
    #[serde(default)]
    pub discount_percent: Decimal,
    /// Overrides the computed bundle price when present.
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default = "enabled")]
    pub active: bool,
    #[serde(default)]
    pub position: u32,
}

fn enabled() -> bool {
    true
}

/// Prices outside `0..=MAX_UNIT_PRICE` could never be added to a cart.
fn check_price(price: Decimal) -> Result<Decimal, ApiError> {
    if price < Decimal::ZERO {
        return Err(ApiError::bad_request("price must not be negative"));
    }
    if price > MAX_UNIT_PRICE {
        return Err(ApiError::bad_request(format!("price must not exceed {MAX_UNIT_PRICE}")));
    }
    Ok(price)
}

async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Vec<OrderView>>, ApiError> {
    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(raw) => Some(raw.parse::<OrderStatus>()?),
    };

    let orders = state.orders.list(status).await?;
    Ok(Json(orders.iter().map(OrderView::from).collect()))
}

async fn record_payment(
    Path(id): Path<String>,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<PaymentRequest>,
) -> Result<Json<OrderView>, ApiError> {
    let method = body.payment_method.parse::<PaymentMethod>()?;
    if !state.restaurant.payment_methods.contains(&method) {
        return Err(ApiError::bad_request(format!(
            "payment method `{}` is not accepted here",
            method.label()
        )));
    }

    let order = state.orders.mark_paid(&OrderId(id), method).await?;
    info!(
        event_name = "order.paid",
        order_id = %order.id.0,
        table_id = order.table_id.0,
        payment_method = method.label(),
        "order marked paid"
    );
    Ok(Json(OrderView::from(&order)))
}

async fn bill(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .orders
        .find(&OrderId(id.clone()))
        .await?
        .ok_or_else(|| ApiError::not_found(format!("order `{id}`")))?;

    let text = render_order_bill(&order, &state.restaurant.name, &state.restaurant.currency);
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text))
}

async fn save_category(
    Path(id): Path<String>,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CategoryInput>,
) -> Result<Json<Category>, ApiError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("category name is required"));
    }

    let category = Category {
        id: CategoryId(id),
        name: name.to_string(),
        active: body.active,
        position: body.position,
    };
    state.menu.save_category(category.clone()).await?;
    info!(event_name = "catalog.category.saved", category_id = %category.id.0, "category saved");
    Ok(Json(category))
}

async fn delete_category(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    state.menu.delete_category(&CategoryId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn save_item(
    Path(id): Path<String>,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<MenuItemInput>,
) -> Result<Json<MenuItem>, ApiError> {
    if body.name.en.trim().is_empty() {
        return Err(ApiError::bad_request("an English item name is required"));
    }
    let price = check_price(body.price)?;

    let item = MenuItem {
        id: MenuItemId(id),
        category: CategoryId(body.category),
        name: body.name,
        description: body.description,
        price,
        available: body.available,
    };
    state.menu.save_item(item.clone()).await?;
    info!(
        event_name = "catalog.item.saved",
        item_id = %item.id.0,
        available = item.available,
        "menu item saved"
    );
    Ok(Json(item))
}

async fn delete_item(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    state.menu.delete_item(&MenuItemId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Without an explicit `price`, the bundle is priced from its constituents'
/// current prices less `discount_percent`.
async fn save_deal(
    Path(id): Path<String>,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<DealInput>,
) -> Result<Json<DealView>, ApiError> {
    if body.items.is_empty() {
        return Err(ApiError::bad_request("a deal needs at least one item"));
    }
    if body.discount_percent < Decimal::ZERO || body.discount_percent > Decimal::ONE_HUNDRED {
        return Err(ApiError::bad_request("discount_percent must be between 0 and 100"));
    }

    let snapshot = state.snapshot().await?;
    let applicable_items =
        body.items.iter().map(|item| MenuItemId(item.trim().to_string())).collect::<Vec<_>>();
    if let Some(unknown) = applicable_items.iter().find(|item| snapshot.find_item(item).is_none()) {
        return Err(ApiError::bad_request(format!("unknown menu item `{}`", unknown.0)));
    }

    let mut deal = Deal {
        id: DealId::from_reference(&id),
        name: body.name,
        description: body.description,
        price: Decimal::ZERO,
        discount_percent: body.discount_percent,
        applicable_items,
        active: body.active,
        position: body.position,
    };
    deal.price = check_price(match body.price {
        Some(price) => price,
        None => bundle_price(constituents_total(&deal, &snapshot)?, deal.discount_percent),
    })?;

    state.deals.save(deal.clone()).await?;
    info!(
        event_name = "catalog.deal.saved",
        deal_id = %deal.id.0,
        price = %deal.price,
        active = deal.active,
        "deal saved"
    );
    Ok(Json(DealView::new(&deal, &snapshot)))
}

async fn delete_deal(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    state.deals.delete(&DealId::from_reference(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
