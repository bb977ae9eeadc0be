use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use tableside_core::cart::LineItem;
use tableside_core::domain::order::{
    Order, OrderDraft, OrderId, OrderStatus, PaymentMethod, TableId,
};
use tableside_core::errors::DomainError;

use super::{decode_error, new_order_id, parse_decimal, OrderRepository, RepositoryError};
use crate::DbPool;

const ORDER_COLUMNS: &str = "id, table_id, total, status, payment_method, created_at, paid_at";

pub struct SqlOrderRepository {
    pool: DbPool,
}

impl SqlOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn lines(&self, order_id: &str) -> Result<Vec<LineItem>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT line_id, display_name, unit_price, quantity
             FROM order_line WHERE order_id = ? ORDER BY position ASC",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_line).collect()
    }

    async fn load(&self, row: &SqliteRow) -> Result<Order, RepositoryError> {
        let id: String = row.try_get("id").map_err(decode_error)?;
        let items = self.lines(&id).await?;
        row_to_order(row, items)
    }
}

fn parse_timestamp(column: &str, raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|error| RepositoryError::Decode(format!("{column} `{raw}`: {error}")))
}

fn row_to_line(row: &SqliteRow) -> Result<LineItem, RepositoryError> {
    let unit_price: String = row.try_get("unit_price").map_err(decode_error)?;
    let quantity: i64 = row.try_get("quantity").map_err(decode_error)?;

    Ok(LineItem {
        id: row.try_get("line_id").map_err(decode_error)?,
        display_name: row.try_get("display_name").map_err(decode_error)?,
        unit_price: parse_decimal("order_line.unit_price", &unit_price)?,
        quantity: u32::try_from(quantity)
            .map_err(|_| RepositoryError::Decode(format!("order_line.quantity {quantity}")))?,
    })
}

fn row_to_order(row: &SqliteRow, items: Vec<LineItem>) -> Result<Order, RepositoryError> {
    let table_id: i64 = row.try_get("table_id").map_err(decode_error)?;
    let total: String = row.try_get("total").map_err(decode_error)?;
    let status: String = row.try_get("status").map_err(decode_error)?;
    let payment_method: Option<String> = row.try_get("payment_method").map_err(decode_error)?;
    let created_at: String = row.try_get("created_at").map_err(decode_error)?;
    let paid_at: Option<String> = row.try_get("paid_at").map_err(decode_error)?;

    Ok(Order {
        id: OrderId(row.try_get("id").map_err(decode_error)?),
        table_id: TableId(
            u32::try_from(table_id)
                .map_err(|_| RepositoryError::Decode(format!("table_id {table_id}")))?,
        ),
        items,
        total: parse_decimal("restaurant_order.total", &total)?,
        status: status
            .parse::<OrderStatus>()
            .map_err(|error| RepositoryError::Decode(error.to_string()))?,
        payment_method: payment_method
            .map(|method| method.parse::<PaymentMethod>())
            .transpose()
            .map_err(|error| RepositoryError::Decode(error.to_string()))?,
        created_at: parse_timestamp("created_at", &created_at)?,
        paid_at: paid_at.map(|raw| parse_timestamp("paid_at", &raw)).transpose()?,
    })
}

#[async_trait::async_trait]
impl OrderRepository for SqlOrderRepository {
    async fn create(&self, draft: OrderDraft) -> Result<Order, RepositoryError> {
        if draft.items.is_empty() {
            return Err(DomainError::InvariantViolation(
                "order must contain at least one line".to_string(),
            )
            .into());
        }

        let order = Order::from_draft(new_order_id(), draft, Utc::now());
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO restaurant_order
                 (id, table_id, total, status, payment_method, created_at, paid_at)
             VALUES (?, ?, ?, ?, NULL, ?, NULL)",
        )
        .bind(&order.id.0)
        .bind(i64::from(order.table_id.0))
        .bind(order.total.to_string())
        .bind(order.status.as_str())
        .bind(order.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        for (position, line) in order.items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO order_line
                     (order_id, position, line_id, display_name, unit_price, quantity)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&order.id.0)
            .bind(position as i64)
            .bind(&line.id)
            .bind(&line.display_name)
            .bind(line.unit_price.to_string())
            .bind(i64::from(line.quantity))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(order)
    }

    async fn find(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        let row =
            sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM restaurant_order WHERE id = ?"))
                .bind(&id.0)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(ref row) => Ok(Some(self.load(row).await?)),
            None => Ok(None),
        }
    }

    async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, RepositoryError> {
        let rows = match status {
            Some(status) => {
                sqlx::query(&format!(
                    "SELECT {ORDER_COLUMNS} FROM restaurant_order
                     WHERE status = ? ORDER BY created_at DESC, id DESC"
                ))
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {ORDER_COLUMNS} FROM restaurant_order ORDER BY created_at DESC, id DESC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        let mut orders = Vec::with_capacity(rows.len());
        for row in &rows {
            orders.push(self.load(row).await?);
        }
        Ok(orders)
    }

    async fn mark_paid(
        &self,
        id: &OrderId,
        method: PaymentMethod,
    ) -> Result<Order, RepositoryError> {
        let mut order = self
            .find(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("order `{}`", id.0)))?;
        order.mark_paid(method, Utc::now())?;

        // The status guard keeps two concurrent payments from both succeeding.
        let result = sqlx::query(
            "UPDATE restaurant_order SET status = ?, payment_method = ?, paid_at = ?
             WHERE id = ? AND status = ?",
        )
        .bind(order.status.as_str())
        .bind(method.label())
        .bind(order.paid_at.map(|at| at.to_rfc3339()))
        .bind(&order.id.0)
        .bind(OrderStatus::Pending.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::InvalidOrderTransition {
                from: OrderStatus::Paid,
                to: OrderStatus::Paid,
            }
            .into());
        }
        Ok(order)
    }
}
