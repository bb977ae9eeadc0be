use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::LineItem;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableId(pub u32);

impl std::fmt::Display for TableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Paid,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            other => {
                Err(DomainError::InvariantViolation(format!("unknown order status `{other}`")))
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    DebitCard,
    OnlineTransfer,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] =
        [Self::Cash, Self::CreditCard, Self::DebitCard, Self::OnlineTransfer];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::CreditCard => "Credit Card",
            Self::DebitCard => "Debit Card",
            Self::OnlineTransfer => "Online Transfer",
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(['_', '-', ' '], "");
        match normalized.as_str() {
            "cash" => Ok(Self::Cash),
            "creditcard" | "card" => Ok(Self::CreditCard),
            "debitcard" => Ok(Self::DebitCard),
            "onlinetransfer" => Ok(Self::OnlineTransfer),
            _ => Err(DomainError::InvariantViolation(format!(
                "unsupported payment method `{}`",
                value.trim()
            ))),
        }
    }
}

/// Finalized hand-off from a session cart to the order store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub table_id: TableId,
    pub items: Vec<LineItem>,
    pub total: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub table_id: TableId,
    pub items: Vec<LineItem>,
    pub total: Decimal,
    pub status: OrderStatus,
    pub payment_method: Option<PaymentMethod>,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn from_draft(id: OrderId, draft: OrderDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            table_id: draft.table_id,
            items: draft.items,
            total: draft.total,
            status: OrderStatus::Pending,
            payment_method: None,
            created_at,
            paid_at: None,
        }
    }

    pub fn mark_paid(
        &mut self,
        method: PaymentMethod,
        paid_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if self.status != OrderStatus::Pending {
            return Err(DomainError::InvalidOrderTransition {
                from: self.status,
                to: OrderStatus::Paid,
            });
        }

        self.status = OrderStatus::Paid;
        self.payment_method = Some(method);
        self.paid_at = Some(paid_at);
        Ok(())
    }
}
