//! Order Model
//!
//! 订单状态机：
//!
//! ```text
//! pending ──► processing ──► completed
//!    │             └───────► failed
//!    └────► expired
//! ```
//!
//! completed / failed / expired 为终态，状态只能沿状态机单向推进。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Awaiting payment (initial state)
    Pending,
    /// Payment settled, provisioning in flight
    Processing,
    /// Server provisioned, credentials attached
    Completed,
    /// Provisioning failed after payment
    Failed,
    /// Payment window lapsed before settlement
    Expired,
}

impl OrderStatus {
    /// 终态判断 - 终态订单不再接受任何状态转换
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Expired)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Expired => "expired",
        };
        f.write_str(s)
    }
}

/// Panel + server connection credentials returned by provisioning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCredentials {
    pub panel_url: String,
    pub username: String,
    /// Fresh password, or a placeholder for pre-existing panel accounts
    pub password: String,
    pub server_id: i64,
    pub server_ip: String,
    pub server_port: u16,
}

/// Order entity
///
/// `amount` is a snapshot of the product price at creation time and is
/// never recomputed from the catalog. `server_credentials` is non-null
/// if and only if `status == Completed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub product_id: String,
    pub customer_email: String,
    pub customer_username: String,
    pub server_name: String,
    pub status: OrderStatus,
    /// Amount charged in IDR (price snapshot)
    pub amount: i64,
    /// QRIS payload string (null until payment initiated)
    pub qr_code: Option<String>,
    /// Provider payment reference (null until payment initiated)
    pub payment_number: Option<String>,
    pub server_credentials: Option<ServerCredentials>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Payment deadline: created_at + 15 minutes
    pub expires_at: DateTime<Utc>,
}

impl Order {
    /// 是否已过支付窗口（仅对 pending 订单有意义）
    pub fn is_past_expiry(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Processing.is_terminal());
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Failed.is_terminal());
        assert!(OrderStatus::Expired.is_terminal());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
    }
}
