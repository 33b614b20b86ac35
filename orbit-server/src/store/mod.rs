//! 订单存储
//!
//! 订单状态的唯一事实来源。编排器只通过存储的更新操作修改订单，
//! 从不修改游离副本。
//!
//! # 并发约定
//!
//! - 每次修改都是对单个 key 的原子 read-modify-write
//!   (DashMap 条目锁保证同一订单不会出现并发写者读到旧状态)。
//! - 状态转换使用 [`OrderStore::transition_status`] 的 compare-and-set：
//!   期望状态不匹配时不做任何修改并返回 None。
//! - 适配器调用 (支付/开通) 期间不持有任何条目锁。
//! - 条目只增不删，订单 ID 不复用。

use async_trait::async_trait;
use chrono::{Duration, Utc};
use dashmap::DashMap;
use shared::models::{Order, OrderStatus, ServerCredentials};
use shared::request::CreateOrderRequest;
use uuid::Uuid;

/// 支付窗口 (分钟) - 超时未支付的 pending 订单在读取时惰性过期
pub const PAYMENT_WINDOW_MINUTES: i64 = 15;

/// 订单存储契约
///
/// 参考实现为内存版 [`MemOrderStore`]；持久化后端可在不改动
/// 编排器的前提下替换。未知 ID 一律返回 None，从不报错。
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// 创建订单：生成全新 ID，状态 pending，计算支付截止时间
    async fn create_order(&self, input: &CreateOrderRequest, amount: i64) -> Order;

    /// 按 ID 查询订单
    async fn get_order(&self, id: &str) -> Option<Order>;

    /// 附加支付字段 (QR 串 + 支付单号)
    async fn update_order_payment(
        &self,
        id: &str,
        qr_code: &str,
        payment_number: &str,
    ) -> Option<Order>;

    /// 无条件更新状态
    async fn update_order_status(&self, id: &str, status: OrderStatus) -> Option<Order>;

    /// 状态 compare-and-set：仅当当前状态等于 `expected` 时转换到 `next`
    ///
    /// ID 不存在或状态不匹配时返回 None 且不做任何修改。
    async fn transition_status(
        &self,
        id: &str,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Option<Order>;

    /// 附加服务器凭据，并强制状态为 completed
    async fn update_order_credentials(
        &self,
        id: &str,
        credentials: ServerCredentials,
    ) -> Option<Order>;
}

/// 并发安全的内存订单存储
pub struct MemOrderStore {
    orders: DashMap<String, Order>,
}

impl MemOrderStore {
    pub fn new() -> Self {
        Self {
            orders: DashMap::new(),
        }
    }
}

impl Default for MemOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl MemOrderStore {
    /// 测试辅助：直接覆写订单条目 (构造过期等时间相关场景)
    pub(crate) fn insert_raw(&self, order: Order) {
        self.orders.insert(order.id.clone(), order);
    }
}

#[async_trait]
impl OrderStore for MemOrderStore {
    async fn create_order(&self, input: &CreateOrderRequest, amount: i64) -> Order {
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4().to_string(),
            product_id: input.product_id.clone(),
            customer_email: input.customer_email.clone(),
            customer_username: input.customer_username.clone(),
            server_name: input.server_name.clone(),
            status: OrderStatus::Pending,
            amount,
            qr_code: None,
            payment_number: None,
            server_credentials: None,
            created_at: now,
            updated_at: now,
            expires_at: now + Duration::minutes(PAYMENT_WINDOW_MINUTES),
        };

        self.orders.insert(order.id.clone(), order.clone());
        order
    }

    async fn get_order(&self, id: &str) -> Option<Order> {
        self.orders.get(id).map(|entry| entry.clone())
    }

    async fn update_order_payment(
        &self,
        id: &str,
        qr_code: &str,
        payment_number: &str,
    ) -> Option<Order> {
        let mut entry = self.orders.get_mut(id)?;
        entry.qr_code = Some(qr_code.to_string());
        entry.payment_number = Some(payment_number.to_string());
        entry.updated_at = Utc::now();
        Some(entry.clone())
    }

    async fn update_order_status(&self, id: &str, status: OrderStatus) -> Option<Order> {
        let mut entry = self.orders.get_mut(id)?;
        entry.status = status;
        entry.updated_at = Utc::now();
        Some(entry.clone())
    }

    async fn transition_status(
        &self,
        id: &str,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Option<Order> {
        let mut entry = self.orders.get_mut(id)?;
        if entry.status != expected {
            return None;
        }
        entry.status = next;
        entry.updated_at = Utc::now();
        Some(entry.clone())
    }

    async fn update_order_credentials(
        &self,
        id: &str,
        credentials: ServerCredentials,
    ) -> Option<Order> {
        let mut entry = self.orders.get_mut(id)?;
        entry.server_credentials = Some(credentials);
        entry.status = OrderStatus::Completed;
        entry.updated_at = Utc::now();
        Some(entry.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> CreateOrderRequest {
        CreateOrderRequest {
            product_id: "nodejs-bot".to_string(),
            customer_email: "budi@example.com".to_string(),
            customer_username: "budi_88".to_string(),
            server_name: "bot saya".to_string(),
        }
    }

    fn credentials() -> ServerCredentials {
        ServerCredentials {
            panel_url: "https://panel.example".to_string(),
            username: "budi_88".to_string(),
            password: "secret".to_string(),
            server_id: 42,
            server_ip: "103.150.60.1".to_string(),
            server_port: 7777,
        }
    }

    #[tokio::test]
    async fn create_sets_pending_and_expiry() {
        let store = MemOrderStore::new();
        let order = store.create_order(&input(), 20000).await;

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.amount, 20000);
        assert!(order.qr_code.is_none());
        assert_eq!(
            order.expires_at - order.created_at,
            Duration::minutes(PAYMENT_WINDOW_MINUTES)
        );
    }

    #[tokio::test]
    async fn unknown_id_returns_none_everywhere() {
        let store = MemOrderStore::new();
        assert!(store.get_order("missing").await.is_none());
        assert!(store.update_order_payment("missing", "qr", "ref").await.is_none());
        assert!(
            store
                .update_order_status("missing", OrderStatus::Failed)
                .await
                .is_none()
        );
        assert!(
            store
                .transition_status("missing", OrderStatus::Pending, OrderStatus::Processing)
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn cas_rejects_stale_expected_status() {
        let store = MemOrderStore::new();
        let order = store.create_order(&input(), 20000).await;

        let moved = store
            .transition_status(&order.id, OrderStatus::Pending, OrderStatus::Processing)
            .await
            .unwrap();
        assert_eq!(moved.status, OrderStatus::Processing);

        // Second writer still believes the order is pending
        assert!(
            store
                .transition_status(&order.id, OrderStatus::Pending, OrderStatus::Processing)
                .await
                .is_none()
        );
        assert_eq!(
            store.get_order(&order.id).await.unwrap().status,
            OrderStatus::Processing
        );
    }

    #[tokio::test]
    async fn credentials_force_completed() {
        let store = MemOrderStore::new();
        let order = store.create_order(&input(), 20000).await;

        let done = store
            .update_order_credentials(&order.id, credentials())
            .await
            .unwrap();
        assert_eq!(done.status, OrderStatus::Completed);
        assert!(done.server_credentials.is_some());
    }

    #[tokio::test]
    async fn mutations_refresh_updated_at() {
        let store = MemOrderStore::new();
        let order = store.create_order(&input(), 20000).await;

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let updated = store
            .update_order_payment(&order.id, "qr-string", "PAY-1")
            .await
            .unwrap();
        assert!(updated.updated_at > order.updated_at);
        assert_eq!(updated.qr_code.as_deref(), Some("qr-string"));
    }
}
