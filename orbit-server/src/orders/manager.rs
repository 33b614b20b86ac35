//! OrdersManager - 订单生命周期编排器
//!
//! # 状态机
//!
//! ```text
//! pending ──► processing ──► completed
//!    │             └───────► failed
//!    └────► expired
//! ```
//!
//! # 关键规则
//!
//! - 过期检查永远先于同一次读取上的任何 pending → processing 尝试：
//!   迟到的 Webhook 不可能开通一个支付窗口已过的订单。
//! - 编排器在动作发生的时刻用 CAS 重新验证"仍是 pending"，
//!   从不信任几步之前读到的状态。
//! - Webhook 可能重复投递：非 pending 订单上的已结算 Webhook
//!   视为已处理，幂等返回成功，绝不二次开通。
//! - 对已 expired 订单的迟到已结算 Webhook 同样按已处理返回，
//!   不会复活订单 (expired 是终态)。

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use shared::models::{Order, OrderStatus, ServerCredentials};
use shared::request::CreateOrderRequest;

use crate::catalog::Catalog;
use crate::payment::{self, PakasirGateway};
use crate::provisioning::PterodactylService;
use crate::store::OrderStore;
use crate::utils::{AppError, AppResult};

/// Webhook 处理结果 (success 形响应体)
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub success: bool,
    pub message: String,
}

impl WebhookAck {
    fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// 订单生命周期编排器
///
/// 持有存储和两个外部适配器的共享引用；自身无状态，
/// 所有订单状态都通过 [`OrderStore`] 读写。
pub struct OrdersManager {
    store: Arc<dyn OrderStore>,
    catalog: Arc<Catalog>,
    payment: Arc<PakasirGateway>,
    provisioning: Arc<PterodactylService>,
}

impl OrdersManager {
    pub fn new(
        store: Arc<dyn OrderStore>,
        catalog: Arc<Catalog>,
        payment: Arc<PakasirGateway>,
        provisioning: Arc<PterodactylService>,
    ) -> Self {
        Self {
            store,
            catalog,
            payment,
            provisioning,
        }
    }

    /// Create 转换：快照价格、落库、创建支付
    ///
    /// 支付网关失败不会导致整个操作失败：用订单 ID 确定性合成兜底
    /// QR 数据，保证客户总能拿到可扫描的内容。两条路径都以支付字段
    /// 已附加、状态仍为 pending 结束。
    pub async fn create_order(&self, input: &CreateOrderRequest) -> AppResult<Order> {
        let product = self
            .catalog
            .get(&input.product_id)
            .ok_or_else(|| AppError::not_found(format!("Product {}", input.product_id)))?;

        let order = self.store.create_order(input, product.price).await;
        tracing::info!(order_id = %order.id, product_id = %product.id, amount = order.amount, "Order created");

        let updated = match self.payment.create_payment(&order.id, order.amount).await {
            Ok(qris) => {
                self.store
                    .update_order_payment(&order.id, &qris.qr_string, &qris.payment_number)
                    .await
            }
            Err(e) => {
                tracing::warn!(order_id = %order.id, error = %e, "QRIS creation failed, attaching fallback payment");
                self.store
                    .update_order_payment(
                        &order.id,
                        &payment::fallback_qr_string(&order.id),
                        &payment::fallback_payment_number(&order.id),
                    )
                    .await
            }
        };

        updated.ok_or_else(|| anyhow::anyhow!("order {} vanished after creation", order.id).into())
    }

    /// 按 ID 查询订单 (不触发过期检查)
    pub async fn get_order(&self, id: &str) -> AppResult<Order> {
        self.store
            .get_order(id)
            .await
            .ok_or_else(|| AppError::not_found(format!("Order {id}")))
    }

    /// 状态查询：读取路径强制执行惰性过期检查
    pub async fn get_order_status(&self, id: &str) -> AppResult<Order> {
        let order = self.get_order(id).await?;
        Ok(self.expire_if_lapsed(order).await)
    }

    /// Webhook 推进：pending → processing → completed | failed
    ///
    /// 载荷无法归一化或订单不存在时拒绝且不触碰任何状态；
    /// 其余情况一律返回 success 形响应 (可能是幂等 no-op)。
    pub async fn handle_webhook(&self, payload: &Value) -> AppResult<WebhookAck> {
        let Some(event) = payment::parse_webhook(payload) else {
            tracing::warn!("Invalid webhook payload");
            return Err(AppError::invalid("Invalid payload"));
        };

        let order = self
            .store
            .get_order(&event.order_id)
            .await
            .ok_or_else(|| AppError::not_found(format!("Order {}", event.order_id)))?;

        // 过期检查先行：迟到的结算 Webhook 不能开通已过期订单
        let order = self.expire_if_lapsed(order).await;

        if order.status != OrderStatus::Pending {
            tracing::info!(order_id = %order.id, status = %order.status, "Webhook for already-processed order");
            return Ok(WebhookAck::new("Order already processed"));
        }

        if !payment::is_payment_settled(&event.status) {
            tracing::info!(order_id = %order.id, status = %event.status, "Payment not settled yet");
            return Ok(WebhookAck::new("Payment status noted"));
        }

        // 动作时刻的 CAS：并发 Webhook 只有一个能进入 processing
        let Some(order) = self
            .store
            .transition_status(&order.id, OrderStatus::Pending, OrderStatus::Processing)
            .await
        else {
            tracing::info!(order_id = %event.order_id, "Lost transition race, treating webhook as handled");
            return Ok(WebhookAck::new("Order already processed"));
        };
        tracing::info!(order_id = %order.id, "Processing order");

        match self.provision_order(&order).await {
            Ok(credentials) => {
                self.store
                    .update_order_credentials(&order.id, credentials)
                    .await;
                tracing::info!(order_id = %order.id, "Server provisioned successfully");
                Ok(WebhookAck::new("Server provisioned"))
            }
            Err(e) => {
                self.store
                    .update_order_status(&order.id, OrderStatus::Failed)
                    .await;
                Err(AppError::Provisioning(e))
            }
        }
    }

    /// 模拟支付推进 (运维/测试辅助)：跳过网关确认，前置条件与
    /// Webhook 相同 (必须 pending 且未过期)
    ///
    /// 开通失败时兜底合成凭据并完成订单，绝不把订单卡在 processing。
    pub async fn simulate_payment(&self, id: &str) -> AppResult<Order> {
        let order = self.get_order(id).await?;
        let order = self.expire_if_lapsed(order).await;

        if order.status != OrderStatus::Pending {
            return Err(AppError::invalid("Order is not pending"));
        }

        let Some(order) = self
            .store
            .transition_status(id, OrderStatus::Pending, OrderStatus::Processing)
            .await
        else {
            return Err(AppError::invalid("Order is not pending"));
        };

        let Some(product) = self.catalog.get(&order.product_id) else {
            self.store
                .update_order_status(&order.id, OrderStatus::Failed)
                .await;
            return Err(AppError::not_found(format!("Product {}", order.product_id)));
        };

        let credentials = match self
            .provisioning
            .provision(
                &order.customer_email,
                &order.customer_username,
                &order.server_name,
                product,
            )
            .await
        {
            Ok(credentials) => credentials,
            Err(e) => {
                tracing::warn!(order_id = %order.id, error = %e, "Simulated provisioning failed, using demo credentials");
                self.provisioning.demo_credentials(&order.customer_username)
            }
        };

        self.store
            .update_order_credentials(&order.id, credentials)
            .await
            .ok_or_else(|| AppError::not_found(format!("Order {id}")))
    }

    /// 惰性过期：pending 且已过支付窗口 ⇒ CAS 到 expired
    ///
    /// CAS 失败说明有并发写者先行推进，重新读取最新状态。
    async fn expire_if_lapsed(&self, order: Order) -> Order {
        if order.status == OrderStatus::Pending && order.is_past_expiry(chrono::Utc::now()) {
            if let Some(expired) = self
                .store
                .transition_status(&order.id, OrderStatus::Pending, OrderStatus::Expired)
                .await
            {
                tracing::info!(order_id = %expired.id, "Order expired (payment window lapsed)");
                return expired;
            }
            return self.store.get_order(&order.id).await.unwrap_or(order);
        }
        order
    }

    /// Webhook 路径的开通调用；任何失败以字符串形式上抛，
    /// 由调用方统一标记订单 failed
    async fn provision_order(&self, order: &Order) -> Result<ServerCredentials, String> {
        let Some(product) = self.catalog.get(&order.product_id) else {
            return Err(format!("product {} missing from catalog", order.product_id));
        };

        self.provisioning
            .provision(
                &order.customer_email,
                &order.customer_username,
                &order.server_name,
                product,
            )
            .await
            .map_err(|e| e.to_string())
    }
}
