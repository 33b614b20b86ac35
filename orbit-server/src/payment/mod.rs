//! Pakasir 支付网关适配器
//!
//! 三个职责：
//!
//! 1. 为订单创建 QRIS 支付 ([`PakasirGateway::create_payment`])
//! 2. 将供应商 Webhook 载荷归一化为规范元组 ([`parse_webhook`])
//! 3. 判定支付是否已结算 ([`is_payment_settled`])
//!
//! 运行模式在启动时根据环境变量一次性选定：缺少 API 密钥或项目标识
//! 时进入演示模式，返回确定性的合成 QR 数据而不是报错。

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use crate::core::Config;

/// 已结算的规范状态值 - 用于门控开通
const SETTLED_STATUSES: [&str; 5] = ["completed", "paid", "success", "settlement", "capture"];

/// 支付网关错误 (仅 configured 模式会出现)
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Pakasir request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Pakasir API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Pakasir response malformed: {0}")]
    Malformed(String),
}

/// 创建支付的结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrisPayment {
    pub payment_number: String,
    pub qr_string: String,
    pub amount: i64,
    pub expires_at: DateTime<Utc>,
}

/// 归一化后的 Webhook 事件 (orderId, status, amount)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEvent {
    pub order_id: String,
    /// 已转小写的供应商状态值
    pub status: String,
    pub amount: i64,
}

enum GatewayMode {
    Configured {
        client: reqwest::Client,
        api_url: String,
        api_key: String,
        project_slug: String,
    },
    Demo,
}

/// Pakasir QRIS 支付网关
pub struct PakasirGateway {
    mode: GatewayMode,
}

impl PakasirGateway {
    /// 根据配置选择运行模式 (启动时调用一次)
    pub fn from_config(config: &Config) -> Self {
        let mode = match (&config.pakasir_api_key, &config.pakasir_project_slug) {
            (Some(api_key), Some(project_slug)) => GatewayMode::Configured {
                client: reqwest::Client::new(),
                api_url: config.pakasir_api_url.clone(),
                api_key: api_key.clone(),
                project_slug: project_slug.clone(),
            },
            _ => GatewayMode::Demo,
        };
        Self { mode }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self.mode, GatewayMode::Configured { .. })
    }

    /// 为订单创建 QRIS 支付
    ///
    /// 演示模式返回由订单 ID 确定性派生的合成 QR 数据；
    /// configured 模式下传输或供应商错误原样传播，由调用方兜底。
    pub async fn create_payment(
        &self,
        order_id: &str,
        amount: i64,
    ) -> Result<QrisPayment, PaymentError> {
        let GatewayMode::Configured {
            client,
            api_url,
            api_key,
            project_slug,
        } = &self.mode
        else {
            tracing::info!(order_id, "Pakasir not configured, using demo QR code");
            return Ok(QrisPayment {
                payment_number: format!("DEMO-{}", short(order_id, 8)),
                qr_string: demo_qr_string(order_id),
                amount,
                expires_at: Utc::now() + Duration::minutes(15),
            });
        };

        let request_body = json!({
            "project_slug": project_slug,
            "order_id": order_id,
            "amount": amount,
            "customer_name": "Customer",
            "customer_email": "customer@example.com",
            "customer_phone": "08000000000",
            "description": format!("Payment for Order #{order_id}"),
        });

        let response = client
            .post(api_url)
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status, %body, "Pakasir API error");
            return Err(PaymentError::Api { status, body });
        }

        let data: Value = response.json().await?;

        // 供应商字段命名不稳定：payment_number / qr_string 可能出现在
        // 顶层或 data 下，qr_code 为旧拼写
        let payment_number = data["payment_number"]
            .as_str()
            .or_else(|| data["data"]["payment_number"].as_str())
            .unwrap_or(order_id)
            .to_string();
        let qr_string = data["qr_string"]
            .as_str()
            .or_else(|| data["data"]["qr_string"].as_str())
            .or_else(|| data["qr_code"].as_str())
            .unwrap_or_default()
            .to_string();

        if !data["success"].as_bool().unwrap_or(false) && qr_string.is_empty() {
            let msg = data["message"].as_str().unwrap_or("missing qr_string").to_string();
            return Err(PaymentError::Malformed(msg));
        }

        Ok(QrisPayment {
            payment_number,
            qr_string,
            amount,
            expires_at: Utc::now() + Duration::minutes(15),
        })
    }
}

/// 归一化供应商 Webhook 载荷
///
/// 容忍多种字段拼写：order_id/orderId/external_id、status/payment_status、
/// amount/paid_amount。orderId 或 status 缺失时返回 None ——
/// 这是预期内的正常结果，不是故障。
pub fn parse_webhook(payload: &Value) -> Option<WebhookEvent> {
    let data = payload.as_object()?;

    let order_id = pick(data, &["order_id", "orderId", "external_id"])?;
    let order_id = stringify(order_id)?;

    let status = pick(data, &["status", "payment_status"])?;
    let status = stringify(status)?.to_lowercase();

    let amount = pick(data, &["amount", "paid_amount"])
        .map(coerce_amount)
        .unwrap_or(0);

    Some(WebhookEvent {
        order_id,
        status,
        amount,
    })
}

/// 该状态是否表示已收到款项
pub fn is_payment_settled(status: &str) -> bool {
    let status = status.to_lowercase();
    SETTLED_STATUSES.iter().any(|s| *s == status)
}

/// 支付创建失败时的兜底 QR 串 (由订单 ID 确定性派生，形状与供应商一致)
pub fn fallback_qr_string(order_id: &str) -> String {
    format!(
        "00020101021226660014ID.CO.QRIS.WWW0115ID20200000000020211{}0303UMI5204541153033605802ID5913OrbitCloud6013Jakarta Pusat610510340622{}63046B9A",
        short(order_id, 12),
        short(order_id, 8),
    )
}

/// 兜底支付单号
pub fn fallback_payment_number(order_id: &str) -> String {
    format!("PAY-{}", short(order_id, 8))
}

fn demo_qr_string(order_id: &str) -> String {
    format!(
        "00020101021226660014ID.CO.QRIS.WWW011893600914300000000020211{}0303UMI51470015ID.OR.GPNQR.WWW0215ID20200000000000303UMI5204541153033605802ID5913OrbitCloud6013Jakarta Pusat61051034062180714{}63046B9A",
        short(order_id, 12),
        short(order_id, 8),
    )
}

fn short(id: &str, n: usize) -> &str {
    id.get(..n).unwrap_or(id)
}

fn pick<'a>(data: &'a serde_json::Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| data.get(*name))
        .find(|v| !v.is_null())
}

fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn coerce_amount(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).unwrap_or(0),
        Value::String(s) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_payload() {
        let payload = json!({
            "order_id": "abc-123",
            "status": "SETTLEMENT",
            "amount": 20000,
        });
        let event = parse_webhook(&payload).unwrap();
        assert_eq!(event.order_id, "abc-123");
        assert_eq!(event.status, "settlement");
        assert_eq!(event.amount, 20000);
    }

    #[test]
    fn parses_alias_spellings() {
        let payload = json!({
            "orderId": "abc-123",
            "payment_status": "Paid",
            "paid_amount": "15000",
        });
        let event = parse_webhook(&payload).unwrap();
        assert_eq!(event.order_id, "abc-123");
        assert_eq!(event.status, "paid");
        assert_eq!(event.amount, 15000);
    }

    #[test]
    fn missing_order_id_or_status_is_invalid() {
        assert!(parse_webhook(&json!({ "status": "paid" })).is_none());
        assert!(parse_webhook(&json!({ "order_id": "abc" })).is_none());
        assert!(parse_webhook(&json!("not an object")).is_none());
    }

    #[test]
    fn missing_amount_defaults_to_zero() {
        let event = parse_webhook(&json!({ "order_id": "abc", "status": "paid" })).unwrap();
        assert_eq!(event.amount, 0);
    }

    #[test]
    fn settled_statuses() {
        for status in ["completed", "paid", "success", "settlement", "capture", "PAID"] {
            assert!(is_payment_settled(status), "{status} should be settled");
        }
        for status in ["pending", "expire", "deny", ""] {
            assert!(!is_payment_settled(status), "{status} should not be settled");
        }
    }

    #[test]
    fn fallback_payload_is_deterministic() {
        let id = "0b1c2d3e-4f50-6789-abcd-ef0123456789";
        assert_eq!(fallback_qr_string(id), fallback_qr_string(id));
        assert_eq!(fallback_payment_number(id), "PAY-0b1c2d3e");
        assert!(fallback_qr_string(id).contains("OrbitCloud"));
    }

    #[tokio::test]
    async fn demo_mode_create_payment_never_fails() {
        let config = Config {
            http_port: 0,
            environment: "test".into(),
            pakasir_api_key: None,
            pakasir_project_slug: None,
            pakasir_api_url: "http://unused".into(),
            pterodactyl_api_key: None,
            pterodactyl_panel_url: "http://unused".into(),
            pterodactyl_node_id: 1,
        };
        let gateway = PakasirGateway::from_config(&config);
        assert!(!gateway.is_configured());

        let payment = gateway.create_payment("abcdef01-2345", 20000).await.unwrap();
        assert_eq!(payment.payment_number, "DEMO-abcdef01");
        assert_eq!(payment.amount, 20000);
        assert!(!payment.qr_string.is_empty());
    }
}
