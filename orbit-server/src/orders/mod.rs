//! 订单生命周期编排模块
//!
//! 驱动订单沿状态机推进的核心逻辑：
//!
//! ```text
//! Create            ──► pending (价格快照 + 支付字段，失败时兜底 QR)
//! 惰性过期检查       ──► pending → expired (读取路径强制执行，无后台定时器)
//! Webhook 推进       ──► pending → processing → completed | failed
//! 模拟支付推进       ──► 同上，但跳过网关确认，失败时兜底合成凭据
//! ```
//!
//! # 并发保证
//!
//! 所有 pending → processing 转换通过存储层 compare-and-set 执行，
//! `processing` 状态本身就是并发护栏：开通进行中到达的第二个
//! Webhook/模拟调用看到的是 processing 而不是 pending，直接幂等返回。
//! 适配器调用期间不持有任何存储锁。

pub mod manager;

pub use manager::{OrdersManager, WebhookAck};
