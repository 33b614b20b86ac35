//! 订单生命周期集成测试 - 演示模式下的完整状态机流转
//!
//! 使用 ServerState::initialize 完整初始化 (两个适配器均为演示模式)，
//! 直接驱动编排器，覆盖购买 → 支付 → 开通的真实路径。

use std::sync::Arc;

use orbit_server::{Config, ServerState};
use serde_json::json;
use shared::models::OrderStatus;
use shared::request::CreateOrderRequest;

fn demo_config() -> Config {
    Config {
        http_port: 0,
        environment: "test".into(),
        pakasir_api_key: None,
        pakasir_project_slug: None,
        pakasir_api_url: "http://unused".into(),
        pterodactyl_api_key: None,
        pterodactyl_panel_url: "https://orbitcloud-mifx1large.vyuxn.xyz".into(),
        pterodactyl_node_id: 1,
    }
}

fn checkout(product_id: &str) -> CreateOrderRequest {
    CreateOrderRequest {
        product_id: product_id.to_string(),
        customer_email: "budi@example.com".to_string(),
        customer_username: "budi_88".to_string(),
        server_name: "bot saya".to_string(),
    }
}

#[tokio::test]
async fn demo_state_reports_demo_mode() {
    let state = ServerState::initialize(&demo_config());
    assert!(!state.is_production_mode());
    assert!(!state.payment.is_configured());
    assert!(!state.provisioning.is_configured());
}

#[tokio::test]
async fn nodejs_bot_checkout_and_simulated_payment() {
    let state = ServerState::initialize(&demo_config());

    // 下单：价格快照 20000，pending，QR 已附加
    let order = state.orders.create_order(&checkout("nodejs-bot")).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.amount, 20000);
    assert!(order.qr_code.is_some());

    // 模拟支付：完成并附加凭据
    let done = state.orders.simulate_payment(&order.id).await.unwrap();
    assert_eq!(done.status, OrderStatus::Completed);
    let credentials = done.server_credentials.expect("credentials must be attached");
    assert!(!credentials.panel_url.is_empty());
    assert!(!credentials.username.is_empty());

    // 状态轮询看到终态
    let polled = state.orders.get_order_status(&order.id).await.unwrap();
    assert_eq!(polled.status, OrderStatus::Completed);
}

#[tokio::test]
async fn settlement_webhook_is_idempotent_across_redelivery() {
    let state = ServerState::initialize(&demo_config());
    let order = state.orders.create_order(&checkout("samp-linux-basic")).await.unwrap();
    assert_eq!(order.amount, 15000);

    let payload = json!({
        "order_id": order.id,
        "status": "settlement",
        "amount": order.amount,
    });

    let ack = state.orders.handle_webhook(&payload).await.unwrap();
    assert!(ack.success);

    let done = state.orders.get_order(&order.id).await.unwrap();
    assert_eq!(done.status, OrderStatus::Completed);
    let first = done.server_credentials.unwrap();

    // 同一载荷重复投递：success 形响应，凭据不变，无二次开通
    let ack = state.orders.handle_webhook(&payload).await.unwrap();
    assert!(ack.success);
    let after = state.orders.get_order(&order.id).await.unwrap();
    assert_eq!(after.server_credentials.unwrap(), first);
}

#[tokio::test]
async fn concurrent_simulates_provision_exactly_once() {
    let state = Arc::new(ServerState::initialize(&demo_config()));
    let order = state.orders.create_order(&checkout("samp-windows-pro")).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let state = state.clone();
        let id = order.id.clone();
        handles.push(tokio::spawn(async move {
            state.orders.simulate_payment(&id).await.is_ok()
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap() {
            successes += 1;
        }
    }

    // processing 状态即并发护栏：只有一个调用者完成转换
    assert_eq!(successes, 1);
    let done = state.orders.get_order(&order.id).await.unwrap();
    assert_eq!(done.status, OrderStatus::Completed);
    assert!(done.server_credentials.is_some());
}

#[tokio::test]
async fn order_reads_do_not_mutate_until_expiry() {
    let state = ServerState::initialize(&demo_config());
    let order = state.orders.create_order(&checkout("nodejs-bot")).await.unwrap();

    // 窗口内轮询保持 pending
    for _ in 0..3 {
        let read = state.orders.get_order_status(&order.id).await.unwrap();
        assert_eq!(read.status, OrderStatus::Pending);
    }

    // 未结算状态的 Webhook 不改变任何东西
    let ack = state
        .orders
        .handle_webhook(&json!({ "order_id": order.id, "status": "pending" }))
        .await
        .unwrap();
    assert!(ack.success);
    assert_eq!(
        state.orders.get_order(&order.id).await.unwrap().status,
        OrderStatus::Pending
    );
}
