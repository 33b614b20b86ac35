//! OrbitCloud Server - 虚拟服务器托管自动开通系统
//!
//! # 架构概述
//!
//! 本模块是 OrbitCloud 后端的主入口，提供以下核心功能：
//!
//! - **商品目录** (`catalog`): 启动时装载的托管套餐目录 (只读)
//! - **订单存储** (`store`): 并发安全的内存订单存储，订单状态唯一事实来源
//! - **支付网关** (`payment`): Pakasir QRIS 支付创建与 Webhook 归一化
//! - **开通服务** (`provisioning`): Pterodactyl 面板账户 + 服务器实例开通
//! - **订单编排** (`orders`): 订单生命周期状态机 (核心)
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! orbit-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── catalog/       # 商品目录
//! ├── store/         # 订单存储
//! ├── payment/       # Pakasir 支付网关适配器
//! ├── provisioning/  # Pterodactyl 开通适配器
//! ├── orders/        # 订单生命周期编排器
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 错误、日志工具
//! ```

pub mod api;
pub mod catalog;
pub mod core;
pub mod orders;
pub mod payment;
pub mod provisioning;
pub mod store;
pub mod utils;

// Re-export 公共类型
pub use catalog::Catalog;
pub use core::{Config, Server, ServerState};
pub use orders::OrdersManager;
pub use store::{MemOrderStore, OrderStore};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境 (dotenv + 日志)
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    init_logger_with_file(log_level.as_deref(), None);

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   ____       _     _ __  ________                __
  / __ \_____/ /_  (_) /_/ ____/ /___  __  ______/ /
 / / / / ___/ __ \/ / __/ /   / / __ \/ / / / __  /
/ /_/ / /  / /_/ / / /_/ /___/ / /_/ / /_/ / /_/ /
\____/_/  /_.___/_/\__/\____/_/\____/\__,_/\__,_/
    "#
    );
}
