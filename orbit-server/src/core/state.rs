use std::sync::Arc;

use crate::catalog::Catalog;
use crate::core::Config;
use crate::orders::OrdersManager;
use crate::payment::PakasirGateway;
use crate::provisioning::PterodactylService;
use crate::store::{MemOrderStore, OrderStore};

/// 服务器状态 - 持有所有服务的单例引用
///
/// ServerState 是后端的核心数据结构，持有所有服务的共享引用。
/// 使用 Arc 实现浅拷贝，克隆成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | catalog | Arc<Catalog> | 商品目录 (只读) |
/// | store | Arc<dyn OrderStore> | 订单存储 (状态唯一事实来源) |
/// | payment | Arc<PakasirGateway> | Pakasir 支付网关 |
/// | provisioning | Arc<PterodactylService> | Pterodactyl 开通服务 |
/// | orders | Arc<OrdersManager> | 订单生命周期编排器 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 商品目录
    pub catalog: Arc<Catalog>,
    /// 订单存储
    pub store: Arc<dyn OrderStore>,
    /// 支付网关
    pub payment: Arc<PakasirGateway>,
    /// 开通服务
    pub provisioning: Arc<PterodactylService>,
    /// 订单编排器
    pub orders: Arc<OrdersManager>,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 商品目录 (内置套餐)
    /// 2. 订单存储 (内存)
    /// 3. 两个外部适配器 (启动时根据环境变量一次性选定 configured/demo 模式)
    /// 4. 订单编排器
    pub fn initialize(config: &Config) -> Self {
        let catalog = Arc::new(Catalog::seed());
        let store: Arc<dyn OrderStore> = Arc::new(MemOrderStore::new());
        let payment = Arc::new(PakasirGateway::from_config(config));
        let provisioning = Arc::new(PterodactylService::from_config(config));

        if !payment.is_configured() {
            tracing::warn!("Pakasir not configured, payment gateway running in demo mode");
        }
        if !provisioning.is_configured() {
            tracing::warn!("Pterodactyl not configured, provisioning running in demo mode");
        }

        let orders = Arc::new(OrdersManager::new(
            store.clone(),
            catalog.clone(),
            payment.clone(),
            provisioning.clone(),
        ));

        Self {
            config: config.clone(),
            catalog,
            store,
            payment,
            provisioning,
            orders,
        }
    }

    /// 是否生产模式 (两个外部适配器均已配置)
    pub fn is_production_mode(&self) -> bool {
        self.payment.is_configured() && self.provisioning.is_configured()
    }
}
