/// 服务器配置 - 所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | HTTP_PORT | 5000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | PAKASIR_API_KEY | (无) | Pakasir API 密钥，缺失时支付进入演示模式 |
/// | PAKASIR_PROJECT_SLUG | (无) | Pakasir 项目标识 |
/// | PAKASIR_API_URL | app.pakasir.com 交易接口 | Pakasir 接口地址 |
/// | PTERODACTYL_API_KEY | (无) | 面板 API 密钥，缺失时开通进入演示模式 |
/// | PTERODACTYL_PANEL_URL | https://orbitcloud-mifx1large.vyuxn.xyz | 面板地址 |
/// | PTERODACTYL_NODE_ID | 1 | 分配端口扫描的节点 |
///
/// # 示例
///
/// ```ignore
/// HTTP_PORT=8080 PAKASIR_API_KEY=sk_xxx cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,

    // === Pakasir 支付网关 ===
    /// API 密钥 (None = 演示模式)
    pub pakasir_api_key: Option<String>,
    /// 项目标识
    pub pakasir_project_slug: Option<String>,
    /// 交易创建接口地址
    pub pakasir_api_url: String,

    // === Pterodactyl 面板 ===
    /// API 密钥 (None = 演示模式)
    pub pterodactyl_api_key: Option<String>,
    /// 面板地址
    pub pterodactyl_panel_url: String,
    /// 分配端口扫描的节点 ID
    pub pterodactyl_node_id: i64,
}

const DEFAULT_PAKASIR_API_URL: &str = "https://app.pakasir.com/api/transactioncreate/qris";
const DEFAULT_PANEL_URL: &str = "https://orbitcloud-mifx1large.vyuxn.xyz";

fn non_empty(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),

            pakasir_api_key: non_empty("PAKASIR_API_KEY"),
            pakasir_project_slug: non_empty("PAKASIR_PROJECT_SLUG"),
            pakasir_api_url: std::env::var("PAKASIR_API_URL")
                .unwrap_or_else(|_| DEFAULT_PAKASIR_API_URL.into()),

            pterodactyl_api_key: non_empty("PTERODACTYL_API_KEY"),
            pterodactyl_panel_url: std::env::var("PTERODACTYL_PANEL_URL")
                .unwrap_or_else(|_| DEFAULT_PANEL_URL.into()),
            pterodactyl_node_id: std::env::var("PTERODACTYL_NODE_ID")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(1),
        }
    }

    /// 支付网关是否配置完整 (API 密钥 + 项目标识)
    pub fn pakasir_configured(&self) -> bool {
        self.pakasir_api_key.is_some() && self.pakasir_project_slug.is_some()
    }

    /// 面板 API 是否配置
    pub fn pterodactyl_configured(&self) -> bool {
        self.pterodactyl_api_key.is_some()
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
