//! Pterodactyl 开通适配器
//!
//! 给定客户 + 套餐，完成三步开通：
//!
//! 1. 按邮箱 find-or-create 面板账户 (按邮箱幂等，重复开通复用既有账户)
//! 2. 在配置节点上分页扫描一个空闲的 IP+端口分配 (最多 10 页，防止无界扫描)
//! 3. 按套餐的 egg 模板和资源限制创建服务器实例
//!
//! 未配置 API 密钥时进入演示模式：返回形状完整的合成凭据而不是报错，
//! 使系统其余部分可以在没有真实面板的情况下运行。

use rand::Rng;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use chrono::Utc;
use shared::models::{Product, ServerCredentials};

use crate::core::Config;

/// 分配扫描页数上限
const MAX_ALLOCATION_PAGES: u32 = 10;

/// 开通错误 (仅 configured 模式会出现)
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("no available port allocation found")]
    NoCapacity,

    #[error("panel request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("panel API returned {status}: {body}")]
    Api { status: u16, body: String },
}

#[derive(Debug, Deserialize)]
struct PanelList<T> {
    data: Vec<PanelObject<T>>,
    #[serde(default)]
    meta: Option<PanelMeta>,
}

#[derive(Debug, Deserialize)]
struct PanelObject<T> {
    attributes: T,
}

#[derive(Debug, Deserialize)]
struct PanelMeta {
    pagination: Option<PanelPagination>,
}

#[derive(Debug, Deserialize)]
struct PanelPagination {
    total_pages: u32,
}

/// 面板账户
#[derive(Debug, Clone, Deserialize)]
struct PanelUser {
    id: i64,
    username: String,
}

/// IP+端口分配 - 每个分配只能绑定一个服务器实例
#[derive(Debug, Clone, Deserialize)]
struct PanelAllocation {
    id: i64,
    ip: String,
    port: u16,
    assigned: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct PanelServer {
    id: i64,
}

enum PanelMode {
    Configured {
        client: reqwest::Client,
        panel_url: String,
        api_key: String,
        node_id: i64,
    },
    Demo,
}

/// Pterodactyl 开通服务
pub struct PterodactylService {
    mode: PanelMode,
    panel_url: String,
}

impl PterodactylService {
    /// 根据配置选择运行模式 (启动时调用一次)
    pub fn from_config(config: &Config) -> Self {
        let panel_url = config.pterodactyl_panel_url.clone();
        let mode = match &config.pterodactyl_api_key {
            Some(api_key) => PanelMode::Configured {
                client: reqwest::Client::new(),
                panel_url: panel_url.clone(),
                api_key: api_key.clone(),
                node_id: config.pterodactyl_node_id,
            },
            None => PanelMode::Demo,
        };
        Self { mode, panel_url }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self.mode, PanelMode::Configured { .. })
    }

    /// 完整开通流程：账户 → 分配 → 服务器实例
    ///
    /// 演示模式直接返回合成凭据，从不失败。configured 模式下任何一步
    /// 失败都会传播错误，由调用方负责将订单标记为 failed。
    pub async fn provision(
        &self,
        email: &str,
        username: &str,
        server_name: &str,
        product: &Product,
    ) -> Result<ServerCredentials, ProvisionError> {
        if !self.is_configured() {
            tracing::info!(email, "Pterodactyl not configured, returning demo credentials");
            return Ok(self.demo_credentials(username));
        }

        tracing::info!(email, "Starting server provisioning");

        let (user, password) = self.find_or_create_user(email, username).await?;
        tracing::info!(user_id = user.id, "Panel user ready");

        let allocation = self
            .find_available_allocation()
            .await?
            .ok_or(ProvisionError::NoCapacity)?;
        tracing::info!(ip = %allocation.ip, port = allocation.port, "Found free allocation");

        let server = self
            .create_server(user.id, allocation.id, server_name, product)
            .await?;
        tracing::info!(server_id = server.id, "Server instance created");

        Ok(ServerCredentials {
            panel_url: self.panel_url.clone(),
            username: user.username,
            password: password.unwrap_or_else(|| "(Use your existing password)".to_string()),
            server_id: server.id,
            server_ip: allocation.ip,
            server_port: allocation.port,
        })
    }

    /// 合成演示凭据 (形状与真实凭据一致)
    ///
    /// 也用于模拟支付路径在面板不可用时的兜底。
    pub fn demo_credentials(&self, username: &str) -> ServerCredentials {
        let mut rng = rand::thread_rng();
        ServerCredentials {
            panel_url: self.panel_url.clone(),
            username: sanitize_username(username),
            password: format!("demo_{}", random_token(12).to_lowercase()),
            server_id: rng.gen_range(1..=1000),
            server_ip: format!("103.150.60.{}", rng.gen_range(0..255)),
            server_port: 7777 + rng.gen_range(0..100),
        }
    }

    /// 面板连通性探测 (用于详细健康检查)
    pub async fn test_connection(&self) -> bool {
        let PanelMode::Configured { .. } = &self.mode else {
            return false;
        };
        match self.request(reqwest::Method::GET, "/nodes", None).await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn request(
        &self,
        method: reqwest::Method,
        endpoint: &str,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response, ProvisionError> {
        let PanelMode::Configured {
            client,
            panel_url,
            api_key,
            ..
        } = &self.mode
        else {
            unreachable!("request() is only reachable in configured mode");
        };

        let mut req = client
            .request(method, format!("{panel_url}/api/application{endpoint}"))
            .bearer_auth(api_key)
            .header("Accept", "application/json");
        if let Some(body) = body {
            req = req.json(&body);
        }
        Ok(req.send().await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<PanelUser>, ProvisionError> {
        let endpoint = format!(
            "/users?filter[email]={}",
            urlencode(email)
        );
        let response = self.request(reqwest::Method::GET, &endpoint, None).await?;

        if !response.status().is_success() {
            // 查询失败按"未找到"处理，走创建路径
            tracing::warn!(status = %response.status(), "Panel user search failed");
            return Ok(None);
        }

        let list: PanelList<PanelUser> = response.json().await?;
        Ok(list.data.into_iter().next().map(|o| o.attributes))
    }

    async fn create_user(
        &self,
        email: &str,
        username: &str,
    ) -> Result<(PanelUser, String), ProvisionError> {
        let password = random_token(16);
        let body = json!({
            "email": email,
            "username": username,
            "first_name": username,
            "last_name": "User",
            "password": password,
        });

        let response = self.request(reqwest::Method::POST, "/users", Some(body)).await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status, %body, "Failed to create panel user");
            return Err(ProvisionError::Api { status, body });
        }

        let user: PanelObject<PanelUser> = response.json().await?;
        Ok((user.attributes, password))
    }

    /// 按邮箱 find-or-create (幂等)：已有账户直接复用，不重复创建
    async fn find_or_create_user(
        &self,
        email: &str,
        username: &str,
    ) -> Result<(PanelUser, Option<String>), ProvisionError> {
        if let Some(existing) = self.find_user_by_email(email).await? {
            return Ok((existing, None));
        }

        // 全新账户：清洗用户名并追加时间戳后缀保证唯一
        let unique = format!(
            "{}_{:x}",
            sanitize_username(username),
            Utc::now().timestamp_millis()
        );
        let (user, password) = self.create_user(email, &unique).await?;
        Ok((user, Some(password)))
    }

    /// 分页扫描一个空闲分配，最多 [`MAX_ALLOCATION_PAGES`] 页
    async fn find_available_allocation(&self) -> Result<Option<PanelAllocation>, ProvisionError> {
        let PanelMode::Configured { node_id, .. } = &self.mode else {
            return Ok(None);
        };
        let node_id = *node_id;

        let mut page = 1u32;
        while page <= MAX_ALLOCATION_PAGES {
            let endpoint = format!("/nodes/{node_id}/allocations?page={page}");
            let response = self.request(reqwest::Method::GET, &endpoint, None).await?;

            if !response.status().is_success() {
                tracing::error!(status = %response.status(), "Failed to fetch allocations");
                return Ok(None);
            }

            let list: PanelList<PanelAllocation> = response.json().await?;

            if let Some(free) = list.data.into_iter().map(|o| o.attributes).find(|a| !a.assigned) {
                return Ok(Some(free));
            }

            match list.meta.and_then(|m| m.pagination) {
                Some(p) if page < p.total_pages => page += 1,
                _ => break,
            }
        }

        Ok(None)
    }

    async fn create_server(
        &self,
        user_id: i64,
        allocation_id: i64,
        server_name: &str,
        product: &Product,
    ) -> Result<PanelServer, ProvisionError> {
        let egg = &product.egg_config;
        let body = json!({
            "name": server_name,
            "user": user_id,
            "egg": egg.egg_id,
            "docker_image": egg.docker_image,
            "startup": egg.startup,
            "environment": {
                "MAX_PLAYERS": if product.max_players > 0 { product.max_players } else { 50 }.to_string(),
                "RCON_PASSWORD": random_token(16),
                "SERVER_NAME": server_name,
            },
            "limits": {
                "memory": product.ram,
                "swap": 0,
                "disk": product.disk,
                "io": 500,
                "cpu": product.cpu,
            },
            "feature_limits": {
                "databases": 1,
                "backups": 2,
                "allocations": 1,
            },
            "allocation": {
                "default": allocation_id,
            },
        });

        let response = self.request(reqwest::Method::POST, "/servers", Some(body)).await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status, %body, "Failed to create server");
            return Err(ProvisionError::Api { status, body });
        }

        let server: PanelObject<PanelServer> = response.json().await?;
        Ok(server.attributes)
    }
}

/// 面板用户名清洗：小写，非 [a-z0-9_] 替换为下划线，截断到 20 字符
fn sanitize_username(username: &str) -> String {
    username
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(20)
        .collect()
}

fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn urlencode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{b:02X}"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_service() -> PterodactylService {
        let config = Config {
            http_port: 0,
            environment: "test".into(),
            pakasir_api_key: None,
            pakasir_project_slug: None,
            pakasir_api_url: "http://unused".into(),
            pterodactyl_api_key: None,
            pterodactyl_panel_url: "https://panel.test".into(),
            pterodactyl_node_id: 1,
        };
        PterodactylService::from_config(&config)
    }

    #[test]
    fn sanitizes_usernames() {
        assert_eq!(sanitize_username("Budi Santoso!"), "budi_santoso_");
        assert_eq!(sanitize_username("ok_name_99"), "ok_name_99");
        assert_eq!(
            sanitize_username("averyveryverylongusername"),
            "averyveryverylonguse"
        );
    }

    #[test]
    fn urlencodes_emails() {
        assert_eq!(urlencode("budi+vps@example.com"), "budi%2Bvps%40example.com");
    }

    #[tokio::test]
    async fn demo_provision_never_fails() {
        let service = demo_service();
        assert!(!service.is_configured());

        let product = crate::catalog::Catalog::seed().get("nodejs-bot").unwrap().clone();
        let creds = service
            .provision("budi@example.com", "Budi 88", "bot saya", &product)
            .await
            .unwrap();

        assert_eq!(creds.panel_url, "https://panel.test");
        assert_eq!(creds.username, "budi_88");
        assert!(creds.password.starts_with("demo_"));
        assert!(creds.server_ip.starts_with("103.150.60."));
        assert!((7777..7877).contains(&creds.server_port));
    }

    #[tokio::test]
    async fn demo_test_connection_is_false() {
        assert!(!demo_service().test_connection().await);
    }
}
