//! Product Model

use serde::{Deserialize, Serialize};

/// Hosting plan category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductCategory {
    SampLinux,
    SampWindows,
    Nodejs,
}

/// Pterodactyl egg template used when creating the server instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EggConfig {
    pub nest_id: i64,
    pub egg_id: i64,
    pub docker_image: String,
    pub startup: String,
}

/// Hosting plan (immutable, seeded at startup)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub category: ProductCategory,
    pub description: String,
    /// Price in IDR
    pub price: i64,
    /// Memory limit in MiB
    pub ram: i64,
    /// Disk limit in MiB
    pub disk: i64,
    /// CPU share in percent (100 = one full core)
    pub cpu: i64,
    /// Player slot capacity (0 for non-game plans)
    pub max_players: i64,
    pub features: Vec<String>,
    pub egg_config: EggConfig,
}
