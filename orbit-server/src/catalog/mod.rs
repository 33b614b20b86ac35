//! 商品目录
//!
//! 启动时装载的托管套餐目录。目录在进程生命周期内只读；
//! 订单的 `amount` 在创建时快照，之后即使目录价格变化也不受影响。

use shared::models::{EggConfig, Product, ProductCategory};

/// 套餐目录 (只读)
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// 装载内置套餐
    pub fn seed() -> Self {
        Self {
            products: seed_products(),
        }
    }

    /// 目录顺序返回所有套餐
    pub fn list(&self) -> &[Product] {
        &self.products
    }

    /// 按 ID 查找套餐
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}

fn seed_products() -> Vec<Product> {
    vec![
        Product {
            id: "samp-linux-basic".into(),
            name: "SAMP Hemat".into(),
            category: ProductCategory::SampLinux,
            description: "Server SAMP Linux ekonomis untuk pemula dengan performa stabil".into(),
            price: 15000,
            ram: 512,
            disk: 2048,
            cpu: 50,
            max_players: 50,
            features: vec![
                "Panel Pterodactyl Full Access".into(),
                "Auto Backup Harian".into(),
                "DDoS Protection Basic".into(),
                "Support 24/7 via Discord".into(),
                "Free MySQL Database".into(),
            ],
            egg_config: EggConfig {
                nest_id: 6,
                egg_id: 16,
                docker_image: "ghcr.io/parkervcp/games:samp".into(),
                startup: "./samp03svr".into(),
            },
        },
        Product {
            id: "samp-windows-pro".into(),
            name: "SAMP Sultan".into(),
            category: ProductCategory::SampWindows,
            description: "Server SAMP Windows premium dengan resource besar dan performa maksimal"
                .into(),
            price: 35000,
            ram: 1024,
            disk: 5120,
            cpu: 100,
            max_players: 100,
            features: vec![
                "Panel Pterodactyl Full Access".into(),
                "Auto Backup 2x Sehari".into(),
                "DDoS Protection Advanced".into(),
                "Priority Support 24/7".into(),
                "Free MySQL + Redis".into(),
                "Windows Native Performance".into(),
            ],
            egg_config: EggConfig {
                nest_id: 6,
                egg_id: 17,
                docker_image: "hcgcloud/pterodactyl-images:ubuntu-wine".into(),
                startup: "wine64 ./samp-server.exe".into(),
            },
        },
        Product {
            id: "nodejs-bot".into(),
            name: "Bot NodeJS".into(),
            category: ProductCategory::Nodejs,
            description: "Hosting NodeJS untuk bot Discord, Telegram, atau aplikasi web".into(),
            price: 20000,
            ram: 512,
            disk: 3072,
            cpu: 75,
            max_players: 0,
            features: vec![
                "Panel Pterodactyl Full Access".into(),
                "Node.js 21 LTS".into(),
                "NPM & Yarn Support".into(),
                "Auto Restart on Crash".into(),
                "Free MongoDB Access".into(),
                "Git Integration".into(),
            ],
            egg_config: EggConfig {
                nest_id: 5,
                egg_id: 15,
                docker_image: "ghcr.io/parkervcp/yolks:nodejs_21".into(),
                startup: "npm start".into(),
            },
        },
    ]
}
