use crate::utils::StockUnderflowPolicy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub inventory: InventoryConfig,
    #[serde(default)]
    pub notification: NotificationConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_in: i64, // seconds
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InventoryConfig {
    /// 库存不足时的处理策略: block / clamp / allow_negative
    #[serde(default)]
    pub stock_underflow: StockUnderflowPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_notification_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub target_phone: String,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_notification_base_url() -> String {
    "https://api.fonnte.com/send".to_string()
}

fn default_queue_capacity() -> usize {
    256
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_notification_base_url(),
            token: String::new(),
            target_phone: String::new(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CorsConfig {
    /// 为空时允许任意来源（本地开发）
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BootstrapConfig {
    #[serde(default)]
    pub admin_username: Option<String>,
    #[serde(default)]
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                toml::from_str(&config_str).map_err(|e| format!("Failed to parse config file: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                // 数据库 URL 在无配置文件时必须提供
                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is not set and no config.toml was found")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        expires_in: get_env_parse("JWT_EXPIRES_IN", 86_400i64),
                    },
                    inventory: InventoryConfig {
                        stock_underflow: get_env_parse(
                            "STOCK_UNDERFLOW_POLICY",
                            StockUnderflowPolicy::default(),
                        ),
                    },
                    notification: NotificationConfig {
                        enabled: get_env_parse("NOTIFICATION_ENABLED", false),
                        base_url: get_env("NOTIFICATION_BASE_URL")
                            .unwrap_or_else(default_notification_base_url),
                        token: get_env("FONNTE_TOKEN").unwrap_or_default(),
                        target_phone: get_env("NOTIFICATION_TARGET_PHONE").unwrap_or_default(),
                        queue_capacity: get_env_parse(
                            "NOTIFICATION_QUEUE_CAPACITY",
                            default_queue_capacity(),
                        ),
                    },
                    cors: CorsConfig {
                        allowed_origins: get_env("CORS_ALLOWED_ORIGINS")
                            .map(|v| split_list(&v))
                            .unwrap_or_default(),
                    },
                    bootstrap: BootstrapConfig {
                        admin_username: get_env("BOOTSTRAP_ADMIN_USERNAME"),
                        admin_password: get_env("BOOTSTRAP_ADMIN_PASSWORD"),
                    },
                }
            }
            Err(e) => {
                return Err(format!("Failed to read config file {config_path}: {e}").into());
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            config.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            config.jwt.expires_in = n;
        }
        if let Ok(v) = env::var("STOCK_UNDERFLOW_POLICY") {
            config.inventory.stock_underflow = v
                .parse()
                .map_err(|e| format!("Invalid STOCK_UNDERFLOW_POLICY: {e}"))?;
        }
        if let Ok(v) = env::var("NOTIFICATION_ENABLED")
            && let Ok(b) = v.parse()
        {
            config.notification.enabled = b;
        }
        if let Ok(v) = env::var("NOTIFICATION_BASE_URL") {
            config.notification.base_url = v;
        }
        if let Ok(v) = env::var("FONNTE_TOKEN") {
            config.notification.token = v;
        }
        if let Ok(v) = env::var("NOTIFICATION_TARGET_PHONE") {
            config.notification.target_phone = v;
        }
        if let Ok(v) = env::var("CORS_ALLOWED_ORIGINS") {
            config.cors.allowed_origins = split_list(&v);
        }
        if let Ok(v) = env::var("BOOTSTRAP_ADMIN_USERNAME") {
            config.bootstrap.admin_username = Some(v);
        }
        if let Ok(v) = env::var("BOOTSTRAP_ADMIN_PASSWORD") {
            config.bootstrap.admin_password = Some(v);
        }

        Ok(config)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
