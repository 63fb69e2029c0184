use anyhow::{anyhow, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 服务配置
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    /// 连接池上限，未设置时使用 sea-orm 默认值
    pub max_connections: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// 日志输出格式
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl ServerConfig {
    /// 监听地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: None,
        }
    }
}

impl DatabaseConfig {
    /// 是否为 SQLite 内存库；每个连接各自持有一份独立的库
    pub fn is_in_memory(&self) -> bool {
        self.url.starts_with("sqlite:")
            && (self.url.contains(":memory:") || self.url.contains("mode=memory"))
    }

    /// 实际使用的连接池上限，内存库固定为 1
    pub fn pool_size(&self) -> Option<u32> {
        if self.is_in_memory() {
            Some(1)
        } else {
            self.max_connections
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// 验证配置
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow!("server.port must be greater than 0"));
        }
        if self.database.url.trim().is_empty() {
            return Err(anyhow!("database.url cannot be empty"));
        }
        if self.database.max_connections == Some(0) {
            return Err(anyhow!("database.max_connections must be greater than 0"));
        }
        if self.database.is_in_memory() && self.database.max_connections.is_some_and(|n| n > 1) {
            return Err(anyhow!(
                "database.max_connections must be 1 for an in-memory SQLite database"
            ));
        }
        if self.logging.level.trim().is_empty() {
            return Err(anyhow!("logging.level cannot be empty"));
        }
        Ok(())
    }
}

/// 配置加载器
///
/// TOML 文件可选，环境变量（`<PREFIX>__SECTION__KEY`）覆盖文件中的值
pub struct ConfigLoader {
    path: PathBuf,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// 创建配置加载器
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            env_prefix: None,
        }
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// 加载并验证配置
    pub fn load(&self) -> Result<AppConfig> {
        let mut builder = Config::builder().add_source(
            File::from(self.path.as_path())
                .format(FileFormat::Toml)
                .required(false),
        );

        if let Some(prefix) = &self.env_prefix {
            builder = builder.add_source(
                Environment::with_prefix(prefix)
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
