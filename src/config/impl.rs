use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, ConfigError, Environment, File};
use std::sync::OnceLock;

use super::AppConfig;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

impl AppConfig {
    /// 加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            // 首先加载默认配置文件
            .add_source(File::with_name("config").required(false))
            // 然后根据环境加载特定配置文件
            .add_source(
                File::with_name(&format!(
                    "config.{}",
                    std::env::var("APP_ENV").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // 最后加载环境变量覆盖
            .add_source(
                Environment::with_prefix("OBE")
                    .separator("_")
                    .try_parsing(true),
            );

        // 支持从环境变量加载
        builder = builder
            .set_override_option("app.environment", std::env::var("APP_ENV").ok())?
            .set_override_option("app.log_level", std::env::var("RUST_LOG").ok())?
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("server.unix_socket_path", std::env::var("UNIX_SOCKET").ok())?
            .set_override_option("server.workers", std::env::var("CPU_COUNT").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?;

        Self::from_builder(builder)
    }

    /// 补齐引擎与上传默认值，反序列化后校验
    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config = builder
            .set_default("upload.max_size", 5 * 1024 * 1024)?
            .set_default("upload.allowed_types", vec![".csv", ".xlsx"])?
            .set_default("engine.recompute_on_write", true)?
            .set_default("engine.recompute_concurrency", 4)?
            .set_default("engine.treat_missing_as_zero", true)?
            .set_default("engine.import.chunk_size", 200)?
            .set_default("engine.import.max_rows", 5000)?
            .build()?;
        let mut app_config: AppConfig = config.try_deserialize()?;

        // 处理工作线程数
        if app_config.server.workers == 0 {
            app_config.server.workers = num_cpus::get().min(app_config.server.max_workers);
        }
        app_config.normalize_engine()?;

        Ok(app_config)
    }

    /// 引擎与导入参数：并发和块大小至少为 1，扩展名统一为小写并带点
    fn normalize_engine(&mut self) -> Result<(), ConfigError> {
        let engine = &mut self.engine;
        engine.recompute_concurrency = engine.recompute_concurrency.max(1);
        engine.import.chunk_size = engine.import.chunk_size.max(1);
        if engine.import.max_rows == 0 {
            return Err(ConfigError::Message(
                "engine.import.max_rows must be greater than 0".to_string(),
            ));
        }

        if self.upload.allowed_types.is_empty() {
            return Err(ConfigError::Message(
                "upload.allowed_types must list at least one extension".to_string(),
            ));
        }
        for ext in &mut self.upload.allowed_types {
            let lowered = ext.trim().to_lowercase();
            *ext = if lowered.starts_with('.') {
                lowered
            } else {
                format!(".{lowered}")
            };
        }
        Ok(())
    }

    /// 获取全局配置实例
    pub fn get() -> &'static AppConfig {
        APP_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                eprintln!("Failed to load configuration: {e}");
                std::process::exit(1);
            })
        })
    }

    /// 初始化配置 (在应用启动时调用)
    pub fn init() -> Result<(), ConfigError> {
        let config = Self::load()?;
        APP_CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("Configuration already initialized".to_string()))?;
        Ok(())
    }

    /// 检查是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    /// 获取服务器绑定地址
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 获取 Unix 套接字路径 (如果配置了)
    #[cfg(unix)]
    pub fn unix_socket_path(&self) -> Option<&str> {
        if self.server.unix_socket_path.is_empty() {
            None
        } else {
            Some(&self.server.unix_socket_path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    const BASE: &str = include_str!("../../config.toml");

    fn load_str(toml: &str) -> Result<AppConfig, ConfigError> {
        AppConfig::from_builder(
            Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
        )
    }

    fn without_engine_and_upload() -> String {
        let mut kept = Vec::new();
        let mut skipping = false;
        for line in BASE.lines() {
            if line.starts_with('[') {
                skipping = line.starts_with("[engine") || line.starts_with("[upload");
            }
            if !skipping {
                kept.push(line);
            }
        }
        kept.join("\n")
    }

    #[test]
    fn test_bundled_config_loads() {
        let config = load_str(BASE).unwrap();
        assert_eq!(config.engine.import.chunk_size, 200);
        assert_eq!(config.engine.import.max_rows, 5000);
        assert_eq!(config.upload.allowed_types, vec![".csv", ".xlsx"]);
    }

    #[test]
    fn test_engine_defaults_when_sections_missing() {
        let config = load_str(&without_engine_and_upload()).unwrap();
        assert!(config.engine.recompute_on_write);
        assert_eq!(config.engine.recompute_concurrency, 4);
        assert!(config.engine.treat_missing_as_zero);
        assert_eq!(config.engine.import.chunk_size, 200);
        assert_eq!(config.upload.max_size, 5 * 1024 * 1024);
    }

    #[test]
    fn test_engine_values_are_normalized() {
        let toml = format!(
            "{}\n[upload]\nmax_size = 1024\nallowed_types = [\"CSV\", \".XLSX\"]\n\n[engine]\nrecompute_concurrency = 0\n\n[engine.import]\nchunk_size = 0\n",
            without_engine_and_upload()
        );
        let config = load_str(&toml).unwrap();
        assert_eq!(config.engine.recompute_concurrency, 1);
        assert_eq!(config.engine.import.chunk_size, 1);
        assert_eq!(config.upload.allowed_types, vec![".csv", ".xlsx"]);
    }

    #[test]
    fn test_zero_max_rows_is_rejected() {
        let toml = format!(
            "{}\n[engine.import]\nmax_rows = 0\n",
            without_engine_and_upload()
        );
        assert!(load_str(&toml).is_err());
    }
}
