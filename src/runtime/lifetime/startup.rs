use crate::cache::{ObjectCache, object_cache::register_builtin_plugins, register::get_object_cache_plugin};
use crate::config::AppConfig;
use crate::errors::{ObeError, Result};
use crate::services::reports::ReportService;
use crate::storage::Storage;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
}

/// 创建缓存实例，配置的后端不可用时回退到内存缓存
async fn create_cache() -> Result<Arc<dyn ObjectCache>> {
    let config = AppConfig::get();
    let cache_type = &config.cache.cache_type;

    warn!("Attempting to create {} cache backend", cache_type);

    if let Some(constructor) = get_object_cache_plugin(cache_type) {
        match constructor().await {
            Ok(cache) => {
                warn!("Successfully created {} cache backend", cache_type);
                return Ok(Arc::from(cache));
            }
            Err(e) => warn!("Failed to create {} cache: {}", cache_type, e),
        }
    } else {
        warn!("Cache backend '{}' not found in registry", cache_type);
    }

    if cache_type != "moka"
        && let Some(fallback_constructor) = get_object_cache_plugin("moka")
    {
        warn!("Falling back to memory cache");
        let cache = fallback_constructor().await?;
        return Ok(Arc::from(cache));
    }

    Err(ObeError::cache_plugin_not_found(format!(
        "No cache backend available (tried: {cache_type})"
    )))
}

/// 启动时重算所有学生的 PO 得分，失败只记录日志
async fn warm_po_scores(storage: &Arc<dyn Storage>) {
    let concurrency = AppConfig::get().engine.recompute_concurrency;
    match ReportService::recompute_all_students(storage.clone(), concurrency).await {
        Ok(summary) => info!(
            "Startup PO recompute finished: {} succeeded, {} failed",
            summary.succeeded, summary.failed
        ),
        Err(e) => warn!("Startup PO recompute skipped: {}", e),
    }
}

/// 准备服务器启动的上下文
/// 包括存储、缓存
pub async fn prepare_server_startup() -> Result<StartupContext> {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    register_builtin_plugins();
    if cfg!(debug_assertions) {
        crate::cache::register::debug_object_cache_registry();
        debug!("Debug mode: Cache registry is enabled");
    }

    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    if AppConfig::get().engine.recompute_on_write {
        warm_po_scores(&storage).await;
    }

    let cache = create_cache().await?;
    warn!("Cache backend initialized");

    Ok(StartupContext { storage, cache })
}
