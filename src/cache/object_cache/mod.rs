pub mod moka;

/// 登记内置缓存后端
pub fn register_builtin_plugins() {
    moka::register_plugin();
}
