use tracing_subscriber::EnvFilter;

/// 初始化日志；RUST_LOG 优先于配置中的日志级别
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("study_buddy={}", default_level)))
        .unwrap_or_else(|_| EnvFilter::new("study_buddy=info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
