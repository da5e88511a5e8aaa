//! 日志初始化
//!
//! 日志输出到 stderr，避免和菜单/列表输出混在 stdout。
//! 过滤规则取自 `TASK_TRACKER_LOG`（EnvFilter 语法），默认 `warn`。

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "TASK_TRACKER_LOG";

fn build_filter(verbose: bool) -> EnvFilter {
    let default = if verbose { "debug" } else { "warn" };
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default))
}

pub fn init_logging(verbose: bool) {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    if let Err(e) = tracing_subscriber::registry()
        .with(build_filter(verbose))
        .with(fmt_layer)
        .try_init()
    {
        eprintln!("Failed to initialize logging: {}", e);
    }
}
