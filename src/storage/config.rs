//! 应用配置持久化
//!
//! 配置文件位于 ~/.task-tracker/config.toml，所有字段均可省略。

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{app_dir, load_toml, save_toml};
use crate::error::{Result, TrackerError};

/// 数据目录环境变量
pub const DATA_DIR_ENV: &str = "TASK_TRACKER_DIR";

/// 默认数据目录（相对当前工作目录）
const DEFAULT_DATA_DIR: &str = "Task-Tracker";

/// 应用配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// 任务文件所在目录
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// 任务文件名
    #[serde(default = "default_file_name")]
    pub file_name: String,
    /// 列出任务前是否清屏（仅交互菜单）
    #[serde(default = "default_clear_screen")]
    pub clear_screen: bool,
}

fn default_file_name() -> String {
    "tasks.json".to_string()
}

fn default_clear_screen() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            file_name: default_file_name(),
            clear_screen: default_clear_screen(),
        }
    }
}

impl Config {
    /// 解析最终的数据目录：命令行 > 环境变量 > 配置文件 > 默认值
    pub fn resolve_data_dir(&self, cli_override: Option<&Path>) -> PathBuf {
        if let Some(dir) = cli_override {
            return dir.to_path_buf();
        }
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            return PathBuf::from(dir);
        }
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }

    /// 任务文件完整路径
    pub fn tasks_file(&self, cli_override: Option<&Path>) -> PathBuf {
        self.resolve_data_dir(cli_override).join(&self.file_name)
    }
}

/// 获取配置文件路径
pub fn config_path() -> Option<PathBuf> {
    app_dir().map(|dir| dir.join("config.toml"))
}

/// 加载配置（不存在或无法解析时返回默认值）
pub fn load_config() -> Config {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => Config::default(),
    }
}

/// 从指定路径加载配置
pub fn load_config_from(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }
    match load_toml(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
            Config::default()
        }
    }
}

/// 保存配置
pub fn save_config(config: &Config) -> Result<()> {
    let path = config_path().ok_or_else(|| TrackerError::config("cannot find home directory"))?;
    save_config_to(&path, config)
}

/// 保存配置到指定路径
pub fn save_config_to(path: &Path, config: &Config) -> Result<()> {
    save_toml(path, config)
}
