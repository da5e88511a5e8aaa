pub mod config;
pub mod tasks;
pub mod timestamp;

use std::io;
use std::path::{Path, PathBuf};

/// 获取 ~/.task-tracker/ 目录路径（找不到 home 目录时返回 None）
pub fn app_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".task-tracker"))
}

/// 确保目录存在
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.as_os_str().is_empty() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// 从 TOML 文件加载反序列化数据
pub fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> crate::error::Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// 将数据序列化后保存到 TOML 文件
pub fn save_toml<T: serde::Serialize>(path: &Path, data: &T) -> crate::error::Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let content = toml::to_string_pretty(data)?;
    std::fs::write(path, content)?;
    Ok(())
}
