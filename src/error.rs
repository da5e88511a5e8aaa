//! Task Tracker 统一错误类型定义
//!
//! 使用 `thiserror` 库提供统一的错误处理，支持错误链式传播。
//! 注意：任务不存在不是错误，存储层以 `Option::None` 表示。

use std::io;
use thiserror::Error;

/// Task Tracker 错误类型
#[derive(Debug, Error)]
pub enum TrackerError {
    /// I/O 错误（文件读写、目录操作等）
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON 解析/序列化错误（任务文件损坏）
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// TOML 解析错误
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML 序列化错误
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// 无法识别的任务状态
    #[error("Invalid status '{0}': expected one of todo, in-progress, done")]
    InvalidStatus(String),

    /// 无效数据
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// 配置错误
    #[error("Config error: {0}")]
    Config(String),
}

/// Task Tracker Result 类型别名
pub type Result<T> = std::result::Result<T, TrackerError>;

impl TrackerError {
    /// 创建 InvalidStatus 错误
    pub fn invalid_status(literal: impl Into<String>) -> Self {
        Self::InvalidStatus(literal.into())
    }

    /// 创建 InvalidData 错误
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// 创建 Config 错误
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
