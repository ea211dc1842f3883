//! 错误类型

use std::path::PathBuf;

use thiserror::Error;

/// 字段注册表错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("field already registered: {0}")]
    DuplicateField(String),
}

/// 配置文件 (profile) 读写错误
#[derive(Debug, Error)]
pub enum ProfileError {
    /// 尚未选择配置文件
    #[error("no settings file selected")]
    NoPathSelected,

    #[error("settings file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed settings file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// 矿工进程会话错误
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("miner is already running (pid {pid})")]
    AlreadyRunning { pid: u32 },

    #[error("miner is not running")]
    NotRunning,

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read miner output: {0}")]
    Stream(#[source] std::io::Error),

    #[error("failed to stop {name}: {message}")]
    Kill { name: String, message: String },
}
