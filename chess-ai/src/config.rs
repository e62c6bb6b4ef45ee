//! 引擎配置

use std::path::{Path, PathBuf};

use protocol::{DEFAULT_MOVE_OVERHEAD_MS, ENGINE_AUTHOR, ENGINE_NAME, MOVE_OVERHEAD_RANGE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 配置文件路径的环境变量
pub const CONFIG_ENV_VAR: &str = "SCHMOCK_CONFIG";

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 读取文件失败
    #[error("Failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON 格式错误
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// 引擎配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 每步预留的通信延迟（毫秒）
    pub move_overhead_ms: u64,
    /// 没有任何时钟信息时的思考时间（毫秒）
    pub fallback_think_ms: u64,
    /// 未给出 movestogo 时假定的剩余步数
    pub default_moves_to_go: u32,
    pub engine_name: String,
    pub engine_author: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            move_overhead_ms: DEFAULT_MOVE_OVERHEAD_MS,
            fallback_think_ms: 1000,
            default_moves_to_go: 30,
            engine_name: ENGINE_NAME.to_string(),
            engine_author: ENGINE_AUTHOR.to_string(),
        }
    }
}

impl EngineConfig {
    /// 从 JSON 字符串解析，缺失字段取默认值
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// 从文件加载；文件不存在时使用默认配置
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("配置文件不存在，使用默认配置: {:?}", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&content)?;
        tracing::info!("已加载配置: {:?}", path);
        Ok(config)
    }

    /// 设置通信延迟，超出范围时截断
    pub fn set_move_overhead(&mut self, ms: u64) {
        let (min, max) = MOVE_OVERHEAD_RANGE;
        self.move_overhead_ms = ms.clamp(min, max);
    }
}
