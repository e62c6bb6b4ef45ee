//! 国际象棋搜索核心
//!
//! 包含:
//! - 规则引擎接口与走子守卫
//! - 棋局评估函数（子力、位置分值表、残局判定）
//! - 固定深度 Minimax + Alpha-Beta 搜索
//! - 时间管理（思考时间换算搜索深度）
//! - 引擎配置

mod config;
mod evaluate;
mod rules;
mod search;
mod time;

pub use config::{ConfigError, EngineConfig, CONFIG_ENV_VAR};
pub use evaluate::{Evaluation, Evaluator};
pub use rules::{MoveGuard, RulesEngine};
pub use search::{SearchEngine, SearchError, SearchResult, MATE_SCORE, SCORE_INFINITY};
pub use time::{allocate, depth_for, Allocation, ClockInfo, TimeManager, MIN_THINK_MS};
