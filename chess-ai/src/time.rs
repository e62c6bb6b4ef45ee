//! 时间管理
//!
//! 把时钟信息换算成本步的思考时间，再换算成固定搜索深度。

use protocol::{GoParams, Side, DEFAULT_MOVE_OVERHEAD_MS};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;

/// 思考时间下限（毫秒）
pub const MIN_THINK_MS: u64 = 10;

const FALLBACK_THINK_MS: u64 = 1000;
const DEFAULT_MOVES_TO_GO: u32 = 30;

/// 时钟信息（毫秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockInfo {
    /// 走子方剩余时间
    pub time_left: Option<u64>,
    /// 每步加秒
    pub increment: u64,
    /// 距下一次时间控制的步数
    pub moves_to_go: Option<u32>,
    /// 固定每步用时，优先于其他字段
    pub fixed_move_time: Option<u64>,
    /// 通信延迟预留
    pub overhead_ms: u64,
}

impl Default for ClockInfo {
    fn default() -> Self {
        Self {
            time_left: None,
            increment: 0,
            moves_to_go: None,
            fixed_move_time: None,
            overhead_ms: DEFAULT_MOVE_OVERHEAD_MS,
        }
    }
}

/// 分配结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub think_ms: u64,
    pub depth: u8,
}

/// 按默认参数换算搜索深度
pub fn allocate(clock: &ClockInfo) -> u8 {
    depth_for(think_time(clock, FALLBACK_THINK_MS, DEFAULT_MOVES_TO_GO))
}

/// 思考时间对应的深度：< 200ms 为 2，< 1000ms 为 3，其余为 4
pub fn depth_for(think_ms: u64) -> u8 {
    if think_ms < 200 {
        2
    } else if think_ms < 1000 {
        3
    } else {
        4
    }
}

fn think_time(clock: &ClockInfo, fallback_ms: u64, default_moves_to_go: u32) -> u64 {
    let raw = match (clock.fixed_move_time, clock.time_left) {
        (Some(fixed), _) => fixed,
        (None, Some(time_left)) => {
            let moves_to_go = match clock.moves_to_go {
                Some(n) if n > 0 => n,
                _ => default_moves_to_go.max(1),
            };
            (time_left / u64::from(moves_to_go)).saturating_add(clock.increment)
        }
        (None, None) => fallback_ms,
    };

    raw.saturating_sub(clock.overhead_ms).max(MIN_THINK_MS)
}

/// 时间管理器
#[derive(Debug, Clone)]
pub struct TimeManager {
    fallback_think_ms: u64,
    default_moves_to_go: u32,
    move_overhead_ms: u64,
}

impl Default for TimeManager {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl TimeManager {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            fallback_think_ms: config.fallback_think_ms,
            default_moves_to_go: config.default_moves_to_go,
            move_overhead_ms: config.move_overhead_ms,
        }
    }

    /// 由 `go` 参数构造走子方的时钟信息
    pub fn clock_for(&self, params: &GoParams, side: Side) -> ClockInfo {
        let (time_left, increment) = match side {
            Side::White => (params.wtime, params.winc),
            Side::Black => (params.btime, params.binc),
        };

        ClockInfo {
            time_left,
            increment: increment.unwrap_or(0),
            moves_to_go: params.movestogo,
            fixed_move_time: params.movetime,
            overhead_ms: self.move_overhead_ms,
        }
    }

    /// 换算搜索深度
    pub fn allocate(&self, clock: &ClockInfo) -> u8 {
        self.allocate_with(clock).depth
    }

    /// 换算思考时间和搜索深度
    pub fn allocate_with(&self, clock: &ClockInfo) -> Allocation {
        let think_ms = think_time(clock, self.fallback_think_ms, self.default_moves_to_go);
        let depth = depth_for(think_ms);
        tracing::debug!("时间分配: think={}ms depth={} clock={:?}", think_ms, depth, clock);
        Allocation { think_ms, depth }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(ms: u64) -> ClockInfo {
        ClockInfo {
            fixed_move_time: Some(ms),
            ..Default::default()
        }
    }

    #[test]
    fn test_fixed_move_time() {
        // 500 - 100 = 400
        assert_eq!(allocate(&fixed(500)), 3);
    }

    #[test]
    fn test_time_left_split_over_moves() {
        // 60000 / 30 + 0 - 100 = 1900
        let clock = ClockInfo {
            time_left: Some(60_000),
            moves_to_go: Some(30),
            ..Default::default()
        };
        assert_eq!(allocate(&clock), 4);

        // 6000 / 30 + 100 - 100 = 200
        let clock = ClockInfo {
            time_left: Some(6_000),
            increment: 100,
            ..Default::default()
        };
        assert_eq!(allocate(&clock), 3);
    }

    #[test]
    fn test_zero_moves_to_go_uses_default() {
        // 3000 / 30 - 100 = 0，下限 10
        let clock = ClockInfo {
            time_left: Some(3_000),
            moves_to_go: Some(0),
            ..Default::default()
        };
        assert_eq!(allocate(&clock), 2);

        let clock = ClockInfo {
            time_left: Some(60_000),
            moves_to_go: Some(0),
            ..Default::default()
        };
        assert_eq!(allocate(&clock), 4);
    }

    #[test]
    fn test_depth_boundaries() {
        assert_eq!(allocate(&fixed(299)), 2); // 199
        assert_eq!(allocate(&fixed(300)), 3); // 200
        assert_eq!(allocate(&fixed(1099)), 3); // 999
        assert_eq!(allocate(&fixed(1100)), 4); // 1000
    }

    #[test]
    fn test_no_clock_uses_fallback() {
        // 1000 - 100 = 900
        assert_eq!(allocate(&ClockInfo::default()), 3);

        let no_overhead = ClockInfo {
            overhead_ms: 0,
            ..Default::default()
        };
        assert_eq!(allocate(&no_overhead), 4);
    }

    #[test]
    fn test_think_time_floor() {
        let clock = fixed(50);
        assert_eq!(think_time(&clock, FALLBACK_THINK_MS, DEFAULT_MOVES_TO_GO), MIN_THINK_MS);
        assert_eq!(allocate(&clock), 2);
    }

    #[test]
    fn test_huge_clock_values_saturate() {
        let clock = ClockInfo {
            time_left: Some(u64::MAX),
            increment: u64::MAX,
            ..Default::default()
        };
        assert_eq!(allocate(&clock), 4);
        assert_eq!(TimeManager::default().allocate(&clock), 4);
    }

    #[test]
    fn test_manager_uses_config() {
        let config = EngineConfig {
            move_overhead_ms: 0,
            fallback_think_ms: 150,
            ..Default::default()
        };
        let manager = TimeManager::new(&config);
        let clock = manager.clock_for(&GoParams::default(), Side::White);
        assert_eq!(clock.overhead_ms, 0);
        assert_eq!(
            manager.allocate_with(&clock),
            Allocation {
                think_ms: 150,
                depth: 2
            }
        );
    }

    #[test]
    fn test_clock_for_picks_side() {
        let params = GoParams {
            wtime: Some(60_000),
            btime: Some(30_000),
            winc: Some(1_000),
            binc: Some(500),
            movestogo: Some(20),
            ..Default::default()
        };
        let manager = TimeManager::default();

        let black = manager.clock_for(&params, Side::Black);
        assert_eq!(black.time_left, Some(30_000));
        assert_eq!(black.increment, 500);
        assert_eq!(black.moves_to_go, Some(20));
        assert_eq!(black.overhead_ms, 100);

        // 30000 / 20 + 500 - 100 = 1900
        assert_eq!(manager.allocate(&black), 4);
    }
}
