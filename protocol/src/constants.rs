//! 协议与规则常量定义

/// 棋盘宽度（列数）
pub const BOARD_WIDTH: usize = 8;

/// 棋盘高度（行数）
pub const BOARD_HEIGHT: usize = 8;

/// 格子总数
pub const SQUARE_COUNT: usize = BOARD_WIDTH * BOARD_HEIGHT;

/// 引擎名称（UCI `id name`）
pub const ENGINE_NAME: &str = "Schmock3000";

/// 引擎作者（UCI `id author`）
pub const ENGINE_AUTHOR: &str = "excylni";

/// 单行命令最大长度（字节）
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// 每步默认预留的通信开销（毫秒）
pub const DEFAULT_MOVE_OVERHEAD_MS: u64 = 100;

/// `setoption` 中走子开销的取值范围（毫秒）
pub const MOVE_OVERHEAD_RANGE: (u64, u64) = (0, 5000);

/// UCI 中表示“无走法”的空走法
pub const NULL_MOVE: &str = "0000";
