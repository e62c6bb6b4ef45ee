//! 错误类型定义

use thiserror::Error;

/// 国际象棋规则错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChessError {
    /// 无效的格子坐标
    #[error("Invalid square: {text:?}")]
    InvalidSquare { text: String },

    /// 无法解析的走法文本
    #[error("Invalid move text: {text:?}")]
    InvalidMove { text: String },

    /// 走法在当前局面不合法
    #[error("Illegal move {mv} in position {fen}")]
    IllegalMove { mv: String, fen: String },

    /// 起始格没有棋子
    #[error("No piece on square {square}")]
    NoPiece { square: String },

    /// 无效的 FEN 字符串
    #[error("Invalid FEN string: {reason}")]
    InvalidFen { reason: String },
}

/// UCI 协议错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 单行过长
    #[error("Line too large: {size} bytes (max: {max})")]
    LineTooLarge { size: usize, max: usize },

    /// 命令参数缺失或无法解析
    #[error("Malformed {command} command: {reason}")]
    MalformedCommand { command: &'static str, reason: String },

    /// 输入流已关闭
    #[error("Input closed")]
    InputClosed,

    /// 象棋规则错误
    #[error("Chess error: {0}")]
    Chess(#[from] ChessError),
}

/// 协议操作结果类型
pub type Result<T> = std::result::Result<T, ProtocolError>;
