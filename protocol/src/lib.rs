//! 国际象棋共享协议库
//!
//! 包含:
//! - 棋子、棋盘、格子等核心数据结构
//! - 走法生成和规则判定（将杀、逼和、子力不足、三次重复）
//! - UCI 消息类型定义 (GuiCommand, EngineMessage)
//! - 行传输层 (LineReader, LineWriter)
//! - FEN 与 UCI 走法记谱

mod board;
mod constants;
mod error;
mod fen;
mod message;
mod moves;
mod notation;
mod piece;
mod transport;
mod zobrist;

pub use board::{Board, BoardState, CastlingRights};
pub use constants::*;
pub use error::{ChessError, ProtocolError, Result};
pub use fen::{Fen, INITIAL_FEN};
pub use message::{EngineMessage, GoParams, GuiCommand, InfoScore, PositionSource, SearchInfo};
pub use moves::{Move, MoveGenerator, MoveKind};
pub use notation::Notation;
pub use piece::{Piece, PieceType, Side, Square};
pub use transport::{LineReader, LineWriter};
pub use zobrist::{ZobristTable, ZOBRIST};
