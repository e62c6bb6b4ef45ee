//! Zobrist 哈希
//!
//! 用于识别重复局面（三次重复判定）

use lazy_static::lazy_static;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::board::{Board, CastlingRights};
use crate::constants::SQUARE_COUNT;
use crate::piece::{Piece, PieceType, Side, Square};

lazy_static! {
    /// 全局共享的 Zobrist 表（只读）
    pub static ref ZOBRIST: ZobristTable = ZobristTable::new();
}

/// Zobrist 哈希表
///
/// 使用随机数为每个格子上的每种棋子生成唯一的哈希值
pub struct ZobristTable {
    /// 棋子哈希值 [side][piece_type][square]
    pieces: [[[u64; SQUARE_COUNT]; 6]; 2],
    /// 黑方走子时的哈希值
    side_to_move: u64,
    /// 易位权哈希值，按四位掩码索引
    castling: [u64; 16],
    /// 吃过路兵列的哈希值
    en_passant_file: [u64; 8],
}

impl ZobristTable {
    /// 创建新的 Zobrist 表（使用固定种子保证确定性）
    pub fn new() -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(0xDEADBEEF_CAFE_1234);

        let mut pieces = [[[0u64; SQUARE_COUNT]; 6]; 2];
        for side in pieces.iter_mut() {
            for piece in side.iter_mut() {
                for key in piece.iter_mut() {
                    *key = rng.gen();
                }
            }
        }

        let side_to_move = rng.gen();
        let mut castling = [0u64; 16];
        for key in castling.iter_mut().skip(1) {
            *key = rng.gen();
        }
        let mut en_passant_file = [0u64; 8];
        for key in en_passant_file.iter_mut() {
            *key = rng.gen();
        }

        Self {
            pieces,
            side_to_move,
            castling,
            en_passant_file,
        }
    }

    /// 计算局面的完整哈希值
    ///
    /// 吃过路兵格只有在走子方确实有兵可以吃到时才计入，
    /// 与三次重复的判定口径一致。
    pub fn hash(
        &self,
        board: &Board,
        current_turn: Side,
        castling: CastlingRights,
        en_passant: Option<Square>,
    ) -> u64 {
        let mut hash = 0u64;

        for (sq, piece) in board.all_pieces() {
            hash ^= self.piece_hash(piece.side, piece.piece_type, sq);
        }

        if current_turn == Side::Black {
            hash ^= self.side_to_move;
        }

        hash ^= self.castling[castling.bits()];

        if let Some(ep) = en_passant {
            if en_passant_capturable(board, current_turn, ep) {
                hash ^= self.en_passant_file[ep.file() as usize];
            }
        }

        hash
    }

    /// 获取棋子的哈希值
    #[inline]
    pub fn piece_hash(&self, side: Side, piece_type: PieceType, sq: Square) -> u64 {
        self.pieces[side.index()][piece_type.index()][sq.index()]
    }

    /// 获取走子方切换的哈希值
    #[inline]
    pub fn side_hash(&self) -> u64 {
        self.side_to_move
    }
}

impl Default for ZobristTable {
    fn default() -> Self {
        Self::new()
    }
}

/// 走子方是否有兵与吃过路兵格斜向相邻
fn en_passant_capturable(board: &Board, current_turn: Side, ep: Square) -> bool {
    let behind = -current_turn.pawn_direction();
    let pawn = Some(Piece::new(PieceType::Pawn, current_turn));
    [-1i8, 1]
        .iter()
        .filter_map(|&df| ep.offset(df, behind))
        .any(|sq| board.get(sq) == pawn)
}
