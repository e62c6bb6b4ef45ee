//! 棋盘状态

use serde::{Deserialize, Serialize};

use crate::constants::SQUARE_COUNT;
use crate::error::ChessError;
use crate::moves::{Move, MoveKind};
use crate::piece::{Piece, PieceType, Side, Square};
use crate::zobrist::ZOBRIST;

/// 棋盘（8x8 邮箱表示，索引为 rank * 8 + file）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    squares: [Option<Piece>; SQUARE_COUNT],
}

impl Board {
    /// 创建空棋盘
    pub fn empty() -> Self {
        Self {
            squares: [None; SQUARE_COUNT],
        }
    }

    /// 创建初始棋盘
    pub fn initial() -> Self {
        let mut board = Self::empty();
        let back_rank = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];

        for (file, piece_type) in back_rank.into_iter().enumerate() {
            let file = file as u8;
            board.set(Square::new(file, 0), Some(Piece::new(piece_type, Side::White)));
            board.set(Square::new(file, 1), Some(Piece::new(PieceType::Pawn, Side::White)));
            board.set(Square::new(file, 6), Some(Piece::new(PieceType::Pawn, Side::Black)));
            board.set(Square::new(file, 7), Some(Piece::new(piece_type, Side::Black)));
        }

        board
    }

    /// 获取指定格子的棋子
    pub fn get(&self, square: Square) -> Option<Piece> {
        self.squares[square.index()]
    }

    /// 设置指定格子的棋子（越界的 None 直接忽略，便于链式构造）
    pub fn set(&mut self, square: Option<Square>, piece: Option<Piece>) {
        if let Some(square) = square {
            self.squares[square.index()] = piece;
        }
    }

    /// 设置指定格子的棋子
    pub fn put(&mut self, square: Square, piece: Option<Piece>) {
        self.squares[square.index()] = piece;
    }

    /// 移动棋子（不检查规则），返回目标格原有的棋子
    pub fn move_piece(&mut self, from: Square, to: Square) -> Option<Piece> {
        let piece = self.get(from);
        let captured = self.get(to);
        self.put(from, None);
        self.put(to, piece);
        captured
    }

    /// 在棋盘上执行走法（不检查规则），返回被吃掉的棋子
    ///
    /// 处理吃过路兵、王车易位时车的移动以及升变。
    pub fn apply(&mut self, mv: &Move) -> Option<Piece> {
        match mv.kind {
            MoveKind::EnPassant => {
                // 被吃的兵与目标格同列、与起始格同行
                let victim = Square::new(mv.to.file(), mv.from.rank());
                let captured = victim.and_then(|sq| self.get(sq));
                self.set(victim, None);
                self.move_piece(mv.from, mv.to);
                captured
            }
            MoveKind::Castle => {
                let (rook_from, rook_to) = castle_rook_squares(mv.to);
                self.move_piece(rook_from, rook_to);
                self.move_piece(mv.from, mv.to)
            }
            MoveKind::Normal | MoveKind::DoublePush => {
                let mover = self.get(mv.from);
                let captured = self.move_piece(mv.from, mv.to);
                if let (Some(promotion), Some(pawn)) = (mv.promotion, mover) {
                    self.put(mv.to, Some(Piece::new(promotion, pawn.side)));
                }
                captured
            }
        }
    }

    /// 查找指定阵营的王
    pub fn find_king(&self, side: Side) -> Option<Square> {
        Square::all().find(|&sq| self.get(sq) == Some(Piece::new(PieceType::King, side)))
    }

    /// 获取指定阵营、指定类型的所有棋子位置
    pub fn pieces_of(&self, piece_type: PieceType, side: Side) -> Vec<Square> {
        let target = Some(Piece::new(piece_type, side));
        Square::all().filter(|&sq| self.get(sq) == target).collect()
    }

    /// 获取指定阵营的所有棋子
    pub fn pieces(&self, side: Side) -> Vec<(Square, Piece)> {
        self.all_pieces()
            .into_iter()
            .filter(|(_, piece)| piece.side == side)
            .collect()
    }

    /// 获取所有棋子
    pub fn all_pieces(&self) -> Vec<(Square, Piece)> {
        Square::all()
            .filter_map(|sq| self.get(sq).map(|piece| (sq, piece)))
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

/// 王车易位时车的起止格，按王的目标格区分
fn castle_rook_squares(king_to: Square) -> (Square, Square) {
    match king_to {
        Square::G1 => (Square::H1, Square::F1),
        Square::C1 => (Square::A1, Square::D1),
        Square::G8 => (Square::H8, Square::F8),
        _ => (Square::A8, Square::D8),
    }
}

/// 王车易位权
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CastlingRights {
    pub white_king_side: bool,
    pub white_queen_side: bool,
    pub black_king_side: bool,
    pub black_queen_side: bool,
}

impl CastlingRights {
    /// 全部易位权
    pub fn all() -> Self {
        Self {
            white_king_side: true,
            white_queen_side: true,
            black_king_side: true,
            black_queen_side: true,
        }
    }

    /// 指定阵营的（王翼, 后翼）易位权
    pub fn for_side(&self, side: Side) -> (bool, bool) {
        match side {
            Side::White => (self.white_king_side, self.white_queen_side),
            Side::Black => (self.black_king_side, self.black_queen_side),
        }
    }

    /// 四位掩码，用于 Zobrist 哈希
    pub fn bits(&self) -> usize {
        (self.white_king_side as usize)
            | (self.white_queen_side as usize) << 1
            | (self.black_king_side as usize) << 2
            | (self.black_queen_side as usize) << 3
    }

    /// 走法触及王或车的原始格后剩余的易位权
    pub fn after_move(mut self, mv: &Move) -> Self {
        for sq in [mv.from, mv.to] {
            match sq {
                Square::E1 => {
                    self.white_king_side = false;
                    self.white_queen_side = false;
                }
                Square::H1 => self.white_king_side = false,
                Square::A1 => self.white_queen_side = false,
                Square::E8 => {
                    self.black_king_side = false;
                    self.black_queen_side = false;
                }
                Square::H8 => self.black_king_side = false,
                Square::A8 => self.black_queen_side = false,
                _ => {}
            }
        }
        self
    }
}

/// 撤销信息：走子前的完整快照
#[derive(Debug, Clone, PartialEq, Eq)]
struct Undo {
    mv: Move,
    board: Board,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

/// 完整的棋局状态（包含走子方、易位权、步数和历史）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    /// 棋盘
    pub board: Board,
    /// 当前走子方
    pub current_turn: Side,
    /// 王车易位权
    pub castling: CastlingRights,
    /// 吃过路兵目标格
    pub en_passant: Option<Square>,
    /// 自上次吃子或走兵以来的半回合数
    pub halfmove_clock: u32,
    /// 完整回合数（黑方走完后 +1）
    pub fullmove_number: u32,
    /// 位置历史（Zobrist hash，最后一项为当前局面）
    pub position_history: Vec<u64>,
    undo_stack: Vec<Undo>,
}

impl BoardState {
    /// 创建初始状态
    pub fn initial() -> Self {
        Self::from_parts(Board::initial(), Side::White, CastlingRights::all(), None, 0, 1)
    }

    /// 由各字段组装状态，并记录当前局面到历史
    pub fn from_parts(
        board: Board,
        current_turn: Side,
        castling: CastlingRights,
        en_passant: Option<Square>,
        halfmove_clock: u32,
        fullmove_number: u32,
    ) -> Self {
        let mut state = Self {
            board,
            current_turn,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
            position_history: Vec::new(),
            undo_stack: Vec::new(),
        };
        state.position_history.push(state.hash());
        state
    }

    /// 当前局面的 Zobrist 哈希
    pub fn hash(&self) -> u64 {
        ZOBRIST.hash(&self.board, self.current_turn, self.castling, self.en_passant)
    }

    /// 走子（不检查合法性，只检查起始格上是走子方的棋子）
    pub fn make_move(&mut self, mv: Move) -> Result<(), ChessError> {
        let mover = self.board.get(mv.from).ok_or_else(|| ChessError::NoPiece {
            square: mv.from.to_string(),
        })?;
        if mover.side != self.current_turn {
            return Err(ChessError::IllegalMove {
                mv: mv.to_string(),
                fen: crate::fen::Fen::to_string(self),
            });
        }

        self.undo_stack.push(Undo {
            mv,
            board: self.board,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        });

        let captured = self.board.apply(&mv);
        let zeroing = mover.piece_type == PieceType::Pawn || captured.is_some();

        self.castling = self.castling.after_move(&mv);
        self.en_passant = mv.en_passant_target();
        self.halfmove_clock = if zeroing { 0 } else { self.halfmove_clock + 1 };
        if self.current_turn == Side::Black {
            self.fullmove_number += 1;
        }
        self.current_turn = self.current_turn.opponent();
        self.position_history.push(self.hash());

        Ok(())
    }

    /// 撤销最近一步，返回被撤销的走法
    pub fn unmake_move(&mut self) -> Option<Move> {
        let undo = self.undo_stack.pop()?;
        self.position_history.pop();
        self.board = undo.board;
        self.castling = undo.castling;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.fullmove_number = undo.fullmove_number;
        self.current_turn = self.current_turn.opponent();
        Some(undo.mv)
    }

    /// 已走步数（可撤销的）
    pub fn ply(&self) -> usize {
        self.undo_stack.len()
    }

    /// 走一步后局面的哈希（不修改当前状态）
    pub fn hash_after(&self, mv: &Move) -> u64 {
        let mut board = self.board;
        board.apply(mv);
        ZOBRIST.hash(
            &board,
            self.current_turn.opponent(),
            self.castling.after_move(mv),
            mv.en_passant_target(),
        )
    }

    /// 自上次不可逆走法以来的历史局面（含当前局面）
    pub fn reversible_history(&self) -> &[u64] {
        let len = self.position_history.len();
        let window = (self.halfmove_clock as usize + 1).min(len);
        &self.position_history[len - window..]
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::initial()
    }
}
