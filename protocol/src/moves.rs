//! 走法生成和验证

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::board::{Board, BoardState};
use crate::piece::{Piece, PieceType, Side, Square};

/// 走法类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveKind {
    /// 普通走法（含吃子、升变）
    Normal,
    /// 兵从初始行前进两格
    DoublePush,
    /// 吃过路兵
    EnPassant,
    /// 王车易位（记录为王的走法）
    Castle,
}

/// 走法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// 起始格
    pub from: Square,
    /// 目标格
    pub to: Square,
    /// 升变棋子
    pub promotion: Option<PieceType>,
    /// 走法类别
    pub kind: MoveKind,
}

impl Move {
    /// 创建普通走法
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
            kind: MoveKind::Normal,
        }
    }

    /// 创建升变走法
    pub fn promotion(from: Square, to: Square, piece_type: PieceType) -> Self {
        Self {
            promotion: Some(piece_type),
            ..Self::new(from, to)
        }
    }

    /// 创建兵的双步走法
    pub fn double_push(from: Square, to: Square) -> Self {
        Self {
            kind: MoveKind::DoublePush,
            ..Self::new(from, to)
        }
    }

    /// 创建吃过路兵走法
    pub fn en_passant(from: Square, to: Square) -> Self {
        Self {
            kind: MoveKind::EnPassant,
            ..Self::new(from, to)
        }
    }

    /// 创建王车易位走法
    pub fn castle(from: Square, to: Square) -> Self {
        Self {
            kind: MoveKind::Castle,
            ..Self::new(from, to)
        }
    }

    /// 双步走法越过的格子（即新的吃过路兵目标格）
    pub fn en_passant_target(&self) -> Option<Square> {
        if self.kind != MoveKind::DoublePush {
            return None;
        }
        Square::new(self.from.file(), (self.from.rank() + self.to.rank()) / 2)
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promotion) = self.promotion {
            write!(f, "{}", promotion.to_lower_char())?;
        }
        Ok(())
    }
}

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

const DIAGONALS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

const ORTHOGONALS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// 走法生成器
pub struct MoveGenerator;

impl MoveGenerator {
    /// 生成走子方的所有伪合法走法（不考虑自己是否被将军）
    pub fn generate_pseudo_legal(state: &BoardState) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        let side = state.current_turn;

        for (sq, piece) in state.board.pieces(side) {
            match piece.piece_type {
                PieceType::Pawn => Self::generate_pawn_moves(state, sq, side, &mut moves),
                PieceType::Knight => {
                    Self::generate_step_moves(&state.board, sq, side, &KNIGHT_OFFSETS, &mut moves)
                }
                PieceType::Bishop => {
                    Self::generate_slider_moves(&state.board, sq, side, &DIAGONALS, &mut moves)
                }
                PieceType::Rook => {
                    Self::generate_slider_moves(&state.board, sq, side, &ORTHOGONALS, &mut moves)
                }
                PieceType::Queen => {
                    Self::generate_slider_moves(&state.board, sq, side, &DIAGONALS, &mut moves);
                    Self::generate_slider_moves(&state.board, sq, side, &ORTHOGONALS, &mut moves);
                }
                PieceType::King => {
                    Self::generate_step_moves(&state.board, sq, side, &KING_OFFSETS, &mut moves);
                    Self::generate_castling_moves(state, sq, side, &mut moves);
                }
            }
        }

        moves
    }

    /// 生成走子方的所有合法走法（过滤掉走后己方王被攻击的走法）
    pub fn generate_legal(state: &BoardState) -> Vec<Move> {
        let side = state.current_turn;
        Self::generate_pseudo_legal(state)
            .into_iter()
            .filter(|mv| {
                let mut test_board = state.board;
                test_board.apply(mv);
                !Self::is_in_check(&test_board, side)
            })
            .collect()
    }

    /// 生成兵的走法（前进、双步、吃子、吃过路兵、升变）
    fn generate_pawn_moves(state: &BoardState, from: Square, side: Side, moves: &mut Vec<Move>) {
        let board = &state.board;
        let forward = side.pawn_direction();
        let start_rank = match side {
            Side::White => 1,
            Side::Black => 6,
        };

        if let Some(to) = from.offset(0, forward) {
            if board.get(to).is_none() {
                Self::push_pawn_move(from, to, moves);

                if from.rank() == start_rank {
                    if let Some(two) = from.offset(0, 2 * forward) {
                        if board.get(two).is_none() {
                            moves.push(Move::double_push(from, two));
                        }
                    }
                }
            }
        }

        for df in [-1i8, 1i8] {
            let Some(to) = from.offset(df, forward) else {
                continue;
            };
            match board.get(to) {
                Some(target) if target.side != side => Self::push_pawn_move(from, to, moves),
                None if state.en_passant == Some(to) => moves.push(Move::en_passant(from, to)),
                _ => {}
            }
        }
    }

    /// 添加兵的走法，到达底线时展开为四种升变
    fn push_pawn_move(from: Square, to: Square, moves: &mut Vec<Move>) {
        if to.rank() == 0 || to.rank() == 7 {
            for piece_type in PieceType::PROMOTIONS {
                moves.push(Move::promotion(from, to, piece_type));
            }
        } else {
            moves.push(Move::new(from, to));
        }
    }

    /// 生成单步棋子（马、王）的走法
    fn generate_step_moves(
        board: &Board,
        from: Square,
        side: Side,
        offsets: &[(i8, i8)],
        moves: &mut Vec<Move>,
    ) {
        for &(df, dr) in offsets {
            if let Some(to) = from.offset(df, dr) {
                Self::try_add_move(board, from, to, side, moves);
            }
        }
    }

    /// 生成滑行棋子（象、车、后）的走法
    fn generate_slider_moves(
        board: &Board,
        from: Square,
        side: Side,
        directions: &[(i8, i8)],
        moves: &mut Vec<Move>,
    ) {
        for &(df, dr) in directions {
            let mut current = from;
            while let Some(to) = current.offset(df, dr) {
                match board.get(to) {
                    None => moves.push(Move::new(from, to)),
                    Some(target) => {
                        if target.side != side {
                            moves.push(Move::new(from, to));
                        }
                        break;
                    }
                }
                current = to;
            }
        }
    }

    /// 生成王车易位：王与车之间无子，王不在被将军状态，王经过和到达的格子不被攻击
    fn generate_castling_moves(state: &BoardState, from: Square, side: Side, moves: &mut Vec<Move>) {
        let (king_home, king_side_path, queen_side_path) = match side {
            Side::White => (
                Square::E1,
                (Square::F1, Square::G1),
                (Square::D1, Square::C1, Square::new(1, 0)),
            ),
            Side::Black => (
                Square::E8,
                (Square::F8, Square::G8),
                (Square::D8, Square::C8, Square::new(1, 7)),
            ),
        };
        if from != king_home {
            return;
        }

        let board = &state.board;
        let enemy = side.opponent();
        let (can_king_side, can_queen_side) = state.castling.for_side(side);
        if !can_king_side && !can_queen_side {
            return;
        }
        if Self::is_square_attacked(board, from, enemy) {
            return;
        }

        let (f, g) = king_side_path;
        if can_king_side
            && board.get(f).is_none()
            && board.get(g).is_none()
            && !Self::is_square_attacked(board, f, enemy)
            && !Self::is_square_attacked(board, g, enemy)
        {
            moves.push(Move::castle(from, g));
        }

        let (d, c, b) = queen_side_path;
        let b_empty = b.is_some_and(|b| board.get(b).is_none());
        if can_queen_side
            && board.get(d).is_none()
            && board.get(c).is_none()
            && b_empty
            && !Self::is_square_attacked(board, d, enemy)
            && !Self::is_square_attacked(board, c, enemy)
        {
            moves.push(Move::castle(from, c));
        }
    }

    /// 尝试添加走法（目标格为空或有对方棋子）
    fn try_add_move(board: &Board, from: Square, to: Square, side: Side, moves: &mut Vec<Move>) {
        match board.get(to) {
            Some(target) if target.side == side => {}
            _ => moves.push(Move::new(from, to)),
        }
    }

    /// 检查指定阵营是否被将军
    pub fn is_in_check(board: &Board, side: Side) -> bool {
        match board.find_king(side) {
            Some(king_sq) => Self::is_square_attacked(board, king_sq, side.opponent()),
            // 没有王，视为不被将军
            None => false,
        }
    }

    /// 检查格子是否被指定阵营攻击
    pub fn is_square_attacked(board: &Board, target: Square, by: Side) -> bool {
        let is = |sq: Option<Square>, piece_type: PieceType| {
            sq.and_then(|sq| board.get(sq)) == Some(Piece::new(piece_type, by))
        };

        // 兵从反方向攻击
        let back = -by.pawn_direction();
        if is(target.offset(-1, back), PieceType::Pawn) || is(target.offset(1, back), PieceType::Pawn) {
            return true;
        }

        if KNIGHT_OFFSETS
            .iter()
            .any(|&(df, dr)| is(target.offset(df, dr), PieceType::Knight))
        {
            return true;
        }

        if KING_OFFSETS
            .iter()
            .any(|&(df, dr)| is(target.offset(df, dr), PieceType::King))
        {
            return true;
        }

        Self::slider_attacks(board, target, by, &DIAGONALS, PieceType::Bishop)
            || Self::slider_attacks(board, target, by, &ORTHOGONALS, PieceType::Rook)
    }

    /// 沿方向查找第一个棋子，判断是否为指定滑行棋子或后
    fn slider_attacks(
        board: &Board,
        target: Square,
        by: Side,
        directions: &[(i8, i8)],
        slider: PieceType,
    ) -> bool {
        for &(df, dr) in directions {
            let mut current = target;
            while let Some(next) = current.offset(df, dr) {
                if let Some(piece) = board.get(next) {
                    if piece.side == by
                        && (piece.piece_type == slider || piece.piece_type == PieceType::Queen)
                    {
                        return true;
                    }
                    break;
                }
                current = next;
            }
        }
        false
    }

    /// 检查是否被将死
    pub fn is_checkmate(state: &BoardState) -> bool {
        Self::is_in_check(&state.board, state.current_turn) && Self::generate_legal(state).is_empty()
    }

    /// 检查是否逼和（无子可动但未被将军）
    pub fn is_stalemate(state: &BoardState) -> bool {
        !Self::is_in_check(&state.board, state.current_turn) && Self::generate_legal(state).is_empty()
    }

    /// 双方都无法将死对方
    pub fn is_insufficient_material(board: &Board) -> bool {
        Side::BOTH
            .iter()
            .all(|&side| Self::has_insufficient_material(board, side))
    }

    /// 指定阵营是否子力不足以将死对方
    ///
    /// - 有兵、车或后：足够
    /// - 单马：己方只剩王和一马，且对方除王和后外没有其他棋子
    /// - 象：己方只剩象，全场的象同色，且全场没有兵和马
    pub fn has_insufficient_material(board: &Board, side: Side) -> bool {
        let own = board.pieces(side);
        let has = |piece_type: PieceType| own.iter().any(|(_, p)| p.piece_type == piece_type);

        if has(PieceType::Pawn) || has(PieceType::Rook) || has(PieceType::Queen) {
            return false;
        }

        if has(PieceType::Knight) {
            let opponent_has_minor_or_more = board
                .pieces(side.opponent())
                .iter()
                .any(|(_, p)| !matches!(p.piece_type, PieceType::King | PieceType::Queen));
            return own.len() <= 2 && !opponent_has_minor_or_more;
        }

        if has(PieceType::Bishop) {
            let all = board.all_pieces();
            let bishop_colors: Vec<bool> = all
                .iter()
                .filter(|(_, p)| p.piece_type == PieceType::Bishop)
                .map(|(sq, _)| sq.is_light())
                .collect();
            let same_color = bishop_colors.iter().all(|&c| c) || bishop_colors.iter().all(|&c| !c);
            let pawns_or_knights = all
                .iter()
                .any(|(_, p)| matches!(p.piece_type, PieceType::Pawn | PieceType::Knight));
            return same_color && !pawns_or_knights;
        }

        true
    }

    /// 是否可以声明三次重复局面
    ///
    /// 当前局面自上次不可逆走法以来已出现三次，或存在一步合法走法使局面第三次出现。
    pub fn can_claim_threefold_repetition(state: &BoardState) -> bool {
        let history = state.reversible_history();
        let mut counts: HashMap<u64, u32> = HashMap::with_capacity(history.len());
        for &key in history {
            *counts.entry(key).or_insert(0) += 1;
        }

        let current = state.position_history.last().copied().unwrap_or_else(|| state.hash());
        if counts.get(&current).copied().unwrap_or(0) >= 3 {
            return true;
        }

        // 没有出现过两次的局面，任何走法都不可能构成三次重复
        if !counts.values().any(|&n| n >= 2) {
            return false;
        }

        Self::generate_legal(state)
            .iter()
            .any(|mv| counts.get(&state.hash_after(mv)).copied().unwrap_or(0) >= 2)
    }
}
