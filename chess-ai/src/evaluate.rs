//! 棋局评估函数
//!
//! 子力 + 棋子位置分值表 + 残局判定，白方视角（正值对白方有利）。

use protocol::{PieceType, Side, Square};

use crate::rules::RulesEngine;

/// 评估器
pub struct Evaluator;

/// 评估明细
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    /// 子力差
    pub material: i32,
    /// 位置分差（含王）
    pub positional: i32,
    /// 是否按残局计算王的位置分
    pub endgame: bool,
}

impl Evaluation {
    pub fn total(&self) -> i32 {
        self.material + self.positional
    }
}

/// 残局阈值：双方马、象、车子力之和低于该值
const ENDGAME_MINOR_MAJOR_LIMIT: i32 = 1300;

/// 棋子位置分值表（白方视角）
///
/// 按打印顺序排列：第一行为第 8 横线，最后一行为第 1 横线。
/// 黑方的表为白方的表整体倒序。
/// 查表时先翻转横线（见 `lookup`），不按 a1 = 0 直接用打印顺序的下标。
mod tables {
    #[rustfmt::skip]
    pub const PAWN: [i32; 64] = [
         0,  0,  0,  0,  0,  0,  0,  0,
        50, 50, 50, 50, 50, 50, 50, 50,
        10, 10, 20, 30, 30, 20, 10, 10,
         5,  5, 10, 25, 25, 10,  5,  5,
         0,  0,  0, 20, 20,  0,  0,  0,
         5, -5,-10,  0,  0,-10, -5,  5,
         5, 10, 10,-20,-20, 10, 10,  5,
         0,  0,  0,  0,  0,  0,  0,  0,
    ];

    #[rustfmt::skip]
    pub const KNIGHT: [i32; 64] = [
        -50,-40,-30,-30,-30,-30,-40,-50,
        -40,-20,  0,  0,  0,  0,-20,-40,
        -30,  0, 10, 15, 15, 10,  0,-30,
        -30,  5, 15, 20, 20, 15,  5,-30,
        -30,  0, 15, 20, 20, 15,  0,-30,
        -30,  5, 10, 15, 15, 10,  5,-30,
        -40,-20,  0,  5,  5,  0,-20,-40,
        -50,-40,-30,-30,-30,-30,-40,-50,
    ];

    #[rustfmt::skip]
    pub const BISHOP: [i32; 64] = [
        -20,-10,-10,-10,-10,-10,-10,-20,
        -10,  0,  0,  0,  0,  0,  0,-10,
        -10,  0,  5, 10, 10,  5,  0,-10,
        -10,  5,  5, 10, 10,  5,  5,-10,
        -10,  0, 10, 10, 10, 10,  0,-10,
        -10, 10, 10, 10, 10, 10, 10,-10,
        -10,  5,  0,  0,  0,  0,  5,-10,
        -20,-10,-10,-10,-10,-10,-10,-20,
    ];

    #[rustfmt::skip]
    pub const ROOK: [i32; 64] = [
         0,  0,  0,  0,  0,  0,  0,  0,
         5, 10, 10, 10, 10, 10, 10,  5,
        -5,  0,  0,  0,  0,  0,  0, -5,
        -5,  0,  0,  0,  0,  0,  0, -5,
        -5,  0,  0,  0,  0,  0,  0, -5,
        -5,  0,  0,  0,  0,  0,  0, -5,
        -5,  0,  0,  0,  0,  0,  0, -5,
         0,  0,  0,  5,  5,  0,  0,  0,
    ];

    #[rustfmt::skip]
    pub const QUEEN: [i32; 64] = [
        -20,-10,-10, -5, -5,-10,-10,-20,
        -10,  0,  0,  0,  0,  0,  0,-10,
        -10,  0,  5,  5,  5,  5,  0,-10,
         -5,  0,  5,  5,  5,  5,  0, -5,
          0,  0,  5,  5,  5,  5,  0, -5,
        -10,  5,  5,  5,  5,  5,  0,-10,
        -10,  0,  5,  0,  0,  0,  0,-10,
        -20,-10,-10, -5, -5,-10,-10,-20,
    ];

    /// 王（中局）
    #[rustfmt::skip]
    pub const KING_MIDDLEGAME: [i32; 64] = [
        -30,-40,-40,-50,-50,-40,-40,-30,
        -30,-40,-40,-50,-50,-40,-40,-30,
        -30,-40,-40,-50,-50,-40,-40,-30,
        -30,-40,-40,-50,-50,-40,-40,-30,
        -20,-30,-30,-40,-40,-30,-30,-20,
        -10,-20,-20,-20,-20,-20,-20,-10,
         20, 20,  0,  0,  0,  0, 20, 20,
         20, 30, 10,  0,  0, 10, 30, 20,
    ];

    /// 王（残局）
    #[rustfmt::skip]
    pub const KING_ENDGAME: [i32; 64] = [
        -50,-40,-30,-20,-20,-30,-40,-50,
        -30,-20,-10,  0,  0,-10,-20,-30,
        -30,-10, 20, 30, 30, 20,-10,-30,
        -30,-10, 30, 40, 40, 30,-10,-30,
        -30,-10, 30, 40, 40, 30,-10,-30,
        -30,-10, 20, 30, 30, 20,-10,-30,
        -30,-30,  0,  0,  0,  0,-30,-30,
        -50,-30,-30,-30,-30,-30,-30,-50,
    ];

    pub const fn reversed(table: &[i32; 64]) -> [i32; 64] {
        let mut out = [0; 64];
        let mut i = 0;
        while i < 64 {
            out[i] = table[63 - i];
            i += 1;
        }
        out
    }

    pub const BLACK_PAWN: [i32; 64] = reversed(&PAWN);
    pub const BLACK_KNIGHT: [i32; 64] = reversed(&KNIGHT);
    pub const BLACK_BISHOP: [i32; 64] = reversed(&BISHOP);
    pub const BLACK_ROOK: [i32; 64] = reversed(&ROOK);
    pub const BLACK_QUEEN: [i32; 64] = reversed(&QUEEN);
    pub const BLACK_KING_MIDDLEGAME: [i32; 64] = reversed(&KING_MIDDLEGAME);
    pub const BLACK_KING_ENDGAME: [i32; 64] = reversed(&KING_ENDGAME);
}

impl Evaluator {
    /// 评估棋局（白方视角）
    pub fn evaluate<E: RulesEngine + ?Sized>(position: &E) -> i32 {
        Self::breakdown(position).total()
    }

    /// 评估棋局并返回明细
    pub fn breakdown<E: RulesEngine + ?Sized>(position: &E) -> Evaluation {
        let endgame = Self::is_endgame(position);
        let mut material = 0;
        let mut positional = 0;

        for side in Side::BOTH {
            let sign = match side {
                Side::White => 1,
                Side::Black => -1,
            };

            for piece_type in PieceType::ALL {
                let squares = position.pieces(piece_type, side);
                if piece_type != PieceType::King {
                    material += sign * piece_type.value() * squares.len() as i32;
                }

                let table = Self::table(piece_type, side, endgame);
                positional += sign * squares.iter().map(|&sq| lookup(table, sq)).sum::<i32>();
            }
        }

        Evaluation {
            material,
            positional,
            endgame,
        }
    }

    /// 是否进入残局：双方都没有后，且马、象、车子力之和低于阈值
    pub fn is_endgame<E: RulesEngine + ?Sized>(position: &E) -> bool {
        let no_queens = Side::BOTH
            .iter()
            .all(|&side| position.pieces(PieceType::Queen, side).is_empty());
        if !no_queens {
            return false;
        }

        let minor_major: i32 = Side::BOTH
            .iter()
            .flat_map(|&side| {
                [PieceType::Knight, PieceType::Bishop, PieceType::Rook]
                    .into_iter()
                    .map(move |piece_type| (piece_type, side))
            })
            .map(|(piece_type, side)| {
                piece_type.value() * position.pieces(piece_type, side).len() as i32
            })
            .sum();

        minor_major < ENDGAME_MINOR_MAJOR_LIMIT
    }

    /// 仅计算子力差
    pub fn evaluate_material<E: RulesEngine + ?Sized>(position: &E) -> i32 {
        Self::breakdown(position).material
    }

    fn table(piece_type: PieceType, side: Side, endgame: bool) -> &'static [i32; 64] {
        match (side, piece_type) {
            (Side::White, PieceType::Pawn) => &tables::PAWN,
            (Side::White, PieceType::Knight) => &tables::KNIGHT,
            (Side::White, PieceType::Bishop) => &tables::BISHOP,
            (Side::White, PieceType::Rook) => &tables::ROOK,
            (Side::White, PieceType::Queen) => &tables::QUEEN,
            (Side::White, PieceType::King) if endgame => &tables::KING_ENDGAME,
            (Side::White, PieceType::King) => &tables::KING_MIDDLEGAME,
            (Side::Black, PieceType::Pawn) => &tables::BLACK_PAWN,
            (Side::Black, PieceType::Knight) => &tables::BLACK_KNIGHT,
            (Side::Black, PieceType::Bishop) => &tables::BLACK_BISHOP,
            (Side::Black, PieceType::Rook) => &tables::BLACK_ROOK,
            (Side::Black, PieceType::Queen) => &tables::BLACK_QUEEN,
            (Side::Black, PieceType::King) if endgame => &tables::BLACK_KING_ENDGAME,
            (Side::Black, PieceType::King) => &tables::BLACK_KING_MIDDLEGAME,
        }
    }
}

/// 表按第 8 横线在前排列，格子编号以 a1 为 0，查表前翻转横线
#[inline]
fn lookup(table: &[i32; 64], sq: Square) -> i32 {
    table[sq.flip_rank().index()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::{Board, BoardState, CastlingRights, Fen, Piece};

    fn eval(fen: &str) -> i32 {
        Evaluator::evaluate(&Fen::parse(fen).unwrap())
    }

    /// 交换颜色并将格子编号倒置
    fn mirror(state: &BoardState) -> BoardState {
        let mut board = Board::empty();
        for (sq, piece) in state.board.all_pieces() {
            board.put(
                sq.reversed(),
                Some(Piece::new(piece.piece_type, piece.side.opponent())),
            );
        }
        BoardState::from_parts(
            board,
            state.current_turn.opponent(),
            CastlingRights::default(),
            None,
            0,
            1,
        )
    }

    #[test]
    fn test_initial_evaluation_is_zero() {
        let state = BoardState::initial();
        assert_eq!(Evaluator::evaluate(&state), 0);
        assert_eq!(Evaluator::evaluate_material(&state), 0);
        assert!(!Evaluator::is_endgame(&state));
    }

    #[test]
    fn test_mirror_antisymmetry() {
        let fens = [
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            "r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/3P1N2/PPP2PPP/RNBQK2R w KQkq - 1 5",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2k5/3p4/8/4P3/8/5K2/8 w - - 0 1",
            "4k3/8/8/8/8/8/8/R3K1N1 w - - 0 1",
            "6k1/8/8/8/8/8/8/8 b - - 0 1",
        ];

        for fen in fens {
            let state = Fen::parse(fen).unwrap();
            assert_eq!(
                Evaluator::evaluate(&state),
                -Evaluator::evaluate(&mirror(&state)),
                "antisymmetry broken for {}",
                fen
            );
        }
    }

    #[test]
    fn test_material_counts() {
        // 白方多一个后
        let state = Fen::parse("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        let eval = Evaluator::breakdown(&state);
        assert_eq!(eval.material, 900);

        // 黑方多车和象
        let state = Fen::parse("2b1k2r/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(Evaluator::evaluate_material(&state), -830);
    }

    #[test]
    fn test_pawn_table_orientation() {
        // 白兵 e4 为 +20，黑兵 e5 为 -20
        assert_eq!(eval("8/8/8/8/4P3/8/8/8 w - - 0 1"), 100 + 20);
        assert_eq!(eval("8/8/8/4p3/8/8/8/8 w - - 0 1"), -(100 + 20));
        // 白兵第 7 横线 +50
        assert_eq!(eval("8/P7/8/8/8/8/8/8 w - - 0 1"), 100 + 50);
        // 白兵 d2 为 -20
        assert_eq!(eval("8/8/8/8/8/8/3P4/8 w - - 0 1"), 100 - 20);
    }

    #[test]
    fn test_knight_prefers_center() {
        let center = eval("4k3/8/8/8/4N3/8/8/4K3 w - - 0 1");
        let corner = eval("4k3/8/8/8/8/8/8/N3K3 w - - 0 1");
        assert!(center > corner, "{} vs {}", center, corner);
    }

    #[test]
    fn test_king_table_switches_in_endgame() {
        // 只有双王：残局，王在中心更好
        let state = Fen::parse("8/8/8/3k4/8/8/8/4K3 w - - 0 1").unwrap();
        let eval = Evaluator::breakdown(&state);
        assert!(eval.endgame);
        // 白王 e1 残局 -30，黑王 d5 残局 +40（黑方视角），合计 -70
        assert_eq!(eval.positional, -30 - 40);

        // 有后则不是残局，白王 g1 中局 +30
        let state = Fen::parse("3qk3/8/8/8/8/8/8/6K1 w - - 0 1").unwrap();
        let eval = Evaluator::breakdown(&state);
        assert!(!eval.endgame);
        assert_eq!(eval.material, -900);
    }

    #[test]
    fn test_is_endgame_threshold() {
        // 车 + 车 + 马 = 1320，不是残局
        let state = Fen::parse("r3k3/8/8/8/8/8/8/R3K1N1 w - - 0 1").unwrap();
        assert!(!Evaluator::is_endgame(&state));

        // 车 + 车 + 兵：马象车之和 1000，是残局
        let state = Fen::parse("r3k3/8/8/8/8/8/P7/R3K3 w - - 0 1").unwrap();
        assert!(Evaluator::is_endgame(&state));

        // 车 + 马 + 象 + 马 = 1470，不是残局
        let state = Fen::parse("1n2kb2/8/8/8/8/8/8/R3K1N1 w - - 0 1").unwrap();
        assert!(!Evaluator::is_endgame(&state));

        // 有后，即使子力很少也不是残局
        let state = Fen::parse("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        assert!(!Evaluator::is_endgame(&state));
    }

    #[test]
    fn test_missing_king_is_tolerated() {
        // 没有王的局面不 panic，只计子力和位置分
        let state = Fen::parse("8/8/8/8/4P3/8/8/8 w - - 0 1").unwrap();
        assert_eq!(Evaluator::evaluate(&state), 120);
        assert_eq!(eval("8/8/8/8/8/8/8/8 w - - 0 1"), 0);
    }
}
