//! 规则引擎接口
//!
//! 搜索与评估只通过 `RulesEngine` 访问局面，任何实现了该 trait 的规则引擎都可替换使用。

use std::fmt;
use std::ops::{Deref, DerefMut};

use protocol::{BoardState, ChessError, Fen, Move, MoveGenerator, PieceType, Side, Square};

/// 规则引擎能力
pub trait RulesEngine {
    /// 走法类型，对搜索来说是不透明的值
    type Move: Copy + PartialEq + fmt::Debug + fmt::Display;

    /// 当前局面的全部合法走法（顺序固定，可能为空）
    fn legal_moves(&self) -> Vec<Self::Move>;

    /// 走子
    fn push(&mut self, mv: Self::Move) -> Result<(), ChessError>;

    /// 撤销最近一步
    fn pop(&mut self) -> Option<Self::Move>;

    fn side_to_move(&self) -> Side;

    fn is_checkmate(&self) -> bool;

    fn is_stalemate(&self) -> bool;

    /// 双方都无法将死对方
    fn has_insufficient_material(&self) -> bool;

    fn can_claim_threefold_repetition(&self) -> bool;

    /// 指定阵营某种棋子所在的格子
    fn pieces(&self, piece_type: PieceType, side: Side) -> Vec<Square>;

    fn king(&self, side: Side) -> Option<Square>;

    /// 局面的 FEN 表示（仅用于日志与错误信息）
    fn fen(&self) -> String;
}

impl RulesEngine for BoardState {
    type Move = Move;

    fn legal_moves(&self) -> Vec<Move> {
        MoveGenerator::generate_legal(self)
    }

    fn push(&mut self, mv: Move) -> Result<(), ChessError> {
        self.make_move(mv)
    }

    fn pop(&mut self) -> Option<Move> {
        self.unmake_move()
    }

    fn side_to_move(&self) -> Side {
        self.current_turn
    }

    fn is_checkmate(&self) -> bool {
        MoveGenerator::is_checkmate(self)
    }

    fn is_stalemate(&self) -> bool {
        MoveGenerator::is_stalemate(self)
    }

    fn has_insufficient_material(&self) -> bool {
        MoveGenerator::is_insufficient_material(&self.board)
    }

    fn can_claim_threefold_repetition(&self) -> bool {
        MoveGenerator::can_claim_threefold_repetition(self)
    }

    fn pieces(&self, piece_type: PieceType, side: Side) -> Vec<Square> {
        self.board.pieces_of(piece_type, side)
    }

    fn king(&self, side: Side) -> Option<Square> {
        self.board.find_king(side)
    }

    fn fen(&self) -> String {
        Fen::to_string(self)
    }
}

/// 走子守卫
///
/// 创建时执行走法，析构时撤销。无论正常返回、剪枝跳出、`?` 传播错误还是 panic 展开，
/// 局面都会恢复到走子之前。
pub struct MoveGuard<'a, E: RulesEngine + ?Sized> {
    engine: &'a mut E,
}

impl<'a, E: RulesEngine + ?Sized> MoveGuard<'a, E> {
    /// 执行走法；失败时局面不变
    pub fn new(engine: &'a mut E, mv: E::Move) -> Result<Self, ChessError> {
        engine.push(mv)?;
        Ok(Self { engine })
    }
}

impl<E: RulesEngine + ?Sized> Deref for MoveGuard<'_, E> {
    type Target = E;

    fn deref(&self) -> &E {
        self.engine
    }
}

impl<E: RulesEngine + ?Sized> DerefMut for MoveGuard<'_, E> {
    fn deref_mut(&mut self) -> &mut E {
        self.engine
    }
}

impl<E: RulesEngine + ?Sized> Drop for MoveGuard<'_, E> {
    fn drop(&mut self) {
        if self.engine.pop().is_none() {
            tracing::error!("撤销走法失败: 走法栈为空");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::Notation;

    fn parse(state: &BoardState, text: &str) -> Move {
        Notation::parse_uci(state, text).unwrap()
    }

    #[test]
    fn test_guard_pops_on_scope_exit() {
        let mut state = BoardState::initial();
        let before = state.clone();
        let mv = parse(&state, "e2e4");

        {
            let guard = MoveGuard::new(&mut state, mv).unwrap();
            assert_eq!(guard.side_to_move(), Side::Black);
        }

        assert_eq!(state, before);
    }

    #[test]
    fn test_guard_nested() {
        let mut state = BoardState::initial();
        let before = state.clone();
        let e4 = parse(&state, "e2e4");

        {
            let mut outer = MoveGuard::new(&mut state, e4).unwrap();
            let e5 = parse(&outer, "e7e5");
            {
                let inner = MoveGuard::new(&mut *outer, e5).unwrap();
                assert_eq!(inner.fen(), "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2");
            }
            assert_eq!(outer.side_to_move(), Side::Black);
        }

        assert_eq!(state, before);
    }

    #[test]
    fn test_guard_restores_on_error_path() {
        fn walk(state: &mut BoardState, mv: Move) -> Result<(), ChessError> {
            let mut guard = MoveGuard::new(state, mv)?;
            // 同一步再走一次：起始格已经没有棋子
            guard.push(mv)?;
            Ok(())
        }

        let mut state = BoardState::initial();
        let before = state.clone();
        let mv = parse(&state, "g1f3");

        assert!(matches!(walk(&mut state, mv), Err(ChessError::NoPiece { .. })));
        assert_eq!(state, before);
    }

    #[test]
    fn test_guard_restores_on_panic() {
        let mut state = BoardState::initial();
        let before = state.clone();
        let mv = parse(&state, "d2d4");

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = MoveGuard::new(&mut state, mv).unwrap();
            panic!("boom");
        }));

        assert!(result.is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn test_failed_push_leaves_position_unchanged() {
        let mut state = BoardState::initial();
        let before = state.clone();
        // e3 上没有棋子
        let bogus = Move::new("e3".parse().unwrap(), "e4".parse().unwrap());

        assert!(MoveGuard::new(&mut state, bogus).is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn test_board_state_queries() {
        let state = BoardState::initial();
        assert_eq!(state.legal_moves().len(), 20);
        assert_eq!(state.king(Side::White), Some(Square::E1));
        assert_eq!(state.pieces(PieceType::Knight, Side::Black).len(), 2);
        assert!(!state.is_checkmate());
        assert!(!state.is_stalemate());
        assert!(!RulesEngine::has_insufficient_material(&state));
        assert!(!state.can_claim_threefold_repetition());
    }
}
