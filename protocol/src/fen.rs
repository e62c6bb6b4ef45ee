//! FEN 格式解析和生成
//!
//! 格式：`<棋盘> <走子方> <易位权> <吃过路兵格> <半回合数> <回合数>`
//!
//! 示例：
//! `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1`

use crate::board::{Board, BoardState, CastlingRights};
use crate::error::ChessError;
use crate::piece::{Piece, Side, Square};

/// 初始局面 FEN
pub const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// FEN 格式处理
pub struct Fen;

impl Fen {
    /// 解析 FEN 字符串为棋局状态
    ///
    /// 只有棋盘部分是必需的；缺省时走子方为白方、无易位权、无吃过路兵格、
    /// 半回合数为 0、回合数为 1。
    pub fn parse(fen: &str) -> Result<BoardState, ChessError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.is_empty() {
            return Err(invalid("Empty FEN string"));
        }

        let board = Self::parse_board(parts[0])?;

        let current_turn = match parts.get(1) {
            Some(s) => {
                let mut chars = s.chars();
                match (chars.next().and_then(Side::from_fen_char), chars.next()) {
                    (Some(side), None) => side,
                    _ => return Err(invalid(format!("Invalid side to move: {}", s))),
                }
            }
            None => Side::White,
        };

        let castling = match parts.get(2) {
            Some(s) => Self::parse_castling(s)?,
            None => CastlingRights::default(),
        };

        let en_passant = match parts.get(3) {
            Some(&"-") | None => None,
            Some(s) => Some(
                s.parse::<Square>()
                    .map_err(|_| invalid(format!("Invalid en passant square: {}", s)))?,
            ),
        };

        let halfmove_clock = match parts.get(4) {
            Some(s) => s
                .parse()
                .map_err(|_| invalid(format!("Invalid halfmove clock: {}", s)))?,
            None => 0,
        };

        let fullmove_number = match parts.get(5) {
            Some(s) => s
                .parse()
                .map_err(|_| invalid(format!("Invalid fullmove number: {}", s)))?,
            None => 1,
        };

        Ok(BoardState::from_parts(
            board,
            current_turn,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        ))
    }

    /// 解析棋盘部分
    fn parse_board(board_str: &str) -> Result<Board, ChessError> {
        let mut board = Board::empty();
        let rows: Vec<&str> = board_str.split('/').collect();

        if rows.len() != 8 {
            return Err(invalid(format!("Expected 8 ranks, got {}", rows.len())));
        }

        // FEN 从上到下是第 8 行到第 1 行
        for (row_idx, row) in rows.iter().enumerate() {
            let rank = 7 - row_idx as u8;
            let mut file = 0u8;

            for c in row.chars() {
                if file >= 8 {
                    return Err(invalid(format!("Rank {} has too many files", rank + 1)));
                }

                if let Some(empty_count) = c.to_digit(10) {
                    if !(1..=8).contains(&empty_count) {
                        return Err(invalid(format!("Invalid empty count: {}", c)));
                    }
                    file += empty_count as u8;
                } else if let Some(piece) = Piece::from_fen_char(c) {
                    board.set(Square::new(file, rank), Some(piece));
                    file += 1;
                } else {
                    return Err(invalid(format!("Invalid piece character: {}", c)));
                }
            }

            if file != 8 {
                return Err(invalid(format!(
                    "Rank {} has {} files, expected 8",
                    rank + 1,
                    file
                )));
            }
        }

        Ok(board)
    }

    /// 解析易位权部分
    fn parse_castling(s: &str) -> Result<CastlingRights, ChessError> {
        let mut rights = CastlingRights::default();
        if s == "-" {
            return Ok(rights);
        }
        for c in s.chars() {
            match c {
                'K' => rights.white_king_side = true,
                'Q' => rights.white_queen_side = true,
                'k' => rights.black_king_side = true,
                'q' => rights.black_queen_side = true,
                _ => return Err(invalid(format!("Invalid castling character: {}", c))),
            }
        }
        Ok(rights)
    }

    /// 将棋局状态转换为 FEN 字符串
    pub fn to_string(state: &BoardState) -> String {
        format!(
            "{} {} {} {} {} {}",
            Self::board_to_string(&state.board),
            state.current_turn.to_fen_char(),
            Self::castling_to_string(state.castling),
            state
                .en_passant
                .map_or_else(|| "-".to_string(), |sq| sq.to_string()),
            state.halfmove_clock,
            state.fullmove_number
        )
    }

    /// 将棋盘转换为 FEN 棋盘部分
    pub fn board_to_string(board: &Board) -> String {
        let mut rows = Vec::with_capacity(8);

        for rank in (0..8u8).rev() {
            let mut row = String::new();
            let mut empty_count = 0;

            for file in 0..8u8 {
                match Square::new(file, rank).and_then(|sq| board.get(sq)) {
                    Some(piece) => {
                        if empty_count > 0 {
                            row.push_str(&empty_count.to_string());
                            empty_count = 0;
                        }
                        row.push(piece.to_fen_char());
                    }
                    None => empty_count += 1,
                }
            }

            if empty_count > 0 {
                row.push_str(&empty_count.to_string());
            }

            rows.push(row);
        }

        rows.join("/")
    }

    fn castling_to_string(rights: CastlingRights) -> String {
        let mut s = String::new();
        if rights.white_king_side {
            s.push('K');
        }
        if rights.white_queen_side {
            s.push('Q');
        }
        if rights.black_king_side {
            s.push('k');
        }
        if rights.black_queen_side {
            s.push('q');
        }
        if s.is_empty() {
            s.push('-');
        }
        s
    }

    /// 解析初始局面
    pub fn initial() -> BoardState {
        BoardState::initial()
    }
}

fn invalid(reason: impl Into<String>) -> ChessError {
    ChessError::InvalidFen {
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::PieceType;

    #[test]
    fn test_parse_initial_fen() {
        let state = Fen::parse(INITIAL_FEN).unwrap();

        assert_eq!(state.current_turn, Side::White);
        assert_eq!(state.castling, CastlingRights::all());
        assert_eq!(state.en_passant, None);
        assert_eq!(state.board, Board::initial());
        assert_eq!(
            state.board.get(Square::E8),
            Some(Piece::new(PieceType::King, Side::Black))
        );
    }

    #[test]
    fn test_initial_matches_constructor() {
        assert_eq!(Fen::parse(INITIAL_FEN).unwrap(), BoardState::initial());
        assert_eq!(Fen::to_string(&BoardState::initial()), INITIAL_FEN);
    }

    #[test]
    fn test_parse_custom_fen() {
        let fen = "4k3/8/8/3pP3/8/8/8/4K3 w - d6 7 42";
        let state = Fen::parse(fen).unwrap();

        assert_eq!(state.current_turn, Side::White);
        assert_eq!(state.castling, CastlingRights::default());
        assert_eq!(state.en_passant, "d6".parse().ok());
        assert_eq!(state.halfmove_clock, 7);
        assert_eq!(state.fullmove_number, 42);
        assert_eq!(Fen::to_string(&state), fen);
    }

    #[test]
    fn test_board_only_fen_uses_defaults() {
        let state = Fen::parse("4k3/8/8/8/8/8/8/4K3").unwrap();
        assert_eq!(state.current_turn, Side::White);
        assert_eq!(state.halfmove_clock, 0);
        assert_eq!(state.fullmove_number, 1);
    }

    #[test]
    fn test_invalid_fen() {
        // 行数不对
        assert!(Fen::parse("4k3/8/8").is_err());
        // 列数不对
        assert!(Fen::parse("4k4/8/8/8/8/8/8/4K3 w").is_err());
        // 无效字符
        assert!(Fen::parse("4x3/8/8/8/8/8/8/4K3 w").is_err());
        // 无效走子方
        assert!(Fen::parse("4k3/8/8/8/8/8/8/4K3 x").is_err());
        // 无效易位权
        assert!(Fen::parse("4k3/8/8/8/8/8/8/4K3 w Z").is_err());
        // 无效数字
        assert!(Fen::parse("4k3/8/8/8/8/8/8/4K3 w - - x 1").is_err());
        assert!(Fen::parse("").is_err());
    }
}
