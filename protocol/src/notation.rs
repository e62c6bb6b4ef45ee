//! UCI 长代数记谱法
//!
//! 格式：`<起始格><目标格>[升变棋子]`，例如 `e2e4`、`e1g1`、`e7e8q`。
//! 解析时与当前局面的合法走法匹配，以便还原易位、吃过路兵等走法类别。

use crate::board::BoardState;
use crate::error::ChessError;
use crate::fen::Fen;
use crate::moves::{Move, MoveGenerator};
use crate::piece::{PieceType, Square};

/// UCI 记谱法
pub struct Notation;

impl Notation {
    /// 将走法转换为 UCI 文本
    pub fn to_uci(mv: &Move) -> String {
        mv.to_string()
    }

    /// 解析 UCI 文本为（起始格, 目标格, 升变棋子），不涉及局面
    pub fn parse_coordinates(text: &str) -> Result<(Square, Square, Option<PieceType>), ChessError> {
        let invalid = || ChessError::InvalidMove {
            text: text.to_string(),
        };

        if !text.is_ascii() || !(4..=5).contains(&text.len()) {
            return Err(invalid());
        }

        let from: Square = text[0..2].parse().map_err(|_| invalid())?;
        let to: Square = text[2..4].parse().map_err(|_| invalid())?;
        let promotion = match text[4..].chars().next() {
            None => None,
            Some(c) => match PieceType::from_fen_char(c) {
                Some((piece_type, _)) if PieceType::PROMOTIONS.contains(&piece_type) => {
                    Some(piece_type)
                }
                _ => return Err(invalid()),
            },
        };

        Ok((from, to, promotion))
    }

    /// 解析 UCI 文本为当前局面的合法走法
    pub fn parse_uci(state: &BoardState, text: &str) -> Result<Move, ChessError> {
        let (from, to, promotion) = Self::parse_coordinates(text)?;

        MoveGenerator::generate_legal(state)
            .into_iter()
            .find(|mv| mv.from == from && mv.to == to && mv.promotion == promotion)
            .ok_or_else(|| ChessError::IllegalMove {
                mv: text.to_string(),
                fen: Fen::to_string(state),
            })
    }

    /// 依次执行一串 UCI 走法
    pub fn play_line<'a, I>(state: &mut BoardState, moves: I) -> Result<(), ChessError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for text in moves {
            let mv = Self::parse_uci(state, text)?;
            state.make_move(mv)?;
        }
        Ok(())
    }
}
