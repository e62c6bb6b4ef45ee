//! 搜索引擎
//!
//! 固定深度的 Minimax + Alpha-Beta 剪枝。白方为极大方，黑方为极小方，
//! 分数始终为白方视角。

use protocol::{ChessError, Side};
use thiserror::Error;

use crate::evaluate::Evaluator;
use crate::rules::{MoveGuard, RulesEngine};

/// 被将死一方的分数绝对值（不区分将死步数）
pub const MATE_SCORE: i32 = 90_000;

/// 初始搜索窗口
pub const SCORE_INFINITY: i32 = 1_000_000;

/// 搜索错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// 非终局节点却没有合法走法，说明规则引擎的判定不一致
    #[error("No legal moves in non-terminal position {fen} (depth {depth})")]
    NoLegalMoves { fen: String, depth: u8 },

    /// 规则引擎错误
    #[error("Rules engine error: {0}")]
    Rules(#[from] ChessError),
}

/// 搜索结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult<M> {
    pub best_move: M,
    /// 白方视角分数
    pub score: i32,
    pub depth: u8,
    pub nodes: u64,
}

/// 搜索引擎
#[derive(Debug, Default)]
pub struct SearchEngine {
    nodes_searched: u64,
}

impl SearchEngine {
    /// 创建新的搜索引擎
    pub fn new() -> Self {
        Self::default()
    }

    /// 搜索最佳走法；没有合法走法时返回 `Ok(None)`
    pub fn best_move<E: RulesEngine>(
        &mut self,
        position: &mut E,
        depth: u8,
    ) -> Result<Option<E::Move>, SearchError> {
        Ok(self.search_root(position, depth)?.map(|result| result.best_move))
    }

    /// 根节点搜索
    ///
    /// 按规则引擎给出的顺序逐个展开，分数严格更优才替换（平分时先到先得）。
    /// 根节点只收窄走子方的边界，不做剪枝。深度 0 按 1 处理。
    pub fn search_root<E: RulesEngine>(
        &mut self,
        position: &mut E,
        depth: u8,
    ) -> Result<Option<SearchResult<E::Move>>, SearchError> {
        self.nodes_searched = 0;
        let depth = depth.max(1);
        let side = position.side_to_move();

        tracing::info!("开始搜索: depth={} fen={}", depth, position.fen());

        let moves = position.legal_moves();
        if moves.is_empty() {
            tracing::info!("根节点没有合法走法");
            return Ok(None);
        }

        let mut alpha = -SCORE_INFINITY;
        let mut beta = SCORE_INFINITY;
        let mut best: Option<(E::Move, i32)> = None;

        for mv in moves {
            let score = {
                let mut child = MoveGuard::new(position, mv)?;
                self.bounded_search(&mut *child, depth - 1, alpha, beta)?
            };

            let improves = match (best, side) {
                (None, _) => true,
                (Some((_, best_score)), Side::White) => score > best_score,
                (Some((_, best_score)), Side::Black) => score < best_score,
            };
            if improves {
                tracing::debug!("根节点最佳走法更新: {} score={}", mv, score);
                best = Some((mv, score));
            }

            match side {
                Side::White => alpha = alpha.max(score),
                Side::Black => beta = beta.min(score),
            }
        }

        let result = best.map(|(best_move, score)| SearchResult {
            best_move,
            score,
            depth,
            nodes: self.nodes_searched,
        });

        if let Some(result) = &result {
            tracing::info!(
                "搜索完成: bestmove={} score={} nodes={}",
                result.best_move,
                result.score,
                result.nodes
            );
        }

        Ok(result)
    }

    /// Alpha-Beta 搜索（返回白方视角分数）
    pub fn bounded_search<E: RulesEngine>(
        &mut self,
        position: &mut E,
        depth: u8,
        mut alpha: i32,
        mut beta: i32,
    ) -> Result<i32, SearchError> {
        self.nodes_searched += 1;

        if depth == 0 {
            let eval = Evaluator::breakdown(&*position);
            tracing::trace!(
                "叶节点评估: material={} positional={} endgame={}",
                eval.material,
                eval.positional,
                eval.endgame
            );
            return Ok(eval.total());
        }

        let side = position.side_to_move();

        if position.is_checkmate() {
            tracing::trace!("将死: {:?} 方被将死", side);
            return Ok(match side {
                Side::White => -MATE_SCORE,
                Side::Black => MATE_SCORE,
            });
        }

        if position.is_stalemate()
            || position.has_insufficient_material()
            || position.can_claim_threefold_repetition()
        {
            tracing::trace!("和棋局面");
            return Ok(0);
        }

        let moves = position.legal_moves();
        if moves.is_empty() {
            return Err(SearchError::NoLegalMoves {
                fen: position.fen(),
                depth,
            });
        }

        let mut best = match side {
            Side::White => -SCORE_INFINITY,
            Side::Black => SCORE_INFINITY,
        };

        for mv in moves {
            let score = {
                let mut child = MoveGuard::new(position, mv)?;
                self.bounded_search(&mut *child, depth - 1, alpha, beta)?
            };

            match side {
                Side::White => {
                    best = best.max(score);
                    alpha = alpha.max(score);
                }
                Side::Black => {
                    best = best.min(score);
                    beta = beta.min(score);
                }
            }

            if alpha >= beta {
                break;
            }
        }

        Ok(best)
    }

    /// 获取最近一次搜索的节点数
    pub fn nodes_searched(&self) -> u64 {
        self.nodes_searched
    }
}
