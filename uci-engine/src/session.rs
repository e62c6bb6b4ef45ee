//! UCI 会话
//!
//! 保存当前局面和配置，逐条处理控制端命令。

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncWrite};

use chess_ai::{EngineConfig, RulesEngine, SearchEngine, SearchError, SearchResult, TimeManager, MATE_SCORE};
use protocol::{
    BoardState, ChessError, EngineMessage, Fen, GoParams, GuiCommand, InfoScore, LineReader,
    LineWriter, Move, Notation, PositionSource, ProtocolError, SearchInfo, Side,
    MOVE_OVERHEAD_RANGE,
};

/// 选项名：通信延迟
const MOVE_OVERHEAD_OPTION: &str = "Move Overhead";

/// 命令处理后是否继续
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// UCI 会话
pub struct Session {
    config: EngineConfig,
    time_manager: TimeManager,
    position: BoardState,
    debug: bool,
}

impl Session {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            time_manager: TimeManager::new(&config),
            config,
            position: BoardState::initial(),
            debug: false,
        }
    }

    /// 当前局面
    pub fn position(&self) -> &BoardState {
        &self.position
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 运行命令循环，直到收到 `quit` 或输入结束
    pub async fn run<R, W>(
        &mut self,
        reader: &mut LineReader<R>,
        writer: &mut LineWriter<W>,
    ) -> Result<()>
    where
        R: AsyncRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send,
    {
        loop {
            let command = match reader.read_command().await {
                Ok(command) => command,
                Err(ProtocolError::InputClosed) => {
                    tracing::info!("输入已关闭，退出");
                    return Ok(());
                }
                Err(e @ (ProtocolError::MalformedCommand { .. } | ProtocolError::LineTooLarge { .. })) => {
                    tracing::warn!("忽略无效命令: {}", e);
                    continue;
                }
                Err(e) => return Err(e).context("读取命令失败"),
            };

            if self.handle(command, writer).await? == Flow::Quit {
                tracing::info!("收到 quit，退出");
                return Ok(());
            }
        }
    }

    /// 处理一条命令
    pub async fn handle<W>(&mut self, command: GuiCommand, writer: &mut LineWriter<W>) -> Result<Flow>
    where
        W: AsyncWrite + Unpin + Send,
    {
        tracing::debug!("收到命令: {:?}", command);

        match command {
            GuiCommand::Uci => {
                writer
                    .send(&EngineMessage::Id {
                        name: self.config.engine_name.clone(),
                        author: self.config.engine_author.clone(),
                    })
                    .await?;
                let (min, max) = MOVE_OVERHEAD_RANGE;
                writer
                    .send(&EngineMessage::SpinOption {
                        name: MOVE_OVERHEAD_OPTION.to_string(),
                        default: self.config.move_overhead_ms,
                        min,
                        max,
                    })
                    .await?;
                writer.send(&EngineMessage::UciOk).await?;
            }
            GuiCommand::Debug(on) => self.debug = on,
            GuiCommand::IsReady => writer.send(&EngineMessage::ReadyOk).await?,
            GuiCommand::UciNewGame => self.position = BoardState::initial(),
            GuiCommand::SetOption { name, value } => self.set_option(&name, value.as_deref()),
            GuiCommand::Position { source, moves } => {
                if let Err(e) = self.set_position(&source, &moves) {
                    tracing::warn!("局面设置失败，保留原局面: {}", e);
                }
            }
            GuiCommand::Go(params) => {
                for msg in self.go(&params).await? {
                    writer.send(&msg).await?;
                }
            }
            // 搜索在命令循环内同步完成，收到 stop 时已经没有进行中的搜索
            GuiCommand::Stop => {}
            GuiCommand::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    fn set_option(&mut self, name: &str, value: Option<&str>) {
        if !name.eq_ignore_ascii_case(MOVE_OVERHEAD_OPTION) {
            tracing::debug!("忽略未知选项: {}", name);
            return;
        }

        match value.and_then(|v| v.trim().parse::<u64>().ok()) {
            Some(ms) => {
                self.config.set_move_overhead(ms);
                self.time_manager = TimeManager::new(&self.config);
                tracing::info!("Move Overhead 设置为 {}ms", self.config.move_overhead_ms);
            }
            None => tracing::warn!("无效的 Move Overhead 值: {:?}", value),
        }
    }

    /// 设置局面；任何一步失败时局面不变
    pub fn set_position(&mut self, source: &PositionSource, moves: &[String]) -> Result<(), ChessError> {
        let mut state = match source {
            PositionSource::StartPos => BoardState::initial(),
            PositionSource::Fen(fen) => Fen::parse(fen)?,
        };
        Notation::play_line(&mut state, moves.iter().map(String::as_str))?;
        self.position = state;
        Ok(())
    }

    /// 搜索并生成回复（`info` + `bestmove`）
    async fn go(&mut self, params: &GoParams) -> Result<Vec<EngineMessage>> {
        if self.debug {
            tracing::info!("go 参数: {:?}", params);
        }
        if params.infinite {
            tracing::info!("不支持无限搜索，go infinite 按固定深度搜索");
        }

        let depth = match params.depth {
            Some(depth) => depth,
            None => {
                let clock = self.time_manager.clock_for(params, self.position.current_turn);
                self.time_manager.allocate(&clock)
            }
        };

        let mut position = self.position.clone();
        let started = std::time::Instant::now();
        let outcome = tokio::task::spawn_blocking(move || {
            let mut engine = SearchEngine::new();
            engine.search_root(&mut position, depth)
        })
        .await
        .context("搜索线程异常退出")?;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let messages = match outcome {
            Ok(Some(result)) => vec![
                EngineMessage::Info(self.search_info(&result, elapsed_ms)),
                EngineMessage::BestMove(Some(Notation::to_uci(&result.best_move))),
            ],
            Ok(None) => vec![EngineMessage::BestMove(None)],
            Err(e) => vec![EngineMessage::BestMove(self.fallback_move(&e))],
        };

        Ok(messages)
    }

    /// 搜索失败时退回第一个合法走法
    fn fallback_move(&self, error: &SearchError) -> Option<String> {
        let fallback: Option<Move> = self.position.legal_moves().into_iter().next();
        tracing::error!("搜索失败: {}，改用第一个合法走法 {:?}", error, fallback);
        fallback.map(|mv| Notation::to_uci(&mv))
    }

    /// 分数换算成走子方视角
    fn search_info(&self, result: &SearchResult<Move>, elapsed_ms: u64) -> SearchInfo {
        let relative = match self.position.current_turn {
            Side::White => result.score,
            Side::Black => -result.score,
        };
        // 分数不含将死步数，只能报告搜索范围内的回合数
        let score = if relative.abs() == MATE_SCORE {
            let moves = (i32::from(result.depth) + 1) / 2;
            InfoScore::Mate(relative.signum() * moves)
        } else {
            InfoScore::Centipawns(relative)
        };

        SearchInfo {
            depth: result.depth,
            score,
            nodes: result.nodes,
            time_ms: elapsed_ms,
            pv: vec![Notation::to_uci(&result.best_move)],
        }
    }
}
