//! UCI 消息类型定义
//!
//! `GuiCommand` 为控制端（GUI）发给引擎的命令，`EngineMessage` 为引擎的回复。
//! 两者都是单行文本，解析与格式化都在这里完成。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};

/// 局面来源
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionSource {
    /// 标准初始局面
    StartPos,
    /// 任意 FEN
    Fen(String),
}

/// `go` 命令参数（时间单位均为毫秒）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoParams {
    pub wtime: Option<u64>,
    pub btime: Option<u64>,
    pub winc: Option<u64>,
    pub binc: Option<u64>,
    pub movestogo: Option<u32>,
    pub movetime: Option<u64>,
    pub depth: Option<u8>,
    pub infinite: bool,
}

/// 控制端发送给引擎的命令
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuiCommand {
    /// 切换到 UCI 模式
    Uci,
    /// 调试开关
    Debug(bool),
    /// 同步检查
    IsReady,
    /// 新对局
    UciNewGame,
    /// 设置选项
    SetOption { name: String, value: Option<String> },
    /// 设置局面
    Position {
        source: PositionSource,
        moves: Vec<String>,
    },
    /// 开始搜索
    Go(GoParams),
    /// 停止搜索
    Stop,
    /// 退出
    Quit,
}

impl GuiCommand {
    /// 解析一行命令；空行或未知命令返回 `Ok(None)`
    pub fn parse(line: &str) -> Result<Option<GuiCommand>> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&head, args)) = tokens.split_first() else {
            return Ok(None);
        };

        let command = match head {
            "uci" => GuiCommand::Uci,
            "isready" => GuiCommand::IsReady,
            "ucinewgame" => GuiCommand::UciNewGame,
            "stop" => GuiCommand::Stop,
            "quit" => GuiCommand::Quit,
            "debug" => GuiCommand::Debug(args.first() == Some(&"on")),
            "setoption" => Self::parse_setoption(args)?,
            "position" => Self::parse_position(args)?,
            "go" => GuiCommand::Go(Self::parse_go(args)?),
            _ => return Ok(None),
        };

        Ok(Some(command))
    }

    /// `setoption name <名称，可含空格> [value <值>]`
    fn parse_setoption(args: &[&str]) -> Result<GuiCommand> {
        if args.first() != Some(&"name") {
            return Err(malformed("setoption", "missing 'name'"));
        }
        let rest = &args[1..];
        let value_at = rest.iter().position(|&t| t == "value");
        let (name_tokens, value) = match value_at {
            Some(i) => (&rest[..i], Some(rest[i + 1..].join(" "))),
            None => (rest, None),
        };
        if name_tokens.is_empty() {
            return Err(malformed("setoption", "empty option name"));
        }

        Ok(GuiCommand::SetOption {
            name: name_tokens.join(" "),
            value,
        })
    }

    /// `position startpos|fen <FEN> [moves <m1> <m2> ...]`
    fn parse_position(args: &[&str]) -> Result<GuiCommand> {
        let moves_at = args.iter().position(|&t| t == "moves");
        let (setup, moves) = match moves_at {
            Some(i) => (&args[..i], &args[i + 1..]),
            None => (args, &[][..]),
        };

        let source = match setup.split_first() {
            Some((&"startpos", _)) => PositionSource::StartPos,
            Some((&"fen", fields)) if !fields.is_empty() => PositionSource::Fen(fields.join(" ")),
            Some((&"fen", _)) => return Err(malformed("position", "missing FEN")),
            _ => return Err(malformed("position", "expected 'startpos' or 'fen'")),
        };

        Ok(GuiCommand::Position {
            source,
            moves: moves.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// `go [wtime N] [btime N] [winc N] [binc N] [movestogo N] [movetime N] [depth N] [infinite]`
    fn parse_go(args: &[&str]) -> Result<GoParams> {
        let mut params = GoParams::default();
        let mut iter = args.iter();

        while let Some(&key) = iter.next() {
            match key {
                "infinite" => params.infinite = true,
                "wtime" => params.wtime = Some(number(key, iter.next())?),
                "btime" => params.btime = Some(number(key, iter.next())?),
                "winc" => params.winc = Some(number(key, iter.next())?),
                "binc" => params.binc = Some(number(key, iter.next())?),
                "movestogo" => params.movestogo = Some(number(key, iter.next())?),
                "movetime" => params.movetime = Some(number(key, iter.next())?),
                "depth" => params.depth = Some(number(key, iter.next())?),
                // ponder、nodes、mate 等参数不支持，跳过
                _ => {}
            }
        }

        Ok(params)
    }
}

/// 解析 `go` 的数值参数；负数时间（部分 GUI 超时后会发送）按 0 处理
fn number<T>(key: &str, value: Option<&&str>) -> Result<T>
where
    T: std::str::FromStr + Default,
{
    let raw = value.ok_or_else(|| malformed("go", format!("missing value for {}", key)))?;
    if raw.starts_with('-') && raw[1..].chars().all(|c| c.is_ascii_digit()) {
        return Ok(T::default());
    }
    raw.parse()
        .map_err(|_| malformed("go", format!("invalid value for {}: {}", key, raw)))
}

fn malformed(command: &'static str, reason: impl Into<String>) -> ProtocolError {
    ProtocolError::MalformedCommand {
        command,
        reason: reason.into(),
    }
}

/// 搜索分数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfoScore {
    /// 厘兵（走子方视角）
    Centipawns(i32),
    /// 将杀（正数为走子方将杀对方，单位为回合）
    Mate(i32),
}

/// 搜索信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchInfo {
    pub depth: u8,
    pub score: InfoScore,
    pub nodes: u64,
    pub time_ms: u64,
    pub pv: Vec<String>,
}

/// 引擎回复
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineMessage {
    /// `id name` 与 `id author`
    Id { name: String, author: String },
    /// 选项声明（仅支持 spin 类型）
    SpinOption {
        name: String,
        default: u64,
        min: u64,
        max: u64,
    },
    UciOk,
    ReadyOk,
    Info(SearchInfo),
    /// 最佳走法；None 表示无合法走法（输出 `0000`）
    BestMove(Option<String>),
}

impl fmt::Display for EngineMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineMessage::Id { name, author } => {
                write!(f, "id name {}\nid author {}", name, author)
            }
            EngineMessage::SpinOption {
                name,
                default,
                min,
                max,
            } => write!(
                f,
                "option name {} type spin default {} min {} max {}",
                name, default, min, max
            ),
            EngineMessage::UciOk => write!(f, "uciok"),
            EngineMessage::ReadyOk => write!(f, "readyok"),
            EngineMessage::Info(info) => {
                write!(f, "info depth {} score ", info.depth)?;
                match info.score {
                    InfoScore::Centipawns(cp) => write!(f, "cp {}", cp)?,
                    InfoScore::Mate(moves) => write!(f, "mate {}", moves)?,
                }
                write!(f, " nodes {} time {}", info.nodes, info.time_ms)?;
                if !info.pv.is_empty() {
                    write!(f, " pv {}", info.pv.join(" "))?;
                }
                Ok(())
            }
            EngineMessage::BestMove(mv) => {
                write!(f, "bestmove {}", mv.as_deref().unwrap_or(crate::constants::NULL_MOVE))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(GuiCommand::parse("uci").unwrap(), Some(GuiCommand::Uci));
        assert_eq!(GuiCommand::parse("  isready  ").unwrap(), Some(GuiCommand::IsReady));
        assert_eq!(GuiCommand::parse("quit").unwrap(), Some(GuiCommand::Quit));
        assert_eq!(GuiCommand::parse("debug on").unwrap(), Some(GuiCommand::Debug(true)));
        assert_eq!(GuiCommand::parse("").unwrap(), None);
        assert_eq!(GuiCommand::parse("ponderhit").unwrap(), None);
    }

    #[test]
    fn test_parse_position_startpos_with_moves() {
        let cmd = GuiCommand::parse("position startpos moves e2e4 e7e5").unwrap();
        assert_eq!(
            cmd,
            Some(GuiCommand::Position {
                source: PositionSource::StartPos,
                moves: vec!["e2e4".to_string(), "e7e5".to_string()],
            })
        );
    }

    #[test]
    fn test_parse_position_fen() {
        let cmd = GuiCommand::parse("position fen 4k3/8/8/8/8/8/8/4K3 w - - 0 1 moves e1d1").unwrap();
        assert_eq!(
            cmd,
            Some(GuiCommand::Position {
                source: PositionSource::Fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1".to_string()),
                moves: vec!["e1d1".to_string()],
            })
        );
        assert!(GuiCommand::parse("position fen").is_err());
        assert!(GuiCommand::parse("position").is_err());
    }

    #[test]
    fn test_parse_go() {
        let cmd = GuiCommand::parse("go wtime 60000 btime 59000 winc 1000 binc 1000 movestogo 30")
            .unwrap();
        let Some(GuiCommand::Go(params)) = cmd else {
            panic!("expected go command");
        };
        assert_eq!(params.wtime, Some(60000));
        assert_eq!(params.btime, Some(59000));
        assert_eq!(params.winc, Some(1000));
        assert_eq!(params.movestogo, Some(30));
        assert_eq!(params.depth, None);

        let Some(GuiCommand::Go(params)) = GuiCommand::parse("go depth 3 infinite").unwrap() else {
            panic!("expected go command");
        };
        assert_eq!(params.depth, Some(3));
        assert!(params.infinite);
    }

    #[test]
    fn test_parse_go_negative_time_is_zero() {
        let Some(GuiCommand::Go(params)) = GuiCommand::parse("go wtime -150 btime 100").unwrap()
        else {
            panic!("expected go command");
        };
        assert_eq!(params.wtime, Some(0));
    }

    #[test]
    fn test_parse_go_errors() {
        assert!(GuiCommand::parse("go wtime").is_err());
        assert!(GuiCommand::parse("go movetime abc").is_err());
    }

    #[test]
    fn test_parse_setoption() {
        let cmd = GuiCommand::parse("setoption name Move Overhead value 250").unwrap();
        assert_eq!(
            cmd,
            Some(GuiCommand::SetOption {
                name: "Move Overhead".to_string(),
                value: Some("250".to_string()),
            })
        );
        assert!(GuiCommand::parse("setoption value 3").is_err());
    }

    #[test]
    fn test_engine_message_display() {
        assert_eq!(EngineMessage::UciOk.to_string(), "uciok");
        assert_eq!(
            EngineMessage::BestMove(Some("e2e4".to_string())).to_string(),
            "bestmove e2e4"
        );
        assert_eq!(EngineMessage::BestMove(None).to_string(), "bestmove 0000");
        assert_eq!(
            EngineMessage::Id {
                name: "Schmock3000".to_string(),
                author: "excylni".to_string()
            }
            .to_string(),
            "id name Schmock3000\nid author excylni"
        );

        let info = EngineMessage::Info(SearchInfo {
            depth: 3,
            score: InfoScore::Centipawns(-25),
            nodes: 1234,
            time_ms: 56,
            pv: vec!["g1f3".to_string()],
        });
        assert_eq!(info.to_string(), "info depth 3 score cp -25 nodes 1234 time 56 pv g1f3");
    }
}
