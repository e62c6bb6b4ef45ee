//! UCI 前端
//!
//! 包含:
//! - UCI 会话（局面维护、命令处理、调用时间管理和搜索）
//! - 配置文件定位

use std::path::PathBuf;

pub mod session;

pub use session::{Flow, Session};

/// 配置文件路径：命令行 `--config <path>` 优先，其次是环境变量
pub fn config_path<I>(args: I, env_value: Option<String>) -> Option<PathBuf>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(PathBuf::from(path));
        }
    }
    env_value.filter(|v| !v.is_empty()).map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_config_path_from_args() {
        assert_eq!(
            config_path(args(&["uci-engine", "--config", "engine.json"]), None),
            Some(PathBuf::from("engine.json"))
        );
        assert_eq!(
            config_path(args(&["uci-engine", "--config=a.json"]), Some("b.json".to_string())),
            Some(PathBuf::from("a.json"))
        );
    }

    #[test]
    fn test_config_path_from_env() {
        assert_eq!(
            config_path(args(&["uci-engine"]), Some("b.json".to_string())),
            Some(PathBuf::from("b.json"))
        );
        assert_eq!(config_path(args(&["uci-engine"]), Some(String::new())), None);
        assert_eq!(config_path(args(&["uci-engine"]), None), None);
    }
}
