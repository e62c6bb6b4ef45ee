use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chess_ai::{EngineConfig, CONFIG_ENV_VAR};
use protocol::{LineReader, LineWriter};
use uci_engine::{config_path, Session};

#[tokio::main]
async fn main() -> Result<()> {
    // 日志写到 stderr，stdout 只用于 UCI 通信
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("uci_engine=info".parse()?))
        .init();

    let config = match config_path(std::env::args().skip(1), std::env::var(CONFIG_ENV_VAR).ok()) {
        Some(path) => EngineConfig::load(&path)?,
        None => EngineConfig::default(),
    };

    info!("{} 启动中...", config.engine_name);

    let mut session = Session::new(config);
    let mut reader = LineReader::new(tokio::io::stdin());
    let mut writer = LineWriter::new(tokio::io::stdout());
    session.run(&mut reader, &mut writer).await?;

    Ok(())
}
