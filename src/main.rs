//! Frame relay server binary.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use frame_relay_engine::config::{EngineConfig, FrameEncoding};
use frame_relay_engine::engine::build_engine;
use frame_relay_engine::logging::init_tracing;
use frame_relay_engine::server::supervisor::Supervisor;
use frame_relay_engine::source::dir_source::DirectorySource;

#[derive(Parser)]
#[command(name = "frame-relay")]
#[command(about = "Serve animated images one frame per request")]
struct Cli {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the source images
    #[arg(long)]
    image_dir: Option<PathBuf>,

    #[arg(long)]
    port: Option<u16>,

    /// Number of decoded images kept in memory
    #[arg(long)]
    cache_capacity: Option<usize>,

    /// Re-encode frames as JPEG instead of PNG
    #[arg(long, default_value = "false")]
    jpeg: bool,

    #[arg(long, short, default_value = "false")]
    verbose: bool,
}

impl Cli {
    /// CLI flags override the config file, which overrides defaults.
    fn build_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_toml_file(path)?,
            None => EngineConfig::default(),
        };
        if let Some(dir) = &self.image_dir {
            config.image_dir = dir.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(capacity) = self.cache_capacity {
            config.cache_capacity = capacity;
        }
        if self.jpeg {
            config.encoding = FrameEncoding::Jpeg;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match cli.build_config() {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {}", e);
            return Err(e);
        }
    };

    if let Err(e) = DirectorySource::new(&config.image_dir).ensure_root().await {
        error!(
            "cannot access image directory {}: {}",
            config.image_dir.display(),
            e
        );
    }

    let sequencer = build_engine(&config)?;
    let supervisor = Supervisor::new(sequencer, config.bind_addr(), config.restart_delay());

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("interrupt received, shutting down");
                signal_token.cancel();
            }
            Err(e) => error!("cannot listen for interrupt: {}", e),
        }
    });

    let restarts = supervisor.run(shutdown).await?;
    info!("frame relay stopped after {} restarts", restarts);
    Ok(())
}
