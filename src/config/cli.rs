use crate::config::toml_config::ServiceConfig;
use crate::utils::error::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "autoprice")]
#[command(about = "Used-car price prediction and automotive news service")]
pub struct CliConfig {
    #[arg(long, short, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Address to listen on, e.g. 127.0.0.1:5050")]
    pub bind: Option<SocketAddr>,

    #[arg(long, help = "Directory holding the trained model artifacts")]
    pub artifact_dir: Option<PathBuf>,

    #[arg(long, help = "Single origin allowed to call the API from a browser")]
    pub allowed_origin: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process statistics after startup")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

impl CliConfig {
    /// File values first, then any flag given on the command line.
    pub fn resolve(&self) -> Result<ServiceConfig> {
        let mut config = match &self.config {
            Some(path) => ServiceConfig::from_file(path)?,
            None => ServiceConfig::default(),
        };

        if let Some(bind) = self.bind {
            config.server.bind_addr = bind;
        }
        if let Some(dir) = &self.artifact_dir {
            config.artifacts.dir = dir.clone();
        }
        if let Some(origin) = &self.allowed_origin {
            config.server.allowed_origin = origin.clone();
        }
        config.monitoring.system_stats |= self.monitor;
        config.monitoring.json_logs |= self.log_json;

        Ok(config)
    }
}
