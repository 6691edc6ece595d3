use clap::Parser;
use sigfox_core::Timeouts;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "sigfox")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding config.json, AT_Libraries/ and about.txt
    #[arg(short, long, env = "SIGFOX_CONFIG_DIR", default_value = "Config")]
    pub config_dir: PathBuf,

    /// Read timeout for ID, PAC and version queries (e.g. 5s, 1500ms)
    #[arg(long, default_value = "5s", value_parser = humantime::parse_duration)]
    pub query_timeout: Duration,

    /// Read timeout for sending messages and custom commands
    #[arg(long, default_value = "10s", value_parser = humantime::parse_duration)]
    pub send_timeout: Duration,

    /// Enable debug logging
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Cli {
    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            query: self.query_timeout,
            send: self.send_timeout,
        }
    }
}
