use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct Cli {
    /// Config file to load
    #[arg(short, long, default_value = "config.toml")]
    pub config_file: String,

    /// JSON build request to read. Reads stdin when omitted
    #[arg(short, long)]
    pub request: Option<PathBuf>,
}
