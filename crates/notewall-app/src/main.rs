//! Headless replay entry point.

use clap::Parser;
use notewall_app::AppConfig;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "notewall", about = "Replay scripted input against a Notewall board")]
struct Cli {
    /// Board to open.
    board: String,

    /// JSON script of host events.
    script: PathBuf,

    /// Engine config file (JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding board files.
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    log::info!("Starting Notewall replay for board {}", cli.board);

    let config = AppConfig {
        board_id: cli.board,
        script: cli.script,
        engine_config: cli.config,
        data_dir: cli.data_dir,
    };
    let output = match notewall_app::run(&config) {
        Ok(output) => output,
        Err(e) => {
            log::error!("Replay failed: {}", e);
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&output) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to encode output: {e}");
            ExitCode::FAILURE
        }
    }
}
