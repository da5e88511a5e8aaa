mod cli;
mod error;
mod logging;
mod storage;

use std::io;
use std::process::ExitCode;

use clap::Parser;

use cli::{Cli, Commands};

fn main() -> ExitCode {
    // 解析命令行参数
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let config = storage::config::load_config();
    // 无子命令：进入交互菜单
    let command = cli.command.unwrap_or(Commands::Menu);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli::execute(command, &config, cli.data_dir.as_deref(), &mut out) {
        Ok(true) => ExitCode::SUCCESS,
        // 任务不存在
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "task-tracker failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
