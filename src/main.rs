use clap::Parser;
use colored::Colorize;
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use blind_watermark::{
    attack::AttackRegistry, cli::Cli, constants::EXIT_FAILURE, engine::WaterMark, handler::run,
};

/// 初始化日志，输出到 stderr，级别由 `RUST_LOG` 控制 (默认 warn)。
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// 程序的主入口点
///
/// 解析命令行参数，交给调度器执行，并将结果映射为进程退出码
fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let registry = AttackRegistry::default();
    let mut stdout = io::stdout().lock();

    match run(&cli, &registry, WaterMark::new, &mut stdout) {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(err) => {
            eprintln!("{} {err:#}", "Error:".red().bold());
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
