use clap::Parser;
use gitpow::cli::{self, Cli};
use std::process::ExitCode;

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    // 默认只输出警告，避免干扰进度行
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match cli::run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
