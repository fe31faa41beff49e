use clap::{command, value_parser, Arg, ArgAction};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use abi::config::Config;
use abi::errors::Error;

const DEFAULT_CONFIG: &str = "./abi/fixtures/config.yml";
const LOG_DIR: &str = "./logs";

/// stdout plus a daily file; the guard flushes the file writer on drop
fn init_tracing() -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(LOG_DIR, "rallytap.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_line_number(true))
        .with(
            fmt::layer()
                .with_line_number(true)
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .init();
    guard
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let matches = command!()
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("path of the yaml config")
                .value_parser(value_parser!(String))
                .default_value(DEFAULT_CONFIG),
        )
        .arg(
            Arg::new("memory")
                .long("memory")
                .help("keep data in process instead of postgres and redis")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("expire-events")
                .long("expire-events")
                .help("mark stale events as expired, then exit")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let _guard = init_tracing();

    let path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or(DEFAULT_CONFIG);
    let config = Config::load(path)?;
    info!("loaded config from {}", path);

    if matches.get_flag("expire-events") {
        api::expire_events(&config).await?;
        return Ok(());
    }
    api::start(config, matches.get_flag("memory")).await
}
