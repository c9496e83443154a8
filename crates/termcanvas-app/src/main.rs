mod cli;
mod console;

use std::process::ExitCode;
use std::time::Duration;

use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use termcanvas_canvas::HeadlessSurface;
use termcanvas_common::CanvasError;
use termcanvas_config::TermcanvasConfig;
use termcanvas_relay::{Host, Session, SessionOptions};

use cli::{Args, Mode};

const DEFAULT_LOG: &str = "termcanvas=info";

/// How long peers get to receive `exit` before the process leaves.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// `RUST_LOG` wins, then `--log-level`, then the config file. Logs go to
/// stderr so stdout stays free for the console.
fn init_logging(cli_level: Option<&str>, config_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directive = cli_level.unwrap_or(config_level);
        EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = cli::parse();

    // Logging needs the config's level, so it starts after loading.
    let (config, config_error) = match termcanvas_config::load_config(args.config.as_deref()) {
        Ok(config) => (config, None),
        Err(e) => (TermcanvasConfig::default(), Some(e)),
    };
    init_logging(args.log_level.as_deref(), &config.logging.level);

    tracing::info!("termcanvas v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(e) = config_error {
        tracing::warn!("Config load failed, using defaults: {e}");
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };
    let result = runtime.block_on(run(args, config));
    // Stdin is read on a blocking thread that may never return.
    runtime.shutdown_timeout(Duration::from_millis(100));

    match result {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args, config: TermcanvasConfig) -> Result<(), CanvasError> {
    let port = args.port.unwrap_or(config.network.port);
    let options = SessionOptions {
        header_rows: config.canvas.header_rows,
        outbound_queue: config.network.outbound_queue as usize,
        max_line_length: config.network.max_line_length as usize,
        max_region_cells: config.canvas.max_region_cells.into(),
    };
    let surface = HeadlessSurface::new(config.canvas.width, config.canvas.height);
    let session = Session::new(Box::new(surface), options);

    match args.mode() {
        Mode::Host => {
            let addr = format!("{}:{port}", config.network.bind_address);
            let host = Host::bind(&addr, session.clone()).await?;
            tokio::spawn(host.run());
        }
        Mode::Connect(address) => {
            termcanvas_relay::connect(&address, port, &session).await?;
        }
        Mode::Offline => tracing::info!("No --host or --connect given, drawing offline"),
    }

    let stdin = BufReader::new(tokio::io::stdin());
    tokio::select! {
        result = console::run(&session, stdin, tokio::io::stdout()) => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("Interrupted"),
    }

    let drawing = session.has_drawing().await;
    let csv = session.save_csv().await;

    session.shutdown().await;
    if tokio::time::timeout(SHUTDOWN_GRACE, session.wait())
        .await
        .is_err()
    {
        tracing::warn!("Some peers did not close in time");
    }

    match args.save_on_exit {
        Some(path) if drawing => {
            tokio::fs::write(&path, csv).await?;
            tracing::info!(path = %path.display(), "Saved drawing");
        }
        Some(_) => tracing::info!("Canvas is empty, nothing saved"),
        None => {}
    }
    Ok(())
}
