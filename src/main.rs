use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use review_monitor::config::{Overrides, Settings};
use review_monitor::{app, events, ui, App, HttpFetcher, Poller, PollerHandle};

#[derive(Parser, Debug)]
#[command(name = "review-monitor")]
#[command(about = "Terminal dashboard for the code review service's health and queue")]
struct Args {
    /// Base URL of the API gateway
    #[arg(short, long)]
    url: Option<String>,

    /// Time between polls (e.g., "2s", "500ms")
    #[arg(short, long)]
    interval: Option<String>,

    /// Per-request timeout (e.g., "10s")
    #[arg(long)]
    timeout: Option<String>,

    /// Path to a TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write logs to this file (the terminal is owned by the dashboard)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Take one reading, export it to a JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = Overrides {
        base_url: args.url,
        poll_interval: args.interval,
        request_timeout: args.timeout,
        log_file: args.log_file,
    };
    let settings = Settings::load(args.config.as_deref(), &overrides)?;

    init_logging(settings.log_file.as_deref(), args.export.is_some())?;

    // Build a tokio runtime; the TUI loop itself stays on the main thread
    let rt = tokio::runtime::Runtime::new()?;
    let _guard = rt.enter();

    let fetcher = HttpFetcher::builder()
        .endpoint(settings.base_url.clone())
        .timeout(settings.request_timeout)
        .build()
        .context("Failed to create HTTP client")?;

    info!(
        base_url = %settings.base_url,
        poll_interval_ms = settings.poll_interval.as_millis() as u64,
        "starting review monitor"
    );
    let poller = Poller::spawn(Arc::new(fetcher), settings.poller_config());

    // Handle export mode (non-interactive)
    if let Some(export_path) = args.export {
        let limit = settings.request_timeout + Duration::from_secs(1);
        return rt.block_on(export_once(poller, &export_path, limit));
    }

    let app = App::new(poller);
    let (result, poller) = run_tui(app);
    rt.block_on(poller.shutdown());
    result
}

/// Install the tracing subscriber.
///
/// Interactive mode only logs when a file is given, since stderr would
/// corrupt the alternate screen.
fn init_logging(log_file: Option<&Path>, to_stderr: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if to_stderr {
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
    }

    Ok(())
}

/// Wait for the first completed cycle and write it out.
async fn export_once(poller: PollerHandle, export_path: &Path, limit: Duration) -> Result<()> {
    let state = poller.wait_ready(limit).await;
    let description = poller.description().to_string();
    poller.shutdown().await;

    let Some(state) = state else {
        bail!("No poll cycle completed within {:?}", limit);
    };

    app::write_export(export_path, &state, &description)?;
    println!("Exported monitor state to: {}", export_path.display());
    Ok(())
}

/// Run the TUI until the user quits, then hand the poller back for shutdown.
fn run_tui(mut app: App) -> (Result<()>, PollerHandle) {
    let result = run_terminal(&mut app);
    (result, app.into_poller())
}

fn run_terminal(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    // Run the main loop
    let result = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        app.sync();

        terminal.draw(|frame| ui::draw(frame, app))?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }
    }

    Ok(())
}
