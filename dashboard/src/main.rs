use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

mod client;
mod config;
mod controller;
mod display;
mod shutdown;
mod tui;

use chainboard::{FeedProvider, TaskStatus};
use client::ExplorerClient;
use config::Config;
use controller::{RefreshSettings, ViewController};
use shutdown::spawn_shutdown_handler;
use tui::{App, InputResult, TuiUpdate, View};

#[derive(Parser, Debug)]
#[command(name = "chainboard-dashboard")]
#[command(about = "Terminal dashboard for an agent/task/blockchain explorer backend")]
struct Args {
    /// Backend base URL (overrides config file)
    #[arg(long, env = "CHAINBOARD_BACKEND_URL")]
    backend_url: Option<String>,

    /// Path to TOML config file
    #[arg(long, env = "CHAINBOARD_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the interactive dashboard (default)
    Dashboard,
    /// Fetch every feed once, print its provenance, exit non-zero if any
    /// feed fell back to placeholder data
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,chainboard=debug,chainboard_dashboard=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = Config::load_or_default(args.config.as_deref())?;
    if let Some(backend_url) = args.backend_url {
        config.backend_url = backend_url;
    }

    let client = ExplorerClient::new(
        &config.backend_url,
        Duration::from_secs(config.request_timeout_secs),
    )?;
    let provider: Arc<dyn FeedProvider> = Arc::new(client);

    match args.command.unwrap_or(Commands::Dashboard) {
        Commands::Dashboard => run_dashboard(provider, &config).await,
        Commands::Check => run_check(provider, &config).await,
    }
}

async fn run_dashboard(provider: Arc<dyn FeedProvider>, config: &Config) -> anyhow::Result<()> {
    // Restore the terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let mut terminal = tui::init()?;
    let shutdown = spawn_shutdown_handler();

    let mut app = App::new(&config.backend_url, config.page_size);

    let (update_tx, mut update_rx) = mpsc::unbounded_channel::<TuiUpdate>();
    let settings = RefreshSettings {
        // interval() panics on a zero period
        overview_interval: Duration::from_secs(config.overview_refresh_secs.max(1)),
        agents_interval: Duration::from_secs(config.agents_refresh_secs.max(1)),
        page_size: config.page_size,
        block_window: config.block_window,
    };
    let mut controller = ViewController::new(provider, update_tx, settings);
    controller.open(app.view);

    let result = run_tui_loop(
        &mut terminal,
        &mut app,
        &mut controller,
        &mut update_rx,
        &shutdown,
    )
    .await;

    controller.close();
    tui::restore()?;

    result
}

/// Render loop: drain controller updates, draw, handle input. The loop never
/// fetches; all data arrives as reconciled snapshots over the channel.
async fn run_tui_loop(
    terminal: &mut tui::Tui,
    app: &mut App,
    controller: &mut ViewController,
    update_rx: &mut mpsc::UnboundedReceiver<TuiUpdate>,
    shutdown: &shutdown::ShutdownSignal,
) -> anyhow::Result<()> {
    while app.running && !shutdown.is_shutdown() {
        // Apply updates from controller tasks (non-blocking)
        loop {
            match update_rx.try_recv() {
                Ok(update) => app.apply_update(update),
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    app.running = false;
                    break;
                }
            }
        }

        terminal.draw(|frame| tui::draw(frame, app))?;

        match tui::handle_input(app)? {
            InputResult::Quit => break,
            InputResult::SwitchView(view) => {
                if view != app.view {
                    app.view = view;
                    app.last_refresh = None;
                    // Closing the old view's timer and starting the new one
                    // keeps exactly one scheduled refresh alive.
                    controller.open(view);
                }
            }
            InputResult::Refresh => {
                controller.refresh_now(app.view);
            }
            InputResult::PageNext => {
                if let Some(page) = app.next_page() {
                    apply_page_change(controller, app, page);
                }
            }
            InputResult::PagePrev => {
                if let Some(page) = app.prev_page() {
                    apply_page_change(controller, app, page);
                }
            }
            InputResult::CycleTaskFilter => {
                if app.view == View::Agents {
                    app.task_filter = TaskStatus::next_filter(app.task_filter);
                    controller.set_task_filter(app.task_filter);
                }
            }
            InputResult::CycleEventFilter => {
                if app.view == View::Agents {
                    app.event_filter = app.next_event_filter();
                    app.events_page = 0;
                    controller.set_events_page(0, app.event_filter.clone());
                }
            }
            InputResult::ClearEventFilter => {
                if app.view == View::Agents && app.event_filter.is_some() {
                    app.event_filter = None;
                    app.events_page = 0;
                    controller.set_events_page(0, None);
                }
            }
            InputResult::Continue => {}
        }

        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    Ok(())
}

fn apply_page_change(controller: &ViewController, app: &App, page: u64) {
    match app.view {
        View::Overview => controller.set_transactions_page(page),
        View::Agents => controller.set_events_page(page, app.event_filter.clone()),
    }
}

/// One-shot probe: run both view cycles and report each feed's provenance.
async fn run_check(provider: Arc<dyn FeedProvider>, config: &Config) -> anyhow::Result<()> {
    let (update_tx, mut update_rx) = mpsc::unbounded_channel::<TuiUpdate>();
    let paging = controller::Paging {
        transactions: chainboard::PageRequest::for_page(0, config.page_size),
        events: chainboard::PageRequest::for_page(0, config.page_size),
        event_filter: None,
        task_filter: None,
    };

    controller::run_overview_cycle(&provider, &update_tx, &paging, config.block_window).await;
    controller::run_agents_cycle(&provider, &update_tx, &paging).await;
    drop(update_tx);

    let mut degraded = 0u32;
    while let Some(update) = update_rx.recv().await {
        let (feed, provenance, count, total) = match &update {
            TuiUpdate::Transactions(s) => (
                "transactions",
                s.provenance,
                s.records.len(),
                s.total,
            ),
            TuiUpdate::Blocks(s) => ("blocks", s.provenance, s.records.len(), s.total),
            TuiUpdate::Events(s) => ("events", s.provenance, s.records.len(), s.total),
            TuiUpdate::Agents(s) => ("agents", s.provenance, s.records.len(), s.total),
            TuiUpdate::Tasks(s) => ("tasks", s.provenance, s.records.len(), s.total),
            TuiUpdate::Stats(card) => {
                ("stats", card.provenance, 1, card.summary.block_height)
            }
            TuiUpdate::CycleFinished { .. } => continue,
        };
        if provenance == chainboard::Provenance::Fallback {
            degraded += 1;
        }
        println!("{:<14} {:<10} {:>5} records  {:>8} total", feed, provenance.as_str(), count, total);
    }

    if degraded > 0 {
        anyhow::bail!("{degraded} feed(s) fell back to placeholder data");
    }
    println!("all feeds live or legitimately empty");
    Ok(())
}
