//! Dashboard TUI
//!
//! Architecture:
//! - UI layer: rendering, keyboard input
//! - Data layer: view controller cycles run independently, send updates via
//!   channel
//! - TuiUpdate: message enum bridging controller tasks -> TUI
//!
//! The render loop never fetches. It applies whatever snapshots the
//! controller sends, records each feed's degradation flag, and shows a single
//! generic advisory banner when the active view has any feed in fallback.

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event as TermEvent, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block as UiBlock, Borders, Paragraph, Row, Table},
    Frame, Terminal,
};

use chainboard::{
    Agent, Block, Event, EventFilter, FeedKind, FeedSnapshot, PageRequest, StatsCard, TaskRecord,
    TaskStatus, Transaction, ViewHealth,
};

use crate::display::{format_age, format_amount, format_timestamp, shorten_hash};

/// Which screen is active. Each view has its own refresh cadence and its own
/// health aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Overview,
    Agents,
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Overview => "overview",
            View::Agents => "agents",
        }
    }
}

/// Messages sent from controller tasks to the TUI.
#[derive(Debug, Clone)]
pub enum TuiUpdate {
    Transactions(FeedSnapshot<Transaction>),
    Blocks(FeedSnapshot<Block>),
    Events(FeedSnapshot<Event>),
    Stats(StatsCard),
    Agents(FeedSnapshot<Agent>),
    Tasks(FeedSnapshot<TaskRecord>),
    /// A full cycle for a view finished; refreshes the "updated" stamp.
    CycleFinished { view: View },
}

/// What the input handler asked the main loop to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResult {
    Continue,
    Quit,
    SwitchView(View),
    Refresh,
    PageNext,
    PagePrev,
    CycleTaskFilter,
    CycleEventFilter,
    ClearEventFilter,
}

/// App state for the TUI. Fully replaced per feed per cycle; no incremental
/// merge across cycles.
pub struct App {
    pub running: bool,
    pub view: View,
    pub backend_name: String,
    pub page_size: u64,

    // Reconciled snapshots, one per feed
    pub transactions: FeedSnapshot<Transaction>,
    pub blocks: FeedSnapshot<Block>,
    pub events: FeedSnapshot<Event>,
    pub stats: StatsCard,
    pub agents: FeedSnapshot<Agent>,
    pub tasks: FeedSnapshot<TaskRecord>,

    // Aggregate degradation per view
    pub overview_health: ViewHealth,
    pub agents_health: ViewHealth,

    // Pagination cursors (zero-based pages)
    pub tx_page: u64,
    pub events_page: u64,
    pub task_filter: Option<TaskStatus>,
    pub event_filter: Option<EventFilter>,

    pub last_refresh: Option<Instant>,
}

impl App {
    pub fn new(backend_url: &str, page_size: u64) -> Self {
        // Short display name from the backend URL
        let backend_name = backend_url
            .trim_start_matches("http://")
            .trim_start_matches("https://")
            .trim_end_matches('/')
            .to_string();

        Self {
            running: true,
            view: View::Overview,
            backend_name,
            page_size,
            transactions: FeedSnapshot::initial(),
            blocks: FeedSnapshot::initial(),
            events: FeedSnapshot::initial(),
            stats: StatsCard::initial(),
            agents: FeedSnapshot::initial(),
            tasks: FeedSnapshot::initial(),
            overview_health: ViewHealth::new(),
            agents_health: ViewHealth::new(),
            tx_page: 0,
            events_page: 0,
            task_filter: None,
            event_filter: None,
            last_refresh: None,
        }
    }

    /// Apply a TuiUpdate message from a controller task.
    pub fn apply_update(&mut self, update: TuiUpdate) {
        match update {
            TuiUpdate::Transactions(snapshot) => {
                self.overview_health
                    .record(FeedKind::Transactions, snapshot.is_degraded());
                self.transactions = snapshot;
            }
            TuiUpdate::Blocks(snapshot) => {
                self.overview_health
                    .record(FeedKind::Blocks, snapshot.is_degraded());
                self.blocks = snapshot;
            }
            TuiUpdate::Stats(card) => {
                self.overview_health
                    .record(FeedKind::Stats, card.is_degraded());
                self.stats = card;
            }
            TuiUpdate::Events(snapshot) => {
                self.agents_health
                    .record(FeedKind::Events, snapshot.is_degraded());
                self.events = snapshot;
            }
            TuiUpdate::Agents(snapshot) => {
                self.agents_health
                    .record(FeedKind::Agents, snapshot.is_degraded());
                self.agents = snapshot;
            }
            TuiUpdate::Tasks(snapshot) => {
                self.agents_health
                    .record(FeedKind::Tasks, snapshot.is_degraded());
                self.tasks = snapshot;
            }
            TuiUpdate::CycleFinished { view } => {
                if view == self.view {
                    self.last_refresh = Some(Instant::now());
                }
            }
        }
    }

    /// Health aggregate of the active view.
    pub fn active_health(&self) -> &ViewHealth {
        match self.view {
            View::Overview => &self.overview_health,
            View::Agents => &self.agents_health,
        }
    }

    pub fn tx_page_count(&self) -> u64 {
        PageRequest::for_page(self.tx_page, self.page_size).page_count(self.transactions.total)
    }

    pub fn events_page_count(&self) -> u64 {
        PageRequest::for_page(self.events_page, self.page_size).page_count(self.events.total)
    }

    /// Clamp a pagination cursor against the latest total. Returns the new
    /// page if it moved.
    pub fn next_page(&mut self) -> Option<u64> {
        match self.view {
            View::Overview => {
                let count = self.tx_page_count();
                if self.tx_page + 1 < count {
                    self.tx_page += 1;
                    Some(self.tx_page)
                } else {
                    None
                }
            }
            View::Agents => {
                let count = self.events_page_count();
                if self.events_page + 1 < count {
                    self.events_page += 1;
                    Some(self.events_page)
                } else {
                    None
                }
            }
        }
    }

    /// Next events agent filter, cycling through the agents currently
    /// listed: all -> first agent -> ... -> last agent -> all. A filter
    /// naming an agent that dropped off the list restarts at the first.
    pub fn next_event_filter(&self) -> Option<EventFilter> {
        let current = self
            .event_filter
            .as_ref()
            .and_then(|f| f.agent_id.as_deref());
        let ids: Vec<&str> = self.agents.records.iter().map(|a| a.id.as_str()).collect();
        let next = match current {
            None => ids.first().copied(),
            Some(id) => match ids.iter().position(|&i| i == id) {
                Some(pos) => ids.get(pos + 1).copied(),
                None => ids.first().copied(),
            },
        };
        next.map(|id| EventFilter {
            agent_id: Some(id.to_string()),
        })
    }

    /// Header connectivity indicator: healthy while the active view has no
    /// feed in fallback.
    pub fn connection_ok(&self) -> bool {
        !self.active_health().banner_visible()
    }

    pub fn prev_page(&mut self) -> Option<u64> {
        match self.view {
            View::Overview => {
                if self.tx_page > 0 {
                    self.tx_page -= 1;
                    Some(self.tx_page)
                } else {
                    None
                }
            }
            View::Agents => {
                if self.events_page > 0 {
                    self.events_page -= 1;
                    Some(self.events_page)
                } else {
                    None
                }
            }
        }
    }
}

// =============================================================================
// Terminal Management
// =============================================================================

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

pub fn init() -> io::Result<Tui> {
    execute!(io::stdout(), EnterAlternateScreen)?;
    enable_raw_mode()?;
    Terminal::new(CrosstermBackend::new(io::stdout()))
}

pub fn restore() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

// =============================================================================
// Main Draw Function
// =============================================================================

pub fn draw(frame: &mut Frame, app: &App) {
    match app.view {
        View::Overview => draw_overview(frame, app),
        View::Agents => draw_agents(frame, app),
    }
}

fn draw_overview(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header
            Constraint::Length(1), // Advisory banner
            Constraint::Length(3), // Stats cards
            Constraint::Min(6),    // Latest blocks
            Constraint::Min(6),    // Transactions
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], app);
    draw_banner(frame, chunks[1], app);
    draw_stats_cards(frame, chunks[2], app);
    draw_blocks_table(frame, chunks[3], app);
    draw_transactions_table(frame, chunks[4], app);
}

fn draw_agents(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header
            Constraint::Length(1), // Advisory banner
            Constraint::Min(5),    // Agents
            Constraint::Min(5),    // Tasks
            Constraint::Min(5),    // Events
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], app);
    draw_banner(frame, chunks[1], app);
    draw_agents_table(frame, chunks[2], app);
    draw_tasks_table(frame, chunks[3], app);
    draw_events_table(frame, chunks[4], app);
}

// =============================================================================
// Header & Banner
// =============================================================================

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    // The indicator tracks the active view's health, not the stats card:
    // stats only refresh on the overview cycle and would go stale here.
    let connected = app.connection_ok();
    let refreshed = app
        .last_refresh
        .map(|t| format!("{}s ago", t.elapsed().as_secs()))
        .unwrap_or_else(|| "never".to_string());

    let line1 = Line::from(vec![
        Span::styled("  CHAINBOARD ", Style::default().fg(Color::Magenta).bold()),
        Span::styled("| ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("View: {} ", app.view.as_str()),
            Style::default().fg(Color::White),
        ),
        Span::styled("| ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("Backend: {} ", app.backend_name),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled("| ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            if connected { "online " } else { "degraded " },
            if connected {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Yellow).bold()
            },
        ),
    ]);

    let line2 = Line::from(vec![
        Span::styled(
            format!("  Updated: {} ", refreshed),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled("| ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            "Tab:view r:refresh <-/->:page f:task-filter e:event-filter a:all-events q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let block = UiBlock::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    frame.render_widget(Paragraph::new(vec![line1, line2]).block(block), area);
}

/// One generic advisory line. Visible only when at least one of the active
/// view's feeds fell back this cycle; never names the feeds.
fn draw_banner(frame: &mut Frame, area: Rect, app: &App) {
    let health = app.active_health();
    if !health.banner_visible() {
        return;
    }
    let line = Line::from(Span::styled(
        format!("  ! {}", health.advisory()),
        Style::default().fg(Color::Yellow).bold(),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

// =============================================================================
// Overview Sections
// =============================================================================

fn draw_stats_cards(frame: &mut Frame, area: Rect, app: &App) {
    let stats = &app.stats.summary;
    let cards: [(&str, String); 5] = [
        ("Height", stats.block_height.to_string()),
        ("Transactions", stats.total_transactions.to_string()),
        ("Active Agents", stats.active_agents.to_string()),
        ("Pending Tasks", stats.pending_tasks.to_string()),
        ("Events 24h", stats.events_24h.to_string()),
    ];

    let areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 5); 5])
        .split(area);

    let value_style = if stats.connected {
        Style::default().fg(Color::White).bold()
    } else {
        Style::default().fg(Color::DarkGray)
    };

    for (i, (title, value)) in cards.iter().enumerate() {
        let block = UiBlock::default()
            .title(format!(" {} ", title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let paragraph = Paragraph::new(value.clone())
            .style(value_style)
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(paragraph, areas[i]);
    }
}

fn draw_blocks_table(frame: &mut Frame, area: Rect, app: &App) {
    let title = section_title("Latest Blocks", app.blocks.records.len() as u64, None);
    let block = bordered(&title);

    if app.blocks.is_empty() {
        frame.render_widget(empty_state("No blocks found").block(block), area);
        return;
    }

    let header = Row::new(vec!["Height", "Hash", "Txs", "Proposer", "Age"])
        .style(Style::default().fg(Color::Cyan).bold());
    let rows: Vec<Row> = app
        .blocks
        .records
        .iter()
        .map(|b| {
            Row::new(vec![
                b.height.to_string(),
                shorten_hash(&b.hash),
                b.tx_count.to_string(),
                shorten_hash(&b.proposer),
                format_age(b.timestamp),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(20),
            Constraint::Length(6),
            Constraint::Length(20),
            Constraint::Min(8),
        ],
    )
    .header(header)
    .block(block);

    frame.render_widget(table, area);
}

fn draw_transactions_table(frame: &mut Frame, area: Rect, app: &App) {
    let pages = app.tx_page_count();
    let title = section_title(
        "Transactions",
        app.transactions.total,
        Some((app.tx_page, pages)),
    );
    let block = bordered(&title);

    if app.transactions.is_empty() {
        frame.render_widget(empty_state("No transactions found").block(block), area);
        return;
    }

    let header = Row::new(vec!["Hash", "From", "To", "Amount", "Status", "Time"])
        .style(Style::default().fg(Color::Cyan).bold());
    let rows: Vec<Row> = app
        .transactions
        .records
        .iter()
        .map(|tx| {
            let status_style = match tx.status {
                chainboard::TxStatus::Confirmed => Style::default().fg(Color::Green),
                chainboard::TxStatus::Pending => Style::default().fg(Color::Yellow),
                chainboard::TxStatus::Failed => Style::default().fg(Color::Red),
            };
            Row::new(vec![
                Span::raw(shorten_hash(&tx.hash)),
                Span::raw(shorten_hash(&tx.from)),
                Span::raw(shorten_hash(&tx.to)),
                Span::raw(format_amount(tx.amount)),
                Span::styled(tx.status.as_str(), status_style),
                Span::raw(format_timestamp(tx.timestamp)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(20),
            Constraint::Length(20),
            Constraint::Length(20),
            Constraint::Length(14),
            Constraint::Length(10),
            Constraint::Min(16),
        ],
    )
    .header(header)
    .block(block);

    frame.render_widget(table, area);
}

// =============================================================================
// Agents Sections
// =============================================================================

fn draw_agents_table(frame: &mut Frame, area: Rect, app: &App) {
    let title = section_title("Agents", app.agents.total, None);
    let block = bordered(&title);

    if app.agents.is_empty() {
        frame.render_widget(empty_state("No agents found").block(block), area);
        return;
    }

    let header = Row::new(vec!["Name", "Address", "Status", "Done", "Last Seen"])
        .style(Style::default().fg(Color::Cyan).bold());
    let rows: Vec<Row> = app
        .agents
        .records
        .iter()
        .map(|a| {
            let status_style = match a.status {
                chainboard::AgentStatus::Active => Style::default().fg(Color::Green),
                chainboard::AgentStatus::Idle => Style::default().fg(Color::Yellow),
                chainboard::AgentStatus::Offline => Style::default().fg(Color::DarkGray),
            };
            Row::new(vec![
                Span::raw(a.name.clone()),
                Span::raw(shorten_hash(&a.address)),
                Span::styled(a.status.as_str(), status_style),
                Span::raw(a.tasks_completed.to_string()),
                Span::raw(format_age(a.last_seen)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(14),
            Constraint::Length(20),
            Constraint::Length(9),
            Constraint::Length(6),
            Constraint::Min(8),
        ],
    )
    .header(header)
    .block(block);

    frame.render_widget(table, area);
}

fn draw_tasks_table(frame: &mut Frame, area: Rect, app: &App) {
    let filter = app
        .task_filter
        .map(|s| s.as_str())
        .unwrap_or("all");
    let title = format!(" Tasks [{}] ({} total) ", filter, app.tasks.total);
    let block = bordered(&title);

    if app.tasks.is_empty() {
        frame.render_widget(empty_state("No tasks found").block(block), area);
        return;
    }

    let header = Row::new(vec!["Task", "Agent", "Description", "Status", "Updated"])
        .style(Style::default().fg(Color::Cyan).bold());
    let rows: Vec<Row> = app
        .tasks
        .records
        .iter()
        .map(|t| {
            let status_style = match t.status {
                TaskStatus::Completed => Style::default().fg(Color::Green),
                TaskStatus::Running => Style::default().fg(Color::Cyan),
                TaskStatus::Pending => Style::default().fg(Color::Yellow),
                TaskStatus::Failed => Style::default().fg(Color::Red),
            };
            Row::new(vec![
                Span::raw(t.id.clone()),
                Span::raw(t.agent_id.clone()),
                Span::raw(t.description.clone()),
                Span::styled(t.status.as_str(), status_style),
                Span::raw(format_age(t.updated_at)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(14),
            Constraint::Length(10),
            Constraint::Min(20),
            Constraint::Length(10),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(block);

    frame.render_widget(table, area);
}

fn draw_events_table(frame: &mut Frame, area: Rect, app: &App) {
    let pages = app.events_page_count();
    let mut title = section_title("Events", app.events.total, Some((app.events_page, pages)));
    if let Some(filter) = app.event_filter.as_ref().and_then(|f| f.agent_id.as_deref()) {
        title = format!(" Events [{}] ({} total) ", filter, app.events.total);
    }
    let block = bordered(&title);

    if app.events.is_empty() {
        frame.render_widget(empty_state("No events found").block(block), area);
        return;
    }

    let header = Row::new(vec!["Event", "Agent", "Kind", "Message", "Time"])
        .style(Style::default().fg(Color::Cyan).bold());
    let rows: Vec<Row> = app
        .events
        .records
        .iter()
        .map(|e| {
            Row::new(vec![
                e.id.clone(),
                e.agent_id.clone(),
                e.kind.clone(),
                e.message.clone(),
                format_timestamp(e.timestamp),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(14),
            Constraint::Length(10),
            Constraint::Length(16),
            Constraint::Min(20),
            Constraint::Length(18),
        ],
    )
    .header(header)
    .block(block);

    frame.render_widget(table, area);
}

// =============================================================================
// Widget Helpers
// =============================================================================

fn section_title(name: &str, total: u64, page: Option<(u64, u64)>) -> String {
    match page {
        Some((page, pages)) => format!(
            " {} (page {}/{}, {} total) ",
            name,
            page + 1,
            pages.max(1),
            total
        ),
        None => format!(" {} ({} total) ", name, total),
    }
}

fn bordered(title: &str) -> UiBlock<'static> {
    UiBlock::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
}

fn empty_state(message: &str) -> Paragraph<'static> {
    Paragraph::new(message.to_string())
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
}

// =============================================================================
// Input Handling
// =============================================================================

/// Handle keyboard input (non-blocking poll).
pub fn handle_input(app: &App) -> io::Result<InputResult> {
    if event::poll(Duration::from_millis(50))? {
        if let TermEvent::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => InputResult::Quit,
                    KeyCode::Tab => InputResult::SwitchView(match app.view {
                        View::Overview => View::Agents,
                        View::Agents => View::Overview,
                    }),
                    KeyCode::Char('1') => InputResult::SwitchView(View::Overview),
                    KeyCode::Char('2') => InputResult::SwitchView(View::Agents),
                    KeyCode::Char('r') => InputResult::Refresh,
                    KeyCode::Right | KeyCode::Char('n') => InputResult::PageNext,
                    KeyCode::Left | KeyCode::Char('p') => InputResult::PagePrev,
                    KeyCode::Char('f') => InputResult::CycleTaskFilter,
                    KeyCode::Char('e') => InputResult::CycleEventFilter,
                    KeyCode::Char('a') => InputResult::ClearEventFilter,
                    _ => InputResult::Continue,
                });
            }
        }
    }
    Ok(InputResult::Continue)
}
