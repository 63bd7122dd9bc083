pub mod config;
pub mod export;
pub mod grid;
pub mod history;
pub mod legend;
pub mod reassign;
pub mod runtime;
pub mod schedule;
pub mod slots;
pub mod store;
pub mod theme;
pub mod ui;

use crate::{
    config::{FileGridConfigStore, GridConfigStore},
    grid::{build_grid, resolve_origin, Cell},
    history::{MoveLog, MoveRecord},
    reassign::{MoveRequest, MoveState},
    runtime::{
        AppEvent, AppEventSource, CrosstermEventSource, FixedTicker, MoveSettled, Runner, Ticker,
    },
    schedule::Schedule,
    slots::{Day, GridConfig, TimeSlot},
    store::{FileScheduleStore, ScheduleStore},
};
use chrono::Local;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    collections::HashMap,
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    sync::{mpsc::Sender, Arc},
    time::Duration,
};

const TICK_RATE_MS: u64 = 100;
const NOTICE_TICKS: u16 = 40;
const HISTORY_PAGE: usize = 200;

/// terminal timetable grid with interactive class reassignment
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Renders a generated weekly timetable as a day/slot grid, with a two-step \
move interaction (select a class, then an empty destination slot), a course legend, and a \
local history of every reassignment."
)]
pub struct Cli {
    /// timetable export (JSON) to display
    schedule: PathBuf,

    /// start with edit mode enabled
    #[clap(short, long)]
    edit: bool,

    /// restrict the view to a single section id
    #[clap(short, long)]
    section: Option<String>,

    /// grid title (overrides the export's timetable name)
    #[clap(short, long)]
    title: Option<String>,

    /// alternative grid configuration file (slot axis + lunch bounds)
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// write the grid as CSV to PATH and exit (no terminal needed)
    #[clap(long, value_name = "PATH")]
    export_csv: Option<PathBuf>,

    /// do not record moves to the local history log
    #[clap(long)]
    no_history: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Grid,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

/// Transient status-line message, the TUI stand-in for a toast.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    pub ttl: u16,
}

impl Notice {
    fn new(kind: NoticeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            ttl: NOTICE_TICKS,
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::Info, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::Error, text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cursor {
    pub day: usize,
    pub slot: usize,
}

#[derive(Debug, Default)]
pub struct HistoryView {
    pub scroll_offset: usize,
    pub rows: Vec<MoveRecord>,
}

pub struct App {
    pub schedule: Schedule,
    pub title: Option<String>,
    pub grid_config: GridConfig,
    pub edit_mode: bool,
    pub move_state: MoveState,
    pub cursor: Cursor,
    pub session_cycle: usize,
    pub notice: Option<Notice>,
    pub state: AppState,
    pub history_view: HistoryView,
    /// Classes with a dispatched but unsettled move, keyed by class id and
    /// holding the origin (day, slot key) for the history log.
    pub in_flight: HashMap<String, (String, String)>,
    /// Bumped on every schedule (re)load; settled moves dispatched under an
    /// older epoch no longer drive notices or reloads.
    pub epoch: u64,
    title_override: Option<String>,
    armed_from: Option<(String, String)>,
    store: Arc<dyn ScheduleStore>,
    move_log: Option<MoveLog>,
}

impl App {
    pub fn new(
        loaded: store::LoadedTimetable,
        grid_config: GridConfig,
        edit_mode: bool,
        title_override: Option<String>,
        store: Arc<dyn ScheduleStore>,
        move_log: Option<MoveLog>,
    ) -> Self {
        Self {
            title: title_override.clone().or(loaded.title),
            schedule: loaded.schedule,
            grid_config,
            edit_mode,
            move_state: MoveState::default(),
            cursor: Cursor::default(),
            session_cycle: 0,
            notice: None,
            state: AppState::Grid,
            history_view: HistoryView::default(),
            in_flight: HashMap::new(),
            epoch: 0,
            title_override,
            armed_from: None,
            store,
            move_log,
        }
    }

    pub fn store_handle(&self) -> Arc<dyn ScheduleStore> {
        Arc::clone(&self.store)
    }

    /// Re-fetch the schedule from the store. Bumps the epoch so completions
    /// dispatched against the previous snapshot are treated as stale.
    pub fn reload(&mut self) -> bool {
        match self.store.load() {
            Ok(loaded) => {
                self.schedule = loaded.schedule;
                if self.title_override.is_none() {
                    self.title = loaded.title;
                }
                self.epoch += 1;
                self.clamp_cursor();
                true
            }
            Err(e) => {
                self.notice = Some(Notice::error(format!("Reload failed: {}", e)));
                false
            }
        }
    }

    pub fn move_cursor(&mut self, d_day: isize, d_slot: isize) {
        let days = Day::ALL.len() as isize;
        let slots = self.grid_config.slots.len() as isize;
        if slots == 0 {
            return;
        }
        let day = (self.cursor.day as isize + d_day).clamp(0, days - 1);
        let slot = (self.cursor.slot as isize + d_slot).clamp(0, slots - 1);
        self.cursor = Cursor {
            day: day as usize,
            slot: slot as usize,
        };
        self.session_cycle = 0;
    }

    fn clamp_cursor(&mut self) {
        let slots = self.grid_config.slots.len();
        if slots > 0 && self.cursor.slot >= slots {
            self.cursor.slot = slots - 1;
        }
    }

    pub fn cycle_session(&mut self) {
        self.session_cycle = self.session_cycle.wrapping_add(1);
    }

    pub fn toggle_edit(&mut self) {
        self.edit_mode = !self.edit_mode;
        if !self.edit_mode {
            self.move_state.cancel();
            self.armed_from = None;
        }
        self.notice = Some(Notice::info(if self.edit_mode {
            "Edit mode enabled"
        } else {
            "Edit mode disabled"
        }));
    }

    /// Esc: drop an armed selection. Returns false when nothing was armed
    /// (the caller then treats Esc as quit).
    pub fn cancel_selection(&mut self) -> bool {
        if self.move_state.cancel() {
            self.armed_from = None;
            self.notice = Some(Notice::info("Selection cancelled"));
            true
        } else {
            false
        }
    }

    /// The "click" on the cursor cell: first click arms the highlighted
    /// session, second click on an empty slot yields the move request the
    /// caller dispatches in the background.
    pub fn activate(&mut self) -> Option<MoveRequest> {
        let rows = build_grid(&self.schedule, &self.grid_config);
        let row = rows.get(self.cursor.day)?;
        let origin = resolve_origin(row, self.cursor.slot);
        let day = row.day;
        let slot = *self.grid_config.slots.get(origin)?;

        match &row.cells[origin] {
            Cell::Content { sessions, .. } => {
                let session = sessions[self.session_cycle % sessions.len()].clone();
                if self.in_flight.contains_key(&session.class_id) {
                    self.notice = Some(Notice::error(format!(
                        "{} already has a move in flight",
                        session.course
                    )));
                    return None;
                }
                match self.move_state.session_click(&session, self.edit_mode) {
                    Ok(()) => {
                        self.armed_from = Some((day.to_string(), slot.to_string()));
                        self.notice = Some(Notice::success(format!(
                            "Selected {}. Now pick an empty slot to move it.",
                            session.course
                        )));
                    }
                    Err(rejection) => {
                        self.notice = Some(Notice::error(rejection.to_string()));
                    }
                }
                None
            }
            Cell::Lunch | Cell::Empty | Cell::Skip => {
                match self.move_state.slot_click(
                    day,
                    &slot,
                    &self.schedule,
                    &self.grid_config,
                    self.edit_mode,
                ) {
                    Ok(Some(request)) => {
                        let origin = self.armed_from.take().unwrap_or_default();
                        self.in_flight.insert(request.class_id.clone(), origin);
                        self.notice = Some(Notice::info(format!(
                            "Moving {} to {} {}…",
                            request.course,
                            request.day,
                            request.slot.label()
                        )));
                        Some(request)
                    }
                    Ok(None) => None,
                    Err(rejection) => {
                        self.notice = Some(Notice::error(rejection.to_string()));
                        None
                    }
                }
            }
        }
    }

    /// A background move settled. Always recorded to the history log;
    /// notices and the follow-up reload only apply when the view has not
    /// been reloaded since the dispatch.
    pub fn on_move_settled(&mut self, settled: MoveSettled) {
        let origin = self
            .in_flight
            .remove(&settled.request.class_id)
            .unwrap_or_default();

        if let Some(log) = &self.move_log {
            let record = MoveRecord {
                class_id: settled.request.class_id.clone(),
                course: settled.request.course.clone(),
                from_day: origin.0,
                from_slot: origin.1,
                to_day: settled.request.day.to_string(),
                to_slot: settled.request.slot.to_string(),
                ok: settled.result.is_ok(),
                error: settled.result.as_ref().err().cloned(),
                timestamp: Local::now(),
            };
            let _ = log.record(&record);
        }

        if settled.epoch != self.epoch {
            return;
        }

        match settled.result {
            Ok(()) => {
                self.notice = Some(Notice::success(format!(
                    "Moved {} to {} {}",
                    settled.request.course,
                    settled.request.day,
                    settled.request.slot.label()
                )));
                self.reload();
            }
            Err(e) => {
                self.notice = Some(Notice::error(format!(
                    "Failed to move {}: {}",
                    settled.request.course, e
                )));
            }
        }
    }

    /// Tick: age out the status notice. Returns true when a redraw is due.
    pub fn on_tick(&mut self) -> bool {
        if let Some(notice) = &mut self.notice {
            notice.ttl = notice.ttl.saturating_sub(1);
            if notice.ttl == 0 {
                self.notice = None;
                return true;
            }
        }
        false
    }

    pub fn open_history(&mut self) {
        match &self.move_log {
            Some(log) => match log.recent(HISTORY_PAGE) {
                Ok(rows) => {
                    self.history_view = HistoryView {
                        scroll_offset: 0,
                        rows,
                    };
                    self.state = AppState::History;
                }
                Err(e) => {
                    self.notice = Some(Notice::error(format!("History unavailable: {}", e)));
                }
            },
            None => {
                self.notice = Some(Notice::error("History log is disabled"));
            }
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let grid_config = match &cli.config {
        Some(path) => FileGridConfigStore::with_path(path).load(),
        None => FileGridConfigStore::new().load(),
    };
    let store = FileScheduleStore::new(&cli.schedule, cli.section.clone(), grid_config.clone());

    if let Some(path) = &cli.export_csv {
        let loaded = store.load()?;
        export::export_to_path(path, &loaded.schedule, &grid_config)?;
        println!("wrote {}", path.display());
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let loaded = store.load()?;
    let move_log = if cli.no_history {
        None
    } else {
        MoveLog::new().ok()
    };
    let mut app = App::new(
        loaded,
        grid_config,
        cli.edit,
        cli.title.clone(),
        Arc::new(store),
        move_log,
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    start_tui(&mut terminal, &mut app, &runner)?;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}

#[derive(Debug, PartialEq)]
enum Flow {
    Continue,
    Quit,
}

fn start_tui<B: Backend, E: AppEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    let tx = runner.sender();
    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            AppEvent::Tick => {
                if app.on_tick() {
                    terminal.draw(|f| ui(app, f))?;
                }
            }
            AppEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            AppEvent::MoveSettled(settled) => {
                app.on_move_settled(settled);
                terminal.draw(|f| ui(app, f))?;
            }
            AppEvent::Key(key) => {
                if handle_key(app, key, &tx) == Flow::Quit {
                    break;
                }
                terminal.draw(|f| ui(app, f))?;
            }
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent, tx: &Sender<AppEvent>) -> Flow {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Flow::Quit;
    }

    match app.state {
        AppState::Grid => match key.code {
            KeyCode::Esc => {
                if app.cancel_selection() {
                    Flow::Continue
                } else {
                    Flow::Quit
                }
            }
            KeyCode::Char('q') => Flow::Quit,
            KeyCode::Char('e') => {
                app.toggle_edit();
                Flow::Continue
            }
            KeyCode::Left | KeyCode::Char('h') => {
                app.move_cursor(0, -1);
                Flow::Continue
            }
            KeyCode::Right | KeyCode::Char('l') => {
                app.move_cursor(0, 1);
                Flow::Continue
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.move_cursor(-1, 0);
                Flow::Continue
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.move_cursor(1, 0);
                Flow::Continue
            }
            KeyCode::Tab => {
                app.cycle_session();
                Flow::Continue
            }
            KeyCode::Enter => {
                if let Some(request) = app.activate() {
                    dispatch_move(app, request, tx.clone());
                }
                Flow::Continue
            }
            KeyCode::Char('r') => {
                if app.reload() {
                    app.notice = Some(Notice::info("Schedule reloaded"));
                }
                Flow::Continue
            }
            KeyCode::Char('m') => {
                app.open_history();
                Flow::Continue
            }
            _ => Flow::Continue,
        },
        AppState::History => match key.code {
            KeyCode::Char('q') => Flow::Quit,
            KeyCode::Esc | KeyCode::Char('b') | KeyCode::Backspace => {
                app.state = AppState::Grid;
                Flow::Continue
            }
            KeyCode::Up => {
                app.history_view.scroll_offset = app.history_view.scroll_offset.saturating_sub(1);
                Flow::Continue
            }
            KeyCode::Down => {
                app.history_view.scroll_offset += 1;
                Flow::Continue
            }
            KeyCode::PageUp => {
                app.history_view.scroll_offset = app.history_view.scroll_offset.saturating_sub(10);
                Flow::Continue
            }
            KeyCode::PageDown => {
                app.history_view.scroll_offset += 10;
                Flow::Continue
            }
            KeyCode::Home => {
                app.history_view.scroll_offset = 0;
                Flow::Continue
            }
            _ => Flow::Continue,
        },
    }
}

/// Fire-and-forget: the update runs on its own thread and reports back
/// through the event channel. The grid stays interactive meanwhile.
fn dispatch_move(app: &App, request: MoveRequest, tx: Sender<AppEvent>) {
    let store = app.store_handle();
    let epoch = app.epoch;
    std::thread::spawn(move || {
        let result = store
            .update_slot(&request.class_id, request.day, &request.slot)
            .map_err(|e| e.to_string());
        let _ = tx.send(AppEvent::MoveSettled(MoveSettled {
            epoch,
            request,
            result,
        }));
    });
}

fn render_history(app: &mut App, f: &mut Frame) {
    use ratatui::{
        layout::{Alignment, Constraint, Direction, Layout},
        style::{Color, Modifier, Style},
        widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    };

    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Move table
            Constraint::Length(3), // Instructions
        ])
        .split(area);

    let title = Paragraph::new(format!("Move history ({} attempts)", app.history_view.rows.len()))
        .block(Block::default().borders(Borders::ALL).title("History"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    if app.history_view.rows.is_empty() {
        let no_data = Paragraph::new("No moves recorded yet.\nRelocate a class to see it here!")
            .block(Block::default().borders(Borders::ALL).title("No Data"))
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center);
        f.render_widget(no_data, chunks[1]);
    } else {
        let table_height = chunks[1].height.saturating_sub(3) as usize;
        let total_rows = app.history_view.rows.len();
        let max_scroll = total_rows.saturating_sub(table_height);
        if app.history_view.scroll_offset > max_scroll {
            app.history_view.scroll_offset = max_scroll;
        }

        let header = Row::new(vec!["When", "Class", "From", "To", "Result"]).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        let now = Local::now().timestamp();
        let visible_rows: Vec<Row> = app
            .history_view
            .rows
            .iter()
            .skip(app.history_view.scroll_offset)
            .take(table_height)
            .map(|rec| {
                let age = age_label(now - rec.timestamp.timestamp());
                let (result, style) = match &rec.error {
                    None => ("ok".to_string(), Style::default().fg(Color::Green)),
                    Some(e) => (e.clone(), Style::default().fg(Color::Red)),
                };
                Row::new(vec![
                    Cell::from(age),
                    Cell::from(rec.course.clone()),
                    Cell::from(place_label(&rec.from_day, &rec.from_slot)),
                    Cell::from(place_label(&rec.to_day, &rec.to_slot)),
                    Cell::from(result).style(style),
                ])
            })
            .collect();

        let scroll_info = if total_rows > table_height {
            format!(
                " ({}/{} rows)",
                app.history_view.scroll_offset + visible_rows.len().min(table_height),
                total_rows
            )
        } else {
            String::new()
        };

        let table = Table::new(
            visible_rows,
            &[
                Constraint::Length(18),
                Constraint::Length(24),
                Constraint::Length(24),
                Constraint::Length(24),
                Constraint::Min(12),
            ],
        )
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Reassignments{}", scroll_info)),
        );
        f.render_widget(table, chunks[1]);
    }

    let instructions = Paragraph::new("↑/↓ PgUp/PgDn scroll | (b)ack | (q)uit")
        .block(Block::default().borders(Borders::ALL))
        .style(
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        )
        .alignment(Alignment::Center);
    f.render_widget(instructions, chunks[2]);
}

fn age_label(elapsed_secs: i64) -> String {
    match elapsed_secs {
        s if s < 60 => "just now".to_string(),
        s if s < 3600 => format!("{}m ago", s / 60),
        s if s < 86400 => format!("{}h ago", s / 3600),
        s => format!("{}d ago", s / 86400),
    }
}

fn place_label(day: &str, slot_key: &str) -> String {
    match slot_key.parse::<TimeSlot>() {
        Ok(slot) => format!("{} {}", day, slot.label()),
        Err(_) if day.is_empty() => "—".to_string(),
        Err(_) => day.to_string(),
    }
}

fn ui(app: &mut App, f: &mut Frame) {
    match app.state {
        AppState::Grid => {
            f.render_widget(&*app, f.area());
        }
        AppState::History => {
            render_history(app, f);
        }
    }
}
