// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use cidb_app::{
    AppCommand, AppEvent, AppMode, AppState, Car, CarColumn, CarDetails, CarId, Comment, Lookups,
    Picture, RemoteCollection, RowEditor, RowState, SyncReport, ToolbarAction,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::macros::format_description;
use tracing::{debug, info};

const STATUS_CLEAR_DELAY: Duration = Duration::from_secs(4);
const CONFIRM_TITLE: &str = "Update Records";
const CONFIRM_QUESTION: &str = "Are you sure you want to save your changes?";

/// Rows hanging off one car, as fetched for the details window.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RelatedRecords {
    pub comments: Vec<Comment>,
    pub pictures: Vec<Picture>,
}

pub trait AppRuntime {
    fn load_brands(&mut self, lookups: &mut Lookups) -> Result<()>;
    fn load_cars(&mut self, cars: &mut RemoteCollection<Car>) -> Result<()>;
    fn save_cars(&mut self, cars: &mut RemoteCollection<Car>) -> Result<SyncReport>;
    fn load_related(&mut self, car: CarId) -> Result<RelatedRecords>;
    fn confirm_before_save(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ViewData {
    cars: RemoteCollection<Car>,
    lookups: Lookups,
    editor: Option<RowEditor>,
    details: Option<CarDetails>,
    selected_col: usize,
    status_token: u64,
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    load_initial(state, runtime, &mut view_data, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

/// Brand lookup first so the maker editor has options, then the cars.
fn load_initial<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let mut problems = Vec::new();
    if let Err(error) = runtime.load_brands(&mut view_data.lookups) {
        problems.push(format!("maker list unavailable: {error:#}"));
    }
    match runtime.load_cars(&mut view_data.cars) {
        Ok(()) => info!(rows = view_data.cars.len(), "initial car load"),
        Err(error) => problems.push(format!("load failed: {error:#}")),
    }
    state.dispatch(AppCommand::RowsChanged(view_data.cars.len()));
    if !problems.is_empty() {
        emit_status(state, view_data, internal_tx, problems.join("; "));
    }
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_DELAY);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    bump_status_token(view_data, internal_tx);
}

fn bump_status_token(view_data: &mut ViewData, internal_tx: &Sender<InternalEvent>) {
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

/// Dispatches `command`; a status the state machine sets on its own gets the
/// same timed clear as [`emit_status`].
fn dispatch_with_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) -> Vec<AppEvent> {
    let events = state.dispatch(command);
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::StatusUpdated(_)))
    {
        bump_status_token(view_data, internal_tx);
    }
    events
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    match state.mode {
        AppMode::Help => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                state.dispatch(AppCommand::ToggleHelp);
            }
        }
        AppMode::ConfirmSave => handle_confirm_key(state, runtime, view_data, internal_tx, key),
        AppMode::RowEdit => handle_row_edit_key(state, view_data, internal_tx, key),
        AppMode::Details => handle_details_key(state, view_data, internal_tx, key),
        AppMode::Grid => handle_grid_key(state, runtime, view_data, internal_tx, key),
    }
    false
}

fn handle_grid_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => move_row(state, view_data, 1),
        KeyCode::Char('k') | KeyCode::Up => move_row(state, view_data, -1),
        KeyCode::Char('g') | KeyCode::Home => select_row(state, view_data, Some(0)),
        KeyCode::Char('G') | KeyCode::End => {
            select_row(state, view_data, view_data.cars.len().checked_sub(1));
        }
        KeyCode::Char('h') | KeyCode::Left => move_col(view_data, -1),
        KeyCode::Char('l') | KeyCode::Right => move_col(view_data, 1),
        KeyCode::Esc => select_row(state, view_data, None),
        KeyCode::Char('a') => add_car(state, view_data, internal_tx),
        KeyCode::Char('e') | KeyCode::Enter => {
            let column = CarColumn::from_index(view_data.selected_col).unwrap_or(CarColumn::Model);
            start_row_edit(state, view_data, internal_tx, column);
        }
        KeyCode::Char('o') => open_details(state, runtime, view_data, internal_tx),
        KeyCode::Char('d') => delete_selected(state, view_data, internal_tx),
        KeyCode::Char('s') => request_save(state, runtime, view_data, internal_tx),
        KeyCode::Char('r') => reload(state, runtime, view_data, internal_tx),
        KeyCode::Char('?') => {
            state.dispatch(AppCommand::ToggleHelp);
        }
        _ => {}
    }
}

fn select_row(state: &mut AppState, view_data: &ViewData, row: Option<usize>) {
    let row = row.filter(|row| *row < view_data.cars.len());
    state.dispatch(AppCommand::Select(row));
}

fn move_row(state: &mut AppState, view_data: &ViewData, delta: isize) {
    let len = view_data.cars.len();
    if len == 0 {
        select_row(state, view_data, None);
        return;
    }
    let next = match state.selected_row {
        Some(row) => (row as isize + delta).clamp(0, len as isize - 1) as usize,
        None if delta < 0 => len - 1,
        None => 0,
    };
    select_row(state, view_data, Some(next));
}

fn move_col(view_data: &mut ViewData, delta: isize) {
    let last = CarColumn::ALL.len() as isize - 1;
    view_data.selected_col = (view_data.selected_col as isize + delta).clamp(0, last) as usize;
}

fn start_row_edit(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    column: CarColumn,
) {
    let events = dispatch_with_status(state, view_data, internal_tx, AppCommand::StartRowEdit);
    if !events.contains(&AppEvent::ModeChanged(AppMode::RowEdit)) {
        return;
    }
    let Some(row) = state.selected_row else {
        state.dispatch(AppCommand::CancelRowEdit);
        return;
    };
    let Some(car) = view_data.cars.get(row) else {
        state.dispatch(AppCommand::CancelRowEdit);
        return;
    };
    view_data.editor = Some(RowEditor::start(row, car, column));
    view_data.selected_col = column.index();
}

fn add_car(state: &mut AppState, view_data: &mut ViewData, internal_tx: &Sender<InternalEvent>) {
    view_data.editor = None;
    let row = view_data.cars.insert(0, Car::phantom());
    state.dispatch(AppCommand::Select(Some(row)));
    start_row_edit(state, view_data, internal_tx, CarColumn::FIRST_EDIT);
    debug!(row, "phantom car added");
    emit_status(
        state,
        view_data,
        internal_tx,
        "new car added -- fill in the row and press enter",
    );
}

fn delete_selected(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(row) = state
        .selected_row
        .filter(|_| state.action_enabled(ToolbarAction::Delete))
    else {
        emit_status(state, view_data, internal_tx, "delete needs a selected car");
        return;
    };
    let phantom = view_data.cars.row_state(row) == Some(RowState::Phantom);
    let Some(removed) = view_data.cars.remove_at(row) else {
        return;
    };
    state.dispatch(AppCommand::RowsChanged(view_data.cars.len()));
    let message = if phantom {
        "discarded unsaved new car".to_owned()
    } else {
        format!("removed {} -- save to apply", car_label(&removed))
    };
    emit_status(state, view_data, internal_tx, message);
}

fn request_save<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    if runtime.confirm_before_save() {
        state.dispatch(AppCommand::AskSave);
    } else {
        perform_save(state, runtime, view_data, internal_tx);
    }
}

fn handle_confirm_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            let events = state.dispatch(AppCommand::ConfirmSave);
            if events.contains(&AppEvent::SaveConfirmed) {
                perform_save(state, runtime, view_data, internal_tx);
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            state.dispatch(AppCommand::CancelSave);
            emit_status(state, view_data, internal_tx, "save cancelled");
        }
        _ => {}
    }
}

/// Sync followed by a reload, so the grid ends up showing server state.
fn perform_save<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let message = match runtime.save_cars(&mut view_data.cars) {
        Ok(report) => match runtime.load_cars(&mut view_data.cars) {
            Ok(()) => format!("saved {}", plural(report.total(), "change")),
            Err(error) => format!(
                "saved {} but reload failed: {error:#}",
                plural(report.total(), "change")
            ),
        },
        Err(error) => format!("save failed: {error:#}"),
    };
    state.dispatch(AppCommand::RowsChanged(view_data.cars.len()));
    emit_status(state, view_data, internal_tx, message);
}

fn reload<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let discarded = view_data.cars.pending().total();
    let message = match runtime.load_cars(&mut view_data.cars) {
        Ok(()) if discarded > 0 => format!(
            "reloaded {}, discarded {}",
            plural(view_data.cars.len(), "car"),
            plural(discarded, "unsaved change")
        ),
        Ok(()) => format!("reloaded {}", plural(view_data.cars.len(), "car")),
        Err(error) => format!("reload failed: {error:#}"),
    };
    state.dispatch(AppCommand::RowsChanged(view_data.cars.len()));
    emit_status(state, view_data, internal_tx, message);
}

fn handle_row_edit_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    if key.code == KeyCode::Enter {
        commit_row_edit(state, view_data, internal_tx);
        return;
    }
    if key.code == KeyCode::Esc {
        view_data.editor = None;
        state.dispatch(AppCommand::CancelRowEdit);
        emit_status(state, view_data, internal_tx, "edit cancelled");
        return;
    }

    let Some(editor) = view_data.editor.as_mut() else {
        state.dispatch(AppCommand::CancelRowEdit);
        return;
    };
    match key.code {
        KeyCode::Tab | KeyCode::Right => {
            view_data.selected_col = editor.move_column(1).index();
        }
        KeyCode::BackTab | KeyCode::Left => {
            view_data.selected_col = editor.move_column(-1).index();
        }
        KeyCode::Up => {
            editor.step(1, &view_data.lookups);
        }
        KeyCode::Down => {
            editor.step(-1, &view_data.lookups);
        }
        KeyCode::Backspace => {
            editor.backspace();
        }
        KeyCode::Delete => editor.clear_cell(),
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            editor.input_char(ch);
        }
        _ => {}
    }
}

fn commit_row_edit(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(editor) = view_data.editor.as_ref() else {
        state.dispatch(AppCommand::FinishRowEdit);
        return;
    };
    let row = editor.row();
    let outcome = editor
        .commit(&view_data.lookups)
        .and_then(|car| view_data.cars.update(row, car));
    match outcome {
        Ok(()) => {
            view_data.editor = None;
            state.dispatch(AppCommand::FinishRowEdit);
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("row {} updated -- save to apply", row + 1),
            );
        }
        Err(error) => {
            let message = format!("{error:#}");
            if let Some(editor) = view_data.editor.as_mut() {
                editor.set_error(message.clone());
            }
            emit_status(state, view_data, internal_tx, message);
        }
    }
}

fn open_details<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let events = dispatch_with_status(state, view_data, internal_tx, AppCommand::OpenDetails);
    if !events.contains(&AppEvent::ModeChanged(AppMode::Details)) {
        return;
    }
    let Some((row, car)) = state
        .selected_row
        .and_then(|row| view_data.cars.get(row).map(|car| (row, car)))
    else {
        state.dispatch(AppCommand::CloseDetails);
        return;
    };
    let mut details = CarDetails::open(row, car);
    if let Some(cid) = details.car_id() {
        match runtime.load_related(cid) {
            Ok(related) => details.apply_related(related.comments, &related.pictures),
            Err(error) => {
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("details failed: {error:#}"),
                );
            }
        }
    }
    view_data.details = Some(details);
}

fn handle_details_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
        view_data.details = None;
        state.dispatch(AppCommand::CloseDetails);
        return;
    }
    let Some(details) = view_data.details.as_mut() else {
        state.dispatch(AppCommand::CloseDetails);
        return;
    };
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => details.move_comment(1),
        KeyCode::Char('k') | KeyCode::Up => details.move_comment(-1),
        KeyCode::Char('h') | KeyCode::Left => {
            details.cycle_maker(-1, &view_data.lookups);
        }
        KeyCode::Char('l') | KeyCode::Right => {
            details.cycle_maker(1, &view_data.lookups);
        }
        KeyCode::Char('d') => {
            if details.delete_selected_comment().is_some() {
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    "comment removed from this view",
                );
            }
        }
        KeyCode::Enter => apply_details_maker(state, view_data, internal_tx),
        _ => {}
    }
}

fn apply_details_maker(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(details) = view_data.details.as_mut() else {
        return;
    };
    let row = details.row();
    let message = match details.apply_maker(&view_data.lookups) {
        Ok(Some(car)) => {
            let maker = car.maker.clone();
            match view_data.cars.update(row, car) {
                Ok(()) => format!("maker set to {maker} -- save to apply"),
                Err(error) => format!("{error:#}"),
            }
        }
        Ok(None) => "maker unchanged".to_owned(),
        Err(error) => format!("{error:#}"),
    };
    emit_status(state, view_data, internal_tx, message);
}

fn car_label(car: &Car) -> String {
    match (car.maker.trim(), car.model.trim()) {
        ("", "") => "new car".to_owned(),
        ("", model) => model.to_owned(),
        (maker, "") => maker.to_owned(),
        (maker, model) => format!("{maker} {model}"),
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let toolbar = Paragraph::new(toolbar_line(state))
        .block(Block::default().title("cidb").borders(Borders::ALL));
    frame.render_widget(toolbar, layout[0]);

    render_grid(frame, layout[1], state, view_data);

    let status_widget = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);

    match state.mode {
        AppMode::ConfirmSave => {
            let area = centered_rect(50, 24, frame.area());
            frame.render_widget(Clear, area);
            let confirm = Paragraph::new(confirm_overlay_text(view_data))
                .wrap(Wrap { trim: false })
                .block(
                    Block::default()
                        .title(CONFIRM_TITLE)
                        .borders(Borders::ALL)
                        .style(Style::default().fg(Color::Cyan)),
                );
            frame.render_widget(confirm, area);
        }
        AppMode::Details => {
            if let Some(details) = &view_data.details {
                let area = centered_rect(80, 72, frame.area());
                frame.render_widget(Clear, area);
                let body = Paragraph::new(details_overlay_text(details, &view_data.lookups))
                    .wrap(Wrap { trim: false })
                    .block(Block::default().title("details").borders(Borders::ALL));
                frame.render_widget(body, area);
            }
        }
        AppMode::Help => {
            let area = centered_rect(70, 60, frame.area());
            frame.render_widget(Clear, area);
            let help = Paragraph::new(help_overlay_text())
                .block(Block::default().title("help").borders(Borders::ALL));
            frame.render_widget(help, area);
        }
        AppMode::Grid | AppMode::RowEdit => {}
    }
}

fn toolbar_key(action: ToolbarAction) -> char {
    match action {
        ToolbarAction::Add => 'a',
        ToolbarAction::Details => 'o',
        ToolbarAction::Delete => 'd',
        ToolbarAction::Save => 's',
        ToolbarAction::Reload => 'r',
    }
}

fn toolbar_line(state: &AppState) -> Line<'static> {
    let mut spans = Vec::new();
    for action in ToolbarAction::ALL {
        let style = if state.action_enabled(action) {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(
            format!(" [{}] {} ", toolbar_key(action), action.label()),
            style,
        ));
    }
    Line::from(spans)
}

fn render_grid(frame: &mut ratatui::Frame<'_>, area: Rect, state: &AppState, view_data: &ViewData) {
    let mut widths = vec![Constraint::Length(1)];
    widths.extend(CarColumn::ALL.iter().map(|_| Constraint::Min(8)));

    let header_cells = std::iter::once(Cell::from(""))
        .chain(CarColumn::ALL.iter().map(|column| Cell::from(column.header())))
        .map(|cell| {
            cell.style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
        });
    let header = Row::new(header_cells);

    let editor = view_data.editor.as_ref();
    let rows = view_data.cars.iter().enumerate().map(|(row_index, car)| {
        let selected_row = state.selected_row == Some(row_index);
        let editing = editor.filter(|editor| editor.row() == row_index);
        let marker = match view_data.cars.row_state(row_index) {
            Some(RowState::Phantom) => "+",
            Some(RowState::Modified) => "*",
            _ => " ",
        };

        let mut cells = vec![Cell::from(marker).style(Style::default().fg(Color::Magenta))];
        for column in CarColumn::ALL {
            let focused = selected_row && column.index() == view_data.selected_col;
            let (text, style) = match editing {
                Some(editor) if editor.column() == column => (
                    format!("{}▏", editor.cell(column)),
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Some(editor) => (
                    editor.cell(column).to_owned(),
                    Style::default().bg(Color::DarkGray),
                ),
                None if focused => (
                    column.display(car),
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                None if selected_row => (column.display(car), Style::default().bg(Color::DarkGray)),
                None => (column.display(car), Style::default()),
            };
            cells.push(Cell::from(text).style(style));
        }
        Row::new(cells)
    });

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(grid_title(&view_data.cars))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn grid_title(cars: &RemoteCollection<Car>) -> String {
    let mut parts = vec![format!("cars r:{}", cars.len())];
    let pending = cars.pending();
    if pending.total() > 0 {
        parts.push(format!(
            "pending +{} ~{} -{}",
            pending.creates, pending.updates, pending.deletes
        ));
    }
    if let Some(loaded) = cars
        .loaded_at()
        .and_then(|at| at.format(&format_description!("[hour]:[minute]:[second]")).ok())
    {
        parts.push(format!("loaded {loaded} UTC"));
    }
    parts.join(" | ")
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    if matches!(state.mode, AppMode::Help) {
        return String::new();
    }

    let hints = match state.mode {
        AppMode::Grid => "j/k rows h/l cols | e edit | a o d s r | esc deselect | ? help | ctrl+q",
        AppMode::RowEdit => "type | tab/shift+tab cell | up/down step | del clear | enter apply | esc cancel",
        AppMode::ConfirmSave => "y save | n cancel",
        AppMode::Details => "j/k comment | d drop comment | h/l maker | enter apply | esc close",
        AppMode::Help => "",
    };
    let status = view_data
        .editor
        .as_ref()
        .and_then(RowEditor::error)
        .or(state.status_line.as_deref());
    match status {
        Some(status) => format!("{} | {status} | {hints}", state.mode.label()),
        None => format!("{} | {hints}", state.mode.label()),
    }
}

fn confirm_overlay_text(view_data: &ViewData) -> String {
    let pending = view_data.cars.pending();
    format!(
        "{CONFIRM_QUESTION}\n\n{} new, {} changed, {} deleted\n\ny save | n cancel",
        pending.creates, pending.updates, pending.deletes
    )
}

fn details_overlay_text(details: &CarDetails, lookups: &Lookups) -> String {
    let car = details.car();
    let key = details
        .car_id()
        .map_or_else(|| "unsaved".to_owned(), |cid| format!("#{cid}"));
    let year = car.year.map(|year| year.to_string()).unwrap_or_default();
    let maker_name = lookups
        .brand(details.maker())
        .map(|brand| brand.realname.as_str())
        .filter(|name| !name.is_empty())
        .unwrap_or(details.maker());
    let changed = if details.maker_changed() {
        " (enter to apply)"
    } else {
        ""
    };

    let mut lines = vec![
        format!("car {key} {year}"),
        format!("model: {}", car.model),
        format!("maker: < {} > {maker_name}{changed}", details.maker()),
        format!("picture: {}", details.picture().text()),
        String::new(),
        format!("comments ({}):", details.comments().len()),
    ];
    if details.comments().is_empty() {
        lines.push("  none".to_owned());
    }
    for (index, comment) in details.comments().iter().enumerate() {
        let cursor = if details.selected_comment() == Some(index) {
            ">"
        } else {
            " "
        };
        lines.push(format!("{cursor} {}", comment.comment));
    }
    lines.join("\n")
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | ? help\n\
grid: j/k rows | h/l columns | g/G first/last | esc deselect\n\
actions: a add | e/enter edit row | o details | d delete | s save | r reload\n\
row edit: type to fill | tab/shift+tab or left/right cell | up/down step or pick | backspace | del clear | enter apply | esc cancel\n\
save: y confirm | n cancel\n\
details: j/k comment | d drop comment | h/l maker | enter apply maker | esc close"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
