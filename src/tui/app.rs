//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which drives a [`Session`] from
//! keyboard input, renders the task list with its filter bar, and hosts the
//! add/edit form, help screen and delete confirmation.

use std::io;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap},
    Frame, Terminal,
};

use crate::dates::format_deadline_relative;
use crate::error::StorageResult;
use crate::fields::Filter;
use crate::session::{Outcome, Session};
use crate::task::Task;
use crate::tui::{
    colors::{BRAND_BLUE, DARK_RED, GOLD, PALE_BLUE},
    enums::{AppState, PendingAction},
    input::InputField,
    task_form::{TaskForm, DEADLINE_FIELD, TEXT_FIELD},
    utils::centered_rect,
};
use crate::view::is_overdue;

const UNSAVED_MARKER: &str = " | UNSAVED CHANGES";

/// Main application state for the terminal user interface.
pub struct App<'a> {
    session: &'a mut Session,
    state: AppState,
    task_list_state: TableState,
    /// Ids of the tasks on screen, in display order.
    visible: Vec<u64>,
    task_form: TaskForm,
    pending_action: Option<PendingAction>,
    status_message: String,
}

impl<'a> App<'a> {
    pub fn new(session: &'a mut Session) -> Self {
        let status_message = session
            .load_warning()
            .map(|w| format!("Could not load saved tasks, read-only: {w}"))
            .unwrap_or_default();
        let mut app = App {
            session,
            state: AppState::TaskList,
            task_list_state: TableState::default(),
            visible: Vec::new(),
            task_form: TaskForm::new(),
            pending_action: None,
            status_message,
        };
        app.refresh_visible();
        app
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn visible_ids(&self) -> &[u64] {
        &self.visible
    }

    /// Id of the highlighted task, if any.
    pub fn selected_id(&self) -> Option<u64> {
        self.task_list_state
            .selected()
            .and_then(|idx| self.visible.get(idx))
            .copied()
    }

    /// Recompute the visible list from the session, keeping the selection
    /// on the same task when it is still shown.
    fn refresh_visible(&mut self) {
        let old_selected_id = self.selected_id();
        let old_index = self.task_list_state.selected();
        self.visible = self.session.visible().iter().map(|t| t.id).collect();

        let new_index = old_selected_id
            .and_then(|id| self.visible.iter().position(|&v| v == id))
            .or_else(|| {
                if self.visible.is_empty() {
                    None
                } else {
                    Some(old_index.unwrap_or(0).min(self.visible.len() - 1))
                }
            });
        self.task_list_state.select(new_index);
    }

    fn select_id(&mut self, id: u64) {
        if let Some(idx) = self.visible.iter().position(|&v| v == id) {
            self.task_list_state.select(Some(idx));
        }
    }

    fn move_selection(&mut self, down: bool) {
        if self.visible.is_empty() {
            return;
        }
        let last = self.visible.len() - 1;
        let next = match self.task_list_state.selected() {
            None => 0,
            Some(i) if down => (i + 1).min(last),
            Some(i) => i.saturating_sub(1),
        };
        self.task_list_state.select(Some(next));
    }

    fn set_filter(&mut self, filter: Filter) {
        self.session.set_filter(filter);
        self.refresh_visible();
        self.status_message = format!("Showing {} tasks", filter.label().to_lowercase());
    }

    /// Whether changes are blocked because the stored list was never loaded.
    /// Saving then would overwrite it with the empty in-memory list.
    fn refuse_if_read_only(&mut self) -> bool {
        match self.session.load_warning() {
            Some(w) => {
                self.status_message = format!("Read-only, saved tasks could not be loaded: {w}");
                true
            }
            None => false,
        }
    }

    /// Turn the result of a mutation into a status line and refresh the view.
    fn report(&mut self, result: StorageResult<Outcome>, done: String) {
        self.status_message = match result {
            Ok(Outcome::Unchanged) => "Nothing changed".to_string(),
            Ok(_) => done,
            Err(e) => format!("{done}, but NOT saved: {e}"),
        };
        self.refresh_visible();
    }

    /// Handle one key press. Returns true if the application should quit.
    pub async fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        if modifiers.contains(KeyModifiers::CONTROL) && key == KeyCode::Char('c') {
            return true;
        }
        match self.state {
            AppState::TaskList => self.handle_task_list_input(key).await,
            AppState::AddTask | AppState::EditTask => {
                self.handle_form_input(key).await;
                false
            }
            AppState::Confirm => {
                self.handle_confirm_input(key).await;
                false
            }
            AppState::Help => {
                self.state = AppState::TaskList;
                false
            }
        }
    }

    async fn handle_task_list_input(&mut self, key: KeyCode) -> bool {
        let mutating = matches!(
            key,
            KeyCode::Char(' ' | 'a' | 'n' | 'e' | 'd') | KeyCode::Enter | KeyCode::Delete
        );
        if mutating && self.refuse_if_read_only() {
            return false;
        }
        match key {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(true),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(false),
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(id) = self.selected_id() {
                    let result = self.session.toggle(id).await;
                    let state = match self.session.get(id) {
                        Some(task) if task.completed => "done",
                        _ => "pending",
                    };
                    self.report(result, format!("Marked task as {state}"));
                }
            }
            KeyCode::Char('a') | KeyCode::Char('n') => {
                self.task_form = TaskForm::new();
                self.state = AppState::AddTask;
            }
            KeyCode::Char('e') => {
                if let Some(task) = self.selected_id().and_then(|id| self.session.get(id).cloned()) {
                    self.task_form = TaskForm::from_task(&task);
                    self.state = AppState::EditTask;
                } else {
                    self.status_message = "No task selected".to_string();
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_id() {
                    self.pending_action = Some(PendingAction::Delete(id));
                    self.state = AppState::Confirm;
                }
            }
            KeyCode::Tab | KeyCode::Char('f') => self.set_filter(self.session.filter().next()),
            KeyCode::Char('1') => self.set_filter(Filter::All),
            KeyCode::Char('2') => self.set_filter(Filter::Pending),
            KeyCode::Char('3') => self.set_filter(Filter::Completed),
            KeyCode::Char('h') | KeyCode::Char('?') => self.state = AppState::Help,
            _ => {}
        }
        false
    }

    async fn handle_form_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.state = AppState::TaskList;
                self.status_message = "Cancelled".to_string();
            }
            KeyCode::Enter => self.submit_form().await,
            KeyCode::Tab | KeyCode::Down => self.task_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.task_form.prev_field(),
            KeyCode::Backspace => self.task_form.handle_backspace(),
            KeyCode::Delete => self.task_form.handle_delete(),
            KeyCode::Left => self.task_form.handle_left_right(false),
            KeyCode::Right => self.task_form.handle_left_right(true),
            KeyCode::Home => self.task_form.handle_home_end(false),
            KeyCode::End => self.task_form.handle_home_end(true),
            KeyCode::Char(c) => self.task_form.handle_char(c),
            _ => {}
        }
    }

    async fn submit_form(&mut self) {
        let values = match self.task_form.values() {
            Ok(values) => values,
            Err(msg) => {
                self.status_message = msg;
                return;
            }
        };

        match self.task_form.editing {
            None => {
                let result = self.session.add(&values.text, values.deadline).await;
                let added = match &result {
                    Ok(Outcome::Added(id)) => Some(*id),
                    _ => None,
                };
                self.report(result, "Added task".to_string());
                if let Some(id) = added {
                    self.select_id(id);
                }
            }
            Some(id) => {
                let Some(current) = self.session.get(id).cloned() else {
                    self.status_message = format!("Task {id} no longer exists");
                    self.state = AppState::TaskList;
                    return;
                };
                let updated = Task {
                    text: values.text,
                    deadline: values.deadline,
                    ..current
                };
                let result = self.session.update(updated).await;
                self.report(result, "Updated task".to_string());
            }
        }
        self.state = AppState::TaskList;
    }

    async fn handle_confirm_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let Some(PendingAction::Delete(id)) = self.pending_action.take() {
                    let result = self.session.delete(id).await;
                    self.report(result, "Deleted task".to_string());
                }
                self.state = AppState::TaskList;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.pending_action = None;
                self.state = AppState::TaskList;
                self.status_message = "Cancelled".to_string();
            }
            _ => {}
        }
    }

    /// Render the header, filter bar and task table.
    fn render_task_list(&mut self, f: &mut Frame, area: Rect) {
        let today = Local::now().date_naive();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // header
                Constraint::Length(1), // filter bar
                Constraint::Min(0),    // table
            ])
            .split(area);

        let header = Paragraph::new(Line::from(vec![Span::styled(
            "MY TASKS",
            Style::default().add_modifier(Modifier::BOLD),
        )]))
        .style(Style::default().bg(BRAND_BLUE).fg(Color::White))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
        f.render_widget(header, chunks[0]);

        let counts = self.session.counts();
        let titles: Vec<Line> = Filter::ALL_FILTERS
            .iter()
            .map(|&filter| Line::from(format!(" {} ({}) ", filter.label(), counts.get(filter))))
            .collect();
        let selected = Filter::ALL_FILTERS
            .iter()
            .position(|&filter| filter == self.session.filter())
            .unwrap_or(0);
        let tabs = Tabs::new(titles)
            .select(selected)
            .style(Style::default().fg(PALE_BLUE))
            .highlight_style(
                Style::default()
                    .bg(BRAND_BLUE)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .divider("|");
        f.render_widget(tabs, chunks[1]);

        let header_cells = ["", "Deadline", "Task"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD)));
        let header = Row::new(header_cells)
            .style(Style::default().bg(BRAND_BLUE).fg(Color::White))
            .height(1);

        let rows: Vec<Row> = self
            .visible
            .iter()
            .filter_map(|&id| self.session.get(id))
            .map(|task| task_row(task, today))
            .collect();

        let widths = [
            Constraint::Length(3),  // mark
            Constraint::Length(12), // deadline
            Constraint::Min(20),    // text
        ];

        let empty_hint = if self.visible.is_empty() {
            " - no tasks yet, press 'a' to add one"
        } else {
            ""
        };
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(format!(
                "Tasks ({}/{}) - Press 'h' for help{empty_hint}",
                self.visible.len(),
                self.session.tasks().len()
            )))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, chunks[2], &mut self.task_list_state);
    }

    /// Render the add/edit form.
    fn render_task_form(&mut self, f: &mut Frame, area: Rect) {
        let title = if self.state == AppState::EditTask { "Edit Task" } else { "New Task" };
        let area = centered_rect(70, 50, area);
        f.render_widget(Clear, area);

        let outer = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(BRAND_BLUE));
        let inner = outer.inner(area);
        f.render_widget(outer, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(inner);

        let fields = [
            (TEXT_FIELD, "Task", &self.task_form.text),
            (
                DEADLINE_FIELD,
                "Deadline (YYYY-MM-DD, today, fri, in 3d; blank for none)",
                &self.task_form.deadline,
            ),
        ];
        for (slot, label, field) in fields {
            render_input(f, chunks[slot], label, field);
        }

        let hint = Paragraph::new("Enter: save  Tab: next field  Esc: cancel")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(hint, chunks[2]);
    }

    fn render_help(&mut self, f: &mut Frame, area: Rect) {
        let lines = [
            ("j / Down", "Move down"),
            ("k / Up", "Move up"),
            ("Space / Enter", "Toggle done"),
            ("a", "Add task"),
            ("e", "Edit selected task"),
            ("d", "Delete selected task"),
            ("Tab / f", "Next filter"),
            ("1 / 2 / 3", "All / Pending / Completed"),
            ("q / Esc", "Quit"),
        ];
        let text: Vec<Line> = lines
            .iter()
            .map(|(key, what)| {
                Line::from(vec![
                    Span::styled(format!("{key:<16}"), Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(*what),
                ])
            })
            .collect();
        let help = Paragraph::new(text)
            .block(Block::default().title("Help - any key to return").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(help, area);
    }

    /// Render a confirmation dialog for destructive actions.
    fn render_confirm(&mut self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Confirm Action")
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_RED));

        let area = centered_rect(50, 20, area);
        f.render_widget(Clear, area);

        let subject = match self.pending_action {
            Some(PendingAction::Delete(id)) => self
                .session
                .get(id)
                .map(|t| format!("Delete \"{}\"", t.text))
                .unwrap_or_default(),
            None => String::new(),
        };
        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "Are you sure you want to:",
                Style::default().add_modifier(Modifier::BOLD),
            )]),
            Line::from(subject),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];

        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_status_bar(&mut self, f: &mut Frame, area: Rect) {
        let mut status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match self.state {
                AppState::TaskList => format!(
                    "{} | {} shown | Press 'h' for help",
                    self.session.filter().label(),
                    self.visible.len()
                ),
                AppState::AddTask => "Add New Task".to_string(),
                AppState::EditTask => "Edit Task".to_string(),
                AppState::Help => "Help".to_string(),
                AppState::Confirm => "Confirm Action".to_string(),
            }
        };

        let background = if self.session.is_dirty() {
            status_text.push_str(UNSAVED_MARKER);
            DARK_RED
        } else {
            BRAND_BLUE
        };

        let status = Paragraph::new(status_text)
            .style(Style::default().bg(background).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Main render function that dispatches to the view for the current state.
    pub fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        match self.state {
            AppState::TaskList => self.render_task_list(f, chunks[0]),
            AppState::AddTask | AppState::EditTask => {
                self.render_task_list(f, chunks[0]);
                self.render_task_form(f, chunks[0]);
            }
            AppState::Help => self.render_help(f, chunks[0]),
            AppState::Confirm => {
                self.render_task_list(f, chunks[0]);
                self.render_confirm(f, chunks[0]);
            }
        }

        self.render_status_bar(f, chunks[1]);
    }

    /// Main event loop. Each key press is handled to completion, including
    /// the save it triggers, before the next one is read.
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code, key.modifiers).await {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

fn task_row(task: &Task, today: NaiveDate) -> Row<'static> {
    let style = if task.completed {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else if is_overdue(task, today) {
        Style::default().fg(DARK_RED).add_modifier(Modifier::BOLD)
    } else if task.deadline == Some(today) {
        Style::default().fg(GOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let mark = if task.completed { "✔" } else { "○" };

    Row::new(vec![
        Cell::from(mark),
        Cell::from(format_deadline_relative(task.deadline, today)),
        Cell::from(task.text.clone()),
    ])
    .style(style)
}

fn render_input(f: &mut Frame, area: Rect, label: &str, field: &InputField) {
    let border = if field.active {
        Style::default().fg(GOLD)
    } else {
        Style::default()
    };
    let input = Paragraph::new(field.value.as_str())
        .block(Block::default().title(label.to_string()).borders(Borders::ALL).border_style(border));
    f.render_widget(input, area);

    if field.active {
        let offset = u16::try_from(field.cursor).unwrap_or(u16::MAX);
        let x = area.x.saturating_add(1).saturating_add(offset);
        f.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}
