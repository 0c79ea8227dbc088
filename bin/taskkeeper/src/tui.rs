//! Full-screen dashboard: task table, add/edit forms, delete confirm.
//!
//! One request is in flight at a time; every successful mutation
//! re-fetches the list, so the table always shows what the service
//! stored. Failures land in the status line and the dashboard keeps
//! running.

use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState};

use crate::api::{ApiClient, Task, TaskPatch};

pub fn run(client: ApiClient) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut dashboard = Dashboard::new(client);
    dashboard.refresh();
    let result = run_app(&mut terminal, &mut dashboard);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut Dashboard) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

enum Mode {
    Browse,
    Form(TaskForm),
    ConfirmDelete(i64),
}

#[derive(PartialEq)]
enum FormField {
    Title,
    Description,
}

struct TaskForm {
    /// `None` for a new task, `Some` when editing an existing one.
    id: Option<i64>,
    title: String,
    description: String,
    field: FormField,
}

impl TaskForm {
    fn new_task() -> Self {
        Self { id: None, title: String::new(), description: String::new(), field: FormField::Title }
    }

    fn edit(task: &Task) -> Self {
        Self {
            id: Some(task.id),
            title: task.title.clone(),
            description: task.description.clone(),
            field: FormField::Title,
        }
    }

    fn next_field(&mut self) {
        self.field = match self.field {
            FormField::Title => FormField::Description,
            FormField::Description => FormField::Title,
        };
    }

    fn active_mut(&mut self) -> &mut String {
        match self.field {
            FormField::Title => &mut self.title,
            FormField::Description => &mut self.description,
        }
    }

    /// The patch an edit should send: only fields that differ from the
    /// task currently shown. Without a reference task, send everything.
    fn diff(&self, current: Option<&Task>) -> TaskPatch {
        let mut patch = TaskPatch::default();
        match current {
            Some(task) => {
                if self.title != task.title {
                    patch.title = Some(self.title.clone());
                }
                if self.description != task.description {
                    patch.description = Some(self.description.clone());
                }
            }
            None => {
                patch.title = Some(self.title.clone());
                patch.description = Some(self.description.clone());
            }
        }
        patch
    }
}

enum Status {
    Idle,
    Info(String),
    Error(String),
}

struct Dashboard {
    client: ApiClient,
    tasks: Vec<Task>,
    table: TableState,
    mode: Mode,
    status: Status,
}

impl Dashboard {
    fn new(client: ApiClient) -> Self {
        Self {
            client,
            tasks: Vec::new(),
            table: TableState::default(),
            mode: Mode::Browse,
            status: Status::Idle,
        }
    }

    /// Handle one key press. Returns true when the dashboard should quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }
        match std::mem::replace(&mut self.mode, Mode::Browse) {
            Mode::Browse => match key.code {
                KeyCode::Char('q') => return true,
                KeyCode::Char('r') => self.refresh(),
                KeyCode::Char('a') => self.mode = Mode::Form(TaskForm::new_task()),
                KeyCode::Char('e') => self.open_edit(),
                KeyCode::Char('d') => {
                    if let Some(id) = self.selected().map(|t| t.id) {
                        self.mode = Mode::ConfirmDelete(id);
                    }
                }
                KeyCode::Char(' ') => self.toggle_completed(),
                KeyCode::Up | KeyCode::Char('k') => self.select_prev(),
                KeyCode::Down | KeyCode::Char('j') => self.select_next(),
                _ => {}
            },
            Mode::Form(mut form) => match key.code {
                KeyCode::Esc => {}
                KeyCode::Enter => self.submit_form(form),
                KeyCode::Tab => {
                    form.next_field();
                    self.mode = Mode::Form(form);
                }
                KeyCode::Backspace => {
                    form.active_mut().pop();
                    self.mode = Mode::Form(form);
                }
                KeyCode::Char(c) => {
                    form.active_mut().push(c);
                    self.mode = Mode::Form(form);
                }
                _ => self.mode = Mode::Form(form),
            },
            Mode::ConfirmDelete(id) => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.delete(id),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {}
                _ => self.mode = Mode::ConfirmDelete(id),
            },
        }
        false
    }

    /// Re-fetch the task list, keeping the selection in bounds.
    fn refresh(&mut self) {
        match self.client.list_tasks() {
            Ok(tasks) => {
                self.tasks = tasks;
                if self.tasks.is_empty() {
                    self.table.select(None);
                } else {
                    let selected = self.table.selected().unwrap_or(0);
                    self.table.select(Some(selected.min(self.tasks.len() - 1)));
                }
            }
            Err(e) => self.status = Status::Error(e.to_string()),
        }
    }

    fn selected(&self) -> Option<&Task> {
        self.table.selected().and_then(|i| self.tasks.get(i))
    }

    fn select_prev(&mut self) {
        if let Some(i) = self.table.selected() {
            self.table.select(Some(i.saturating_sub(1)));
        }
    }

    fn select_next(&mut self) {
        if let Some(i) = self.table.selected() {
            if i + 1 < self.tasks.len() {
                self.table.select(Some(i + 1));
            }
        }
    }

    fn open_edit(&mut self) {
        if let Some(task) = self.selected().cloned() {
            self.mode = Mode::Form(TaskForm::edit(&task));
        }
    }

    fn submit_form(&mut self, form: TaskForm) {
        let result = match form.id {
            None => {
                let description = if form.description.is_empty() {
                    None
                } else {
                    Some(form.description.as_str())
                };
                self.client.create_task(&form.title, description).map(|created| created.message)
            }
            Some(id) => {
                let patch = form.diff(self.tasks.iter().find(|t| t.id == id));
                if patch.is_empty() {
                    self.status = Status::Info("No changes.".to_string());
                    return;
                }
                self.client.update_task(id, &patch)
            }
        };
        match result {
            Ok(message) => {
                self.status = Status::Info(message);
                self.refresh();
            }
            Err(e) => {
                // Keep the form open so the input isn't lost.
                self.status = Status::Error(e.to_string());
                self.mode = Mode::Form(form);
            }
        }
    }

    fn toggle_completed(&mut self) {
        let Some(task) = self.selected().cloned() else {
            return;
        };
        let patch = TaskPatch { completed: Some(!task.completed), ..Default::default() };
        match self.client.update_task(task.id, &patch) {
            Ok(message) => {
                self.status = Status::Info(message);
                self.refresh();
            }
            Err(e) => self.status = Status::Error(e.to_string()),
        }
    }

    fn delete(&mut self, id: i64) {
        match self.client.delete_task(id) {
            Ok(message) => {
                self.status = Status::Info(message);
                self.refresh();
            }
            Err(e) => self.status = Status::Error(e.to_string()),
        }
    }
}

fn draw(f: &mut ratatui::Frame, app: &mut Dashboard) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1), Constraint::Length(1)])
        .split(f.area());

    draw_table(f, app, chunks[0]);
    draw_status(f, app, chunks[1]);
    let help = "q quit  r refresh  a add  e edit  d delete  space toggle  j/k move";
    f.render_widget(Paragraph::new(help).style(Style::default().fg(Color::DarkGray)), chunks[2]);

    match &app.mode {
        Mode::Form(form) => draw_form(f, form),
        Mode::ConfirmDelete(id) => draw_confirm(f, *id),
        Mode::Browse => {}
    }
}

fn draw_table(f: &mut ratatui::Frame, app: &mut Dashboard, area: Rect) {
    let header = Row::new(["ID", "Done", "Title", "Description"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows = app.tasks.iter().map(|t| {
        Row::new(vec![
            Cell::from(t.id.to_string()),
            Cell::from(if t.completed { "[x]" } else { "[ ]" }),
            Cell::from(t.title.clone()),
            Cell::from(t.description.clone()),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(4),
            Constraint::Length(32),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(Block::default().title(format!("Tasks ({})", app.tasks.len())).borders(Borders::ALL))
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    f.render_stateful_widget(table, area, &mut app.table);
}

fn draw_status(f: &mut ratatui::Frame, app: &Dashboard, area: Rect) {
    let (text, style) = match &app.status {
        Status::Idle => (String::new(), Style::default()),
        Status::Info(m) => (m.clone(), Style::default().fg(Color::Green)),
        Status::Error(m) => (format!("error: {m}"), Style::default().fg(Color::Red)),
    };
    f.render_widget(Paragraph::new(text).style(style), area);
}

fn draw_form(f: &mut ratatui::Frame, form: &TaskForm) {
    let area = centered_rect(60, 7, f.area());
    f.render_widget(Clear, area);
    let title = if form.id.is_some() { "Edit task" } else { "New task" };
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(2), Constraint::Length(1)])
        .split(inner);

    draw_input(f, chunks[0], "Title", &form.title, form.field == FormField::Title);
    draw_input(f, chunks[1], "Description", &form.description, form.field == FormField::Description);
    f.render_widget(
        Paragraph::new("Tab switch field  Enter save  Esc cancel")
            .style(Style::default().fg(Color::DarkGray)),
        chunks[2],
    );
}

fn draw_input(f: &mut ratatui::Frame, area: Rect, label: &str, value: &str, active: bool) {
    let style =
        if active { Style::default().fg(Color::Cyan) } else { Style::default() };
    f.render_widget(Paragraph::new(format!("{label}: {value}")).style(style), area);
}

fn draw_confirm(f: &mut ratatui::Frame, id: i64) {
    let area = centered_rect(40, 3, f.area());
    f.render_widget(Clear, area);
    let block = Block::default().title("Delete").borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(Paragraph::new(format!("Delete task {id}? y/n")), inner);
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(height), Constraint::Min(0)])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
