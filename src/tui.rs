use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, info};

use crate::config::Config;
use crate::event::{self as app_event, AppEvent, EventReceiver};
use crate::feed::FeedClient;
use crate::form::Field;
use crate::models::Job;
use crate::saved::SavedJobs;
use crate::screens::{CatalogScreen, Intent, SavedScreen, EMPTY_SAVED_NOTICE};
use crate::workflow::{ApplicationWorkflow, REMOVE_PROMPT};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

struct AppState {
    catalog: CatalogScreen,
    saved_screen: Option<SavedScreen>,
    selected: usize,
    searching: bool,
    focus: Field,
}

impl AppState {
    fn new(catalog: CatalogScreen) -> Self {
        Self {
            catalog,
            saved_screen: None,
            selected: 0,
            searching: false,
            focus: Field::Name,
        }
    }

    fn rows(&self) -> Vec<Job> {
        match &self.saved_screen {
            Some(saved) => saved.jobs(),
            None => self.catalog.visible_jobs(),
        }
    }

    fn current_job(&self) -> Option<Job> {
        self.rows().get(self.selected).cloned()
    }

    fn workflow(&self) -> &ApplicationWorkflow {
        match &self.saved_screen {
            Some(saved) => saved.workflow(),
            None => self.catalog.workflow(),
        }
    }

    fn dispatch(&mut self, intent: Intent) {
        match &mut self.saved_screen {
            Some(saved) => saved.dispatch(intent),
            None => self.catalog.dispatch(intent),
        }
        self.clamp_selection();
    }

    fn route(&mut self, event: AppEvent) {
        let unhandled = self
            .catalog
            .handle_event(event)
            .and_then(|event| match &mut self.saved_screen {
                Some(saved) => saved.handle_event(event),
                None => Some(event),
            });
        if let Some(event) = unhandled {
            debug!(?event, "event had no owning screen");
        }
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let len = self.rows().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    fn next(&mut self) {
        let len = self.rows().len();
        if len > 0 && self.selected < len - 1 {
            self.selected += 1;
        }
    }

    fn prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

pub async fn run_browse(config: &Config, saved: SavedJobs) -> Result<()> {
    let client = Arc::new(FeedClient::new(&config.feed_url, config.request_timeout())?);
    let (events_tx, events_rx) = app_event::channel();

    let mut catalog = CatalogScreen::new(saved, events_tx, config.auto_close_delay());
    catalog.mount(client);
    let mut state = AppState::new(catalog);

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state, events_rx).await;

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    mut events: EventReceiver,
) -> Result<()> {
    let mut list_state = ListState::default();

    loop {
        loop {
            match events.try_recv() {
                Ok(event) => state.route(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        list_state.select(Some(state.selected));
        terminal.draw(|frame| draw(frame, state, &mut list_state))?;

        // Yield so timers and the fetch can make progress between polls.
        tokio::task::yield_now().await;
        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if !handle_key(state, key) {
                break;
            }
        }
    }
    info!("leaving browser");
    Ok(())
}

/// Returns false when the user asked to quit.
fn handle_key(state: &mut AppState, key: KeyEvent) -> bool {
    if state.workflow().is_open() {
        handle_form_key(state, key);
        return true;
    }

    let confirming = state
        .saved_screen
        .as_ref()
        .is_some_and(|saved| saved.pending_removal().is_some());
    if confirming {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => state.dispatch(Intent::ConfirmRemovalPressed),
            KeyCode::Char('n') | KeyCode::Esc => state.dispatch(Intent::CancelRemovalPressed),
            _ => {}
        }
        return true;
    }

    if state.searching {
        let mut term = state.catalog.search_term().to_string();
        match key.code {
            KeyCode::Esc | KeyCode::Enter => state.searching = false,
            KeyCode::Backspace => {
                term.pop();
                state.dispatch(Intent::SearchTextChanged(term));
            }
            KeyCode::Char(c) => {
                term.push(c);
                state.dispatch(Intent::SearchTextChanged(term));
            }
            _ => {}
        }
        return true;
    }

    match key.code {
        KeyCode::Char('q') => return false,
        KeyCode::Down | KeyCode::Char('j') => state.next(),
        KeyCode::Up | KeyCode::Char('k') => state.prev(),
        KeyCode::Char('a') | KeyCode::Enter => {
            if let Some(job) = state.current_job() {
                state.focus = Field::Name;
                state.dispatch(Intent::ApplyPressed(job));
            }
        }
        KeyCode::Char('/') if state.saved_screen.is_none() => state.searching = true,
        KeyCode::Char('s') if state.saved_screen.is_none() => {
            if let Some(job) = state.current_job() {
                state.dispatch(Intent::SavePressed(job));
            }
        }
        KeyCode::Char('v') if state.saved_screen.is_none() => {
            state.saved_screen = Some(state.catalog.open_saved_screen());
            state.selected = 0;
        }
        KeyCode::Char('d') if state.saved_screen.is_some() => {
            if let Some(job) = state.current_job() {
                state.dispatch(Intent::RemovePressed(job));
            }
        }
        KeyCode::Esc | KeyCode::Char('b') if state.saved_screen.is_some() => {
            // Dropping the saved screen also drops any auto-close it had pending.
            state.saved_screen = None;
            state.selected = 0;
        }
        _ => {}
    }
    true
}

fn handle_form_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => state.dispatch(Intent::ClosePressed),
        KeyCode::Enter => state.dispatch(Intent::SubmitPressed),
        KeyCode::Tab | KeyCode::Down => state.focus = state.focus.next(),
        KeyCode::BackTab | KeyCode::Up => state.focus = state.focus.prev(),
        KeyCode::Backspace => {
            let mut value = state.workflow().draft().get(state.focus).to_string();
            value.pop();
            state.dispatch(Intent::FieldChanged(state.focus, value));
        }
        KeyCode::Char(c) => {
            let mut value = state.workflow().draft().get(state.focus).to_string();
            value.push(c);
            state.dispatch(Intent::FieldChanged(state.focus, value));
        }
        _ => {}
    }
}

fn draw(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    draw_header(frame, state, rows[0]);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(rows[1]);

    draw_list(frame, state, list_state, chunks[0]);

    let detail = Paragraph::new(build_detail(state.current_job().as_ref()))
        .block(Block::default().borders(Borders::ALL).title(" Detail "))
        .wrap(Wrap { trim: false });
    frame.render_widget(detail, chunks[1]);

    let help = match (&state.saved_screen, state.workflow().is_open()) {
        (_, true) => " tab:next field  enter:submit  esc:close",
        (Some(_), false) => " j/k:navigate  a:apply  d:remove  b:back  q:quit",
        (None, false) => " j/k:navigate  /:search  s:save  a:apply  v:saved jobs  q:quit",
    };
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        rows[2],
    );

    if state.workflow().is_open() {
        draw_form(frame, state.workflow(), state.focus);
    } else if let Some(job) = state.saved_screen.as_ref().and_then(|s| s.pending_removal()) {
        draw_confirm(frame, job);
    }
}

fn draw_header(frame: &mut Frame, state: &AppState, area: Rect) {
    let (title, text) = match &state.saved_screen {
        Some(saved) => (" Saved Jobs ", format!("{} saved", saved.saved().len())),
        None => {
            let cursor = if state.searching { "_" } else { "" };
            let text = format!(
                "Search: {}{}   ({} of {}, {} saved)",
                state.catalog.search_term(),
                cursor,
                state.catalog.visible_jobs().len(),
                state.catalog.catalog().jobs().len(),
                state.catalog.saved().len()
            );
            (" Available Jobs ", text)
        }
    };
    let mut line = vec![Span::raw(text)];
    if let Some(notice) = state.catalog.catalog().notice() {
        line.push(Span::styled(format!("  {}", notice), Style::default().fg(Color::Red)));
    }
    let header = Paragraph::new(Line::from(line))
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(header, area);
}

fn draw_list(frame: &mut Frame, state: &AppState, list_state: &mut ListState, area: Rect) {
    let block = Block::default().borders(Borders::ALL);

    if state.saved_screen.is_none() && state.catalog.is_loading() {
        frame.render_widget(Paragraph::new("Loading jobs...").block(block), area);
        return;
    }

    if state.saved_screen.as_ref().is_some_and(|saved| saved.saved().is_empty()) {
        frame.render_widget(Paragraph::new(EMPTY_SAVED_NOTICE).block(block), area);
        return;
    }

    let jobs = state.rows();
    if jobs.is_empty() {
        frame.render_widget(Paragraph::new("No jobs found.").block(block), area);
        return;
    }

    let items: Vec<ListItem> = jobs
        .iter()
        .map(|job| {
            let marker = match &state.saved_screen {
                Some(_) => "",
                None if state.catalog.is_saved(job) => "[*] ",
                None => "[ ] ",
            };
            ListItem::new(format!("{}{} | {}", marker, job.title, job.company_name))
        })
        .collect();

    let list = List::new(items)
        .block(block.title(format!(" Jobs ({}) ", jobs.len())))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, list_state);
}

fn build_detail(job: Option<&Job>) -> Text<'static> {
    let Some(job) = job else {
        return Text::raw("No job selected");
    };

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(job.title.clone(), Style::default().add_modifier(Modifier::BOLD))),
        Line::from(Span::styled(job.company_name.clone(), Style::default().fg(Color::Cyan))),
        Line::from(""),
    ];
    for (label, value) in [
        ("Category", &job.main_category),
        ("Type", &job.job_type),
        ("Work model", &job.work_model),
        ("Seniority", &job.seniority_level),
    ] {
        if !value.is_empty() {
            lines.push(Line::from(format!("{}: {}", label, value)));
        }
    }
    Text::from(lines)
}

fn draw_form(frame: &mut Frame, workflow: &ApplicationWorkflow, focus: Field) {
    let area = centered(frame.area(), 70, 80);
    frame.render_widget(Clear, area);

    let mut lines: Vec<Line> = Vec::new();
    if let Some(job) = workflow.selected_job() {
        lines.push(Line::from(Span::styled(
            format!("Apply for {}", job.title),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(format!("at {}", job.company_name)));
        lines.push(Line::from(""));
    }

    let width = area.width.saturating_sub(6).max(10) as usize;
    for field in Field::ALL {
        let label_style = if field == focus {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(field.label(), label_style)));
        for chunk in textwrap::wrap(workflow.draft().get(field), width) {
            lines.push(Line::from(format!("  {}", chunk)));
        }
        let error = workflow.errors().get(field);
        if !error.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("  {}", error),
                Style::default().fg(Color::Red),
            )));
        }
        lines.push(Line::from(""));
    }

    if !workflow.feedback().is_empty() {
        lines.push(Line::from(Span::styled(
            workflow.feedback().to_string(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )));
    }

    let form = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Application "))
        .wrap(Wrap { trim: false });
    frame.render_widget(form, area);
}

fn draw_confirm(frame: &mut Frame, job: &Job) {
    let area = centered(frame.area(), 60, 25);
    frame.render_widget(Clear, area);
    let text = vec![
        Line::from(REMOVE_PROMPT),
        Line::from(""),
        Line::from(Span::styled(job.title.clone(), Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled("y:remove  n:cancel", Style::default().fg(Color::DarkGray))),
    ];
    let popup = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(" Remove Job "))
        .wrap(Wrap { trim: false });
    frame.render_widget(popup, area);
}

fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
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
        .split(vertical[1])[1]
}
