use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};
use std::io;
use std::time::{Duration, Instant};

use crate::editor::LineBuffer;
use crate::highlight::Highlighter;
use crate::session::{HunkState, ReviewSession};

/// Confirmation action for bulk operations.
#[derive(Debug, Clone)]
enum ConfirmAction {
    ApplyAllRemaining,
}

/// Application state for the interactive review TUI.
///
/// A pure consumer of the session: every key that mutates goes through a
/// session operation, and the next frame re-reads session state.
pub struct App {
    session: ReviewSession<LineBuffer>,
    highlighter: Highlighter,
    file_ext: String,
    selected: usize,
    should_quit: bool,
    show_help: bool,
    scroll_offset: u16,
    confirm_action: Option<ConfirmAction>,
    status_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(mut session: ReviewSession<LineBuffer>) -> Self {
        let file_ext = session
            .diff()
            .path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_string();

        // Preview the first hunk so the detail pane starts populated.
        let _ = session.preview_hunk(0);

        Self {
            session,
            highlighter: Highlighter::new(),
            file_ext,
            selected: 0,
            should_quit: false,
            show_help: false,
            scroll_offset: 0,
            confirm_action: None,
            status_message: None,
        }
    }

    /// Handle keyboard input.
    fn handle_input(&mut self, key: event::KeyEvent) {
        // Handle confirmation dialog first
        if let Some(action) = self.confirm_action.take() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => match action {
                    ConfirmAction::ApplyAllRemaining => self.apply_all_remaining(),
                },
                _ => {} // Any other key cancels
            }
            return;
        }

        if self.show_help {
            // Any key closes help
            self.show_help = false;
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.session.discard_all();
                self.should_quit = true;
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.navigate(1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.navigate(-1);
            }
            KeyCode::Char('a') => {
                self.apply_selected();
            }
            KeyCode::Char('s') => {
                self.skip_selected();
            }
            KeyCode::Char('A') => {
                if self.session.progress().pending > 0 {
                    self.confirm_action = Some(ConfirmAction::ApplyAllRemaining);
                }
            }
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.scroll_offset = self.scroll_offset.saturating_add(10);
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.scroll_offset = self.scroll_offset.saturating_sub(10);
            }
            KeyCode::PageDown => {
                self.scroll_offset = self.scroll_offset.saturating_add(20);
            }
            KeyCode::PageUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(20);
            }
            _ => {}
        }
    }

    /// Move the selection cursor and preview the hunk under it.
    fn navigate(&mut self, direction: i64) {
        let count = self.session.hunk_count();
        if count == 0 {
            return;
        }
        let next = self.selected as i64 + direction;
        if next < 0 || next >= count as i64 {
            return;
        }
        self.selected = next as usize;
        self.scroll_offset = 0;
        // Terminal hunks can be inspected but not previewed.
        let _ = self.session.preview_hunk(self.selected);
    }

    fn apply_selected(&mut self) {
        match self.session.apply_hunk(self.selected) {
            Ok(()) => self.after_operation(),
            Err(e) => self.report(format!("apply failed: {e}")),
        }
    }

    fn skip_selected(&mut self) {
        match self.session.skip_hunk(self.selected) {
            Ok(()) => self.after_operation(),
            Err(e) => self.report(format!("skip failed: {e}")),
        }
    }

    fn apply_all_remaining(&mut self) {
        match self.session.apply_all_remaining() {
            Ok(()) => self.after_operation(),
            Err(e) => {
                self.report(format!("{e}"));
                // Jump to the hunk that needs attention.
                if let Some(active) = self.session.active_hunk() {
                    self.selected = active;
                }
            }
        }
    }

    /// Follow the session's cursor after a successful operation and quit
    /// once every hunk is resolved.
    fn after_operation(&mut self) {
        if self.session.is_finished() {
            self.should_quit = true;
            return;
        }
        if let Some(active) = self.session.active_hunk() {
            self.selected = active;
            self.scroll_offset = 0;
        }
    }

    fn report(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Render the UI.
    fn render(&mut self, frame: &mut Frame) {
        // Expire old status messages
        let expired = self
            .status_message
            .as_ref()
            .map(|(_, time)| time.elapsed() >= Duration::from_secs(3))
            .unwrap_or(false);
        if expired {
            self.status_message = None;
        }

        if self.show_help {
            self.render_help(frame);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(3)].as_ref())
            .split(frame.area());

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(30), Constraint::Percentage(70)].as_ref())
            .split(chunks[0]);

        self.render_hunk_list(frame, main_chunks[0]);
        self.render_hunk_detail(frame, main_chunks[1]);
        self.render_status_bar(frame, chunks[1]);

        // Draw confirmation modal on top if active
        if self.confirm_action.is_some() {
            self.render_confirm(frame);
        }
    }

    /// Render the hunk list panel.
    fn render_hunk_list(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .session
            .diff()
            .hunks
            .iter()
            .enumerate()
            .map(|(i, hunk)| {
                let state = self.session.state(i).unwrap_or(HunkState::Pending);
                let (tag, color) = match state {
                    HunkState::Applied => ("applied", Color::Green),
                    HunkState::Skipped => ("skipped", Color::DarkGray),
                    HunkState::Pending => ("pending", Color::Yellow),
                };

                let style = if i == self.selected {
                    Style::default().fg(color).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(color)
                };

                ListItem::new(format!(
                    "#{} @@ -{},{} +{},{} [{}]",
                    i + 1,
                    hunk.old_start,
                    hunk.old_count,
                    hunk.new_start,
                    hunk.new_count,
                    tag
                ))
                .style(style)
            })
            .collect();

        let title = format!("Hunks: {}", self.session.diff().path.display());
        let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));

        frame.render_widget(list, area);
    }

    /// Render the hunk detail panel.
    fn render_hunk_detail(&self, frame: &mut Frame, area: Rect) {
        let Some(hunk) = self.session.diff().hunks.get(self.selected) else {
            let paragraph = Paragraph::new("No hunk selected")
                .block(Block::default().borders(Borders::ALL).title("Hunk Detail"));
            frame.render_widget(paragraph, area);
            return;
        };

        let mut lines = Vec::new();

        let header = format!(
            "@@ -{},{} +{},{} @@",
            hunk.old_start, hunk.old_count, hunk.new_start, hunk.new_count
        );
        lines.push(Line::from(Span::styled(
            header,
            Style::default().fg(Color::Cyan),
        )));

        if let Ok(start) = self.session.adjusted_start_line(self.selected) {
            lines.push(Line::from(Span::styled(
                format!("targets document line {}", start + 1),
                Style::default().fg(Color::DarkGray),
            )));
        }

        let mut fh = self.highlighter.for_file(&self.file_ext);
        for change in hunk.changes() {
            let spans = fh.highlight_change(change.kind, &change.text);
            lines.push(Line::from(spans));
        }

        let state_str = match self.session.state(self.selected) {
            Some(HunkState::Applied) => " [APPLIED]",
            Some(HunkState::Skipped) => " [SKIPPED]",
            _ => " [PENDING]",
        };

        let text = Text::from(lines);
        let paragraph = Paragraph::new(text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Hunk Detail{}", state_str)),
            )
            .wrap(Wrap { trim: false })
            .scroll((self.scroll_offset, 0));

        frame.render_widget(paragraph, area);
    }

    /// Render the status bar.
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let status_text = match &self.status_message {
            Some((msg, _)) => msg.clone(),
            None => {
                let progress = self.session.progress();
                format!(
                    "{}/{} applied, {} skipped, {} pending | Keys: j/k=nav a=apply s=skip A=apply-all ?=help q=quit",
                    progress.applied, progress.total, progress.skipped, progress.pending
                )
            }
        };

        let paragraph = Paragraph::new(status_text)
            .block(Block::default().borders(Borders::ALL))
            .wrap(Wrap { trim: false });

        frame.render_widget(paragraph, area);
    }

    /// Render the help overlay.
    fn render_help(&self, frame: &mut Frame) {
        let help_text = vec![
            "Patch Review - Keyboard Shortcuts",
            "",
            "Navigation:",
            "  j / Down      - Next hunk",
            "  k / Up        - Previous hunk",
            "  Ctrl+d/PgDn  - Scroll down",
            "  Ctrl+u/PgUp  - Scroll up",
            "",
            "Actions:",
            "  a             - Apply selected hunk",
            "  s             - Skip selected hunk",
            "  A (Shift+A)   - Apply all remaining hunks",
            "",
            "Other:",
            "  ?             - Show this help",
            "  q / Esc       - Stop reviewing (applied hunks are kept)",
            "",
            "Press any key to close this help",
        ];

        let text = Text::from(help_text.iter().map(|&s| Line::from(s)).collect::<Vec<_>>());

        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Help"))
            .wrap(Wrap { trim: false });

        let area = centered_rect(60, 80, frame.area());
        frame.render_widget(paragraph, area);
    }

    /// Render the confirmation modal.
    fn render_confirm(&self, frame: &mut Frame) {
        let message = match &self.confirm_action {
            Some(ConfirmAction::ApplyAllRemaining) => {
                format!(
                    "Apply {} remaining hunks?\n\n(y)es / (n)o",
                    self.session.progress().pending
                )
            }
            None => return,
        };

        let paragraph = Paragraph::new(message)
            .block(Block::default().borders(Borders::ALL).title("Confirm"))
            .wrap(Wrap { trim: false })
            .style(Style::default().fg(Color::Yellow));

        let area = centered_rect(50, 30, frame.area());
        // Clear the area first
        frame.render_widget(Clear, area);
        frame.render_widget(paragraph, area);
    }
}

/// Create a centered rectangle.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Setup the terminal for TUI rendering.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("Failed to create terminal")
}

/// Restore the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Run the interactive review loop for one session and hand the session
/// back (finished or discarded) so the caller can collect the document.
pub fn run_review(session: ReviewSession<LineBuffer>) -> Result<ReviewSession<LineBuffer>> {
    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let mut app = App::new(session);

    // Main event loop
    let result = (|| -> Result<()> {
        loop {
            terminal
                .draw(|f| app.render(f))
                .context("Failed to draw frame")?;

            if app.should_quit {
                break;
            }

            if event::poll(Duration::from_millis(200)).context("Failed to poll events")?
                && let Event::Key(key) = event::read().context("Failed to read event")?
            {
                // Ignore key release events
                if key.kind == event::KeyEventKind::Press {
                    app.handle_input(key);
                }
            }
        }
        Ok(())
    })();

    // Restore terminal in all cases
    restore_terminal(&mut terminal)?;

    result?;
    Ok(app.session)
}
