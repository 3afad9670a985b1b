//! Interactive terminal chat

use andy_chat_client::{AnswerService, Dispatcher};
use andy_chat_core::config::Config;
use andy_chat_core::session::{
    Author, Outcome, PendingQuestion, Resolution, Session, SessionState,
};
use anyhow::Result;
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::layout::ResponsiveLayout;

const SIDEBAR_WIDTH: u16 = 30;
const PAGE_ROWS: u16 = 10;
const POLL_INTERVAL: Duration = Duration::from_millis(60);

pub struct TuiApp {
    session: Session,
    layout: ResponsiveLayout,
    endpoint: String,
    scroll: u16,
    follow: bool,
    should_quit: bool,
}

impl TuiApp {
    pub fn new(endpoint: String, layout: ResponsiveLayout) -> Self {
        Self {
            session: Session::new(),
            layout,
            endpoint,
            scroll: 0,
            follow: true,
            should_quit: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Handle one key press. Returns a question that must be dispatched.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<PendingQuestion> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Up => self.scroll_up(1),
            KeyCode::PageUp => self.scroll_up(PAGE_ROWS),
            KeyCode::Down => self.scroll_down(1),
            KeyCode::PageDown => self.scroll_down(PAGE_ROWS),
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => {
                self.session.draft_input_mut().push('\n');
            }
            KeyCode::Enter => return self.submit_draft(),
            KeyCode::Backspace => {
                self.session.draft_input_mut().pop();
            }
            KeyCode::Char(ch) if key.modifiers.difference(KeyModifiers::SHIFT).is_empty() => {
                self.session.draft_input_mut().push(ch);
            }
            _ => {}
        }
        None
    }

    fn submit_draft(&mut self) -> Option<PendingQuestion> {
        let command = self.session.draft_input().trim().to_string();
        match command.as_str() {
            "/quit" => {
                self.session.draft_input_mut().clear();
                self.should_quit = true;
                None
            }
            "/reset" => {
                self.session.draft_input_mut().clear();
                self.session.reset();
                self.follow = true;
                None
            }
            _ => {
                let pending = self.session.submit_draft()?;
                self.follow = true;
                Some(pending)
            }
        }
    }

    /// Feed a finished question back into the session
    pub fn apply_reply(&mut self, pending: PendingQuestion, outcome: Outcome) {
        if self.session.resolve(pending, outcome) == Resolution::Discarded {
            info!("Dropped a reply that arrived after reset");
        }
    }

    pub fn on_resize(&mut self, width: u16) {
        if self.layout.on_resize(width) {
            info!(
                width,
                sidebar = self.layout.sidebar_visible(),
                "Layout changed"
            );
        }
    }

    fn scroll_up(&mut self, rows: u16) {
        self.follow = false;
        self.scroll = self.scroll.saturating_sub(rows);
    }

    fn scroll_down(&mut self, rows: u16) {
        self.scroll = self.scroll.saturating_add(rows);
    }

    fn state_label(&self) -> &'static str {
        match self.session.state() {
            SessionState::Idle => "idle",
            SessionState::AwaitingResponse => "waiting",
        }
    }

    fn transcript_lines(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for turn in self.session.turns() {
            let (label, color) = match turn.author() {
                Author::User => ("you", Color::Cyan),
                Author::Assistant => ("andy", Color::Green),
            };
            let time = turn
                .sent_at()
                .with_timezone(&chrono::Local)
                .format("%H:%M")
                .to_string();
            lines.push(Line::from(vec![
                Span::styled(
                    label,
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!(" {}", time), Style::default().fg(Color::DarkGray)),
            ]));
            for text_line in turn.text().lines() {
                lines.push(Line::raw(text_line.to_string()));
            }
            lines.push(Line::default());
        }

        if self.session.is_busy() {
            lines.push(Line::styled(
                "andy is typing...",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ));
        }
        lines
    }

    fn sidebar_lines(&self) -> Vec<Line<'static>> {
        let turns = self.session.turns();
        let questions = turns.iter().filter(|t| t.is_user()).count();
        vec![
            Line::from(format!("questions: {}", questions)),
            Line::from(format!("turns: {}", turns.len())),
            Line::from(format!("state: {}", self.state_label())),
            Line::default(),
            Line::styled("/reset  start over", Style::default().fg(Color::DarkGray)),
            Line::styled("/quit   leave", Style::default().fg(Color::DarkGray)),
        ]
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(5),
            ])
            .split(frame.area());

        frame.render_widget(
            Paragraph::new(format!(
                "service: {} | status: {}",
                self.endpoint,
                self.state_label()
            ))
                .block(Block::default().borders(Borders::ALL).title("andy-chat")),
            chunks[0],
        );

        let (transcript_area, sidebar_area) = self.split_body(chunks[1]);
        self.render_transcript(frame, transcript_area);
        if let Some(area) = sidebar_area {
            frame.render_widget(
                Paragraph::new(self.sidebar_lines())
                    .block(Block::default().borders(Borders::ALL).title("details")),
                area,
            );
        }

        let draft = self.session.draft_input();
        frame.render_widget(
            Paragraph::new(draft.to_string())
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title("ask (Enter send, Shift+Enter newline)"),
                )
                .wrap(Wrap { trim: false }),
            chunks[2],
        );

        let last_line = draft.rsplit('\n').next().unwrap_or("");
        let row = draft.matches('\n').count() as u16;
        let max_x = chunks[2].x + chunks[2].width.saturating_sub(2);
        let max_y = chunks[2].y + chunks[2].height.saturating_sub(2);
        frame.set_cursor_position((
            (chunks[2].x + 1 + last_line.chars().count() as u16).min(max_x),
            (chunks[2].y + 1 + row).min(max_y),
        ));
    }

    fn split_body(&self, area: Rect) -> (Rect, Option<Rect>) {
        if !self.layout.sidebar_visible() {
            return (area, None);
        }
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1), Constraint::Length(SIDEBAR_WIDTH)])
            .split(area);
        (columns[0], Some(columns[1]))
    }

    fn render_transcript(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("conversation");
        let inner = block.inner(area);
        let transcript = Paragraph::new(self.transcript_lines()).wrap(Wrap { trim: false });

        // Measured with the same wrapping the paragraph renders with
        let rows = u16::try_from(transcript.line_count(inner.width)).unwrap_or(u16::MAX);
        let max_scroll = rows.saturating_sub(inner.height);
        if self.follow || self.scroll >= max_scroll {
            self.scroll = max_scroll;
            self.follow = true;
        }

        frame.render_widget(transcript.block(block).scroll((self.scroll, 0)), area);
    }
}

/// Run the interactive chat until the user quits
pub async fn run_tui(config: &Config, service: Arc<dyn AnswerService>) -> Result<()> {
    let endpoint = service.endpoint();
    let mut dispatcher = Dispatcher::spawn(service);
    let (width, _) = crossterm::terminal::size()?;
    let mut app = TuiApp::new(
        endpoint,
        ResponsiveLayout::new(config.ui.sidebar_min_width, width),
    );

    enable_raw_mode()?;
    set_panic_hook();
    with_restore(
        || {
            io::stdout().execute(EnterAlternateScreen)?;
            let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
            event_loop(&mut terminal, &mut app, &mut dispatcher)
        },
        restore_terminal,
    )
}

/// Run `body`, then `restore` whatever the outcome. The body's error wins.
fn with_restore<T>(
    body: impl FnOnce() -> Result<T>,
    restore: impl FnOnce() -> Result<()>,
) -> Result<T> {
    let result = body();
    let restored = restore();
    let value = result?;
    restored?;
    Ok(value)
}

fn restore_terminal() -> Result<()> {
    let _ = io::stdout().execute(LeaveAlternateScreen);
    disable_raw_mode()?;
    io::stdout().execute(crossterm::cursor::Show)?;
    Ok(())
}

fn set_panic_hook() {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        hook(info);
    }));
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut TuiApp,
    dispatcher: &mut Dispatcher,
) -> Result<()> {
    loop {
        while let Some((pending, outcome)) = dispatcher.try_recv() {
            app.apply_reply(pending, outcome);
        }

        terminal.draw(|frame| app.render(frame))?;

        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                CEvent::Key(key) => {
                    if let Some(pending) = app.handle_key(key) {
                        if let Err(pending) = dispatcher.send(pending) {
                            warn!("Request worker is gone");
                            app.apply_reply(
                                pending,
                                Outcome::Unreachable("request worker stopped".to_string()),
                            );
                        }
                    }
                }
                CEvent::Resize(width, _) => app.on_resize(width),
                _ => {}
            }
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use andy_chat_core::session::SEED_GREETING;
    use ratatui::backend::TestBackend;

    fn app(width: u16) -> TuiApp {
        TuiApp::new(
            "http://localhost:5000".to_string(),
            ResponsiveLayout::new(100, width),
        )
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut TuiApp, text: &str) {
        for ch in text.chars() {
            assert!(app.handle_key(press(KeyCode::Char(ch))).is_none());
        }
    }

    fn screen(app: &mut TuiApp, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_enter_submits_draft() {
        let mut app = app(120);
        type_text(&mut app, "Who is Andy?");

        let pending = app.handle_key(press(KeyCode::Enter)).unwrap();
        assert_eq!(pending.question(), "Who is Andy?");
        assert!(app.session().is_busy());
        assert!(app.session().draft_input().is_empty());
    }

    #[test]
    fn test_enter_on_blank_draft_sends_nothing() {
        let mut app = app(120);
        type_text(&mut app, "   ");
        assert!(app.handle_key(press(KeyCode::Enter)).is_none());
        assert_eq!(app.session().turns().len(), 1);
    }

    #[test]
    fn test_enter_while_waiting_keeps_draft() {
        let mut app = app(120);
        type_text(&mut app, "first");
        app.handle_key(press(KeyCode::Enter)).unwrap();

        type_text(&mut app, "second");
        assert!(app.handle_key(press(KeyCode::Enter)).is_none());
        assert_eq!(app.session().draft_input(), "second");
    }

    #[test]
    fn test_editing_keys() {
        let mut app = app(120);
        type_text(&mut app, "ab");
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT));
        type_text(&mut app, "cd");
        app.handle_key(press(KeyCode::Backspace));
        assert_eq!(app.session().draft_input(), "ab\nc");
    }

    #[test]
    fn test_reset_and_quit_commands() {
        let mut app = app(120);
        type_text(&mut app, "hello");
        let pending = app.handle_key(press(KeyCode::Enter)).unwrap();
        app.apply_reply(pending, Outcome::Answered("hi".to_string()));
        assert_eq!(app.session().turns().len(), 3);

        type_text(&mut app, "/reset");
        assert!(app.handle_key(press(KeyCode::Enter)).is_none());
        assert_eq!(app.session().turns().len(), 1);
        assert_eq!(app.session().turns()[0].text(), SEED_GREETING);

        type_text(&mut app, "/quit");
        app.handle_key(press(KeyCode::Enter));
        assert!(app.should_quit());
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut app = app(120);
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit());
        assert!(app.session().draft_input().is_empty());
    }

    #[test]
    fn test_reply_appends_and_shows_error_text() {
        let mut app = app(120);
        type_text(&mut app, "X");
        let pending = app.handle_key(press(KeyCode::Enter)).unwrap();
        app.apply_reply(pending, Outcome::Rejected("not found".to_string()));

        assert_eq!(app.session().last_turn().unwrap().text(), "Error: not found");
        assert!(screen(&mut app, 120, 30).contains("Error: not found"));
    }

    #[test]
    fn test_typing_indicator_while_waiting() {
        let mut app = app(120);
        type_text(&mut app, "X");
        app.handle_key(press(KeyCode::Enter)).unwrap();

        let rendered = screen(&mut app, 120, 30);
        assert!(rendered.contains("andy is typing..."));
        assert!(rendered.contains("status: waiting"));
    }

    #[test]
    fn test_sidebar_follows_resize_events() {
        let mut app = app(120);
        assert!(screen(&mut app, 120, 30).contains("details"));

        app.on_resize(80);
        assert!(!screen(&mut app, 80, 30).contains("details"));

        app.on_resize(130);
        assert!(screen(&mut app, 130, 30).contains("details"));
    }

    #[test]
    fn test_transcript_follows_newest_turn() {
        let mut app = app(80);
        for i in 0..20 {
            type_text(&mut app, &format!("question {}", i));
            let pending = app.handle_key(press(KeyCode::Enter)).unwrap();
            app.apply_reply(pending, Outcome::Answered(format!("answer {}", i)));
        }

        let rendered = screen(&mut app, 80, 20);
        assert!(rendered.contains("answer 19"));
        assert!(!rendered.contains(SEED_GREETING));

        app.handle_key(press(KeyCode::PageUp));
        app.handle_key(press(KeyCode::PageUp));
        let scrolled = screen(&mut app, 80, 20);
        assert!(!scrolled.contains("answer 19"));
    }

    #[test]
    fn test_long_prose_answer_scrolls_to_last_word() {
        let mut app = app(40);
        type_text(&mut app, "Tell me everything");
        let pending = app.handle_key(press(KeyCode::Enter)).unwrap();
        let answer = format!("{}FINALWORD", "abcdefghijklmnopqrstu ".repeat(10));
        app.apply_reply(pending, Outcome::Answered(answer));

        assert!(screen(&mut app, 40, 20).contains("FINALWORD"));

        app.handle_key(press(KeyCode::PageUp));
        app.handle_key(press(KeyCode::PageUp));
        assert!(!screen(&mut app, 40, 20).contains("FINALWORD"));

        app.handle_key(press(KeyCode::PageDown));
        app.handle_key(press(KeyCode::PageDown));
        app.handle_key(press(KeyCode::PageDown));
        assert!(screen(&mut app, 40, 20).contains("FINALWORD"));
    }

    #[test]
    fn test_modified_letters_are_not_typed() {
        let mut app = app(120);
        app.handle_key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL));
        app.handle_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT));
        app.handle_key(KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT));
        assert_eq!(app.session().draft_input(), "A");
        assert!(!app.should_quit());
    }

    #[test]
    fn test_with_restore_runs_after_failure() {
        let restored = std::cell::Cell::new(false);
        let result: Result<()> = with_restore(
            || Err(anyhow::anyhow!("terminal setup failed")),
            || {
                restored.set(true);
                Ok(())
            },
        );

        assert!(restored.get());
        assert_eq!(result.unwrap_err().to_string(), "terminal setup failed");
    }
}
