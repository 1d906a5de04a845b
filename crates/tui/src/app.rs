use std::{cmp, io, thread, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use poker_core::{
    generate_room_id,
    models::{card_tier, initials, CardTier, Participant, VoteDisplay, CARD_VALUES, EMOJIS},
    store::SharedStore,
    RoomController, RoomError, RoomEvent, RoomStatus, RoomView,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::rain::RainOverlay;

const TICK_RATE: Duration = Duration::from_millis(80);
const MAX_NAME_LEN: usize = 32;
const MAX_ROOM_LEN: usize = 32;
const MAX_STORY_LEN: usize = 200;

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    selection_bg: Color,
    selection_fg: Color,
    success: Color,
    warning: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::Cyan,
            selection_fg: Color::Black,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

impl Theme {
    fn tier(&self, tier: Option<CardTier>) -> Color {
        match tier {
            Some(CardTier::Low) => self.success,
            Some(CardTier::Mid) => self.warning,
            Some(CardTier::High) => self.danger,
            Some(CardTier::Neutral) | None => self.primary_fg,
        }
    }
}

/// Single-line text field with a character cursor.
#[derive(Debug, Clone)]
struct TextInput {
    value: String,
    cursor: usize,
    max_len: usize,
}

impl TextInput {
    fn new(value: impl Into<String>, max_len: usize) -> Self {
        let value: String = value.into().chars().take(max_len).collect();
        let cursor = value.chars().count();
        Self {
            value,
            cursor,
            max_len,
        }
    }

    fn value(&self) -> &str {
        &self.value
    }

    fn set(&mut self, value: impl Into<String>) {
        *self = Self::new(value, self.max_len);
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_index(&self, cursor: usize) -> usize {
        self.value
            .char_indices()
            .nth(cursor)
            .map(|(index, _)| index)
            .unwrap_or(self.value.len())
    }

    fn move_cursor(&mut self, delta: isize) {
        let next = self.cursor as isize + delta;
        self.cursor = next.clamp(0, self.len() as isize) as usize;
    }

    fn insert(&mut self, ch: char) {
        if self.len() >= self.max_len {
            return;
        }
        let index = self.byte_index(self.cursor);
        self.value.insert(index, ch);
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let index = self.byte_index(self.cursor);
        self.value.remove(index);
    }

    fn delete(&mut self) {
        if self.cursor >= self.len() {
            return;
        }
        let index = self.byte_index(self.cursor);
        self.value.remove(index);
    }

    /// Apply an editing key. Returns `false` for keys the field ignores.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Left => self.move_cursor(-1),
            KeyCode::Right => self.move_cursor(1),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.len(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Char(c)
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
            {
                self.insert(c)
            }
            _ => return false,
        }
        true
    }
}

/// Values pre-filled into the join form from the command line.
#[derive(Debug, Clone, Default)]
pub struct Prefill {
    pub room: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug)]
enum AppEvent {
    Input(Event),
    Tick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Join,
    Room,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoinField {
    Room,
    Name,
}

/// Terminal front end driving a [`RoomController`].
pub struct PokerApp<S> {
    controller: RoomController<S>,
    screen: Screen,
    room_input: TextInput,
    name_input: TextInput,
    focus: JoinField,
    story_editor: Option<TextInput>,
    card_cursor: usize,
    emoji_cursor: usize,
    rain: Option<RainOverlay>,
    status: String,
    should_quit: bool,
    offline: bool,
    theme: Theme,
}

impl<S: SharedStore> PokerApp<S> {
    pub fn new(controller: RoomController<S>, prefill: Prefill, offline: bool) -> Self {
        let name = prefill.name.unwrap_or_else(|| controller.saved_name());
        let room = prefill.room.unwrap_or_default();
        let focus = if room.is_empty() {
            JoinField::Room
        } else {
            JoinField::Name
        };
        let status = if offline {
            "No database configured; rooms are local to this process".to_string()
        } else {
            "Enter a room or leave it blank to create one".to_string()
        };
        Self {
            controller,
            screen: Screen::Join,
            room_input: TextInput::new(room, MAX_ROOM_LEN),
            name_input: TextInput::new(name, MAX_NAME_LEN),
            focus,
            story_editor: None,
            card_cursor: 0,
            emoji_cursor: 0,
            rain: None,
            status,
            should_quit: false,
            offline,
            theme: Theme::default(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        let result = self.event_loop(&mut terminal, &mut event_rx).await;
        match &result {
            Ok(()) => self.controller.leave().await,
            Err(err) => {
                error!(?err, "ui loop failed");
                self.controller.teardown();
            }
        }

        restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        event_rx: &mut mpsc::Receiver<AppEvent>,
    ) -> Result<()> {
        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.should_quit {
                break;
            }

            tokio::select! {
                maybe_event = event_rx.recv() => {
                    if !self.process_app_event(maybe_event).await {
                        break;
                    }
                }
                maybe_room = self.controller.next_event(), if self.controller.is_listening() => {
                    if let Some(event) = maybe_room {
                        self.handle_room_event(event);
                    }
                }
            }
        }
        Ok(())
    }

    async fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                self.handle_key(key).await;
                true
            }
            Some(AppEvent::Input(_)) => true,
            Some(AppEvent::Tick) => {
                if let Some(rain) = self.rain.as_mut() {
                    if !rain.tick() {
                        self.rain = None;
                    }
                }
                true
            }
            None => false,
        }
    }

    fn handle_room_event(&mut self, event: RoomEvent) {
        match event {
            RoomEvent::EmojiRain(emoji) => {
                let width = terminal::size().map(|(width, _)| width).unwrap_or(80);
                self.rain = Some(RainOverlay::new(emoji, width));
            }
            RoomEvent::ConnectionChanged(false) => {
                self.set_status("Lost live updates; press x and rejoin to resume".to_string());
            }
            RoomEvent::ConnectionChanged(true) => info!("receiving live room updates"),
            RoomEvent::RevealChanged(_)
            | RoomEvent::StoryChanged(_)
            | RoomEvent::ParticipantsChanged(_) => {}
        }
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        match self.screen {
            Screen::Join => self.handle_join_key(key).await,
            Screen::Room if self.story_editor.is_some() => self.handle_story_key(key).await,
            Screen::Room => self.handle_room_key(key).await,
        }
    }

    async fn handle_join_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.focus = match self.focus {
                    JoinField::Room => JoinField::Name,
                    JoinField::Name => JoinField::Room,
                };
            }
            KeyCode::Char('g') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                let room = generate_room_id();
                self.room_input.set(room.to_string());
                self.set_status(format!("Generated room {room}"));
            }
            KeyCode::Enter => self.join().await,
            _ => {
                let input = match self.focus {
                    JoinField::Room => &mut self.room_input,
                    JoinField::Name => &mut self.name_input,
                };
                input.handle_key(key);
            }
        }
    }

    async fn join(&mut self) {
        if self.room_input.value().trim().is_empty() {
            self.room_input.set(generate_room_id().to_string());
        }
        let room = self.room_input.value().to_string();
        let name = self.name_input.value().to_string();
        match self.controller.join(&room, &name).await {
            Ok(joined) => {
                info!(room = %joined.room_id, status = ?joined.status, "entered room");
                self.room_input.set(joined.room_id.to_string());
                self.name_input.set(joined.name.clone());
                self.screen = Screen::Room;
                self.card_cursor = 0;
                let message = match joined.status {
                    RoomStatus::Fresh => format!("Created room {}", joined.room_id),
                    RoomStatus::Active => format!("Joined room {}", joined.room_id),
                    RoomStatus::Expired => {
                        format!("Room {} had expired; started fresh", joined.room_id)
                    }
                };
                self.set_status(message);
            }
            Err(err) => self.set_status(format!("Join failed: {err}")),
        }
    }

    async fn handle_room_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Left | KeyCode::Char('h') => {
                self.card_cursor = self.card_cursor.saturating_sub(1);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.card_cursor = cmp::min(self.card_cursor + 1, CARD_VALUES.len() - 1);
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                let card = CARD_VALUES[self.card_cursor];
                let result = self.controller.cast_vote(card).await;
                self.report(result, format!("Voted {card}"));
            }
            KeyCode::Char('r') => {
                let result = self.controller.toggle_reveal().await;
                self.report(result, "Reveal toggled".to_string());
            }
            KeyCode::Char('c') => {
                let result = self.controller.clear_round().await;
                self.report(result, "Round cleared".to_string());
            }
            KeyCode::Char('s') => {
                let story = self
                    .controller
                    .view()
                    .map(|view| view.story.clone())
                    .unwrap_or_default();
                self.story_editor = Some(TextInput::new(story, MAX_STORY_LEN));
                self.set_status("Editing story: Enter to save, Esc to cancel".to_string());
            }
            KeyCode::Char('e') => {
                let emoji = EMOJIS[self.emoji_cursor];
                let result = self.controller.trigger_emoji_rain(emoji).await;
                self.report(result, format!("Sent {emoji}"));
            }
            KeyCode::Char('E') => {
                self.emoji_cursor = (self.emoji_cursor + 1) % EMOJIS.len();
            }
            KeyCode::Char('x') => {
                self.controller.leave().await;
                self.screen = Screen::Join;
                self.rain = None;
                self.set_status("Left the room".to_string());
            }
            _ => {}
        }
    }

    async fn handle_story_key(&mut self, key: KeyEvent) {
        let Some(editor) = self.story_editor.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => {
                self.story_editor = None;
                self.set_status("Story unchanged".to_string());
            }
            KeyCode::Enter => {
                let story = editor.value().trim().to_string();
                self.story_editor = None;
                let result = self.controller.set_story(&story).await;
                self.report(result, "Story updated".to_string());
            }
            _ => {
                editor.handle_key(key);
            }
        }
    }

    fn report(&mut self, result: Result<(), RoomError>, success: String) {
        match result {
            Ok(()) => self.set_status(success),
            Err(err) => self.set_status(format!("Error: {err}")),
        }
    }

    fn set_status(&mut self, message: String) {
        self.status = message;
    }

    fn draw(&self, frame: &mut Frame) {
        match self.screen {
            Screen::Join => self.draw_join(frame),
            Screen::Room => self.draw_room(frame),
        }
        if let Some(rain) = &self.rain {
            self.render_rain(frame, rain);
        }
    }

    fn draw_join(&self, frame: &mut Frame) {
        let area = frame.size();
        let width = cmp::max(cmp::min(60_u16, area.width.saturating_sub(4)), 24_u16);
        let height = 11_u16.min(area.height);
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        let form = Rect::new(x, y, width, height);

        frame.render_widget(Clear, form);

        let label = |field: JoinField, text: &'static str| {
            let style = if self.focus == field {
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.muted)
            };
            Span::styled(text, style)
        };
        let key =
            |text: &'static str| Span::styled(text, Style::default().add_modifier(Modifier::BOLD));

        let lines = vec![
            Line::from(label(JoinField::Room, "Room")),
            Line::from(vec![
                Span::styled("> ", Style::default().fg(self.theme.accent)),
                Span::raw(self.room_input.value().to_string()),
            ]),
            Line::from(label(JoinField::Name, "Name")),
            Line::from(vec![
                Span::styled("> ", Style::default().fg(self.theme.accent)),
                Span::raw(self.name_input.value().to_string()),
            ]),
            Line::from(""),
            Line::from(vec![
                key("Enter"),
                Span::raw(" join  "),
                key("Tab"),
                Span::raw(" switch  "),
                key("Ctrl-G"),
                Span::raw(" new room  "),
                key("Esc"),
                Span::raw(" quit"),
            ]),
            Line::from(Span::styled(
                self.status.clone(),
                Style::default().fg(self.theme.muted),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Planning Poker"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, form);

        let (input, row) = match self.focus {
            JoinField::Room => (&self.room_input, 2),
            JoinField::Name => (&self.name_input, 4),
        };
        let cursor_x = (form.x + 3 + input.cursor as u16).min(form.right().saturating_sub(2));
        frame.set_cursor(cursor_x, form.y + row);
    }

    fn draw_room(&self, frame: &mut Frame) {
        let Some(view) = self.controller.view() else {
            return;
        };
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(frame.size());

        self.render_header(frame, rows[0], view);
        self.render_story(frame, rows[1], view);

        let middle = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(rows[2]);
        self.render_participants(frame, middle[0], view);
        self.render_summary(frame, middle[1], view);

        self.render_cards(frame, rows[3], view);
        self.render_status(frame, rows[4]);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, view: &RoomView) {
        let (room, name) = self
            .controller
            .joined()
            .map(|joined| (joined.room_id.to_string(), joined.name.clone()))
            .unwrap_or_default();
        let connection = if view.connected {
            Span::styled("● live", Style::default().fg(self.theme.success))
        } else {
            Span::styled("○ disconnected", Style::default().fg(self.theme.danger))
        };
        let mut spans = vec![
            Span::styled(
                room,
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  you: {name}  ")),
            connection,
        ];
        if self.offline {
            spans.push(Span::styled(
                "  (local only)",
                Style::default().fg(self.theme.muted),
            ));
        }
        let paragraph = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL).title("Room"));
        frame.render_widget(paragraph, area);
    }

    fn render_story(&self, frame: &mut Frame, area: Rect, view: &RoomView) {
        let block = Block::default().borders(Borders::ALL).title("Story");
        if let Some(editor) = &self.story_editor {
            let paragraph = Paragraph::new(Line::from(vec![
                Span::styled("> ", Style::default().fg(self.theme.accent)),
                Span::raw(editor.value().to_string()),
            ]))
            .block(block);
            frame.render_widget(paragraph, area);
            let cursor_x = (area.x + 3 + editor.cursor as u16).min(area.right().saturating_sub(2));
            frame.set_cursor(cursor_x, area.y + 1);
            return;
        }
        let line = if view.story.is_empty() {
            Line::from(Span::styled(
                "No story set (press s)",
                Style::default().fg(self.theme.muted),
            ))
        } else {
            Line::from(view.story.clone())
        };
        frame.render_widget(Paragraph::new(line).block(block), area);
    }

    fn render_participants(&self, frame: &mut Frame, area: Rect, view: &RoomView) {
        let me = self.controller.joined().map(|joined| joined.client_id.as_str());
        let items: Vec<ListItem> = view
            .participants
            .iter()
            .map(|(client, participant)| {
                self.participant_item(participant, view.reveal, me == Some(client.as_str()))
            })
            .collect();
        let title = format!("Participants ({})", view.participants.len());
        let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(list, area);
    }

    fn participant_item(
        &self,
        participant: &Participant,
        reveal: bool,
        is_me: bool,
    ) -> ListItem<'static> {
        let name = participant.display_name();
        let (vote, vote_style) = match participant.vote_display(reveal) {
            VoteDisplay::Hidden if participant.has_voted() => {
                ("voted".to_string(), Style::default().fg(self.theme.success))
            }
            VoteDisplay::Shown(value) => {
                let color = self.theme.tier(card_tier(&value));
                (value, Style::default().fg(color).add_modifier(Modifier::BOLD))
            }
            other => (other.label().to_string(), Style::default().fg(self.theme.muted)),
        };
        let mut spans = vec![
            Span::styled(
                format!("[{:<2}] ", initials(&name)),
                Style::default().fg(self.theme.accent),
            ),
            Span::raw(format!("{name:<24}")),
            Span::styled(vote, vote_style),
        ];
        if is_me {
            spans.push(Span::styled("  (you)", Style::default().fg(self.theme.muted)));
        }
        ListItem::new(Line::from(spans))
    }

    fn render_summary(&self, frame: &mut Frame, area: Rect, view: &RoomView) {
        let summary = view.summary();
        let reveal = if view.reveal {
            Span::styled("revealed", Style::default().fg(self.theme.warning))
        } else {
            Span::styled("hidden", Style::default().fg(self.theme.muted))
        };
        let lines = vec![
            Line::from(vec![Span::raw("Votes:   "), reveal]),
            Line::from(format!("Voted:   {}", summary.progress_label())),
            Line::from(format!("Min:     {}", summary.min_label())),
            Line::from(format!("Max:     {}", summary.max_label())),
            Line::from(format!("Average: {}", summary.average_label())),
        ];
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Round"));
        frame.render_widget(paragraph, area);
    }

    fn render_cards(&self, frame: &mut Frame, area: Rect, view: &RoomView) {
        let own_vote = self
            .controller
            .joined()
            .and_then(|joined| view.participant(&joined.client_id))
            .map(|participant| participant.vote.as_str())
            .unwrap_or_default();
        let mut spans = Vec::with_capacity(CARD_VALUES.len() * 2);
        for (index, card) in CARD_VALUES.iter().enumerate() {
            let mut style = Style::default().fg(self.theme.tier(card_tier(card)));
            if *card == own_vote {
                style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
            }
            if index == self.card_cursor {
                style = style.bg(self.theme.selection_bg).fg(self.theme.selection_fg);
            }
            spans.push(Span::styled(format!(" {card} "), style));
            spans.push(Span::raw(" "));
        }
        let paragraph = Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Cards"));
        frame.render_widget(paragraph, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let emoji = EMOJIS[self.emoji_cursor];
        let help = format!(
            "←/→ card  Enter vote  r reveal  c clear  s story  e {emoji}  E next emoji  x leave  q quit"
        );
        let paragraph = Paragraph::new(vec![Line::from(self.status.clone())])
            .block(Block::default().borders(Borders::ALL).title(help))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_rain(&self, frame: &mut Frame, rain: &RainOverlay) {
        for cell in rain.cells(frame.size()) {
            frame.render_widget(Paragraph::new(rain.emoji().to_string()), cell);
        }
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn text_input_edits_at_cursor() {
        let mut input = TextInput::new("Ad", 10);
        input.handle_key(key(KeyCode::Char('a')));
        assert_eq!(input.value(), "Ada");
        input.handle_key(key(KeyCode::Home));
        input.handle_key(key(KeyCode::Delete));
        assert_eq!(input.value(), "da");
        input.handle_key(key(KeyCode::End));
        input.handle_key(key(KeyCode::Backspace));
        assert_eq!(input.value(), "d");
    }

    #[test]
    fn text_input_respects_limit_and_multibyte_chars() {
        let mut input = TextInput::new("héllo wörld", 5);
        assert_eq!(input.value(), "héllo");
        input.handle_key(key(KeyCode::Char('!')));
        assert_eq!(input.value(), "héllo");
        input.move_cursor(-4);
        input.handle_key(key(KeyCode::Backspace));
        assert_eq!(input.value(), "éllo");
        assert!(!input.handle_key(key(KeyCode::Enter)));
    }
}
