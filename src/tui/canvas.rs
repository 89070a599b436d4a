use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph};
use ratatui::{Frame, Terminal};

use crate::commands::init::split_name;
use crate::graph::error::GraphError;
use crate::graph::model::{Gender, People, PersonDetails, ROOT_ID};
use crate::graph::mutate::{self, DeleteOutcome, PersonEdit};
use crate::graph::query;
use crate::layout::{self, HighlightState};
use crate::persist;
use crate::session::TreeSession;
use crate::store;
use crate::tui::input::{self, Action, Direction};
use crate::tui::render::{self, Placement, TreeRenderData};
use crate::viewport::{Point, Viewport};

#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingTextKind {
    AddSpouse { anchor: String },
    AddChild { anchor: String },
    AddParent { anchor: String },
    AddSibling { anchor: String },
    EditName { id: String },
}

#[derive(Debug, Clone)]
struct PendingText {
    title: String,
    buffer: String,
    cursor: usize,
    kind: PendingTextKind,
}

#[derive(Debug, Clone)]
enum PendingConfirm {
    DeletePerson { id: String },
}

struct AppState {
    tree_path: Option<PathBuf>,
    session: TreeSession,
    viewport: Viewport,
    highlight: HighlightState,
    focused: String,
    placement: Placement,
    show_help: bool,
    status_message: Option<String>,
    pending_text: Option<PendingText>,
    pending_confirm: Option<PendingConfirm>,
    dirty: bool,
    demo: bool,
}

impl AppState {
    fn load(demo: bool) -> Result<Self> {
        if demo {
            return Ok(Self::with_session(
                demo_session(),
                None,
                Some("demo mode: changes are in-memory only".to_string()),
                true,
            ));
        }

        let root = store::find_root()?;
        let tree_path = store::tree_path(&root);
        let (session, message) = match persist::load(&tree_path)? {
            Some(snapshot) => match TreeSession::from_snapshot(snapshot) {
                Ok(session) => (session, None),
                // An unreadable tree is treated as no data, not a crash.
                Err(err) => (
                    TreeSession::with_founder(split_name("Founder")),
                    Some(format!("stored tree rejected ({err}); starting fresh")),
                ),
            },
            None => (
                TreeSession::with_founder(split_name("Founder")),
                Some("no tree found; starting fresh".to_string()),
            ),
        };
        Ok(Self::with_session(session, Some(tree_path), message, false))
    }

    fn with_session(
        session: TreeSession,
        tree_path: Option<PathBuf>,
        status_message: Option<String>,
        demo: bool,
    ) -> Self {
        let focused = session.nav.current().to_string();
        Self {
            tree_path,
            session,
            viewport: Viewport::default(),
            highlight: HighlightState::default(),
            focused,
            placement: Placement::default(),
            show_help: false,
            status_message,
            pending_text: None,
            pending_confirm: None,
            dirty: false,
            demo,
        }
    }

    // ----- drawing -----

    fn draw(&mut self, frame: &mut Frame) {
        let view_root = self.session.nav.current().to_string();
        self.placement = match layout::layout(&self.session.people, &view_root, &self.highlight) {
            Some(tree) => render::place(&tree, &self.session.people),
            None => Placement::default(),
        };
        if !self.placement.cards.iter().any(|c| c.id == self.focused) {
            self.focused = view_root.clone();
        }

        let breadcrumb_names: Vec<String> = self
            .session
            .nav
            .entries()
            .iter()
            .map(|id| {
                self.session
                    .people
                    .get(id)
                    .map(|p| p.display_name())
                    .unwrap_or_else(|| id.clone())
            })
            .collect();
        let details = self.details_lines();
        let hints = self.hints();

        let data = TreeRenderData {
            placement: &self.placement,
            transform: self.viewport.transform(),
            breadcrumb: self.session.nav.entries(),
            breadcrumb_names: &breadcrumb_names,
            focused_id: Some(self.focused.as_str()),
            details: Some(details.as_slice()),
            hints: &hints,
            message: self.status_message.as_deref(),
            show_help: self.show_help,
            demo: self.demo,
        };
        render::draw(frame, &data);

        if let Some(prompt) = &self.pending_text {
            draw_text_prompt(frame, prompt);
        } else if let Some(confirm) = &self.pending_confirm {
            self.draw_confirm_prompt(frame, confirm);
        }
    }

    fn details_lines(&self) -> Vec<String> {
        let Some(person) = self.session.people.get(&self.focused) else {
            return Vec::new();
        };
        let mut lines = vec![person.display_name()];
        lines.push(match person.gender {
            Gender::Male => "male".to_string(),
            Gender::Female => "female".to_string(),
        });
        if let Some(birth) = &person.birth_date {
            lines.push(format!("born {birth}"));
        }
        if let Some(death) = &person.death_date {
            lines.push(format!("died {death}"));
        }
        if let Some(cemetery) = &person.cemetery_address {
            lines.push(format!("resting at {cemetery}"));
        }
        if let Some(spouse) = &person.spouse_id {
            lines.push(format!("married to {}", self.name_of(spouse)));
        }
        for ex in &person.ex_spouse_ids {
            lines.push(format!("formerly married to {}", self.name_of(ex)));
        }
        if !person.parent_ids.is_empty() {
            let parents: Vec<String> =
                person.parent_ids.iter().map(|p| self.name_of(p)).collect();
            lines.push(format!("child of {}", parents.join(" and ")));
        }
        let children = person.unique_children();
        if !children.is_empty() {
            lines.push(format!("{} child(ren)", children.len()));
        }
        if !person.contact_info.phone.is_empty() {
            lines.push(format!("tel {}", person.contact_info.phone));
        }
        if !person.contact_info.email.is_empty() {
            lines.push(format!("mail {}", person.contact_info.email));
        }
        if let Some(bio) = &person.bio {
            lines.push(String::new());
            lines.push(bio.clone());
        }
        lines
    }

    fn name_of(&self, id: &str) -> String {
        self.session
            .people
            .get(id)
            .map(|p| p.display_name())
            .unwrap_or_else(|| id.to_string())
    }

    fn hints(&self) -> String {
        if self.pending_text.is_some() {
            return "type a name, [Backspace] delete, [Enter] apply, [Esc] cancel".to_string();
        }
        if self.pending_confirm.is_some() {
            return "[y] confirm  [n/Esc/Backspace] cancel".to_string();
        }
        "[arrows] focus  [Enter] open  [Esc] back  [m/c/p/b] add  [e] edit  [D] delete  [x] highlight  [+/-/0] zoom  [q] quit"
            .to_string()
    }

    fn draw_confirm_prompt(&self, frame: &mut Frame, confirm: &PendingConfirm) {
        let PendingConfirm::DeletePerson { id } = confirm;
        let area = centered_rect(frame.area(), 50, 7);
        frame.render_widget(Clear, area);
        let body = Paragraph::new(vec![
            Line::from(Span::styled(
                format!("Delete {}?", self.name_of(id)),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Their relationships will be unlinked.",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::LightRed))
                .padding(Padding::new(2, 2, 1, 1)),
        );
        frame.render_widget(body, area);
    }

    // ----- keys -----

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        self.status_message = None;

        if self.pending_confirm.is_some() {
            return self.handle_confirm_key(key);
        }

        let in_text_mode = self.pending_text.is_some();
        let action = input::action_for_key(key, in_text_mode);
        if in_text_mode {
            self.handle_text_action(action);
            return Ok(false);
        }

        match action {
            Action::Quit => return Ok(true),
            Action::ToggleHelp => self.show_help = !self.show_help,
            Action::ZoomIn => self.viewport.zoom_in(),
            Action::ZoomOut => self.viewport.zoom_out(),
            Action::ResetView => self.viewport.reset(),
            Action::Move(direction) => {
                if let Some(next) = nearest_in_direction(&self.placement, &self.focused, direction)
                {
                    self.focused = next;
                }
            }
            Action::NextPerson => self.cycle_focus(),
            Action::Activate => self.open_focused(),
            Action::Back => {
                if self.show_help {
                    self.show_help = false;
                } else if !self.highlight.selected.is_empty() {
                    self.highlight.selected.clear();
                } else if self.session.nav.pop() {
                    self.viewport.reset();
                    self.focused = self.session.nav.current().to_string();
                }
            }
            Action::AddSpouse => self.open_person_prompt(
                "New spouse",
                PendingTextKind::AddSpouse {
                    anchor: self.focused.clone(),
                },
            ),
            Action::RejoinSpouse => self.rejoin_focused(),
            Action::AddChild => self.open_person_prompt(
                "New child",
                PendingTextKind::AddChild {
                    anchor: self.focused.clone(),
                },
            ),
            Action::AddParent => self.open_person_prompt(
                "New parent",
                PendingTextKind::AddParent {
                    anchor: self.focused.clone(),
                },
            ),
            Action::AddSibling => self.open_person_prompt(
                "New sibling",
                PendingTextKind::AddSibling {
                    anchor: self.focused.clone(),
                },
            ),
            Action::EditPerson => {
                let name = self.name_of(&self.focused);
                self.pending_text = Some(PendingText {
                    title: "Edit name".to_string(),
                    cursor: name.chars().count(),
                    buffer: name,
                    kind: PendingTextKind::EditName {
                        id: self.focused.clone(),
                    },
                });
            }
            Action::DeletePerson => {
                if self.focused == ROOT_ID {
                    self.status_message =
                        Some("the founder cannot be removed".to_string());
                } else {
                    self.pending_confirm = Some(PendingConfirm::DeletePerson {
                        id: self.focused.clone(),
                    });
                }
            }
            Action::ToggleHighlight => self.toggle_highlight(self.focused.clone()),
            Action::Noop
            | Action::SubmitText
            | Action::Cancel
            | Action::Backspace
            | Action::InputChar(_) => {}
        }
        Ok(false)
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Result<bool> {
        use crossterm::event::KeyCode;
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                if let Some(PendingConfirm::DeletePerson { id }) = self.pending_confirm.take() {
                    match self.session.delete_person(&id) {
                        Ok(DeleteOutcome::Removed) => {
                            self.dirty = true;
                            self.highlight = HighlightState::default();
                            self.focused = self.session.nav.current().to_string();
                            self.status_message = Some("person deleted".to_string());
                        }
                        Ok(DeleteOutcome::TreeEmptied) => {
                            self.dirty = true;
                            self.status_message =
                                Some("the tree is now empty; quit and run `kin init`".to_string());
                        }
                        Err(err) => self.status_message = Some(err.to_string()),
                    }
                }
            }
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.pending_confirm = None;
            }
            _ => {}
        }
        Ok(false)
    }

    fn open_person_prompt(&mut self, title: &str, kind: PendingTextKind) {
        self.pending_text = Some(PendingText {
            title: title.to_string(),
            buffer: String::new(),
            cursor: 0,
            kind,
        });
    }

    fn handle_text_action(&mut self, action: Action) {
        match action {
            Action::SubmitText => {
                if let Some(prompt) = self.pending_text.take() {
                    self.apply_text_prompt(prompt);
                }
            }
            Action::Cancel => self.pending_text = None,
            Action::Backspace => {
                if let Some(prompt) = &mut self.pending_text
                    && prompt.cursor > 0
                {
                    let from = byte_index_for_cursor(&prompt.buffer, prompt.cursor - 1);
                    let to = byte_index_for_cursor(&prompt.buffer, prompt.cursor);
                    prompt.buffer.replace_range(from..to, "");
                    prompt.cursor -= 1;
                }
            }
            Action::InputChar(c) => {
                if let Some(prompt) = &mut self.pending_text {
                    let at = byte_index_for_cursor(&prompt.buffer, prompt.cursor);
                    prompt.buffer.insert(at, c);
                    prompt.cursor += 1;
                }
            }
            Action::Move(Direction::Left) => {
                if let Some(prompt) = &mut self.pending_text {
                    prompt.cursor = prompt.cursor.saturating_sub(1);
                }
            }
            Action::Move(Direction::Right) => {
                if let Some(prompt) = &mut self.pending_text {
                    let max = prompt.buffer.chars().count();
                    prompt.cursor = (prompt.cursor + 1).min(max);
                }
            }
            _ => {}
        }
    }

    fn apply_text_prompt(&mut self, prompt: PendingText) {
        let name = prompt.buffer.trim();
        if name.is_empty() {
            self.status_message = Some("a name is required".to_string());
            return;
        }
        let details = split_name(name);
        let result = match prompt.kind {
            PendingTextKind::AddSpouse { anchor } => {
                // A new spouse defaults to the opposite gender.
                let gender = self
                    .session
                    .people
                    .get(&anchor)
                    .map(|p| p.gender.opposite())
                    .unwrap_or_default();
                mutate::add_spouse(
                    &mut self.session.people,
                    &anchor,
                    PersonDetails { gender, ..details },
                )
            }
            PendingTextKind::AddChild { anchor } => {
                mutate::add_child(&mut self.session.people, &anchor, details)
            }
            PendingTextKind::AddParent { anchor } => {
                mutate::add_parent(&mut self.session.people, &anchor, details)
            }
            PendingTextKind::AddSibling { anchor } => {
                mutate::add_sibling(&mut self.session.people, &anchor, details)
            }
            PendingTextKind::EditName { id } => {
                let result = self.session.people.get(&id).map(|p| {
                    let mut edit = PersonEdit::from_person(p);
                    edit.first_name = details.first_name;
                    edit.last_name = details.last_name;
                    edit
                });
                match result {
                    Some(edit) => {
                        match mutate::edit_person(&mut self.session.people, &id, edit) {
                            Ok(()) => Ok(id),
                            Err(err) => Err(err),
                        }
                    }
                    None => Err(GraphError::NotFound(id)),
                }
            }
        };
        match result {
            Ok(id) => {
                self.dirty = true;
                self.focused = id;
            }
            Err(err) => self.status_message = Some(err.to_string()),
        }
    }

    /// Re-marry the focused person to their most recent recorded ex-spouse.
    fn rejoin_focused(&mut self) {
        let ex = self
            .session
            .people
            .get(&self.focused)
            .and_then(|p| p.ex_spouse_ids.last().cloned());
        match ex {
            Some(ex) => match mutate::rejoin_spouse(&mut self.session.people, &self.focused, &ex) {
                Ok(()) => {
                    self.dirty = true;
                    self.status_message = Some(format!(
                        "re-married {} and {}",
                        self.name_of(&self.focused),
                        self.name_of(&ex)
                    ));
                }
                Err(err) => self.status_message = Some(err.to_string()),
            },
            None => {
                self.status_message = Some("no recorded ex-spouse to re-marry".to_string());
            }
        }
    }

    // ----- focus and navigation -----

    fn cycle_focus(&mut self) {
        if self.placement.cards.is_empty() {
            return;
        }
        let at = self
            .placement
            .cards
            .iter()
            .position(|c| c.id == self.focused)
            .unwrap_or(0);
        let next = (at + 1) % self.placement.cards.len();
        self.focused = self.placement.cards[next].id.clone();
    }

    fn open_focused(&mut self) {
        if self.session.nav.push(&self.focused) {
            self.viewport.reset();
            self.highlight = HighlightState::default();
        }
    }

    /// Select the family unit around `id`: the couple if married, else the
    /// household of the first parent or child. Selecting it again clears.
    fn toggle_highlight(&mut self, id: String) {
        if self.highlight.selected.contains(&id) {
            self.highlight.selected.clear();
            return;
        }
        let people = &self.session.people;
        let other = people.get(&id).and_then(|p| {
            p.spouse_id
                .clone()
                .or_else(|| p.parent_ids.first().cloned())
                .or_else(|| p.children.first().cloned())
        });
        self.highlight.selected = match other {
            Some(other) => query::family_unit(people, &id, &other),
            None => std::iter::once(id).collect(),
        };
    }

    // ----- mouse -----

    fn handle_mouse(&mut self, mouse: MouseEvent, frame_area: Rect) {
        let chrome = render::chrome(frame_area, true);
        let canvas = chrome.canvas;
        let transform = self.viewport.transform();
        let at = Point::new(
            mouse.column as f32 - canvas.x as f32,
            mouse.row as f32 - canvas.y as f32,
        );
        match mouse.kind {
            MouseEventKind::Moved => {
                self.highlight.hovered = render::card_at(
                    &self.placement,
                    transform,
                    canvas,
                    mouse.column,
                    mouse.row,
                )
                .map(|c| c.id.clone());
            }
            MouseEventKind::Down(MouseButton::Left) => {
                match render::card_at(&self.placement, transform, canvas, mouse.column, mouse.row)
                {
                    Some(card) => {
                        let id = card.id.clone();
                        self.focused = id.clone();
                        self.toggle_highlight(id);
                    }
                    None => self.viewport.pointer_down(at),
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => self.viewport.pointer_move(at),
            MouseEventKind::Up(MouseButton::Left) => self.viewport.pointer_up(),
            MouseEventKind::ScrollUp => self.viewport.wheel(-120.0, at, Instant::now()),
            MouseEventKind::ScrollDown => self.viewport.wheel(120.0, at, Instant::now()),
            _ => {}
        }
    }

    // ----- persistence -----

    fn persist(&self) -> Result<()> {
        if self.demo {
            return Ok(());
        }
        if let Some(path) = &self.tree_path
            && self.dirty
        {
            persist::save(path, &self.session.snapshot())?;
        }
        Ok(())
    }
}

pub fn run(demo: bool) -> Result<()> {
    let mut app = AppState::load(demo)?;

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    loop {
        terminal.draw(|f| app.draw(f))?;
        if !event::poll(Duration::from_millis(200))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) => {
                if matches!(key.kind, KeyEventKind::Release | KeyEventKind::Repeat) {
                    continue;
                }
                if app.handle_key(key)? {
                    break;
                }
            }
            Event::Mouse(mouse) => {
                let area = terminal.get_frame().area();
                app.handle_mouse(mouse, area);
            }
            _ => {}
        }
    }

    app.persist()?;
    Ok(())
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen, DisableMouseCapture);
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The closest card strictly in `direction` from the focused one, by
/// Manhattan distance.
fn nearest_in_direction(
    placement: &Placement,
    current: &str,
    direction: Direction,
) -> Option<String> {
    let from = placement.cards.iter().find(|c| c.id == current)?;
    placement
        .cards
        .iter()
        .filter(|c| c.id != current)
        .filter(|c| match direction {
            Direction::Up => c.y < from.y,
            Direction::Down => c.y > from.y,
            Direction::Left => c.y == from.y && c.x < from.x,
            Direction::Right => c.y == from.y && c.x > from.x,
        })
        .min_by_key(|c| (c.x - from.x).abs() + (c.y - from.y).abs())
        .map(|c| c.id.clone())
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn draw_text_prompt(frame: &mut Frame, prompt: &PendingText) {
    let area = centered_rect(frame.area(), 50, 7);
    frame.render_widget(Clear, area);
    let body = Paragraph::new(vec![
        Line::from(Span::styled(
            prompt.title.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        line_with_cursor(&prompt.buffer, prompt.cursor),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan))
            .padding(Padding::new(2, 2, 1, 1)),
    );
    frame.render_widget(body, area);
}

fn line_with_cursor(text: &str, cursor: usize) -> Line<'static> {
    let text_style = Style::default().fg(Color::White);
    let caret_style = Style::default().fg(Color::Cyan);
    let mut spans = Vec::new();
    let char_len = text.chars().count();
    let clamped = cursor.min(char_len);

    if char_len == 0 {
        spans.push(Span::styled("▌", caret_style));
        spans.push(Span::styled(
            " first [last]",
            Style::default().fg(Color::DarkGray),
        ));
        return Line::from(spans);
    }

    let split = byte_index_for_cursor(text, clamped);
    let (left, right) = text.split_at(split);
    if !left.is_empty() {
        spans.push(Span::styled(left.to_string(), text_style));
    }
    spans.push(Span::styled("▌", caret_style));
    if !right.is_empty() {
        spans.push(Span::styled(right.to_string(), text_style));
    }
    Line::from(spans)
}

fn byte_index_for_cursor(text: &str, cursor: usize) -> usize {
    text.char_indices()
        .nth(cursor)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

/// A small three-generation family for `kin view --demo`.
fn demo_session() -> TreeSession {
    let mut people = People::with_founder(PersonDetails {
        first_name: "Henrik".to_string(),
        last_name: "Larsen".to_string(),
        gender: Gender::Male,
        birth_date: Some("1952".to_string()),
        ..PersonDetails::default()
    });
    mutate::add_spouse(&mut people, ROOT_ID, PersonDetails {
        first_name: "Ingrid".to_string(),
        last_name: "Larsen".to_string(),
        gender: Gender::Female,
        birth_date: Some("1955".to_string()),
        ..PersonDetails::default()
    })
    .expect("demo founder exists");
    mutate::add_parent(&mut people, ROOT_ID, PersonDetails {
        first_name: "Viggo".to_string(),
        last_name: "Larsen".to_string(),
        gender: Gender::Male,
        birth_date: Some("1921".to_string()),
        death_date: Some("1998".to_string()),
        ..PersonDetails::default()
    })
    .expect("demo founder exists");
    let son = mutate::add_child(&mut people, ROOT_ID, PersonDetails {
        first_name: "Mads".to_string(),
        last_name: "Larsen".to_string(),
        gender: Gender::Male,
        birth_date: Some("1980".to_string()),
        ..PersonDetails::default()
    })
    .expect("demo founder exists");
    mutate::add_child(&mut people, ROOT_ID, PersonDetails {
        first_name: "Sofie".to_string(),
        last_name: "Holm".to_string(),
        gender: Gender::Female,
        birth_date: Some("1983".to_string()),
        ..PersonDetails::default()
    })
    .expect("demo founder exists");
    mutate::add_child(&mut people, &son, PersonDetails {
        first_name: "Emil".to_string(),
        last_name: "Larsen".to_string(),
        gender: Gender::Male,
        birth_date: Some("2010".to_string()),
        ..PersonDetails::default()
    })
    .expect("demo son exists");

    TreeSession {
        people,
        nav: crate::session::NavigationStack::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::validate::validate;

    #[test]
    fn demo_tree_is_valid() {
        let session = demo_session();
        validate(&session.people, session.nav.entries()).unwrap();
        assert!(session.people.len() >= 6);
        assert_eq!(session.nav.current(), ROOT_ID);
    }

    fn demo_app() -> AppState {
        let mut app = AppState::with_session(demo_session(), None, None, true);
        let tree = layout::layout(
            &app.session.people,
            ROOT_ID,
            &HighlightState::default(),
        )
        .unwrap();
        app.placement = render::place(&tree, &app.session.people);
        app
    }

    #[test]
    fn directional_focus_moves_between_rows() {
        let app = demo_app();
        let down = nearest_in_direction(&app.placement, ROOT_ID, Direction::Down).unwrap();
        let below = app.placement.cards.iter().find(|c| c.id == down).unwrap();
        let root = app
            .placement
            .cards
            .iter()
            .find(|c| c.id == ROOT_ID)
            .unwrap();
        assert!(below.y > root.y);
        assert!(nearest_in_direction(&app.placement, &down, Direction::Up).is_some());
    }

    #[test]
    fn opening_a_person_resets_the_viewport_and_back_returns() {
        let mut app = demo_app();
        app.viewport.zoom_in();
        app.focused = "p1".to_string();
        app.open_focused();
        assert_eq!(app.session.nav.current(), "p1");
        assert_eq!(app.viewport.transform().scale, 1.0);

        let action = input::action_for_key(
            KeyEvent::from(crossterm::event::KeyCode::Esc),
            false,
        );
        assert_eq!(action, Action::Back);
        app.session.nav.pop();
        assert_eq!(app.session.nav.current(), ROOT_ID);
    }

    #[test]
    fn toggle_highlight_selects_the_couple_and_clears() {
        let mut app = demo_app();
        app.toggle_highlight(ROOT_ID.to_string());
        assert!(app.highlight.selected.contains(ROOT_ID));
        assert!(app.highlight.selected.len() >= 2, "spouse joins the unit");
        app.toggle_highlight(ROOT_ID.to_string());
        assert!(app.highlight.selected.is_empty());
    }

    #[test]
    fn add_spouse_prompt_defaults_to_opposite_gender() {
        let mut app = demo_app();
        // The demo grandchild is unmarried.
        let anchor = "p4".to_string();
        assert!(app.session.people.get(&anchor).unwrap().spouse_id.is_none());
        app.apply_text_prompt(PendingText {
            title: String::new(),
            buffer: "Nora Holm".to_string(),
            cursor: 0,
            kind: PendingTextKind::AddSpouse {
                anchor: anchor.clone(),
            },
        });
        let spouse_id = app
            .session
            .people
            .get(&anchor)
            .unwrap()
            .spouse_id
            .clone()
            .unwrap();
        let spouse = app.session.people.get(&spouse_id).unwrap();
        assert_eq!(spouse.first_name, "Nora");
        assert_eq!(
            spouse.gender,
            app.session.people.get(&anchor).unwrap().gender.opposite()
        );
        assert!(app.dirty);
    }

    #[test]
    fn deleting_the_founder_is_refused() {
        let mut app = demo_app();
        app.pending_confirm = Some(PendingConfirm::DeletePerson {
            id: ROOT_ID.to_string(),
        });
        app.handle_confirm_key(KeyEvent::from(crossterm::event::KeyCode::Char('y')))
            .unwrap();
        assert!(app.session.people.contains(ROOT_ID));
        assert!(app.status_message.is_some());
    }

    #[test]
    fn empty_name_prompt_is_rejected() {
        let mut app = demo_app();
        let before = app.session.people.len();
        app.apply_text_prompt(PendingText {
            title: String::new(),
            buffer: "   ".to_string(),
            cursor: 0,
            kind: PendingTextKind::AddChild {
                anchor: ROOT_ID.to_string(),
            },
        });
        assert_eq!(app.session.people.len(), before);
        assert!(app.status_message.is_some());
    }
}
