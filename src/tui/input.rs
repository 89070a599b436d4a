use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Move(Direction),
    Activate,
    Back,
    NextPerson,
    ZoomIn,
    ZoomOut,
    ResetView,
    AddSpouse,
    RejoinSpouse,
    AddChild,
    AddParent,
    AddSibling,
    EditPerson,
    DeletePerson,
    ToggleHighlight,
    ToggleHelp,
    Quit,
    SubmitText,
    Cancel,
    Backspace,
    InputChar(char),
    Noop,
}

pub fn action_for_key(key: KeyEvent, text_mode: bool) -> Action {
    if text_mode {
        return match key.code {
            KeyCode::Enter => Action::SubmitText,
            KeyCode::Esc => Action::Cancel,
            KeyCode::Backspace => Action::Backspace,
            KeyCode::Left => Action::Move(Direction::Left),
            KeyCode::Right => Action::Move(Direction::Right),
            KeyCode::Char(c) => Action::InputChar(c),
            _ => Action::Noop,
        };
    }

    match key.code {
        KeyCode::Up => Action::Move(Direction::Up),
        KeyCode::Down => Action::Move(Direction::Down),
        KeyCode::Left => Action::Move(Direction::Left),
        KeyCode::Right => Action::Move(Direction::Right),
        KeyCode::Enter => Action::Activate,
        KeyCode::Tab => Action::NextPerson,
        KeyCode::Esc | KeyCode::Backspace => Action::Back,
        KeyCode::Char('+') => Action::ZoomIn,
        KeyCode::Char('=') if key.modifiers.contains(KeyModifiers::SHIFT) => Action::ZoomIn,
        KeyCode::Char('-') => Action::ZoomOut,
        KeyCode::Char('0') => Action::ResetView,
        KeyCode::Char('h') => Action::Move(Direction::Left),
        KeyCode::Char('j') => Action::Move(Direction::Down),
        KeyCode::Char('k') => Action::Move(Direction::Up),
        KeyCode::Char('l') => Action::Move(Direction::Right),
        KeyCode::Char('m') => Action::AddSpouse,
        KeyCode::Char('r') => Action::RejoinSpouse,
        KeyCode::Char('c') => Action::AddChild,
        KeyCode::Char('p') => Action::AddParent,
        KeyCode::Char('b') => Action::AddSibling,
        KeyCode::Char('e') => Action::EditPerson,
        KeyCode::Char('D') => Action::DeletePerson,
        KeyCode::Char('x') => Action::ToggleHighlight,
        KeyCode::Char('?') => Action::ToggleHelp,
        KeyCode::Char('q') => Action::Quit,
        _ => Action::Noop,
    }
}
