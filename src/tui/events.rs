use crossterm::event::{
    Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent,
};

use crate::network::Candle;

pub mod input;
pub mod tick;

#[derive(Debug)]
pub enum Event {
    Input(CrosstermEvent),
    Tick,

    CandlesUpdate(Vec<Candle>),
    CandlesUpdateError(String),

    AlertSubmitted(String),
    AlertSubmitError(String),
}

impl Event {
    pub fn key_event(&self) -> Option<&KeyEvent> {
        if let Event::Input(CrosstermEvent::Key(key_event)) = self {
            Some(key_event)
        } else {
            None
        }
    }

    pub fn mouse_event(&self) -> Option<&MouseEvent> {
        if let Event::Input(CrosstermEvent::Mouse(mouse_event)) = self {
            Some(mouse_event)
        } else {
            None
        }
    }

    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        matches!(
            self.key_event(),
            Some(KeyEvent {
                kind: KeyEventKind::Press,
                code,
                modifiers: KeyModifiers::NONE,
                ..
            }) if *code == key
        )
    }

    pub fn is_char_pressed(&self, ch: char) -> bool {
        self.is_key_pressed(KeyCode::Char(ch))
    }
}
