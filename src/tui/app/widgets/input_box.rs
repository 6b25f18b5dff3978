use std::cmp::min;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Offset, Rect},
    text::Span,
    widgets::{Block, Widget},
};

pub struct InputBox<'a> {
    pub focus: bool,
    pub label: &'static str,
    pub text: &'a str,
    pub empty_text: Option<&'static str>,
}

impl InputBox<'_> {
    pub fn handle_key(text_input: &mut String, key_event: &KeyEvent) {
        if key_event.kind != KeyEventKind::Press {
            return;
        }
        match key_event.code {
            KeyCode::Char(char) => {
                if text_input.is_empty() && char == ' ' {
                    // ignore leading spaces
                } else if char == 'u' && key_event.modifiers == KeyModifiers::CONTROL {
                    text_input.clear();
                } else if char == 'w' && key_event.modifiers == KeyModifiers::CONTROL {
                    // delete back one word
                    loop {
                        let char = text_input.pop();
                        if char.is_none() || char == Some(' ') {
                            break;
                        }
                    }
                } else {
                    text_input.push(char);
                }
            }
            KeyCode::Backspace => {
                text_input.pop();
            }
            _ => {}
        }
    }

    pub fn height_used(&self, area: Rect) -> u16 {
        let lines = split_string(self.text, area.width.saturating_sub(2) as usize);
        (2 + lines.len()) as u16
    }
}

impl Widget for InputBox<'_> {
    fn render(self, area: Rect, buf: &mut ratatui::prelude::Buffer)
    where
        Self: Sized,
    {
        let lines = split_string(self.text, area.width.saturating_sub(2) as usize);
        let area_used = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height: ((2 + lines.len()) as u16).min(area.height),
        };

        let block = Block::bordered().title(self.label);
        let inner_area = block.inner(area_used);
        block.render(area_used, buf);

        if self.focus {
            if self.text.is_empty() && self.empty_text.is_some() {
                if let Some(empty_text) = self.empty_text {
                    empty_text.render(inner_area, buf);
                }
            } else if let Some(last_line) = lines.last() {
                Span::from("|").render(
                    Rect {
                        x: inner_area.x + last_line.len() as u16,
                        y: inner_area.y + lines.len() as u16 - 1,
                        width: 1,
                        height: 1,
                    },
                    buf,
                );
            }
        }

        for (idx, line) in lines.into_iter().enumerate() {
            line.render(
                inner_area.offset(Offset {
                    x: 0,
                    y: idx as i32,
                }),
                buf,
            );
        }
    }
}

fn split_string(s: &str, max_width: usize) -> Vec<&str> {
    let mut lines = vec![];

    if max_width == 0 {
        lines.push("");
        return lines;
    }

    let mut ptr = 0;
    let s_len = s.len();
    while ptr < s_len {
        let next = min(ptr + max_width, s_len);
        if let Some(s) = s.get(ptr..next) {
            lines.push(s);
        }
        ptr = next;
    }

    if lines.is_empty() {
        lines.push("");
    }

    lines
}
