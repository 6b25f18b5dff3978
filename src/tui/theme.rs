use std::fmt::Formatter;

use ratatui::{
    style::{Color, Modifier, Style},
    widgets::BorderType,
};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

#[derive(Default, Debug, EnumIter)]
pub enum ThemeName {
    #[default]
    Dark,
    Light,
}

impl std::fmt::Display for ThemeName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::str::FromStr for ThemeName {
    type Err = crate::Error;

    fn from_str(theme_name: &str) -> crate::Result<Self> {
        match theme_name {
            "Dark" => Ok(Self::Dark),
            "Light" => Ok(Self::Light),
            _ => Err(crate::Error::UnknownThemeName(theme_name.to_string())),
        }
    }
}

impl ThemeName {
    pub fn list() -> Vec<String> {
        Self::iter().map(|theme| theme.to_string()).collect()
    }
}

#[derive(Clone)]
pub struct Theme {
    pub text: Option<Color>,
    pub bg: Option<Color>,
    pub up: Color,
    pub down: Color,
    pub trendline: Color,
    pub preview: Color,
    pub border_type: BorderType,
}

impl Theme {
    pub fn new(theme_name: ThemeName) -> Theme {
        match theme_name {
            ThemeName::Dark => Theme {
                text: Some(Color::White),
                bg: Some(Color::Black),
                up: Color::LightGreen,
                down: Color::Red,
                trendline: Color::Blue,
                preview: Color::Yellow,
                border_type: BorderType::Rounded,
            },
            ThemeName::Light => Theme {
                text: Some(Color::Black),
                bg: Some(Color::White),
                up: Color::Green,
                down: Color::Red,
                trendline: Color::Blue,
                preview: Color::Magenta,
                border_type: BorderType::Plain,
            },
        }
    }

    pub fn style(&self) -> Style {
        let mut style = Style::default();
        if let Some(text_color) = self.text {
            style = style.fg(text_color);
        }
        if let Some(bg_color) = self.bg {
            style = style.bg(bg_color);
        }
        style
    }

    pub fn dim(&self) -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn banner_success(&self) -> Style {
        Style::default()
            .fg(Color::White)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn banner_error(&self) -> Style {
        Style::default()
            .fg(Color::White)
            .bg(Color::Red)
            .add_modifier(Modifier::BOLD)
    }

    pub fn tooltip(&self) -> Style {
        self.style().add_modifier(Modifier::REVERSED)
    }

    pub fn button_focused(&self) -> Style {
        Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)
    }
}
