use std::time::{Duration, Instant};

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::Span,
    widgets::{Clear, Widget},
};

use crate::tui::{theme::Theme, traits::RectUtil};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BannerKind {
    Success,
    Error,
}

/// Transient one-line message that disappears on its own after a fixed
/// delay. Expiry is checked against the tick events, not a timer thread.
pub struct Banner {
    message: String,
    kind: BannerKind,
    expires_at: Instant,
}

impl Banner {
    pub fn success(message: String, ttl: Duration) -> Self {
        Self {
            message,
            kind: BannerKind::Success,
            expires_at: Instant::now() + ttl,
        }
    }

    pub fn error(message: String, ttl: Duration) -> Self {
        Self {
            message,
            kind: BannerKind::Error,
            expires_at: Instant::now() + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        if area.width < 3 || area.height == 0 {
            return;
        }
        let style = match self.kind {
            BannerKind::Success => theme.banner_success(),
            BannerKind::Error => theme.banner_error(),
        };

        let width = (self.message.len() as u16 + 2).min(area.width);
        let banner_area = Rect {
            x: area.x + area.width - width,
            y: area.y,
            width,
            height: 1,
        };

        Clear.render(banner_area, buf);
        buf.set_style(banner_area, style);
        Span::raw(self.message.as_str()).render(banner_area.margin_left(1), buf);
    }
}
