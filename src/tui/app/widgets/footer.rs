use ratatui::{layout::Rect, text::Line, widgets::Widget};

pub struct Footer<'a> {
    pub exit: &'a bool,
    pub hint: &'a str,
}

impl Widget for Footer<'_> {
    fn render(self, area: Rect, buf: &mut ratatui::prelude::Buffer)
    where
        Self: Sized,
    {
        let footer_text = if *self.exit {
            "exiting please wait..."
        } else {
            self.hint
        };
        Line::from(footer_text).render(
            Rect {
                x: area.x + 1,
                y: area.y,
                width: area.width.saturating_sub(2),
                height: area.height,
            },
            buf,
        );
    }
}
