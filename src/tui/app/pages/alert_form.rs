use std::sync::{atomic::AtomicBool, mpsc, Arc};

use crossterm::event::{KeyCode, KeyEventKind};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

use crate::{
    disk::{Config, DiskInterface},
    trendline::{AlertFormData, AlertStore, Trendline},
    tui::{
        app::{spawn_alert_submit, widgets::input_box::InputBox, SharedState},
        events::Event,
        traits::{Component, HandleResult, RectUtil},
    },
};

/// Notification channels offered in the alert form.
pub const CHANNELS: [&str; 4] = ["Email", "SMS", "Push", "Webhook"];

const FIELD_EXPIRATION: usize = 0;
const FIELD_ALERT_NAME: usize = 1;
const FIELD_MESSAGE: usize = 2;
const FIELD_CHANNELS: usize = 3;
const FIELD_SUBMIT: usize = 4;
const FIELD_COUNT: usize = 5;

/// Edit and submit the alert configuration attached to a trendline.
/// Saving persists the form data under the trendline's composite id and
/// posts it to the alert endpoint; [ESC] cancels without saving.
pub struct AlertFormPage {
    config: Config,
    trendline: Trendline,
    data: AlertFormData,
    cursor: usize,
    channel_cursor: usize,
    submit_thread: Option<tokio::task::JoinHandle<()>>,
}

impl AlertFormPage {
    pub fn new(config: Config, trendline: Trendline, data: AlertFormData) -> Self {
        Self {
            config,
            trendline,
            data,
            cursor: 0,
            channel_cursor: 0,
            submit_thread: None,
        }
    }

    fn toggle_channel(&mut self) {
        let channel = CHANNELS[self.channel_cursor].to_string();
        if let Some(pos) = self.data.channels.iter().position(|c| c == &channel) {
            self.data.channels.remove(pos);
        } else {
            self.data.channels.push(channel);
        }
    }

    fn submit(&mut self, transmitter: &mpsc::Sender<Event>) -> crate::Result<HandleResult> {
        let mut alerts = AlertStore::load()?;
        alerts.set(self.trendline.id(), self.data.clone())?;

        self.submit_thread = Some(spawn_alert_submit(
            self.config.clone(),
            self.trendline,
            self.data.clone(),
            transmitter.clone(),
        ));

        let mut result = HandleResult::default();
        result.page_pops = 1;
        result.reload = true;
        Ok(result)
    }
}

impl Component for AlertFormPage {
    async fn exit_threads(&mut self) {
        if let Some(thread) = self.submit_thread.take() {
            thread.abort();
            let _ = thread.await;
        }
    }

    fn handle_event(
        &mut self,
        event: &Event,
        _area: Rect,
        transmitter: &mpsc::Sender<Event>,
        _shutdown_signal: &Arc<AtomicBool>,
        _shared_state: &SharedState,
    ) -> crate::Result<HandleResult> {
        let mut result = HandleResult::default();

        if let Some(key_event) = event.key_event() {
            if key_event.kind == KeyEventKind::Press {
                match key_event.code {
                    KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
                    KeyCode::Down | KeyCode::Tab => {
                        self.cursor = (self.cursor + 1).min(FIELD_COUNT - 1)
                    }
                    KeyCode::Left if self.cursor == FIELD_CHANNELS => {
                        self.channel_cursor = self.channel_cursor.saturating_sub(1)
                    }
                    KeyCode::Right if self.cursor == FIELD_CHANNELS => {
                        self.channel_cursor = (self.channel_cursor + 1).min(CHANNELS.len() - 1)
                    }
                    KeyCode::Char(' ') if self.cursor == FIELD_CHANNELS => self.toggle_channel(),
                    KeyCode::Enter => match self.cursor {
                        FIELD_CHANNELS => self.toggle_channel(),
                        FIELD_SUBMIT => result = self.submit(transmitter)?,
                        _ => {}
                    },
                    _ => match self.cursor {
                        FIELD_EXPIRATION => InputBox::handle_key(&mut self.data.expiration, key_event),
                        FIELD_ALERT_NAME => InputBox::handle_key(&mut self.data.alert_name, key_event),
                        FIELD_MESSAGE => InputBox::handle_key(&mut self.data.message, key_event),
                        _ => {}
                    },
                }
            }
        }

        Ok(result)
    }

    fn render_component(&self, area: Rect, buf: &mut Buffer, shared_state: &SharedState) -> Rect
    where
        Self: Sized,
    {
        let theme = &shared_state.theme;
        let mut area = area;

        Line::from(format!("Edit Alert on {}", shared_state.symbol))
            .style(theme.style())
            .render(area, buf);
        area = area.consume_height(1);

        Line::from(format!(
            "Trend Line {:.2} -> {:.2}",
            self.trendline.start_price, self.trendline.end_price
        ))
        .style(theme.dim())
        .render(area, buf);
        area = area.consume_height(2);

        let inputs = [
            ("Expiration", self.data.expiration.as_str(), None),
            (
                "Alert name",
                self.data.alert_name.as_str(),
                Some("Add a custom name"),
            ),
            ("Message", self.data.message.as_str(), None),
        ];
        for (idx, (label, text, empty_text)) in inputs.into_iter().enumerate() {
            let input_box = InputBox {
                focus: self.cursor == idx,
                label,
                text,
                empty_text,
            };
            let height = input_box.height_used(area);
            input_box.render(area, buf);
            area = area.consume_height(height);
        }
        area = area.consume_height(1);

        let mut spans = vec![Span::raw("Channels: ")];
        for (idx, channel) in CHANNELS.iter().enumerate() {
            let selected = self.data.channels.iter().any(|c| c == channel);
            let mark = if selected { "[x] " } else { "[ ] " };
            let content = format!("{mark}{channel}  ");
            let span = if self.cursor == FIELD_CHANNELS && self.channel_cursor == idx {
                Span::styled(content, theme.button_focused())
            } else {
                Span::raw(content)
            };
            spans.push(span);
        }
        Line::from(spans).render(area, buf);
        area = area.consume_height(2);

        let button = if self.cursor == FIELD_SUBMIT {
            Span::styled("[ Save Alert ]", theme.button_focused())
        } else {
            Span::raw("[ Save Alert ]")
        };
        Line::from(button).render(area, buf);
        area = area.consume_height(2);

        Line::from("enter on Save Alert submits | esc cancels")
            .style(theme.dim())
            .render(area, buf);

        area
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        trendline::{TrendPoint, TIME_OFFSET},
        tui::theme::{Theme, ThemeName},
    };
    use crossterm::event::{Event as CrosstermEvent, KeyEvent, KeyEventState, KeyModifiers};

    fn key(code: KeyCode) -> Event {
        Event::Input(CrosstermEvent::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }))
    }

    fn test_page() -> AlertFormPage {
        let trendline = Trendline::new(
            TrendPoint::new(100, 50.0),
            TrendPoint::new(400, 60.0),
            TIME_OFFSET,
        );
        let data = AlertFormData::for_trendline("BTCUSDT", &trendline);
        AlertFormPage::new(Config::default(), trendline, data)
    }

    fn send(page: &mut AlertFormPage, event: Event) -> HandleResult {
        let (tx, _rx) = mpsc::channel();
        let shutdown = Arc::new(AtomicBool::new(false));
        let shared_state = SharedState {
            symbol: "BTCUSDT".to_string(),
            interval: "1h".to_string(),
            theme: Theme::new(ThemeName::Dark),
        };
        page.handle_event(&event, Rect::new(0, 0, 60, 30), &tx, &shutdown, &shared_state)
            .unwrap()
    }

    #[test]
    fn cursor_moves_between_fields_and_clamps() {
        let mut page = test_page();
        assert_eq!(page.cursor, FIELD_EXPIRATION);

        send(&mut page, key(KeyCode::Up));
        assert_eq!(page.cursor, FIELD_EXPIRATION);

        for _ in 0..10 {
            send(&mut page, key(KeyCode::Down));
        }
        assert_eq!(page.cursor, FIELD_SUBMIT);
    }

    #[test]
    fn typing_edits_the_focused_field() {
        let mut page = test_page();
        send(&mut page, key(KeyCode::Down));
        assert_eq!(page.cursor, FIELD_ALERT_NAME);

        send(&mut page, key(KeyCode::Char('h')));
        send(&mut page, key(KeyCode::Char('i')));
        assert_eq!(page.data.alert_name, "hi");

        send(&mut page, key(KeyCode::Backspace));
        assert_eq!(page.data.alert_name, "h");
    }

    #[test]
    fn space_toggles_the_selected_channel() {
        let mut page = test_page();
        page.cursor = FIELD_CHANNELS;

        send(&mut page, key(KeyCode::Char(' ')));
        assert_eq!(page.data.channels, vec!["Email".to_string()]);

        send(&mut page, key(KeyCode::Right));
        send(&mut page, key(KeyCode::Enter));
        assert_eq!(
            page.data.channels,
            vec!["Email".to_string(), "SMS".to_string()]
        );

        send(&mut page, key(KeyCode::Left));
        send(&mut page, key(KeyCode::Char(' ')));
        assert_eq!(page.data.channels, vec!["SMS".to_string()]);
    }

    #[test]
    fn channel_cursor_stays_in_range() {
        let mut page = test_page();
        page.cursor = FIELD_CHANNELS;

        for _ in 0..10 {
            send(&mut page, key(KeyCode::Right));
        }
        assert_eq!(page.channel_cursor, CHANNELS.len() - 1);

        for _ in 0..10 {
            send(&mut page, key(KeyCode::Left));
        }
        assert_eq!(page.channel_cursor, 0);
    }

    #[test]
    fn prefilled_data_is_kept() {
        let page = test_page();
        assert_eq!(page.data.trigger, "Only Once");
        assert_eq!(page.data.message, "BTCUSDT Crossing Trend Line (50.00 - 60.00)");
    }
}
