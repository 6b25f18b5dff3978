use std::sync::{atomic::AtomicBool, mpsc, Arc};

use alert_form::AlertFormPage;
use chart::ChartPage;
use ratatui::{buffer::Buffer, layout::Rect};

use super::SharedState;
use crate::tui::{
    events::Event,
    traits::{Component, HandleResult},
};

pub mod alert_form;
pub mod chart;

pub enum Page {
    Chart(ChartPage),
    AlertForm(AlertFormPage),
}

impl Page {
    pub fn footer_hint(&self) -> &'static str {
        match self {
            Page::Chart(page) => page.footer_hint(),
            Page::AlertForm(_) => "up/down move between fields | enter saves | esc cancels",
        }
    }
}

impl Component for Page {
    fn reload(&mut self, shared_state: &SharedState) -> crate::Result<()> {
        match self {
            Page::Chart(page) => page.reload(shared_state),
            Page::AlertForm(page) => page.reload(shared_state),
        }
    }

    async fn exit_threads(&mut self) {
        match self {
            Page::Chart(page) => page.exit_threads().await,
            Page::AlertForm(page) => page.exit_threads().await,
        }
    }

    fn handle_event(
        &mut self,
        event: &Event,
        area: Rect,
        transmitter: &mpsc::Sender<Event>,
        shutdown_signal: &Arc<AtomicBool>,
        shared_state: &SharedState,
    ) -> crate::Result<HandleResult> {
        match self {
            Page::Chart(page) => {
                page.handle_event(event, area, transmitter, shutdown_signal, shared_state)
            }
            Page::AlertForm(page) => {
                page.handle_event(event, area, transmitter, shutdown_signal, shared_state)
            }
        }
    }

    fn render_component(&self, area: Rect, buf: &mut Buffer, shared_state: &SharedState) -> Rect
    where
        Self: Sized,
    {
        match self {
            Page::Chart(page) => page.render_component(area, buf, shared_state),
            Page::AlertForm(page) => page.render_component(area, buf, shared_state),
        }
    }
}
