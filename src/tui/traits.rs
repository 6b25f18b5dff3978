use std::sync::{atomic::AtomicBool, mpsc, Arc};

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Block, Widget},
};

use super::{
    app::{pages::Page, SharedState},
    events::Event,
};

#[derive(Default)]
pub struct HandleResult {
    // Number of pages to go back, usually 1.
    pub page_pops: usize,
    // Pages to insert into the context stack.
    pub page_inserts: Vec<Page>,
    // Number of [ESC] key presses to ignore, for pages that handle [ESC]
    // themselves.
    pub esc_ignores: usize,
    // Reload the current page from external state after processing.
    pub reload: bool,
}

pub trait Component {
    fn reload(&mut self, _shared_state: &SharedState) -> crate::Result<()> {
        Ok(())
    }

    async fn exit_threads(&mut self) {}

    fn handle_event(
        &mut self,
        event: &Event,
        area: Rect,
        transmitter: &mpsc::Sender<Event>,
        shutdown_signal: &Arc<AtomicBool>,
        shared_state: &SharedState,
    ) -> crate::Result<HandleResult>;

    // Renders the component into the given area and returns the area that
    // was actually used.
    fn render_component(&self, area: Rect, buf: &mut Buffer, shared_state: &SharedState) -> Rect
    where
        Self: Sized;

    fn render_component_with_block(
        &self,
        area: Rect,
        buf: &mut Buffer,
        block: Block<'_>,
        shared_state: &SharedState,
    ) -> Rect
    where
        Self: Sized,
    {
        let inner_area = block.inner(area);
        block.render(area, buf);
        self.render_component(inner_area, buf, shared_state);
        area
    }
}

pub trait RectUtil {
    fn consume_height(self, height: u16) -> Rect;

    fn change_height(self, height: u16) -> Rect;

    fn margin_left(self, m: u16) -> Rect;

    fn block_inner(self) -> Rect;
}

impl RectUtil for Rect {
    fn consume_height(self, height: u16) -> Rect {
        Rect {
            x: self.x,
            y: self.y + height,
            width: self.width,
            height: self.height.saturating_sub(height),
        }
    }

    fn change_height(self, height: u16) -> Rect {
        Rect {
            x: self.x,
            y: self.y,
            width: self.width,
            height,
        }
    }

    fn margin_left(self, m: u16) -> Rect {
        Rect {
            x: self.x + m,
            y: self.y,
            width: self.width.saturating_sub(m),
            height: self.height,
        }
    }

    fn block_inner(self) -> Rect {
        Rect {
            x: self.x + 1,
            y: self.y + 1,
            width: self.width.saturating_sub(2),
            height: self.height.saturating_sub(2),
        }
    }
}
