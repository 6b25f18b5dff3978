use std::sync::{atomic::AtomicBool, mpsc, Arc};

use chrono::{DateTime, Local};
use crossterm::event::{
    Event as CrosstermEvent, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    text::Line,
    widgets::{Block, Clear, Widget},
};

use crate::{
    disk::{Config, DiskInterface},
    network::Candle,
    trendline::{AlertFormData, AlertStore, TrendPoint, Trendline, TrendlineStore, TIME_OFFSET},
    tui::{
        app::{spawn_candle_fetch, widgets::trend_chart::TrendChart, SharedState},
        events::Event,
        theme::Theme,
        traits::{Component, HandleResult, RectUtil},
    },
};

use super::{alert_form::AlertFormPage, Page};

/// Strict upper bound on the screen distance between the pointer and a
/// trendline's projection for the line to count as hovered or selected.
pub const HIT_TOLERANCE: f64 = 20.0;

/// Chart interaction modes are mutually exclusive: while drawing, the
/// chart's own pan/zoom handling is suspended.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum ViewMode {
    #[default]
    Navigate,
    Draw,
}

/// Two-phase drag gesture producing trendlines. Lives only between a
/// pointer-down and the matching pointer-up or pointer-leave.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DrawGesture {
    #[default]
    Idle,
    Dragging {
        start: TrendPoint,
    },
}

impl DrawGesture {
    /// Pointer-down. A press on an invalid chart position is a no-op.
    pub fn press(&mut self, point: Option<TrendPoint>) {
        if let Some(start) = point {
            *self = DrawGesture::Dragging { start };
        }
    }

    /// Pointer-move while dragging: the preview segment from the start to
    /// the current position, with the degenerate-time nudge applied so the
    /// preview matches what a release here would create.
    pub fn preview(
        &self,
        point: Option<TrendPoint>,
        time_offset: i64,
    ) -> Option<(TrendPoint, TrendPoint)> {
        match (self, point) {
            (DrawGesture::Dragging { start }, Some(mut current)) => {
                if current.time == start.time {
                    current.time += time_offset;
                }
                Some((*start, current))
            }
            _ => None,
        }
    }

    /// Pointer-up. Returns the completed trendline when the release point
    /// is valid; either way the gesture ends.
    pub fn release(&mut self, point: Option<TrendPoint>, time_offset: i64) -> Option<Trendline> {
        let finished = match (*self, point) {
            (DrawGesture::Dragging { start }, Some(end)) => {
                Some(Trendline::new(start, end, time_offset))
            }
            _ => None,
        };
        *self = DrawGesture::Idle;
        finished
    }

    /// Pointer-leave: unconditionally abort, never commit.
    pub fn cancel(&mut self) {
        *self = DrawGesture::Idle;
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, DrawGesture::Dragging { .. })
    }
}

pub struct ChartPage {
    config: Config,
    chart: TrendChart,
    mode: ViewMode,
    gesture: DrawGesture,
    trendlines: TrendlineStore,
    alerts: AlertStore,
    hover: Option<(Trendline, Position)>,
    hit_tolerance: f64,
    time_offset: i64,
    fetch_thread: Option<tokio::task::JoinHandle<()>>,
}

impl ChartPage {
    pub fn new(config: Config, trendlines: TrendlineStore, alerts: AlertStore) -> Self {
        let mut chart = TrendChart::default();
        chart.set_trendlines(trendlines.list());
        Self {
            config,
            chart,
            mode: ViewMode::default(),
            gesture: DrawGesture::default(),
            trendlines,
            alerts,
            hover: None,
            hit_tolerance: HIT_TOLERANCE,
            time_offset: TIME_OFFSET,
            fetch_thread: None,
        }
    }

    pub fn set_candles(&mut self, candles: Vec<Candle>) {
        self.chart.set_candles(candles);
    }

    pub fn footer_hint(&self) -> &'static str {
        match self.mode {
            ViewMode::Navigate => {
                "[d] draw | [c] clear | [r] refresh | [t] theme | drag pan, scroll zoom | right-click a line for alerts"
            }
            ViewMode::Draw => {
                "[d] back to navigate | drag to draw a trendline | right-click a line for alerts"
            }
        }
    }

    // status line on top, chart canvas below
    fn layout(area: Rect) -> (Rect, Rect) {
        (area.change_height(1), area.consume_height(1))
    }

    fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            ViewMode::Navigate => ViewMode::Draw,
            ViewMode::Draw => ViewMode::Navigate,
        };
        if self.mode == ViewMode::Navigate {
            self.gesture.cancel();
            self.chart.clear_preview();
        }
        self.chart
            .set_pan_zoom_enabled(self.mode == ViewMode::Navigate);
    }

    fn clear_all(&mut self) -> crate::Result<()> {
        self.trendlines.clear()?;
        self.alerts.clear()?;
        self.chart.set_trendlines(self.trendlines.list());
        self.hover = None;
        Ok(())
    }

    fn hit_trendline(&self, col: u16, row: u16, area: Rect) -> Option<Trendline> {
        self.chart
            .hit_test(col, row, area, self.trendlines.list(), self.hit_tolerance)
            .map(|idx| self.trendlines.list()[idx])
    }

    fn update_hover(&mut self, col: u16, row: u16, area: Rect) {
        self.hover = self
            .hit_trendline(col, row, area)
            .map(|trendline| (trendline, Position::new(col, row)));
    }

    fn select_at(&mut self, col: u16, row: u16, area: Rect) -> HandleResult {
        let mut result = HandleResult::default();
        if let Some(trendline) = self.hit_trendline(col, row, area) {
            let data = self
                .alerts
                .get(&trendline.id())
                .cloned()
                .unwrap_or_else(|| AlertFormData::for_trendline(&self.config.symbol, &trendline));
            result.page_inserts.push(Page::AlertForm(AlertFormPage::new(
                self.config.clone(),
                trendline,
                data,
            )));
        } else {
            self.hover = None;
        }
        result
    }

    fn handle_mouse(&mut self, m: &MouseEvent, chart_area: Rect) -> crate::Result<HandleResult> {
        let mut result = HandleResult::default();

        if !chart_area.contains(Position::new(m.column, m.row)) {
            // leaving the drawable surface aborts any drag and hides the
            // tooltip; pan state still sees the event to stop a drag
            if self.gesture.is_dragging() {
                self.gesture.cancel();
                self.chart.clear_preview();
            }
            self.hover = None;
            self.chart.handle_navigation_mouse(m, chart_area);
            return Ok(result);
        }

        match self.mode {
            ViewMode::Draw => match m.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    self.gesture.press(self.chart.point_at(m.column, m.row, chart_area));
                }
                MouseEventKind::Drag(MouseButton::Left) => {
                    if let Some((start, end)) = self.gesture.preview(
                        self.chart.point_at(m.column, m.row, chart_area),
                        self.time_offset,
                    ) {
                        self.chart.set_preview(start, end);
                    }
                }
                MouseEventKind::Up(MouseButton::Left) => {
                    if let Some(trendline) = self.gesture.release(
                        self.chart.point_at(m.column, m.row, chart_area),
                        self.time_offset,
                    ) {
                        self.trendlines.append(trendline)?;
                        self.chart.set_trendlines(self.trendlines.list());
                    }
                    self.chart.clear_preview();
                }
                MouseEventKind::Down(MouseButton::Right) => {
                    result = self.select_at(m.column, m.row, chart_area);
                }
                MouseEventKind::Moved => self.update_hover(m.column, m.row, chart_area),
                _ => {}
            },
            ViewMode::Navigate => match m.kind {
                MouseEventKind::Down(MouseButton::Right) => {
                    result = self.select_at(m.column, m.row, chart_area);
                }
                MouseEventKind::Moved => self.update_hover(m.column, m.row, chart_area),
                _ => self.chart.handle_navigation_mouse(m, chart_area),
            },
        }

        Ok(result)
    }

    fn render_tooltip(
        &self,
        trendline: &Trendline,
        position: Position,
        area: Rect,
        buf: &mut Buffer,
        theme: &Theme,
    ) {
        let lines = [
            format!(
                "Start: {}  {:.2}",
                format_time(trendline.start_time),
                trendline.start_price
            ),
            format!(
                "End:   {}  {:.2}",
                format_time(trendline.end_time),
                trendline.end_price
            ),
        ];
        let width = (lines.iter().map(|l| l.len()).max().unwrap_or(0) as u16 + 2).min(area.width);
        let height = (lines.len() as u16 + 2).min(area.height);
        if width < 4 || height < 3 {
            return;
        }

        // keep the popup inside the chart, preferring above the pointer
        let x = position
            .x
            .min(area.x + area.width.saturating_sub(width))
            .max(area.x);
        let y = position.y.saturating_sub(height).max(area.y);
        let popup = Rect {
            x,
            y,
            width,
            height,
        };

        Clear.render(popup, buf);
        let block = Block::bordered()
            .border_type(theme.border_type)
            .title("Trendline")
            .style(theme.tooltip());
        let inner = block.inner(popup);
        block.render(popup, buf);
        for (idx, line) in lines.iter().enumerate() {
            Line::from(line.as_str()).render(inner.consume_height(idx as u16), buf);
        }
    }
}

fn format_time(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

impl Component for ChartPage {
    fn reload(&mut self, _shared_state: &SharedState) -> crate::Result<()> {
        self.trendlines = TrendlineStore::load()?;
        self.alerts = AlertStore::load()?;
        self.chart.set_trendlines(self.trendlines.list());
        Ok(())
    }

    async fn exit_threads(&mut self) {
        if let Some(thread) = self.fetch_thread.take() {
            thread.abort();
            let _ = thread.await;
        }
    }

    fn handle_event(
        &mut self,
        event: &Event,
        area: Rect,
        transmitter: &mpsc::Sender<Event>,
        _shutdown_signal: &Arc<AtomicBool>,
        _shared_state: &SharedState,
    ) -> crate::Result<HandleResult> {
        let (_, chart_area) = Self::layout(area);
        let mut result = HandleResult::default();

        match event {
            Event::Input(CrosstermEvent::Key(key_event))
                if key_event.kind == KeyEventKind::Press =>
            {
                let plain = key_event.modifiers == KeyModifiers::NONE;
                match key_event.code {
                    KeyCode::Char('d') if plain => self.toggle_mode(),
                    KeyCode::Char('c') if plain => self.clear_all()?,
                    KeyCode::Char('r') if plain => {
                        self.fetch_thread = Some(spawn_candle_fetch(
                            self.config.clone(),
                            transmitter.clone(),
                        ));
                    }
                    code => self.chart.handle_navigation_key(code, chart_area),
                }
            }
            Event::Input(CrosstermEvent::Mouse(mouse_event)) => {
                result = self.handle_mouse(mouse_event, chart_area)?;
            }
            Event::CandlesUpdate(candles) => self.set_candles(candles.clone()),
            _ => {}
        }

        Ok(result)
    }

    fn render_component(&self, area: Rect, buf: &mut Buffer, shared_state: &SharedState) -> Rect
    where
        Self: Sized,
    {
        let (status_area, chart_area) = Self::layout(area);
        let theme = &shared_state.theme;

        let mode = match self.mode {
            ViewMode::Navigate => "navigate",
            ViewMode::Draw => "draw",
        };
        let status = if self.chart.has_candles() {
            format!("mode: {mode} | trendlines: {}", self.trendlines.len())
        } else {
            format!("mode: {mode} | loading candles...")
        };
        Line::from(status).style(theme.dim()).render(status_area, buf);

        self.chart.render(chart_area, buf, theme);

        if let Some((trendline, position)) = &self.hover {
            self.render_tooltip(trendline, *position, chart_area, buf, theme);
        }

        area
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        network::Candle,
        tui::theme::{Theme, ThemeName},
    };
    use crossterm::event::KeyModifiers;
    use std::fs;

    fn point(time: i64, price: f64) -> TrendPoint {
        TrendPoint::new(time, price)
    }

    fn candle(time: i64) -> Candle {
        Candle {
            time,
            open: 10.0,
            high: 12.0,
            low: 8.0,
            close: 11.0,
        }
    }

    fn mouse(kind: MouseEventKind, x: u16, y: u16) -> Event {
        Event::Input(CrosstermEvent::Mouse(MouseEvent {
            kind,
            column: x,
            row: y,
            modifiers: KeyModifiers::NONE,
        }))
    }

    fn test_page() -> ChartPage {
        let mut page = ChartPage::new(
            Config::default(),
            TrendlineStore::default(),
            AlertStore::default(),
        );
        // deterministic viewport: cells map 1:1 onto (time, price)
        let mut chart = TrendChart::default();
        chart.set_candles(vec![candle(10), candle(30)]);
        page.chart = chart.with_bounds([0.0, 40.0], [0.0, 21.0]);
        page
    }

    fn test_ctx() -> (
        mpsc::Sender<Event>,
        mpsc::Receiver<Event>,
        Arc<AtomicBool>,
        SharedState,
    ) {
        let (tx, rx) = mpsc::channel();
        let shutdown = Arc::new(AtomicBool::new(false));
        let shared_state = SharedState {
            symbol: "BTCUSDT".to_string(),
            interval: "1h".to_string(),
            theme: Theme::new(ThemeName::Dark),
        };
        (tx, rx, shutdown, shared_state)
    }

    // full page area: one status row above the 40x21 chart
    fn page_area() -> Rect {
        Rect::new(0, 0, 40, 22)
    }

    fn send(page: &mut ChartPage, event: Event) -> HandleResult {
        let (tx, _rx, shutdown, shared_state) = test_ctx();
        page.handle_event(&event, page_area(), &tx, &shutdown, &shared_state)
            .unwrap()
    }

    #[test]
    fn gesture_press_requires_a_valid_point() {
        let mut gesture = DrawGesture::default();
        gesture.press(None);
        assert_eq!(gesture, DrawGesture::Idle);

        gesture.press(Some(point(100, 50.0)));
        assert!(gesture.is_dragging());
    }

    #[test]
    fn gesture_release_applies_the_time_nudge() {
        let mut gesture = DrawGesture::default();
        gesture.press(Some(point(100, 50.0)));

        let trendline = gesture.release(Some(point(100, 60.0)), TIME_OFFSET).unwrap();
        assert_eq!(trendline.start_time, 100);
        assert_eq!(trendline.end_time, 160);
        assert_eq!(gesture, DrawGesture::Idle);
    }

    #[test]
    fn gesture_release_on_invalid_point_discards() {
        let mut gesture = DrawGesture::default();
        gesture.press(Some(point(100, 50.0)));

        assert!(gesture.release(None, TIME_OFFSET).is_none());
        assert_eq!(gesture, DrawGesture::Idle);
    }

    #[test]
    fn gesture_preview_tracks_the_pointer() {
        let mut gesture = DrawGesture::default();
        assert!(gesture.preview(Some(point(100, 50.0)), TIME_OFFSET).is_none());

        gesture.press(Some(point(100, 50.0)));
        let (start, end) = gesture.preview(Some(point(300, 55.0)), TIME_OFFSET).unwrap();
        assert_eq!(start, point(100, 50.0));
        assert_eq!(end, point(300, 55.0));

        // same-time preview shows the nudged segment a release would create
        let (_, end) = gesture.preview(Some(point(100, 60.0)), TIME_OFFSET).unwrap();
        assert_eq!(end.time, 160);
    }

    #[test]
    fn press_is_ignored_outside_draw_mode() {
        let mut page = test_page();
        assert_eq!(page.mode, ViewMode::Navigate);

        send(
            &mut page,
            mouse(MouseEventKind::Down(MouseButton::Left), 10, 10),
        );
        assert_eq!(page.gesture, DrawGesture::Idle);
    }

    #[test]
    fn press_with_no_plotted_data_is_a_no_op() {
        let mut page = ChartPage::new(
            Config::default(),
            TrendlineStore::default(),
            AlertStore::default(),
        );
        page.toggle_mode();

        send(
            &mut page,
            mouse(MouseEventKind::Down(MouseButton::Left), 10, 10),
        );
        assert_eq!(page.gesture, DrawGesture::Idle);
    }

    #[test]
    fn pointer_leave_cancels_the_drag_without_appending() {
        let mut page = test_page();
        page.toggle_mode();

        send(
            &mut page,
            mouse(MouseEventKind::Down(MouseButton::Left), 10, 10),
        );
        assert!(page.gesture.is_dragging());

        send(
            &mut page,
            mouse(MouseEventKind::Drag(MouseButton::Left), 30, 15),
        );

        // drag exits the chart surface
        send(
            &mut page,
            mouse(MouseEventKind::Drag(MouseButton::Left), 39, 30),
        );
        assert_eq!(page.gesture, DrawGesture::Idle);
        assert!(page.trendlines.is_empty());
        assert!(page.chart.preview().is_none());
    }

    #[test]
    fn draw_mode_suspends_pan_and_zoom() {
        let mut page = test_page();
        page.toggle_mode();
        let before = page.chart.viewport().x;

        send(&mut page, mouse(MouseEventKind::ScrollUp, 20, 10));
        assert_eq!(page.chart.viewport().x, before);
    }

    #[test]
    fn hover_tracks_nearby_trendlines() {
        let mut page = test_page();
        page.trendlines = serde_json::from_str(
            r#"[{"startTime":5,"startPrice":10.0,"endTime":35,"endPrice":10.0}]"#,
        )
        .unwrap();

        // pointer within tolerance of the projected segment
        send(&mut page, mouse(MouseEventKind::Moved, 20, 11));
        assert!(page.hover.is_some());

        send(&mut page, mouse(MouseEventKind::Moved, 39, 0));
        assert!(page.hover.is_none());
    }

    #[test]
    fn right_click_on_a_trendline_opens_the_alert_form() {
        let mut page = test_page();
        page.trendlines = serde_json::from_str(
            r#"[{"startTime":5,"startPrice":10.0,"endTime":35,"endPrice":10.0}]"#,
        )
        .unwrap();

        let result = send(
            &mut page,
            mouse(MouseEventKind::Down(MouseButton::Right), 20, 11),
        );
        assert_eq!(result.page_inserts.len(), 1);
        assert!(matches!(result.page_inserts[0], Page::AlertForm(_)));
    }

    #[test]
    fn right_click_on_empty_space_opens_nothing() {
        let mut page = test_page();
        let result = send(
            &mut page,
            mouse(MouseEventKind::Down(MouseButton::Right), 20, 11),
        );
        assert!(result.page_inserts.is_empty());
    }

    #[test]
    fn completed_drag_appends_then_clear_empties_all() {
        let trendlines_path = TrendlineStore::path().unwrap();
        let alerts_path = AlertStore::path().unwrap();
        let saved_trendlines = fs::read_to_string(&trendlines_path).ok();
        let saved_alerts = fs::read_to_string(&alerts_path).ok();

        let mut page = test_page();
        page.toggle_mode();

        // press and release on the same column: same time coordinate
        send(
            &mut page,
            mouse(MouseEventKind::Down(MouseButton::Left), 10, 5),
        );
        send(
            &mut page,
            mouse(MouseEventKind::Up(MouseButton::Left), 10, 15),
        );

        assert_eq!(page.trendlines.len(), 1);
        let trendline = page.trendlines.list()[0];
        assert_eq!(trendline.start_time, 10);
        assert_eq!(trendline.end_time, 10 + TIME_OFFSET);
        assert!(page.chart.preview().is_none());

        // the collection was re-persisted; a fresh load sees the same ids
        let reloaded = TrendlineStore::load().unwrap();
        assert_eq!(reloaded.list()[0].id(), trendline.id());

        page.alerts
            .set(
                trendline.id(),
                AlertFormData::for_trendline("BTCUSDT", &trendline),
            )
            .unwrap();

        page.clear_all().unwrap();
        assert!(page.trendlines.is_empty());
        assert!(page.alerts.is_empty());
        assert!(TrendlineStore::load().unwrap().is_empty());
        assert!(AlertStore::load().unwrap().is_empty());

        match saved_trendlines {
            Some(content) => fs::write(&trendlines_path, content).unwrap(),
            None => {
                let _ = fs::remove_file(&trendlines_path);
            }
        }
        match saved_alerts {
            Some(content) => fs::write(&alerts_path, content).unwrap(),
            None => {
                let _ = fs::remove_file(&alerts_path);
            }
        }
    }
}
