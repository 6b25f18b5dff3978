use crossterm::event::{KeyCode, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    widgets::{
        canvas::{Canvas, Line},
        Widget,
    },
};

use crate::{
    geometry::{self, Point},
    network::Candle,
    trendline::{TrendPoint, Trendline},
    tui::theme::Theme,
};

/// Visible (time, price) window owning the data<->cell transforms.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub x: [f64; 2],
    pub y: [f64; 2],
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: [0.0, 1.0],
            y: [0.0, 1.0],
        }
    }
}

impl Viewport {
    fn x_span(&self) -> f64 {
        self.x[1] - self.x[0]
    }

    fn y_span(&self) -> f64 {
        self.y[1] - self.y[0]
    }

    pub fn pan(&mut self, dx_cells: i16, dy_cells: i16, area: Rect) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let dx = (dx_cells as f64 / area.width as f64) * self.x_span();
        // screen rows grow downward, prices grow upward
        let dy = -(dy_cells as f64 / area.height as f64) * self.y_span();
        self.x[0] += dx;
        self.x[1] += dx;
        self.y[0] += dy;
        self.y[1] += dy;
    }

    pub fn zoom_at(&mut self, factor: f64, anchor: Option<(u16, u16)>, area: Rect) {
        let (mx, my) = anchor.unwrap_or((area.x + area.width / 2, area.y + area.height / 2));
        let mxn = if area.width > 0 {
            mx.saturating_sub(area.x) as f64 / area.width as f64
        } else {
            0.5
        };
        let myn = if area.height > 0 {
            my.saturating_sub(area.y) as f64 / area.height as f64
        } else {
            0.5
        };

        let (x0, x1) = (self.x[0], self.x[1]);
        let x_mid = x0 + (x1 - x0) * mxn;
        let x_half = (x1 - x0) * factor * 0.5;
        self.x = [x_mid - x_half, x_mid + x_half];

        let (y0, y1) = (self.y[0], self.y[1]);
        let y_mid = y0 + (y1 - y0) * (1.0 - myn);
        let y_half = (y1 - y0) * factor * 0.5;
        self.y = [y_mid - y_half, y_mid + y_half];
    }

    /// Cell position -> data coordinates. None outside the chart area.
    pub fn cell_to_data(&self, col: u16, row: u16, area: Rect) -> Option<(f64, f64)> {
        if area.width == 0 || area.height == 0 {
            return None;
        }
        if !area.contains(Position::new(col, row)) {
            return None;
        }
        let nx = (col - area.x) as f64 / area.width as f64;
        let ny = (row - area.y) as f64 / area.height as f64;
        let x = self.x[0] + nx * self.x_span();
        let y = self.y[1] - ny * self.y_span();
        Some((x, y))
    }

    /// Data coordinates -> fractional cell position. None when the data
    /// point is outside the visible window.
    pub fn data_to_cell(&self, x: f64, y: f64, area: Rect) -> Option<(f64, f64)> {
        if area.width == 0 || area.height == 0 {
            return None;
        }
        if x < self.x[0] || x > self.x[1] || y < self.y[0] || y > self.y[1] {
            return None;
        }
        let cx = area.x as f64 + (x - self.x[0]) / self.x_span() * area.width as f64;
        let cy = area.y as f64 + (1.0 - (y - self.y[0]) / self.y_span()) * area.height as f64;
        Some((cx, cy))
    }
}

/// Candlestick chart with line channels for persisted trendlines and the
/// live draw preview. Owns the viewport and its transforms; pan/zoom input
/// handling can be switched off while draw mode is active.
#[derive(Debug)]
pub struct TrendChart {
    candles: Vec<Candle>,
    trendlines: Vec<[TrendPoint; 2]>,
    preview: Option<[TrendPoint; 2]>,
    viewport: Viewport,
    pan_zoom_enabled: bool,
    is_dragging: bool,
    last_mouse: (u16, u16),
}

impl Default for TrendChart {
    fn default() -> Self {
        Self {
            candles: Vec::new(),
            trendlines: Vec::new(),
            preview: None,
            viewport: Viewport::default(),
            pan_zoom_enabled: true,
            is_dragging: false,
            last_mouse: (0, 0),
        }
    }
}

impl TrendChart {
    pub fn with_bounds(mut self, x: [f64; 2], y: [f64; 2]) -> Self {
        self.viewport = Viewport { x, y };
        self
    }

    /// Replace the candle data and fit the viewport to it.
    pub fn set_candles(&mut self, candles: Vec<Candle>) {
        self.candles = candles;
        self.fit_content();
    }

    pub fn has_candles(&self) -> bool {
        !self.candles.is_empty()
    }

    fn fit_content(&mut self) {
        if self.candles.is_empty() {
            return;
        }
        let t_min = self.candles.iter().map(|c| c.time).min().unwrap_or(0) as f64;
        let t_max = self.candles.iter().map(|c| c.time).max().unwrap_or(0) as f64;
        let p_min = self
            .candles
            .iter()
            .map(|c| c.low)
            .reduce(f64::min)
            .unwrap_or(0.0);
        let p_max = self
            .candles
            .iter()
            .map(|c| c.high)
            .reduce(f64::max)
            .unwrap_or(1.0);

        let spacing = self.bar_spacing();
        let p_pad = (p_max - p_min).max(1.0) * 0.05;
        // a few bars of headroom on the right so new trendlines can extend
        // past the last candle
        self.viewport = Viewport {
            x: [t_min - spacing, t_max + spacing * 5.0],
            y: [p_min - p_pad, p_max + p_pad],
        };
    }

    /// Average spacing between consecutive bars, defaulting to an hour.
    fn bar_spacing(&self) -> f64 {
        if self.candles.len() < 2 {
            return 3600.0;
        }
        let first = self.candles.first().map(|c| c.time).unwrap_or(0);
        let last = self.candles.last().map(|c| c.time).unwrap_or(0);
        ((last - first).abs() as f64 / (self.candles.len() - 1) as f64).max(1.0)
    }

    /// Replace the per-trendline line channels. Endpoints are stored in
    /// time-ascending order.
    pub fn set_trendlines(&mut self, trendlines: &[Trendline]) {
        self.trendlines = trendlines.iter().map(Trendline::endpoints).collect();
    }

    pub fn set_preview(&mut self, start: TrendPoint, end: TrendPoint) {
        self.preview = Some(if start.time <= end.time {
            [start, end]
        } else {
            [end, start]
        });
    }

    pub fn clear_preview(&mut self) {
        self.preview = None;
    }

    pub fn preview(&self) -> Option<[TrendPoint; 2]> {
        self.preview
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_pan_zoom_enabled(&mut self, enabled: bool) {
        self.pan_zoom_enabled = enabled;
        if !enabled {
            self.is_dragging = false;
        }
    }

    /// Chart-space point under a cell position. None when no candle data is
    /// plotted yet or the position misses the chart area.
    pub fn point_at(&self, col: u16, row: u16, area: Rect) -> Option<TrendPoint> {
        if self.candles.is_empty() {
            return None;
        }
        self.viewport
            .cell_to_data(col, row, area)
            .map(|(time, price)| TrendPoint::new(time.round() as i64, price))
    }

    pub fn handle_navigation_key(&mut self, code: KeyCode, area: Rect) {
        if !self.pan_zoom_enabled {
            return;
        }
        match code {
            KeyCode::Left => self.viewport.pan(-3, 0, area),
            KeyCode::Right => self.viewport.pan(3, 0, area),
            KeyCode::Up => self.viewport.pan(0, -1, area),
            KeyCode::Down => self.viewport.pan(0, 1, area),
            KeyCode::Char('+') => self.viewport.zoom_at(0.9, None, area),
            KeyCode::Char('-') => self.viewport.zoom_at(1.1, None, area),
            _ => {}
        }
    }

    pub fn handle_navigation_mouse(&mut self, m: &MouseEvent, area: Rect) {
        if !self.pan_zoom_enabled {
            return;
        }
        if area.contains(Position::new(m.column, m.row)) {
            match m.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    self.is_dragging = true;
                    self.last_mouse = (m.column, m.row);
                }
                MouseEventKind::Up(_) => self.is_dragging = false,
                MouseEventKind::Drag(MouseButton::Left) if self.is_dragging => {
                    let dx = m.column as i16 - self.last_mouse.0 as i16;
                    let dy = m.row as i16 - self.last_mouse.1 as i16;
                    self.viewport.pan(-dx, -dy, area);
                    self.last_mouse = (m.column, m.row);
                }
                MouseEventKind::ScrollUp => {
                    self.viewport.zoom_at(0.9, Some((m.column, m.row)), area)
                }
                MouseEventKind::ScrollDown => {
                    self.viewport.zoom_at(1.1, Some((m.column, m.row)), area)
                }
                _ => {}
            }
        } else if matches!(m.kind, MouseEventKind::Up(_)) {
            self.is_dragging = false;
        }
    }

    /// Index of the first trendline whose on-screen projection lies strictly
    /// within `tolerance` of the given cell position. Earlier-drawn lines
    /// win on overlap; a line with an endpoint outside the visible window
    /// never matches.
    pub fn hit_test(
        &self,
        col: u16,
        row: u16,
        area: Rect,
        trendlines: &[Trendline],
        tolerance: f64,
    ) -> Option<usize> {
        let pointer = Point::new(col as f64, row as f64);
        trendlines.iter().position(|trendline| {
            let [a, b] = trendline.endpoints();
            let a = self.viewport.data_to_cell(a.time as f64, a.price, area);
            let b = self.viewport.data_to_cell(b.time as f64, b.price, area);
            match (a, b) {
                (Some((ax, ay)), Some((bx, by))) => geometry::within_tolerance(
                    pointer,
                    Point::new(ax, ay),
                    Point::new(bx, by),
                    tolerance,
                ),
                _ => false,
            }
        })
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let spacing = self.bar_spacing();
        let body_half = spacing * 0.25;
        let canvas = Canvas::default()
            .x_bounds(self.viewport.x)
            .y_bounds(self.viewport.y)
            .paint(|ctx| {
                for candle in &self.candles {
                    let t = candle.time as f64;
                    if t < self.viewport.x[0] - spacing || t > self.viewport.x[1] + spacing {
                        continue;
                    }
                    let color = if candle.is_bullish() {
                        theme.up
                    } else {
                        theme.down
                    };
                    ctx.draw(&Line {
                        x1: t,
                        y1: candle.low,
                        x2: t,
                        y2: candle.high,
                        color,
                    });
                    for offset in [-body_half, 0.0, body_half] {
                        ctx.draw(&Line {
                            x1: t + offset,
                            y1: candle.open,
                            x2: t + offset,
                            y2: candle.close,
                            color,
                        });
                    }
                }
                ctx.layer();
                for [a, b] in &self.trendlines {
                    ctx.draw(&Line {
                        x1: a.time as f64,
                        y1: a.price,
                        x2: b.time as f64,
                        y2: b.price,
                        color: theme.trendline,
                    });
                }
                if let Some([a, b]) = &self.preview {
                    ctx.draw(&Line {
                        x1: a.time as f64,
                        y1: a.price,
                        x2: b.time as f64,
                        y2: b.price,
                        color: theme.preview,
                    });
                }
            });
        Widget::render(canvas, area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trendline::TIME_OFFSET;
    use crossterm::event::KeyModifiers;

    fn area() -> Rect {
        Rect::new(0, 0, 40, 20)
    }

    // viewport mapping cells 1:1 onto data for easy assertions
    fn unit_chart() -> TrendChart {
        TrendChart::default().with_bounds([0.0, 40.0], [0.0, 20.0])
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

    fn trendline(t1: i64, p1: f64, t2: i64, p2: f64) -> Trendline {
        Trendline::new(TrendPoint::new(t1, p1), TrendPoint::new(t2, p2), TIME_OFFSET)
    }

    fn mouse(kind: MouseEventKind, x: u16, y: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column: x,
            row: y,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn cell_and_data_transforms_round_trip() {
        let chart = unit_chart();
        let (x, y) = chart.viewport.cell_to_data(20, 10, area()).unwrap();
        assert_eq!((x, y), (20.0, 10.0));

        let (cx, cy) = chart.viewport.data_to_cell(x, y, area()).unwrap();
        assert_eq!((cx, cy), (20.0, 10.0));
    }

    #[test]
    fn cell_outside_area_is_undefined() {
        let chart = unit_chart();
        assert!(chart.viewport.cell_to_data(50, 10, area()).is_none());
        assert!(chart.viewport.cell_to_data(10, 25, area()).is_none());
    }

    #[test]
    fn data_outside_window_is_undefined() {
        let chart = unit_chart();
        assert!(chart.viewport.data_to_cell(41.0, 10.0, area()).is_none());
        assert!(chart.viewport.data_to_cell(10.0, -1.0, area()).is_none());
    }

    #[test]
    fn point_at_requires_plotted_data() {
        let chart = unit_chart();
        assert!(chart.point_at(20, 10, area()).is_none());

        let mut chart = TrendChart::default();
        chart.set_candles(vec![candle(10), candle(20)]);
        let chart = chart.with_bounds([0.0, 40.0], [0.0, 20.0]);
        let point = chart.point_at(20, 10, area()).unwrap();
        assert_eq!(point.time, 20);
        assert_eq!(point.price, 10.0);
    }

    #[test]
    fn hit_test_finds_nearby_trendline() {
        let chart = unit_chart();
        let lines = [trendline(5, 10.0, 35, 10.0)];

        // the projected segment runs through row 10
        assert_eq!(chart.hit_test(20, 10, area(), &lines, 2.0), Some(0));
        assert_eq!(chart.hit_test(20, 11, area(), &lines, 2.0), Some(0));
        assert_eq!(chart.hit_test(20, 18, area(), &lines, 2.0), None);
    }

    #[test]
    fn hit_test_prefers_earlier_trendline_on_overlap() {
        let chart = unit_chart();
        let lines = [trendline(5, 10.0, 35, 10.0), trendline(5, 10.5, 35, 10.5)];
        assert_eq!(chart.hit_test(20, 10, area(), &lines, 5.0), Some(0));
    }

    #[test]
    fn hit_test_skips_trendline_with_offscreen_endpoint() {
        let chart = unit_chart();
        // second endpoint is beyond the right edge of the window
        let lines = [trendline(5, 10.0, 100, 10.0)];
        assert_eq!(chart.hit_test(10, 10, area(), &lines, 5.0), None);
    }

    #[test]
    fn pan_shifts_the_window() {
        let mut chart = unit_chart();
        chart.handle_navigation_key(KeyCode::Right, area());
        assert!((chart.viewport.x[0] - 3.0).abs() < 1e-9);
        assert!((chart.viewport.x[1] - 43.0).abs() < 1e-9);
        assert_eq!(chart.viewport.y, [0.0, 20.0]);
    }

    #[test]
    fn zoom_shrinks_the_window() {
        let mut chart = unit_chart();
        chart.handle_navigation_key(KeyCode::Char('+'), area());
        assert!(chart.viewport.x_span() < 40.0);
        assert!(chart.viewport.y_span() < 20.0);
    }

    #[test]
    fn disabled_pan_zoom_ignores_input() {
        let mut chart = unit_chart();
        chart.set_pan_zoom_enabled(false);

        chart.handle_navigation_key(KeyCode::Right, area());
        chart.handle_navigation_mouse(&mouse(MouseEventKind::ScrollUp, 20, 10), area());
        assert_eq!(chart.viewport.x, [0.0, 40.0]);
        assert_eq!(chart.viewport.y, [0.0, 20.0]);
    }

    #[test]
    fn mouse_drag_pans_and_release_stops() {
        let mut chart = unit_chart();
        chart.handle_navigation_mouse(
            &mouse(MouseEventKind::Down(MouseButton::Left), 20, 10),
            area(),
        );
        chart.handle_navigation_mouse(
            &mouse(MouseEventKind::Drag(MouseButton::Left), 22, 10),
            area(),
        );
        assert!((chart.viewport.x[0] - -2.0).abs() < 1e-9);

        chart.handle_navigation_mouse(&mouse(MouseEventKind::Up(MouseButton::Left), 22, 10), area());
        let after_release = chart.viewport.x;
        chart.handle_navigation_mouse(
            &mouse(MouseEventKind::Drag(MouseButton::Left), 30, 10),
            area(),
        );
        assert_eq!(chart.viewport.x, after_release);
    }

    #[test]
    fn set_candles_fits_viewport() {
        let mut chart = TrendChart::default();
        chart.set_candles(vec![candle(3600), candle(7200)]);
        assert!(chart.viewport.x[0] < 3600.0);
        assert!(chart.viewport.x[1] > 7200.0);
        assert!(chart.viewport.y[0] < 8.0);
        assert!(chart.viewport.y[1] > 12.0);
    }

    #[test]
    fn preview_endpoints_are_time_sorted() {
        let mut chart = unit_chart();
        chart.set_preview(TrendPoint::new(30, 5.0), TrendPoint::new(10, 7.0));
        let [a, b] = chart.preview.unwrap();
        assert_eq!(a.time, 10);
        assert_eq!(b.time, 30);
    }
}
