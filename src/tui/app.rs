use std::{
    io,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc, Arc,
    },
    time::Duration,
};

use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyCode, KeyEventKind,
    KeyModifiers,
};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{Block, Widget},
    DefaultTerminal,
};

use crate::{
    disk::{Config, DiskInterface},
    network,
    trendline::{AlertFormData, AlertStore, Trendline, TrendlineStore},
    tui::theme::{Theme, ThemeName},
};

use super::{
    events::{self, Event},
    traits::{Component, HandleResult, RectUtil},
};
use pages::{chart::ChartPage, Page};
use widgets::{banner::Banner, footer::Footer};

pub mod pages;
pub mod widgets;

/// How long success and error banners stay on screen.
const BANNER_TTL: Duration = Duration::from_secs(3);

pub struct SharedState {
    pub symbol: String,
    pub interval: String,
    pub theme: Theme,
}

pub struct App {
    exit: bool,
    context: Vec<Page>,
    shared_state: SharedState,
    config: Config,
    banner: Option<Banner>,

    input_thread: Option<std::thread::JoinHandle<()>>,
    tick_thread: Option<tokio::task::JoinHandle<()>>,
    fetch_thread: Option<tokio::task::JoinHandle<()>>,
}

impl App {
    pub fn new() -> crate::Result<Self> {
        let config = Config::load()?;
        let theme = Theme::new(config.theme_name.parse()?);

        let trendlines = TrendlineStore::load()?;
        let alerts = AlertStore::load()?;

        Ok(Self {
            exit: false,
            context: vec![Page::Chart(ChartPage::new(
                config.clone(),
                trendlines,
                alerts,
            ))],
            shared_state: SharedState {
                symbol: config.symbol.clone(),
                interval: config.interval.clone(),
                theme,
            },
            config,
            banner: None,

            input_thread: None,
            tick_thread: None,
            fetch_thread: None,
        })
    }

    pub async fn run(&mut self) -> crate::Result<()> {
        let (event_tr, event_rc) = mpsc::channel::<Event>();
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut terminal = ratatui::init();
        crossterm::execute!(io::stdout(), EnableMouseCapture).map_err(crate::Error::Draw)?;

        self.init_threads(&event_tr, &shutdown);

        while !self.exit {
            let area = self.draw(&mut terminal).map_err(crate::Error::Draw)?;

            let event = event_rc.recv()?;
            if let Err(e) = self.handle_event(event, area, &event_tr, &shutdown).await {
                self.banner = Some(Banner::error(e.to_string(), BANNER_TTL));
            }
        }

        // final render before exiting
        self.draw(&mut terminal).map_err(crate::Error::Draw)?;

        // signal all the threads to exit and wait for them
        shutdown.store(true, Ordering::Relaxed);
        self.exit_threads().await;

        let _ = crossterm::execute!(io::stdout(), DisableMouseCapture);
        ratatui::restore();

        Ok(())
    }

    fn draw(&self, terminal: &mut DefaultTerminal) -> io::Result<Rect> {
        let completed_frame = terminal.draw(|frame| {
            frame.render_widget(self, frame.area());
        })?;
        Ok(completed_frame.area)
    }

    fn init_threads(&mut self, tr: &mpsc::Sender<Event>, sd: &Arc<AtomicBool>) {
        let tr_input = tr.clone();
        let shutdown_signal = sd.clone();
        self.input_thread = Some(std::thread::spawn(move || {
            events::input::watch_input_events(tr_input, shutdown_signal);
        }));

        let tr_tick = tr.clone();
        let shutdown_signal = sd.clone();
        self.tick_thread = Some(tokio::spawn(async move {
            events::tick::start_ticking(tr_tick, shutdown_signal).await;
        }));

        self.fetch_thread = Some(spawn_candle_fetch(self.config.clone(), tr.clone()));
    }

    pub async fn exit_threads(&mut self) {
        if let Some(thread) = self.input_thread.take() {
            let _ = thread.join();
        }
        if let Some(thread) = self.tick_thread.take() {
            let _ = thread.await;
        }
        if let Some(thread) = self.fetch_thread.take() {
            thread.abort();
            let _ = thread.await;
        }
        for page in &mut self.context {
            page.exit_threads().await;
        }
    }

    /// Flip between the light and dark theme, persisting the choice so the
    /// next launch starts with it.
    fn toggle_theme(&mut self) -> crate::Result<()> {
        self.config.theme_name = match self.config.theme_name.parse()? {
            ThemeName::Dark => ThemeName::Light.to_string(),
            ThemeName::Light => ThemeName::Dark.to_string(),
        };
        self.config.save()?;
        self.shared_state.theme = Theme::new(self.config.theme_name.parse()?);
        Ok(())
    }

    fn process_result(&mut self, result: HandleResult) -> crate::Result<usize> {
        for _ in 0..result.page_pops {
            self.context.pop();
        }
        if result.reload {
            if let Some(page) = self.context.last_mut() {
                page.reload(&self.shared_state)?;
            }
        }
        self.context.extend(result.page_inserts);
        Ok(result.esc_ignores)
    }

    async fn handle_event(
        &mut self,
        event: Event,
        area: Rect,
        tr: &mpsc::Sender<Event>,
        sd: &Arc<AtomicBool>,
    ) -> crate::Result<()> {
        let [_, body_area, _] = Self::get_areas(area);

        if self.banner.as_ref().is_some_and(Banner::is_expired) {
            self.banner = None;
        }

        let result = if let Some(page) = self.context.last_mut() {
            page.handle_event(&event, body_area.block_inner(), tr, sd, &self.shared_state)?
        } else {
            HandleResult::default()
        };
        let esc_ignores = self.process_result(result)?;

        if self.context.is_empty() {
            self.exit = true;
        }

        match event {
            Event::Input(CrosstermEvent::Key(key_event))
                if key_event.kind == KeyEventKind::Press =>
            {
                match key_event.code {
                    KeyCode::Char('c') if key_event.modifiers == KeyModifiers::CONTROL => {
                        self.exit = true;
                    }
                    KeyCode::Char('t') if key_event.modifiers == KeyModifiers::NONE => {
                        // not while a form field might be capturing text
                        if matches!(self.context.last(), Some(Page::Chart(_))) {
                            self.toggle_theme()?;
                        }
                    }
                    KeyCode::Esc => {
                        if esc_ignores == 0 {
                            if let Some(mut page) = self.context.pop() {
                                page.exit_threads().await;
                            }
                            if self.context.is_empty() {
                                self.exit = true;
                            }
                        }
                    }
                    _ => {}
                }
            }

            Event::CandlesUpdateError(message) => {
                self.banner = Some(Banner::error(message, BANNER_TTL));
            }
            Event::AlertSubmitted(message) => {
                self.banner = Some(Banner::success(message, BANNER_TTL));
            }
            Event::AlertSubmitError(message) => {
                self.banner = Some(Banner::error(message, BANNER_TTL));
            }

            _ => {}
        }

        Ok(())
    }

    fn get_areas(area: Rect) -> [Rect; 3] {
        let [title_area, body_area, footer_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(area);
        [title_area, body_area, footer_area]
    }
}

/// Fetch candles off the UI loop and report the outcome as an event.
pub fn spawn_candle_fetch(
    config: Config,
    tr: mpsc::Sender<Event>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match network::fetch_candles(&config).await {
            Ok(candles) => {
                let _ = tr.send(Event::CandlesUpdate(candles));
            }
            Err(e) => {
                let _ = tr.send(Event::CandlesUpdateError(e.to_string()));
            }
        }
    })
}

/// Post an alert configuration off the UI loop and report the outcome as an
/// event.
pub fn spawn_alert_submit(
    config: Config,
    trendline: Trendline,
    alert: AlertFormData,
    tr: mpsc::Sender<Event>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match network::submit_alert(&config, &trendline, &alert).await {
            Ok(message) => {
                let _ = tr.send(Event::AlertSubmitted(message));
            }
            Err(e) => {
                let _ = tr.send(Event::AlertSubmitError(e.to_string()));
            }
        }
    })
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let [title_area, body_area, footer_area] = App::get_areas(area);
        buf.set_style(area, self.shared_state.theme.style());

        Line::from(format!(
            " chartline | {} {}",
            self.shared_state.symbol, self.shared_state.interval
        ))
        .render(title_area, buf);

        if let Some(page) = self.context.last() {
            page.render_component_with_block(
                body_area,
                buf,
                Block::bordered().border_type(self.shared_state.theme.border_type),
                &self.shared_state,
            );

            Footer {
                exit: &self.exit,
                hint: page.footer_hint(),
            }
            .render(footer_area, buf);
        }

        if let Some(banner) = &self.banner {
            banner.render(body_area.block_inner(), buf, &self.shared_state.theme);
        }
    }
}
