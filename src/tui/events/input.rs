use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc, Arc,
    },
    time::Duration,
};

use crossterm::event::Event as CrosstermEvent;

/// Forward key and mouse events from the terminal into the app's event
/// channel. Polls so the thread notices shutdown without needing one more
/// input event.
pub fn watch_input_events(tx: mpsc::Sender<super::Event>, shutdown_signal: Arc<AtomicBool>) {
    while !shutdown_signal.load(Ordering::Relaxed) {
        match crossterm::event::poll(Duration::from_millis(250)) {
            Ok(true) => {
                let Ok(event) = crossterm::event::read() else {
                    break;
                };
                match event {
                    CrosstermEvent::Key(_) | CrosstermEvent::Mouse(_) => {
                        if tx.send(super::Event::Input(event)).is_err() {
                            break;
                        }
                    }
                    _ => {}
                }
            }
            Ok(false) => {}
            Err(_) => break,
        }
    }
}
