use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc, Arc,
    },
    time::Duration,
};

/// Periodic tick driving time-based UI state, such as banner expiry.
pub async fn start_ticking(tx: mpsc::Sender<super::Event>, shutdown_signal: Arc<AtomicBool>) {
    let mut interval = tokio::time::interval(Duration::from_millis(500));
    while !shutdown_signal.load(Ordering::Relaxed) {
        interval.tick().await;
        if tx.send(super::Event::Tick).is_err() {
            break;
        }
    }
}
