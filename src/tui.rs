pub mod app;
mod events;
pub mod theme;
mod traits;

pub use events::Event;

use app::App;

pub async fn run() -> crate::Result<()> {
    let mut app = App::new()?;
    app.run().await
}
