use chartline_lib::disk::{Config, DiskInterface};
use clap::{Parser, Subcommand};
use figlet_rs::FIGfont;

/// Terminal trading chart with mouse-drawn trendlines and alerts
#[derive(Parser)]
#[command(name = "chartline")]
#[command(
    about = "Draw trendlines on a candlestick chart and wire them to alerts",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the resolved configuration and where it lives on disk
    Config,
}

fn chartline_art() {
    if let Ok(standard_font) = FIGfont::standard() {
        if let Some(art) = standard_font.convert("chartline") {
            println!("{art}");
        }
    }
}

#[tokio::main]
async fn main() -> chartline_lib::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Config) => {
            chartline_art();
            let config = Config::load()?;
            println!("config file: {}", Config::path()?.display());
            println!("{config:#?}");
            println!(
                "available themes: {}",
                chartline_lib::tui::theme::ThemeName::list().join(", ")
            );
        }
        None => chartline_lib::tui::run().await?,
    }

    Ok(())
}
