mod api;
mod app;
mod config;
mod error;
mod models;
mod results;
mod search;
mod sources;
mod stats;
mod toast;
mod upload;

use iced::{window, Font, Size};
use tracing_subscriber::EnvFilter;

use app::App;

const LOG_ENV: &str = "DEVFLOW_LOG";

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> iced::Result {
    init_logging();

    let config = config::Config::load();

    iced::application("DevFlow", App::update, App::view)
        .theme(App::theme)
        .subscription(App::subscription)
        .window(window::Settings {
            size: Size::new(config.window.width as f32, config.window.height as f32),
            min_size: Some(Size::new(
                config.window.min_width as f32,
                config.window.min_height as f32,
            )),
            position: window::Position::Centered,
            ..Default::default()
        })
        .default_font(Font::MONOSPACE)
        .run_with(App::new)
}
