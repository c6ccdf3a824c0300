mod api;
mod app;
mod application;
mod domain;
mod ui;
mod utils;

use iced::{window, Size};
use tracing_subscriber::EnvFilter;

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    iced::application(app::DownloadApp::new, app::update, app::view)
        .title("YouTube Downloader")
        .subscription(app::subscription)
        .window(window::Settings {
            size: Size::new(560.0, 780.0),
            ..Default::default()
        })
        .run()
}
