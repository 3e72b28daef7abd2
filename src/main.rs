//! Food Delivery Simulator
//!
//! A courier life simulation about working your way out of debt.

mod app;
mod core;
mod customer;
mod economy;
mod orders;
mod skills;
mod ui;

use app::DeliverySimApp;
use crate::core::config::AppConfig;
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> eframe::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::INFO)
        .init();

    let config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("Using default config: {:#}", e);
        AppConfig::default()
    });
    tracing::info!("Starting {} for {}", AppConfig::APP_NAME, config.player_name);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.ui.window_size)
            .with_min_inner_size([1000.0, 680.0])
            .with_title(config.window_title()),
        ..Default::default()
    };

    eframe::run_native(
        AppConfig::APP_NAME,
        native_options,
        Box::new(move |cc| Ok(Box::new(DeliverySimApp::new(cc, config)))),
    )
}
