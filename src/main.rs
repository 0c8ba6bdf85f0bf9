//! Native org chart viewer
//!
//! Loads an org chart document and shows it as an interactive force-directed
//! layout. Nodes can be dragged to pin them while the layout adjusts.

mod app;
mod args;
mod theme;

use args::Args;
use clap::Parser;
use eframe::egui;
use orgchart_native::{loader, LayoutSettings};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .unwrap_or_else(|_| {
            eprintln!("Invalid log level: {}. Using 'warn' instead.", args.log_level);
            EnvFilter::new("warn")
        });
    tracing_subscriber::fmt().with_env_filter(filter).init();
    tracing::debug!("Parsed arguments: {:?}", args);

    let mut settings = match &args.settings {
        Some(path) => LayoutSettings::load_from(path).unwrap_or_else(|e| {
            tracing::error!("Failed to load settings from {:?}: {}", path, e);
            process::exit(1);
        }),
        None => LayoutSettings::load(),
    };
    if let Some(width) = args.width {
        settings.width = width;
    }
    if let Some(height) = args.height {
        settings.height = height;
    }

    let graph = loader::load_graph(&args.input, &settings).unwrap_or_else(|e| {
        tracing::error!("Failed to load {:?}: {}", args.input, e);
        process::exit(1);
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([settings.width, settings.height])
            .with_title("Org Chart"),
        ..Default::default()
    };

    eframe::run_native(
        "Org Chart",
        options,
        Box::new(|cc| Ok(Box::new(app::OrgChartApp::new(cc, graph, settings)))),
    )
}
