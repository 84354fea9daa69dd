mod app;
mod convert;
mod panels;
mod pipeline;

use std::path::PathBuf;

use clap::Parser;

/// Interactive parameter-tuning viewer for raster images.
#[derive(Parser, Debug, Clone)]
#[command(name = "paramscope", version, about)]
pub struct Args {
    /// Image to open; a synthetic test image is used when omitted.
    pub image: Option<PathBuf>,

    /// Parameter snapshot (TOML) applied at startup.
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Initial window size as WIDTHxHEIGHT.
    #[arg(long, default_value = "1280x800")]
    pub window_size: String,
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let (width, height) = parse_window_size(&args.window_size);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([width, height])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Paramscope"),
        ..Default::default()
    };

    eframe::run_native(
        "Paramscope",
        options,
        Box::new(move |_cc| Ok(Box::new(app::ParamscopeApp::new(&args)?))),
    )
}

fn parse_window_size(spec: &str) -> (f32, f32) {
    spec.split_once('x')
        .and_then(|(w, h)| Some((w.trim().parse().ok()?, h.trim().parse().ok()?)))
        .unwrap_or((1280.0, 800.0))
}
