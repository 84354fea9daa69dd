use egui_plot::{Bar, BarChart, Plot};
use paramscope_core::filters;

use crate::app::ParamscopeApp;

/// Height of the histogram chart in pixels.
const CHART_HEIGHT: f32 = 160.0;
const BINS: usize = 64;

pub fn show(ctx: &egui::Context, app: &mut ParamscopeApp) {
    let index = app.session.current_index();
    let Some(labeled) = app.session.frames().get(index) else {
        return;
    };
    let counts = filters::histogram(&labeled.frame, BINS);
    let title = format!("Histogram: {}", labeled.label);

    let mut open = app.show_histogram;
    egui::Window::new(title)
        .id(egui::Id::new("histogram"))
        .default_size([380.0, 220.0])
        .open(&mut open)
        .show(ctx, |ui| {
            let bars: Vec<Bar> = counts
                .iter()
                .enumerate()
                .map(|(i, &count)| {
                    Bar::new((i as f64 + 0.5) / BINS as f64, count as f64)
                        .width(1.0 / BINS as f64)
                        .fill(egui::Color32::from_rgb(120, 160, 220))
                })
                .collect();
            let chart = BarChart::new("gray levels", bars);

            Plot::new("histogram_plot")
                .height(CHART_HEIGHT)
                .allow_drag(false)
                .allow_zoom(false)
                .allow_scroll(false)
                .allow_boxed_zoom(false)
                .show_grid(false)
                .y_axis_label("count")
                .show(ui, |plot_ui| {
                    plot_ui.bar_chart(chart);
                });
        });
    app.show_histogram = open;
}
