use crate::app::ParamscopeApp;

pub fn show(ctx: &egui::Context, app: &mut ParamscopeApp) {
    egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
        ui.add_space(2.0);

        // Log area: fixed height for 4 lines, scrollable, newest at the
        // bottom. The sink is shared with every dependent session.
        let line_height = ui.text_style_height(&egui::TextStyle::Body);
        let spacing = ui.spacing().item_spacing.y;
        let log_height = line_height * 4.0 + spacing * 3.0;

        let lines = app
            .session
            .shared()
            .map(|s| s.log.lines())
            .unwrap_or_default();

        egui::ScrollArea::vertical()
            .max_height(log_height)
            .min_scrolled_height(log_height)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                if lines.is_empty() {
                    // Reserve space for 4 empty lines to prevent layout jump.
                    for _ in 0..4 {
                        ui.label("");
                    }
                } else {
                    for msg in &lines {
                        ui.label(msg);
                    }
                }
            });

        // Status line
        ui.horizontal(|ui| {
            match app.session.status_line() {
                Some(status) => ui.label(status.to_string()),
                None => ui.label("No image"),
            };
            ui.separator();
            ui.label(format!("Mode: {}", app.session.draw_mode().label()));
        });

        ui.add_space(2.0);
    });
}
