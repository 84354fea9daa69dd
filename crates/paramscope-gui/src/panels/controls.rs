use paramscope_core::controls::ControlMax;
use paramscope_core::interaction::DrawMode;
use paramscope_core::session::PanelSection;

use crate::app::ParamscopeApp;

const LEFT_PANEL_WIDTH: f32 = 280.0;

pub fn show(ctx: &egui::Context, app: &mut ParamscopeApp) {
    egui::SidePanel::left("controls")
        .default_width(LEFT_PANEL_WIDTH)
        .resizable(true)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.set_min_width(LEFT_PANEL_WIDTH - 20.0);

                mode_section(ui, app);
                ui.separator();
                annotation_section(ui, app);
                ui.separator();

                // All sessions share this one panel; dependents registered
                // their sections here instead of opening their own.
                let sections = app
                    .session
                    .shared()
                    .map(|s| s.controls.sections())
                    .unwrap_or_default();
                for section in &sections {
                    parameter_section(ui, app, section);
                    ui.separator();
                }

                session_section(ui, app);
            });
        });
}

fn mode_section(ui: &mut egui::Ui, app: &mut ParamscopeApp) {
    super::section_header(ui, "Draw Mode", None);
    ui.add_space(4.0);

    let mut mode = app.session.draw_mode();
    ui.horizontal(|ui| {
        for candidate in DrawMode::ALL {
            ui.selectable_value(&mut mode, candidate, candidate.label());
        }
    });
    if mode != app.session.draw_mode() {
        app.session.set_draw_mode(mode);
    }
}

fn annotation_section(ui: &mut egui::Ui, app: &mut ParamscopeApp) {
    let count = app.session.annotations().len();
    super::section_header(ui, "Annotations", Some(&format!("{count}")));
    ui.add_space(4.0);

    ui.horizontal(|ui| {
        if ui.button("Undo").clicked() {
            app.session.undo_annotation();
        }
        if ui.button("Clear").clicked() {
            app.session.clear_annotations();
        }
        if ui.button("Reset View").clicked() {
            app.session.reset_view();
        }
    });
}

fn parameter_section(ui: &mut egui::Ui, app: &mut ParamscopeApp, section: &PanelSection) {
    super::section_header(ui, &section.title, None);
    ui.add_space(4.0);

    let id = section.session;
    for control in &section.controls {
        let max = match control.max_value {
            ControlMax::Fixed(v) => v,
            ControlMax::ImageCount => app
                .with_session_mut(id, |s| s.frames().len().saturating_sub(1) as f64)
                .unwrap_or(0.0),
        };
        let Some(mut value) = app.with_session_mut(id, |s| s.param(&control.parameter, control.initial))
        else {
            continue;
        };

        let slider = egui::Slider::new(&mut value, 0.0..=max.max(0.0))
            .integer()
            .text(&control.display_name);
        if ui.add(slider).changed() {
            // Coercion and the synchronous recompute both happen inside.
            app.with_session_mut(id, |s| s.set_param(&control.parameter, value));
        }
    }
}

fn session_section(ui: &mut egui::Ui, app: &mut ParamscopeApp) {
    super::section_header(ui, "Sessions", None);
    ui.add_space(4.0);

    if ui.button("Spawn Preview View").clicked() {
        if let Err(e) = app.spawn_preview() {
            let message = format!("failed to spawn preview: {e}");
            app.session.log(message);
        }
    }
    let open = app
        .session
        .dependents()
        .iter()
        .filter(|d| d.should_continue())
        .count();
    if open > 0 {
        ui.small(format!("{open} dependent view(s) open"));
    }
}
