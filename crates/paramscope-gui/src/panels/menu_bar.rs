use paramscope_core::io::{load_frame, save_frame};
use paramscope_core::snapshot::ParamSnapshot;

use crate::app::ParamscopeApp;

pub fn show(ctx: &egui::Context, app: &mut ParamscopeApp) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open Image...").clicked() {
                    ui.close();
                    open_image(app);
                }
                if ui.button("Save View...").clicked() {
                    ui.close();
                    save_view(app);
                }

                ui.separator();

                if ui.button("Save Parameters...").clicked() {
                    ui.close();
                    save_snapshot(app);
                }
                if ui.button("Load Parameters...").clicked() {
                    ui.close();
                    load_snapshot(app);
                }

                ui.separator();

                if ui.button("Quit").clicked() {
                    ui.close();
                    app.session.close();
                }
            });

            ui.menu_button("View", |ui| {
                if ui.button("Reset View").clicked() {
                    ui.close();
                    app.session.reset_view();
                }
                if ui.button("Spawn Preview View").clicked() {
                    ui.close();
                    if let Err(e) = app.spawn_preview() {
                        let message = format!("failed to spawn preview: {e}");
                        app.session.log(message);
                    }
                }
                histogram_item(ui, app);
            });

            ui.menu_button("Help", |ui| {
                if ui.button("About").clicked() {
                    ui.close();
                    app.show_about = true;
                }
            });
        });
    });
}

#[cfg(feature = "plots")]
fn histogram_item(ui: &mut egui::Ui, app: &mut ParamscopeApp) {
    if ui.button("Histogram").clicked() {
        ui.close();
        app.show_histogram = !app.show_histogram;
    }
}

#[cfg(not(feature = "plots"))]
fn histogram_item(ui: &mut egui::Ui, app: &mut ParamscopeApp) {
    // The optional plotting dependency was not compiled in: one
    // informational line, the viewport keeps working.
    if ui.button("Histogram").clicked() {
        ui.close();
        let unavailable = paramscope_core::error::ParamscopeError::ResourceUnavailable(
            "histogram display (build with the `plots` feature)".to_string(),
        );
        app.session.log(unavailable.to_string());
    }
}

fn open_image(app: &mut ParamscopeApp) {
    let Some(path) = rfd::FileDialog::new()
        .add_filter("Images", &["png", "jpg", "jpeg", "bmp", "tiff", "tif"])
        .pick_file()
    else {
        return;
    };
    match load_frame(&path) {
        Ok(frame) => {
            app.replace_source(frame);
            app.session.log(format!("Opened {}", path.display()));
        }
        Err(e) => {
            app.session
                .log(format!("Failed to open {}: {e}", path.display()));
        }
    }
}

fn save_view(app: &mut ParamscopeApp) {
    let index = app.session.current_index();
    let Some(labeled) = app.session.frames().get(index).cloned() else {
        app.session.log("No frame to save");
        return;
    };
    let Some(path) = rfd::FileDialog::new()
        .add_filter("PNG", &["png"])
        .add_filter("TIFF", &["tiff", "tif"])
        .set_file_name("view.png")
        .save_file()
    else {
        return;
    };
    match save_frame(&labeled.frame, &path) {
        Ok(()) => app.session.log(format!("Saved {}", path.display())),
        Err(e) => app.session.log(format!("Failed to save: {e}")),
    }
}

fn save_snapshot(app: &mut ParamscopeApp) {
    let Some(path) = rfd::FileDialog::new()
        .add_filter("TOML", &["toml"])
        .set_file_name("parameters.toml")
        .save_file()
    else {
        return;
    };
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("parameters")
        .to_string();
    let snapshot = app.session.capture_snapshot(&name);
    match snapshot.save(&path) {
        Ok(()) => app
            .session
            .log(format!("Saved parameters to {}", path.display())),
        Err(e) => app.session.log(format!("Failed to save parameters: {e}")),
    }
}

fn load_snapshot(app: &mut ParamscopeApp) {
    let Some(path) = rfd::FileDialog::new()
        .add_filter("TOML", &["toml"])
        .pick_file()
    else {
        return;
    };
    match ParamSnapshot::load(&path) {
        Ok(snapshot) => app.session.apply_snapshot(&snapshot),
        Err(e) => app.session.log(format!("Failed to load parameters: {e}")),
    }
}
