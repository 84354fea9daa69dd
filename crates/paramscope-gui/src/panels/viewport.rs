use std::collections::HashMap;

use paramscope_core::geometry::{Point, Size};
use paramscope_core::interaction::{Button, DrawMode, InputEvent};
use paramscope_core::render::{OverlayGeometry, OverlayShape, OverlayStyle, Scene};
use paramscope_core::session::{Session, SessionId};

use crate::app::{ParamscopeApp, TextureSlot};
use crate::convert::frame_to_color_image;

/// One egui scroll "notch" in points.
const SCROLL_NOTCH: f32 = 50.0;

pub fn show(ctx: &egui::Context, app: &mut ParamscopeApp) {
    let ParamscopeApp {
        session, textures, ..
    } = app;
    egui::CentralPanel::default().show(ctx, |ui| {
        let rect = ui.available_rect_before_wrap();
        session_viewport(ctx, ui, rect, session, textures);
    });
}

pub fn show_dependents(ctx: &egui::Context, app: &mut ParamscopeApp) {
    let ParamscopeApp {
        session, textures, ..
    } = app;
    for dependent in session.dependents_mut() {
        if !dependent.should_continue() {
            continue;
        }
        let mut open = true;
        egui::Window::new(dependent.title().to_string())
            .id(egui::Id::new(dependent.id()))
            .default_size([480.0, 380.0])
            .open(&mut open)
            .show(ctx, |ui| {
                ui.set_min_size(egui::vec2(320.0, 240.0));
                let rect = ui.available_rect_before_wrap();
                session_viewport(ctx, ui, rect, dependent, textures);
            });
        if !open {
            dependent.close();
        }
    }
}

fn session_viewport(
    ctx: &egui::Context,
    ui: &mut egui::Ui,
    rect: egui::Rect,
    session: &mut Session,
    textures: &mut HashMap<SessionId, TextureSlot>,
) {
    paint_background(ui, rect);
    session.set_viewport_size(Size::new(rect.width(), rect.height()));

    let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());
    dispatch_input(ctx, ui, &response, rect, session);

    let scene = match session.scene() {
        Ok(Some(scene)) => scene,
        Ok(None) => {
            show_placeholder(ui, rect);
            return;
        }
        Err(e) => {
            let message = format!("{}: {e}", session.title());
            session.log(message);
            return;
        }
    };

    // Upload the texture only when the processor output or selection changed,
    // and never against a closed session.
    let needs_upload = match textures.get(&session.id()) {
        Some(slot) => slot.revision != session.revision() || slot.frame_index != scene.frame_index,
        None => true,
    };
    if needs_upload && !session.is_closed() {
        let image = frame_to_color_image(&session.frames()[scene.frame_index].frame);
        let handle = ctx.load_texture(
            format!("viewport-{:?}", session.id()),
            image,
            egui::TextureOptions::NEAREST,
        );
        textures.insert(
            session.id(),
            TextureSlot {
                revision: session.revision(),
                frame_index: scene.frame_index,
                handle,
            },
        );
    }
    let Some(slot) = textures.get(&session.id()) else {
        return;
    };

    paint_scene(ui, rect, &slot.handle, &scene);
}

/// Translate egui pointer/wheel/keyboard state into core input events and
/// feed them through the session. Any mutation repaints this same frame.
fn dispatch_input(
    ctx: &egui::Context,
    ui: &egui::Ui,
    response: &egui::Response,
    rect: egui::Rect,
    session: &mut Session,
) {
    let to_local = |pos: egui::Pos2| Point::new(pos.x - rect.min.x, pos.y - rect.min.y);
    let pointer_pos = response
        .interact_pointer_pos()
        .or_else(|| ui.input(|i| i.pointer.latest_pos()))
        .map(to_local);

    let mut events: Vec<InputEvent> = Vec::new();

    if let (Some(pos), true) = (response.hover_pos().map(to_local), response.hovered()) {
        events.push(InputEvent::PointerMove { pos });
    } else if response.dragged() {
        if let Some(pos) = pointer_pos {
            events.push(InputEvent::PointerMove { pos });
        }
    }

    match session.draw_mode() {
        DrawMode::Polygon => {
            if response.clicked_by(egui::PointerButton::Primary) {
                if let Some(pos) = pointer_pos {
                    events.push(InputEvent::ButtonDown {
                        button: Button::Primary,
                        pos,
                    });
                }
            }
        }
        _ => {
            if response.drag_started_by(egui::PointerButton::Primary) {
                if let Some(pos) = pointer_pos {
                    events.push(InputEvent::ButtonDown {
                        button: Button::Primary,
                        pos,
                    });
                }
            }
            if response.drag_stopped_by(egui::PointerButton::Primary) {
                if let Some(pos) = pointer_pos {
                    events.push(InputEvent::ButtonUp {
                        button: Button::Primary,
                        pos,
                    });
                }
            }
        }
    }

    if response.double_clicked_by(egui::PointerButton::Secondary) {
        if let Some(pos) = pointer_pos {
            events.push(InputEvent::DoubleClick {
                button: Button::Secondary,
                pos,
            });
        }
    } else if response.clicked_by(egui::PointerButton::Secondary) {
        if let Some(pos) = pointer_pos {
            events.push(InputEvent::ButtonDown {
                button: Button::Secondary,
                pos,
            });
        }
    }

    if response.drag_started_by(egui::PointerButton::Middle) {
        if let Some(pos) = pointer_pos {
            events.push(InputEvent::ButtonDown {
                button: Button::Middle,
                pos,
            });
        }
    }
    if response.drag_stopped_by(egui::PointerButton::Middle) {
        if let Some(pos) = pointer_pos {
            events.push(InputEvent::ButtonUp {
                button: Button::Middle,
                pos,
            });
        }
    }

    let scroll = ui.input(|i| i.smooth_scroll_delta.y);
    if scroll != 0.0 && response.hovered() {
        if let Some(pos) = pointer_pos {
            let fast = ui.input(|i| i.modifiers.ctrl);
            events.push(InputEvent::Wheel {
                steps: scroll / SCROLL_NOTCH,
                fast,
                pos,
            });
        }
    }

    if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
        events.push(InputEvent::Escape);
    }
    if response.hovered() && ui.input(|i| i.key_pressed(egui::Key::R)) {
        session.reset_view();
    }

    let mut mutated = false;
    for event in events {
        mutated |= session.handle_input(event);
    }
    if mutated {
        ctx.request_repaint();
    }
}

fn paint_background(ui: &egui::Ui, rect: egui::Rect) {
    ui.painter()
        .rect_filled(rect, 0.0, egui::Color32::from_gray(30));
}

fn show_placeholder(ui: &mut egui::Ui, rect: egui::Rect) {
    ui.painter().text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        "No image to display",
        egui::FontId::proportional(18.0),
        egui::Color32::from_gray(100),
    );
}

fn paint_scene(ui: &egui::Ui, rect: egui::Rect, texture: &egui::TextureHandle, scene: &Scene) {
    let to_screen =
        |p: &Point| egui::pos2(rect.min.x + p.x, rect.min.y + p.y);
    let painter = ui.painter_at(rect);

    let dest = egui::Rect::from_min_max(
        to_screen(&scene.dest_rect.min),
        to_screen(&scene.dest_rect.max),
    );
    let uv = egui::Rect::from_min_max(
        egui::pos2(scene.source_uv.min.x, scene.source_uv.min.y),
        egui::pos2(scene.source_uv.max.x, scene.source_uv.max.y),
    );
    painter.image(texture.id(), dest, uv, egui::Color32::WHITE);

    for shape in &scene.overlays {
        paint_overlay(&painter, rect, shape);
    }

    painter.text(
        rect.min + egui::vec2(8.0, 8.0),
        egui::Align2::LEFT_TOP,
        &scene.frame_label,
        egui::FontId::proportional(14.0),
        egui::Color32::from_white_alpha(200),
    );
}

fn paint_overlay(painter: &egui::Painter, rect: egui::Rect, shape: &OverlayShape) {
    let (color, width) = match shape.style {
        OverlayStyle::Committed => (egui::Color32::from_rgb(80, 200, 120), 1.5),
        OverlayStyle::Preview => (egui::Color32::from_rgb(255, 220, 60), 1.0),
    };
    let stroke = egui::Stroke::new(width, color);
    let to_screen = |p: &Point| egui::pos2(rect.min.x + p.x, rect.min.y + p.y);

    match &shape.geometry {
        OverlayGeometry::Rect(r) => {
            painter.rect_stroke(
                egui::Rect::from_min_max(to_screen(&r.min), to_screen(&r.max)),
                0.0,
                stroke,
                egui::epaint::StrokeKind::Outside,
            );
        }
        OverlayGeometry::Segment { a, b } => {
            painter.line_segment([to_screen(a), to_screen(b)], stroke);
        }
        OverlayGeometry::Path { points, closed } => {
            let pts: Vec<egui::Pos2> = points.iter().map(to_screen).collect();
            if *closed {
                painter.add(egui::Shape::closed_line(pts, stroke));
            } else {
                painter.add(egui::Shape::line(pts, stroke));
            }
        }
    }

    painter.text(
        to_screen(&shape.label_anchor),
        egui::Align2::LEFT_BOTTOM,
        &shape.label,
        egui::FontId::proportional(12.0),
        color,
    );
}
