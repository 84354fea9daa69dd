use std::collections::HashMap;
use std::rc::Rc;

use anyhow::Context as _;
use paramscope_core::frame::Frame;
use paramscope_core::geometry::Size;
use paramscope_core::session::{Session, SessionConfig, SessionId};
use paramscope_core::snapshot::ParamSnapshot;

use crate::panels;
use crate::pipeline;
use crate::Args;

/// Cached GPU texture for one session's currently displayed frame.
pub struct TextureSlot {
    pub revision: u64,
    pub frame_index: usize,
    pub handle: egui::TextureHandle,
}

pub struct ParamscopeApp {
    pub session: Session,
    pub source: Rc<Frame>,
    pub textures: HashMap<SessionId, TextureSlot>,
    pub show_about: bool,
    #[cfg(feature = "plots")]
    pub show_histogram: bool,
}

impl ParamscopeApp {
    pub fn new(args: &Args) -> anyhow::Result<Self> {
        let source = match &args.image {
            Some(path) => {
                let frame = paramscope_core::io::load_frame(path)
                    .with_context(|| format!("failed to load {}", path.display()))?;
                tracing::info!(path = %path.display(), "loaded source image");
                frame
            }
            None => pipeline::demo_frame(),
        };
        let source = Rc::new(source);

        let config = SessionConfig {
            title: "Primary".to_string(),
            ..Default::default()
        };
        let mut session = Session::open(
            config,
            pipeline::standard_controls(),
            pipeline::tuning_processor(source.clone()),
        )?;

        if let Some(path) = &args.snapshot {
            match ParamSnapshot::load(path) {
                Ok(snapshot) => session.apply_snapshot(&snapshot),
                Err(e) => tracing::warn!(error = %e, "failed to load startup snapshot"),
            }
        }

        session.log("Viewer ready. Drag to draw, wheel to zoom, middle-drag to pan.");

        Ok(Self {
            session,
            source,
            textures: HashMap::new(),
            show_about: false,
            #[cfg(feature = "plots")]
            show_histogram: false,
        })
    }

    /// Run `f` against the session with the given id, primary or dependent.
    pub fn with_session_mut<R>(
        &mut self,
        id: SessionId,
        f: impl FnOnce(&mut Session) -> R,
    ) -> Option<R> {
        if self.session.id() == id {
            return Some(f(&mut self.session));
        }
        self.session.dependent_mut(id).map(f)
    }

    /// Replace the source raster; the tuning pipeline recomputes from it.
    pub fn replace_source(&mut self, frame: Frame) {
        self.source = Rc::new(frame);
        self.session
            .set_processor(pipeline::tuning_processor(self.source.clone()));
    }

    pub fn spawn_preview(&mut self) -> paramscope_core::error::Result<()> {
        let config = SessionConfig {
            title: format!("Preview {}", self.session.dependents().len() + 1),
            viewport: Size::new(480.0, 360.0),
            ..Default::default()
        };
        self.session.spawn_dependent(
            config,
            pipeline::preview_controls(),
            pipeline::threshold_preview_processor(self.source.clone()),
        )?;
        Ok(())
    }

    fn drop_stale_textures(&mut self) {
        let mut alive = vec![self.session.id()];
        alive.extend(
            self.session
                .dependents()
                .iter()
                .filter(|d| d.should_continue())
                .map(|d| d.id()),
        );
        self.textures.retain(|id, _| alive.contains(id));
    }
}

impl eframe::App for ParamscopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        panels::menu_bar::show(ctx, self);
        panels::controls::show(ctx, self);
        panels::status::show(ctx, self);
        panels::viewport::show(ctx, self);
        panels::viewport::show_dependents(ctx, self);

        #[cfg(feature = "plots")]
        if self.show_histogram {
            panels::histogram::show(ctx, self);
        }

        if self.show_about {
            egui::Window::new("About Paramscope")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.heading("Paramscope");
                        ui.label("Interactive Parameter Tuning");
                        ui.add_space(8.0);
                        ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
                        ui.add_space(8.0);
                        if ui.button("Close").clicked() {
                            self.show_about = false;
                        }
                    });
                });
        }

        self.session.prune_closed_dependents();
        self.drop_stale_textures();

        if !self.session.should_continue() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}
