//! Interactive falling-sand viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns a [`Simulation`] and
//! implements [`eframe::App`]: mouse painting, material hotkeys,
//! drag-and-drop image import, and rendering of the per-cell color
//! snapshot as an upscaled texture. All rule logic lives in `sand-core`;
//! this is the platform glue the engine treats as external.

use eframe::App;
use sand_core::{
    importer::{CancelToken, ImportError, ImportStatus, PixelSource, Rgba},
    material::Material,
    simulation::Simulation,
};
use std::time::Instant;

/// Screen pixels per grid cell.
const CELL_PIXELS: f32 = 4.0;

/// Seconds between simulation ticks (the classic 33 ms timer).
const TICK_INTERVAL: f64 = 0.033;

/// Materials selectable from the toolbar, with their hotkeys.
const PALETTE: [(Material, &str); 6] = [
    (Material::Fire, "1 Fire"),
    (Material::Sand, "2 Sand"),
    (Material::Wood, "3 Wood"),
    (Material::Smoke, "4 Smoke"),
    (Material::Ember, "5 Ember"),
    (Material::Water, "6 Water"),
];

/// Main application state for the interactive viewer.
///
/// The per-frame update is:
/// 1. Handle dropped image files (starting a progressive import).
/// 2. While an import is active, apply one row per frame and show its
///    progress; ticking stays suspended.
/// 3. Otherwise paint under the pointer, then tick on the fixed cadence.
/// 4. Upload the snapshot to a nearest-filtered texture and draw it.
pub struct Viewer {
    sim: Simulation,
    rng: rand::rngs::ThreadRng,

    texture: Option<egui::TextureHandle>,

    last_tick_time: f64,

    import_token: Option<CancelToken>,
    import_fraction: f32,
    status_line: String,
}

impl Viewer {
    pub fn new() -> Self {
        Self {
            sim: Simulation::default(),
            rng: rand::rng(),
            texture: None,
            last_tick_time: 0.0,
            import_token: None,
            import_fraction: 0.0,
            status_line: String::from("drop an image to burn it"),
        }
    }

    /// Converts a pointer position inside the grid rect to cell
    /// coordinates by integer division with the cell pixel size.
    fn pixel_to_cell(pos: egui::Pos2, origin: egui::Pos2) -> (i32, i32) {
        let x = ((pos.x - origin.x) / CELL_PIXELS).floor() as i32;
        let y = ((pos.y - origin.y) / CELL_PIXELS).floor() as i32;
        (x, y)
    }

    /// Builds an egui image from the engine's per-cell color snapshot.
    fn snapshot_image(&self) -> egui::ColorImage {
        let colors = self.sim.snapshot_colors();
        let mut rgb = Vec::with_capacity(colors.len() * 3);
        for c in &colors {
            rgb.extend_from_slice(&[c.r, c.g, c.b]);
        }
        egui::ColorImage::from_rgb([self.sim.width(), self.sim.height()], &rgb)
    }

    /// Decodes a dropped file and starts a progressive import.
    ///
    /// Decode and resize failures stay on this side of the importer
    /// boundary; the engine only ever sees an already-valid source.
    fn start_import(&mut self, file: &egui::DroppedFile) {
        let decoded = if let Some(bytes) = &file.bytes {
            image::load_from_memory(bytes)
        } else if let Some(path) = &file.path {
            image::open(path)
        } else {
            log::warn!("dropped file {:?} carried no data", file.name);
            return;
        };

        let img = match decoded {
            Ok(img) => img,
            Err(err) => {
                log::warn!("could not decode {:?}: {err}", file.name);
                self.status_line = format!("could not decode image: {err}");
                return;
            }
        };

        let source = match pixel_source_from_image(&img, self.sim.width(), self.sim.height()) {
            Ok(source) => source,
            Err(err) => {
                self.status_line = format!("import failed: {err}");
                return;
            }
        };

        let token = CancelToken::new();
        match self.sim.begin_import(source, token.clone()) {
            Ok(()) => {
                self.import_token = Some(token);
                self.import_fraction = 0.0;
                self.status_line = format!("importing {:?}", file.name);
            }
            Err(err) => self.status_line = format!("import failed: {err}"),
        }
    }

    /// Applies one import row for this frame and records terminal states.
    fn drive_import(&mut self) {
        let Some(progress) = self.sim.import_step() else {
            return;
        };
        self.import_fraction = progress.fraction;
        match progress.status {
            ImportStatus::InProgress => {}
            ImportStatus::Completed => {
                self.import_token = None;
                self.status_line = String::from("import complete");
            }
            ImportStatus::Cancelled => {
                self.import_token = None;
                self.status_line = String::from("import cancelled");
            }
        }
    }

    /// Material hotkeys 1–6.
    fn handle_hotkeys(&mut self, ctx: &egui::Context) {
        let keys = [
            (egui::Key::Num1, Material::Fire),
            (egui::Key::Num2, Material::Sand),
            (egui::Key::Num3, Material::Wood),
            (egui::Key::Num4, Material::Smoke),
            (egui::Key::Num5, Material::Ember),
            (egui::Key::Num6, Material::Water),
        ];
        for (key, material) in keys {
            if ctx.input(|i| i.key_pressed(key)) {
                self.sim.set_active_material(material);
            }
        }
    }

    /// Builds the top panel: material palette and import controls.
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                for (material, label) in PALETTE {
                    if ui
                        .selectable_label(self.sim.active_material() == material, label)
                        .clicked()
                    {
                        self.sim.set_active_material(material);
                    }
                }

                ui.separator();

                if self.sim.importing() {
                    ui.add(
                        egui::ProgressBar::new(self.import_fraction)
                            .desired_width(120.0)
                            .show_percentage(),
                    );
                    if let Some(token) = &self.import_token
                        && ui.button("Cancel import").clicked()
                    {
                        token.cancel();
                    }
                }
            });
        });
    }

    /// Builds the bottom status bar.
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("brush = {:?}", self.sim.active_material()));
                ui.separator();
                ui.label(&self.status_line);
            });
        });
    }

    /// Draws the grid and handles pointer painting.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let size = egui::vec2(
                self.sim.width() as f32 * CELL_PIXELS,
                self.sim.height() as f32 * CELL_PIXELS,
            );
            let response = ui.allocate_response(size, egui::Sense::click_and_drag());
            let rect = response.rect;

            // Paint while the pointer is down over the grid. This runs
            // before the tick below, so a stroke lands on the buffer the
            // rule engine is about to read.
            if response.clicked() || response.dragged() {
                if let Some(pos) = response.interact_pointer_pos() {
                    let (x, y) = Self::pixel_to_cell(pos, rect.min);
                    self.sim.paint_at(x, y, Instant::now(), &mut self.rng);
                }
            }

            if self.sim.importing() {
                // One row per frame; rendering below shows the partial
                // grid between rows.
                self.drive_import();
            } else {
                let now = ctx.input(|i| i.time);
                if now - self.last_tick_time >= TICK_INTERVAL {
                    self.sim.tick(Instant::now(), &mut self.rng);
                    self.last_tick_time = now;
                }
            }

            // Upload the fresh snapshot with nearest filtering so the
            // upscale stays crisp.
            let image = self.snapshot_image();
            match &mut self.texture {
                Some(texture) => texture.set(image, egui::TextureOptions::NEAREST),
                None => {
                    self.texture =
                        Some(ctx.load_texture("grid", image, egui::TextureOptions::NEAREST));
                }
            }
            if let Some(texture) = &self.texture {
                ui.painter_at(rect).image(
                    texture.id(),
                    rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            }

            ctx.request_repaint();
        });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if let Some(file) = dropped.first() {
            self.start_import(file);
        }

        self.handle_hotkeys(ctx);
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_central_panel(ctx);
    }
}

/// Nearest-neighbor-resizes a decoded image to the grid dimensions and
/// converts it into the engine's pixel source format.
fn pixel_source_from_image(
    img: &image::DynamicImage,
    width: usize,
    height: usize,
) -> Result<PixelSource, ImportError> {
    let resized = img
        .resize_exact(
            width as u32,
            height as u32,
            image::imageops::FilterType::Nearest,
        )
        .to_rgba8();

    let pixels = resized
        .pixels()
        .map(|p| Rgba::new(p.0[0], p.0[1], p.0[2], p.0[3]))
        .collect();
    PixelSource::from_rgba(width, height, pixels)
}
