use crate::app::{CANVAS_BACKGROUND, SketchApp};
use crate::canvas::SketchSurface;

/// The central drawing area: sizes the surface to the panel, feeds pointer
/// drags into stroke operations and blits the raster buffer as a texture.
pub fn canvas_panel(app: &mut SketchApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::drag());
        let rect = response.rect;
        let width = rect.width().round().max(1.0) as u32;
        let height = rect.height().round().max(1.0) as u32;

        let style = app.tool.stroke_style(CANVAS_BACKGROUND);

        if app.surface.is_none() {
            app.surface = Some(SketchSurface::new(width, height, CANVAS_BACKGROUND));
        }
        let Some(surface) = app.surface.as_mut() else {
            return;
        };
        // Keeps the buffer dimensions matched to the layout box, preserving
        // drawn content across window resizes.
        surface.resize(width, height);

        if let Some(pointer) = response.interact_pointer_pos() {
            let point = (pointer - rect.min).to_pos2();
            if response.drag_started() {
                surface.begin_stroke(point);
            } else if response.dragged() {
                if rect.contains(pointer) {
                    surface.extend_stroke(point, &style);
                } else {
                    // Leaving the canvas ends the stroke; re-entering with
                    // the button still held does not resume it.
                    surface.end_stroke();
                }
            }
        }
        if response.drag_stopped() {
            surface.end_stroke();
        }

        // Re-upload the texture only when the buffer actually changed.
        if app.canvas_texture.is_none() || app.canvas_texture_version != surface.version() {
            let image = surface.to_color_image();
            match &mut app.canvas_texture {
                Some(texture) => texture.set(image, egui::TextureOptions::NEAREST),
                None => {
                    app.canvas_texture =
                        Some(ctx.load_texture("sketch_surface", image, egui::TextureOptions::NEAREST));
                }
            }
            app.canvas_texture_version = surface.version();
        }

        if let Some(texture) = &app.canvas_texture {
            let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            painter.image(texture.id(), rect, uv, egui::Color32::WHITE);
        }
    });
}
