use crate::app::SketchApp;
use crate::tool::{MAX_STROKE_WIDTH, MIN_STROKE_WIDTH};

pub fn tools_panel(app: &mut SketchApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(false)
        .default_width(180.0)
        .show(ctx, |ui| {
            ui.heading("Tools");
            ui.separator();

            ui.horizontal(|ui| {
                if ui.selectable_label(!app.tool.is_eraser(), "Pen").clicked() {
                    log::info!("pen selected");
                    app.tool.set_pen();
                }
                if ui.selectable_label(app.tool.is_eraser(), "Eraser").clicked() {
                    log::info!("eraser selected");
                    app.tool.set_eraser();
                }
            });

            if ui.button("Clear canvas").clicked() {
                if let Some(surface) = &mut app.surface {
                    surface.clear();
                }
            }

            ui.separator();

            ui.horizontal(|ui| {
                ui.label("Color:");
                // The picker drives the pen; it is disabled while erasing.
                ui.add_enabled_ui(!app.tool.is_eraser(), |ui| {
                    let mut color = app.tool.color();
                    if ui.color_edit_button_srgba(&mut color).changed() {
                        app.tool.set_color(color);
                    }
                });
            });

            let mut width = app.tool.width();
            if ui
                .add(egui::Slider::new(&mut width, MIN_STROKE_WIDTH..=MAX_STROKE_WIDTH).text("Width"))
                .changed()
            {
                app.tool.set_width(width);
            }
        });
}
