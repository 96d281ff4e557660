use crate::app::SketchApp;
use crate::generation::{GenerationState, ImageData};

/// Prompt editor, submit button and the result pane. The pane shows exactly
/// one of: loading spinner, error text, result image, placeholder.
pub fn result_panel(app: &mut SketchApp, ctx: &egui::Context) {
    egui::SidePanel::right("result_panel")
        .resizable(true)
        .default_width(380.0)
        .show(ctx, |ui| {
            ui.heading("Prompt");
            ui.add(
                egui::TextEdit::multiline(&mut app.prompt)
                    .hint_text("e.g. \"a magical girl against the Milky Way\"")
                    .desired_rows(4)
                    .desired_width(f32::INFINITY),
            );

            let submitting = app.orchestrator.is_submitting();
            let button_text = if submitting { "Generating…" } else { "Generate image" };
            if ui
                .add_enabled(!submitting, egui::Button::new(button_text))
                .clicked()
            {
                app.submit_generation();
            }

            ui.separator();
            ui.heading("Result");

            // Decode the success image into a texture once per outcome.
            if let GenerationState::Success(image) = app.orchestrator.state() {
                if app.result_texture.is_none() && app.result_decode_error.is_none() {
                    match decode_result_texture(ctx, image) {
                        Ok(texture) => app.result_texture = Some(texture),
                        Err(message) => {
                            log::error!("{message}");
                            app.result_decode_error = Some(message);
                        }
                    }
                }
            }

            match app.orchestrator.state() {
                GenerationState::Submitting => {
                    ui.vertical_centered(|ui| {
                        ui.add(egui::Spinner::new().size(32.0));
                        ui.label("The model is generating your image…");
                    });
                }
                GenerationState::Failure(message) => {
                    ui.colored_label(ui.visuals().error_fg_color, format!("Error: {message}"));
                }
                GenerationState::Success(_) => {
                    if let Some(message) = &app.result_decode_error {
                        ui.colored_label(ui.visuals().error_fg_color, message);
                    } else if let Some(texture) = &app.result_texture {
                        ui.add(egui::Image::new(texture).max_size(ui.available_size()));
                    }
                }
                GenerationState::Idle => {
                    ui.label("The generated image will appear here.");
                }
            }
        });
}

fn decode_result_texture(
    ctx: &egui::Context,
    image: &ImageData,
) -> Result<egui::TextureHandle, String> {
    let decoded = image::load_from_memory(&image.bytes)
        .map_err(|err| format!("could not decode the generated image: {err}"))?;
    let rgba = decoded.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
    Ok(ctx.load_texture("generation_result", color_image, egui::TextureOptions::LINEAR))
}
