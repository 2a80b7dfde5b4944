//! Interactive window.
//!
//! All work runs synchronously inside the egui update callback: pressing
//! "Generate" encodes and composes on the UI thread, "Save" blocks on the
//! native file dialog and the write.

use crate::args::EcArg;
use crate::font::FontChain;
use crate::pipeline::{generate, save, GenerationRequest};
use crate::preview::fit_within;
use eframe::egui;
use image::{Rgb, RgbImage};
use rfd::{MessageButtons, MessageDialog, MessageLevel};
use std::path::PathBuf;

const WINDOW_SIZE: [f32; 2] = [400.0, 650.0];
const PREVIEW_SIZE: (f32, f32) = (360.0, 300.0);

pub fn run() -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(WINDOW_SIZE)
            .with_resizable(false),
        ..Default::default()
    };

    eframe::run_native(
        "QR Code Generator",
        options,
        Box::new(|_cc| Ok(Box::new(GeneratorApp::default()))),
    )
}

struct GeneratorApp {
    data: String,
    caption: String,
    font_size: u32,
    qr_color: [u8; 3],
    bg_color: [u8; 3],
    error_level: EcArg,
    module_size: u32,
    fonts: FontChain,
    /// Full resolution image kept for saving; the texture is only for display.
    image: Option<RgbImage>,
    texture: Option<egui::TextureHandle>,
    last_save_dir: Option<PathBuf>,
}

impl Default for GeneratorApp {
    fn default() -> Self {
        Self {
            data: String::new(),
            caption: String::new(),
            font_size: 20,
            qr_color: [0, 0, 0],
            bg_color: [255, 255, 255],
            error_level: EcArg::H,
            module_size: 10,
            fonts: FontChain::default(),
            image: None,
            texture: None,
            last_save_dir: None,
        }
    }
}

fn show_message(level: MessageLevel, title: &str, description: &str) {
    MessageDialog::new()
        .set_level(level)
        .set_title(title)
        .set_description(description)
        .set_buttons(MessageButtons::Ok)
        .show();
}

impl GeneratorApp {
    fn generate(&mut self, ctx: &egui::Context) {
        let request = match GenerationRequest::from_form(&self.data, &self.caption) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("rejected generation: {e}");
                show_message(MessageLevel::Warning, "Input error", &e.to_string());
                return;
            }
        };

        let request = request
            .module_size(self.module_size)
            .caption_font_size(self.font_size)
            .colors(Rgb(self.qr_color), Rgb(self.bg_color))
            .error_correction(self.error_level);

        let generated = match generate(&request, &self.fonts) {
            Ok(generated) => generated,
            Err(e) => {
                tracing::error!("generation failed: {e}");
                show_message(MessageLevel::Warning, "Generation error", &e.to_string());
                return;
            }
        };

        for warning in &generated.composed.warnings {
            show_message(MessageLevel::Warning, "Font error", &warning.to_string());
        }

        let image = generated.composed.image;
        let color_image = egui::ColorImage::from_rgb(
            [image.width() as usize, image.height() as usize],
            image.as_raw(),
        );
        self.texture = Some(ctx.load_texture("preview", color_image, egui::TextureOptions::LINEAR));
        self.image = Some(image);
    }

    fn save(&mut self) {
        let Some(image) = &self.image else {
            return;
        };

        let mut dialog = rfd::FileDialog::new()
            .set_title("Choose where to save")
            .set_file_name("qrcode.png")
            .add_filter("PNG image", &["png"])
            .add_filter("JPEG image", &["jpg", "jpeg"]);
        if let Some(dir) = &self.last_save_dir {
            dialog = dialog.set_directory(dir);
        }

        let Some(path) = dialog.save_file() else {
            return;
        };

        if let Some(parent) = path.parent() {
            self.last_save_dir = Some(parent.to_path_buf());
        }

        match save(image, &path) {
            Ok(()) => show_message(
                MessageLevel::Info,
                "Saved",
                &format!("Image saved: {}", path.display()),
            ),
            Err(e) => {
                tracing::error!("{e}");
                show_message(MessageLevel::Warning, "Save error", &e.to_string());
            }
        }
    }

    fn form(&mut self, ui: &mut egui::Ui) {
        egui::Grid::new("form").num_columns(2).spacing([10.0, 10.0]).show(ui, |ui| {
            ui.label("Data:");
            ui.text_edit_singleline(&mut self.data);
            ui.end_row();

            ui.label("Caption:");
            ui.text_edit_singleline(&mut self.caption);
            ui.end_row();

            ui.label("Font size:");
            ui.add(egui::DragValue::new(&mut self.font_size).range(8..=72));
            ui.end_row();

            ui.label("Colors:");
            ui.horizontal(|ui| {
                ui.label("QR");
                ui.color_edit_button_srgb(&mut self.qr_color);
                ui.add_space(20.0);
                ui.label("Background");
                ui.color_edit_button_srgb(&mut self.bg_color);
            });
            ui.end_row();

            ui.label("Error correction:");
            egui::ComboBox::from_id_salt("error_level")
                .selected_text(self.error_level.label())
                .show_ui(ui, |ui| {
                    for level in EcArg::ALL {
                        ui.selectable_value(&mut self.error_level, level, level.label());
                    }
                });
            ui.end_row();

            ui.label("QR size:");
            ui.add(egui::DragValue::new(&mut self.module_size).range(1..=20));
            ui.end_row();
        });
    }
}

impl eframe::App for GeneratorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            self.form(ui);
            ui.add_space(10.0);

            let button_size = egui::vec2(PREVIEW_SIZE.0, 40.0);
            if ui
                .add_sized(button_size, egui::Button::new("Generate QR code"))
                .clicked()
            {
                self.generate(ctx);
            }

            ui.add_space(10.0);
            let (rect, _) = ui.allocate_exact_size(
                egui::vec2(PREVIEW_SIZE.0, PREVIEW_SIZE.1),
                egui::Sense::hover(),
            );
            ui.painter().rect_filled(rect, 5.0, egui::Color32::WHITE);
            if let Some(texture) = &self.texture {
                let [w, h] = texture.size();
                let (fw, fh) = fit_within(w as u32, h as u32, PREVIEW_SIZE);
                let image_rect = egui::Rect::from_center_size(rect.center(), egui::vec2(fw, fh));
                ui.painter().image(
                    texture.id(),
                    image_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            }

            ui.add_space(10.0);
            let save_enabled = self.image.is_some();
            if ui
                .add_enabled_ui(save_enabled, |ui| {
                    ui.add_sized(button_size, egui::Button::new("Save image"))
                })
                .inner
                .clicked()
            {
                self.save();
            }
        });
    }
}
