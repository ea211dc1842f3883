//! 调试输出面板

use eframe::egui::{Color32, Frame, Margin, RichText, Rounding, ScrollArea, Ui};

use crate::utils::{OutputLog, OutputStream};

/// 矿工输出面板
pub struct ConsolePanel {
    /// 新输出到达时自动滚动到底部
    follow: bool,
}

impl ConsolePanel {
    pub fn new() -> Self {
        Self { follow: true }
    }

    pub fn ui(&mut self, ui: &mut Ui, output: &OutputLog) {
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            ui.checkbox(&mut self.follow, "Follow output");
            ui.add_space(20.0);
            ui.label(
                RichText::new(format!("{} lines", output.len())).color(Color32::from_gray(160)),
            );
            if output.dropped() > 0 {
                ui.label(
                    RichText::new(format!("({} older lines dropped)", output.dropped()))
                        .color(Color32::from_gray(120)),
                );
            }
            if ui.small_button("Copy").clicked() {
                ui.ctx().copy_text(output.text());
            }
        });

        ui.add_space(8.0);

        Frame::none()
            .fill(Color32::from_gray(20))
            .inner_margin(Margin::same(8.0))
            .rounding(Rounding::same(4.0))
            .show(ui, |ui| {
                ScrollArea::both()
                    .auto_shrink([false, false])
                    .max_height(ui.available_height())
                    .stick_to_bottom(self.follow)
                    .show(ui, |ui| {
                        if output.is_empty() {
                            ui.label(RichText::new("No output yet.").color(Color32::from_gray(120)));
                        }
                        for line in output.lines() {
                            ui.label(
                                RichText::new(&line.text)
                                    .monospace()
                                    .color(stream_color(line.stream)),
                            );
                        }
                    });
            });
    }
}

impl Default for ConsolePanel {
    fn default() -> Self {
        Self::new()
    }
}

fn stream_color(stream: OutputStream) -> Color32 {
    match stream {
        OutputStream::Stdout => Color32::from_gray(220),
        OutputStream::Stderr => Color32::from_rgb(255, 150, 150),
        OutputStream::System => Color32::from_rgb(100, 180, 255),
    }
}
