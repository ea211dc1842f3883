//! 参数设置面板

use eframe::egui::{self, Color32, ComboBox, Frame, Margin, RichText, Rounding, TextEdit, Ui};

use crate::miner::{FieldGroup, FieldKind, FieldRegistry};

/// 需要遮挡显示的参数
const SECRET_KEYS: &[&str] = &["-p", "--api-key"];

/// 参数设置面板，每个分组一个标签页
pub struct SettingsPanel {
    /// 是否显示密码类字段的明文
    reveal_secrets: bool,
}

impl SettingsPanel {
    pub fn new() -> Self {
        Self {
            reveal_secrets: false,
        }
    }

    /// 绘制某个分组的全部字段
    pub fn ui(&mut self, ui: &mut Ui, registry: &mut FieldRegistry, group: FieldGroup) {
        ui.add_space(8.0);

        Frame::none()
            .fill(Color32::from_gray(35))
            .inner_margin(Margin::same(16.0))
            .rounding(Rounding::same(8.0))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(group.display_name()).size(16.0).strong());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        // 恢复全部字段，不只是当前标签页
                        if ui.small_button("Reset all to defaults").clicked() {
                            registry.reset_to_defaults();
                        }
                        if group == FieldGroup::General || group == FieldGroup::Api {
                            ui.checkbox(&mut self.reveal_secrets, "Show secrets");
                        }
                    });
                });
                ui.add_space(12.0);

                egui::Grid::new(format!("fields_{:?}", group))
                    .num_columns(2)
                    .spacing([20.0, 8.0])
                    .show(ui, |ui| {
                        for field in registry.group_mut(group) {
                            ui.label(RichText::new(&field.label).color(Color32::from_gray(180)));

                            match &field.kind {
                                FieldKind::Text => {
                                    let secret = SECRET_KEYS.contains(&field.key.as_str());
                                    ui.add(
                                        TextEdit::singleline(&mut field.value)
                                            .desired_width(320.0)
                                            .password(secret && !self.reveal_secrets),
                                    );
                                }
                                FieldKind::Choice(options) => {
                                    ComboBox::from_id_salt(&field.key)
                                        .width(200.0)
                                        .selected_text(field.value.as_str())
                                        .show_ui(ui, |ui| {
                                            for option in options {
                                                ui.selectable_value(
                                                    &mut field.value,
                                                    option.clone(),
                                                    option.as_str(),
                                                );
                                            }
                                        });
                                }
                            }
                            ui.end_row();
                        }
                    });
            });
    }
}

impl Default for SettingsPanel {
    fn default() -> Self {
        Self::new()
    }
}
