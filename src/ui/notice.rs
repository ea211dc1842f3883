//! 提示条，对应成功 / 警告 / 错误消息

use eframe::egui::{Color32, Frame, Margin, RichText, Rounding, Ui};

/// 提示级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// 一条提示
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// 绘制提示条，点击关闭按钮时返回 true
    pub fn ui(&self, ui: &mut Ui) -> bool {
        let (fill, icon, text) = match self.level {
            NoticeLevel::Info => (
                Color32::from_rgb(30, 60, 40),
                "✔",
                Color32::from_rgb(150, 230, 150),
            ),
            NoticeLevel::Warning => (
                Color32::from_rgb(80, 70, 20),
                "⚠",
                Color32::from_rgb(240, 220, 120),
            ),
            NoticeLevel::Error => (
                Color32::from_rgb(80, 30, 30),
                "⚠",
                Color32::from_rgb(255, 150, 150),
            ),
        };

        let mut dismissed = false;
        Frame::none()
            .fill(fill)
            .inner_margin(Margin::same(8.0))
            .rounding(Rounding::same(4.0))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(icon).color(text));
                    ui.label(RichText::new(self.message.as_str()).color(text));
                    if ui.small_button("✕").clicked() {
                        dismissed = true;
                    }
                });
            });
        dismissed
    }
}
