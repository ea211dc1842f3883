//! 运行信息面板

use std::path::Path;
use std::time::Duration;

use eframe::egui::{self, Color32, Frame, Margin, RichText, Rounding, Stroke, Ui};

use crate::miner::{format_command_line, FieldRegistry, ProcessSession, RunMode, SessionState};

/// 概览中显示的参数
const SUMMARY_KEYS: &[(&str, &str)] = &[("-a", "Algorithm"), ("-o", "Pool"), ("-w", "Worker")];

/// 运行信息面板
pub struct MiningInfoPanel;

impl MiningInfoPanel {
    pub fn new() -> Self {
        Self
    }

    /// `preview` 为按当前参数将要执行的命令行
    pub fn ui(
        &mut self,
        ui: &mut Ui,
        session: &ProcessSession,
        registry: &FieldRegistry,
        preview: &[String],
        profile: Option<&Path>,
    ) {
        ui.add_space(8.0);

        Frame::none()
            .fill(Color32::from_gray(35))
            .inner_margin(Margin::same(16.0))
            .rounding(Rounding::same(8.0))
            .stroke(Stroke::new(1.0, Color32::from_gray(60)))
            .show(ui, |ui| {
                ui.label(RichText::new("Mining Info").size(16.0).strong());
                ui.add_space(12.0);

                egui::Grid::new("mining_info")
                    .num_columns(2)
                    .spacing([20.0, 8.0])
                    .show(ui, |ui| {
                        ui.label(RichText::new("State").color(Color32::from_gray(160)));
                        ui.label(
                            RichText::new(session.state().display_name())
                                .color(state_color(session.state())),
                        );
                        ui.end_row();

                        if let Some(run) = session.current_run() {
                            ui.label(RichText::new("PID").color(Color32::from_gray(160)));
                            ui.label(format!("{}", run.pid));
                            ui.end_row();

                            ui.label(RichText::new("Mode").color(Color32::from_gray(160)));
                            ui.label(match run.mode {
                                RunMode::Run => "Mining",
                                RunMode::Benchmark => "Benchmark",
                            });
                            ui.end_row();

                            ui.label(RichText::new("Elapsed").color(Color32::from_gray(160)));
                            ui.label(format_duration(run.elapsed()));
                            ui.end_row();

                            ui.label(RichText::new("Exit status").color(Color32::from_gray(160)));
                            match (run.ended_at, run.exit_status) {
                                (None, _) => ui.label("-"),
                                (Some(_), Some(status)) => ui.label(status.to_string()),
                                (Some(_), None) => ui.label("unknown"),
                            };
                            ui.end_row();

                            ui.label(RichText::new("Command").color(Color32::from_gray(160)));
                            ui.label(RichText::new(format_command_line(&run.argv)).monospace());
                            ui.end_row();
                        }

                        for (key, title) in SUMMARY_KEYS {
                            ui.label(RichText::new(*title).color(Color32::from_gray(160)));
                            match registry.value(key) {
                                Ok(value) if !value.trim().is_empty() => ui.label(value),
                                _ => ui.label(RichText::new("-").color(Color32::from_gray(120))),
                            };
                            ui.end_row();
                        }

                        ui.label(RichText::new("Settings file").color(Color32::from_gray(160)));
                        match profile {
                            Some(path) => ui.label(path.display().to_string()),
                            None => ui.label(RichText::new("none").color(Color32::from_gray(120))),
                        };
                        ui.end_row();
                    });

                ui.add_space(12.0);
                ui.separator();
                ui.label(RichText::new("Next run").color(Color32::from_gray(160)));
                ui.label(RichText::new(format_command_line(preview)).monospace());
            });
    }
}

impl Default for MiningInfoPanel {
    fn default() -> Self {
        Self::new()
    }
}

fn state_color(state: SessionState) -> Color32 {
    match state {
        SessionState::Idle => Color32::from_gray(180),
        SessionState::Running => Color32::from_rgb(100, 200, 100),
        SessionState::Stopping => Color32::from_rgb(230, 200, 50),
    }
}

/// 格式化为 `1h 02m 03s`
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}h {:02}m {:02}s", h, m, s)
    } else if m > 0 {
        format!("{}m {:02}s", m, s)
    } else {
        format!("{}s", s)
    }
}
