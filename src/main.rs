//! trex-launcher - T-Rex 矿工图形启动器
//!
//! 编辑矿工参数、启动/停止 T-Rex 并实时显示其输出，参数可保存为 JSON 配置文件

mod app;
mod miner;
mod ui;
mod utils;

use app::{AppConfig, TrexApp};
use eframe::egui;

fn main() -> eframe::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt::init();

    let config = AppConfig::load();
    tracing::info!("矿工路径: {}", config.miner_path);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([640.0, 480.0])
            .with_title("T-Rex Miner GUI"),
        ..Default::default()
    };

    eframe::run_native(
        "trex-launcher",
        options,
        Box::new(|cc| Ok(Box::new(TrexApp::new(cc, config)))),
    )
}
