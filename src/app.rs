//! 主应用状态和 UI 协调

use eframe::egui::{self, CentralPanel, Context, TopBottomPanel};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::miner::{
    CommandBuilder, FieldGroup, FieldRegistry, KillByName, ProcessController, ProcessSession,
    ProfileError, ProfileStore, RunMode, SessionError,
};
use crate::ui::{ConsolePanel, MiningInfoPanel, Notice, SettingsPanel};

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// T-Rex 可执行文件路径
    pub miner_path: String,
    /// 运行期间的刷新间隔 (毫秒)
    pub refresh_interval_ms: u64,
    /// 输出保留的行数
    pub output_history: usize,
    /// 上次使用的配置文件
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_profile: Option<PathBuf>,
    /// 窗口宽度
    pub window_width: f32,
    /// 窗口高度
    pub window_height: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            miner_path: "./t-rex".to_string(),
            refresh_interval_ms: 100,
            output_history: 5000,
            last_profile: None,
            window_width: 900.0,
            window_height: 650.0,
        }
    }
}

impl AppConfig {
    /// 获取配置文件路径
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("trex-launcher").join("config.toml"))
    }

    /// 加载配置
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            if let Ok(content) = fs::read_to_string(&path) {
                match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!("配置文件 {} 无效，使用默认配置: {}", path.display(), e),
                }
            }
        }
        Self::default()
    }

    /// 保存配置
    pub fn save(&self) {
        let Some(path) = Self::config_path() else {
            return;
        };
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match toml::to_string_pretty(self) {
            Ok(content) => {
                if let Err(e) = fs::write(&path, content) {
                    tracing::warn!("保存配置失败 {}: {}", path.display(), e);
                }
            }
            Err(e) => tracing::warn!("序列化配置失败: {}", e),
        }
    }
}

/// 当前标签页
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    General,
    Debug,
    MiningInfo,
    Api,
    Benchmark,
    Overclock,
}

impl Tab {
    fn all() -> &'static [Tab] {
        &[
            Tab::General,
            Tab::Debug,
            Tab::MiningInfo,
            Tab::Api,
            Tab::Benchmark,
            Tab::Overclock,
        ]
    }

    fn title(&self) -> &'static str {
        match self {
            Tab::Debug => "Debug",
            Tab::MiningInfo => "Mining Info",
            other => other.field_group().map(|g| g.display_name()).unwrap_or_default(),
        }
    }

    /// 标签页对应的参数分组
    fn field_group(&self) -> Option<FieldGroup> {
        match self {
            Tab::General => Some(FieldGroup::General),
            Tab::Api => Some(FieldGroup::Api),
            Tab::Benchmark => Some(FieldGroup::Benchmark),
            Tab::Overclock => Some(FieldGroup::Overclock),
            Tab::Debug | Tab::MiningInfo => None,
        }
    }
}

/// 启动器核心状态，所有用户操作都在这里处理并转换成提示
pub struct Launcher {
    pub registry: FieldRegistry,
    pub profiles: ProfileStore,
    pub session: ProcessSession,
}

impl Launcher {
    pub fn new(config: &AppConfig, controller: Box<dyn ProcessController>) -> Self {
        Self {
            registry: FieldRegistry::builtin(),
            profiles: ProfileStore::new(config.last_profile.clone()),
            session: ProcessSession::new(
                CommandBuilder::new(config.miner_path.as_str()),
                controller,
                config.output_history,
            ),
        }
    }

    /// 选择配置文件
    pub fn select_profile(&mut self, path: PathBuf) -> Notice {
        let message = format!("Settings file selected: {}", path.display());
        self.profiles.select(path);
        Notice::info(message)
    }

    /// 启动矿工或基准测试
    pub fn run(&mut self, mode: RunMode) -> Option<Notice> {
        match self.session.start(mode, self.registry.all()) {
            Ok(_) => None,
            Err(e @ SessionError::AlreadyRunning { .. }) => {
                Some(Notice::warning(format!("{}. Stop it before starting again.", e)))
            }
            Err(e) => Some(Notice::error(e.to_string())),
        }
    }

    /// 停止矿工
    pub fn stop(&mut self) -> Option<Notice> {
        match self.session.stop() {
            Ok(_) => None,
            Err(SessionError::NotRunning) => Some(Notice::warning("T-Rex is not running.")),
            Err(e) => Some(Notice::error(format!("Failed to stop T-Rex: {}", e))),
        }
    }

    /// 保存当前参数
    pub fn save(&self) -> Notice {
        match self.profiles.save(&self.registry) {
            Ok(path) => Notice::info(format!("Settings saved to {}", path.display())),
            Err(ProfileError::NoPathSelected) => Notice::warning(
                "No settings file selected. Please select a file to save.",
            ),
            Err(e) => {
                tracing::error!("{}", e);
                Notice::error(format!("Failed to save settings: {}", e))
            }
        }
    }

    /// 从配置文件加载参数
    pub fn load(&mut self) -> Notice {
        match self.profiles.load(&mut self.registry) {
            Ok(_) => Notice::info("Settings loaded successfully."),
            Err(ProfileError::NoPathSelected) => Notice::warning(
                "No settings file selected. Please select a file to load.",
            ),
            Err(ProfileError::NotFound(_)) => Notice::warning("Settings file not found."),
            Err(e) => {
                tracing::error!("{}", e);
                Notice::error(format!("Failed to load settings: {}", e))
            }
        }
    }
}

/// 主应用
pub struct TrexApp {
    /// 应用配置
    config: AppConfig,
    /// 核心状态
    launcher: Launcher,
    /// 当前标签页
    current_tab: Tab,
    /// 参数面板
    settings_panel: SettingsPanel,
    /// 输出面板
    console_panel: ConsolePanel,
    /// 运行信息面板
    mining_info_panel: MiningInfoPanel,
    /// 最近一条提示
    notice: Option<Notice>,
}

impl TrexApp {
    /// 创建新应用
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let launcher = Launcher::new(&config, Box::new(KillByName));

        Self {
            config,
            launcher,
            current_tab: Tab::General,
            settings_panel: SettingsPanel::new(),
            console_panel: ConsolePanel::new(),
            mining_info_panel: MiningInfoPanel::new(),
            notice: None,
        }
    }

    /// 操作按钮行
    fn draw_actions(&mut self, ctx: &Context, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Select Settings File").clicked() {
                let picked = rfd::FileDialog::new()
                    .set_title("Select Settings File")
                    .add_filter("JSON Files", &["json"])
                    .add_filter("All Files", &["*"])
                    .save_file();
                if let Some(path) = picked {
                    self.notice = Some(self.launcher.select_profile(path));
                }
            }

            let active = self.launcher.session.is_active();
            if ui.add_enabled(!active, egui::Button::new("Run")).clicked() {
                self.notice = self.launcher.run(RunMode::Run);
            }
            if ui.add_enabled(!active, egui::Button::new("Benchmark")).clicked() {
                self.notice = self.launcher.run(RunMode::Benchmark);
            }
            if ui.button("Save").clicked() {
                self.notice = Some(self.launcher.save());
            }
            if ui.button("Load").clicked() {
                self.notice = Some(self.launcher.load());
            }
            if ui.button("Stop").clicked() {
                self.notice = self.launcher.stop();
            }
            if ui.button("Quit").clicked() {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });
    }
}

impl eframe::App for TrexApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        // 取回后台线程的输出
        self.launcher.session.poll();

        if self.launcher.session.is_active() {
            ctx.request_repaint_after(Duration::from_millis(self.config.refresh_interval_ms));
        }

        // 顶部标签栏
        TopBottomPanel::top("tabs").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("T-Rex");
                ui.separator();

                for &tab in Tab::all() {
                    if ui.selectable_label(self.current_tab == tab, tab.title()).clicked() {
                        self.current_tab = tab;
                    }
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(self.launcher.session.state().display_name());
                });
            });
        });

        // 底部操作栏
        TopBottomPanel::bottom("actions").show(ctx, |ui| {
            ui.add_space(6.0);
            let mut dismissed = false;
            if let Some(notice) = &self.notice {
                dismissed = notice.ui(ui);
                ui.add_space(6.0);
            }
            if dismissed {
                self.notice = None;
            }
            self.draw_actions(ctx, ui);
            ui.add_space(6.0);
        });

        // 主内容区域
        CentralPanel::default().show(ctx, |ui| match self.current_tab {
            Tab::Debug => {
                self.console_panel.ui(ui, self.launcher.session.output());
            }
            Tab::MiningInfo => {
                let preview = self
                    .launcher
                    .session
                    .builder()
                    .build(RunMode::Run, self.launcher.registry.all());
                self.mining_info_panel.ui(
                    ui,
                    &self.launcher.session,
                    &self.launcher.registry,
                    &preview,
                    self.launcher.profiles.path(),
                );
            }
            tab => {
                if let Some(group) = tab.field_group() {
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        self.settings_panel
                            .ui(ui, &mut self.launcher.registry, group);
                    });
                }
            }
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if self.launcher.session.is_active() {
            tracing::warn!("退出时矿工仍在运行，正在终止");
            if let Err(e) = self.launcher.session.stop() {
                tracing::error!("{}", e);
            }
        }
        self.config.last_profile = self.launcher.profiles.path().map(|p| p.to_path_buf());
        self.config.save();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miner::{KillTarget, SessionState};
    use crate::ui::notice::NoticeLevel;
    use tempfile::TempDir;

    struct NoopController;

    impl ProcessController for NoopController {
        fn terminate(&self, _target: &KillTarget<'_>) -> Result<usize, SessionError> {
            Ok(0)
        }
    }

    fn launcher(dir: &TempDir) -> Launcher {
        let config = AppConfig {
            miner_path: dir.path().join("t-rex").to_string_lossy().into_owned(),
            ..Default::default()
        };
        Launcher::new(&config, Box::new(NoopController))
    }

    #[test]
    fn test_config_defaults_fill_missing_keys() {
        let config: AppConfig = toml::from_str("miner_path = \"/opt/t-rex/t-rex\"").unwrap();
        assert_eq!(config.miner_path, "/opt/t-rex/t-rex");
        assert_eq!(config.output_history, 5000);
        assert!(config.last_profile.is_none());
    }

    #[test]
    fn test_save_and_load_without_file() {
        let dir = TempDir::new().unwrap();
        let mut launcher = launcher(&dir);

        assert_eq!(launcher.save().level, NoticeLevel::Warning);
        assert_eq!(launcher.load().level, NoticeLevel::Warning);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut launcher = launcher(&dir);

        let notice = launcher.select_profile(dir.path().join("rig.json"));
        assert_eq!(notice.level, NoticeLevel::Info);

        launcher.registry.set_value("-o", "stratum+tcp://pool:3333").unwrap();
        assert_eq!(launcher.save().level, NoticeLevel::Info);

        launcher.registry.reset_to_defaults();
        assert_eq!(launcher.load(), Notice::info("Settings loaded successfully."));
        assert_eq!(launcher.registry.value("-o").unwrap(), "stratum+tcp://pool:3333");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let mut launcher = launcher(&dir);
        launcher.select_profile(dir.path().join("missing.json"));

        assert_eq!(launcher.load(), Notice::warning("Settings file not found."));
    }

    #[test]
    fn test_run_with_missing_miner_reports_error() {
        let dir = TempDir::new().unwrap();
        let mut launcher = launcher(&dir);

        let notice = launcher.run(RunMode::Run).unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(launcher.session.state(), SessionState::Idle);
    }

    #[test]
    fn test_stop_when_idle_warns() {
        let dir = TempDir::new().unwrap();
        let mut launcher = launcher(&dir);

        assert_eq!(launcher.stop(), Some(Notice::warning("T-Rex is not running.")));
    }

    #[test]
    fn test_tabs_map_to_groups() {
        assert_eq!(Tab::Api.field_group(), Some(FieldGroup::Api));
        assert_eq!(Tab::Debug.field_group(), None);
        assert_eq!(Tab::Overclock.title(), "Overclock");
        assert_eq!(Tab::MiningInfo.title(), "Mining Info");
    }
}
