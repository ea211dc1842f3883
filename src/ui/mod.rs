pub mod console;
pub mod mining_info;
pub mod notice;
pub mod settings;

pub use console::ConsolePanel;
pub use mining_info::MiningInfoPanel;
pub use notice::Notice;
pub use settings::SettingsPanel;
