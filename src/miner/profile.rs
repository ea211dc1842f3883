//! 参数配置文件 (profile) 的保存与加载
//!
//! 文件格式为缩进的 JSON 对象，键为参数名，值一律为字符串

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use super::{Field, FieldRegistry, ProfileError};

/// 参数名 -> 值
pub type Profile = BTreeMap<String, String>;

/// 当前选中的配置文件
#[derive(Debug, Clone, Default)]
pub struct ProfileStore {
    path: Option<PathBuf>,
}

impl ProfileStore {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// 选择配置文件
    pub fn select(&mut self, path: PathBuf) {
        tracing::info!("选择配置文件: {}", path.display());
        self.path = Some(path);
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// 保存到选中的文件
    pub fn save(&self, registry: &FieldRegistry) -> Result<&Path, ProfileError> {
        let path = self.path().ok_or(ProfileError::NoPathSelected)?;
        save_profile(path, registry.all())?;
        Ok(path)
    }

    /// 从选中的文件加载，返回实际应用的字段数
    pub fn load(&self, registry: &mut FieldRegistry) -> Result<usize, ProfileError> {
        let path = self.path().ok_or(ProfileError::NoPathSelected)?;
        load_profile(path, registry)
    }
}

/// 把所有字段（包括空值）写入 `path`
pub fn save_profile(path: &Path, fields: &[Field]) -> Result<(), ProfileError> {
    let profile: Profile = fields
        .iter()
        .map(|f| (f.key.clone(), f.value.clone()))
        .collect();

    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    profile.serialize(&mut ser).map_err(|e| ProfileError::Io {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    buf.push(b'\n');

    fs::write(path, buf).map_err(|source| ProfileError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!("已保存 {} 个字段到 {}", profile.len(), path.display());
    Ok(())
}

/// 读取 `path` 并覆盖注册表中同名字段的值
///
/// 文件中未知的键被忽略，文件中缺失的键保持原值。
pub fn load_profile(path: &Path, registry: &mut FieldRegistry) -> Result<usize, ProfileError> {
    if !path.exists() {
        return Err(ProfileError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|source| ProfileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let profile: Profile = serde_json::from_str(&content).map_err(|source| ProfileError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut applied = 0;
    for (key, value) in profile {
        match registry.set_value(&key, value) {
            Ok(()) => applied += 1,
            Err(_) => tracing::debug!("忽略未知参数: {}", key),
        }
    }

    tracing::info!("已从 {} 加载 {} 个字段", path.display(), applied);
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miner::{FieldGroup, FieldKind};
    use tempfile::TempDir;

    fn registry() -> FieldRegistry {
        let mut registry = FieldRegistry::new();
        let algos = FieldKind::Choice(vec!["autolykos2".into(), "blake3".into()]);
        registry.register(FieldGroup::General, "-a", "Algorithm", algos).unwrap();
        registry.register(FieldGroup::General, "-o", "Pool", FieldKind::Text).unwrap();
        registry.register(FieldGroup::General, "-w", "Worker", FieldKind::Text).unwrap();
        registry.register(FieldGroup::General, "-p", "Password", FieldKind::Text).unwrap();
        registry
    }

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rig.json");

        let mut reg = registry();
        reg.set_value("-a", "blake3").unwrap();
        reg.set_value("-o", "stratum+tcp://pool:3333").unwrap();
        reg.set_value("-w", "  my \"quoted\" rig ").unwrap();
        let before = reg.all().to_vec();

        save_profile(&path, reg.all()).unwrap();
        reg.reset_to_defaults();
        assert_eq!(reg.value("-a").unwrap(), "autolykos2");

        let applied = load_profile(&path, &mut reg).unwrap();
        assert_eq!(applied, 4);
        assert_eq!(reg.all(), before.as_slice());
    }

    #[test]
    fn test_saved_file_is_indented_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rig.json");

        save_profile(&path, registry().all()).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n    \"-a\": \"autolykos2\""));
        assert!(content.contains("\"-p\": \"\""));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rig.json");
        fs::write(&path, r#"{"--not-a-flag": "x"}"#).unwrap();

        let mut reg = registry();
        reg.set_value("-o", "pool:1").unwrap();
        let before = reg.all().to_vec();

        assert_eq!(load_profile(&path, &mut reg).unwrap(), 0);
        assert_eq!(reg.all(), before.as_slice());
    }

    #[test]
    fn test_missing_keys_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rig.json");
        fs::write(&path, r#"{"-w": "rig-2"}"#).unwrap();

        let mut reg = registry();
        reg.set_value("-o", "pool:1").unwrap();

        assert_eq!(load_profile(&path, &mut reg).unwrap(), 1);
        assert_eq!(reg.value("-w").unwrap(), "rig-2");
        assert_eq!(reg.value("-o").unwrap(), "pool:1");
    }

    #[test]
    fn test_distinct_failures() {
        let dir = TempDir::new().unwrap();
        let mut reg = registry();

        let store = ProfileStore::default();
        assert!(matches!(store.save(&reg), Err(ProfileError::NoPathSelected)));
        assert!(matches!(store.load(&mut reg), Err(ProfileError::NoPathSelected)));

        let missing = ProfileStore::new(Some(dir.path().join("missing.json")));
        assert!(matches!(missing.load(&mut reg), Err(ProfileError::NotFound(_))));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        let store = ProfileStore::new(Some(broken));
        assert!(matches!(store.load(&mut reg), Err(ProfileError::Parse { .. })));

        let numeric = dir.path().join("numeric.json");
        fs::write(&numeric, r#"{"-r": 3}"#).unwrap();
        let store = ProfileStore::new(Some(numeric));
        assert!(matches!(store.load(&mut reg), Err(ProfileError::Parse { .. })));
    }

    #[test]
    fn test_save_into_missing_dir_is_io_error() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::new(Some(dir.path().join("no/such/dir/rig.json")));
        assert!(matches!(store.save(&registry()), Err(ProfileError::Io { .. })));
    }
}
