//! 矿工参数字段注册表
//!
//! 每个字段对应 T-Rex 的一个命令行参数，按注册顺序保存

use super::FieldError;

/// 字段所在的标签页
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldGroup {
    /// 通用连接设置
    General,
    /// 远程 API
    Api,
    /// 基准测试
    Benchmark,
    /// 超频
    Overclock,
}

impl FieldGroup {
    /// 标签页名称
    pub fn display_name(&self) -> &'static str {
        match self {
            FieldGroup::General => "General",
            FieldGroup::Api => "API",
            FieldGroup::Benchmark => "Benchmark",
            FieldGroup::Overclock => "Overclock",
        }
    }
}

/// 输入类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// 自由文本
    Text,
    /// 从候选项中单选
    Choice(Vec<String>),
}

impl FieldKind {
    /// 默认值：文本为空，单选为第一个候选项
    pub fn default_value(&self) -> String {
        match self {
            FieldKind::Text => String::new(),
            FieldKind::Choice(options) => options.first().cloned().unwrap_or_default(),
        }
    }
}

/// 单个参数字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// 命令行参数名，例如 `-a`
    pub key: String,
    /// 显示标签
    pub label: String,
    /// 输入类型
    pub kind: FieldKind,
    /// 所属标签页
    pub group: FieldGroup,
    /// 当前值
    pub value: String,
}

impl Field {
    pub fn new(group: FieldGroup, key: &str, label: &str, kind: FieldKind) -> Self {
        let value = kind.default_value();
        Self {
            key: key.to_string(),
            label: label.to_string(),
            kind,
            group,
            value,
        }
    }

    /// 值去掉空白后是否为空
    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }
}

/// 有序字段注册表
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    fields: Vec<Field>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// 内置的 T-Rex 参数集合
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for (group, key, label, kind) in builtin_fields() {
            // 内置表中的键互不重复
            if let Err(e) = registry.register(group, key, label, kind) {
                tracing::warn!("跳过内置字段: {}", e);
            }
        }
        registry
    }

    /// 注册字段，值为其默认值
    pub fn register(
        &mut self,
        group: FieldGroup,
        key: &str,
        label: &str,
        kind: FieldKind,
    ) -> Result<&Field, FieldError> {
        if self.contains(key) {
            return Err(FieldError::DuplicateField(key.to_string()));
        }
        self.fields.push(Field::new(group, key, label, kind));
        Ok(&self.fields[self.fields.len() - 1])
    }

    /// 按注册顺序返回所有字段
    pub fn all(&self) -> &[Field] {
        &self.fields
    }

    /// 某个标签页下的字段，供 UI 编辑
    pub fn group_mut(&mut self, group: FieldGroup) -> impl Iterator<Item = &mut Field> {
        self.fields.iter_mut().filter(move |f| f.group == group)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.iter().any(|f| f.key == key)
    }

    pub fn get(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// 获取字段当前值
    pub fn value(&self, key: &str) -> Result<&str, FieldError> {
        self.get(key)
            .map(|f| f.value.as_str())
            .ok_or_else(|| FieldError::UnknownField(key.to_string()))
    }

    /// 设置字段当前值
    pub fn set_value(&mut self, key: &str, value: impl Into<String>) -> Result<(), FieldError> {
        match self.fields.iter_mut().find(|f| f.key == key) {
            Some(field) => {
                field.value = value.into();
                Ok(())
            }
            None => Err(FieldError::UnknownField(key.to_string())),
        }
    }

    /// 所有字段恢复默认值
    pub fn reset_to_defaults(&mut self) {
        for field in &mut self.fields {
            field.value = field.kind.default_value();
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// 支持的挖矿算法
pub const ALGORITHMS: &[&str] = &[
    "autolykos2",
    "blake3",
    "etchash",
    "ethash",
    "firopow",
    "kawpow",
    "mtp",
    "mtp-tcr",
    "multi",
    "octopus",
    "progpow",
    "progpow-veil",
    "progpow-veriblock",
    "progpowz",
    "tensority",
];

type FieldDef = (FieldGroup, &'static str, &'static str, FieldKind);

fn text(group: FieldGroup, key: &'static str, label: &'static str) -> FieldDef {
    (group, key, label, FieldKind::Text)
}

fn builtin_fields() -> Vec<FieldDef> {
    use FieldGroup::*;

    let algorithms = FieldKind::Choice(ALGORITHMS.iter().map(|s| s.to_string()).collect());

    vec![
        (General, "-a", "Algorithm (-a, --algo)", algorithms),
        text(General, "--coin", "Coin (--coin)"),
        text(General, "-o", "Mining Pool URL (-o, --url)"),
        text(General, "-u", "Username (-u, --user)"),
        text(General, "-p", "Password (-p, --pass)"),
        text(General, "-w", "Worker Name (-w, --worker)"),
        text(General, "-r", "Number of Retries (-r, --retries)"),
        text(General, "-R", "Retry Pause (-R, --retry-pause)"),
        text(General, "-T", "Network Timeout (-T, --timeout)"),
        text(General, "--time-limit", "Time Limit (--time-limit)"),
        text(Api, "--api-bind-http", "API Bind HTTP (--api-bind-http)"),
        text(Api, "--api-https", "Enable HTTPS (--api-https)"),
        text(Api, "--api-key", "API Key (--api-key)"),
        text(Api, "--api-read-only", "API Read-Only (--api-read-only)"),
        text(Api, "--api-generate-key", "Generate API Key (--api-generate-key)"),
        text(Api, "--api-webserver-cert", "API Webserver Cert (--api-webserver-cert)"),
        text(Api, "--api-webserver-pkey", "API Webserver Private Key (--api-webserver-pkey)"),
        text(Benchmark, "-B", "Benchmark Mode (-B, --benchmark)"),
        text(Benchmark, "--benchmark-epoch", "Benchmark Epoch (--benchmark-epoch)"),
        text(Benchmark, "--benchmark-block", "Benchmark Block (--benchmark-block)"),
        text(Overclock, "--lhr-tune", "LHR Tune (--lhr-tune)"),
        text(Overclock, "--lhr-autotune-mode", "LHR Auto-tune Mode (--lhr-autotune-mode)"),
        text(Overclock, "--lhr-autotune-step-size", "LHR Auto-tune Step Size (--lhr-autotune-step-size)"),
        text(Overclock, "--lhr-autotune-interval", "LHR Auto-tune Interval (--lhr-autotune-interval)"),
        text(Overclock, "--lhr-low-power", "LHR Low Power (--lhr-low-power)"),
        text(Overclock, "--pl", "Power Limit (--pl)"),
        text(Overclock, "--lock-cclock", "Lock Core Clock (--lock-cclock)"),
        text(Overclock, "--mt", "Memory Tweak (--mt)"),
    ]
}
