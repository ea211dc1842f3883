//! 由字段值构造矿工命令行

use super::Field;

/// 基准测试参数
pub const BENCHMARK_FLAG: &str = "-B";

/// 运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// 正常挖矿
    Run,
    /// 基准测试，额外注入 `-B`
    Benchmark,
}

impl RunMode {
    pub fn display_name(&self) -> &'static str {
        match self {
            RunMode::Run => "run",
            RunMode::Benchmark => "benchmark",
        }
    }
}

/// 命令行构造器
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    /// 可执行文件路径，作为 argv[0]
    program: String,
}

impl CommandBuilder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// 构造完整 argv
    ///
    /// 按字段顺序输出 `key value` 成对参数，值去空白后为空的字段整体跳过，
    /// 输出的值保持原样（不去空白）。
    pub fn build(&self, mode: RunMode, fields: &[Field]) -> Vec<String> {
        let mut argv = vec![self.program.clone()];

        if mode == RunMode::Benchmark {
            argv.push(BENCHMARK_FLAG.to_string());
        }

        for field in fields.iter().filter(|f| !f.is_blank()) {
            argv.push(field.key.clone());
            argv.push(field.value.clone());
        }

        argv
    }
}

/// 格式化为可读的命令行（仅用于显示）
pub fn format_command_line(argv: &[String]) -> String {
    argv.iter()
        .map(|arg| quote_arg(arg))
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote_arg(value: &str) -> String {
    if value.is_empty() || value.contains(char::is_whitespace) || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miner::{FieldGroup, FieldKind, FieldRegistry};

    fn scenario_registry() -> FieldRegistry {
        let mut registry = FieldRegistry::new();
        let algos = FieldKind::Choice(vec!["autolykos2".into(), "blake3".into()]);
        registry.register(FieldGroup::General, "-a", "Algorithm", algos).unwrap();
        registry.register(FieldGroup::General, "-o", "Pool", FieldKind::Text).unwrap();
        registry
    }

    #[test]
    fn test_build_run() {
        let mut registry = scenario_registry();
        registry.set_value("-o", "stratum+tcp://pool:3333").unwrap();

        let argv = CommandBuilder::new("./t-rex").build(RunMode::Run, registry.all());
        assert_eq!(
            argv,
            vec!["./t-rex", "-a", "autolykos2", "-o", "stratum+tcp://pool:3333"]
        );
    }

    #[test]
    fn test_blank_fields_omitted() {
        let mut registry = scenario_registry();
        registry.set_value("-o", "   ").unwrap();

        let argv = CommandBuilder::new("./t-rex").build(RunMode::Run, registry.all());
        assert_eq!(argv, vec!["./t-rex", "-a", "autolykos2"]);
    }

    #[test]
    fn test_value_kept_untrimmed() {
        let mut registry = scenario_registry();
        registry.set_value("-o", " pool:3333 ").unwrap();

        let argv = CommandBuilder::new("./t-rex").build(RunMode::Run, registry.all());
        assert_eq!(argv, vec!["./t-rex", "-a", "autolykos2", "-o", " pool:3333 "]);
    }

    #[test]
    fn test_benchmark_flag_follows_program() {
        let mut registry = FieldRegistry::new();
        let argv = CommandBuilder::new("./t-rex").build(RunMode::Benchmark, registry.all());
        assert_eq!(argv, vec!["./t-rex", "-B"]);

        registry.register(FieldGroup::General, "-o", "Pool", FieldKind::Text).unwrap();
        registry.set_value("-o", "pool:1").unwrap();
        let argv = CommandBuilder::new("./t-rex").build(RunMode::Benchmark, registry.all());
        assert_eq!(argv, vec!["./t-rex", "-B", "-o", "pool:1"]);
    }

    #[test]
    fn test_pairs_follow_registry_order() {
        let mut registry = FieldRegistry::builtin();
        registry.set_value("--mt", "2").unwrap();
        registry.set_value("-u", "wallet").unwrap();
        registry.set_value("--api-key", "secret").unwrap();

        let argv = CommandBuilder::new("./t-rex").build(RunMode::Run, registry.all());
        assert_eq!(
            argv,
            vec!["./t-rex", "-a", "autolykos2", "-u", "wallet", "--api-key", "secret", "--mt", "2"]
        );
    }

    #[test]
    fn test_format_command_line() {
        let argv: Vec<String> = ["./t-rex", "-w", "my rig", "-p", ""]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(format_command_line(&argv), r#"./t-rex -w "my rig" -p """#);
    }
}
