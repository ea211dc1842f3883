//! 矿工进程终止策略

use std::ffi::OsStr;
use std::path::Path;

use sysinfo::{ProcessesToUpdate, Signal, System};

use super::SessionError;

/// 要终止的矿工进程
#[derive(Debug, Clone, Copy)]
pub struct KillTarget<'a> {
    /// 启动时使用的可执行文件路径
    pub program: &'a str,
    /// 由会话启动的进程 PID
    pub pid: u32,
}

impl KillTarget<'_> {
    /// 可执行文件名，例如 `./t-rex` -> `t-rex`
    pub fn process_name(&self) -> &str {
        Path::new(self.program)
            .file_name()
            .and_then(OsStr::to_str)
            .unwrap_or(self.program)
    }
}

/// 终止矿工进程的方式
pub trait ProcessController: Send {
    /// 强制终止目标，返回被终止的进程数
    fn terminate(&self, target: &KillTarget<'_>) -> Result<usize, SessionError>;
}

/// 按进程名强制终止 (SIGKILL)
///
/// 所有同名进程都会被终止，包括不是由本程序启动的。
#[derive(Debug, Default)]
pub struct KillByName;

impl ProcessController for KillByName {
    fn terminate(&self, target: &KillTarget<'_>) -> Result<usize, SessionError> {
        let name = target.process_name();
        tracing::debug!("按名称终止 {} (会话 pid {})", name, target.pid);

        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::All, true);

        let mut killed = 0;
        let mut failed = Vec::new();
        for process in sys.processes_by_exact_name(OsStr::new(name)) {
            match process.kill_with(Signal::Kill) {
                Some(true) => killed += 1,
                Some(false) => failed.push(process.pid().as_u32()),
                None => {
                    return Err(SessionError::Kill {
                        name: name.to_string(),
                        message: "SIGKILL is not supported on this platform".to_string(),
                    })
                }
            }
        }

        kill_outcome(name, killed, &failed)
    }
}

/// 汇总一次终止的结果：全部失败时报错，部分失败时记录被拒绝的 pid
fn kill_outcome(name: &str, killed: usize, failed: &[u32]) -> Result<usize, SessionError> {
    if killed == 0 && !failed.is_empty() {
        return Err(SessionError::Kill {
            name: name.to_string(),
            message: format!("permission denied for pid {:?}", failed),
        });
    }

    if !failed.is_empty() {
        tracing::warn!("无法终止 {} 进程 pid {:?}", name, failed);
    }
    tracing::info!("已终止 {} 个 {} 进程", killed, name);
    Ok(killed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_name() {
        let target = KillTarget { program: "./t-rex", pid: 1 };
        assert_eq!(target.process_name(), "t-rex");

        let target = KillTarget { program: "/opt/miners/t-rex", pid: 1 };
        assert_eq!(target.process_name(), "t-rex");

        let target = KillTarget { program: "t-rex", pid: 1 };
        assert_eq!(target.process_name(), "t-rex");
    }

    #[test]
    fn test_no_matching_process() {
        let target = KillTarget {
            program: "./no-such-miner-binary-3f9a",
            pid: 0,
        };
        assert_eq!(KillByName.terminate(&target).unwrap(), 0);
    }

    #[test]
    fn test_kill_outcome() {
        assert_eq!(kill_outcome("t-rex", 0, &[]).unwrap(), 0);
        // 部分成功仍算成功
        assert_eq!(kill_outcome("t-rex", 2, &[41]).unwrap(), 2);

        match kill_outcome("t-rex", 0, &[41, 42]) {
            Err(SessionError::Kill { name, message }) => {
                assert_eq!(name, "t-rex");
                assert!(message.contains("[41, 42]"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
