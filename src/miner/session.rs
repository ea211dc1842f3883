//! 矿工进程会话
//!
//! 启动 T-Rex 进程，后台线程逐行读取 stdout/stderr 并通过通道送回 UI 线程，
//! UI 线程在 [`ProcessSession::poll`] 中把输出写入日志。

use std::io::{self, BufRead, BufReader, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::{
    format_command_line, CommandBuilder, Field, KillTarget, ProcessController, RunMode,
    SessionError,
};
use crate::utils::{OutputLog, OutputStream};

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    /// 已发送终止信号，等待进程退出
    Stopping,
}

impl SessionState {
    pub fn display_name(&self) -> &'static str {
        match self {
            SessionState::Idle => "Idle",
            SessionState::Running => "Running",
            SessionState::Stopping => "Stopping",
        }
    }
}

/// 一次运行的记录
#[derive(Debug, Clone)]
pub struct RunInfo {
    /// 运行序号，用来丢弃旧运行残留的事件
    pub id: u64,
    pub pid: u32,
    pub mode: RunMode,
    pub argv: Vec<String>,
    pub started_at: Instant,
    pub ended_at: Option<Instant>,
    /// 进程退出状态，读取失败时为 None
    pub exit_status: Option<ExitStatus>,
}

impl RunInfo {
    /// 运行时长
    pub fn elapsed(&self) -> Duration {
        match self.ended_at {
            Some(end) => end.duration_since(self.started_at),
            None => self.started_at.elapsed(),
        }
    }
}

/// 后台线程发回的事件
#[derive(Debug)]
enum SessionEvent {
    Line {
        run: u64,
        stream: OutputStream,
        text: String,
    },
    StreamFailed {
        run: u64,
        stream: OutputStream,
        error: io::Error,
    },
    /// 两路输出均已结束且进程已回收
    Exited {
        run: u64,
        status: io::Result<ExitStatus>,
    },
}

/// 矿工进程会话，同一时间只允许一个进程运行
pub struct ProcessSession {
    state: SessionState,
    builder: CommandBuilder,
    controller: Box<dyn ProcessController>,
    output: OutputLog,
    events_tx: Sender<SessionEvent>,
    events_rx: Receiver<SessionEvent>,
    next_run: u64,
    current: Option<RunInfo>,
}

impl ProcessSession {
    pub fn new(
        builder: CommandBuilder,
        controller: Box<dyn ProcessController>,
        output_history: usize,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            state: SessionState::Idle,
            builder,
            controller,
            output: OutputLog::new(output_history),
            events_tx,
            events_rx,
            next_run: 1,
            current: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != SessionState::Idle
    }

    pub fn output(&self) -> &OutputLog {
        &self.output
    }

    pub fn builder(&self) -> &CommandBuilder {
        &self.builder
    }

    /// 最近一次运行
    pub fn current_run(&self) -> Option<&RunInfo> {
        self.current.as_ref()
    }

    /// 启动矿工
    ///
    /// 已有进程在运行时拒绝启动，返回 [`SessionError::AlreadyRunning`]。
    pub fn start(&mut self, mode: RunMode, fields: &[Field]) -> Result<u32, SessionError> {
        if self.is_active() {
            let pid = self.current.as_ref().map(|r| r.pid).unwrap_or_default();
            return Err(SessionError::AlreadyRunning { pid });
        }

        let argv = self.builder.build(mode, fields);
        let program = self.builder.program().to_string();

        let mut child = Command::new(&program)
            .args(&argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| {
                tracing::error!("启动 {} 失败: {}", program, source);
                SessionError::Spawn {
                    program: program.clone(),
                    source,
                }
            })?;

        let run = self.next_run;
        self.next_run += 1;
        let pid = child.id();

        tracing::info!("已启动 {} (pid {}, {})", program, pid, mode.display_name());
        tracing::debug!("命令行: {}", format_command_line(&argv));

        self.output.clear();
        self.output
            .push_system(format!("$ {}", format_command_line(&argv)));

        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_reader(run, OutputStream::Stdout, stdout, self.events_tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_reader(run, OutputStream::Stderr, stderr, self.events_tx.clone()));
        }
        spawn_reaper(run, child, readers, self.events_tx.clone());

        self.current = Some(RunInfo {
            id: run,
            pid,
            mode,
            argv,
            started_at: Instant::now(),
            ended_at: None,
            exit_status: None,
        });
        self.state = SessionState::Running;
        Ok(pid)
    }

    /// 强制终止矿工，返回被终止的进程数
    ///
    /// 不等待进程退出，退出事件由 [`poll`](Self::poll) 处理。
    pub fn stop(&mut self) -> Result<usize, SessionError> {
        let pid = match (&self.current, self.state) {
            (Some(run), SessionState::Running | SessionState::Stopping) => run.pid,
            _ => return Err(SessionError::NotRunning),
        };

        let target = KillTarget {
            program: self.builder.program(),
            pid,
        };
        let killed = self.controller.terminate(&target)?;

        if killed == 0 {
            tracing::warn!("没有找到名为 {} 的进程", target.process_name());
            self.output.push_system(format!(
                "No running {} process found.",
                target.process_name()
            ));
        } else {
            self.state = SessionState::Stopping;
            self.output.push_system("T-Rex mining process stopped.");
        }
        Ok(killed)
    }

    /// 处理后台线程送来的事件，返回处理的事件数
    pub fn poll(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            handled += 1;
            self.handle_event(event);
        }
        handled
    }

    fn is_current(&self, run: u64) -> bool {
        self.current.as_ref().map(|r| r.id) == Some(run)
    }

    /// 输出读取失败后终止仍在运行的进程，避免回到 Idle 后再启动出第二个矿工
    fn abandon_run(&mut self) {
        let Some(run) = self.current.as_ref() else {
            return;
        };
        if run.ended_at.is_some() {
            return;
        }
        let target = KillTarget {
            program: self.builder.program(),
            pid: run.pid,
        };
        match self.controller.terminate(&target) {
            Ok(killed) => tracing::warn!("输出读取失败，已终止 {} 个矿工进程", killed),
            Err(e) => {
                tracing::error!("{}", e);
                self.output.push_system(format!("Error: {}", e));
            }
        }
    }

    fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Line { run, stream, text } => {
                if self.is_current(run) {
                    self.output.push(stream, text);
                }
            }
            SessionEvent::StreamFailed { run, stream, error } => {
                if !self.is_current(run) {
                    return;
                }
                let err = SessionError::Stream(error);
                tracing::error!("{:?}: {}", stream, err);
                self.output.push_system(format!("Error: {}", err));
                self.abandon_run();
                self.state = SessionState::Idle;
            }
            SessionEvent::Exited { run, status } => {
                if !self.is_current(run) {
                    tracing::debug!("忽略旧运行 #{} 的退出事件", run);
                    return;
                }
                let message = match &status {
                    Ok(status) => format!("Process exited ({}).", status),
                    Err(e) => format!("Failed to collect exit status: {}", e),
                };
                tracing::info!("{}", message);
                self.output.push_system(message);

                if let Some(current) = self.current.as_mut() {
                    current.ended_at = Some(Instant::now());
                    current.exit_status = status.ok();
                }
                self.state = SessionState::Idle;
            }
        }
    }
}

/// 逐行读取一路输出
///
/// 非 UTF-8 字节按有损方式转换，行尾的 `\r\n` 被去掉。
fn spawn_reader<R: Read + Send + 'static>(
    run: u64,
    stream: OutputStream,
    reader: R,
    sender: Sender<SessionEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    while matches!(buf.last(), Some(b'\n' | b'\r')) {
                        buf.pop();
                    }
                    let text = String::from_utf8_lossy(&buf).into_owned();
                    if sender.send(SessionEvent::Line { run, stream, text }).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => {
                    let _ = sender.send(SessionEvent::StreamFailed { run, stream, error });
                    break;
                }
            }
        }
    })
}

/// 等两路输出读完后回收进程
fn spawn_reaper(
    run: u64,
    mut child: Child,
    readers: Vec<JoinHandle<()>>,
    sender: Sender<SessionEvent>,
) {
    thread::spawn(move || {
        for reader in readers {
            if reader.join().is_err() {
                tracing::error!("输出读取线程异常退出");
            }
        }
        let status = child.wait();
        let _ = sender.send(SessionEvent::Exited { run, status });
    });
}
