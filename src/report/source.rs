use super::DependencyReport;
use crate::config::ReportConfig;
use crate::fs::{FileSystem, default_fs};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Appended when the analyzer targets `<root>/src` instead of the root.
const SRC_ONLY_ARGS: &[&str] = &["--include-only", "^src"];

/// Depth used by the shallow retry on the whole root.
const RETRY_MAX_DEPTH: &str = "2";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read report: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to start analyzer `{program}`: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("Analyzer exited with status {code:?}: {stderr}")]
    Exit { code: Option<i32>, stderr: String },
    #[error("Analyzer timed out after {0:?}")]
    Timeout(Duration),
}

/// Somewhere a dependency report can come from.
///
/// `Ok(None)` means the source answered but the document was empty or
/// malformed; the caller treats that the same as a report with no modules.
pub trait ReportSource: Send + Sync {
    fn fetch(&self) -> Result<Option<DependencyReport>, SourceError>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

/// A report already written to disk.
pub struct JsonReportFile<'a> {
    path: PathBuf,
    fs: &'a dyn FileSystem,
}

impl JsonReportFile<'static> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_fs(path, default_fs())
    }
}

impl<'a> JsonReportFile<'a> {
    pub fn with_fs(path: impl Into<PathBuf>, fs: &'a dyn FileSystem) -> Self {
        Self {
            path: path.into(),
            fs,
        }
    }
}

impl ReportSource for JsonReportFile<'_> {
    fn fetch(&self) -> Result<Option<DependencyReport>, SourceError> {
        let content = self.fs.read_to_string(&self.path)?;
        Ok(parse_report(&content))
    }

    fn describe(&self) -> String {
        format!("report file {}", self.path.display())
    }
}

/// An analyzer run out-of-process that prints a report on stdout.
#[derive(Debug, Clone)]
pub struct AnalyzerCommand {
    program: String,
    args: Vec<String>,
    cwd: PathBuf,
    timeout: Duration,
    /// Arguments for a single rerun after a non-zero exit.
    retry_args: Option<Vec<String>>,
}

impl AnalyzerCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args,
            cwd: cwd.into(),
            timeout: Duration::from_secs(90),
            retry_args: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, args: Vec<String>) -> Self {
        self.retry_args = Some(args);
        self
    }

    /// Build the configured analyzer command for `root`.
    ///
    /// `{target}` is replaced with `<root>/src` when that directory exists
    /// and `prefer_src` is set, otherwise with the root. A `src` target also
    /// restricts the report to `^src`. With `retry` set, a failed run is
    /// repeated once on the root with `--max-depth 2` and no include filter.
    /// Returns `None` when no command is configured.
    pub fn from_config(config: &ReportConfig, root: &Path) -> Option<Self> {
        let (program, template) = config.command.split_first()?;

        let src = root.join("src");
        let use_src = config.prefer_src && src.is_dir();
        let target = if use_src { src.as_path() } else { root };

        let mut args = substitute_target(template, target);
        if use_src {
            args.extend(SRC_ONLY_ARGS.iter().map(|a| a.to_string()));
        }

        let mut command = Self::new(program.clone(), args, root)
            .with_timeout(Duration::from_secs(config.timeout_secs));

        if config.retry {
            let retry = shallow(substitute_target(template, root));
            if retry != command.args {
                command = command.with_retry(retry);
            }
        }

        Some(command)
    }

    fn run(&self, args: &[String]) -> Result<Option<DependencyReport>, SourceError> {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .current_dir(&self.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // Own group, so a timeout also reaches the analyzer's children.
            command.process_group(0);
        }

        let mut child = command.spawn().map_err(|source| SourceError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        // Drain both pipes while waiting so a chatty analyzer cannot block.
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let stdout_reader = thread::spawn(move || read_pipe(stdout));
        let stderr_reader = thread::spawn(move || read_pipe(stderr));

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                kill_tree(&mut child);
                let _ = child.wait();
                return Err(SourceError::Timeout(self.timeout));
            }
            thread::sleep(POLL_INTERVAL);
        };

        let stdout = stdout_reader.join().unwrap_or_default();
        let stderr = stderr_reader.join().unwrap_or_default();

        if !status.success() {
            return Err(SourceError::Exit {
                code: status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(parse_report(&stdout))
    }
}

impl ReportSource for AnalyzerCommand {
    fn fetch(&self) -> Result<Option<DependencyReport>, SourceError> {
        match (self.run(&self.args), &self.retry_args) {
            (Err(SourceError::Exit { code, stderr }), Some(retry)) => {
                tracing::warn!(
                    "Analyzer exited with status {:?} ({}); retrying on the whole project",
                    code,
                    stderr
                );
                self.run(retry)
            }
            (result, _) => result,
        }
    }

    fn describe(&self) -> String {
        format!("analyzer `{}`", self.program)
    }
}

fn substitute_target(template: &[String], target: &Path) -> Vec<String> {
    let target = target.display().to_string();
    template
        .iter()
        .map(|a| a.replace("{target}", &target))
        .collect()
}

/// Drop `--include-only <pattern>` and lower `--max-depth` for the retry.
fn shallow(args: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len());
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--include-only" => {
                iter.next();
            }
            "--max-depth" => {
                out.push(arg);
                if iter.next().is_some() {
                    out.push(RETRY_MAX_DEPTH.to_string());
                }
            }
            _ => out.push(arg),
        }
    }
    out
}

#[cfg(unix)]
fn kill_tree(child: &mut Child) {
    let script = format!("kill -s KILL -- -{}", child.id());
    let killed = Command::new("sh")
        .args(["-c", script.as_str()])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success());
    if !killed {
        let _ = child.kill();
    }
}

// Only the direct child is reached here.
#[cfg(not(unix))]
fn kill_tree(child: &mut Child) {
    let _ = child.kill();
}

fn read_pipe<R: Read>(pipe: Option<R>) -> String {
    let mut buf = String::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_string(&mut buf);
    }
    buf
}

fn parse_report(content: &str) -> Option<DependencyReport> {
    if content.trim().is_empty() {
        return None;
    }
    match DependencyReport::from_json(content) {
        Ok(report) => Some(report),
        Err(e) => {
            tracing::debug!("Ignoring malformed dependency report: {}", e);
            None
        }
    }
}
