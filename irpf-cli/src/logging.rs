//! Tracing setup for the `irpf` binary.
//!
//! Records go to stderr, so stdout carries only results, and are optionally
//! appended to a log file. Both outputs share one `EnvFilter`.

use std::{
    fs::File,
    io::{self, IsTerminal, Write},
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    EnvFilter,
    fmt::{
        self, FmtContext, MakeWriter,
        format::{FormatEvent, FormatFields, Writer},
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

use crate::config::{DEFAULT_LOG_LEVEL, LoggingConfig};

const DIM: &str = "\x1b[2m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// `<local timestamp> <LEVEL> <file>:<line> <fields>`
struct LocalFmt;

fn level_colour(level: Level) -> &'static str {
    match level {
        Level::ERROR => "\x1b[1;31m",
        Level::WARN => "\x1b[1;33m",
        Level::INFO => "\x1b[1;32m",
        Level::DEBUG => "\x1b[1;34m",
        Level::TRACE => "\x1b[1;35m",
    }
}

impl<S, N> FormatEvent<S, N> for LocalFmt
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let ansi = writer.has_ansi_escapes();
        let timestamp = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
        let level = *meta.level();

        if ansi {
            write!(
                writer,
                "{DIM}{timestamp}{RESET} {}{level:>5}{RESET} ",
                level_colour(level)
            )?;
        } else {
            write!(writer, "{timestamp} {level:>5} ")?;
        }

        let file = meta
            .file()
            .map(|f| f.split_once("src/").map_or(f, |(_, rest)| rest));
        if let (Some(file), Some(line)) = (file, meta.line()) {
            if ansi {
                write!(writer, "{CYAN}{file}:{line}{RESET} ")?;
            } else {
                write!(writer, "{file}:{line} ")?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Append-only log file shared by every record.
#[derive(Clone)]
struct SharedFile(Arc<Mutex<File>>);

struct FileWriter<'a>(MutexGuard<'a, File>);

impl Write for FileWriter<'_> {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<'a> MakeWriter<'a> for SharedFile {
    type Writer = FileWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        // A panic mid-write leaves the file usable.
        FileWriter(self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

fn open_log_file(path: &Path) -> Result<SharedFile> {
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file '{}'", path.display()))?;
    Ok(SharedFile(Arc::new(Mutex::new(file))))
}

/// Builds the log filter.
///
/// An explicit `level` (bare level or any `EnvFilter` directive) wins;
/// otherwise `RUST_LOG` is honoured, falling back to
/// [`DEFAULT_LOG_LEVEL`].
pub fn build_filter(level: Option<&str>) -> Result<EnvFilter> {
    match level {
        Some(level) => {
            EnvFilter::try_new(level).with_context(|| format!("invalid log level '{level}'"))
        }
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))),
    }
}

fn build_subscriber(
    filter: EnvFilter,
    file: Option<SharedFile>,
    stderr_ansi: bool,
) -> impl Subscriber + Send + Sync + 'static {
    let stderr_layer = fmt::layer()
        .event_format(LocalFmt)
        .with_ansi(stderr_ansi)
        .with_writer(io::stderr);

    let file_layer = file.map(|file| {
        fmt::layer()
            .event_format(LocalFmt)
            .with_ansi(false)
            .with_writer(file)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
}

/// Installs the global subscriber. Call once at startup.
///
/// Stderr output is coloured only when attached to a terminal.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config.level.as_deref())?;
    let file = config.file.as_deref().map(open_log_file).transpose()?;

    build_subscriber(filter, file, io::stderr().is_terminal())
        .try_init()
        .context("logging already initialized")
}
