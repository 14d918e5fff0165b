use std::io::{self, IsTerminal};

use tracing::Level;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

/// Targets rendered by [`layer`]: this crate and the workspace crates built on it.
pub const TARGET_PREFIXES: &[&str] = &[
    "ai_llm_service",
    "content_assist",
    "domain_schema",
    "qa_store",
    "qa_backend",
];

/// RFC3339 UTC timer implemented via `chrono`.
/// Example output: `2025-09-12T10:20:30Z`
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now();
        let s = now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&s)
    }
}

/// Build a formatting layer that renders ONLY events emitted by the workspace crates.
///
/// - RFC3339 UTC timestamps
/// - Compact single-line format
/// - `file:line` and target (module path)
/// - Span close events (duration at the end of spans)
/// - ANSI colors only when stdout is a terminal
///
/// This layer uses a per-event filter so it does **not** affect logs from other crates.
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let use_ansi = io::stdout().is_terminal();

    let only_workspace = filter::filter_fn(|meta| {
        TARGET_PREFIXES
            .iter()
            .any(|prefix| meta.target().starts_with(prefix))
    });

    fmt::layer()
        .with_timer(ChronoRfc3339Utc)
        .with_level(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(use_ansi)
        .with_writer(io::stderr)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .event_format(fmt::format().compact().with_source_location(true))
        .with_filter(only_workspace)
}

/// Directive string raising the workspace crates to `level`,
/// e.g. `ai_llm_service=debug,content_assist=debug,...`.
pub fn level_directives(level: Level) -> String {
    let level = level.as_str().to_lowercase();
    TARGET_PREFIXES
        .iter()
        .map(|prefix| format!("{prefix}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Create an EnvFilter from `RUST_LOG` or the fallback default, then raise the
/// workspace crates to `level`.
///
/// Example: `default = "warn"`, `level = Level::DEBUG` shows WARN globally and
/// DEBUG for the workspace crates.
pub fn env_filter_with_level(default: &str, level: Level) -> EnvFilter {
    let base = std::env::var(EnvFilter::DEFAULT_ENV)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string());
    let directives = format!("{base},{}", level_directives(level));
    EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(default))
}
