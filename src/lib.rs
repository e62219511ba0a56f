pub mod types;
pub mod config;
pub mod obf;
pub mod entrants;
pub mod set;
pub mod topology;
pub mod seeding;
pub mod builder;
pub mod losers;
pub mod placement;
pub mod ranking;
pub mod bracket;

pub use bracket::{Bracket, ImportReport};
pub use config::BracketConfig;
pub use entrants::{Entrant, EntrantRegistry};
pub use set::MatchNode;
pub use types::{Layout, MatchId, SetGameResult, SetStatus, Side};

use std::{fs, path::Path};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. With a log directory, output goes to a
/// daily rolling `bracketgen.log` there and the returned guard must be held
/// until exit; otherwise it goes to stderr.
pub fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir).ok();
            let file_appender = tracing_appender::rolling::daily(dir, "bracketgen.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(non_blocking)
                .with_ansi(false)
                .try_init()
                .ok()?;
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(std::io::stderr)
                .try_init()
                .ok();
            None
        }
    }
}
