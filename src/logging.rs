use std::sync::OnceLock;

use tracing_subscriber::{fmt, EnvFilter};

use crate::error::GanttError;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "gantt_timeline=info";

static INSTALLED: OnceLock<bool> = OnceLock::new();

/// Install the global fmt subscriber. Safe to call more than once.
pub fn init_logging() -> Result<(), GanttError> {
    let installed = *INSTALLED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        fmt().with_env_filter(filter).with_target(false).try_init().is_ok()
    });
    if installed {
        Ok(())
    } else {
        Err(GanttError::LoggingInitialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_call_gives_same_answer() {
        let first = init_logging().is_ok();
        let second = init_logging().is_ok();
        assert_eq!(first, second);
    }
}
