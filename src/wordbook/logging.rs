//! Logging bootstrap.
//!
//! Library code only uses the `log` macros. The binary calls [`init_logging`]
//! once; events go to stderr so they never mix with command output.
//!
//! Level precedence: `$WORDBOOK_LOG`, then `debug` when verbose, then `warn`.
//! Events are written as `event=<name> key=value ...`.

use flexi_logger::{Logger, LoggerHandle};
use once_cell::sync::OnceCell;

pub const LOG_ENV: &str = "WORDBOOK_LOG";

const DEFAULT_LEVEL: &str = "warn";
const VERBOSE_LEVEL: &str = "debug";

static LOGGER: OnceCell<LoggerHandle> = OnceCell::new();

pub fn level_for(verbose: bool) -> String {
    match std::env::var(LOG_ENV) {
        Ok(level) if !level.trim().is_empty() => level,
        _ if verbose => VERBOSE_LEVEL.to_string(),
        _ => DEFAULT_LEVEL.to_string(),
    }
}

/// Starts the stderr logger. Calling it again is a no-op.
pub fn init_logging(verbose: bool) -> Result<(), String> {
    LOGGER
        .get_or_try_init(|| {
            let level = level_for(verbose);
            Logger::try_with_str(&level)
                .map_err(|err| format!("invalid log level `{level}`: {err}"))?
                .log_to_stderr()
                .format(flexi_logger::default_format)
                .start()
                .map_err(|err| format!("failed to start logger: {err}"))
        })
        .map(|_| ())
}
