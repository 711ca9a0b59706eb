/*!
 * Logging initialization: detailed log file plus errors on stderr
 */

use std::fs::File;
use std::io::IsTerminal;
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use crate::config::LogConfig;
use crate::error::{CopiaError, Result};

/// Install the global subscriber.
///
/// Everything at `config.level` and above goes to `config.log_file`, which is
/// truncated at startup. Errors are mirrored to stderr. `RUST_LOG` overrides
/// the file filter when set.
///
/// If the log file cannot be created the stderr layer is still installed and
/// the file error is returned.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("copia={}", config.level.to_tracing_level())))
        .map_err(|e| CopiaError::Config(format!("Failed to create log filter: {}", e)))?;

    let (file_layer, file_error) = match File::create(&config.log_file) {
        Ok(file) => {
            let layer = fmt::layer()
                .with_writer(file)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false)
                .with_filter(env_filter);
            (Some(layer), None)
        }
        Err(e) => (
            None,
            Some(CopiaError::Config(format!(
                "Failed to create log file {}: {}",
                config.log_file.display(),
                e
            ))),
        ),
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .compact()
        .with_filter(LevelFilter::ERROR);

    let installed = tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init();

    if let Some(err) = file_error {
        return Err(err);
    }
    installed.map_err(|e| CopiaError::Config(format!("Failed to install logger: {}", e)))
}

/// Initialize logging with custom format for testing
#[cfg(test)]
pub fn init_test_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("copia=debug"));

        let fmt_layer = fmt::layer().with_test_writer().with_target(false).compact();

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .ok();
    });
}
