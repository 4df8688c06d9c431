//! Observability hooks for the save/load pipelines.
//!
//! Round-tripping through a lossy format is only debuggable if every per-column
//! decision (renamed, vector-encoded, cast on load) is visible. The `log_metric!`
//! macro emits those decisions as structured key/value events through the `log`
//! facade at debug level, and `init_logging` wires the facade to `env_logger`.

use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Once;

use log::LevelFilter;

use crate::error::FerryError;

/// Logs a structured key-value metric string at debug level.
///
/// # Example
/// ```
/// use schemaferry::log_metric;
/// let column = "Purchase Vector";
/// log_metric!("event"="encode_column", "column"=column, "is_vector"=true);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        if $crate::__log::log_enabled!($crate::__log::Level::Debug) {
            // Collect each pair as a JSON string fragment
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+
            $crate::__log::debug!("FERRY_METRIC: {{ {} }}", parts.join(", "));
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Installs an `env_logger` backend once per process.
///
/// `RUST_LOG` still overrides `level` when set. When `log_file` is given, output is
/// appended to that file instead of stderr. Later calls are no-ops.
pub fn init_logging(level: LevelFilter, log_file: Option<&str>) -> Result<(), FerryError> {
    let target = match log_file {
        Some(filename) => Some(OpenOptions::new().append(true).create(true).open(filename)?),
        None => None,
    };

    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(level);
        builder.parse_default_env();

        // Custom formatter: just print the level and message
        builder.format(|buf, record| {
            writeln!(buf, "[{}] {}", record.level(), record.args())?;
            buf.flush()?;
            Ok(())
        });

        if let Some(file) = target {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }

        let _ = builder.try_init();
    });
    Ok(())
}
