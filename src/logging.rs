use {
    chrono::Local,
    std::{
        fs::{self, OpenOptions},
        path::{Path, PathBuf},
    },
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

/// Installs the global subscriber: compact console output plus a per-day log
/// file under `log_dir`. `RUST_LOG` overrides the level chosen by `debug`.
pub fn init_logging(log_dir: impl AsRef<Path>, debug: bool) -> std::io::Result<PathBuf> {
    let log_dir = log_dir.as_ref();
    fs::create_dir_all(log_dir)?;

    let log_file = log_dir.join(log_file_name(Local::now().date_naive()));

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)?;

    let filter_level = if debug { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_level));

    let console_layer = fmt::layer().with_target(false).with_ansi(true).compact();

    let file_layer = fmt::layer()
        .with_writer(file)
        .with_target(false)
        .with_ansi(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(std::io::Error::other)?;

    tracing::info!("Logging to: {}", log_file.display());

    Ok(log_file)
}

fn log_file_name(date: chrono::NaiveDate) -> String {
    format!("teller-{}.log", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_is_named_by_day() {
        let date = chrono::NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(log_file_name(date), "teller-2026-10-19.log");
    }
}
