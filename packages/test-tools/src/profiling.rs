//! Wrap a test body with a call profiler and write results to a log file.
//!
//! Profiling data comes from `tracing-timing`: while the body runs, the
//! inter-event timing of every `tracing` span/event pair is recorded into
//! histograms, which are written to the log together with the total wall
//! time. The log file name gains a UTC timestamp (`my_test.prof` becomes
//! `my_test-20100211T170321.prof`) so repeated trials can be compared side
//! by side. The log is flushed on every exit path, including panics, and
//! the body's outcome propagates unchanged.

use std::fs::{self, File};
use std::future::Future;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use time::macros::format_description;
use time::OffsetDateTime;
use tracing::dispatcher::{self, Dispatch};
use tracing::instrument::WithSubscriber;
use tracing_timing::{Builder, Histogram, TimingSubscriber};

use crate::error::Error;

/// Where profile logs land, passed explicitly rather than read from ambient
/// process state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilerConfig {
    /// Directory for relative log names. Absolute names ignore it.
    pub log_dir: PathBuf,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            log_dir: std::env::temp_dir(),
        }
    }
}

impl ProfilerConfig {
    /// Read the log directory from `PROFILE_LOG_DIR`, keeping the OS temp
    /// directory otherwise.
    pub fn from_env() -> Self {
        match std::env::var("PROFILE_LOG_DIR") {
            Ok(dir) if !dir.is_empty() => Self {
                log_dir: PathBuf::from(dir),
            },
            _ => Self::default(),
        }
    }
}

/// Profile a synchronous body and write its timing log.
pub fn profile<F, R>(log_name: &str, config: &ProfilerConfig, f: F) -> Result<R, Error>
where
    F: FnOnce() -> R,
{
    let mut guard = FlushGuard::new(log_name, config)?;
    let dispatch = guard.dispatch.clone();
    let result = dispatcher::with_default(&dispatch, f);
    guard.finish()?;
    Ok(result)
}

/// Profile an async body and write its timing log.
///
/// The timing subscriber is attached to the future itself, so events are
/// captured on whichever thread polls it.
pub async fn profile_async<Fut>(
    log_name: &str,
    config: &ProfilerConfig,
    fut: Fut,
) -> Result<Fut::Output, Error>
where
    Fut: Future,
{
    let mut guard = FlushGuard::new(log_name, config)?;
    let result = fut.with_subscriber(guard.dispatch.clone()).await;
    guard.finish()?;
    Ok(result)
}

/// Resolve the final log path: relative names land under the configured
/// directory, and a UTC timestamp is inserted before the extension.
fn log_path(log_name: &str, config: &ProfilerConfig) -> Result<PathBuf, Error> {
    let name = Path::new(log_name);
    let base = if name.is_absolute() {
        name.to_path_buf()
    } else {
        config.log_dir.join(name)
    };

    let format = format_description!("[year][month][day]T[hour][minute][second]");
    let timestamp = OffsetDateTime::now_utc()
        .format(&format)
        .map_err(|err| Error::config(format!("cannot format profile timestamp: {err}")))?;

    let stem = base
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("profile");
    let file_name = match base.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => format!("{stem}-{timestamp}.{ext}"),
        None => format!("{stem}-{timestamp}"),
    };
    Ok(base.with_file_name(file_name))
}

/// Owns the timing subscriber and guarantees the log is written exactly
/// once: explicitly via [`FlushGuard::finish`] on the normal path, or from
/// `Drop` while unwinding.
struct FlushGuard {
    dispatch: Dispatch,
    path: PathBuf,
    started: Instant,
    armed: bool,
}

impl FlushGuard {
    fn new(log_name: &str, config: &ProfilerConfig) -> Result<Self, Error> {
        let path = log_path(log_name, config)?;
        let timing = Builder::default().build(|| {
            let mut histogram =
                Histogram::new_with_max(1_000_000_000, 2).expect("static histogram bounds");
            histogram.auto(true);
            histogram
        });
        Ok(Self {
            dispatch: Dispatch::new(timing),
            path,
            started: Instant::now(),
            armed: true,
        })
    }

    fn finish(&mut self) -> Result<(), Error> {
        self.armed = false;
        self.flush()
    }

    fn flush(&mut self) -> Result<(), Error> {
        let elapsed = self.started.elapsed();
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&self.path)?;
        let mut out = BufWriter::new(file);
        writeln!(out, "total: {}ns", elapsed.as_nanos())?;

        if let Some(timing) = self.dispatch.downcast_ref::<TimingSubscriber>() {
            timing.force_synchronize();
            timing.with_histograms(|histograms| {
                for (span, events) in histograms {
                    for (event, histogram) in events {
                        let _ = writeln!(
                            out,
                            "{span}/{event}: samples={} mean={}ns p50={}ns p95={}ns max={}ns",
                            histogram.len(),
                            histogram.mean().round() as u64,
                            histogram.value_at_quantile(0.5),
                            histogram.value_at_quantile(0.95),
                            histogram.max(),
                        );
                    }
                }
            });
        }
        out.flush()?;
        Ok(())
    }
}

impl Drop for FlushGuard {
    fn drop(&mut self) {
        if self.armed {
            // Unwinding: still write the log, but never panic out of drop.
            let _ = self.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::path::PathBuf;

    use serial_test::serial;

    use super::{log_path, ProfilerConfig};

    #[test]
    #[serial]
    fn from_env_prefers_the_configured_directory() {
        env::set_var("PROFILE_LOG_DIR", "/var/log/profiles");
        assert_eq!(
            ProfilerConfig::from_env().log_dir,
            PathBuf::from("/var/log/profiles")
        );
        env::remove_var("PROFILE_LOG_DIR");
    }

    #[test]
    #[serial]
    fn from_env_falls_back_to_the_temp_directory() {
        env::remove_var("PROFILE_LOG_DIR");
        assert_eq!(ProfilerConfig::from_env().log_dir, env::temp_dir());
    }

    #[test]
    fn relative_log_names_land_under_the_log_dir() {
        let config = ProfilerConfig {
            log_dir: PathBuf::from("/profiles"),
        };
        let path = log_path("my_view.prof", &config).unwrap();
        assert!(path.starts_with("/profiles"));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("my_view-"));
        assert!(name.ends_with(".prof"));
        // my_view-20100211T170321.prof
        assert_eq!(name.len(), "my_view-20100211T170321.prof".len());
    }

    #[test]
    fn absolute_log_names_ignore_the_log_dir() {
        let config = ProfilerConfig {
            log_dir: PathBuf::from("/profiles"),
        };
        let path = log_path("/elsewhere/run.prof", &config).unwrap();
        assert!(path.starts_with("/elsewhere"));
    }

    #[test]
    fn extensionless_log_names_still_get_a_timestamp() {
        let config = ProfilerConfig {
            log_dir: PathBuf::from("/profiles"),
        };
        let path = log_path("bare", &config).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("bare-"));
        assert!(!name.contains('.'));
    }
}
