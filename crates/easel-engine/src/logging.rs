//! Logger setup. Everything else logs through the `log` facade.

/// Filter used when neither the config nor `RUST_LOG` names one.
///
/// The wgpu stack and naga log per-frame detail at info.
pub const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `env_logger` filter directives, e.g. "easel_engine=debug,warn".
    pub filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// Directives to install: the config's own, then `rust_log`, then the default.
    pub fn resolve_filter(&self, rust_log: Option<&str>) -> String {
        self.filter
            .as_deref()
            .or(rust_log.filter(|s| !s.trim().is_empty()))
            .unwrap_or(DEFAULT_FILTER)
            .to_string()
    }
}

/// Installs the global logger. Later calls leave the first logger in place.
pub fn init_logging(config: &LoggingConfig) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = config.resolve_filter(rust_log.as_deref());

    let installed = env_logger::Builder::new()
        .parse_filters(&filter)
        .write_style(config.write_style)
        .try_init();

    if installed.is_ok() {
        log::debug!("logging initialized with '{filter}'");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins() {
        let cfg = LoggingConfig {
            filter: Some("debug".into()),
            ..LoggingConfig::default()
        };
        assert_eq!(cfg.resolve_filter(Some("warn")), "debug");
    }

    #[test]
    fn rust_log_beats_default() {
        let cfg = LoggingConfig::default();
        assert_eq!(cfg.resolve_filter(Some("easel_paint=trace")), "easel_paint=trace");
        assert_eq!(cfg.resolve_filter(Some("  ")), DEFAULT_FILTER);
        assert_eq!(cfg.resolve_filter(None), DEFAULT_FILTER);
    }
}
