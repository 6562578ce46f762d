use std::path::PathBuf;

use easel_engine::device::GpuInit;
use easel_engine::logging::LoggingConfig;
use easel_engine::window::RuntimeConfig;
use easel_engine::xr::XrConfig;
use easel_paint::{EligibilityPolicy, SceneConfig};

/// Environment variable selecting the select-eligibility policy.
pub const ENV_ELIGIBILITY: &str = "EASEL_ELIGIBILITY";
/// Environment variable naming a font file tried before the system paths.
pub const ENV_FONT: &str = "EASEL_FONT";

const SYSTEM_FONTS: [&str; 5] = [
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
];

/// Everything the studio binary is configured with.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub runtime: RuntimeConfig,
    pub gpu: GpuInit,
    pub logging: LoggingConfig,
    pub xr: XrConfig,
    pub scene: SceneConfig,
    pub eligibility: EligibilityPolicy,
    /// Tried in order; the first readable file wins.
    pub font_paths: Vec<PathBuf>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            runtime: RuntimeConfig::default(),
            gpu: GpuInit::default(),
            logging: LoggingConfig::default(),
            xr: XrConfig::default(),
            scene: SceneConfig::default(),
            eligibility: EligibilityPolicy::default(),
            font_paths: SYSTEM_FONTS.iter().map(PathBuf::from).collect(),
        }
    }
}

impl StudioConfig {
    /// Applies `EASEL_*` environment overrides.
    ///
    /// Call after logging is up; rejected values are reported as warnings.
    pub fn apply_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = var(ENV_ELIGIBILITY) {
            match raw.parse::<EligibilityPolicy>() {
                Ok(policy) => self.eligibility = policy,
                Err(e) => log::warn!("{ENV_ELIGIBILITY}: {e}; keeping {}", self.eligibility),
            }
        }

        if let Some(path) = var(ENV_FONT).filter(|p| !p.trim().is_empty()) {
            self.font_paths.insert(0, PathBuf::from(path));
        }

        self
    }

    /// Reads the first available font file.
    pub fn read_font(&self) -> Option<Vec<u8>> {
        self.font_paths.iter().find_map(|p| match std::fs::read(p) {
            Ok(bytes) => {
                log::debug!("font: {}", p.display());
                Some(bytes)
            }
            Err(_) => None,
        })
    }
}
