use std::fmt;

use openxr as xr;

use super::runtime::XrRuntime;

/// OpenXR application settings.
#[derive(Debug, Clone)]
pub struct XrConfig {
    pub application_name: String,
    pub application_version: u32,
    /// Height of the tracking origin above the floor, in meters.
    ///
    /// Poses are reported in the `LOCAL` space shifted down by this amount so
    /// a seated or standing user's head lands near scene eye height.
    pub eye_height: f32,
}

impl Default for XrConfig {
    fn default() -> Self {
        Self {
            application_name: "Easel".to_string(),
            application_version: 1,
            eye_height: 1.6,
        }
    }
}

/// Best-effort answer to "can an immersive session start here?".
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum XrSupport {
    /// A runtime is installed and a headset is available.
    Supported,
    /// No usable runtime.
    Unsupported,
    /// A runtime is installed but no headset answered yet.
    Unknown,
}

impl XrSupport {
    #[inline]
    pub fn is_unsupported(self) -> bool {
        self == Self::Unsupported
    }
}

impl fmt::Display for XrSupport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Supported => "supported",
            Self::Unsupported => "unsupported",
            Self::Unknown => "unknown",
        })
    }
}

/// Queries the OpenXR loader for an immersive-VR capable system.
///
/// Never fails: every error is logged and folded into the returned support
/// level. On success the live runtime is handed back so the caller can start a
/// session without probing again.
pub fn probe(config: &XrConfig) -> (XrSupport, Option<XrRuntime>) {
    // SAFETY: the loader is a system library resolved by name; no other
    // OpenXR entry point is in use yet.
    let entry = match unsafe { xr::Entry::load() } {
        Ok(entry) => entry,
        Err(e) => {
            log::warn!("OpenXR loader not available: {e:?}");
            return (XrSupport::Unsupported, None);
        }
    };

    let available = match entry.enumerate_extensions() {
        Ok(exts) => exts,
        Err(e) => {
            log::warn!("OpenXR extension query failed: {e:?}");
            return (XrSupport::Unsupported, None);
        }
    };
    if !available.mnd_headless {
        log::warn!("OpenXR runtime lacks XR_MND_headless");
        return (XrSupport::Unsupported, None);
    }

    let mut extensions = xr::ExtensionSet::default();
    extensions.mnd_headless = true;

    let instance = match entry.create_instance(
        &xr::ApplicationInfo {
            application_name: &config.application_name,
            application_version: config.application_version,
            engine_name: "easel",
            engine_version: 1,
        },
        &extensions,
        &[],
    ) {
        Ok(instance) => instance,
        Err(e) => {
            log::error!("OpenXR create_instance failed: {e:?}");
            return (XrSupport::Unsupported, None);
        }
    };

    if let Ok(props) = instance.properties() {
        log::info!(
            "OpenXR runtime: {} {}",
            props.runtime_name,
            props.runtime_version
        );
    }

    match instance.system(xr::FormFactor::HEAD_MOUNTED_DISPLAY) {
        Ok(system) => (
            XrSupport::Supported,
            Some(XrRuntime::new(instance, system, config.eye_height)),
        ),
        Err(xr::sys::Result::ERROR_FORM_FACTOR_UNAVAILABLE) => {
            log::info!("OpenXR runtime found, headset not connected");
            (XrSupport::Unknown, None)
        }
        Err(e) => {
            log::warn!("OpenXR system query failed: {e:?}");
            (XrSupport::Unsupported, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unsupported_is_unsupported() {
        assert!(XrSupport::Unsupported.is_unsupported());
        assert!(!XrSupport::Unknown.is_unsupported());
        assert!(!XrSupport::Supported.is_unsupported());
        assert_eq!(XrSupport::Unknown.to_string(), "unknown");
    }

    #[test]
    fn default_config_names_app() {
        let c = XrConfig::default();
        assert_eq!(c.application_name, "Easel");
        assert_eq!(c.eye_height, 1.6);
    }
}
