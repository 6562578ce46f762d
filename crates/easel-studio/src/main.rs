mod app;
mod button;
mod config;

use anyhow::{Context, Result};

use easel_engine::logging::init_logging;
use easel_engine::window::Runtime;
use easel_engine::xr;

use crate::app::EaselApp;
use crate::config::StudioConfig;

fn main() -> Result<()> {
    let config = StudioConfig::default();
    init_logging(&config.logging);
    let config = config.apply_env();

    log::info!("select eligibility: {}", config.eligibility);

    // Advisory only: the scene and the entry button come up either way.
    let (support, runtime) = xr::probe(&config.xr);
    log::info!("immersive VR: {support}");

    let app = EaselApp::new(&config, support, runtime);
    Runtime::run(config.runtime.clone(), config.gpu.clone(), app).context("easel runtime failed")
}
