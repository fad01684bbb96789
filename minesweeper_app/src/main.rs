//! Minesweeper sandbox
//!
//! Opens an 800x600 window and draws a vertex-colored triangle plus an
//! indexed quad whose color pulses over time. Escape closes the window.

use gl_engine::config::{Config, SandboxConfig};
use gl_engine::foundation::logging;
use gl_engine::render_loop::RenderLoop;
use gl_engine::window::GlfwWindow;
use gl_engine::AppError;
use std::path::Path;

/// Config files looked up in the working directory, first match wins
const CONFIG_FILES: [&str; 2] = ["minesweeper.toml", "minesweeper.ron"];

fn load_config() -> Result<SandboxConfig, AppError> {
    let config = match CONFIG_FILES.iter().map(Path::new).find(|path| path.exists()) {
        Some(path) => SandboxConfig::load_from_file(path)?,
        None => SandboxConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn run(config: &SandboxConfig) -> Result<(), AppError> {
    // Shaders are found from the working directory or from the crate itself
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let render_config = config.render.resolved(&[Path::new("."), manifest_dir]);

    let window = GlfwWindow::new(&config.window)?;
    let mut render_loop = RenderLoop::setup(window, &render_config)?;
    render_loop.run()?;
    Ok(())
}

fn main() {
    let config = load_config();
    logging::init(config.as_ref().map_or("info", |config| config.log_level.as_str()));

    let result = config.and_then(|config| {
        log::info!("Starting Minesweeper");
        run(&config)
    });

    match result {
        Ok(()) => log::info!("Minesweeper finished"),
        Err(e) => {
            log::error!("{e}");
            std::process::exit(e.exit_code());
        }
    }
}
