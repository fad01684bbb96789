//! Application-level errors and process exit codes

use crate::config::ConfigError;
use crate::render::RenderError;
use crate::window::WindowError;
use thiserror::Error;

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Window, context or GL loader failure
    #[error("Window error: {0}")]
    Window(#[from] WindowError),

    /// GPU resource setup or frame failure
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Configuration could not be loaded or is invalid
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl AppError {
    /// Process exit code for this error
    ///
    /// Window and loader failures exit with -1; everything else with 1.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Window(_) => -1,
            Self::Render(_) | Self::Config(_) => 1,
        }
    }
}
