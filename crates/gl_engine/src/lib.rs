//! # GL Engine
//!
//! Minimal OpenGL rendering layer behind the Minesweeper sandbox.
//!
//! GPU objects are owned by move-only wrappers that release their driver
//! handle exactly once on drop. All driver access goes through the
//! [`render::GraphicsApi`] trait, implemented by a `glow` backend for real
//! contexts and by an in-memory state tracker for tests.
//!
//! ```rust,no_run
//! use gl_engine::prelude::*;
//!
//! fn main() -> Result<(), AppError> {
//!     let config = SandboxConfig::default();
//!     let window = GlfwWindow::new(&config.window)?;
//!     let mut render_loop = RenderLoop::setup(window, &config.render)?;
//!     render_loop.run()?;
//!     Ok(())
//! }
//! ```

pub mod application;
pub mod config;
pub mod foundation;
pub mod render;
pub mod render_loop;
pub mod window;

#[cfg(test)]
mod tests;

pub use application::AppError;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        application::AppError,
        config::{Config, ConfigError, SandboxConfig},
        foundation::{logging, math::Vec4, time::Timer},
        render::{
            BufferHandle, Mesh, MeshData, RenderError, ShaderProgram, VertexAttribute,
            VertexLayout,
        },
        render_loop::{LoopState, RenderLoop},
        window::{GlfwWindow, WindowBackend, WindowError},
    };
}
