//! Window management
//!
//! The render loop talks to the windowing system only through
//! [`WindowBackend`]; [`GlfwWindow`] is the desktop implementation.

mod glfw_window;

pub use glfw_window::GlfwWindow;

use crate::render::gl::Gl;
use thiserror::Error;

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// GLFW could not be initialized
    #[error("GLFW initialization failed")]
    InitializationFailed,

    /// The window or its GL context could not be created
    #[error("Window creation failed: {0}")]
    CreationFailed(String),

    /// GL function pointers could not be loaded, or the context is too old
    #[error("OpenGL loader failed: {0}")]
    LoaderFailed(String),
}

/// Result type for window operations
pub type WindowResult<T> = Result<T, WindowError>;

/// Keys the sandbox reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Closes the window
    Escape,
}

/// Window events surfaced to the render loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    /// Drawable area changed size, in pixels
    FramebufferResized {
        /// New width
        width: i32,
        /// New height
        height: i32,
    },
    /// The user asked to close the window
    CloseRequested,
}

/// Window with a current OpenGL context
pub trait WindowBackend {
    /// Whether the close flag is set
    fn should_close(&self) -> bool;

    /// Set or clear the close flag
    fn set_should_close(&mut self, should_close: bool);

    /// Whether `key` is currently held down
    fn is_key_pressed(&self, key: Key) -> bool;

    /// Process pending window system events and return the relevant ones
    fn poll_events(&mut self) -> Vec<WindowEvent>;

    /// Present the back buffer
    fn swap_buffers(&mut self);

    /// Drawable area in pixels
    fn framebuffer_size(&self) -> (i32, i32);

    /// Graphics API of this window's context
    fn graphics(&self) -> Gl;
}
