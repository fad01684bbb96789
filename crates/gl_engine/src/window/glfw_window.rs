//! GLFW window with an OpenGL core profile context

use super::{Key, WindowBackend, WindowError, WindowEvent, WindowResult};
use crate::config::WindowConfig;
use crate::render::gl::{Gl, GlowBackend, GraphicsApi};
use glfw::Context;
use std::rc::Rc;

/// GLFW window wrapper with proper resource management
///
/// Field order is drop order: the GL function table goes first, then the
/// window and its event queue, then GLFW itself, which terminates the
/// library.
pub struct GlfwWindow {
    gl: Gl,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
    glfw: glfw::Glfw,
}

impl GlfwWindow {
    /// Create the window, make its context current and load GL
    pub fn new(config: &WindowConfig) -> WindowResult<Self> {
        let mut glfw =
            glfw::init(glfw::fail_on_errors).map_err(|_| WindowError::InitializationFailed)?;

        let (major, minor) = config.gl_version;
        glfw.window_hint(glfw::WindowHint::ContextVersion(major, minor));
        glfw.window_hint(glfw::WindowHint::OpenGlProfile(glfw::OpenGlProfileHint::Core));
        glfw.window_hint(glfw::WindowHint::Resizable(config.resizable));
        // Required for core profiles on macOS
        glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));

        let (mut window, events) = glfw
            .create_window(config.width, config.height, &config.title, glfw::WindowMode::Windowed)
            .ok_or_else(|| {
                WindowError::CreationFailed(format!(
                    "{}x{} window with an OpenGL {major}.{minor} core context",
                    config.width, config.height
                ))
            })?;

        window.make_current();
        window.set_key_polling(true);
        window.set_close_polling(true);
        window.set_framebuffer_size_polling(true);

        #[allow(unsafe_code)]
        // SAFETY: the context was made current on this thread above and the
        // loader resolves symbols for that context.
        let backend =
            unsafe { GlowBackend::load(|symbol| window.get_proc_address(symbol) as *const _) }
                .map_err(WindowError::LoaderFailed)?;

        let version = backend.version();
        if version < (major, minor) {
            return Err(WindowError::LoaderFailed(format!(
                "driver provides OpenGL {}.{}, {major}.{minor} required",
                version.0, version.1
            )));
        }
        log::info!("OpenGL context: {}", backend.version_string());

        Ok(Self {
            gl: Rc::new(backend),
            window,
            events,
            glfw,
        })
    }
}

impl WindowBackend for GlfwWindow {
    fn should_close(&self) -> bool {
        self.window.should_close()
    }

    fn set_should_close(&mut self, should_close: bool) {
        self.window.set_should_close(should_close);
    }

    fn is_key_pressed(&self, key: Key) -> bool {
        let key = match key {
            Key::Escape => glfw::Key::Escape,
        };
        self.window.get_key(key) == glfw::Action::Press
    }

    fn poll_events(&mut self) -> Vec<WindowEvent> {
        self.glfw.poll_events();
        glfw::flush_messages(&self.events)
            .filter_map(|(_, event)| match event {
                glfw::WindowEvent::FramebufferSize(width, height) => {
                    Some(WindowEvent::FramebufferResized { width, height })
                }
                glfw::WindowEvent::Close => Some(WindowEvent::CloseRequested),
                _ => None,
            })
            .collect()
    }

    fn swap_buffers(&mut self) {
        self.window.swap_buffers();
    }

    fn framebuffer_size(&self) -> (i32, i32) {
        self.window.get_framebuffer_size()
    }

    fn graphics(&self) -> Gl {
        self.gl.clone()
    }
}
