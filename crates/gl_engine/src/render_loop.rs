//! Frame loop
//!
//! [`RenderLoop::setup`] builds the scene for a window whose context is
//! already current; [`RenderLoop::run`] then renders until the window's close
//! flag is set.

use crate::config::{RenderConfig, ShaderConfig};
use crate::foundation::math::pulse_color;
use crate::foundation::time::Timer;
use crate::render::{Gl, Mesh, MeshData, RenderResult, ShaderProgram};
use crate::window::{Key, WindowBackend, WindowEvent};

/// Driver errors drained per frame before giving up on the queue
const MAX_ERRORS_PER_FRAME: usize = 16;

/// Loop lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Resources built, no frame rendered yet
    Setup,
    /// Rendering frames
    FrameLoop,
    /// Close requested and the loop has returned
    Terminated,
}

fn build_program(gl: &Gl, shaders: &ShaderConfig) -> RenderResult<ShaderProgram> {
    ShaderProgram::from_files(gl, &shaders.vertex_path, &shaders.fragment_path)
}

/// Program whose color uniform follows [`pulse_color`]
struct PulseProgram {
    program: ShaderProgram,
    uniform: String,
}

/// Single-window render loop
///
/// Field order is drop order: the mesh, then the programs, then the window,
/// which tears down the context last.
pub struct RenderLoop<W: WindowBackend> {
    mesh: Mesh,
    pulse: Option<PulseProgram>,
    program: ShaderProgram,
    gl: Gl,
    window: W,
    clear_color: [f32; 4],
    check_gl_errors: bool,
    timer: Timer,
    state: LoopState,
}

impl<W: WindowBackend> RenderLoop<W> {
    /// Build shader programs and the quad mesh for `window`
    pub fn setup(window: W, config: &RenderConfig) -> RenderResult<Self> {
        let gl = window.graphics();
        log::info!("Renderer: OpenGL {}", gl.version_string());

        let program = build_program(&gl, &config.shaders)?;
        let pulse = match &config.pulse {
            Some(pulse) => Some(PulseProgram {
                program: build_program(&gl, &pulse.shaders)?,
                uniform: pulse.uniform.clone(),
            }),
            None => None,
        };
        let mesh = Mesh::upload(&gl, &MeshData::quad())?;

        let (width, height) = window.framebuffer_size();
        gl.viewport(0, 0, width, height);

        Ok(Self {
            mesh,
            pulse,
            program,
            gl,
            window,
            clear_color: config.clear_color,
            check_gl_errors: config.check_gl_errors,
            timer: Timer::new(),
            state: LoopState::Setup,
        })
    }

    /// Render frames until the window should close
    pub fn run(&mut self) -> RenderResult<()> {
        self.state = LoopState::FrameLoop;
        log::info!("Entering frame loop");

        while !self.window.should_close() {
            if let Err(e) = self.frame() {
                self.state = LoopState::Terminated;
                return Err(e);
            }
        }

        self.state = LoopState::Terminated;
        log::info!(
            "Frame loop finished: {} frames, {:.1} fps average",
            self.timer.frame_count(),
            self.timer.average_fps()
        );
        Ok(())
    }

    /// Render and present a single frame
    pub fn frame(&mut self) -> RenderResult<()> {
        if self.window.is_key_pressed(Key::Escape) {
            log::debug!("Escape pressed, closing window");
            self.window.set_should_close(true);
        }

        self.gl.clear_color(self.clear_color);
        self.gl.clear_color_buffer();

        self.program.activate();
        self.mesh.bind();
        self.mesh.draw_vertices(0, 3)?;

        if let Some(pulse) = &self.pulse {
            pulse.program.activate();
            pulse.program.set_vec4(&pulse.uniform, pulse_color(self.timer.elapsed()));
        }
        self.mesh.draw_indexed();

        if self.check_gl_errors {
            self.drain_gl_errors();
        }

        self.window.swap_buffers();
        for event in self.window.poll_events() {
            self.handle_event(event);
        }

        self.timer.tick();
        Ok(())
    }

    fn handle_event(&mut self, event: WindowEvent) {
        match event {
            WindowEvent::FramebufferResized { width, height } => {
                log::debug!("Framebuffer resized to {width}x{height}");
                self.gl.viewport(0, 0, width, height);
            }
            WindowEvent::CloseRequested => self.window.set_should_close(true),
        }
    }

    fn drain_gl_errors(&self) {
        for _ in 0..MAX_ERRORS_PER_FRAME {
            match self.gl.take_error() {
                Some(code) => {
                    let frame = self.timer.frame_count() + 1;
                    log::warn!("OpenGL error 0x{code:04X} in frame {frame}");
                }
                None => return,
            }
        }
    }

    /// Current lifecycle state
    pub const fn state(&self) -> LoopState {
        self.state
    }

    /// Frames presented so far
    pub const fn frames(&self) -> u64 {
        self.timer.frame_count()
    }

    /// Window being rendered to
    pub const fn window(&self) -> &W {
        &self.window
    }

    /// Mesh drawn every frame
    pub const fn mesh(&self) -> &Mesh {
        &self.mesh
    }
}
