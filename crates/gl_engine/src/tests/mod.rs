//! Render loop tests against the headless backend

mod render_loop_tests;

use crate::config::{PulseShaderConfig, RenderConfig, ShaderConfig};
use crate::render::gl::{Gl, HeadlessGl};
use crate::window::{Key, WindowBackend, WindowEvent};
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

pub const VERTEX_SHADER: &str = "#version 460 core
layout (location = 0) in vec3 aPos;
layout (location = 1) in vec3 aColor;

out vec3 vertexColor;

void main()
{
    gl_Position = vec4(aPos, 1.0);
    vertexColor = aColor;
}
";

pub const FRAGMENT_SHADER: &str = "#version 460 core
in vec3 vertexColor;
out vec4 FragColor;

void main()
{
    FragColor = vec4(vertexColor, 1.0);
}
";

pub const PULSE_FRAGMENT_SHADER: &str = "#version 460 core
out vec4 FragColor;
uniform vec4 ourColor;

void main()
{
    FragColor = ourColor;
}
";

/// Window driven by a script instead of a user
///
/// Frames are counted by buffer swaps. Escape reads as held from frame
/// `escape_at` (1-based) onwards, and events queued for a frame are
/// returned by that frame's poll.
pub struct ScriptedWindow {
    gl: Rc<HeadlessGl>,
    size: (i32, i32),
    should_close: bool,
    swaps: u64,
    escape_at: Option<u64>,
    events: HashMap<u64, Vec<WindowEvent>>,
}

impl ScriptedWindow {
    pub fn new(gl: Rc<HeadlessGl>) -> Self {
        Self {
            gl,
            size: (800, 600),
            should_close: false,
            swaps: 0,
            escape_at: None,
            events: HashMap::new(),
        }
    }

    pub fn press_escape_at(mut self, frame: u64) -> Self {
        self.escape_at = Some(frame);
        self
    }

    pub fn event_at(mut self, frame: u64, event: WindowEvent) -> Self {
        self.events.entry(frame).or_default().push(event);
        self
    }

    pub const fn swaps(&self) -> u64 {
        self.swaps
    }
}

impl WindowBackend for ScriptedWindow {
    fn should_close(&self) -> bool {
        self.should_close
    }

    fn set_should_close(&mut self, should_close: bool) {
        self.should_close = should_close;
    }

    fn is_key_pressed(&self, key: Key) -> bool {
        match key {
            Key::Escape => self.escape_at.is_some_and(|frame| self.swaps + 1 >= frame),
        }
    }

    fn poll_events(&mut self) -> Vec<WindowEvent> {
        let events = self.events.remove(&self.swaps).unwrap_or_default();
        for event in &events {
            if let WindowEvent::FramebufferResized { width, height } = *event {
                self.size = (width, height);
            }
        }
        events
    }

    fn swap_buffers(&mut self) {
        self.swaps += 1;
    }

    fn framebuffer_size(&self) -> (i32, i32) {
        self.size
    }

    fn graphics(&self) -> Gl {
        self.gl.clone()
    }
}

/// Shader files for one test, in a directory of their own
pub struct ShaderFixture {
    dir: PathBuf,
}

impl ShaderFixture {
    pub fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("gl_engine_{name}_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("vertex.shader"), VERTEX_SHADER).unwrap();
        std::fs::write(dir.join("fragment.shader"), FRAGMENT_SHADER).unwrap();
        std::fs::write(dir.join("fragmentUniform.shader"), PULSE_FRAGMENT_SHADER).unwrap();
        Self { dir }
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            shaders: ShaderConfig::new(self.path("vertex.shader"), self.path("fragment.shader")),
            pulse: Some(PulseShaderConfig {
                shaders: ShaderConfig::new(
                    self.path("vertex.shader"),
                    self.path("fragmentUniform.shader"),
                ),
                uniform: "ourColor".to_string(),
            }),
            check_gl_errors: false,
            ..RenderConfig::default()
        }
    }
}

impl Drop for ShaderFixture {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.dir).ok();
    }
}
