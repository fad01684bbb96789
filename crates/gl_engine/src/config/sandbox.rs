//! Sandbox configuration
//!
//! Every struct uses `#[serde(default)]`, so a config file only needs the
//! fields it changes.

use super::{Config, ConfigError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Window and context settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Title bar text
    pub title: String,
    /// Initial client width in pixels
    pub width: u32,
    /// Initial client height in pixels
    pub height: u32,
    /// Requested OpenGL version (major, minor), core profile
    pub gl_version: (u32, u32),
    /// Whether the user may resize the window
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Minesweeper".to_string(),
            width: 800,
            height: 600,
            gl_version: (4, 6),
            resizable: true,
        }
    }
}

/// Vertex + fragment shader file pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    /// Path to the vertex shader source
    pub vertex_path: PathBuf,
    /// Path to the fragment shader source
    pub fragment_path: PathBuf,
}

impl ShaderConfig {
    /// Create a shader configuration
    pub fn new(vertex_path: impl Into<PathBuf>, fragment_path: impl Into<PathBuf>) -> Self {
        Self {
            vertex_path: vertex_path.into(),
            fragment_path: fragment_path.into(),
        }
    }

    /// Resolve relative paths against the first root that contains the file
    ///
    /// Paths that exist in no root, and absolute paths, are left untouched so
    /// the eventual read reports the path the user configured.
    pub fn resolved(&self, roots: &[&Path]) -> Self {
        Self {
            vertex_path: resolve(&self.vertex_path, roots),
            fragment_path: resolve(&self.fragment_path, roots),
        }
    }
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self::new(
            "res/shaders/basic/vertex.shader",
            "res/shaders/basic/fragment.shader",
        )
    }
}

fn resolve(path: &Path, roots: &[&Path]) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    roots
        .iter()
        .map(|root| root.join(path))
        .find(|candidate| candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}

/// Second program whose color pulses over time through a vec4 uniform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseShaderConfig {
    /// Shader files
    pub shaders: ShaderConfig,
    /// Name of the vec4 color uniform
    pub uniform: String,
}

impl Default for PulseShaderConfig {
    fn default() -> Self {
        Self {
            shaders: ShaderConfig::new(
                "res/shaders/basic/vertex.shader",
                "res/shaders/basic/fragmentUniform.shader",
            ),
            uniform: "ourColor".to_string(),
        }
    }
}

/// Per-frame rendering settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Color the frame is cleared to
    pub clear_color: [f32; 4],
    /// Program used for the vertex-colored triangle
    pub shaders: ShaderConfig,
    /// Optional program for the indexed quad; the primary program is used when absent
    pub pulse: Option<PulseShaderConfig>,
    /// Drain and log driver errors after every frame
    pub check_gl_errors: bool,
}

impl RenderConfig {
    /// Resolve every shader path, see [`ShaderConfig::resolved`]
    pub fn resolved(&self, roots: &[&Path]) -> Self {
        Self {
            shaders: self.shaders.resolved(roots),
            pulse: self.pulse.as_ref().map(|pulse| PulseShaderConfig {
                shaders: pulse.shaders.resolved(roots),
                uniform: pulse.uniform.clone(),
            }),
            ..self.clone()
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.2, 0.3, 0.3, 1.0],
            shaders: ShaderConfig::default(),
            pulse: Some(PulseShaderConfig::default()),
            check_gl_errors: cfg!(debug_assertions),
        }
    }
}

/// Complete sandbox configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Default log filter, overridden by `RUST_LOG`
    pub log_level: String,
    /// Window settings
    pub window: WindowConfig,
    /// Render settings
    pub render: RenderConfig,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            window: WindowConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl SandboxConfig {
    /// Check values that parse but cannot work
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size {}x{} must be non-zero",
                self.window.width, self.window.height
            )));
        }
        // Vertex array objects and the core profile start at 3.3
        if self.window.gl_version < (3, 3) {
            return Err(ConfigError::Invalid(format!(
                "OpenGL {}.{} is older than the required 3.3 core profile",
                self.window.gl_version.0, self.window.gl_version.1
            )));
        }
        if self
            .render
            .clear_color
            .iter()
            .any(|channel| !(0.0..=1.0).contains(channel))
        {
            return Err(ConfigError::Invalid(format!(
                "clear color {:?} has channels outside 0..=1",
                self.render.clear_color
            )));
        }
        if self
            .render
            .pulse
            .as_ref()
            .is_some_and(|pulse| pulse.uniform.is_empty())
        {
            return Err(ConfigError::Invalid("pulse uniform name is empty".to_string()));
        }
        Ok(())
    }
}

impl Config for SandboxConfig {}
