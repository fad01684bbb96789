//! Shader program compilation and ownership
//!
//! Building a program is a four step pipeline: read both source files,
//! compile each stage, link, release the stage objects. Each step has its
//! own [`RenderError`] variant and any failure aborts construction without
//! leaving GPU objects behind.

use crate::foundation::math::Vec4;
use crate::render::error::{RenderError, RenderResult};
use crate::render::gl::{Gl, ProgramId, ShaderId, ShaderStage, UniformLocation};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

/// Longest driver log attached to an error, in bytes
pub const MAX_INFO_LOG_LEN: usize = 512;

/// Compiled stage that is released when it goes out of scope
struct CompiledStage<'a> {
    gl: &'a Gl,
    id: ShaderId,
}

impl<'a> CompiledStage<'a> {
    fn compile(gl: &'a Gl, stage: ShaderStage, source: &str) -> RenderResult<Self> {
        let id = gl
            .create_shader(stage)
            .map_err(|reason| RenderError::ResourceCreation { kind: "shader", reason })?;
        let compiled = Self { gl, id };

        gl.shader_source(id, source);
        gl.compile_shader(id);
        if !gl.shader_compile_status(id) {
            return Err(RenderError::Compile {
                stage,
                log: driver_log(gl.shader_info_log(id)),
            });
        }

        log::debug!("Compiled {} shader {}", stage, id.0);
        Ok(compiled)
    }
}

impl Drop for CompiledStage<'_> {
    fn drop(&mut self) {
        self.gl.delete_shader(self.id);
    }
}

fn driver_log(log: String) -> String {
    let log = log.trim_end();
    if log.is_empty() {
        return "(driver reported no diagnostics)".to_string();
    }
    if log.len() <= MAX_INFO_LOG_LEN {
        return log.to_string();
    }
    let mut end = MAX_INFO_LOG_LEN;
    while !log.is_char_boundary(end) {
        end -= 1;
    }
    log[..end].to_string()
}

fn read_source(path: &Path) -> RenderResult<String> {
    std::fs::read_to_string(path).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Owned, linked shader program
pub struct ShaderProgram {
    gl: Gl,
    id: ProgramId,
    uniforms: RefCell<HashMap<String, Option<UniformLocation>>>,
}

impl ShaderProgram {
    /// Build a program from a vertex and a fragment shader file
    ///
    /// Both files are read before any GPU object is created, so a missing
    /// file never leaves a partial program behind.
    pub fn from_files(
        gl: &Gl,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> RenderResult<Self> {
        let vertex_path = vertex_path.as_ref();
        let fragment_path = fragment_path.as_ref();
        let vertex_source = read_source(vertex_path)?;
        let fragment_source = read_source(fragment_path)?;

        let program = Self::from_sources(gl, &vertex_source, &fragment_source)?;
        log::info!(
            "Shader program {} built from {} + {}",
            program.id.0,
            vertex_path.display(),
            fragment_path.display()
        );
        Ok(program)
    }

    /// Build a program from in-memory GLSL sources
    pub fn from_sources(gl: &Gl, vertex_source: &str, fragment_source: &str) -> RenderResult<Self> {
        // Stage guards release both shaders on every path out of this function
        let vertex = CompiledStage::compile(gl, ShaderStage::Vertex, vertex_source)?;
        let fragment = CompiledStage::compile(gl, ShaderStage::Fragment, fragment_source)?;

        let id = gl
            .create_program()
            .map_err(|reason| RenderError::ResourceCreation { kind: "program", reason })?;
        let program = Self {
            gl: gl.clone(),
            id,
            uniforms: RefCell::new(HashMap::new()),
        };

        gl.attach_shader(id, vertex.id);
        gl.attach_shader(id, fragment.id);
        gl.link_program(id);
        if !gl.program_link_status(id) {
            return Err(RenderError::Link {
                log: driver_log(gl.program_info_log(id)),
            });
        }

        Ok(program)
    }

    /// Make this the program used by subsequent draws
    pub fn activate(&self) {
        self.gl.use_program(Some(self.id));
    }

    /// Whether this program is the active one
    pub fn is_active(&self) -> bool {
        self.gl.current_program() == Some(self.id)
    }

    /// Upload a vec4 to the uniform `name`
    ///
    /// Uniform uploads target the active program, so call
    /// [`Self::activate`] first. Names that do not resolve to an active
    /// uniform are ignored; compilers drop unused uniforms, so this is
    /// reported once as a warning rather than as an error.
    pub fn set_vec4(&self, name: &str, value: Vec4) {
        if let Some(location) = self.uniform_location(name) {
            self.gl.uniform_4f(location, [value.x, value.y, value.z, value.w]);
        }
    }

    /// Cached lookup of an active uniform
    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        let mut uniforms = self.uniforms.borrow_mut();
        if let Some(location) = uniforms.get(name) {
            return *location;
        }

        let location = self.gl.uniform_location(self.id, name);
        if location.is_none() {
            log::warn!("Uniform `{}` is not active in shader program {}", name, self.id.0);
        }
        uniforms.insert(name.to_string(), location);
        location
    }

    /// GPU name of the program
    pub const fn id(&self) -> ProgramId {
        self.id
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        log::trace!("Deleting shader program {}", self.id.0);
        self.gl.delete_program(self.id);
    }
}

impl std::fmt::Debug for ShaderProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderProgram").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::gl::{GraphicsApi, HeadlessGl};
    use std::rc::Rc;

    const VERTEX: &str = "#version 460 core
layout (location = 0) in vec3 aPos;
layout (location = 1) in vec3 aColor;
out vec3 vertexColor;
void main()
{
    gl_Position = vec4(aPos, 1.0);
    vertexColor = aColor;
}
";

    const FRAGMENT: &str = "#version 460 core
in vec3 vertexColor;
out vec4 FragColor;
uniform vec4 ourColor;
void main()
{
    FragColor = vec4(vertexColor, 1.0) * ourColor;
}
";

    fn headless() -> (Rc<HeadlessGl>, Gl) {
        let headless = Rc::new(HeadlessGl::new());
        let gl: Gl = headless.clone();
        (headless, gl)
    }

    fn temp_shader(name: &str, source: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("gl_engine_shader_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, source).unwrap();
        path
    }

    #[test]
    fn test_valid_sources_link_and_activate() {
        let (headless, gl) = headless();
        let program = ShaderProgram::from_sources(&gl, VERTEX, FRAGMENT).unwrap();

        assert!(!program.is_active());
        program.activate();
        assert!(program.is_active());
        assert_eq!(gl.current_program(), Some(program.id()));

        // Stage objects are gone once the program is linked
        assert_eq!(headless.live_shaders(), 0);
        assert_eq!(headless.live_programs(), 1);
    }

    #[test]
    fn test_syntax_error_names_stage() {
        let (headless, gl) = headless();
        let broken = FRAGMENT.replace("FragColor = vec4(vertexColor, 1.0) * ourColor;\n}", "");

        let error = ShaderProgram::from_sources(&gl, VERTEX, &broken).unwrap_err();
        match error {
            RenderError::Compile { stage, log } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(!log.is_empty());
            }
            other => panic!("expected a compile error, got {other:?}"),
        }
        assert_eq!(headless.live_objects(), 0);
    }

    #[test]
    fn test_link_failure_releases_everything() {
        let (headless, gl) = headless();
        let vertex = VERTEX.replace("out vec3 vertexColor;", "");
        let vertex = vertex.replace("vertexColor = aColor;", "");

        let error = ShaderProgram::from_sources(&gl, &vertex, FRAGMENT).unwrap_err();
        assert!(matches!(error, RenderError::Link { ref log } if log.contains("vertexColor")));
        assert_eq!(headless.live_shaders(), 0);
        assert_eq!(headless.live_programs(), 0);
    }

    #[test]
    fn test_missing_file_is_io_error_without_gpu_objects() {
        let (headless, gl) = headless();
        let fragment = temp_shader("fragment.shader", FRAGMENT);

        let error =
            ShaderProgram::from_files(&gl, "does/not/exist/vertex.shader", &fragment).unwrap_err();
        match error {
            RenderError::Io { path, .. } => assert!(path.ends_with("vertex.shader")),
            other => panic!("expected an IO error, got {other:?}"),
        }
        assert_eq!(headless.live_objects(), 0);
    }

    #[test]
    fn test_program_from_files() {
        let (_headless, gl) = headless();
        let vertex = temp_shader("vertex.shader", VERTEX);
        let fragment = temp_shader("fragment_ok.shader", FRAGMENT);

        let program = ShaderProgram::from_files(&gl, &vertex, &fragment).unwrap();
        program.activate();
        assert!(program.is_active());
    }

    #[test]
    fn test_set_vec4_uploads_active_uniform() {
        let (headless, gl) = headless();
        let program = ShaderProgram::from_sources(&gl, VERTEX, FRAGMENT).unwrap();
        program.activate();

        program.set_vec4("ourColor", Vec4::new(0.0, 0.5, 0.0, 1.0));
        assert_eq!(
            headless.uniform_value(program.id(), "ourColor"),
            Some([0.0, 0.5, 0.0, 1.0])
        );
    }

    #[test]
    fn test_set_vec4_unknown_name_is_noop() {
        let (headless, gl) = headless();
        let program = ShaderProgram::from_sources(&gl, VERTEX, FRAGMENT).unwrap();
        program.activate();

        program.set_vec4("missing", Vec4::new(1.0, 1.0, 1.0, 1.0));
        program.set_vec4("missing", Vec4::new(1.0, 1.0, 1.0, 1.0));

        assert_eq!(program.uniform_location("missing"), None);
        assert_eq!(headless.take_error(), None);
    }

    #[test]
    fn test_driver_log_truncated_on_char_boundary() {
        let long = "é".repeat(MAX_INFO_LOG_LEN);
        let truncated = driver_log(long);
        assert!(truncated.len() <= MAX_INFO_LOG_LEN);
        assert!(truncated.chars().all(|c| c == 'é'));

        assert!(!driver_log(String::new()).is_empty());
    }
}
