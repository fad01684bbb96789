//! Graphics API abstraction
//!
//! The wrappers in [`crate::render`] never call OpenGL directly. They go
//! through [`GraphicsApi`], a narrow trait covering exactly the calls the
//! sandbox issues. Two implementations exist:
//!
//! - [`GlowBackend`]: forwards to a real driver through `glow`
//! - [`HeadlessGl`]: tracks GL object state in memory, used by tests and
//!   headless runs

mod glow_backend;
mod headless;

pub use glow_backend::GlowBackend;
pub use headless::{DrawCall, HeadlessGl};

use std::fmt;
use std::num::NonZeroU32;
use std::rc::Rc;

/// Shared handle to the active graphics context
///
/// `Rc` keeps every wrapper on the thread that owns the context.
pub type Gl = Rc<dyn GraphicsApi>;

/// Name of a buffer object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub NonZeroU32);

/// Name of a vertex array object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexArrayId(pub NonZeroU32);

/// Name of a shader stage object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderId(pub NonZeroU32);

/// Name of a linked program object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub NonZeroU32);

/// Location of an active uniform inside a program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

/// Buffer binding point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// `GL_ARRAY_BUFFER`, vertex attribute data
    Array,
    /// `GL_ELEMENT_ARRAY_BUFFER`, index data
    ElementArray,
}

/// Expected access pattern of buffer contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UsageHint {
    /// Uploaded once, drawn many times
    #[default]
    StaticDraw,
    /// Modified repeatedly, drawn many times
    DynamicDraw,
    /// Modified once, drawn a few times
    StreamDraw,
}

/// Scalar type of one vertex attribute component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    /// 32-bit float
    Float,
    /// 32-bit signed integer
    Int,
    /// 32-bit unsigned integer
    UnsignedInt,
    /// 16-bit signed integer
    Short,
    /// 16-bit unsigned integer
    UnsignedShort,
    /// 8-bit signed integer
    Byte,
    /// 8-bit unsigned integer
    UnsignedByte,
}

impl ComponentType {
    /// Size of a single component in bytes
    pub const fn size_bytes(self) -> u32 {
        match self {
            Self::Float | Self::Int | Self::UnsignedInt => 4,
            Self::Short | Self::UnsignedShort => 2,
            Self::Byte | Self::UnsignedByte => 1,
        }
    }
}

/// Programmable pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex shader
    Vertex,
    /// Fragment shader
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => write!(f, "vertex"),
            Self::Fragment => write!(f, "fragment"),
        }
    }
}

/// Primitive assembly mode for draw calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveMode {
    /// Independent points
    Points,
    /// Independent line segments
    Lines,
    /// Independent triangles, three vertices each
    Triangles,
    /// Triangle strip
    TriangleStrip,
}

impl PrimitiveMode {
    /// Number of complete primitives assembled from `vertex_count` vertices
    pub const fn primitive_count(self, vertex_count: u32) -> u32 {
        match self {
            Self::Points => vertex_count,
            Self::Lines => vertex_count / 2,
            Self::Triangles => vertex_count / 3,
            Self::TriangleStrip => vertex_count.saturating_sub(2),
        }
    }
}

/// Element type of an index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    /// 8-bit indices
    UnsignedByte,
    /// 16-bit indices
    UnsignedShort,
    /// 32-bit indices
    UnsignedInt,
}

impl IndexType {
    /// Size of a single index in bytes
    pub const fn size_bytes(self) -> u32 {
        match self {
            Self::UnsignedByte => 1,
            Self::UnsignedShort => 2,
            Self::UnsignedInt => 4,
        }
    }
}

/// The subset of OpenGL the sandbox uses
///
/// Methods take `&self`: a GL context is a single mutable state machine
/// reached through one thread, so implementors use interior mutability
/// where they track state themselves.
pub trait GraphicsApi {
    /// Driver version string (`GL_VERSION`)
    fn version_string(&self) -> String;

    /// Maximum number of vertex attribute slots (`GL_MAX_VERTEX_ATTRIBS`)
    fn max_vertex_attribs(&self) -> u32;

    /// Pop the oldest pending error flag, `None` when clean
    fn take_error(&self) -> Option<u32>;

    // Buffers

    /// Allocate a buffer name
    fn create_buffer(&self) -> Result<BufferId, String>;
    /// Bind `buffer` to `target`, or clear the binding with `None`
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>);
    /// Upload `data` to whatever is bound at `target`
    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: UsageHint);
    /// Release a buffer name
    fn delete_buffer(&self, buffer: BufferId);
    /// Query the buffer currently bound at `target`
    fn bound_buffer(&self, target: BufferTarget) -> Option<BufferId>;

    // Vertex arrays

    /// Allocate a vertex array name
    fn create_vertex_array(&self) -> Result<VertexArrayId, String>;
    /// Bind a vertex array, or clear the binding with `None`
    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayId>);
    /// Release a vertex array name
    fn delete_vertex_array(&self, vertex_array: VertexArrayId);
    /// Query the currently bound vertex array
    fn bound_vertex_array(&self) -> Option<VertexArrayId>;
    /// Describe attribute `slot` of the bound vertex array, sourced from the bound array buffer
    fn vertex_attrib_pointer(
        &self,
        slot: u32,
        components: u8,
        component_type: ComponentType,
        normalized: bool,
        stride: u32,
        offset: u32,
    );
    /// Enable attribute `slot` of the bound vertex array
    fn enable_vertex_attrib_array(&self, slot: u32);

    // Shaders and programs

    /// Allocate a shader stage object
    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderId, String>;
    /// Replace the source text of a shader
    fn shader_source(&self, shader: ShaderId, source: &str);
    /// Compile a shader from its current source
    fn compile_shader(&self, shader: ShaderId);
    /// Whether the last compile succeeded
    fn shader_compile_status(&self, shader: ShaderId) -> bool;
    /// Compiler diagnostics for a shader
    fn shader_info_log(&self, shader: ShaderId) -> String;
    /// Release a shader stage object
    fn delete_shader(&self, shader: ShaderId);
    /// Allocate a program object
    fn create_program(&self) -> Result<ProgramId, String>;
    /// Attach a compiled stage to a program
    fn attach_shader(&self, program: ProgramId, shader: ShaderId);
    /// Link all attached stages
    fn link_program(&self, program: ProgramId);
    /// Whether the last link succeeded
    fn program_link_status(&self, program: ProgramId) -> bool;
    /// Linker diagnostics for a program
    fn program_info_log(&self, program: ProgramId) -> String;
    /// Release a program object
    fn delete_program(&self, program: ProgramId);
    /// Make `program` current, or clear with `None`
    fn use_program(&self, program: Option<ProgramId>);
    /// Query the current program
    fn current_program(&self) -> Option<ProgramId>;
    /// Resolve an active uniform by name
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;
    /// Upload a vec4 to a uniform of the current program
    fn uniform_4f(&self, location: UniformLocation, value: [f32; 4]);

    // Framebuffer and drawing

    /// Set the viewport rectangle
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    /// Set the color used by [`GraphicsApi::clear_color_buffer`]
    fn clear_color(&self, rgba: [f32; 4]);
    /// Clear the color buffer
    fn clear_color_buffer(&self);
    /// Draw `count` vertices starting at `first`
    fn draw_arrays(&self, mode: PrimitiveMode, first: u32, count: u32);
    /// Draw `count` indices from the bound element buffer, starting at byte `offset`
    fn draw_elements(&self, mode: PrimitiveMode, count: u32, index_type: IndexType, offset: u32);
}
