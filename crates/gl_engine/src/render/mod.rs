//! Rendering module
//!
//! Owning wrappers around OpenGL objects. Every wrapper holds a clone of the
//! shared [`gl::Gl`] context handle and releases its object exactly once on
//! drop; none of them implement `Clone`.
//!
//! - [`buffer::BufferHandle`]: vertex and index buffers
//! - [`vertex_layout::VertexLayout`]: vertex array objects
//! - [`shader::ShaderProgram`]: compiled and linked programs
//! - [`mesh::Mesh`]: a vertex layout with its buffers

pub mod buffer;
pub mod error;
pub mod gl;
pub mod mesh;
pub mod shader;
pub mod vertex_layout;

pub use buffer::BufferHandle;
pub use error::{RenderError, RenderResult};
pub use gl::{Gl, GraphicsApi};
pub use mesh::{Mesh, MeshData, Vertex};
pub use shader::ShaderProgram;
pub use vertex_layout::{VertexAttribute, VertexLayout};
