//! Mesh data and its GPU representation

use crate::render::buffer::BufferHandle;
use crate::render::error::{RenderError, RenderResult};
use crate::render::gl::{Gl, IndexType, PrimitiveMode, UsageHint};
use crate::render::vertex_layout::{VertexAttribute, VertexLayout};
use std::mem::size_of;

/// Floats per interleaved vertex (position + color)
pub const FLOATS_PER_VERTEX: usize = 6;

/// Interleaved vertex: position then color
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position in normalized device coordinates
    pub position: [f32; 3],
    /// Linear RGB color
    pub color: [f32; 3],
}

impl Vertex {
    /// Byte distance between consecutive vertices
    pub const STRIDE: u32 = size_of::<Self>() as u32;

    /// Create a vertex
    pub const fn new(position: [f32; 3], color: [f32; 3]) -> Self {
        Self { position, color }
    }

    /// Shader inputs: position at location 0, color at location 1
    pub const fn attributes() -> [VertexAttribute; 2] {
        [
            VertexAttribute::float(0, 3, Self::STRIDE, 0),
            VertexAttribute::float(1, 3, Self::STRIDE, size_of::<[f32; 3]>() as u32),
        ]
    }
}

/// CPU-side indexed mesh whose indices are known to be in range
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl MeshData {
    /// Validate and wrap vertices and indices
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> RenderResult<Self> {
        if vertices.is_empty() {
            return Err(RenderError::InvalidMesh("mesh has no vertices".to_string()));
        }
        if indices.is_empty() {
            return Err(RenderError::InvalidMesh("mesh has no indices".to_string()));
        }
        if let Some(position) = indices
            .iter()
            .position(|&index| index as usize >= vertices.len())
        {
            return Err(RenderError::InvalidMesh(format!(
                "index {} at position {position} is out of range for {} vertices",
                indices[position],
                vertices.len()
            )));
        }
        Ok(Self { vertices, indices })
    }

    /// Build from a flat `x y z r g b` float array
    pub fn from_interleaved(floats: &[f32], indices: Vec<u32>) -> RenderResult<Self> {
        if floats.len() % FLOATS_PER_VERTEX != 0 {
            return Err(RenderError::InvalidMesh(format!(
                "{} floats is not a whole number of {FLOATS_PER_VERTEX}-float vertices",
                floats.len()
            )));
        }
        let vertices = floats
            .chunks_exact(FLOATS_PER_VERTEX)
            .map(|v| Vertex::new([v[0], v[1], v[2]], [v[3], v[4], v[5]]))
            .collect();
        Self::new(vertices, indices)
    }

    /// Colored unit quad: two triangles sharing the 1-2 edge
    pub fn quad() -> Self {
        Self {
            vertices: vec![
                Vertex::new([-0.5, -0.5, 0.0], [1.0, 0.0, 0.0]), // bottom left
                Vertex::new([0.5, -0.5, 0.0], [0.0, 1.0, 0.0]),  // bottom right
                Vertex::new([-0.5, 0.5, 0.0], [0.0, 0.0, 1.0]),  // top left
                Vertex::new([0.5, 0.5, 0.0], [1.0, 0.0, 0.0]),   // top right
            ],
            indices: vec![0, 1, 2, 1, 2, 3],
        }
    }

    /// Vertices in buffer order
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Indices in draw order
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }
}

/// Mesh uploaded to the GPU
///
/// Field order is drop order: index buffer, vertex buffer, then the layout,
/// the reverse of acquisition.
pub struct Mesh {
    index_buffer: BufferHandle,
    vertex_buffer: BufferHandle,
    layout: VertexLayout,
    vertex_count: u32,
    index_count: u32,
}

impl Mesh {
    /// Upload `data` and describe its layout
    ///
    /// All bindings are cleared on return. The layout is unbound before the
    /// element buffer so the layout keeps its element binding.
    pub fn upload(gl: &Gl, data: &MeshData) -> RenderResult<Self> {
        let mut layout = VertexLayout::new(gl)?;
        layout.bind();

        let vertex_buffer = BufferHandle::vertex(gl, data.vertices(), UsageHint::StaticDraw)?;
        let index_buffer = BufferHandle::index(gl, data.indices(), UsageHint::StaticDraw)?;

        layout.attach_index_buffer(&index_buffer)?;
        for attribute in Vertex::attributes() {
            layout.link_attribute(&vertex_buffer, attribute)?;
        }

        layout.unbind();
        vertex_buffer.unbind();
        index_buffer.unbind();

        log::debug!(
            "Uploaded mesh: {} vertices, {} indices",
            data.vertices().len(),
            data.indices().len()
        );

        Ok(Self {
            index_buffer,
            vertex_buffer,
            layout,
            vertex_count: data.vertices().len() as u32,
            index_count: data.indices().len() as u32,
        })
    }

    /// Bind the mesh's vertex layout
    pub fn bind(&self) {
        self.layout.bind();
    }

    /// Draw `count` vertices starting at `first` as independent triangles
    ///
    /// The mesh must be bound.
    pub fn draw_vertices(&self, first: u32, count: u32) -> RenderResult<()> {
        if first.saturating_add(count) > self.vertex_count {
            return Err(RenderError::InvalidMesh(format!(
                "vertex range {first}..{} exceeds {} vertices",
                first.saturating_add(count),
                self.vertex_count
            )));
        }
        self.gl().draw_arrays(PrimitiveMode::Triangles, first, count);
        Ok(())
    }

    /// Draw every index as independent triangles
    ///
    /// The mesh must be bound.
    pub fn draw_indexed(&self) {
        self.gl()
            .draw_elements(PrimitiveMode::Triangles, self.index_count, IndexType::UnsignedInt, 0);
    }

    /// Vertex layout of this mesh
    pub const fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    /// Buffer holding the interleaved vertices
    pub const fn vertex_buffer(&self) -> &BufferHandle {
        &self.vertex_buffer
    }

    /// Buffer holding the indices
    pub const fn index_buffer(&self) -> &BufferHandle {
        &self.index_buffer
    }

    /// Number of vertices uploaded
    pub const fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Number of indices uploaded
    pub const fn index_count(&self) -> u32 {
        self.index_count
    }

    fn gl(&self) -> &Gl {
        self.layout.gl()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::gl::{BufferTarget, GraphicsApi, HeadlessGl};
    use crate::render::shader::ShaderProgram;
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
void main()
{
    FragColor = vec4(vertexColor, 1.0);
}
";

    #[test]
    fn test_vertex_layout_matches_six_float_stride() {
        assert_eq!(Vertex::STRIDE, 24);
        let [position, color] = Vertex::attributes();
        assert_eq!((position.slot, position.offset), (0, 0));
        assert_eq!((color.slot, color.offset), (1, 12));
    }

    #[test]
    fn test_out_of_range_index_rejected() {
        let vertices = MeshData::quad().vertices().to_vec();
        let result = MeshData::new(vertices, vec![0, 1, 4]);
        assert!(matches!(result, Err(RenderError::InvalidMesh(_))));
    }

    #[test]
    fn test_from_interleaved_matches_quad() {
        #[rustfmt::skip]
        let floats = [
            -0.5, -0.5, 0.0, 1.0, 0.0, 0.0,
             0.5, -0.5, 0.0, 0.0, 1.0, 0.0,
            -0.5,  0.5, 0.0, 0.0, 0.0, 1.0,
             0.5,  0.5, 0.0, 1.0, 0.0, 0.0,
        ];
        let data = MeshData::from_interleaved(&floats, vec![0, 1, 2, 1, 2, 3]).unwrap();
        assert_eq!(data, MeshData::quad());

        assert!(MeshData::from_interleaved(&floats[..5], vec![0]).is_err());
    }

    #[test]
    fn test_upload_leaves_no_bindings_but_keeps_element_buffer() {
        let headless = Rc::new(HeadlessGl::new());
        let gl: Gl = headless.clone();
        let mesh = Mesh::upload(&gl, &MeshData::quad()).unwrap();

        assert_eq!(gl.bound_vertex_array(), None);
        assert_eq!(gl.bound_buffer(BufferTarget::Array), None);
        assert_eq!(
            headless.element_buffer_of(mesh.layout().id()),
            Some(mesh.index_buffer().id())
        );
        assert_eq!(headless.take_error(), None);
    }

    #[test]
    fn test_quad_draws_one_then_two_triangles() {
        let headless = Rc::new(HeadlessGl::new());
        let gl: Gl = headless.clone();
        let program = ShaderProgram::from_sources(&gl, VERTEX, FRAGMENT).unwrap();
        let mesh = Mesh::upload(&gl, &MeshData::quad()).unwrap();

        program.activate();
        mesh.bind();
        mesh.draw_vertices(0, 3).unwrap();
        mesh.draw_indexed();

        let draws = headless.draw_calls();
        assert_eq!(draws.len(), 2);

        assert!(!draws[0].indexed);
        assert_eq!(draws[0].vertices, vec![0, 1, 2]);
        assert_eq!(draws[0].primitive_count(), 1);

        assert!(draws[1].indexed);
        assert_eq!(draws[1].vertices, vec![0, 1, 2, 1, 2, 3]);
        assert_eq!(draws[1].primitive_count(), 2);
        assert_eq!(draws[1].distinct_vertices(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_vertex_range_checked() {
        let gl: Gl = Rc::new(HeadlessGl::new());
        let mesh = Mesh::upload(&gl, &MeshData::quad()).unwrap();
        assert!(mesh.draw_vertices(2, 3).is_err());
    }

    #[test]
    fn test_drop_releases_all_mesh_objects() {
        let headless = Rc::new(HeadlessGl::new());
        let gl: Gl = headless.clone();
        let mesh = Mesh::upload(&gl, &MeshData::quad()).unwrap();
        assert_eq!(headless.live_objects(), 3);

        drop(mesh);
        assert_eq!(headless.live_objects(), 0);
    }
}
