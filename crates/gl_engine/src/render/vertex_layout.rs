//! Vertex array ownership and attribute layout
//!
//! A `VertexLayout` owns one vertex array object and remembers every
//! attribute it has been told about, so the layout can be inspected without
//! a driver round trip.

use crate::render::buffer::BufferHandle;
use crate::render::error::{RenderError, RenderResult};
use crate::render::gl::{BufferId, BufferTarget, ComponentType, Gl, VertexArrayId};
use std::collections::BTreeMap;

/// Description of one vertex attribute inside an interleaved buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader input location
    pub slot: u32,
    /// Components per vertex, 1 to 4
    pub components: u8,
    /// Scalar type of each component
    pub component_type: ComponentType,
    /// Map integer data to [0, 1] / [-1, 1]
    pub normalized: bool,
    /// Byte distance between consecutive vertices
    pub stride: u32,
    /// Byte offset of the first component within a vertex
    pub offset: u32,
}

impl VertexAttribute {
    /// Float attribute with `components` components
    pub const fn float(slot: u32, components: u8, stride: u32, offset: u32) -> Self {
        Self {
            slot,
            components,
            component_type: ComponentType::Float,
            normalized: false,
            stride,
            offset,
        }
    }

    /// Bytes occupied by this attribute within one vertex
    pub const fn size_bytes(&self) -> u32 {
        self.components as u32 * self.component_type.size_bytes()
    }
}

/// Owned vertex array object
pub struct VertexLayout {
    gl: Gl,
    id: VertexArrayId,
    attributes: BTreeMap<u32, (VertexAttribute, BufferId)>,
    index_buffer: Option<BufferId>,
}

impl VertexLayout {
    /// Allocate an empty vertex array
    pub fn new(gl: &Gl) -> RenderResult<Self> {
        let id = gl
            .create_vertex_array()
            .map_err(|reason| RenderError::ResourceCreation { kind: "vertex array", reason })?;
        log::debug!("Created vertex array {}", id.0);

        Ok(Self {
            gl: gl.clone(),
            id,
            attributes: BTreeMap::new(),
            index_buffer: None,
        })
    }

    /// Record `attribute` as sourced from `buffer` and enable its slot
    ///
    /// Binds this layout and then the buffer before describing the
    /// attribute; the attribute pointer captures whichever array buffer is
    /// bound at that moment. Relinking a slot replaces the previous record.
    /// Leaves this layout bound.
    pub fn link_attribute(
        &mut self,
        buffer: &BufferHandle,
        attribute: VertexAttribute,
    ) -> RenderResult<()> {
        self.validate(buffer, &attribute)?;

        self.bind();
        buffer.bind();
        self.gl.vertex_attrib_pointer(
            attribute.slot,
            attribute.components,
            attribute.component_type,
            attribute.normalized,
            attribute.stride,
            attribute.offset,
        );

        match self.attributes.insert(attribute.slot, (attribute, buffer.id())) {
            Some((previous, _)) => {
                log::debug!(
                    "Vertex array {}: slot {} relinked ({:?} -> {:?})",
                    self.id.0,
                    attribute.slot,
                    previous,
                    attribute
                );
            }
            None => self.gl.enable_vertex_attrib_array(attribute.slot),
        }
        Ok(())
    }

    /// Capture `buffer` as this layout's element buffer
    ///
    /// Leaves this layout bound; unbind the layout before unbinding the
    /// element buffer, or the capture is undone.
    pub fn attach_index_buffer(&mut self, buffer: &BufferHandle) -> RenderResult<()> {
        if buffer.target() != BufferTarget::ElementArray {
            return Err(RenderError::BufferTargetMismatch {
                expected: BufferTarget::ElementArray,
                actual: buffer.target(),
            });
        }
        self.bind();
        buffer.bind();
        self.index_buffer = Some(buffer.id());
        Ok(())
    }

    /// Attribute recorded at `slot`
    pub fn attribute(&self, slot: u32) -> Option<&VertexAttribute> {
        self.attributes.get(&slot).map(|(attribute, _)| attribute)
    }

    /// Buffer that feeds the attribute at `slot`
    pub fn attribute_source(&self, slot: u32) -> Option<BufferId> {
        self.attributes.get(&slot).map(|(_, buffer)| *buffer)
    }

    /// All recorded attributes in slot order
    pub fn attributes(&self) -> impl Iterator<Item = &VertexAttribute> + '_ {
        self.attributes.values().map(|(attribute, _)| attribute)
    }

    /// Element buffer captured by [`Self::attach_index_buffer`]
    pub const fn index_buffer(&self) -> Option<BufferId> {
        self.index_buffer
    }

    /// Make this the active vertex array
    pub fn bind(&self) {
        self.gl.bind_vertex_array(Some(self.id));
    }

    /// Clear the active vertex array
    pub fn unbind(&self) {
        self.gl.bind_vertex_array(None);
    }

    /// GPU name of the vertex array
    pub const fn id(&self) -> VertexArrayId {
        self.id
    }

    pub(crate) const fn gl(&self) -> &Gl {
        &self.gl
    }

    fn validate(&self, buffer: &BufferHandle, attribute: &VertexAttribute) -> RenderResult<()> {
        let invalid = |reason: String| RenderError::InvalidAttribute {
            slot: attribute.slot,
            reason,
        };

        if buffer.target() != BufferTarget::Array {
            return Err(RenderError::BufferTargetMismatch {
                expected: BufferTarget::Array,
                actual: buffer.target(),
            });
        }
        if !(1..=4).contains(&attribute.components) {
            return Err(invalid(format!(
                "component count {} is outside 1..=4",
                attribute.components
            )));
        }
        let max_slots = self.gl.max_vertex_attribs();
        if attribute.slot >= max_slots {
            return Err(invalid(format!("driver supports {max_slots} slots")));
        }
        if attribute.stride == 0 {
            return Err(invalid("stride must be non-zero for interleaved data".to_string()));
        }
        match attribute.offset.checked_add(attribute.size_bytes()) {
            Some(end) if end <= attribute.stride => {}
            Some(end) => {
                return Err(invalid(format!(
                    "attribute ends at byte {end} past the {}-byte stride",
                    attribute.stride
                )));
            }
            None => {
                return Err(invalid(format!(
                    "offset {} overflows the attribute end",
                    attribute.offset
                )));
            }
        }
        Ok(())
    }
}

impl Drop for VertexLayout {
    fn drop(&mut self) {
        log::trace!("Deleting vertex array {}", self.id.0);
        self.gl.delete_vertex_array(self.id);
    }
}

impl std::fmt::Debug for VertexLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VertexLayout")
            .field("id", &self.id)
            .field("attributes", &self.attributes)
            .field("index_buffer", &self.index_buffer)
            .finish()
    }
}
