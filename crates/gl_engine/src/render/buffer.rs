//! GPU buffer ownership
//!
//! A `BufferHandle` owns exactly one buffer name from creation until drop.
//! It is not `Clone`: two owners would delete the same name.

use crate::render::error::{RenderError, RenderResult};
use crate::render::gl::{BufferId, BufferTarget, Gl, UsageHint};

/// Owned GPU buffer with its contents uploaded at construction
pub struct BufferHandle {
    gl: Gl,
    id: BufferId,
    target: BufferTarget,
    size_bytes: usize,
}

impl BufferHandle {
    /// Allocate a buffer for `target` and upload `data` into it
    ///
    /// The upload is synchronous, so `data` does not need to outlive the
    /// call. The buffer is left bound to `target`.
    pub fn new(gl: &Gl, target: BufferTarget, data: &[u8], usage: UsageHint) -> RenderResult<Self> {
        if data.is_empty() {
            return Err(RenderError::EmptyBuffer { target });
        }

        let id = gl
            .create_buffer()
            .map_err(|reason| RenderError::ResourceCreation { kind: "buffer", reason })?;

        // Owned before upload so a panic below still releases the name
        let buffer = Self {
            gl: gl.clone(),
            id,
            target,
            size_bytes: data.len(),
        };
        buffer.bind();
        gl.buffer_data(target, data, usage);

        log::debug!(
            "Created {:?} buffer {} ({} bytes, {:?})",
            target,
            id.0,
            data.len(),
            usage
        );
        Ok(buffer)
    }

    /// Create a vertex buffer from plain-old-data vertices
    pub fn vertex<T: bytemuck::Pod>(
        gl: &Gl,
        vertices: &[T],
        usage: UsageHint,
    ) -> RenderResult<Self> {
        Self::new(gl, BufferTarget::Array, bytemuck::cast_slice(vertices), usage)
    }

    /// Create an index buffer of 32-bit indices
    pub fn index(gl: &Gl, indices: &[u32], usage: UsageHint) -> RenderResult<Self> {
        Self::new(gl, BufferTarget::ElementArray, bytemuck::cast_slice(indices), usage)
    }

    /// Bind this buffer to its target
    pub fn bind(&self) {
        self.gl.bind_buffer(self.target, Some(self.id));
    }

    /// Clear the binding of this buffer's target
    pub fn unbind(&self) {
        self.gl.bind_buffer(self.target, None);
    }

    /// GPU name of the buffer
    pub const fn id(&self) -> BufferId {
        self.id
    }

    /// Binding point this buffer was created for
    pub const fn target(&self) -> BufferTarget {
        self.target
    }

    /// Size of the uploaded contents
    pub const fn size_bytes(&self) -> usize {
        self.size_bytes
    }
}

impl Drop for BufferHandle {
    fn drop(&mut self) {
        log::trace!("Deleting {:?} buffer {}", self.target, self.id.0);
        self.gl.delete_buffer(self.id);
    }
}

impl std::fmt::Debug for BufferHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferHandle")
            .field("id", &self.id)
            .field("target", &self.target)
            .field("size_bytes", &self.size_bytes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::gl::HeadlessGl;
    use std::rc::Rc;

    fn headless() -> (Rc<HeadlessGl>, Gl) {
        let headless = Rc::new(HeadlessGl::new());
        let gl: Gl = headless.clone();
        (headless, gl)
    }

    #[test]
    fn test_bind_makes_buffer_active() {
        let (_headless, gl) = headless();
        let vertices = [0.0f32, 1.0, 2.0];
        let buffer = BufferHandle::vertex(&gl, &vertices, UsageHint::StaticDraw).unwrap();

        buffer.unbind();
        assert_eq!(gl.bound_buffer(BufferTarget::Array), None);

        buffer.bind();
        assert_eq!(gl.bound_buffer(BufferTarget::Array), Some(buffer.id()));
        assert_eq!(buffer.size_bytes(), 12);
    }

    #[test]
    fn test_contents_uploaded_at_construction() {
        let (headless, gl) = headless();
        let buffer = BufferHandle::index(&gl, &[0, 1, 2], UsageHint::DynamicDraw).unwrap();

        let expected: Vec<u8> = [0u32, 1, 2].iter().flat_map(|i| i.to_ne_bytes()).collect();
        assert_eq!(headless.buffer_contents(buffer.id()), Some(expected));
        assert_eq!(headless.buffer_usage(buffer.id()), Some(UsageHint::DynamicDraw));
        assert_eq!(buffer.target(), BufferTarget::ElementArray);
    }

    #[test]
    fn test_drop_releases_name() {
        let (headless, gl) = headless();
        {
            let _buffer = BufferHandle::vertex(&gl, &[1.0f32], UsageHint::StaticDraw).unwrap();
            assert_eq!(headless.live_buffers(), 1);
        }
        assert_eq!(headless.live_buffers(), 0);
        assert_eq!(gl.bound_buffer(BufferTarget::Array), None);
    }

    #[test]
    fn test_allocation_failure_is_reported() {
        let (headless, gl) = headless();
        headless.set_fail_allocations(true);

        let result = BufferHandle::vertex(&gl, &[1.0f32], UsageHint::StaticDraw);
        assert!(matches!(
            result,
            Err(RenderError::ResourceCreation { kind: "buffer", .. })
        ));
        assert_eq!(headless.live_buffers(), 0);
    }

    #[test]
    fn test_empty_upload_rejected() {
        let (headless, gl) = headless();
        let result = BufferHandle::index(&gl, &[], UsageHint::StaticDraw);

        assert!(matches!(
            result,
            Err(RenderError::EmptyBuffer { target: BufferTarget::ElementArray })
        ));
        assert_eq!(headless.live_buffers(), 0);
    }
}
