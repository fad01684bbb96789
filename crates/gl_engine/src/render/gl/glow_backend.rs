//! OpenGL backend built on `glow`
//!
//! This is the only module that issues raw driver calls.

#![allow(unsafe_code)]

use super::{
    BufferId, BufferTarget, ComponentType, GraphicsApi, IndexType, PrimitiveMode, ProgramId,
    ShaderId, ShaderStage, UniformLocation, UsageHint, VertexArrayId,
};
use glow::HasContext;
use std::ffi::c_void;
use std::num::NonZeroU32;

/// Real OpenGL context driven through `glow`
pub struct GlowBackend {
    gl: glow::Context,
}

impl GlowBackend {
    /// Load GL function pointers through `loader`
    ///
    /// Fails when the core entry points cannot be resolved, which is how a
    /// missing or broken driver shows up.
    ///
    /// # Safety
    /// A GL context must be current on the calling thread, and `loader` must
    /// return pointers valid for that context.
    pub unsafe fn load<F>(mut loader: F) -> Result<Self, String>
    where
        F: FnMut(&str) -> *const c_void,
    {
        for symbol in ["glGetString", "glCreateShader", "glGenVertexArrays"] {
            if loader(symbol).is_null() {
                return Err(format!("entry point {symbol} is not available"));
            }
        }

        let gl = glow::Context::from_loader_function(loader);
        Ok(Self { gl })
    }

    /// Context version as reported by the driver
    pub fn version(&self) -> (u32, u32) {
        let version = self.gl.version();
        (version.major, version.minor)
    }

    fn query_name(&self, parameter: u32) -> Option<NonZeroU32> {
        let raw = unsafe { self.gl.get_parameter_i32(parameter) };
        NonZeroU32::new(raw as u32)
    }
}

const fn buffer_target(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => glow::ARRAY_BUFFER,
        BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
    }
}

const fn buffer_binding_query(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => glow::ARRAY_BUFFER_BINDING,
        BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER_BINDING,
    }
}

const fn usage_hint(usage: UsageHint) -> u32 {
    match usage {
        UsageHint::StaticDraw => glow::STATIC_DRAW,
        UsageHint::DynamicDraw => glow::DYNAMIC_DRAW,
        UsageHint::StreamDraw => glow::STREAM_DRAW,
    }
}

const fn component_type(ty: ComponentType) -> u32 {
    match ty {
        ComponentType::Float => glow::FLOAT,
        ComponentType::Int => glow::INT,
        ComponentType::UnsignedInt => glow::UNSIGNED_INT,
        ComponentType::Short => glow::SHORT,
        ComponentType::UnsignedShort => glow::UNSIGNED_SHORT,
        ComponentType::Byte => glow::BYTE,
        ComponentType::UnsignedByte => glow::UNSIGNED_BYTE,
    }
}

const fn shader_stage(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

const fn primitive_mode(mode: PrimitiveMode) -> u32 {
    match mode {
        PrimitiveMode::Points => glow::POINTS,
        PrimitiveMode::Lines => glow::LINES,
        PrimitiveMode::Triangles => glow::TRIANGLES,
        PrimitiveMode::TriangleStrip => glow::TRIANGLE_STRIP,
    }
}

const fn index_type(ty: IndexType) -> u32 {
    match ty {
        IndexType::UnsignedByte => glow::UNSIGNED_BYTE,
        IndexType::UnsignedShort => glow::UNSIGNED_SHORT,
        IndexType::UnsignedInt => glow::UNSIGNED_INT,
    }
}

const fn native_buffer(id: BufferId) -> glow::NativeBuffer {
    glow::NativeBuffer(id.0)
}

const fn native_vertex_array(id: VertexArrayId) -> glow::NativeVertexArray {
    glow::NativeVertexArray(id.0)
}

const fn native_shader(id: ShaderId) -> glow::NativeShader {
    glow::NativeShader(id.0)
}

const fn native_program(id: ProgramId) -> glow::NativeProgram {
    glow::NativeProgram(id.0)
}

impl GraphicsApi for GlowBackend {
    fn version_string(&self) -> String {
        unsafe { self.gl.get_parameter_string(glow::VERSION) }
    }

    fn max_vertex_attribs(&self) -> u32 {
        let max = unsafe { self.gl.get_parameter_i32(glow::MAX_VERTEX_ATTRIBS) };
        max.max(0) as u32
    }

    fn take_error(&self) -> Option<u32> {
        match unsafe { self.gl.get_error() } {
            glow::NO_ERROR => None,
            code => Some(code),
        }
    }

    fn create_buffer(&self) -> Result<BufferId, String> {
        let buffer = unsafe { self.gl.create_buffer()? };
        Ok(BufferId(buffer.0))
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>) {
        unsafe {
            self.gl
                .bind_buffer(buffer_target(target), buffer.map(native_buffer));
        }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: UsageHint) {
        unsafe {
            self.gl
                .buffer_data_u8_slice(buffer_target(target), data, usage_hint(usage));
        }
    }

    fn delete_buffer(&self, buffer: BufferId) {
        unsafe { self.gl.delete_buffer(native_buffer(buffer)) }
    }

    fn bound_buffer(&self, target: BufferTarget) -> Option<BufferId> {
        self.query_name(buffer_binding_query(target)).map(BufferId)
    }

    fn create_vertex_array(&self) -> Result<VertexArrayId, String> {
        let vertex_array = unsafe { self.gl.create_vertex_array()? };
        Ok(VertexArrayId(vertex_array.0))
    }

    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayId>) {
        unsafe {
            self.gl
                .bind_vertex_array(vertex_array.map(native_vertex_array));
        }
    }

    fn delete_vertex_array(&self, vertex_array: VertexArrayId) {
        unsafe { self.gl.delete_vertex_array(native_vertex_array(vertex_array)) }
    }

    fn bound_vertex_array(&self) -> Option<VertexArrayId> {
        self.query_name(glow::VERTEX_ARRAY_BINDING).map(VertexArrayId)
    }

    fn vertex_attrib_pointer(
        &self,
        slot: u32,
        components: u8,
        ty: ComponentType,
        normalized: bool,
        stride: u32,
        offset: u32,
    ) {
        unsafe {
            self.gl.vertex_attrib_pointer_f32(
                slot,
                i32::from(components),
                component_type(ty),
                normalized,
                stride as i32,
                offset as i32,
            );
        }
    }

    fn enable_vertex_attrib_array(&self, slot: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(slot) }
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderId, String> {
        let shader = unsafe { self.gl.create_shader(shader_stage(stage))? };
        Ok(ShaderId(shader.0))
    }

    fn shader_source(&self, shader: ShaderId, source: &str) {
        unsafe { self.gl.shader_source(native_shader(shader), source) }
    }

    fn compile_shader(&self, shader: ShaderId) {
        unsafe { self.gl.compile_shader(native_shader(shader)) }
    }

    fn shader_compile_status(&self, shader: ShaderId) -> bool {
        unsafe { self.gl.get_shader_compile_status(native_shader(shader)) }
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        unsafe { self.gl.get_shader_info_log(native_shader(shader)) }
    }

    fn delete_shader(&self, shader: ShaderId) {
        unsafe { self.gl.delete_shader(native_shader(shader)) }
    }

    fn create_program(&self) -> Result<ProgramId, String> {
        let program = unsafe { self.gl.create_program()? };
        Ok(ProgramId(program.0))
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        unsafe {
            self.gl
                .attach_shader(native_program(program), native_shader(shader));
        }
    }

    fn link_program(&self, program: ProgramId) {
        unsafe { self.gl.link_program(native_program(program)) }
    }

    fn program_link_status(&self, program: ProgramId) -> bool {
        unsafe { self.gl.get_program_link_status(native_program(program)) }
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        unsafe { self.gl.get_program_info_log(native_program(program)) }
    }

    fn delete_program(&self, program: ProgramId) {
        unsafe { self.gl.delete_program(native_program(program)) }
    }

    fn use_program(&self, program: Option<ProgramId>) {
        unsafe { self.gl.use_program(program.map(native_program)) }
    }

    fn current_program(&self) -> Option<ProgramId> {
        self.query_name(glow::CURRENT_PROGRAM).map(ProgramId)
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        unsafe {
            self.gl
                .get_uniform_location(native_program(program), name)
                .map(|location| UniformLocation(location.0))
        }
    }

    fn uniform_4f(&self, location: UniformLocation, value: [f32; 4]) {
        let location = glow::NativeUniformLocation(location.0);
        unsafe {
            self.gl
                .uniform_4_f32(Some(&location), value[0], value[1], value[2], value[3]);
        }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) }
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        unsafe { self.gl.clear_color(rgba[0], rgba[1], rgba[2], rgba[3]) }
    }

    fn clear_color_buffer(&self) {
        unsafe { self.gl.clear(glow::COLOR_BUFFER_BIT) }
    }

    fn draw_arrays(&self, mode: PrimitiveMode, first: u32, count: u32) {
        unsafe {
            self.gl
                .draw_arrays(primitive_mode(mode), first as i32, count as i32);
        }
    }

    fn draw_elements(&self, mode: PrimitiveMode, count: u32, ty: IndexType, offset: u32) {
        unsafe {
            self.gl.draw_elements(
                primitive_mode(mode),
                count as i32,
                index_type(ty),
                offset as i32,
            );
        }
    }
}
