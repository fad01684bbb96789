//! In-memory graphics backend
//!
//! `HeadlessGl` follows OpenGL object and binding semantics closely enough
//! for the sandbox: names are allocated per object kind, element buffer
//! bindings are captured by the bound vertex array, draws are validated
//! against the current program and vertex array, and misuse raises GL error
//! codes instead of panicking. Shader "compilation" is a structural check of
//! the GLSL text (version directive, balanced delimiters, a `main` entry
//! point) and linking matches fragment inputs against vertex outputs.

use super::{
    BufferId, BufferTarget, ComponentType, GraphicsApi, IndexType, PrimitiveMode, ProgramId,
    ShaderId, ShaderStage, UniformLocation, UsageHint, VertexArrayId,
};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::num::NonZeroU32;

const GL_INVALID_VALUE: u32 = 0x0501;
const GL_INVALID_OPERATION: u32 = 0x0502;

const DEFAULT_MAX_VERTEX_ATTRIBS: u32 = 16;

/// One recorded draw, with its vertex stream already resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawCall {
    /// Assembly mode
    pub mode: PrimitiveMode,
    /// Program current at draw time
    pub program: ProgramId,
    /// Vertex array bound at draw time
    pub vertex_array: VertexArrayId,
    /// Vertex indices fed to the pipeline, in submission order
    pub vertices: Vec<u32>,
    /// Whether the draw went through an element buffer
    pub indexed: bool,
}

impl DrawCall {
    /// Number of complete primitives assembled by this draw
    pub fn primitive_count(&self) -> u32 {
        self.mode.primitive_count(self.vertices.len() as u32)
    }

    /// Distinct vertices referenced by this draw, ascending
    pub fn distinct_vertices(&self) -> Vec<u32> {
        let mut distinct = self.vertices.clone();
        distinct.sort_unstable();
        distinct.dedup();
        distinct
    }
}

/// Driver-side record of one vertex attribute slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeState {
    /// Buffer the attribute reads from
    pub buffer: BufferId,
    /// Components per vertex
    pub components: u8,
    /// Component scalar type
    pub component_type: ComponentType,
    /// Whether integer data is normalized
    pub normalized: bool,
    /// Byte distance between consecutive vertices
    pub stride: u32,
    /// Byte offset of the first component
    pub offset: u32,
    /// Whether the slot is enabled
    pub enabled: bool,
}

#[derive(Debug, Default)]
struct BufferState {
    data: Vec<u8>,
    usage: UsageHint,
}

#[derive(Debug, Default)]
struct VertexArrayState {
    element_buffer: Option<BufferId>,
    attributes: BTreeMap<u32, AttributeState>,
}

#[derive(Debug)]
struct ShaderState {
    stage: ShaderStage,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug, Default)]
struct ProgramState {
    attached: Vec<(ShaderStage, bool, String)>,
    linked: bool,
    log: String,
    uniforms: Vec<String>,
    uniform_values: HashMap<u32, [f32; 4]>,
}

#[derive(Debug)]
struct State {
    next_buffer: u32,
    next_vertex_array: u32,
    next_shader: u32,
    next_program: u32,
    buffers: HashMap<BufferId, BufferState>,
    vertex_arrays: HashMap<VertexArrayId, VertexArrayState>,
    shaders: HashMap<ShaderId, ShaderState>,
    programs: HashMap<ProgramId, ProgramState>,
    array_buffer: Option<BufferId>,
    // Used only while no vertex array is bound
    loose_element_buffer: Option<BufferId>,
    vertex_array: Option<VertexArrayId>,
    program: Option<ProgramId>,
    viewport: [i32; 4],
    clear_color: [f32; 4],
    clears: u64,
    draws: Vec<DrawCall>,
    errors: VecDeque<u32>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            next_buffer: 1,
            next_vertex_array: 1,
            next_shader: 1,
            next_program: 1,
            buffers: HashMap::new(),
            vertex_arrays: HashMap::new(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
            array_buffer: None,
            loose_element_buffer: None,
            vertex_array: None,
            program: None,
            viewport: [0; 4],
            clear_color: [0.0; 4],
            clears: 0,
            draws: Vec::new(),
            errors: VecDeque::new(),
        }
    }
}

impl State {
    fn raise(&mut self, code: u32) {
        log::trace!("headless GL error 0x{code:04X}");
        self.errors.push_back(code);
    }

    fn element_buffer(&self) -> Option<BufferId> {
        match self.vertex_array {
            Some(vertex_array) => self
                .vertex_arrays
                .get(&vertex_array)
                .and_then(|state| state.element_buffer),
            None => self.loose_element_buffer,
        }
    }

    fn bound(&self, target: BufferTarget) -> Option<BufferId> {
        match target {
            BufferTarget::Array => self.array_buffer,
            BufferTarget::ElementArray => self.element_buffer(),
        }
    }

    fn draw_target(&mut self) -> Option<(ProgramId, VertexArrayId)> {
        let program = self
            .program
            .filter(|program| self.programs.get(program).is_some_and(|state| state.linked));
        match (program, self.vertex_array) {
            (Some(program), Some(vertex_array)) => Some((program, vertex_array)),
            _ => {
                self.raise(GL_INVALID_OPERATION);
                None
            }
        }
    }
}

/// Software stand-in for an OpenGL context
#[derive(Debug)]
pub struct HeadlessGl {
    state: RefCell<State>,
    max_vertex_attribs: u32,
    fail_allocations: Cell<bool>,
}

impl Default for HeadlessGl {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessGl {
    /// Create an empty context
    pub fn new() -> Self {
        Self::with_max_vertex_attribs(DEFAULT_MAX_VERTEX_ATTRIBS)
    }

    /// Create a context reporting a specific attribute slot limit
    pub fn with_max_vertex_attribs(max_vertex_attribs: u32) -> Self {
        Self {
            state: RefCell::new(State::default()),
            max_vertex_attribs,
            fail_allocations: Cell::new(false),
        }
    }

    /// Make every subsequent object allocation fail, as an out-of-memory driver would
    pub fn set_fail_allocations(&self, fail: bool) {
        self.fail_allocations.set(fail);
    }

    /// Live buffer objects
    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    /// Live vertex array objects
    pub fn live_vertex_arrays(&self) -> usize {
        self.state.borrow().vertex_arrays.len()
    }

    /// Live shader stage objects
    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    /// Live program objects
    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    /// Every live GL object of any kind
    pub fn live_objects(&self) -> usize {
        self.live_buffers() + self.live_vertex_arrays() + self.live_shaders() + self.live_programs()
    }

    /// Contents last uploaded to `buffer`
    pub fn buffer_contents(&self, buffer: BufferId) -> Option<Vec<u8>> {
        self.state
            .borrow()
            .buffers
            .get(&buffer)
            .map(|state| state.data.clone())
    }

    /// Usage hint of the last upload to `buffer`
    pub fn buffer_usage(&self, buffer: BufferId) -> Option<UsageHint> {
        self.state.borrow().buffers.get(&buffer).map(|state| state.usage)
    }

    /// Driver-side attribute record of `vertex_array` at `slot`
    pub fn attribute_state(
        &self,
        vertex_array: VertexArrayId,
        slot: u32,
    ) -> Option<AttributeState> {
        self.state
            .borrow()
            .vertex_arrays
            .get(&vertex_array)
            .and_then(|state| state.attributes.get(&slot).copied())
    }

    /// Element buffer captured by `vertex_array`
    pub fn element_buffer_of(&self, vertex_array: VertexArrayId) -> Option<BufferId> {
        self.state
            .borrow()
            .vertex_arrays
            .get(&vertex_array)
            .and_then(|state| state.element_buffer)
    }

    /// Last value uploaded to the uniform `name` of `program`
    pub fn uniform_value(&self, program: ProgramId, name: &str) -> Option<[f32; 4]> {
        let state = self.state.borrow();
        let program = state.programs.get(&program)?;
        let location = program.uniforms.iter().position(|uniform| uniform == name)?;
        program.uniform_values.get(&(location as u32)).copied()
    }

    /// Current viewport as `[x, y, width, height]`
    pub fn current_viewport(&self) -> [i32; 4] {
        self.state.borrow().viewport
    }

    /// Current clear color
    pub fn current_clear_color(&self) -> [f32; 4] {
        self.state.borrow().clear_color
    }

    /// Number of color buffer clears so far
    pub fn clear_count(&self) -> u64 {
        self.state.borrow().clears
    }

    /// Draw calls accepted so far
    pub fn draw_calls(&self) -> Vec<DrawCall> {
        self.state.borrow().draws.clone()
    }

    /// Forget recorded draws and clears
    pub fn reset_frame_record(&self) {
        let mut state = self.state.borrow_mut();
        state.draws.clear();
        state.clears = 0;
    }

    fn allocation_failed(&self, kind: &str) -> Option<String> {
        self.fail_allocations
            .get()
            .then(|| format!("out of memory allocating {kind}"))
    }
}

fn next_name(counter: &mut u32) -> NonZeroU32 {
    let name = NonZeroU32::new(*counter).unwrap_or(NonZeroU32::MIN);
    *counter = counter.wrapping_add(1).max(1);
    name
}

/// Names declared with `qualifier` (`in`, `out`, `uniform`) at global scope
fn declarations(source: &str, qualifier: &str) -> Vec<String> {
    source
        .lines()
        .filter_map(|line| {
            let mut line = line.trim();
            if line.starts_with("layout") {
                line = line.split_once(')').map_or("", |(_, rest)| rest.trim());
            }
            let mut tokens = line.split_whitespace();
            if tokens.next() != Some(qualifier) {
                return None;
            }
            let _ty = tokens.next()?;
            let name = tokens.next()?.trim_end_matches(';');
            let name = name.split('[').next().unwrap_or(name);
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

fn compile_source(source: &str) -> Result<(), String> {
    let first = source
        .lines()
        .enumerate()
        .find(|(_, line)| !line.trim().is_empty());
    match first {
        Some((_, line)) if line.trim_start().starts_with("#version") => {}
        Some((index, _)) => {
            return Err(format!("0:{}(1): error: missing #version directive", index + 1))
        }
        None => return Err("0:1(1): error: empty shader source".to_string()),
    }

    let mut stack: Vec<(char, usize)> = Vec::new();
    for (index, line) in source.lines().enumerate() {
        let code = line.split("//").next().unwrap_or_default();
        for ch in code.chars() {
            match ch {
                '{' | '(' => stack.push((ch, index + 1)),
                '}' | ')' => {
                    let expected = if ch == '}' { '{' } else { '(' };
                    match stack.pop() {
                        Some((open, _)) if open == expected => {}
                        _ => {
                            return Err(format!(
                                "0:{}(1): error: syntax error, unexpected '{ch}'",
                                index + 1
                            ))
                        }
                    }
                }
                _ => {}
            }
        }
    }
    if let Some((open, line)) = stack.pop() {
        return Err(format!(
            "0:{line}(1): error: syntax error, unmatched '{open}' at end of file"
        ));
    }

    let has_main = source.lines().any(|line| {
        let mut tokens = line.split_whitespace();
        tokens.next() == Some("void") && tokens.next().is_some_and(|name| name.starts_with("main"))
    });
    if !has_main {
        return Err("0:1(1): error: no definition of main()".to_string());
    }
    Ok(())
}

fn link_sources(attached: &[(ShaderStage, bool, String)]) -> Result<Vec<String>, String> {
    let stage_source = |stage: ShaderStage| -> Result<&str, String> {
        let (_, compiled, source) = attached
            .iter()
            .find(|(attached_stage, _, _)| *attached_stage == stage)
            .ok_or_else(|| format!("error: program lacks a {stage} shader"))?;
        if !compiled {
            return Err(format!("error: {stage} shader is not compiled"));
        }
        Ok(source)
    };
    let vertex = stage_source(ShaderStage::Vertex)?;
    let fragment = stage_source(ShaderStage::Fragment)?;

    let outputs = declarations(vertex, "out");
    if let Some(missing) = declarations(fragment, "in")
        .into_iter()
        .find(|input| !outputs.contains(input))
    {
        return Err(format!(
            "error: fragment shader input `{missing}` has no matching vertex shader output"
        ));
    }

    let mut uniforms = declarations(vertex, "uniform");
    for uniform in declarations(fragment, "uniform") {
        if !uniforms.contains(&uniform) {
            uniforms.push(uniform);
        }
    }
    Ok(uniforms)
}

fn decode_indices(data: &[u8], index_type: IndexType, offset: u32, count: u32) -> Option<Vec<u32>> {
    let size = index_type.size_bytes() as usize;
    let start = offset as usize;
    let end = start.checked_add(size.checked_mul(count as usize)?)?;
    let bytes = data.get(start..end)?;
    Some(
        bytes
            .chunks_exact(size)
            .map(|chunk| match index_type {
                IndexType::UnsignedByte => u32::from(chunk[0]),
                IndexType::UnsignedShort => u32::from(u16::from_ne_bytes([chunk[0], chunk[1]])),
                IndexType::UnsignedInt => {
                    u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])
                }
            })
            .collect(),
    )
}

impl GraphicsApi for HeadlessGl {
    fn version_string(&self) -> String {
        "4.6 (Core Profile) headless".to_string()
    }

    fn max_vertex_attribs(&self) -> u32 {
        self.max_vertex_attribs
    }

    fn take_error(&self) -> Option<u32> {
        self.state.borrow_mut().errors.pop_front()
    }

    fn create_buffer(&self) -> Result<BufferId, String> {
        if let Some(reason) = self.allocation_failed("buffer") {
            return Err(reason);
        }
        let mut state = self.state.borrow_mut();
        let id = BufferId(next_name(&mut state.next_buffer));
        state.buffers.insert(id, BufferState::default());
        Ok(id)
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>) {
        let mut state = self.state.borrow_mut();
        if buffer.is_some_and(|id| !state.buffers.contains_key(&id)) {
            state.raise(GL_INVALID_OPERATION);
            return;
        }
        match target {
            BufferTarget::Array => state.array_buffer = buffer,
            BufferTarget::ElementArray => match state.vertex_array {
                Some(vertex_array) => {
                    if let Some(vertex_array) = state.vertex_arrays.get_mut(&vertex_array) {
                        vertex_array.element_buffer = buffer;
                    }
                }
                None => state.loose_element_buffer = buffer,
            },
        }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: UsageHint) {
        let mut state = self.state.borrow_mut();
        let Some(id) = state.bound(target) else {
            state.raise(GL_INVALID_OPERATION);
            return;
        };
        if let Some(buffer) = state.buffers.get_mut(&id) {
            buffer.data = data.to_vec();
            buffer.usage = usage;
        }
    }

    fn delete_buffer(&self, buffer: BufferId) {
        let mut state = self.state.borrow_mut();
        if state.buffers.remove(&buffer).is_none() {
            return;
        }
        if state.array_buffer == Some(buffer) {
            state.array_buffer = None;
        }
        if state.loose_element_buffer == Some(buffer) {
            state.loose_element_buffer = None;
        }
        for vertex_array in state.vertex_arrays.values_mut() {
            if vertex_array.element_buffer == Some(buffer) {
                vertex_array.element_buffer = None;
            }
        }
    }

    fn bound_buffer(&self, target: BufferTarget) -> Option<BufferId> {
        self.state.borrow().bound(target)
    }

    fn create_vertex_array(&self) -> Result<VertexArrayId, String> {
        if let Some(reason) = self.allocation_failed("vertex array") {
            return Err(reason);
        }
        let mut state = self.state.borrow_mut();
        let id = VertexArrayId(next_name(&mut state.next_vertex_array));
        state.vertex_arrays.insert(id, VertexArrayState::default());
        Ok(id)
    }

    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayId>) {
        let mut state = self.state.borrow_mut();
        if vertex_array.is_some_and(|id| !state.vertex_arrays.contains_key(&id)) {
            state.raise(GL_INVALID_OPERATION);
            return;
        }
        state.vertex_array = vertex_array;
    }

    fn delete_vertex_array(&self, vertex_array: VertexArrayId) {
        let mut state = self.state.borrow_mut();
        if state.vertex_arrays.remove(&vertex_array).is_some()
            && state.vertex_array == Some(vertex_array)
        {
            state.vertex_array = None;
        }
    }

    fn bound_vertex_array(&self) -> Option<VertexArrayId> {
        self.state.borrow().vertex_array
    }

    fn vertex_attrib_pointer(
        &self,
        slot: u32,
        components: u8,
        component_type: ComponentType,
        normalized: bool,
        stride: u32,
        offset: u32,
    ) {
        let mut state = self.state.borrow_mut();
        if slot >= self.max_vertex_attribs || !(1..=4).contains(&components) {
            state.raise(GL_INVALID_VALUE);
            return;
        }
        let (Some(vertex_array), Some(buffer)) = (state.vertex_array, state.array_buffer) else {
            state.raise(GL_INVALID_OPERATION);
            return;
        };
        if let Some(vertex_array) = state.vertex_arrays.get_mut(&vertex_array) {
            let enabled = vertex_array
                .attributes
                .get(&slot)
                .is_some_and(|attribute| attribute.enabled);
            vertex_array.attributes.insert(
                slot,
                AttributeState {
                    buffer,
                    components,
                    component_type,
                    normalized,
                    stride,
                    offset,
                    enabled,
                },
            );
        }
    }

    fn enable_vertex_attrib_array(&self, slot: u32) {
        let mut state = self.state.borrow_mut();
        let Some(vertex_array) = state.vertex_array else {
            state.raise(GL_INVALID_OPERATION);
            return;
        };
        let attribute = state
            .vertex_arrays
            .get_mut(&vertex_array)
            .and_then(|vertex_array| vertex_array.attributes.get_mut(&slot));
        match attribute {
            Some(attribute) => attribute.enabled = true,
            None => state.raise(GL_INVALID_VALUE),
        }
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderId, String> {
        if let Some(reason) = self.allocation_failed("shader") {
            return Err(reason);
        }
        let mut state = self.state.borrow_mut();
        let id = ShaderId(next_name(&mut state.next_shader));
        state.shaders.insert(
            id,
            ShaderState {
                stage,
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        Ok(id)
    }

    fn shader_source(&self, shader: ShaderId, source: &str) {
        let mut state = self.state.borrow_mut();
        match state.shaders.get_mut(&shader) {
            Some(shader) => shader.source = source.to_string(),
            None => state.raise(GL_INVALID_VALUE),
        }
    }

    fn compile_shader(&self, shader: ShaderId) {
        let mut state = self.state.borrow_mut();
        let Some(shader) = state.shaders.get_mut(&shader) else {
            state.raise(GL_INVALID_VALUE);
            return;
        };
        match compile_source(&shader.source) {
            Ok(()) => {
                shader.compiled = true;
                shader.log.clear();
            }
            Err(log) => {
                shader.compiled = false;
                shader.log = log;
            }
        }
    }

    fn shader_compile_status(&self, shader: ShaderId) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .is_some_and(|shader| shader.compiled)
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|shader| shader.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: ShaderId) {
        self.state.borrow_mut().shaders.remove(&shader);
    }

    fn create_program(&self) -> Result<ProgramId, String> {
        if let Some(reason) = self.allocation_failed("program") {
            return Err(reason);
        }
        let mut state = self.state.borrow_mut();
        let id = ProgramId(next_name(&mut state.next_program));
        state.programs.insert(id, ProgramState::default());
        Ok(id)
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        let mut state = self.state.borrow_mut();
        let Some(attachment) = state
            .shaders
            .get(&shader)
            .map(|shader| (shader.stage, shader.compiled, shader.source.clone()))
        else {
            state.raise(GL_INVALID_VALUE);
            return;
        };
        match state.programs.get_mut(&program) {
            Some(program) => program.attached.push(attachment),
            None => state.raise(GL_INVALID_VALUE),
        }
    }

    fn link_program(&self, program: ProgramId) {
        let mut state = self.state.borrow_mut();
        let Some(program) = state.programs.get_mut(&program) else {
            state.raise(GL_INVALID_VALUE);
            return;
        };
        match link_sources(&program.attached) {
            Ok(uniforms) => {
                program.linked = true;
                program.log.clear();
                program.uniforms = uniforms;
                program.uniform_values.clear();
            }
            Err(log) => {
                program.linked = false;
                program.log = log;
                program.uniforms.clear();
            }
        }
    }

    fn program_link_status(&self, program: ProgramId) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .is_some_and(|program| program.linked)
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|program| program.log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&self, program: ProgramId) {
        let mut state = self.state.borrow_mut();
        if state.programs.remove(&program).is_some() && state.program == Some(program) {
            state.program = None;
        }
    }

    fn use_program(&self, program: Option<ProgramId>) {
        let mut state = self.state.borrow_mut();
        if let Some(id) = program {
            if !state.programs.get(&id).is_some_and(|program| program.linked) {
                state.raise(GL_INVALID_OPERATION);
                return;
            }
        }
        state.program = program;
    }

    fn current_program(&self) -> Option<ProgramId> {
        self.state.borrow().program
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .and_then(|program| program.uniforms.iter().position(|uniform| uniform == name))
            .map(|location| UniformLocation(location as u32))
    }

    fn uniform_4f(&self, location: UniformLocation, value: [f32; 4]) {
        let mut state = self.state.borrow_mut();
        let Some(current) = state.program else {
            state.raise(GL_INVALID_OPERATION);
            return;
        };
        let Some(program) = state.programs.get_mut(&current) else {
            state.raise(GL_INVALID_OPERATION);
            return;
        };
        if (location.0 as usize) < program.uniforms.len() {
            program.uniform_values.insert(location.0, value);
        } else {
            state.raise(GL_INVALID_OPERATION);
        }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        let mut state = self.state.borrow_mut();
        if width < 0 || height < 0 {
            state.raise(GL_INVALID_VALUE);
            return;
        }
        state.viewport = [x, y, width, height];
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        self.state.borrow_mut().clear_color = rgba.map(|channel| channel.clamp(0.0, 1.0));
    }

    fn clear_color_buffer(&self) {
        self.state.borrow_mut().clears += 1;
    }

    fn draw_arrays(&self, mode: PrimitiveMode, first: u32, count: u32) {
        let mut state = self.state.borrow_mut();
        let Some((program, vertex_array)) = state.draw_target() else {
            return;
        };
        let Some(end) = first.checked_add(count) else {
            state.raise(GL_INVALID_VALUE);
            return;
        };
        state.draws.push(DrawCall {
            mode,
            program,
            vertex_array,
            vertices: (first..end).collect(),
            indexed: false,
        });
    }

    fn draw_elements(&self, mode: PrimitiveMode, count: u32, index_type: IndexType, offset: u32) {
        let mut state = self.state.borrow_mut();
        let Some((program, vertex_array)) = state.draw_target() else {
            return;
        };
        let indices = state
            .element_buffer()
            .and_then(|buffer| state.buffers.get(&buffer))
            .and_then(|buffer| decode_indices(&buffer.data, index_type, offset, count));
        match indices {
            Some(vertices) => state.draws.push(DrawCall {
                mode,
                program,
                vertex_array,
                vertices,
                indexed: true,
            }),
            None => state.raise(GL_INVALID_OPERATION),
        }
    }
}
