//! Rendering errors

use crate::render::gl::{BufferTarget, ShaderStage};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while creating or configuring GPU resources
#[derive(Error, Debug)]
pub enum RenderError {
    /// A shader source file could not be read
    #[error("failed to read shader file {}: {source}", path.display())]
    Io {
        /// File that was being read
        path: PathBuf,
        /// Underlying IO failure
        #[source]
        source: std::io::Error,
    },

    /// The driver rejected a shader stage
    #[error("{stage} shader failed to compile:\n{log}")]
    Compile {
        /// Stage that failed
        stage: ShaderStage,
        /// Compiler diagnostics
        log: String,
    },

    /// The driver could not link the compiled stages
    #[error("shader program failed to link:\n{log}")]
    Link {
        /// Linker diagnostics
        log: String,
    },

    /// The driver could not allocate an object
    #[error("failed to create {kind}: {reason}")]
    ResourceCreation {
        /// Kind of GL object
        kind: &'static str,
        /// Driver-provided reason
        reason: String,
    },

    /// A buffer upload had no data
    #[error("refusing to upload an empty {target:?} buffer")]
    EmptyBuffer {
        /// Intended bind target
        target: BufferTarget,
    },

    /// A buffer was used at the wrong binding point
    #[error("expected a {expected:?} buffer, got a {actual:?} buffer")]
    BufferTargetMismatch {
        /// Required target
        expected: BufferTarget,
        /// Target the buffer was created for
        actual: BufferTarget,
    },

    /// A vertex attribute description was rejected
    #[error("invalid vertex attribute at slot {slot}: {reason}")]
    InvalidAttribute {
        /// Attribute slot
        slot: u32,
        /// What was wrong
        reason: String,
    },

    /// Mesh data violates its invariants
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
