//! Math types

pub use nalgebra::Vector4;

/// 4D vector type, used for uniforms and colors
pub type Vec4 = Vector4<f32>;

/// Color of the pulsing uniform at `seconds` since start
///
/// Green oscillates between 0 and 1 with a period of 2π seconds.
pub fn pulse_color(seconds: f32) -> Vec4 {
    let green = seconds.sin() / 2.0 + 0.5;
    Vec4::new(0.0, green, 0.0, 1.0)
}
