use super::{ScriptedWindow, ShaderFixture};
use crate::config::RenderConfig;
use crate::render::gl::{GraphicsApi, HeadlessGl};
use crate::render::RenderError;
use crate::render_loop::{LoopState, RenderLoop};
use crate::window::{WindowBackend, WindowEvent};
use std::rc::Rc;

fn start(headless: &Rc<HeadlessGl>, config: &RenderConfig) -> RenderLoop<ScriptedWindow> {
    RenderLoop::setup(ScriptedWindow::new(headless.clone()), config).unwrap()
}

#[test]
fn test_setup_builds_scene_and_viewport() {
    let fixture = ShaderFixture::new("setup");
    let headless = Rc::new(HeadlessGl::new());
    let window = ScriptedWindow::new(headless.clone());

    let render_loop = RenderLoop::setup(window, &fixture.render_config()).unwrap();

    assert_eq!(render_loop.state(), LoopState::Setup);
    assert_eq!(render_loop.frames(), 0);
    assert_eq!(headless.current_viewport(), [0, 0, 800, 600]);
    // Two programs plus the mesh's layout and two buffers
    assert_eq!(headless.live_programs(), 2);
    assert_eq!(headless.live_shaders(), 0);
    assert_eq!(headless.live_objects(), 5);
    assert!(headless.draw_calls().is_empty());
}

#[test]
fn test_frame_draws_triangle_then_quad() {
    let fixture = ShaderFixture::new("frame");
    let headless = Rc::new(HeadlessGl::new());
    let config = fixture.render_config();
    let mut render_loop = start(&headless, &config);

    render_loop.frame().unwrap();

    assert_eq!(headless.clear_count(), 1);
    assert_eq!(headless.current_clear_color(), config.clear_color);

    let draws = headless.draw_calls();
    assert_eq!(draws.len(), 2);
    assert!(!draws[0].indexed);
    assert_eq!(draws[0].vertices, vec![0, 1, 2]);
    assert!(draws[1].indexed);
    assert_eq!(draws[1].primitive_count(), 2);
    assert_eq!(draws[1].distinct_vertices(), vec![0, 1, 2, 3]);
    assert_ne!(draws[0].program, draws[1].program);
    assert_eq!(draws[0].vertex_array, render_loop.mesh().layout().id());

    assert_eq!(render_loop.window().swaps(), 1);
    assert_eq!(headless.take_error(), None);
}

#[test]
fn test_pulse_uniform_uploaded_each_frame() {
    let fixture = ShaderFixture::new("pulse");
    let headless = Rc::new(HeadlessGl::new());
    let mut render_loop = start(&headless, &fixture.render_config());

    render_loop.frame().unwrap();

    let pulse_program = headless.draw_calls()[1].program;
    let color = headless.uniform_value(pulse_program, "ourColor").unwrap();
    assert_eq!(color[0], 0.0);
    assert!((0.0..=1.0).contains(&color[1]));
    assert_eq!(color[2], 0.0);
    assert_eq!(color[3], 1.0);
}

#[test]
fn test_without_pulse_program_primary_draws_both() {
    let fixture = ShaderFixture::new("no_pulse");
    let headless = Rc::new(HeadlessGl::new());
    let mut config = fixture.render_config();
    config.pulse = None;
    let mut render_loop = start(&headless, &config);

    render_loop.frame().unwrap();

    let draws = headless.draw_calls();
    assert_eq!(draws.len(), 2);
    assert_eq!(draws[0].program, draws[1].program);
    assert_eq!(headless.live_programs(), 1);
}

#[test]
fn test_escape_closes_within_one_frame() {
    let fixture = ShaderFixture::new("escape");
    let headless = Rc::new(HeadlessGl::new());
    let window = ScriptedWindow::new(headless.clone()).press_escape_at(3);
    let mut render_loop = RenderLoop::setup(window, &fixture.render_config()).unwrap();

    render_loop.run().unwrap();

    assert_eq!(render_loop.state(), LoopState::Terminated);
    assert_eq!(render_loop.frames(), 3);
    assert_eq!(render_loop.window().swaps(), 3);
    assert!(render_loop.window().should_close());
}

#[test]
fn test_close_request_ends_loop() {
    let fixture = ShaderFixture::new("close");
    let headless = Rc::new(HeadlessGl::new());
    let window = ScriptedWindow::new(headless.clone()).event_at(2, WindowEvent::CloseRequested);
    let mut render_loop = RenderLoop::setup(window, &fixture.render_config()).unwrap();

    render_loop.run().unwrap();
    assert_eq!(render_loop.frames(), 2);
}

#[test]
fn test_resize_updates_viewport() {
    let fixture = ShaderFixture::new("resize");
    let headless = Rc::new(HeadlessGl::new());
    let window = ScriptedWindow::new(headless.clone())
        .event_at(1, WindowEvent::FramebufferResized { width: 1024, height: 768 })
        .press_escape_at(2);
    let mut render_loop = RenderLoop::setup(window, &fixture.render_config()).unwrap();

    render_loop.frame().unwrap();
    assert_eq!(headless.current_viewport(), [0, 0, 1024, 768]);
    assert_eq!(render_loop.window().framebuffer_size(), (1024, 768));

    render_loop.run().unwrap();
    assert_eq!(render_loop.frames(), 2);
}

#[test]
fn test_dropping_loop_releases_gpu_objects() {
    let fixture = ShaderFixture::new("drop");
    let headless = Rc::new(HeadlessGl::new());
    let window = ScriptedWindow::new(headless.clone()).press_escape_at(1);
    let mut render_loop = RenderLoop::setup(window, &fixture.render_config()).unwrap();
    render_loop.run().unwrap();
    assert!(headless.live_objects() > 0);

    drop(render_loop);
    assert_eq!(headless.live_objects(), 0);
    assert_eq!(headless.current_program(), None);
    assert_eq!(headless.bound_vertex_array(), None);
}

#[test]
fn test_missing_shader_aborts_setup_without_leaks() {
    let fixture = ShaderFixture::new("missing");
    let headless = Rc::new(HeadlessGl::new());
    let mut config = fixture.render_config();
    config.shaders.vertex_path = fixture.path("absent.shader");

    let result = RenderLoop::setup(ScriptedWindow::new(headless.clone()), &config);

    assert!(matches!(result, Err(RenderError::Io { .. })));
    assert_eq!(headless.live_objects(), 0);
}

#[test]
fn test_broken_pulse_shader_releases_primary_program() {
    let fixture = ShaderFixture::new("broken_pulse");
    let unterminated = "#version 460 core\nvoid main() {";
    std::fs::write(fixture.path("fragmentUniform.shader"), unterminated).unwrap();
    let headless = Rc::new(HeadlessGl::new());

    let result = RenderLoop::setup(ScriptedWindow::new(headless.clone()), &fixture.render_config());

    assert!(matches!(result, Err(RenderError::Compile { .. })));
    assert_eq!(headless.live_objects(), 0);
}

#[test]
fn test_error_check_drains_driver_queue() {
    let fixture = ShaderFixture::new("drain");
    let headless = Rc::new(HeadlessGl::new());
    let mut config = fixture.render_config();
    config.check_gl_errors = true;
    let mut render_loop = start(&headless, &config);

    // Uniform upload with no program current raises an error
    headless.use_program(None);
    headless.uniform_4f(crate::render::gl::UniformLocation(0), [0.0; 4]);

    render_loop.frame().unwrap();
    assert_eq!(headless.take_error(), None);
}

#[test]
fn test_every_frame_repeats_the_same_draws() {
    let fixture = ShaderFixture::new("repeat");
    let headless = Rc::new(HeadlessGl::new());
    let mut render_loop = start(&headless, &fixture.render_config());

    render_loop.frame().unwrap();
    let first = headless.draw_calls();
    headless.reset_frame_record();

    render_loop.frame().unwrap();
    assert_eq!(headless.draw_calls(), first);
    assert_eq!(render_loop.frames(), 2);
}
