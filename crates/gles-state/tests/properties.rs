//! End-to-end behaviour of the binding cache against a recording driver.

use std::cell::Cell;
use std::rc::Rc;

use anyhow::{bail, Result};
use gles_core::recording::{Call, RecordingDriver};
use gles_core::{BindingTarget, TextureTarget, Viewport, TEXTURE_EXTERNAL_OES};
use gles_state::{GlState, ResetListener};

fn texture_binds(state: &GlState<RecordingDriver>) -> usize {
    state
        .driver()
        .count(|c| matches!(c, Call::BindTexture(..)))
}

fn counting_listener(counter: &Rc<Cell<u32>>) -> Rc<dyn ResetListener> {
    let counter = counter.clone();
    Rc::new(move || -> Result<()> {
        counter.set(counter.get() + 1);
        Ok(())
    })
}

#[test]
fn identical_texture_binds_issue_one_call() {
    let mut state = GlState::new(RecordingDriver::new());
    for _ in 0..5 {
        state.bind_texture(1, TextureTarget::Texture2D, 42);
    }
    assert_eq!(texture_binds(&state), 1);
}

#[test]
fn quirky_driver_rebinds_external_textures_every_time() {
    let mut state = GlState::new(RecordingDriver::new().with_renderer(Some("Mali-T628")));
    assert!(state.driver_quirks().external_texture_needs_rebind);

    for _ in 0..4 {
        state.bind_texture(0, TextureTarget::External, 3);
    }
    assert_eq!(
        state
            .driver()
            .count(|c| *c == Call::BindTexture(TEXTURE_EXTERNAL_OES, 3)),
        4
    );
    assert_eq!(
        state.bound(BindingTarget::Texture {
            target: TextureTarget::External,
            unit: 0
        }),
        Some(3)
    );
}

#[test]
fn reset_clears_every_binding() {
    let mut state = GlState::new(RecordingDriver::new());
    state.use_program(1);
    state.bind_framebuffer(2);
    state.bind_array_buffer(3);
    state.bind_element_array_buffer(4);
    state.bind_vertex_array(5);
    state.bind_texture(6, TextureTarget::Texture2D, 7);
    state.set_blend(true, true);
    state.set_attribute_enabled(0, true);
    state.set_viewport(Viewport::new(0, 0, 10, 10));

    state.reset();

    assert_eq!(state.bound(BindingTarget::Program), None);
    assert_eq!(state.bound(BindingTarget::Framebuffer), None);
    assert_eq!(state.bound(BindingTarget::VertexArray), None);
    assert_eq!(
        state.bound(BindingTarget::Texture {
            target: TextureTarget::Texture2D,
            unit: 6
        }),
        None
    );
    assert_eq!(state.active_texture_unit(), None);
    assert_eq!(state.blend_enabled(), None);
    assert_eq!(state.attribute_enabled(0), None);

    // Every bind is issued again.
    state.driver().clear_calls();
    assert!(state.use_program(1));
    assert!(state.bind_framebuffer(2));
    assert!(state.bind_array_buffer(3));
    assert!(state.bind_element_array_buffer(4));
    assert!(state.bind_vertex_array(5));
    assert!(state.bind_texture(6, TextureTarget::Texture2D, 7));
    assert!(state.set_blend(true, true));
    assert!(state.set_attribute_enabled(0, true));
}

#[test]
fn viewport_is_requeried_after_reset() {
    let mut state = GlState::new(RecordingDriver::new());
    state.set_viewport(Viewport::new(0, 0, 100, 100));
    assert_eq!(state.viewport(), Viewport::new(0, 0, 100, 100));
    assert_eq!(state.driver().count(|c| *c == Call::GetViewport), 0);

    state.reset();
    state
        .driver_mut()
        .set_driver_viewport(Viewport::new(0, 0, 720, 1280));

    assert_eq!(state.viewport(), Viewport::new(0, 0, 720, 1280));
    assert_eq!(state.driver().count(|c| *c == Call::GetViewport), 1);
}

#[test]
fn listener_runs_once_per_reset() {
    let mut state = GlState::new(RecordingDriver::new());
    let counter = Rc::new(Cell::new(0));
    let listener = counting_listener(&counter);

    assert!(state.add_reset_listener(listener.clone()));
    state.reset();
    assert_eq!(counter.get(), 1);

    assert!(!state.add_reset_listener(listener.clone()));
    state.reset();
    assert_eq!(counter.get(), 2);

    assert!(state.remove_reset_listener(&listener));
    state.reset();
    assert_eq!(counter.get(), 2);

    // Removing a non-member is a no-op.
    assert!(!state.remove_reset_listener(&listener));
}

#[test]
fn failing_listener_does_not_stop_reset() {
    let mut state = GlState::new(RecordingDriver::new());
    let counter = Rc::new(Cell::new(0));

    state.add_reset_listener(Rc::new(|| -> Result<()> { bail!("listener broke") }));
    state.add_reset_listener(counting_listener(&counter));
    state.bind_framebuffer(9);

    assert_eq!(state.reset(), 1);
    assert_eq!(counter.get(), 1);
    assert_eq!(state.bound(BindingTarget::Framebuffer), None);
}

#[test]
fn texture_bind_selects_unit_even_when_skipped() {
    let mut state = GlState::new(RecordingDriver::new());
    state.bind_texture(3, TextureTarget::Texture2D, 5);
    state.set_active_texture_unit(0);

    assert!(!state.bind_texture(3, TextureTarget::Texture2D, 5));
    assert_eq!(state.active_texture_unit(), Some(3));
    assert_eq!(
        state.driver().calls().last(),
        Some(&Call::ActiveTexture(3))
    );
}

#[test]
fn viewport_is_never_deduplicated() {
    let mut state = GlState::new(RecordingDriver::new());
    assert!(state.set_viewport(Viewport::new(0, 0, 100, 100)));
    assert!(state.set_viewport(Viewport::new(0, 0, 100, 100)));
    assert_eq!(
        state
            .driver()
            .count(|c| *c == Call::Viewport(Viewport::new(0, 0, 100, 100))),
        2
    );
}

#[test]
fn bind_bind_rebind_issues_two_calls() {
    let mut state = GlState::new(RecordingDriver::new());
    assert!(state.bind_texture(0, TextureTarget::Texture2D, 7));
    assert!(!state.bind_texture(0, TextureTarget::Texture2D, 7));
    assert!(state.bind_texture(0, TextureTarget::Texture2D, 9));

    assert_eq!(
        state
            .driver()
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::BindTexture(..)))
            .collect::<Vec<_>>(),
        vec![
            Call::BindTexture(gl::TEXTURE_2D, 7),
            Call::BindTexture(gl::TEXTURE_2D, 9),
        ]
    );
}
