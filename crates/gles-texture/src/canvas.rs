//! Texture whose contents are drawn with the platform's 2D canvas API.
//!
//! The platform hands canvas output to GL through an image stream bound to a
//! `GL_TEXTURE_EXTERNAL_OES` texture (on Android a `SurfaceTexture` wrapped
//! in a `Surface`). That plumbing is expressed by [`SurfaceFactory`] and
//! [`CanvasSurface`].

use anyhow::{bail, Context, Result};
use gles_core::{GlDriver, ObjectId, TextureTarget, TextureUnit};
use gles_state::GlState;

use crate::texture::Texture;

/// A producer surface feeding an external texture.
pub trait CanvasSurface {
    /// The platform's 2D drawing handle.
    type Canvas;

    fn lock_canvas(&mut self) -> Result<Self::Canvas>;

    /// Hand the drawn frame to the image stream.
    fn unlock_canvas_and_post(&mut self, canvas: Self::Canvas) -> Result<()>;

    /// Latch the most recent frame into the external texture. Must run on the
    /// GL thread.
    fn update_tex_image(&mut self) -> Result<()>;

    fn release(&mut self);
}

/// Creates [`CanvasSurface`]s attached to a texture name.
pub trait SurfaceFactory {
    type Surface: CanvasSurface;

    fn create_surface(
        &mut self,
        texture: ObjectId,
        width: u32,
        height: u32,
    ) -> Result<Self::Surface>;
}

/// The canvas type handed out by `F`'s surfaces.
pub type CanvasOf<F> = <<F as SurfaceFactory>::Surface as CanvasSurface>::Canvas;

/// An external texture drawn through a canvas.
///
/// One drawing session is open at a time: [`CanvasTexture::begin_drawing`]
/// hands out a canvas, [`CanvasTexture::end_drawing`] posts it into the
/// texture and releases the surface.
pub struct CanvasTexture<F: SurfaceFactory> {
    texture: Texture,
    factory: F,
    surface: Option<F::Surface>,
}

impl<F: SurfaceFactory> CanvasTexture<F> {
    /// Allocate the external texture with linear filtering and edge clamping.
    pub fn new<D: GlDriver>(state: &mut GlState<D>, factory: F) -> Self {
        let mut texture = Texture::with_target(state, TextureTarget::External);
        let target = TextureTarget::External.gl_enum();

        texture.bind(state, 0);
        let driver = state.driver_mut();
        driver.tex_parameter(target, gl::TEXTURE_MIN_FILTER, gl::LINEAR as i32);
        driver.tex_parameter(target, gl::TEXTURE_MAG_FILTER, gl::LINEAR as i32);
        driver.tex_parameter(target, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as i32);
        driver.tex_parameter(target, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as i32);
        texture.unbind(state);

        Self {
            texture,
            factory,
            surface: None,
        }
    }

    pub fn name(&self) -> ObjectId {
        self.texture.name()
    }

    pub fn is_drawing(&self) -> bool {
        self.surface.is_some()
    }

    /// Bind to `unit`, unbinding from any previous unit first.
    pub fn bind<D: GlDriver>(&mut self, state: &mut GlState<D>, unit: TextureUnit) -> bool {
        self.texture.unbind(state);
        self.texture.bind(state, unit)
    }

    pub fn unbind<D: GlDriver>(&mut self, state: &mut GlState<D>) -> bool {
        self.texture.unbind(state)
    }

    /// Open a drawing session on a `width` x `height` buffer.
    pub fn begin_drawing(&mut self, width: u32, height: u32) -> Result<CanvasOf<F>> {
        if self.surface.is_some() {
            bail!("Drawing context already open, call end_drawing(canvas) to end.");
        }

        let mut surface = self
            .factory
            .create_surface(self.texture.name(), width, height)
            .context("creating canvas surface")?;
        let canvas = match surface.lock_canvas() {
            Ok(canvas) => canvas,
            Err(err) => {
                surface.release();
                return Err(err.context("locking canvas"));
            }
        };
        self.surface = Some(surface);
        Ok(canvas)
    }

    /// Post `canvas` into the texture and close the drawing session.
    ///
    /// The surface is released even if posting fails.
    pub fn end_drawing<D: GlDriver>(
        &mut self,
        state: &mut GlState<D>,
        canvas: CanvasOf<F>,
    ) -> Result<()> {
        let mut surface = self
            .surface
            .take()
            .context("no drawing session open, call begin_drawing first")?;

        let posted = surface
            .unlock_canvas_and_post(canvas)
            .and_then(|()| surface.update_tex_image());
        self.texture.unbind(state);
        surface.release();
        posted
    }

    /// Run `body` against a fresh canvas and post the result.
    pub fn draw<D: GlDriver>(
        &mut self,
        state: &mut GlState<D>,
        width: u32,
        height: u32,
        body: impl FnOnce(&mut CanvasOf<F>),
    ) -> Result<()> {
        let mut canvas = self.begin_drawing(width, height)?;
        body(&mut canvas);
        self.end_drawing(state, canvas)
    }

    /// Abandon any open drawing session.
    pub fn release(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            surface.release();
        }
    }

    pub fn destroy<D: GlDriver>(mut self, state: &mut GlState<D>) {
        self.release();
        self.texture.destroy(state);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use gles_core::recording::{Call, RecordingDriver};
    use gles_core::{TEXTURE_EXTERNAL_OES, UNBOUND};

    use super::*;

    #[derive(Default)]
    struct Events(RefCell<Vec<String>>);

    impl Events {
        fn push(&self, event: impl Into<String>) {
            self.0.borrow_mut().push(event.into());
        }
    }

    struct FakeSurface {
        events: Rc<Events>,
    }

    impl CanvasSurface for FakeSurface {
        type Canvas = Vec<&'static str>;

        fn lock_canvas(&mut self) -> Result<Self::Canvas> {
            self.events.push("lock");
            Ok(Vec::new())
        }

        fn unlock_canvas_and_post(&mut self, canvas: Self::Canvas) -> Result<()> {
            self.events.push(format!("post {}", canvas.join(",")));
            Ok(())
        }

        fn update_tex_image(&mut self) -> Result<()> {
            self.events.push("update");
            Ok(())
        }

        fn release(&mut self) {
            self.events.push("release");
        }
    }

    struct FakeFactory {
        events: Rc<Events>,
    }

    impl SurfaceFactory for FakeFactory {
        type Surface = FakeSurface;

        fn create_surface(&mut self, texture: ObjectId, width: u32, height: u32) -> Result<FakeSurface> {
            self.events.push(format!("create {texture} {width}x{height}"));
            Ok(FakeSurface {
                events: self.events.clone(),
            })
        }
    }

    fn canvas_texture() -> (GlState<RecordingDriver>, CanvasTexture<FakeFactory>, Rc<Events>) {
        let mut state = GlState::new(RecordingDriver::new());
        let events = Rc::new(Events::default());
        let texture = CanvasTexture::new(
            &mut state,
            FakeFactory {
                events: events.clone(),
            },
        );
        (state, texture, events)
    }

    #[test]
    fn configures_external_texture() {
        let (state, texture, _) = canvas_texture();
        let name = texture.name();
        assert_eq!(
            state.driver().mutations(),
            vec![
                Call::GenTexture(name),
                Call::ActiveTexture(0),
                Call::BindTexture(TEXTURE_EXTERNAL_OES, name),
                Call::TexParameter(TEXTURE_EXTERNAL_OES, gl::TEXTURE_MIN_FILTER, gl::LINEAR as i32),
                Call::TexParameter(TEXTURE_EXTERNAL_OES, gl::TEXTURE_MAG_FILTER, gl::LINEAR as i32),
                Call::TexParameter(
                    TEXTURE_EXTERNAL_OES,
                    gl::TEXTURE_WRAP_S,
                    gl::CLAMP_TO_EDGE as i32
                ),
                Call::TexParameter(
                    TEXTURE_EXTERNAL_OES,
                    gl::TEXTURE_WRAP_T,
                    gl::CLAMP_TO_EDGE as i32
                ),
                Call::BindTexture(TEXTURE_EXTERNAL_OES, UNBOUND),
            ]
        );
    }

    #[test]
    fn draw_posts_and_releases() {
        let (mut state, mut texture, events) = canvas_texture();
        let name = texture.name();
        texture
            .draw(&mut state, 64, 32, |canvas| canvas.push("circle"))
            .unwrap();

        assert_eq!(
            *events.0.borrow(),
            vec![
                format!("create {name} 64x32"),
                "lock".to_owned(),
                "post circle".to_owned(),
                "update".to_owned(),
                "release".to_owned(),
            ]
        );
        assert!(!texture.is_drawing());
    }

    #[test]
    fn only_one_session_at_a_time() {
        let (mut state, mut texture, _) = canvas_texture();
        let canvas = texture.begin_drawing(8, 8).unwrap();
        assert!(texture.is_drawing());

        let err = texture.begin_drawing(8, 8).unwrap_err();
        assert!(err.to_string().contains("already open"));

        texture.end_drawing(&mut state, canvas).unwrap();
        assert!(texture.begin_drawing(8, 8).is_ok());
    }

    #[test]
    fn end_without_begin_fails() {
        let (mut state, mut texture, _) = canvas_texture();
        assert!(texture.end_drawing(&mut state, Vec::new()).is_err());
    }

    #[test]
    fn bind_moves_between_units() {
        let (mut state, mut texture, _) = canvas_texture();
        let name = texture.name();
        state.driver().clear_calls();

        texture.bind(&mut state, 1);
        texture.bind(&mut state, 2);

        assert_eq!(
            state.driver().mutations(),
            vec![
                Call::ActiveTexture(1),
                Call::BindTexture(TEXTURE_EXTERNAL_OES, name),
                Call::BindTexture(TEXTURE_EXTERNAL_OES, UNBOUND),
                Call::ActiveTexture(2),
                Call::BindTexture(TEXTURE_EXTERNAL_OES, name),
            ]
        );
    }
}
