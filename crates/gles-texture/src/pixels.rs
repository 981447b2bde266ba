//! A 2D texture uploaded from client-side RGBA8 pixels.

use anyhow::{bail, ensure, Result};
use gles_core::{error_string, GlDriver, ObjectId, TextureUnit};
use gles_state::GlState;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use tracing::{debug, warn};

use crate::sampler::{Filter, Wrap};
use crate::texture::Texture;

/// Uploads tried before giving up on `GL_OUT_OF_MEMORY`.
pub const MAX_UPLOAD_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelTextureOptions {
    /// Used for both minification and magnification.
    pub filter: Filter,
    pub wrap: Wrap,
    /// Generate a mipmap chain after the upload.
    pub mipmap: bool,
}

impl Default for PixelTextureOptions {
    /// Linear, clamped to edge, mipmapped.
    fn default() -> Self {
        Self {
            filter: Filter::Linear,
            wrap: Wrap::ClampToEdge,
            mipmap: true,
        }
    }
}

/// A texture holding a copy of an image.
///
/// The stored size can be smaller than the source image: uploads that run
/// out of driver memory are retried at half the size.
#[derive(Debug)]
pub struct PixelTexture {
    texture: Texture,
    width: u32,
    height: u32,
}

impl PixelTexture {
    /// Create a texture from `image`, leaving it bound on unit 0.
    ///
    /// On `GL_OUT_OF_MEMORY` the image is halved in each dimension and the
    /// upload retried, up to [`MAX_UPLOAD_ATTEMPTS`] uploads in total. Any
    /// other driver error fails immediately. The texture is deleted on
    /// failure.
    pub fn upload<D: GlDriver>(
        state: &mut GlState<D>,
        image: &RgbaImage,
        options: PixelTextureOptions,
    ) -> Result<Self> {
        let (width, height) = image.dimensions();
        ensure!(
            width > 0 && height > 0,
            "pixel texture needs a non-empty image, got {width}x{height}"
        );

        let mut texture = Texture::new(state);
        texture.bind(state, 0);
        {
            let filter = options.filter.gl_enum() as i32;
            let wrap = options.wrap.gl_enum() as i32;
            let driver = state.driver_mut();
            driver.tex_parameter(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, filter);
            driver.tex_parameter(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, filter);
            driver.tex_parameter(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, wrap);
            driver.tex_parameter(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, wrap);
        }

        match upload_with_backoff(state, image, options.mipmap) {
            Ok((width, height)) => {
                debug!(name = texture.name(), width, height, ?options, "pixel texture created");
                Ok(Self {
                    texture,
                    width,
                    height,
                })
            }
            Err(err) => {
                texture.destroy(state);
                Err(err)
            }
        }
    }

    pub fn name(&self) -> ObjectId {
        self.texture.name()
    }

    /// Width of the uploaded image, after any back-off.
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bind<D: GlDriver>(&mut self, state: &mut GlState<D>, unit: TextureUnit) -> bool {
        self.texture.bind(state, unit)
    }

    pub fn unbind<D: GlDriver>(&mut self, state: &mut GlState<D>) -> bool {
        self.texture.unbind(state)
    }

    pub fn destroy<D: GlDriver>(self, state: &mut GlState<D>) {
        self.texture.destroy(state);
    }
}

/// Upload `image` into the texture bound on the active unit, returning the
/// size that fit.
fn upload_with_backoff<D: GlDriver>(
    state: &mut GlState<D>,
    image: &RgbaImage,
    mipmap: bool,
) -> Result<(u32, u32)> {
    let mut scaled: Option<RgbaImage> = None;

    for attempt in 1..=MAX_UPLOAD_ATTEMPTS {
        let current = scaled.as_ref().unwrap_or(image);
        let (width, height) = current.dimensions();

        let driver = state.driver_mut();
        driver.tex_image_2d_pixels(
            gl::TEXTURE_2D,
            gl::RGBA,
            width as i32,
            height as i32,
            gl::RGBA,
            gl::UNSIGNED_BYTE,
            current.as_raw(),
        );
        if mipmap {
            driver.generate_mipmap(gl::TEXTURE_2D);
        }

        match state.driver().get_error() {
            gl::NO_ERROR => return Ok((width, height)),
            gl::OUT_OF_MEMORY => {
                warn!(attempt, width, height, "Out of memory uploading pixels");
                let (half_width, half_height) = (width / 2, height / 2);
                if attempt == MAX_UPLOAD_ATTEMPTS || half_width == 0 || half_height == 0 {
                    break;
                }
                scaled = Some(imageops::resize(
                    current,
                    half_width,
                    half_height,
                    FilterType::Triangle,
                ));
            }
            code => bail!(
                "GL Error [{}]: glTexImage2D(GL_TEXTURE_2D, 0, GL_RGBA, {width}, {height})",
                error_string(code)
            ),
        }
    }

    bail!(
        "out of memory uploading {}x{} pixels, gave up after halving",
        image.width(),
        image.height()
    )
}
