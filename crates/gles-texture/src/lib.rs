//! Texture helpers built on the [`gles_state::GlState`] binding cache.
//!
//! - [`Texture`]: a plain texture name bound through the cache.
//! - [`PixelTexture`]: a texture uploaded from an RGBA8 image.
//! - [`Sampler`]: sampling parameters bound per unit.
//! - [`CanvasTexture`]: an external texture fed by the platform's 2D canvas.
//! - [`WritableTexture`]: a texture with its own framebuffer for
//!   render-to-texture and pixel read-back.
//! - [`Renderer`]: the strategy used to draw a full-screen pass, selected
//!   with [`RendererKind`].

pub mod canvas;
pub mod format;
pub mod pixels;
pub mod renderer;
pub mod sampler;
pub mod texture;
pub mod writable;

pub use canvas::{CanvasSurface, CanvasTexture, SurfaceFactory};
pub use format::InternalFormat;
pub use pixels::{PixelTexture, PixelTextureOptions, MAX_UPLOAD_ATTEMPTS};
pub use renderer::{QuadRenderer, Renderer, RendererKind};
pub use sampler::{Filter, Sampler, SamplerOptions, Wrap};
pub use texture::Texture;
pub use writable::{WritableTexture, WritableTextureOptions};
