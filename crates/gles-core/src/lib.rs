//! Driver abstraction and shared vocabulary for the OpenGL ES helpers.
//!
//! - [`GlDriver`] is the raw driver call surface. [`GlesDriver`] implements it
//!   over the `gl` crate for the context current on the calling thread.
//! - [`types`] holds binding targets, object names, viewports and versions.
//! - [`errors::check_error`] drains `glGetError` into an [`anyhow::Error`].
//! - [`logging::init`] installs a `tracing` subscriber.
//!
//! With the `recording` feature, [`recording::RecordingDriver`] provides a
//! headless driver that records every call, for tests.

pub mod driver;
pub mod errors;
mod gl_backend;
pub mod logging;
#[cfg(any(test, feature = "recording"))]
pub mod recording;
pub mod types;

pub use driver::{GlDriver, StringName};
pub use errors::{check_error, error_string, ErrorCode};
pub use gl_backend::GlesDriver;
pub use types::{
    BindingTarget, BufferTarget, GlVersion, ObjectId, TextureTarget, TextureUnit, Viewport,
    TEXTURE_EXTERNAL_OES, UNBOUND,
};
