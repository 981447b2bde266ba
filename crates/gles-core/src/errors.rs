//! Draining and formatting the driver's error queue.

use anyhow::{anyhow, Result};
use gl::types::GLenum;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::driver::GlDriver;

/// Upper bound on codes pulled off the queue by one [`check_error`].
///
/// After a context loss some drivers report `GL_CONTEXT_LOST` forever.
const MAX_DRAINED_ERRORS: usize = 16;

/// Error codes returned by `glGetError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum ErrorCode {
    InvalidEnum = 0x0500,
    InvalidValue = 0x0501,
    InvalidOperation = 0x0502,
    StackOverflow = 0x0503,
    StackUnderflow = 0x0504,
    OutOfMemory = 0x0505,
    InvalidFramebufferOperation = 0x0506,
    ContextLost = 0x0507,
}

impl ErrorCode {
    pub fn name(self) -> &'static str {
        match self {
            ErrorCode::InvalidEnum => "GL_INVALID_ENUM",
            ErrorCode::InvalidValue => "GL_INVALID_VALUE",
            ErrorCode::InvalidOperation => "GL_INVALID_OPERATION",
            ErrorCode::StackOverflow => "GL_STACK_OVERFLOW",
            ErrorCode::StackUnderflow => "GL_STACK_UNDERFLOW",
            ErrorCode::OutOfMemory => "GL_OUT_OF_MEMORY",
            ErrorCode::InvalidFramebufferOperation => "GL_INVALID_FRAMEBUFFER_OPERATION",
            ErrorCode::ContextLost => "GL_CONTEXT_LOST",
        }
    }
}

/// Human readable name for a raw `glGetError` code.
pub fn error_string(code: GLenum) -> String {
    match ErrorCode::from_u32(code) {
        Some(known) => known.name().to_owned(),
        None => format!("Unknown 0x{code:x}"),
    }
}

/// Drain the driver's error queue and fail if anything was queued.
///
/// `name` identifies the call site and is only evaluated on failure. The
/// resulting message reads `GL Error [GL_INVALID_ENUM, GL_OUT_OF_MEMORY]: name`.
pub fn check_error<D, F>(driver: &D, name: F) -> Result<()>
where
    D: GlDriver + ?Sized,
    F: FnOnce() -> String,
{
    let mut errors = Vec::new();
    loop {
        let code = driver.get_error();
        if code == gl::NO_ERROR {
            break;
        }
        errors.push(error_string(code));
        if errors.len() >= MAX_DRAINED_ERRORS || code == ErrorCode::ContextLost as GLenum {
            break;
        }
    }

    if errors.is_empty() {
        return Ok(());
    }

    let err = anyhow!("GL Error [{}]: {}", errors.join(", "), name());
    tracing::error!("{err}");
    Err(err)
}
