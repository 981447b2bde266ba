//! Binding-state cache for an OpenGL ES context.
//!
//! [`GlState`] remembers the last value written to each tracked binding point
//! (program, active texture unit, textures per unit, framebuffer, buffers,
//! vertex array, blending, vertex attribute arrays, viewport) and skips driver
//! calls that wouldn't change anything. Call [`GlState::reset`] when the
//! context is lost; collaborators holding their own per-context caches, such
//! as [`ProgramRegistry`], register a [`ResetListener`] to be dropped with it.
//!
//! ### Threading
//!
//! A `GlState` belongs to the thread that owns its GL context. It is neither
//! `Send` nor `Sync`.

mod listeners;
pub mod programs;
mod quirks;
mod state;

pub use listeners::ResetListener;
pub use programs::ProgramRegistry;
pub use quirks::DriverQuirks;
pub use state::GlState;
