//! Named table of linked shader programs that is dropped on context loss.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::{anyhow, Context, Result};
use gles_core::{GlDriver, ObjectId};

use crate::listeners::ResetListener;
use crate::state::GlState;

/// Program object names by name.
///
/// Program names die with their context, so the registry registers itself as
/// a reset listener and forgets every entry when the state cache is reset.
#[derive(Debug, Default)]
pub struct ProgramRegistry {
    programs: RefCell<HashMap<String, ObjectId>>,
}

impl ProgramRegistry {
    /// Create a registry tied to `state`'s resets.
    pub fn attached<D: GlDriver>(state: &mut GlState<D>) -> Rc<Self> {
        let registry = Rc::new(Self::default());
        state.add_reset_listener(registry.clone());
        registry
    }

    /// Record a linked program, returning the name it replaced.
    pub fn insert(&self, name: impl Into<String>, program: ObjectId) -> Option<ObjectId> {
        self.programs.borrow_mut().insert(name.into(), program)
    }

    pub fn get(&self, name: &str) -> Option<ObjectId> {
        self.programs.borrow().get(name).copied()
    }

    pub fn remove(&self, name: &str) -> Option<ObjectId> {
        self.programs.borrow_mut().remove(name)
    }

    pub fn len(&self) -> usize {
        self.programs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.borrow().is_empty()
    }

    /// Make the program registered as `name` current through the cache.
    ///
    /// Returns whether `glUseProgram` was issued.
    pub fn use_program<D: GlDriver>(&self, state: &mut GlState<D>, name: &str) -> Result<bool> {
        let program = self
            .get(name)
            .with_context(|| format!("no program registered as {name:?}"))?;
        Ok(state.use_program(program))
    }
}

impl ResetListener for ProgramRegistry {
    fn on_reset(&self) -> Result<()> {
        let mut programs = self
            .programs
            .try_borrow_mut()
            .map_err(|_| anyhow!("program table is borrowed during reset"))?;
        tracing::debug!(count = programs.len(), "dropping cached programs");
        programs.clear();
        Ok(())
    }
}
