//! Callbacks fired when the state cache is reset.

use std::rc::Rc;

use anyhow::Result;

/// Something holding its own per-context cache that must be dropped together
/// with the state cache.
///
/// Implemented for closures returning `anyhow::Result<()>`.
pub trait ResetListener {
    fn on_reset(&self) -> Result<()>;
}

impl<F> ResetListener for F
where
    F: Fn() -> Result<()>,
{
    fn on_reset(&self) -> Result<()> {
        self()
    }
}

/// Ordered set of listeners, keyed by `Rc` allocation.
#[derive(Default)]
pub(crate) struct ResetListeners {
    listeners: Vec<Rc<dyn ResetListener>>,
}

fn same_listener(a: &Rc<dyn ResetListener>, b: &Rc<dyn ResetListener>) -> bool {
    Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
}

impl ResetListeners {
    /// Returns false if `listener` was already registered.
    pub(crate) fn add(&mut self, listener: Rc<dyn ResetListener>) -> bool {
        if self.listeners.iter().any(|l| same_listener(l, &listener)) {
            return false;
        }
        self.listeners.push(listener);
        true
    }

    /// Returns false if `listener` was not registered.
    pub(crate) fn remove(&mut self, listener: &Rc<dyn ResetListener>) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| !same_listener(l, listener));
        self.listeners.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Run every listener in registration order and return how many failed.
    ///
    /// A failing listener is logged and does not stop the others.
    pub(crate) fn notify(&self) -> usize {
        let mut failures = 0;
        for (index, listener) in self.listeners.iter().enumerate() {
            if let Err(err) = listener.on_reset() {
                failures += 1;
                tracing::warn!(index, "reset listener failed: {err:#}");
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use anyhow::bail;

    use super::*;

    #[test]
    fn set_semantics_by_identity() {
        let mut listeners = ResetListeners::default();
        let a: Rc<dyn ResetListener> = Rc::new(|| -> Result<()> { Ok(()) });
        let b: Rc<dyn ResetListener> = Rc::new(|| -> Result<()> { Ok(()) });

        assert!(listeners.add(a.clone()));
        assert!(!listeners.add(a.clone()));
        assert!(listeners.add(b.clone()));
        assert_eq!(listeners.len(), 2);

        assert!(listeners.remove(&a));
        assert!(!listeners.remove(&a));
        assert_eq!(listeners.len(), 1);
    }

    #[test]
    fn runs_in_order_and_isolates_failures() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = ResetListeners::default();

        let l = log.clone();
        listeners.add(Rc::new(move || -> Result<()> {
            l.borrow_mut().push("first");
            bail!("boom")
        }));
        let l = log.clone();
        listeners.add(Rc::new(move || -> Result<()> {
            l.borrow_mut().push("second");
            Ok(())
        }));

        assert_eq!(listeners.notify(), 1);
        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }
}
