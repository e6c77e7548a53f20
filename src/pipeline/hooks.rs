//! Setup/teardown hooks around element runs.
//!
//! Hooks are attached to a registered element and fire immediately before
//! and after its `run`. Teardown fires even when the run failed, so a hook
//! can always release what its setup acquired.

use crate::pipeline::error::ElementError;

pub trait Hook: Send {
    fn setup(&mut self) -> Result<(), ElementError> {
        Ok(())
    }

    fn teardown(&mut self) -> Result<(), ElementError> {
        Ok(())
    }
}

type HookFn = fn() -> Result<(), ElementError>;

fn noop() -> Result<(), ElementError> {
    Ok(())
}

/// Hook built from two closures.
pub struct FnHook<S, T> {
    setup: S,
    teardown: T,
}

impl<S, T> FnHook<S, T>
where
    S: FnMut() -> Result<(), ElementError> + Send,
    T: FnMut() -> Result<(), ElementError> + Send,
{
    pub fn new(setup: S, teardown: T) -> Self {
        Self { setup, teardown }
    }
}

impl<S> FnHook<S, HookFn>
where
    S: FnMut() -> Result<(), ElementError> + Send,
{
    pub fn setup_only(setup: S) -> Self {
        Self {
            setup,
            teardown: noop,
        }
    }
}

impl<T> FnHook<HookFn, T>
where
    T: FnMut() -> Result<(), ElementError> + Send,
{
    pub fn teardown_only(teardown: T) -> Self {
        Self {
            setup: noop,
            teardown,
        }
    }
}

impl<S, T> Hook for FnHook<S, T>
where
    S: FnMut() -> Result<(), ElementError> + Send,
    T: FnMut() -> Result<(), ElementError> + Send,
{
    fn setup(&mut self) -> Result<(), ElementError> {
        (self.setup)()
    }

    fn teardown(&mut self) -> Result<(), ElementError> {
        (self.teardown)()
    }
}
