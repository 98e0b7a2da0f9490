//! Scoped service providers.
//!
//! Consumers never reach for global singletons: they are handed a
//! [`Providers`] bundle at construction and pull the services they need out
//! of it. A service nobody provided is an error at the call site.

use std::rc::Rc;

use halo_engine::input::PointerHub;
use halo_engine::time::FrameScheduler;
use thiserror::Error;

use crate::cursor::CursorState;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("`{context}` must be used within its provider")]
    MissingProvider { context: &'static str },
}

/// A named, optionally provided value.
#[derive(Clone)]
pub struct Context<T> {
    name: &'static str,
    value: Option<T>,
}

impl<T> Context<T> {
    pub fn provide(name: &'static str, value: T) -> Self {
        Self {
            name,
            value: Some(value),
        }
    }

    pub fn missing(name: &'static str) -> Self {
        Self { name, value: None }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_provided(&self) -> bool {
        self.value.is_some()
    }

    pub fn get(&self) -> Result<&T, ContextError> {
        self.value
            .as_ref()
            .ok_or(ContextError::MissingProvider { context: self.name })
    }
}

/// The services available to pointer consumers.
#[derive(Clone)]
pub struct Providers {
    pub pointer: Context<PointerHub>,
    pub cursor: Context<Rc<CursorState>>,
    pub scheduler: Context<FrameScheduler>,
}

impl Providers {
    pub const POINTER: &'static str = "PointerHub";
    pub const CURSOR: &'static str = "CursorState";
    pub const SCHEDULER: &'static str = "FrameScheduler";

    /// Nothing provided.
    pub fn empty() -> Self {
        Self {
            pointer: Context::missing(Self::POINTER),
            cursor: Context::missing(Self::CURSOR),
            scheduler: Context::missing(Self::SCHEDULER),
        }
    }

    pub fn with_pointer(mut self, hub: PointerHub) -> Self {
        self.pointer = Context::provide(Self::POINTER, hub);
        self
    }

    pub fn with_cursor(mut self, cursor: Rc<CursorState>) -> Self {
        self.cursor = Context::provide(Self::CURSOR, cursor);
        self
    }

    pub fn with_scheduler(mut self, scheduler: FrameScheduler) -> Self {
        self.scheduler = Context::provide(Self::SCHEDULER, scheduler);
        self
    }

    pub fn pointer(&self) -> Result<&PointerHub, ContextError> {
        self.pointer.get()
    }

    pub fn cursor(&self) -> Result<&Rc<CursorState>, ContextError> {
        self.cursor.get()
    }

    pub fn scheduler(&self) -> Result<&FrameScheduler, ContextError> {
        self.scheduler.get()
    }
}

impl Default for Providers {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_provider_names_the_context() {
        let providers = Providers::empty();

        let err = providers.pointer().err();
        assert_eq!(err, Some(ContextError::MissingProvider { context: "PointerHub" }));
        assert_eq!(
            ContextError::MissingProvider { context: "PointerHub" }.to_string(),
            "`PointerHub` must be used within its provider"
        );
    }

    #[test]
    fn provided_values_are_returned() {
        let providers = Providers::empty()
            .with_cursor(Rc::new(CursorState::new()))
            .with_scheduler(FrameScheduler::new());

        assert!(providers.cursor().is_ok());
        assert!(providers.scheduler().is_ok());
        assert!(providers.pointer().is_err());
        assert!(!providers.pointer.is_provided());
        assert_eq!(providers.pointer.name(), Providers::POINTER);
    }
}
