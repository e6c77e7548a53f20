//! Element arena.
//!
//! Elements live in a flat `Vec<ElementSlot>` indexed by `ElementId`. Flows
//! refer to elements by id only, so one element can take part in both the
//! client and the server flow of a job without shared ownership.

use crate::pipeline::element::Element;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::hooks::Hook;
use crate::pipeline::id::ElementId;

/// An element and the hooks wrapped around its runs.
pub struct ElementSlot {
    pub element: Box<dyn Element>,
    pub hooks: Vec<Box<dyn Hook>>,
}

impl std::fmt::Debug for ElementSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementSlot")
            .field("name", &self.element.name())
            .field("kind", &self.element.kind())
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    slots: Vec<ElementSlot>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an element. Its descriptors are frozen from here on.
    pub fn add(&mut self, element: impl Element + 'static) -> ElementId {
        self.add_boxed(Box::new(element))
    }

    pub fn add_boxed(&mut self, element: Box<dyn Element>) -> ElementId {
        let id = ElementId(self.slots.len() as u32);
        self.slots.push(ElementSlot {
            element,
            hooks: Vec::new(),
        });
        id
    }

    pub fn add_hook(&mut self, id: ElementId, hook: impl Hook + 'static) -> PipelineResult<()> {
        self.slot_mut(id)?.hooks.push(Box::new(hook));
        Ok(())
    }

    pub fn contains(&self, id: ElementId) -> bool {
        id.index() < self.slots.len()
    }

    pub fn get(&self, id: ElementId) -> PipelineResult<&dyn Element> {
        self.slots
            .get(id.index())
            .map(|slot| slot.element.as_ref())
            .ok_or(PipelineError::UnknownElement(id))
    }

    pub fn slot_mut(&mut self, id: ElementId) -> PipelineResult<&mut ElementSlot> {
        self.slots
            .get_mut(id.index())
            .ok_or(PipelineError::UnknownElement(id))
    }

    /// `Name#id`, used in logs and error messages.
    pub fn label(&self, id: ElementId) -> String {
        match self.slots.get(id.index()) {
            Some(slot) => format!("{}{}", slot.element.name(), id),
            None => format!("<unknown>{}", id),
        }
    }

    /// Reset the given elements' run-scoped state.
    pub fn reset(&mut self, ids: &[ElementId]) {
        for &id in ids {
            if let Some(slot) = self.slots.get_mut(id.index()) {
                slot.element.reset();
            }
        }
    }

    pub fn reset_all(&mut self) {
        for slot in &mut self.slots {
            slot.element.reset();
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = ElementId> {
        (0..self.slots.len() as u32).map(ElementId)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
