use folio_types::{ContextPin, HighlightContext};
use uuid::Uuid;

/// Excerpts the user has pinned for the next outgoing message
///
/// Pins are not tied to a thread: they survive thread switches and are
/// cleared only when a send completes successfully.
#[derive(Debug, Default)]
pub struct ContextPinStore {
    pins: Vec<ContextPin>,
}

impl ContextPinStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, text: impl Into<String>, page: u32) -> ContextPin {
        let pin = ContextPin::new(text, page);
        self.pins.push(pin.clone());
        pin
    }

    pub fn remove(&mut self, id: Uuid) -> Option<ContextPin> {
        let index = self.pins.iter().position(|p| p.id == id)?;
        Some(self.pins.remove(index))
    }

    pub fn list(&self) -> &[ContextPin] {
        &self.pins
    }

    /// Drop every pin, returning how many there were
    pub fn clear(&mut self) -> usize {
        let count = self.pins.len();
        self.pins.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Pins in insertion order, as sent alongside a query
    pub fn highlight_contexts(&self) -> Vec<HighlightContext> {
        self.pins.iter().map(HighlightContext::from).collect()
    }
}
