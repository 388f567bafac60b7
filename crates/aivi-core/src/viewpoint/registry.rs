//! Viewpoint catalogue with a cycling selection.

use super::model::Viewpoint;
use crate::error::{AiviError, Result};

/// A fixed catalogue of viewpoints and the index of the active one.
///
/// The catalogue is set once at startup. Only the selection moves.
#[derive(Debug, Clone)]
pub struct ViewpointRegistry {
    viewpoints: Vec<Viewpoint>,
    current: usize,
}

impl ViewpointRegistry {
    /// Creates a registry. The first non-hidden entry becomes active (the
    /// first entry when every one is hidden).
    ///
    /// # Errors
    ///
    /// Returns a `Config` error for an empty catalogue.
    pub fn new(viewpoints: Vec<Viewpoint>) -> Result<Self> {
        if viewpoints.is_empty() {
            return Err(AiviError::config("viewpoint catalogue is empty"));
        }
        let current = viewpoints.iter().position(|v| !v.hidden).unwrap_or(0);
        Ok(Self {
            viewpoints,
            current,
        })
    }

    /// The active viewpoint.
    pub fn current(&self) -> &Viewpoint {
        &self.viewpoints[self.current]
    }

    /// Moves to the next non-hidden viewpoint, wrapping around, and returns
    /// its name.
    ///
    /// When every entry is hidden the selection stays put after one full
    /// cycle.
    pub fn advance(&mut self) -> &str {
        let len = self.viewpoints.len();
        if let Some(next) = (1..=len)
            .map(|step| (self.current + step) % len)
            .find(|&index| !self.viewpoints[index].hidden)
        {
            self.current = next;
        }
        &self.viewpoints[self.current].name
    }

    /// Looks up a viewpoint by name.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no viewpoint has that name.
    pub fn by_name(&self, name: &str) -> Result<&Viewpoint> {
        self.viewpoints
            .iter()
            .find(|v| v.name == name)
            .ok_or_else(|| AiviError::not_found("viewpoint", name))
    }

    /// Makes the named viewpoint active, hidden ones included.
    pub fn select(&mut self, name: &str) -> Result<&Viewpoint> {
        let index = self
            .viewpoints
            .iter()
            .position(|v| v.name == name)
            .ok_or_else(|| AiviError::not_found("viewpoint", name))?;
        self.current = index;
        Ok(&self.viewpoints[index])
    }

    pub fn all(&self) -> &[Viewpoint] {
        &self.viewpoints
    }

    pub fn len(&self) -> usize {
        self.viewpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.viewpoints.is_empty()
    }

    /// Number of viewpoints `advance` can land on.
    pub fn visible_len(&self) -> usize {
        self.viewpoints.iter().filter(|v| !v.hidden).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewpoint::get_default_presets;

    fn named(name: &str, hidden: bool) -> Viewpoint {
        Viewpoint {
            name: name.to_string(),
            instructions: Vec::new(),
            model: "m".to_string(),
            max_tokens: 10,
            text_ops: Vec::new(),
            hidden,
        }
    }

    #[test]
    fn test_empty_catalogue_is_rejected() {
        assert!(ViewpointRegistry::new(Vec::new()).is_err());
    }

    #[test]
    fn test_advance_skips_hidden_and_wraps() {
        let mut registry = ViewpointRegistry::new(vec![
            named("a", false),
            named("b", true),
            named("c", false),
            named("d", true),
        ])
        .unwrap();
        assert_eq!(registry.current().name, "a");
        assert_eq!(registry.advance(), "c");
        assert_eq!(registry.advance(), "a");
    }

    #[test]
    fn test_full_cycle_returns_to_start() {
        for catalogue in [
            get_default_presets(),
            vec![named("only", false)],
            vec![named("h", true), named("x", false), named("y", false)],
        ] {
            let mut registry = ViewpointRegistry::new(catalogue).unwrap();
            let start = registry.current().name.clone();
            for _ in 0..registry.visible_len() {
                registry.advance();
            }
            assert_eq!(registry.current().name, start);
            // and once more around, to cover the second pass
            for _ in 0..registry.visible_len() {
                assert!(!registry.current().hidden);
                registry.advance();
            }
            assert_eq!(registry.current().name, start);
        }
    }

    #[test]
    fn test_all_hidden_does_not_loop() {
        let mut registry =
            ViewpointRegistry::new(vec![named("a", true), named("b", true)]).unwrap();
        assert_eq!(registry.current().name, "a");
        assert_eq!(registry.advance(), "a");
    }

    #[test]
    fn test_by_name() {
        let registry = ViewpointRegistry::new(get_default_presets()).unwrap();
        assert_eq!(registry.by_name("Zen").unwrap().name, "Zen");
        assert!(registry.by_name("Nobody").unwrap_err().is_not_found());
    }

    #[test]
    fn test_select_hidden() {
        let mut registry = ViewpointRegistry::new(get_default_presets()).unwrap();
        registry.select("Radio").unwrap();
        assert_eq!(registry.current().name, "Radio");
        assert_ne!(registry.advance(), "Radio");
    }
}
