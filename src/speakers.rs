//! Speaker registry: display name to model speaker index.
//!
//! Built once when a model is loaded, from the speaker list the model
//! declares. Read-only afterwards; the pipeline resolves every request's
//! display name through it before inference, so the converter never sees
//! an unmapped index.

use crate::error::{Result, SonoshiftError};
use std::collections::HashMap;

/// Mapping from speaker display name to a stable integer index.
#[derive(Debug, Clone)]
pub struct SpeakerRegistry {
    /// Display names in declaration order.
    names: Vec<String>,
    by_name: HashMap<String, usize>,
}

impl SpeakerRegistry {
    /// Build a registry from a model's declared speaker list.
    ///
    /// Indices follow declaration order. Models that declare no speakers
    /// get a single synthetic `"0"` entry at index 0.
    pub fn from_model(speakers: &[String]) -> Self {
        let names: Vec<String> = if speakers.is_empty() {
            vec!["0".to_string()]
        } else {
            speakers.to_vec()
        };
        let by_name = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self { names, by_name }
    }

    /// Resolve a display name to its speaker index.
    pub fn resolve(&self, name: &str) -> Result<usize> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| SonoshiftError::UnknownSpeaker {
                name: name.to_string(),
            })
    }

    /// Display names in declaration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of registered speakers.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false: even a speakerless model gets the synthetic entry.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speakers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn indices_follow_declaration_order() {
        let registry = SpeakerRegistry::from_model(&speakers(&["soprano", "alto", "tenor"]));

        assert_eq!(registry.resolve("soprano").unwrap(), 0);
        assert_eq!(registry.resolve("alto").unwrap(), 1);
        assert_eq!(registry.resolve("tenor").unwrap(), 2);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn empty_speaker_list_gets_synthetic_entry() {
        let registry = SpeakerRegistry::from_model(&[]);

        assert_eq!(registry.names(), &["0".to_string()]);
        assert_eq!(registry.resolve("0").unwrap(), 0);
        assert!(!registry.is_empty());
    }

    #[test]
    fn unknown_name_is_an_error() {
        let registry = SpeakerRegistry::from_model(&speakers(&["alto"]));

        match registry.resolve("bass") {
            Err(SonoshiftError::UnknownSpeaker { name }) => assert_eq!(name, "bass"),
            other => panic!("Expected UnknownSpeaker, got {:?}", other),
        }
    }

    #[test]
    fn names_preserve_declaration_order() {
        let registry = SpeakerRegistry::from_model(&speakers(&["z", "a", "m"]));
        assert_eq!(registry.names(), &speakers(&["z", "a", "m"]));
    }

    #[test]
    fn duplicate_names_resolve_to_last_index() {
        // A model declaring the same display name twice is degenerate but
        // must not panic; the later entry wins the lookup.
        let registry = SpeakerRegistry::from_model(&speakers(&["dup", "dup"]));
        assert_eq!(registry.resolve("dup").unwrap(), 1);
        assert_eq!(registry.len(), 2);
    }
}
