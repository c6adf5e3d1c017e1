use std::collections::BTreeMap;

use starlay_config::Config;
use starlay_types::{Color, HashKey};

use crate::error::SessionError;
use crate::reconciler::Detection;

/// Mutable runtime settings and operator state, owned by the tick thread
#[derive(Debug, Clone)]
pub struct Session {
    pub translation_enabled: bool,
    pub cutscene_enabled: bool,
    pub font_family: String,
    interval_ms: u64,
    active_region: usize,
    region_count: usize,
    current_hash: Option<HashKey>,
    edit_buffer: String,
    overrides: BTreeMap<HashKey, Color>,
}

impl Session {
    pub fn new(config: &Config, region_count: usize, overrides: BTreeMap<HashKey, Color>) -> Self {
        Self {
            translation_enabled: true,
            cutscene_enabled: config.cutscene.enabled,
            font_family: config.overlay.font_family.clone(),
            interval_ms: config.check_interval_ms(),
            active_region: 0,
            region_count,
            current_hash: None,
            edit_buffer: String::new(),
            overrides,
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Clamped to at least one millisecond, returns the applied value
    pub fn set_interval(&mut self, interval_ms: u64) -> u64 {
        self.interval_ms = interval_ms.max(1);
        self.interval_ms
    }

    pub fn active_region(&self) -> usize {
        self.active_region
    }

    pub fn region_count(&self) -> usize {
        self.region_count
    }

    pub fn select_region(&mut self, index: usize) -> Result<(), SessionError> {
        if index >= self.region_count {
            return Err(SessionError::UnknownRegion {
                index,
                count: self.region_count,
            });
        }
        self.active_region = index;
        Ok(())
    }

    pub fn current_hash(&self) -> Option<&HashKey> {
        self.current_hash.as_ref()
    }

    pub fn edit_buffer(&self) -> &str {
        &self.edit_buffer
    }

    pub fn set_edit_buffer(&mut self, text: impl Into<String>) {
        self.edit_buffer = text.into();
    }

    /// Make `hash` the target of edits, loading its text into the buffer
    pub fn focus(&mut self, hash: HashKey, text: impl Into<String>) {
        self.current_hash = Some(hash);
        self.edit_buffer = text.into();
    }

    pub fn note_detection(&mut self, detection: &Detection) {
        self.focus(detection.hash.clone(), detection.text.clone());
    }

    pub fn overrides(&self) -> &BTreeMap<HashKey, Color> {
        &self.overrides
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(&Config::default(), 3, BTreeMap::new())
    }

    #[test]
    fn test_select_region_bounds() {
        let mut session = session();
        session.select_region(2).unwrap();
        assert_eq!(session.active_region(), 2);

        let err = session.select_region(3).unwrap_err();
        assert!(matches!(err, SessionError::UnknownRegion { index: 3, count: 3 }));
        assert_eq!(session.active_region(), 2);
    }

    #[test]
    fn test_interval_is_clamped() {
        let mut session = session();
        assert_eq!(session.set_interval(0), 1);
        assert_eq!(session.set_interval(250), 250);
    }

    #[test]
    fn test_detection_focuses_hash() {
        let mut session = session();
        session.note_detection(&Detection {
            region: 1,
            hash: HashKey::new("abcd"),
            text: "Hello".to_string(),
        });
        assert_eq!(session.current_hash(), Some(&HashKey::new("abcd")));
        assert_eq!(session.edit_buffer(), "Hello");
    }
}
