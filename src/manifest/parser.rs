//! Line-oriented manifest parser.
//!
//! Manifests are `Key: Value` lines, with values continued on following lines
//! that start with a single space. Sections are separated by blank lines. The
//! parser is an explicit two-state machine so that continuation handling and
//! the section reset can be exercised independently.

use crate::model::ManifestAttributes;

/// Scanner state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    /// Inside a section. `previous_key` is the attribute a continuation line
    /// would extend.
    Normal { previous_key: Option<String> },
    /// One or more blank lines were just seen; the previous key is gone.
    AfterBlank,
}

/// Incremental manifest parser.
#[derive(Debug, Clone)]
pub struct ManifestParser {
    state: ScanState,
    attributes: ManifestAttributes,
}

impl ManifestParser {
    pub fn new() -> Self {
        Self {
            state: ScanState::Normal { previous_key: None },
            attributes: ManifestAttributes::new(),
        }
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    /// Feed one line (without its terminator; a trailing `\r` is ignored).
    pub fn feed_line(&mut self, line: &str) {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line.is_empty() {
            self.state = ScanState::AfterBlank;
            return;
        }

        let previous_key = match std::mem::replace(&mut self.state, ScanState::AfterBlank) {
            ScanState::Normal { previous_key } => previous_key,
            ScanState::AfterBlank => None,
        };

        self.state = ScanState::Normal {
            previous_key: self.apply_line(line, previous_key),
        };
    }

    /// Handle a non-blank line in the NORMAL state; returns the new previous key.
    fn apply_line(&mut self, line: &str, previous_key: Option<String>) -> Option<String> {
        if let Some(continuation) = line.strip_prefix(' ') {
            if let Some(key) = &previous_key {
                if let Some(value) = self.attributes.get_mut(key) {
                    value.push_str(continuation);
                }
            }
            return previous_key;
        }

        match line.find(':') {
            Some(colon) if colon > 0 && colon + 1 < line.len() => {
                let key = line[..colon].trim().to_string();
                let value = line[colon + 1..].trim().to_string();
                self.attributes.insert(key.clone(), value);
                Some(key)
            }
            _ => previous_key,
        }
    }

    /// Feed a whole manifest document.
    pub fn feed_str(&mut self, text: &str) {
        for line in text.lines() {
            self.feed_line(line);
        }
    }

    pub fn finish(self) -> ManifestAttributes {
        self.attributes
    }
}

impl Default for ManifestParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a complete manifest document.
pub fn parse_manifest(text: &str) -> ManifestAttributes {
    let mut parser = ManifestParser::new();
    parser.feed_str(text);
    parser.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_section() {
        let attrs = parse_manifest(
            "Manifest-Version: 1.0\nImplementation-Title: demo\nImplementation-Version: 2.3.1\n",
        );
        assert_eq!(attrs.len(), 3);
        assert_eq!(attrs["Implementation-Title"], "demo");
        let keys: Vec<_> = attrs.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            ["Manifest-Version", "Implementation-Title", "Implementation-Version"]
        );
    }

    #[test]
    fn test_continuation_line_appends() {
        let attrs = parse_manifest("Class-Path: lib/a.jar lib/b\n .jar lib/c.jar\n");
        assert_eq!(attrs["Class-Path"], "lib/a.jar lib/b.jar lib/c.jar");
    }

    #[test]
    fn test_continuation_does_not_cross_section_boundary() {
        let attrs = parse_manifest("Main-Class: app.Main\n\n orphan\nName: com/x/\n");
        assert_eq!(attrs["Main-Class"], "app.Main");
        assert_eq!(attrs["Name"], "com/x/");
    }

    #[test]
    fn test_later_sections_captured() {
        let attrs = parse_manifest(
            "Manifest-Version: 1.0\r\n\r\nName: org/example/\r\nSealed: true\r\n",
        );
        assert_eq!(attrs["Manifest-Version"], "1.0");
        assert_eq!(attrs["Sealed"], "true");
    }

    #[test]
    fn test_state_transitions() {
        let mut parser = ManifestParser::new();
        parser.feed_line("A: 1");
        assert_eq!(
            parser.state(),
            &ScanState::Normal {
                previous_key: Some("A".to_string())
            }
        );
        parser.feed_line("");
        assert_eq!(parser.state(), &ScanState::AfterBlank);
        parser.feed_line("");
        assert_eq!(parser.state(), &ScanState::AfterBlank);
        parser.feed_line(" ignored");
        assert_eq!(parser.state(), &ScanState::Normal { previous_key: None });
        assert_eq!(parser.finish()["A"], "1");
    }

    #[test]
    fn test_malformed_lines_ignored() {
        let attrs = parse_manifest(": no key\nNoColon\nEmpty:\nGood: yes\n");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs["Good"], "yes");
    }

    #[test]
    fn test_duplicate_key_last_value_wins() {
        let attrs = parse_manifest("Name: a\n\nName: b\n");
        assert_eq!(attrs["Name"], "b");
        assert_eq!(attrs.len(), 1);
    }
}
