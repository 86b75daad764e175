//! Class label set.
//!
//! Loaded once at startup from a newline-delimited class-name file (COCO
//! convention) and immutable for the process lifetime. The index of the
//! `person` class is resolved at load time so per-frame filtering is a
//! plain integer comparison.

use std::path::Path;

use anyhow::{anyhow, Context, Result};

/// Class name the detector counts.
pub const PERSON_LABEL: &str = "person";

/// Ordered, immutable list of class names.
#[derive(Clone, Debug)]
pub struct LabelSet {
    names: Vec<String>,
    person_index: usize,
}

impl LabelSet {
    /// Load labels from a newline-delimited file. Fatal if the file is
    /// unreadable or does not contain a `person` class.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read label file {}", path.display()))?;
        let names: Vec<String> = raw
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        Self::from_names(names)
            .with_context(|| format!("invalid label file {}", path.display()))
    }

    pub fn from_names(names: Vec<String>) -> Result<Self> {
        if names.is_empty() {
            return Err(anyhow!("label set is empty"));
        }
        let person_index = names
            .iter()
            .position(|name| name == PERSON_LABEL)
            .ok_or_else(|| anyhow!("label set has no '{}' class", PERSON_LABEL))?;
        Ok(Self {
            names,
            person_index,
        })
    }

    /// Index of the `person` class in this label set.
    pub fn person_index(&self) -> usize {
        self.person_index
    }

    /// Name for a class index. Out-of-range ids render as "object".
    pub fn name(&self, class_id: usize) -> &str {
        self.names
            .get(class_id)
            .map(String::as_str)
            .unwrap_or("object")
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn loads_ordered_names_and_resolves_person() {
        let mut file = tempfile::NamedTempFile::new().expect("temp labels");
        writeln!(file, "person\nbicycle\ncar\n\n  bus  ").unwrap();

        let labels = LabelSet::load(file.path()).unwrap();
        assert_eq!(labels.len(), 4);
        assert_eq!(labels.person_index(), 0);
        assert_eq!(labels.name(0), "person");
        assert_eq!(labels.name(3), "bus");
        assert_eq!(labels.name(99), "object");
    }

    #[test]
    fn person_does_not_have_to_be_class_zero() {
        let labels =
            LabelSet::from_names(vec!["car".into(), "person".into(), "dog".into()]).unwrap();
        assert_eq!(labels.person_index(), 1);
    }

    #[test]
    fn missing_file_is_fatal() {
        assert!(LabelSet::load("/nonexistent/coco.names").is_err());
    }

    #[test]
    fn label_set_without_person_is_rejected() {
        assert!(LabelSet::from_names(vec!["car".into(), "dog".into()]).is_err());
        assert!(LabelSet::from_names(Vec::new()).is_err());
    }
}
