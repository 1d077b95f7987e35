use serde::{Deserialize, Serialize};

/// Stream substituted while the real sources are loading.
pub const PLACEHOLDER_URL: &str = "https://cdn.plyr.io/static/blank.mp4";
pub const PLACEHOLDER_LABEL: &str = "720p";

/// A playable stream URL and its quality label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub file: String,
    pub label: String,
}

impl Source {
    pub fn new(file: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            label: label.into(),
        }
    }
}

/// Ordered, never-empty list of sources handed to the playback engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceList {
    sources: Vec<Source>,
}

impl SourceList {
    /// Returns `None` for an empty list.
    pub fn new(sources: Vec<Source>) -> Option<Self> {
        if sources.is_empty() {
            None
        } else {
            Some(Self { sources })
        }
    }

    pub fn placeholder(file: &str, label: &str) -> Self {
        Self {
            sources: vec![Source::new(file, label)],
        }
    }

    /// Loaded sources, or the placeholder when there are none.
    pub fn or_placeholder(sources: Option<Vec<Source>>, placeholder: &SourceList) -> Self {
        sources
            .and_then(Self::new)
            .unwrap_or_else(|| placeholder.clone())
    }

    pub fn primary(&self) -> &Source {
        &self.sources[0]
    }

    /// Quality labels in source order.
    pub fn qualities(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.label.as_str()).collect()
    }

    pub fn select(&self, label: &str) -> Option<&Source> {
        self.sources.iter().find(|s| s.label == label)
    }

    pub fn as_slice(&self) -> &[Source] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for SourceList {
    fn default() -> Self {
        Self::placeholder(PLACEHOLDER_URL, PLACEHOLDER_LABEL)
    }
}
