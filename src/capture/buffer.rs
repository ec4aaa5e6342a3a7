//! The growing script text fed by recognition events.

use super::source::RecognitionEvent;

/// Committed script text plus the latest interim hypothesis.
///
/// Only [`RecognitionEvent::Final`] fragments reach the committed text, each
/// followed by a single space. Interim fragments replace one another in the
/// preview and are cleared by the next final fragment.
///
/// ```rust
/// use video_studio::capture::{RecognitionEvent, ScriptBuffer};
///
/// let mut buf = ScriptBuffer::default();
/// buf.apply(&RecognitionEvent::Final("Hello".into()));
/// buf.apply(&RecognitionEvent::Interim("wor".into()));
/// assert_eq!(buf.text(), "Hello ");
/// assert_eq!(buf.preview(), "Hello wor");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptBuffer {
    committed: String,
    interim: String,
}

impl ScriptBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            committed: text.into(),
            interim: String::new(),
        }
    }

    pub fn apply(&mut self, event: &RecognitionEvent) {
        match event {
            RecognitionEvent::Interim(fragment) => {
                self.interim.clear();
                self.interim.push_str(fragment.trim());
            }
            RecognitionEvent::Final(fragment) => {
                self.interim.clear();
                let fragment = fragment.trim();
                if !fragment.is_empty() {
                    self.committed.push_str(fragment);
                    self.committed.push(' ');
                }
            }
        }
    }

    /// The committed script.
    pub fn text(&self) -> &str {
        &self.committed
    }

    /// Committed text followed by the pending interim fragment.
    pub fn preview(&self) -> String {
        format!("{}{}", self.committed, self.interim)
    }

    /// Replace the committed text (manual edit); drops any interim fragment.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.committed = text.into();
        self.interim.clear();
    }

    pub fn clear(&mut self) {
        self.committed.clear();
        self.interim.clear();
    }

    /// Length of the committed text in characters, as counted against the
    /// script limit.
    pub fn char_count(&self) -> usize {
        self.committed.chars().count()
    }

    pub fn is_blank(&self) -> bool {
        self.committed.trim().is_empty()
    }
}
