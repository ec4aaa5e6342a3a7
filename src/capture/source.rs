//! Recognition sources.
//!
//! A [`CaptureSource`] pushes [`RecognitionEvent`]s into a tokio channel
//! between `start` and `stop`. Real speech recognisers live outside this
//! crate; [`ScriptedCapture`] replays a fixed list of events.
//!
//! `start` receives the [`CaptureConfig`]: the recognition language and
//! whether interim hypotheses are wanted.

use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::CaptureConfig;

// ---------------------------------------------------------------------------
// RecognitionEvent
// ---------------------------------------------------------------------------

/// One result from a speech recogniser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// Partial hypothesis; may still change. Shown, never committed.
    Interim(String),
    /// Settled text, appended to the script.
    Final(String),
}

impl RecognitionEvent {
    pub fn is_final(&self) -> bool {
        matches!(self, RecognitionEvent::Final(_))
    }

    pub fn text(&self) -> &str {
        match self {
            RecognitionEvent::Interim(text) | RecognitionEvent::Final(text) => text,
        }
    }
}

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("speech recognition unavailable: {0}")]
    Unavailable(String),

    #[error("capture already started")]
    AlreadyStarted,

    #[error("capture not started")]
    NotStarted,
}

// ---------------------------------------------------------------------------
// CaptureSource trait
// ---------------------------------------------------------------------------

/// A streaming text source.
///
/// `start` hands the source the sending half of the event channel; the
/// source keeps it until `stop` (or drops it once it has nothing more to
/// say, which closes the channel). A source that cannot recognise
/// `options.language` returns [`CaptureError::Unavailable`].
pub trait CaptureSource: Send {
    fn start(
        &mut self,
        options: &CaptureConfig,
        events: mpsc::UnboundedSender<RecognitionEvent>,
    ) -> Result<(), CaptureError>;

    fn stop(&mut self) -> Result<(), CaptureError>;

    fn is_active(&self) -> bool;
}

// Compile-time assertion: Box<dyn CaptureSource> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn CaptureSource>) {}
};

// ---------------------------------------------------------------------------
// ScriptedCapture
// ---------------------------------------------------------------------------

/// Replays a prepared list of events as soon as it is started.
///
/// A recording made in a known language (see [`recorded_in`](Self::recorded_in))
/// refuses to start for any other language.
///
/// ```rust
/// use video_studio::capture::{RecognitionEvent, ScriptedCapture};
///
/// let source = ScriptedCapture::from_lines("Hello\nand welcome");
/// assert_eq!(source.events().len(), 2);
/// assert_eq!(source.events()[0], RecognitionEvent::Final("Hello".into()));
/// ```
#[derive(Debug, Clone)]
pub struct ScriptedCapture {
    events: Vec<RecognitionEvent>,
    /// `None` replays for any language.
    language: Option<String>,
    active: bool,
}

impl ScriptedCapture {
    pub fn new(events: Vec<RecognitionEvent>) -> Self {
        Self {
            events,
            language: None,
            active: false,
        }
    }

    /// One finalized fragment per non-blank line.
    pub fn from_lines(text: &str) -> Self {
        let events = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| RecognitionEvent::Final(line.to_string()))
            .collect();
        Self::new(events)
    }

    /// Tag the recording with a BCP-47 language.
    pub fn recorded_in(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn events(&self) -> &[RecognitionEvent] {
        &self.events
    }
}

impl CaptureSource for ScriptedCapture {
    fn start(
        &mut self,
        options: &CaptureConfig,
        events: mpsc::UnboundedSender<RecognitionEvent>,
    ) -> Result<(), CaptureError> {
        if self.active {
            return Err(CaptureError::AlreadyStarted);
        }
        if let Some(recorded) = &self.language {
            // Language tags compare case-insensitively.
            if !recorded.eq_ignore_ascii_case(&options.language) {
                return Err(CaptureError::Unavailable(format!(
                    "no {} recognizer for a {recorded} recording",
                    options.language
                )));
            }
        }
        self.active = true;

        for event in &self.events {
            if !options.interim_results && !event.is_final() {
                continue;
            }
            if events.send(event.clone()).is_err() {
                log::warn!("capture: receiver dropped, replay stopped");
                break;
            }
        }
        // `events` is dropped here: the replay is complete.
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        if !self.active {
            return Err(CaptureError::NotStarted);
        }
        self.active = false;
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
