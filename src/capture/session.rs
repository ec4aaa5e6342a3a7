//! Ties a [`CaptureSource`] to a [`ScriptBuffer`].

use tokio::sync::mpsc;

use crate::config::CaptureConfig;

use super::buffer::ScriptBuffer;
use super::source::{CaptureError, CaptureSource, RecognitionEvent};

/// A start/stop cycle of one capture source.
///
/// Events are buffered in an unbounded channel until the caller drains them
/// with [`poll`](Self::poll), [`listen`](Self::listen) or
/// [`stop`](Self::stop).
pub struct CaptureSession<S: CaptureSource> {
    source: S,
    options: CaptureConfig,
    events: Option<mpsc::UnboundedReceiver<RecognitionEvent>>,
}

impl<S: CaptureSource> CaptureSession<S> {
    pub fn new(source: S, options: CaptureConfig) -> Self {
        Self {
            source,
            options,
            events: None,
        }
    }

    pub fn language(&self) -> &str {
        &self.options.language
    }

    pub fn start(&mut self) -> Result<(), CaptureError> {
        if self.events.is_some() {
            return Err(CaptureError::AlreadyStarted);
        }
        let (tx, rx) = mpsc::unbounded_channel();
        self.source.start(&self.options, tx)?;
        self.events = Some(rx);
        log::info!("capture: listening ({})", self.options.language);
        Ok(())
    }

    /// Apply every event received so far without waiting. Returns how many
    /// events were applied.
    pub fn poll(&mut self, buffer: &mut ScriptBuffer) -> usize {
        let Some(rx) = self.events.as_mut() else {
            return 0;
        };
        let mut applied = 0;
        while let Ok(event) = rx.try_recv() {
            buffer.apply(&event);
            applied += 1;
        }
        applied
    }

    /// Apply events until the source closes its end of the channel.
    pub async fn listen(&mut self, buffer: &mut ScriptBuffer) -> Result<usize, CaptureError> {
        let rx = self.events.as_mut().ok_or(CaptureError::NotStarted)?;
        let mut applied = 0;
        while let Some(event) = rx.recv().await {
            buffer.apply(&event);
            applied += 1;
        }
        Ok(applied)
    }

    /// Stop the source and apply whatever it had already delivered.
    pub fn stop(&mut self, buffer: &mut ScriptBuffer) -> Result<usize, CaptureError> {
        if self.events.is_none() {
            return Err(CaptureError::NotStarted);
        }
        self.source.stop()?;
        let applied = self.poll(buffer);
        self.events = None;
        log::info!("capture: stopped ({applied} pending events applied)");
        Ok(applied)
    }

    pub fn is_listening(&self) -> bool {
        self.events.is_some() && self.source.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::ScriptedCapture;

    fn source() -> ScriptedCapture {
        ScriptedCapture::new(vec![
            RecognitionEvent::Interim("Wel".into()),
            RecognitionEvent::Final("Welcome".into()),
            RecognitionEvent::Interim("to the".into()),
            RecognitionEvent::Final("to the channel".into()),
        ])
    }

    #[test]
    fn poll_before_start_is_a_no_op() {
        let mut session = CaptureSession::new(source(), CaptureConfig::default());
        let mut buf = ScriptBuffer::default();
        assert_eq!(session.poll(&mut buf), 0);
        assert!(!session.is_listening());
    }

    #[test]
    fn stop_applies_pending_events() {
        let mut session = CaptureSession::new(source(), CaptureConfig::default());
        let mut buf = ScriptBuffer::default();

        session.start().unwrap();
        assert!(session.is_listening());
        assert_eq!(session.stop(&mut buf).unwrap(), 4);
        assert_eq!(buf.text(), "Welcome to the channel ");
        assert!(!session.is_listening());
    }

    #[test]
    fn session_lifecycle_errors() {
        let mut session = CaptureSession::new(source(), CaptureConfig::default());
        let mut buf = ScriptBuffer::default();
        assert_eq!(session.stop(&mut buf), Err(CaptureError::NotStarted));

        session.start().unwrap();
        assert_eq!(session.start(), Err(CaptureError::AlreadyStarted));
    }

    #[test]
    fn language_mismatch_keeps_session_stopped() {
        let source = ScriptedCapture::from_lines("Hello").recorded_in("en-US");
        let mut session = CaptureSession::new(source, CaptureConfig::default());
        assert_eq!(session.language(), "pt-BR");

        assert!(matches!(session.start(), Err(CaptureError::Unavailable(_))));
        assert!(!session.is_listening());
        let mut buf = ScriptBuffer::default();
        assert_eq!(session.stop(&mut buf), Err(CaptureError::NotStarted));
    }

    #[tokio::test]
    async fn listen_runs_until_source_closes() {
        let mut session = CaptureSession::new(
            ScriptedCapture::from_lines("one\ntwo"),
            CaptureConfig::default(),
        );
        let mut buf = ScriptBuffer::new("Zero ");

        session.start().unwrap();
        assert_eq!(session.listen(&mut buf).await.unwrap(), 2);
        assert_eq!(buf.text(), "Zero one two ");
        session.stop(&mut buf).unwrap();
    }
}
