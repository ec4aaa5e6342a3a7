//! Speech capture input.
//!
//! Recognised speech arrives as a stream of [`RecognitionEvent`]s and is
//! folded into a [`ScriptBuffer`]. The pipeline never sees this module; the
//! caller submits `ScriptBuffer::text()` as the job script.
//!
//! ```text
//! CaptureSource ──mpsc──▶ CaptureSession ──apply──▶ ScriptBuffer
//!                                                    ├─ text()    (committed)
//!                                                    └─ preview() (+ interim)
//! ```

pub mod buffer;
pub mod session;
pub mod source;

pub use buffer::ScriptBuffer;
pub use session::CaptureSession;
pub use source::{CaptureError, CaptureSource, RecognitionEvent, ScriptedCapture};
