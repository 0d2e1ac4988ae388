use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A single key the participant can press.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(char);

impl Key {
    pub fn new(c: char) -> Self {
        Key(c)
    }

    pub fn as_char(&self) -> char {
        self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PresentationError {
    #[error("stimulus asset not found: {}", path.display())]
    ResourceMissing { path: PathBuf },
    #[error("presentation I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("display failed: {0}")]
    Display(String),
    #[error("audio playback failed: {0}")]
    Audio(String),
}

/// Screen, speakers and keyboard the participant faces.
///
/// Every call blocks for its full duration, except `wait_for_key` which
/// returns as soon as an allowed key is pressed.
pub trait PresentationSurface {
    /// Replaces the screen contents with `text` and holds it for `duration`.
    fn show_text(&mut self, text: &str, duration: Duration) -> Result<(), PresentationError>;

    /// Starts playback and returns immediately.
    fn play_audio(&mut self, clip: &Path) -> Result<(), PresentationError>;

    fn stop_audio(&mut self) -> Result<(), PresentationError>;

    /// `None` when `timeout` elapses without an allowed key.
    fn wait_for_key(&mut self, allowed: &[Key], timeout: Duration) -> Option<Key>;
}

impl<S: PresentationSurface + ?Sized> PresentationSurface for &mut S {
    fn show_text(&mut self, text: &str, duration: Duration) -> Result<(), PresentationError> {
        (**self).show_text(text, duration)
    }

    fn play_audio(&mut self, clip: &Path) -> Result<(), PresentationError> {
        (**self).play_audio(clip)
    }

    fn stop_audio(&mut self) -> Result<(), PresentationError> {
        (**self).stop_audio()
    }

    fn wait_for_key(&mut self, allowed: &[Key], timeout: Duration) -> Option<Key> {
        (**self).wait_for_key(allowed, timeout)
    }
}
