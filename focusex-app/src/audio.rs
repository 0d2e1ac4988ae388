use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use focusex_core::PresentationError;
use rodio::{Decoder, OutputStream, Sink, Source};

/// Loops one clip on the default output device until stopped.
#[derive(Default)]
pub struct AudioPlayer {
    _stream: Option<OutputStream>,
    sink: Option<Sink>,
}

impl AudioPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn play(&mut self, clip: &Path) -> Result<(), PresentationError> {
        self.stop();

        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| PresentationError::Audio(format!("no output device: {e}")))?;
        let sink = Sink::try_new(&handle)
            .map_err(|e| PresentationError::Audio(format!("failed to create sink: {e}")))?;
        let source = Decoder::new(BufReader::new(File::open(clip)?)).map_err(|e| {
            PresentationError::Audio(format!("cannot decode {}: {e}", clip.display()))
        })?;
        sink.append(source.repeat_infinite());

        self._stream = Some(stream);
        self.sink = Some(sink);
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self._stream = None;
    }
}
