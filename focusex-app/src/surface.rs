use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal;
use focusex_core::{Key, PresentationError, PresentationSurface};
use focusex_timing::Timer;
use log::{debug, info, warn};

#[cfg(feature = "audio")]
use crate::audio::AudioPlayer;

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

/// Where single keypresses come from.
pub trait KeyInput {
    /// First character key pressed within `timeout`, `None` once it elapses.
    fn next_key(&mut self, timeout: Duration) -> io::Result<Option<char>>;

    /// Drops keys pressed before now and returns how many there were.
    fn discard_pending(&mut self) -> io::Result<usize>;
}

/// Raw-mode terminal keyboard. Keys arrive on press, without Enter.
#[derive(Debug, Default)]
pub struct TerminalKeys;

/// Raw mode for as long as it lives.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("failed to restore terminal mode: {}", e);
        }
    }
}

fn pressed_char(event: Event) -> Option<char> {
    match event {
        Event::Key(KeyEvent {
            code: KeyCode::Char(c),
            kind: KeyEventKind::Press,
            ..
        }) => Some(c),
        _ => None,
    }
}

impl KeyInput for TerminalKeys {
    fn next_key(&mut self, timeout: Duration) -> io::Result<Option<char>> {
        let _raw = RawMode::enable()?;
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if !event::poll(remaining)? {
                return Ok(None);
            }
            if let Some(c) = pressed_char(event::read()?) {
                return Ok(Some(c));
            }
        }
    }

    fn discard_pending(&mut self) -> io::Result<usize> {
        let _raw = RawMode::enable()?;
        let mut dropped = 0;
        while event::poll(Duration::ZERO)? {
            if pressed_char(event::read()?).is_some() {
                dropped += 1;
            }
        }
        Ok(dropped)
    }
}

/// Terminal stand-in for the stimulus window.
pub struct ConsoleSurface<T: Timer, K: KeyInput = TerminalKeys> {
    timer: T,
    keys: K,
    #[cfg(feature = "audio")]
    player: AudioPlayer,
}

impl<T: Timer> ConsoleSurface<T> {
    pub fn new(timer: T) -> Self {
        Self::with_keys(timer, TerminalKeys)
    }
}

impl<T: Timer, K: KeyInput> ConsoleSurface<T, K> {
    pub fn with_keys(timer: T, keys: K) -> Self {
        Self {
            timer,
            keys,
            #[cfg(feature = "audio")]
            player: AudioPlayer::new(),
        }
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Keys pressed before a prompt appears do not count as answers.
    fn discard_pending_input(&mut self) {
        match self.keys.discard_pending() {
            Ok(0) => {}
            Ok(stale) => debug!("discarded {} keys pressed before the prompt", stale),
            Err(e) => warn!("could not flush keyboard input: {}", e),
        }
    }
}

impl<T: Timer, K: KeyInput> PresentationSurface for ConsoleSurface<T, K> {
    fn show_text(&mut self, text: &str, duration: Duration) -> Result<(), PresentationError> {
        let mut out = io::stdout().lock();
        writeln!(out, "{CLEAR_SCREEN}{text}")?;
        out.flush()?;
        drop(out);
        self.timer.sleep(duration);
        Ok(())
    }

    fn play_audio(&mut self, clip: &Path) -> Result<(), PresentationError> {
        if !clip.is_file() {
            return Err(PresentationError::ResourceMissing {
                path: clip.to_path_buf(),
            });
        }
        #[cfg(feature = "audio")]
        self.player.play(clip)?;
        #[cfg(not(feature = "audio"))]
        warn!(
            "built without the audio feature, {} is not played",
            clip.display()
        );
        info!("audio started: {}", clip.display());
        Ok(())
    }

    fn stop_audio(&mut self) -> Result<(), PresentationError> {
        #[cfg(feature = "audio")]
        self.player.stop();
        info!("audio stopped");
        Ok(())
    }

    fn wait_for_key(&mut self, allowed: &[Key], timeout: Duration) -> Option<Key> {
        self.discard_pending_input();
        let started = self.timer.now();
        loop {
            let remaining = timeout.saturating_sub(self.timer.elapsed(started));
            if remaining.is_zero() {
                return None;
            }
            match self.keys.next_key(remaining) {
                Ok(Some(c)) => {
                    let key = Key::new(c);
                    if allowed.contains(&key) {
                        return Some(key);
                    }
                    debug!("ignoring key {:?}", c);
                }
                Ok(None) => return None,
                Err(e) => {
                    // no usable keyboard; keep the prompt up for its full length
                    warn!("keyboard unavailable: {}", e);
                    self.timer.sleep(remaining);
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use focusex_timing::VirtualTimer;
    use std::collections::VecDeque;

    /// Presses each key after its delay on the shared virtual clock.
    #[derive(Default)]
    struct ScriptedKeys {
        clock: VirtualTimer,
        stale: Vec<char>,
        presses: VecDeque<(Duration, char)>,
        broken: bool,
    }

    impl KeyInput for ScriptedKeys {
        fn next_key(&mut self, timeout: Duration) -> io::Result<Option<char>> {
            if self.broken {
                return Err(io::Error::other("not a terminal"));
            }
            match self.presses.front() {
                Some(&(delay, c)) if delay <= timeout => {
                    self.presses.pop_front();
                    self.clock.advance(delay);
                    Ok(Some(c))
                }
                _ => {
                    self.clock.advance(timeout);
                    Ok(None)
                }
            }
        }

        fn discard_pending(&mut self) -> io::Result<usize> {
            Ok(std::mem::take(&mut self.stale).len())
        }
    }

    fn surface(keys: ScriptedKeys) -> ConsoleSurface<VirtualTimer, ScriptedKeys> {
        ConsoleSurface::with_keys(keys.clock.clone(), keys)
    }

    fn digits() -> Vec<Key> {
        "12345".chars().map(Key::new).collect()
    }

    #[test]
    fn single_keypress_returns_early() {
        let mut surface = surface(ScriptedKeys {
            presses: VecDeque::from([(Duration::from_millis(1_500), '3')]),
            ..ScriptedKeys::default()
        });
        let key = surface.wait_for_key(&digits(), Duration::from_secs(10));
        assert_eq!(key, Some(Key::new('3')));
        assert_eq!(surface.timer().total(), Duration::from_millis(1_500));
    }

    #[test]
    fn disallowed_keys_are_skipped_within_the_timeout() {
        let mut surface = surface(ScriptedKeys {
            presses: VecDeque::from([
                (Duration::from_secs(1), '9'),
                (Duration::from_secs(2), 'q'),
                (Duration::from_secs(3), '5'),
            ]),
            ..ScriptedKeys::default()
        });
        let key = surface.wait_for_key(&digits(), Duration::from_secs(10));
        assert_eq!(key, Some(Key::new('5')));
        assert_eq!(surface.timer().total(), Duration::from_secs(6));
    }

    #[test]
    fn allowed_key_after_the_timeout_is_too_late() {
        let mut surface = surface(ScriptedKeys {
            presses: VecDeque::from([
                (Duration::from_secs(8), '7'),
                (Duration::from_secs(3), '2'),
            ]),
            ..ScriptedKeys::default()
        });
        let key = surface.wait_for_key(&digits(), Duration::from_secs(10));
        assert_eq!(key, None);
        assert_eq!(surface.timer().total(), Duration::from_secs(10));
    }

    #[test]
    fn keys_pressed_before_the_prompt_are_ignored() {
        let mut surface = surface(ScriptedKeys {
            stale: vec!['4'],
            ..ScriptedKeys::default()
        });
        let key = surface.wait_for_key(&digits(), Duration::from_secs(10));
        assert_eq!(key, None);
        assert!(surface.keys.stale.is_empty());
    }

    #[test]
    fn missing_keyboard_waits_out_the_timeout() {
        let mut surface = surface(ScriptedKeys {
            broken: true,
            ..ScriptedKeys::default()
        });
        let key = surface.wait_for_key(&digits(), Duration::from_secs(10));
        assert_eq!(key, None);
        assert_eq!(surface.timer().total(), Duration::from_secs(10));
    }

    #[test]
    fn only_key_presses_count() {
        use crossterm::event::{KeyEventState, KeyModifiers};

        let press = KeyEvent::new(KeyCode::Char('2'), KeyModifiers::NONE);
        assert_eq!(pressed_char(Event::Key(press)), Some('2'));

        let release = KeyEvent {
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
            ..press
        };
        assert_eq!(pressed_char(Event::Key(release)), None);
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(pressed_char(Event::Key(enter)), None);
    }

    #[test]
    fn missing_clip_is_a_missing_resource() {
        let mut surface = surface(ScriptedKeys::default());
        let err = surface
            .play_audio(Path::new("definitely/not/here.wav"))
            .unwrap_err();
        assert!(matches!(err, PresentationError::ResourceMissing { .. }));
    }
}
