use log::info;
use std::error::Error;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

/// Playback speed options surfaced to the player. The multiplier scales how
/// fast song time elapses; pitch is a media concern and stays constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl PlaybackSpeed {
    pub const fn rate(self) -> f32 {
        match self {
            PlaybackSpeed::Slow => 0.75,
            PlaybackSpeed::Normal => 1.0,
            PlaybackSpeed::Fast => 1.25,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            PlaybackSpeed::Slow => "slow",
            PlaybackSpeed::Normal => "normal",
            PlaybackSpeed::Fast => "fast",
        }
    }
}

impl FromStr for PlaybackSpeed {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "slow" => Ok(PlaybackSpeed::Slow),
            "normal" | "medium" => Ok(PlaybackSpeed::Normal),
            "fast" => Ok(PlaybackSpeed::Fast),
            _ => Err(()),
        }
    }
}

impl fmt::Display for PlaybackSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Starting a media resource can be refused by the platform (a browser host
/// blocking autoplay, a missing output device). Reported once, never retried
/// internally; the host retries from a fresh user gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaError(pub String);

impl fmt::Display for MediaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "media playback error: {}", self.0)
    }
}

impl Error for MediaError {}

/// The playable resource behind the transport, mirroring the host-side audio
/// handle contract: play/pause/currentTime/playbackRate/duration. Hosts that
/// own real media playback implement this and mirror their element's state;
/// [`WallClockSource`] is the built-in self-driving implementation.
pub trait MediaSource {
    fn play(&mut self) -> Result<(), MediaError>;
    fn pause(&mut self);
    /// Seeks back to the start of the resource.
    fn rewind(&mut self);
    fn set_rate(&mut self, rate: f32);
    /// Elapsed song time in seconds. Frozen while paused.
    fn current_time(&self) -> f32;
    /// `None` while the resource's length is unknown.
    fn duration(&self) -> Option<f32>;
}

/// An `Instant`-driven media source: song time is wall time scaled by the
/// playback rate, accumulated across pause boundaries. Used when the host
/// plays audio elsewhere and the core is the authoritative clock.
#[derive(Debug)]
pub struct WallClockSource {
    accumulated: f32,
    rate: f32,
    resumed_at: Option<Instant>,
    duration: Option<f32>,
}

impl Default for WallClockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl WallClockSource {
    pub fn new() -> Self {
        Self { accumulated: 0.0, rate: 1.0, resumed_at: None, duration: None }
    }

    pub fn with_duration(duration: f32) -> Self {
        Self { duration: Some(duration), ..Self::new() }
    }

    fn freeze(&mut self) {
        if let Some(at) = self.resumed_at.take() {
            self.accumulated += at.elapsed().as_secs_f32() * self.rate;
        }
    }
}

impl MediaSource for WallClockSource {
    fn play(&mut self) -> Result<(), MediaError> {
        if self.resumed_at.is_none() {
            self.resumed_at = Some(Instant::now());
        }
        Ok(())
    }

    fn pause(&mut self) {
        self.freeze();
    }

    fn rewind(&mut self) {
        let was_running = self.resumed_at.is_some();
        self.freeze();
        self.accumulated = 0.0;
        if was_running {
            self.resumed_at = Some(Instant::now());
        }
    }

    fn set_rate(&mut self, rate: f32) {
        // Fold elapsed time at the old rate before the new one applies.
        let was_running = self.resumed_at.is_some();
        self.freeze();
        self.rate = rate;
        if was_running {
            self.resumed_at = Some(Instant::now());
        }
    }

    fn current_time(&self) -> f32 {
        self.accumulated
            + self
                .resumed_at
                .map_or(0.0, |at| at.elapsed().as_secs_f32() * self.rate)
    }

    fn duration(&self) -> Option<f32> {
        self.duration
    }
}

/// Wraps one playable resource and is the single time source for a round.
/// Starting is an explicit caller-triggered action; pausing is idempotent
/// and freezes elapsed time without touching round state.
pub struct TransportClock {
    source: Box<dyn MediaSource>,
    speed: PlaybackSpeed,
    running: bool,
}

impl TransportClock {
    pub fn new(source: Box<dyn MediaSource>) -> Self {
        Self { source, speed: PlaybackSpeed::Normal, running: false }
    }

    /// A transport backed by [`WallClockSource`].
    pub fn wall() -> Self {
        Self::new(Box::new(WallClockSource::new()))
    }

    /// Rewinds the resource and starts playback at the given speed.
    /// On failure the clock stays stopped and the error is returned once.
    pub fn start(&mut self, speed: PlaybackSpeed) -> Result<(), MediaError> {
        self.source.rewind();
        self.source.set_rate(speed.rate());
        self.source.play()?;
        self.speed = speed;
        self.running = true;
        info!("Transport started at {} speed (x{:.2})", speed, speed.rate());
        Ok(())
    }

    /// No-op when already paused or never started.
    pub fn pause(&mut self) {
        if self.running {
            self.source.pause();
            self.running = false;
        }
    }

    pub fn resume(&mut self) -> Result<(), MediaError> {
        if !self.running {
            self.source.play()?;
            self.running = true;
        }
        Ok(())
    }

    pub fn set_speed(&mut self, speed: PlaybackSpeed) {
        self.speed = speed;
        self.source.set_rate(speed.rate());
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.speed
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn current_time(&self) -> f32 {
        self.source.current_time()
    }

    pub fn duration(&self) -> Option<f32> {
        self.source.duration()
    }

    /// Halts playback and rewinds. Part of round teardown: a stopped clock
    /// cannot advance a discarded round.
    pub fn stop(&mut self) {
        self.pause();
        self.source.rewind();
    }
}

impl Drop for TransportClock {
    fn drop(&mut self) {
        self.pause();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_multipliers_hold_normal_at_unity() {
        assert_eq!(PlaybackSpeed::Slow.rate(), 0.75);
        assert_eq!(PlaybackSpeed::Normal.rate(), 1.0);
        assert_eq!(PlaybackSpeed::Fast.rate(), 1.25);
        assert_eq!("medium".parse(), Ok(PlaybackSpeed::Normal));
        assert_eq!("FAST".parse(), Ok(PlaybackSpeed::Fast));
        assert!("double".parse::<PlaybackSpeed>().is_err());
    }

    #[test]
    fn wall_source_stays_at_zero_until_played() {
        let src = WallClockSource::new();
        assert_eq!(src.current_time(), 0.0);
        assert_eq!(src.duration(), None);
        assert_eq!(WallClockSource::with_duration(12.5).duration(), Some(12.5));
    }

    #[test]
    fn pausing_a_stopped_clock_is_a_no_op() {
        let mut clock = TransportClock::wall();
        clock.pause();
        clock.pause();
        assert!(!clock.is_running());
        assert_eq!(clock.current_time(), 0.0);
    }

    #[test]
    fn start_marks_the_clock_running() {
        let mut clock = TransportClock::wall();
        clock.start(PlaybackSpeed::Fast).expect("wall source always starts");
        assert!(clock.is_running());
        assert_eq!(clock.speed(), PlaybackSpeed::Fast);
        clock.stop();
        assert!(!clock.is_running());
        assert_eq!(clock.current_time(), 0.0);
    }
}
