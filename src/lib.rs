//! Rhythm-matching minigame core for a children's language-learning app.
//!
//! The host owns curriculum browsing, media playback, rendering, and
//! persistence; this crate turns a pre-timed lyric transcript into lanes of
//! hittable notes, judges lane input against them with bounded tolerance
//! windows, tracks combo/score ("flow"), and grades the round when every
//! note has resolved. Drive it from a single thread: one [`game::gameplay::update`]
//! per frame, input events in between.

pub mod config;
pub mod core;
pub mod game;

pub use crate::core::clock::{MediaError, MediaSource, PlaybackSpeed, TransportClock, WallClockSource};
pub use crate::core::input::{Lane, RouterEvent};
pub use crate::game::gameplay::{Phase, RenderableNote, RoundAction, RoundSummary, StartError};
pub use crate::game::judgment::{HitWindows, JudgeTier, TapJudgment};
pub use crate::game::note::{Note, NoteState};
pub use crate::game::scores::Grade;
pub use crate::game::session::Session;
pub use crate::game::timing::{TimingData, TimingError};
