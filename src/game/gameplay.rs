use crate::config;
use crate::core::clock::{MediaError, PlaybackSpeed, TransportClock};
use crate::core::input::{Lane, RouterEvent};
use crate::game::judgment::{self, HitWindows, TapJudgment};
use crate::game::note::{Note, NoteState};
use crate::game::scheduler;
use crate::game::scores::Grade;
use crate::game::session::{self, Session};
use crate::game::timing::{TimingData, TimingError};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Round lifecycle. The only way back to `Playing` from `Ended` is an
/// explicit reset to `Setup` followed by a fresh start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Setup,
    Playing,
    Paused,
    Ended,
}

/// What the host should do after a tick or an explicit request, in the
/// spirit of a screen-action return: the round never navigates by itself.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundAction {
    None,
    /// The round just ended; the summary is in `State::summary`.
    Ended,
    NextSong,
    Back,
}

/// Handed to the host exactly once per round, at `Playing -> Ended`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RoundSummary {
    pub song_id: u32,
    pub score: u32,
    pub max_combo: u32,
    pub total_hits: u32,
    pub total_notes: u32,
    pub grade: Grade,
    pub played_at: DateTime<Utc>,
}

#[derive(Debug)]
pub enum StartError {
    /// The round is not sitting in setup with timing data loaded.
    NotInSetup,
    /// The media resource refused to start (e.g. blocked autoplay).
    /// Reported once; the host retries from a fresh user gesture.
    Media(MediaError),
}

impl fmt::Display for StartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartError::NotInSetup => write!(f, "round is not ready to start"),
            StartError::Media(e) => write!(f, "could not start playback: {e}"),
        }
    }
}

impl Error for StartError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StartError::Media(e) => Some(e),
            StartError::NotInSetup => None,
        }
    }
}

/// A visible note's presentation-space position: 0.0 at spawn, 1.0 at the
/// hit line. Carries no scoring state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderableNote {
    pub note_id: usize,
    pub lane: Lane,
    pub progress: f32,
}

pub type CompletionCallback = Box<dyn FnMut(&RoundSummary)>;
pub type MilestoneCallback = Box<dyn FnMut(u32)>;

/// One round of the rhythm game. All mutable round state lives here, owned
/// by the host's single logical thread of control: the tick loop calls
/// [`update`], input handlers call [`handle_input`], and nothing else
/// mutates notes or the session.
pub struct State {
    phase: Phase,
    pub timing: Option<Arc<TimingData>>,
    pub load_error: Option<TimingError>,
    pub notes: Vec<Note>,
    pub session: Session,
    pub clock: TransportClock,
    pub windows: HitWindows,
    pub last_judgment: Option<TapJudgment>,
    pub summary: Option<RoundSummary>,
    exit_time: f32,
    on_complete: Option<CompletionCallback>,
    on_milestone: Option<MilestoneCallback>,
}

impl State {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::Ended
    }
}

fn empty_state(phase: Phase, timing: Option<Arc<TimingData>>, clock: TransportClock) -> State {
    State {
        phase,
        timing,
        load_error: None,
        notes: Vec::new(),
        session: Session::new(0),
        clock,
        windows: config::get().hit_windows(),
        last_judgment: None,
        summary: None,
        exit_time: 0.0,
        on_complete: None,
        on_milestone: None,
    }
}

/// A round whose timing document is still on its way. Feed the fetch result
/// through [`timing_loaded`] or [`timing_failed`].
pub fn begin_loading(clock: TransportClock) -> State {
    empty_state(Phase::Loading, None, clock)
}

/// A round for already-loaded timing data, ready in setup, timed by the
/// built-in wall clock.
pub fn init(timing: Arc<TimingData>) -> State {
    init_with_clock(timing, TransportClock::wall())
}

pub fn init_with_clock(timing: Arc<TimingData>, clock: TransportClock) -> State {
    info!(
        "Round ready in setup: song {} ({} words)",
        timing.song_id,
        timing.word_count()
    );
    empty_state(Phase::Setup, Some(timing), clock)
}

pub fn timing_loaded(state: &mut State, timing: Arc<TimingData>) {
    if state.phase != Phase::Loading {
        warn!("Ignoring timing data delivered outside the loading phase.");
        return;
    }
    info!(
        "Timing loaded for song {} ({} words); entering setup.",
        timing.song_id,
        timing.word_count()
    );
    state.timing = Some(timing);
    state.load_error = None;
    state.phase = Phase::Setup;
}

/// Records a fetch failure. The round stays in `Loading`; it can never
/// silently hang its way into a playable state.
pub fn timing_failed(state: &mut State, err: TimingError) {
    warn!("Timing data failed to load: {err}");
    state.load_error = Some(err);
}

pub fn set_on_complete(state: &mut State, callback: CompletionCallback) {
    state.on_complete = Some(callback);
}

pub fn set_on_milestone(state: &mut State, callback: MilestoneCallback) {
    state.on_milestone = Some(callback);
}

/// Starts the round: schedules a fresh note list, zeroes the session, and
/// starts the transport. Requires an explicit user action in the host (so a
/// browser's autoplay policy is satisfied). On a media failure the round
/// stays in setup and nothing is scheduled.
pub fn start(state: &mut State, speed: PlaybackSpeed) -> Result<(), StartError> {
    if state.phase != Phase::Setup {
        return Err(StartError::NotInSetup);
    }
    let Some(timing) = state.timing.clone() else {
        return Err(StartError::NotInSetup);
    };

    state.clock.start(speed).map_err(StartError::Media)?;

    let notes = scheduler::schedule(&timing);
    state.exit_time = last_note_time(&notes)
        .map(|t| t + state.windows.miss + config::EXIT_GRACE)
        .unwrap_or(0.0);
    state.session = Session::new(notes.len());
    state.notes = notes;
    state.last_judgment = None;
    state.summary = None;
    state.phase = Phase::Playing;
    info!(
        "Round started: song {}, {} notes, {} speed",
        timing.song_id,
        state.notes.len(),
        speed
    );
    Ok(())
}

fn last_note_time(notes: &[Note]) -> Option<f32> {
    notes.iter().map(|n| n.time).reduce(f32::max)
}

/// The per-frame tick. Sweeps auto-misses, expires resolved notes, and
/// detects the single terminal condition: every note resolved and the clock
/// past the last note's full expiry time. Suspended while paused; a tick
/// outside `Playing` is a no-op, so a stray frame after teardown cannot
/// mutate anything.
pub fn update(state: &mut State) -> RoundAction {
    if state.phase != Phase::Playing {
        return RoundAction::None;
    }

    let now = state.clock.current_time();
    sweep_notes(state, now);

    if now > state.exit_time && state.notes.iter().all(|n| n.state.is_resolved()) {
        finish_round(state);
        return RoundAction::Ended;
    }
    RoundAction::None
}

fn sweep_notes(state: &mut State, now: f32) {
    let miss_window = state.windows.miss;
    for note in &mut state.notes {
        match note.state {
            NoteState::Pending if now > note.time + miss_window => {
                note.state = NoteState::Missed;
                state.session.apply_miss();
                info!("MISSED: note {} '{}' at {:.2}s", note.id, note.text, now);
            }
            NoteState::Hit | NoteState::Missed
                if now > note.time + miss_window + config::EXIT_GRACE =>
            {
                note.state = NoteState::Expired;
            }
            _ => {}
        }
    }
}

fn finish_round(state: &mut State) {
    let grade = state.session.finalize();
    let summary = RoundSummary {
        song_id: state.timing.as_ref().map_or(0, |t| t.song_id),
        score: state.session.score,
        max_combo: state.session.max_combo,
        total_hits: state.session.total_hits,
        total_notes: state.session.total_notes,
        grade,
        played_at: Utc::now(),
    };
    info!(
        "Round over: song {}, score {}, flow {}, {}/{} hits, grade {}",
        summary.song_id,
        summary.score,
        summary.max_combo,
        summary.total_hits,
        summary.total_notes,
        summary.grade
    );
    if let Some(callback) = state.on_complete.as_mut() {
        callback(&summary);
    }
    state.summary = Some(summary);
    state.phase = Phase::Ended;
}

/// Judges a synthetic `(lane, input_time)` pair. The public seam the input
/// router feeds; also what tests drive directly.
pub fn judge_tap(state: &mut State, lane: Lane, input_time: f32) -> Option<TapJudgment> {
    if state.phase != Phase::Playing {
        return None;
    }
    let result = judgment::judge(&mut state.notes, lane, input_time, &state.windows)?;
    state.session.apply_hit();
    info!(
        "JUDGED: note {}, {:?}, {:+.1}ms, {:?}, combo {}",
        result.note_id,
        result.lane,
        result.delta * 1000.0,
        result.tier,
        state.session.combo
    );
    if let Some(milestone) = session::milestone_for(state.session.combo) {
        if let Some(callback) = state.on_milestone.as_mut() {
            callback(milestone);
        }
    }
    state.last_judgment = Some(result.clone());
    Some(result)
}

/// Routes a device-independent input event into the round.
pub fn handle_input(state: &mut State, event: RouterEvent) -> Option<TapJudgment> {
    match event {
        RouterEvent::PauseToggle => {
            toggle_pause(state);
            None
        }
        RouterEvent::Lane(lane) => {
            let input_time = state.clock.current_time();
            judge_tap(state, lane, input_time)
        }
    }
}

/// Freezes the clock and suspends ticking. Idempotent: pausing a paused or
/// not-yet-started round does nothing, and no note or session state moves.
pub fn pause(state: &mut State) {
    if state.phase != Phase::Playing {
        return;
    }
    state.clock.pause();
    state.phase = Phase::Paused;
    info!("Round paused at {:.2}s", state.clock.current_time());
}

pub fn resume(state: &mut State) {
    if state.phase != Phase::Paused {
        return;
    }
    match state.clock.resume() {
        Ok(()) => {
            state.phase = Phase::Playing;
            info!("Round resumed at {:.2}s", state.clock.current_time());
        }
        Err(e) => warn!("Could not resume playback, staying paused: {e}"),
    }
}

pub fn toggle_pause(state: &mut State) {
    match state.phase {
        Phase::Playing => pause(state),
        Phase::Paused => resume(state),
        _ => {}
    }
}

/// Tears the round down to setup: stops the transport (so no stale tick can
/// touch discarded state), drops the note list, and zeroes the session.
/// Valid from playing, paused, or ended; restarting is then a fresh `start`.
pub fn reset(state: &mut State) {
    if state.phase == Phase::Loading {
        return;
    }
    state.clock.stop();
    state.notes.clear();
    state.session = Session::new(0);
    state.last_judgment = None;
    state.summary = None;
    state.exit_time = 0.0;
    state.phase = Phase::Setup;
    info!("Round reset to setup.");
}

/// Host navigation, available once the summary is up.
pub fn request_next_song(state: &State) -> RoundAction {
    if state.phase == Phase::Ended {
        RoundAction::NextSong
    } else {
        RoundAction::None
    }
}

pub fn request_back(_state: &State) -> RoundAction {
    RoundAction::Back
}

/// Pure projection of the note list at a moment in time. A note is visible
/// from `NOTE_TRAVEL_TIME` before its timestamp until the miss boundary
/// after it; progress runs 0 at spawn to 1 at the hit line. Presentation
/// only; no scoring state is derived from this.
pub fn project_frame(time: f32, notes: &[Note], windows: &HitWindows) -> Vec<RenderableNote> {
    notes
        .iter()
        .filter(|n| n.state == NoteState::Pending)
        .filter_map(|n| {
            let time_until = n.time - time;
            if time_until > config::NOTE_TRAVEL_TIME || time_until < -windows.miss {
                return None;
            }
            let progress = (1.0 - time_until / config::NOTE_TRAVEL_TIME).clamp(0.0, 1.0);
            Some(RenderableNote { note_id: n.id, lane: n.lane, progress })
        })
        .collect()
}

/// [`project_frame`] at the round's current clock time.
pub fn project(state: &State) -> Vec<RenderableNote> {
    project_frame(state.clock.current_time(), &state.notes, &state.windows)
}
