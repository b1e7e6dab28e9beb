use crate::core::input::Lane;
use crate::game::note::{Note, NoteState};

/// How close the tap landed. The tier is player feedback only; every hit is
/// worth the same flat [`NOTE_POINTS`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JudgeTier {
    Perfect,
    Good,
    Ok,
}

/// Points awarded per resolved hit, regardless of tier.
pub const NOTE_POINTS: u32 = 100;

pub const PERFECT_WINDOW: f32 = 0.08;
pub const GOOD_WINDOW: f32 = 0.15;
pub const MISS_WINDOW: f32 = 0.25;

/// Nested absolute-delta thresholds. Invariant: `perfect <= good <= miss`;
/// `miss` is also the auto-miss boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitWindows {
    pub perfect: f32,
    pub good: f32,
    pub miss: f32,
}

impl Default for HitWindows {
    fn default() -> Self {
        Self { perfect: PERFECT_WINDOW, good: GOOD_WINDOW, miss: MISS_WINDOW }
    }
}

impl HitWindows {
    /// Classifies an absolute timing delta, or `None` beyond the miss window.
    pub fn tier_for(&self, abs_delta: f32) -> Option<JudgeTier> {
        if abs_delta <= self.perfect {
            Some(JudgeTier::Perfect)
        } else if abs_delta <= self.good {
            Some(JudgeTier::Good)
        } else if abs_delta <= self.miss {
            Some(JudgeTier::Ok)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TapJudgment {
    pub note_id: usize,
    pub lane: Lane,
    pub tier: JudgeTier,
    /// Signed timing error in seconds; positive means the tap came late.
    pub delta: f32,
}

/// Resolves a lane tap against the pending notes in that lane.
///
/// Candidates are pending notes within the miss window of `input_time`; the
/// one with the smallest absolute delta wins, ties going to the earliest
/// timestamp. Returns `None` when the tap was not near any note, a no-op:
/// stray taps never resolve or punish anything. The chosen note is marked
/// `Hit`; notes in other lanes or already-resolved states are never touched.
pub fn judge(
    notes: &mut [Note],
    lane: Lane,
    input_time: f32,
    windows: &HitWindows,
) -> Option<TapJudgment> {
    let mut best: Option<usize> = None;
    for (idx, note) in notes.iter().enumerate() {
        if note.lane != lane || note.state != NoteState::Pending {
            continue;
        }
        let abs_delta = (input_time - note.time).abs();
        if abs_delta > windows.miss {
            continue;
        }
        best = match best {
            None => Some(idx),
            Some(prev) => {
                let prev_abs = (input_time - notes[prev].time).abs();
                if abs_delta < prev_abs
                    || (abs_delta == prev_abs && note.time < notes[prev].time)
                {
                    Some(idx)
                } else {
                    Some(prev)
                }
            }
        };
    }

    let idx = best?;
    let delta = input_time - notes[idx].time;
    let tier = windows.tier_for(delta.abs())?;
    notes[idx].state = NoteState::Hit;
    Some(TapJudgment { note_id: notes[idx].id, lane, tier, delta })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: usize, lane: Lane, time: f32) -> Note {
        Note {
            id,
            text: format!("n{id}"),
            lane,
            time,
            duration: 0.4,
            state: NoteState::Pending,
        }
    }

    #[test]
    fn a_tap_far_from_every_note_is_a_no_op() {
        let mut notes = vec![note(0, Lane::Left, 5.0)];
        let windows = HitWindows::default();
        assert_eq!(judge(&mut notes, Lane::Left, 1.0, &windows), None);
        assert_eq!(notes[0].state, NoteState::Pending);
    }

    #[test]
    fn only_the_tapped_lane_is_considered() {
        let mut notes = vec![note(0, Lane::Down, 1.0), note(1, Lane::Left, 1.0)];
        let windows = HitWindows::default();
        let result = judge(&mut notes, Lane::Left, 1.0, &windows).expect("lane 0 note in range");
        assert_eq!(result.note_id, 1);
        assert_eq!(notes[0].state, NoteState::Pending, "other lane must stay untouched");
        assert_eq!(notes[1].state, NoteState::Hit);
    }

    #[test]
    fn resolved_notes_are_never_rejudged() {
        let mut notes = vec![note(0, Lane::Up, 1.0)];
        notes[0].state = NoteState::Hit;
        let windows = HitWindows::default();
        assert_eq!(judge(&mut notes, Lane::Up, 1.0, &windows), None);

        notes[0].state = NoteState::Missed;
        assert_eq!(judge(&mut notes, Lane::Up, 1.0, &windows), None);
        assert_eq!(notes[0].state, NoteState::Missed);
    }

    #[test]
    fn the_nearest_candidate_wins() {
        let mut notes = vec![note(0, Lane::Right, 1.00), note(1, Lane::Right, 1.18)];
        let windows = HitWindows::default();
        let result = judge(&mut notes, Lane::Right, 1.15, &windows).expect("both in range");
        assert_eq!(result.note_id, 1);
        assert_eq!(notes[0].state, NoteState::Pending);
    }

    #[test]
    fn equidistant_candidates_resolve_to_the_earlier_timestamp() {
        let mut notes = vec![note(0, Lane::Left, 1.1), note(1, Lane::Left, 0.9)];
        let windows = HitWindows::default();
        let result = judge(&mut notes, Lane::Left, 1.0, &windows).expect("both 0.1s away");
        assert_eq!(result.note_id, 1, "tie must break to the earlier note");
    }

    #[test]
    fn tiers_classify_by_nested_windows() {
        let windows = HitWindows::default();
        assert_eq!(windows.tier_for(0.0), Some(JudgeTier::Perfect));
        assert_eq!(windows.tier_for(0.08), Some(JudgeTier::Perfect));
        assert_eq!(windows.tier_for(0.081), Some(JudgeTier::Good));
        assert_eq!(windows.tier_for(0.15), Some(JudgeTier::Good));
        assert_eq!(windows.tier_for(0.2), Some(JudgeTier::Ok));
        assert_eq!(windows.tier_for(0.25), Some(JudgeTier::Ok));
        assert_eq!(windows.tier_for(0.251), None);
    }

    #[test]
    fn late_taps_report_a_positive_delta() {
        let mut notes = vec![note(0, Lane::Down, 2.0)];
        let windows = HitWindows::default();
        let result = judge(&mut notes, Lane::Down, 2.1, &windows).expect("in range");
        assert!(result.delta > 0.0, "tap after the note's timestamp is late");
        assert_eq!(result.tier, JudgeTier::Good);
    }
}
