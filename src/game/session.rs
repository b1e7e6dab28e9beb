use crate::game::judgment::NOTE_POINTS;
use crate::game::scores::{self, Grade};

/// Combo values that trigger an encouragement callout, then every 25 above
/// the last rung.
pub const MILESTONE_LADDER: [u32; 14] = [3, 5, 8, 10, 13, 15, 18, 20, 25, 30, 35, 40, 45, 50];

/// Pure function of the current combo: the milestone it just reached, if any.
pub fn milestone_for(combo: u32) -> Option<u32> {
    if MILESTONE_LADDER.contains(&combo) {
        return Some(combo);
    }
    if combo > 50 && combo % 25 == 0 {
        return Some(combo);
    }
    None
}

/// One round's accumulated performance. Owned by the running round and only
/// mutated through the transition methods below; `score` and `total_hits`
/// never decrease within a round.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub score: u32,
    /// Consecutive hits since the last miss ("flow" in the product).
    pub combo: u32,
    pub max_combo: u32,
    pub total_hits: u32,
    pub total_notes: u32,
    /// Set exactly once, by [`Session::finalize`].
    pub grade: Option<Grade>,
}

impl Session {
    pub fn new(total_notes: usize) -> Self {
        Self { total_notes: total_notes as u32, ..Default::default() }
    }

    /// A note was hit: flat points, combo up, flow high-water mark updated.
    pub fn apply_hit(&mut self) {
        self.score += NOTE_POINTS;
        self.total_hits += 1;
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
    }

    /// A note was missed: the combo breaks, nothing else moves.
    pub fn apply_miss(&mut self) {
        self.combo = 0;
    }

    pub fn hit_ratio(&self) -> f64 {
        if self.total_notes == 0 {
            0.0
        } else {
            f64::from(self.total_hits) / f64::from(self.total_notes)
        }
    }

    /// Computes and records the final grade from the hit ratio.
    pub fn finalize(&mut self) -> Grade {
        let grade = scores::grade_for_ratio(self.hit_ratio());
        self.grade = Some(grade);
        grade
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hits_raise_score_combo_and_the_flow_high_water_mark() {
        let mut s = Session::new(4);
        s.apply_hit();
        s.apply_hit();
        assert_eq!(s.score, 2 * NOTE_POINTS);
        assert_eq!(s.combo, 2);
        assert_eq!(s.max_combo, 2);
        assert_eq!(s.total_hits, 2);
    }

    #[test]
    fn a_miss_breaks_the_combo_but_keeps_everything_else() {
        let mut s = Session::new(4);
        s.apply_hit();
        s.apply_hit();
        s.apply_miss();
        assert_eq!(s.combo, 0);
        assert_eq!(s.max_combo, 2);
        assert_eq!(s.score, 2 * NOTE_POINTS);
        assert_eq!(s.total_hits, 2);

        s.apply_hit();
        assert_eq!(s.combo, 1);
        assert_eq!(s.max_combo, 2, "max combo only moves on a new high");
    }

    #[test]
    fn an_empty_round_finalizes_to_f() {
        let mut s = Session::new(0);
        assert_eq!(s.hit_ratio(), 0.0);
        assert_eq!(s.finalize(), Grade::F);
        assert_eq!(s.grade, Some(Grade::F));
    }

    #[test]
    fn a_full_clear_finalizes_to_the_top_tier() {
        let mut s = Session::new(5);
        for _ in 0..5 {
            s.apply_hit();
        }
        assert_eq!(s.finalize(), Grade::APlus);
    }

    #[test]
    fn milestones_fire_on_the_ladder_then_every_25() {
        for combo in MILESTONE_LADDER {
            assert_eq!(milestone_for(combo), Some(combo));
        }
        assert_eq!(milestone_for(4), None);
        assert_eq!(milestone_for(21), None);
        assert_eq!(milestone_for(51), None);
        assert_eq!(milestone_for(60), None);
        assert_eq!(milestone_for(75), Some(75));
        assert_eq!(milestone_for(100), Some(100));
        assert_eq!(milestone_for(125), Some(125));
    }
}
