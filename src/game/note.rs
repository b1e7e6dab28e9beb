use crate::core::input::Lane;

/// Notes only ever move forward: `Pending -> {Hit | Missed} -> Expired`.
/// `Hit` and `Missed` are terminal for scoring; `Expired` exists so a
/// presentation layer can finish an exit animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteState {
    Pending,
    Hit,
    Missed,
    Expired,
}

impl NoteState {
    #[inline(always)]
    pub const fn is_resolved(self) -> bool {
        !matches!(self, NoteState::Pending)
    }
}

/// One hittable event, derived from one transcript word.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: usize,
    pub text: String,
    pub lane: Lane,
    /// Target hit time, seconds from song start.
    pub time: f32,
    pub duration: f32,
    pub state: NoteState,
}
