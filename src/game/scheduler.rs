use crate::core::input::Lane;
use crate::game::note::{Note, NoteState};
use crate::game::timing::TimingData;
use log::info;

/// Converts a timing transcript into the round's note list. Pure: identical
/// input always yields an identical, identically-ordered list.
///
/// Every word becomes a note; there is no difficulty subsampling. Lanes are
/// assigned round-robin as `(line_index + word_index) % 4`, which spreads
/// consecutive words evenly without authored charts.
pub fn schedule(timing: &TimingData) -> Vec<Note> {
    let mut notes = Vec::with_capacity(timing.word_count());
    for (line_idx, line) in timing.lines.iter().enumerate() {
        for (word_idx, word) in line.words.iter().enumerate() {
            notes.push(Note {
                id: notes.len(),
                text: word.text.clone(),
                lane: Lane::from_cycle(line_idx + word_idx),
                time: word.timestamp,
                duration: word.duration,
                state: NoteState::Pending,
            });
        }
    }
    info!("Scheduled {} notes for song {}", notes.len(), timing.song_id);
    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::timing::{Line, Word};

    fn word(text: &str, timestamp: f32) -> Word {
        Word { text: text.to_string(), timestamp, duration: 0.4 }
    }

    fn transcript(shape: &[usize]) -> TimingData {
        let mut t = 0.0;
        let lines = shape
            .iter()
            .map(|&n| Line {
                words: (0..n)
                    .map(|i| {
                        t += 0.5;
                        word(&format!("w{i}"), t)
                    })
                    .collect(),
            })
            .collect();
        TimingData {
            song_id: 1,
            title: String::new(),
            audio_ref: "test".to_string(),
            lines,
        }
    }

    #[test]
    fn every_word_becomes_exactly_one_note() {
        let timing = transcript(&[3, 0, 5, 2]);
        let notes = schedule(&timing);
        assert_eq!(notes.len(), 10);
        assert!(notes.iter().all(|n| n.state == NoteState::Pending));
        assert_eq!(
            notes.iter().map(|n| n.id).collect::<Vec<_>>(),
            (0..10).collect::<Vec<_>>()
        );
    }

    #[test]
    fn lanes_follow_the_line_plus_word_cycle() {
        let timing = transcript(&[2, 3]);
        let notes = schedule(&timing);
        // line 0: words 0,1 -> lanes 0,1; line 1: words 0,1,2 -> lanes 1,2,3
        let lanes: Vec<usize> = notes.iter().map(|n| n.lane.index()).collect();
        assert_eq!(lanes, vec![0, 1, 1, 2, 3]);
    }

    #[test]
    fn scheduling_is_deterministic() {
        let timing = transcript(&[4, 4, 4]);
        assert_eq!(schedule(&timing), schedule(&timing));
    }

    #[test]
    fn an_empty_transcript_yields_zero_notes() {
        let timing = transcript(&[]);
        assert!(schedule(&timing).is_empty());
    }
}
