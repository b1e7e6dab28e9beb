use serde::{Serialize, Serializer};
use std::fmt;

/// Letter grades in ascending order, so `Ord` matches "better than" and a
/// host can keep a per-song best with `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Grade {
    F,
    DMinus,
    D,
    DPlus,
    CMinus,
    C,
    CPlus,
    BMinus,
    B,
    BPlus,
    AMinus,
    A,
    APlus,
}

impl Grade {
    pub const fn as_str(self) -> &'static str {
        match self {
            Grade::F => "F",
            Grade::DMinus => "D-",
            Grade::D => "D",
            Grade::DPlus => "D+",
            Grade::CMinus => "C-",
            Grade::C => "C",
            Grade::CPlus => "C+",
            Grade::BMinus => "B-",
            Grade::B => "B",
            Grade::BPlus => "B+",
            Grade::AMinus => "A-",
            Grade::A => "A",
            Grade::APlus => "A+",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Grade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Maps a hit ratio in [0, 1] to a letter grade through descending
/// >= thresholds. Total: every ratio lands on exactly one grade.
pub fn grade_for_ratio(ratio: f64) -> Grade {
    if ratio >= 0.97 { Grade::APlus }
    else if ratio >= 0.93 { Grade::A }
    else if ratio >= 0.90 { Grade::AMinus }
    else if ratio >= 0.87 { Grade::BPlus }
    else if ratio >= 0.83 { Grade::B }
    else if ratio >= 0.80 { Grade::BMinus }
    else if ratio >= 0.77 { Grade::CPlus }
    else if ratio >= 0.73 { Grade::C }
    else if ratio >= 0.70 { Grade::CMinus }
    else if ratio >= 0.67 { Grade::DPlus }
    else if ratio >= 0.63 { Grade::D }
    else if ratio >= 0.60 { Grade::DMinus }
    else { Grade::F }
}
