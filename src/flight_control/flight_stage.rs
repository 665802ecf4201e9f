use strum_macros::{Display, EnumCount, EnumIter, EnumString};

/// The discrete phase of flight assigned by the stage classifier.
///
/// Variants are declared in flight order, so the derived `Ord` is the progression order:
/// `LaunchPad < PoweredAscent < CoastingAscent < Apogee < Descent < Landing`.
/// Stages only ever move forward; `Landing` is terminal.
#[derive(
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Clone,
    Copy,
    Hash,
    Display,
    EnumIter,
    EnumCount,
    EnumString,
)]
pub enum Stage {
    #[default]
    LaunchPad,
    PoweredAscent,
    CoastingAscent,
    Apogee,
    Descent,
    Landing,
}

impl Stage {
    /// Returns `true` for the stage no classification can leave.
    pub fn is_terminal(self) -> bool { self == Stage::Landing }

    /// Whether entering this stage should be announced to the operator (buzzer).
    pub fn is_announced(self) -> bool { matches!(self, Stage::PoweredAscent | Stage::Landing) }
}
