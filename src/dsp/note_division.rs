//! # Tempo-Synced Note Divisions
//!
//! Both the delay buffer and the riser buffers are sized in musical time
//! rather than milliseconds. The host parameter stores a small integer code
//! and this module turns it into a length in samples:
//!
//! ```text
//! samples = 60 / tempo_bpm * beats * sample_rate
//! ```
//!
//! At 120 BPM and 48 kHz one beat lasts half a second, so:
//!
//! | code | division | beats | samples |
//! |------|----------|-------|---------|
//! | 1    | 1/32     | 0.125 | 3000    |
//! | 2    | 1/16     | 0.25  | 6000    |
//! | 3    | 1/8      | 0.5   | 12000   |
//! | 4    | 1/4      | 1     | 24000   |
//! | 5    | 1/2      | 2     | 48000   |
//! | 6    | 1 bar    | 4     | 96000   |
//! | 7    | 2 bars   | 8     | 192000  |

/// Slowest tempo the engine is sized for. Host tempos below this are
/// clamped by the plugin before they reach the DSP code.
pub const MIN_TEMPO_BPM: f64 = 20.0;

/// A tempo-relative buffer duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteDivision {
    ThirtySecond,
    Sixteenth,
    Eighth,
    Quarter,
    Half,
    Bar,
    TwoBars,
}

impl NoteDivision {
    pub const ALL: [NoteDivision; 7] = [
        NoteDivision::ThirtySecond,
        NoteDivision::Sixteenth,
        NoteDivision::Eighth,
        NoteDivision::Quarter,
        NoteDivision::Half,
        NoteDivision::Bar,
        NoteDivision::TwoBars,
    ];

    /// Map a parameter code to a division. Codes outside `1..=7` fall back
    /// to a quarter note.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => NoteDivision::ThirtySecond,
            2 => NoteDivision::Sixteenth,
            3 => NoteDivision::Eighth,
            4 => NoteDivision::Quarter,
            5 => NoteDivision::Half,
            6 => NoteDivision::Bar,
            7 => NoteDivision::TwoBars,
            _ => NoteDivision::Quarter,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            NoteDivision::ThirtySecond => 1,
            NoteDivision::Sixteenth => 2,
            NoteDivision::Eighth => 3,
            NoteDivision::Quarter => 4,
            NoteDivision::Half => 5,
            NoteDivision::Bar => 6,
            NoteDivision::TwoBars => 7,
        }
    }

    /// Length in quarter-note beats. Always a power of two, so scaling by
    /// it is exact in floating point.
    pub fn beats(self) -> f64 {
        match self {
            NoteDivision::ThirtySecond => 0.125,
            NoteDivision::Sixteenth => 0.25,
            NoteDivision::Eighth => 0.5,
            NoteDivision::Quarter => 1.0,
            NoteDivision::Half => 2.0,
            NoteDivision::Bar => 4.0,
            NoteDivision::TwoBars => 8.0,
        }
    }

    /// Length of this division in whole samples (truncated).
    ///
    /// `tempo_bpm` must be positive. A zero tempo yields an infinite
    /// length, which saturates to `usize::MAX` on the cast.
    pub fn buffer_len(self, tempo_bpm: f64, sample_rate: f64) -> usize {
        (60.0 / tempo_bpm * self.beats() * sample_rate) as usize
    }

    /// Text shown by the host for this division.
    pub fn label(self) -> &'static str {
        match self {
            NoteDivision::ThirtySecond => "1/32",
            NoteDivision::Sixteenth => "1/16",
            NoteDivision::Eighth => "1/8",
            NoteDivision::Quarter => "1/4",
            NoteDivision::Half => "1/2",
            NoteDivision::Bar => "1 bar",
            NoteDivision::TwoBars => "2 bars",
        }
    }

    /// Inverse of [`label()`](Self::label). Accepts surrounding whitespace
    /// and any letter case.
    pub fn from_label(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL
            .into_iter()
            .find(|division| division.label().eq_ignore_ascii_case(text))
    }
}

/// Capacity every engine buffer is pre-allocated to: two bars at the
/// slowest supported tempo.
pub fn max_buffer_len(sample_rate: f64) -> usize {
    NoteDivision::TwoBars.buffer_len(MIN_TEMPO_BPM, sample_rate)
}
