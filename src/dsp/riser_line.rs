//! # Riser Line
//!
//! The per-sample engine behind the riser effect: a feedback delay line whose
//! read head speeds up over a tempo-synced cycle, so every pass through the
//! loop comes back higher and denser than the last.
//!
//! ## Signal Flow
//!
//! ```text
//!                 ┌──────────────┐
//! input ──► write │ riser stage  │  (writer: collects one cycle of input)
//!                 └──────────────┘
//!                 ┌──────────────┐
//!                 │ riser stage  │ ──► (+) ──► [delay buffer] ──► output
//!                 └──────────────┘      ▲            │ read head moves
//!                  (reader: drains the   │            │ 1.0 → cap samples
//!                   previous cycle)      └─ × gain ◄──┘ per step
//! ```
//!
//! ## Ping-Pong Stages
//!
//! Two equal-length staging buffers swap roles once per cycle. While one
//! records fresh input, the other is drained sample by sample into the
//! delay buffer. Both cursors advance in lockstep, so the writer fills up
//! on exactly the sample the reader runs dry; at that point the roles flip.
//!
//! ## Acceleration
//!
//! The delay write head moves one sample per step. The read head moves by
//! `accelerate_step`, which climbs from 1.0 toward `accelerate_cap` over one
//! riser cycle and snaps back to 1.0 when it gets there (or when the stages
//! swap). Reading faster than writing raises the pitch of the delayed audio
//! the same way a tape played at double speed sounds an octave up.
//!
//! ## Cursor Asymmetry
//!
//! The write head wraps at `len`, but the read head wraps at `len - 1`
//! because interpolation also touches the slot after the cursor. Negative
//! read positions are folded back by the same `len - 1` modulus, while
//! `configure()` folds by `len`. The two heads therefore drift by one slot
//! per wrap.

use super::note_division::{max_buffer_len, NoteDivision};
use super::riser_buffer::RiserBuffer;

const DEFAULT_TEMPO_BPM: f64 = 120.0;
const DEFAULT_SAMPLE_RATE: f64 = 44100.0;

/// Hard ceiling on the output. Feedback can exceed unity on purpose.
const OUTPUT_CEILING: f32 = 0.99;

/// Portion of a freshly filled stage faded out before it is drained.
const SWAP_FADE_FRACTION: f64 = 0.1;

/// Control values sampled once per block by the plugin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Controls {
    /// Note-division code for the delay buffer (see [`NoteDivision`]).
    pub delay_code: i32,
    /// Note-division code for the riser stages.
    pub riser_code: i32,
    /// Feedback amount in `0..=1`. Used as the loop gain while stage A
    /// records; stage B only nudges its fixed 0.5 gain with it.
    pub feedback: f32,
    /// Fastest read speed reached before the step resets, as a multiple
    /// of normal playback speed.
    pub accelerate_cap: f32,
    /// Host tempo in BPM. Must be positive.
    pub tempo: f64,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            delay_code: 3,
            riser_code: 5,
            feedback: 0.3,
            accelerate_cap: 4.0,
            tempo: DEFAULT_TEMPO_BPM,
        }
    }
}

/// Which stage is currently recording input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterRole {
    A,
    B,
}

impl WriterRole {
    fn writer(self) -> usize {
        match self {
            WriterRole::A => 0,
            WriterRole::B => 1,
        }
    }

    fn reader(self) -> usize {
        1 - self.writer()
    }

    fn swapped(self) -> Self {
        match self {
            WriterRole::A => WriterRole::B,
            WriterRole::B => WriterRole::A,
        }
    }

    /// Gain applied to the interpolated delay sample before it is summed
    /// back into the line.
    ///
    /// The two roles are deliberately unequal. With B writing, the gain
    /// stays close to 0.5 no matter the knob; with A writing, the knob
    /// value is used directly. The alternation keeps the accelerated passes
    /// from piling up energy without bound.
    pub fn feedback_gain(self, feedback: f32) -> f64 {
        match self {
            WriterRole::A => feedback as f64,
            WriterRole::B => 0.5 * (1.0 + 0.01 * feedback as f64),
        }
    }
}

/// One staging buffer and its two cursors.
struct Stage {
    buffer: RiserBuffer,
    write_pos: usize,
    read_pos: usize,
}

impl Stage {
    fn new(capacity: usize, len: usize) -> Self {
        Self {
            buffer: RiserBuffer::new(capacity, len),
            write_pos: 0,
            read_pos: 0,
        }
    }
}

/// The riser engine: one delay buffer fed by two ping-pong staging
/// buffers, read back by an accelerating fractional read head.
pub struct RiserLine {
    delay: RiserBuffer,
    stages: [Stage; 2],
    role: WriterRole,

    /// Integer write head into `delay`, wraps at `delay.len()`.
    delay_write: usize,

    /// Fractional read head into `delay`, wraps at `delay.len() - 1`.
    /// Negative between a role swap and the next sample.
    delay_read: f64,

    /// Current read-head increment, in `[1.0, accelerate_cap)`.
    accelerate_step: f32,

    accelerate_cap: f32,
    feedback: f32,
    tempo: f64,
    sample_rate: f64,
}

impl RiserLine {
    /// Build a line at 120 BPM / 44.1 kHz. Call
    /// [`configure()`](Self::configure) with the real values before
    /// processing.
    pub fn new(delay_code: i32, riser_code: i32) -> Self {
        let defaults = Controls::default();
        let capacity = max_buffer_len(DEFAULT_SAMPLE_RATE);
        let delay_len =
            NoteDivision::from_code(delay_code).buffer_len(DEFAULT_TEMPO_BPM, DEFAULT_SAMPLE_RATE);
        let riser_len =
            NoteDivision::from_code(riser_code).buffer_len(DEFAULT_TEMPO_BPM, DEFAULT_SAMPLE_RATE);

        Self {
            delay: RiserBuffer::new(capacity, delay_len),
            stages: [Stage::new(capacity, riser_len), Stage::new(capacity, riser_len)],
            role: WriterRole::A,
            delay_write: 0,
            delay_read: 0.0,
            accelerate_step: 1.0,
            accelerate_cap: defaults.accelerate_cap,
            feedback: defaults.feedback,
            tempo: DEFAULT_TEMPO_BPM,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }

    /// Size every buffer for the given controls and sample rate, silence
    /// them, and rewind all cursors.
    ///
    /// This is the only method that may allocate, and only when the sample
    /// rate needs more capacity than the buffers already have. It wipes the
    /// audio history, so call it on (re)initialization, not mid-stream.
    pub fn configure(&mut self, controls: &Controls, sample_rate: f64) {
        nih_plug::nih_debug_assert!(controls.tempo > 0.0, "tempo must be positive");
        nih_plug::nih_debug_assert!(sample_rate > 0.0, "sample rate must be positive");

        self.feedback = controls.feedback;
        self.accelerate_cap = controls.accelerate_cap;
        self.tempo = controls.tempo;
        self.sample_rate = sample_rate;

        let capacity = max_buffer_len(sample_rate);
        let delay_len = self.len_for(controls.delay_code);
        let riser_len = self.len_for(controls.riser_code);

        self.delay.reserve(capacity);
        self.delay.set_len(delay_len);
        self.delay.clear();

        for stage in &mut self.stages {
            stage.buffer.reserve(capacity);
            stage.buffer.set_len(riser_len);
            stage.buffer.clear();
            stage.write_pos = 0;
            stage.read_pos = 0;
        }

        self.delay_write = 0;
        let len = self.delay.len() as f64;
        self.delay_read = (self.delay_write as f64 - len).rem_euclid(len);

        self.role = WriterRole::A;
        self.accelerate_step = 1.0;
    }

    /// Run one input sample through the line and return the wet sample,
    /// already clipped to ±0.99.
    pub fn process(&mut self, input: f32, controls: &Controls) -> f32 {
        self.feedback = controls.feedback;
        self.accelerate_cap = controls.accelerate_cap;
        self.tempo = controls.tempo;

        self.follow_lengths(controls.delay_code, controls.riser_code);

        let writer = self.role.writer();
        let reader = self.role.reader();

        let stage = &mut self.stages[writer];
        stage.buffer.as_mut_slice()[stage.write_pos] = input;
        stage.write_pos += 1;

        let delay_len = self.delay.len();
        self.delay_read = wrap_read_cursor(self.delay_read, delay_len);
        if self.delay_write >= delay_len {
            self.delay_write = 0;
        }

        // The weights are reversed from the textbook form: the fraction
        // scales the sample *at* the cursor, its complement the one after.
        let base = self.delay_read.floor();
        let frac = self.delay_read - base;
        let base = base as usize;
        let delay = self.delay.as_slice();
        let interpolated =
            (frac * delay[base] as f64 + (1.0 - frac) * delay[base + 1] as f64) as f32;

        let stage = &mut self.stages[reader];
        let staged = stage.buffer.as_slice()[stage.read_pos];
        stage.read_pos += 1;

        let gain = self.role.feedback_gain(self.feedback);
        let feedback_sample = (staged as f64 + interpolated as f64 * gain) as f32;

        self.delay.as_mut_slice()[self.delay_write] = feedback_sample;
        let wet = self.delay.as_slice()[self.delay_read as usize];
        let wet = wet.clamp(-OUTPUT_CEILING, OUTPUT_CEILING);

        self.delay_write += 1;
        self.delay_read += self.accelerate_step as f64;

        let riser_len = self.riser_len();
        if self.stages[writer].write_pos >= riser_len && self.stages[reader].read_pos >= riser_len {
            self.swap_roles();
        }

        let increment = (self.accelerate_cap as f64 - 1.0) / riser_len as f64;
        self.accelerate_step = (self.accelerate_step as f64 + increment) as f32;
        if self.accelerate_step >= self.accelerate_cap {
            self.accelerate_step = 1.0;
        }

        wet
    }

    /// The stage currently recording input.
    pub fn writer(&self) -> WriterRole {
        self.role
    }

    pub fn delay_len(&self) -> usize {
        self.delay.len()
    }

    pub fn riser_len(&self) -> usize {
        self.stages[0].buffer.len()
    }

    /// Samples of output still to come after the input goes silent: the
    /// stage being drained, the stage being filled, and one pass of the
    /// delay buffer.
    pub fn tail_len(&self) -> usize {
        2 * self.riser_len() + self.delay_len()
    }

    fn len_for(&self, code: i32) -> usize {
        NoteDivision::from_code(code).buffer_len(self.tempo, self.sample_rate)
    }

    /// Track tempo and code changes without allocating.
    ///
    /// Runs every sample. Each buffer fades the tail of its old content and
    /// then moves to its new logical length; when nothing changed this only
    /// re-applies the tail fade. A new riser length restarts the cycle.
    fn follow_lengths(&mut self, delay_code: i32, riser_code: i32) {
        let delay_len = self.len_for(delay_code);
        let riser_len = self.len_for(riser_code);
        let old_riser_len = self.riser_len();

        self.delay.resize_with_fade(delay_len);
        for stage in &mut self.stages {
            stage.buffer.resize_with_fade(riser_len);
        }

        if self.riser_len() != old_riser_len {
            self.restart_cycle();
        }
    }

    fn restart_cycle(&mut self) {
        self.accelerate_step = 1.0;
        for stage in &mut self.stages {
            stage.write_pos = 0;
            stage.read_pos = 0;
        }
        self.delay_write = 0;
    }

    /// Hand the freshly filled stage over to the delay buffer and start
    /// recording into the one that was just drained.
    fn swap_roles(&mut self) {
        let filled = self.role.writer();
        let drained = self.role.reader();

        let buffer = &mut self.stages[filled].buffer;
        let len = buffer.len();
        buffer.apply_gain_ramp(0, len, 0.0, 1.0);
        buffer.fade_out_tail(SWAP_FADE_FRACTION);
        self.stages[filled].write_pos = 0;

        self.stages[drained].buffer.clear();
        self.stages[drained].read_pos = 0;

        self.role = self.role.swapped();

        // Restart the read head one delay length behind the write head. It
        // is left unfolded; the next sample folds it against whatever the
        // delay length is by then.
        self.delay_read = self.delay_write as f64 - self.delay.len() as f64;
        self.accelerate_step = 1.0;
    }
}

/// Fold the fractional read head into `[0, len - 1)`.
///
/// Negative positions wrap modulo `len - 1`. Anything at or past `len - 1`
/// restarts at zero, dropping the fractional part.
fn wrap_read_cursor(pos: f64, len: usize) -> f64 {
    let limit = (len - 1) as f64;
    let pos = if pos < 0.0 { pos.rem_euclid(limit) } else { pos };
    if pos >= limit {
        0.0
    } else {
        pos
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
