//! # DSP (Digital Signal Processing)
//!
//! Everything that runs on the audio thread:
//!
//! - **`note_division`**: maps the length parameters (1/32 note .. 2 bars)
//!   to buffer sizes in samples for a given tempo and sample rate.
//!
//! - **`riser_buffer`**: a fixed-capacity sample buffer with a movable
//!   logical length and gain-ramp fades, so tempo changes never allocate.
//!
//! - **`riser_line`**: the riser engine itself, two ping-pong staging
//!   buffers feeding an accelerating feedback delay line.

pub mod note_division;
pub mod riser_buffer;
pub mod riser_line;
