//! # Riser Buffer
//!
//! A single-channel sample buffer whose *length* follows the tempo while its
//! *memory* stays put.
//!
//! ## Capacity vs. Length
//!
//! The riser effect sizes its buffers in musical time, so every tempo or
//! length change asks for a different number of samples. Reallocating a
//! `Vec` on the audio thread is not an option: the allocator may take a
//! lock and stall the callback. Instead the buffer is allocated once at its
//! maximum size and keeps a separate logical length:
//!
//! ```text
//! |<------------------- capacity ------------------->|
//! |<------- len ------->|                            |
//! [ live samples ...... | unused (zeroed on growth)  ]
//! ```
//!
//! Shrinking just lowers `len`. Growing raises it and zeroes the region
//! that becomes visible, so stale audio from an earlier, longer length
//! never leaks back in.
//!
//! ## Gain Ramps
//!
//! Every seam in the riser (a resize, a role swap between the two staging
//! buffers) is hidden behind a linear gain ramp. The ramp matches the
//! classic "start gain plus fixed increment" form:
//!
//! ```text
//! gain[i] = start_gain + i * (end_gain - start_gain) / count
//! ```
//!
//! Note that the last sample gets `end_gain - increment`, never `end_gain`
//! itself. A 1 → 0 fade therefore leaves the final sample at `1/count`.

/// Smallest logical length a buffer may take. Linear interpolation reads
/// one sample past the cursor, so a buffer needs at least two slots.
pub const MIN_BUFFER_LEN: usize = 2;

/// Fraction of the old content faded out before a resize.
const RESIZE_FADE_FRACTION: f64 = 0.01;

pub struct RiserBuffer {
    /// Backing storage, always `capacity` samples long.
    samples: Vec<f32>,

    /// Number of samples currently in use.
    len: usize,
}

impl RiserBuffer {
    /// Create a silent buffer with room for `capacity` samples and a
    /// logical length of `len` (clamped into range).
    pub fn new(capacity: usize, len: usize) -> Self {
        let capacity = capacity.max(MIN_BUFFER_LEN);
        Self {
            samples: vec![0.0; capacity],
            len: len.clamp(MIN_BUFFER_LEN, capacity),
        }
    }

    /// Make sure the buffer can hold `capacity` samples.
    ///
    /// **Allocates** when the buffer has to grow. Only call this from
    /// `initialize()` or another non-real-time context.
    pub fn reserve(&mut self, capacity: usize) {
        if capacity > self.samples.len() {
            self.samples.resize(capacity, 0.0);
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.samples[..self.len]
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.samples[..self.len]
    }

    /// Change the logical length without allocating.
    ///
    /// The request is clamped to `[MIN_BUFFER_LEN, capacity]`. Samples below
    /// the smaller of the old and new lengths are kept; growth zero-pads.
    pub fn set_len(&mut self, len: usize) {
        let len = len.clamp(MIN_BUFFER_LEN, self.samples.len());
        if len > self.len {
            self.samples[self.len..len].fill(0.0);
        }
        self.len = len;
    }

    /// Fade the tail of the current content, then change the length.
    ///
    /// The terminal 1% of the old content ramps from full gain down toward
    /// silence, so whatever gets cut off (or padded after) starts from a
    /// quiet sample instead of a discontinuity.
    pub fn resize_with_fade(&mut self, len: usize) {
        self.fade_out_tail(RESIZE_FADE_FRACTION);
        self.set_len(len);
    }

    /// Ramp `floor(len * fraction)` samples from 1 toward 0, starting at
    /// `floor(len * (1 - fraction))`.
    ///
    /// Both bounds are floored independently, so when `len * fraction` is
    /// not a whole number the ramp ends one slot early and the final sample
    /// keeps full gain.
    pub fn fade_out_tail(&mut self, fraction: f64) {
        let start = (self.len as f64 * (1.0 - fraction)).floor() as usize;
        let count = (self.len as f64 * fraction).floor() as usize;
        self.apply_gain_ramp(start, count, 1.0, 0.0);
    }

    /// Multiply `count` samples starting at `start` by a linear gain ramp.
    ///
    /// The range is clipped to the logical length; an empty range does
    /// nothing.
    pub fn apply_gain_ramp(&mut self, start: usize, count: usize, start_gain: f32, end_gain: f32) {
        let start = start.min(self.len);
        let count = count.min(self.len - start);
        if count == 0 {
            return;
        }

        let increment = (end_gain - start_gain) / count as f32;
        let mut gain = start_gain;
        for sample in &mut self.samples[start..start + count] {
            *sample *= gain;
            gain += increment;
        }
    }

    /// Silence the logical contents.
    pub fn clear(&mut self) {
        self.samples[..self.len].fill(0.0);
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(capacity: usize, len: usize, value: f32) -> RiserBuffer {
        let mut buf = RiserBuffer::new(capacity, len);
        buf.as_mut_slice().fill(value);
        buf
    }

    #[test]
    fn test_new_is_silent() {
        let buf = RiserBuffer::new(64, 16);
        assert_eq!(buf.len(), 16);
        assert_eq!(buf.samples.len(), 64);
        assert!(buf.as_slice().iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_len_is_clamped() {
        let mut buf = RiserBuffer::new(8, 100);
        assert_eq!(buf.len(), 8, "length must not exceed capacity");

        buf.set_len(0);
        assert_eq!(buf.len(), MIN_BUFFER_LEN);

        buf.set_len(1000);
        assert_eq!(buf.len(), 8);
    }

    /// Shrinking keeps the head of the buffer untouched.
    #[test]
    fn test_shrink_preserves_head() {
        let mut buf = RiserBuffer::new(16, 8);
        for (i, s) in buf.as_mut_slice().iter_mut().enumerate() {
            *s = i as f32;
        }

        buf.set_len(4);
        assert_eq!(buf.as_slice(), &[0.0, 1.0, 2.0, 3.0]);
    }

    /// Growing after a shrink must not resurrect the truncated samples.
    #[test]
    fn test_grow_zero_pads() {
        let mut buf = filled(16, 8, 0.5);

        buf.set_len(4);
        buf.set_len(8);

        assert_eq!(&buf.as_slice()[..4], &[0.5; 4]);
        assert_eq!(&buf.as_slice()[4..], &[0.0; 4]);
    }

    #[test]
    fn test_gain_ramp_fade_in() {
        let mut buf = filled(4, 4, 1.0);
        buf.apply_gain_ramp(0, 4, 0.0, 1.0);

        let expected = [0.0, 0.25, 0.5, 0.75];
        for (got, want) in buf.as_slice().iter().zip(expected) {
            assert!((got - want).abs() < 1e-6, "Expected {want}, got {got}");
        }
    }

    #[test]
    fn test_gain_ramp_is_clipped_to_len() {
        let mut buf = filled(8, 4, 1.0);
        buf.apply_gain_ramp(2, 10, 0.0, 0.0);

        assert_eq!(buf.as_slice(), &[1.0, 1.0, 0.0, 0.0]);
        // Past the logical length nothing was touched (still silent).
        buf.set_len(8);
        assert_eq!(&buf.as_slice()[4..], &[0.0; 4]);
    }

    #[test]
    fn test_empty_ramp_is_noop() {
        let mut buf = filled(8, 8, 0.3);
        buf.apply_gain_ramp(3, 0, 0.0, 1.0);
        buf.apply_gain_ramp(8, 4, 0.0, 1.0);
        assert!(buf.as_slice().iter().all(|s| (*s - 0.3).abs() < 1e-6));
    }

    /// A 200-sample buffer fades its last 2 samples: gains 1.0 and 0.5.
    #[test]
    fn test_resize_fades_old_tail() {
        let mut buf = filled(400, 200, 1.0);
        buf.resize_with_fade(300);

        let s = buf.as_slice();
        assert_eq!(buf.len(), 300);
        assert!((s[197] - 1.0).abs() < 1e-6);
        assert!((s[198] - 1.0).abs() < 1e-6);
        assert!((s[199] - 0.5).abs() < 1e-6);
        assert!(s[200..].iter().all(|x| *x == 0.0));
    }

    /// Under 100 samples the 1% tail rounds down to nothing.
    #[test]
    fn test_resize_fade_on_short_buffer_is_noop() {
        let mut buf = filled(64, 50, 1.0);
        buf.resize_with_fade(50);
        assert!(buf.as_slice().iter().all(|s| *s == 1.0));
    }

    /// 1% of 12345 is 123.45: the ramp covers 12221..=12343 and the last
    /// slot is left alone.
    #[test]
    fn test_tail_fade_on_uneven_length() {
        let mut buf = filled(12345, 12345, 1.0);
        buf.fade_out_tail(0.01);

        let s = buf.as_slice();
        assert_eq!(s[12220], 1.0);
        assert_eq!(s[12221], 1.0);
        let last_ramped = 1.0 / 123.0;
        assert!(
            (s[12343] - last_ramped).abs() < 1e-4,
            "Expected {last_ramped}, got {}",
            s[12343]
        );
        assert_eq!(s[12344], 1.0, "final sample must keep full gain");
    }

    /// Swap-sized fade: 10% of 3409 ramps 340 samples from index 3068.
    #[test]
    fn test_tenth_fade_on_uneven_length() {
        let mut buf = filled(3409, 3409, 1.0);
        buf.fade_out_tail(0.1);

        let s = buf.as_slice();
        assert_eq!(s[3067], 1.0);
        assert_eq!(s[3068], 1.0);
        assert!((s[3069] - (1.0 - 1.0 / 340.0)).abs() < 1e-5);
        assert!((s[3407] - 1.0 / 340.0).abs() < 1e-4);
        assert_eq!(s[3408], 1.0);
    }

    #[test]
    fn test_clear() {
        let mut buf = filled(32, 32, 0.9);
        buf.clear();
        assert!(buf.as_slice().iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_reserve_only_grows() {
        let mut buf = filled(16, 16, 1.0);

        buf.reserve(8);
        assert_eq!(buf.samples.len(), 16);

        buf.reserve(64);
        assert_eq!(buf.samples.len(), 64);
        assert_eq!(buf.len(), 16, "reserve must not change the length");
        assert!(buf.as_slice().iter().all(|s| *s == 1.0));
    }
}
