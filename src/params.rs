//! # Plugin Parameters
//!
//! The five knobs of the riser. Two of them pick a note division, so they
//! are integer parameters that display as note names ("1/8", "1 bar")
//! instead of raw codes. The IDs are what hosts store in presets and
//! automation lanes, so they must never change once published.
//!
//! nih-plug keeps every parameter value in an atomic. The audio thread
//! reads them with `.value()` once per block, which gives a wait-free
//! hand-off from the UI/automation thread without any locks.

use std::sync::Arc;

use nih_plug::prelude::*;

use crate::dsp::note_division::NoteDivision;

#[derive(Params)]
pub struct RiseUpParams {
    /// **Delay Time**: length of the delay buffer, 1/32 note to 1/2 note.
    #[id = "delayTime"]
    pub delay_time: IntParam,

    /// **Riser Length**: length of one rise cycle, 1/8 note to 2 bars.
    /// Each cycle the read speed climbs from 1x to the accelerate cap.
    #[id = "riserLength"]
    pub riser_length: IntParam,

    /// **Feedback**: how much of the delayed signal is summed back in.
    /// Only half of the cycles use this value directly; the others use a
    /// fixed gain just above 0.5.
    #[id = "feedback"]
    pub feedback: FloatParam,

    /// **Accelerate Cap**: top read speed. 2.0 is one octave up at the
    /// end of the rise, 4.0 is two.
    #[id = "accelerateCap"]
    pub accelerate_cap: FloatParam,

    /// **Wet/Dry**: blend between the riser output and the input.
    #[id = "wetDryRatio"]
    pub mix: FloatParam,
}

fn note_division_param(name: &str, default: i32, min: i32, max: i32) -> IntParam {
    IntParam::new(name, default, IntRange::Linear { min, max })
        .with_value_to_string(Arc::new(|code: i32| {
            NoteDivision::from_code(code).label().to_string()
        }))
        .with_string_to_value(Arc::new(|text: &str| {
            NoteDivision::from_label(text).map(NoteDivision::code)
        }))
}

impl Default for RiseUpParams {
    fn default() -> Self {
        Self {
            delay_time: note_division_param("Delay Time", 3, 1, 5),

            riser_length: note_division_param("Riser Length", 5, 3, 7),

            // No smoother: the engine samples this once per block.
            feedback: FloatParam::new("Feedback", 0.3, FloatRange::Linear { min: 0.0, max: 1.0 })
                .with_unit("%")
                .with_step_size(0.01)
                .with_value_to_string(formatters::v2s_f32_percentage(0))
                .with_string_to_value(formatters::s2v_f32_percentage()),

            accelerate_cap: FloatParam::new(
                "Accelerate Cap",
                4.0,
                FloatRange::Linear { min: 1.1, max: 4.0 },
            )
            .with_unit("x")
            .with_step_size(0.1),

            // The blend happens per sample in the plugin, so this one can
            // be smoothed to avoid zipper noise.
            mix: FloatParam::new("Wet/Dry", 0.5, FloatRange::Linear { min: 0.0, max: 1.0 })
                .with_unit("%")
                .with_smoother(SmoothingStyle::Linear(20.0))
                .with_step_size(0.01)
                .with_value_to_string(formatters::v2s_f32_percentage(0))
                .with_string_to_value(formatters::s2v_f32_percentage()),
        }
    }
}
