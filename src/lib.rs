//! # Rise Up: A Tempo-Synced Riser Plugin (AU/VST3/CLAP)
//!
//! A feedback delay whose read head accelerates over a musical cycle,
//! turning whatever you feed it into a rising sweep that lands on the beat.
//! Built with [nih-plug](https://github.com/robbert-vdh/nih-plug); the DSP
//! lives in [`dsp::riser_line`], this file is the thin host-facing shell.
//!
//! ## Signal Flow
//!
//! ```text
//! Input (ch 0) ──┬──────────────────────────────────── × (1 - mix) ───┐
//!                │                                                    │
//!                │    ┌──────────────────────────────────────────┐    │
//!                └──► │ RiserLine                                │    │
//!                     │  stage A / stage B  ──► accelerating     │    │
//!                     │  (ping-pong)            feedback delay   │    │
//!                     └──────────────────────────────────────────┘    │
//!                                        │                            │
//!                                        └──── × mix ────────────────(+)──► all channels
//! ```
//!
//! The engine is mono. The processed first channel is copied to every other
//! output channel.

pub mod dsp;
mod params;

use std::num::NonZeroU32;
use std::sync::Arc;

use dsp::note_division::MIN_TEMPO_BPM;
use dsp::riser_line::{Controls, RiserLine};
use nih_plug::prelude::*;
use params::RiseUpParams;

/// Tempo used until the host reports one.
const FALLBACK_TEMPO_BPM: f64 = 120.0;

struct RiseUp {
    params: Arc<RiseUpParams>,

    /// Set in `initialize()`. Needed again whenever `reset()` re-configures
    /// the engine.
    sample_rate: f32,

    /// Last tempo the host reported, already clamped to the supported
    /// range. Hosts may omit the tempo on some blocks (e.g. while stopped),
    /// so we keep the last good value instead of jumping back to a default.
    tempo: f64,

    riser_line: RiserLine,
}

impl Default for RiseUp {
    fn default() -> Self {
        let params = Arc::new(RiseUpParams::default());
        let riser_line = RiserLine::new(params.delay_time.value(), params.riser_length.value());

        Self {
            params,
            sample_rate: 44100.0,
            tempo: FALLBACK_TEMPO_BPM,
            riser_line,
        }
    }
}

impl RiseUp {
    /// Snapshot the control values for this block. Every parameter read is
    /// a single atomic load.
    fn controls(&self) -> Controls {
        Controls {
            delay_code: self.params.delay_time.value(),
            riser_code: self.params.riser_length.value(),
            feedback: self.params.feedback.value(),
            accelerate_cap: self.params.accelerate_cap.value(),
            tempo: self.tempo,
        }
    }
}

/// Clamp a host tempo into the range the engine's buffers are sized for.
/// Non-finite or non-positive values are rejected so the last good tempo
/// is kept.
fn sanitize_tempo(tempo: f64) -> Option<f64> {
    (tempo.is_finite() && tempo > 0.0).then(|| tempo.max(MIN_TEMPO_BPM))
}

impl Plugin for RiseUp {
    const NAME: &'static str = "Rise Up";
    const VENDOR: &'static str = "Rise Up Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // Stereo first since most DAW tracks are stereo; the engine itself
    // only ever sees the first channel.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;

    // Controls are sampled once per block, so sub-block automation would
    // only split buffers for nothing.
    const SAMPLE_ACCURATE_AUTOMATION: bool = false;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    /// Called when the plugin is loaded or the audio configuration changes.
    /// This is the one place the engine is allowed to grow its buffers.
    fn initialize(
        &mut self,
        _audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        if buffer_config.sample_rate <= 0.0 {
            nih_error!("Refusing a sample rate of {} Hz", buffer_config.sample_rate);
            return false;
        }
        self.sample_rate = buffer_config.sample_rate;

        let controls = self.controls();
        self.riser_line.configure(&controls, self.sample_rate as f64);

        nih_log!(
            "Configured at {} Hz, {} BPM: delay {} samples, riser {} samples",
            self.sample_rate,
            self.tempo,
            self.riser_line.delay_len(),
            self.riser_line.riser_len()
        );

        true
    }

    /// Called when playback (re)starts or the plugin is un-bypassed.
    ///
    /// Re-configuring wipes the delay and riser buffers and rewinds the
    /// cycle so the first rise starts in time with the transport. The
    /// sample rate is unchanged here, so this never allocates.
    fn reset(&mut self) {
        let controls = self.controls();
        self.riser_line.configure(&controls, self.sample_rate as f64);
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        if let Some(tempo) = context.transport().tempo.and_then(sanitize_tempo) {
            self.tempo = tempo;
        }

        // One snapshot per block, held constant across its samples.
        let controls = self.controls();

        for mut channel_samples in buffer.iter_samples() {
            let mix = self.params.mix.smoothed.next();

            let mut channels = channel_samples.iter_mut();
            let Some(first) = channels.next() else {
                continue;
            };

            let dry = *first;
            let wet = self.riser_line.process(dry, &controls);
            let out = wet * mix + dry * (1.0 - mix);

            *first = out;
            for sample in channels {
                *sample = out;
            }
        }

        ProcessStatus::Tail(self.riser_line.tail_len() as u32)
    }
}

impl ClapPlugin for RiseUp {
    const CLAP_ID: &'static str = "com.rise-up-audio.rise-up";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("A tempo-synced riser built from an accelerating feedback delay");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Mono,
        ClapFeature::Delay,
    ];
}

impl Vst3Plugin for RiseUp {
    const VST3_CLASS_ID: [u8; 16] = *b"RiseUpRiser_v001";
    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Delay];
}

nih_export_clap!(RiseUp);
nih_export_vst3!(RiseUp);

// AUv2 entry point for Logic Pro, generated from the CLAP export.
clap_wrapper::export_auv2!();
