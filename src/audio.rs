//! Audio cues
//!
//! Three cues: a looping engine hum plus one-shot crash and score sounds.
//! On the web they are synthesised with the Web Audio API - no asset files.
//! Audio is cosmetic: every failure degrades to silence, never to an error.

use crate::consts::{CRASH_VOLUME, ENGINE_VOLUME, SCORE_VOLUME};

/// Named sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Looping engine hum while running
    Engine,
    /// Car hit an obstacle
    Crash,
    /// Obstacle passed off-screen
    Score,
}

impl SoundCue {
    pub fn name(&self) -> &'static str {
        match self {
            SoundCue::Engine => "engine",
            SoundCue::Crash => "crash",
            SoundCue::Score => "score",
        }
    }

    /// Cue volume before the master volume is applied
    pub fn volume(&self) -> f32 {
        match self {
            SoundCue::Engine => ENGINE_VOLUME,
            SoundCue::Crash => CRASH_VOLUME,
            SoundCue::Score => SCORE_VOLUME,
        }
    }

    pub fn looping(&self) -> bool {
        matches!(self, SoundCue::Engine)
    }
}

/// Transitions of the looping engine cue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineSound {
    Start,
    Pause,
    Resume,
    Stop,
}

/// Sound output
pub trait AudioSink {
    /// Fire a one-shot cue
    fn play(&mut self, cue: SoundCue);
    /// Drive the engine loop
    fn engine(&mut self, sound: EngineSound);
}

/// Sink that plays nothing (native builds, audio disabled)
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&mut self, _cue: SoundCue) {}
    fn engine(&mut self, _sound: EngineSound) {}
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, EngineSound, SoundCue};

    /// Oscillators making up the running engine hum
    struct EngineVoice {
        oscillators: Vec<OscillatorNode>,
        gain: GainNode,
    }

    impl EngineVoice {
        fn silence(self) {
            for osc in &self.oscillators {
                osc.stop().ok();
            }
            self.gain.disconnect().ok();
        }
    }

    /// Web Audio sink
    pub struct WebAudio {
        ctx: Option<AudioContext>,
        master_volume: f32,
        muted: bool,
        voice: Option<EngineVoice>,
    }

    impl Default for WebAudio {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebAudio {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                master_volume: 0.8,
                muted: false,
                voice: None,
            }
        }

        /// Set master volume (0.0 - 1.0)
        pub fn set_master_volume(&mut self, vol: f32) {
            self.master_volume = vol.clamp(0.0, 1.0);
            self.refresh_engine_gain();
        }

        /// Mute/unmute all audio
        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
            self.refresh_engine_gain();
        }

        pub fn muted(&self) -> bool {
            self.muted
        }

        fn effective_volume(&self, cue: SoundCue) -> f32 {
            if self.muted {
                0.0
            } else {
                self.master_volume * cue.volume()
            }
        }

        /// Context, resumed if the browser suspended it
        fn live_ctx(&self) -> Option<&AudioContext> {
            let ctx = self.ctx.as_ref()?;
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
            Some(ctx)
        }

        fn refresh_engine_gain(&self) {
            if let Some(voice) = &self.voice {
                voice
                    .gain
                    .gain()
                    .set_value(self.effective_volume(SoundCue::Engine) * 0.3);
            }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Engine - low sawtooth with a detuned square an octave up
        fn start_voice(&mut self) {
            if let Some(voice) = self.voice.take() {
                voice.silence();
            }
            let vol = self.effective_volume(SoundCue::Engine) * 0.3;
            let Some(ctx) = self.live_ctx() else { return };

            let Some((base, gain)) = Self::create_osc(ctx, 55.0, OscillatorType::Sawtooth) else {
                log::warn!("Engine sound unavailable");
                return;
            };
            gain.gain().set_value(vol);
            let mut oscillators = vec![base];

            if let Ok(upper) = ctx.create_oscillator() {
                upper.set_type(OscillatorType::Square);
                upper.frequency().set_value(111.0);
                if upper.connect_with_audio_node(&gain).is_ok() {
                    oscillators.push(upper);
                }
            }

            for osc in &oscillators {
                osc.start().ok();
            }
            self.voice = Some(EngineVoice { oscillators, gain });
        }

        fn stop_voice(&mut self) {
            if let Some(voice) = self.voice.take() {
                voice.silence();
            }
        }

        /// Crash - falling sawtooth growl with a square crack
        fn play_crash(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();

            if let Some((osc, gain)) = Self::create_osc(ctx, 220.0, OscillatorType::Sawtooth) {
                gain.gain().set_value_at_time(vol * 0.8, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.6)
                    .ok();
                osc.frequency().set_value_at_time(220.0, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(35.0, t + 0.6)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.7).ok();
            }

            if let Some((osc, gain)) = Self::create_osc(ctx, 1800.0, OscillatorType::Square) {
                gain.gain().set_value_at_time(vol * 0.3, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                    .ok();
                osc.frequency().set_value_at_time(1800.0, t).ok();
                osc.frequency().set_value_at_time(400.0, t + 0.03).ok();
                osc.frequency().set_value_at_time(1200.0, t + 0.06).ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.15).ok();
            }
        }

        /// Score - two rising notes
        fn play_score(&self, ctx: &AudioContext, vol: f32) {
            for (i, freq) in [660.0, 880.0].iter().enumerate() {
                let delay = i as f64 * 0.07;
                if let Some((osc, gain)) = Self::create_osc(ctx, *freq, OscillatorType::Triangle) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(vol * 0.4, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.18)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.2).ok();
                }
            }
        }
    }

    impl AudioSink for WebAudio {
        fn play(&mut self, cue: SoundCue) {
            if cue.looping() {
                self.engine(EngineSound::Start);
                return;
            }
            let vol = self.effective_volume(cue);
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = self.live_ctx() else { return };
            log::debug!("Cue {} at volume {:.2}", cue.name(), vol);
            match cue {
                SoundCue::Crash => self.play_crash(ctx, vol),
                SoundCue::Score => self.play_score(ctx, vol),
                SoundCue::Engine => {}
            }
        }

        fn engine(&mut self, sound: EngineSound) {
            match sound {
                EngineSound::Start => self.start_voice(),
                EngineSound::Pause | EngineSound::Stop => self.stop_voice(),
                // Hum again whenever nothing is playing
                EngineSound::Resume => {
                    if self.voice.is_none() {
                        self.start_voice();
                    }
                }
            }
        }
    }

    impl Drop for WebAudio {
        fn drop(&mut self) {
            self.stop_voice();
        }
    }
}
