// src/audio/synth.rs  —  Tone burst generator (sine / square)
use super::{AudioConfig, Waveform};
use std::f64::consts::TAU;
use std::time::Duration;

/// Render one tone burst as mono `f32` samples.
///
/// Length is `round(sample_rate × duration)`. Pure: identical arguments
/// always give bit-identical buffers.
pub fn synthesize(duration: Duration, cfg: &AudioConfig, sample_rate: u32) -> Vec<f32> {
    let sr  = f64::from(sample_rate);
    let len = (sr * duration.as_secs_f64()).round() as usize;
    let amp = f64::from(cfg.volume);
    let w   = TAU * f64::from(cfg.tone_hz);

    let mut buf: Vec<f32> = (0..len)
        .map(|i| {
            let s = (w * i as f64 / sr).sin();
            let v = match cfg.waveform {
                Waveform::Sine   => s,
                // Bipolar square; the zero crossing at t=0 counts as positive
                Waveform::Square => if s >= 0.0 { 1.0 } else { -1.0 },
            };
            (amp * v) as f32
        })
        .collect();

    // Square edges stay sharp.
    if cfg.waveform == Waveform::Sine {
        let ramp = (sr * f64::from(cfg.envelope_ms) / 1000.0) as usize;
        apply_envelope(&mut buf, ramp);
    }
    buf
}

/// Linear 0→1 attack over the first `ramp` samples and 1→0 decay over the
/// last `ramp`. Buffers shorter than two ramps are left untouched.
fn apply_envelope(buf: &mut [f32], ramp: usize) {
    if ramp == 0 || buf.len() < 2 * ramp {
        return;
    }
    let step = if ramp > 1 { 1.0 / (ramp - 1) as f64 } else { 0.0 };
    let len = buf.len();
    for i in 0..ramp {
        let gain = (i as f64 * step) as f32;
        buf[i] *= gain;
        buf[len - 1 - i] *= gain;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 44_100;

    fn cfg(waveform: Waveform) -> AudioConfig {
        AudioConfig { waveform, ..AudioConfig::default() }
    }

    #[test]
    fn length_is_rounded_sample_count() {
        for secs in [0.01, 1.0, 5.0] {
            let d = Duration::from_secs_f64(secs);
            let want = (f64::from(SR) * secs).round() as usize;
            assert_eq!(synthesize(d, &cfg(Waveform::Sine), SR).len(), want);
            assert_eq!(synthesize(d, &cfg(Waveform::Square), SR).len(), want);
        }
    }

    #[test]
    fn output_is_deterministic() {
        let d = Duration::from_millis(60);
        for w in [Waveform::Sine, Waveform::Square] {
            assert_eq!(synthesize(d, &cfg(w), SR), synthesize(d, &cfg(w), SR));
        }
    }

    #[test]
    fn sine_fades_in_and_out() {
        let buf = synthesize(Duration::from_millis(100), &cfg(Waveform::Sine), SR);
        assert!(buf[0].abs() < 1e-6);
        assert!(buf[buf.len() - 1].abs() < 1e-6);
        let peak = buf.iter().fold(0.0f32, |m, v| m.max(v.abs()));
        assert!(peak > 0.6, "peak {peak}");
    }

    #[test]
    fn square_keeps_sharp_edges() {
        let c = cfg(Waveform::Square);
        let buf = synthesize(Duration::from_millis(100), &c, SR);
        assert_eq!(buf[0].abs(), c.volume);
        assert_eq!(buf[buf.len() - 1].abs(), c.volume);
        assert!(buf.iter().all(|v| v.abs() == c.volume));
    }

    #[test]
    fn short_buffers_skip_the_envelope() {
        // 5 ms ramp = 220 samples; 6 ms = 265 samples < 2 ramps
        let c = AudioConfig { tone_hz: 1000.0, ..cfg(Waveform::Sine) };
        let buf = synthesize(Duration::from_millis(6), &c, SR);
        let raw = (TAU * 1000.0 * 10.0 / f64::from(SR)).sin() * f64::from(c.volume);
        assert_eq!(buf[10], raw as f32);
    }

    #[test]
    fn volume_scales_every_sample() {
        let d = Duration::from_millis(20);
        let silent = AudioConfig { volume: 0.0, ..cfg(Waveform::Square) };
        assert!(synthesize(d, &silent, SR).iter().all(|v| *v == 0.0));

        let full = AudioConfig { volume: 1.0, ..cfg(Waveform::Square) };
        assert!(synthesize(d, &full, SR).iter().all(|v| v.abs() == 1.0));
    }
}
