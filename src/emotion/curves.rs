//! Pure numeric easing (spec.md §4.2 Emotion Curves).
//!
//! Every function takes `progress` clamped to `[0,1]` and returns an eased
//! value in the same range. Stateless `f32` math, in the style of
//! `expressive::synth`'s envelope helpers.

use crate::model::transition::Curve;

fn clamp01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

pub fn linear(progress: f32) -> f32 {
    clamp01(progress)
}

pub fn ease_in(progress: f32) -> f32 {
    let x = clamp01(progress);
    x * x
}

pub fn ease_out(progress: f32) -> f32 {
    let x = clamp01(progress);
    1.0 - (1.0 - x) * (1.0 - x)
}

pub fn ease_in_out(progress: f32) -> f32 {
    let x = clamp01(progress);
    if x < 0.5 {
        2.0 * x * x
    } else {
        let y = -2.0 * x + 2.0;
        1.0 - (y * y) / 2.0
    }
}

/// Standard 1-D cubic Bezier across `(0,0), cp1, cp2, (1,1)`; `y` is
/// evaluated directly from `t = progress` (spec.md §4.2: monotonicity for
/// bezier is the caller's responsibility).
pub fn bezier(progress: f32, control_points: [(f32, f32); 2]) -> f32 {
    let t = clamp01(progress);
    let (_, y1) = control_points[0];
    let (_, y2) = control_points[1];
    let mt = 1.0 - t;
    // Standard cubic Bezier with P0=(0,0), P3=(1,1).
    3.0 * mt * mt * t * y1 + 3.0 * mt * t * t * y2 + t * t * t
}

/// Dispatches on the transition's curve, pulling control points when the
/// curve is `Bezier` (spec.md §3 EmotionTransition: control points are only
/// valid, and required, for that curve).
pub fn ease(curve: Curve, progress: f32, control_points: Option<[(f32, f32); 2]>) -> f32 {
    match curve {
        Curve::Linear => linear(progress),
        Curve::EaseIn => ease_in(progress),
        Curve::EaseOut => ease_out(progress),
        Curve::EaseInOut => ease_in_out(progress),
        Curve::Bezier => bezier(progress, control_points.unwrap_or([(0.0, 0.0), (1.0, 1.0)])),
    }
}

pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * clamp01(t)
}

/// Natural per-emotion override shapes, selected by name when the caller
/// requests natural shaping instead of the transition's own curve (spec.md
/// §4.2). `surprised` spikes fast then decays; the rest fall back to
/// `ease_in_out`.
pub fn natural_shape(kind: crate::model::voice::EmotionKind, progress: f32) -> f32 {
    use crate::model::voice::EmotionKind;
    let x = clamp01(progress);
    match kind {
        EmotionKind::Surprised => {
            // Fast spike to peak by 20% progress, then exponential-ish decay.
            if x < 0.2 {
                ease_out(x / 0.2)
            } else {
                let decay = (x - 0.2) / 0.8;
                1.0 - ease_in(decay) * 0.6
            }
        }
        EmotionKind::Angry => ease_in(x).max(ease_out(x) * 0.8),
        _ => ease_in_out(x),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_functions_are_monotone_non_decreasing() {
        let samples: Vec<f32> = (0..=20).map(|i| i as f32 / 20.0).collect();
        for f in [linear, ease_in, ease_out, ease_in_out] {
            let mut prev = f(0.0);
            for &s in &samples {
                let v = f(s);
                assert!(v + 1e-6 >= prev, "not monotone at {s}: {v} < {prev}");
                prev = v;
            }
        }
    }

    #[test]
    fn easing_endpoints_are_fixed() {
        for f in [linear, ease_in, ease_out, ease_in_out] {
            assert!((f(0.0) - 0.0).abs() < 1e-6);
            assert!((f(1.0) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn out_of_range_inputs_clamp() {
        assert_eq!(linear(-1.0), 0.0);
        assert_eq!(linear(2.0), 1.0);
    }

    #[test]
    fn bezier_linear_control_points_behave_like_linear() {
        let cps = [(0.0, 0.0), (1.0, 1.0)];
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            let v = bezier(t, cps);
            assert!((v - t).abs() < 1e-4, "t={t} v={v}");
        }
    }

    #[test]
    fn lerp_interpolates() {
        assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
        assert_eq!(lerp(0.0, 10.0, 0.0), 0.0);
        assert_eq!(lerp(0.0, 10.0, 1.0), 10.0);
    }
}
