//! GLSL built-in functions used by the stages.

use glsandbox_core::math::Vec4;

/// GLSL `smoothstep`.
///
/// Equal edges, for which GLSL leaves the result undefined, give a hard step:
/// `0.0` below the edge and `1.0` at or above it. Reversed edges follow the
/// GLSL formula unchanged, which mirrors the ramp.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge0 == edge1 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// GLSL `mix` for `float`: `x * (1 - a) + y * a`.
pub fn mix(x: f32, y: f32, a: f32) -> f32 {
    x * (1.0 - a) + y * a
}

/// GLSL `mix` for `vec4` with a scalar weight.
pub fn mix_vec4(x: &Vec4, y: &Vec4, a: f32) -> Vec4 {
    x * (1.0 - a) + y * a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothstep_endpoints() {
        assert_eq!(smoothstep(0.2, 0.4, 0.1), 0.0);
        assert_eq!(smoothstep(0.2, 0.4, 0.2), 0.0);
        assert_eq!(smoothstep(0.2, 0.4, 0.4), 1.0);
        assert_eq!(smoothstep(0.2, 0.4, 0.9), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_smoothstep_is_monotonic() {
        let mut prev = 0.0;
        for i in 0..=100 {
            let v = smoothstep(0.25, 0.45, i as f32 / 100.0);
            assert!(v >= prev);
            prev = v;
        }
    }

    #[test]
    fn test_smoothstep_equal_edges_is_hard_step() {
        assert_eq!(smoothstep(0.3, 0.3, 0.29), 0.0);
        assert_eq!(smoothstep(0.3, 0.3, 0.3), 1.0);
        assert_eq!(smoothstep(0.3, 0.3, 0.7), 1.0);
        assert!(!smoothstep(0.3, 0.3, 0.3).is_nan());
    }

    #[test]
    fn test_smoothstep_reversed_edges_mirror() {
        assert_eq!(smoothstep(0.4, 0.2, 0.1), 1.0);
        assert_eq!(smoothstep(0.4, 0.2, 0.5), 0.0);
        let forward = smoothstep(0.2, 0.4, 0.25);
        let reversed = smoothstep(0.4, 0.2, 0.25);
        assert!((forward + reversed - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_mix_endpoints_exact() {
        let x = Vec4::new(1.0, 1.0, 0.75, 1.0);
        let y = Vec4::new(0.0, 0.0, 0.0, 0.0);
        assert_eq!(mix_vec4(&x, &y, 0.0), x);
        assert_eq!(mix_vec4(&x, &y, 1.0), y);
        assert_eq!(mix(2.0, 4.0, 0.5), 3.0);
    }
}
