/// Cubic ease-in-out: slow start, fast middle, slow finish.
#[inline]
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Cubic ease-out: fast start, slow finish.
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Maps `t` into `[0, 1]` over the window `[start, end]`.
#[inline]
pub fn window(t: f32, (start, end): (f32, f32)) -> f32 {
    if end <= start {
        return if t >= end { 1.0 } else { 0.0 };
    }
    ((t - start) / (end - start)).clamp(0.0, 1.0)
}

/// Interpolates from `a` to `b`, exact at both ends.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    if t <= 0.0 {
        a
    } else if t >= 1.0 {
        b
    } else {
        a + (b - a) * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curves_hit_endpoints() {
        for f in [ease_in_out_cubic, ease_out_cubic] {
            assert_eq!(f(0.0), 0.0);
            assert_eq!(f(1.0), 1.0);
            assert_eq!(f(-3.0), 0.0);
            assert_eq!(f(7.0), 1.0);
        }
        assert!((ease_in_out_cubic(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn curves_are_monotone() {
        let mut last = (0.0, 0.0);
        for i in 0..=100 {
            let t = i as f32 / 100.0;
            let now = (ease_in_out_cubic(t), ease_out_cubic(t));
            assert!(now.0 >= last.0 && now.1 >= last.1);
            last = now;
        }
    }

    #[test]
    fn window_clamps() {
        assert_eq!(window(0.1, (0.45, 0.8)), 0.0);
        assert_eq!(window(0.9, (0.45, 0.8)), 1.0);
        assert!((window(0.625, (0.45, 0.8)) - 0.5).abs() < 1e-6);
        assert_eq!(window(0.5, (0.5, 0.5)), 1.0);
    }
}
