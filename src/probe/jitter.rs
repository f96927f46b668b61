use std::time::Duration;

use rand::Rng;

/// Fixed-point scale for fractions; sleeps are computed in parts-per-million
/// so the documented bounds are hit exactly.
const PPM: i128 = 1_000_000;
/// Largest fraction honoured before conversion; anything above already
/// clamps every draw below the midpoint to zero.
const MAX_FRACTION: f64 = 1_000_000.0;

/// Randomizes `delay` by up to `fraction` in either direction.
///
/// The result is uniformly distributed over
/// `[delay * (1 - fraction), delay * (1 + fraction))` and never negative.
#[must_use]
pub fn jitter(delay: Duration, fraction: f64) -> Duration {
    let draw = rand::thread_rng().gen_range(0.0..1.0);
    jitter_with(delay, fraction, draw)
}

/// Deterministic form of [`jitter`]: `draw` is the uniform sample in `[0, 1)`.
#[must_use]
pub fn jitter_with(delay: Duration, fraction: f64, draw: f64) -> Duration {
    scale(delay, fraction_ppm(fraction), draw_ppm(draw))
}

/// Inclusive `(min, max)` any [`jitter`] call for these inputs can return.
#[must_use]
pub fn jitter_bounds(delay: Duration, fraction: f64) -> (Duration, Duration) {
    let fraction = fraction_ppm(fraction);
    (scale(delay, fraction, 0), scale(delay, fraction, PPM))
}

// delay * (1 + fraction * (2u - 1)), every factor in ppm.
fn scale(delay: Duration, fraction: i128, draw: i128) -> Duration {
    let spread = draw.saturating_mul(2).saturating_sub(PPM);
    let offset = fraction.saturating_mul(spread).saturating_div(PPM);
    let factor = PPM.saturating_add(offset).max(0);

    let nanos = i128::try_from(delay.as_nanos()).unwrap_or(i128::MAX);
    let scaled = nanos.saturating_mul(factor).saturating_div(PPM);
    u64::try_from(scaled).map_or(Duration::MAX, Duration::from_nanos)
}

#[expect(
    clippy::float_arithmetic,
    reason = "fraction is converted to fixed point once per call"
)]
fn fraction_ppm(fraction: f64) -> i128 {
    if !fraction.is_finite() || fraction <= 0.0 {
        return 0;
    }
    // `as` saturates for floats; the clamp keeps the product well inside i128.
    (fraction.min(MAX_FRACTION) * 1_000_000.0).round() as i128
}

#[expect(
    clippy::float_arithmetic,
    reason = "draw is converted to fixed point once per call"
)]
fn draw_ppm(draw: f64) -> i128 {
    if !draw.is_finite() || draw <= 0.0 {
        return 0;
    }
    ((draw * 1_000_000.0).floor() as i128).min(PPM.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: usize = 2_000;

    #[test]
    fn random_draws_stay_within_bounds() -> Result<(), String> {
        let cases = [
            (Duration::from_millis(1000), 0.2),
            (Duration::from_millis(10_000), 0.1),
            (Duration::from_millis(250), 1.0),
            (Duration::from_millis(1), 0.5),
            (Duration::from_secs(3), 0.0),
        ];
        for (delay, fraction) in cases {
            let (low, high) = jitter_bounds(delay, fraction);
            for _ in 0..SAMPLES {
                let value = jitter(delay, fraction);
                if value < low || value > high {
                    return Err(format!(
                        "jitter({:?}, {}) = {:?} outside {:?}..={:?}",
                        delay, fraction, value, low, high
                    ));
                }
            }
        }
        Ok(())
    }

    #[test]
    fn bounds_match_fraction_exactly() -> Result<(), String> {
        let (low, high) = jitter_bounds(Duration::from_millis(10_000), 0.1);
        if low != Duration::from_millis(9_000) || high != Duration::from_millis(11_000) {
            return Err(format!("Unexpected bounds: {:?}..={:?}", low, high));
        }
        let (low, high) = jitter_bounds(Duration::from_millis(1000), 0.2);
        if low != Duration::from_millis(800) || high != Duration::from_millis(1200) {
            return Err(format!("Unexpected default bounds: {:?}..={:?}", low, high));
        }
        Ok(())
    }

    #[test]
    fn draw_selects_position_in_range() -> Result<(), String> {
        let delay = Duration::from_millis(1000);
        let cases = [(0.0, 800), (0.25, 900), (0.5, 1000), (0.75, 1100)];
        for (draw, expected_ms) in cases {
            let value = jitter_with(delay, 0.2, draw);
            if value != Duration::from_millis(expected_ms) {
                return Err(format!(
                    "draw {} produced {:?}, expected {}ms",
                    draw, value, expected_ms
                ));
            }
        }
        Ok(())
    }

    #[test]
    fn zero_fraction_returns_delay() -> Result<(), String> {
        let delay = Duration::from_millis(1234);
        for draw in [0.0, 0.3, 0.999] {
            if jitter_with(delay, 0.0, draw) != delay {
                return Err(format!("draw {} changed the delay", draw));
            }
        }
        Ok(())
    }

    #[test]
    fn oversized_fraction_clamps_to_zero() -> Result<(), String> {
        let delay = Duration::from_millis(1000);
        if jitter_with(delay, 3.0, 0.0) != Duration::ZERO {
            return Err("Expected negative result to clamp to zero".to_owned());
        }
        if jitter_with(delay, f64::NAN, 0.0) != delay {
            return Err("Expected NaN fraction to be ignored".to_owned());
        }
        Ok(())
    }
}
