//! Tick generation following d3-array's `ticks` / `tickIncrement`

const E10: f64 = 7.071067811865476; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

/// Approximately `count` evenly spaced, nicely rounded values covering [start, stop]
pub fn ticks(start: f64, stop: f64, count: f64) -> Vec<f64> {
    if !(count > 0.0) || start.is_nan() || stop.is_nan() {
        return vec![];
    }
    if start == stop {
        return vec![start];
    }

    let reverse = stop < start;
    let (lo, hi) = if reverse { (stop, start) } else { (start, stop) };
    let Some((i1, i2, inc)) = tick_spec(lo, hi, count) else {
        return vec![];
    };
    if !(i2 >= i1) {
        return vec![];
    }

    let n = (i2 - i1 + 1.0) as usize;
    let value = |i: f64| if inc < 0.0 { i / -inc } else { i * inc };
    let mut out = (0..n).map(|i| value(i1 + i as f64)).collect::<Vec<_>>();
    if reverse {
        out.reverse();
    }
    out
}

/// Returns (first index, last index, increment); a negative increment
/// encodes the reciprocal step for sub-unit spacing
fn tick_spec(start: f64, stop: f64, count: f64) -> Option<(f64, f64, f64)> {
    let step = (stop - start) / count.max(0.0);
    if !step.is_finite() || step <= 0.0 {
        return None;
    }
    let power = step.log10().floor();
    let factor = step_factor(step / 10f64.powf(power));

    let (mut i1, mut i2, inc);
    if power < 0.0 {
        let scaled = 10f64.powf(-power) / factor;
        i1 = (start * scaled).round();
        i2 = (stop * scaled).round();
        if i1 / scaled < start {
            i1 += 1.0;
        }
        if i2 / scaled > stop {
            i2 -= 1.0;
        }
        inc = -scaled;
    } else {
        inc = 10f64.powf(power) * factor;
        i1 = (start / inc).round();
        i2 = (stop / inc).round();
        if i1 * inc < start {
            i1 += 1.0;
        }
        if i2 * inc > stop {
            i2 -= 1.0;
        }
    }

    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    Some((i1, i2, inc))
}

/// Signed tick increment, as used when niceing a domain
pub fn tick_increment(start: f64, stop: f64, count: f64) -> f64 {
    if !(count > 0.0) {
        return f64::NAN;
    }
    if start == stop {
        return f64::NEG_INFINITY;
    }
    let step = (stop - start) / count;
    if step == 0.0 || !step.is_finite() {
        return f64::NAN;
    }
    let power = step.log10().floor();
    let factor = step_factor(step / 10f64.powf(power));
    if power >= 0.0 {
        10f64.powf(power) * factor
    } else {
        -(10f64.powf(-power)) / factor
    }
}

/// Absolute distance between adjacent ticks
pub fn tick_step(start: f64, stop: f64, count: f64) -> f64 {
    let (lo, hi) = if stop < start { (stop, start) } else { (start, stop) };
    let inc = tick_increment(lo, hi, count);
    if inc < 0.0 {
        -1.0 / inc
    } else {
        inc
    }
}

fn step_factor(error: f64) -> f64 {
    if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_ticks() {
        assert_eq!(ticks(0.0, 10.0, 5.0), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(ticks(0.0, 1.0, 3.0), vec![0.0, 0.5, 1.0]);
        assert_eq!(ticks(0.0, 1.0, 1.0), vec![0.0, 1.0]);
        assert_eq!(
            ticks(10.0, 20.0, 5.0),
            vec![10.0, 12.0, 14.0, 16.0, 18.0, 20.0]
        );
    }

    #[test]
    fn test_ticks_fractional_step() {
        let values = ticks(0.0, 1.0, 10.0);
        assert_eq!(values.len(), 11);
        assert_approx_eq!(f64, values[3], 0.3);
    }

    #[test]
    fn test_ticks_reversed() {
        assert_eq!(ticks(10.0, 0.0, 5.0), vec![10.0, 8.0, 6.0, 4.0, 2.0, 0.0]);
    }

    #[test]
    fn test_ticks_edge_cases() {
        assert!(ticks(f64::NAN, 1.0, 1.0).is_empty());
        assert!(ticks(0.0, 1.0, 0.0).is_empty());
        assert!(ticks(0.0, 1.0, -1.0).is_empty());
        assert!(ticks(0.0, 1.0, f64::INFINITY).is_empty());
        assert_eq!(ticks(1.0, 1.0, 10.0), vec![1.0]);
    }

    #[test]
    fn test_tick_increment() {
        assert_approx_eq!(f64, tick_increment(0.0, 10.0, 5.0), 2.0);
        assert_approx_eq!(f64, tick_increment(0.0, 1.0, 10.0), -10.0);
        assert_approx_eq!(f64, tick_step(0.0, 1.0, 10.0), 0.1);
        assert!(tick_increment(0.0, 1.0, 0.0).is_nan());
        assert_eq!(tick_increment(1.0, 1.0, 5.0), f64::NEG_INFINITY);
    }
}
