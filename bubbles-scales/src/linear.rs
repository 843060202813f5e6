use crate::array;
use crate::error::BubblesScaleError;

/// Continuous mapping between a numeric domain and a pixel range
pub trait ContinuousScale {
    fn domain(&self) -> (f64, f64);
    fn range(&self) -> (f64, f64);
    fn scale(&self, value: f64) -> f64;
    fn invert(&self, value: f64) -> f64;
    fn ticks(&self, count: Option<usize>) -> Vec<f64>;
}

#[derive(Clone, Debug)]
pub struct LinearScaleConfig {
    pub domain: (f64, f64),
    pub range: (f64, f64),
    pub clamp: bool,
    pub nice: Option<usize>,
}

impl Default for LinearScaleConfig {
    fn default() -> Self {
        Self {
            domain: (0.0, 1.0),
            range: (0.0, 1.0),
            clamp: false,
            nice: None,
        }
    }
}

/// A linear scale that maps numeric input values from a domain to a range.
/// Supports clamping, domain niceing, and tick generation.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
    clamp: bool,
}

impl Default for LinearScale {
    fn default() -> Self {
        Self::new(&LinearScaleConfig::default())
    }
}

impl LinearScale {
    pub fn new(config: &LinearScaleConfig) -> Self {
        let this = Self {
            domain_start: config.domain.0,
            domain_end: config.domain.1,
            range_start: config.range.0,
            range_end: config.range.1,
            clamp: config.clamp,
        };
        match config.nice {
            Some(count) => this.nice(Some(count)),
            None => this,
        }
    }

    /// Like `new`, but rejects non-finite bounds
    pub fn try_new(config: &LinearScaleConfig) -> Result<Self, BubblesScaleError> {
        let (d0, d1) = config.domain;
        if !d0.is_finite() || !d1.is_finite() {
            return Err(BubblesScaleError::NonFiniteDomain(d0, d1));
        }
        let (r0, r1) = config.range;
        if !r0.is_finite() || !r1.is_finite() {
            return Err(BubblesScaleError::NonFiniteRange(r0, r1));
        }
        Ok(Self::new(config))
    }

    /// Extends the domain to nice round numbers for better tick selection
    pub fn nice(mut self, count: Option<usize>) -> Self {
        if self.is_degenerate_domain() {
            return self;
        }
        let ascending = self.domain_start <= self.domain_end;
        let (mut start, mut stop) = if ascending {
            (self.domain_start, self.domain_end)
        } else {
            (self.domain_end, self.domain_start)
        };

        let count = count.unwrap_or(10) as f64;
        let mut prestep = f64::NAN;
        for _ in 0..10 {
            let step = array::tick_increment(start, stop, count);
            if step == prestep {
                break;
            } else if step > 0.0 {
                start = (start / step).floor() * step;
                stop = (stop / step).ceil() * step;
            } else if step < 0.0 {
                start = (start * step).ceil() / step;
                stop = (stop * step).floor() / step;
            } else {
                break;
            }
            prestep = step;
        }

        if ascending {
            self.domain_start = start;
            self.domain_end = stop;
        } else {
            self.domain_start = stop;
            self.domain_end = start;
        }
        self
    }

    pub fn with_domain(mut self, domain: (f64, f64)) -> Self {
        self.domain_start = domain.0;
        self.domain_end = domain.1;
        self
    }

    pub fn with_range(mut self, range: (f64, f64)) -> Self {
        self.range_start = range.0;
        self.range_end = range.1;
        self
    }

    pub fn with_clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }

    pub fn clamp(&self) -> bool {
        self.clamp
    }

    /// Absolute distance between the ticks `ticks(count)` would produce
    pub fn tick_step(&self, count: Option<usize>) -> f64 {
        array::tick_step(
            self.domain_start,
            self.domain_end,
            count.unwrap_or(10) as f64,
        )
    }

    fn is_degenerate_domain(&self) -> bool {
        self.domain_start == self.domain_end
            || self.domain_start.is_nan()
            || self.domain_end.is_nan()
    }

    fn is_degenerate(&self) -> bool {
        self.is_degenerate_domain()
            || self.range_start == self.range_end
            || self.range_start.is_nan()
            || self.range_end.is_nan()
    }

    fn range_bounds(&self) -> (f64, f64) {
        if self.range_start <= self.range_end {
            (self.range_start, self.range_end)
        } else {
            (self.range_end, self.range_start)
        }
    }
}

impl ContinuousScale for LinearScale {
    fn domain(&self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    fn range(&self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    fn scale(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            return self.range_start;
        }
        let ratio = (self.range_end - self.range_start) / (self.domain_end - self.domain_start);
        let out = self.range_start + ratio * (value - self.domain_start);
        if self.clamp {
            let (lo, hi) = self.range_bounds();
            out.clamp(lo, hi)
        } else {
            out
        }
    }

    fn invert(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            return self.domain_start;
        }
        let value = if self.clamp {
            let (lo, hi) = self.range_bounds();
            value.clamp(lo, hi)
        } else {
            value
        };
        let ratio = (self.domain_end - self.domain_start) / (self.range_end - self.range_start);
        self.domain_start + ratio * (value - self.range_start)
    }

    fn ticks(&self, count: Option<usize>) -> Vec<f64> {
        array::ticks(
            self.domain_start,
            self.domain_end,
            count.unwrap_or(10) as f64,
        )
    }
}
