//! Single-pass moments of a sample stream.
//!
//! Moments are accumulated with Terriberry's online update so the stream is
//! consumed exactly once and never buffered.

use super::frequency::Sample;
use crate::domain::num::Num;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleSummary<N> {
    count: usize,
    mean: N,
    m2: N,
    m3: N,
    m4: N,
    total_years: f64,
}

impl<N: Num> Default for SampleSummary<N> {
    fn default() -> Self {
        SampleSummary {
            count: 0,
            mean: N::zero(),
            m2: N::zero(),
            m3: N::zero(),
            m4: N::zero(),
            total_years: 0.0,
        }
    }
}

impl<N: Num> SampleSummary<N> {
    pub fn from_samples<I>(samples: I) -> Self
    where
        I: IntoIterator<Item = Sample<N>>,
    {
        samples
            .into_iter()
            .fold(SampleSummary::default(), |mut summary, sample| {
                summary.push(sample);
                summary
            })
    }

    pub fn push(&mut self, sample: Sample<N>) {
        let x = sample.excess_return;
        let n1 = N::from_usize(self.count);
        self.count += 1;
        let n = N::from_usize(self.count);

        let delta = x - self.mean;
        let delta_n = delta / n;
        let delta_n2 = delta_n * delta_n;
        let term1 = delta * delta_n * n1;

        self.mean = self.mean + delta_n;
        self.m4 = self.m4
            + term1 * delta_n2 * (n * n - N::from_i64(3) * n + N::from_i64(3))
            + N::from_i64(6) * delta_n2 * self.m2
            - N::from_i64(4) * delta_n * self.m3;
        self.m3 = self.m3 + term1 * delta_n * (n - N::from_i64(2))
            - N::from_i64(3) * delta_n * self.m2;
        self.m2 = self.m2 + term1;
        self.total_years += sample.period_years;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> N {
        self.mean
    }

    /// Population variance; zero for an empty stream.
    pub fn variance(&self) -> N {
        if self.count == 0 {
            return N::zero();
        }
        self.m2 / N::from_usize(self.count)
    }

    /// Bessel-corrected variance; zero below two samples.
    pub fn sample_variance(&self) -> N {
        if self.count < 2 {
            return N::zero();
        }
        self.m2 / N::from_usize(self.count - 1)
    }

    pub fn skewness(&self) -> N {
        if self.count == 0 || !self.m2.is_positive() {
            return N::zero();
        }
        let n = N::from_usize(self.count);
        n.sqrt() * self.m3 / self.m2.powf(1.5)
    }

    pub fn excess_kurtosis(&self) -> N {
        if self.count == 0 || !self.m2.is_positive() {
            return N::zero();
        }
        let n = N::from_usize(self.count);
        n * self.m4 / (self.m2 * self.m2) - N::from_i64(3)
    }

    /// Average sample length; `None` before the first sample.
    pub fn mean_period_years(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(self.total_years / self.count as f64)
    }

    /// `sqrt(samples per year)`; `None` when sample length is unknown or zero.
    pub fn annualization_factor(&self) -> Option<N> {
        let years = self.mean_period_years()?;
        if years <= 0.0 || !years.is_finite() {
            return None;
        }
        Some(N::from_f64((1.0 / years).sqrt()))
    }
}
