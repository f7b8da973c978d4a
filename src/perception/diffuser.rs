//! Distance attenuation curves
//!
//! A diffuser turns "how many steps away" into "how much of the signal is
//! left". The full curve is computed once whenever the step count changes,
//! after that every lookup is an index.

use serde::{Deserialize, Serialize};

/// When a delayed curve starts decaying
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DelayPolicy {
    /// Hold for this many steps
    Steps(u32),
    /// Hold for this percentage of the total steps (rounded up)
    Percent(u32),
    /// Hold while a plain linear curve would still be at or above this value
    Threshold(f64),
}

impl DelayPolicy {
    fn holds(&self, d: u32, steps: u32, start: f64) -> bool {
        match *self {
            DelayPolicy::Steps(k) => d <= k,
            DelayPolicy::Percent(p) => {
                let cutoff = (f64::from(steps) * f64::from(p) / 100.0).ceil();
                f64::from(d) <= cutoff
            }
            DelayPolicy::Threshold(t) => linear_value(start, d, steps) >= t,
        }
    }
}

/// Curve shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DiffuserKind {
    Linear,
    DelayedLinear { delay: DelayPolicy },
    Exponential { amount: f64 },
}

/// Smallest exponential amount a curve is built with
const MIN_AMOUNT: f64 = 0.01;

impl DiffuserKind {
    /// Pull an exponential amount into `[MIN_AMOUNT, 1]`
    fn clamped(self) -> Self {
        match self {
            DiffuserKind::Exponential { amount } if amount.is_nan() => {
                DiffuserKind::Exponential { amount: 1.0 }
            }
            DiffuserKind::Exponential { amount } => DiffuserKind::Exponential {
                amount: amount.clamp(MIN_AMOUNT, 1.0),
            },
            other => other,
        }
    }
}

fn linear_value(start: f64, d: u32, steps: u32) -> f64 {
    start * (1.0 - f64::from(d) / f64::from(steps))
}

/// Memoized attenuation curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "DiffuserRecord", into = "DiffuserRecord")]
pub struct Diffuser {
    kind: DiffuserKind,
    start: f64,
    steps: u32,
    curve: Vec<f64>,
}

/// Persisted form; the curve is rebuilt on load
#[derive(Serialize, Deserialize)]
struct DiffuserRecord {
    kind: DiffuserKind,
    start: f64,
    steps: u32,
}

impl From<DiffuserRecord> for Diffuser {
    fn from(record: DiffuserRecord) -> Self {
        let mut diffuser = Diffuser::with_start(record.kind, record.start);
        diffuser.set_steps(record.steps);
        diffuser
    }
}

impl From<Diffuser> for DiffuserRecord {
    fn from(diffuser: Diffuser) -> Self {
        Self {
            kind: diffuser.kind,
            start: diffuser.start,
            steps: diffuser.steps,
        }
    }
}

impl Diffuser {
    /// Curve starting at full strength over a single step
    pub fn new(kind: DiffuserKind) -> Self {
        Self::with_start(kind, 1.0)
    }

    /// Out-of-range inputs are clamped: `start` into `[0, 1]` and an
    /// exponential amount into `[0.01, 1]`.
    pub fn with_start(kind: DiffuserKind, start: f64) -> Self {
        let start = if start.is_nan() { 1.0 } else { start.clamp(0.0, 1.0) };
        let mut diffuser = Self {
            kind: kind.clamped(),
            start,
            steps: 1,
            curve: Vec::new(),
        };
        diffuser.set_steps(1);
        diffuser
    }

    pub fn kind(&self) -> DiffuserKind {
        self.kind
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn curve(&self) -> &[f64] {
        &self.curve
    }

    /// Recompute the curve for `steps` steps. Zero is treated as one.
    pub fn set_steps(&mut self, steps: u32) {
        let steps = steps.max(1);
        if steps == self.steps && !self.curve.is_empty() {
            return;
        }
        self.steps = steps;
        self.curve = self.build_curve();
    }

    /// Retained strength at `distance`; past the end the last value holds
    pub fn retained(&self, distance: u32) -> f64 {
        let index = (distance as usize).min(self.curve.len().saturating_sub(1));
        self.curve.get(index).copied().unwrap_or(self.start)
    }

    fn build_curve(&self) -> Vec<f64> {
        let n = self.steps;
        let mut curve = Vec::with_capacity(n as usize);
        curve.push(self.start);

        for d in 1..n {
            let previous = curve[(d - 1) as usize];
            let value = match self.kind {
                DiffuserKind::Linear => linear_value(self.start, d, n),
                DiffuserKind::DelayedLinear { delay } => {
                    if delay.holds(d, n, self.start) {
                        previous
                    } else {
                        (previous - self.start / f64::from(n)).max(0.0)
                    }
                }
                DiffuserKind::Exponential { amount } => {
                    amount.powi(d as i32).powf(2.0 - previous)
                }
            };
            curve.push(value);
        }

        curve
    }
}
