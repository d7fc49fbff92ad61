//! Edge-triggered clock recovery for a single line

use tracing::{debug, trace, warn};

use crate::error::{RecoveryError, Result};
use crate::signal::DigitalSignal;

/// Parameters for one recovery run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecoveryParams {
    /// Nominal clock period, same unit as the transition timestamps
    pub period: f64,
    /// Early-edge tolerance per emitted tick, as a fraction of `period`
    pub min_ratio: Option<f64>,
    /// Late-edge tolerance per emitted tick, as a fraction of `period`
    pub max_ratio: Option<f64>,
    /// Reference origin; defaults to the signal's first transition
    pub t0: Option<f64>,
}

impl RecoveryParams {
    /// Recovery with no timing checks and the default origin
    pub fn new(period: f64) -> Self {
        Self {
            period,
            min_ratio: None,
            max_ratio: None,
            t0: None,
        }
    }

    pub fn with_min_ratio(mut self, ratio: f64) -> Self {
        self.min_ratio = Some(ratio);
        self
    }

    pub fn with_max_ratio(mut self, ratio: f64) -> Self {
        self.max_ratio = Some(ratio);
        self
    }

    pub fn with_t0(mut self, t0: f64) -> Self {
        self.t0 = Some(t0);
        self
    }

    /// Check the period, ratios and origin
    ///
    /// `min_ratio > max_ratio` is accepted: the two bounds apply to residuals
    /// of opposite sign. See [`RecoveryParams::ratios_inverted`].
    pub fn validate(&self) -> Result<()> {
        if !self.period.is_finite() || self.period <= 0.0 {
            return Err(RecoveryError::invalid_parameter(format!(
                "period must be positive and finite, got {}",
                self.period
            )));
        }

        for (name, ratio) in [("min_ratio", self.min_ratio), ("max_ratio", self.max_ratio)] {
            if let Some(r) = ratio {
                if !r.is_finite() || r < 0.0 {
                    return Err(RecoveryError::invalid_parameter(format!(
                        "{} must be non-negative and finite, got {}",
                        name, r
                    )));
                }
            }
        }

        if let Some(t0) = self.t0 {
            if !t0.is_finite() {
                return Err(RecoveryError::invalid_parameter(format!(
                    "t0 must be finite, got {}",
                    t0
                )));
            }
        }

        Ok(())
    }

    /// Both ratios are set and the early bound is wider than the late one
    pub fn ratios_inverted(&self) -> bool {
        matches!((self.min_ratio, self.max_ratio), (Some(min), Some(max)) if min > max)
    }

    /// Validate once per run and flag suspicious but accepted ratios
    pub(super) fn check(&self) -> Result<()> {
        self.validate()?;
        if self.ratios_inverted() {
            warn!(
                "min_ratio {:?} is above max_ratio {:?}",
                self.min_ratio, self.max_ratio
            );
        }
        Ok(())
    }
}

/// Output of one recovery run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecoveredClock {
    /// Inferred clock instants, strictly increasing
    pub edges: Vec<f64>,
    /// Transitions whose residual exceeded the tolerance window
    pub violations: Vec<f64>,
    /// Reference instant after the last processed transition
    pub anchor: Option<f64>,
}

impl RecoveredClock {
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Recover the clock instants of `signal`
///
/// Transitions at or before the origin are ignored. For every later
/// transition `t`, ticks spaced one period apart are emitted while the
/// reference is more than half a period before `t`; the residual between
/// the last tick and `t` is then checked against `n * ratio * period`
/// (`n` = ticks emitted for this transition) and the reference snaps to `t`.
pub fn recover(signal: &DigitalSignal, params: &RecoveryParams) -> Result<RecoveredClock> {
    params.check()?;
    Ok(recover_checked(signal, params))
}

/// Recovery loop proper; `params` must already have passed validation
pub(super) fn recover_checked(signal: &DigitalSignal, params: &RecoveryParams) -> RecoveredClock {
    let period = params.period;
    let half = period / 2.0;

    let Some(mut reference) = params.t0.or_else(|| signal.first_transition()) else {
        return RecoveredClock::default();
    };

    let mut edges = Vec::new();
    let mut violations = Vec::new();

    for &t in signal.transitions() {
        if t <= reference {
            trace!("[{}] Skipping transition at {} (origin {})", signal.label(), t, reference);
            continue;
        }

        let anchor = reference;
        let mut ticks = 0u64;
        while reference < t - half {
            ticks += 1;
            reference = anchor + ticks as f64 * period;
            edges.push(reference);
        }

        let budget = ticks as f64;
        if let Some(min) = params.min_ratio {
            if reference - t > budget * min * period {
                debug!(
                    "[{}] Early edge at {}: {} before tick {} ({} ticks)",
                    signal.label(),
                    t,
                    reference - t,
                    reference,
                    ticks
                );
                violations.push(t);
            }
        }
        if let Some(max) = params.max_ratio {
            if t - reference > budget * max * period {
                debug!(
                    "[{}] Late edge at {}: {} after tick {} ({} ticks)",
                    signal.label(),
                    t,
                    t - reference,
                    reference,
                    ticks
                );
                violations.push(t);
            }
        }

        reference = t;
    }

    RecoveredClock {
        edges,
        violations,
        anchor: Some(reference),
    }
}
