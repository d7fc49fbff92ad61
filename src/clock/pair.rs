//! Recovery over both lines of a differential pair
//!
//! Only one line is needed to clock the data; the complementary line is
//! recovered from the same origin as a cross-check.

use std::thread;

use tracing::debug;

use super::recover::{recover_checked, RecoveredClock, RecoveryParams};
use crate::error::Result;
use crate::signal::DigitalSignal;

/// Recover `line_a` and `line_b` concurrently from a shared origin
///
/// The origin is `params.t0`, else line A's first transition. If line A has
/// no transitions either, line B falls back to its own first transition.
pub fn recover_pair(
    line_a: &DigitalSignal,
    line_b: &DigitalSignal,
    params: &RecoveryParams,
) -> Result<(RecoveredClock, RecoveredClock)> {
    // Validated (and any ratio warning logged) once for both lines
    params.check()?;

    let shared = RecoveryParams {
        t0: params.t0.or_else(|| line_a.first_transition()),
        ..*params
    };
    debug!(
        "Recovering '{}' and '{}' from origin {:?}",
        line_a.label(),
        line_b.label(),
        shared.t0
    );

    Ok(thread::scope(|s| {
        let worker = s.spawn(|| recover_checked(line_b, &shared));
        let clock_a = recover_checked(line_a, &shared);
        let clock_b = worker
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
        (clock_a, clock_b)
    }))
}

/// Number of edges in `a` with no edge of `b` within half a period
pub fn count_disagreements(a: &[f64], b: &[f64], period: f64) -> usize {
    let half = period / 2.0;
    let mut j = 0;
    let mut missing = 0;

    for &edge in a {
        while j < b.len() && b[j] < edge - half {
            j += 1;
        }
        if j >= b.len() || b[j] > edge + half {
            missing += 1;
        }
    }

    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::recover;

    fn line(label: &str, initial: bool, transitions: &[f64]) -> DigitalSignal {
        DigitalSignal::new(label, initial, transitions.to_vec()).unwrap()
    }

    #[test]
    fn test_complementary_lines_agree() {
        // D- mirrors D+ with a little skew from the digitizer
        let dp = line("D+", false, &[10.0, 20.0, 31.0, 40.5]);
        let dm = line("D-", true, &[10.2, 20.1, 30.9, 40.6]);

        let params = RecoveryParams::new(10.0);
        let (a, b) = recover_pair(&dp, &dm, &params).unwrap();

        assert_eq!(a.edges, vec![20.0, 30.0, 41.0]);
        assert_eq!(a.edges.len(), b.edges.len());
        for (ea, eb) in a.edges.iter().zip(&b.edges) {
            assert!((ea - eb).abs() < 5.0, "Edges {} and {} disagree", ea, eb);
        }
        assert_eq!(count_disagreements(&a.edges, &b.edges, 10.0), 0);
    }

    #[test]
    fn test_matches_sequential_runs() {
        let dp = line("D+", false, &[3.0, 14.0, 22.5, 51.0, 58.0]);
        let dm = line("D-", true, &[3.1, 13.8, 23.0, 50.7, 58.4]);
        let params = RecoveryParams::new(8.0).with_min_ratio(0.9).with_max_ratio(1.1);

        let (a, b) = recover_pair(&dp, &dm, &params).unwrap();
        assert_eq!(a, recover(&dp, &params.with_t0(3.0)).unwrap());
        assert_eq!(b, recover(&dm, &params.with_t0(3.0)).unwrap());
    }

    #[test]
    fn test_explicit_origin_wins() {
        let dp = line("D+", false, &[10.0, 20.0]);
        let dm = line("D-", true, &[10.0, 20.0]);
        let params = RecoveryParams::new(10.0).with_t0(0.0);

        let (a, b) = recover_pair(&dp, &dm, &params).unwrap();
        assert_eq!(a.edges, vec![10.0, 20.0]);
        assert_eq!(b.edges, vec![10.0, 20.0]);
    }

    #[test]
    fn test_empty_line_a_falls_back() {
        let dp = line("D+", false, &[]);
        let dm = line("D-", true, &[10.0, 30.0]);

        let (a, b) = recover_pair(&dp, &dm, &RecoveryParams::new(10.0)).unwrap();
        assert!(a.is_empty());
        assert_eq!(b.edges, vec![20.0, 30.0]);
    }

    #[test]
    fn test_invalid_period_fails_before_spawning() {
        let dp = line("D+", false, &[10.0]);
        assert!(recover_pair(&dp, &dp, &RecoveryParams::new(0.0)).is_err());
    }

    #[test]
    fn test_inverted_ratios_accepted() {
        let dp = line("D+", false, &[10.0, 20.0, 31.0]);
        let dm = line("D-", true, &[10.0, 20.0, 31.0]);
        let params = RecoveryParams::new(10.0).with_min_ratio(1.1).with_max_ratio(0.9);
        assert!(params.ratios_inverted());

        let (a, b) = recover_pair(&dp, &dm, &params).unwrap();
        assert_eq!(a.edges, vec![20.0, 30.0]);
        assert_eq!(a, b);
        assert!(a.violations.is_empty());
    }

    #[test]
    fn test_count_disagreements() {
        assert_eq!(count_disagreements(&[10.0, 20.0, 30.0], &[10.4, 29.0], 10.0), 1);
        assert_eq!(count_disagreements(&[10.0], &[], 10.0), 1);
        assert_eq!(count_disagreements(&[], &[10.0], 10.0), 0);
    }
}
