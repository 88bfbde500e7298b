//! Minimal Gas Finder
//!
//! Binary search for the smallest gas limit at which a transaction
//! simulation still succeeds. The caller supplies an upper bound that is
//! already expected to work (in practice the `eth_estimateGas` result);
//! the search re-validates it, probes a heuristic lower bound at 90% of it,
//! and then narrows the bracket one probe at a time.
//!
//! Probes run strictly one after another. A probe that fails for any reason
//! other than gas exhaustion aborts the whole search; "the call ran out of
//! gas" and "the call could not be evaluated" are different answers.

use alloy_rpc_types_eth::TransactionRequest;
use async_trait::async_trait;
use thiserror::Error;

use crate::rpc::{is_gas_exhaustion_error, RpcClient, RpcError};

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum GasSearchError {
    /// The simulation does not even succeed at the caller's upper bound.
    #[error("simulation fails at the initial upper bound {0}")]
    UpperBoundFails(u64),
    /// The heuristic lower bound already succeeds, so the interval does not
    /// bracket the minimum. The bound is not widened automatically.
    #[error("lower bound {0} unexpectedly succeeds; the 90% heuristic does not bracket the minimum")]
    LowerBoundSucceeds(u64),
    /// A probe failed for a reason unrelated to the gas limit.
    #[error("gas probe failed: {0}")]
    Probe(#[from] RpcError),
}

// =============================================================================
// Probe seam
// =============================================================================

/// Simulates the transaction at a candidate gas limit.
///
/// `Ok(true)`: the simulation succeeds with this limit.
/// `Ok(false)`: it fails because the limit is too small.
/// `Err`: the probe itself could not be evaluated.
#[async_trait]
pub trait GasProbe {
    async fn probe(&self, gas_limit: u64) -> Result<bool, RpcError>;
}

/// Probes candidate limits by replaying an `eth_call` with the gas field set.
///
/// Call errors whose message points at gas exhaustion count as "too small";
/// every other error aborts the search.
pub struct EthCallProbe<'a> {
    client: &'a RpcClient,
    request: TransactionRequest,
}

impl<'a> EthCallProbe<'a> {
    pub fn new(client: &'a RpcClient, request: TransactionRequest) -> Self {
        Self { client, request }
    }
}

#[async_trait]
impl GasProbe for EthCallProbe<'_> {
    async fn probe(&self, gas_limit: u64) -> Result<bool, RpcError> {
        let mut request = self.request.clone();
        request.gas = Some(gas_limit);
        match self.client.call(&request).await {
            Ok(_) => Ok(true),
            Err(RpcError::Call { ref message, .. }) if is_gas_exhaustion_error(message) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

// =============================================================================
// Search
// =============================================================================

/// Progress events emitted during the search, in call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEvent {
    /// The heuristic lower bound is about to be probed.
    LowerBoundProbe { bound: u64 },
    /// A narrowing iteration starts with this bracket.
    Bracket { low: u64, high: u64 },
}

/// Find the smallest gas limit in (low0, upper_bound] at which the probe
/// succeeds, where low0 = floor(upper_bound * 9 / 10).
///
/// Preconditions, both re-validated by probing:
///   probe(upper_bound) == true, else UpperBoundFails
///   probe(low0) == false, else LowerBoundSucceeds
///
/// The bracket invariant: everything <= low - 1 fails, everything >= high
/// succeeds. The interval only ever shrinks, and the answer is exact for
/// any monotonic probe.
pub async fn find_minimal_gas(
    upper_bound: u64,
    probe: &impl GasProbe,
    mut on_event: impl FnMut(SearchEvent),
) -> Result<u64, GasSearchError> {
    if !probe.probe(upper_bound).await? {
        return Err(GasSearchError::UpperBoundFails(upper_bound));
    }

    let seed = (upper_bound as u128 * 9 / 10) as u64;
    on_event(SearchEvent::LowerBoundProbe { bound: seed });
    if probe.probe(seed).await? {
        return Err(GasSearchError::LowerBoundSucceeds(seed));
    }

    let mut low = seed + 1;
    let mut high = upper_bound;
    while low < high {
        on_event(SearchEvent::Bracket { low, high });
        let mid = low + (high - low) / 2;
        if probe.probe(mid).await? {
            high = mid;
        } else {
            low = mid + 1;
        }
    }
    Ok(low)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // =========================================================================
    // Helper: monotonic probe (succeeds iff gas_limit >= threshold)
    // =========================================================================

    struct ThresholdProbe {
        threshold: u64,
        calls: AtomicUsize,
    }

    impl ThresholdProbe {
        fn new(threshold: u64) -> Self {
            Self { threshold, calls: AtomicUsize::new(0) }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl GasProbe for ThresholdProbe {
        async fn probe(&self, gas_limit: u64) -> Result<bool, RpcError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(gas_limit >= self.threshold)
        }
    }

    /// Monotonic probe that errors out at one specific gas limit.
    struct FaultyProbe {
        threshold: u64,
        fail_at: u64,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GasProbe for FaultyProbe {
        async fn probe(&self, gas_limit: u64) -> Result<bool, RpcError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            if gas_limit == self.fail_at {
                return Err(RpcError::Transport("connection reset by peer".into()));
            }
            Ok(gas_limit >= self.threshold)
        }
    }

    // =========================================================================
    // Preconditions
    // =========================================================================

    #[tokio::test]
    async fn test_upper_bound_must_succeed() {
        let probe = ThresholdProbe::new(150_000);

        match find_minimal_gas(100_000, &probe, |_| {}).await.unwrap_err() {
            GasSearchError::UpperBoundFails(bound) => assert_eq!(bound, 100_000),
            other => panic!("Expected UpperBoundFails, got {:?}", other),
        }
        assert_eq!(probe.calls(), 1, "Nothing to probe after the upper bound fails");
    }

    #[tokio::test]
    async fn test_lower_bound_must_fail() {
        // 90% of 100_000 is 90_000, already past a threshold of 65_536,
        // so the heuristic cannot bracket the minimum
        let probe = ThresholdProbe::new(65_536);

        match find_minimal_gas(100_000, &probe, |_| {}).await.unwrap_err() {
            GasSearchError::LowerBoundSucceeds(bound) => assert_eq!(bound, 90_000),
            other => panic!("Expected LowerBoundSucceeds, got {:?}", other),
        }
        assert_eq!(probe.calls(), 2);
    }

    // =========================================================================
    // Search behavior
    // =========================================================================

    #[tokio::test]
    async fn test_finds_exact_threshold() {
        let probe = ThresholdProbe::new(95_000);
        let mut events = Vec::new();

        let minimal = find_minimal_gas(100_000, &probe, |event| events.push(event))
            .await
            .unwrap();

        assert_eq!(minimal, 95_000);
        assert_eq!(events[0], SearchEvent::LowerBoundProbe { bound: 90_000 });
        assert_eq!(events[1], SearchEvent::Bracket { low: 90_001, high: 100_000 });
    }

    #[tokio::test]
    async fn test_sweep_returns_threshold_exactly() {
        for threshold in [90_001u64, 91_000, 95_000, 99_999, 100_000] {
            let probe = ThresholdProbe::new(threshold);
            let minimal = find_minimal_gas(100_000, &probe, |_| {}).await.unwrap();
            assert_eq!(minimal, threshold, "Wrong minimum for threshold {}", threshold);
        }
    }

    #[tokio::test]
    async fn test_probe_count_on_power_of_two_interval() {
        // upper 10_240 seeds low0 = 9_216, so the bracket [9_217, 10_240]
        // holds 1_024 candidates and every path narrows in exactly 10 probes
        for threshold in [9_217u64, 9_500, 10_000, 10_240] {
            let probe = ThresholdProbe::new(threshold);
            let minimal = find_minimal_gas(10_240, &probe, |_| {}).await.unwrap();

            assert_eq!(minimal, threshold);
            assert_eq!(
                probe.calls() - 2,
                10,
                "Narrowing probes beyond the two sanity probes, threshold {}",
                threshold
            );
        }
    }

    #[tokio::test]
    async fn test_probe_count_worst_case_bound() {
        // A 10_000-wide bracket needs at most ceil(log2(10_000)) = 14 probes;
        // the all-success path (threshold right above the seed) hits the bound
        let probe = ThresholdProbe::new(90_001);
        let minimal = find_minimal_gas(100_000, &probe, |_| {}).await.unwrap();
        assert_eq!(minimal, 90_001);
        assert_eq!(probe.calls() - 2, 14);

        for threshold in [92_000u64, 95_000, 100_000] {
            let probe = ThresholdProbe::new(threshold);
            find_minimal_gas(100_000, &probe, |_| {}).await.unwrap();
            assert!(
                probe.calls() - 2 <= 14,
                "Threshold {} took {} narrowing probes",
                threshold,
                probe.calls() - 2
            );
        }
    }

    #[tokio::test]
    async fn test_no_narrowing_when_interval_is_single() {
        // upper 10 seeds low0 = 9; the bracket collapses to [10, 10]
        let probe = ThresholdProbe::new(10);
        let mut events = Vec::new();

        let minimal = find_minimal_gas(10, &probe, |event| events.push(event)).await.unwrap();

        assert_eq!(minimal, 10);
        assert_eq!(probe.calls(), 2, "Only the two sanity probes are needed");
        assert_eq!(events, vec![SearchEvent::LowerBoundProbe { bound: 9 }]);
    }

    #[tokio::test]
    async fn test_bracket_only_shrinks() {
        let probe = ThresholdProbe::new(95_000);
        let mut brackets = Vec::new();

        find_minimal_gas(100_000, &probe, |event| {
            if let SearchEvent::Bracket { low, high } = event {
                brackets.push((low, high));
            }
        })
        .await
        .unwrap();

        for window in brackets.windows(2) {
            let (prev_low, prev_high) = window[0];
            let (low, high) = window[1];
            assert!(low <= high, "Bracket inverted: [{}, {}]", low, high);
            assert!(
                low >= prev_low && high <= prev_high && (high - low) < (prev_high - prev_low),
                "Bracket [{}, {}] does not shrink inside [{}, {}]",
                low,
                high,
                prev_low,
                prev_high
            );
        }
    }

    #[tokio::test]
    async fn test_probe_error_aborts_search() {
        // First narrowing probe lands on 95_000 and blows up there
        let probe = FaultyProbe {
            threshold: 96_000,
            fail_at: 95_000,
            calls: AtomicUsize::new(0),
        };

        match find_minimal_gas(100_000, &probe, |_| {}).await.unwrap_err() {
            GasSearchError::Probe(RpcError::Transport(_)) => {}
            other => panic!("Expected Probe, got {:?}", other),
        }
        assert_eq!(
            probe.calls.load(Ordering::Relaxed),
            3,
            "The search must stop at the first probe failure"
        );
    }
}
