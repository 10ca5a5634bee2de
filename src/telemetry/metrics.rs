//! Prometheus metrics

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Legs moved to a terminal status
    LegsSettled,
    /// Bets moved to a terminal status
    BetsSettled,
    /// Per-game or per-bet failures during a batch
    SettlementErrors,
    /// Closing odds recorded on a leg
    ClosingLinesCaptured,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Bets still awaiting settlement
    PendingBets,
}

impl CounterMetric {
    fn name(self) -> &'static str {
        match self {
            CounterMetric::LegsSettled => "betledger_legs_settled_total",
            CounterMetric::BetsSettled => "betledger_bets_settled_total",
            CounterMetric::SettlementErrors => "betledger_settlement_errors_total",
            CounterMetric::ClosingLinesCaptured => "betledger_closing_lines_captured_total",
        }
    }
}

impl GaugeMetric {
    fn name(self) -> &'static str {
        match self {
            GaugeMetric::PendingBets => "betledger_pending_bets",
        }
    }
}

/// Increment a counter
pub fn increment_counter(metric: CounterMetric, count: u64) {
    if count == 0 {
        return;
    }
    ::metrics::counter!(metric.name()).increment(count);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    tracing::debug!(metric = metric.name(), value = value, "Setting gauge");
    ::metrics::gauge!(metric.name()).set(value);
}
