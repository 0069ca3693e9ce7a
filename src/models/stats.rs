//! Run statistics aggregate.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Tier;

/// Mutable counters for one pipeline run.
///
/// Owned by the orchestrator and passed by mutable reference to the
/// components that own the events being counted: the orchestrator records
/// successes and failures, the AI fallback client and the listing source
/// record their own call counts. Never reset mid-run.
#[derive(Debug, Default)]
pub struct RunStatistics {
    pub total_processed: u32,
    pub successful: u32,
    pub failed: u32,
    pub tier1_success: u32,
    pub tier2_success: u32,
    pub tier3_success: u32,
    pub ai_calls_made: u32,
    pub upstream_api_calls: u32,
    pub total_processing_time_seconds: f64,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl RunStatistics {
    /// Record a fully-processed company, attributed to the winning tier.
    pub fn record_success(&mut self, tier: Tier) {
        self.successful += 1;
        self.total_processed += 1;
        match tier {
            Tier::DirectPath => self.tier1_success += 1,
            Tier::HomepageScrape => self.tier2_success += 1,
            Tier::AiFallback => self.tier3_success += 1,
        }
    }

    /// Record a company that produced no result.
    pub fn record_failure(&mut self) {
        self.failed += 1;
        self.total_processed += 1;
    }

    /// Overall success rate in percent.
    pub fn success_rate(&self) -> f64 {
        if self.total_processed == 0 {
            return 0.0;
        }
        f64::from(self.successful) / f64::from(self.total_processed) * 100.0
    }

    /// Success rate of the free tiers (1 and 2) only, in percent.
    pub fn heuristic_success_rate(&self) -> f64 {
        if self.total_processed == 0 {
            return 0.0;
        }
        let heuristic = self.tier1_success + self.tier2_success;
        f64::from(heuristic) / f64::from(self.total_processed) * 100.0
    }

    /// Serializable report shape with formatted rates.
    pub fn report(&self) -> StatisticsReport {
        StatisticsReport {
            total_processed: self.total_processed,
            successful: self.successful,
            failed: self.failed,
            success_rate: format!("{:.1}%", self.success_rate()),
            heuristic_success_rate: format!("{:.1}%", self.heuristic_success_rate()),
            tier1_success: self.tier1_success,
            tier2_success: self.tier2_success,
            tier3_success: self.tier3_success,
            ai_calls_made: self.ai_calls_made,
            upstream_api_calls: self.upstream_api_calls,
            total_processing_time_seconds: (self.total_processing_time_seconds * 100.0).round()
                / 100.0,
        }
    }

    /// One-line console summary.
    pub fn summary_line(&self) -> String {
        format!(
            "Processed: {} | Success: {} ({:.1}%) | Failed: {} | \
             Tier1: {} | Tier2: {} | Tier3: {} | AI calls: {} | Time: {:.1}s",
            self.total_processed,
            self.successful,
            self.success_rate(),
            self.failed,
            self.tier1_success,
            self.tier2_success,
            self.tier3_success,
            self.ai_calls_made,
            self.total_processing_time_seconds,
        )
    }
}

/// Statistics as serialized into the report file.
#[derive(Debug, Clone, Serialize)]
pub struct StatisticsReport {
    pub total_processed: u32,
    pub successful: u32,
    pub failed: u32,
    pub success_rate: String,
    pub heuristic_success_rate: String,
    pub tier1_success: u32,
    pub tier2_success: u32,
    pub tier3_success: u32,
    pub ai_calls_made: u32,
    pub upstream_api_calls: u32,
    pub total_processing_time_seconds: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_stay_consistent() {
        let mut stats = RunStatistics::default();
        stats.record_success(Tier::DirectPath);
        assert_eq!(stats.total_processed, stats.successful + stats.failed);

        stats.record_failure();
        assert_eq!(stats.total_processed, stats.successful + stats.failed);

        stats.record_success(Tier::AiFallback);
        assert_eq!(stats.total_processed, 3);
        assert_eq!(stats.successful, 2);
        assert_eq!(stats.failed, 1);
    }

    #[test]
    fn tier_counters_track_attribution() {
        let mut stats = RunStatistics::default();
        stats.record_success(Tier::DirectPath);
        stats.record_success(Tier::HomepageScrape);
        stats.record_success(Tier::HomepageScrape);
        stats.record_success(Tier::AiFallback);

        assert_eq!(stats.tier1_success, 1);
        assert_eq!(stats.tier2_success, 2);
        assert_eq!(stats.tier3_success, 1);
    }

    #[test]
    fn heuristic_rate_excludes_ai_tier() {
        let mut stats = RunStatistics::default();
        stats.record_success(Tier::DirectPath);
        stats.record_success(Tier::HomepageScrape);
        stats.record_success(Tier::AiFallback);
        stats.record_failure();

        assert_eq!(stats.success_rate(), 75.0);
        assert_eq!(stats.heuristic_success_rate(), 50.0);
    }

    #[test]
    fn rates_are_zero_when_nothing_processed() {
        let stats = RunStatistics::default();
        assert_eq!(stats.success_rate(), 0.0);
        assert_eq!(stats.heuristic_success_rate(), 0.0);
    }

    #[test]
    fn report_formats_rates_to_one_decimal() {
        let mut stats = RunStatistics::default();
        stats.record_success(Tier::DirectPath);
        stats.record_success(Tier::DirectPath);
        stats.record_failure();

        let report = stats.report();
        assert_eq!(report.success_rate, "66.7%");
        assert_eq!(report.heuristic_success_rate, "66.7%");
    }
}
