//! Demonstration driver.
//!
//! Issues a fixed number of requests against one bucket at a fixed interval
//! and reports which were admitted.

use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tracing::info;

use crate::config::DemoConfig;
use crate::ratelimit::{Clock, TokenBucket};

/// Outcome of a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// 1-based request number
    pub request: u32,
    /// Whether the bucket admitted the request
    pub allowed: bool,
}

/// Summary of a demonstration run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DemoReport {
    pub allowed: u32,
    pub denied: u32,
    pub outcomes: Vec<Outcome>,
}

impl DemoReport {
    fn record(&mut self, request: u32, allowed: bool) {
        if allowed {
            self.allowed += 1;
        } else {
            self.denied += 1;
        }
        self.outcomes.push(Outcome { request, allowed });
    }
}

/// Run the demonstration until all requests are issued or `shutdown` resolves.
pub async fn run<C, F>(bucket: &TokenBucket<C>, config: &DemoConfig, shutdown: F) -> DemoReport
where
    C: Clock,
    F: Future<Output = ()>,
{
    let interval = Duration::from_millis(config.interval_ms);
    let mut report = DemoReport::default();
    tokio::pin!(shutdown);

    for request in 1..=config.requests {
        let allowed = bucket.decide();
        report.record(request, allowed);

        if allowed {
            info!(request = request, "Request allowed");
        } else {
            info!(request = request, "Request denied");
        }

        if request == config.requests {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = &mut shutdown => {
                info!(issued = request, "Shutdown requested, stopping early");
                break;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratelimit::ManualClock;

    fn frozen_bucket(rate: f64, capacity: f64) -> TokenBucket<ManualClock> {
        TokenBucket::with_clock(rate, capacity, ManualClock::new()).unwrap()
    }

    #[tokio::test]
    async fn test_run_reports_burst_then_denials() {
        let bucket = frozen_bucket(1.0, 5.0);
        let config = DemoConfig {
            requests: 10,
            interval_ms: 1,
        };

        let report = run(&bucket, &config, std::future::pending()).await;

        assert_eq!(report.allowed, 5);
        assert_eq!(report.denied, 5);
        assert_eq!(report.outcomes.len(), 10);
        assert!(report.outcomes[..5].iter().all(|o| o.allowed));
        assert!(report.outcomes[5..].iter().all(|o| !o.allowed));
        assert_eq!(report.outcomes[9].request, 10);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let bucket = frozen_bucket(1.0, 5.0);
        let config = DemoConfig {
            requests: 10,
            interval_ms: 60_000,
        };

        let report = run(&bucket, &config, async {}).await;

        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.allowed, 1);
    }

    #[tokio::test]
    async fn test_run_with_zero_requests() {
        let bucket = frozen_bucket(1.0, 5.0);
        let config = DemoConfig {
            requests: 0,
            interval_ms: 500,
        };

        let report = run(&bucket, &config, std::future::pending()).await;
        assert_eq!(report, DemoReport::default());
        assert_eq!(bucket.available_tokens(), 5.0);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let mut report = DemoReport::default();
        report.record(1, true);
        report.record(2, false);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["allowed"], 1);
        assert_eq!(json["denied"], 1);
        assert_eq!(json["outcomes"][1]["request"], 2);
        assert_eq!(json["outcomes"][1]["allowed"], false);
    }
}
