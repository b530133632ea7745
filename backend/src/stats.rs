//! End-of-match stats reporting
//!
//! The authority hands one [`MatchSummary`] per player to a
//! [`StatsReporter`] when a match ends. The host never waits for the stats
//! service: [`HttpStatsReporter`] posts from a spawned task and only logs
//! failures.

use board_engine::{MatchSummary, Outcome, StatsReporter, WinReason};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// JSON body sent to the stats service
///
/// Field names follow the account service's increment API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub match_id: String,
    pub player_id: u32,
    pub outcome: Outcome,
    pub reason: WinReason,
    pub global_score_delta: i64,
    pub games_played_delta: u32,
    pub games_won_delta: u32,
    pub reported_at: DateTime<Utc>,
}

impl From<MatchSummary> for StatsReport {
    fn from(summary: MatchSummary) -> Self {
        Self {
            match_id: summary.match_id.to_string(),
            player_id: summary.player.0,
            outcome: summary.outcome,
            reason: summary.reason,
            global_score_delta: summary.score_delta,
            games_played_delta: summary.games_played_delta,
            games_won_delta: summary.games_won_delta,
            reported_at: Utc::now(),
        }
    }
}

/// Writes summaries to the log only
#[derive(Debug, Clone, Copy, Default)]
pub struct LogStatsReporter;

impl StatsReporter for LogStatsReporter {
    fn report(&mut self, summary: MatchSummary) {
        tracing::info!(
            "[STATS] Match {}: {} {:?} ({:?}), score {:+}",
            summary.match_id,
            summary.player,
            summary.outcome,
            summary.reason,
            summary.score_delta
        );
    }
}

/// Posts each summary as JSON to `url`
#[derive(Debug, Clone)]
pub struct HttpStatsReporter {
    client: reqwest::Client,
    url: String,
}

impl HttpStatsReporter {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl StatsReporter for HttpStatsReporter {
    fn report(&mut self, summary: MatchSummary) {
        LogStatsReporter.report(summary);

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("[STATS] No async runtime, report for {} not sent", summary.player);
            return;
        };

        let client = self.client.clone();
        let url = self.url.clone();
        let report = StatsReport::from(summary);
        runtime.spawn(async move {
            match client.post(&url).json(&report).send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::debug!("[STATS] Reported player {} to {url}", report.player_id);
                }
                Ok(response) => {
                    tracing::warn!(
                        "[STATS] {url} answered {} for player {}",
                        response.status(),
                        report.player_id
                    );
                }
                Err(e) => {
                    tracing::warn!("[STATS] Failed to reach {url}: {e}");
                }
            }
        });
    }
}

/// The reporter the host was configured with
#[derive(Debug, Clone)]
pub enum StatsSink {
    Log(LogStatsReporter),
    Http(HttpStatsReporter),
}

impl StatsSink {
    /// HTTP reporting when a URL is configured, logging otherwise
    pub fn from_url(url: Option<&str>) -> Self {
        match url {
            Some(url) => StatsSink::Http(HttpStatsReporter::new(url)),
            None => StatsSink::Log(LogStatsReporter),
        }
    }
}

impl StatsReporter for StatsSink {
    fn report(&mut self, summary: MatchSummary) {
        match self {
            StatsSink::Log(reporter) => reporter.report(summary),
            StatsSink::Http(reporter) => reporter.report(summary),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_engine::{MatchId, PlayerId};

    fn summary() -> MatchSummary {
        MatchSummary {
            match_id: MatchId::new(),
            player: PlayerId(2),
            outcome: Outcome::Win,
            reason: WinReason::NormalWin,
            score_delta: 10,
            games_played_delta: 1,
            games_won_delta: 1,
        }
    }

    #[test]
    fn test_report_body_uses_service_field_names() {
        let json = serde_json::to_value(StatsReport::from(summary())).unwrap();

        assert_eq!(json["playerId"], 2);
        assert_eq!(json["outcome"], "win");
        assert_eq!(json["globalScoreDelta"], 10);
        assert_eq!(json["gamesPlayedDelta"], 1);
        assert_eq!(json["gamesWonDelta"], 1);
        assert!(json["reportedAt"].is_string());
    }

    #[test]
    fn test_sink_selection() {
        assert!(matches!(StatsSink::from_url(None), StatsSink::Log(_)));
        match StatsSink::from_url(Some("http://localhost:3000/stats")) {
            StatsSink::Http(reporter) => assert_eq!(reporter.url(), "http://localhost:3000/stats"),
            other => panic!("Expected HTTP sink, got {other:?}"),
        }
    }

    #[test]
    fn test_http_report_outside_runtime_does_not_panic() {
        let mut reporter = HttpStatsReporter::new("http://127.0.0.1:9/stats");
        reporter.report(summary());
    }
}
