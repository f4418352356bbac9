use crate::database::{now, results, Database};
use crate::error::Result;
use crate::models::ScoreResult;
use serde::{Deserialize, Serialize};

/// What happens to earlier results when scores are aggregated again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultPolicy {
    /// Keep exactly one result per respondent, replaced on every run.
    #[default]
    Upsert,
    /// Add a new result per respondent on every run.
    Append,
}

impl std::str::FromStr for ResultPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "upsert" => Ok(ResultPolicy::Upsert),
            "append" => Ok(ResultPolicy::Append),
            other => Err(format!("unknown result policy '{other}' (expected upsert or append)")),
        }
    }
}

/// Integer mean of the selected option scores, truncated toward zero.
/// An empty list averages to zero. The sum is taken in `i128`; the mean of
/// `i64` values always fits back into `i64`.
pub fn average_score(scores: &[i64]) -> i64 {
    if scores.is_empty() {
        return 0;
    }
    let sum: i128 = scores.iter().map(|score| i128::from(*score)).sum();
    (sum / scores.len() as i128) as i64
}

/// Score aggregation
impl Database {
    /// Average every respondent's selected option scores and persist the
    /// results under `policy`. Runs in a single transaction.
    pub fn aggregate_scores(&self, policy: ResultPolicy) -> Result<Vec<ScoreResult>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let evaluated_at = now();

        let mut stored = Vec::new();
        for (respondent_id, scores) in results::selected_scores(&tx)? {
            let average = average_score(&scores);
            tracing::debug!(
                "Respondent {} answered {} questions, average {}",
                respondent_id,
                scores.len(),
                average
            );
            stored.push(results::store_result(
                &tx,
                policy,
                &respondent_id,
                average,
                scores.len() as i64,
                evaluated_at,
            )?);
        }
        tx.commit()?;

        tracing::info!(
            "Aggregated scores for {} respondents ({:?} policy)",
            stored.len(),
            policy
        );
        Ok(stored)
    }
}
