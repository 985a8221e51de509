//! Solar estimate orchestration — strict reply contract and bounded retry.
//!
//! The generation service makes no formal guarantee about its reply shape,
//! so the orchestrator imposes one: after fence-stripping, the reply must
//! parse as a single JSON object with both `estimate_text` and `reasoning`.
//! Contract violations are retried the same as transport failures.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::forecast::ForecastRecord;
use crate::genai::{GenAiError, TextGenerator};
use crate::prompt::build_estimate_prompt;

// ── Constants ───────────────────────────────────────────────────────

/// Total generation attempts before giving up.
pub const MAX_ATTEMPTS: u32 = 3;

/// Fixed delay between attempts. No backoff, no jitter.
pub const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Estimate text returned after every attempt failed.
pub const FALLBACK_TEXT: &str = "Estimated Solar Output: Calculation Unavailable";

// ── Types ───────────────────────────────────────────────────────────

/// A daily efficiency estimate as produced by the generation service.
///
/// Held only in transient UI state; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarEstimate {
    /// "Estimated Solar Output: XX% of a clear-day potential".
    pub estimate_text: String,
    /// Short free-text justification; absent on the fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl SolarEstimate {
    /// The fixed fallback returned once retries are exhausted.
    pub fn unavailable() -> Self {
        Self {
            estimate_text: FALLBACK_TEXT.to_string(),
            reasoning: None,
        }
    }
}

/// Reply shape required on the wire: both fields present.
#[derive(Debug, Deserialize)]
struct ReplyContract {
    estimate_text: String,
    reasoning: String,
}

// ── Errors ──────────────────────────────────────────────────────────

/// A single failed generation attempt.
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    #[error("generation failed: {0}")]
    Generate(#[from] GenAiError),

    #[error("reply violates estimate contract: {0}")]
    Contract(#[from] serde_json::Error),
}

/// Every attempt failed; the caller degrades to the fixed fallback.
#[derive(Debug, thiserror::Error)]
#[error("estimate failed after {attempts} attempts: {last}")]
pub struct EstimateError {
    pub attempts: u32,
    #[source]
    pub last: AttemptError,
}

// ── Reply handling ──────────────────────────────────────────────────

/// Strip code-fence markup from a raw reply.
///
/// Removes every "```json" and "```" occurrence, then trims, so a fenced
/// reply parses identically to its unwrapped equivalent.
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

fn parse_reply(raw: &str) -> Result<SolarEstimate, AttemptError> {
    let cleaned = strip_code_fences(raw);
    let reply: ReplyContract = serde_json::from_str(&cleaned)?;
    Ok(SolarEstimate {
        estimate_text: reply.estimate_text,
        reasoning: Some(reply.reasoning),
    })
}

// ── Orchestrator ────────────────────────────────────────────────────

/// Request a daily efficiency estimate for one forecast record.
///
/// Runs up to `MAX_ATTEMPTS` sequential generation calls with `RETRY_DELAY`
/// between them; nothing is cached between attempts. The delay suspends on
/// the tokio clock, so paused-clock tests run without real waits.
pub async fn request_estimate<G>(
    generator: &G,
    record: &ForecastRecord,
    location_name: &str,
) -> Result<SolarEstimate, EstimateError>
where
    G: TextGenerator + ?Sized,
{
    let prompt = build_estimate_prompt(record, location_name);

    let mut attempt = 0;
    loop {
        attempt += 1;
        let outcome = match generator.generate(&prompt).await {
            Ok(raw) => parse_reply(&raw),
            Err(e) => Err(AttemptError::Generate(e)),
        };

        match outcome {
            Ok(estimate) => return Ok(estimate),
            Err(last) => {
                log::warn!(
                    "estimate attempt {}/{} failed: {}",
                    attempt,
                    MAX_ATTEMPTS,
                    last
                );
                if attempt >= MAX_ATTEMPTS {
                    return Err(EstimateError { attempts: attempt, last });
                }
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::Location;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    const GOOD_REPLY: &str = r#"{"estimate_text":"Estimated Solar Output: 45% of a clear-day potential","reasoning":"Mixed storms and clear sky"}"#;

    /// Returns scripted replies in order; `None` entries simulate failure.
    /// Indices past the end of the script also fail.
    struct ScriptedGenerator {
        calls: AtomicU32,
        script: Vec<Option<String>>,
    }

    impl ScriptedGenerator {
        fn new(script: Vec<Option<String>>) -> Self {
            Self {
                calls: AtomicU32::new(0),
                script,
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, _prompt: &str) -> crate::genai::Result<String> {
            let idx = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            match self.script.get(idx) {
                Some(Some(reply)) => Ok(reply.clone()),
                _ => Err(GenAiError::Format("scripted failure".to_string())),
            }
        }
    }

    fn record() -> ForecastRecord {
        ForecastRecord {
            location: Location {
                location_id: "St001".to_string(),
                location_name: "Subang Jaya".to_string(),
            },
            date: "2025-12-11".to_string(),
            morning_forecast: "Tiada hujan".to_string(),
            afternoon_forecast: "Ribut petir".to_string(),
            summary_forecast: "Hujan".to_string(),
            night_forecast: "Berjerebu".to_string(),
            summary_when: None,
            min_temp: None,
            max_temp: None,
        }
    }

    #[test]
    fn strip_fences_is_noop_on_plain_text() {
        assert_eq!(strip_code_fences(GOOD_REPLY), GOOD_REPLY);
    }

    #[test]
    fn strip_fences_removes_json_markers() {
        let fenced = format!("```json\n{}\n```", GOOD_REPLY);
        assert_eq!(strip_code_fences(&fenced), GOOD_REPLY);

        let bare = format!("```\n{}\n```", GOOD_REPLY);
        assert_eq!(strip_code_fences(&bare), GOOD_REPLY);
    }

    #[test]
    fn fenced_reply_parses_identically_to_unwrapped() {
        let fenced = format!("```json\n{}\n```", GOOD_REPLY);
        assert_eq!(
            parse_reply(&fenced).unwrap(),
            parse_reply(GOOD_REPLY).unwrap()
        );
    }

    #[test]
    fn reply_missing_reasoning_violates_contract() {
        let partial = r#"{"estimate_text":"Estimated Solar Output: 45% of a clear-day potential"}"#;
        assert!(matches!(
            parse_reply(partial),
            Err(AttemptError::Contract(_))
        ));
    }

    #[test]
    fn non_json_reply_violates_contract() {
        assert!(matches!(
            parse_reply("The output should be around 45%."),
            Err(AttemptError::Contract(_))
        ));
    }

    #[test]
    fn fallback_serializes_without_reasoning() {
        let json = serde_json::to_string(&SolarEstimate::unavailable()).unwrap();
        assert!(json.contains(FALLBACK_TEXT));
        assert!(!json.contains("reasoning"));
    }

    #[tokio::test]
    async fn first_attempt_success_returns_reply_verbatim() {
        let generator = ScriptedGenerator::new(vec![Some(GOOD_REPLY.to_string())]);
        let estimate = request_estimate(&generator, &record(), "Subang Jaya")
            .await
            .unwrap();
        assert_eq!(
            estimate.estimate_text,
            "Estimated Solar Output: 45% of a clear-day potential"
        );
        assert_eq!(
            estimate.reasoning.as_deref(),
            Some("Mixed storms and clear sky")
        );
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_failure_stops_after_three_attempts() {
        let generator = ScriptedGenerator::new(vec![]);
        let start = tokio::time::Instant::now();
        let err = request_estimate(&generator, &record(), "Subang Jaya")
            .await
            .unwrap_err();
        assert_eq!(err.attempts, 3);
        assert_eq!(generator.calls(), 3);
        // Two fixed 1 s delays between the three attempts, nothing more.
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_on_final_attempt() {
        let generator =
            ScriptedGenerator::new(vec![None, None, Some(GOOD_REPLY.to_string())]);
        let estimate = request_estimate(&generator, &record(), "Subang Jaya")
            .await
            .unwrap();
        assert_eq!(generator.calls(), 3);
        assert_eq!(
            estimate.reasoning.as_deref(),
            Some("Mixed storms and clear sky")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_reply_is_retried_like_a_transport_failure() {
        let generator = ScriptedGenerator::new(vec![
            Some("not json at all".to_string()),
            Some(GOOD_REPLY.to_string()),
        ]);
        let estimate = request_estimate(&generator, &record(), "Subang Jaya")
            .await
            .unwrap();
        assert_eq!(generator.calls(), 2);
        assert_eq!(
            estimate.estimate_text,
            "Estimated Solar Output: 45% of a clear-day potential"
        );
    }
}
