use std::time::Duration;

use async_trait::async_trait;
use market_model::BetRecommendation;
use reqwest::Client;
use serde_json::json;
use tokio::time::sleep;
use tracing::{instrument, warn};

use crate::prompt::{market_prompt, system_prompt};
use crate::types::{
    enforce_request_identity, validate_recommendation, AnalysisError, AnalysisRequest,
};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// The reasoning collaborator seam. The production implementation talks to
/// the Anthropic Messages API; tests substitute a stub.
#[async_trait]
pub trait Analyst: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest)
        -> Result<BetRecommendation, AnalysisError>;
}

pub struct EvClient {
    client: Client,
    api_key: String,
    model: String,
    max_retries: u32,
}

impl EvClient {
    pub fn new(
        api_key: String,
        model: String,
        timeout_ms: u64,
        max_retries: u32,
    ) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            model,
            max_retries,
        })
    }

    fn extract_text_content(response_body: &serde_json::Value) -> Result<&str, AnalysisError> {
        let content_arr = response_body
            .get("content")
            .and_then(|c| c.as_array())
            .ok_or_else(|| {
                AnalysisError::SchemaValidationFailed("Missing or invalid 'content' field".into())
            })?;

        content_arr
            .iter()
            .find(|item| item["type"] == "text")
            .and_then(|item| item["text"].as_str())
            .ok_or_else(|| AnalysisError::SchemaValidationFailed("Missing 'text' content".into()))
    }

    /// Parses the model's text into a validated recommendation. Tolerates
    /// prose wrapped around the JSON object even though the prompt forbids it.
    fn parse_recommendation(
        request: &AnalysisRequest,
        text_content: &str,
    ) -> Result<BetRecommendation, AnalysisError> {
        let json_start = text_content.find('{').unwrap_or(0);
        let json_end = text_content
            .rfind('}')
            .map(|i| i + 1)
            .unwrap_or(text_content.len());
        let json_str = &text_content[json_start..json_end];

        let rec: BetRecommendation = serde_json::from_str(json_str)?;
        validate_recommendation(&rec)?;
        Ok(enforce_request_identity(request, rec))
    }

    async fn attempt(&self, request: &AnalysisRequest) -> Result<BetRecommendation, AnalysisError> {
        let payload = json!({
            "model": self.model,
            "max_tokens": 1024,
            "system": system_prompt(),
            "messages": [
                {
                    "role": "user",
                    "content": market_prompt(request)
                }
            ]
        });

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalysisError::Timeout
                } else {
                    AnalysisError::ApiError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let response_body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AnalysisError::ApiError(e.to_string()))?;
        let text_content = Self::extract_text_content(&response_body)?;
        Self::parse_recommendation(request, text_content)
    }

    /// Transient failures worth another attempt: rate limiting, timeouts,
    /// transport errors, and malformed structured output. Hard 4xx rejections
    /// are permanent.
    fn is_retryable(err: &AnalysisError) -> bool {
        match err {
            AnalysisError::Timeout | AnalysisError::ApiError(_) => true,
            AnalysisError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            AnalysisError::JsonError(_) | AnalysisError::SchemaValidationFailed(_) => true,
            AnalysisError::NoTeamData(_) | AnalysisError::MissingOdds { .. } => false,
        }
    }
}

#[async_trait]
impl Analyst for EvClient {
    #[instrument(skip(self, request), fields(
        game_id = %request.game.game_id,
        bet_type = %request.bet_type,
        side = %request.side,
    ))]
    async fn analyze(
        &self,
        request: &AnalysisRequest,
    ) -> Result<BetRecommendation, AnalysisError> {
        let mut attempt = 0u32;
        loop {
            match self.attempt(request).await {
                Ok(rec) => return Ok(rec),
                Err(e) if Self::is_retryable(&e) && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(attempt, error = %e, "analysis attempt failed, retrying");
                    sleep(Duration::from_millis(150 * u64::from(attempt))).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use market_model::{BetSide, BetType, Game, Odds, TeamStats};

    fn request() -> AnalysisRequest {
        let game = Game {
            game_id: "ncaab_houston_iowa-st".into(),
            home_team: "Houston Cougars".into(),
            away_team: "Iowa State Cyclones".into(),
            game_time: Utc::now(),
            home_spread: Some(
                Odds::new(BetType::Spread, BetSide::Home, Some(-3.5), -110).unwrap(),
            ),
            away_spread: None,
            total_over: None,
            total_under: None,
            home_moneyline: None,
            away_moneyline: None,
            home_stats: Some(TeamStats {
                team_name: "Houston Cougars".into(),
                team_id: "houston".into(),
                record: "22-3".into(),
                offensive_efficiency: Some(116.7),
                defensive_efficiency: Some(90.4),
                pace: Some(65.3),
                three_point_rate: Some(0.32),
                ats_record: Some("17-8".into()),
                conference: Some("Big 12".into()),
                ranking: None,
                last_updated: None,
            }),
            away_stats: None,
            injury_notes: None,
        };
        AnalysisRequest::new(game, BetType::Spread, BetSide::Home).unwrap()
    }

    fn response_json() -> String {
        json!({
            "game_id": "hallucinated_id",
            "home_team": "Houston Cougars",
            "away_team": "Iowa State Cyclones",
            "game_time": Utc::now().to_rfc3339(),
            "bet_type": "moneyline",
            "side": "away",
            "line": null,
            "american_price": 120,
            "ev_analysis": {
                "bet_type": "moneyline",
                "side": "away",
                "reasoning_steps": ["context", "matchup", "probability", "ev"],
                "projected_win_probability": 0.57,
                "implied_probability": 0.5238,
                "expected_value": 0.088,
                "confidence": 0.64
            },
            "recommended_units": 2.5,
            "is_recommended": true,
            "summary": "Houston's defense travels; the spread is short."
        })
        .to_string()
    }

    #[test]
    fn parses_json_wrapped_in_prose_and_fixes_identity() {
        let req = request();
        let wrapped = format!("Here is my analysis:\n{}\nGood luck!", response_json());
        let rec = EvClient::parse_recommendation(&req, &wrapped).unwrap();
        assert_eq!(rec.game_id, "ncaab_houston_iowa-st");
        assert_eq!(rec.bet_type, BetType::Spread);
        assert_eq!(rec.side, BetSide::Home);
        assert_eq!(rec.american_price, -110);
        assert!((rec.ev_analysis.implied_probability - 0.5238).abs() < 1e-3);
    }

    #[test]
    fn malformed_payload_is_a_json_error() {
        let req = request();
        let err = EvClient::parse_recommendation(&req, "not json at all").unwrap_err();
        assert!(matches!(err, AnalysisError::JsonError(_)));
        assert!(EvClient::is_retryable(&err));
    }

    #[test]
    fn precondition_failures_are_not_retryable() {
        assert!(!EvClient::is_retryable(&AnalysisError::NoTeamData(
            "g".into()
        )));
        assert!(EvClient::is_retryable(&AnalysisError::HttpStatus {
            status: 429,
            body: String::new()
        }));
        assert!(!EvClient::is_retryable(&AnalysisError::HttpStatus {
            status: 400,
            body: String::new()
        }));
    }
}
