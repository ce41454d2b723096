//! Prompt construction for one market evaluation. The user message carries
//! the full odds context for the game, both teams' stats as plain key facts,
//! and any injury notes, so the model can cross-check market structure
//! instead of inventing context.

use market_model::{BetRecommendation, TeamStats};

use crate::types::AnalysisRequest;

/// System prompt with the machine-generated JSON schema for the expected
/// structured output appended.
pub fn system_prompt() -> String {
    let schema = schemars::schema_for!(BetRecommendation);
    let schema_json =
        serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string());

    format!(
        r#"You are Hoops Edge, an elite quantitative sports betting analyst specializing
in NCAA college basketball (+EV identification).

Your job is to analyze one college basketball market and decide whether it offers
POSITIVE EXPECTED VALUE (+EV) at the quoted price.

## Reasoning Protocol (Chain-of-Thought)
You MUST reason step-by-step:
STEP 1 - Team Context: Summarize each team's offensive/defensive efficiency, pace,
         recent form, and relevant injuries.
STEP 2 - Matchup Analysis: Identify key stylistic advantages.
STEP 3 - Probability Estimation: State your estimated win probability for the
         evaluated side, with explicit justification.
STEP 4 - EV Calculation: EV = (your_prob * decimal_odds) - 1.
         If EV > 0.03 (3%), flag as a potential bet.
STEP 5 - Confidence Check: Rate your confidence 0.0-1.0. Never recommend a bet
         with confidence below 0.55.

## Output Rules
Return ONLY a valid JSON object conforming to the schema below. No markdown
blocks, no conversational text. reasoning_steps must contain 3-5 strings.
The summary must be at most 25 words.

JSON Schema:
{schema_json}
"#
    )
}

fn stats_block(stats: Option<&TeamStats>) -> String {
    match stats {
        None => "No stats available.".to_string(),
        Some(s) => format!(
            "Record: {} | Off Eff: {} | Def Eff: {} | Pace: {} | 3PT Rate: {} | ATS: {}",
            s.record,
            fmt_opt(s.offensive_efficiency),
            fmt_opt(s.defensive_efficiency),
            fmt_opt(s.pace),
            fmt_opt(s.three_point_rate),
            s.ats_record.as_deref().unwrap_or("n/a"),
        ),
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v}"))
}

/// The user message for one (game, market, side) evaluation.
pub fn market_prompt(request: &AnalysisRequest) -> String {
    let game = &request.game;
    let odds = request.odds();

    let mut context_lines = Vec::new();
    if let (Some(home), Some(away)) = (&game.home_spread, &game.away_spread) {
        context_lines.push(format!(
            "Spread: {} {:+.1} ({:+}) / {} {:+.1} ({:+})",
            game.home_team,
            home.line.unwrap_or(0.0),
            home.american_price,
            game.away_team,
            away.line.unwrap_or(0.0),
            away.american_price,
        ));
    }
    if let (Some(over), Some(under)) = (&game.total_over, &game.total_under) {
        context_lines.push(format!(
            "Total: O/U {} (O {:+} / U {:+})",
            over.line.map_or_else(|| "n/a".to_string(), |l| l.to_string()),
            over.american_price,
            under.american_price,
        ));
    }
    if let (Some(home), Some(away)) = (&game.home_moneyline, &game.away_moneyline) {
        context_lines.push(format!(
            "Moneyline: {} {:+} / {} {:+}",
            game.home_team, home.american_price, game.away_team, away.american_price,
        ));
    }

    format!(
        r#"## Game: {away} @ {home}
Game Time: {time}
Game ID: {game_id}

## Market to Evaluate
Type: {bet_type}
Side: {side}
Line: {line}
American Odds: {price}
Implied Probability: {implied:.1}%

## All Available Lines
{context}

## Team Stats
{home} (HOME):
{home_stats}

{away} (AWAY):
{away_stats}

## Injury / News Context
{injuries}

---
Analyze this market. Follow the 5-step reasoning protocol.
Output a BetRecommendation."#,
        away = game.away_team,
        home = game.home_team,
        time = game.game_time.format("%A %b %d, %Y %H:%M UTC"),
        game_id = game.game_id,
        bet_type = request.bet_type.as_str().to_uppercase(),
        side = request.side.as_str().to_uppercase(),
        line = odds
            .line
            .map_or_else(|| "N/A".to_string(), |l| format!("{l}")),
        price = odds.american_price,
        implied = odds.implied_probability() * 100.0,
        context = context_lines.join("\n"),
        home_stats = stats_block(game.home_stats.as_ref()),
        away_stats = stats_block(game.away_stats.as_ref()),
        injuries = game
            .injury_notes
            .as_deref()
            .unwrap_or("No significant injury news available."),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use market_model::{BetSide, BetType, Game, Odds, TeamStats};

    fn request() -> AnalysisRequest {
        let game = Game {
            game_id: "ncaab_uconn_villanova".into(),
            home_team: "UConn Huskies".into(),
            away_team: "Villanova Wildcats".into(),
            game_time: Utc::now(),
            home_spread: Some(
                Odds::new(BetType::Spread, BetSide::Home, Some(-7.5), -110).unwrap(),
            ),
            away_spread: Some(Odds::new(BetType::Spread, BetSide::Away, Some(7.5), -110).unwrap()),
            total_over: Some(
                Odds::new(BetType::Total, BetSide::Over, Some(138.5), -112).unwrap(),
            ),
            total_under: Some(
                Odds::new(BetType::Total, BetSide::Under, Some(138.5), -108).unwrap(),
            ),
            home_moneyline: None,
            away_moneyline: None,
            home_stats: Some(TeamStats {
                team_name: "UConn Huskies".into(),
                team_id: "uconn".into(),
                record: "22-3".into(),
                offensive_efficiency: Some(118.4),
                defensive_efficiency: Some(94.2),
                pace: Some(67.1),
                three_point_rate: Some(0.33),
                ats_record: Some("14-11".into()),
                conference: Some("Big East".into()),
                ranking: None,
                last_updated: None,
            }),
            away_stats: None,
            injury_notes: Some("Villanova: G questionable (ankle).".into()),
        };
        AnalysisRequest::new(game, BetType::Total, BetSide::Under).unwrap()
    }

    #[test]
    fn market_prompt_carries_market_and_context() {
        let prompt = market_prompt(&request());
        assert!(prompt.contains("Type: TOTAL"));
        assert!(prompt.contains("Side: UNDER"));
        assert!(prompt.contains("American Odds: -108"));
        // Full odds context, including markets not being evaluated.
        assert!(prompt.contains("Spread: UConn Huskies -7.5 (-110)"));
        assert!(prompt.contains("Total: O/U 138.5 (O -112 / U -108)"));
        // Stats and injury context.
        assert!(prompt.contains("Record: 22-3"));
        assert!(prompt.contains("No stats available."));
        assert!(prompt.contains("questionable (ankle)"));
    }

    #[test]
    fn system_prompt_embeds_output_schema() {
        let prompt = system_prompt();
        assert!(prompt.contains("JSON Schema:"));
        assert!(prompt.contains("recommended_units"));
        assert!(prompt.contains("reasoning_steps"));
    }
}
