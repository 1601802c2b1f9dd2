use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{MatchId, RoundId};
use crate::{Error, Result};

/// Upper bound on rounds per match accepted at intake
pub const MAX_ROUND_COUNT: i32 = 12;

/// Roster entry for one bout on the card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: MatchId,
    pub match_number: i32,
    pub division: String,
    pub round_count: i32,
    pub red_name: String,
    pub blue_name: String,
    pub red_gym: Option<String>,
    pub blue_gym: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Roster intake record; rounds 1..=`round_count` are created with it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMatch {
    pub match_number: i32,
    pub division: String,
    pub round_count: i32,
    pub red_name: String,
    pub blue_name: String,
    #[serde(default)]
    pub red_gym: Option<String>,
    #[serde(default)]
    pub blue_gym: Option<String>,
}

impl NewMatch {
    pub fn validate(&self) -> Result<()> {
        if self.division.trim().is_empty() {
            return Err(Error::Validation("division cannot be empty".to_string()));
        }
        if self.red_name.trim().is_empty() || self.blue_name.trim().is_empty() {
            return Err(Error::Validation(
                "both competitor names are required".to_string(),
            ));
        }
        if !(0..=MAX_ROUND_COUNT).contains(&self.round_count) {
            return Err(Error::Validation(format!(
                "roundCount must be between 0 and {MAX_ROUND_COUNT}"
            )));
        }
        Ok(())
    }
}

/// Corner awarded a finished round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Winner {
    Red,
    Blue,
    Draw,
}

impl Winner {
    /// Decide the round from the summed totals
    #[must_use]
    pub fn from_totals(total_red: i64, total_blue: i64) -> Self {
        match total_red.cmp(&total_blue) {
            std::cmp::Ordering::Greater => Self::Red,
            std::cmp::Ordering::Less => Self::Blue,
            std::cmp::Ordering::Equal => Self::Draw,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Red => "RED",
            Self::Blue => "BLUE",
            Self::Draw => "DRAW",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "RED" => Ok(Self::Red),
            "BLUE" => Ok(Self::Blue),
            "DRAW" => Ok(Self::Draw),
            other => Err(Error::Internal(format!("unknown winner corner: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub id: RoundId,
    pub match_id: MatchId,
    pub round_number: i32,
    pub is_finished: bool,
    pub winner: Option<Winner>,
}

/// Full match descriptor sent on the `next-match` topic and by roster queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchWithRounds {
    #[serde(flatten)]
    pub info: Match,
    pub rounds: Vec<Round>,
}

impl MatchWithRounds {
    #[must_use]
    pub fn round(&self, round_number: i32) -> Option<&Round> {
        self.rounds.iter().find(|r| r.round_number == round_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_match() -> NewMatch {
        NewMatch {
            match_number: 1,
            division: "-70kg".to_string(),
            round_count: 3,
            red_name: "Kim".to_string(),
            blue_name: "Lee".to_string(),
            red_gym: None,
            blue_gym: Some("Seoul Gym".to_string()),
        }
    }

    #[test]
    fn test_new_match_validation() {
        assert!(new_match().validate().is_ok());

        let mut m = new_match();
        m.round_count = MAX_ROUND_COUNT + 1;
        assert!(matches!(m.validate(), Err(Error::Validation(_))));

        let mut m = new_match();
        m.blue_name = " ".to_string();
        assert!(m.validate().is_err());
    }

    #[test]
    fn test_winner_from_totals() {
        assert_eq!(Winner::from_totals(30, 27), Winner::Red);
        assert_eq!(Winner::from_totals(27, 30), Winner::Blue);
        assert_eq!(Winner::from_totals(24, 24), Winner::Draw);
        assert_eq!(Winner::parse(Winner::Blue.as_str()).unwrap(), Winner::Blue);
    }

    #[test]
    fn test_descriptor_serializes_flat_camel_case() {
        let descriptor = MatchWithRounds {
            info: Match {
                id: MatchId::new(2),
                match_number: 5,
                division: "-60kg".to_string(),
                round_count: 1,
                red_name: "A".to_string(),
                blue_name: "B".to_string(),
                red_gym: None,
                blue_gym: None,
                created_at: Utc::now(),
            },
            rounds: vec![Round {
                id: RoundId::new(9),
                match_id: MatchId::new(2),
                round_number: 1,
                is_finished: false,
                winner: None,
            }],
        };

        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["id"], 2);
        assert_eq!(json["matchNumber"], 5);
        assert_eq!(json["rounds"][0]["roundNumber"], 1);
        assert!(descriptor.round(1).is_some());
        assert!(descriptor.round(2).is_none());
    }
}
