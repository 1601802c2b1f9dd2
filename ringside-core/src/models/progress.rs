//! The "what is live right now" pointer.
//!
//! At most one `MatchProgress` has `is_end_of_match == false` at any time.
//! Rows are only activated through the store's atomic `activate_progress` /
//! `switch_progress` operations; the transitions below mutate a loaded copy
//! which the progress service then writes back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{MatchId, ProgressId, RoundId};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchProgress {
    pub id: ProgressId,
    pub match_id: MatchId,
    pub round_id: Option<RoundId>,
    pub current_round_number: i32,
    pub is_locked: bool,
    pub is_end_of_match: bool,
    pub judge_count: i32,
    pub qr_generated: bool,
    pub password_set: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a freshly activated progress row (round 1, unlocked)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProgress {
    pub match_id: MatchId,
    pub round_id: RoundId,
    pub judge_count: i32,
}

impl MatchProgress {
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.is_end_of_match
    }

    fn ensure_active(&self) -> Result<()> {
        if self.is_end_of_match {
            return Err(Error::InvalidState(format!(
                "match {} has already ended",
                self.match_id
            )));
        }
        Ok(())
    }

    pub fn lock(&mut self) -> Result<()> {
        self.ensure_active()?;
        self.is_locked = true;
        self.touch();
        Ok(())
    }

    pub fn unlock(&mut self) -> Result<()> {
        self.ensure_active()?;
        self.is_locked = false;
        self.touch();
        Ok(())
    }

    /// Move to `round_number + 1`, bound to `next_round`, and reopen input.
    ///
    /// `round_count` is the match's configured number of rounds; the pointer
    /// never moves past it.
    pub fn advance_round(&mut self, round_count: i32, next_round: RoundId) -> Result<()> {
        self.ensure_active()?;
        let next = self.current_round_number + 1;
        if next > round_count {
            return Err(Error::InvalidState(format!(
                "round number out of range: match {} has {round_count} round(s)",
                self.match_id
            )));
        }
        self.current_round_number = next;
        self.round_id = Some(next_round);
        self.is_locked = false;
        self.touch();
        Ok(())
    }

    /// Terminal: ends the match and closes input
    pub fn end(&mut self) -> Result<()> {
        self.ensure_active()?;
        self.is_end_of_match = true;
        self.is_locked = true;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Admission-setup flags, polled by the console after a reload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrStatus {
    pub qr_generated: bool,
    pub is_password_set: bool,
}

impl From<&MatchProgress> for QrStatus {
    fn from(progress: &MatchProgress) -> Self {
        Self {
            qr_generated: progress.qr_generated,
            is_password_set: progress.password_set,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress() -> MatchProgress {
        let now = Utc::now();
        MatchProgress {
            id: ProgressId::new(1),
            match_id: MatchId::new(1),
            round_id: Some(RoundId::new(10)),
            current_round_number: 1,
            is_locked: false,
            is_end_of_match: false,
            judge_count: 3,
            qr_generated: false,
            password_set: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_lock_unlock_toggles() {
        let mut p = progress();
        p.lock().unwrap();
        assert!(p.is_locked);
        p.lock().unwrap();
        assert!(p.is_locked);
        p.unlock().unwrap();
        assert!(!p.is_locked);
        assert!(p.is_active());
    }

    #[test]
    fn test_advance_round_is_monotonic_and_unlocks() {
        let mut p = progress();
        p.lock().unwrap();

        p.advance_round(3, RoundId::new(11)).unwrap();
        assert_eq!(p.current_round_number, 2);
        assert_eq!(p.round_id, Some(RoundId::new(11)));
        assert!(!p.is_locked);

        p.advance_round(3, RoundId::new(12)).unwrap();
        assert_eq!(p.current_round_number, 3);
    }

    #[test]
    fn test_advance_round_is_bounded() {
        let mut p = progress();
        p.advance_round(2, RoundId::new(11)).unwrap();
        p.lock().unwrap();

        let err = p.advance_round(2, RoundId::new(12)).unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
        assert_eq!(p.current_round_number, 2);
        assert!(p.is_locked, "failed advance must not unlock");
    }

    #[test]
    fn test_end_is_terminal() {
        let mut p = progress();
        p.end().unwrap();
        assert!(!p.is_active());
        assert!(p.is_locked);

        assert!(p.unlock().is_err());
        assert!(p.lock().is_err());
        assert!(p.advance_round(3, RoundId::new(11)).is_err());
        assert!(p.end().is_err());
    }
}
