use chrono::{DateTime, Utc};

/// Shared admission password, looked up by the access code embedded in QR links
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgeAccess {
    pub id: i64,
    pub access_code: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
