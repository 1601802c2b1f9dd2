//! Judge admission: QR provisioning with a shared access password, and the
//! gate consulted before a judge may register.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::task;

use crate::{
    models::{MatchId, ProvisionedJudge, RegisterJudge},
    repository::ScoreboardStore,
    service::judge::named_judges,
    Error, Result,
};

const ACCESS_CODE_LEN: usize = 12;

/// Decides whether a registration request may proceed
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdmissionGate: Send + Sync {
    async fn may_register(&self, request: &RegisterJudge) -> Result<bool>;
}

/// Admits every request
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAdmission;

#[async_trait]
impl AdmissionGate for OpenAdmission {
    async fn may_register(&self, _request: &RegisterJudge) -> Result<bool> {
        Ok(true)
    }
}

/// Requires a valid access code and password pair on every registration
#[derive(Clone)]
pub struct PasswordAdmission {
    store: Arc<dyn ScoreboardStore>,
}

impl PasswordAdmission {
    #[must_use]
    pub fn new(store: Arc<dyn ScoreboardStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AdmissionGate for PasswordAdmission {
    async fn may_register(&self, request: &RegisterJudge) -> Result<bool> {
        let (Some(code), Some(password)) = (&request.access_code, &request.password) else {
            return Ok(false);
        };
        verify_access(self.store.as_ref(), code, password).await
    }
}

async fn verify_access(store: &dyn ScoreboardStore, code: &str, password: &str) -> Result<bool> {
    match store.access_by_code(code).await? {
        Some(access) => verify_password(password, &access.password_hash).await,
        None => Ok(false),
    }
}

pub async fn hash_password(password: &str) -> Result<String> {
    let password = password.to_string();

    task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| Error::Internal(format!("Failed to hash password: {e}")))
    })
    .await
    .map_err(|e| Error::Internal(format!("Password hashing task failed: {e}")))?
}

pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let password = password.to_string();
    let hash = hash.to_string();

    task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&hash)
            .map_err(|e| Error::Internal(format!("Invalid password hash format: {e}")))?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(Error::Internal(format!("Password verification failed: {e}"))),
        }
    })
    .await
    .map_err(|e| Error::Internal(format!("Password verification task failed: {e}")))?
}

/// Result of QR generation: the code shared by every QR link plus one
/// provisioned judge per requested name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrBundle {
    pub access_code: String,
    pub judges: Vec<ProvisionedJudge>,
}

#[derive(Clone)]
pub struct AdmissionService {
    store: Arc<dyn ScoreboardStore>,
}

impl std::fmt::Debug for AdmissionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionService").finish()
    }
}

impl AdmissionService {
    #[must_use]
    pub fn new(store: Arc<dyn ScoreboardStore>) -> Self {
        Self { store }
    }

    /// Hash `password` under a fresh access code and provision a judge for
    /// every name. The latest progress row of the match records that QR
    /// codes exist. Nothing is written unless every name is valid.
    pub async fn generate_qr(
        &self,
        match_id: MatchId,
        password: &str,
        judge_names: &[String],
    ) -> Result<QrBundle> {
        if password.is_empty() {
            return Err(Error::Validation("password cannot be empty".to_string()));
        }
        if judge_names.is_empty() {
            return Err(Error::Validation("judgeNames cannot be empty".to_string()));
        }
        if self.store.get_match(match_id).await?.is_none() {
            return Err(Error::NotFound(format!("match {match_id} not found")));
        }

        let new_judges = named_judges(match_id, judge_names)?;

        let password_hash = hash_password(password).await?;
        let access_code = nanoid::nanoid!(ACCESS_CODE_LEN);
        let (_, created) = self
            .store
            .provision_access(&access_code, &password_hash, match_id, &new_judges)
            .await?;
        let judges: Vec<ProvisionedJudge> = created
            .into_iter()
            .map(|judge| ProvisionedJudge {
                name: judge.name,
                device_token: judge.device_token,
            })
            .collect();

        tracing::info!(
            match_id = %match_id,
            judge_count = judges.len(),
            "Generated judge QR codes"
        );

        Ok(QrBundle {
            access_code,
            judges,
        })
    }

    /// Check an access code and password pair. Unknown codes verify false.
    pub async fn verify(&self, access_code: &str, password: &str) -> Result<bool> {
        verify_access(self.store.as_ref(), access_code, password).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{DeviceToken, NewMatch, NewProgress},
        repository::MemoryStore,
    };

    async fn store_with_match() -> (Arc<MemoryStore>, MatchId) {
        let store = Arc::new(MemoryStore::new());
        let created = store
            .create_match(&NewMatch {
                match_number: 7,
                division: "open".to_string(),
                round_count: 3,
                red_name: "Red".to_string(),
                blue_name: "Blue".to_string(),
                red_gym: None,
                blue_gym: None,
            })
            .await
            .unwrap();
        (store, created.info.id)
    }

    fn request(code: Option<&str>, password: Option<&str>) -> RegisterJudge {
        RegisterJudge {
            name: None,
            device_token: DeviceToken::from("tok"),
            match_id: MatchId::new(1),
            access_code: code.map(str::to_string),
            password: password.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_password("ringside").await.unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("ringside", &hash).await.unwrap());
        assert!(!verify_password("wrong", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_password_gate() {
        let (store, match_id) = store_with_match().await;
        let hash = hash_password("secret").await.unwrap();
        store.provision_access("CODE", &hash, match_id, &[]).await.unwrap();
        let gate = PasswordAdmission::new(store);

        assert!(gate.may_register(&request(Some("CODE"), Some("secret"))).await.unwrap());
        assert!(!gate.may_register(&request(Some("CODE"), Some("nope"))).await.unwrap());
        assert!(!gate.may_register(&request(Some("OTHER"), Some("secret"))).await.unwrap());
        assert!(!gate.may_register(&request(None, None)).await.unwrap());
    }

    #[tokio::test]
    async fn test_open_gate_admits_everything() {
        assert!(OpenAdmission.may_register(&request(None, None)).await.unwrap());
    }

    #[tokio::test]
    async fn test_generate_qr_provisions_judges() {
        let (store, match_id) = store_with_match().await;
        let rounds = store.rounds_for_match(match_id).await.unwrap();
        store
            .activate_progress(&NewProgress {
                match_id,
                round_id: rounds[0].id,
                judge_count: 2,
            })
            .await
            .unwrap();
        let admission = AdmissionService::new(store.clone());

        let bundle = admission
            .generate_qr(match_id, "secret", &[" Alice ".to_string(), "Bo".to_string()])
            .await
            .unwrap();

        assert_eq!(bundle.judges.len(), 2);
        assert_eq!(bundle.judges[0].name, "Alice");
        assert!(admission.verify(&bundle.access_code, "secret").await.unwrap());
        let judges = store.judges_for_match(match_id).await.unwrap();
        assert_eq!(judges.len(), 2);
        assert!(judges.iter().all(|j| !j.is_connected));
        let progress = store.active_progress().await.unwrap().unwrap();
        assert!(progress.qr_generated);
        assert!(progress.password_set);
    }

    #[tokio::test]
    async fn test_generate_qr_with_blank_name_writes_nothing() {
        let (store, match_id) = store_with_match().await;
        let rounds = store.rounds_for_match(match_id).await.unwrap();
        store
            .activate_progress(&NewProgress {
                match_id,
                round_id: rounds[0].id,
                judge_count: 2,
            })
            .await
            .unwrap();
        let admission = AdmissionService::new(store.clone());

        let err = admission
            .generate_qr(match_id, "secret", &["Alice".to_string(), "   ".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert!(store.list_judges().await.unwrap().is_empty());
        let progress = store.active_progress().await.unwrap().unwrap();
        assert!(!progress.qr_generated);
        assert!(!progress.password_set);
    }

    #[tokio::test]
    async fn test_generate_qr_unknown_match() {
        let (store, _) = store_with_match().await;
        let admission = AdmissionService::new(store);
        let err = admission
            .generate_qr(MatchId::new(999), "secret", &["Alice".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
