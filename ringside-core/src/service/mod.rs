pub mod admission;
pub mod judge;
pub mod keyed_lock;
pub mod matches;
pub mod progress;
pub mod score;

pub use admission::{
    hash_password, verify_password, AdmissionGate, AdmissionService, OpenAdmission,
    PasswordAdmission, QrBundle,
};
pub use judge::JudgeService;
pub use keyed_lock::KeyedLock;
pub use matches::MatchService;
pub use progress::ProgressService;
pub use score::ScoreService;
