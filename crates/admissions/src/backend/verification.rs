use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::BackendError;

/// Why a code is being sent; the backend keeps separate codes per purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationPurpose {
    Registration,
    ApplicationContact,
}

/// How long a freshly sent code stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationWindow {
    pub expires_in_minutes: u32,
}

/// `POST /email-verification/{send,verify,resend}`.
#[async_trait]
pub trait EmailVerifier: Send + Sync {
    async fn send_code(
        &self,
        email: &str,
        purpose: VerificationPurpose,
    ) -> Result<VerificationWindow, BackendError>;

    async fn verify_code(
        &self,
        email: &str,
        code: &str,
        purpose: VerificationPurpose,
    ) -> Result<bool, BackendError>;

    async fn resend_code(
        &self,
        email: &str,
        purpose: VerificationPurpose,
    ) -> Result<VerificationWindow, BackendError>;
}

/// Client-side timer gating the "resend code" action until the window lapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResendCountdown {
    available_at: DateTime<Utc>,
}

impl ResendCountdown {
    pub fn start(window: VerificationWindow, now: DateTime<Utc>) -> Self {
        Self {
            available_at: now + Duration::minutes(i64::from(window.expires_in_minutes)),
        }
    }

    pub fn available_at(&self) -> DateTime<Utc> {
        self.available_at
    }

    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.available_at - now).max(Duration::zero())
    }

    pub fn can_resend(&self, now: DateTime<Utc>) -> bool {
        now >= self.available_at
    }

    /// `mm:ss` rendering for the resend button.
    pub fn display(&self, now: DateTime<Utc>) -> String {
        let seconds = self.remaining(now).num_seconds();
        format!("{:02}:{:02}", seconds / 60, seconds % 60)
    }
}
