//! services/client/src/app/auth_flow.rs
//!
//! Email/OTP login flow: request a code, count it down, verify it, and
//! establish the session.

use crate::session::SessionContext;
use readr_core::ports::AuthApi;
use std::sync::Arc;
use tracing::{error, info};

/// How long a requested code stays usable before the UI declares it expired.
/// The backend enforces its own window; this countdown is purely local.
pub const OTP_VALIDITY_SECS: u32 = 300;

/// Codes are exactly this many ASCII digits; anything else never reaches
/// the network.
pub const CODE_LENGTH: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Failed to send verification code: {0}")]
    RequestFailed(String),
    #[error("Invalid verification code: {0}")]
    VerificationFailed(String),
    #[error("Verification code expired. Please request a new one.")]
    Expired,
    #[error("Enter the complete 6-digit code")]
    IncompleteCode,
}

//=============================================================================
// Countdown
//=============================================================================

/// Local one-shot countdown for the code's validity window. `tick` reports
/// expiry exactly once, on the transition to zero.
pub struct Countdown {
    remaining: u32,
    expired_reported: bool,
}

impl Countdown {
    pub fn new() -> Self {
        Self {
            remaining: OTP_VALIDITY_SECS,
            expired_reported: false,
        }
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining
    }

    /// Advances one second. Returns `true` only on the tick that hits zero.
    pub fn tick(&mut self) -> bool {
        if self.remaining > 0 {
            self.remaining -= 1;
            if self.remaining == 0 && !self.expired_reported {
                self.expired_reported = true;
                return true;
            }
        }
        false
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}

//=============================================================================
// Flow
//=============================================================================

/// Which step of the login view is showing.
pub struct Verification {
    pub email: String,
    pub countdown: Countdown,
}

/// Drives the two-step login: `request_code` moves to the verification
/// step, `verify` establishes the session.
pub struct AuthFlow {
    auth_api: Arc<dyn AuthApi>,
    session: SessionContext,
    verification: Option<Verification>,
}

impl AuthFlow {
    pub fn new(auth_api: Arc<dyn AuthApi>, session: SessionContext) -> Self {
        Self {
            auth_api,
            session,
            verification: None,
        }
    }

    pub fn verification(&self) -> Option<&Verification> {
        self.verification.as_ref()
    }

    pub fn verification_mut(&mut self) -> Option<&mut Verification> {
        self.verification.as_mut()
    }

    /// Asks the backend to email a code and opens the verification step
    /// with a fresh countdown. Re-requesting resets the countdown.
    pub async fn request_code(&mut self, email: &str) -> Result<(), AuthError> {
        self.auth_api
            .request_code(email)
            .await
            .map_err(|e| AuthError::RequestFailed(e.to_string()))?;
        info!("Verification code sent to {email}");
        self.verification = Some(Verification {
            email: email.to_string(),
            countdown: Countdown::new(),
        });
        Ok(())
    }

    /// Advances the countdown by one second. The tick that reaches zero
    /// closes the verification window, returning the user to the email
    /// step; that close is reported exactly once as `true`.
    pub fn tick(&mut self) -> bool {
        let Some(verification) = self.verification.as_mut() else {
            return false;
        };
        if verification.countdown.tick() {
            info!("Verification code for {} expired", verification.email);
            self.verification = None;
            return true;
        }
        false
    }

    /// The verify button is enabled only for a complete 6-digit code.
    pub fn submit_enabled(code: &str) -> bool {
        code.len() == CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
    }

    /// Checks the code with the backend and, on success, establishes the
    /// session. An incomplete code or an expired countdown never reaches
    /// the network.
    pub async fn verify(&mut self, code: &str) -> Result<(), AuthError> {
        let verification = self
            .verification
            .as_ref()
            .ok_or_else(|| AuthError::VerificationFailed("no code requested".to_string()))?;
        if verification.countdown.is_expired() {
            return Err(AuthError::Expired);
        }
        if !Self::submit_enabled(code) {
            return Err(AuthError::IncompleteCode);
        }

        let session = self
            .auth_api
            .verify_code(&verification.email, code)
            .await
            .map_err(|e| {
                error!("Verification failed: {e}");
                AuthError::VerificationFailed(e.to_string())
            })?;
        self.session
            .login(session)
            .map_err(|e| AuthError::VerificationFailed(e.to_string()))?;
        self.verification = None;
        Ok(())
    }
}
