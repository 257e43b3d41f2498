use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, Rng};
use subtle::ConstantTimeEq;

use crate::error::{Error, Result};
use crate::models::account::PendingCode;

pub const CODE_TTL_MINUTES: i64 = 10;
const CODE_SPACE: u32 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCode {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Uniform 6-digit code, zero-padded, valid for ten minutes from `now`.
pub fn issue_code(now: DateTime<Utc>) -> IssuedCode {
    let n: u32 = OsRng.gen_range(0..CODE_SPACE);
    IssuedCode {
        code: format!("{:06}", n),
        expires_at: now + Duration::minutes(CODE_TTL_MINUTES),
    }
}

/// Expiry is checked before the comparison: a correct code entered late is
/// still reported as expired.
pub fn check_code(pending: Option<PendingCode<'_>>, supplied: &str, now: DateTime<Utc>) -> Result<()> {
    let Some(pending) = pending else {
        return Err(Error::NotFound(
            "No verification code is pending for this account.".into(),
        ));
    };
    if now > pending.expires_at {
        return Err(Error::Expired(
            "Verification code has expired. Please request a new one.".into(),
        ));
    }
    let matches: bool = pending.code.as_bytes().ct_eq(supplied.as_bytes()).into();
    if !matches {
        return Err(Error::Mismatch("Invalid verification code.".into()));
    }
    Ok(())
}
