use std::sync::Arc;

use dashmap::{mapref::entry::Entry, DashMap};
use rand::{rngs::OsRng, Rng};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

use crate::hashing::{hash_secret, verify_secret};

pub const CODE_LENGTH: usize = 6;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OtpError {
    #[error("no pending code for this phone number")]
    NotFound,
    #[error("code has expired")]
    Expired,
    #[error("code does not match")]
    Mismatch,
    #[error("hashing failed: {0}")]
    Hash(String),
}

pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct OtpEntry {
    hash: String,
    expires_at: OffsetDateTime,
}

/// A code that passed verification and was taken out of the ledger.
/// Hand it back with [`OtpLedger::restore`] if the caller could not act on it.
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub struct Redeemed {
    phone: String,
    entry: OtpEntry,
}

/// Process-local store of pending one-time codes, at most one per phone.
///
/// Only the argon2 hash of a code is kept. Entries are consumed by a
/// successful verification or when found expired; a wrong guess leaves
/// the entry in place so the user can retry inside the window.
pub struct OtpLedger {
    entries: DashMap<String, OtpEntry>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl OtpLedger {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a fresh code for `phone`, replacing any outstanding one.
    /// The plaintext is returned for delivery and never stored.
    pub fn issue(&self, phone: &str) -> Result<String, OtpError> {
        let code = generate_code();
        let hash = hash_secret(&code).map_err(|e| OtpError::Hash(e.to_string()))?;
        let expires_at = self.clock.now() + self.ttl;
        self.entries
            .insert(phone.to_string(), OtpEntry { hash, expires_at });
        debug!(phone = %phone, expires_at = %expires_at, "otp issued");
        Ok(code)
    }

    pub fn verify(&self, phone: &str, candidate: &str) -> Result<Redeemed, OtpError> {
        // snapshot, so no shard lock is held across the argon2 check
        let entry = self
            .entries
            .get(phone)
            .map(|e| e.value().clone())
            .ok_or(OtpError::NotFound)?;

        if self.clock.now() > entry.expires_at {
            self.entries.remove_if(phone, |_, e| e.hash == entry.hash);
            warn!(phone = %phone, "otp expired");
            return Err(OtpError::Expired);
        }

        let matches =
            verify_secret(candidate, &entry.hash).map_err(|e| OtpError::Hash(e.to_string()))?;
        if !matches {
            warn!(phone = %phone, "otp mismatch");
            return Err(OtpError::Mismatch);
        }

        // a resend may have replaced the entry while we were hashing;
        // the candidate then belongs to a superseded code
        match self.entries.remove_if(phone, |_, e| e.hash == entry.hash) {
            Some((phone, entry)) => Ok(Redeemed { phone, entry }),
            None => {
                warn!(phone = %phone, "otp superseded during verification");
                Err(OtpError::Mismatch)
            }
        }
    }

    /// Put a redeemed code back, unless a newer code was issued since.
    pub fn restore(&self, redeemed: Redeemed) -> bool {
        match self.entries.entry(redeemed.phone) {
            Entry::Vacant(slot) => {
                debug!(phone = %slot.key(), "otp restored");
                slot.insert(redeemed.entry);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Drop every entry whose expiry has passed. Returns how many went.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, e| now <= e.expires_at);
        before.saturating_sub(self.entries.len())
    }

    #[cfg(test)]
    pub fn contains(&self, phone: &str) -> bool {
        self.entries.contains_key(phone)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

fn generate_code() -> String {
    let mut rng = OsRng;
    (0..CODE_LENGTH)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}
