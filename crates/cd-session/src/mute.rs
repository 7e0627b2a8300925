//! Mute records and the per-user mute state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One moderation action: a mute paired with its eventual unmute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuteRecord {
    /// Identity of whoever issued the mute.
    pub source: String,
    pub reason: String,
    pub muted_at: DateTime<Utc>,
    pub unmute_source: Option<String>,
    pub unmuted_at: Option<DateTime<Utc>>,
}

impl MuteRecord {
    fn open(source: &str, reason: &str, at: DateTime<Utc>) -> Self {
        Self {
            source: source.to_string(),
            reason: reason.to_string(),
            muted_at: at,
            unmute_source: None,
            unmuted_at: None,
        }
    }

    /// A record stays open until the matching unmute closes it.
    pub fn is_open(&self) -> bool {
        self.unmuted_at.is_none()
    }

    pub fn is_closed(&self) -> bool {
        !self.is_open()
    }
}

/// Append-only mute history.
///
/// Invariant: at most one open record exists, and when present it is the
/// tail of the list. Records are never reordered or deleted; the only
/// mutation after append is the single close performed by `unmute`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MuteHistory {
    records: Vec<MuteRecord>,
}

impl MuteHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from persisted records (join-time load).
    pub fn from_records(records: Vec<MuteRecord>) -> Self {
        Self { records }
    }

    pub fn is_muted(&self) -> bool {
        self.records.last().map(MuteRecord::is_open).unwrap_or(false)
    }

    /// The most recently appended record, open or closed.
    pub fn last_record(&self) -> Option<&MuteRecord> {
        self.records.last()
    }

    pub fn records(&self) -> &[MuteRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append an open record stamped at call time. Returns false and leaves
    /// the history untouched when already muted.
    pub fn mute(&mut self, source: &str, reason: &str) -> bool {
        self.mute_at(source, reason, Utc::now())
    }

    pub(crate) fn mute_at(&mut self, source: &str, reason: &str, at: DateTime<Utc>) -> bool {
        if self.is_muted() {
            return false;
        }
        self.records.push(MuteRecord::open(source, reason, at));
        true
    }

    /// Close the open tail record. Returns false when not muted.
    pub fn unmute(&mut self, source: &str) -> bool {
        self.unmute_at(source, Utc::now())
    }

    pub(crate) fn unmute_at(&mut self, source: &str, at: DateTime<Utc>) -> bool {
        match self.records.last_mut() {
            Some(record) if record.is_open() => {
                record.unmute_source = Some(source.to_string());
                record.unmuted_at = Some(at);
                true
            }
            _ => false,
        }
    }
}
