//! Identifier types for parkease.
//!
//! - `BranchId`: the identity-provider subject of a branch operator account
//! - `RecordId`: a ULID, so parking records sort chronologically
//! - `TariffId`: a UUID for configured tariffs
//! - `Plate`: a normalised vehicle licence plate

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Maximum length of a branch identifier.
///
/// Identity-provider subjects are short opaque strings (28 chars for
/// Firebase uids, 36 for UUIDs).
pub const MAX_BRANCH_ID_LEN: usize = 128;

/// Maximum length of a licence plate after normalisation.
pub const MAX_PLATE_LEN: usize = 16;

/// A branch identifier.
///
/// Each branch is owned by exactly one operator account, so the branch
/// identifier is the `sub` claim of that account's token. Only ASCII
/// alphanumerics, `-` and `_` are accepted, which keeps the identifier safe
/// to embed in storage keys and URL paths.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchId(String);

impl BranchId {
    /// Return the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the identifier bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl FromStr for BranchId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.len() > MAX_BRANCH_ID_LEN {
            return Err(IdError::InvalidBranchId);
        }
        if !s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(IdError::InvalidBranchId);
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Debug for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BranchId({})", self.0)
    }
}

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for BranchId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BranchId> for String {
    fn from(id: BranchId) -> Self {
        id.0
    }
}

/// A parking record identifier using ULID for time-ordering.
///
/// Records created later always compare greater, which lets storage
/// backends list a branch's records newest-first by key order alone.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(Ulid);

impl RecordId {
    /// Generate a new `RecordId` with the current timestamp.
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new())
    }

    /// Create a `RecordId` from a ULID.
    #[must_use]
    pub const fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    /// Return the bytes of the ULID (16 bytes).
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 16] {
        self.0.to_bytes()
    }

    /// Create a `RecordId` from bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Ulid::from_bytes(bytes))
    }
}

impl FromStr for RecordId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ulid = Ulid::from_string(s).map_err(|_| IdError::InvalidUlid)?;
        Ok(Self(ulid))
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for RecordId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0.to_string()
    }
}

/// A tariff identifier (UUID).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TariffId(uuid::Uuid);

impl TariffId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Create a new identifier from a UUID.
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for TariffId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = uuid::Uuid::parse_str(s).map_err(|_| IdError::InvalidUuid)?;
        Ok(Self(uuid))
    }
}

impl fmt::Debug for TariffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TariffId({})", self.0)
    }
}

impl fmt::Display for TariffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for TariffId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TariffId> for String {
    fn from(id: TariffId) -> Self {
        id.0.to_string()
    }
}

/// A vehicle licence plate.
///
/// Input is trimmed and upper-cased, so `" abc-123"` and `"ABC-123"` name
/// the same vehicle and the same loyalty account.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Plate(String);

impl Plate {
    /// Return the normalised plate.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Plate {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_uppercase();
        if normalised.is_empty() || normalised.len() > MAX_PLATE_LEN {
            return Err(IdError::InvalidPlate);
        }
        if !normalised
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b' ')
        {
            return Err(IdError::InvalidPlate);
        }
        Ok(Self(normalised))
    }
}

impl fmt::Debug for Plate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Plate({})", self.0)
    }
}

impl fmt::Display for Plate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Plate {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Plate> for String {
    fn from(plate: Plate) -> Self {
        plate.0
    }
}

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input is not a valid UUID.
    #[error("invalid UUID format")]
    InvalidUuid,

    /// The input is not a valid ULID.
    #[error("invalid ULID format")]
    InvalidUlid,

    /// The input is not a valid branch identifier.
    #[error("invalid branch identifier")]
    InvalidBranchId,

    /// The input is not a valid licence plate.
    #[error("invalid licence plate")]
    InvalidPlate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_id_accepts_firebase_uid() {
        let id: BranchId = "Xk3fP9aQ2mT7vB1cD8eF5gH6iJ0k".parse().unwrap();
        assert_eq!(id.as_str(), "Xk3fP9aQ2mT7vB1cD8eF5gH6iJ0k");
    }

    #[test]
    fn branch_id_rejects_separators_and_empty() {
        assert_eq!("".parse::<BranchId>(), Err(IdError::InvalidBranchId));
        assert_eq!("a/b".parse::<BranchId>(), Err(IdError::InvalidBranchId));
        assert_eq!("a\0b".parse::<BranchId>(), Err(IdError::InvalidBranchId));
        let long = "a".repeat(MAX_BRANCH_ID_LEN + 1);
        assert_eq!(long.parse::<BranchId>(), Err(IdError::InvalidBranchId));
    }

    #[test]
    fn branch_id_serde_json() {
        let id: BranchId = "branch-1".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"branch-1\"");
        assert!(serde_json::from_str::<BranchId>("\"bad id\"").is_err());
    }

    #[test]
    fn record_ids_are_time_ordered() {
        let first = RecordId::generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = RecordId::generate();
        assert!(second > first);
    }

    #[test]
    fn record_id_bytes_roundtrip() {
        let id = RecordId::generate();
        assert_eq!(RecordId::from_bytes(id.to_bytes()), id);
    }

    #[test]
    fn record_id_rejects_garbage() {
        assert_eq!("not-a-ulid".parse::<RecordId>(), Err(IdError::InvalidUlid));
    }

    #[test]
    fn tariff_id_serde_json() {
        let id = TariffId::generate();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: TariffId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn plate_is_normalised() {
        let plate: Plate = "  abc-123 ".parse().unwrap();
        assert_eq!(plate.as_str(), "ABC-123");
        assert_eq!(plate, "ABC-123".parse().unwrap());
    }

    #[test]
    fn plate_rejects_invalid_input() {
        assert_eq!("   ".parse::<Plate>(), Err(IdError::InvalidPlate));
        assert_eq!("ABC_123".parse::<Plate>(), Err(IdError::InvalidPlate));
        assert_eq!(
            "ABCDEFGHIJKLMNOPQ".parse::<Plate>(),
            Err(IdError::InvalidPlate)
        );
    }
}
