use super::group::GroupId;
use crate::error::LedgerError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The member's unique identifier string (national id number or similar).
///
/// Control characters are rejected: storage keys use `0x00` as the separator
/// between the id and the period.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemberId(String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Result<Self, LedgerError> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err(LedgerError::InvalidInput(
                "member id must not be empty".to_string(),
            ));
        }
        if id.chars().any(char::is_control) {
            return Err(LedgerError::InvalidInput(format!(
                "member id {id:?} contains control characters"
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MemberId {
    type Error = LedgerError;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<MemberId> for String {
    fn from(id: MemberId) -> Self {
        id.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A person enrolled in a group.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Member {
    pub id: MemberId,
    pub group_id: GroupId,
    pub full_name: String,
    pub phone: String,
    /// Billing starts in the month containing this date.
    pub enrollment_date: NaiveDate,
    pub active: bool,
}

impl Member {
    pub fn new(
        id: MemberId,
        group_id: GroupId,
        full_name: impl Into<String>,
        enrollment_date: NaiveDate,
    ) -> Self {
        Self {
            id,
            group_id,
            full_name: full_name.into(),
            phone: String::new(),
            enrollment_date,
            active: true,
        }
    }

    /// Full name, falling back to the id when no name was given.
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            self.id.as_str()
        } else {
            &self.full_name
        }
    }
}

/// Which members a listing should include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemberFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl MemberFilter {
    pub fn matches(&self, member: &Member) -> bool {
        match self {
            MemberFilter::All => true,
            MemberFilter::Active => member.active,
            MemberFilter::Inactive => !member.active,
        }
    }
}
