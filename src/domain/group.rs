use super::money::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type GroupId = u32;

/// The collective that members pay into.
///
/// One group per deployment in practice. It is created by an explicit
/// bootstrap step and only mutated when the monthly rate changes.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    /// The amount a member owes for every billing period.
    pub monthly_due: Amount,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Group {
    pub fn new(id: GroupId, name: impl Into<String>, monthly_due: Amount) -> Self {
        Self {
            id,
            name: name.into(),
            monthly_due,
            description: String::new(),
            created_at: Utc::now(),
        }
    }
}
