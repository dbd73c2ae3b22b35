//! Contributors credited on a disclosure

use crate::{DisclosureError, DisclosureResult, Money, Points};
use serde::{Deserialize, Serialize};

/// Whether a contributor belongs to the organization
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeCategory {
    Internal,
    External,
}

/// Kind of internal member
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeType {
    Staff,
    Faculty,
    Student,
}

impl EmployeeType {
    pub fn is_student(&self) -> bool {
        matches!(self, EmployeeType::Student)
    }
}

/// How a contributor is identified: an internal uid or an email address
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributorIdentity {
    Uid(String),
    Email(String),
}

impl ContributorIdentity {
    /// Uids compare exactly, emails case-insensitively
    pub fn same_person(&self, other: &ContributorIdentity) -> bool {
        match (self, other) {
            (ContributorIdentity::Uid(a), ContributorIdentity::Uid(b)) => a == b,
            (ContributorIdentity::Email(a), ContributorIdentity::Email(b)) => {
                a.trim().eq_ignore_ascii_case(b.trim())
            }
            _ => false,
        }
    }

    pub fn matches_key(&self, key: &str) -> bool {
        match self {
            ContributorIdentity::Uid(uid) => uid == key,
            ContributorIdentity::Email(email) => email.trim().eq_ignore_ascii_case(key.trim()),
        }
    }
}

impl std::fmt::Display for ContributorIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContributorIdentity::Uid(uid) => write!(f, "uid:{uid}"),
            ContributorIdentity::Email(email) => write!(f, "email:{email}"),
        }
    }
}

/// A person credited on a disclosure
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub category: EmployeeCategory,
    /// Present for internal contributors only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_type: Option<EmployeeType>,
    pub identity: ContributorIdentity,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub role: String,
}

impl Contributor {
    pub fn internal(
        identity: ContributorIdentity,
        employee_type: EmployeeType,
        role: impl Into<String>,
    ) -> Self {
        Self {
            category: EmployeeCategory::Internal,
            employee_type: Some(employee_type),
            identity,
            name: String::new(),
            role: role.into(),
        }
    }

    pub fn external(identity: ContributorIdentity, role: impl Into<String>) -> Self {
        Self {
            category: EmployeeCategory::External,
            employee_type: None,
            identity,
            name: String::new(),
            role: role.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn is_internal(&self) -> bool {
        self.category == EmployeeCategory::Internal
    }

    pub fn is_student(&self) -> bool {
        self.employee_type.is_some_and(|t| t.is_student())
    }

    /// Internal contributors carry an employee type; external ones do not
    pub fn validate(&self) -> DisclosureResult<()> {
        match (self.category, self.employee_type) {
            (EmployeeCategory::Internal, None) => Err(DisclosureError::InvalidInput(format!(
                "internal contributor {} has no employee type",
                self.identity
            ))),
            (EmployeeCategory::External, Some(_)) => Err(DisclosureError::InvalidInput(format!(
                "external contributor {} cannot carry an employee type",
                self.identity
            ))),
            _ => Ok(()),
        }
    }
}

/// What one contributor received when the disclosure was published
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorAward {
    pub identity: ContributorIdentity,
    pub incentive: Money,
    pub points: Points,
}
