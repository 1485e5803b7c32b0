use std::fmt;

use serde::{Deserialize, Serialize};

use crate::database::Collection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
}

impl Role {
    /// The collection holding person records of this role.
    pub fn collection(self) -> Collection {
        match self {
            Role::Student => Collection::Students,
            Role::Teacher => Collection::Teachers,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields shared by student and teacher records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl Person {
    /// Builds a fresh record, deriving the display name from the local part of the email.
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        let email = email.into();
        let name = email.split('@').next().unwrap_or_default().to_owned();
        Self {
            id: String::new(),
            email,
            name,
            role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    #[serde(flatten)]
    pub person: Person,
    /// Teacher emails, in the order they were added. Only the first one drives the dashboard.
    #[serde(default)]
    pub teachers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    #[serde(flatten)]
    pub person: Person,
    #[serde(default)]
    pub students: Vec<String>,
    #[serde(default)]
    pub qset_id: Vec<String>,
}

/// Where a confirmed login should land.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub role: Role,
}

impl Identity {
    pub fn landing_path(&self) -> String {
        format!("/{}/{}", self.role, self.id)
    }
}
