//! Entity trait - common interface for stored records

use serde::{de::DeserializeOwned, Serialize};

/// Common trait for records stored as YAML files in a project
pub trait Entity: Serialize + DeserializeOwned {
    /// File suffix shared by every record of this type (e.g. ".sm.yaml")
    const FILE_SUFFIX: &'static str;

    /// The record's ID as written in its file name
    fn id_string(&self) -> String;
}

/// Lifecycle of a record
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Draft,
    Review,
    Approved,
    Released,
    Obsolete,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Draft => "draft",
            Status::Review => "review",
            Status::Approved => "approved",
            Status::Released => "released",
            Status::Obsolete => "obsolete",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(Status::Draft),
            "review" => Ok(Status::Review),
            "approved" => Ok(Status::Approved),
            "released" => Ok(Status::Released),
            "obsolete" => Ok(Status::Obsolete),
            _ => Err(format!(
                "Unknown status: {}. Use draft, review, approved, released or obsolete",
                s
            )),
        }
    }
}
