use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Returned when a stored or submitted enum value is not one we know.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a string-backed enum with `as_str`, `FromStr` and `Display`.
/// The string forms are the ones stored in the database and sent over JSON.
macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownVariant { kind: $kind, value: other.to_string() }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Builder,
    Homeowner,
}

string_enum!(Role, "role", {
    Admin => "admin",
    Builder => "builder",
    Homeowner => "homeowner",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    #[default]
    Planning,
    InProgress,
    Completed,
    OnHold,
}

string_enum!(ProjectStatus, "project status", {
    Planning => "planning",
    InProgress => "in-progress",
    Completed => "completed",
    OnHold => "on-hold",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageCategory {
    Interior,
    Exterior,
    Structural,
    Finishes,
    #[default]
    General,
    Other,
}

string_enum!(ImageCategory, "image category", {
    Interior => "interior",
    Exterior => "exterior",
    Structural => "structural",
    Finishes => "finishes",
    General => "general",
    Other => "other",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

string_enum!(LogLevel, "log level", {
    Debug => "debug",
    Info => "info",
    Warn => "warn",
    Error => "error",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub builder_id: Option<Uuid>,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Display name from a first/last pair. Either half may be empty.
pub fn display_name(first_name: &str, last_name: &str) -> String {
    format!("{} {}", first_name.trim(), last_name.trim())
        .trim()
        .to_string()
}

/// Progress is a whole percentage.
pub const MAX_PROGRESS: u8 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub address: String,
    pub status: ProjectStatus,
    pub homeowner_id: Uuid,
    pub homeowner_name: String,
    pub builder_id: Option<Uuid>,
    pub progress: u8,
    pub thumbnail: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectImage {
    pub id: Uuid,
    pub project_id: Uuid,
    pub url: String,
    pub caption: String,
    pub category: ImageCategory,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub user_id: Uuid,
    pub image_id: Uuid,
    pub project_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Uuid,
    pub level: LogLevel,
    pub message: String,
    pub context: Option<serde_json::Value>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
