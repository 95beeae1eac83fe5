//! School entity model and DTOs.

use attenda_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A school row from the `schools` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct School {
    pub id: DbId,
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    /// IANA timezone name, stored verbatim (e.g. `Europe/Berlin`).
    pub timezone: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new school.
#[derive(Debug, Deserialize)]
pub struct CreateSchool {
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub timezone: Option<String>,
}

/// DTO for updating an existing school. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateSchool {
    pub name: Option<String>,
    pub address: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub timezone: Option<String>,
    pub is_active: Option<bool>,
}
