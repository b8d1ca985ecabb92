use serde::{Deserialize, Serialize};

use crate::db::User;
use crate::entities::{cases, crimes, criminals, evidence, statutes};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// Wire DTOs use camelCase to match the JSON contract of the web client.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
    pub bio: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            bio: user.bio,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseDto {
    pub id: String,
    pub case_number: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<cases::Model> for CaseDto {
    fn from(model: cases::Model) -> Self {
        Self {
            id: model.id,
            case_number: model.case_number,
            title: model.title,
            description: model.description,
            status: model.status,
            created_by: model.created_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriminalDto {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub aliases: Vec<String>,
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
    pub threat_level: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<criminals::Model> for CriminalDto {
    fn from(model: criminals::Model) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            aliases: parse_string_list(model.aliases.as_deref()),
            date_of_birth: model.date_of_birth,
            address: model.address,
            threat_level: model.threat_level,
            status: model.status,
            notes: model.notes,
            created_by: model.created_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceDto {
    pub id: String,
    pub case_id: String,
    pub title: String,
    pub filename: Option<String>,
    pub tags: Vec<String>,
    pub summary: Option<String>,
    pub uploaded_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<evidence::Model> for EvidenceDto {
    fn from(model: evidence::Model) -> Self {
        Self {
            id: model.id,
            case_id: model.case_id,
            title: model.title,
            filename: model.filename,
            tags: parse_string_list(model.tags.as_deref()),
            summary: model.summary,
            uploaded_by: model.uploaded_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatuteDto {
    pub id: String,
    pub title: String,
    pub section_number: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub created_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<statutes::Model> for StatuteDto {
    fn from(model: statutes::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            section_number: model.section_number,
            description: model.description,
            content: model.content,
            created_by: model.created_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrimeDto {
    pub id: String,
    pub criminal_id: String,
    pub statute_id: String,
    pub case_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub charge_level: Option<String>,
    pub status: String,
    pub created_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<crimes::Model> for CrimeDto {
    fn from(model: crimes::Model) -> Self {
        Self {
            id: model.id,
            criminal_id: model.criminal_id,
            statute_id: model.statute_id,
            case_id: model.case_id,
            name: model.name,
            description: model.description,
            charge_level: model.charge_level,
            status: model.status,
            created_by: model.created_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub version: String,
    pub uptime: u64,
    pub cases: u64,
    pub criminals: u64,
    pub evidence: u64,
    pub statutes: u64,
    pub crimes: u64,
}

#[derive(Debug, Deserialize)]
pub struct EvidenceListQuery {
    #[serde(rename = "case_id", alias = "caseId")]
    pub case_id: Option<String>,
}

/// Columns persisted as JSON arrays come back as `Vec` on the wire;
/// a corrupt or missing value reads as empty.
fn parse_string_list(raw: Option<&str>) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default()
}
