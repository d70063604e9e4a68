//! Surf Class Model

use serde::{Deserialize, Serialize};

/// Class format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassType {
    Group,
    Private,
    #[serde(rename = "PACK3")]
    Pack3,
    #[serde(rename = "PACK5")]
    Pack5,
    Mixed,
}

/// Scheduled class (remote table `classes`)
///
/// Removal from the schedule is a soft delete: `archived` is set and the row,
/// along with every reservation pointing at it, stays readable for reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfClass {
    pub id: String,
    pub date: String,
    pub time: String,
    #[serde(rename = "type")]
    pub class_type: ClassType,
    #[serde(rename = "maxSpots")]
    pub capacity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tide_note: Option<String>,
    #[serde(rename = "isArchived", default, deserialize_with = "super::null_as_default")]
    pub archived: bool,
}

impl SurfClass {
    /// Visible in active scheduling views
    pub fn is_active(&self) -> bool {
        !self.archived
    }
}

/// Create class payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfClassCreate {
    pub date: String,
    pub time: String,
    #[serde(rename = "type")]
    pub class_type: ClassType,
    #[serde(rename = "maxSpots")]
    pub capacity: u32,
    pub tide_note: Option<String>,
}

impl SurfClassCreate {
    pub fn into_class(self, id: String) -> SurfClass {
        SurfClass {
            id,
            date: self.date,
            time: self.time,
            class_type: self.class_type,
            capacity: self.capacity,
            tide_note: self.tide_note,
            archived: false,
        }
    }
}
