use serde::Serialize;

pub const DEFAULT_CREDITS: u32 = 3;

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub credits: u32,
    pub department: String,
    pub faculty_id: Option<String>,  // owning faculty user
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub credits: u32,
    pub department: String,
    pub faculty_id: Option<String>,
}
