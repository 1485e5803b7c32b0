use serde::{Deserialize, Serialize};

use crate::model::person::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginObject {
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUserObject {
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTeacherObject {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperQuery {
    pub student_id: String,
}
