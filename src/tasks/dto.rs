use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::repo_types::Task;
use crate::validation::{loose_text, RecordId};

#[derive(Debug, Deserialize)]
pub struct AddTaskRequest {
    #[serde(default)]
    pub category_id: RecordId,
    #[serde(default, deserialize_with = "loose_text")]
    pub task: Option<String>,
    /// Date string or Unix milliseconds, see `validation::parse_due`.
    #[serde(default)]
    pub due: Option<Value>,
}

/// Body of complete, undo and delete.
#[derive(Debug, Deserialize)]
pub struct TaskIdRequest {
    #[serde(default)]
    pub id: RecordId,
}

#[derive(Debug, Deserialize)]
pub struct EditTaskRequest {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default, deserialize_with = "loose_text")]
    pub task: Option<String>,
    #[serde(default)]
    pub due: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct Tasks {
    pub tasks: Vec<Task>,
}
