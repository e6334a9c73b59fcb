use serde::{Deserialize, Serialize};

use super::repo_types::Category;
use crate::validation::{loose_text, RecordId};

#[derive(Debug, Deserialize)]
pub struct AddCategoryRequest {
    #[serde(default, deserialize_with = "loose_text")]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteCategoryRequest {
    #[serde(default)]
    pub id: RecordId,
}

#[derive(Debug, Serialize)]
pub struct Categories {
    pub categories: Vec<Category>,
}
