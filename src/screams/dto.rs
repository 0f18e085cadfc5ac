use serde::{Deserialize, Serialize};

use super::repo::Scream;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewScreamRequest {
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct ScreamResponse {
    pub scream: Scream,
}
