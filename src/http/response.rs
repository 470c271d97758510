//! Response bodies that are not documents themselves

use serde::Serialize;

/// Delete response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

impl DeleteResponse {
    pub fn new() -> Self {
        Self { deleted: true }
    }
}

impl Default for DeleteResponse {
    fn default() -> Self {
        Self::new()
    }
}
