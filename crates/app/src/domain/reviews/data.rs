//! Review Data

use serde::Deserialize;

/// New Review Data
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewReview {
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
}
