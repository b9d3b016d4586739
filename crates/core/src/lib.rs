use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const PROJECT_NAME: &str = "politikdokumente";
pub const PROJECT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Column order used by every tabular export.
pub const FIELD_NAMES: [&str; 6] = ["link", "title", "date", "place", "abstract", "text"];

/// One speech, extracted from a single detail page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speech {
    pub link: String,
    pub title: String,
    pub date: Option<NaiveDate>,
    pub place: Option<String>,
    #[serde(rename = "abstract")]
    pub summary: Option<String>,
    pub text: String,
}

impl Speech {
    pub fn new(link: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            title: title.into(),
            date: None,
            place: None,
            summary: None,
            text: String::new(),
        }
    }

    /// Cells in `FIELD_NAMES` order; absent values become empty cells.
    pub fn to_row(&self) -> [String; 6] {
        [
            self.link.clone(),
            self.title.clone(),
            self.date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
            self.place.clone().unwrap_or_default(),
            self.summary.clone().unwrap_or_default(),
            self.text.clone(),
        ]
    }
}

pub fn user_agent() -> String {
    format!("{}/{}", PROJECT_NAME, PROJECT_VERSION)
}
