use crate::domain::lenient;
use serde::{Deserialize, Serialize};

const DEFAULT_READ_TIME_MINUTES: f64 = 3.0;

/// News article written from a [`FinancialData`](super::financials::FinancialData) record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default, deserialize_with = "lenient::text")]
    pub headline: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub subheadline: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub lead: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub key_numbers: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub segment_details: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub management_commentary: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub outlook: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub conclusion: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub read_time: Option<f64>,
}

/// The narrative sections in reading order, after the lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    KeyNumbers,
    SegmentDetails,
    ManagementCommentary,
    Outlook,
    Conclusion,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::KeyNumbers,
        Section::SegmentDetails,
        Section::ManagementCommentary,
        Section::Outlook,
        Section::Conclusion,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Section::KeyNumbers => "Key Numbers",
            Section::SegmentDetails => "Segment Performance",
            Section::ManagementCommentary => "Management Commentary",
            Section::Outlook => "Outlook & Guidance",
            Section::Conclusion => "Conclusion",
        }
    }

    /// Placeholder shown in the results view when the model left a section out.
    pub fn placeholder(self) -> &'static str {
        match self {
            Section::KeyNumbers => "",
            Section::SegmentDetails => "Details not available.",
            Section::ManagementCommentary => "Commentary not available.",
            Section::Outlook => "Outlook not available.",
            Section::Conclusion => "",
        }
    }
}

impl Article {
    pub fn headline_or_default(&self) -> &str {
        self.headline.as_deref().unwrap_or("Earnings Report")
    }

    pub fn read_time_minutes(&self) -> f64 {
        self.read_time
            .filter(|m| *m > 0.0)
            .unwrap_or(DEFAULT_READ_TIME_MINUTES)
    }

    pub fn lead_text(&self) -> &str {
        self.lead.as_deref().unwrap_or_default()
    }

    pub fn section(&self, section: Section) -> Option<&str> {
        match section {
            Section::KeyNumbers => self.key_numbers.as_deref(),
            Section::SegmentDetails => self.segment_details.as_deref(),
            Section::ManagementCommentary => self.management_commentary.as_deref(),
            Section::Outlook => self.outlook.as_deref(),
            Section::Conclusion => self.conclusion.as_deref(),
        }
    }

    pub fn section_text(&self, section: Section) -> &str {
        self.section(section).unwrap_or_default()
    }
}
