//! Input and contract for the external summarization service.
//!
//! The core only builds a [`RegionDigest`] and hands it to a [`Summarizer`].
//! Whatever comes back (text, error or a placeholder) is the caller's to
//! show; no mutation ever waits on it.

use std::fmt;

use serde::Serialize;

use crate::disease::Trend;
use crate::hierarchy::Region;
use crate::projection::{
    active_data, displayed_diseases, missing_required_diseases, total_displayed, DiseaseView,
    Selection,
};

/// Snapshot of what the dashboard currently shows for one region.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionDigest {
    pub region_id: String,
    /// Name of the selected level (district or region).
    pub level_name: String,
    pub total_cases: u32,
    pub diseases: Vec<DiseaseView>,
    pub missing_diseases: Vec<&'static str>,
}

impl RegionDigest {
    pub fn build(region: &Region, selection: &Selection) -> Self {
        let active = active_data(region, selection.district_id.as_deref());
        let diseases = displayed_diseases(
            active,
            selection.sub_division.as_deref(),
            selection.block.as_deref(),
        );
        Self {
            region_id: region.id.clone(),
            level_name: active.name().to_string(),
            total_cases: total_displayed(&diseases),
            missing_diseases: missing_required_diseases(active),
            diseases,
        }
    }

    /// Disease with the most cases, if any has a case.
    pub fn leading_disease(&self) -> Option<&DiseaseView> {
        self.diseases
            .iter()
            .filter(|d| d.affected > 0)
            .max_by_key(|d| d.affected)
    }

    pub fn rising(&self) -> impl Iterator<Item = &DiseaseView> {
        self.diseases.iter().filter(|d| d.trend == Trend::Up)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryError {
    /// The service could not be reached or refused the request.
    Unavailable(String),
    /// The service did not answer in time.
    Timeout,
}

impl fmt::Display for SummaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryError::Unavailable(msg) => write!(f, "Summary service unavailable: {msg}"),
            SummaryError::Timeout => write!(f, "Summary service timed out"),
        }
    }
}

impl std::error::Error for SummaryError {}

pub trait Summarizer {
    fn summarize(&self, digest: &RegionDigest) -> Result<String, SummaryError>;
}

/// Local stand-in used when no service is configured. Produces a plain
/// one-paragraph overview from the digest alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSummarizer;

impl Summarizer for OfflineSummarizer {
    fn summarize(&self, digest: &RegionDigest) -> Result<String, SummaryError> {
        let mut text = format!(
            "{}: {} active cases across {} tracked diseases.",
            digest.level_name,
            digest.total_cases,
            digest.diseases.len()
        );
        if let Some(lead) = digest.leading_disease() {
            text.push_str(&format!(" {} leads with {} cases.", lead.name, lead.affected));
        }
        let rising: Vec<&str> = digest.rising().map(|d| d.name.as_str()).collect();
        if !rising.is_empty() {
            text.push_str(&format!(" Rising: {}.", rising.join(", ")));
        }
        if !digest.missing_diseases.is_empty() {
            text.push_str(&format!(
                " Not yet tracked: {}.",
                digest.missing_diseases.join(", ")
            ));
        }
        Ok(text)
    }
}
