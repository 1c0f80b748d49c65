//! Disease aggregates and the field reports that feed them.
//!
//! A `Disease` carries a stored `affected` count plus the raw `DiseaseReport`s
//! filed against it. Reports are append-only; a report's `cases_count` must
//! always equal the sum of its age-group breakdown.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Direction shown next to a disease count on dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Stable,
}

/// Who filed a field report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceType {
    /// Accredited Social Health Activist.
    #[serde(rename = "ASHA")]
    Asha,
    #[serde(rename = "clinic")]
    Clinic,
    #[serde(rename = "volunteer")]
    Volunteer,
}

impl SourceType {
    pub fn label(self) -> &'static str {
        match self {
            SourceType::Asha => "ASHA",
            SourceType::Clinic => "clinic",
            SourceType::Volunteer => "volunteer",
        }
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symptoms {
    pub fever: bool,
    #[serde(rename = "diarrhea")]
    pub diarrhea_episodes: u32,
    #[serde(rename = "vomiting")]
    pub vomiting_episodes: u32,
    pub onset_days: u32,
}

/// Case breakdown by age band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeGroups {
    pub under5: u32,
    pub five_to_fifteen: u32,
    pub over15: u32,
}

impl AgeGroups {
    pub fn new(under5: u32, five_to_fifteen: u32, over15: u32) -> Self {
        Self {
            under5,
            five_to_fifteen,
            over15,
        }
    }

    /// Widened so that no breakdown can overflow.
    pub fn total(&self) -> u64 {
        u64::from(self.under5) + u64::from(self.five_to_fifteen) + u64::from(self.over15)
    }
}

/// One incident record filed by a field worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseReport {
    pub id: String,
    pub source_type: SourceType,
    /// Free-form local timestamp as entered on the form (`YYYY-MM-DDTHH:MM`).
    pub timestamp: String,
    pub symptoms: Symptoms,
    pub cases_count: u32,
    pub age_groups: AgeGroups,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_division: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<String>,
}

impl DiseaseReport {
    /// Builds a report with no symptoms or attribution; callers fill in the rest.
    pub fn new(
        id: impl Into<String>,
        source_type: SourceType,
        timestamp: impl Into<String>,
        cases_count: u32,
        age_groups: AgeGroups,
    ) -> Self {
        Self {
            id: id.into(),
            source_type,
            timestamp: timestamp.into(),
            symptoms: Symptoms::default(),
            cases_count,
            age_groups,
            notes: None,
            water_source: None,
            sub_division: None,
            block: None,
        }
    }

    pub fn at(mut self, sub_division: &str, block: Option<&str>) -> Self {
        self.sub_division = Some(sub_division.to_string());
        self.block = block.map(str::to_string);
        self
    }

    pub fn with_water_source(mut self, source: &str) -> Self {
        self.water_source = Some(source.to_string());
        self
    }

    /// True when the age breakdown accounts for every case.
    pub fn is_consistent(&self) -> bool {
        u64::from(self.cases_count) == self.age_groups.total()
    }

    /// Drill-down filter shared by the projector: a `None` criterion matches
    /// everything, a `Some` criterion requires an exact attribution match.
    pub fn matches(&self, sub_division: Option<&str>, block: Option<&str>) -> bool {
        if let Some(sd) = sub_division {
            if self.sub_division.as_deref() != Some(sd) {
                return false;
            }
        }
        if let Some(b) = block {
            if self.block.as_deref() != Some(b) {
                return false;
            }
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Disease aggregate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disease {
    pub id: String,
    pub name: String,
    pub affected: u32,
    #[serde(default)]
    pub trend: Trend,
    pub last_updated: NaiveDate,
    #[serde(default)]
    pub reports: Vec<DiseaseReport>,
}

impl Disease {
    pub fn new(id: impl Into<String>, name: impl Into<String>, affected: u32, today: NaiveDate) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            affected,
            trend: Trend::Stable,
            last_updated: today,
            reports: Vec::new(),
        }
    }

    pub fn with_trend(mut self, trend: Trend) -> Self {
        self.trend = trend;
        self
    }

    /// Copy with `report` appended and its cases added to `affected`.
    pub fn with_report(&self, report: DiseaseReport, today: NaiveDate) -> Self {
        let mut next = self.clone();
        next.affected = next.affected.saturating_add(report.cases_count);
        next.reports.push(report);
        next.last_updated = today;
        next
    }

    /// Cases over reports matching the drill-down filter.
    pub fn cases_matching(&self, sub_division: Option<&str>, block: Option<&str>) -> u32 {
        self.reports
            .iter()
            .filter(|r| r.matches(sub_division, block))
            .map(|r| r.cases_count)
            .fold(0, u32::saturating_add)
    }

    pub fn reported_cases(&self) -> u32 {
        self.reports.iter().map(|r| r.cases_count).fold(0, u32::saturating_add)
    }
}

/// Sum of `affected` across a disease list.
pub fn total_affected(diseases: &[Disease]) -> u32 {
    diseases.iter().map(|d| d.affected).fold(0, u32::saturating_add)
}
