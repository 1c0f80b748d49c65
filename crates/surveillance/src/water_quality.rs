//! Water-quality samples filed from the field.
//!
//! Samples sit in their own collection beside the region tree. They are
//! attributed to a region (and optionally a district, subdivision and block)
//! but never feed the disease rollup.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{SAFE_E_COLI_BELOW, SAFE_PH_MAX, SAFE_PH_MIN, SAFE_TURBIDITY_BELOW_NTU};
use crate::projection::ChartPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SiteType {
    Well,
    River,
    Tap,
    Reservoir,
}

impl SiteType {
    pub fn label(self) -> &'static str {
        match self {
            SiteType::Well => "Well",
            SiteType::River => "River",
            SiteType::Tap => "Tap",
            SiteType::Reservoir => "Reservoir",
        }
    }
}

/// The numeric water parameters an auto-trigger rule can watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaterParameter {
    #[serde(rename = "pH")]
    Ph,
    #[serde(rename = "Temperature (C)")]
    Temperature,
    #[serde(rename = "Turbidity (NTU)")]
    Turbidity,
    #[serde(rename = "Dissolved Oxygen (mg/L)")]
    DissolvedOxygen,
    #[serde(rename = "Nitrate (mg/L)")]
    Nitrate,
    #[serde(rename = "E. coli (CFU/100ml)")]
    EColi,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterQualityReport {
    pub id: String,
    pub sample_id: String,
    pub timestamp: String,
    pub site_name: String,
    pub site_type: SiteType,
    #[serde(default)]
    pub latitude: String,
    #[serde(default)]
    pub longitude: String,
    #[serde(default)]
    pub collector_id: String,
    #[serde(default)]
    pub lab_id: String,
    pub ph: f64,
    pub temperature: f64,
    pub turbidity: f64,
    pub dissolved_oxygen: f64,
    pub nitrate: f64,
    pub e_coli: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "stateId")]
    pub region_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_division: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<String>,
}

impl WaterQualityReport {
    pub fn value(&self, parameter: WaterParameter) -> f64 {
        match parameter {
            WaterParameter::Ph => self.ph,
            WaterParameter::Temperature => self.temperature,
            WaterParameter::Turbidity => self.turbidity,
            WaterParameter::DissolvedOxygen => self.dissolved_oxygen,
            WaterParameter::Nitrate => self.nitrate,
            WaterParameter::EColi => self.e_coli,
        }
    }

    /// Drinkable by the dashboard's rule: no E. coli and low turbidity.
    pub fn is_safe(&self) -> bool {
        self.e_coli < SAFE_E_COLI_BELOW && self.turbidity < SAFE_TURBIDITY_BELOW_NTU
    }

    pub fn ph_in_range(&self) -> bool {
        (SAFE_PH_MIN..=SAFE_PH_MAX).contains(&self.ph)
    }

    /// Same subdivision/block filter rule as disease reports.
    pub fn matches(&self, sub_division: Option<&str>, block: Option<&str>) -> bool {
        sub_division.is_none_or(|sd| self.sub_division.as_deref() == Some(sd))
            && block.is_none_or(|b| self.block.as_deref() == Some(b))
    }
}

/// Sample counts per site type.
pub fn site_type_distribution(reports: &[&WaterQualityReport]) -> Vec<ChartPoint> {
    let mut counts: BTreeMap<SiteType, u32> = BTreeMap::new();
    for r in reports {
        *counts.entry(r.site_type).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(site, n)| ChartPoint {
            name: site.label().to_string(),
            value: n,
        })
        .collect()
}

/// Number of samples failing the safety rule.
pub fn unsafe_sample_count(reports: &[&WaterQualityReport]) -> usize {
    reports.iter().filter(|r| !r.is_safe()).count()
}

#[cfg(test)]
pub(crate) fn sample(id: &str, region_id: &str) -> WaterQualityReport {
    WaterQualityReport {
        id: id.to_string(),
        sample_id: format!("S-{id}"),
        timestamp: "2024-06-01T10:00".to_string(),
        site_name: "North Village Well".to_string(),
        site_type: SiteType::Well,
        latitude: String::new(),
        longitude: String::new(),
        collector_id: String::new(),
        lab_id: String::new(),
        ph: 7.0,
        temperature: 25.0,
        turbidity: 0.0,
        dissolved_oxygen: 6.0,
        nitrate: 0.0,
        e_coli: 0.0,
        notes: None,
        region_id: region_id.to_string(),
        district_id: None,
        sub_division: None,
        block: None,
    }
}
