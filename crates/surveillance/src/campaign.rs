//! Awareness campaigns shown on the alert ticker.
//!
//! A campaign may carry an auto-trigger rule over one water parameter. The
//! rule fires when any sample in scope crosses the threshold.

use serde::{Deserialize, Serialize};

use crate::water_quality::{WaterParameter, WaterQualityReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    Image,
    Video,
    #[serde(rename = "PDF")]
    Pdf,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerOperator {
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    LessThan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoTrigger {
    pub parameter: WaterParameter,
    pub operator: TriggerOperator,
    #[serde(rename = "value")]
    pub threshold: f64,
}

impl AutoTrigger {
    pub fn fires_on(&self, report: &WaterQualityReport) -> bool {
        let v = report.value(self.parameter);
        match self.operator {
            TriggerOperator::GreaterThan => v > self.threshold,
            TriggerOperator::LessThan => v < self.threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: String,
    pub title: String,
    pub category: String,
    pub target_audience: String,
    pub media_type: MediaType,
    #[serde(default)]
    pub media_content: String,
    #[serde(default)]
    pub description: String,
    pub publish_date: String,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_trigger: Option<AutoTrigger>,
}

impl Campaign {
    /// Whether the campaign's rule fires on any of `reports`. Campaigns
    /// without a rule never auto-trigger.
    pub fn is_triggered_by<'a, I>(&self, reports: I) -> bool
    where
        I: IntoIterator<Item = &'a WaterQualityReport>,
    {
        match &self.auto_trigger {
            Some(rule) => reports.into_iter().any(|r| rule.fires_on(r)),
            None => false,
        }
    }
}

pub fn active_campaigns(campaigns: &[Campaign]) -> Vec<&Campaign> {
    campaigns.iter().filter(|c| c.is_active).collect()
}

/// Active campaigns whose rule fires on at least one of `reports`.
pub fn triggered_campaigns<'a>(
    campaigns: &'a [Campaign],
    reports: &[&WaterQualityReport],
) -> Vec<&'a Campaign> {
    campaigns
        .iter()
        .filter(|c| c.is_active && c.is_triggered_by(reports.iter().copied()))
        .collect()
}

#[cfg(test)]
pub(crate) fn campaign(id: &str, trigger: Option<AutoTrigger>) -> Campaign {
    Campaign {
        id: id.to_string(),
        title: "Boil before drinking".to_string(),
        category: "Boil Water".to_string(),
        target_audience: "Villages".to_string(),
        media_type: MediaType::Text,
        media_content: String::new(),
        description: "Boil drinking water for one minute.".to_string(),
        publish_date: "2024-06-01".to_string(),
        is_active: true,
        auto_trigger: trigger,
    }
}
