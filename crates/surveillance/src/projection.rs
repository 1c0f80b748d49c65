//! Read-only drill-down views.
//!
//! Nothing in this module writes back into stored aggregates. Subdivision and
//! block figures exist only as projections recomputed from the reports each
//! time they are requested.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::REQUIRED_DISEASES;
use crate::disease::{Disease, Trend};
use crate::hierarchy::{District, Region, RegionShape};
use crate::water_quality::WaterQualityReport;

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Drill-down path below a region. Narrower levels are only meaningful when
/// the broader ones are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub district_id: Option<String>,
    pub sub_division: Option<String>,
    pub block: Option<String>,
}

impl Selection {
    pub fn region() -> Self {
        Self::default()
    }

    pub fn district(district_id: &str) -> Self {
        Self {
            district_id: Some(district_id.to_string()),
            ..Self::default()
        }
    }

    pub fn sub_division(mut self, name: &str) -> Self {
        self.sub_division = Some(name.to_string());
        self
    }

    pub fn block(mut self, name: &str) -> Self {
        self.block = Some(name.to_string());
        self
    }
}

// ---------------------------------------------------------------------------
// Output shapes consumed by the rendering layer
// ---------------------------------------------------------------------------

/// A disease row as rendered: `{id, name, affected, trend}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiseaseView {
    pub id: String,
    pub name: String,
    pub affected: u32,
    pub trend: Trend,
}

impl From<&Disease> for DiseaseView {
    fn from(d: &Disease) -> Self {
        Self {
            id: d.id.clone(),
            name: d.name.clone(),
            affected: d.affected,
            trend: d.trend,
        }
    }
}

/// `{name, value}` chart point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub name: String,
    pub value: u32,
}

impl ChartPoint {
    fn new(name: &str, value: u32) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailedStats {
    pub age_data: Vec<ChartPoint>,
    pub source_data: Vec<ChartPoint>,
    pub water_data: Vec<ChartPoint>,
    pub total_reports: usize,
}

/// The level whose diseases are on screen: the selected district, else the region.
#[derive(Debug, Clone, Copy)]
pub enum ActiveData<'a> {
    Region(&'a Region),
    District(&'a District),
}

impl<'a> ActiveData<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            ActiveData::Region(r) => &r.name,
            ActiveData::District(d) => &d.name,
        }
    }

    pub fn diseases(&self) -> &'a [Disease] {
        match self {
            ActiveData::Region(r) => &r.diseases,
            ActiveData::District(d) => &d.diseases,
        }
    }

    pub fn total_affected(&self) -> u32 {
        match self {
            ActiveData::Region(r) => r.total_affected,
            ActiveData::District(d) => d.total_affected,
        }
    }
}

// ---------------------------------------------------------------------------
// Projections
// ---------------------------------------------------------------------------

/// The selected district if it exists in `region`, otherwise the region itself.
pub fn active_data<'a>(region: &'a Region, district_id: Option<&str>) -> ActiveData<'a> {
    district_id
        .and_then(|id| region.find_district(id))
        .map(ActiveData::District)
        .unwrap_or(ActiveData::Region(region))
}

/// Diseases as displayed for the selection.
///
/// Without a subdivision or block the stored `affected` is authoritative.
/// With either, each disease's `affected` is replaced by the cases of its
/// reports attributed to that subdivision (and block).
pub fn displayed_diseases(
    active: ActiveData<'_>,
    sub_division: Option<&str>,
    block: Option<&str>,
) -> Vec<DiseaseView> {
    let filtering = sub_division.is_some() || block.is_some();
    active
        .diseases()
        .iter()
        .map(|disease| {
            let mut view = DiseaseView::from(disease);
            if filtering {
                view.affected = disease.cases_matching(sub_division, block);
            }
            view
        })
        .collect()
}

/// Total of the displayed rows ("total active cases").
pub fn total_displayed(diseases: &[DiseaseView]) -> u32 {
    diseases.iter().map(|d| d.affected).fold(0, u32::saturating_add)
}

/// Age, source and water-source breakdowns over every report of every disease
/// on the active level that matches the filter. `None` means there is nothing
/// to chart, not a zero-filled chart.
pub fn detailed_stats(
    active: ActiveData<'_>,
    sub_division: Option<&str>,
    block: Option<&str>,
) -> Option<DetailedStats> {
    let reports: Vec<_> = active
        .diseases()
        .iter()
        .flat_map(|d| d.reports.iter())
        .filter(|r| r.matches(sub_division, block))
        .collect();

    if reports.is_empty() {
        return None;
    }

    let (mut under5, mut five_to_fifteen, mut over15) = (0u32, 0u32, 0u32);
    let mut sources: BTreeMap<&str, u32> = BTreeMap::new();
    let mut water: BTreeMap<&str, u32> = BTreeMap::new();

    for r in &reports {
        under5 = under5.saturating_add(r.age_groups.under5);
        five_to_fifteen = five_to_fifteen.saturating_add(r.age_groups.five_to_fifteen);
        over15 = over15.saturating_add(r.age_groups.over15);
        *sources.entry(r.source_type.label()).or_default() += 1;
        if let Some(ws) = r.water_source.as_deref().filter(|s| !s.is_empty()) {
            let cases = water.entry(ws).or_default();
            *cases = cases.saturating_add(r.cases_count);
        }
    }

    Some(DetailedStats {
        age_data: vec![
            ChartPoint::new("< 5 Years", under5),
            ChartPoint::new("5 - 15 Years", five_to_fifteen),
            ChartPoint::new("> 15 Years", over15),
        ],
        source_data: sources.into_iter().map(|(k, v)| ChartPoint::new(k, v)).collect(),
        water_data: water.into_iter().map(|(k, v)| ChartPoint::new(k, v)).collect(),
        total_reports: reports.len(),
    })
}

/// Whether the selection is deep enough to file a report.
///
/// - No districts: always complete, reports attach to the region.
/// - Fully modeled: a district is required; if it has subdivisions one must be
///   chosen; if that subdivision has blocks one must be chosen.
/// - Districts only: a district is enough.
pub fn is_selection_complete(region: &Region, selection: &Selection) -> bool {
    match region.shape() {
        RegionShape::Standalone => true,
        RegionShape::Districts(_) => selection.district_id.is_some(),
        RegionShape::FullyModeled(_) => {
            let Some(district) = selection
                .district_id
                .as_deref()
                .and_then(|id| region.find_district(id))
            else {
                return false;
            };
            if !district.has_sub_divisions() {
                return true;
            }
            let Some(sub_division) = selection
                .sub_division
                .as_deref()
                .and_then(|name| district.find_sub_division(name))
            else {
                return false;
            };
            sub_division.blocks.is_empty() || selection.block.is_some()
        }
    }
}

/// Required diseases not yet registered on the active level (case-insensitive).
pub fn missing_required_diseases(active: ActiveData<'_>) -> Vec<&'static str> {
    REQUIRED_DISEASES
        .iter()
        .copied()
        .filter(|req| {
            !active
                .diseases()
                .iter()
                .any(|d| d.name.eq_ignore_ascii_case(req))
        })
        .collect()
}

/// `{region id -> total affected}` for the map color scale.
pub fn map_totals(regions: &[Region]) -> BTreeMap<String, u32> {
    regions
        .iter()
        .map(|r| (r.id.clone(), r.total_affected))
        .collect()
}

/// Water samples for `region_id` narrowed by the same drill-down selection.
pub fn relevant_water_reports<'a>(
    reports: &'a [WaterQualityReport],
    region_id: &str,
    selection: &Selection,
) -> Vec<&'a WaterQualityReport> {
    reports
        .iter()
        .filter(|r| r.region_id == region_id)
        .filter(|r| match &selection.district_id {
            Some(id) => r.district_id.as_deref() == Some(id.as_str()),
            None => true,
        })
        .filter(|r| r.matches(selection.sub_division.as_deref(), selection.block.as_deref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disease::{AgeGroups, DiseaseReport, SourceType};
    use crate::hierarchy::SubDivision;
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn report(id: &str, cases: u32, sd: &str, block: &str) -> DiseaseReport {
        DiseaseReport::new(id, SourceType::Asha, "t", cases, AgeGroups::new(cases, 0, 0))
            .at(sd, Some(block))
    }

    fn tawang() -> District {
        let cholera = Disease::new("c", "Cholera", 0, day())
            .with_report(report("r1", 3, "Lumla", "Lumla"), day())
            .with_report(
                report("r2", 2, "Tawang", "Kitpi").with_water_source("Well"),
                day(),
            );
        let typhoid = Disease::new("t", "Typhoid", 0, day())
            .with_report(report("r3", 1, "Tawang", "Kitpi"), day());
        District {
            id: "ar-dist-0".to_string(),
            name: "Tawang".to_string(),
            total_affected: cholera.affected + typhoid.affected,
            diseases: vec![cholera, typhoid],
            sub_divisions: Some(vec![
                SubDivision::new("Tawang", &["Kitpi", "Tawang"]),
                SubDivision::new("Lumla", &["Lumla"]),
                SubDivision::new("Empty", &[]),
            ]),
        }
    }

    fn arunachal() -> Region {
        let d = tawang();
        Region {
            id: "AR".to_string(),
            name: "Arunachal Pradesh".to_string(),
            diseases: vec![],
            total_affected: d.total_affected,
            admin_email: None,
            districts: Some(vec![d]),
        }
    }

    #[test]
    fn test_active_data_falls_back_to_region() {
        let r = arunachal();
        assert_eq!(active_data(&r, None).name(), "Arunachal Pradesh");
        assert_eq!(active_data(&r, Some("missing")).name(), "Arunachal Pradesh");
        assert_eq!(active_data(&r, Some("ar-dist-0")).name(), "Tawang");
    }

    #[test]
    fn test_displayed_diseases_unfiltered_uses_stored_counts() {
        let mut d = tawang();
        d.diseases[0].affected = 40; // manual override above reported cases
        let rows = displayed_diseases(ActiveData::District(&d), None, None);
        assert_eq!(rows[0].affected, 40);
    }

    #[test]
    fn test_displayed_diseases_block_filter() {
        let d = tawang();
        let rows = displayed_diseases(ActiveData::District(&d), Some("Tawang"), Some("Kitpi"));
        assert_eq!(rows[0].affected, 2);
        assert_eq!(rows[1].affected, 1);
        assert_eq!(total_displayed(&rows), 3);

        let rows = displayed_diseases(ActiveData::District(&d), Some("Lumla"), None);
        assert_eq!(rows[0].affected, 3);
        assert_eq!(rows[1].affected, 0);
    }

    #[test]
    fn test_projection_does_not_mutate() {
        let d = tawang();
        let before = d.clone();
        let _ = displayed_diseases(ActiveData::District(&d), Some("Lumla"), Some("Lumla"));
        let _ = detailed_stats(ActiveData::District(&d), Some("Lumla"), None);
        assert_eq!(d, before);
    }

    #[test]
    fn test_detailed_stats_none_without_reports() {
        let d = tawang();
        assert!(detailed_stats(ActiveData::District(&d), Some("Jang"), None).is_none());
    }

    #[test]
    fn test_detailed_stats_buckets() {
        let d = tawang();
        let stats = detailed_stats(ActiveData::District(&d), Some("Tawang"), None).unwrap();
        assert_eq!(stats.total_reports, 2);
        assert_eq!(stats.age_data[0], ChartPoint::new("< 5 Years", 3));
        assert_eq!(stats.source_data, vec![ChartPoint::new("ASHA", 2)]);
        assert_eq!(stats.water_data, vec![ChartPoint::new("Well", 2)]);
    }

    #[test]
    fn test_selection_complete_standalone() {
        let mut r = arunachal();
        r.districts = None;
        assert!(is_selection_complete(&r, &Selection::region()));
    }

    #[test]
    fn test_selection_complete_districts_only() {
        let mut r = arunachal();
        if let Some(ds) = r.districts.as_mut() {
            ds[0].sub_divisions = None;
        }
        assert!(!is_selection_complete(&r, &Selection::region()));
        assert!(is_selection_complete(&r, &Selection::district("ar-dist-0")));
    }

    #[test]
    fn test_selection_complete_fully_modeled() {
        let r = arunachal();
        assert!(!is_selection_complete(&r, &Selection::region()));
        assert!(!is_selection_complete(&r, &Selection::district("ar-dist-0")));
        assert!(!is_selection_complete(
            &r,
            &Selection::district("ar-dist-0").sub_division("Lumla")
        ));
        assert!(is_selection_complete(
            &r,
            &Selection::district("ar-dist-0")
                .sub_division("Lumla")
                .block("Lumla")
        ));
        // A subdivision without blocks is complete on its own.
        assert!(is_selection_complete(
            &r,
            &Selection::district("ar-dist-0").sub_division("Empty")
        ));
    }

    #[test]
    fn test_missing_required_diseases() {
        let d = tawang();
        let missing = missing_required_diseases(ActiveData::District(&d));
        assert_eq!(missing, vec!["Diarrhea", "Hepatitis A"]);
    }

    #[test]
    fn test_map_totals() {
        let totals = map_totals(&[arunachal()]);
        assert_eq!(totals.get("AR"), Some(&6));
    }
}
