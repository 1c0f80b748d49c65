//! Rollup of disease totals up the region tree.
//!
//! Every function here is pure: it takes snapshots and returns new
//! snapshots. Region aggregates are always rebuilt from the full set of
//! district diseases, never patched, so a recompute can be run any number of
//! times for the same mutation without double counting.

use crate::config::AGGREGATE_ID_PREFIX;
use crate::disease::{total_affected, Disease, DiseaseReport, Trend};
use crate::hierarchy::{District, Region};

/// District with `total_affected` recomputed from its diseases.
pub fn recompute_district(district: &District) -> District {
    District {
        total_affected: total_affected(&district.diseases),
        ..district.clone()
    }
}

/// Region rebuilt from `districts`.
///
/// Diseases are grouped by name across all districts: `affected` is summed and
/// `reports` concatenated in district order. A group keeps the id and trend of
/// an existing region disease with the same name, otherwise it gets a
/// synthetic id derived from the name. Groups are emitted in the order their
/// names first appear across the districts and `last_updated` is the latest
/// member date, so the output depends only on the district snapshots.
pub fn recompute_region_from_districts(region: &Region, districts: &[District]) -> Region {
    struct Group<'a> {
        name: &'a str,
        affected: u32,
        reports: Vec<DiseaseReport>,
        last_updated: chrono::NaiveDate,
    }

    let mut groups: Vec<Group> = Vec::new();
    for district in districts {
        for disease in &district.diseases {
            let index = match groups.iter().position(|g| g.name == disease.name) {
                Some(index) => index,
                None => {
                    groups.push(Group {
                        name: &disease.name,
                        affected: 0,
                        reports: Vec::new(),
                        last_updated: disease.last_updated,
                    });
                    groups.len() - 1
                }
            };
            let group = &mut groups[index];
            group.affected = group.affected.saturating_add(disease.affected);
            group.reports.extend(disease.reports.iter().cloned());
            group.last_updated = group.last_updated.max(disease.last_updated);
        }
    }

    let diseases = groups
        .into_iter()
        .map(|group| {
            let name = group.name;
            let existing = region.diseases.iter().find(|d| d.name == name);
            Disease {
                id: existing
                    .map(|d| d.id.clone())
                    .unwrap_or_else(|| aggregate_id(name)),
                name: name.to_string(),
                affected: group.affected,
                trend: existing.map(|d| d.trend).unwrap_or(Trend::Stable),
                last_updated: group.last_updated,
                reports: group.reports,
            }
        })
        .collect();

    Region {
        diseases,
        total_affected: districts
            .iter()
            .map(|d| d.total_affected)
            .fold(0, u32::saturating_add),
        districts: Some(districts.to_vec()),
        ..region.clone()
    }
}

/// District-less region with `total_affected` recomputed from its diseases.
pub fn recompute_standalone_region(region: &Region) -> Region {
    Region {
        total_affected: total_affected(&region.diseases),
        ..region.clone()
    }
}

/// Full bottom-up recompute: every district, then the region.
pub fn recompute_region(region: &Region) -> Region {
    if region.shape().has_districts() {
        let districts: Vec<District> = region.districts().iter().map(recompute_district).collect();
        recompute_region_from_districts(region, &districts)
    } else {
        recompute_standalone_region(region)
    }
}

/// Stable id for an aggregate disease group: `agg-` + lowercase name with
/// non-alphanumerics collapsed to dashes.
pub fn aggregate_id(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    format!("{AGGREGATE_ID_PREFIX}{}", slug.trim_matches('-'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disease::{AgeGroups, SourceType};
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn disease(id: &str, name: &str, affected: u32) -> Disease {
        Disease::new(id, name, affected, day(1))
    }

    fn district(id: &str, diseases: Vec<Disease>) -> District {
        recompute_district(&District {
            id: id.to_string(),
            name: id.to_string(),
            diseases,
            total_affected: 0,
            sub_divisions: None,
        })
    }

    fn region(diseases: Vec<Disease>) -> Region {
        Region {
            id: "AS".to_string(),
            name: "Assam".to_string(),
            diseases,
            total_affected: 0,
            admin_email: None,
            districts: None,
        }
    }

    #[test]
    fn test_recompute_district_sums_affected() {
        let d = district("d", vec![disease("1", "Cholera", 4), disease("2", "Typhoid", 6)]);
        assert_eq!(d.total_affected, 10);
    }

    #[test]
    fn test_region_groups_by_name_across_districts() {
        let a = district("a", vec![disease("1", "Cholera", 4), disease("2", "Typhoid", 1)]);
        let b = district("b", vec![disease("9", "Cholera", 3)]);
        let r = recompute_region_from_districts(&region(vec![]), &[a, b]);

        assert_eq!(r.total_affected, 8);
        let cholera = r.diseases.iter().find(|d| d.name == "Cholera").unwrap();
        assert_eq!(cholera.affected, 7);
        assert_eq!(cholera.id, "agg-cholera");
        let typhoid = r.diseases.iter().find(|d| d.name == "Typhoid").unwrap();
        assert_eq!(typhoid.affected, 1);
    }

    #[test]
    fn test_region_concatenates_reports_in_district_order() {
        let r1 = DiseaseReport::new("r1", SourceType::Asha, "t", 1, AgeGroups::new(1, 0, 0));
        let r2 = DiseaseReport::new("r2", SourceType::Clinic, "t", 2, AgeGroups::new(0, 2, 0));
        let a = district("a", vec![disease("1", "Cholera", 0).with_report(r1, day(2))]);
        let b = district("b", vec![disease("1", "Cholera", 0).with_report(r2, day(3))]);
        let r = recompute_region_from_districts(&region(vec![]), &[a, b]);

        let cholera = &r.diseases[0];
        let ids: Vec<&str> = cholera.reports.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2"]);
        assert_eq!(cholera.affected, 3);
        assert_eq!(cholera.last_updated, day(3));
    }

    #[test]
    fn test_region_preserves_existing_id_and_trend() {
        let prior = region(vec![disease("keep-me", "Cholera", 999).with_trend(Trend::Up)]);
        let a = district("a", vec![disease("1", "Cholera", 2)]);
        let r = recompute_region_from_districts(&prior, &[a]);
        assert_eq!(r.diseases[0].id, "keep-me");
        assert_eq!(r.diseases[0].trend, Trend::Up);
        assert_eq!(r.diseases[0].affected, 2, "stale region count is discarded");
    }

    #[test]
    fn test_region_recompute_is_idempotent() {
        let a = district("a", vec![disease("1", "Cholera", 4), disease("2", "Hepatitis A", 2)]);
        let b = district("b", vec![disease("3", "Cholera", 1)]);
        let districts = vec![a, b];
        let once = recompute_region_from_districts(&region(vec![]), &districts);
        let twice = recompute_region_from_districts(&once, &districts);
        assert_eq!(once, twice);
        assert_eq!(
            serde_json::to_string(&once).unwrap(),
            serde_json::to_string(&twice).unwrap()
        );
    }

    #[test]
    fn test_region_recompute_ignores_district_order_for_totals() {
        let a = district("a", vec![disease("1", "Typhoid", 4)]);
        let b = district("b", vec![disease("3", "Cholera", 1)]);
        let ab = recompute_region_from_districts(&region(vec![]), &[a.clone(), b.clone()]);
        let ba = recompute_region_from_districts(&region(vec![]), &[b, a]);
        assert_eq!(ab.total_affected, ba.total_affected);
        for d in &ab.diseases {
            let other = ba.diseases.iter().find(|o| o.name == d.name).unwrap();
            assert_eq!(other.affected, d.affected);
        }
    }

    #[test]
    fn test_region_keeps_first_seen_disease_order() {
        let a = district("a", vec![disease("1", "Typhoid", 4), disease("2", "Cholera", 1)]);
        let b = district("b", vec![disease("3", "Leptospirosis", 2), disease("4", "Typhoid", 1)]);
        let r = recompute_region_from_districts(&region(vec![]), &[a, b]);
        let names: Vec<&str> = r.diseases.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Typhoid", "Cholera", "Leptospirosis"]);
    }

    #[test]
    fn test_standalone_region_sums_own_diseases() {
        let r = recompute_standalone_region(&region(vec![
            disease("1", "Cholera", 5),
            disease("2", "Typhoid", 7),
        ]));
        assert_eq!(r.total_affected, 12);
        assert!(r.districts.is_none());
    }

    #[test]
    fn test_recompute_region_dispatches_on_shape() {
        let mut r = region(vec![]);
        r.districts = Some(vec![District {
            id: "a".to_string(),
            name: "a".to_string(),
            diseases: vec![disease("1", "Cholera", 3)],
            total_affected: 0,
            sub_divisions: None,
        }]);
        let r = recompute_region(&r);
        assert_eq!(r.districts()[0].total_affected, 3);
        assert_eq!(r.total_affected, 3);
    }

    #[test]
    fn test_aggregate_id_slug() {
        assert_eq!(aggregate_id("Hepatitis A"), "agg-hepatitis-a");
        assert_eq!(aggregate_id("  E. coli  "), "agg-e-coli");
    }
}
