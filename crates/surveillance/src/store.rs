//! The in-memory store and the Mutation API.
//!
//! `SurveillanceStore` owns the three collections and exposes them read-only.
//! Every write goes through one of the mutation methods (or [`Mutation`] via
//! [`SurveillanceStore::apply`]), and every mutation goes through `commit`,
//! which applies the leaf change, rebuilds the ancestors, queues the whole
//! collection for a durable write and queues a change notification.
//!
//! Durable I/O lives in the storage crate: it drains
//! [`SurveillanceStore::take_pending_writes`] and feeds remote changes back
//! through [`SurveillanceStore::apply_remote`].

use std::collections::BTreeSet;

use bevy::prelude::*;
use chrono::{NaiveDate, Utc};
use rand::Rng;

use crate::aggregation::recompute_region;
use crate::campaign::Campaign;
use crate::collection::{decode_or_seed, Campaigns, Collection, CollectionKey, Regions, WaterQualityReports};
use crate::config::{DEFAULT_SEED, MINTED_ID_LEN};
use crate::disease::{Disease, DiseaseReport};
use crate::error::MutationError;
use crate::hierarchy::{find_region, Region};
use crate::water_quality::WaterQualityReport;

/// Source of "today" for `lastUpdated` stamps.
pub type Clock = fn() -> NaiveDate;

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Random lowercase base-36 id of `MINTED_ID_LEN` characters.
pub fn mint_id() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    (0..MINTED_ID_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// A state change expressed as data, for callers that queue mutations
/// (the `MutationRequest` event) rather than calling the store directly.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    UpdateDisease {
        region_id: String,
        district_id: Option<String>,
        disease: Disease,
    },
    RegisterDisease {
        region_id: String,
        district_id: Option<String>,
        name: String,
        initial_count: u32,
    },
    DeleteDisease {
        region_id: String,
        district_id: Option<String>,
        disease_id: String,
    },
    AddDiseaseReport {
        region_id: String,
        district_id: Option<String>,
        disease_id: String,
        report: DiseaseReport,
    },
    AddWaterQualityReport(WaterQualityReport),
    AddCampaign(Campaign),
    ToggleCampaignStatus {
        campaign_id: String,
    },
}

impl Mutation {
    pub fn collection(&self) -> CollectionKey {
        match self {
            Mutation::UpdateDisease { .. }
            | Mutation::RegisterDisease { .. }
            | Mutation::DeleteDisease { .. }
            | Mutation::AddDiseaseReport { .. } => CollectionKey::RegionTree,
            Mutation::AddWaterQualityReport(_) => CollectionKey::WaterQuality,
            Mutation::AddCampaign(_) | Mutation::ToggleCampaignStatus { .. } => {
                CollectionKey::Campaigns
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Resource, Debug)]
pub struct SurveillanceStore {
    regions: Regions,
    water_reports: WaterQualityReports,
    campaigns: Campaigns,
    clock: Clock,
    pending_writes: BTreeSet<CollectionKey>,
    changes: Vec<CollectionKey>,
}

impl Default for SurveillanceStore {
    fn default() -> Self {
        Self::seeded(DEFAULT_SEED)
    }
}

impl SurveillanceStore {
    /// Store holding seed data, with nothing queued.
    pub fn seeded(seed: u64) -> Self {
        Self::from_collections(Regions::seed(seed), WaterQualityReports::seed(seed), Campaigns::seed(seed))
    }

    pub fn from_collections(regions: Regions, water_reports: WaterQualityReports, campaigns: Campaigns) -> Self {
        Self {
            regions,
            water_reports,
            campaigns,
            clock: utc_today,
            pending_writes: BTreeSet::new(),
            changes: Vec::new(),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn regions(&self) -> &[Region] {
        &self.regions.0
    }

    pub fn region(&self, region_id: &str) -> Option<&Region> {
        find_region(&self.regions.0, region_id)
    }

    pub fn water_reports(&self) -> &[WaterQualityReport] {
        &self.water_reports.0
    }

    pub fn campaigns(&self) -> &[Campaign] {
        &self.campaigns.0
    }

    /// The collection under `key` as it would be written to durable storage.
    pub fn encode(&self, key: CollectionKey) -> Result<String, serde_json::Error> {
        match key {
            CollectionKey::RegionTree => self.regions.encode(),
            CollectionKey::WaterQuality => self.water_reports.encode(),
            CollectionKey::Campaigns => self.campaigns.encode(),
        }
    }

    // -----------------------------------------------------------------------
    // Queues drained by the plugins
    // -----------------------------------------------------------------------

    /// Collections changed by local mutations since the last call.
    pub fn take_pending_writes(&mut self) -> Vec<CollectionKey> {
        std::mem::take(&mut self.pending_writes).into_iter().collect()
    }

    pub fn has_pending_writes(&self) -> bool {
        !self.pending_writes.is_empty()
    }

    pub fn is_pending_write(&self, key: CollectionKey) -> bool {
        self.pending_writes.contains(&key)
    }

    /// Collections changed locally or remotely since the last call.
    pub fn take_changes(&mut self) -> Vec<CollectionKey> {
        std::mem::take(&mut self.changes)
    }

    // -----------------------------------------------------------------------
    // Loading and remote changes
    // -----------------------------------------------------------------------

    /// Replace `key` from its durable record.
    ///
    /// An absent record is seeded and queued for writing so other contexts
    /// start from the same data. An unreadable record is seeded with a
    /// warning but not overwritten until the next local mutation.
    pub fn restore(&mut self, key: CollectionKey, record: Option<&str>, seed: u64) {
        fn load<T: Collection>(record: Option<&str>, seed: u64) -> T {
            match record {
                Some(json) => decode_or_seed(json, seed),
                None => T::seed(seed),
            }
        }
        match key {
            CollectionKey::RegionTree => self.regions = load(record, seed),
            CollectionKey::WaterQuality => self.water_reports = load(record, seed),
            CollectionKey::Campaigns => self.campaigns = load(record, seed),
        }
        if record.is_none() {
            self.pending_writes.insert(key);
        }
        self.changes.push(key);
    }

    /// Replace `key` wholesale with a value written by another context.
    /// No merge is attempted and nothing is queued for writing.
    pub fn apply_remote(&mut self, key: CollectionKey, json: &str) -> Result<(), serde_json::Error> {
        match key {
            CollectionKey::RegionTree => self.regions = Regions::decode(json)?,
            CollectionKey::WaterQuality => self.water_reports = WaterQualityReports::decode(json)?,
            CollectionKey::Campaigns => self.campaigns = Campaigns::decode(json)?,
        }
        self.changes.push(key);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Mutation API
    // -----------------------------------------------------------------------

    pub fn apply(&mut self, mutation: Mutation) -> Result<(), MutationError> {
        match mutation {
            Mutation::UpdateDisease {
                region_id,
                district_id,
                disease,
            } => self.update_disease(&region_id, disease, district_id.as_deref()),
            Mutation::RegisterDisease {
                region_id,
                district_id,
                name,
                initial_count,
            } => {
                self.register_disease(&region_id, &name, initial_count, district_id.as_deref());
            }
            Mutation::DeleteDisease {
                region_id,
                district_id,
                disease_id,
            } => self.delete_disease(&region_id, &disease_id, district_id.as_deref()),
            Mutation::AddDiseaseReport {
                region_id,
                district_id,
                disease_id,
                report,
            } => {
                return self.add_disease_report(&region_id, &disease_id, report, district_id.as_deref())
            }
            Mutation::AddWaterQualityReport(report) => self.add_water_quality_report(report),
            Mutation::AddCampaign(campaign) => self.add_campaign(campaign),
            Mutation::ToggleCampaignStatus { campaign_id } => {
                self.toggle_campaign_status(&campaign_id)
            }
        }
        Ok(())
    }

    /// Replace the disease with `disease.id` on the target level.
    pub fn update_disease(&mut self, region_id: &str, disease: Disease, district_id: Option<&str>) {
        self.commit_diseases(region_id, district_id, |diseases, _| {
            diseases
                .iter()
                .map(|d| if d.id == disease.id { disease.clone() } else { d.clone() })
                .collect()
        });
    }

    /// Append a new disease with no reports. Returns the minted id.
    pub fn register_disease(
        &mut self,
        region_id: &str,
        name: &str,
        initial_count: u32,
        district_id: Option<&str>,
    ) -> String {
        let id = mint_id();
        self.commit_diseases(region_id, district_id, |diseases, today| {
            let mut next = diseases.to_vec();
            next.push(Disease::new(id.clone(), name, initial_count, today));
            next
        });
        id
    }

    pub fn delete_disease(&mut self, region_id: &str, disease_id: &str, district_id: Option<&str>) {
        self.commit_diseases(region_id, district_id, |diseases, _| {
            diseases.iter().filter(|d| d.id != disease_id).cloned().collect()
        });
    }

    /// File `report` against a disease. Rejected without any change when the
    /// case count disagrees with the age breakdown.
    pub fn add_disease_report(
        &mut self,
        region_id: &str,
        disease_id: &str,
        report: DiseaseReport,
        district_id: Option<&str>,
    ) -> Result<(), MutationError> {
        if !report.is_consistent() {
            return Err(MutationError::Validation {
                cases_count: report.cases_count,
                age_total: report.age_groups.total(),
            });
        }
        self.commit_diseases(region_id, district_id, |diseases, today| {
            diseases
                .iter()
                .map(|d| {
                    if d.id == disease_id {
                        d.with_report(report.clone(), today)
                    } else {
                        d.clone()
                    }
                })
                .collect()
        });
        Ok(())
    }

    pub fn add_water_quality_report(&mut self, report: WaterQualityReport) {
        self.commit(CollectionKey::WaterQuality, |store| {
            store.water_reports.0.push(report);
            true
        });
    }

    pub fn add_campaign(&mut self, campaign: Campaign) {
        self.commit(CollectionKey::Campaigns, |store| {
            store.campaigns.0.push(campaign);
            true
        });
    }

    pub fn toggle_campaign_status(&mut self, campaign_id: &str) {
        self.commit(CollectionKey::Campaigns, |store| {
            match store.campaigns.0.iter_mut().find(|c| c.id == campaign_id) {
                Some(c) => {
                    c.is_active = !c.is_active;
                    true
                }
                None => false,
            }
        });
    }

    // -----------------------------------------------------------------------
    // Commit
    // -----------------------------------------------------------------------

    /// Runs `mutate` and, if it reports a change, queues the collection for
    /// writing and announces it. A mutation that hits no record queues
    /// nothing.
    fn commit<F: FnOnce(&mut Self) -> bool>(&mut self, key: CollectionKey, mutate: F) {
        if mutate(self) {
            self.pending_writes.insert(key);
            self.changes.push(key);
        }
    }

    /// Apply `edit` to the disease list of the target level, then rebuild the
    /// region bottom-up.
    ///
    /// With a `district_id` on a region that has districts the edit lands on
    /// that district. Otherwise it lands on the region's own list; for a
    /// region with districts that list is rebuilt from the districts right
    /// after, so such an edit never survives the commit.
    fn commit_diseases<F>(&mut self, region_id: &str, district_id: Option<&str>, edit: F)
    where
        F: FnOnce(&[Disease], NaiveDate) -> Vec<Disease>,
    {
        let today = self.today();
        self.commit(CollectionKey::RegionTree, |store| {
            let Some(index) = store.regions.0.iter().position(|r| r.id == region_id) else {
                return false;
            };
            let edited = edit_level(&store.regions.0[index], district_id, today, edit);
            let rebuilt = recompute_region(&edited);
            if rebuilt == store.regions.0[index] {
                return false;
            }
            store.regions.0[index] = rebuilt;
            true
        });
    }
}

fn edit_level<F>(region: &Region, district_id: Option<&str>, today: NaiveDate, edit: F) -> Region
where
    F: FnOnce(&[Disease], NaiveDate) -> Vec<Disease>,
{
    let mut next = region.clone();
    let has_districts = region.shape().has_districts();
    match (district_id, next.districts.as_mut()) {
        (Some(id), Some(districts)) if has_districts => {
            if let Some(district) = districts.iter_mut().find(|d| d.id == id) {
                district.diseases = edit(&district.diseases, today);
            }
        }
        _ => {
            if has_districts {
                debug!(
                    "Region {}: region-level disease edit is replaced by the district rollup",
                    region.id
                );
            }
            next.diseases = edit(&next.diseases, today);
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::campaign;
    use crate::disease::{AgeGroups, SourceType};
    use crate::hierarchy::District;
    use crate::water_quality::sample;

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, 15).unwrap()
    }

    fn district(id: &str, diseases: Vec<Disease>) -> District {
        District {
            id: id.to_string(),
            name: id.to_string(),
            total_affected: diseases.iter().map(|d| d.affected).sum(),
            diseases,
            sub_divisions: None,
        }
    }

    fn store() -> SurveillanceStore {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let assam = recompute_region(&Region {
            id: "AS".to_string(),
            name: "Assam".to_string(),
            diseases: vec![],
            total_affected: 0,
            admin_email: None,
            districts: Some(vec![
                district("a", vec![Disease::new("a1", "Cholera", 4, day)]),
                district("b", vec![Disease::new("b1", "Cholera", 6, day)]),
            ]),
        });
        let delhi = recompute_region(&Region {
            id: "DL".to_string(),
            name: "Delhi".to_string(),
            diseases: vec![Disease::new("d1", "Typhoid", 10, day)],
            total_affected: 0,
            admin_email: None,
            districts: None,
        });
        SurveillanceStore::from_collections(
            Regions(vec![assam, delhi]),
            WaterQualityReports::default(),
            Campaigns::default(),
        )
        .with_clock(fixed_today)
    }

    fn report(cases: u32, ages: AgeGroups) -> DiseaseReport {
        DiseaseReport::new("r", SourceType::Clinic, "2024-08-15T10:00", cases, ages)
    }

    #[test]
    fn test_mint_id_shape() {
        let id = mint_id();
        assert_eq!(id.len(), MINTED_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_update_disease_in_district_rolls_up() {
        let mut s = store();
        let mut d = s.region("AS").unwrap().find_district("a").unwrap().diseases[0].clone();
        d.affected = 20;
        s.update_disease("AS", d, Some("a"));
        let r = s.region("AS").unwrap();
        assert_eq!(r.find_district("a").unwrap().total_affected, 20);
        assert_eq!(r.total_affected, 26);
        assert_eq!(r.diseases[0].affected, 26);
    }

    #[test]
    fn test_update_standalone_region() {
        let mut s = store();
        let mut d = s.region("DL").unwrap().diseases[0].clone();
        d.affected = 3;
        s.update_disease("DL", d, None);
        assert_eq!(s.region("DL").unwrap().total_affected, 3);
    }

    #[test]
    fn test_region_level_edit_on_districted_region_is_discarded() {
        let mut s = store();
        let mut agg = s.region("AS").unwrap().diseases[0].clone();
        agg.affected = 999;
        s.update_disease("AS", agg, None);
        assert_eq!(s.region("AS").unwrap().total_affected, 10);
        assert_eq!(s.region("AS").unwrap().diseases[0].affected, 10);
        assert!(!s.has_pending_writes(), "a discarded edit writes nothing");
    }

    #[test]
    fn test_add_report_rejects_overflowing_age_groups() {
        let mut s = store();
        let before = s.regions().to_vec();
        let err = s
            .add_disease_report("DL", "d1", report(0, AgeGroups::new(u32::MAX, 1, 0)), None)
            .unwrap_err();
        assert_eq!(
            err,
            MutationError::Validation {
                cases_count: 0,
                age_total: u64::from(u32::MAX) + 1
            }
        );
        assert_eq!(s.regions(), before.as_slice());
        assert!(!s.has_pending_writes());
    }

    #[test]
    fn test_district_id_on_standalone_region_edits_region() {
        let mut s = store();
        s.register_disease("DL", "Cholera", 5, Some("nope"));
        assert_eq!(s.region("DL").unwrap().total_affected, 15);
    }

    #[test]
    fn test_register_disease_stamps_today() {
        let mut s = store();
        let id = s.register_disease("AS", "Hepatitis A", 2, Some("b"));
        let b = s.region("AS").unwrap().find_district("b").unwrap();
        let d = b.find_disease(&id).unwrap();
        assert_eq!(d.affected, 2);
        assert_eq!(d.last_updated, fixed_today());
        assert!(d.reports.is_empty());
        assert_eq!(s.region("AS").unwrap().total_affected, 12);
    }

    #[test]
    fn test_delete_disease_reduces_region_aggregate() {
        let mut s = store();
        s.delete_disease("AS", "a1", Some("a"));
        let r = s.region("AS").unwrap();
        assert_eq!(r.find_district("a").unwrap().total_affected, 0);
        assert_eq!(r.diseases[0].affected, 6);
        assert_eq!(r.total_affected, 6);
    }

    #[test]
    fn test_unknown_ids_are_noops() {
        let mut s = store();
        let before = s.regions().to_vec();
        s.delete_disease("AS", "missing", Some("a"));
        s.delete_disease("XX", "a1", None);
        s.toggle_campaign_status("missing");
        s.update_disease("AS", Disease::new("missing", "Typhoid", 4, fixed_today()), Some("a"));
        s.add_disease_report("XX", "a1", report(1, AgeGroups::new(1, 0, 0)), None)
            .unwrap();
        s.add_disease_report("AS", "a1", report(1, AgeGroups::new(1, 0, 0)), Some("zz"))
            .unwrap();
        assert_eq!(s.regions(), before.as_slice());
        assert!(!s.has_pending_writes());
        assert!(s.take_changes().is_empty());
    }

    #[test]
    fn test_add_report_rejects_mismatched_age_groups() {
        let mut s = store();
        s.take_pending_writes();
        s.take_changes();
        let before = s.regions().to_vec();
        let err = s
            .add_disease_report("AS", "a1", report(5, AgeGroups::new(2, 1, 1)), Some("a"))
            .unwrap_err();
        assert_eq!(err, MutationError::Validation { cases_count: 5, age_total: 4 });
        assert_eq!(s.regions(), before.as_slice());
        assert!(!s.has_pending_writes());
        assert!(s.take_changes().is_empty());
    }

    #[test]
    fn test_add_report_increments_and_appends() {
        let mut s = store();
        s.add_disease_report("AS", "a1", report(3, AgeGroups::new(1, 1, 1)), Some("a"))
            .unwrap();
        let r = s.region("AS").unwrap();
        let d = r.find_district("a").unwrap().find_disease("a1").unwrap();
        assert_eq!(d.affected, 7);
        assert_eq!(d.reports.len(), 1);
        assert_eq!(d.last_updated, fixed_today());
        assert_eq!(r.total_affected, 13);
        assert_eq!(r.diseases[0].reports.len(), 1);
    }

    #[test]
    fn test_commit_queues_write_and_change() {
        let mut s = store();
        s.add_water_quality_report(sample("w", "AS"));
        s.add_campaign(campaign("c", None));
        s.toggle_campaign_status("c");
        assert_eq!(
            s.take_pending_writes(),
            vec![CollectionKey::WaterQuality, CollectionKey::Campaigns]
        );
        assert_eq!(s.take_changes().len(), 3);
        assert!(!s.campaigns()[0].is_active);
        assert!(!s.has_pending_writes());
    }

    #[test]
    fn test_apply_dispatches_mutation() {
        let mut s = store();
        let m = Mutation::AddDiseaseReport {
            region_id: "DL".to_string(),
            district_id: None,
            disease_id: "d1".to_string(),
            report: report(2, AgeGroups::new(0, 0, 2)),
        };
        assert_eq!(m.collection(), CollectionKey::RegionTree);
        s.apply(m).unwrap();
        assert_eq!(s.region("DL").unwrap().total_affected, 12);
    }

    #[test]
    fn test_restore_seeds_absent_record_and_queues_write() {
        let mut s = store();
        s.restore(CollectionKey::RegionTree, None, 9);
        assert_eq!(s.regions(), Regions::seed(9).0.as_slice());
        assert_eq!(s.take_pending_writes(), vec![CollectionKey::RegionTree]);
    }

    #[test]
    fn test_restore_malformed_record_seeds_without_write() {
        let mut s = store();
        s.restore(CollectionKey::Campaigns, Some("oops"), 9);
        assert!(s.campaigns().is_empty());
        assert!(!s.has_pending_writes());
    }

    #[test]
    fn test_apply_remote_replaces_without_queueing_write() {
        let mut s = store();
        let json = Campaigns(vec![campaign("remote", None)]).encode().unwrap();
        s.apply_remote(CollectionKey::Campaigns, &json).unwrap();
        assert_eq!(s.campaigns()[0].id, "remote");
        assert!(!s.has_pending_writes());
        assert_eq!(s.take_changes(), vec![CollectionKey::Campaigns]);
        assert!(s.apply_remote(CollectionKey::Campaigns, "nope").is_err());
    }
}
