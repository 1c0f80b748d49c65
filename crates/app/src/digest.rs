//! Logs a dashboard digest whenever the collections behind it change.

use bevy::prelude::*;

use surveillance::campaign::active_campaigns;
use surveillance::projection::Selection;
use surveillance::summary::{OfflineSummarizer, RegionDigest, Summarizer};
use surveillance::water_quality::unsafe_sample_count;
use surveillance::{CollectionChanged, SurveillanceSet, SurveillanceStore};

pub struct DigestPlugin;

impl Plugin for DigestPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            log_dashboard_digest.after(SurveillanceSet::Publish),
        );
    }
}

/// One line per region with cases, busiest first, then water and campaign
/// counts.
pub fn digest_lines(store: &SurveillanceStore, summarizer: &impl Summarizer) -> Vec<String> {
    let mut regions: Vec<_> = store
        .regions()
        .iter()
        .filter(|r| r.total_affected > 0)
        .collect();
    regions.sort_by(|a, b| b.total_affected.cmp(&a.total_affected));

    let national = store
        .regions()
        .iter()
        .map(|r| r.total_affected)
        .fold(0, u32::saturating_add);
    let mut lines = vec![format!(
        "{} active cases across {} regions",
        national,
        store.regions().len()
    )];
    for region in regions {
        let digest = RegionDigest::build(region, &Selection::region());
        match summarizer.summarize(&digest) {
            Ok(text) => lines.push(format!("[{}] {}", region.id, text)),
            Err(e) => lines.push(format!("[{}] summary unavailable: {}", region.id, e)),
        }
    }

    let samples: Vec<_> = store.water_reports().iter().collect();
    lines.push(format!(
        "{} water samples, {} unsafe; {} active campaigns",
        samples.len(),
        unsafe_sample_count(&samples),
        active_campaigns(store.campaigns()).len()
    ));
    lines
}

fn log_dashboard_digest(mut changed: EventReader<CollectionChanged>, store: Res<SurveillanceStore>) {
    if changed.read().count() == 0 {
        return;
    }
    for line in digest_lines(&store, &OfflineSummarizer) {
        info!("Dashboard: {}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surveillance::campaign::{Campaign, MediaType};
    use surveillance::summary::SummaryError;

    struct Down;

    impl Summarizer for Down {
        fn summarize(&self, _digest: &RegionDigest) -> Result<String, SummaryError> {
            Err(SummaryError::Timeout)
        }
    }

    #[test]
    fn test_digest_leads_with_national_total() {
        let store = SurveillanceStore::default();
        let lines = digest_lines(&store, &OfflineSummarizer);
        let national: u32 = store.regions().iter().map(|r| r.total_affected).sum();
        assert_eq!(
            lines[0],
            format!("{} active cases across {} regions", national, store.regions().len())
        );
        assert!(lines.iter().any(|l| l.starts_with("[DL] Delhi: 1200 active cases")));
    }

    #[test]
    fn test_digest_skips_regions_without_cases() {
        let store = SurveillanceStore::default();
        let lines = digest_lines(&store, &OfflineSummarizer);
        assert!(!lines.iter().any(|l| l.starts_with("[AR]")));
    }

    #[test]
    fn test_digest_orders_busiest_first() {
        let store = SurveillanceStore::default();
        let lines = digest_lines(&store, &OfflineSummarizer);
        let mh = lines.iter().position(|l| l.starts_with("[MH]")).unwrap();
        let dl = lines.iter().position(|l| l.starts_with("[DL]")).unwrap();
        assert!(mh < dl, "1250 before 1200");
    }

    #[test]
    fn test_digest_reports_summarizer_failure_per_region() {
        let store = SurveillanceStore::default();
        let lines = digest_lines(&store, &Down);
        assert!(lines
            .iter()
            .any(|l| l == "[DL] summary unavailable: Summary service timed out"));
    }

    #[test]
    fn test_digest_counts_active_campaigns() {
        let mut store = SurveillanceStore::default();
        store.add_campaign(Campaign {
            id: "c1".to_string(),
            title: "Boil water".to_string(),
            category: "Hygiene".to_string(),
            target_audience: "Households".to_string(),
            media_type: MediaType::Text,
            media_content: String::new(),
            description: String::new(),
            publish_date: "2024-09-01".to_string(),
            is_active: true,
            auto_trigger: None,
        });
        let lines = digest_lines(&store, &OfflineSummarizer);
        assert_eq!(
            lines.last().unwrap(),
            "0 water samples, 0 unsafe; 1 active campaigns"
        );
    }
}
