//! Region → District → SubDivision → Block tree.
//!
//! The tree is irregular: a region may have no districts, districts without
//! any finer structure, or the full four levels. Storage keeps the plain
//! nested-optional layout so the JSON stays stable; consumers branch on
//! [`Region::shape`] instead of probing the optionals themselves.

use serde::{Deserialize, Serialize};

use crate::disease::Disease;

// ---------------------------------------------------------------------------
// Static geography
// ---------------------------------------------------------------------------

/// Leaf geographic unit. Never carries a stored total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubDivision {
    pub name: String,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl SubDivision {
    pub fn new(name: &str, blocks: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            blocks: blocks
                .iter()
                .map(|b| Block {
                    name: b.to_string(),
                })
                .collect(),
        }
    }

    pub fn has_block(&self, name: &str) -> bool {
        self.blocks.iter().any(|b| b.name == name)
    }
}

// ---------------------------------------------------------------------------
// Aggregating levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct District {
    pub id: String,
    pub name: String,
    pub diseases: Vec<Disease>,
    pub total_affected: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_divisions: Option<Vec<SubDivision>>,
}

impl District {
    pub fn find_disease(&self, disease_id: &str) -> Option<&Disease> {
        self.diseases.iter().find(|d| d.id == disease_id)
    }

    /// Subdivisions, or an empty slice for districts without finer structure.
    pub fn sub_divisions(&self) -> &[SubDivision] {
        self.sub_divisions.as_deref().unwrap_or(&[])
    }

    pub fn has_sub_divisions(&self) -> bool {
        !self.sub_divisions().is_empty()
    }

    pub fn find_sub_division(&self, name: &str) -> Option<&SubDivision> {
        self.sub_divisions().iter().find(|s| s.name == name)
    }
}

/// A state in the national hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: String,
    pub name: String,
    pub diseases: Vec<Disease>,
    pub total_affected: u32,
    /// Opaque contact carried with the record; never used for access control.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub districts: Option<Vec<District>>,
}

/// Which levels a region actually has.
#[derive(Debug, Clone, Copy)]
pub enum RegionShape<'a> {
    /// No districts: diseases and reports live on the region itself.
    Standalone,
    /// Districts without subdivisions.
    Districts(&'a [District]),
    /// Districts with subdivisions and blocks.
    FullyModeled(&'a [District]),
}

impl RegionShape<'_> {
    pub fn has_districts(&self) -> bool {
        !matches!(self, RegionShape::Standalone)
    }
}

impl Region {
    pub fn shape(&self) -> RegionShape<'_> {
        match self.districts.as_deref() {
            None | Some([]) => RegionShape::Standalone,
            Some(districts) if districts.iter().any(District::has_sub_divisions) => {
                RegionShape::FullyModeled(districts)
            }
            Some(districts) => RegionShape::Districts(districts),
        }
    }

    /// Districts, or an empty slice for standalone regions.
    pub fn districts(&self) -> &[District] {
        self.districts.as_deref().unwrap_or(&[])
    }

    pub fn find_district(&self, district_id: &str) -> Option<&District> {
        self.districts().iter().find(|d| d.id == district_id)
    }

    pub fn find_disease(&self, disease_id: &str) -> Option<&Disease> {
        self.diseases.iter().find(|d| d.id == disease_id)
    }
}

// ---------------------------------------------------------------------------
// Lookups over the whole tree
// ---------------------------------------------------------------------------

pub fn find_region<'a>(regions: &'a [Region], region_id: &str) -> Option<&'a Region> {
    regions.iter().find(|r| r.id == region_id)
}

pub fn find_district<'a>(
    regions: &'a [Region],
    region_id: &str,
    district_id: &str,
) -> Option<&'a District> {
    find_region(regions, region_id).and_then(|r| r.find_district(district_id))
}

pub fn find_sub_division<'a>(
    regions: &'a [Region],
    region_id: &str,
    district_id: &str,
    sub_division: &str,
) -> Option<&'a SubDivision> {
    find_district(regions, region_id, district_id).and_then(|d| d.find_sub_division(sub_division))
}
