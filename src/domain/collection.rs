/// Per-department centre collections and their de-duplicated views
use super::centre::{CentreId, VaccinationCentre};
use super::{lenient, lenient_vec};
use crate::utils::{format_long_day, format_short_time, parse_paris_datetime};
use chrono::DateTime;
use chrono_tz::Tz;
use serde::Deserialize;
use std::collections::HashSet;

/// One API response: a timestamp plus available/unavailable partitions.
///
/// Immutable once decoded; a refresh replaces the whole value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VaccinationCentres {
    #[serde(default, deserialize_with = "lenient")]
    last_updated: Option<String>,
    #[serde(default, rename = "centres_disponibles", deserialize_with = "lenient_vec")]
    available: Vec<VaccinationCentre>,
    #[serde(default, rename = "centres_indisponibles", deserialize_with = "lenient_vec")]
    unavailable: Vec<VaccinationCentre>,
}

impl VaccinationCentres {
    pub fn new(
        last_updated: Option<String>,
        available: Vec<VaccinationCentre>,
        unavailable: Vec<VaccinationCentre>,
    ) -> Self {
        Self {
            last_updated,
            available,
            unavailable,
        }
    }

    pub fn last_updated(&self) -> Option<&str> {
        self.last_updated.as_deref()
    }

    pub fn available_centres(&self) -> Vec<&VaccinationCentre> {
        dedup_by_id(&self.available)
    }

    pub fn unavailable_centres(&self) -> Vec<&VaccinationCentre> {
        dedup_by_id(&self.unavailable)
    }

    pub fn last_updated_date(&self) -> Option<DateTime<Tz>> {
        self.last_updated.as_deref().and_then(parse_paris_datetime)
    }

    /// `Dernière mise à jour le {date} à {time}`
    pub fn last_updated_display(&self) -> Option<String> {
        let date = self.last_updated_date()?;
        Some(format!(
            "Dernière mise à jour le {} à {}",
            format_long_day(&date),
            format_short_time(&date)
        ))
    }
}

/// Keep the first centre seen for each identity, preserving order
pub fn dedup_by_id<'a, I>(centres: I) -> Vec<&'a VaccinationCentre>
where
    I: IntoIterator<Item = &'a VaccinationCentre>,
{
    let mut seen: HashSet<&CentreId> = HashSet::new();
    centres
        .into_iter()
        .filter(|centre| seen.insert(&centre.id))
        .collect()
}

/// Centres from several collections, de-duplicated across all of them
#[derive(Debug, Default)]
pub struct AggregatedCentres<'a> {
    pub available: Vec<&'a VaccinationCentre>,
    pub unavailable: Vec<&'a VaccinationCentre>,
}

impl AggregatedCentres<'_> {
    pub fn len(&self) -> usize {
        self.available.len() + self.unavailable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn aggregate<'a, I>(collections: I) -> AggregatedCentres<'a>
where
    I: IntoIterator<Item = &'a VaccinationCentres>,
{
    let collections: Vec<&VaccinationCentres> = collections.into_iter().collect();
    AggregatedCentres {
        available: dedup_by_id(collections.iter().copied().flat_map(|c| c.available.iter())),
        unavailable: dedup_by_id(collections.iter().copied().flat_map(|c| c.unavailable.iter())),
    }
}
