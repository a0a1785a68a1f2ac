/// Vaccination centre record and its derived accessors
use super::{lenient, lenient_key, lenient_vec};
use crate::utils::{
    format_french_phone, format_long_day, format_short_time, haversine_km, parse_paris_datetime,
    parse_phone_url, parse_web_url,
};
use chrono::DateTime;
use chrono_tz::Tz;
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use url::Url;
use uuid::Uuid;

/// Name of the appointment schedule that carries last-minute slots
pub const CHRONODOSE_SCHEDULE: &str = "chronodose";

/// Placeholder shown when a centre has no name
pub const UNAVAILABLE_NAME: &str = "Nom du centre indisponible";

/// Spoken labels for vaccine codes
const VACCINE_VOCALIZATIONS: &[(&str, &str)] = &[
    ("Pfizer-BioNTech", "Pfizer BioNTech"),
    ("Moderna", "Moderna"),
    ("AstraZeneca", "Astra Zeneca"),
    ("Janssen", "Janssen"),
    ("ARNm", "A R N messager"),
];

/// Centre identity used for de-duplication
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CentreId {
    Internal(String),
    Gid(String),
    /// Generated when upstream sends no key; not stable across fetches
    Generated(Uuid),
}

impl CentreId {
    pub fn is_ephemeral(&self) -> bool {
        matches!(self, CentreId::Generated(_))
    }
}

impl fmt::Display for CentreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CentreId::Internal(id) => write!(f, "{}", id),
            CentreId::Gid(gid) => write!(f, "gid:{}", gid),
            CentreId::Generated(uuid) => write!(f, "tmp:{}", uuid),
        }
    }
}

/// A latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        haversine_km(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Location {
    #[serde(default, deserialize_with = "lenient")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub city: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Metadata {
    #[serde(default, deserialize_with = "lenient")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub business_hours: Option<BTreeMap<String, Option<String>>>,
}

/// One entry of `appointment_schedules`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AppointmentSchedule {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub from: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub to: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub total: Option<i64>,
}

/// Wire shape of a centre, before an identity is assigned
#[derive(Debug, Default, Deserialize)]
struct RawCentre {
    #[serde(default, deserialize_with = "lenient_key")]
    internal_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_key")]
    gid: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    departement: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    nom: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    location: Option<Location>,
    #[serde(default, deserialize_with = "lenient")]
    metadata: Option<Metadata>,
    #[serde(default, deserialize_with = "lenient")]
    prochain_rdv: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    plateforme: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    centre_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    appointment_count: Option<i64>,
    #[serde(default, deserialize_with = "lenient_vec")]
    vaccine_type: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    appointment_schedules: Vec<AppointmentSchedule>,
}

/// Vaccination centre as published by the Vite Ma Dose API
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawCentre")]
pub struct VaccinationCentre {
    pub id: CentreId,
    pub departement: Option<String>,
    pub nom: Option<String>,
    pub url: Option<String>,
    pub location: Option<Location>,
    pub metadata: Option<Metadata>,
    pub prochain_rdv: Option<String>,
    pub plateforme: Option<String>,
    pub centre_type: Option<String>,
    pub appointment_count: Option<i64>,
    pub vaccine_type: Vec<String>,
    pub appointment_schedules: Vec<AppointmentSchedule>,
}

impl From<RawCentre> for VaccinationCentre {
    fn from(raw: RawCentre) -> Self {
        let id = match (raw.internal_id, raw.gid) {
            (Some(internal_id), _) => CentreId::Internal(internal_id),
            (None, Some(gid)) => CentreId::Gid(gid),
            (None, None) => CentreId::Generated(Uuid::new_v4()),
        };

        Self {
            id,
            departement: raw.departement,
            nom: raw.nom,
            url: raw.url,
            location: raw.location,
            metadata: raw.metadata,
            prochain_rdv: raw.prochain_rdv,
            plateforme: raw.plateforme,
            centre_type: raw.centre_type,
            appointment_count: raw.appointment_count,
            vaccine_type: raw.vaccine_type,
            appointment_schedules: raw.appointment_schedules,
        }
    }
}

impl VaccinationCentre {
    pub fn is_available(&self) -> bool {
        self.prochain_rdv.is_some()
    }

    pub fn next_appointment_date(&self) -> Option<DateTime<Tz>> {
        self.prochain_rdv.as_deref().and_then(parse_paris_datetime)
    }

    pub fn next_appointment_day(&self) -> Option<String> {
        self.next_appointment_date().map(|dt| format_long_day(&dt))
    }

    pub fn next_appointment_time(&self) -> Option<String> {
        self.next_appointment_date().map(|dt| format_short_time(&dt))
    }

    pub fn appointment_url(&self) -> Option<Url> {
        self.url.as_deref().and_then(parse_web_url)
    }

    fn phone_number(&self) -> Option<&str> {
        self.metadata.as_ref()?.phone_number.as_deref()
    }

    pub fn phone_url(&self) -> Option<Url> {
        self.phone_number().and_then(parse_phone_url)
    }

    pub fn formatted_phone_number(&self) -> Option<String> {
        self.phone_number().and_then(format_french_phone)
    }

    pub fn address(&self) -> Option<&str> {
        self.metadata.as_ref()?.address.as_deref()
    }

    pub fn city(&self) -> Option<&str> {
        self.location.as_ref()?.city.as_deref()
    }

    /// Coordinates, only when both latitude and longitude are known
    pub fn coordinates(&self) -> Option<GeoPoint> {
        let location = self.location.as_ref()?;
        Some(GeoPoint::new(location.latitude?, location.longitude?))
    }

    pub fn distance_km(&self, reference: Option<&GeoPoint>) -> Option<f64> {
        Some(self.coordinates()?.distance_km(reference?))
    }

    fn chronodose_schedule(&self) -> Option<&AppointmentSchedule> {
        self.appointment_schedules
            .iter()
            .find(|schedule| schedule.name.as_deref() == Some(CHRONODOSE_SCHEDULE))
    }

    /// Chronodose slot count, present only when it reaches `minimum`
    pub fn chronodose_count(&self, minimum: i64) -> Option<i64> {
        self.chronodose_schedule()?
            .total
            .filter(|&total| total > 0 && total >= minimum)
    }

    pub fn has_chronodose(&self, minimum: i64) -> bool {
        self.chronodose_count(minimum).is_some()
    }

    pub fn vaccine_display_text(&self) -> String {
        self.vaccine_type.join(", ")
    }

    pub fn vaccine_vocalization_text(&self) -> String {
        self.vaccine_type
            .iter()
            .map(|code| {
                VACCINE_VOCALIZATIONS
                    .iter()
                    .find(|(key, _)| *key == code.as_str())
                    .map_or(code.as_str(), |(_, label)| *label)
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Centre name, suffixed with the distance to `reference` when both ends are known
    pub fn formatted_name(&self, reference: Option<&GeoPoint>) -> String {
        let Some(name) = self.nom.as_deref() else {
            return UNAVAILABLE_NAME.to_string();
        };
        match self.distance_km(reference) {
            Some(distance) => format!("{} ({:.1} km)", name, distance),
            None => name.to_string(),
        }
    }

    /// Next appointment truncated to the minute
    fn appointment_minute(&self) -> Option<i64> {
        self.next_appointment_date()
            .map(|dt| dt.timestamp().div_euclid(60))
    }
}

/// `true` when `a` has an earlier appointment minute than `b`.
///
/// Returns `false` whenever either centre is unavailable or its timestamp does
/// not parse, so this is not a total order: filter to available centres
/// before using it, or use [`appointment_ordering`].
pub fn sorted_by_appointment(a: &VaccinationCentre, b: &VaccinationCentre) -> bool {
    match (a.appointment_minute(), b.appointment_minute()) {
        (Some(a), Some(b)) => a < b,
        _ => false,
    }
}

/// Total order on appointment minute, centres without a usable appointment last
pub fn appointment_ordering(a: &VaccinationCentre, b: &VaccinationCentre) -> Ordering {
    match (a.appointment_minute(), b.appointment_minute()) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn has_fast_track_eligibility(centre: &VaccinationCentre, minimum: i64) -> bool {
    centre.has_chronodose(minimum)
}
