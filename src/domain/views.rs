/// Read-only views handed to the HTTP layer
use super::centre::{GeoPoint, VaccinationCentre};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Inputs that shape how a centre is presented
#[derive(Debug, Clone, Copy)]
pub struct ViewContext {
    pub reference: Option<GeoPoint>,
    pub chronodose_min: i64,
}

/// Display-ready centre
#[derive(Debug, Clone, Serialize)]
pub struct CentreView {
    pub id: String,
    pub ephemeral_id: bool,
    pub name: String,
    pub department: Option<String>,
    pub platform: Option<String>,
    pub centre_type: Option<String>,
    pub available: bool,
    pub next_appointment_day: Option<String>,
    pub next_appointment_time: Option<String>,
    pub appointment_url: Option<String>,
    pub phone_url: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub business_hours: Option<BTreeMap<String, Option<String>>>,
    pub distance_km: Option<f64>,
    pub vaccines: String,
    pub vaccines_vocalization: String,
    pub appointment_count: Option<i64>,
    pub chronodose_count: Option<i64>,
}

impl CentreView {
    pub fn new(centre: &VaccinationCentre, ctx: &ViewContext) -> Self {
        let reference = ctx.reference.as_ref();
        Self {
            id: centre.id.to_string(),
            ephemeral_id: centre.id.is_ephemeral(),
            name: centre.formatted_name(reference),
            department: centre.departement.clone(),
            platform: centre.plateforme.clone(),
            centre_type: centre.centre_type.clone(),
            available: centre.is_available(),
            next_appointment_day: centre.next_appointment_day(),
            next_appointment_time: centre.next_appointment_time(),
            appointment_url: centre.appointment_url().map(String::from),
            phone_url: centre.phone_url().map(String::from),
            phone_number: centre.formatted_phone_number(),
            address: centre.address().map(str::to_string),
            city: centre.city().map(str::to_string),
            business_hours: centre
                .metadata
                .as_ref()
                .and_then(|metadata| metadata.business_hours.clone()),
            distance_km: centre
                .distance_km(reference)
                .map(|km| (km * 10.0).round() / 10.0),
            vaccines: centre.vaccine_display_text(),
            vaccines_vocalization: centre.vaccine_vocalization_text(),
            appointment_count: centre.appointment_count,
            chronodose_count: centre.chronodose_count(ctx.chronodose_min),
        }
    }
}

/// A sorted and filtered centre list, with its freshness
#[derive(Debug, Clone, Serialize)]
pub struct CentreListing {
    /// Display names of the departments covered, e.g. `Paris (75)`
    pub departments: Vec<String>,
    pub last_updated: Option<String>,
    pub available: Vec<CentreView>,
    pub unavailable: Vec<CentreView>,
}

/// Health check response
#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub now: DateTime<Utc>,
}
