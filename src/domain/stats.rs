use super::collection::AggregatedCentres;
use serde::Serialize;

/// Availability figures shown above the centre list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CentreStats {
    pub all_locations: usize,
    pub locations_with_availabilities: usize,
    pub all_availabilities: i64,
    pub available_locations_percentage: f64,
}

impl CentreStats {
    pub fn from_centres(centres: &AggregatedCentres<'_>) -> Self {
        let all_locations = centres.len();
        let open: Vec<_> = centres
            .available
            .iter()
            .filter(|centre| centre.is_available())
            .collect();
        let locations_with_availabilities = open.len();
        let all_availabilities = open
            .iter()
            .filter_map(|centre| centre.appointment_count)
            .filter(|&count| count > 0)
            .sum();
        let available_locations_percentage = if all_locations == 0 {
            0.0
        } else {
            let ratio = locations_with_availabilities as f64 / all_locations as f64;
            (ratio * 1000.0).round() / 10.0
        };

        Self {
            all_locations,
            locations_with_availabilities,
            all_availabilities,
            available_locations_percentage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{aggregate, VaccinationCentres};
    use serde_json::json;

    #[test]
    fn test_stats_from_centres() {
        let centres: VaccinationCentres = serde_json::from_value(json!({
            "centres_disponibles": [
                {"internal_id": "a", "prochain_rdv": "2021-06-01T10:00:00", "appointment_count": 12},
                {"internal_id": "b", "prochain_rdv": "2021-06-02T10:00:00", "appointment_count": 3},
                {"internal_id": "c", "appointment_count": 50}
            ],
            "centres_indisponibles": [{"internal_id": "d"}]
        }))
        .unwrap();

        let stats = CentreStats::from_centres(&aggregate([&centres]));
        assert_eq!(stats.all_locations, 4);
        assert_eq!(stats.locations_with_availabilities, 2);
        assert_eq!(stats.all_availabilities, 15);
        assert_eq!(stats.available_locations_percentage, 50.0);
    }

    #[test]
    fn test_stats_empty() {
        let centres = VaccinationCentres::default();
        let stats = CentreStats::from_centres(&aggregate([&centres]));
        assert_eq!(stats.all_locations, 0);
        assert_eq!(stats.available_locations_percentage, 0.0);
    }
}
