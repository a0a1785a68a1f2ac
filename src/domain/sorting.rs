use super::centre::{appointment_ordering, GeoPoint, VaccinationCentre};
use serde::Deserialize;
use std::cmp::Ordering;

/// How a centre list is ordered for display
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOption {
    /// Nearest to the reference location first
    Closest,
    /// Earliest appointment first
    #[default]
    Fastest,
}

/// Stable sort; centres lacking the sort key keep their relative order at the end
pub fn sort_centres(
    centres: &mut [&VaccinationCentre],
    option: SortOption,
    reference: Option<&GeoPoint>,
) {
    match option {
        SortOption::Fastest => centres.sort_by(|a, b| appointment_ordering(a, b)),
        SortOption::Closest => {
            let Some(reference) = reference else {
                return;
            };
            centres.sort_by(|a, b| {
                match (a.distance_km(Some(reference)), b.distance_km(Some(reference))) {
                    (Some(a), Some(b)) => a.total_cmp(&b),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn centre(id: &str, rdv: Option<&str>, coords: Option<(f64, f64)>) -> VaccinationCentre {
        let location = coords.map(|(lat, lon)| json!({"latitude": lat, "longitude": lon}));
        serde_json::from_value(json!({
            "internal_id": id,
            "prochain_rdv": rdv,
            "location": location
        }))
        .unwrap()
    }

    fn ids(centres: &[&VaccinationCentre]) -> Vec<String> {
        centres.iter().map(|c| c.id.to_string()).collect()
    }

    #[test]
    fn test_fastest_puts_unavailable_last() {
        let late = centre("late", Some("2021-06-02T08:00:00"), None);
        let none = centre("none", None, None);
        let early = centre("early", Some("2021-06-01"), None);
        let mut centres = vec![&late, &none, &early];

        sort_centres(&mut centres, SortOption::Fastest, None);
        assert_eq!(ids(&centres), vec!["early", "late", "none"]);
    }

    #[test]
    fn test_closest_uses_reference() {
        let lyon = centre("lyon", None, Some((45.7640, 4.8357)));
        let paris = centre("paris", None, Some((48.8566, 2.3522)));
        let nowhere = centre("nowhere", None, None);
        let mut centres = vec![&nowhere, &lyon, &paris];

        let versailles = GeoPoint::new(48.8049, 2.1204);
        sort_centres(&mut centres, SortOption::Closest, Some(&versailles));
        assert_eq!(ids(&centres), vec!["paris", "lyon", "nowhere"]);
    }

    #[test]
    fn test_closest_without_reference_keeps_order() {
        let a = centre("a", None, Some((45.0, 4.0)));
        let b = centre("b", None, Some((48.0, 2.0)));
        let mut centres = vec![&a, &b];
        sort_centres(&mut centres, SortOption::Closest, None);
        assert_eq!(ids(&centres), vec!["a", "b"]);
    }

    #[test]
    fn test_sort_option_from_query_value() {
        let option: SortOption = serde_json::from_str("\"closest\"").unwrap();
        assert_eq!(option, SortOption::Closest);
        assert_eq!(SortOption::default(), SortOption::Fastest);
    }
}
