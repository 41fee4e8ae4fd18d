//! Read-only hospital catalog and the filters the dashboard applies to it.

pub mod catalog;

use serde::{Deserialize, Serialize};

pub use catalog::{all, find};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Hospital {
    pub id: u32,
    pub name: String,
    pub location: String,
    pub rating: f64,
    /// e.g. "2.3 km"
    pub distance: String,
    pub specialties: Vec<String>,
    /// e.g. "15 mins"
    pub wait_time: String,
    pub price: String,
    pub image: String,
    pub is_preferred: bool,
    pub total_doctors: u32,
    pub emergency_available: bool,
    pub phone: String,
    pub address: String,
    pub established: u32,
    pub beds: u32,
    pub status: String,
}

impl Hospital {
    pub fn distance_km(&self) -> f64 {
        leading_number(&self.distance)
    }

    pub fn wait_minutes(&self) -> f64 {
        leading_number(&self.wait_time)
    }

    fn matches(&self, term: &str) -> bool {
        contains(&self.name, term) || contains(&self.location, term) || self.has_specialty(term)
    }

    fn has_specialty(&self, term: &str) -> bool {
        self.specialties.iter().any(|s| contains(s, term))
    }
}

fn leading_number(value: &str) -> f64 {
    value
        .split_whitespace()
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(f64::MAX)
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    Rating,
    Distance,
    Name,
    WaitTime,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Query-string filters; every one is optional and they combine with AND.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HospitalFilter {
    pub search: Option<String>,
    pub location: Option<String>,
    pub specialty: Option<String>,
    pub emergency: Option<bool>,
    pub max_distance: Option<f64>,
    pub sort_by: Option<SortBy>,
    pub order: Option<SortOrder>,
}

impl HospitalFilter {
    pub fn apply(&self, hospitals: &[Hospital]) -> Vec<Hospital> {
        let mut result: Vec<Hospital> = hospitals.to_vec();

        if let Some(term) = non_blank(&self.search) {
            result = search(&result, term);
        }
        if let Some(location) = non_blank(&self.location) {
            result = by_location(&result, location);
        }
        if let Some(specialty) = non_blank(&self.specialty) {
            result = by_specialty(&result, specialty);
        }
        if self.emergency == Some(true) {
            result = emergency(&result);
        }

        match (self.max_distance, self.sort_by) {
            (Some(max_km), None) => nearby(&result, max_km),
            (Some(max_km), Some(sort_by)) => {
                sort(&nearby(&result, max_km), sort_by, self.order.unwrap_or_default())
            }
            (None, sort_by) => sort(
                &result,
                sort_by.unwrap_or_default(),
                self.order.unwrap_or_default(),
            ),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Name, location or any specialty contains the term
pub fn search(hospitals: &[Hospital], term: &str) -> Vec<Hospital> {
    hospitals.iter().filter(|h| h.matches(term)).cloned().collect()
}

pub fn by_location(hospitals: &[Hospital], location: &str) -> Vec<Hospital> {
    hospitals
        .iter()
        .filter(|h| contains(&h.location, location))
        .cloned()
        .collect()
}

pub fn by_specialty(hospitals: &[Hospital], specialty: &str) -> Vec<Hospital> {
    hospitals
        .iter()
        .filter(|h| h.has_specialty(specialty))
        .cloned()
        .collect()
}

pub fn emergency(hospitals: &[Hospital]) -> Vec<Hospital> {
    hospitals
        .iter()
        .filter(|h| h.emergency_available)
        .cloned()
        .collect()
}

/// Within `max_km`, closest first
pub fn nearby(hospitals: &[Hospital], max_km: f64) -> Vec<Hospital> {
    let mut result: Vec<Hospital> = hospitals
        .iter()
        .filter(|h| h.distance_km() <= max_km)
        .cloned()
        .collect();
    result.sort_by(|a, b| a.distance_km().total_cmp(&b.distance_km()));
    result
}

/// Rating at least `min_rating`, best rated first, ties broken by distance.
pub fn recommended(hospitals: &[Hospital], min_rating: f64, limit: usize) -> Vec<Hospital> {
    let mut result: Vec<Hospital> = hospitals
        .iter()
        .filter(|h| h.rating >= min_rating)
        .cloned()
        .collect();
    result.sort_by(|a, b| {
        b.rating
            .total_cmp(&a.rating)
            .then_with(|| a.distance_km().total_cmp(&b.distance_km()))
    });
    result.truncate(limit);
    result
}

pub fn sort(hospitals: &[Hospital], sort_by: SortBy, order: SortOrder) -> Vec<Hospital> {
    let mut result = hospitals.to_vec();
    result.sort_by(|a, b| {
        let ordering = match sort_by {
            SortBy::Rating => a.rating.total_cmp(&b.rating),
            SortBy::Distance => a.distance_km().total_cmp(&b.distance_km()),
            SortBy::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortBy::WaitTime => a.wait_minutes().total_cmp(&b.wait_minutes()),
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    result
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HospitalStats {
    pub total_hospitals: usize,
    pub emergency_hospitals: usize,
    pub average_rating: f64,
    pub total_doctors: u32,
    pub total_beds: u32,
    pub preferred_hospitals: usize,
}

pub fn stats(hospitals: &[Hospital]) -> HospitalStats {
    let total = hospitals.len();
    let average = if total == 0 {
        0.0
    } else {
        hospitals.iter().map(|h| h.rating).sum::<f64>() / total as f64
    };

    HospitalStats {
        total_hospitals: total,
        emergency_hospitals: hospitals.iter().filter(|h| h.emergency_available).count(),
        average_rating: (average * 10.0).round() / 10.0,
        total_doctors: hospitals.iter().map(|h| h.total_doctors).sum(),
        total_beds: hospitals.iter().map(|h| h.beds).sum(),
        preferred_hospitals: hospitals.iter().filter(|h| h.is_preferred).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(hospitals: &[Hospital]) -> Vec<u32> {
        hospitals.iter().map(|h| h.id).collect()
    }

    #[test]
    fn recommended_orders_by_rating_then_distance() {
        let result = recommended(all(), 4.5, 4);
        // 4.9, 4.8, 4.7, then the closer of the two 4.6s
        assert_eq!(ids(&result), vec![4, 1, 3, 2]);
    }

    #[test]
    fn stats_round_average_to_one_decimal() {
        let stats = stats(all());
        assert_eq!(stats.total_hospitals, 10);
        assert_eq!(stats.emergency_hospitals, 9);
        assert_eq!(stats.average_rating, 4.5);
        assert_eq!(stats.total_doctors, 333);
        assert_eq!(stats.total_beds, 1195);
        assert_eq!(stats.preferred_hospitals, 2);
    }

    #[test]
    fn search_matches_name_location_or_specialty() {
        assert_eq!(ids(&search(all(), "bamenda")), vec![4, 5]);
        assert_eq!(ids(&search(all(), "ONCOLOGY")), vec![2]);
        assert_eq!(ids(&search(all(), "limbe")), vec![9]);
    }

    #[test]
    fn nearby_sorts_closest_first() {
        assert_eq!(ids(&nearby(all(), 5.0)), vec![4, 1, 5]);
    }

    #[test]
    fn sort_by_wait_time_ascending() {
        let sorted = sort(all(), SortBy::WaitTime, SortOrder::Asc);
        assert_eq!(sorted.first().map(|h| h.id), Some(4));
        assert_eq!(sorted.last().map(|h| h.id), Some(7));
    }

    #[test]
    fn filter_defaults_to_rating_desc() {
        let filter = HospitalFilter {
            specialty: Some("pediatrics".to_string()),
            emergency: Some(true),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(all())), vec![4, 2, 8, 10]);
    }

    #[test]
    fn unknown_hospital_is_none() {
        assert!(find(42).is_none());
        assert_eq!(find(7).map(|h| h.beds), Some(75));
    }
}
