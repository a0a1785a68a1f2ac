/// HTTP request handlers
use crate::config::parse_departments;
use crate::domain::{CentreListing, CentreStats, CreditView, GeoPoint, Health, SortOption};
use crate::errors::ApiError;
use crate::services::{CentreQuery, CentreService};
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub centre_service: Arc<CentreService>,
}

/// Successful response wrapper
#[derive(Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub ok: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self { ok: true, data }
    }
}

/// Query string accepted by the centre listing endpoints
#[derive(Debug, Default, Deserialize)]
pub struct CentreParams {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub sort: Option<SortOption>,
    #[serde(default)]
    pub chronodose: bool,
    pub departments: Option<String>,
}

impl CentreParams {
    fn query(&self) -> Result<CentreQuery, ApiError> {
        let reference = match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                    return Err(ApiError::InvalidInput(format!(
                        "coordinates out of range: {}, {}",
                        lat, lon
                    )));
                }
                Some(GeoPoint::new(lat, lon))
            }
            (None, None) => None,
            _ => {
                return Err(ApiError::InvalidInput(
                    "lat and lon must be given together".to_string(),
                ))
            }
        };

        Ok(CentreQuery {
            reference,
            sort: self.sort.unwrap_or_default(),
            chronodose_only: self.chronodose,
        })
    }

    fn departments(&self) -> Vec<String> {
        self.departments
            .as_deref()
            .map(parse_departments)
            .unwrap_or_default()
    }
}

/// Health check handler
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        now: Utc::now(),
    })
}

/// List departments
pub async fn list_departments(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let counties = state.centre_service.departments().await?;
    Ok(Json(serde_json::json!(SuccessResponse::new(
        serde_json::json!({
            "departments": &*counties
        })
    ))))
}

/// Centres of one department
pub async fn list_department_centres(
    Path(code): Path<String>,
    params: Result<Query<CentreParams>, QueryRejection>,
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse<CentreListing>>, ApiError> {
    let Query(params) = params?;
    let query = params.query()?;
    let listing = state.centre_service.list_department(&code, &query).await?;
    Ok(Json(SuccessResponse::new(listing)))
}

/// Force a department refresh
pub async fn refresh_department(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let snapshot = state.centre_service.refresh(&code).await?;
    Ok(Json(serde_json::json!(SuccessResponse::new(
        serde_json::json!({
            "department": code,
            "fetched_at": snapshot.fetched_at,
            "last_updated": snapshot.centres.last_updated(),
            "available": snapshot.centres.available_centres().len(),
            "unavailable": snapshot.centres.unavailable_centres().len(),
        })
    ))))
}

/// Centres across several departments
pub async fn list_centres(
    params: Result<Query<CentreParams>, QueryRejection>,
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse<CentreListing>>, ApiError> {
    let Query(params) = params?;
    let query = params.query()?;
    let listing = state
        .centre_service
        .list_aggregated(&params.departments(), &query)
        .await?;
    Ok(Json(SuccessResponse::new(listing)))
}

/// Availability statistics across several departments
pub async fn get_stats(
    params: Result<Query<CentreParams>, QueryRejection>,
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse<CentreStats>>, ApiError> {
    let Query(params) = params?;
    let stats = state.centre_service.stats(&params.departments()).await?;
    Ok(Json(SuccessResponse::new(stats)))
}

/// Project contributors
pub async fn list_credits(
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse<Value>>, ApiError> {
    let credits: Vec<CreditView> = state.centre_service.credits().await?;
    Ok(Json(SuccessResponse::new(serde_json::json!({
        "credits": credits
    }))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_build_query() {
        let params = CentreParams {
            lat: Some(48.85),
            lon: Some(2.35),
            sort: Some(SortOption::Closest),
            chronodose: true,
            departments: Some("75,92".to_string()),
        };
        let query = params.query().unwrap();
        assert_eq!(query.reference, Some(GeoPoint::new(48.85, 2.35)));
        assert_eq!(query.sort, SortOption::Closest);
        assert!(query.chronodose_only);
        assert_eq!(params.departments(), vec!["75", "92"]);
    }

    #[test]
    fn test_params_reject_half_location() {
        let params = CentreParams {
            lat: Some(48.85),
            ..CentreParams::default()
        };
        assert!(matches!(params.query(), Err(ApiError::InvalidInput(_))));

        let params = CentreParams {
            lat: Some(123.0),
            lon: Some(2.0),
            ..CentreParams::default()
        };
        assert!(params.query().is_err());
    }

    #[test]
    fn test_params_defaults() {
        let params = CentreParams::default();
        let query = params.query().unwrap();
        assert!(query.reference.is_none());
        assert_eq!(query.sort, SortOption::Fastest);
        assert!(params.departments().is_empty());
    }
}
