/// Business logic services layer
use crate::clients::ViteMaDoseClient;
use crate::domain::{
    aggregate, has_fast_track_eligibility, sort_centres, unique_credits, AggregatedCentres,
    CentreListing, CentreStats, CentreView, County, CreditView, GeoPoint, SortOption,
    VaccinationCentre, ViewContext,
};
use crate::errors::{ApiError, ApiResult};
use crate::repo::{CountyRepo, Snapshot, SnapshotRepo};
use crate::utils::is_department_code;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Caller-supplied presentation options
#[derive(Debug, Clone, Copy, Default)]
pub struct CentreQuery {
    pub reference: Option<GeoPoint>,
    pub sort: SortOption,
    pub chronodose_only: bool,
}

/// Centre directory service
pub struct CentreService {
    repo: SnapshotRepo,
    county_repo: CountyRepo,
    client: ViteMaDoseClient,
    chronodose_min: i64,
    /// Age after which a cached snapshot is fetched again
    max_age: Duration,
}

impl CentreService {
    pub fn new(
        repo: SnapshotRepo,
        county_repo: CountyRepo,
        client: ViteMaDoseClient,
        chronodose_min: i64,
        max_age: Duration,
    ) -> Self {
        Self {
            repo,
            county_repo,
            client,
            chronodose_min,
            max_age,
        }
    }

    /// Fetch a department and replace its snapshot
    pub async fn refresh(&self, department: &str) -> ApiResult<Snapshot> {
        self.county(department).await?;
        let centres = self.client.fetch_centres(department).await?;
        info!(
            department,
            available = centres.available_centres().len(),
            unavailable = centres.unavailable_centres().len(),
            "Centres refreshed"
        );
        Ok(self.repo.write(department, centres).await)
    }

    /// Refresh several departments, returning the ones that succeeded
    pub async fn refresh_all(&self, departments: &[String]) -> Vec<String> {
        let mut refreshed = Vec::new();
        for department in departments {
            match self.refresh(department).await {
                Ok(_) => refreshed.push(department.clone()),
                Err(e) => warn!("Refresh of department {} failed: {}", department, e),
            }
        }
        refreshed
    }

    /// Cached snapshot, fetched on first use and again once older than `max_age`
    pub async fn snapshot(&self, department: &str) -> ApiResult<Snapshot> {
        check_department(department)?;
        match self.repo.get_latest(department).await {
            Some(snapshot) if !snapshot.is_stale(self.max_age) => Ok(snapshot),
            Some(snapshot) => {
                debug!(department, fetched_at = %snapshot.fetched_at, "Snapshot expired");
                self.refresh(department).await
            }
            None => self.refresh(department).await,
        }
    }

    /// Department catalogue, fetched on first use
    pub async fn departments(&self) -> ApiResult<Arc<Vec<County>>> {
        if let Some(counties) = self.county_repo.get().await {
            return Ok(counties);
        }
        let counties = self.client.fetch_departments().await?;
        info!("Loaded {} departments", counties.len());
        Ok(self.county_repo.write(counties).await)
    }

    /// Catalogue entry of a department; unknown codes are `NotFound`
    pub async fn county(&self, department: &str) -> ApiResult<County> {
        check_department(department)?;
        let counties = self.departments().await?;
        counties
            .iter()
            .find(|county| county.code_departement.as_deref() == Some(department))
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("department {}", department)))
    }

    /// Project contributors, one per pseudonym, sorted by name
    pub async fn credits(&self) -> ApiResult<Vec<CreditView>> {
        let credits = self.client.fetch_credits().await?;
        let credits = unique_credits(credits.contributors);
        info!("Loaded {} contributors", credits.len());
        Ok(credits.iter().map(CreditView::from).collect())
    }

    /// Sorted and filtered centres of one department
    pub async fn list_department(
        &self,
        department: &str,
        query: &CentreQuery,
    ) -> ApiResult<CentreListing> {
        let county = self.county(department).await?;
        let snapshot = self.snapshot(department).await?;
        let centres = snapshot.centres.as_ref();
        let grouped = AggregatedCentres {
            available: centres.available_centres(),
            unavailable: centres.unavailable_centres(),
        };
        let names = county.display_name().into_iter().collect();
        Ok(self.build_listing(names, centres.last_updated_display(), grouped, query))
    }

    /// Centres of several departments, de-duplicated across them
    pub async fn list_aggregated(
        &self,
        departments: &[String],
        query: &CentreQuery,
    ) -> ApiResult<CentreListing> {
        let snapshots = self.snapshots(departments).await?;
        let counties = self.departments().await?;
        let names = departments
            .iter()
            .filter_map(|code| {
                counties
                    .iter()
                    .find(|county| county.code_departement.as_deref() == Some(code.as_str()))
            })
            .filter_map(County::display_name)
            .collect();
        let last_updated = snapshots
            .iter()
            .filter_map(|s| s.centres.last_updated_date().map(|date| (date, &s.centres)))
            .max_by_key(|(date, _)| *date)
            .and_then(|(_, centres)| centres.last_updated_display());
        let grouped = aggregate(snapshots.iter().map(|s| s.centres.as_ref()));
        Ok(self.build_listing(names, last_updated, grouped, query))
    }

    /// Availability figures across departments
    pub async fn stats(&self, departments: &[String]) -> ApiResult<CentreStats> {
        let snapshots = self.snapshots(departments).await?;
        let grouped = aggregate(snapshots.iter().map(|s| s.centres.as_ref()));
        Ok(CentreStats::from_centres(&grouped))
    }

    async fn snapshots(&self, departments: &[String]) -> ApiResult<Vec<Snapshot>> {
        if departments.is_empty() {
            return Err(ApiError::InvalidInput(
                "at least one department is required".to_string(),
            ));
        }
        let mut snapshots = Vec::with_capacity(departments.len());
        for department in departments {
            snapshots.push(self.snapshot(department).await?);
        }
        Ok(snapshots)
    }

    fn build_listing(
        &self,
        departments: Vec<String>,
        last_updated: Option<String>,
        grouped: AggregatedCentres<'_>,
        query: &CentreQuery,
    ) -> CentreListing {
        let ctx = ViewContext {
            reference: query.reference,
            chronodose_min: self.chronodose_min,
        };
        let present = |mut centres: Vec<&VaccinationCentre>| -> Vec<CentreView> {
            if query.chronodose_only {
                centres.retain(|centre| has_fast_track_eligibility(centre, self.chronodose_min));
            }
            sort_centres(&mut centres, query.sort, query.reference.as_ref());
            centres
                .iter()
                .map(|centre| CentreView::new(centre, &ctx))
                .collect()
        };

        CentreListing {
            departments,
            last_updated,
            available: present(grouped.available),
            unavailable: present(grouped.unavailable),
        }
    }
}

fn check_department(department: &str) -> ApiResult<()> {
    if is_department_code(department) {
        Ok(())
    } else {
        Err(ApiError::InvalidInput(format!(
            "malformed department code {:?}",
            department
        )))
    }
}
