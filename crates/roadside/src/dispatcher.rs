use roadside_core::{
    find_nearest_with_distance, Category, IssueReport, KeywordClassifier, MechanicRecord,
};
use roadside_store::{
    NewServiceRequest, RequestStatus, RequestStatusView, Result, ServiceRequest, Store,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::DispatchConfig;

/// What the customer gets back after submitting or retrying a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchReceipt {
    pub request_id: i64,
    pub status: RequestStatus,
    pub category: Category,
    pub confidence: f64,
    /// Mechanic assigned by this dispatch, if any.
    pub mechanic: Option<MechanicRecord>,
    /// Distance in kilometres from the customer to the assigned mechanic.
    pub distance_km: Option<f64>,
}

impl DispatchReceipt {
    fn new(request: &ServiceRequest, assigned: Option<(MechanicRecord, f64)>) -> Self {
        let (mechanic, distance_km) = match assigned {
            Some((m, d)) => (Some(m), Some(d)),
            None => (None, None),
        };
        Self {
            request_id: request.id,
            status: if mechanic.is_some() {
                RequestStatus::Assigned
            } else {
                request.status
            },
            category: request.category,
            confidence: request.confidence,
            mechanic,
            distance_km,
        }
    }

    /// Returns `true` if a mechanic was assigned by this dispatch.
    #[must_use]
    pub fn is_assigned(&self) -> bool {
        self.mechanic.is_some()
    }
}

/// Sequences one dispatch: validate → classify → persist → match → claim.
///
/// The matcher only sees a snapshot, so the claim can lose a race against
/// another dispatcher. A lost claim triggers a fresh snapshot and another
/// match, up to `claim_attempts` rounds. A request nobody can take stays
/// `Open`; that is not an error.
pub struct Dispatcher {
    store: Store,
    config: DispatchConfig,
    classifier: KeywordClassifier,
}

impl Dispatcher {
    /// Creates a dispatcher over `store` using the built-in keyword table.
    pub fn new(store: Store, config: DispatchConfig) -> Self {
        Self {
            store,
            config,
            classifier: KeywordClassifier::new(),
        }
    }

    /// Replaces the classifier.
    pub fn with_classifier(mut self, classifier: KeywordClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Records a new request for `customer` and tries to assign a mechanic.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Dispatch` if the coordinate policy refuses the
    /// report location, or a storage error.
    pub fn submit(&self, customer: &str, report: &IssueReport) -> Result<DispatchReceipt> {
        let location = self
            .config
            .coordinate_policy
            .apply(report.location.lat, report.location.lon)?;

        let classification = self.classifier.classify_report(report);
        info!(
            "Classified request from {} as {}",
            customer, classification
        );

        let request = self.store.create_request(&NewServiceRequest {
            customer: customer.to_string(),
            description: report.description.clone(),
            category: classification.category,
            confidence: classification.confidence,
            location,
            emergency: report.emergency,
        })?;

        let assigned = self.assign(&request)?;
        Ok(DispatchReceipt::new(&request, assigned))
    }

    /// Retries matching for a request. Requests that are no longer `Open`
    /// are returned as they are.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the request does not exist.
    pub fn redispatch(&self, request_id: i64) -> Result<DispatchReceipt> {
        let request = self.store.request(request_id)?;
        if request.status != RequestStatus::Open {
            info!(
                "Request {} is {}; nothing to dispatch",
                request_id, request.status
            );
            return Ok(DispatchReceipt::new(&request, None));
        }

        let assigned = self.assign(&request)?;
        Ok(DispatchReceipt::new(&request, assigned))
    }

    /// Retries every open request, oldest first.
    pub fn redispatch_open(&self) -> Result<Vec<DispatchReceipt>> {
        let open = self.store.open_requests()?;
        info!("Retrying {} open requests", open.len());

        open.iter()
            .map(|request| -> Result<DispatchReceipt> {
                let assigned = self.assign(request)?;
                Ok(DispatchReceipt::new(request, assigned))
            })
            .collect()
    }

    /// Status of a request as the customer sees it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the request does not exist.
    pub fn status(&self, request_id: i64) -> Result<RequestStatusView> {
        self.store.status_view(request_id)
    }

    fn assign(&self, request: &ServiceRequest) -> Result<Option<(MechanicRecord, f64)>> {
        self.assign_from(request, || self.store.available_mechanics(None))
    }

    /// Match-and-claim rounds over snapshots taken by `snapshot`. Mechanics
    /// who rejected the request are never offered it again.
    fn assign_from<F>(
        &self,
        request: &ServiceRequest,
        mut snapshot: F,
    ) -> Result<Option<(MechanicRecord, f64)>>
    where
        F: FnMut() -> Result<Vec<MechanicRecord>>,
    {
        let rejected = self.store.rejected_by(request.id)?;

        for attempt in 1..=self.config.claim_attempts.max(1) {
            let mut mechanics = snapshot()?;
            mechanics.retain(|m| !rejected.contains(&m.id));

            let Some((mechanic, distance)) =
                find_nearest_with_distance(&request.location, request.category, &mechanics)
            else {
                info!(
                    "No mechanic available for request {} ({}); leaving it open",
                    request.id, request.category
                );
                return Ok(None);
            };

            if self.store.claim(request.id, mechanic.id)? {
                info!(
                    "Request {} assigned to {} ({}) {:.2} km away",
                    request.id, mechanic.name, mechanic.skill, distance
                );
                return Ok(Some((mechanic.clone().with_available(false), distance)));
            }

            // Nothing more to do if the request itself moved on
            if self.store.request(request.id)?.status != RequestStatus::Open {
                return Ok(None);
            }

            warn!(
                "Claim attempt {} for request {} lost mechanic {}",
                attempt, request.id, mechanic.id
            );
        }

        warn!(
            "Gave up assigning request {} after {} attempts",
            request.id, self.config.claim_attempts
        );
        Ok(None)
    }
}
