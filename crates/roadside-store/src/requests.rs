use roadside_core::GeoPoint;
use rusqlite::{params, OptionalExtension, Row};
use tracing::{info, warn};

use crate::error::{Result, StoreError};
use crate::mechanics::ACTIVE_JOBS;
use crate::store::{parse_column, Store};
use crate::types::{
    NewServiceRequest, RequestAction, RequestStatus, RequestStatusView, ServiceRequest,
};

const REQUEST_COLUMNS: &str = "id, customer, mechanic_id, issue_description, detected_category,
    confidence_score, location_latitude, location_longitude, is_emergency, status,
    created_at, updated_at";

fn request_from_row(row: &Row<'_>) -> rusqlite::Result<ServiceRequest> {
    Ok(ServiceRequest {
        id: row.get(0)?,
        customer: row.get(1)?,
        mechanic_id: row.get(2)?,
        description: row.get(3)?,
        category: parse_column(row, 4)?,
        confidence: row.get(5)?,
        location: GeoPoint::unchecked(row.get(6)?, row.get(7)?),
        emergency: row.get(8)?,
        status: parse_column(row, 9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn not_found(id: i64) -> StoreError {
    StoreError::NotFound {
        entity: "request",
        id,
    }
}

impl Store {
    /// Persists a new request in the `Open` state.
    pub fn create_request(&self, new: &NewServiceRequest) -> Result<ServiceRequest> {
        self.conn.execute(
            "INSERT INTO service_requests (
                customer, issue_description, detected_category, confidence_score,
                location_latitude, location_longitude, is_emergency, status
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                new.customer,
                new.description,
                new.category.as_str(),
                new.confidence,
                new.location.lat,
                new.location.lon,
                new.emergency,
                RequestStatus::Open.as_str(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        info!(
            "Opened request {} for {} ({}, conf={:.2})",
            id, new.customer, new.category, new.confidence
        );
        self.request(id)
    }

    /// Looks up one request.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no request has this id.
    pub fn request(&self, id: i64) -> Result<ServiceRequest> {
        self.conn
            .query_row(
                &format!("SELECT {REQUEST_COLUMNS} FROM service_requests WHERE id = ?1"),
                params![id],
                request_from_row,
            )
            .optional()?
            .ok_or_else(|| not_found(id))
    }

    /// Status, mechanic name and category of a request.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no request has this id.
    pub fn status_view(&self, id: i64) -> Result<RequestStatusView> {
        self.conn
            .query_row(
                "SELECT r.status, m.name, r.detected_category
                 FROM service_requests r
                 LEFT JOIN mechanics m ON m.id = r.mechanic_id
                 WHERE r.id = ?1",
                params![id],
                |row| {
                    Ok(RequestStatusView {
                        status: parse_column(row, 0)?,
                        mechanic: row.get(1)?,
                        category: parse_column(row, 2)?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| not_found(id))
    }

    /// Requests assigned to a mechanic, optionally narrowed to one status,
    /// oldest first.
    pub fn requests_for_mechanic(
        &self,
        mechanic_id: i64,
        status: Option<RequestStatus>,
    ) -> Result<Vec<ServiceRequest>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {REQUEST_COLUMNS} FROM service_requests
             WHERE mechanic_id = ?1 AND (?2 IS NULL OR status = ?2)
             ORDER BY created_at, id"
        ))?;
        let rows = stmt.query_map(
            params![mechanic_id, status.map(RequestStatus::as_str)],
            request_from_row,
        )?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Requests still waiting for a mechanic, oldest first.
    pub fn open_requests(&self) -> Result<Vec<ServiceRequest>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {REQUEST_COLUMNS} FROM service_requests
             WHERE status = ?1
             ORDER BY created_at, id"
        ))?;
        let rows = stmt.query_map(params![RequestStatus::Open.as_str()], request_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Mechanics who rejected this request, in the order they did so.
    pub fn rejected_by(&self, request_id: i64) -> Result<Vec<i64>> {
        let mut stmt = self.conn.prepare(
            "SELECT mechanic_id FROM request_rejections
             WHERE request_id = ?1
             ORDER BY rejected_at, mechanic_id",
        )?;
        let rows = stmt.query_map(params![request_id], |row| row.get(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Atomically assigns an available mechanic to an open request.
    ///
    /// Returns `false`, changing nothing, if the mechanic is no longer
    /// available, already holds an active request, has rejected this request
    /// before, or the request is no longer open. The mechanic is marked
    /// unavailable in the same transaction, so two dispatchers can never
    /// claim the same mechanic.
    pub fn claim(&self, request_id: i64, mechanic_id: i64) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;

        let rejected: bool = tx.query_row(
            "SELECT EXISTS (
                 SELECT 1 FROM request_rejections WHERE request_id = ?1 AND mechanic_id = ?2
             )",
            params![request_id, mechanic_id],
            |row| row.get(0),
        )?;
        if rejected {
            warn!("Mechanic {} already rejected request {}", mechanic_id, request_id);
            return Ok(false);
        }

        let taken = tx.execute(
            &format!(
                "UPDATE mechanics SET is_available = 0, updated_at = datetime('now')
                 WHERE id = ?1 AND is_available = 1 AND NOT EXISTS ({ACTIVE_JOBS})"
            ),
            params![mechanic_id],
        )?;
        if taken == 0 {
            warn!("Mechanic {} is no longer available for request {}", mechanic_id, request_id);
            return Ok(false);
        }

        let assigned = tx.execute(
            "UPDATE service_requests
             SET mechanic_id = ?1, status = ?2, updated_at = datetime('now')
             WHERE id = ?3 AND status = ?4",
            params![
                mechanic_id,
                RequestStatus::Assigned.as_str(),
                request_id,
                RequestStatus::Open.as_str()
            ],
        )?;
        if assigned == 0 {
            warn!("Request {} is no longer open; releasing mechanic {}", request_id, mechanic_id);
            return Ok(false);
        }

        tx.commit()?;
        info!("Assigned mechanic {} to request {}", mechanic_id, request_id);
        Ok(true)
    }

    /// Assigned mechanic accepts and sets off.
    ///
    /// # Errors
    ///
    /// `NotFound` if the request is not assigned to this mechanic;
    /// `InvalidTransition` unless the request is `Assigned`.
    pub fn accept(&self, request_id: i64, mechanic_id: i64) -> Result<ServiceRequest> {
        self.apply(request_id, Some(mechanic_id), RequestAction::Accept)
    }

    /// Assigned mechanic declines; the request returns to the open pool and
    /// the mechanic becomes available again.
    ///
    /// # Errors
    ///
    /// `NotFound` if the request is not assigned to this mechanic;
    /// `InvalidTransition` unless the request is `Assigned`.
    pub fn reject(&self, request_id: i64, mechanic_id: i64) -> Result<ServiceRequest> {
        self.apply(request_id, Some(mechanic_id), RequestAction::Reject)
    }

    /// Mechanic finishes the job and becomes available again.
    ///
    /// # Errors
    ///
    /// `NotFound` if the request is not assigned to this mechanic;
    /// `InvalidTransition` unless the request is `OnTheWay`.
    pub fn complete(&self, request_id: i64, mechanic_id: i64) -> Result<ServiceRequest> {
        self.apply(request_id, Some(mechanic_id), RequestAction::Complete)
    }

    /// Customer withdraws the request. Any assigned mechanic is released.
    ///
    /// # Errors
    ///
    /// `NotFound` if the request does not exist; `InvalidTransition` if it
    /// is already completed or cancelled.
    pub fn cancel(&self, request_id: i64) -> Result<ServiceRequest> {
        self.apply(request_id, None, RequestAction::Cancel)
    }

    fn apply(
        &self,
        request_id: i64,
        acting_mechanic: Option<i64>,
        action: RequestAction,
    ) -> Result<ServiceRequest> {
        let tx = self.conn.unchecked_transaction()?;

        let current = tx
            .query_row(
                &format!("SELECT {REQUEST_COLUMNS} FROM service_requests WHERE id = ?1"),
                params![request_id],
                request_from_row,
            )
            .optional()?
            .ok_or_else(|| not_found(request_id))?;

        // A mechanic only sees requests assigned to them
        if let Some(mechanic_id) = acting_mechanic {
            if current.mechanic_id != Some(mechanic_id) {
                return Err(not_found(request_id));
            }
        }

        let next = action
            .next(current.status)
            .ok_or(StoreError::InvalidTransition {
                id: request_id,
                status: current.status,
                action,
            })?;

        let mechanic_after = if action.keeps_assignment() {
            current.mechanic_id
        } else {
            None
        };

        tx.execute(
            "UPDATE service_requests
             SET status = ?1, mechanic_id = ?2, updated_at = datetime('now')
             WHERE id = ?3",
            params![next.as_str(), mechanic_after, request_id],
        )?;

        if let (RequestAction::Reject, Some(mechanic_id)) = (action, current.mechanic_id) {
            tx.execute(
                "INSERT OR IGNORE INTO request_rejections (request_id, mechanic_id)
                 VALUES (?1, ?2)",
                params![request_id, mechanic_id],
            )?;
        }

        if let Some(mechanic_id) = current.mechanic_id {
            let available = action.releases_mechanic();
            tx.execute(
                "UPDATE mechanics SET is_available = ?1, updated_at = datetime('now')
                 WHERE id = ?2",
                params![available, mechanic_id],
            )?;
        }

        tx.commit()?;
        info!(
            "Request {} {}: {} -> {}",
            request_id, action, current.status, next
        );
        self.request(request_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewMechanic;
    use roadside_core::{Category, Skill};

    fn store() -> Store {
        Store::open_in_memory().unwrap()
    }

    fn mechanic(store: &Store, name: &str) -> i64 {
        store
            .register_mechanic(
                &NewMechanic::new(name, Skill::Tyre)
                    .with_location(GeoPoint::unchecked(12.9716, 77.5946)),
            )
            .unwrap()
            .id
    }

    fn open_request(store: &Store) -> ServiceRequest {
        store
            .create_request(&NewServiceRequest {
                customer: "test_user".into(),
                description: "I have a flat tyre near MG Road".into(),
                category: Category::Tyre,
                confidence: 1.0,
                location: GeoPoint::unchecked(12.9720, 77.5950),
                emergency: false,
            })
            .unwrap()
    }

    #[test]
    fn create_and_get_request() {
        let s = store();
        let r = open_request(&s);

        assert!(r.id > 0);
        assert_eq!(r.status, RequestStatus::Open);
        assert_eq!(r.mechanic_id, None);
        assert_eq!(r.category, Category::Tyre);
        assert_eq!(r.confidence, 1.0);
        assert!(!r.created_at.is_empty());
        assert_eq!(s.request(r.id).unwrap(), r);
        assert_eq!(s.open_requests().unwrap(), vec![r]);
    }

    #[test]
    fn claim_assigns_and_reserves_mechanic() {
        let s = store();
        let m = mechanic(&s, "test_mech");
        let r = open_request(&s);

        assert!(s.claim(r.id, m).unwrap());

        let r = s.request(r.id).unwrap();
        assert_eq!(r.status, RequestStatus::Assigned);
        assert_eq!(r.mechanic_id, Some(m));
        assert!(!s.mechanic(m).unwrap().available);
        assert!(s.open_requests().unwrap().is_empty());

        let view = s.status_view(r.id).unwrap();
        assert_eq!(view.status, RequestStatus::Assigned);
        assert_eq!(view.mechanic.as_deref(), Some("test_mech"));
        assert_eq!(view.category, Category::Tyre);
    }

    #[test]
    fn claim_is_exclusive() {
        let s = store();
        let m = mechanic(&s, "popular");
        let first = open_request(&s);
        let second = open_request(&s);

        assert!(s.claim(first.id, m).unwrap());
        assert!(!s.claim(second.id, m).unwrap());

        let second = s.request(second.id).unwrap();
        assert_eq!(second.status, RequestStatus::Open);
        assert_eq!(second.mechanic_id, None);
    }

    #[test]
    fn failed_claim_rolls_back_mechanic() {
        let s = store();
        let m = mechanic(&s, "spare");
        let r = open_request(&s);
        s.cancel(r.id).unwrap();

        assert!(!s.claim(r.id, m).unwrap());
        assert!(s.mechanic(m).unwrap().available);
    }

    #[test]
    fn accept_then_complete_releases_mechanic() {
        let s = store();
        let m = mechanic(&s, "worker");
        let r = open_request(&s);
        s.claim(r.id, m).unwrap();

        let r = s.accept(r.id, m).unwrap();
        assert_eq!(r.status, RequestStatus::OnTheWay);
        assert!(!s.mechanic(m).unwrap().available);
        assert_eq!(
            s.requests_for_mechanic(m, Some(RequestStatus::OnTheWay)).unwrap().len(),
            1
        );

        let r = s.complete(r.id, m).unwrap();
        assert_eq!(r.status, RequestStatus::Completed);
        assert_eq!(r.mechanic_id, Some(m));
        assert!(s.mechanic(m).unwrap().available);
    }

    #[test]
    fn reject_returns_request_to_pool() {
        let s = store();
        let m = mechanic(&s, "picky");
        let r = open_request(&s);
        s.claim(r.id, m).unwrap();

        let r = s.reject(r.id, m).unwrap();
        assert_eq!(r.status, RequestStatus::Open);
        assert_eq!(r.mechanic_id, None);
        assert!(s.mechanic(m).unwrap().available);
        assert_eq!(s.open_requests().unwrap().len(), 1);
        assert!(s.requests_for_mechanic(m, None).unwrap().is_empty());
    }

    #[test]
    fn rejecting_mechanic_cannot_reclaim_the_request() {
        let s = store();
        let m = mechanic(&s, "picky");
        let other = mechanic(&s, "willing");
        let r = open_request(&s);
        s.claim(r.id, m).unwrap();
        s.reject(r.id, m).unwrap();

        assert_eq!(s.rejected_by(r.id).unwrap(), vec![m]);
        assert!(!s.claim(r.id, m).unwrap());
        assert!(s.mechanic(m).unwrap().available);

        // Other requests are unaffected
        let fresh = open_request(&s);
        assert!(s.rejected_by(fresh.id).unwrap().is_empty());

        assert!(s.claim(r.id, other).unwrap());
        assert!(s.claim(fresh.id, m).unwrap());
    }

    #[test]
    fn claim_skips_mechanic_with_active_job() {
        let s = store();
        let m = mechanic(&s, "double_booked");
        let first = open_request(&s);
        let second = open_request(&s);
        s.claim(first.id, m).unwrap();

        // Availability flag forced back on behind the store's back
        s.conn
            .execute("UPDATE mechanics SET is_available = 1 WHERE id = ?1", params![m])
            .unwrap();

        assert!(!s.claim(second.id, m).unwrap());
        assert_eq!(s.request(second.id).unwrap().status, RequestStatus::Open);
        assert_eq!(s.requests_for_mechanic(m, None).unwrap().len(), 1);
    }

    #[test]
    fn confidence_is_stored_without_loss() {
        let s = store();
        let r = s
            .create_request(&NewServiceRequest {
                customer: "test_user".into(),
                description: "battery and tyre".into(),
                category: Category::Battery,
                confidence: 0.9,
                location: GeoPoint::unchecked(12.9720, 77.5950),
                emergency: false,
            })
            .unwrap();
        assert_eq!(s.request(r.id).unwrap().confidence, 0.9);
    }

    #[test]
    fn other_mechanic_cannot_act() {
        let s = store();
        let owner = mechanic(&s, "owner");
        let intruder = mechanic(&s, "intruder");
        let r = open_request(&s);
        s.claim(r.id, owner).unwrap();

        assert!(matches!(
            s.accept(r.id, intruder),
            Err(StoreError::NotFound { entity: "request", .. })
        ));
        assert_eq!(s.request(r.id).unwrap().status, RequestStatus::Assigned);
    }

    #[test]
    fn invalid_transition_changes_nothing() {
        let s = store();
        let m = mechanic(&s, "hasty");
        let r = open_request(&s);
        s.claim(r.id, m).unwrap();

        assert!(matches!(
            s.complete(r.id, m),
            Err(StoreError::InvalidTransition {
                status: RequestStatus::Assigned,
                action: RequestAction::Complete,
                ..
            })
        ));
        assert_eq!(s.request(r.id).unwrap().status, RequestStatus::Assigned);
        assert!(!s.mechanic(m).unwrap().available);
    }

    #[test]
    fn cancel_releases_assigned_mechanic() {
        let s = store();
        let m = mechanic(&s, "stood_up");
        let r = open_request(&s);
        s.claim(r.id, m).unwrap();

        let r = s.cancel(r.id).unwrap();
        assert_eq!(r.status, RequestStatus::Cancelled);
        assert!(s.mechanic(m).unwrap().available);

        assert!(matches!(
            s.cancel(r.id),
            Err(StoreError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn missing_request_is_not_found() {
        let s = store();
        assert!(matches!(s.request(5), Err(StoreError::NotFound { entity: "request", id: 5 })));
        assert!(matches!(s.status_view(5), Err(StoreError::NotFound { .. })));
        assert!(matches!(s.cancel(5), Err(StoreError::NotFound { .. })));
    }
}
