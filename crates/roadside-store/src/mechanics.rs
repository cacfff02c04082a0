use roadside_core::{GeoPoint, MechanicRecord, Skill};
use rusqlite::{params, OptionalExtension, Row};
use tracing::info;

use crate::error::{Result, StoreError};
use crate::store::{parse_column, Store};
use crate::types::NewMechanic;

const MECHANIC_COLUMNS: &str = "id, name, phone, latitude, longitude, skill, is_available";

/// Subquery over the requests mechanic `?1` is still working on.
pub(crate) const ACTIVE_JOBS: &str = "SELECT id FROM service_requests
     WHERE mechanic_id = ?1 AND status IN ('Assigned', 'OnTheWay')";

fn mechanic_from_row(row: &Row<'_>) -> rusqlite::Result<MechanicRecord> {
    Ok(MechanicRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        location: GeoPoint::unchecked(row.get(3)?, row.get(4)?),
        skill: parse_column(row, 5)?,
        available: row.get(6)?,
    })
}

fn not_found(id: i64) -> StoreError {
    StoreError::NotFound {
        entity: "mechanic",
        id,
    }
}

impl Store {
    /// Registers a mechanic. New mechanics start available.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Sqlite` if the name is already taken.
    pub fn register_mechanic(&self, new: &NewMechanic) -> Result<MechanicRecord> {
        self.conn.execute(
            "INSERT INTO mechanics (name, phone, latitude, longitude, skill)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                new.name,
                new.phone,
                new.location.lat,
                new.location.lon,
                new.skill.as_str()
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        info!("Registered mechanic {} ({}) with skill {}", id, new.name, new.skill);
        self.mechanic(id)
    }

    /// Looks up one mechanic.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no mechanic has this id.
    pub fn mechanic(&self, id: i64) -> Result<MechanicRecord> {
        self.conn
            .query_row(
                &format!("SELECT {MECHANIC_COLUMNS} FROM mechanics WHERE id = ?1"),
                params![id],
                mechanic_from_row,
            )
            .optional()?
            .ok_or_else(|| not_found(id))
    }

    /// All mechanics ordered by id.
    pub fn list_mechanics(&self) -> Result<Vec<MechanicRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {MECHANIC_COLUMNS} FROM mechanics ORDER BY id"))?;
        let rows = stmt.query_map([], mechanic_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Snapshot of available mechanics, optionally narrowed to one skill,
    /// ordered by id.
    pub fn available_mechanics(&self, skill: Option<Skill>) -> Result<Vec<MechanicRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MECHANIC_COLUMNS} FROM mechanics
             WHERE is_available = 1 AND (?1 IS NULL OR skill = ?1)
             ORDER BY id"
        ))?;
        let rows = stmt.query_map(params![skill.map(Skill::as_str)], mechanic_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Records a mechanic's current position.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no mechanic has this id.
    pub fn update_location(&self, id: i64, location: GeoPoint) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE mechanics
             SET latitude = ?1, longitude = ?2, updated_at = datetime('now')
             WHERE id = ?3",
            params![location.lat, location.lon, id],
        )?;
        if changed == 0 {
            return Err(not_found(id));
        }
        info!("Mechanic {} moved to {}", id, location);
        Ok(())
    }

    /// The assigned or in-progress request a mechanic is working on, if any.
    pub fn active_request(&self, id: i64) -> Result<Option<i64>> {
        Ok(self
            .conn
            .query_row(
                &format!("{ACTIVE_JOBS} ORDER BY id LIMIT 1"),
                params![id],
                |row| row.get(0),
            )
            .optional()?)
    }

    /// Error for an availability change that matched no row.
    fn refused(&self, id: i64) -> StoreError {
        match self.active_request(id) {
            Ok(Some(request_id)) => StoreError::MechanicBusy { id, request_id },
            Ok(None) => not_found(id),
            Err(e) => e,
        }
    }

    /// Sets a mechanic's availability.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no mechanic has this id, and
    /// `StoreError::MechanicBusy` when making available a mechanic who still
    /// holds an assigned or in-progress request.
    pub fn set_availability(&self, id: i64, available: bool) -> Result<()> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE mechanics SET is_available = ?2, updated_at = datetime('now')
                 WHERE id = ?1 AND (?2 = 0 OR NOT EXISTS ({ACTIVE_JOBS}))"
            ),
            params![id, available],
        )?;
        if changed == 0 {
            return Err(self.refused(id));
        }
        info!("Mechanic {} availability set to {}", id, available);
        Ok(())
    }

    /// Flips a mechanic's availability and returns the new value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no mechanic has this id, and
    /// `StoreError::MechanicBusy` when an unavailable mechanic still holds an
    /// assigned or in-progress request.
    pub fn toggle_availability(&self, id: i64) -> Result<bool> {
        let available: Option<bool> = self
            .conn
            .query_row(
                &format!(
                    "UPDATE mechanics
                     SET is_available = NOT is_available, updated_at = datetime('now')
                     WHERE id = ?1 AND (is_available = 1 OR NOT EXISTS ({ACTIVE_JOBS}))
                     RETURNING is_available"
                ),
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        let available = available.ok_or_else(|| self.refused(id))?;
        info!("Mechanic {} availability toggled to {}", id, available);
        Ok(available)
    }
}
