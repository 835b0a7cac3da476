// In-memory complaint collection
// Every mutation is mirrored to the primary backend before returning
use std::collections::HashMap;

use super::gateway::{LoadSource, PersistenceError, PersistenceGateway, PersistenceResult};
use super::models::{Complaint, ComplaintStatus, IssueCategory, MAX_TRACKING_ID};

/// Result of a manual restore from the backup file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    NoBackup,
    Restored(usize),
}

/// Authoritative list of complaints for the running session
pub struct ComplaintStore {
    complaints: Vec<Complaint>,
    next_id: u32,
    gateway: PersistenceGateway,
}

impl ComplaintStore {
    /// Hydrate from the gateway and derive the next tracking ID
    pub fn open(gateway: PersistenceGateway) -> Self {
        let (complaints, source) = gateway.hydrate();
        if source == LoadSource::Empty {
            log::info!("No stored complaints found, starting empty");
        }

        let next_id = next_id_after(&complaints);
        Self {
            complaints,
            next_id,
            gateway,
        }
    }

    /// Record a new complaint and return its tracking ID.
    ///
    /// Returns `None` once every tracking ID has been issued.
    pub fn log_complaint(
        &mut self,
        zone_number: i32,
        details: impl Into<String>,
        category: IssueCategory,
    ) -> Option<u32> {
        let tracking_id = self.next_id;
        if tracking_id > MAX_TRACKING_ID {
            log::error!("Tracking IDs exhausted, complaint not logged");
            return None;
        }
        self.next_id = tracking_id + 1;

        self.complaints
            .push(Complaint::new(tracking_id, zone_number, details.into(), category));
        log::info!("Logged complaint {} ({})", tracking_id, category);

        self.flush();
        Some(tracking_id)
    }

    /// Change the status of a complaint.
    ///
    /// Any status is accepted here; limiting the choices to IN_REVIEW and
    /// CLOSED is left to the caller. Returns false when the ID is unknown.
    pub fn update_status(&mut self, tracking_id: u32, status: ComplaintStatus) -> bool {
        let Some(complaint) = self
            .complaints
            .iter_mut()
            .find(|c| c.tracking_id() == tracking_id)
        else {
            return false;
        };

        complaint.set_status(status);
        log::info!("Complaint {} moved to {}", tracking_id, status);

        self.flush();
        true
    }

    /// All complaints in insertion order
    pub fn list_all(&self) -> &[Complaint] {
        &self.complaints
    }

    pub fn find(&self, tracking_id: u32) -> Option<&Complaint> {
        self.complaints
            .iter()
            .find(|c| c.tracking_id() == tracking_id)
    }

    /// Count open complaints per category.
    /// Categories without open complaints are left out.
    pub fn trend_report(&self) -> HashMap<IssueCategory, usize> {
        let mut counts = HashMap::new();
        for complaint in &self.complaints {
            if complaint.status().is_open() {
                *counts.entry(complaint.category()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// The ID the next logged complaint will receive
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    pub fn save_backup(&self) -> PersistenceResult<()> {
        self.gateway.write_backup(&self.complaints)?;
        log::info!("Backup written with {} complaints", self.complaints.len());
        Ok(())
    }

    /// Replace the collection with the backup file contents.
    ///
    /// A missing or unreadable backup leaves the collection untouched. The
    /// ID counter never moves backwards, so IDs handed out earlier in the
    /// session are not reissued.
    pub fn restore_backup(&mut self) -> PersistenceResult<RestoreOutcome> {
        let Some(complaints) = self.gateway.read_backup()? else {
            return Ok(RestoreOutcome::NoBackup);
        };

        self.next_id = self.next_id.max(next_id_after(&complaints));
        self.complaints = complaints;
        log::info!("Restored {} complaints from backup", self.complaints.len());

        self.flush();
        Ok(RestoreOutcome::Restored(self.complaints.len()))
    }

    /// Flush the database, then write the backup file
    pub fn shutdown(&self) -> Vec<PersistenceError> {
        self.gateway.shutdown(&self.complaints)
    }

    // Write failures leave the in-memory state as the source of truth
    fn flush(&self) {
        if let Err(e) = self.gateway.flush(&self.complaints) {
            log::error!("Error saving data to database: {}", e);
        }
    }
}

fn next_id_after(complaints: &[Complaint]) -> u32 {
    complaints
        .iter()
        .map(Complaint::tracking_id)
        .max()
        .map_or(1, |max| max.saturating_add(1))
}
