// Persistence gateway
// Coordinates the relational mirror and the backup snapshot behind one trait
use thiserror::Error;

use super::db::{ComplaintDb, DbError};
use super::models::Complaint;
use super::snapshot::{SnapshotError, SnapshotFile};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Db(#[from] DbError),
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// A place the complaint collection can be mirrored to and read back from.
///
/// Both operations work on the whole collection at once.
pub trait ComplaintBackend {
    /// Short name used in log messages
    fn name(&self) -> &'static str;

    /// Read the stored collection; `Ok(None)` means nothing is stored
    fn load(&self) -> PersistenceResult<Option<Vec<Complaint>>>;

    /// Replace whatever is stored with `complaints`
    fn save(&self, complaints: &[Complaint]) -> PersistenceResult<()>;
}

impl ComplaintBackend for ComplaintDb {
    fn name(&self) -> &'static str {
        "database"
    }

    fn load(&self) -> PersistenceResult<Option<Vec<Complaint>>> {
        let complaints = self.load_all()?;
        Ok(Some(complaints).filter(|c| !c.is_empty()))
    }

    fn save(&self, complaints: &[Complaint]) -> PersistenceResult<()> {
        Ok(self.replace_all(complaints)?)
    }
}

impl ComplaintBackend for SnapshotFile {
    fn name(&self) -> &'static str {
        "backup file"
    }

    fn load(&self) -> PersistenceResult<Option<Vec<Complaint>>> {
        Ok(self.read()?)
    }

    fn save(&self, complaints: &[Complaint]) -> PersistenceResult<()> {
        Ok(self.write(complaints)?)
    }
}

/// Which backend a startup load came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Primary,
    Backup,
    Empty,
}

/// Ordered pair of backends.
///
/// The primary is flushed after every mutation and is trusted first on
/// startup; the backup is only written on request and at shutdown.
pub struct PersistenceGateway {
    primary: Box<dyn ComplaintBackend>,
    backup: Box<dyn ComplaintBackend>,
}

impl PersistenceGateway {
    pub fn new(primary: Box<dyn ComplaintBackend>, backup: Box<dyn ComplaintBackend>) -> Self {
        Self { primary, backup }
    }

    /// Database first, snapshot file as fallback
    pub fn with_defaults(db: ComplaintDb, snapshot: SnapshotFile) -> Self {
        Self::new(Box::new(db), Box::new(snapshot))
    }

    /// Startup load: a non-empty primary wins, otherwise the backup is used.
    /// Failures are logged and treated as "no data".
    pub fn hydrate(&self) -> (Vec<Complaint>, LoadSource) {
        if let Some(complaints) = load_logged(self.primary.as_ref()).filter(|c| !c.is_empty()) {
            log::info!(
                "Loaded {} complaints from {}",
                complaints.len(),
                self.primary.name()
            );
            return (complaints, LoadSource::Primary);
        }

        match load_logged(self.backup.as_ref()) {
            Some(complaints) => {
                log::info!(
                    "Loaded {} complaints from {}",
                    complaints.len(),
                    self.backup.name()
                );
                (complaints, LoadSource::Backup)
            }
            None => (Vec::new(), LoadSource::Empty),
        }
    }

    /// Mirror the collection to the primary backend
    pub fn flush(&self, complaints: &[Complaint]) -> PersistenceResult<()> {
        self.primary.save(complaints)
    }

    pub fn write_backup(&self, complaints: &[Complaint]) -> PersistenceResult<()> {
        self.backup.save(complaints)
    }

    pub fn read_backup(&self) -> PersistenceResult<Option<Vec<Complaint>>> {
        self.backup.load()
    }

    /// Flush the primary, then write the backup.
    /// Both are attempted; every failure is logged and returned.
    pub fn shutdown(&self, complaints: &[Complaint]) -> Vec<PersistenceError> {
        [self.primary.as_ref(), self.backup.as_ref()]
            .into_iter()
            .filter_map(|backend| match backend.save(complaints) {
                Ok(()) => None,
                Err(e) => {
                    log::error!("Failed to save to {} at shutdown: {}", backend.name(), e);
                    Some(e)
                }
            })
            .collect()
    }
}

fn load_logged(backend: &dyn ComplaintBackend) -> Option<Vec<Complaint>> {
    match backend.load() {
        Ok(complaints) => complaints,
        Err(e) => {
            log::error!("Failed to load from {}: {}", backend.name(), e);
            None
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::MemoryBackend;
    use super::*;
    use crate::state::models::IssueCategory;
    use tempfile::TempDir;

    fn complaint(id: u32) -> Complaint {
        Complaint::new(id, 1, format!("Issue {}", id), IssueCategory::OtherMunicipal)
    }

    fn gateway(primary: &MemoryBackend, backup: &MemoryBackend) -> PersistenceGateway {
        PersistenceGateway::new(Box::new(primary.clone()), Box::new(backup.clone()))
    }

    #[test]
    fn test_hydrate_prefers_non_empty_primary() {
        let primary = MemoryBackend::with(vec![complaint(1), complaint(2)]);
        let backup = MemoryBackend::with(vec![complaint(9)]);

        let (complaints, source) = gateway(&primary, &backup).hydrate();

        assert_eq!(source, LoadSource::Primary);
        assert_eq!(complaints.len(), 2);
    }

    #[test]
    fn test_hydrate_falls_back_when_primary_empty() {
        let primary = MemoryBackend::with(Vec::new());
        let backup = MemoryBackend::with(vec![complaint(9)]);

        let (complaints, source) = gateway(&primary, &backup).hydrate();

        assert_eq!(source, LoadSource::Backup);
        assert_eq!(complaints[0].tracking_id(), 9);
    }

    #[test]
    fn test_hydrate_falls_back_when_primary_fails() {
        let primary = MemoryBackend::failing();
        let backup = MemoryBackend::with(vec![complaint(4)]);

        let (_, source) = gateway(&primary, &backup).hydrate();

        assert_eq!(source, LoadSource::Backup);
    }

    #[test]
    fn test_hydrate_with_nothing_stored() {
        let primary = MemoryBackend::default();
        let backup = MemoryBackend::failing();

        let (complaints, source) = gateway(&primary, &backup).hydrate();

        assert_eq!(source, LoadSource::Empty);
        assert!(complaints.is_empty());
    }

    #[test]
    fn test_flush_only_touches_primary() {
        let primary = MemoryBackend::default();
        let backup = MemoryBackend::default();

        gateway(&primary, &backup).flush(&[complaint(1)]).unwrap();

        assert_eq!(primary.save_count(), 1);
        assert_eq!(backup.save_count(), 0);
    }

    #[test]
    fn test_shutdown_saves_both_even_if_primary_fails() {
        let primary = MemoryBackend::failing();
        let backup = MemoryBackend::default();

        let errors = gateway(&primary, &backup).shutdown(&[complaint(1)]);

        assert_eq!(errors.len(), 1);
        assert_eq!(primary.save_count(), 1);
        assert_eq!(backup.contents().unwrap().len(), 1);
    }

    #[test]
    fn test_default_backends_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let db = ComplaintDb::new(temp_dir.path().join("complaints.db"));
        let snapshot = SnapshotFile::new(temp_dir.path().join("backup.json"));
        let gateway = PersistenceGateway::with_defaults(db, snapshot);

        let (complaints, source) = gateway.hydrate();
        assert!(complaints.is_empty());
        assert_eq!(source, LoadSource::Empty);

        let complaints = vec![complaint(1), complaint(2)];
        assert!(gateway.shutdown(&complaints).is_empty());

        let (reloaded, source) = gateway.hydrate();
        assert_eq!(source, LoadSource::Primary);
        assert_eq!(reloaded, complaints);
    }
}
