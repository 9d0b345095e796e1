//! Collaborators around the planning core: where tasks and busy periods come
//! from, and where planned tasks go.

pub mod busy_file;
pub mod google;
pub mod reminders;
pub mod task_records;
pub mod traits;

pub use busy_file::JsonFileBusySource;
pub use google::{GoogleBusySource, GoogleCalendar};
pub use reminders::RemindersSource;
pub use task_records::{parse_task_records, JsonFileTaskSource, PriorityScale, TaskRecord};
pub use traits::{
    persist_with_fallback, AssignmentSink, BusySource, PersistedEvent, RejectedRecord, TaskBatch,
    TaskSource,
};

/// Thin wrapper around the OS keyring for credential storage.
pub mod keyring_store {
    const SERVICE: &str = "slotwise";

    pub fn get(key: &str) -> Result<Option<String>, keyring::Error> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.get_password() {
            Ok(pw) => Ok(Some(pw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn set(key: &str, value: &str) -> Result<(), keyring::Error> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        entry.set_password(value)
    }

    pub fn delete(key: &str) -> Result<(), keyring::Error> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e),
        }
    }
}
