//! Constants of the persistence layer.

use std::time::Duration;

/// How long a connection waits on a locked database before failing.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// File name of the ledger inside the data directory.
pub const DB_FILE_NAME: &str = "requests.db";
