//! Domain constants.

/// Default visit duration when the caller does not specify one.
pub const DEFAULT_VISIT_DURATION_MINUTES: u32 = 60;

/// Default slot granularity for the availability calculator.
pub const DEFAULT_SLOT_GRANULARITY_MINUTES: u32 = 30;

/// Default connection pool size for the SQLite store.
pub const DEFAULT_DB_POOL_SIZE: u32 = 8;
