//! Metric name constants to avoid typos across call sites.

/// Reserved slots per dimension (gauge, labels: dimension).
pub const ADMISSION_RESERVED_SLOTS: &str = "admission_reserved_slots";
/// Active slots per dimension (gauge, labels: dimension).
pub const ADMISSION_ACTIVE_SLOTS: &str = "admission_active_slots";
/// Admission decisions total (counter, labels: outcome).
pub const ADMISSION_DECISIONS_TOTAL: &str = "admission_decisions_total";
/// Time spent waiting for capacity before a grant (histogram, seconds).
pub const ADMISSION_WAIT_SECONDS: &str = "admission_wait_seconds";
