// crates/lineage-gate-core/src/core/clock.rs
// ============================================================================
// Module: Lineage Gate Clock
// Description: Injectable wall-clock source for capture timestamps.
// Purpose: Keep artifact naming deterministic under test.
// Dependencies: time
// ============================================================================

//! ## Overview
//! The gateway reads wall-clock time exactly once per accepted event, through
//! a [`Clock`]. Hosts use [`SystemClock`]; tests pin time with [`FixedClock`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::OffsetDateTime;

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Source of the current UTC instant.
pub trait Clock: Send + Sync {
    /// Returns the current instant in UTC.
    fn now_utc(&self) -> OffsetDateTime;
}

/// Clock backed by the host wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(OffsetDateTime);

impl FixedClock {
    /// Creates a clock that always reports `instant` (converted to UTC).
    #[must_use]
    pub fn new(instant: OffsetDateTime) -> Self {
        Self(instant.to_offset(time::UtcOffset::UTC))
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> OffsetDateTime {
        self.0
    }
}
