//! # Shift Tracker Backend
//!
//! Computation core for staff shift scheduling: time-interval and wage
//! arithmetic, the shift approval workflow, and task performance
//! analytics. The core is a pure, synchronous library; persistence,
//! identity and rendering are external collaborators reached through the
//! narrow contracts in [`storage::traits`].

use anyhow::Result;

pub mod domain;
pub mod storage;

pub use storage::MemoryConnection;

use domain::wage_service::WageConfig;

/// Main backend struct that orchestrates all services over one
/// storage connection.
pub struct Backend<C: storage::Connection> {
    pub shift_service: domain::ShiftService<C>,
    pub wage_service: domain::WageService<C>,
    pub performance_service: domain::PerformanceService<C>,
}

impl<C: storage::Connection> Backend<C> {
    /// Create a backend over an existing connection with explicit wage
    /// configuration.
    pub fn with_connection(connection: &C, wage_config: WageConfig) -> Self {
        Self {
            shift_service: domain::ShiftService::new(connection),
            wage_service: domain::WageService::new(connection, wage_config),
            performance_service: domain::PerformanceService::new(connection),
        }
    }
}

impl Backend<MemoryConnection> {
    /// Create a backend over a fresh in-memory store with default wage
    /// configuration.
    pub fn new() -> Result<Self> {
        let connection = MemoryConnection::new();
        Ok(Self::with_connection(&connection, WageConfig::default()))
    }
}
