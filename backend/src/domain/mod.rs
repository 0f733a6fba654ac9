//! Domain layer: time arithmetic, shift lifecycle, wages and analytics.

pub mod commands;
pub mod errors;
pub mod lifecycle;
pub mod performance_service;
pub mod shift_service;
pub mod time;
pub mod wage_service;

pub use errors::{LifecycleError, TimeError};
pub use performance_service::PerformanceService;
pub use shift_service::ShiftService;
pub use wage_service::{WageConfig, WageService};
