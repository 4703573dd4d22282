//! contas-core
//!
//! Business logic and services for contas. Depends on contas-domain.
//! No UI and no transport: the managed backend (auth, rows, object storage,
//! change delivery) is reached exclusively through the [`FinanceBackend`]
//! trait, so every flow here is exercisable against an in-memory stand-in.

pub mod backend;
pub mod category_service;
pub mod chart;
pub mod clock;
pub mod error;
pub mod feed;
pub mod filter;
pub mod format;
pub mod session;
pub mod summary;
pub mod transaction_service;

pub use backend::*;
pub use category_service::*;
pub use chart::*;
pub use clock::*;
pub use error::CoreError;
pub use feed::*;
pub use filter::*;
pub use format::*;
pub use session::*;
pub use summary::*;
pub use transaction_service::*;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing with an environment-driven filter.
pub fn init() {
    INIT_TRACING.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::from_default_env().add_directive("contas_core=info".parse().unwrap());

        fmt().with_env_filter(filter).init();
        tracing::info!("contas tracing initialized.");
    });
}
