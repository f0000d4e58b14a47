//! Dashboard view state and the interactive session around it.

pub mod session;
pub mod state;

pub use session::Session;
pub use state::{Dashboard, DashboardState};
