#[macro_use]
extern crate log;

mod error;
pub use error::{ApiError, SessionError};

mod cookies;
pub use cookies::SessionCookies;

mod session;
pub use session::{Endpoints, Session, SessionManager};

mod metrics;
pub use metrics::{Metric, MetricsSource};
