//! Authentication and authorization
//!
//! Session resolution and route authorization run as middleware after the
//! origin/CSRF guard. Handlers read the outcome through [`AuthUser`].

pub mod guard;
pub mod identity;
pub mod models;
pub mod session;

pub use guard::{authorization_middleware, classify_path, RouteClass};
pub use identity::{AccountRegistry, GoTrueIdentity, IdentityError, IdentityProvider};
pub use models::{AuthUser, SessionContext};
pub use session::{resolve_session, session_middleware};
