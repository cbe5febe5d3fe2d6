//! Admin authentication: signed bearer tokens, the single admin account and
//! the middleware that guards write routes.

pub mod admin;
pub mod gate;
pub mod token;

pub use admin::AdminAccount;
pub use gate::{extract_bearer_token, require_admin};
pub use token::{AuthError, Claims, TokenService, ADMIN_IDENTITY, TOKEN_EXPIRY_HOURS};
