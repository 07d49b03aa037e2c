//! Authentication module for mailarchiv
//!
//! Acquires Microsoft Graph access tokens via the OAuth2 client
//! credentials flow, matching an app registration with application
//! permissions on the target mailbox.

mod credentials;
mod error;

pub use credentials::{AccessToken, ClientCredentials};
pub use error::{AuthError, AuthResult};

/// Microsoft identity platform endpoints
pub mod microsoft {
    /// Scope requesting every Graph application permission granted to the app
    pub const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

    const AUTHORITY_BASE: &str = "https://login.microsoftonline.com";

    /// v2.0 authorization endpoint for a tenant
    pub fn authorize_url(tenant_id: &str) -> String {
        format!("{}/{}/oauth2/v2.0/authorize", AUTHORITY_BASE, tenant_id)
    }

    /// v2.0 token endpoint for a tenant
    pub fn token_url(tenant_id: &str) -> String {
        format!("{}/{}/oauth2/v2.0/token", AUTHORITY_BASE, tenant_id)
    }
}
