//! OAuth2 client credentials flow (RFC 6749 §4.4)
//!
//! Application-permission access to a mailbox: no user interaction,
//! the registered app exchanges its client secret for a Graph-scoped
//! bearer token at the tenant's token endpoint.

use crate::{AuthError, AuthResult};
use oauth2::basic::BasicClient;
use oauth2::{AuthUrl, ClientId, ClientSecret, Scope, TokenResponse, TokenUrl};
use tracing::{debug, info};

/// Registered application identity within a tenant
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    /// Directory (tenant) ID
    pub tenant_id: String,
    /// Application (client) ID
    pub client_id: String,
    /// Client secret issued for the app registration
    pub client_secret: String,
}

/// A bearer token for Graph calls
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AccessToken {
    /// Raw token for the Authorization header
    pub token: String,
    /// Token expiration timestamp (Unix seconds)
    pub expires_at: Option<i64>,
}

impl AccessToken {
    /// Check if the token is expired or about to expire
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                let now = chrono::Utc::now().timestamp();
                // Consider expired if less than 5 minutes remaining
                expires_at - now < 300
            }
            None => false,
        }
    }
}

impl ClientCredentials {
    /// Exchange the client secret for a Graph-scoped access token.
    pub async fn acquire_token(&self) -> AuthResult<AccessToken> {
        if self.tenant_id.is_empty() || self.client_id.is_empty() || self.client_secret.is_empty()
        {
            return Err(AuthError::InvalidConfig(
                "tenant_id, client_id and client_secret must be set".to_string(),
            ));
        }

        let auth_url = AuthUrl::new(crate::microsoft::authorize_url(&self.tenant_id))
            .map_err(|e| AuthError::InvalidConfig(format!("Invalid auth URL: {}", e)))?;
        let token_url = TokenUrl::new(crate::microsoft::token_url(&self.tenant_id))
            .map_err(|e| AuthError::InvalidConfig(format!("Invalid token URL: {}", e)))?;

        let client = BasicClient::new(
            ClientId::new(self.client_id.clone()),
            Some(ClientSecret::new(self.client_secret.clone())),
            auth_url,
            Some(token_url),
        );

        debug!("Requesting client credentials token for tenant {}", self.tenant_id);

        let token_response = client
            .exchange_client_credentials()
            .add_scope(Scope::new(crate::microsoft::GRAPH_SCOPE.to_string()))
            .request_async(oauth2::reqwest::async_http_client)
            .await
            .map_err(|e| AuthError::TokenExchangeFailed(e.to_string()))?;

        let expires_at = token_response
            .expires_in()
            .map(|duration| chrono::Utc::now().timestamp() + duration.as_secs() as i64);

        info!("Obtained Graph access token");

        Ok(AccessToken {
            token: token_response.access_token().secret().clone(),
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_expiration() {
        // Token that expires in 1 hour - should not be expired
        let token = AccessToken {
            token: "test".to_string(),
            expires_at: Some(chrono::Utc::now().timestamp() + 3600),
        };
        assert!(!token.is_expired());

        // Token that expires in 2 minutes - should be expired (less than 5 min buffer)
        let token = AccessToken {
            token: "test".to_string(),
            expires_at: Some(chrono::Utc::now().timestamp() + 120),
        };
        assert!(token.is_expired());

        // Token that already expired
        let token = AccessToken {
            token: "test".to_string(),
            expires_at: Some(chrono::Utc::now().timestamp() - 100),
        };
        assert!(token.is_expired());
    }

    #[tokio::test]
    async fn test_empty_credentials_rejected_before_network() {
        let creds = ClientCredentials {
            tenant_id: String::new(),
            client_id: "app".to_string(),
            client_secret: "secret".to_string(),
        };
        let err = creds.acquire_token().await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidConfig(_)));
    }
}
