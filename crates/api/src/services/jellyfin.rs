//! Typed facade over the Jellyfin REST API.
//!
//! One method per upstream operation; non-2xx responses become
//! `JellyfinError::Status` carrying the upstream body. No retries.

use domain::models::jellyfin::{
    AuthenticateByName, AuthenticationResult, CreateUserByName, ItemsResult, JellyfinUser,
    PublicSystemInfo, UserConfiguration, UserPolicy,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Client identification sent on unauthenticated endpoints.
const AUTH_SCHEME: &str = concat!(
    "MediaBrowser Client=\"Finboard\", Device=\"server\", DeviceId=\"finboard\", Version=\"",
    env!("CARGO_PKG_VERSION"),
    "\""
);

#[derive(Debug, thiserror::Error)]
pub enum JellyfinError {
    #[error("No media server connection configured")]
    NotConnected,

    #[error("Request to media server failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Media server returned {status}: {message}")]
    Status { status: u16, message: String },
}

impl From<JellyfinError> for ApiError {
    fn from(err: JellyfinError) -> Self {
        match err {
            JellyfinError::NotConnected => {
                ApiError::ServiceUnavailable("Media server is not connected".into())
            }
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

/// A connected Jellyfin client bound to a base URL and admin access token.
#[derive(Clone)]
pub struct JellyfinClient {
    http: Client,
    base_url: String,
    access_token: Option<String>,
}

impl JellyfinClient {
    /// Client for authenticated admin calls.
    pub fn new(http: Client, base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            http,
            base_url: trim_base_url(base_url.into()),
            access_token: Some(access_token.into()),
        }
    }

    /// Client without credentials, for probing and the initial connect.
    pub fn unauthenticated(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: trim_base_url(base_url.into()),
            access_token: None,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.header("X-Emby-Authorization", AUTH_SCHEME);
        match &self.access_token {
            Some(token) => builder.header("X-Emby-Token", token),
            None => builder,
        }
    }

    async fn expect_json<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, JellyfinError> {
        let response = Self::expect_success(response).await?;
        Ok(response.json().await?)
    }

    async fn expect_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, JellyfinError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        let message = if message.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            message
        };
        Err(JellyfinError::Status {
            status: status.as_u16(),
            message,
        })
    }

    /// `GET /System/Info/Public`. Works without credentials.
    pub async fn public_system_info(&self) -> Result<PublicSystemInfo, JellyfinError> {
        let response = self
            .authorize(self.http.get(self.url("/System/Info/Public")))
            .send()
            .await?;
        Self::expect_json(response).await
    }

    /// `POST /Users/AuthenticateByName`. Used by connect to obtain a token.
    pub async fn authenticate_by_name(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthenticationResult, JellyfinError> {
        let body = AuthenticateByName {
            username: username.to_string(),
            pw: password.to_string(),
        };
        let response = self
            .authorize(self.http.post(self.url("/Users/AuthenticateByName")))
            .json(&body)
            .send()
            .await?;
        Self::expect_json(response).await
    }

    /// `GET /Users`.
    pub async fn list_users(&self) -> Result<Vec<JellyfinUser>, JellyfinError> {
        let response = self.authorize(self.http.get(self.url("/Users"))).send().await?;
        Self::expect_json(response).await
    }

    /// `GET /Users/{id}`. A 404 surfaces as `Status { status: 404 }`.
    pub async fn get_user(&self, user_id: &str) -> Result<JellyfinUser, JellyfinError> {
        let response = self
            .authorize(self.http.get(self.url(&format!("/Users/{user_id}"))))
            .send()
            .await?;
        Self::expect_json(response).await
    }

    /// `POST /Users/New`.
    pub async fn create_user(
        &self,
        name: &str,
        password: &str,
    ) -> Result<JellyfinUser, JellyfinError> {
        let body = CreateUserByName {
            name: name.to_string(),
            password: password.to_string(),
        };
        let response = self
            .authorize(self.http.post(self.url("/Users/New")))
            .json(&body)
            .send()
            .await?;
        Self::expect_json(response).await
    }

    /// `DELETE /Users/{id}`.
    pub async fn delete_user(&self, user_id: &str) -> Result<(), JellyfinError> {
        let response = self
            .authorize(self.http.delete(self.url(&format!("/Users/{user_id}"))))
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    /// `POST /Users/{id}/Policy`.
    pub async fn update_policy(
        &self,
        user_id: &str,
        policy: &UserPolicy,
    ) -> Result<(), JellyfinError> {
        let response = self
            .authorize(self.http.post(self.url(&format!("/Users/{user_id}/Policy"))))
            .json(policy)
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    /// `POST /Users/{id}/Password`.
    pub async fn set_password(&self, user_id: &str, password: &str) -> Result<(), JellyfinError> {
        let body = serde_json::json!({ "NewPw": password, "ResetPassword": false });
        let response = self
            .authorize(
                self.http
                    .post(self.url(&format!("/Users/{user_id}/Password"))),
            )
            .json(&body)
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    /// `POST /Users/{id}/Configuration`.
    pub async fn update_configuration(
        &self,
        user_id: &str,
        configuration: &UserConfiguration,
    ) -> Result<(), JellyfinError> {
        let response = self
            .authorize(
                self.http
                    .post(self.url(&format!("/Users/{user_id}/Configuration"))),
            )
            .json(configuration)
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    /// `GET /Users/{id}/Items?Filters=IsFavorite`.
    pub async fn favorites(&self, user_id: &str) -> Result<ItemsResult, JellyfinError> {
        let response = self
            .authorize(self.http.get(self.url(&format!("/Users/{user_id}/Items"))))
            .query(&[("Filters", "IsFavorite"), ("Recursive", "true")])
            .send()
            .await?;
        Self::expect_json(response).await
    }

    /// `GET /Users/{id}/Items?Filters=IsPlayed`, newest first.
    pub async fn watch_history(&self, user_id: &str) -> Result<ItemsResult, JellyfinError> {
        let response = self
            .authorize(self.http.get(self.url(&format!("/Users/{user_id}/Items"))))
            .query(&[
                ("Filters", "IsPlayed"),
                ("Recursive", "true"),
                ("SortBy", "DatePlayed"),
                ("SortOrder", "Descending"),
            ])
            .send()
            .await?;
        Self::expect_json(response).await
    }

    /// Whether an upstream error is the user-not-found case.
    pub fn is_not_found(err: &JellyfinError) -> bool {
        matches!(
            err,
            JellyfinError::Status { status, .. } if *status == StatusCode::NOT_FOUND.as_u16()
        )
    }
}

fn trim_base_url(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_base_url() {
        assert_eq!(
            trim_base_url("http://media:8096/".to_string()),
            "http://media:8096"
        );
        assert_eq!(
            trim_base_url("http://media:8096".to_string()),
            "http://media:8096"
        );
        assert_eq!(
            trim_base_url("http://media:8096//".to_string()),
            "http://media:8096"
        );
    }

    #[test]
    fn test_is_not_found() {
        let not_found = JellyfinError::Status {
            status: 404,
            message: "missing".into(),
        };
        let server_error = JellyfinError::Status {
            status: 500,
            message: "boom".into(),
        };
        assert!(JellyfinClient::is_not_found(&not_found));
        assert!(!JellyfinClient::is_not_found(&server_error));
    }

    #[test]
    fn test_not_connected_maps_to_service_unavailable() {
        let api_err: ApiError = JellyfinError::NotConnected.into();
        assert!(matches!(api_err, ApiError::ServiceUnavailable(_)));
    }

    #[test]
    fn test_status_maps_to_upstream() {
        let api_err: ApiError = JellyfinError::Status {
            status: 500,
            message: "boom".into(),
        }
        .into();
        assert!(matches!(api_err, ApiError::Upstream(_)));
    }
}
