use reqwest::{IntoUrl, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::services::http::{NotSuccessResponseInfo, ResponseExt};

use super::api::{
    ApiResult, CreateOrganizationResponse, Credentials, LoginResponse, NewOrganization,
    OrganizationsResponse, ProfileResponse, RegisterTokenResponse, RegisterUser,
};

/// Client for the remote authentication service. One method per endpoint,
/// each a single request/response round trip. No retries and no caching.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
}

/// A transport failure or a response with a non-success HTTP status. An
/// API-level `success: false` is a resolved call and is not an `AuthError`.
#[derive(Debug, Clone)]
pub struct AuthError {
    pub http_status: Option<u16>,
    pub error: String,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if let Some(status) = self.http_status {
            write!(f, "{}: {}", status, self.error)
        } else {
            write!(f, "{}", self.error)
        }
    }
}

impl std::error::Error for AuthError {}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        Self {
            http_status: error.status().map(|s| s.as_u16()),
            error: error.to_string(),
        }
    }
}

impl From<NotSuccessResponseInfo> for AuthError {
    fn from(info: NotSuccessResponseInfo) -> Self {
        Self {
            http_status: Some(info.status_code),
            error: info.text,
        }
    }
}

impl AuthClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request<U: IntoUrl>(&self, method: Method, url: U) -> RequestBuilder {
        let req = self
            .http
            .request(method, url)
            .header("Content-Type", "application/json");
        tracing::debug!("Sending http request: {:?}", req);
        req
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        token: Option<&str>,
    ) -> Result<T, AuthError> {
        let url = format!("{}/authentication/{}", self.base_url, endpoint);
        let mut req = self.request(Method::GET, &url);
        if let Some(token) = token {
            // The service expects the raw token value, without a scheme prefix.
            req = req.header("authorization", token);
        }
        let response = req.send().await?.check_success().await?;
        Ok(response.json().await?)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, AuthError> {
        let url = format!("{}/authentication/{}", self.base_url, endpoint);
        let response = self
            .request(Method::POST, &url)
            .json(body)
            .send()
            .await?
            .check_success()
            .await?;
        Ok(response.json().await?)
    }

    /// Request the short-lived token gating the organization listing during
    /// registration.
    pub async fn create_register_token(&self) -> Result<RegisterTokenResponse, AuthError> {
        self.get_json("createRegisterToken", None).await
    }

    pub async fn create_organization(
        &self,
        organization: &NewOrganization,
    ) -> Result<CreateOrganizationResponse, AuthError> {
        self.post_json("createOrganization", organization).await
    }

    pub async fn get_organizations(&self, token: &str) -> Result<OrganizationsResponse, AuthError> {
        self.get_json("getOrganizations", Some(token)).await
    }

    pub async fn register_user(&self, user: &RegisterUser) -> Result<ApiResult, AuthError> {
        self.post_json("register", user).await
    }

    /// Availability check: `success` is true when the username is free.
    pub async fn check_username(&self, username: &str) -> Result<ApiResult, AuthError> {
        self.get_json(&format!("checkUsername/{}", username), None)
            .await
    }

    /// Availability check: `success` is true when the email is free.
    pub async fn check_email(&self, email: &str) -> Result<ApiResult, AuthError> {
        self.get_json(&format!("checkEmail/{}", email), None).await
    }

    /// Availability check: `success` is true when the organization name is free.
    pub async fn check_organization(&self, organizationname: &str) -> Result<ApiResult, AuthError> {
        self.get_json(&format!("checkOrganization/{}", organizationname), None)
            .await
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, AuthError> {
        self.post_json("login", credentials).await
    }

    pub async fn get_profile(&self, token: &str) -> Result<ProfileResponse, AuthError> {
        self.get_json("profile", Some(token)).await
    }
}
