use crate::config::BackendConfig;
use crate::errors::BackendError;
use crate::models::{Credentials, CsrfResponse, CurrentUser, NotificationRecord};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Client for the booking API. Session auth rides on cookies, so one
/// instance should be shared for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    pub async fn fetch_activity(&self) -> Result<Vec<NotificationRecord>, BackendError> {
        let response = self.send(Method::GET, "recent-activity/").await?;
        let raw: Vec<Value> = response.json().await?;

        let mut records = Vec::with_capacity(raw.len());
        for entry in raw {
            match serde_json::from_value::<NotificationRecord>(entry) {
                Ok(record) => records.push(record),
                Err(err) => warn!("skipping malformed activity record: {err}"),
            }
        }
        debug!(count = records.len(), "fetched recent activity");
        Ok(records)
    }

    pub async fn approve(&self, id: i64) -> Result<(), BackendError> {
        self.send(Method::POST, &format!("recent-activity/{id}/approve/"))
            .await?;
        Ok(())
    }

    /// Declines the pending change; the backend reverts the appointment.
    pub async fn decline(&self, id: i64) -> Result<(), BackendError> {
        self.send(Method::POST, &format!("recent-activity/{id}/decline/"))
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<(), BackendError> {
        self.send(Method::DELETE, &format!("recent-activity/{id}/delete/"))
            .await?;
        Ok(())
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<CurrentUser, BackendError> {
        let request = self.request(Method::POST, "login/").await?;
        check(Method::POST, "login/", request.json(credentials).send().await?)?;
        self.current_user().await
    }

    pub async fn current_user(&self) -> Result<CurrentUser, BackendError> {
        let response = self.send(Method::GET, "user/").await?;
        Ok(response.json().await?)
    }

    /// `None` when the backend has no token to give; callers proceed
    /// without the header and let the backend decide.
    pub async fn csrf_token(&self) -> Result<Option<String>, BackendError> {
        let url = self.base_url.join("csrf/")?;
        let response = check(Method::GET, "csrf/", self.http.get(url).send().await?)?;
        let body: CsrfResponse = response.json().await?;
        Ok(body.csrf_token)
    }

    async fn send(&self, method: Method, path: &str) -> Result<Response, BackendError> {
        let request = self.request(method.clone(), path).await?;
        check(method, path, request.send().await?)
    }

    async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, BackendError> {
        let url = self.base_url.join(path)?;
        let mut request = self.http.request(method.clone(), url);

        if is_mutating(&method) {
            match self.csrf_token().await {
                Ok(Some(token)) => request = request.header(CSRF_HEADER, token),
                Ok(None) => warn!("backend returned no csrf token for {method} {path}"),
                Err(err) => warn!("failed to fetch csrf token for {method} {path}: {err}"),
            }
        }

        Ok(request)
    }
}

fn is_mutating(method: &Method) -> bool {
    [Method::POST, Method::PUT, Method::PATCH, Method::DELETE].contains(method)
}

fn check(method: Method, path: &str, response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(BackendError::Status {
        method: method.to_string(),
        path: path.to_string(),
        status,
    })
}
