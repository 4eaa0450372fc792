//! Access REST API client wrapper for application and policy operations
//!
//! Every call carries the bearer token and a JSON content type. Non-2xx responses are
//! logged with method, URL and body, then returned as [`AccessError::Status`].

use log::{debug, error};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::access::envelope::ApiEnvelope;
use crate::config::AccessConfig;
use crate::error::{AccessError, AccessResult};
use crate::types::{Application, ApplicationRequest, Policy, PolicyRequest};

const PAGE_SIZE: u32 = 100;

/// Not `Debug`: holds the bearer token.
#[derive(Clone)]
pub struct AccessClient {
    http: Client,
    base_url: String,
    api_token: String,
}

/// A decoded, successful envelope plus the request it answered.
struct Exchange<T> {
    method: Method,
    url: String,
    envelope: ApiEnvelope<T>,
}

impl<T> Exchange<T> {
    fn into_result(self) -> AccessResult<T> {
        self.envelope
            .result
            .ok_or_else(|| AccessError::MissingResult {
                method: self.method.to_string(),
                url: self.url,
            })
    }
}

impl AccessClient {
    pub fn new(config: &AccessConfig) -> AccessResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            base_url: config.access_base_url(),
            api_token: config.api_token().to_string(),
        })
    }

    fn apps_url(&self) -> String {
        format!("{}/apps", self.base_url)
    }

    fn policies_url(&self, app_id: &str) -> String {
        format!("{}/apps/{}/policies", self.base_url, app_id)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.api_token)
            .header(CONTENT_TYPE, "application/json")
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> AccessResult<Exchange<T>> {
        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().to_string();
        debug!("{method} {url}");

        let response = self.http.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("Error {method} {url}: {body}");
            return Err(AccessError::Status {
                method: method.to_string(),
                url,
                status: status.as_u16(),
                body,
            });
        }

        let envelope: ApiEnvelope<T> =
            serde_json::from_str(&body).map_err(|source| AccessError::Decode {
                url: url.clone(),
                source,
            })?;

        if !envelope.success {
            error!("Error {method} {url}: {body}");
            return Err(AccessError::Api {
                method: method.to_string(),
                url,
                errors: envelope.errors,
            });
        }

        Ok(Exchange {
            method,
            url,
            envelope,
        })
    }

    /// Collect every page of a list endpoint, following `result_info.total_pages`.
    async fn list_paged<T: DeserializeOwned>(&self, url: &str) -> AccessResult<Vec<T>> {
        let mut items = Vec::new();
        let mut page: u32 = 1;

        loop {
            let builder = self
                .request(Method::GET, url)
                .query(&[("per_page", PAGE_SIZE), ("page", page)]);
            let exchange = self.execute::<Vec<T>>(builder).await?;
            let total_pages = exchange
                .envelope
                .result_info
                .as_ref()
                .and_then(|info| info.total_pages)
                .unwrap_or(1);
            let batch = exchange.into_result()?;
            let fetched = batch.len();
            items.extend(batch);

            if fetched == 0 || page >= total_pages {
                break;
            }
            page += 1;
        }

        Ok(items)
    }

    /// List every application in the account.
    pub async fn list_applications(&self) -> AccessResult<Vec<Application>> {
        let applications: Vec<Application> = self.list_paged(&self.apps_url()).await?;
        debug!("Listed {} applications", applications.len());
        Ok(applications)
    }

    pub async fn create_application(
        &self,
        request: &ApplicationRequest,
    ) -> AccessResult<Application> {
        let builder = self.request(Method::POST, &self.apps_url()).json(request);
        self.execute(builder).await?.into_result()
    }

    /// List every policy attached to an application.
    pub async fn list_policies(&self, app_id: &str) -> AccessResult<Vec<Policy>> {
        let policies: Vec<Policy> = self.list_paged(&self.policies_url(app_id)).await?;
        debug!("Listed {} policies for {app_id}", policies.len());
        Ok(policies)
    }

    pub async fn create_policy(
        &self,
        app_id: &str,
        request: &PolicyRequest,
    ) -> AccessResult<Policy> {
        let builder = self
            .request(Method::POST, &self.policies_url(app_id))
            .json(request);
        self.execute(builder).await?.into_result()
    }

    /// Replace a policy's fields in place; the policy id is preserved.
    pub async fn update_policy(
        &self,
        app_id: &str,
        policy_id: &str,
        request: &PolicyRequest,
    ) -> AccessResult<Policy> {
        let url = format!("{}/{}", self.policies_url(app_id), policy_id);
        let builder = self.request(Method::PUT, &url).json(request);
        self.execute(builder).await?.into_result()
    }

    pub async fn delete_policy(&self, app_id: &str, policy_id: &str) -> AccessResult<()> {
        let url = format!("{}/{}", self.policies_url(app_id), policy_id);
        let builder = self.request(Method::DELETE, &url);
        // The result only echoes the deleted id.
        self.execute::<serde_json::Value>(builder).await?;
        Ok(())
    }
}
