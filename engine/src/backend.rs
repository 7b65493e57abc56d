//! REST client for the backend: officer details and the registration approval workflow.
//!

use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use fleetwatch_formats::{Approval, OfficerDetail, PendingRequests, RegistrationRequest};

use crate::BackendError;

const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Clone, Debug)]
pub struct BackendClient {
    base: Url,
    client: Client,
}

impl BackendClient {
    /// `base` is the backend root URL, e.g. `http://10.0.0.5:8000`.
    ///
    pub fn new(base: &str) -> Result<Self, BackendError> {
        let base = Url::parse(base).map_err(|_| BackendError::BadUrl(base.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(BackendError::BadUrl(base.to_string()));
        }
        let client = Client::builder()
            .user_agent(format!("{NAME}/{VERSION}"))
            .build()?;
        Ok(BackendClient { base, client })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Base URL with `segments` appended, each one escaped.
    ///
    fn url(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::BadUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    #[tracing::instrument(skip(self))]
    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        what: &str,
    ) -> Result<T, BackendError> {
        let url = self.url(segments)?;
        trace!("{method} {url}");

        let resp = self.client.request(method, url.clone()).send().await?;
        match resp.status() {
            s if s.is_success() => Ok(resp.json::<T>().await?),
            StatusCode::NOT_FOUND => Err(BackendError::NotFound(what.to_string())),
            s => Err(BackendError::Status(s.as_u16(), url.path().to_string())),
        }
    }

    /// Full record for one officer.
    ///
    pub async fn officer_details(&self, id: &str) -> Result<OfficerDetail, BackendError> {
        let detail: OfficerDetail = self
            .call(
                Method::GET,
                &["api", "officer", id, "details"],
                &format!("officer {id}"),
            )
            .await?;
        debug!("got details for {}", detail.officer_id);
        Ok(detail)
    }

    /// Registration requests waiting for approval.
    ///
    pub async fn pending_requests(&self) -> Result<Vec<RegistrationRequest>, BackendError> {
        let res: PendingRequests = self
            .call(Method::GET, &["api", "admin", "requests"], "requests")
            .await?;
        debug!("{} pending requests", res.requests.len());
        Ok(res.requests)
    }

    /// Approve a registration request, returns the new officer identifier.
    ///
    pub async fn approve(&self, request_id: &str) -> Result<Approval, BackendError> {
        self.call(
            Method::POST,
            &["api", "admin", "approve", request_id],
            &format!("request {request_id}"),
        )
        .await
    }
}
