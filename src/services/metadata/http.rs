//! HTTP metadata backend
//!
//! Talks to `GET {base_url}/items` with `limit`, `parentId`, `cursor` and
//! `onlyFolders` query parameters. The blocking ureq call runs on tokio's
//! blocking pool.

use super::backend::{FetchError, ListPage, ListRequest, MetadataBackend};
use crate::model::RawPage;
use crate::services::auth::AuthContext;
use async_trait::async_trait;
use std::time::Duration;

pub struct HttpBackend {
    agent: ureq::Agent,
    base_url: String,
    auth: AuthContext,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration, auth: AuthContext) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth,
        }
    }

    fn items_url(&self) -> String {
        format!("{}/items", self.base_url)
    }

    fn list_blocking(
        agent: &ureq::Agent,
        url: &str,
        auth: &AuthContext,
        request: &ListRequest,
    ) -> Result<ListPage, FetchError> {
        let mut call = agent
            .get(url)
            .query("limit", &request.limit.to_string())
            .set("Accept", "application/json");
        if let Some(parent_id) = &request.parent_id {
            call = call.query("parentId", parent_id.as_str());
        }
        if let Some(cursor) = &request.cursor {
            call = call.query("cursor", cursor);
        }
        if request.only_folders {
            call = call.query("onlyFolders", "true");
        }
        if let Some(header) = auth.bearer_header() {
            call = call.set("Authorization", &header);
        }

        let response = call.call().map_err(map_ureq_error)?;
        let body = response
            .into_string()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        let raw: RawPage =
            serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))?;

        let (items, next_cursor, total_count) = raw.into_parts();
        Ok(ListPage::new(items)
            .with_next_cursor(next_cursor)
            .with_total_count(total_count))
    }
}

fn map_ureq_error(error: ureq::Error) -> FetchError {
    match error {
        ureq::Error::Status(401 | 403, _) => FetchError::Unauthorized,
        ureq::Error::Status(code, response) => FetchError::Status {
            code,
            message: response.status_text().to_string(),
        },
        ureq::Error::Transport(transport) => FetchError::Network(transport.to_string()),
    }
}

#[async_trait]
impl MetadataBackend for HttpBackend {
    async fn list(&self, request: &ListRequest) -> Result<ListPage, FetchError> {
        let agent = self.agent.clone();
        let url = self.items_url();
        let auth = self.auth.clone();
        let request = request.clone();

        tracing::debug!(
            "GET {} parent={:?} cursor={:?}",
            url,
            request.parent_id,
            request.cursor
        );
        tokio::task::spawn_blocking(move || Self::list_blocking(&agent, &url, &auth, &request))
            .await
            .map_err(|_| FetchError::Cancelled)?
    }
}
