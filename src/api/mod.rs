//! REST client for the feedback backend.
//!
//! Two calls: `GET {base}/feedbacks` and `POST {base}/feedbacks`. Any non-2xx
//! status is an error. No request timeout is set; the transport decides.

mod error;
mod model;

pub use error::ApiError;
pub use model::{EntryId, FeedbackEntry, NewFeedback};

use reqwest::{Client, Response, Url};

const USER_AGENT: &str = concat!("feedback-collector/", env!("CARGO_PKG_VERSION"));
const FEEDBACKS_PATH: &str = "feedbacks";

#[derive(Clone, Debug)]
pub struct FeedbackApi {
    client: Client,
    feedbacks_url: String,
}

impl FeedbackApi {
    pub fn new(api_base: &str) -> Result<Self, ApiError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Self::with_client(client, api_base)
    }

    pub fn with_client(client: Client, api_base: &str) -> Result<Self, ApiError> {
        let base = Url::parse(api_base)?;
        let feedbacks_url = format!(
            "{}/{}",
            base.as_str().trim_end_matches('/'),
            FEEDBACKS_PATH
        );
        Ok(FeedbackApi {
            client,
            feedbacks_url,
        })
    }

    pub fn feedbacks_url(&self) -> &str {
        &self.feedbacks_url
    }

    /// Every entry the server knows about, in the order the server sent them.
    pub async fn list(&self) -> Result<Vec<FeedbackEntry>, ApiError> {
        log::debug!("api::list {}", self.feedbacks_url);
        let res = self.client.get(&self.feedbacks_url).send().await?;
        let body = parse_body(&self.feedbacks_url, res).await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn create(&self, feedback: &NewFeedback) -> Result<FeedbackEntry, ApiError> {
        log::debug!("api::create {}", self.feedbacks_url);
        let res = self
            .client
            .post(&self.feedbacks_url)
            .json(feedback)
            .send()
            .await?;
        let body = parse_body(&self.feedbacks_url, res).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

async fn parse_body(url: &str, res: Response) -> Result<String, ApiError> {
    let status = res.status();
    let body = res.text().await?;
    log::debug!("url: {url}\nstatus: {status}\nbody: {body}");

    if !status.is_success() {
        return Err(ApiError::status(status, url));
    }
    Ok(body)
}
