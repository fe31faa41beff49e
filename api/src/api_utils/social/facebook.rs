use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use abi::config::FacebookConfig;
use abi::errors::Error;
use abi::model::SocialProfile;

use super::SocialGraph;

const PROFILE_FIELDS: &str = "id,name,first_name,last_name,email";

#[derive(Debug, Clone)]
pub struct FacebookClient {
    client: reqwest::Client,
    graph_url: String,
    page_size: usize,
}

#[derive(Debug, Deserialize)]
struct GraphProfile {
    id: String,
    name: String,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FriendsPage {
    data: Vec<GraphFriend>,
    #[serde(default)]
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
struct GraphFriend {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Paging {
    #[serde(default)]
    next: Option<String>,
}

impl FriendsPage {
    /// a short page is the last one even if the api still hands out a cursor
    fn next_url(&self, page_size: usize) -> Option<&str> {
        if self.data.len() < page_size {
            return None;
        }
        self.paging.as_ref().and_then(|p| p.next.as_deref())
    }
}

impl FacebookClient {
    pub fn new(config: &FacebookConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            graph_url: config.graph_url.trim_end_matches('/').to_string(),
            page_size: config.page_size,
        }
    }

    fn picture_url(&self, id: &str) -> String {
        format!("{}/{}/picture", self.graph_url, id)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, Error> {
        let resp = request
            .send()
            .await
            .map_err(|err| Error::unavailable(format!("facebook: {err}")))?;
        match resp.status() {
            StatusCode::OK => {}
            StatusCode::BAD_REQUEST => {
                let body = resp.text().await.unwrap_or_default();
                debug!("facebook rejected the token: {}", body);
                return Err(Error::bad_request("facebook rejected the access token"));
            }
            status => {
                warn!("facebook answered {}", status);
                return Err(Error::unavailable(format!("facebook answered {status}")));
            }
        }
        resp.json::<T>()
            .await
            .map_err(|err| Error::unavailable(format!("facebook sent an unexpected body: {err}")))
    }
}

#[async_trait]
impl SocialGraph for FacebookClient {
    async fn profile(&self, access_token: &str) -> Result<SocialProfile, Error> {
        let request = self
            .client
            .get(format!("{}/me", self.graph_url))
            .query(&[("access_token", access_token), ("fields", PROFILE_FIELDS)]);
        let profile: GraphProfile = self.get_json(request).await?;
        let image_url = Some(self.picture_url(&profile.id));
        Ok(SocialProfile {
            id: profile.id,
            name: profile.name,
            first_name: profile.first_name,
            last_name: profile.last_name,
            email: profile.email,
            image_url,
        })
    }

    async fn friend_uids(&self, access_token: &str) -> Result<Vec<String>, Error> {
        let limit = self.page_size.to_string();
        let mut request = self
            .client
            .get(format!("{}/me/friends", self.graph_url))
            .query(&[("access_token", access_token), ("limit", limit.as_str())]);

        let mut uids = Vec::new();
        loop {
            let page: FriendsPage = self.get_json(request).await?;
            let next = page.next_url(self.page_size).map(str::to_string);
            uids.extend(page.data.into_iter().map(|friend| friend.id));
            match next {
                // the cursor already carries the token and limit
                Some(url) => request = self.client.get(url),
                None => break,
            }
        }
        debug!("facebook returned {} friends", uids.len());
        Ok(uids)
    }
}
