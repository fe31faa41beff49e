use std::fmt::Debug;

use async_trait::async_trait;

use abi::errors::Error;
use abi::model::SocialProfile;

mod facebook;

pub use facebook::FacebookClient;

/// The social-login provider: who owns a token, and which of their friends
/// authorized the app.
#[async_trait]
pub trait SocialGraph: Send + Sync + Debug {
    async fn profile(&self, access_token: &str) -> Result<SocialProfile, Error>;

    /// provider ids of every friend, all pages
    async fn friend_uids(&self, access_token: &str) -> Result<Vec<String>, Error>;
}

#[cfg(test)]
pub(crate) mod fake {
    use std::collections::HashMap;

    use super::*;

    /// tokens map to canned profiles and friend lists
    #[derive(Debug, Default)]
    pub struct FakeSocialGraph {
        profiles: HashMap<String, SocialProfile>,
        friends: HashMap<String, Vec<String>>,
    }

    impl FakeSocialGraph {
        pub fn with_profile(mut self, token: &str, profile: SocialProfile) -> Self {
            self.profiles.insert(token.to_string(), profile);
            self
        }

        pub fn with_friends(mut self, token: &str, uids: &[&str]) -> Self {
            self.friends
                .insert(token.to_string(), uids.iter().map(|s| s.to_string()).collect());
            self
        }
    }

    #[async_trait]
    impl SocialGraph for FakeSocialGraph {
        async fn profile(&self, access_token: &str) -> Result<SocialProfile, Error> {
            self.profiles
                .get(access_token)
                .cloned()
                .ok_or_else(|| Error::bad_request("invalid access token"))
        }

        async fn friend_uids(&self, access_token: &str) -> Result<Vec<String>, Error> {
            Ok(self.friends.get(access_token).cloned().unwrap_or_default())
        }
    }
}
