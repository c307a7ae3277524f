use anyhow::{Context, Result};

use crate::model::{RemoteConfig, Stack};

mod http;

mod types;
pub use self::types::*;
mod identity;
mod stacks;

pub struct StackClient {
    remote: RemoteConfig,
    client: reqwest::Client,
}

impl StackClient {
    pub fn new(remote: RemoteConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("stackctl")
            .build()
            .context("build reqwest client")?;
        Ok(Self { remote, client })
    }

    pub fn remote(&self) -> &RemoteConfig {
        &self.remote
    }
}
