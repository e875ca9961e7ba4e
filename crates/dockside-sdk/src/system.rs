use reqwest::Method;
use serde::Serialize;

use crate::client::Client;
use crate::context::Context;
use crate::error::Error;

/// Engine information reported by `/_ping` response headers
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Ping {
    pub api_version: Option<String>,
    pub os_type: Option<String>,
    pub experimental: bool,
}

impl Client {
    /// Checks that the engine is reachable
    pub async fn ping(&self, ctx: &Context) -> Result<Ping, Error> {
        let request = self.request(Method::GET, &["_ping"]);

        let response = self.send(ctx, request).await?;

        Ok(Ping {
            api_version: response.header("API-Version").map(ToString::to_string),
            os_type: response.header("OSType").map(ToString::to_string),
            experimental: response.header("Docker-Experimental") == Some("true"),
        })
    }
}
