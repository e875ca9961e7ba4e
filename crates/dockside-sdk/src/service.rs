use std::collections::HashMap;

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::client::{Client, decode, trim_id};
use crate::context::Context;
use crate::error::Error;
use crate::query::Query;

/// Options of [`Client::service_inspect_with_raw`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ServiceInspectOptions {
    /// Fill in default values for fields the user left unset
    pub insert_defaults: bool,
}

/// Swarm service
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Version", default)]
    pub version: Version,
    #[serde(rename = "CreatedAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "UpdatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(rename = "Spec", default)]
    pub spec: ServiceSpec,
}

/// Object version, used for optimistic concurrency on updates
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    #[serde(rename = "Index", default)]
    pub index: u64,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServiceSpec {
    pub name: String,
    pub labels: HashMap<String, String>,
}

impl Client {
    /// Returns the service information and the raw response body
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn doc() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    /// use dockside_sdk::{Client, Context, ServiceInspectOptions};
    ///
    /// let client = Client::from_config(&dockside_config::Engine::default())?;
    /// let (service, _raw) = client
    ///     .service_inspect_with_raw(
    ///         &Context::background(),
    ///         "web",
    ///         ServiceInspectOptions::default(),
    ///     )
    ///     .await?;
    /// assert_eq!(service.spec.name, "web");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn service_inspect_with_raw(
        &self,
        ctx: &Context,
        service_id: &str,
        options: ServiceInspectOptions,
    ) -> Result<(Service, Vec<u8>), Error> {
        let service_id = trim_id("service", service_id)?;

        let request = self
            .request(Method::GET, &["services", service_id])
            .with_query(
                Query::new()
                    .flag("insertDefaults", options.insert_defaults)
                    .into_pairs(),
            );

        let response = self.send(ctx, request).await?;
        let service = decode(&response.body)?;

        Ok((service, response.body))
    }

    /// Removes a service
    pub async fn service_remove(&self, ctx: &Context, service_id: &str) -> Result<(), Error> {
        let service_id = trim_id("service", service_id)?;

        let request = self.request(Method::DELETE, &["services", service_id]);

        self.send(ctx, request).await?;

        Ok(())
    }
}
