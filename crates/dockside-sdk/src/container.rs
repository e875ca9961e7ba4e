use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::client::{Client, decode, trim_id};
use crate::context::Context;
use crate::error::Error;
use crate::query::Query;

/// Options of [`Client::container_remove`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RemoveOptions {
    /// Remove anonymous volumes attached to the container
    pub remove_volumes: bool,
    /// Remove the link instead of the container
    pub remove_links: bool,
    /// Kill a running container before removing it
    pub force: bool,
}

impl RemoveOptions {
    fn to_query(self) -> Query {
        Query::new()
            .flag("v", self.remove_volumes)
            .flag("force", self.force)
            .flag("link", self.remove_links)
    }
}

/// Low-level information about a container
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerJson {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub state: Option<ContainerState>,
    #[serde(default)]
    pub restart_count: u64,
}

/// Runtime state of a container as reported by inspect
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ContainerState {
    pub status: String,
    pub running: bool,
    pub paused: bool,
    pub exit_code: i64,
    pub pid: i64,
}

impl Client {
    /// Removes a container
    ///
    /// Sends `DELETE /containers/{id}`, each set option becomes a `key=1` query
    /// parameter.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn doc() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    /// use dockside_sdk::{Client, Context, RemoveOptions};
    ///
    /// let client = Client::from_config(&dockside_config::Engine::default())?;
    /// client
    ///     .container_remove(
    ///         &Context::background(),
    ///         "my-container",
    ///         RemoveOptions {
    ///             force: true,
    ///             ..RemoveOptions::default()
    ///         },
    ///     )
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn container_remove(
        &self,
        ctx: &Context,
        container_id: &str,
        options: RemoveOptions,
    ) -> Result<(), Error> {
        let container_id = trim_id("container", container_id)?;

        let request = self
            .request(Method::DELETE, &["containers", container_id])
            .with_query(options.to_query().into_pairs());

        self.send(ctx, request).await?;

        Ok(())
    }

    /// Returns the container information and the raw response body
    ///
    /// `size` asks the engine to also compute the container's filesystem size.
    pub async fn container_inspect_with_raw(
        &self,
        ctx: &Context,
        container_id: &str,
        size: bool,
    ) -> Result<(ContainerJson, Vec<u8>), Error> {
        let container_id = trim_id("container", container_id)?;

        let request = self
            .request(Method::GET, &["containers", container_id, "json"])
            .with_query(Query::new().flag("size", size).into_pairs());

        let response = self.send(ctx, request).await?;
        let container = decode(&response.body)?;

        Ok((container, response.body))
    }

    pub async fn container_inspect(
        &self,
        ctx: &Context,
        container_id: &str,
    ) -> Result<ContainerJson, Error> {
        let (container, _) = self
            .container_inspect_with_raw(ctx, container_id, false)
            .await?;

        Ok(container)
    }
}
