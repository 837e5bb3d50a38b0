use crate::client::{validate, CouchDbClient};
use crate::{assert_not_empty, CouchError, Result};
use couchkit_core::{DbInfo, UriBuilder};
use reqwest::{Method, StatusCode};
use serde::Deserialize;

/// Literal that must be passed to [`DatabaseContext::delete_db`]
pub const DELETE_CONFIRMATION: &str = "delete database";

#[derive(Deserialize)]
struct UuidsResponse {
    uuids: Vec<String>,
}

/// Database-level APIs, borrowed from a [`CouchDbClient`]
pub struct DatabaseContext<'a> {
    client: &'a CouchDbClient,
}

impl<'a> DatabaseContext<'a> {
    pub(crate) fn new(client: &'a CouchDbClient) -> Self {
        Self { client }
    }

    /// Information about the client's database
    pub async fn info(&self) -> Result<DbInfo> {
        self.client.get_json(self.client.db_uri().clone()).await
    }

    /// Create a database; an existing one is left as is
    pub async fn create_db(&self, name: &str) -> Result<()> {
        assert_not_empty(name, "database name")?;
        let uri = UriBuilder::new(self.client.base_uri()).path(name).build();

        let response = self.client.send(Method::PUT, uri, None).await?;
        if response.status() == StatusCode::PRECONDITION_FAILED {
            tracing::debug!("Database {} already exists", name);
            return Ok(());
        }

        validate(response).await?;
        tracing::info!("Created database {}", name);
        Ok(())
    }

    /// Delete a database; `confirm` must be [`DELETE_CONFIRMATION`]
    pub async fn delete_db(&self, name: &str, confirm: &str) -> Result<()> {
        assert_not_empty(name, "database name")?;
        if confirm != DELETE_CONFIRMATION {
            return Err(CouchError::illegal(format!(
                "confirmation must be \"{}\"",
                DELETE_CONFIRMATION
            )));
        }

        let uri = UriBuilder::new(self.client.base_uri()).path(name).build();
        validate(self.client.send(Method::DELETE, uri, None).await?).await?;
        tracing::info!("Deleted database {}", name);
        Ok(())
    }

    /// Names of all databases on the server
    pub async fn all_dbs(&self) -> Result<Vec<String>> {
        let uri = UriBuilder::new(self.client.base_uri())
            .path("_all_dbs")
            .build();
        self.client.get_json(uri).await
    }

    /// Server version string from the welcome document
    pub async fn server_version(&self) -> Result<String> {
        let welcome: serde_json::Value = self
            .client
            .get_json(self.client.base_uri().clone())
            .await?;

        welcome
            .get("version")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or(CouchError::InvalidResponse)
    }

    /// Ask the server for `count` fresh UUIDs
    pub async fn uuids(&self, count: usize) -> Result<Vec<String>> {
        let uri = UriBuilder::new(self.client.base_uri())
            .path("_uuids")
            .query("count", &count.to_string())
            .build();
        let response: UuidsResponse = self.client.get_json(uri).await?;
        Ok(response.uuids)
    }
}
