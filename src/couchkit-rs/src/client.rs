use crate::context::DatabaseContext;
use crate::{assert_not_empty, CouchError, Result};
use couchkit_core::{generate_id, Config, DocumentMeta, ErrorReason, Response, UriBuilder};
use reqwest::{Client as HttpClient, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Client for a single CouchDB database.
///
/// Document operations live directly on the client; database-level
/// operations are under [`CouchDbClient::context`]. Cloning is cheap and
/// clones share the connection pool.
#[derive(Clone)]
pub struct CouchDbClient {
    config: Config,
    base_uri: Url,
    db_uri: Url,
    client: HttpClient,
}

impl CouchDbClient {
    /// Create a client from `config` without touching the network
    pub fn new(config: Config) -> Result<Self> {
        assert_not_empty(&config.name, "database name")?;

        let base_uri = config.base_uri()?;
        let db_uri = UriBuilder::new(&base_uri).path(&config.name).build();

        let mut builder = HttpClient::builder().pool_max_idle_per_host(config.max_connections);
        if config.socket_timeout_ms > 0 {
            builder = builder.read_timeout(Duration::from_millis(config.socket_timeout_ms));
        }
        if config.connection_timeout_ms > 0 {
            builder = builder.connect_timeout(Duration::from_millis(config.connection_timeout_ms));
        }
        let client = builder.build()?;

        tracing::info!(
            "CouchDB client ready for {} (basic auth: {})",
            db_uri,
            config.has_credentials()
        );

        Ok(Self {
            config,
            base_uri,
            db_uri,
            client,
        })
    }

    /// Create a client, creating the database first when the config asks for it
    pub async fn connect(config: Config) -> Result<Self> {
        let client = Self::new(config)?;
        if client.config.create_db_if_not_exist {
            client.context().create_db(&client.config.name).await?;
        }
        Ok(client)
    }

    /// Load a JSON config file and [`connect`](Self::connect) with it
    pub async fn from_file(path: &str) -> Result<Self> {
        let config = Config::load(path)?;
        Self::connect(config).await
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Server root URI
    pub fn base_uri(&self) -> &Url {
        &self.base_uri
    }

    /// Database URI, `{base}/{name}`
    pub fn db_uri(&self) -> &Url {
        &self.db_uri
    }

    /// Database-level APIs
    pub fn context(&self) -> DatabaseContext<'_> {
        DatabaseContext::new(self)
    }

    /// Find a document by id.
    ///
    /// Fails with [`CouchError::NoDocument`] if it does not exist.
    pub async fn find<T: DeserializeOwned>(&self, id: &str) -> Result<T> {
        assert_not_empty(id, "id")?;
        let uri = UriBuilder::new(&self.db_uri).path(id).build();
        self.get_json(uri).await
    }

    /// Find a specific revision of a document
    pub async fn find_rev<T: DeserializeOwned>(&self, id: &str, rev: &str) -> Result<T> {
        assert_not_empty(id, "id")?;
        assert_not_empty(rev, "rev")?;
        let uri = UriBuilder::new(&self.db_uri)
            .path(id)
            .query("rev", rev)
            .build();
        self.get_json(uri).await
    }

    /// Find a document as untyped JSON
    pub async fn find_json(&self, id: &str) -> Result<Value> {
        self.find(id).await
    }

    /// Find a specific revision of a document as untyped JSON
    pub async fn find_json_rev(&self, id: &str, rev: &str) -> Result<Value> {
        self.find_rev(id, rev).await
    }

    /// Check whether a document with `id` exists
    pub async fn contains(&self, id: &str) -> Result<bool> {
        assert_not_empty(id, "id")?;
        let uri = UriBuilder::new(&self.db_uri).path(id).build();
        let response = self.send(Method::GET, uri, None).await?;

        // the body is never read; dropping the response releases the connection
        match validate(response).await {
            Ok(_) => Ok(true),
            Err(CouchError::NoDocument { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Save a new document.
    ///
    /// A missing `_id` is generated. A document carrying a `_rev` is
    /// rejected; use [`update`](Self::update) for existing documents.
    pub async fn save<T: Serialize + ?Sized>(&self, doc: &T) -> Result<Response> {
        self.put(doc, true).await
    }

    /// Save a document with `batch=ok`, without waiting for it to be committed
    pub async fn batch<T: Serialize + ?Sized>(&self, doc: &T) -> Result<()> {
        let json = serde_json::to_value(doc)?;
        let uri = UriBuilder::new(&self.db_uri).query("batch", "ok").build();

        let response = self.send(Method::POST, uri, Some(&json)).await?;
        if !response.status().is_success() {
            tracing::warn!("Batch write answered with status {}", response.status());
        }
        Ok(())
    }

    /// Update an existing document; it must carry both `_id` and `_rev`
    pub async fn update<T: Serialize + ?Sized>(&self, doc: &T) -> Result<Response> {
        self.put(doc, false).await
    }

    /// Remove a document given its id and revision
    pub async fn remove(&self, id: &str, rev: &str) -> Result<Response> {
        assert_not_empty(id, "id")?;
        assert_not_empty(rev, "revision")?;
        let uri = UriBuilder::new(&self.db_uri)
            .path(id)
            .query("rev", rev)
            .build();
        self.write(Method::DELETE, uri, None).await
    }

    /// Remove a document using the `_id` and `_rev` it carries
    pub async fn remove_doc<T: Serialize + ?Sized>(&self, doc: &T) -> Result<Response> {
        let json = serde_json::to_value(doc)?;
        let meta = document_meta(&json)?;
        self.remove(
            meta.id.as_deref().unwrap_or_default(),
            meta.rev.as_deref().unwrap_or_default(),
        )
        .await
    }

    async fn put<T: Serialize + ?Sized>(&self, doc: &T, new_entity: bool) -> Result<Response> {
        let mut json = serde_json::to_value(doc)?;
        let meta = document_meta(&json)?;

        let id = if new_entity {
            if meta.rev.is_some() {
                return Err(CouchError::illegal(
                    "revision must be empty when saving a new document",
                ));
            }
            let id = meta.id.unwrap_or_else(generate_id);
            if let Some(object) = json.as_object_mut() {
                object.insert("_id".to_string(), Value::String(id.clone()));
                object.remove("_rev");
            }
            id
        } else {
            let id = meta.id.unwrap_or_default();
            assert_not_empty(&id, "id")?;
            assert_not_empty(meta.rev.as_deref().unwrap_or_default(), "revision")?;
            id
        };

        let uri = UriBuilder::new(&self.db_uri).path(&id).build();
        self.write(Method::PUT, uri, Some(&json)).await
    }

    fn request(&self, method: Method, uri: Url) -> RequestBuilder {
        let builder = self.client.request(method, uri);
        match &self.config.username {
            Some(username) if !username.is_empty() => {
                builder.basic_auth(username, self.config.password.as_ref())
            }
            _ => builder,
        }
    }

    pub(crate) async fn send(
        &self,
        method: Method,
        uri: Url,
        body: Option<&Value>,
    ) -> Result<reqwest::Response> {
        tracing::debug!("{} {}", method, uri);

        let mut builder = self.request(method, uri);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        Ok(builder.send().await?)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, uri: Url) -> Result<T> {
        let response = validate(self.send(Method::GET, uri, None).await?).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Issue a write and parse the `{ok, id, rev}` answer
    async fn write(&self, method: Method, uri: Url, body: Option<&Value>) -> Result<Response> {
        let response = validate(self.send(method, uri, body).await?).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Map a non-2xx answer to its error, consuming the body so the
/// connection goes back to the pool
pub(crate) async fn validate(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let reason = ErrorReason::parse(&body).message();

    Err(match status {
        StatusCode::NOT_FOUND => CouchError::NoDocument { reason },
        StatusCode::CONFLICT => CouchError::Conflict { reason },
        _ => CouchError::Server {
            status: status.as_u16(),
            message: if reason.is_empty() { body } else { reason },
        },
    })
}

fn document_meta(json: &Value) -> Result<DocumentMeta> {
    DocumentMeta::from_json(json).map_err(|e| CouchError::illegal(e.to_string()))
}
