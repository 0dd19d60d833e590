//! Cloud Firestore backend over the REST v1 API.
//!
//! # Calls
//! - get:    `GET    {documents}/{collection}/{id}`
//! - add:    `POST   {documents}/{collection}`
//! - update: `PATCH  {documents}/{collection}/{id}?updateMask...&currentDocument.exists=true`
//! - delete: `DELETE {documents}/{collection}/{id}`
//! - query:  `POST   {documents}:runQuery` with a `structuredQuery`
//!
//! where `{documents}` is
//! `{base_url}/projects/{project}/databases/{database}/documents`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

use crate::config::FirestoreConfig;
use crate::store::query::{Direction, FilterOp};
use crate::store::{Document, DocumentStore, Fields, Query, StoreError};

pub struct FirestoreStore {
    client: Client,
    documents_url: Url,
    api_key: Option<String>,
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireDocument {
    name: String,
    #[serde(default)]
    fields: Fields,
}

impl WireDocument {
    fn into_document(self) -> Result<Document, StoreError> {
        let id = self
            .name
            .rsplit('/')
            .next()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                StoreError::UnexpectedShape(format!("document name `{}` has no id", self.name))
            })?
            .to_owned();

        Ok(Document {
            id,
            fields: self.fields,
        })
    }
}

#[derive(Serialize)]
struct WriteBody<'a> {
    fields: &'a Fields,
}

#[derive(Debug, Deserialize)]
struct RunQueryItem {
    document: Option<WireDocument>,
}

impl FirestoreStore {
    pub fn new(config: &FirestoreConfig) -> Result<Self, StoreError> {
        if config.project_id.trim().is_empty() {
            return Err(StoreError::Config("firestore project_id is required".into()));
        }

        let mut documents_url = Url::parse(&config.base_url)
            .map_err(|e| StoreError::Config(format!("invalid base_url: {e}")))?;
        documents_url
            .path_segments_mut()
            .map_err(|_| StoreError::Config("base_url cannot be a base URL".into()))?
            .pop_if_empty()
            .extend([
                "projects",
                config.project_id.as_str(),
                "databases",
                config.database.as_str(),
                "documents",
            ]);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            documents_url,
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            access_token: config.access_token.clone().filter(|t| !t.is_empty()),
        })
    }

    /// Root of the documents tree, e.g.
    /// `https://firestore.googleapis.com/v1/projects/p/databases/(default)/documents`.
    pub fn documents_url(&self) -> &Url {
        &self.documents_url
    }

    /// Document or collection URL. Segments are percent-encoded, so an id
    /// containing `/` cannot address a nested path.
    fn url_for(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.documents_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Config("documents URL cannot be a base URL".into()))?
            .extend(segments);
        Ok(url)
    }

    fn run_query_url(&self) -> Result<Url, StoreError> {
        let mut url = self.documents_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Config("documents URL cannot be a base URL".into()))?
            .pop()
            .push("documents:runQuery");
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = match &self.api_key {
            Some(key) => request.query(&[("key", key)]),
            None => request,
        };
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Turn a non-success response into [`StoreError::Backend`].
async fn check(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Backend {
        status: status.as_u16(),
        body,
    })
}

fn filter_op(op: FilterOp) -> &'static str {
    match op {
        FilterOp::LessThan => "LESS_THAN",
        FilterOp::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
        FilterOp::GreaterThan => "GREATER_THAN",
        FilterOp::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
        FilterOp::Equal => "EQUAL",
    }
}

fn direction(direction: Direction) -> &'static str {
    match direction {
        Direction::Ascending => "ASCENDING",
        Direction::Descending => "DESCENDING",
    }
}

/// Translate a [`Query`] into a `runQuery` request body.
fn structured_query(collection: &str, query: &Query) -> Value {
    let mut structured = json!({ "from": [{ "collectionId": collection }] });

    let mut filters: Vec<Value> = query
        .filters
        .iter()
        .map(|filter| {
            json!({
                "fieldFilter": {
                    "field": { "fieldPath": filter.field },
                    "op": filter_op(filter.op),
                    "value": filter.value,
                }
            })
        })
        .collect();
    match filters.len() {
        0 => {}
        1 => structured["where"] = filters.remove(0),
        _ => {
            structured["where"] = json!({
                "compositeFilter": { "op": "AND", "filters": filters }
            })
        }
    }

    if !query.order_by.is_empty() {
        structured["orderBy"] = query
            .order_by
            .iter()
            .map(|order| {
                json!({
                    "field": { "fieldPath": order.field },
                    "direction": direction(order.direction),
                })
            })
            .collect();
    }

    if let Some(limit) = query.limit {
        structured["limit"] = json!(limit);
    }

    json!({ "structuredQuery": structured })
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    fn backend(&self) -> &'static str {
        "firestore"
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let url = self.url_for(&[collection, id])?;
        let response = self.authorize(self.client.get(url)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let document: WireDocument = check(response).await?.json().await?;
        document.into_document().map(Some)
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<Document, StoreError> {
        let url = self.url_for(&[collection])?;
        let response = self
            .authorize(self.client.post(url))
            .json(&WriteBody { fields: &fields })
            .send()
            .await?;

        let document: WireDocument = check(response).await?.json().await?;
        document.into_document()
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<Document, StoreError> {
        let mut url = self.url_for(&[collection, id])?;
        {
            let mut pairs = url.query_pairs_mut();
            for field in fields.keys() {
                pairs.append_pair("updateMask.fieldPaths", field);
            }
            pairs.append_pair("currentDocument.exists", "true");
        }

        let response = self
            .authorize(self.client.patch(url))
            .json(&WriteBody { fields: &fields })
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound {
                collection: collection.to_owned(),
                id: id.to_owned(),
            });
        }

        let document: WireDocument = check(response).await?.json().await?;
        document.into_document()
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let url = self.url_for(&[collection, id])?;
        let response = self.authorize(self.client.delete(url)).send().await?;
        check(response).await?;
        Ok(())
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        let url = self.run_query_url()?;
        let response = self
            .authorize(self.client.post(url))
            .json(&structured_query(collection, query))
            .send()
            .await?;

        let items: Vec<RunQueryItem> = check(response).await?.json().await?;
        items
            .into_iter()
            .filter_map(|item| item.document)
            .map(WireDocument::into_document)
            .collect()
    }
}
