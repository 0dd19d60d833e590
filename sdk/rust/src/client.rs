use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

/// A stored student as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub marks: f64,
    /// RFC 3339 creation or last-update time.
    pub timestamp: String,
}

/// Body for create and update requests.
#[derive(Debug, Clone, Serialize)]
pub struct NewStudent {
    pub name: String,
    pub marks: f64,
}

impl NewStudent {
    pub fn new(name: impl Into<String>, marks: f64) -> Self {
        Self {
            name: name.into(),
            marks,
        }
    }
}

/// The `{success, data, message, error}` envelope every endpoint returns.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub error: Option<String>,
}

/// HTTP status plus decoded envelope. Error statuses are not turned into
/// `Err`; callers inspect `status` and `body.success`.
#[derive(Debug, Clone)]
pub struct Reply<T> {
    pub status: u16,
    pub body: Envelope<T>,
}

pub struct RecordsClient {
    client: Client,
    base_url: String,
}

impl RecordsClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<Reply<T>, reqwest::Error> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.json::<Envelope<T>>().await?;
        Ok(Reply { status, body })
    }

    pub async fn health(&self) -> Result<Reply<Value>, reqwest::Error> {
        Self::send(self.client.get(self.url("/health"))).await
    }

    pub async fn list(&self) -> Result<Reply<Vec<Student>>, reqwest::Error> {
        Self::send(self.client.get(self.url("/api/students"))).await
    }

    pub async fn get(&self, id: &str) -> Result<Reply<Student>, reqwest::Error> {
        Self::send(self.client.get(self.url(&format!("/api/students/{id}")))).await
    }

    pub async fn create(&self, student: &NewStudent) -> Result<Reply<Student>, reqwest::Error> {
        Self::send(self.client.post(self.url("/api/students")).json(student)).await
    }

    /// Create with an arbitrary JSON body, for exercising validation.
    pub async fn create_raw(&self, body: &Value) -> Result<Reply<Student>, reqwest::Error> {
        Self::send(self.client.post(self.url("/api/students")).json(body)).await
    }

    pub async fn update(&self, id: &str, student: &NewStudent) -> Result<Reply<Student>, reqwest::Error> {
        Self::send(
            self.client
                .put(self.url(&format!("/api/students/{id}")))
                .json(student),
        )
        .await
    }

    pub async fn delete(&self, id: &str) -> Result<Reply<Value>, reqwest::Error> {
        Self::send(self.client.delete(self.url(&format!("/api/students/{id}")))).await
    }

    pub async fn top_performers(&self, limit: Option<u32>) -> Result<Reply<Vec<Student>>, reqwest::Error> {
        let mut request = self.client.get(self.url("/api/top-performers"));
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        Self::send(request).await
    }

    pub async fn search(&self, name: &str) -> Result<Reply<Vec<Student>>, reqwest::Error> {
        Self::send(
            self.client
                .get(self.url("/api/search"))
                .query(&[("name", name)]),
        )
        .await
    }
}
