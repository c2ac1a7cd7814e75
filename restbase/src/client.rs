use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::{Query, RestbaseURL};

/// Client for the REST endpoints of the backend-as-a-service.
///
/// Requests carry the project API key and, when set, the signed-in user's
/// access token so row-level security applies to that user.
#[derive(Debug, Clone)]
pub struct RestbaseClient {
    http: reqwest::Client,
    base_url: RestbaseURL,
    api_key: String,
    access_token: Option<String>,
}

impl RestbaseClient {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, RestbaseError> {
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: RestbaseURL::parse(base_url)?,
            api_key: api_key.into(),
            access_token: None,
        })
    }

    /// Clone of this client acting on behalf of a signed-in user.
    pub fn with_access_token(&self, access_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            ..self.clone()
        }
    }

    pub(crate) fn base_url(&self) -> &RestbaseURL {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub(crate) fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        request.header("apikey", &self.api_key).bearer_auth(bearer)
    }

    pub(crate) async fn send(
        &self,
        request: RequestBuilder,
        call_name: &str,
    ) -> Result<Response, RestbaseError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| RestbaseError::Transport(format!("{call_name}: {e}")))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(RestbaseError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(call_name, %status, "restbase call failed");
            return Err(RestbaseError::from_response(status, body));
        }

        Ok(response)
    }

    async fn parse<T: DeserializeOwned>(
        response: Response,
        call_name: &str,
    ) -> Result<T, RestbaseError> {
        response.json::<T>().await.map_err(|e| {
            RestbaseError::Parsing(format!("Failed to parse {call_name} response as JSON: {e}"))
        })
    }

    /// Run a filtered select and return every matching row.
    pub async fn select<T: DeserializeOwned>(&self, query: &Query) -> Result<Vec<T>, RestbaseError> {
        let url = self.base_url.table(query.table()).with_query(query);
        let call_name = format!("GET {}", query.table());
        let response = self
            .send(self.http.get(url.as_url().clone()), &call_name)
            .await?;
        Self::parse(response, &call_name).await
    }

    /// Like [`select`](Self::select) but expects at most one row.
    pub async fn select_one<T: DeserializeOwned>(
        &self,
        query: Query,
    ) -> Result<Option<T>, RestbaseError> {
        let rows: Vec<T> = self.select(&query.limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    /// Insert a row and return its stored representation.
    pub async fn insert<B, T>(&self, table: &str, body: &B) -> Result<T, RestbaseError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.base_url.table(table);
        let call_name = format!("POST {table}");
        let request = self
            .http
            .post(url.as_url().clone())
            .header("Prefer", "return=representation")
            .json(&[body]);
        let response = self.send(request, &call_name).await?;

        let rows: Vec<T> = Self::parse(response, &call_name).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RestbaseError::Parsing(format!("{call_name} returned no rows")))
    }

    /// Patch the row with the given id. Fails with `NotFound` when no row matched.
    pub async fn update<B>(&self, table: &str, id: &str, body: &B) -> Result<(), RestbaseError>
    where
        B: Serialize + ?Sized,
    {
        let url = self
            .base_url
            .table(table)
            .with_pairs(vec![("id".to_string(), format!("eq.{id}"))]);
        let call_name = format!("PATCH {table}");
        let request = self
            .http
            .patch(url.as_url().clone())
            .header("Prefer", "return=representation")
            .json(body);
        let response = self.send(request, &call_name).await?;

        let rows: Vec<serde_json::Value> = Self::parse(response, &call_name).await?;
        if rows.is_empty() {
            return Err(RestbaseError::NotFound(format!("{table}/{id}")));
        }
        Ok(())
    }

    pub async fn delete(&self, table: &str, id: &str) -> Result<(), RestbaseError> {
        let url = self
            .base_url
            .table(table)
            .with_pairs(vec![("id".to_string(), format!("eq.{id}"))]);
        let call_name = format!("DELETE {table}");
        self.send(self.http.delete(url.as_url().clone()), &call_name)
            .await?;
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum RestbaseError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("{message} (status {status})")]
    Response { status: u16, message: String },
    #[error("TransportError: {0}")]
    Transport(String),
    #[error("ParsingError: {0}")]
    Parsing(String),
    #[error("ConfigurationError: {0}")]
    Configuration(String),
}

impl RestbaseError {
    /// Error for a failed response. Permission failures (403) stay a
    /// `Response` so the caller sees the store's own message.
    fn from_response(status: StatusCode, body: String) -> Self {
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or(body);
        Self::Response {
            status: status.as_u16(),
            message,
        }
    }
}

/// Error payload returned by PostgREST and the auth endpoints.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.message.or(self.msg).or(self.error_description)
    }
}

#[cfg(test)]
mod tests {
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    use super::*;

    /// Serve a single canned HTTP response and return the base URL.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut buf = vec![0u8; 8192];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket
                .write_all(response.as_bytes())
                .await
                .expect("write response");
            let _ = socket.shutdown().await;
            while matches!(socket.read(&mut buf).await, Ok(n) if n > 0) {}
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn forbidden_write_keeps_the_store_message() {
        let url = serve_once(
            "403 Forbidden",
            r#"{"code":"42501","message":"permission denied for table atividades"}"#,
        )
        .await;
        let client = RestbaseClient::new(&url, "anon")
            .expect("client")
            .with_access_token("jwt");

        let err = client
            .update("atividades", "t1", &serde_json::json!({ "status": "done" }))
            .await
            .expect_err("forbidden");

        match err {
            RestbaseError::Response { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "permission denied for table atividades");
            }
            other => panic!("expected a response error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn expired_token_is_unauthorized() {
        let url = serve_once("401 Unauthorized", r#"{"message":"JWT expired"}"#).await;
        let client = RestbaseClient::new(&url, "anon")
            .expect("client")
            .with_access_token("jwt");

        let err = client
            .delete("atividades", "t1")
            .await
            .expect_err("unauthorized");
        assert!(matches!(err, RestbaseError::Unauthorized));
    }

    #[test]
    fn plain_text_error_bodies_are_kept_verbatim() {
        let err = RestbaseError::from_response(StatusCode::BAD_REQUEST, "bad filter".to_string());
        assert_eq!(err.to_string(), "bad filter (status 400)");
    }
}
