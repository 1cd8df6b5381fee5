//! HTTP client for Todoist REST requests.
//!
//! Wraps `reqwest` with bearer authentication, a request timeout and the
//! mapping of error statuses to `TodoistError`.

use super::TodoistError;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

/// Longest slice of an error body kept in `TodoistError::Api`.
const MAX_ERROR_BODY: usize = 200;

/// Makes requests to Todoist and tries to conform response data to given type.
///
pub struct Client {
    access_token: String,
    base_url: String,
    http_client: reqwest::Client,
}

impl Client {
    /// Returns a new instance for the given access token and base URL.
    ///
    pub fn new(access_token: &str, base_url: &str, timeout: Duration) -> Result<Self, TodoistError> {
        Ok(Client {
            access_token: access_token.trim().to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            http_client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }

    /// Return the decoded body of `GET {path}`.
    ///
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, TodoistError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        decode(response).await
    }

    /// Return the decoded body of `POST {path}` with a JSON body.
    ///
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, TodoistError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.request(Method::POST, path).json(body))
            .await?;
        decode(response).await
    }

    /// `POST {path}` ignoring whatever the response carries.
    ///
    pub async fn post_discarding<B>(&self, path: &str, body: Option<&B>) -> Result<(), TodoistError>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self.request(Method::POST, path);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(request).await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        log::trace!("Todoist {} {}", method, url);
        self.http_client
            .request(method, &url)
            .header("Authorization", format!("Bearer {}", &self.access_token))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, TodoistError> {
        let response = request.send().await?;
        check(response).await
    }
}

/// Map error statuses to their `TodoistError` counterpart.
///
async fn check(response: Response) -> Result<Response, TodoistError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    log::warn!("Todoist request to {} failed with {}", response.url().path(), status);
    Err(match status {
        StatusCode::UNAUTHORIZED => TodoistError::Unauthorized,
        StatusCode::NOT_FOUND => TodoistError::NotFound,
        StatusCode::TOO_MANY_REQUESTS => TodoistError::RateLimited {
            retry_after: response
                .headers()
                .get("Retry-After")
                .and_then(|value| value.to_str().ok())
                .unwrap_or("unknown")
                .to_string(),
        },
        status if status.is_server_error() => TodoistError::Server {
            status: status.as_u16(),
        },
        status => {
            let text = response.text().await.unwrap_or_default();
            let message = if text.is_empty() {
                status.as_u16().to_string()
            } else {
                text.chars().take(MAX_ERROR_BODY).collect()
            };
            TodoistError::Api {
                status: status.as_u16(),
                message,
            }
        }
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, TodoistError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| {
        log::error!(
            "Failed to deserialize Todoist response: {}. Response body: {}",
            e,
            String::from_utf8_lossy(&bytes)
        );
        TodoistError::from(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::MockServer;
    use serde_json::{json, Value};

    fn client(server: &MockServer) -> Client {
        Client::new("secret", &server.base_url(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn sends_bearer_token() {
        let server = MockServer::start();
        let mock = server
            .mock_async(|when, then| {
                when.method("GET")
                    .path("/projects")
                    .header("Authorization", "Bearer secret");
                then.status(200).json_body(json!([]));
            })
            .await;
        let projects: Vec<Value> = client(&server).get("/projects").await.unwrap();
        assert!(projects.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn maps_error_statuses() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.path("/unauthorized");
            then.status(401);
        });
        server.mock(|when, then| {
            when.path("/limited");
            then.status(429).header("Retry-After", "42");
        });
        server.mock(|when, then| {
            when.path("/down");
            then.status(503);
        });
        server.mock(|when, then| {
            when.path("/missing");
            then.status(404);
        });
        server.mock(|when, then| {
            when.path("/bad");
            then.status(400).body("x".repeat(500));
        });
        let client = client(&server);

        assert!(matches!(
            client.get::<Value>("/unauthorized").await,
            Err(TodoistError::Unauthorized)
        ));
        match client.get::<Value>("/limited").await {
            Err(TodoistError::RateLimited { retry_after }) => assert_eq!(retry_after, "42"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            client.get::<Value>("/down").await,
            Err(TodoistError::Server { status: 503 })
        ));
        assert!(matches!(
            client.get::<Value>("/missing").await,
            Err(TodoistError::NotFound)
        ));
        match client.get::<Value>("/bad").await {
            Err(TodoistError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message.len(), MAX_ERROR_BODY);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn post_discarding_accepts_no_content() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("POST").path("/tasks/7/close");
            then.status(204);
        });
        client(&server)
            .post_discarding::<Value>("/tasks/7/close", None)
            .await
            .unwrap();
        mock.assert();
    }
}
