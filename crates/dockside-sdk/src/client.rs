use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::context::Context;
use crate::error::Error;
use crate::transport::{HttpTransport, Request, Response, Transport};

/// HTTP client to access the engine's API
///
/// Holds no per-call state, clones share the transport and can be used from
/// concurrent tasks.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    api_version: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

impl Client {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
            api_version: None,
        }
    }

    /// Creates a client talking HTTP to the engine described by `engine`
    pub fn from_config(
        engine: &dockside_config::Engine,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let base_url = engine.base_url()?;

        let timeout = (engine.timeout_secs > 0).then(|| Duration::from_secs(engine.timeout_secs));
        let transport = HttpTransport::new(&base_url, timeout)?;

        let client = Self::new(transport);

        Ok(match &engine.api_version {
            Some(api_version) => client.with_api_version(api_version),
            None => client,
        })
    }

    /// Prefixes every request path with `/v<api_version>`
    #[must_use]
    pub fn with_api_version(mut self, api_version: &str) -> Self {
        let api_version = api_version.trim().trim_start_matches('v');

        self.api_version = (!api_version.is_empty()).then(|| api_version.to_string());
        self
    }

    pub fn api_version(&self) -> Option<&str> {
        self.api_version.as_deref()
    }

    pub(crate) fn request(&self, method: Method, segments: &[&str]) -> Request {
        let version = self
            .api_version
            .as_ref()
            .map(|api_version| format!("v{api_version}"));

        let segments = version
            .into_iter()
            .chain(segments.iter().map(ToString::to_string))
            .collect();

        Request::new(method, segments)
    }

    /// Sends `request` once and maps non-2xx statuses to typed errors
    pub(crate) async fn send(&self, ctx: &Context, request: Request) -> Result<Response, Error> {
        log::debug!("Sending {} {}", request.method, request.path());

        let response = self.transport.execute(ctx, request).await?;

        check_response(response)
    }
}

/// Validates an object identifier and returns it trimmed
///
/// `.` and `..` are refused too, as a path segment they would address the
/// collection instead of an object.
pub(crate) fn trim_id<'a>(object: &str, id: &'a str) -> Result<&'a str, Error> {
    let id = id.trim();

    if id.is_empty() {
        return Err(Error::InvalidParameter(format!(
            "invalid {object} name or ID: value is empty"
        )));
    }

    if matches!(id, "." | "..") {
        return Err(Error::InvalidParameter(format!(
            "invalid {object} name or ID: '{id}' is not a valid path segment"
        )));
    }

    Ok(id)
}

pub(crate) fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    Ok(serde_json::from_slice(body)?)
}

fn check_response(response: Response) -> Result<Response, Error> {
    if (200..300).contains(&response.status) {
        return Ok(response);
    }

    let status = response.status;
    let message = error_message(&response);

    Err(match status {
        404 => Error::NotFound { message },
        500..=599 => Error::System { status, message },
        _ => Error::Other { status, message },
    })
}

/// Message of an error response, the engine sends `{"message": "..."}`
/// but plain text bodies are passed through as is
fn error_message(response: &Response) -> String {
    if let Ok(ErrorResponse { message }) = serde_json::from_slice(&response.body) {
        return message;
    }

    let text = String::from_utf8_lossy(&response.body).trim().to_string();

    if text.is_empty() {
        let reason = StatusCode::from_u16(response.status)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("Unknown status");

        format!("{} {reason}", response.status)
    } else {
        text
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::transport::MockTransport;

    /// Client whose transport answers a single request with `status` and an error `message`
    pub(crate) fn error_mock(status: u16, message: &str) -> Client {
        let body = serde_json::json!({ "message": message }).to_string();

        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .times(1)
            .returning(move |_, _| Ok(Response::new(status, body.clone())));

        Client::new(transport)
    }

    /// Client whose transport fails the test when called
    pub(crate) fn unreachable_mock() -> Client {
        let mut transport = MockTransport::new();
        transport.expect_execute().never();

        Client::new(transport)
    }

    #[test]
    fn test_trim_id() {
        assert_eq!(
            trim_id("container", "  container_id ").expect("Expected valid id"),
            "container_id"
        );
    }

    #[test]
    fn test_trim_id_empty() {
        for id in ["", "    ", "\t\n"] {
            let err = trim_id("container", id).expect_err("Expected invalid id");

            assert_eq!(err.kind(), ErrorKind::InvalidParameter);
            assert_eq!(err.to_string(), "invalid container name or ID: value is empty");
        }
    }

    #[test]
    fn test_trim_id_dot_segments() {
        for id in [".", " .. "] {
            let err = trim_id("container", id).expect_err("Expected invalid id");

            assert_eq!(err.kind(), ErrorKind::InvalidParameter);
            assert!(err.to_string().contains("is not a valid path segment"));
        }
    }

    #[test]
    fn test_check_response_success() {
        for status in [200, 201, 204] {
            assert!(check_response(Response::new(status, "")).is_ok());
        }
    }

    #[test]
    fn test_check_response_status_mapping() {
        let cases = [
            (404, ErrorKind::NotFound),
            (500, ErrorKind::System),
            (503, ErrorKind::System),
            (400, ErrorKind::Other),
            (409, ErrorKind::Other),
            (304, ErrorKind::Other),
        ];

        for (status, kind) in cases {
            let err = check_response(Response::new(status, "boom")).expect_err("Expected error");

            assert_eq!(err.kind(), kind, "status {status}");
            assert_eq!(err.status(), Some(status));
        }
    }

    #[test]
    fn test_check_response_json_message() {
        // Arrange
        let response = Response::new(404, r#"{"message":"no such container: container_id"}"#);

        // Act
        let err = check_response(response).expect_err("Expected error");

        // Assert
        assert_eq!(err.to_string(), "no such container: container_id");
    }

    #[test]
    fn test_check_response_plain_text_message() {
        // Arrange
        let response = Response::new(409, "conflict: container is running\n");

        // Act
        let err = check_response(response).expect_err("Expected error");

        // Assert
        assert!(matches!(
            err,
            Error::Other { status: 409, ref message } if message == "conflict: container is running"
        ));
    }

    #[test]
    fn test_check_response_empty_body() {
        let err = check_response(Response::new(502, "")).expect_err("Expected error");

        assert_eq!(err.to_string(), "502 Bad Gateway");
    }

    #[test]
    fn test_client_request_without_api_version() {
        // Arrange
        let client = Client::new(MockTransport::new());

        // Act
        let request = client.request(Method::GET, &["services", "service_id"]);

        // Assert
        assert_eq!(request.path(), "/services/service_id");
    }

    #[test]
    fn test_client_request_with_api_version() {
        // Arrange
        let client = Client::new(MockTransport::new()).with_api_version("v1.43");

        // Act
        let request = client.request(Method::DELETE, &["containers", "container_id"]);

        // Assert
        assert_eq!(client.api_version(), Some("1.43"));
        assert_eq!(request.path(), "/v1.43/containers/container_id");
    }

    #[test]
    fn test_client_from_config() {
        // Arrange
        let engine = dockside_config::Engine {
            host: String::from("tcp://127.0.0.1:2375"),
            api_version: Some(String::from("1.41")),
            timeout_secs: 10,
        };

        // Act
        let client = Client::from_config(&engine).expect("Failed to create client");

        // Assert
        assert_eq!(client.api_version(), Some("1.41"));
    }

    #[test]
    fn test_client_from_config_invalid_host() {
        // Arrange
        let engine = dockside_config::Engine {
            host: String::from("unix:///var/run/docker.sock"),
            ..dockside_config::Engine::default()
        };

        // Act
        let result = Client::from_config(&engine);

        // Assert
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_client_send_passes_transport_error_through() {
        // Arrange
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .times(1)
            .returning(|_, _| Err(crate::error::TransportError::DeadlineExceeded));
        let client = Client::new(transport);

        // Act
        let result = client
            .send(
                &Context::background(),
                client.request(Method::GET, &["_ping"]),
            )
            .await;

        // Assert
        assert!(matches!(
            result,
            Err(Error::Transport(
                crate::error::TransportError::DeadlineExceeded
            ))
        ));
    }

    async fn setup_server() -> (Client, mockito::ServerGuard) {
        let server = mockito::Server::new_async().await;

        let transport =
            HttpTransport::new(&server.url(), None).expect("Failed to create transport");

        (Client::new(transport).with_api_version("1.43"), server)
    }

    #[tokio::test]
    async fn test_container_remove_over_http() {
        // Arrange
        let (client, mut server) = setup_server().await;

        let server_mock = server
            .mock("DELETE", "/v1.43/containers/container_id")
            .match_query(mockito::Matcher::UrlEncoded(
                String::from("force"),
                String::from("1"),
            ))
            .with_status(204)
            .create_async()
            .await;

        // Act
        let result = client
            .container_remove(
                &Context::background(),
                "container_id",
                crate::container::RemoveOptions {
                    force: true,
                    ..crate::container::RemoveOptions::default()
                },
            )
            .await;

        // Assert
        assert!(result.is_ok());
        server_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_service_inspect_not_found_over_http() {
        // Arrange
        let (client, mut server) = setup_server().await;

        let server_mock = server
            .mock("GET", "/v1.43/services/unknown")
            .with_status(404)
            .with_header("Content-Type", "application/json")
            .with_body(r#"{"message":"service unknown not found"}"#)
            .create_async()
            .await;

        // Act
        let result = client
            .service_inspect_with_raw(
                &Context::background(),
                "unknown",
                crate::service::ServiceInspectOptions::default(),
            )
            .await;

        // Assert
        let err = result.expect_err("Expected not found error");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "service unknown not found");
        server_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_container_inspect_dot_dot_never_reaches_list_endpoint() {
        // Arrange
        let (client, mut server) = setup_server().await;

        let list_mock = server
            .mock("GET", "/v1.43/containers/json")
            .with_status(200)
            .with_body("[]")
            .expect(0)
            .create_async()
            .await;

        // Act
        let result = client
            .container_inspect_with_raw(&Context::background(), "..", false)
            .await;

        // Assert
        assert!(result.expect_err("Expected invalid id").is_invalid_parameter());
        list_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_transport_rejects_dot_dot_request() {
        // Arrange
        let (_, mut server) = setup_server().await;

        let collection_mock = server
            .mock("DELETE", "/containers")
            .with_status(204)
            .expect(0)
            .create_async()
            .await;

        let transport =
            HttpTransport::new(&server.url(), None).expect("Failed to create transport");
        let request = Request::new(
            Method::DELETE,
            vec![String::from("containers"), String::from("..")],
        );

        // Act
        let result = transport.execute(&Context::background(), request).await;

        // Assert
        assert!(matches!(
            result,
            Err(crate::error::TransportError::InvalidUrl(_))
        ));
        collection_mock.assert_async().await;
    }
}
