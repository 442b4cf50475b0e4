use crate::error::BoxError;

use std::io::Read;

/// What a [`Transport`] got back from the server.
#[derive(Debug)]
pub struct Reply<S> {
    /// The status code of the response (HTTP semantics: `200..300` is success).
    pub status: u16,
    /// The response body. It is only read when `status` indicates success.
    pub body: S,
}

/// Request and response transport abstraction.
///
/// The `Transport` trait provides a way to send a serialized XML-RPC request to a server and to
/// receive the corresponding response. A `Transport` implementor is owned by a [`Client`], which
/// uses it for every call.
///
/// The most commonly used transport is simple HTTP: If the `http` feature is enabled (it is by
/// default), [`http::HttpTransport`] sends requests with a blocking reqwest client.
///
/// You can implement this trait for your own types if you want to customize how requests are sent.
/// You can modify HTTP headers or wrap requests in a completely different protocol. Since calls
/// only take `&self`, a transport that is `Sync` allows one `Client` to be used from several
/// threads at once.
///
/// [`Client`]: crate::Client
pub trait Transport {
    /// The response stream returned by `transmit`.
    type Stream: Read;

    /// Sends the XML document in `body` to `endpoint` and returns the server's reply.
    ///
    /// The reply body is returned as a `Self::Stream`. The library will read all of the data and
    /// parse it as a response. It must be UTF-8 encoded XML, otherwise the call will fail.
    ///
    /// # Errors
    ///
    /// Network-level failures should be returned as a boxed error. A response with an error status
    /// is *not* an error here: return it as a [`Reply`] and the caller will reject it.
    fn transmit(&self, endpoint: &str, body: Vec<u8>) -> Result<Reply<Self::Stream>, BoxError>;
}

/// Provides an HTTP [`Transport`] and helpers for building custom ones with reqwest.
///
/// This module will be disabled if the `http` feature is not enabled.
///
/// The default implementation in [`HttpTransport`] looks roughly like this:
///
/// ```notrust
/// build_headers(client.post(endpoint), body.len())
///     .body(body)
///     .send()?;
///
/// check_content_type(&response)?;
/// ```
///
/// From this, you can build your own custom transports.
#[cfg(feature = "http")]
pub mod http {
    use super::{Reply, Transport};
    use crate::error::BoxError;

    use log::trace;
    use reqwest::blocking::{Client, RequestBuilder, Response};
    use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};

    use std::time::Duration;

    /// The `User-Agent` sent by default.
    pub const DEFAULT_USER_AGENT: &str = concat!("Rust xmlrpc-client/", env!("CARGO_PKG_VERSION"));

    /// Appends the HTTP headers required by the XML-RPC specification to the `RequestBuilder`.
    ///
    /// More specifically, the following headers are set:
    ///
    /// ```notrust
    /// Content-Type: text/xml; charset=utf-8
    /// Content-Length: $body_len
    /// ```
    ///
    /// The `User-Agent` is configured on the reqwest `Client`.
    pub fn build_headers(builder: RequestBuilder, body_len: u64) -> RequestBuilder {
        // NB: The `Host` header is also required, but reqwest adds it automatically, since
        // HTTP/1.1 requires it.
        builder
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header(CONTENT_LENGTH, body_len)
    }

    /// Checks that a successful reqwest `Response` declares an XML body.
    ///
    /// A missing `Content-Type` is accepted. Responses with an error status are not checked, since
    /// their body is never parsed.
    pub fn check_content_type(response: &Response) -> Result<(), BoxError> {
        if !response.status().is_success() {
            return Ok(());
        }

        // "The Content-Type is text/xml."
        if let Some(content_type) = response.headers().get(CONTENT_TYPE) {
            let content_type = content_type.to_str()?;
            let parsed: mime::Mime = content_type.parse()?;
            if !is_xml(&parsed) {
                return Err(format!("expected Content-Type 'text/xml', got '{}'", content_type).into());
            }
        }

        Ok(())
    }

    fn is_xml(content_type: &mime::Mime) -> bool {
        content_type.subtype() == mime::XML
            && (content_type.type_() == mime::TEXT || content_type.type_() == mime::APPLICATION)
    }

    /// Sends requests as HTTP POSTs with a blocking reqwest `Client`.
    ///
    /// The request will be sent as specified in the XML-RPC specification: A default `User-Agent`
    /// will be set, along with the correct `Content-Type` and `Content-Length`.
    #[derive(Clone, Debug)]
    pub struct HttpTransport {
        client: Client,
    }

    impl HttpTransport {
        /// Creates a transport with the default configuration.
        pub fn new() -> Result<Self, reqwest::Error> {
            Self::builder().build()
        }

        pub fn builder() -> HttpTransportBuilder {
            HttpTransportBuilder {
                user_agent: DEFAULT_USER_AGENT.to_string(),
                timeout: None,
            }
        }

        /// Wraps an already configured reqwest `Client`.
        pub fn from_client(client: Client) -> Self {
            HttpTransport { client }
        }
    }

    /// Configuration for an [`HttpTransport`].
    #[derive(Clone, Debug)]
    pub struct HttpTransportBuilder {
        user_agent: String,
        timeout: Option<Duration>,
    }

    impl HttpTransportBuilder {
        pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
            self.user_agent = user_agent.into();
            self
        }

        /// Sets a deadline for the whole round trip of a call. Without one, calls never time out.
        pub fn timeout(mut self, timeout: Duration) -> Self {
            self.timeout = Some(timeout);
            self
        }

        pub fn build(self) -> Result<HttpTransport, reqwest::Error> {
            let client = Client::builder()
                .user_agent(self.user_agent)
                .timeout(self.timeout)
                .build()?;
            Ok(HttpTransport { client })
        }
    }

    impl Transport for HttpTransport {
        type Stream = Response;

        fn transmit(&self, endpoint: &str, body: Vec<u8>) -> Result<Reply<Self::Stream>, BoxError> {
            let response = build_headers(self.client.post(endpoint), body.len() as u64)
                .body(body)
                .send()?;
            trace!("{} answered with {}", endpoint, response.status());

            check_content_type(&response)?;

            Ok(Reply {
                status: response.status().as_u16(),
                body: response,
            })
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn accepts_xml_content_types() {
            for accepted in ["text/xml", "text/xml; charset=utf-8", "application/xml"] {
                assert!(is_xml(&accepted.parse().unwrap()), "{}", accepted);
            }
            for rejected in ["text/html", "application/json", "text/plain; charset=utf-8"] {
                assert!(!is_xml(&rejected.parse().unwrap()), "{}", rejected);
            }
        }

        #[test]
        fn builder_applies_configuration() {
            let transport = HttpTransport::builder()
                .user_agent("test-agent")
                .timeout(Duration::from_secs(5))
                .build();
            assert!(transport.is_ok());
            assert!(DEFAULT_USER_AGENT.starts_with("Rust xmlrpc-client/"));
        }
    }
}
