use crate::error::{EncodeError, Error, TransportError};
use crate::parser::parse_response;
use crate::transport::Transport;
use crate::{Request, ToValue, Value};

use log::{debug, trace};

#[cfg(feature = "http")]
use crate::transport::http::HttpTransport;

/// Performs XML-RPC calls against one endpoint.
///
/// A `Client` holds nothing but the endpoint and the transport, so every call is independent. It
/// can be shared between threads whenever its transport can.
#[derive(Clone, Debug)]
pub struct Client<T> {
    endpoint: String,
    transport: T,
}

#[cfg(feature = "http")]
impl Client<HttpTransport> {
    /// Creates a client that POSTs to `endpoint` using the default [`HttpTransport`].
    ///
    /// This constructor is only available when the `http` feature is enabled (this is the
    /// default).
    pub fn new<S: Into<String>>(endpoint: S) -> Result<Self, reqwest::Error> {
        Ok(Self::with_transport(endpoint, HttpTransport::new()?))
    }
}

impl<T: Transport> Client<T> {
    /// Creates a client that sends its requests through `transport`.
    pub fn with_transport<S: Into<String>>(endpoint: S, transport: T) -> Self {
        Client {
            endpoint: endpoint.into(),
            transport,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Calls the remote procedure `method` with `args` and returns its result.
    ///
    /// Each argument is converted using its [`ToValue`] implementation.
    ///
    /// # Errors
    ///
    /// Fails with `Error::Encode` if an argument has no XML-RPC representation, and otherwise
    /// behaves like [`execute`](#method.execute).
    pub fn call(&self, method: &str, args: &[&dyn ToValue]) -> Result<Value, Error> {
        let request = Request::with_args(method, args)?;
        self.execute(&request)
    }

    /// Performs a prepared [`Request`].
    ///
    /// # Errors
    ///
    /// If the transport fails or the server responds with a non-success status, a
    /// `Error::Transport` is returned and the response body is ignored. This includes replies the
    /// transport itself refuses, such as an [`HttpTransport`] reply whose `Content-Type` is not
    /// XML (`TransportError::Failed`). A body that is not a valid
    /// XML-RPC response results in `Error::MalformedResponse`, and a `<fault>` response in
    /// `Error::Fault`.
    ///
    /// [`HttpTransport`]: crate::http::HttpTransport
    pub fn execute(&self, request: &Request) -> Result<Value, Error> {
        let mut body = Vec::new();
        request
            .write_as_xml(&mut body)
            .map_err(EncodeError::Io)?;

        debug!(
            "calling `{}` with {} argument(s) at {}",
            request.name(),
            request.args().len(),
            self.endpoint
        );
        trace!("request body: {}", String::from_utf8_lossy(&body));

        let reply = self
            .transport
            .transmit(&self.endpoint, body)
            .map_err(TransportError::Failed)?;

        if !(200..300).contains(&reply.status) {
            debug!("`{}` rejected with status {}", request.name(), reply.status);
            return Err(TransportError::Status(reply.status).into());
        }

        match parse_response(reply.body)? {
            Ok(value) => {
                trace!("`{}` returned {:?}", request.name(), value.kind());
                Ok(value)
            }
            Err(fault) => {
                debug!("`{}` failed with fault {}", request.name(), fault);
                Err(fault.into())
            }
        }
    }
}
