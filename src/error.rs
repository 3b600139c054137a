use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt;

/// HTTP method type, re-exported for use with error inspection.
pub use reqwest::Method;
/// HTTP status code type, re-exported for use with error inspection.
pub use reqwest::StatusCode;

/// Coarse classification of every fault this SDK surfaces.
///
/// Transport faults are translated into [`Kind::ConnectionTimeout`], [`Kind::Connection`],
/// [`Kind::Status`] or [`Kind::Transport`] at the adapter boundary, so callers never need to
/// inspect backend specific error types.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// No backend is registered under the requested name
    UnknownClient,
    /// The resolved backend cannot issue requests
    ImproperClient,
    /// The backend gave up waiting for the remote
    ConnectionTimeout,
    /// DNS failure, refused connection or a dropped socket
    Connection,
    /// Non-successful HTTP status
    Status,
    /// Any other transport fault
    Transport,
    /// Response content type outside the JSON and text/HTML families
    UnsupportedContentType,
    /// Malformed JSON body
    JsonDecode,
    /// Text body that is not valid UTF-8
    BytesDecode,
    /// Local filesystem fault while persisting a response
    FileIo,
    /// Persistence path whose extension has no tabular format
    UnsupportedExtension,
    /// Failure while loading, transforming or serializing a table
    Processing,
    /// Streaming endpoint outside the allow-list
    UnknownEndpoint,
    /// The streaming server rejected the credentials
    Auth,
    /// The streaming server reported an error in-band
    Response,
    /// Invalid input or misuse of the SDK by the caller
    Validation,
    /// Error related to WebSocket connections
    WebSocket,
}

#[derive(Debug)]
pub struct Error {
    kind: Kind,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    backtrace: Backtrace,
}

impl Error {
    pub fn with_source<S: StdError + Send + Sync + 'static>(kind: Kind, source: S) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
            backtrace: Backtrace::capture(),
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    pub fn inner(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        let e = self.source.as_deref()?;
        e.downcast_ref::<E>()
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Validation {
            reason: message.into(),
        }
        .into()
    }

    pub fn status<S: Into<String>>(
        status_code: StatusCode,
        method: Method,
        path: String,
        message: S,
    ) -> Self {
        Status {
            status_code,
            method,
            path,
            message: message.into(),
        }
        .into()
    }

    pub fn unknown_client<S: Into<String>>(name: S) -> Self {
        Self::with_source(
            Kind::UnknownClient,
            Message(format!("unknown client '{}'", name.into())),
        )
    }

    pub fn improper_client<S: Into<String>>(name: S) -> Self {
        Self::with_source(
            Kind::ImproperClient,
            Message(format!(
                "client '{}' has no request operation in this build",
                name.into()
            )),
        )
    }

    pub fn processing<S: Into<String>>(message: S) -> Self {
        Self::with_source(Kind::Processing, Message(message.into()))
    }

    pub fn websocket_auth<S: Into<String>>(message: S) -> Self {
        AuthError {
            message: message.into(),
        }
        .into()
    }

    pub fn response<S: Into<String>>(code: Option<i64>, message: S) -> Self {
        ResponseError {
            code,
            message: message.into(),
        }
        .into()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(src) => write!(f, "{:?}: {}", self.kind, src),
            None => write!(f, "{:?}", self.kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

/// Free-form detail for kinds that carry nothing beyond a description.
#[derive(Debug)]
struct Message(String);

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl StdError for Message {}

/// Payload of an HTTP error: the numeric status is always preserved.
#[non_exhaustive]
#[derive(Debug)]
pub struct Status {
    pub status_code: StatusCode,
    pub method: Method,
    pub path: String,
    pub message: String,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error({}) making {} call to {} with {}",
            self.status_code, self.method, self.path, self.message
        )
    }
}

impl StdError for Status {}

#[non_exhaustive]
#[derive(Debug)]
pub struct Validation {
    pub reason: String,
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid: {}", self.reason)
    }
}

impl StdError for Validation {}

#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct UnsupportedContentType {
    pub content_type: String,
}

impl fmt::Display for UnsupportedContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported content type '{}'", self.content_type)
    }
}

impl StdError for UnsupportedContentType {}

#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct UnsupportedExtension {
    pub extension: String,
}

impl fmt::Display for UnsupportedExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported extension '{}'", self.extension)
    }
}

impl StdError for UnsupportedExtension {}

#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct UnknownEndpoint {
    pub endpoint: String,
}

impl fmt::Display for UnknownEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown endpoint '{}'", self.endpoint)
    }
}

impl StdError for UnknownEndpoint {}

/// The streaming server refused the API key.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct AuthError {
    /// Message reported by the server
    pub message: String,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "authorization failed: {}", self.message)
    }
}

impl StdError for AuthError {}

/// An error the streaming server reported in-band on an authorized session.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct ResponseError {
    /// `status_code` (or `status`) field of the message, when numeric
    pub code: Option<i64>,
    /// Message reported by the server
    pub message: String,
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "server error({code}): {}", self.message),
            None => write!(f, "server error: {}", self.message),
        }
    }
}

impl StdError for ResponseError {}

impl From<Validation> for Error {
    fn from(err: Validation) -> Self {
        Error::with_source(Kind::Validation, err)
    }
}

impl From<Status> for Error {
    fn from(err: Status) -> Self {
        Error::with_source(Kind::Status, err)
    }
}

impl From<UnsupportedContentType> for Error {
    fn from(err: UnsupportedContentType) -> Self {
        Error::with_source(Kind::UnsupportedContentType, err)
    }
}

impl From<UnsupportedExtension> for Error {
    fn from(err: UnsupportedExtension) -> Self {
        Error::with_source(Kind::UnsupportedExtension, err)
    }
}

impl From<UnknownEndpoint> for Error {
    fn from(err: UnknownEndpoint) -> Self {
        Error::with_source(Kind::UnknownEndpoint, err)
    }
}

impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        Error::with_source(Kind::Auth, err)
    }
}

impl From<ResponseError> for Error {
    fn from(err: ResponseError) -> Self {
        Error::with_source(Kind::Response, err)
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::with_source(Kind::Validation, e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display_should_keep_code() {
        let error = Error::status(
            StatusCode::FORBIDDEN,
            Method::GET,
            "/api/eod/MCD.US".to_owned(),
            "Forbidden",
        );

        assert_eq!(error.kind(), Kind::Status);
        let status = error.downcast_ref::<Status>().unwrap();
        assert_eq!(status.status_code.as_u16(), 403);
        assert_eq!(
            error.to_string(),
            "Status: error(403 Forbidden) making GET call to /api/eod/MCD.US with Forbidden"
        );
    }

    #[test]
    fn response_error_into_error_should_succeed() {
        let error = Error::response(Some(404), "Symbol error");

        assert_eq!(error.kind(), Kind::Response);
        let inner = error.downcast_ref::<ResponseError>().unwrap();
        assert_eq!(inner.code, Some(404));
        assert_eq!(inner.message, "Symbol error");
    }

    #[test]
    fn unknown_client_should_name_backend() {
        let error = Error::unknown_client("curl");

        assert_eq!(error.kind(), Kind::UnknownClient);
        assert!(error.to_string().contains("'curl'"));
    }
}
