//! Response normalization: turns a `(content type, body)` pair into the output a caller asked
//! for.
//!
//! Every response handed out by the HTTP facades passes through [`process`]. The caller picks the
//! result shape with an [`OutputSpec`], written as `kind[:path]`:
//!
//! | Kind | Result | Persistence |
//! |------|--------|-------------|
//! | `raw` | [`Output::Raw`], the untouched body | wire bytes |
//! | `decoded` | [`Output::Json`] or [`Output::Text`] | wire bytes |
//! | `tabular` | [`Output::Table`] | serialized table, format chosen by extension |
//!
//! Only `application/json` and `text/html` bodies are accepted. `application/csv` is treated as
//! `text/html`, which is how the service labels delimited text.
//!
//! ```
//! use eodhd_client_sdk::normalize::{Output, OutputSpec, WriterOptions, process};
//! use eodhd_client_sdk::transport::TransportResponse;
//!
//! let response = TransportResponse::new("text/html", "Date,Open\n2023-01-01,1.0");
//! let spec: OutputSpec = "tabular".parse()?;
//! let options = WriterOptions::builder().reindex(vec!["Date".to_owned()]).build();
//!
//! let Output::Table(table) = process(response, &spec, &options)? else {
//!     unreachable!()
//! };
//! assert_eq!(table.index_names(), ["Date"]);
//! # Ok::<_, eodhd_client_sdk::error::Error>(())
//! ```

#[cfg(feature = "arrow")]
mod columnar;
pub mod format;
pub mod table;
pub mod writer;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde_json::Value;

pub use self::format::Format;
pub use self::table::{Cell, Column, Table};
pub use self::writer::WriterOptions;
use crate::Result;
use crate::error::{Error, Kind, UnsupportedContentType};
use crate::transport::TransportResponse;

const APPLICATION_JSON: &str = "application/json";
const APPLICATION_CSV: &str = "application/csv";
const TEXT_HTML: &str = "text/html";

/// Content families the normalizer understands.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Json,
    Text,
}

impl ContentType {
    /// Classify a media type.
    ///
    /// `application/csv` counts as `text/html`. The service serves delimited text under that
    /// label and downstream branching only knows the two families.
    pub fn classify(content_type: &str) -> Result<Self> {
        let content_type = if content_type == APPLICATION_CSV {
            TEXT_HTML
        } else {
            content_type
        };

        match content_type {
            APPLICATION_JSON => Ok(ContentType::Json),
            TEXT_HTML => Ok(ContentType::Text),
            other => Err(UnsupportedContentType {
                content_type: other.to_owned(),
            }
            .into()),
        }
    }
}

/// Shape of the value returned to the caller.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputKind {
    Raw,
    #[default]
    Decoded,
    Tabular,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputKind::Raw => f.write_str("raw"),
            OutputKind::Decoded => f.write_str("decoded"),
            OutputKind::Tabular => f.write_str("tabular"),
        }
    }
}

impl FromStr for OutputKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "raw" => Ok(OutputKind::Raw),
            "decoded" => Ok(OutputKind::Decoded),
            "tabular" => Ok(OutputKind::Tabular),
            other => Err(Error::validation(format!(
                "unknown output kind '{other}', expected raw, decoded or tabular"
            ))),
        }
    }
}

/// Parsed `kind[:path]` output directive.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutputSpec {
    pub kind: OutputKind,
    /// Persist the result here when set
    pub path: Option<PathBuf>,
}

impl OutputSpec {
    #[must_use]
    pub fn new(kind: OutputKind) -> Self {
        Self { kind, path: None }
    }

    #[must_use]
    pub fn with_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl FromStr for OutputSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (kind, path) = match s.split_once(':') {
            Some((_, "")) => {
                return Err(Error::validation(format!(
                    "output '{s}' has an empty persistence path"
                )));
            }
            Some((kind, path)) => (kind, Some(PathBuf::from(path))),
            None => (s, None),
        };

        Ok(Self {
            kind: kind.parse()?,
            path,
        })
    }
}

impl TryFrom<&str> for OutputSpec {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for OutputSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}:{}", self.kind, path.display()),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// Normalized response.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Raw(Vec<u8>),
    Json(Value),
    Text(String),
    Table(Table),
}

impl Output {
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Output::Raw(bytes) => Some(bytes),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Output::Json(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Output::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Output::Table(table) => Some(table),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_table(self) -> Option<Table> {
        match self {
            Output::Table(table) => Some(table),
            _ => None,
        }
    }
}

/// Normalize `response` according to `spec`.
///
/// `raw` and `decoded` outputs persist the wire bytes. A decode failure is reported before
/// anything is written. `tabular` output persists the transformed table, and the whole file is
/// rendered in memory first so a failure never leaves a partial file behind.
pub fn process(
    response: TransportResponse,
    spec: &OutputSpec,
    options: &WriterOptions,
) -> Result<Output> {
    let content = ContentType::classify(response.content_type())?;
    let body = response.into_body();

    match spec.kind {
        OutputKind::Raw => {
            persist_bytes(spec.path.as_deref(), &body)?;
            Ok(Output::Raw(body))
        }
        OutputKind::Decoded => {
            let output = decode(content, &body)?;
            persist_bytes(spec.path.as_deref(), &body)?;
            Ok(output)
        }
        OutputKind::Tabular => tabulate(content, &body, spec.path.as_deref(), options)
            .map(Output::Table)
            .map_err(|e| match e.kind() {
                Kind::Processing | Kind::UnsupportedExtension => e,
                _ => Error::with_source(Kind::Processing, e),
            }),
    }
}

fn decode(content: ContentType, body: &[u8]) -> Result<Output> {
    match content {
        ContentType::Json => serde_json::from_slice(body)
            .map(Output::Json)
            .map_err(|e| Error::with_source(Kind::JsonDecode, e)),
        ContentType::Text => String::from_utf8(body.to_vec())
            .map(Output::Text)
            .map_err(|e| Error::with_source(Kind::BytesDecode, e)),
    }
}

fn tabulate(
    content: ContentType,
    body: &[u8],
    path: Option<&Path>,
    options: &WriterOptions,
) -> Result<Table> {
    let mut table = match content {
        ContentType::Json => {
            let value: Value = serde_json::from_slice(body)
                .map_err(|e| Error::with_source(Kind::Processing, e))?;
            Table::from_json(&value)?
        }
        ContentType::Text => Table::from_csv(body)?,
    };

    options.apply(&mut table)?;

    if let Some(path) = path {
        let format = Format::from_path(path)?;
        let rendered = format.render(&table, &options.extra)?;
        fs::write(path, rendered).map_err(|e| Error::with_source(Kind::Processing, e))?;
    }

    Ok(table)
}

fn persist_bytes(path: Option<&Path>, body: &[u8]) -> Result<()> {
    match path {
        Some(path) => fs::write(path, body).map_err(|e| Error::with_source(Kind::FileIo, e)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn response(content_type: &str, body: &str) -> TransportResponse {
        TransportResponse::new(content_type, body)
    }

    #[test]
    fn csv_content_type_should_count_as_text() {
        assert_eq!(ContentType::classify("application/csv").unwrap(), ContentType::Text);
        assert_eq!(ContentType::classify("text/html").unwrap(), ContentType::Text);
        assert_eq!(ContentType::classify("application/json").unwrap(), ContentType::Json);

        let err = ContentType::classify("text/plain").unwrap_err();
        assert_eq!(err.kind(), Kind::UnsupportedContentType);
        assert_eq!(
            err.downcast_ref::<UnsupportedContentType>().unwrap().content_type,
            "text/plain"
        );
    }

    #[test]
    fn output_spec_should_parse_kind_and_path() {
        let spec: OutputSpec = "tabular:out/data.csv".parse().unwrap();
        assert_eq!(spec.kind, OutputKind::Tabular);
        assert_eq!(spec.path.as_deref(), Some(Path::new("out/data.csv")));
        assert_eq!(spec.to_string(), "tabular:out/data.csv");

        assert_eq!("raw".parse::<OutputSpec>().unwrap(), OutputSpec::new(OutputKind::Raw));
        assert_eq!(OutputSpec::default().kind, OutputKind::Decoded);
    }

    #[test]
    fn output_spec_should_reject_unknown_kind() {
        let err = "pandas".parse::<OutputSpec>().unwrap_err();
        assert_eq!(err.kind(), Kind::Validation);

        let err = "raw:".parse::<OutputSpec>().unwrap_err();
        assert_eq!(err.kind(), Kind::Validation);
    }

    #[test]
    fn raw_should_return_body_untouched() {
        let body = "{\"a\": [1, 2]}";
        let output = process(
            response("application/json", body),
            &OutputSpec::new(OutputKind::Raw),
            &WriterOptions::default(),
        )
        .unwrap();
        assert_eq!(output.as_bytes(), Some(body.as_bytes()));
    }

    #[test]
    fn decoded_json_should_match_independent_parse() {
        let body = r#"[{"code":"MCD","close":271.5}]"#;
        let output = process(
            response("application/json", body),
            &OutputSpec::default(),
            &WriterOptions::default(),
        )
        .unwrap();
        assert_eq!(output.as_json(), Some(&json!([{"code": "MCD", "close": 271.5}])));
    }

    #[test]
    fn malformed_json_should_fail_to_decode() {
        let err = process(
            response("application/json", "{\"a\":"),
            &OutputSpec::default(),
            &WriterOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), Kind::JsonDecode);
    }

    #[test]
    fn invalid_utf8_should_fail_to_decode() {
        let err = process(
            TransportResponse::new("text/html", vec![0xff, 0xfe]),
            &OutputSpec::default(),
            &WriterOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), Kind::BytesDecode);
    }

    #[test]
    fn tabular_should_key_by_reindex_column() {
        let options = WriterOptions::builder().reindex(vec!["Date".to_owned()]).build();
        let output = process(
            response("text/html", "Date,Open\n2023-01-01,1.0"),
            &"tabular".parse().unwrap(),
            &options,
        )
        .unwrap();

        let table = output.into_table().unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup(&["2023-01-01"], "Open"), Some(&Cell::Float(1.0)));
    }

    #[test]
    fn tabular_failures_should_be_processing() {
        let err = process(
            response("application/json", "not json"),
            &"tabular".parse().unwrap(),
            &WriterOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), Kind::Processing);

        let options = WriterOptions::builder().reindex(vec!["Missing".to_owned()]).build();
        let err = process(
            response("text/html", "Date,Open\n2023-01-01,1.0"),
            &"tabular".parse().unwrap(),
            &options,
        )
        .unwrap_err();
        assert_eq!(err.kind(), Kind::Processing);
    }

    #[test]
    fn unsupported_content_type_should_fail_for_every_kind() {
        for spec in ["raw", "decoded", "tabular"] {
            let err = process(
                response("image/png", ""),
                &spec.parse().unwrap(),
                &WriterOptions::default(),
            )
            .unwrap_err();
            assert_eq!(err.kind(), Kind::UnsupportedContentType);
        }
    }
}
