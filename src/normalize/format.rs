use std::collections::HashSet;
use std::fmt::{self, Write as _};
use std::path::Path;

use serde_json::{Map, Value};

use super::table::{Cell, Column, Table};
use crate::Result;
use crate::error::{Error, UnsupportedExtension};

/// Serialization format of a persisted table, selected by file extension.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Parquet,
    Pickle,
    Csv,
    Hdf,
    Xlsx,
    Json,
    Html,
    Feather,
    Tex,
    Dta,
    Md,
}

static EXTENSIONS: phf::Map<&'static str, Format> = phf::phf_map! {
    "parquet" => Format::Parquet,
    "pickle" => Format::Pickle,
    "csv" => Format::Csv,
    "hdf" => Format::Hdf,
    "xlsx" => Format::Xlsx,
    "json" => Format::Json,
    "html" => Format::Html,
    "feather" => Format::Feather,
    "tex" => Format::Tex,
    "dta" => Format::Dta,
    "md" => Format::Md,
};

impl Format {
    /// Format for the extension of `path`, matched case-sensitively.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        EXTENSIONS.get(extension).copied().ok_or_else(|| {
            UnsupportedExtension {
                extension: format!(".{extension}"),
            }
            .into()
        })
    }

    /// Serialize `table` with serializer options `extra`.
    pub fn render(self, table: &Table, extra: &Map<String, Value>) -> Result<Vec<u8>> {
        let options = Options::parse(self, extra)?;

        match self {
            Format::Csv => render_csv(table, &options),
            Format::Json => render_json(table, &options),
            Format::Html => render_html(table, &options).map(String::into_bytes),
            Format::Tex => render_tex(table, &options).map(String::into_bytes),
            Format::Md => render_md(table, &options).map(String::into_bytes),
            #[cfg(feature = "arrow")]
            Format::Feather => super::columnar::feather(table),
            #[cfg(feature = "arrow")]
            Format::Parquet => super::columnar::parquet(table),
            other => Err(Error::processing(format!(
                "no {other} serializer is available in this build"
            ))),
        }
    }

    /// Serializer options understood by this format.
    fn accepted(self) -> &'static [&'static str] {
        match self {
            Format::Csv => &["sep", "header", "index"],
            Format::Json => &["orient", "index"],
            Format::Html | Format::Tex | Format::Md => &["header", "index"],
            _ => &[],
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Parquet => "parquet",
            Format::Pickle => "pickle",
            Format::Csv => "csv",
            Format::Hdf => "hdf",
            Format::Xlsx => "xlsx",
            Format::Json => "json",
            Format::Html => "html",
            Format::Feather => "feather",
            Format::Tex => "tex",
            Format::Dta => "dta",
            Format::Md => "md",
        };
        f.write_str(name)
    }
}

/// Serializer options after validation against the keys a format accepts.
struct Options<'a>(&'a Map<String, Value>, Format);

impl<'a> Options<'a> {
    fn parse(format: Format, extra: &'a Map<String, Value>) -> Result<Self> {
        let accepted = format.accepted();
        if let Some(key) = extra.keys().find(|key| !accepted.contains(&key.as_str())) {
            return Err(Error::processing(format!(
                "unexpected option '{key}' for {format} output"
            )));
        }
        Ok(Self(extra, format))
    }

    fn flag(&self, key: &str, default: bool) -> Result<bool> {
        match self.0.get(key) {
            None => Ok(default),
            Some(Value::Bool(flag)) => Ok(*flag),
            Some(other) => Err(Error::processing(format!(
                "{} option '{key}' must be a boolean, found {other}",
                self.1
            ))),
        }
    }

    fn text(&self, key: &str, default: &'a str) -> Result<&'a str> {
        match self.0.get(key) {
            None => Ok(default),
            Some(Value::String(text)) => Ok(text),
            Some(other) => Err(Error::processing(format!(
                "{} option '{key}' must be a string, found {other}",
                self.1
            ))),
        }
    }
}

fn render_csv(table: &Table, options: &Options<'_>) -> Result<Vec<u8>> {
    let sep = match options.text("sep", ",")?.as_bytes() {
        [byte] => *byte,
        _ => return Err(Error::processing("csv option 'sep' must be a single byte")),
    };
    let (_, columns) = table.frame(options.flag("index", true)?);

    let mut writer = csv::WriterBuilder::new()
        .delimiter(sep)
        .from_writer(Vec::new());
    let fault = |e: csv::Error| Error::processing(format!("unable to write csv: {e}"));

    if options.flag("header", true)? {
        writer
            .write_record(columns.iter().map(Column::name))
            .map_err(fault)?;
    }
    for row in 0..table.len() {
        writer
            .write_record(columns.iter().map(|c| cell_text(c, row)))
            .map_err(fault)?;
    }

    writer
        .into_inner()
        .map_err(|e| Error::processing(format!("unable to flush csv: {}", e.error())))
}

fn render_json(table: &Table, options: &Options<'_>) -> Result<Vec<u8>> {
    let value = match options.text("orient", "columns")? {
        "records" => {
            let keyed = options.flag("index", true)? && !table.index().is_empty();
            let (_, columns) = table.frame(keyed);
            let records = (0..table.len())
                .map(|row| {
                    Value::Object(
                        columns
                            .iter()
                            .map(|c| (c.name().to_owned(), cell_json(c, row)))
                            .collect(),
                    )
                })
                .collect();
            Value::Array(records)
        }
        "columns" => {
            let keys: Vec<String> = (0..table.len()).map(|row| row_label(table, row)).collect();
            let mut seen = HashSet::with_capacity(keys.len());
            if let Some(key) = keys.iter().find(|key| !seen.insert(key.as_str())) {
                return Err(Error::processing(format!(
                    "json orient 'columns' requires a unique index, '{key}' repeats"
                )));
            }
            Value::Object(
                table
                    .columns()
                    .iter()
                    .map(|c| {
                        let cells = keys
                            .iter()
                            .enumerate()
                            .map(|(row, key)| (key.clone(), cell_json(c, row)))
                            .collect();
                        (c.name().to_owned(), Value::Object(cells))
                    })
                    .collect(),
            )
        }
        other => {
            return Err(Error::processing(format!(
                "json option 'orient' must be 'records' or 'columns', found '{other}'"
            )));
        }
    };

    serde_json::to_vec(&value).map_err(|e| Error::processing(format!("unable to write json: {e}")))
}

fn render_html(table: &Table, options: &Options<'_>) -> Result<String> {
    let (keys, columns) = table.frame(options.flag("index", true)?);
    let named_keys = keys > 0 && !table.index().is_empty();

    let mut out = String::from("<table border=\"1\" class=\"dataframe\">\n");
    if options.flag("header", true)? {
        out.push_str("  <thead>\n    <tr style=\"text-align: right;\">\n");
        for (position, column) in columns.iter().enumerate() {
            let label = if named_keys && position < keys { "" } else { column.name() };
            writeln!(out, "      <th>{}</th>", escape_html(label)).map_err(fault)?;
        }
        out.push_str("    </tr>\n");
        if named_keys {
            out.push_str("    <tr>\n");
            for (position, column) in columns.iter().enumerate() {
                let label = if position < keys { column.name() } else { "" };
                writeln!(out, "      <th>{}</th>", escape_html(label)).map_err(fault)?;
            }
            out.push_str("    </tr>\n");
        }
        out.push_str("  </thead>\n");
    }

    out.push_str("  <tbody>\n");
    for row in 0..table.len() {
        out.push_str("    <tr>\n");
        for (position, column) in columns.iter().enumerate() {
            let tag = if position < keys { "th" } else { "td" };
            writeln!(
                out,
                "      <{tag}>{}</{tag}>",
                escape_html(&cell_text(column, row))
            ).map_err(fault)?;
        }
        out.push_str("    </tr>\n");
    }
    out.push_str("  </tbody>\n</table>");

    Ok(out)
}

fn render_tex(table: &Table, options: &Options<'_>) -> Result<String> {
    let (keys, columns) = table.frame(options.flag("index", true)?);

    let spec: String = columns
        .iter()
        .enumerate()
        .map(|(position, c)| if position >= keys && c.is_numeric() { 'r' } else { 'l' })
        .collect();

    let mut out = format!("\\begin{{tabular}}{{{spec}}}\n\\toprule\n");
    if options.flag("header", true)? {
        let labels: Vec<String> = columns.iter().map(|c| escape_tex(c.name())).collect();
        writeln!(out, "{} \\\\", labels.join(" & ")).map_err(fault)?;
        out.push_str("\\midrule\n");
    }
    for row in 0..table.len() {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| escape_tex(&cell_text(c, row)))
            .collect();
        writeln!(out, "{} \\\\", cells.join(" & ")).map_err(fault)?;
    }
    out.push_str("\\bottomrule\n\\end{tabular}\n");

    Ok(out)
}

fn render_md(table: &Table, options: &Options<'_>) -> Result<String> {
    let (keys, columns) = table.frame(options.flag("index", true)?);
    let mut out = String::new();

    if options.flag("header", true)? {
        let labels: Vec<String> = columns.iter().map(|c| escape_md(c.name())).collect();
        writeln!(out, "| {} |", labels.join(" | ")).map_err(fault)?;
        let rules: Vec<&str> = columns
            .iter()
            .enumerate()
            .map(|(position, c)| {
                if position >= keys && c.is_numeric() {
                    "---:"
                } else {
                    ":---"
                }
            })
            .collect();
        writeln!(out, "|{}|", rules.join("|")).map_err(fault)?;
    }
    for row in 0..table.len() {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| escape_md(&cell_text(c, row)))
            .collect();
        writeln!(out, "| {} |", cells.join(" | ")).map_err(fault)?;
    }

    Ok(out)
}

fn fault(error: fmt::Error) -> Error {
    Error::processing(format!("unable to render table: {error}"))
}

fn cell_text(column: &Column, row: usize) -> String {
    column.get(row).map(ToString::to_string).unwrap_or_default()
}

fn cell_json(column: &Column, row: usize) -> Value {
    column.get(row).map_or(Value::Null, Cell::to_json)
}

/// Object key of a row: the key cells joined by `,`, or the row position.
fn row_label(table: &Table, row: usize) -> String {
    if table.index().is_empty() {
        return row.to_string();
    }
    table
        .row_key(row)
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn escape_tex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(ch);
            }
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '\\' => out.push_str("\\textbackslash{}"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_md(text: &str) -> String {
    text.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::Kind;

    fn keyed() -> Table {
        let mut table = Table::from_csv(b"Date,Open\n2023-01-01,1.0\n2023-01-02,2.5").unwrap();
        table.set_index(&["Date".to_owned()]).unwrap();
        table
    }

    fn options(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn extension_table_should_be_closed() {
        assert_eq!(Format::from_path(Path::new("out/a.csv")).unwrap(), Format::Csv);
        assert_eq!(Format::from_path(Path::new("a.feather")).unwrap(), Format::Feather);

        let err = Format::from_path(Path::new("a.txt")).unwrap_err();
        assert_eq!(err.kind(), Kind::UnsupportedExtension);
        assert_eq!(err.downcast_ref::<UnsupportedExtension>().unwrap().extension, ".txt");

        let err = Format::from_path(Path::new("noext")).unwrap_err();
        assert_eq!(err.kind(), Kind::UnsupportedExtension);
    }

    #[test]
    fn csv_should_lead_with_key() {
        let bytes = Format::Csv.render(&keyed(), &Map::new()).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "Date,Open\n2023-01-01,1.0\n2023-01-02,2.5\n");
    }

    #[test]
    fn csv_should_honour_sep_and_index() {
        let table = Table::from_csv(b"a,b\n1,x").unwrap();

        let positional = Format::Csv.render(&table, &Map::new()).unwrap();
        assert_eq!(String::from_utf8(positional).unwrap(), ",a,b\n0,1,x\n");

        let extra = options(json!({"sep": ";", "index": false}));
        let bytes = Format::Csv.render(&table, &extra).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "a;b\n1;x\n");
    }

    #[test]
    fn unknown_option_should_fail() {
        let extra = options(json!({"compression": "gzip"}));
        let err = Format::Csv.render(&keyed(), &extra).unwrap_err();
        assert_eq!(err.kind(), Kind::Processing);
    }

    #[test]
    fn json_should_default_to_columns() {
        let bytes = Format::Json.render(&keyed(), &Map::new()).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, json!({"Open": {"2023-01-01": 1.0, "2023-01-02": 2.5}}));
    }

    #[test]
    fn json_columns_should_reject_repeated_keys() {
        let mut table = Table::from_csv(b"Code,Close\nMCD,1.0\nMCD,2.0").unwrap();
        table.set_index(&["Code".to_owned()]).unwrap();

        let err = Format::Json.render(&table, &Map::new()).unwrap_err();
        assert_eq!(err.kind(), Kind::Processing);

        let extra = options(json!({"orient": "records"}));
        assert!(Format::Json.render(&table, &extra).is_ok());
    }

    #[test]
    fn json_records_should_include_key() {
        let extra = options(json!({"orient": "records"}));
        let bytes = Format::Json.render(&keyed(), &extra).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value[0], json!({"Date": "2023-01-01", "Open": 1.0}));
    }

    #[test]
    fn html_should_mark_key_cells() {
        let html = String::from_utf8(Format::Html.render(&keyed(), &Map::new()).unwrap()).unwrap();
        assert!(html.starts_with("<table border=\"1\" class=\"dataframe\">"));
        assert!(html.contains("<th>2023-01-01</th>"));
        assert!(html.contains("<td>2.5</td>"));
    }

    #[test]
    fn markdown_should_align_numbers_right() {
        let md = String::from_utf8(Format::Md.render(&keyed(), &Map::new()).unwrap()).unwrap();
        assert_eq!(
            md,
            "| Date | Open |\n|:---|---:|\n| 2023-01-01 | 1.0 |\n| 2023-01-02 | 2.5 |\n"
        );
    }

    #[test]
    fn latex_should_escape_labels() {
        let table = Table::from_csv(b"adj_close\n1").unwrap();
        let extra = options(json!({"index": false}));
        let tex = String::from_utf8(Format::Tex.render(&table, &extra).unwrap()).unwrap();
        assert!(tex.contains("adj\\_close \\\\"));
        assert!(tex.starts_with("\\begin{tabular}{r}"));
    }

    #[test]
    fn formats_without_serializer_should_fail_as_processing() {
        for format in [Format::Pickle, Format::Hdf, Format::Xlsx, Format::Dta] {
            let err = format.render(&keyed(), &Map::new()).unwrap_err();
            assert_eq!(err.kind(), Kind::Processing);
        }
    }
}
