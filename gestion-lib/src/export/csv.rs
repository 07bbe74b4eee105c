//! CSV writing.

use std::io::Write;

use super::ExportTable;
use crate::error::ExportError;

/// Field separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    #[default]
    Comma,
    Semicolon,
    Tab,
    Pipe,
}

impl Delimiter {
    pub fn as_char(&self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Semicolon => ';',
            Delimiter::Tab => '\t',
            Delimiter::Pipe => '|',
        }
    }
}

/// Record separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineTerminator {
    #[default]
    CrLf,
    Lf,
}

impl LineTerminator {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineTerminator::CrLf => "\r\n",
            LineTerminator::Lf => "\n",
        }
    }
}

/// CSV output format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: Delimiter,
    pub quote: char,
    pub line_terminator: LineTerminator,
    /// Write a header line of column labels.
    pub include_headers: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::Comma,
            quote: '"',
            line_terminator: LineTerminator::CrLf,
            include_headers: true,
        }
    }
}

impl CsvOptions {
    pub fn delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn quote(mut self, quote: char) -> Self {
        self.quote = quote;
        self
    }

    pub fn line_terminator(mut self, line_terminator: LineTerminator) -> Self {
        self.line_terminator = line_terminator;
        self
    }

    pub fn headers(mut self, include: bool) -> Self {
        self.include_headers = include;
        self
    }

    /// Quotes `value` when it holds the delimiter, the quote char or a line
    /// break; embedded quotes are doubled.
    fn qualify(&self, value: &str) -> String {
        let q = self.quote;
        let needs_quotes = value
            .chars()
            .any(|c| c == self.delimiter.as_char() || c == q || c == '\n' || c == '\r');
        if !needs_quotes {
            return value.to_string();
        }
        let escaped = value.replace(q, &format!("{}{}", q, q));
        format!("{}{}{}", q, escaped, q)
    }

    fn write_record<'a, W: Write>(
        &self,
        writer: &mut W,
        fields: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), ExportError> {
        let line = fields
            .into_iter()
            .map(|f| self.qualify(f))
            .collect::<Vec<_>>()
            .join(&self.delimiter.as_char().to_string());
        writer.write_all(line.as_bytes())?;
        writer.write_all(self.line_terminator.as_str().as_bytes())?;
        Ok(())
    }
}

impl ExportTable {
    /// Streams the table as CSV.
    pub fn write_csv<W: Write>(&self, writer: &mut W, options: &CsvOptions) -> Result<(), ExportError> {
        if options.include_headers {
            options.write_record(writer, self.headers.iter().map(|h| h.label.as_str()))?;
        }
        for record in &self.data {
            options.write_record(writer, record.iter().map(String::as_str))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Renders the table as CSV text.
    pub fn to_csv(&self, options: &CsvOptions) -> Result<String, ExportError> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf, options)?;
        Ok(String::from_utf8(buf)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportHeader;

    fn table() -> ExportTable {
        ExportTable {
            headers: vec![
                ExportHeader {
                    label: "Nom".into(),
                    key: "nom".into(),
                },
                ExportHeader {
                    label: "Note".into(),
                    key: "note".into(),
                },
            ],
            data: vec![
                vec!["Durand".into(), "dit \"le grand\"".into()],
                vec!["Martin, fils".into(), "".into()],
            ],
        }
    }

    #[test]
    fn test_quotes_only_when_needed() {
        let csv = table().to_csv(&CsvOptions::default()).unwrap();
        assert_eq!(
            csv,
            "Nom,Note\r\nDurand,\"dit \"\"le grand\"\"\"\r\n\"Martin, fils\",\r\n"
        );
    }

    #[test]
    fn test_semicolon_without_header() {
        let options = CsvOptions::default()
            .delimiter(Delimiter::Semicolon)
            .line_terminator(LineTerminator::Lf)
            .headers(false);
        let csv = table().to_csv(&options).unwrap();
        assert_eq!(csv, "Durand;\"dit \"\"le grand\"\"\"\nMartin, fils;\n");
    }

    #[test]
    fn test_newline_in_field_is_quoted() {
        let table = ExportTable {
            headers: vec![ExportHeader {
                label: "Adresse".into(),
                key: "adresse".into(),
            }],
            data: vec![vec!["1 rue A\nLyon".into()]],
        };
        let csv = table.to_csv(&CsvOptions::default().headers(false)).unwrap();
        assert_eq!(csv, "\"1 rue A\nLyon\"\r\n");
    }
}
