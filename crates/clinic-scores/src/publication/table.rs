use std::io::{Read, Write};
use std::path::Path;

const BYTE_ORDER_MARK: &str = "\u{feff}";

/// CMS export held as raw strings so columns this crate does not know about
/// survive a read/write cycle untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CmsTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    byte_order_mark: bool,
}

impl CmsTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width.max(row.len()), String::new());
                row
            })
            .collect();
        let mut table = Self {
            headers,
            rows,
            byte_order_mark: false,
        };
        table.pad_headers();
        table
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, csv::Error> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parses a CMS export. A leading UTF-8 byte order mark is stripped from
    /// the first header and written back out by [`CmsTable::write_to`].
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, csv::Error> {
        let mut raw = Vec::new();
        reader.read_to_end(&mut raw)?;
        let (byte_order_mark, body) = match raw.strip_prefix(BYTE_ORDER_MARK.as_bytes()) {
            Some(body) => (true, body),
            None => (false, raw.as_slice()),
        };

        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(body);
        let headers = csv_reader
            .headers()?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        let mut table = Self::new(headers, rows);
        table.byte_order_mark = byte_order_mark;
        Ok(table)
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), csv::Error> {
        if self.byte_order_mark {
            writer.write_all(BYTE_ORDER_MARK.as_bytes())?;
        }
        let mut csv_writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(writer);
        csv_writer.write_record(&self.headers)?;
        for row in &self.rows {
            csv_writer.write_record(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String, csv::Error> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    pub fn has_byte_order_mark(&self) -> bool {
        self.byte_order_mark
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// Index of `name`, appending an empty column when it does not exist.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(index) = self.column(name) {
            return index;
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.resize(self.headers.len(), String::new());
        }
        self.headers.len() - 1
    }

    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn set_cell(&mut self, row: usize, column: usize, value: String) {
        if let Some(cells) = self.rows.get_mut(row) {
            if cells.len() <= column {
                cells.resize(column + 1, String::new());
            }
            cells[column] = value;
        }
    }

    /// Value of `column` in `row`, by header name.
    pub fn get(&self, row: usize, name: &str) -> Option<&str> {
        self.column(name).map(|column| self.cell(row, column))
    }

    // Rows longer than the header get anonymous columns so every row has the
    // same width on output.
    fn pad_headers(&mut self) {
        let widest = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        while self.headers.len() < widest {
            self.headers.push(String::new());
        }
        let width = self.headers.len();
        for row in &mut self.rows {
            row.resize(width, String::new());
        }
    }
}
