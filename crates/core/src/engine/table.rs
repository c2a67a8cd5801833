//! Tab-separated SDRF parsing for the built-in engine.

/// Parsed SDRF table: one header row plus data rows.
#[derive(Debug, Clone)]
pub struct SdrfTable {
    /// Header cells as written in the file (trimmed).
    pub headers: Vec<String>,
    /// Data rows with trimmed cells. Blank lines are dropped.
    pub rows: Vec<Vec<String>>,
}

impl SdrfTable {
    /// Parse tab-separated text. Quotes carry no meaning in SDRF, so each
    /// line is exactly one record.
    pub fn parse(text: &str) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(text.as_bytes());

        let mut records = Vec::new();
        for record in reader.records() {
            let record = record?;
            let cells: Vec<String> = record.iter().map(|cell| cell.trim().to_string()).collect();
            if cells.iter().all(String::is_empty) {
                continue;
            }
            records.push(cells);
        }

        let mut records = records.into_iter();
        let headers = records.next().unwrap_or_default();
        Ok(Self {
            headers,
            rows: records.collect(),
        })
    }

    /// Position of the first column whose name matches, ignoring case.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }
}
