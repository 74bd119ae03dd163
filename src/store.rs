// CSV Record Store - flat file holding the registry
//
// The dialect is deliberately naive: one record per line, values split on
// every comma, no quoting. A value containing a comma shifts the columns of
// its line, which then fails the field-count check and is dropped.

use csv::{ReaderBuilder, Terminator, Trim};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::record::{Competitor, NewCompetitor, Record, HEADER};

/// Parse the full text of a registry file.
///
/// Blank lines are ignored, the first remaining line is the header, and
/// every later line whose value count differs from the header's is
/// silently skipped. File order is preserved.
pub fn parse_records(raw: &str) -> Result<Vec<Record>> {
    let lines: Vec<&str> = raw.lines().filter(|line| !line.trim().is_empty()).collect();

    // Header only, or nothing at all
    if lines.len() < 2 {
        return Ok(Vec::new());
    }

    let text = lines.join("\n");
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .terminator(Terminator::Any(b'\n'))
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

    let mut records = Vec::with_capacity(lines.len() - 1);
    for (index, result) in rdr.records().enumerate() {
        let row = result?;

        if row.len() != headers.len() {
            debug!(
                row = index + 1,
                expected = headers.len(),
                found = row.len(),
                "Dropping malformed line"
            );
            continue;
        }

        let fields = headers
            .iter()
            .cloned()
            .zip(row.iter().map(str::to_string))
            .collect();
        records.push(Record::new(fields));
    }

    Ok(records)
}

/// Handle on the registry file. Holds nothing but the path; every call
/// opens, reads or appends, and closes again.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read and parse every record.
    ///
    /// Returns `Error::NotFound` when the file is missing; the file is never
    /// created here.
    pub fn read_all(&self) -> Result<Vec<Record>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::NotFound {
                    path: self.path.clone(),
                })
            }
            Err(source) => {
                return Err(Error::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        parse_records(&raw)
    }

    /// Append one competitor as a new line.
    ///
    /// The line is written as `\n` + values in a single append-mode write, no
    /// header is added. A missing file is created with just that line, a
    /// missing directory is an error.
    pub fn append(&self, competitor: &Competitor) -> Result<()> {
        let line = format!("\n{}", competitor.to_line());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.write_error(source))?;

        file.write_all(line.as_bytes())
            .map_err(|source| self.write_error(source))?;

        info!(reg_number = %competitor.reg_number, "Appended competitor");
        Ok(())
    }

    /// Validate a new competitor, assign its RegNumber, and append it.
    pub fn create(&self, input: NewCompetitor) -> Result<Competitor> {
        let competitor = input.validate()?;
        self.append(&competitor)?;
        Ok(competitor)
    }

    /// Create the file with its header line if it does not exist yet.
    ///
    /// Returns `true` when a new file was written.
    pub fn init(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.write_error(source))?;
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
            Err(source) => return Err(self.write_error(source)),
        };

        file.write_all(HEADER.join(",").as_bytes())
            .map_err(|source| self.write_error(source))?;

        info!(path = %self.path.display(), "Created competitors file");
        Ok(true)
    }

    fn write_error(&self, source: std::io::Error) -> Error {
        Error::Write {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const ACME: &str =
        "RegNumber,CompanyName,RegistrationDate,Status\nREG-AAAA1111,Acme Inc,2020-01-01,Active\n";

    fn store_with(contents: &str) -> (tempfile::TempDir, CsvStore) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("competitors.csv");
        fs::write(&path, contents).unwrap();
        (dir, CsvStore::new(path))
    }

    #[test]
    fn test_parse_header_only_is_empty() {
        let records = parse_records("RegNumber,CompanyName,RegistrationDate,Status\n").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse_records("").unwrap().is_empty());
        assert!(parse_records("\n  \n\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_single_record() {
        let records = parse_records(ACME).unwrap();
        assert_eq!(records.len(), 1);

        let acme = &records[0];
        assert_eq!(acme.get("RegNumber"), Some("REG-AAAA1111"));
        assert_eq!(acme.get("CompanyName"), Some("Acme Inc"));
        assert_eq!(acme.get("RegistrationDate"), Some("2020-01-01"));
        assert_eq!(acme.get("Status"), Some("Active"));
    }

    #[test]
    fn test_parse_drops_malformed_lines_keeps_others() {
        let raw = "RegNumber,CompanyName,RegistrationDate,Status\n\
                   REG-00000001,One,2020,Active\n\
                   REG-00000002,Two, Inc,2021,Active\n\
                   REG-00000003,Three\n\
                   REG-00000004,Four,2022,Closed\n";
        let records = parse_records(raw).unwrap();

        let regs: Vec<&str> = records.iter().filter_map(|r| r.get("RegNumber")).collect();
        assert_eq!(regs, vec!["REG-00000001", "REG-00000004"]);
    }

    #[test]
    fn test_parse_trims_and_skips_blank_lines() {
        let raw = "\n  RegNumber , CompanyName,RegistrationDate,Status \r\n\
                   \n   \n\
                   REG-00000001 ,  Acme Inc ,2020-01-01, Active\r\n";
        let records = parse_records(raw).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("RegNumber"), Some("REG-00000001"));
        assert_eq!(records[0].get("CompanyName"), Some("Acme Inc"));
        assert_eq!(records[0].get("Status"), Some("Active"));
    }

    #[test]
    fn test_parse_does_not_interpret_quotes() {
        let raw = "RegNumber,CompanyName,RegistrationDate,Status\n\
                   REG-00000001,\"Quoted, Name\",2020,Active\n\
                   REG-00000002,\"Plain\",2020,Active\n";
        let records = parse_records(raw).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("CompanyName"), Some("\"Plain\""));
    }

    #[test]
    fn test_parse_keeps_bare_carriage_return_inside_value() {
        let raw = "RegNumber,CompanyName,RegistrationDate,Status\n\
                   REG-00000001,Foo\rBar,2020,Active";
        let records = parse_records(raw).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("CompanyName"), Some("Foo\rBar"));
        assert_eq!(records[0].get("Status"), Some("Active"));
    }

    #[test]
    fn test_parse_uses_file_header_names() {
        let raw = "a,b\n1,2\n3,4\n";
        let records = parse_records(raw).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("a"), Some("3"));
        assert_eq!(records[1].get("b"), Some("4"));
    }

    #[test]
    fn test_read_all_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let store = CsvStore::new(dir.path().join("competitors.csv"));

        let err = store.read_all().unwrap_err();
        assert!(err.is_not_found());
        assert!(!store.path().exists(), "read must not create the file");
    }

    #[test]
    fn test_read_all_directory_is_read_error() {
        let dir = tempdir().unwrap();
        let store = CsvStore::new(dir.path());

        let err = store.read_all().unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }

    #[test]
    fn test_append_then_read_all() {
        let (_dir, store) = store_with(ACME.trim_end());

        let created = store
            .create(NewCompetitor {
                company_name: Some("Beta LLC".to_string()),
                registration_date: Some("2023-05-05".to_string()),
                status: Some("Pending".to_string()),
            })
            .unwrap();

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 2);

        let last = records.last().unwrap();
        assert_eq!(last.get("RegNumber"), Some(created.reg_number.as_str()));
        assert_eq!(last.get("CompanyName"), Some("Beta LLC"));
        assert_eq!(last.get("RegistrationDate"), Some("2023-05-05"));
        assert_eq!(last.get("Status"), Some("Pending"));

        let reg = created.reg_number.strip_prefix("REG-").unwrap();
        assert_eq!(reg.len(), 8);
        assert!(reg.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_create_value_with_carriage_return_reads_back() {
        let (_dir, store) = store_with(ACME);

        let created = store
            .create(NewCompetitor {
                company_name: Some("Foo\rBar".to_string()),
                registration_date: Some("2023-05-05".to_string()),
                status: Some("Pending".to_string()),
            })
            .unwrap();

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 2);
        let last = records.last().unwrap();
        assert_eq!(last.get("RegNumber"), Some(created.reg_number.as_str()));
        assert_eq!(last.get("CompanyName"), Some("Foo\rBar"));
    }

    #[test]
    fn test_append_writes_leading_newline_without_header() {
        let (_dir, store) = store_with("RegNumber,CompanyName,RegistrationDate,Status");
        let competitor = Competitor {
            reg_number: "REG-12345678".to_string(),
            company_name: "Acme".to_string(),
            registration_date: "2020".to_string(),
            status: "Active".to_string(),
        };
        store.append(&competitor).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            raw,
            "RegNumber,CompanyName,RegistrationDate,Status\nREG-12345678,Acme,2020,Active"
        );
    }

    #[test]
    fn test_append_after_trailing_newline_still_parses() {
        let (_dir, store) = store_with(ACME);
        let competitor = Competitor::new("Beta".into(), "2023".into(), "Pending".into());
        store.append(&competitor).unwrap();

        assert_eq!(store.read_all().unwrap().len(), 2);
    }

    #[test]
    fn test_append_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let store = CsvStore::new(dir.path().join("missing").join("competitors.csv"));
        let competitor = Competitor::new("Acme".into(), "2020".into(), "Active".into());

        let err = store.append(&competitor).unwrap_err();
        assert!(matches!(err, Error::Write { .. }));
    }

    #[test]
    fn test_create_rejects_invalid_input_without_writing() {
        let (_dir, store) = store_with(ACME);
        let err = store
            .create(NewCompetitor {
                company_name: Some("Beta".to_string()),
                registration_date: None,
                status: Some("Pending".to_string()),
            })
            .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), ACME);
    }

    #[test]
    fn test_init_creates_header_once() {
        let dir = tempdir().unwrap();
        let store = CsvStore::new(dir.path().join("data").join("competitors.csv"));

        assert!(store.init().unwrap());
        assert!(!store.init().unwrap());
        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            "RegNumber,CompanyName,RegistrationDate,Status"
        );
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_init_leaves_existing_file() {
        let (_dir, store) = store_with(ACME);
        assert!(!store.init().unwrap());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), ACME);
    }
}
