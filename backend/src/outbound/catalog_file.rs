//! JSON catalogue loader used to seed a store at startup.
//!
//! ```json
//! [{"id": "3fa85f64-5717-4562-b3fc-2c963f66afa6", "title": "Kindred",
//!   "author": "Octavia E. Butler", "publicationDate": "1979-06-01"}]
//! ```
//!
//! Seeded books always start available; loans and holds are never imported.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::{Book, BookId};

/// One catalogue line in the seed file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct CatalogEntry {
    id: BookId,
    title: String,
    author: String,
    #[serde(default)]
    publication_date: Option<NaiveDate>,
}

impl From<CatalogEntry> for Book {
    fn from(entry: CatalogEntry) -> Self {
        let book = Book::new(entry.id, entry.title, entry.author);
        match entry.publication_date {
            Some(date) => book.with_publication_date(date),
            None => book,
        }
    }
}

/// Errors raised while loading a catalogue file.
#[derive(Debug, thiserror::Error)]
pub enum CatalogFileError {
    /// The file could not be read.
    #[error("failed to read catalogue at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file is not a valid catalogue.
    #[error("invalid catalogue at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Parse catalogue JSON.
pub fn parse_catalog(raw: &str) -> Result<Vec<Book>, serde_json::Error> {
    let entries: Vec<CatalogEntry> = serde_json::from_str(raw)?;
    Ok(entries.into_iter().map(Book::from).collect())
}

/// Read and parse a catalogue file.
///
/// # Errors
///
/// Returns [`CatalogFileError`] when the file is unreadable or malformed.
pub fn load_catalog(path: &Path) -> Result<Vec<Book>, CatalogFileError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalog(&raw).map_err(|source| CatalogFileError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Availability;
    use rstest::rstest;
    use std::io::Write;

    #[rstest]
    fn entries_become_available_books() {
        let books = parse_catalog(
            r#"[
                {"id": "3fa85f64-5717-4562-b3fc-2c963f66afa6", "title": "Kindred",
                 "author": "Octavia E. Butler", "publicationDate": "1979-06-01"},
                {"id": "0b8c1c52-7c1e-4b0e-9c55-0b6a1f5b7c3e", "title": "Solaris",
                 "author": "Stanisław Lem"}
            ]"#,
        )
        .expect("valid catalogue");

        assert_eq!(books.len(), 2);
        assert!(books.iter().all(|book| book.availability == Availability::Available));
        assert_eq!(
            books[0].publication_date,
            NaiveDate::from_ymd_opt(1979, 6, 1)
        );
        assert!(books[1].publication_date.is_none());
    }

    #[rstest]
    #[case(r#"[{"id": "nope", "title": "A", "author": "B"}]"#)]
    #[case(r#"[{"id": "3fa85f64-5717-4562-b3fc-2c963f66afa6", "title": "A"}]"#)]
    #[case(r#"[{"id": "3fa85f64-5717-4562-b3fc-2c963f66afa6", "title": "A", "author": "B", "availability": "unavailable"}]"#)]
    fn malformed_entries_are_rejected(#[case] raw: &str) {
        assert!(parse_catalog(raw).is_err());
    }

    #[rstest]
    fn load_reports_the_path_of_a_bad_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"not json").expect("write catalogue");

        let err = load_catalog(file.path()).expect_err("malformed file");

        assert!(matches!(err, CatalogFileError::Parse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }
}
