// Test data fixtures

use docshelf::model::Item;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// Manages a temporary JSON fixture file
pub struct TestFixture {
    _temp_dir: TempDir,
    pub path: PathBuf,
}

impl TestFixture {
    /// Create a new temporary file with given content
    pub fn new(filename: &str, content: &str) -> anyhow::Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().join(filename);

        let mut file = fs::File::create(&path)?;
        file.write_all(content.as_bytes())?;
        file.flush()?;

        Ok(TestFixture {
            _temp_dir: temp_dir,
            path,
        })
    }

    /// Read the current content of the file
    pub fn read_content(&self) -> anyhow::Result<String> {
        Ok(fs::read_to_string(&self.path)?)
    }
}

/// A small archive: two top-level folders with nested subfolders and
/// documents, plus one record whose parent was deleted
pub fn archive() -> Vec<Item> {
    vec![
        Item::folder("contracts", "Contracts"),
        Item::folder("invoices", "Invoices"),
        Item::document("welcome", "welcome.pdf").with_file_type("pdf"),
        Item::folder("c-2023", "2023").with_parent("contracts"),
        Item::folder("c-2024", "2024").with_parent("contracts"),
        Item::document("nda", "nda.pdf").with_parent("c-2024"),
        Item::folder("c-2024-q1", "Q1").with_parent("c-2024"),
        Item::folder("i-open", "Open").with_parent("invoices"),
        Item::folder("lost", "Lost and found").with_parent("deleted-folder"),
    ]
}

/// `count` top-level documents named `doc-0000`, `doc-0001`, ...
pub fn documents(count: usize) -> Vec<Item> {
    (0..count)
        .map(|i| Item::document(format!("doc-{i:04}"), format!("Document {i}")))
        .collect()
}
