//! Restaurant popularity ranking
//!
//! Persisted to a two-column CSV file (`NAME,COUNT`), rewritten in full after
//! every increment.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::consts::{RANKING_COLUMN_COUNT, RANKING_COLUMN_NAME};
use crate::error::{Error, Result};
use crate::settings::Settings;

/// Name to count tally backed by a CSV file
#[derive(Debug, Clone)]
pub struct RankingModel {
    csv_file: PathBuf,
    data: BTreeMap<String, u64>,
}

impl RankingModel {
    /// Open the ranking at `path`, creating an empty file if there is none
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let csv_file = path.into();
        if !csv_file.exists() {
            if let Some(parent) = csv_file.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| Error::storage(&csv_file, e.to_string()))?;
            }
            File::create(&csv_file).map_err(|e| Error::storage(&csv_file, e.to_string()))?;
            log::info!("Created empty ranking file {}", csv_file.display());
        }

        let mut model = Self {
            csv_file,
            data: BTreeMap::new(),
        };
        model.load()?;
        Ok(model)
    }

    /// Open the ranking file named in `settings`
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::open(&settings.csv_file_path)
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.csv_file
    }

    /// Re-read the backing file, replacing the in-memory table
    pub fn load(&mut self) -> Result<&BTreeMap<String, u64>> {
        let contents = fs::read_to_string(&self.csv_file)
            .map_err(|e| Error::storage(&self.csv_file, e.to_string()))?;
        self.data = parse_table(&self.csv_file, &contents)?;
        log::info!("Loaded {} ranking entries from {}", self.data.len(), self.csv_file.display());
        Ok(&self.data)
    }

    /// Write the whole table to a temp file and move it over the backing file
    pub fn save(&self) -> Result<()> {
        let tmp_path = self.tmp_path();
        if let Err(e) = self.write_to(&tmp_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        if let Err(e) = fs::rename(&tmp_path, &self.csv_file) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        log::debug!("Ranking saved ({} entries)", self.data.len());
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let file_name = self
            .csv_file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("ranking.csv");
        self.csv_file.with_file_name(format!(".{}.tmp", file_name))
    }

    fn write_to(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "{},{}", RANKING_COLUMN_NAME, RANKING_COLUMN_COUNT)?;
        for (name, count) in &self.data {
            writeln!(writer, "{},{}", quote_field(name), count)?;
        }
        writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
        Ok(())
    }

    /// Add one vote for `name` and persist. Returns the new count.
    pub fn increment(&mut self, name: &str) -> Result<u64> {
        let name = title_case(name);
        if name.is_empty() {
            return Err(Error::EmptyName);
        }
        let count = self.data.entry(name.clone()).or_insert(0);
        *count += 1;
        let count = *count;
        log::info!("{} now has {} vote(s)", name, count);
        self.save()?;
        Ok(count)
    }

    /// All entries, most popular first, ties in alphabetical order
    pub fn ranked(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> =
            self.data.iter().map(|(n, c)| (n.as_str(), *c)).collect();
        // Map iteration is alphabetical and the sort is stable
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }

    /// Most popular name not listed in `excluding`
    pub fn get_most_popular<S: AsRef<str>>(&self, excluding: &[S]) -> Option<String> {
        let excluded: Vec<String> = excluding.iter().map(|s| title_case(s.as_ref())).collect();
        self.ranked()
            .into_iter()
            .find(|(name, _)| !excluded.iter().any(|e| e == name))
            .map(|(name, _)| name.to_string())
    }

    /// Current count for `name` (0 when unknown)
    pub fn count(&self, name: &str) -> u64 {
        self.data.get(&title_case(name)).copied().unwrap_or(0)
    }

    pub fn entries(&self) -> &BTreeMap<String, u64> {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Title-case a free-text name: letters after a non-letter are uppercased,
/// the rest lowercased. Surrounding whitespace is dropped and each run of
/// control characters (line breaks included) becomes one space, so a name
/// always fits on a single CSV line.
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_is_letter = false;
    let mut prev_is_control = false;
    for ch in name.trim().chars() {
        if ch.is_control() {
            if !prev_is_control {
                out.push(' ');
            }
            prev_is_control = true;
            prev_is_letter = false;
            continue;
        }
        prev_is_control = false;
        if ch.is_alphabetic() {
            if prev_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(ch);
            prev_is_letter = false;
        }
    }
    out.trim().to_string()
}

fn parse_table(path: &Path, contents: &str) -> Result<BTreeMap<String, u64>> {
    let mut data = BTreeMap::new();
    // Spreadsheet exports may start with a byte order mark
    let contents = contents.strip_prefix('\u{feff}').unwrap_or(contents);
    let mut lines = contents
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((header_no, header)) = lines.next() else {
        return Ok(data);
    };
    let header = split_record(header).map_err(|e| Error::storage(path, format!("line {}: {}", header_no, e)))?;
    let column = |wanted: &str| {
        header
            .iter()
            .position(|h| h.trim() == wanted)
            .ok_or_else(|| Error::storage(path, format!("header has no {} column", wanted)))
    };
    let name_col = column(RANKING_COLUMN_NAME)?;
    let count_col = column(RANKING_COLUMN_COUNT)?;

    for (line_no, line) in lines {
        let bad = |reason: String| Error::storage(path, format!("line {}: {}", line_no, reason));
        let fields = split_record(line).map_err(bad)?;
        let (Some(name), Some(count)) = (fields.get(name_col), fields.get(count_col)) else {
            return Err(bad("missing field".to_string()));
        };
        let name = title_case(name);
        if name.is_empty() {
            return Err(bad("empty name".to_string()));
        }
        let count: u64 = count
            .trim()
            .parse()
            .map_err(|_| bad(format!("invalid count {:?}", count)))?;
        *data.entry(name).or_insert(0) += count;
    }
    Ok(data)
}

/// Split one CSV record, honouring double-quoted fields
fn split_record(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match (ch, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            ('"', true) => in_quotes = false,
            ('"', false) if field.is_empty() => in_quotes = true,
            (',', false) => fields.push(std::mem::take(&mut field)),
            _ => field.push(ch),
        }
    }
    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }
    fields.push(field);
    Ok(fields)
}

fn quote_field(field: &str) -> String {
    if field.contains([',', '"']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
