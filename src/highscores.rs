//! Persist the top-10 leaderboard to disk (XDG config or ~/.config/mergetui).

use log::{info, warn};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

const FILENAME: &str = "records.csv";

/// Entries kept on the board.
pub const MAX_RECORDS: usize = 10;

/// Longest player name, in characters.
pub const MAX_NAME_LEN: usize = 15;

#[derive(Debug, Error)]
pub enum RecordsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// One leaderboard line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    pub score: u64,
}

impl Record {
    /// Name is capped at [`MAX_NAME_LEN`] characters; commas and line breaks become spaces.
    pub fn new(name: &str, score: u64) -> Self {
        let name = name
            .chars()
            .map(|c| if c == ',' || c.is_control() { ' ' } else { c })
            .take(MAX_NAME_LEN)
            .collect();
        Self { name, score }
    }

    /// `name,score`; anything else (wrong field count, bad number) is `None`.
    fn parse(line: &str) -> Option<Self> {
        let mut fields = line.split(',');
        let (Some(name), Some(score), None) = (fields.next(), fields.next(), fields.next()) else {
            return None;
        };
        let score = score.trim().parse().ok()?;
        Some(Self {
            name: name.to_string(),
            score,
        })
    }
}

/// Returns the default path of the records file (config dir / mergetui / records.csv).
pub fn default_path() -> PathBuf {
    let base = if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if xdg.is_empty() {
            std::env::var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(".config")
        } else {
            PathBuf::from(xdg)
        }
    } else {
        std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .unwrap_or_else(|_| PathBuf::from("."))
    };
    base.join("mergetui").join(FILENAME)
}

/// Leaderboard file on disk.
#[derive(Debug, Clone)]
pub struct RecordsStore {
    path: PathBuf,
}

impl RecordsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load records in file order. A missing or unreadable file is an empty board;
    /// lines that do not parse are skipped.
    pub fn load(&self) -> Vec<Record> {
        let content = match fs::read(&self.path) {
            Ok(c) => c,
            Err(_) => return Vec::new(),
        };
        let mut records = Vec::new();
        for (i, line) in BufReader::new(&content[..]).lines().enumerate() {
            match line.ok().as_deref().and_then(Record::parse) {
                Some(record) => records.push(record),
                None => warn!("skipping malformed line {} in {}", i + 1, self.path.display()),
            }
        }
        records
    }

    /// Overwrite the file with `records`. Creates the parent directory if needed.
    pub fn save(&self, records: &[Record]) -> Result<(), RecordsError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut f = fs::File::create(&self.path)?;
        for record in records {
            writeln!(f, "{},{}", record.name, record.score)?;
        }
        Ok(())
    }

    /// Insert a result, keep the best [`MAX_RECORDS`] and persist them.
    /// Returns the new board and the rank (0-based) of the added record, if it made the cut.
    pub fn add(&self, name: &str, score: u64) -> Result<(Vec<Record>, Option<usize>), RecordsError> {
        let record = Record::new(name, score);
        let mut records = self.load();
        records.push(record);
        let added = records.len() - 1;
        let mut ranked: Vec<(usize, Record)> = records.into_iter().enumerate().collect();
        // stable: equal scores keep older entries first
        ranked.sort_by(|a, b| b.1.score.cmp(&a.1.score));
        ranked.truncate(MAX_RECORDS);
        let rank = ranked.iter().position(|(i, _)| *i == added);
        let records: Vec<Record> = ranked.into_iter().map(|(_, r)| r).collect();
        self.save(&records)?;
        info!("saved score {} ({} records, rank {:?})", score, records.len(), rank);
        Ok((records, rank))
    }
}
