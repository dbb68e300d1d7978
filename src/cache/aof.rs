//! Append-Only Log Module
//!
//! Text log of every successful `put`, one record per line:
//!
//! ```text
//! PUT <key> <value> <expires_at_ms>
//! ```
//!
//! The last field is the absolute expiry timestamp in Unix milliseconds.
//! The file is only ever appended to and is read once, front to back, when
//! a cache is constructed.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::{CacheError, Result};

/// Default log file name, relative to the working directory.
pub const DEFAULT_AOF_FILE: &str = "appendonly.aof";

// == Log Operation ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOp {
    Put,
}

impl fmt::Display for LogOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogOp::Put => f.write_str("PUT"),
        }
    }
}

impl FromStr for LogOp {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "PUT" => Ok(LogOp::Put),
            other => Err(format!("unknown operation '{}'", other)),
        }
    }
}

// == Log Record ==
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub op: LogOp,
    pub key: String,
    pub value: String,
    pub expires_at: u64,
}

impl LogRecord {
    pub fn put(key: &str, value: &str, expires_at: u64) -> Self {
        Self {
            op: LogOp::Put,
            key: key.to_owned(),
            value: value.to_owned(),
            expires_at,
        }
    }

    /// Parses one log line; `line_no` is 1-based and only used for errors.
    pub fn parse(line: &str, line_no: usize) -> Result<Self> {
        let malformed = |reason: String| CacheError::MalformedRecord {
            line: line_no,
            reason,
        };

        let fields: Vec<&str> = line.split_whitespace().collect();
        let [op, key, value, expires_at] = fields.as_slice() else {
            return Err(malformed(format!(
                "expected 4 fields, found {}",
                fields.len()
            )));
        };

        let op = op.parse::<LogOp>().map_err(malformed)?;
        let expires_at = expires_at
            .parse::<u64>()
            .map_err(|_| malformed(format!("non-numeric expiry '{}'", expires_at)))?;

        Ok(Self {
            op,
            key: (*key).to_owned(),
            value: (*value).to_owned(),
            expires_at,
        })
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.op, self.key, self.value, self.expires_at
        )
    }
}

// == Append Log ==
/// Handle on the append-only file. The writer is opened lazily and dropped
/// after a failed write so the next append reopens it.
#[derive(Debug)]
pub struct AppendLog {
    path: PathBuf,
    writer: Option<File>,
    fsync: bool,
}

impl AppendLog {
    pub fn new(path: impl Into<PathBuf>, fsync: bool) -> Self {
        Self {
            path: path.into(),
            writer: None,
            fsync,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // == Append ==
    /// Writes one record and flushes it before returning.
    pub fn append(&mut self, record: &LogRecord) -> Result<()> {
        self.write_line(record).map_err(CacheError::from)
    }

    fn write_line(&mut self, record: &LogRecord) -> io::Result<()> {
        // Taken out so a failed write leaves no writer behind
        let mut file = match self.writer.take() {
            Some(file) => file,
            None => self.open_writer()?,
        };

        // One write per record so a line is never split across calls
        let line = format!("{}\n", record);
        file.write_all(line.as_bytes())?;
        file.flush()?;
        if self.fsync {
            file.sync_data()?;
        }
        self.writer = Some(file);
        Ok(())
    }

    /// Opens the file for appending. A torn last line left by a crash is
    /// terminated first so the next record starts on its own line.
    fn open_writer(&self) -> io::Result<File> {
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        let len = file.metadata()?.len();
        if len > 0 {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::Start(len - 1))?;
            file.read_exact(&mut last)?;
            if last[0] != b'\n' {
                warn!(
                    "Terminating partial last line in {}",
                    self.path.display()
                );
                file.write_all(b"\n")?;
            }
        }
        Ok(file)
    }

    // == Replay ==
    /// Reads every well-formed record in file order.
    ///
    /// A missing file yields no records. Malformed lines, including lines
    /// that are not valid UTF-8, are logged and skipped. A read error stops
    /// the scan and keeps what was read so far.
    pub fn replay(&self) -> Result<Replay> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("No append-only log at {}", self.path.display());
                return Ok(Replay::default());
            }
            Err(err) => return Err(err.into()),
        };

        let mut replay = Replay::default();
        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        let mut line_no = 0;
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => line_no += 1,
                Err(err) => {
                    warn!(
                        "Stopped reading {} at line {}: {}",
                        self.path.display(),
                        line_no + 1,
                        err
                    );
                    replay.truncated = true;
                    break;
                }
            }

            let Ok(line) = std::str::from_utf8(&buf) else {
                warn!("Skipping log record at line {}: not valid UTF-8", line_no);
                replay.malformed += 1;
                continue;
            };
            if line.trim().is_empty() {
                continue;
            }
            match LogRecord::parse(line, line_no) {
                Ok(record) => replay.records.push(record),
                Err(err) => {
                    warn!("Skipping log record: {}", err);
                    replay.malformed += 1;
                }
            }
        }
        Ok(replay)
    }

    /// Size of the log file in bytes, 0 if it does not exist.
    pub fn file_size(&self) -> u64 {
        fs::metadata(&self.path).map(|meta| meta.len()).unwrap_or(0)
    }
}

/// Result of reading the log back.
#[derive(Debug, Default)]
pub struct Replay {
    pub records: Vec<LogRecord>,
    pub malformed: usize,
    /// True if a read error cut the scan short
    pub truncated: bool,
}
