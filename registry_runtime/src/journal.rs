//! Append-only commit journal — binary protobuf log.
//!
//! Storage format: length-prefixed protobuf frames.
//!   [4-byte LE length][ProtoCommit bytes][4-byte LE length][ProtoCommit bytes]...
//!
//! Rules:
//!   - Strict append only: existing frames are never rewritten
//!   - Sequence starts at 1 and increases by exactly 1 per commit
//!   - fsync after every write unless disabled in config
//!   - A zero-length, oversized or truncated frame fails the whole load

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use prost::Message;

use crate::proto_types::ProtoCommit;

/// Largest frame accepted on load.
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// Append-only commit log backed by a binary file.
pub struct Journal {
    path: PathBuf,
    last_sequence: u64,
    fsync: bool,
}

impl Journal {
    /// Open or create a journal at the given path.
    /// Reads existing commits to find the last sequence number.
    pub fn open(path: &Path, fsync: bool) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let last_sequence = if path.exists() {
            read_frames(path)?.last().map(|c| c.sequence).unwrap_or(0)
        } else {
            0
        };

        Ok(Self {
            path: path.to_path_buf(),
            last_sequence,
            fsync,
        })
    }

    /// Append one commit. Its sequence must be `last_sequence() + 1`.
    pub fn append_commit(&mut self, commit: &ProtoCommit) -> io::Result<()> {
        let expected = self.last_sequence + 1;
        if commit.sequence != expected {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "Sequence violation in journal: expected {}, got {}",
                    expected, commit.sequence
                ),
            ));
        }

        let buf = commit.encode_to_vec();
        let len = u32::try_from(buf.len())
            .ok()
            .filter(|&n| n as usize <= MAX_FRAME_LEN)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("Commit frame too large: {} bytes", buf.len()),
                )
            })?;

        let mut frame = Vec::with_capacity(4 + buf.len());
        frame.extend_from_slice(&len.to_le_bytes());
        frame.extend_from_slice(&buf);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        append_frame(&file, BufWriter::new(&file), &frame)?;
        if self.fsync {
            file.sync_all()?;
        }

        self.last_sequence = commit.sequence;
        tracing::debug!(sequence = commit.sequence, bytes = buf.len(), "journal frame appended");
        Ok(())
    }

    /// Load every commit in sequence order.
    pub fn load_all(&self) -> io::Result<Vec<ProtoCommit>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        read_frames(&self.path)
    }

    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Write `frame` through `sink` at the end of `file`. If the write fails
/// part way, `file` is cut back to its previous length so the journal
/// stays loadable.
fn append_frame<W: Write>(file: &File, mut sink: W, frame: &[u8]) -> io::Result<()> {
    let start = file.metadata()?.len();
    let written = sink.write_all(frame).and_then(|_| sink.flush());
    drop(sink);
    if let Err(err) = written {
        if let Err(trunc) = file.set_len(start) {
            tracing::error!(error = %trunc, length = start, "failed to drop partial journal frame");
        }
        return Err(err);
    }
    Ok(())
}

/// Read all frames, checking frame integrity and sequence continuity.
fn read_frames(path: &Path) -> io::Result<Vec<ProtoCommit>> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut commits: Vec<ProtoCommit> = Vec::new();

    while let Some(len_buf) = read_len_prefix(&mut reader)? {
        let len = u32::from_le_bytes(len_buf) as usize;
        if len == 0 || len > MAX_FRAME_LEN {
            return Err(invalid(format!("Invalid frame length: {}", len)));
        }

        let mut frame = vec![0u8; len];
        reader
            .read_exact(&mut frame)
            .map_err(|e| invalid(format!("Truncated frame after commit {}: {}", commits.len(), e)))?;

        let commit = ProtoCommit::decode(frame.as_slice())
            .map_err(|e| invalid(format!("Protobuf decode error: {}", e)))?;

        let expected = commits.last().map(|c| c.sequence).unwrap_or(0) + 1;
        if commit.sequence != expected {
            return Err(invalid(format!(
                "Journal out of sequence: expected {}, got {}",
                expected, commit.sequence
            )));
        }
        commits.push(commit);
    }

    Ok(commits)
}

/// Next length prefix; `None` at a clean end of file.
fn read_len_prefix<R: Read>(reader: &mut R) -> io::Result<Option<[u8; 4]>> {
    let mut buf = [0u8; 4];
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    match filled {
        0 => Ok(None),
        4 => Ok(Some(buf)),
        n => Err(invalid(format!("Truncated length prefix: {} of 4 bytes", n))),
    }
}

fn invalid(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}
