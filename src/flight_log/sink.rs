use std::{
    fs::{File, OpenOptions},
    io::{self, BufWriter, Write},
    path::Path,
};

/// A durable, append-only destination for flight log lines.
pub trait LogSink {
    /// Current size of the persisted log in bytes.
    fn size(&mut self) -> io::Result<u64>;

    /// Appends one complete line (including its newline).
    fn append(&mut self, line: &str) -> io::Result<()>;

    /// Flushes everything to the medium and releases it.
    fn close(self) -> io::Result<()>;
}

/// A flight log file on the onboard filesystem.
pub struct FileSink {
    writer: BufWriter<File>,
    written: u64,
}

impl FileSink {
    /// Creates or truncates the file at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).write(true).truncate(true).open(path.as_ref())?;
        Ok(Self { writer: BufWriter::new(file), written: 0 })
    }
}

impl LogSink for FileSink {
    fn size(&mut self) -> io::Result<u64> { Ok(self.written) }

    /// Writes and flushes `line`, so [`LogSink::size`] only counts bytes handed to the
    /// filesystem and write failures surface on the row that caused them.
    fn append(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.flush()?;
        self.written += line.len() as u64;
        Ok(())
    }

    fn close(mut self) -> io::Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()
    }
}

/// Checks whether the log location accepts writes, without truncating an existing log.
pub fn probe_storage<P: AsRef<Path>>(path: P) -> bool {
    OpenOptions::new().create(true).append(true).open(path).is_ok()
}
