use secretion_data::Frame;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Writes one [`Frame`] JSON line per recorded frame.
pub struct Recorder {
    file: Option<BufWriter<File>>,
    frames: u64,
}

impl Recorder {
    /// Creates (or truncates) `path`, making parent directories as needed.
    pub fn create(path: &Path) -> anyhow::Result<Self> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let file = File::create(path)?;
        Ok(Self {
            file: Some(BufWriter::new(file)),
            frames: 0,
        })
    }

    /// A recorder that only counts frames.
    pub fn new_dummy() -> Self {
        Self {
            file: None,
            frames: 0,
        }
    }

    pub fn record(&mut self, frame: &Frame) -> anyhow::Result<()> {
        if let Some(ref mut file) = self.file {
            let json = serde_json::to_string(frame)?;
            writeln!(file, "{}", json)?;
        }
        self.frames += 1;
        Ok(())
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn flush(&mut self) -> anyhow::Result<()> {
        if let Some(ref mut file) = self.file {
            file.flush()?;
        }
        Ok(())
    }
}

/// Reads back a file written by [`Recorder`]. Blank lines are skipped.
pub fn read_frames(path: &Path) -> anyhow::Result<Vec<Frame>> {
    let reader = BufReader::new(File::open(path)?);
    let mut frames = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        frames.push(serde_json::from_str(&line)?);
    }
    Ok(frames)
}
