use std::{
    fmt::Debug,
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use log::{info, warn};

/// Receives the cost samples taken during training.
pub trait Logger: Debug {
    fn cost(&mut self, iteration: usize, cost: f32);
}

/// Reports costs through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn cost(&mut self, iteration: usize, cost: f32) {
        info!("Cost after {} iterations: {}", iteration, cost);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MockLogger;

impl Logger for MockLogger {
    fn cost(&mut self, _iteration: usize, _cost: f32) {}
}

/// Writes `iteration,cost` lines to a file.
#[derive(Debug)]
pub struct LogFile {
    file: PathBuf,
    writer: BufWriter<File>,
}

impl LogFile {
    pub fn new<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let mut writer = BufWriter::new(File::create(&path)?);
        writeln!(writer, "iteration,cost")?;
        Ok(Self {
            file: path.as_ref().to_owned(),
            writer,
        })
    }
}

impl Logger for LogFile {
    fn cost(&mut self, iteration: usize, cost: f32) {
        let written =
            writeln!(self.writer, "{},{}", iteration, cost).and_then(|_| self.writer.flush());
        if let Err(e) = written {
            warn!(
                "Error while logging cost to file: {}\nError: {}",
                self.file.display(),
                e
            );
        }
    }
}
