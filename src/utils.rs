use std::{fs, io};
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::{Duration, Instant};

/// Reads one class name per line, skipping blank lines.
pub(crate) fn file_to_vec(filename: &Path) -> io::Result<Vec<String>> {
    let file_in = fs::File::open(filename)?;
    let file_reader = BufReader::new(file_in);
    let mut names = Vec::new();
    for line in file_reader.lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() {
            names.push(line.to_string());
        }
    }
    Ok(names)
}

/// Logs the time spent in `l_step` since `previous` and returns the new mark.
pub(crate) fn trace(l_step: &str, detect: Instant, previous: Duration) -> Duration {
    let elapsed = detect.elapsed();
    log::trace!("TIME | Total={:.2?} | {}={:.2?}", elapsed, l_step, elapsed - previous);
    elapsed
}
