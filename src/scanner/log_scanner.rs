use crate::error::ScanError;
use crate::scanner::LineAssembler;
use crate::state::OffsetStore;
use log::{debug, info, warn};
use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};

/// Read chunk size for log streaming
const CHUNK_SIZE: usize = 8 * 1024;

/// Number of lines in a context block: the matching line plus up to two
/// following lines
const CONTEXT_LINES: usize = 3;

/// A keyword hit in a log file together with its context block
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordMatch {
    /// The configured keyword that matched
    pub keyword: String,
    /// The matching line plus up to two following lines, in file order
    pub context: Vec<String>,
}

impl KeywordMatch {
    /// The context lines joined into a single block
    pub fn block(&self) -> String {
        self.context.join("\n")
    }
}

/// Result of scanning one file's unread region
#[derive(Debug)]
pub struct FileScan {
    /// Keyword hits in order of first appearance
    pub matches: Vec<KeywordMatch>,
    /// Offset to commit: the end of the last completed line in the scanned
    /// region. A trailing unterminated line lies beyond this offset and is
    /// re-read in full on the next run.
    pub end_offset: u64,
}

/// Accumulates keyword matches and fills their trailing context lines
struct MatchCollector {
    /// Lowercased keywords paired with their original spelling
    keywords: Vec<(String, String)>,
    matches: Vec<KeywordMatch>,
    /// Indices of matches still waiting for context lines
    open: Vec<usize>,
}

impl MatchCollector {
    fn new(keywords: &[String]) -> Self {
        Self {
            keywords: keywords
                .iter()
                .map(|k| (k.to_lowercase(), k.clone()))
                .collect(),
            matches: Vec::new(),
            open: Vec::new(),
        }
    }

    /// Observe one completed logical line
    ///
    /// The line is first appended to every match still collecting context,
    /// then checked for new keyword hits. A line matching several keywords
    /// opens one match per keyword.
    fn push_line(&mut self, line: &str) {
        for &idx in &self.open {
            self.matches[idx].context.push(line.to_string());
        }
        self.open
            .retain(|&idx| self.matches[idx].context.len() < CONTEXT_LINES);

        let lowered = line.to_lowercase();
        for (needle, original) in &self.keywords {
            if lowered.contains(needle.as_str()) {
                self.matches.push(KeywordMatch {
                    keyword: original.clone(),
                    context: vec![line.to_string()],
                });
                self.open.push(self.matches.len() - 1);
            }
        }
    }

    /// Finish the scan, accepting short context blocks at end of stream
    fn finish(self) -> Vec<KeywordMatch> {
        self.matches
    }
}

/// Scan a single log file's unread region for keywords
///
/// Stats the file, streams `[from_offset, size)` in chunks, reassembles
/// logical lines across chunk boundaries and matches each completed line
/// case-insensitively against every keyword. The trailing unterminated line
/// is not matched and its bytes are not committed, so it is re-read from
/// its own starting offset on a later run once its newline has arrived.
///
/// A stored offset beyond the current size means the file was truncated or
/// rotated; the scan restarts from the beginning.
///
/// # Errors
///
/// Returns `ScanError` if the file cannot be stated, opened or read. The
/// caller leaves the stored offset untouched so the region is retried.
pub fn scan_file(
    path: &str,
    from_offset: u64,
    keywords: &[String],
) -> Result<FileScan, ScanError> {
    let size = fs::metadata(path)
        .map_err(|e| ScanError::Stat(format!("{}: {}", path, e)))?
        .len();

    let mut offset = from_offset;
    if offset > size {
        warn!(
            "Stored offset {} beyond current size {} of {}, rescanning from start",
            offset, size, path
        );
        offset = 0;
    }

    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(offset))?;

    let mut assembler = LineAssembler::new();
    let mut collector = MatchCollector::new(keywords);
    let mut chunk = [0u8; CHUNK_SIZE];
    let mut remaining = size - offset;
    let mut consumed: u64 = 0;

    while remaining > 0 {
        let want = remaining.min(CHUNK_SIZE as u64) as usize;
        let read = file.read(&mut chunk[..want])?;
        if read == 0 {
            // File shrank underneath us; commit what we saw
            break;
        }
        for line in assembler.push(&chunk[..read]) {
            collector.push_line(&line);
        }
        consumed += read as u64;
        remaining -= read as u64;
    }

    // Back the committed offset up over the held-back partial line so its
    // bytes are re-read next run
    let end_offset = offset + consumed - assembler.carry_len() as u64;

    let matches = collector.finish();
    debug!(
        "Scanned {} bytes {}..{}: {} match(es)",
        path,
        offset,
        end_offset,
        matches.len()
    );

    Ok(FileScan {
        matches,
        end_offset,
    })
}

/// Format one file's matches into an issue string: a file header, then one
/// block per match, blocks separated by a blank line
fn format_file_issue(path: &str, matches: &[KeywordMatch]) -> String {
    let sections: Vec<String> = matches
        .iter()
        .map(|m| format!("Word: \"{}\"\nContext:\n{}", m.keyword, m.block()))
        .collect();
    format!("Log file {}:\n{}", path, sections.join("\n\n"))
}

/// Scan every configured log file and commit offsets as a side effect
///
/// Each file is handled independently: its unread region is scanned, its
/// offset is committed and the table is saved before moving on, whether or
/// not anything matched. A failing file is logged and skipped with its
/// offset left unchanged, so the same region is retried next run.
///
/// Returns a joined issue string when any file produced matches.
pub fn scan_logs(
    files: &[String],
    keywords: &[String],
    store: &mut OffsetStore,
) -> Option<String> {
    let mut issues = Vec::new();

    for file in files {
        let from = store.offset(file);
        match scan_file(file, from, keywords) {
            Ok(scan) => {
                if !scan.matches.is_empty() {
                    info!(
                        "{} keyword match(es) in {}",
                        scan.matches.len(),
                        file
                    );
                    issues.push(format_file_issue(file, &scan.matches));
                }
                store.commit(file, scan.end_offset);
                if let Err(e) = store.save() {
                    warn!("Failed to save offset table: {}", e);
                }
            }
            Err(e) => {
                warn!("Skipping log file {}: {}", file, e);
            }
        }
    }

    if issues.is_empty() {
        None
    } else {
        Some(issues.join("\n"))
    }
}
