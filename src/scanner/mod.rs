/// Chunk-to-line reassembly with a carry buffer
pub mod line_assembler;

/// Incremental keyword scanning of log files
pub mod log_scanner;

pub use line_assembler::LineAssembler;
pub use log_scanner::{scan_file, scan_logs, FileScan, KeywordMatch};
