/// Geometry of the hex dump inside a capture block.
///
/// The monitor wraps the dump into fixed-width rows. Every row is
/// `row_width` characters of block text (line break and left margin
/// included), and characters `hex_start..hex_end` of a row hold the
/// space-separated hex bytes. The rest of the row is the ASCII column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Characters per dump row.
    pub row_width: usize,
    /// First character of the hex field within a row.
    pub hex_start: usize,
    /// One past the last character of the hex field within a row.
    pub hex_end: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            row_width: 72,
            hex_start: 3,
            hex_end: 50,
        }
    }
}
