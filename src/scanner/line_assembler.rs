/// Reassembles logical lines from arbitrarily sized byte chunks
///
/// File reads deliver chunks at arbitrary positions, so a logical line may
/// span a chunk boundary. The assembler buffers the trailing partial line
/// from each chunk and prepends it to the next, guaranteeing that no line is
/// ever split or duplicated regardless of how the stream was chunked. The
/// final partial line (no trailing newline yet) is held back and never
/// emitted; callers re-read it from its own offset on a later run.
///
/// Line splitting happens on raw bytes and each completed line is decoded
/// lossily on emission, so a multi-byte character spanning a chunk boundary
/// is reassembled intact.
#[derive(Debug, Default)]
pub struct LineAssembler {
    /// Bytes of the current unterminated line
    carry: Vec<u8>,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes, returning all lines completed by it
    ///
    /// A trailing `\r` is stripped so CRLF logs match the same as LF logs.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.carry.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.carry.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.carry.drain(..=pos).collect();
            line.pop(); // the newline itself
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// The buffered partial line, if any
    pub fn partial(&self) -> Option<String> {
        if self.carry.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&self.carry).into_owned())
        }
    }

    /// Number of buffered bytes in the partial line
    ///
    /// The scanner backs its committed offset up by this amount so the
    /// held-back line is re-read in full on the next run.
    pub fn carry_len(&self) -> usize {
        self.carry.len()
    }
}


// Property-based tests
#[cfg(test)]
mod property_tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    /// Split `data` at the given cut points and feed the pieces one by one
    fn assemble_chunked(data: &[u8], cuts: &[usize]) -> (Vec<String>, Option<String>) {
        let mut bounds: Vec<usize> = cuts.iter().map(|&c| c % (data.len() + 1)).collect();
        bounds.push(0);
        bounds.push(data.len());
        bounds.sort_unstable();

        let mut assembler = LineAssembler::new();
        let mut lines = Vec::new();
        for pair in bounds.windows(2) {
            lines.extend(assembler.push(&data[pair[0]..pair[1]]));
        }
        (lines, assembler.partial())
    }

    // Any chunking of the same byte stream yields the same line sequence
    // and the same held-back partial line.
    #[quickcheck]
    fn prop_chunk_boundary_invariance(data: Vec<u8>, cuts: Vec<usize>) -> bool {
        let mut whole = LineAssembler::new();
        let expected_lines = whole.push(&data);
        let expected_partial = whole.partial();

        let (lines, partial) = assemble_chunked(&data, &cuts);
        lines == expected_lines && partial == expected_partial
    }

    // Completed lines plus the partial always reconstruct the input text
    // for newline-free-of-CR ASCII input.
    #[quickcheck]
    fn prop_no_bytes_lost_for_ascii(words: Vec<String>, cuts: Vec<usize>) -> bool {
        let data: String = words
            .iter()
            .map(|w| {
                let clean: String = w
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
                    .collect();
                format!("{}\n", clean)
            })
            .collect();

        let (lines, partial) = assemble_chunked(data.as_bytes(), &cuts);
        let mut rebuilt: String = lines.iter().map(|l| format!("{}\n", l)).collect();
        if let Some(p) = partial {
            rebuilt.push_str(&p);
        }
        rebuilt == data
    }
}
