//! Incremental line splitting over arbitrary byte chunks.
//!
//! At most `max_line_bytes` of the current line is held in memory. Longer
//! lines are reported as [`RawLine::Oversized`] once their terminator arrives
//! and the excess bytes are dropped as they stream past.

#[derive(Debug, PartialEq, Eq)]
pub enum RawLine<'a> {
    /// Line content without the `\n` terminator.
    Text(&'a [u8]),
    Oversized { len: usize },
}

#[derive(Debug)]
pub struct LineSplitter {
    buf: Vec<u8>,
    max_line_bytes: usize,
    seen: usize,
    overflow: bool,
}

impl LineSplitter {
    pub fn new(max_line_bytes: usize) -> Self {
        Self {
            buf: Vec::new(),
            max_line_bytes,
            seen: 0,
            overflow: false,
        }
    }

    /// Feed one chunk, calling `on_line` for every line it completes.
    pub fn push(&mut self, mut chunk: &[u8], on_line: &mut impl FnMut(RawLine<'_>)) {
        while !chunk.is_empty() {
            match chunk.iter().position(|&b| b == b'\n') {
                Some(pos) => {
                    self.absorb(&chunk[..pos]);
                    self.emit(on_line);
                    chunk = &chunk[pos + 1..];
                }
                None => {
                    self.absorb(chunk);
                    break;
                }
            }
        }
    }

    /// Flush a final line that had no terminator.
    pub fn finish(&mut self, on_line: &mut impl FnMut(RawLine<'_>)) {
        if self.seen > 0 {
            self.emit(on_line);
        }
    }

    fn absorb(&mut self, bytes: &[u8]) {
        self.seen += bytes.len();
        if self.overflow {
            return;
        }
        if self.buf.len() + bytes.len() > self.max_line_bytes {
            self.overflow = true;
            self.buf.clear();
            self.buf.shrink_to(self.max_line_bytes);
            return;
        }
        self.buf.extend_from_slice(bytes);
    }

    fn emit(&mut self, on_line: &mut impl FnMut(RawLine<'_>)) {
        if self.overflow {
            on_line(RawLine::Oversized { len: self.seen });
        } else {
            on_line(RawLine::Text(&self.buf));
        }
        self.buf.clear();
        self.seen = 0;
        self.overflow = false;
    }
}
