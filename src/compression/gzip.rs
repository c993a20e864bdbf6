//! Resettable gzip stream encoder.
//!
//! `flate2::write::GzEncoder` owns its writer and cannot be reset, so the
//! pooled encoder drives a raw deflate stream (`flate2::Compress`) and
//! frames it as gzip itself: a fixed 10-byte header, the deflate data, then
//! CRC-32 and input size as little-endian `u32`s.
//!
//! Wrapping a `GzEncoder<Vec<u8>>` and draining `get_mut()` was not used:
//! the encoder is only released by `finish()`, which consumes it, so every
//! response would allocate fresh deflate state and the pool would hold
//! nothing reusable. The framing matches what `GzEncoder` emits at the
//! default level.

use std::io;

use flate2::{Compress, Compression, Crc, FlushCompress, Status};

/// Minimum spare output capacity before each deflate call.
const CHUNK: usize = 8 * 1024;

/// Magic, CM=deflate, no flags, no mtime, no extra flags, OS unknown.
const GZIP_HEADER: [u8; 10] = [0x1f, 0x8b, 0x08, 0, 0, 0, 0, 0, 0, 0xff];

pub struct GzipEncoder {
    deflate: Compress,
    crc: Crc,
    header_written: bool,
}

impl GzipEncoder {
    pub fn new(level: Compression) -> Self {
        Self {
            deflate: Compress::new(level, false),
            crc: Crc::new(),
            header_written: false,
        }
    }

    /// Prepare the encoder for a new stream.
    pub fn reset(&mut self) {
        self.deflate.reset();
        self.crc.reset();
        self.header_written = false;
    }

    /// Compress `input`, appending whatever output is ready to `out`.
    pub fn write(&mut self, input: &[u8], out: &mut Vec<u8>) -> io::Result<()> {
        self.write_header(out);
        self.crc.update(input);
        self.deflate(input, FlushCompress::None, out)
    }

    /// Flush the remaining data and the gzip trailer into `out`.
    pub fn finish(&mut self, out: &mut Vec<u8>) -> io::Result<()> {
        self.write_header(out);
        self.deflate(&[], FlushCompress::Finish, out)?;
        out.extend_from_slice(&self.crc.sum().to_le_bytes());
        out.extend_from_slice(&self.crc.amount().to_le_bytes());
        Ok(())
    }

    fn write_header(&mut self, out: &mut Vec<u8>) {
        if !self.header_written {
            out.extend_from_slice(&GZIP_HEADER);
            self.header_written = true;
        }
    }

    fn deflate(&mut self, mut input: &[u8], flush: FlushCompress, out: &mut Vec<u8>) -> io::Result<()> {
        let finishing = matches!(flush, FlushCompress::Finish);
        loop {
            out.reserve(CHUNK);
            let before_in = self.deflate.total_in();
            let before_out = self.deflate.total_out();

            let status = self
                .deflate
                .compress_vec(input, out, flush)
                .map_err(io::Error::other)?;

            let consumed = (self.deflate.total_in() - before_in) as usize;
            input = &input[consumed..];
            let progressed = consumed > 0 || self.deflate.total_out() > before_out;
            let out_full = out.len() == out.capacity();

            match status {
                Status::StreamEnd => return Ok(()),
                Status::Ok | Status::BufError => {
                    // deflate stops early only when it ran out of output space;
                    // no progress with room to spare is a corrupt stream
                    if !finishing && input.is_empty() && !out_full {
                        return Ok(());
                    }
                    if !progressed && !out_full {
                        return Err(io::Error::other("deflate stream stalled"));
                    }
                }
            }
        }
    }
}
