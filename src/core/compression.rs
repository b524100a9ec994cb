//! zlib compression for packed transactions and the bounded decompressor that guards
//! against decompression bombs.

use flate2::write::ZlibEncoder;
use flate2::{Decompress, FlushDecompress, Status};
use std::fmt;
use std::io::{self, Write};
use tracing::warn;

use crate::error::{ChainError, Result};

/// Decompressed-size ceiling for packed transaction blobs (1 MiB).
pub const DEFAULT_MAX_DECOMPRESSED_SIZE: usize = 1024 * 1024;

/// Compression applied to both blobs of a packed transaction. Wire values: `0 = none`, `1 = zlib`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Compression {
    #[default]
    None,
    Zlib,
}

impl Compression {
    pub const fn tag(self) -> u8 {
        match self {
            Compression::None => 0,
            Compression::Zlib => 1,
        }
    }
}

impl TryFrom<u8> for Compression {
    type Error = ChainError;

    fn try_from(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(Compression::None),
            1 => Ok(Compression::Zlib),
            other => Err(ChainError::UnknownCompression(other)),
        }
    }
}

impl std::str::FromStr for Compression {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(Compression::None),
            "zlib" => Ok(Compression::Zlib),
            other => Err(ChainError::Config(format!("unknown compression \"{}\"", other))),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::None => f.write_str("none"),
            Compression::Zlib => f.write_str("zlib"),
        }
    }
}

/// zlib at the best compression level. Output is not bounded.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::best());
    encoder
        .write_all(data)
        .and_then(|_| encoder.finish())
        .map_err(|e| ChainError::MalformedEncoding(format!("zlib compression failed: {}", e)))
}

/// Output sink that refuses any write taking the total past `limit`.
struct LimitedSink {
    out: Vec<u8>,
    limit: usize,
}

impl Write for LimitedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.len() > self.limit - self.out.len() {
            return Err(io::Error::new(io::ErrorKind::Other, "decompressed size limit exceeded"));
        }
        self.out.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

const INFLATE_CHUNK: usize = 32 * 1024;

/// Streaming zlib decompressor with a hard ceiling on cumulative output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedDecompressor {
    limit: usize,
}

impl BoundedDecompressor {
    pub const fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Inflates `data`. Aborts with `DecompressionBomb` as soon as the output would pass the
    /// ceiling; partial output is discarded. The input must be exactly one complete zlib
    /// stream: truncated input or trailing bytes are `MalformedEncoding`.
    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut inflater = Decompress::new(true);
        let mut sink = LimitedSink {
            out: Vec::new(),
            limit: self.limit,
        };
        let mut chunk = vec![0u8; INFLATE_CHUNK];

        loop {
            let consumed = inflater.total_in() as usize;
            let produced_before = inflater.total_out();
            let status = inflater
                .decompress(&data[consumed..], &mut chunk, FlushDecompress::None)
                .map_err(|e| ChainError::MalformedEncoding(format!("zlib decompression failed: {}", e)))?;
            let produced = (inflater.total_out() - produced_before) as usize;

            if sink.write_all(&chunk[..produced]).is_err() {
                warn!(limit = self.limit, compressed = data.len(), "rejected oversized decompression");
                return Err(ChainError::DecompressionBomb { limit: self.limit });
            }

            match status {
                Status::StreamEnd => break,
                Status::Ok | Status::BufError => {
                    if produced == 0 && inflater.total_in() as usize == consumed {
                        return Err(ChainError::MalformedEncoding("truncated zlib stream".to_string()));
                    }
                }
            }
        }

        if inflater.total_in() as usize != data.len() {
            return Err(ChainError::MalformedEncoding("trailing bytes after zlib stream".to_string()));
        }
        Ok(sink.out)
    }
}

impl Default for BoundedDecompressor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DECOMPRESSED_SIZE)
    }
}
