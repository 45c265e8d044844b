//! Gzip decoding of `Content-Encoding: gzip` bodies.

use std::io::{self, Write};

use bytes::Bytes;
use flate2::write::MultiGzDecoder;

use super::{Stage, StageErrorKind};

/// Push-based gzip decoder: compressed chunks in, decoded chunks out.
///
/// Concatenated gzip members decode as one body. With a limit, decoding
/// stops as soon as the output passes it, so a small compressed chunk never
/// inflates far beyond the limit in memory.
pub struct GzipStage {
    decoder: MultiGzDecoder<Vec<u8>>,
    limit:   Option<u64>,
    emitted: u64,
}

impl GzipStage {
    pub fn new() -> Self {
        Self {
            decoder: MultiGzDecoder::new(Vec::new()),
            limit:   None,
            emitted: 0,
        }
    }

    /// Fails with [`StageErrorKind::LimitExceeded`] once more than `limit`
    /// decoded bytes are produced.
    pub fn with_limit(limit: u64) -> Self {
        Self {
            limit: Some(limit),
            ..Self::new()
        }
    }

    fn check_limit(&self) -> Result<(), StageErrorKind> {
        match self.limit {
            Some(limit) if self.emitted + self.decoder.get_ref().len() as u64 > limit => {
                Err(StageErrorKind::LimitExceeded { limit })
            }
            _ => Ok(()),
        }
    }

    fn take_output(&mut self) -> Bytes {
        let out = std::mem::take(self.decoder.get_mut());
        self.emitted += out.len() as u64;
        Bytes::from(out)
    }
}

impl Default for GzipStage {
    fn default() -> Self { Self::new() }
}

impl Stage for GzipStage {
    fn name(&self) -> &'static str { "gzip" }

    fn process(&mut self, chunk: Bytes) -> Result<Bytes, StageErrorKind> {
        // Each write inflates at most one internal buffer's worth, so the
        // limit is checked between writes rather than after the whole chunk.
        let mut input = &chunk[..];
        while !input.is_empty() {
            let n = self.decoder.write(input).map_err(StageErrorKind::Decode)?;
            if n == 0 {
                return Err(StageErrorKind::Decode(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "gzip decoder accepted no input",
                )));
            }
            input = &input[n..];
            self.check_limit()?;
        }
        self.decoder.flush().map_err(StageErrorKind::Decode)?;
        self.check_limit()?;
        Ok(self.take_output())
    }

    fn finish(&mut self) -> Result<Bytes, StageErrorKind> {
        self.decoder.try_finish().map_err(StageErrorKind::Decode)?;
        self.check_limit()?;
        Ok(self.take_output())
    }
}
