//! Ordered transform stages applied to a response body.
//!
//! A [`Pipeline`] is built once per fetch from its configuration and the response
//! headers. Chunks flow through the stages in order; a failing stage is
//! reported by name so a decode error is never confused with a size limit.

mod decompress;
mod digest;
mod limit;

use std::io;

use bytes::{Bytes, BytesMut};
use refetch_verify::HexDigest;

pub use decompress::GzipStage;
pub use digest::DigestStage;
pub use limit::SizeLimitStage;

use crate::data::FetchSpec;

#[derive(Debug, thiserror::Error)]
pub enum StageErrorKind {
    #[error("invalid encoded data")]
    Decode(#[source] io::Error),

    #[error("size limit of {limit} bytes exceeded")]
    LimitExceeded { limit: u64 },
}

#[derive(Debug, thiserror::Error)]
#[error("stage {stage} failed")]
pub struct StageError {
    pub stage:  &'static str,
    #[source]
    pub kind:   StageErrorKind,
}

/// What stages learned about the body once it has been fully processed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub digest: Option<HexDigest>,
}

pub trait Stage: Send {
    fn name(&self) -> &'static str;

    fn process(&mut self, chunk: Bytes) -> Result<Bytes, StageErrorKind>;

    /// Flushes buffered output once the input is exhausted.
    fn finish(&mut self) -> Result<Bytes, StageErrorKind> { Ok(Bytes::new()) }

    fn report(self: Box<Self>, _report: &mut PipelineReport) {}
}

#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new() -> Self { Self::default() }

    /// Stages for a fetch: `gzip` when the body is gzip encoded, then `limit`
    /// and `digest` when configured, so both see decoded bytes.
    pub fn for_spec(spec: &FetchSpec, gzip: bool) -> Self {
        let mut pipeline = Self::new();
        if gzip {
            pipeline.push(match spec.max_size {
                Some(limit) => GzipStage::with_limit(limit),
                None => GzipStage::new(),
            });
        }
        if let Some(limit) = spec.max_size {
            pipeline.push(SizeLimitStage::new(limit));
        }
        if let Some(hash) = &spec.hash {
            pipeline.push(DigestStage::new(hash.algorithm));
        }
        pipeline
    }

    pub fn push(&mut self, stage: impl Stage + 'static) { self.stages.push(Box::new(stage)); }

    pub fn names(&self) -> Vec<&'static str> { self.stages.iter().map(|s| s.name()).collect() }

    pub fn process(&mut self, chunk: Bytes) -> Result<Bytes, StageError> {
        run_stages(&mut self.stages, chunk)
    }

    /// Flushes every stage in order, feeding each stage's tail through the
    /// stages after it.
    pub fn finish(&mut self) -> Result<Bytes, StageError> {
        let mut tail = BytesMut::new();
        for i in 0..self.stages.len() {
            let (head, rest) = self.stages.split_at_mut(i + 1);
            let stage = &mut head[i];
            let flushed = stage.finish().map_err(|kind| StageError {
                stage: stage.name(),
                kind,
            })?;
            tail.extend_from_slice(&run_stages(rest, flushed)?);
        }
        Ok(tail.freeze())
    }

    pub fn into_report(self) -> PipelineReport {
        let mut report = PipelineReport::default();
        for stage in self.stages {
            stage.report(&mut report);
        }
        report
    }
}

fn run_stages(stages: &mut [Box<dyn Stage>], chunk: Bytes) -> Result<Bytes, StageError> {
    stages.iter_mut().try_fold(chunk, |chunk, stage| {
        stage.process(chunk).map_err(|kind| StageError {
            stage: stage.name(),
            kind,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FetchOptions;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use refetch_verify::HashAlgorithm;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn run(pipeline: &mut Pipeline, input: &[u8], chunk_size: usize) -> Result<Vec<u8>, StageError> {
        let mut out = Vec::new();
        for chunk in input.chunks(chunk_size) {
            out.extend_from_slice(&pipeline.process(Bytes::copy_from_slice(chunk))?);
        }
        out.extend_from_slice(&pipeline.finish()?);
        Ok(out)
    }

    #[test]
    fn test_stage_order_from_spec() {
        let spec = FetchOptions::new()
            .destination("/tmp/x")
            .max_size(10)
            .verify_hash("md5", "5eb63bbbe01eeed093cb22bb8f5acdc3")
            .validate()
            .unwrap();

        assert_eq!(Pipeline::for_spec(&spec, true).names(), ["gzip", "limit", "digest"]);
        assert_eq!(Pipeline::for_spec(&spec, false).names(), ["limit", "digest"]);

        let plain = FetchOptions::new().destination("/tmp/x").validate().unwrap();
        assert!(Pipeline::for_spec(&plain, false).names().is_empty());
    }

    #[test]
    fn test_gzip_then_digest() {
        let data = b"hello world".repeat(500);
        let mut pipeline = Pipeline::new();
        pipeline.push(GzipStage::new());
        pipeline.push(DigestStage::new(HashAlgorithm::Sha256));

        let out = run(&mut pipeline, &gzip(&data), 7).unwrap();

        assert_eq!(out, data);
        assert_eq!(
            pipeline.into_report().digest,
            Some(HashAlgorithm::Sha256.digest(&data))
        );
    }

    #[test]
    fn test_limit_applies_to_decoded_bytes() {
        let data = vec![0u8; 64 * 1024];
        let compressed = gzip(&data);
        assert!(compressed.len() < 1024);

        let mut pipeline = Pipeline::new();
        pipeline.push(GzipStage::new());
        pipeline.push(SizeLimitStage::new(1024));

        let err = run(&mut pipeline, &compressed, 16).unwrap_err();
        assert_eq!(err.stage, "limit");
        assert!(matches!(err.kind, StageErrorKind::LimitExceeded { limit: 1024 }));
    }

    #[test]
    fn test_gzip_from_spec_stops_at_limit() {
        let spec = FetchOptions::new().destination("/tmp/x").max_size(1024).validate().unwrap();
        let compressed = gzip(&vec![0u8; 8 * 1024 * 1024]);

        let mut pipeline = Pipeline::for_spec(&spec, true);
        let err = pipeline.process(Bytes::from(compressed)).unwrap_err();

        assert_eq!(err.stage, "gzip");
        assert!(matches!(err.kind, StageErrorKind::LimitExceeded { limit: 1024 }));
    }

    #[test]
    fn test_concatenated_gzip_members() {
        let mut compressed = gzip(b"hello ");
        compressed.extend_from_slice(&gzip(b"world"));

        let mut pipeline = Pipeline::new();
        pipeline.push(GzipStage::new());

        assert_eq!(run(&mut pipeline, &compressed, 5).unwrap(), b"hello world");
    }

    #[test]
    fn test_corrupt_gzip_is_attributed_to_gzip_stage() {
        let mut compressed = gzip(b"some text that will be cut short");
        compressed.truncate(compressed.len() - 6);

        let mut pipeline = Pipeline::new();
        pipeline.push(GzipStage::new());
        pipeline.push(SizeLimitStage::new(1024));

        let err = run(&mut pipeline, &compressed, 8).unwrap_err();
        assert_eq!(err.stage, "gzip");
        assert!(matches!(err.kind, StageErrorKind::Decode(_)));
    }

    #[test]
    fn test_empty_pipeline_passes_through() {
        let mut pipeline = Pipeline::new();
        assert_eq!(run(&mut pipeline, b"abc", 1).unwrap(), b"abc");
        assert_eq!(pipeline.into_report(), PipelineReport::default());
    }
}
