use bytes::Bytes;
use refetch_verify::{AlgorithmHasher, HashAlgorithm, Hasher, HexDigest};

use super::{PipelineReport, Stage, StageErrorKind};

/// Hashes everything passing through; the digest lands in the report.
pub struct DigestStage {
    hasher: AlgorithmHasher,
}

impl DigestStage {
    pub fn new(algorithm: HashAlgorithm) -> Self { Self { hasher: algorithm.hasher() } }
}

impl Stage for DigestStage {
    fn name(&self) -> &'static str { "digest" }

    fn process(&mut self, chunk: Bytes) -> Result<Bytes, StageErrorKind> {
        self.hasher.update(&chunk);
        Ok(chunk)
    }

    fn report(self: Box<Self>, report: &mut PipelineReport) {
        let Self { hasher } = *self;
        report.digest = Some(HexDigest::from_bytes(&hasher.finalize()));
    }
}
