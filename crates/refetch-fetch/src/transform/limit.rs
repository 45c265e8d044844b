use bytes::Bytes;

use super::{Stage, StageErrorKind};

/// Fails once more than `limit` bytes have passed through.
pub struct SizeLimitStage {
    limit: u64,
    seen:  u64,
}

impl SizeLimitStage {
    pub fn new(limit: u64) -> Self { Self { limit, seen: 0 } }

    pub fn seen(&self) -> u64 { self.seen }
}

impl Stage for SizeLimitStage {
    fn name(&self) -> &'static str { "limit" }

    fn process(&mut self, chunk: Bytes) -> Result<Bytes, StageErrorKind> {
        self.seen = self.seen.saturating_add(chunk.len() as u64);
        if self.seen > self.limit {
            return Err(StageErrorKind::LimitExceeded { limit: self.limit });
        }
        Ok(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_at_limit_passes() {
        let mut stage = SizeLimitStage::new(6);
        stage.process(Bytes::from_static(b"abc")).unwrap();
        stage.process(Bytes::from_static(b"def")).unwrap();
        assert_eq!(stage.seen(), 6);

        assert!(matches!(
            stage.process(Bytes::from_static(b"g")),
            Err(StageErrorKind::LimitExceeded { limit: 6 })
        ));
    }

    #[test]
    fn test_zero_limit_allows_empty_body() {
        let mut stage = SizeLimitStage::new(0);
        assert!(stage.process(Bytes::new()).is_ok());
        assert!(stage.process(Bytes::from_static(b"x")).is_err());
    }
}
