//! Leaf sequencing.

use std::sync::Arc;
use tracing::{info, warn};

use crate::collaborators::LeafDetector;
use crate::types::{Frame, LeafCandidate};

/// Asks the detector for the harvest order of the current frame.
///
/// The detector's order is authoritative and is passed through untouched.
pub struct HarvestSequencer {
    detector: Arc<dyn LeafDetector>,
}

impl HarvestSequencer {
    pub fn new(detector: Arc<dyn LeafDetector>) -> Self {
        Self { detector }
    }

    /// Leaves to pick, best first. Detector errors yield an empty sequence.
    pub async fn sequence(&self, frame: &Frame) -> Vec<LeafCandidate> {
        match self.detector.get_harvest_sequence(frame).await {
            Ok(leaves) => {
                info!(count = leaves.len(), "Harvest sequence ready");
                leaves
            }
            Err(e) => {
                warn!(error = %e, "Leaf detection failed; treating as no candidates");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{leaf, FakeDetector};

    #[tokio::test]
    async fn test_order_is_preserved() {
        let leaves = vec![leaf(0, 500.0), leaf(1, 1500.0), leaf(2, 900.0)];
        let sequencer = HarvestSequencer::new(Arc::new(FakeDetector::returning(leaves.clone())));

        let result = sequencer.sequence(&Frame::new(b"img".to_vec())).await;
        assert_eq!(result, leaves);
    }

    #[tokio::test]
    async fn test_detector_error_is_empty() {
        let sequencer = HarvestSequencer::new(Arc::new(FakeDetector::failing()));
        let result = sequencer.sequence(&Frame::new(b"img".to_vec())).await;
        assert!(result.is_empty());
    }
}
