//! Leaf detector backed by an external detection program.

use async_trait::async_trait;
use serde::Deserialize;
use tempfile::NamedTempFile;

use super::LeafDetector;
use crate::bridge::{args, CommandSpec};
use crate::error::{Error, Result};
use crate::types::{Frame, LeafCandidate, Point};

/// Leaf as emitted by the detector; priority may be omitted.
#[derive(Debug, Deserialize)]
struct DetectedLeaf {
    #[serde(rename = "class", alias = "class_label")]
    class_label: String,
    center: Point,
    area: f64,
    confidence: f64,
    #[serde(default)]
    maturity_score: f64,
    #[serde(default)]
    harvest_priority: Option<u32>,
}

/// Convert detector output into candidates, keeping its order.
fn into_candidates(detected: Vec<DetectedLeaf>) -> Vec<LeafCandidate> {
    detected
        .into_iter()
        .enumerate()
        .map(|(index, leaf)| LeafCandidate {
            class_label: leaf.class_label,
            center: leaf.center,
            area: leaf.area.max(0.0),
            confidence: leaf.confidence,
            maturity_score: leaf.maturity_score,
            harvest_priority: leaf.harvest_priority.unwrap_or(index as u32),
        })
        .collect()
}

/// Runs the detection model as an external program.
///
/// - `<program> <args..> detect --image I` prints a JSON array of leaves.
/// - `<program> <args..> visualize --image I --output O` reads the leaves as
///   JSON on stdin and writes an annotated image to `O`.
#[derive(Debug, Clone)]
pub struct CommandDetector {
    command: CommandSpec,
}

impl CommandDetector {
    pub fn new(command: CommandSpec) -> Self {
        Self { command }
    }

    async fn stage_image(image: &Frame) -> Result<NamedTempFile> {
        let file = tempfile::Builder::new()
            .prefix("leafbot-detect-")
            .suffix(".jpg")
            .tempfile()?;
        tokio::fs::write(file.path(), image.as_bytes()).await?;
        Ok(file)
    }
}

#[async_trait]
impl LeafDetector for CommandDetector {
    async fn get_harvest_sequence(&self, image: &Frame) -> Result<Vec<LeafCandidate>> {
        let staged = Self::stage_image(image).await?;
        let extra = args([
            "detect".into(),
            "--image".into(),
            staged.path().as_os_str().to_os_string(),
        ]);

        let detected: Vec<DetectedLeaf> = self
            .command
            .run_json(&extra, None)
            .await
            .map_err(|e| Error::detection(e.to_string()))?;

        Ok(into_candidates(detected))
    }

    async fn visualize(&self, image: &Frame, leaves: &[LeafCandidate]) -> Result<Frame> {
        let staged = Self::stage_image(image).await?;
        let output = tempfile::Builder::new()
            .prefix("leafbot-annotated-")
            .suffix(".jpg")
            .tempfile()?;
        let extra = args([
            "visualize".into(),
            "--image".into(),
            staged.path().as_os_str().to_os_string(),
            "--output".into(),
            output.path().as_os_str().to_os_string(),
        ]);
        let payload = serde_json::to_vec(leaves)?;

        self.command
            .run(&extra, Some(&payload))
            .await
            .map_err(|e| Error::detection(e.to_string()))?;

        Frame::read(output.path()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_priorities_follow_order() {
        let json = r#"[
            {"class": "leaf", "center": [10, 20], "area": 1200, "confidence": 0.91, "maturity_score": 0.81},
            {"class": "leaf", "center": [30, 40], "area": 900, "confidence": 0.76}
        ]"#;
        let detected: Vec<DetectedLeaf> = serde_json::from_str(json).unwrap();
        let leaves = into_candidates(detected);

        assert_eq!(leaves.len(), 2);
        assert_eq!(leaves[0].harvest_priority, 0);
        assert_eq!(leaves[1].harvest_priority, 1);
        assert_eq!(leaves[1].maturity_score, 0.0);
        assert_eq!(leaves[1].center, Point::new(30.0, 40.0));
    }

    #[test]
    fn test_explicit_priorities_are_kept() {
        let json = r#"[
            {"class": "leaf", "center": [0, 0], "area": 1, "confidence": 0.5, "harvest_priority": 4}
        ]"#;
        let detected: Vec<DetectedLeaf> = serde_json::from_str(json).unwrap();
        assert_eq!(into_candidates(detected)[0].harvest_priority, 4);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_detector_detect() {
        let script = r#"echo '[{"class": "leaf", "center": [1, 2], "area": 50, "confidence": 0.7}]'"#;
        let detector = CommandDetector::new(CommandSpec::new("sh", &["-c", script]));

        let leaves = detector
            .get_harvest_sequence(&Frame::new(b"img".to_vec()))
            .await
            .unwrap();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].class_label, "leaf");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_detector_visualize_writes_output() {
        // $0=visualize $1=--image $2=I $3=--output $4=O
        let script = r#"cat > /dev/null; printf annotated > "$4""#;
        let detector = CommandDetector::new(CommandSpec::new("sh", &["-c", script]));

        let annotated = detector
            .visualize(&Frame::new(b"img".to_vec()), &[])
            .await
            .unwrap();
        assert_eq!(annotated.as_bytes(), b"annotated");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_detector_sees_staged_image() {
        // $0=visualize $1=--image $2=I $3=--output $4=O
        let script = r#"cat > /dev/null; cp "$2" "$4""#;
        let detector = CommandDetector::new(CommandSpec::new("sh", &["-c", script]));

        let copied = detector
            .visualize(&Frame::new(b"staged-bytes".to_vec()), &[])
            .await
            .unwrap();
        assert_eq!(copied.as_bytes(), b"staged-bytes");
    }
}
