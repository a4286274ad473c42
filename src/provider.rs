//! Landmark model output, consumed as an opaque stream of hands per frame.

use crate::error::{LandmarkError, Result};
use crate::landmarks::{Landmark, LandmarkSet};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use tracing::{debug, info};

/// Yields the hands found in successive frames.
pub trait LandmarkProvider {
    /// Hands in the next frame (possibly none), or `Ok(None)` when the
    /// stream has ended.
    fn next_hands(&mut self) -> Result<Option<Vec<LandmarkSet>>>;

    fn describe(&self) -> String {
        "landmark provider".to_string()
    }
}

/// Replays recorded model output from JSON lines.
///
/// Each line is one frame: an array of hands, each hand an array of 21
/// `[x, y]` or `[x, y, z]` points. A blank line is a frame without hands.
pub struct LandmarkReplay<R: BufRead> {
    lines: Lines<R>,
    line: usize,
    source: String,
}

impl LandmarkReplay<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        info!("Replaying landmarks from {}", path.display());
        Ok(Self::new(
            BufReader::new(file),
            path.display().to_string(),
        ))
    }
}

impl<R: BufRead> LandmarkReplay<R> {
    pub fn new(reader: R, source: impl Into<String>) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
            source: source.into(),
        }
    }

    /// Line number of the most recently read frame (1-based)
    pub fn line(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> LandmarkProvider for LandmarkReplay<R> {
    fn next_hands(&mut self) -> Result<Option<Vec<LandmarkSet>>> {
        let text = match self.lines.next() {
            Some(text) => text?,
            None => {
                debug!("Landmark replay finished after {} lines", self.line);
                return Ok(None);
            }
        };
        self.line += 1;
        Ok(Some(parse_frame(&text, self.line)?))
    }

    fn describe(&self) -> String {
        format!("landmark replay {}", self.source)
    }
}

/// Parse one replay line into landmark sets.
pub fn parse_frame(
    text: &str,
    line: usize,
) -> std::result::Result<Vec<LandmarkSet>, LandmarkError> {
    let malformed = |details: String| LandmarkError::Malformed { line, details };

    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let hands: Vec<Vec<Vec<f64>>> =
        serde_json::from_str(text).map_err(|e| malformed(e.to_string()))?;

    hands
        .into_iter()
        .map(|hand| {
            let landmarks = hand
                .into_iter()
                .map(|coords| match coords.as_slice() {
                    [x, y] => Ok(Landmark::new(*x, *y)),
                    [x, y, z] => Ok(Landmark { x: *x, y: *y, z: *z }),
                    other => Err(malformed(format!(
                        "landmark has {} coordinates",
                        other.len()
                    ))),
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;
            LandmarkSet::try_from(landmarks).map_err(|e| malformed(e.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{LANDMARK_COUNT, WRIST};

    fn hand_json(z: bool) -> String {
        let points: Vec<String> = (0..LANDMARK_COUNT)
            .map(|i| {
                let v = i as f64 / 100.0;
                if z {
                    format!("[{}, {}, -0.01]", v, v)
                } else {
                    format!("[{}, {}]", v, v)
                }
            })
            .collect();
        format!("[{}]", points.join(","))
    }

    #[test]
    fn test_replay_frames() {
        let input = format!(
            "[{}]\n\n[{}, {}]\n",
            hand_json(false),
            hand_json(true),
            hand_json(false)
        );
        let mut replay = LandmarkReplay::new(input.as_bytes(), "inline");

        let first = replay.next_hands().unwrap().unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].get(WRIST).z, 0.0);

        assert!(replay.next_hands().unwrap().unwrap().is_empty());

        let third = replay.next_hands().unwrap().unwrap();
        assert_eq!(third.len(), 2);
        assert_eq!(third[0].get(5).z, -0.01);
        assert_eq!(replay.line(), 3);

        assert!(replay.next_hands().unwrap().is_none());
    }

    #[test]
    fn test_wrong_landmark_count() {
        let err = parse_frame("[[[0.1, 0.2], [0.3, 0.4]]]", 4).unwrap_err();
        assert!(matches!(err, LandmarkError::Malformed { line: 4, .. }));
        assert!(err.to_string().contains("Expected 21 landmarks, got 2"));
    }

    #[test]
    fn test_bad_json_and_coordinates() {
        assert!(matches!(
            parse_frame("not json", 1),
            Err(LandmarkError::Malformed { line: 1, .. })
        ));
        assert!(parse_frame("[[[0.1]]]", 2).is_err());
    }

    #[test]
    fn test_open_replay_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hands.jsonl");
        std::fs::write(&path, format!("[{}]\n", hand_json(false))).unwrap();

        let mut replay = LandmarkReplay::open(&path).unwrap();
        assert!(replay.describe().contains("hands.jsonl"));
        assert_eq!(replay.next_hands().unwrap().unwrap().len(), 1);
        assert!(LandmarkReplay::open(dir.path().join("missing.jsonl")).is_err());
    }
}
