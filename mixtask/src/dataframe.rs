//! Data frames: one collision table plus its track table.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use mixcore::{Collision, Track, TrackSelection};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A chunk of input, processed independently of every other frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataFrame {
    pub collisions: Vec<Collision>,
    /// Tracks referring to collisions by `collision_id`
    pub tracks: Vec<Track>,
}

impl DataFrame {
    pub fn new(collisions: Vec<Collision>, tracks: Vec<Track>) -> Self {
        DataFrame { collisions, tracks }
    }

    /// Drop tracks outside `selection`, returning how many were removed.
    pub fn apply_filter(&mut self, selection: &TrackSelection) -> usize {
        selection.filter_in_place(&mut self.tracks)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FrameFile {
    One(DataFrame),
    Many(Vec<DataFrame>),
}

/// Load a JSON file holding either one frame or an array of frames.
pub fn load_frames(path: impl AsRef<Path>) -> Result<Vec<DataFrame>> {
    let reader = BufReader::new(File::open(path)?);
    let frames = match serde_json::from_reader(reader)? {
        FrameFile::One(frame) => vec![frame],
        FrameFile::Many(frames) => frames,
    };
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FRAME: &str = r#"{
        "collisions": [
            {"global_index": 0, "pos_x": 0.0, "pos_y": 0.0, "pos_z": 1.0, "multiplicity": 10.0}
        ],
        "tracks": [
            {"global_index": 0, "collision_id": 0, "pt": 0.3, "eta": 0.1, "phi": 1.0},
            {"global_index": 1, "collision_id": null, "pt": 2.0, "eta": -0.1, "phi": 2.0}
        ]
    }"#;

    #[test]
    fn test_load_single_and_many() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FRAME.as_bytes()).unwrap();
        let frames = load_frames(file.path()).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].tracks[1].collision_id, None);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[{FRAME}, {FRAME}, {{}}]").unwrap();
        let frames = load_frames(file.path()).unwrap();
        assert_eq!(frames.len(), 3);
        assert!(frames[2].collisions.is_empty());
    }

    #[test]
    fn test_load_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[1, 2, 3]").unwrap();
        assert!(load_frames(file.path()).is_err());
    }

    #[test]
    fn test_apply_filter() {
        let mut frame: DataFrame = serde_json::from_str(FRAME).unwrap();
        let removed = frame.apply_filter(&TrackSelection::pt_window(0.0, 1.0));
        assert_eq!(removed, 1);
        assert_eq!(frame.tracks.len(), 1);
        assert_eq!(frame.tracks[0].global_index, 0);
    }
}
