use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use starlay_types::{Color, Rect};

use crate::error::ConfigError;

/// Default name of the region definition file
pub const REGIONS_FILE: &str = "overlay_regions.json";

const BUILTIN_REGIONS: &str = include_str!("../defaults/overlay_regions.json");

fn default_font_pt() -> u32 {
    13
}

/// Rect as written by hand: either `[x, y, w, h]` or the legacy `[[x, y, w, h]]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RectRecord {
    Flat([i64; 4]),
    Nested([[i64; 4]; 1]),
}

impl RectRecord {
    /// Flatten to the canonical rect, rejecting negative sizes and
    /// coordinates outside the screen's integer range
    pub fn normalize(&self) -> Result<Rect, String> {
        let [x, y, width, height] = match *self {
            RectRecord::Flat(values) => values,
            RectRecord::Nested([values]) => values,
        };

        let x = i32::try_from(x).map_err(|_| format!("x out of range: {x}"))?;
        let y = i32::try_from(y).map_err(|_| format!("y out of range: {y}"))?;
        let width = u32::try_from(width).map_err(|_| format!("invalid width: {width}"))?;
        let height = u32::try_from(height).map_err(|_| format!("invalid height: {height}"))?;

        Ok(Rect::new(x, y, width, height))
    }
}

/// One entry of a region's `patches` list
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PatchRecord {
    /// Plain rect, covered in white
    Bare(RectRecord),
    /// Transparent gap inside the overlay, spelled `cut` or `hole`
    Hole {
        #[serde(alias = "cut")]
        hole: RectRecord,
    },
    /// Labeled cover
    Block {
        rect: RectRecord,
        #[serde(default)]
        color: Option<Color>,
        #[serde(default)]
        text: String,
        #[serde(default)]
        font_pt: Option<u32>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegionRecord {
    pub crop: RectRecord,
    pub overlay: RectRecord,
    #[serde(default)]
    pub patches: Vec<PatchRecord>,
    #[serde(default = "default_font_pt")]
    pub font_pt: u32,
    #[serde(default)]
    pub overlay_color: Option<Color>,
}

#[derive(Deserialize)]
struct RawRegionFile {
    regions: Option<Vec<serde_json::Value>>,
    hash_color_overrides: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Parsed region definition file
#[derive(Debug, Clone, Default)]
pub struct RegionFile {
    pub regions: Vec<RegionRecord>,
    pub hash_color_overrides: BTreeMap<String, Color>,
}

impl RegionFile {
    /// Region table shipped with the binary
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::parse_with(BUILTIN_REGIONS, None)
    }

    /// Load region definitions from `path`.
    ///
    /// A missing or syntactically broken file falls back to the built-in
    /// table with a warning. A well-formed file holding a malformed region or
    /// override is an error: dropping a region silently would change what
    /// gets translated without anybody noticing.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("{} not found, using built-in regions", path.display());
                return Self::builtin();
            }
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}, using built-in regions", path.display());
                return Self::builtin();
            }
        };

        let builtin = Self::builtin()?;
        match Self::parse_with(&data, Some(&builtin)) {
            Err(ConfigError::ParseError(e)) => {
                tracing::warn!("Failed to parse {}: {e}, using built-in regions", path.display());
                Ok(builtin)
            }
            other => other,
        }
    }

    /// Parse a region file, keys missing from it are left empty
    pub fn parse(data: &str) -> Result<Self, ConfigError> {
        Self::parse_with(data, None)
    }

    fn parse_with(data: &str, fallback: Option<&RegionFile>) -> Result<Self, ConfigError> {
        let raw: RawRegionFile = serde_json::from_str(data)?;

        let regions = match raw.regions {
            Some(values) => values
                .into_iter()
                .enumerate()
                .map(|(index, value)| {
                    serde_json::from_value::<RegionRecord>(value)
                        .map_err(|source| ConfigError::Region { index, source })
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => fallback.map(|f| f.regions.clone()).unwrap_or_default(),
        };

        let hash_color_overrides = match raw.hash_color_overrides {
            Some(map) => map
                .into_iter()
                .map(|(hash, value)| match serde_json::from_value::<Color>(value) {
                    Ok(color) => Ok((hash, color)),
                    Err(source) => Err(ConfigError::ColorOverride { hash, source }),
                })
                .collect::<Result<BTreeMap<_, _>, _>>()?,
            None => fallback
                .map(|f| f.hash_color_overrides.clone())
                .unwrap_or_default(),
        };

        Ok(Self {
            regions,
            hash_color_overrides,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_parses() {
        let file = RegionFile::builtin().unwrap();
        assert_eq!(file.regions.len(), 42);
        assert_eq!(
            file.hash_color_overrides.get("ad02bd2556c7d171"),
            Some(&Color::rgb(0xFB, 0x49, 0x8A))
        );
        assert_eq!(file.regions[2].overlay_color, Some(Color::rgb(0xFB, 0xDB, 0xA2)));
    }

    #[test]
    fn test_nested_rect_is_flattened() {
        let record: RegionRecord = serde_json::from_str(
            r#"{ "crop": [[1, 2, 3, 4]], "overlay": [5, 6, 7, 8] }"#,
        )
        .unwrap();

        assert_eq!(record.crop.normalize().unwrap(), Rect::new(1, 2, 3, 4));
        assert_eq!(record.overlay.normalize().unwrap(), Rect::new(5, 6, 7, 8));
        assert_eq!(record.font_pt, 13);
        assert!(record.patches.is_empty());
    }

    #[test]
    fn test_patch_shapes() {
        let patches: Vec<PatchRecord> = serde_json::from_str(
            r##"[
                [1200, 368, 66, 115],
                { "cut": [722, 438, 69, 83] },
                { "hole": [[1, 1, 2, 2]] },
                { "rect": [0, 0, 10, 10], "color": "#000000", "text": "A", "font_pt": 9 }
            ]"##,
        )
        .unwrap();

        assert!(matches!(patches[0], PatchRecord::Bare(_)));
        assert!(matches!(patches[1], PatchRecord::Hole { .. }));
        assert!(matches!(patches[2], PatchRecord::Hole { .. }));
        match &patches[3] {
            PatchRecord::Block {
                color,
                text,
                font_pt,
                ..
            } => {
                assert_eq!(*color, Some(Color::BLACK));
                assert_eq!(text, "A");
                assert_eq!(*font_pt, Some(9));
            }
            other => panic!("expected block patch, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_size_is_rejected() {
        let rect = RectRecord::Flat([0, 0, -5, 10]);
        assert!(rect.normalize().is_err());
    }

    #[test]
    fn test_malformed_region_is_an_error() {
        let err = RegionFile::parse(r#"{ "regions": [ { "crop": [1, 2, 3], "overlay": [0, 0, 1, 1] } ] }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Region { index: 0, .. }));
    }

    #[test]
    fn test_bad_override_color_is_an_error() {
        let err = RegionFile::parse(r#"{ "regions": [], "hash_color_overrides": { "abc": "nope" } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::ColorOverride { .. }));
    }

    #[test]
    fn test_load_falls_back_on_missing_and_broken_files() {
        let dir = tempfile::tempdir().unwrap();

        let missing = RegionFile::load(&dir.path().join(REGIONS_FILE)).unwrap();
        assert_eq!(missing.regions.len(), 42);

        let broken_path = dir.path().join("broken.json");
        fs::write(&broken_path, "{ \"regions\": [").unwrap();
        let broken = RegionFile::load(&broken_path).unwrap();
        assert_eq!(broken.regions.len(), 42);
    }

    #[test]
    fn test_load_keeps_builtin_overrides_when_key_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(REGIONS_FILE);
        fs::write(&path, r#"{ "regions": [ { "crop": [0, 0, 4, 4], "overlay": [0, 0, 4, 4] } ] }"#)
            .unwrap();

        let file = RegionFile::load(&path).unwrap();
        assert_eq!(file.regions.len(), 1);
        assert_eq!(file.hash_color_overrides.len(), 15);
    }
}
