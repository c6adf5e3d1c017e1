use starlay_config::{ConfigError, PatchRecord, RegionRecord};
use starlay_types::{Color, Rect};

const DEFAULT_PATCH_FONT_PT: u32 = 12;

/// Opaque cover drawn over original content, optionally labeled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockPatch {
    pub rect: Rect,
    pub color: Color,
    pub text: String,
    pub font_pt: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchSpec {
    Block(BlockPatch),
    /// Transparent gap in the overlay, in screen coordinates
    Hole { rect: Rect },
}

/// Validated, immutable description of one translatable screen region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSpec {
    crop: Rect,
    overlay: Rect,
    patches: Vec<PatchSpec>,
    font_pt: u32,
    color: Option<Color>,
    /// Holes clipped to the overlay and made overlay-relative
    holes: Vec<Rect>,
}

impl RegionSpec {
    pub fn new(
        crop: Rect,
        overlay: Rect,
        patches: Vec<PatchSpec>,
        font_pt: u32,
        color: Option<Color>,
    ) -> Self {
        let holes = patches
            .iter()
            .filter_map(|patch| match patch {
                PatchSpec::Hole { rect } => rect.intersect(&overlay),
                PatchSpec::Block(_) => None,
            })
            .filter_map(|hole| hole.relative_to(&overlay))
            .collect();

        Self {
            crop,
            overlay,
            patches,
            font_pt,
            color,
            holes,
        }
    }

    /// Validate one record from the region file
    pub fn from_record(index: usize, record: &RegionRecord) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidRegion { index, reason };

        let crop = record
            .crop
            .normalize()
            .map_err(|e| invalid(format!("crop: {e}")))?;
        let overlay = record
            .overlay
            .normalize()
            .map_err(|e| invalid(format!("overlay: {e}")))?;

        if overlay.is_empty() {
            return Err(invalid(format!("overlay {overlay} has no area")));
        }
        if record.font_pt == 0 {
            return Err(invalid("font_pt must be positive".to_string()));
        }
        if crop.is_empty() {
            tracing::warn!("Region {index}: crop {crop} has no area and will never match");
        }

        let mut patches = Vec::with_capacity(record.patches.len());
        for (patch_index, patch) in record.patches.iter().enumerate() {
            let spec = match patch {
                PatchRecord::Bare(rect) => PatchSpec::Block(BlockPatch {
                    rect: rect
                        .normalize()
                        .map_err(|e| invalid(format!("patch {patch_index}: {e}")))?,
                    color: Color::WHITE,
                    text: String::new(),
                    font_pt: DEFAULT_PATCH_FONT_PT,
                }),
                PatchRecord::Block {
                    rect,
                    color,
                    text,
                    font_pt,
                } => PatchSpec::Block(BlockPatch {
                    rect: rect
                        .normalize()
                        .map_err(|e| invalid(format!("patch {patch_index}: {e}")))?,
                    color: color.unwrap_or(Color::WHITE),
                    text: text.clone(),
                    font_pt: font_pt.unwrap_or(DEFAULT_PATCH_FONT_PT),
                }),
                PatchRecord::Hole { hole } => {
                    let rect = hole
                        .normalize()
                        .map_err(|e| invalid(format!("hole {patch_index}: {e}")))?;
                    if rect.intersect(&overlay).is_none() {
                        tracing::warn!(
                            "Region {index}: hole {rect} lies outside overlay {overlay} and has no effect"
                        );
                    }
                    PatchSpec::Hole { rect }
                }
            };
            patches.push(spec);
        }

        Ok(Self::new(crop, overlay, patches, record.font_pt, record.overlay_color))
    }

    pub fn crop(&self) -> Rect {
        self.crop
    }

    pub fn overlay(&self) -> Rect {
        self.overlay
    }

    pub fn patches(&self) -> &[PatchSpec] {
        &self.patches
    }

    pub fn block_patches(&self) -> impl Iterator<Item = &BlockPatch> {
        self.patches.iter().filter_map(|patch| match patch {
            PatchSpec::Block(block) => Some(block),
            PatchSpec::Hole { .. } => None,
        })
    }

    /// Overlay-relative holes, clipped to the overlay's bounds
    pub fn holes(&self) -> &[Rect] {
        &self.holes
    }

    pub fn font_pt(&self) -> u32 {
        self.font_pt
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }
}

/// Validate every record, failing on the first malformed one
pub fn build_regions(records: &[RegionRecord]) -> Result<Vec<RegionSpec>, ConfigError> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| RegionSpec::from_record(index, record))
        .collect()
}
