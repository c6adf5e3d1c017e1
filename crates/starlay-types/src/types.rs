use std::borrow::Borrow;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Screen-space rectangle, serialized as `[x, y, width, height]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(i32, i32, u32, u32)", into = "(i32, i32, u32, u32)")]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Overlapping part of two rects, `None` when they do not overlap
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x) as i64;
        let top = self.y.max(other.y) as i64;
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right <= left || bottom <= top {
            return None;
        }

        Some(Rect {
            x: left as i32,
            y: top as i32,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        })
    }

    /// Re-express this rect relative to `origin`'s top-left corner, `None`
    /// when the offset does not fit the coordinate range
    pub fn relative_to(&self, origin: &Rect) -> Option<Rect> {
        let x = i32::try_from(self.x as i64 - origin.x as i64).ok()?;
        let y = i32::try_from(self.y as i64 - origin.y as i64).ok()?;
        Some(Rect {
            x,
            y,
            width: self.width,
            height: self.height,
        })
    }
}

impl From<(i32, i32, u32, u32)> for Rect {
    fn from((x, y, width, height): (i32, i32, u32, u32)) -> Self {
        Self::new(x, y, width, height)
    }
}

impl From<Rect> for (i32, i32, u32, u32) {
    fn from(rect: Rect) -> Self {
        (rect.x, rect.y, rect.width, rect.height)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x, self.y, self.width, self.height)
    }
}

/// Opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ColorRepr", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` or `#RGB`
    pub fn parse_hex(value: &str) -> Option<Self> {
        let digits = value.trim().strip_prefix('#')?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        match digits.len() {
            6 => {
                let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
                Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
            }
            3 => {
                let channel = |i: usize| {
                    u8::from_str_radix(&digits[i..i + 1], 16)
                        .ok()
                        .map(|v| v * 17)
                };
                Some(Self::rgb(channel(0)?, channel(1)?, channel(2)?))
            }
            _ => None,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Accepted spellings of a color in configuration files
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ColorRepr {
    Hex(String),
    Rgb([u8; 3]),
}

impl TryFrom<ColorRepr> for Color {
    type Error = String;

    fn try_from(repr: ColorRepr) -> Result<Self, Self::Error> {
        match repr {
            ColorRepr::Hex(value) => {
                Color::parse_hex(&value).ok_or_else(|| format!("invalid color '{value}'"))
            }
            ColorRepr::Rgb([r, g, b]) => Ok(Color::rgb(r, g, b)),
        }
    }
}

/// Perceptual fingerprint of a screen region, used as an exact lookup key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashKey(String);

impl HashKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for HashKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for HashKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Borrow<str> for HashKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HashKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who owns a native surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SurfaceOwner {
    Region(usize),
    Cutscene,
    Preview,
}

/// Identity of a native surface, allocated by its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId {
    pub owner: SurfaceOwner,
    pub serial: u32,
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.owner {
            SurfaceOwner::Region(index) => write!(f, "region{index}#{}", self.serial),
            SurfaceOwner::Cutscene => write!(f, "cutscene#{}", self.serial),
            SurfaceOwner::Preview => write!(f, "preview#{}", self.serial),
        }
    }
}

/// Native window operation emitted by the reconciliation engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowCommand {
    /// Translation surface. `holes` are relative to `rect` and lie inside it.
    CreateOverlay {
        id: WindowId,
        rect: Rect,
        background: Color,
        holes: Vec<Rect>,
        font_pt: u32,
    },
    /// Opaque cover, optionally labeled
    CreatePatch {
        id: WindowId,
        rect: Rect,
        color: Color,
        text: String,
        font_pt: u32,
    },
    SetText {
        id: WindowId,
        text: String,
    },
    ShowVideo {
        id: WindowId,
        rect: Rect,
        path: PathBuf,
    },
    Destroy {
        id: WindowId,
    },
}

impl WindowCommand {
    pub fn id(&self) -> WindowId {
        match self {
            WindowCommand::CreateOverlay { id, .. }
            | WindowCommand::CreatePatch { id, .. }
            | WindowCommand::SetText { id, .. }
            | WindowCommand::ShowVideo { id, .. }
            | WindowCommand::Destroy { id } => *id,
        }
    }
}

/// Requests handed to the tick thread by the console and the hotkey listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlEvent {
    SetTranslationEnabled(bool),
    SetCutsceneEnabled(bool),
    SetInterval(u64),
    SelectRegion(usize),
    CaptureNow,
    EditTranslation(String),
    SaveTranslation,
    Preview,
    ClearPreview,
    Status,
    Quit,
}
