use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::errors::ValidationError;

pub const MAX_PROMPT_CHARS: usize = 500;
pub const MIN_PANELS: i64 = 1;
pub const MAX_PANELS: i64 = 4;
pub const DEFAULT_STYLE: &str = "Japanese";
pub const DEFAULT_NUM_PANELS: i64 = 4;

/// Characters removed from free text before it reaches the provider's prompt field.
const STRIPPED_CHARS: [char; 7] = ['<', '>', '{', '}', '[', ']', '\\'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PanelDimensions {
    pub width: u32,
    pub height: u32,
}

impl PanelDimensions {
    pub const DEFAULT: Self = Self::new(1024, 1024);

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_allowed(self) -> bool {
        ALLOWED_DIMENSIONS.contains(&self)
    }

    /// Reads `{"width": .., "height": ..}`. Anything that is not a pair of
    /// whole numbers in `u32` range yields `None`.
    fn from_json(value: &Value) -> Option<Self> {
        let side = |key: &str| -> Option<u32> { u32::try_from(value.get(key)?.as_u64()?).ok() };
        Some(Self::new(side("width")?, side("height")?))
    }
}

impl Default for PanelDimensions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for PanelDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Sizes the SDXL 1024 engine accepts.
pub const ALLOWED_DIMENSIONS: [PanelDimensions; 9] = [
    PanelDimensions::new(1024, 1024),
    PanelDimensions::new(1152, 896),
    PanelDimensions::new(1216, 832),
    PanelDimensions::new(1344, 768),
    PanelDimensions::new(1536, 640),
    PanelDimensions::new(640, 1536),
    PanelDimensions::new(768, 1344),
    PanelDimensions::new(832, 1216),
    PanelDimensions::new(896, 1152),
];

/// Returns the requested size when the provider supports it, otherwise 1024x1024.
pub fn resolve_dimensions(requested: Option<PanelDimensions>) -> PanelDimensions {
    match requested {
        Some(dims) if dims.is_allowed() => dims,
        _ => PanelDimensions::DEFAULT,
    }
}

fn strip_reserved(raw: &str) -> String {
    raw.chars().filter(|c| !STRIPPED_CHARS.contains(c)).collect()
}

/// Strip reserved characters, trim, and enforce the length cap.
pub fn sanitize_prompt(raw: &str) -> Result<String, ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::EmptyPrompt);
    }

    let sanitized = strip_reserved(raw).trim().to_string();
    if sanitized.is_empty() {
        return Err(ValidationError::EmptyPrompt);
    }

    let length = sanitized.chars().count();
    if length > MAX_PROMPT_CHARS {
        return Err(ValidationError::PromptTooLong { length });
    }

    Ok(sanitized)
}

/// Style never fails validation; blank input falls back to the default style.
pub fn sanitize_style(raw: Option<&str>) -> String {
    let cleaned = raw.map(strip_reserved).unwrap_or_default();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        DEFAULT_STYLE.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Layout selector. Arrangement is owned by the frontend; the server only checks range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridType {
    Strip,
    Square,
    Feature,
}

impl TryFrom<i64> for GridType {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(GridType::Strip),
            1 => Ok(GridType::Square),
            2 => Ok(GridType::Feature),
            other => Err(ValidationError::InvalidGridType(other)),
        }
    }
}

impl From<GridType> for i64 {
    fn from(value: GridType) -> Self {
        match value {
            GridType::Strip => 0,
            GridType::Square => 1,
            GridType::Feature => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelCount(usize);

impl PanelCount {
    pub fn get(self) -> usize {
        self.0
    }
}

impl TryFrom<i64> for PanelCount {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (MIN_PANELS..=MAX_PANELS).contains(&value) {
            usize::try_from(value)
                .map(PanelCount)
                .map_err(|_| ValidationError::InvalidPanelCount(value))
        } else {
            Err(ValidationError::InvalidPanelCount(value))
        }
    }
}

/// Wire schema for `POST /generate-comic`.
///
/// Numeric fields are read as signed integers so that out-of-range values
/// reach validation and produce a descriptive error instead of a parse failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComicRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default)]
    pub grid_type: i64,
    #[serde(default = "default_num_panels")]
    pub num_panels: i64,
    /// One entry per panel; unreadable entries are kept as `None` so later
    /// panels keep their position.
    #[serde(
        default,
        deserialize_with = "lenient_panel_sizes",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub panel_sizes: Vec<Option<PanelDimensions>>,
}

fn default_num_panels() -> i64 {
    DEFAULT_NUM_PANELS
}

/// Size hints never fail a request: a non-list becomes empty and bad entries
/// fall back to the default size during validation.
fn lenient_panel_sizes<'de, D>(deserializer: D) -> Result<Vec<Option<PanelDimensions>>, D::Error>
where
    D: Deserializer<'de>,
{
    let sizes = match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries.iter().map(PanelDimensions::from_json).collect(),
        _ => Vec::new(),
    };
    Ok(sizes)
}

impl ComicRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            style: None,
            grid_type: 0,
            num_panels: DEFAULT_NUM_PANELS,
            panel_sizes: Vec::new(),
        }
    }

    /// Check every field and resolve one size per panel.
    pub fn validate(self) -> Result<ComicPlan, ValidationError> {
        let prompt = sanitize_prompt(&self.prompt)?;
        let grid_type = GridType::try_from(self.grid_type)?;
        let num_panels = PanelCount::try_from(self.num_panels)?;
        let style = sanitize_style(self.style.as_deref());

        let panels = (0..num_panels.get())
            .map(|i| resolve_dimensions(self.panel_sizes.get(i).copied().flatten()))
            .collect();

        Ok(ComicPlan {
            prompt,
            style,
            grid_type,
            panels,
        })
    }
}

/// A validated request: everything needed to issue the upstream calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComicPlan {
    pub prompt: String,
    pub style: String,
    pub grid_type: GridType,
    pub panels: Vec<PanelDimensions>,
}

/// One rendered panel, kept as the provider's base64 payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    payload: String,
}

impl GeneratedImage {
    pub const MIME: &'static str = "image/png";

    pub fn from_base64(payload: String) -> Self {
        Self { payload }
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", Self::MIME, self.payload)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComicResponse {
    pub images: Vec<String>,
}

impl From<Vec<GeneratedImage>> for ComicResponse {
    fn from(images: Vec<GeneratedImage>) -> Self {
        Self {
            images: images.iter().map(GeneratedImage::to_data_uri).collect(),
        }
    }
}
