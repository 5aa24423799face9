//! Core types for Netsketch
//!
//! Defines the fundamental types of the workflow:
//! - Style categories and their fixed rendering instructions
//! - Variant and batch identities
//! - Diagram variants and their status
//! - Requests and reports exchanged with the generator

use netsketch_imaging::ImagePayload;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Number of variants generated per style category
pub const VARIANTS_PER_STYLE: u8 = 2;

/// Number of variants in one generation batch
pub const BATCH_SIZE: usize = StyleCategory::ALL.len() * VARIANTS_PER_STYLE as usize;

/// Diagram rendering style (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleCategory {
    /// Flat 2D technical diagram with outline icons
    Flat2d,
    /// Orthographic top-down 3D hardware models
    TopDown3d,
    /// Bird's-eye 3D perspective with visible cabling
    Perspective3d,
}

impl StyleCategory {
    /// All styles, in generation order
    pub const ALL: [StyleCategory; 3] = [Self::Flat2d, Self::TopDown3d, Self::Perspective3d];

    /// Stable identifier used in variant ids
    #[inline]
    #[must_use]
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Flat2d => "flat-2d",
            Self::TopDown3d => "top-down-3d",
            Self::Perspective3d => "perspective-3d",
        }
    }

    /// Human-readable name, also quoted in prompts
    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Flat2d => "2D Standard Icons",
            Self::TopDown3d => "3D Flat View",
            Self::Perspective3d => "3D Perspective",
        }
    }

    /// Fixed camera/icon/shadow constraints for this style
    #[must_use]
    pub fn style_instructions(&self) -> &'static str {
        match self {
            Self::Flat2d => {
                "- STYLE: Modern professional 2D technical diagram.\n\
                 - CAMERA: Strictly 2D flat view.\n\
                 - ICONS: Use ONLY white-filled (hollow) outline icons with clean black strokes.\n\
                 - LAYOUT: Clean 2D flat topology.\n\
                 - CRITICAL: DO NOT include any titles, text headers, or decorative frames. Pure diagram only."
            }
            Self::TopDown3d => {
                "- STYLE: 3D Flat View.\n\
                 - CAMERA: Strictly TOP-DOWN (Orthographic style). No tilted perspective.\n\
                 - ICONS: Use 3D hardware models viewed from directly above.\n\
                 - AESTHETICS: Clean, professional IT icons.\n\
                 - CRITICAL: NO SHADOWS. Strictly disable all drop shadows."
            }
            Self::Perspective3d => {
                "- STYLE: 3D Perspective Bird's-eye view.\n\
                 - CAMERA: Fixed Perspective looking from the top-left towards the bottom-right.\n\
                 - CONNECTIONS: All devices MUST be connected using visible, professional Ethernet/LAN cables.\n\
                 - CRITICAL: NO SHADOWS. Render on a pure white floor."
            }
        }
    }
}

impl fmt::Display for StyleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for StyleCategory {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|style| style.slug() == s)
            .ok_or_else(|| ParseIdError(s.to_string()))
    }
}

/// Unparseable style or variant identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised identifier: {0}")]
pub struct ParseIdError(pub String);

/// Variant identity: style category plus 1-based variant index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VariantId {
    /// Rendering style
    pub style: StyleCategory,
    /// Variant number within the style (1-based)
    pub index: u8,
}

impl VariantId {
    /// Create a variant id
    #[inline]
    #[must_use]
    pub fn new(style: StyleCategory, index: u8) -> Self {
        Self { style, index }
    }

    /// Every variant of one batch, in generation order
    pub fn batch_order() -> impl Iterator<Item = VariantId> {
        StyleCategory::ALL
            .into_iter()
            .flat_map(|style| (1..=VARIANTS_PER_STYLE).map(move |index| Self::new(style, index)))
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.style.slug(), self.index)
    }
}

impl FromStr for VariantId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (style, index) = s.rsplit_once('-').ok_or_else(|| ParseIdError(s.to_string()))?;
        let style = style.parse::<StyleCategory>().map_err(|_| ParseIdError(s.to_string()))?;
        let index = index.parse::<u8>().map_err(|_| ParseIdError(s.to_string()))?;
        if !(1..=VARIANTS_PER_STYLE).contains(&index) {
            return Err(ParseIdError(s.to_string()));
        }
        Ok(Self::new(style, index))
    }
}

/// Unique generation batch identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BatchId(pub Ulid);

impl BatchId {
    /// Generate new batch ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of one variant within a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantStatus {
    /// Request not yet answered
    Pending,
    /// Image available
    Ready,
    /// Request failed; see the variant's error
    Failed,
}

/// One generated diagram
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramVariant {
    /// Identity within the batch
    pub id: VariantId,
    /// Generated image, `None` until ready
    pub image: Option<ImagePayload>,
    /// Current status
    pub status: VariantStatus,
    /// Failure message when `status` is `Failed`
    pub error: Option<String>,
}

impl DiagramVariant {
    /// New placeholder awaiting its result
    #[inline]
    #[must_use]
    pub fn pending(id: VariantId) -> Self {
        Self {
            id,
            image: None,
            status: VariantStatus::Pending,
            error: None,
        }
    }

    /// Style of this variant
    #[inline]
    #[must_use]
    pub fn style(&self) -> StyleCategory {
        self.id.style
    }

    /// True once an image is available
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.status == VariantStatus::Ready
    }
}

/// Aspect ratio hint sent with every request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AspectRatio(pub String);

impl Default for AspectRatio {
    fn default() -> Self {
        Self("4:3".to_string())
    }
}

/// Output resolution hint sent with every request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageSize(pub String);

impl Default for ImageSize {
    fn default() -> Self {
        Self("1K".to_string())
    }
}

/// Render hints attached to a generation request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Aspect ratio hint
    pub aspect_ratio: AspectRatio,
    /// Resolution hint
    pub image_size: ImageSize,
}

/// One call to the external image-generation capability
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Input images, in the order the prompt refers to them
    pub images: Vec<ImagePayload>,
    /// Text prompt
    pub prompt: String,
    /// Render hints
    pub options: RenderOptions,
}

/// Summary of one completed generation batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Batch that ran
    pub batch: BatchId,
    /// Variants that produced an image
    pub succeeded: Vec<VariantId>,
    /// Variants that failed, with their messages
    pub failed: Vec<(VariantId, String)>,
    /// Results dropped because the batch was superseded mid-run
    pub discarded: usize,
}

impl BatchReport {
    /// Total variants attempted
    #[inline]
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len() + self.discarded
    }
}

/// Result of a successful edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    /// Variant whose image was replaced
    pub variant: VariantId,
    /// New image
    pub image: ImagePayload,
}
