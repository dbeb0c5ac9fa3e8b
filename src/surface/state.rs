use crate::color::Rgba8;
use kurbo::Affine;

/// End-cap style for stroked lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineCap {
    /// Flat cap ending at the endpoint.
    #[default]
    Butt,
    /// Semicircular cap.
    Round,
    /// Square cap extending half the line width.
    Square,
}

impl LineCap {
    /// Parse a cap keyword; unknown input yields [`LineCap::Butt`].
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "round" => Self::Round,
            "square" => Self::Square,
            _ => Self::Butt,
        }
    }

    /// Keyword form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Butt => "butt",
            Self::Round => "round",
            Self::Square => "square",
        }
    }

    pub(crate) fn to_cpu(self) -> vello_cpu::kurbo::Cap {
        match self {
            Self::Butt => vello_cpu::kurbo::Cap::Butt,
            Self::Round => vello_cpu::kurbo::Cap::Round,
            Self::Square => vello_cpu::kurbo::Cap::Square,
        }
    }
}

/// Corner style for stroked lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineJoin {
    /// Sharp corner, limited by the miter limit.
    #[default]
    Miter,
    /// Rounded corner.
    Round,
    /// Cut-off corner.
    Bevel,
}

impl LineJoin {
    /// Parse a join keyword; unknown input yields [`LineJoin::Miter`].
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "round" => Self::Round,
            "bevel" => Self::Bevel,
            _ => Self::Miter,
        }
    }

    /// Keyword form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Miter => "miter",
            Self::Round => "round",
            Self::Bevel => "bevel",
        }
    }

    pub(crate) fn to_cpu(self) -> vello_cpu::kurbo::Join {
        match self {
            Self::Miter => vello_cpu::kurbo::Join::Miter,
            Self::Round => vello_cpu::kurbo::Join::Round,
            Self::Bevel => vello_cpu::kurbo::Join::Bevel,
        }
    }
}

/// Font selection parsed from `"<size>px <family>"`.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    /// Em size in pixels.
    pub size_px: f32,
    /// Family name or CSS generic family.
    pub family: String,
}

impl FontSpec {
    /// Parse `"<size>px <family>"`. The family may be quoted and may contain spaces.
    pub fn parse(s: &str) -> Option<Self> {
        let (size, family) = s.trim().split_once(char::is_whitespace)?;
        let size_px: f32 = size.strip_suffix("px")?.parse().ok()?;
        if !size_px.is_finite() || size_px <= 0.0 {
            return None;
        }
        let family = family.trim().trim_matches(|c| c == '"' || c == '\'').trim();
        if family.is_empty() {
            return None;
        }
        Some(Self {
            size_px,
            family: family.to_string(),
        })
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            size_px: 10.0,
            family: "sans-serif".to_string(),
        }
    }
}

impl std::fmt::Display for FontSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}px {}", self.size_px, self.family)
    }
}

/// Everything `save()` captures and `restore()` reinstates.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct DrawingState {
    pub(crate) fill: Rgba8,
    pub(crate) stroke: Rgba8,
    pub(crate) line_width: f64,
    pub(crate) line_cap: LineCap,
    pub(crate) line_join: LineJoin,
    pub(crate) miter_limit: f64,
    pub(crate) transform: Affine,
    pub(crate) font: FontSpec,
    pub(crate) global_alpha: f32,
}

impl Default for DrawingState {
    fn default() -> Self {
        Self {
            fill: Rgba8::WHITE,
            stroke: Rgba8::WHITE,
            line_width: 10.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            miter_limit: 10.0,
            transform: Affine::IDENTITY,
            font: FontSpec::default(),
            global_alpha: 1.0,
        }
    }
}

impl DrawingState {
    pub(crate) fn stroke_style(&self) -> vello_cpu::kurbo::Stroke {
        vello_cpu::kurbo::Stroke::new(self.line_width)
            .with_caps(self.line_cap.to_cpu())
            .with_join(self.line_join.to_cpu())
            .with_miter_limit(self.miter_limit)
    }
}
