use crate::foundation::error::{SceneError, SceneResult};

/// A coordinate that is either absolute or a fraction of the enclosing view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Coord {
    /// Absolute units.
    Px(f64),
    /// Fraction (1.0 = 100%) of the enclosing viewport's size along the relevant axis.
    Rel(f64),
}

impl Default for Coord {
    fn default() -> Self {
        Coord::Px(0.0)
    }
}

impl From<f64> for Coord {
    fn from(v: f64) -> Self {
        Coord::Px(v)
    }
}

impl Coord {
    /// Resolve against the extent of the relevant axis.
    #[inline]
    pub fn resolve(self, extent: f64) -> f64 {
        match self {
            Coord::Px(v) => v,
            Coord::Rel(f) => f * extent,
        }
    }

    /// True for relative coordinates.
    pub fn is_relative(self) -> bool {
        matches!(self, Coord::Rel(_))
    }

    /// Parse `"12.5"` or `"40%"`.
    pub fn parse(text: &str) -> SceneResult<Self> {
        let t = text.trim();
        if let Some(pct) = t.strip_suffix('%') {
            let v: f64 = pct
                .trim()
                .parse()
                .map_err(|_| SceneError::parse(format!("invalid percentage '{text}'")))?;
            return Ok(Coord::Rel(v / 100.0));
        }
        let v: f64 = t
            .strip_suffix("px")
            .unwrap_or(t)
            .trim()
            .parse()
            .map_err(|_| SceneError::parse(format!("invalid coordinate '{text}'")))?;
        Ok(Coord::Px(v))
    }
}

impl serde::Serialize for Coord {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match *self {
            Coord::Px(v) => s.serialize_f64(v),
            Coord::Rel(f) => s.serialize_str(&format!("{}%", f * 100.0)),
        }
    }
}

impl<'de> serde::Deserialize<'de> for Coord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(f64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Num(v) => Ok(Coord::Px(v)),
            Repr::Text(s) => Coord::parse(&s).map_err(serde::de::Error::custom),
        }
    }
}

/// Size of the view that relative coordinates resolve against.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewSize {
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl ViewSize {
    /// Construct a view size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Mean of both extents, used for radii that are relative to the whole view.
    pub fn diagonal_mean(self) -> f64 {
        (self.width + self.height) * 0.5
    }
}
