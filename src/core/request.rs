//! Solve request definition and validation.
//!
//! A [`SolveRequest`] can only be obtained through [`SolveRequestBuilder::build`]
//! or [`SolveRequest::from_json`], both of which run the same validation. A
//! request that exists is therefore always well formed.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::utils::{SolverError, SolverResult};

/// Suffix appended to solved image names when none is given.
pub const DEFAULT_SUFFIX: &str = "_ast";

/// Pixel scale search range in arcseconds per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleBounds {
    pub low: f64,
    pub high: f64,
}

impl ScaleBounds {
    pub fn new(low: f64, high: f64) -> SolverResult<Self> {
        if !low.is_finite() || !high.is_finite() {
            return Err(SolverError::invalid("scale bounds must be finite numbers"));
        }
        if low <= 0.0 {
            return Err(SolverError::invalid(format!(
                "scale lower bound must be positive, got {}",
                low
            )));
        }
        if low > high {
            return Err(SolverError::invalid(format!(
                "scale lower bound {} exceeds upper bound {}",
                low, high
            )));
        }
        Ok(Self { low, high })
    }

    /// Builds bounds from a sequence that must hold exactly two values.
    pub fn from_slice(values: &[f64]) -> SolverResult<Self> {
        match values {
            [low, high] => Self::new(*low, *high),
            _ => Err(SolverError::invalid(format!(
                "scale must be a (lower, upper) pair, got {} values",
                values.len()
            ))),
        }
    }
}

/// A validated batch of images plus the optional solve hints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveRequest {
    images: Vec<String>,
    ra: Option<String>,
    dec: Option<String>,
    radius: Option<f64>,
    scale: Option<ScaleBounds>,
    suffix: String,
    wcs_output: bool,
}

impl SolveRequest {
    /// Starts a request for a single image.
    pub fn builder(image: impl Into<String>) -> SolveRequestBuilder {
        SolveRequestBuilder::new(vec![image.into()])
    }

    /// Starts a request for an ordered sequence of images.
    pub fn batch<I, S>(images: I) -> SolveRequestBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SolveRequestBuilder::new(images.into_iter().map(Into::into).collect())
    }

    /// Builds a request from its loosely typed JSON form.
    ///
    /// Any field of the wrong type surfaces as [`SolverError::InvalidParameter`].
    pub fn from_json(value: &Value) -> SolverResult<Self> {
        let params: SolveParams = serde_json::from_value(value.clone())
            .map_err(|e| SolverError::invalid(e.to_string()))?;
        params.into_request()
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn ra(&self) -> Option<&str> {
        self.ra.as_deref()
    }

    pub fn dec(&self) -> Option<&str> {
        self.dec.as_deref()
    }

    pub fn radius(&self) -> Option<f64> {
        self.radius
    }

    pub fn scale(&self) -> Option<ScaleBounds> {
        self.scale
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn wcs_output(&self) -> bool {
        self.wcs_output
    }
}

#[derive(Debug, Clone)]
pub struct SolveRequestBuilder {
    images: Vec<String>,
    ra: Option<String>,
    dec: Option<String>,
    radius: Option<f64>,
    scale: Option<Vec<f64>>,
    suffix: String,
    wcs_output: bool,
}

impl SolveRequestBuilder {
    fn new(images: Vec<String>) -> Self {
        Self {
            images,
            ra: None,
            dec: None,
            radius: None,
            scale: None,
            suffix: DEFAULT_SUFFIX.to_string(),
            wcs_output: false,
        }
    }

    /// Right ascension of the field centre, e.g. `"13:55:45.12"`
    pub fn ra(mut self, ra: impl Into<String>) -> Self {
        self.ra = Some(ra.into());
        self
    }

    /// Declination of the field centre, e.g. `"+36:49:27.13"`
    pub fn dec(mut self, dec: impl Into<String>) -> Self {
        self.dec = Some(dec.into());
        self
    }

    /// Search radius around ra/dec in degrees
    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn scale(mut self, low: f64, high: f64) -> Self {
        self.scale = Some(vec![low, high]);
        self
    }

    /// Scale bounds from an arbitrary sequence; rejected at build time unless
    /// it holds exactly two values.
    pub fn scale_values(mut self, values: Vec<f64>) -> Self {
        self.scale = Some(values);
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn wcs_output(mut self, keep: bool) -> Self {
        self.wcs_output = keep;
        self
    }

    pub fn build(self) -> SolverResult<SolveRequest> {
        if self.images.is_empty() {
            return Err(SolverError::invalid("at least one image is required"));
        }
        if let Some(pos) = self.images.iter().position(|i| i.trim().is_empty()) {
            return Err(SolverError::invalid(format!("image #{} has an empty name", pos + 1)));
        }
        if let Some(ra) = &self.ra {
            validate_sexagesimal("ra", ra)?;
        }
        if let Some(dec) = &self.dec {
            validate_sexagesimal("dec", dec)?;
        }
        if let Some(radius) = self.radius {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(SolverError::invalid(format!(
                    "radius must be a positive number of degrees, got {}",
                    radius
                )));
            }
        }
        let scale = self
            .scale
            .as_deref()
            .map(ScaleBounds::from_slice)
            .transpose()?;
        if self.suffix.is_empty() {
            return Err(SolverError::invalid("suffix cannot be empty"));
        }
        if self.suffix.contains(['/', '\\']) {
            return Err(SolverError::invalid(format!(
                "suffix cannot contain path separators: '{}'",
                self.suffix
            )));
        }

        Ok(SolveRequest {
            images: self.images,
            ra: self.ra,
            dec: self.dec,
            radius: self.radius,
            scale,
            suffix: self.suffix,
            wcs_output: self.wcs_output,
        })
    }
}

/// Accepts `hh:mm:ss.s`, `dd mm ss`, signed forms and plain decimal degrees.
fn validate_sexagesimal(field: &str, value: &str) -> SolverResult<()> {
    let trimmed = value.trim();
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, ':' | '.' | '+' | '-' | ' ');
    if trimmed.is_empty() || !trimmed.chars().all(allowed) || !trimmed.chars().any(|c| c.is_ascii_digit()) {
        return Err(SolverError::invalid(format!(
            "'{}' should be a sexagesimal string, got '{}'",
            field, value
        )));
    }
    Ok(())
}

/// Image argument accepted either as one name or a list of names.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ImageArg {
    One(String),
    Many(Vec<String>),
}

impl ImageArg {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(name) => vec![name],
            Self::Many(names) => names,
        }
    }
}

/// Wire form of a request, as read from JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolveParams {
    pub name: ImageArg,
    #[serde(default)]
    pub ra: Option<String>,
    #[serde(default)]
    pub dec: Option<String>,
    #[serde(default)]
    pub radius: Option<f64>,
    #[serde(default)]
    pub scale: Option<Vec<f64>>,
    #[serde(default = "default_suffix")]
    pub suffix: String,
    #[serde(default)]
    pub wcs_output: bool,
}

fn default_suffix() -> String {
    DEFAULT_SUFFIX.to_string()
}

impl SolveParams {
    pub fn into_request(self) -> SolverResult<SolveRequest> {
        let mut builder = SolveRequest::batch(self.name.into_vec())
            .suffix(self.suffix)
            .wcs_output(self.wcs_output);
        if let Some(ra) = self.ra {
            builder = builder.ra(ra);
        }
        if let Some(dec) = self.dec {
            builder = builder.dec(dec);
        }
        if let Some(radius) = self.radius {
            builder = builder.radius(radius);
        }
        if let Some(scale) = self.scale {
            builder = builder.scale_values(scale);
        }
        builder.build()
    }
}
