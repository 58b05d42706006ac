use crate::foundation::error::{RetouchError, RetouchResult};

/// Engine-wide options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOpts {
    /// Run per-pixel stages on the rayon pool. Output is identical either way.
    pub parallel: bool,
    /// Upper bound on `width * height` for any raster the engine allocates.
    pub max_pixels: u64,
}

impl Default for EngineOpts {
    fn default() -> Self {
        Self {
            parallel: false,
            // 16k x 16k
            max_pixels: 268_435_456,
        }
    }
}

impl EngineOpts {
    /// Return options with per-pixel parallelism toggled.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Return options with a different pixel budget.
    pub fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = max_pixels;
        self
    }

    /// Defaults overridden by `RETOUCH_PARALLEL` and `RETOUCH_MAX_PIXELS` when they parse.
    pub fn from_env() -> Self {
        let mut out = Self::default();
        if let Some(v) = std::env::var("RETOUCH_PARALLEL")
            .ok()
            .and_then(|v| parse_bool(&v))
        {
            out.parallel = v;
        }
        if let Some(v) = std::env::var("RETOUCH_MAX_PIXELS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&n| n > 0)
        {
            out.max_pixels = v;
        }
        out
    }

    /// Reject rasters larger than the configured budget.
    pub fn check_dimensions(&self, width: u32, height: u32) -> RetouchResult<()> {
        if width == 0 || height == 0 {
            return Err(RetouchError::validation("raster dimensions must be > 0"));
        }
        let px = u64::from(width) * u64::from(height);
        if px > self.max_pixels {
            return Err(RetouchError::resource(format!(
                "raster {width}x{height} exceeds pixel budget {}",
                self.max_pixels
            )));
        }
        Ok(())
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
