use crate::error::BmpError;

/// Resource limits applied between header parse and output allocation.
///
/// All fields default to `None` (unlimited). Input-size bounding stays the
/// caller's job; these only cap what a decode is allowed to produce.
#[derive(Clone, Debug, Default)]
pub struct Limits {
    pub max_width: Option<u64>,
    pub max_height: Option<u64>,
    /// Maximum pixel count (width * height).
    pub max_pixels: Option<u64>,
    /// Maximum output buffer allocation, in bytes.
    pub max_memory_bytes: Option<u64>,
}

impl Limits {
    pub(crate) fn check(&self, width: u32, height: u32) -> Result<(), BmpError> {
        let checks = [
            (self.max_width, u64::from(width), "width"),
            (self.max_height, u64::from(height), "height"),
            (
                self.max_pixels,
                u64::from(width) * u64::from(height),
                "pixel count",
            ),
        ];
        for (limit, actual, what) in checks {
            if let Some(limit) = limit {
                if actual > limit {
                    return Err(BmpError::LimitExceeded(alloc::format!(
                        "{what} {actual} exceeds limit {limit}"
                    )));
                }
            }
        }
        Ok(())
    }

    pub(crate) fn check_memory(&self, bytes: usize) -> Result<(), BmpError> {
        match self.max_memory_bytes {
            Some(limit) if bytes as u64 > limit => Err(BmpError::LimitExceeded(alloc::format!(
                "allocation {bytes} bytes exceeds memory limit {limit}"
            ))),
            _ => Ok(()),
        }
    }
}
