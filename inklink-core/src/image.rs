//! Image planes
//!
//! A panel image is two 1-bit-per-pixel planes of identical size.

use inklink_protocol::ColorPlane;

/// Panel width in pixels
pub const WIDTH: usize = 400;

/// Panel height in pixels
pub const HEIGHT: usize = 300;

/// Bytes per plane at one bit per pixel
pub const PLANE_SIZE: usize = WIDTH * HEIGHT / 8;

/// Bytes per pixel row
pub const ROW_BYTES: usize = WIDTH / 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlaneError {
    /// Buffer is not exactly [`PLANE_SIZE`] bytes
    WrongSize { expected: usize, actual: usize },
}

impl core::fmt::Display for PlaneError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PlaneError::WrongSize { expected, actual } => {
                write!(f, "plane is {actual} bytes, expected {expected}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PlaneError {}

/// Borrowed, size-checked plane buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plane<'a> {
    bytes: &'a [u8; PLANE_SIZE],
}

impl<'a> Plane<'a> {
    /// Wrap a buffer, which must be exactly [`PLANE_SIZE`] bytes
    pub fn new(bytes: &'a [u8]) -> Result<Self, PlaneError> {
        let bytes = <&[u8; PLANE_SIZE]>::try_from(bytes).map_err(|_| PlaneError::WrongSize {
            expected: PLANE_SIZE,
            actual: bytes.len(),
        })?;
        Ok(Self { bytes })
    }

    pub fn from_array(bytes: &'a [u8; PLANE_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

/// Two-plane image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Image<'a> {
    /// Black/white plane
    pub primary: Plane<'a>,
    /// Red/white plane
    pub accent: Plane<'a>,
}

impl<'a> Image<'a> {
    pub fn new(primary: Plane<'a>, accent: Plane<'a>) -> Self {
        Self { primary, accent }
    }

    /// Plane for a wire color tag
    pub fn plane(&self, which: ColorPlane) -> Plane<'a> {
        match which {
            ColorPlane::Primary => self.primary,
            ColorPlane::Accent => self.accent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_size() {
        assert_eq!(PLANE_SIZE, 15000);
        assert_eq!(ROW_BYTES * HEIGHT, PLANE_SIZE);
    }

    #[test]
    fn test_plane_rejects_wrong_size() {
        let short = [0u8; PLANE_SIZE - 1];
        assert_eq!(
            Plane::new(&short),
            Err(PlaneError::WrongSize {
                expected: PLANE_SIZE,
                actual: PLANE_SIZE - 1
            })
        );

        let long = vec![0u8; PLANE_SIZE + 1];
        assert!(Plane::new(&long).is_err());
    }

    #[test]
    fn test_image_selects_plane() {
        let black = [0x00u8; PLANE_SIZE];
        let red = [0xFFu8; PLANE_SIZE];
        let image = Image::new(Plane::from_array(&black), Plane::new(&red).unwrap());

        assert_eq!(image.plane(ColorPlane::Primary).as_bytes()[0], 0x00);
        assert_eq!(image.plane(ColorPlane::Accent).as_bytes()[0], 0xFF);
    }
}
