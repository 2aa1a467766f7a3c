//! Plane sources
//!
//! A plane comes from a built-in pattern or from a file holding exactly
//! one packed plane.

use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use inklink_core::pattern::{Pattern, PatternError};
use inklink_core::PLANE_SIZE;
use thiserror::Error;

/// Heap-allocated plane buffer
pub type PlaneBuf = Box<[u8; PLANE_SIZE]>;

#[derive(Debug, Error)]
pub enum PlaneSourceError {
    #[error("failed to read plane file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("plane file {} is {actual} bytes, expected {PLANE_SIZE}", path.display())]
    Size { path: PathBuf, actual: usize },

    #[error(transparent)]
    Pattern(#[from] PatternError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaneSource {
    Pattern(Pattern),
    /// Raw packed plane, no header
    File(PathBuf),
}

impl FromStr for PlaneSource {
    type Err = PlaneSourceError;

    /// Pattern names win over file names; `solid:` values must be valid
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<Pattern>() {
            Ok(pattern) => Ok(PlaneSource::Pattern(pattern)),
            Err(PatternError::InvalidByte) => Err(PatternError::InvalidByte.into()),
            Err(PatternError::Unknown) => Ok(PlaneSource::File(PathBuf::from(s))),
        }
    }
}

impl PlaneSource {
    pub fn load(&self) -> Result<PlaneBuf, PlaneSourceError> {
        match self {
            PlaneSource::Pattern(pattern) => Ok(Box::new(pattern.render())),
            PlaneSource::File(path) => {
                let bytes = fs::read(path).map_err(|source| PlaneSourceError::Read {
                    path: path.clone(),
                    source,
                })?;
                let actual = bytes.len();
                bytes
                    .into_boxed_slice()
                    .try_into()
                    .map_err(|_| PlaneSourceError::Size {
                        path: path.clone(),
                        actual,
                    })
            }
        }
    }
}

impl std::fmt::Display for PlaneSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaneSource::Pattern(pattern) => write!(f, "pattern {pattern}"),
            PlaneSource::File(path) => write!(f, "file {}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("inklink-{}-{name}", std::process::id()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_pattern_names() {
        assert_eq!(
            "stripes".parse::<PlaneSource>().unwrap(),
            PlaneSource::Pattern(Pattern::Stripes)
        );
        assert_eq!(
            "solid:0x00".parse::<PlaneSource>().unwrap(),
            PlaneSource::Pattern(Pattern::Solid(0))
        );
        assert!(matches!(
            "solid:999".parse::<PlaneSource>(),
            Err(PlaneSourceError::Pattern(PatternError::InvalidByte))
        ));
    }

    #[test]
    fn test_other_names_are_files() {
        assert_eq!(
            "images/primary.bin".parse::<PlaneSource>().unwrap(),
            PlaneSource::File(PathBuf::from("images/primary.bin"))
        );
    }

    #[test]
    fn test_load_pattern() {
        let plane = PlaneSource::Pattern(Pattern::Ramp).load().unwrap();
        assert_eq!(plane[0], 0);
        assert_eq!(plane[PLANE_SIZE - 1], 254);
    }

    #[test]
    fn test_load_raw_file() {
        let contents: Vec<u8> = (0..PLANE_SIZE).map(|i| (i % 251) as u8).collect();
        let path = temp_file("plane.bin", &contents);

        let plane = PlaneSource::File(path.clone()).load().unwrap();
        assert_eq!(&plane[..], &contents[..]);
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_wrong_size_file() {
        let path = temp_file("short.bin", &[0u8; 100]);

        let error = PlaneSource::File(path.clone()).load().unwrap_err();
        assert!(matches!(error, PlaneSourceError::Size { actual: 100, .. }));
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_missing_file() {
        let source = PlaneSource::File(std::env::temp_dir().join("inklink-missing-plane.bin"));
        assert!(matches!(
            source.load(),
            Err(PlaneSourceError::Read { .. })
        ));
    }
}
