//! Inklink host sender
//!
//! Glue between the command line, the configuration file, the byte stream
//! to the controller and the transfer engine in `inklink-core`.

pub mod cli;
pub mod config;
pub mod link;
pub mod source;

use anyhow::{Context, Result};
use inklink_core::{Image, Plane, Transfer, TransferReport};
use inklink_hal::StdDelay;
use log::{info, warn};

use crate::config::HostConfig;
use crate::source::{PlaneBuf, PlaneSource};

/// Both planes of the image to send
pub struct Planes {
    pub primary: PlaneBuf,
    pub accent: PlaneBuf,
}

impl Planes {
    /// Load the planes named by `config`
    pub fn load(config: &HostConfig) -> Result<Self> {
        Ok(Self {
            primary: load_plane("primary", &config.image.primary)?,
            accent: load_plane("accent", &config.image.accent)?,
        })
    }

    pub fn image(&self) -> Image<'_> {
        Image::new(
            Plane::from_array(&self.primary),
            Plane::from_array(&self.accent),
        )
    }
}

fn load_plane(name: &str, value: &str) -> Result<PlaneBuf> {
    let source: PlaneSource = value
        .parse()
        .with_context(|| format!("invalid {name} plane source {value:?}"))?;
    info!("Loading {} plane from {}", name, source);
    source
        .load()
        .with_context(|| format!("failed to load {name} plane"))
}

/// Validate `config`, open the link and send one image
pub fn run(config: &HostConfig) -> Result<TransferReport> {
    config.validate().context("invalid configuration")?;
    let endpoint = config.link.endpoint()?;
    if config.link.ignores_read_timeout(&endpoint) {
        warn!(
            "read_timeout_ms applies to tcp:// only; set the read timeout of {} with stty",
            endpoint
        );
    }
    let planes = Planes::load(config)?;

    info!("Opening {}", endpoint);
    let link = link::open(&endpoint, config.link.read_timeout())
        .with_context(|| format!("failed to open {endpoint}"))?;

    let mut transfer = Transfer::new(link, StdDelay, config.transfer);
    let report = transfer
        .send_image(&planes.image())
        .context("image transfer failed")?;
    Ok(report)
}
