//! Pipeline configuration and loading it from disk.

use crate::composite::CompositeParams;
use crate::filters::{ColorControls, Monochrome, Posterize};
use crate::interface::PixelFormat;
use crate::polarity::PolarityParams;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// All tunables of the mask pipeline, defaults reproduce the standard text mask.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskConfig {
    pub monochrome: Monochrome,
    /// Applied right after the monochrome conversion, a no-op by default.
    pub color_controls: ColorControls,
    pub posterize: Posterize,
    pub polarity: PolarityParams,
    pub composite: CompositeParams,
    /// Format of the intermediate masks. With 8 bit storage the middle posterize band reads back
    /// as slightly brighter than 0.5.
    pub working_format: PixelFormat,
}

impl Default for MaskConfig {
    fn default() -> Self {
        MaskConfig {
            monochrome: Default::default(),
            color_controls: Default::default(),
            posterize: Default::default(),
            polarity: Default::default(),
            composite: Default::default(),
            working_format: PixelFormat::RGBA_F32,
        }
    }
}

impl MaskConfig {
    pub fn from_json(data: &str) -> serde_json::Result<MaskConfig> {
        serde_json::from_str(data)
    }

    pub fn from_yaml(data: &str) -> Result<MaskConfig, serde_yaml::Error> {
        serde_yaml::from_str(data)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Load a configuration file, yaml if the extension says so, json otherwise.
pub fn load_config(path: &Path) -> Result<MaskConfig, Box<dyn std::error::Error>> {
    use std::fs::File;
    use std::io::Read;
    let mut file = File::open(path)?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let config = if is_yaml {
        MaskConfig::from_yaml(&content)?
    } else {
        MaskConfig::from_json(&content)?
    };
    Ok(config)
}
