//! Device and capture orientation
//!
//! The physical orientation of the device is sampled fresh at the moment of
//! each photo capture or recording start and mapped to the orientation the
//! capture connection should record with. Landscape is mirrored across the
//! mapping: a device held landscape-left records landscape-right footage and
//! vice versa.

use serde::{Deserialize, Serialize};

/// Physical orientation of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeviceOrientation {
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
    FaceUp,
    FaceDown,
    Unknown,
}

/// Orientation applied to a capture connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VideoOrientation {
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

impl From<DeviceOrientation> for VideoOrientation {
    fn from(device: DeviceOrientation) -> Self {
        match device {
            DeviceOrientation::Portrait => VideoOrientation::Portrait,
            DeviceOrientation::PortraitUpsideDown => VideoOrientation::PortraitUpsideDown,
            DeviceOrientation::LandscapeLeft => VideoOrientation::LandscapeRight,
            DeviceOrientation::LandscapeRight => VideoOrientation::LandscapeLeft,
            // Flat or unknown devices record portrait.
            DeviceOrientation::FaceUp | DeviceOrientation::FaceDown | DeviceOrientation::Unknown => {
                VideoOrientation::Portrait
            }
        }
    }
}

/// Source of the current physical device orientation.
pub trait OrientationSource: Send + Sync {
    fn current(&self) -> DeviceOrientation;
}

/// Fixed orientation source for headless hosts and tests.
pub struct FixedOrientation(pub DeviceOrientation);

impl OrientationSource for FixedOrientation {
    fn current(&self) -> DeviceOrientation {
        self.0
    }
}
