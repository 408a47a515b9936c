//! canvas-json contains the JSON schemas used to configure canvas-bridge.
//!
//! These are plain serde records. The bridge fills them from script values
//! when a rendering context or an image bitmap is requested, and embedders can
//! load them from JSON to change the defaults that the bridge applies.

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};

/// Bridge configuration JSON schema.
///
/// This contains the settings that apply to a whole isolate. Any field that is
/// missing from the JSON takes its default value.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct BridgeConfig {
    /// Behaviour of forwarders when the arguments of a call are malformed.
    pub invalid_arguments: InvalidArgumentPolicy,
    /// Context attributes used when a factory call does not supply them.
    pub context_defaults: ContextAttributes,
}

/// Behaviour on malformed arguments.
///
/// Calls with too few arguments, with arguments of the wrong type, or with
/// wrappers of the wrong class never reach the native engine. This policy
/// decides whether script also gets to see an exception.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum InvalidArgumentPolicy {
    /// The call returns without setting a return value or raising.
    #[default]
    Ignore,
    /// The call raises a `TypeError` describing the problem.
    Throw,
}

/// WebGL context attributes JSON schema.
///
/// This mirrors the `WebGLContextAttributes` dictionary. The defaults are the
/// ones that the WebGL specification gives, except for `stencil`, which is
/// off.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ContextAttributes {
    /// Drawing buffer has an alpha channel.
    pub alpha: bool,
    /// Drawing buffer is antialiased.
    pub antialias: bool,
    /// Drawing buffer has a depth buffer.
    pub depth: bool,
    /// Context creation fails on slow implementations.
    pub fail_if_major_performance_caveat: bool,
    /// GPU preference hint.
    pub power_preference: PowerPreference,
    /// Drawing buffer colors are premultiplied by alpha.
    pub premultiplied_alpha: bool,
    /// Drawing buffer is kept after compositing.
    pub preserve_drawing_buffer: bool,
    /// Drawing buffer has a stencil buffer.
    pub stencil: bool,
    /// Context is decoupled from the compositor.
    pub desynchronized: bool,
    /// Context is compatible with immersive XR devices.
    pub xr_compatible: bool,
}

impl Default for ContextAttributes {
    fn default() -> ContextAttributes {
        ContextAttributes {
            alpha: true,
            antialias: true,
            depth: true,
            fail_if_major_performance_caveat: false,
            power_preference: PowerPreference::Default,
            premultiplied_alpha: true,
            preserve_drawing_buffer: false,
            stencil: false,
            desynchronized: false,
            xr_compatible: false,
        }
    }
}

/// GPU power preference.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PowerPreference {
    /// Let the native engine decide.
    #[default]
    Default,
    /// Prefer a high performance GPU.
    HighPerformance,
    /// Prefer a low power GPU.
    LowPower,
}

impl PowerPreference {
    /// Returns the WebGL name of the preference.
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerPreference::Default => "default",
            PowerPreference::HighPerformance => "high-performance",
            PowerPreference::LowPower => "low-power",
        }
    }

    /// Parses a WebGL power preference name.
    ///
    /// Returns `None` if `name` is not one of the names listed in the WebGL
    /// specification.
    pub fn from_name(name: &str) -> Option<PowerPreference> {
        Some(match name {
            "default" => PowerPreference::Default,
            "high-performance" => PowerPreference::HighPerformance,
            "low-power" => PowerPreference::LowPower,
            _ => return None,
        })
    }
}

/// `createImageBitmap` options JSON schema.
///
/// This mirrors the `ImageBitmapOptions` dictionary.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageBitmapOptions {
    /// Flip the image vertically.
    pub flip_y: bool,
    /// Alpha premultiplication.
    pub premultiply_alpha: PremultiplyAlpha,
    /// Color space conversion.
    pub color_space_conversion: ColorSpaceConversion,
    /// Resampling quality used when resizing.
    pub resize_quality: ResizeQuality,
    /// Output width in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resize_width: Option<f32>,
    /// Output height in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resize_height: Option<f32>,
}

macro_rules! impl_named_enum {
    ($t:ty, $($variant:ident => $name:literal),+) => {
        impl $t {
            /// Returns the WebGL name of the value.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }

            /// Parses a name as it appears in script.
            pub fn from_name(name: &str) -> Option<$t> {
                match name {
                    $($name => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Returns the discriminant that is passed to the native engine.
            pub fn code(&self) -> i32 {
                *self as i32
            }
        }
    };
}

/// Alpha premultiplication option.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum PremultiplyAlpha {
    /// Implementation default.
    #[default]
    Default = 0,
    /// Premultiply the color channels by alpha.
    Premultiply = 1,
    /// Do not premultiply.
    None = 2,
}

impl_named_enum!(PremultiplyAlpha, Default => "default", Premultiply => "premultiply", None => "none");

/// Color space conversion option.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum ColorSpaceConversion {
    /// Implementation default.
    #[default]
    Default = 0,
    /// No conversion.
    None = 1,
}

impl_named_enum!(ColorSpaceConversion, Default => "default", None => "none");

/// Resize quality option.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum ResizeQuality {
    /// Fast, low quality resampling.
    #[default]
    Low = 0,
    /// Medium quality resampling.
    Medium = 1,
    /// Slow, high quality resampling.
    High = 2,
    /// Nearest neighbour.
    Pixelated = 3,
}

impl_named_enum!(
    ResizeQuality,
    Low => "low",
    Medium => "medium",
    High => "high",
    Pixelated => "pixelated"
);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn config_defaults_from_empty_json() {
        let config: BridgeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.invalid_arguments, InvalidArgumentPolicy::Ignore);
        assert!(config.context_defaults.alpha);
        assert!(!config.context_defaults.stencil);
    }

    #[test]
    fn partial_context_defaults() {
        let config: BridgeConfig = serde_json::from_str(
            r#"{"invalidArguments": "throw",
                "contextDefaults": {"stencil": true, "powerPreference": "low-power"}}"#,
        )
        .unwrap();
        assert_eq!(config.invalid_arguments, InvalidArgumentPolicy::Throw);
        assert!(config.context_defaults.stencil);
        assert!(config.context_defaults.antialias);
        assert_eq!(
            config.context_defaults.power_preference,
            PowerPreference::LowPower
        );
    }

    #[test]
    fn named_enums() {
        assert_eq!(
            PowerPreference::from_name("high-performance"),
            Some(PowerPreference::HighPerformance)
        );
        assert_eq!(PowerPreference::from_name("fast"), None);
        assert_eq!(
            ResizeQuality::from_name("pixelated").map(|q| q.code()),
            Some(3)
        );
        assert_eq!(PremultiplyAlpha::None.as_str(), "none");
        assert_eq!(ColorSpaceConversion::from_name("none").map(|c| c.code()), Some(1));
    }
}
