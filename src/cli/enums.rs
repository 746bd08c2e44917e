//! CLI enum types for pixel format options.

use clap::ValueEnum;

use crate::frame::PixelFormat;

/// Pixel format of input frames.
///
/// Values are spelled the same way as `format` in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum FormatArg {
    #[default]
    Mono8,
    Mono10,
    Mono12,
    Mono16,
    Mono10p,
    Mono12p,
    Mono12Packed,
    BayerRg8,
    BayerGb8,
    BayerGr8,
    BayerBg8,
    Rgb8,
    Bgr8,
    Rgba8,
    Bgra8,
    Yuv422,
}

impl From<FormatArg> for PixelFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Mono8 => PixelFormat::Mono8,
            FormatArg::Mono10 => PixelFormat::Mono10,
            FormatArg::Mono12 => PixelFormat::Mono12,
            FormatArg::Mono16 => PixelFormat::Mono16,
            FormatArg::Mono10p => PixelFormat::Mono10p,
            FormatArg::Mono12p => PixelFormat::Mono12p,
            FormatArg::Mono12Packed => PixelFormat::Mono12Packed,
            FormatArg::BayerRg8 => PixelFormat::BayerRg8,
            FormatArg::BayerGb8 => PixelFormat::BayerGb8,
            FormatArg::BayerGr8 => PixelFormat::BayerGr8,
            FormatArg::BayerBg8 => PixelFormat::BayerBg8,
            FormatArg::Rgb8 => PixelFormat::Rgb8,
            FormatArg::Bgr8 => PixelFormat::Bgr8,
            FormatArg::Rgba8 => PixelFormat::Rgba8,
            FormatArg::Bgra8 => PixelFormat::Bgra8,
            FormatArg::Yuv422 => PixelFormat::Yuv422,
        }
    }
}
