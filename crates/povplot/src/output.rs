//! Image destinations and output formats.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::codecs::jpeg::JpegEncoder;
use image::ColorType;
use povplot_common::{InputError, PlotError, PlotResult};

use crate::png;
use crate::raster::Raster;

pub const JPEG_QUALITY: u8 = 90;

/// Encoded image format of a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    Png,
    Jpeg,
}

impl ImageType {
    /// Image type for a file extension, case-insensitive.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageType::Png),
            "jpg" | "jpeg" => Some(ImageType::Jpeg),
            _ => None,
        }
    }

    /// Guess from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self, InputError> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| InputError::UnknownExtension(path.to_path_buf()))
    }

    /// Sniff the format from leading bytes.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if png::is_png(bytes) {
            Some(ImageType::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageType::Jpeg)
        } else {
            None
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageType::Png => "png",
            ImageType::Jpeg => "jpg",
        }
    }
}

impl FromStr for ImageType {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s.trim_start_matches('.'))
            .ok_or_else(|| InputError::UnsupportedImageType(s.to_string()))
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Where a rendered image is written.
pub enum Destination<'a> {
    Path(PathBuf),
    /// A stream, with an optional name used to guess the image type.
    Writer {
        writer: &'a mut (dyn Write + Send),
        name: Option<PathBuf>,
    },
}

impl<'a> Destination<'a> {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Destination::Path(path.into())
    }

    pub fn writer(writer: &'a mut (dyn Write + Send)) -> Self {
        Destination::Writer { writer, name: None }
    }

    pub fn named_writer(writer: &'a mut (dyn Write + Send), name: impl Into<PathBuf>) -> Self {
        Destination::Writer {
            writer,
            name: Some(name.into()),
        }
    }

    fn name(&self) -> Option<&Path> {
        match self {
            Destination::Path(path) => Some(path),
            Destination::Writer { name, .. } => name.as_deref(),
        }
    }

    /// Image type to write: `explicit` if given, else guessed from the name.
    pub fn resolve_image_type(&self, explicit: Option<ImageType>) -> Result<ImageType, InputError> {
        if let Some(imgtype) = explicit {
            return Ok(imgtype);
        }
        match self.name() {
            Some(name) => ImageType::from_path(name),
            None => Err(InputError::MissingImageType),
        }
    }
}

impl fmt::Debug for Destination<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Destination::Writer { name, .. } => {
                f.debug_struct("Writer").field("name", name).finish_non_exhaustive()
            }
        }
    }
}

/// Encode a raster. JPEG drops the alpha channel.
pub fn encode(raster: &Raster, imgtype: ImageType) -> PlotResult<Vec<u8>> {
    match imgtype {
        ImageType::Png => Ok(png::encode_raster(raster)?),
        ImageType::Jpeg => {
            let rgb: Vec<u8> = raster
                .pixels()
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect();
            let mut out = Vec::new();
            JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
                .encode(&rgb, raster.width(), raster.height(), ColorType::Rgb8)
                .map_err(|e| PlotError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
            Ok(out)
        }
    }
}

/// Encode and write a raster to `destination`.
pub fn write_raster(
    raster: &Raster,
    destination: Destination<'_>,
    imgtype: ImageType,
) -> PlotResult<()> {
    let bytes = encode(raster, imgtype)?;
    match destination {
        Destination::Path(path) => std::fs::write(path, bytes)?,
        Destination::Writer { writer, .. } => {
            writer.write_all(&bytes)?;
            writer.flush()?;
        }
    }
    Ok(())
}
