use std::io::Cursor;

use crate::errors::{ExportError, Result};

/// Pixel payload of a host image.
#[derive(Debug, Clone)]
pub enum ImageData {
    /// Raw RGBA8 pixels, row-major, `width * height * 4` bytes.
    Rgba8(Vec<u8>),
    /// Already-encoded image file (PNG, JPEG, ...).
    Encoded { mime_type: String, bytes: Vec<u8> },
}

/// A host image (texture, cubemap face strip, lightmap, captured skybox).
///
/// Shared through `Arc`; the document writer exports each allocation once.
#[derive(Debug, Clone)]
pub struct Image {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub data: ImageData,
}

impl Image {
    #[must_use]
    pub fn rgba8(name: impl Into<String>, width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            data: ImageData::Rgba8(pixels),
        }
    }

    #[must_use]
    pub fn encoded(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            width: 0,
            height: 0,
            data: ImageData::Encoded {
                mime_type: mime_type.into(),
                bytes,
            },
        }
    }

    /// Returns `(mime_type, bytes)` ready to be written as a blob. Raw pixels
    /// are encoded as PNG.
    pub fn to_blob(&self) -> Result<(String, Vec<u8>)> {
        match &self.data {
            ImageData::Encoded { mime_type, bytes } => Ok((mime_type.clone(), bytes.clone())),
            ImageData::Rgba8(pixels) => {
                let rgba = image::RgbaImage::from_raw(self.width, self.height, pixels.clone())
                    .ok_or_else(|| {
                        ExportError::ImageEncodeError(format!(
                            "image '{}' has {} bytes, expected {}x{}x4",
                            self.name,
                            pixels.len(),
                            self.width,
                            self.height
                        ))
                    })?;

                let mut cursor = Cursor::new(Vec::new());
                rgba.write_to(&mut cursor, image::ImageFormat::Png)?;
                Ok(("image/png".to_string(), cursor.into_inner()))
            }
        }
    }
}
