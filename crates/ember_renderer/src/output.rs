//! 8-bit RGB output image with PPM and PNG writers.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

/// One 8-bit RGB pixel.
pub type Rgb = [u8; 3];

/// Errors that can occur while saving an image.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("PNG encoding error: {0}")]
    Encode(#[from] image::ImageError),
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Plain-text PPM (P3).
    Ppm,
    Png,
}

impl ImageFormat {
    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Ppm => "ppm",
            ImageFormat::Png => "png",
        }
    }

    /// Guess the format from a path's extension. Defaults to PPM.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("png") => ImageFormat::Png,
            _ => ImageFormat::Ppm,
        }
    }
}

/// Row-major RGB image, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Rgb>,
}

impl ImageBuffer {
    /// Create a new black image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; 3]; width as usize * height as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Rgb {
        self.pixels[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, rgb: Rgb) {
        let index = self.index(x, y);
        self.pixels[index] = rgb;
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Convert to packed RGB bytes.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels.iter().flatten().copied().collect()
    }

    /// Write the image as plain-text PPM (P3), one image row per line.
    pub fn write_ppm<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writeln!(writer, "P3")?;
        writeln!(writer, "{} {}", self.width, self.height)?;
        writeln!(writer, "255")?;

        if self.width == 0 {
            return Ok(());
        }
        for row in self.pixels.chunks(self.width as usize) {
            let mut first = true;
            for [r, g, b] in row {
                if !first {
                    write!(writer, " ")?;
                }
                first = false;
                write!(writer, "{r} {g} {b}")?;
            }
            writeln!(writer)?;
        }
        writer.flush()
    }

    /// Save to `path` in the given format.
    pub fn save(&self, path: &Path, format: ImageFormat) -> Result<(), ImageError> {
        match format {
            ImageFormat::Ppm => {
                let file = File::create(path)?;
                self.write_ppm(BufWriter::new(file))?;
            }
            ImageFormat::Png => {
                image::save_buffer(
                    path,
                    &self.to_rgb8(),
                    self.width,
                    self.height,
                    image::ColorType::Rgb8,
                )?;
            }
        }
        log::debug!("Wrote {}", path.display());
        Ok(())
    }
}
