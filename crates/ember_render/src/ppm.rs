//! Plain-text PPM (`P3`) output.

use crate::material::Color;
use crate::renderer::{color_to_rgb8, ImageBuffer};
use crate::scheduler::PixelSample;
use std::io::{self, Write};

/// Streams a `P3` image one pixel per line, rows top to bottom.
pub struct PpmWriter<W: Write> {
    writer: W,
    samples_per_pixel: u32,
}

impl<W: Write> PpmWriter<W> {
    /// Write the header and return a writer ready for pixel data.
    pub fn new(mut writer: W, width: u32, height: u32, samples_per_pixel: u32) -> io::Result<Self> {
        writeln!(writer, "P3")?;
        writeln!(writer, "{} {}", width, height)?;
        writeln!(writer, "255")?;
        Ok(Self {
            writer,
            samples_per_pixel,
        })
    }

    /// Write one pixel from its accumulated sample sum.
    pub fn write_pixel(&mut self, sum: Color) -> io::Result<()> {
        let [r, g, b] = color_to_rgb8(sum, self.samples_per_pixel);
        writeln!(self.writer, "{} {} {}", r, g, b)
    }

    /// Write a row of samples already in column order.
    pub fn write_row(&mut self, samples: &[PixelSample]) -> io::Result<()> {
        for sample in samples {
            self.write_pixel(sample.color)?;
        }
        Ok(())
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Write a finished in-memory image.
pub fn write_image<W: Write>(writer: W, image: &ImageBuffer) -> io::Result<W> {
    let mut ppm = PpmWriter::new(writer, image.width, image.height, image.samples_per_pixel)?;
    for &sum in &image.pixels {
        ppm.write_pixel(sum)?;
    }
    ppm.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_and_pixels() {
        let mut ppm = PpmWriter::new(Vec::new(), 2, 1, 1).unwrap();
        ppm.write_pixel(Color::new(1.0, 0.0, 0.25)).unwrap();
        ppm.write_pixel(Color::ZERO).unwrap();
        let text = String::from_utf8(ppm.finish().unwrap()).unwrap();

        assert_eq!(text, "P3\n2 1\n255\n255 0 128\n0 0 0\n");
    }

    #[test]
    fn test_samples_are_averaged() {
        let mut ppm = PpmWriter::new(Vec::new(), 1, 1, 16).unwrap();
        ppm.write_pixel(Color::splat(4.0)).unwrap();
        let text = String::from_utf8(ppm.finish().unwrap()).unwrap();
        assert!(text.ends_with("128 128 128\n"));
    }

    #[test]
    fn test_write_image_is_row_major() {
        let mut image = ImageBuffer::new(2, 2, 1);
        image.set(1, 0, Color::new(1.0, 0.0, 0.0));
        image.set(0, 1, Color::new(0.0, 1.0, 0.0));
        let text = String::from_utf8(write_image(Vec::new(), &image).unwrap()).unwrap();
        let pixels: Vec<&str> = text.lines().skip(3).collect();

        assert_eq!(pixels, ["0 0 0", "255 0 0", "0 255 0", "0 0 0"]);
    }
}
