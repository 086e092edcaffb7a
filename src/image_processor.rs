//! # Image Processing Module
//!
//! Questo modulo ri-codifica le immagini sul posto per ridurne la dimensione,
//! usando la crate `image` sia per la decodifica che per l'encoding.
//!
//! ## Pipeline di Ottimizzazione
//!
//! 1. **Rilevamento formato**: Dal contenuto del file, non dall'estensione
//! 2. **Decodifica**: Il file handle viene chiuso prima di riscrivere
//! 3. **Encoding in memoria**: Nello stesso formato dell'originale
//! 4. **Scrittura**: Sovrascrive il file originale (nessun backup)
//!
//! ## Formati
//!
//! | Formato | Strategia |
//! |---------|-----------|
//! | JPEG    | Ri-codifica lossy con la qualità configurata |
//! | PNG     | Lossless, compressione massima se `optimize` è attivo |
//! | WebP    | Ri-codifica lossy (libwebp) con la qualità configurata |
//! | Altri   | Encoder di default del codec, errore se non disponibile |
//!
//! ## Error Handling
//!
//! - **File illeggibile / corrotto**: Errore, il file originale non viene toccato
//! - **Encoding fallito**: Errore, il file originale non viene toccato
//! - **Scrittura fallita**: Errore, il file può essere rimasto parzialmente scritto
//!
//! ## Esempio:
//! ```rust,ignore
//! let processor = ImageProcessor::new(70, true);
//! let optimized = processor.optimize(Path::new("/srv/pictrs/files/abc.jpg"))?;
//! info!("saved {} bytes", optimized.bytes_saved());
//! ```

use crate::config::Config;
use crate::error::OptimizeError;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::webp::{WebPEncoder, WebPQuality};
use image::io::Reader as ImageReader;
use image::{ColorType, DynamicImage, ImageEncoder, ImageFormat, ImageOutputFormat};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Result of a successful in-place optimization
#[derive(Debug, Clone)]
pub struct OptimizedImage {
    pub path: PathBuf,
    pub format: ImageFormat,
    pub original_size: u64,
    pub optimized_size: u64,
}

impl OptimizedImage {
    pub fn bytes_saved(&self) -> u64 {
        self.original_size.saturating_sub(self.optimized_size)
    }
}

/// Re-encodes images in place with a fixed quality and optimization flag
#[derive(Debug, Clone)]
pub struct ImageProcessor {
    quality: u8,
    optimize: bool,
}

impl ImageProcessor {
    /// Creates a processor. `quality` is clamped to 1-100, the lossy encoders
    /// start at 1. `optimize` only changes PNG compression.
    pub fn new(quality: u8, optimize: bool) -> Self {
        Self {
            quality: quality.clamp(1, 100),
            optimize,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.quality, config.optimize)
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Optimizes the image at `path`, overwriting it with the re-encoded bytes.
    ///
    /// The format is detected from the file content and kept as is.
    /// Nothing is written unless decoding and encoding both succeed.
    pub fn optimize(&self, path: &Path) -> Result<OptimizedImage, OptimizeError> {
        let original_size = std::fs::metadata(path)?.len();

        let (image, format) = Self::decode(path)?;
        let encoded = self.encode(&image, format)?;

        std::fs::write(path, &encoded)?;
        debug!(
            "Rewrote {} as {:?}: {} -> {} bytes",
            path.display(),
            format,
            original_size,
            encoded.len()
        );

        Ok(OptimizedImage {
            path: path.to_path_buf(),
            format,
            original_size,
            optimized_size: encoded.len() as u64,
        })
    }

    /// Opens and decodes the file; the handle is released when this returns
    fn decode(path: &Path) -> Result<(DynamicImage, ImageFormat), OptimizeError> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let format = reader.format().ok_or_else(|| {
            OptimizeError::UnsupportedFormat(format!("unrecognized content in {}", path.display()))
        })?;
        let image = reader.decode()?;
        Ok((image, format))
    }

    fn encode(&self, image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, OptimizeError> {
        let mut buffer = Vec::new();
        let (width, height) = (image.width(), image.height());

        match format {
            ImageFormat::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut buffer, self.quality);
                // JPEG has no alpha channel: keep grayscale as is, everything else goes to RGB
                if image.color() == ColorType::L8 {
                    encoder.write_image(image.as_bytes(), width, height, ColorType::L8)?;
                } else {
                    let rgb = image.to_rgb8();
                    encoder.write_image(rgb.as_raw(), width, height, ColorType::Rgb8)?;
                }
            }
            ImageFormat::Png => {
                let compression = if self.optimize {
                    CompressionType::Best
                } else {
                    CompressionType::Default
                };
                let encoder = PngEncoder::new_with_quality(&mut buffer, compression, FilterType::Adaptive);
                encoder.write_image(image.as_bytes(), width, height, image.color())?;
            }
            ImageFormat::WebP => {
                // The default WebP output is lossless and grows lossy sources,
                // libwebp only takes RGB/RGBA for lossy encoding
                #[allow(deprecated)]
                let encoder = WebPEncoder::new_with_quality(&mut buffer, WebPQuality::lossy(self.quality));
                if image.color().has_alpha() {
                    let rgba = image.to_rgba8();
                    encoder.encode(rgba.as_raw(), width, height, ColorType::Rgba8)?;
                } else {
                    let rgb = image.to_rgb8();
                    encoder.encode(rgb.as_raw(), width, height, ColorType::Rgb8)?;
                }
            }
            other => {
                let output_format = ImageOutputFormat::from(other);
                if let ImageOutputFormat::Unsupported(name) = &output_format {
                    return Err(OptimizeError::UnsupportedFormat(name.clone()));
                }
                image.write_to(&mut Cursor::new(&mut buffer), output_format)?;
            }
        }

        Ok(buffer)
    }
}

impl Default for ImageProcessor {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
