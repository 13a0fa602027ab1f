//! Fetching and decoding one image into RGBA8.

use std::io::Cursor;
use std::time::Duration;

use image::ImageReader;

use crate::constants::DEFAULT_LOAD_TIMEOUT_SECS;
use crate::error::LoadError;

/// A decoded image ready for texture upload.
#[derive(Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8 pixels, row-major.
    pub rgba: Vec<u8>,
}

impl DecodedImage {
    /// Width over height.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

/// Reads the raw bytes behind a locator: a plain path, `file://` or
/// `http(s)://`. HTTP requests give up after `timeout` so a stalled server
/// cannot hold a decoder thread forever.
#[derive(Clone)]
pub struct Fetcher {
    timeout: Duration,
    #[cfg(not(target_arch = "wasm32"))]
    agent: ureq::Agent,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            #[cfg(not(target_arch = "wasm32"))]
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    pub fn fetch(&self, locator: &str) -> Result<Vec<u8>, LoadError> {
        let fetch_err = |message: String| LoadError::Fetch {
            locator: locator.to_string(),
            message,
        };

        if locator.starts_with("http://") || locator.starts_with("https://") {
            return self.fetch_http(locator).map_err(fetch_err);
        }

        let path = locator.strip_prefix("file://").unwrap_or(locator);
        std::fs::read(path).map_err(|e| fetch_err(e.to_string()))
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn fetch_http(&self, url: &str) -> Result<Vec<u8>, String> {
        use std::io::Read;

        let response = self.agent.get(url).call().map_err(|e| e.to_string())?;
        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| e.to_string())?;
        Ok(bytes)
    }

    #[cfg(target_arch = "wasm32")]
    fn fetch_http(&self, _url: &str) -> Result<Vec<u8>, String> {
        Err("HTTP fetch is not available on this target".to_string())
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_LOAD_TIMEOUT_SECS))
    }
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher").field("timeout", &self.timeout).finish()
    }
}

fn check_dimensions(locator: &str, width: u32, height: u32) -> Result<(), LoadError> {
    if width == 0 || height == 0 {
        Err(LoadError::EmptyImage {
            locator: locator.to_string(),
            width,
            height,
        })
    } else {
        Ok(())
    }
}

fn decode_err(locator: &str, e: impl std::fmt::Display) -> LoadError {
    LoadError::Decode {
        locator: locator.to_string(),
        message: e.to_string(),
    }
}

/// One way of turning a locator into pixels.
pub trait DecodeStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn decode(&self, locator: &str) -> Result<DecodedImage, LoadError>;
}

/// Fast path: fetch everything, decode straight from memory.
#[derive(Debug, Default, Clone)]
pub struct BitmapDecode {
    pub fetcher: Fetcher,
}

impl DecodeStrategy for BitmapDecode {
    fn name(&self) -> &'static str {
        "bitmap"
    }

    fn decode(&self, locator: &str) -> Result<DecodedImage, LoadError> {
        let bytes = self.fetcher.fetch(locator)?;
        let rgba = image::load_from_memory(&bytes)
            .map_err(|e| decode_err(locator, e))?
            .to_rgba8();
        let (width, height) = rgba.dimensions();
        check_dimensions(locator, width, height)?;
        Ok(DecodedImage {
            width,
            height,
            rgba: rgba.into_raw(),
        })
    }
}

/// Fallback path: read the header for the natural size first, then decode
/// the pixels with the format guessed from the content.
#[derive(Debug, Default, Clone)]
pub struct ElementDecode {
    pub fetcher: Fetcher,
}

impl DecodeStrategy for ElementDecode {
    fn name(&self) -> &'static str {
        "element"
    }

    fn decode(&self, locator: &str) -> Result<DecodedImage, LoadError> {
        let bytes = self.fetcher.fetch(locator)?;

        let (width, height) = ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .map_err(|e| decode_err(locator, e))?
            .into_dimensions()
            .map_err(|e| decode_err(locator, e))?;
        check_dimensions(locator, width, height)?;

        let image = ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .map_err(|e| decode_err(locator, e))?
            .decode()
            .map_err(|e| decode_err(locator, e))?;

        Ok(DecodedImage {
            width,
            height,
            rgba: image.to_rgba8().into_raw(),
        })
    }
}

/// Strategies tried in order; the last error is reported.
pub struct DecodeChain {
    strategies: Vec<Box<dyn DecodeStrategy>>,
}

impl DecodeChain {
    /// Bitmap then element when `fast_decode`, otherwise element only.
    /// Every fetch is bounded by `fetch_timeout`.
    pub fn new(fast_decode: bool, fetch_timeout: Duration) -> Self {
        let fetcher = Fetcher::new(fetch_timeout);
        let mut strategies: Vec<Box<dyn DecodeStrategy>> = Vec::new();
        if fast_decode {
            strategies.push(Box::new(BitmapDecode {
                fetcher: fetcher.clone(),
            }));
        }
        strategies.push(Box::new(ElementDecode { fetcher }));
        Self { strategies }
    }

    pub fn with_strategies(strategies: Vec<Box<dyn DecodeStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn decode(&self, locator: &str) -> Result<DecodedImage, LoadError> {
        let mut last = None;
        for strategy in &self.strategies {
            match strategy.decode(locator) {
                Ok(image) => return Ok(image),
                Err(e) => {
                    log::debug!("{} decode of {} failed: {}", strategy.name(), locator, e);
                    last = Some(e);
                }
            }
        }
        Err(last.unwrap_or_else(|| decode_err(locator, "no decode strategy configured")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_png(name: &str, width: u32, height: u32) -> PathBuf {
        let path = std::env::temp_dir().join(format!("globe-gallery-{}-{}.png", name, std::process::id()));
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        img.save(&path).unwrap();
        path
    }

    struct Failing;

    impl DecodeStrategy for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn decode(&self, locator: &str) -> Result<DecodedImage, LoadError> {
            Err(decode_err(locator, "always fails"))
        }
    }

    #[test]
    fn test_bitmap_decode_png() {
        let path = write_png("bitmap", 4, 2);
        let image = BitmapDecode::default().decode(path.to_str().unwrap()).unwrap();

        assert_eq!((image.width, image.height), (4, 2));
        assert_eq!(image.rgba.len(), 4 * 2 * 4);
        assert_eq!(&image.rgba[..4], &[10, 20, 30, 255]);
        assert!((image.aspect() - 2.0).abs() < 1e-6);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_element_decode_file_url() {
        let path = write_png("element", 3, 6);
        let locator = format!("file://{}", path.display());
        let image = ElementDecode::default().decode(&locator).unwrap();

        assert_eq!((image.width, image.height), (3, 6));
        assert!((image.aspect() - 0.5).abs() < 1e-6);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_missing_file_is_fetch_error() {
        let result = BitmapDecode::default().decode("/definitely/not/here.png");
        assert!(matches!(result, Err(LoadError::Fetch { .. })));
    }

    #[test]
    fn test_stalled_http_fetch_gives_up() {
        // Accepts the connection but never answers.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/stalled.png", listener.local_addr().unwrap());

        let started = std::time::Instant::now();
        let result = Fetcher::new(Duration::from_millis(200)).fetch(&url);

        assert!(matches!(result, Err(LoadError::Fetch { .. })));
        assert!(started.elapsed() < Duration::from_secs(5));
        drop(listener);
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let path = std::env::temp_dir().join(format!("globe-gallery-garbage-{}.png", std::process::id()));
        std::fs::write(&path, b"not an image at all").unwrap();

        let result = DecodeChain::new(true, Duration::from_secs(5)).decode(path.to_str().unwrap());
        assert!(matches!(result, Err(LoadError::Decode { .. })));
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_chain_falls_back() {
        let path = write_png("chain", 2, 2);
        let chain = DecodeChain::with_strategies(vec![Box::new(Failing), Box::new(ElementDecode::default())]);

        let image = chain.decode(path.to_str().unwrap()).unwrap();
        assert_eq!(image.width, 2);
        std::fs::remove_file(path).unwrap();
    }
}
