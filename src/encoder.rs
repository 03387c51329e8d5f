//! 送信用の画像エンコード
//!
//! 画像を最高品質のJPEGにエンコードし、送信用のBase64文字列も保持する。
//! リサイズ等の前処理は行わない。

use crate::error::{PlantIdError, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::path::Path;

/// JPEG品質 (0-100)
pub const JPEG_QUALITY: u8 = 100;

/// エンコード済み画像（空になることはない）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    bytes: Vec<u8>,
    base64: String,
}

impl EncodedImage {
    /// エンコード済みJPEGから作成
    pub fn from_jpeg_bytes(bytes: Vec<u8>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(PlantIdError::Encoding("エンコード結果が空です".into()));
        }
        let base64 = STANDARD.encode(&bytes);
        Ok(Self { bytes, base64 })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn base64(&self) -> &str {
        &self.base64
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// 画像をJPEGにエンコード
pub fn encode(image: &DynamicImage) -> Result<EncodedImage> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(PlantIdError::Encoding(format!(
            "画像サイズが不正です: {}x{}",
            width, height
        )));
    }

    // JPEGはアルファを持てないためRGB8に変換
    let rgb = image.to_rgb8();
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY)
        .encode(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| PlantIdError::Encoding(e.to_string()))?;

    EncodedImage::from_jpeg_bytes(buf)
}

/// 画像ファイルを読み込む
pub fn open(path: &Path) -> Result<DynamicImage> {
    if !path.exists() {
        return Err(PlantIdError::FileNotFound(path.display().to_string()));
    }

    image::open(path).map_err(|e| PlantIdError::ImageLoad(format!("{}: {}", path.display(), e)))
}
