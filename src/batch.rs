//! フォルダ一括同定
//!
//! 画像を1枚ずつ順番に同定する（同時リクエストは行わない）。
//! 1枚の失敗はレコードにエラーとして残し、残りの処理は続ける。

use crate::encoder;
use crate::pipeline::Pipeline;
use crate::scanner::ImageInfo;
use indicatif::{ProgressBar, ProgressStyle};
use plant_id_common::PlantResult;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRecord {
    pub file_name: String,

    #[serde(default)]
    pub file_path: String,

    /// 撮影日時（EXIF DateTimeOriginal）
    #[serde(default)]
    pub date: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    /// RFC 3339
    #[serde(default)]
    pub identified_at: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<PlantResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchRecord {
    fn for_image(img: &ImageInfo) -> Self {
        Self {
            file_name: img.file_name.clone(),
            file_path: img.path.display().to_string(),
            date: img.exif.date.clone().unwrap_or_default(),
            latitude: img.exif.latitude,
            longitude: img.exif.longitude,
            ..Default::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_some()
    }
}

pub async fn identify_images(
    pipeline: &Pipeline,
    images: &[ImageInfo],
    verbose: bool,
) -> Vec<BatchRecord> {
    let progress = ProgressBar::new(images.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("  {bar:30} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut records = Vec::with_capacity(images.len());

    for img in images {
        progress.set_message(img.file_name.clone());

        let mut record = BatchRecord::for_image(img);
        let options = pipeline
            .options()
            .with_location(img.exif.latitude, img.exif.longitude);

        let outcome = match encoder::open(&img.path) {
            Ok(image) => pipeline.identify_with_options(image, &options).await,
            Err(e) => Err(e),
        };
        record.identified_at = chrono::Utc::now().to_rfc3339();

        match outcome {
            Ok(result) => {
                if verbose {
                    progress.println(format!("  ✔ {}: {}", img.file_name, result.plant_name));
                }
                record.result = Some(result);
            }
            Err(e) => {
                warn!(file = %img.file_name, error = %e, "同定失敗");
                progress.println(format!("  ✘ {}: {}", img.file_name, e));
                record.error = Some(e.to_string());
            }
        }

        records.push(record);
        progress.inc(1);
    }

    progress.finish_and_clear();
    records
}
