use clap::{Parser, Subcommand};
use plant_id_common::{HealthMode, RequestShape};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "plant-id")]
#[command(about = "植物写真から種名・一般名・説明を同定するツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 1枚の写真を同定
    Identify {
        /// 画像ファイルのパス
        #[arg(required = true)]
        image: PathBuf,

        /// 結果をJSONで出力
        #[arg(long)]
        json: bool,

        /// Wikipediaによる説明の補完を行わない
        #[arg(long)]
        no_enrich: bool,

        /// 撮影地点の緯度（省略時はEXIFから取得）
        #[arg(long, requires = "longitude", allow_hyphen_values = true)]
        latitude: Option<f64>,

        /// 撮影地点の経度
        #[arg(long, requires = "latitude", allow_hyphen_values = true)]
        longitude: Option<f64>,

        /// リクエスト形式 (coordinates/health)
        #[arg(long)]
        shape: Option<ShapeArg>,

        /// 健康診断フラグ (auto/only_health)
        #[arg(long)]
        health: Option<HealthArg>,
    },

    /// フォルダ内の写真をまとめて同定してJSONを出力
    Batch {
        /// 写真フォルダのパス
        #[arg(required = true)]
        folder: PathBuf,

        /// 出力JSONファイル（デフォルト: 入力フォルダ/plants.json）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Wikipediaによる説明の補完を行わない
        #[arg(long)]
        no_enrich: bool,
    },

    /// 学名からWikipediaの説明のみを取得
    Lookup {
        /// 学名（例: "Ficus benjamina"）
        #[arg(required = true)]
        name: String,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Copy, Debug)]
pub struct ShapeArg(pub RequestShape);

impl std::str::FromStr for ShapeArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "coordinates" | "coords" => Ok(ShapeArg(RequestShape::Coordinates)),
            "health" => Ok(ShapeArg(RequestShape::Health)),
            _ => Err(format!("Unknown shape: {}. Use coordinates or health", s)),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct HealthArg(pub HealthMode);

impl std::str::FromStr for HealthArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "auto" => Ok(HealthArg(HealthMode::Auto)),
            "only_health" => Ok(HealthArg(HealthMode::OnlyHealth)),
            _ => Err(format!("Unknown health mode: {}. Use auto or only_health", s)),
        }
    }
}
