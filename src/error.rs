use thiserror::Error;

/// 通信失敗の原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestCause {
    #[error("タイムアウト")]
    Timeout,

    #[error("通信エラー: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for RequestCause {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RequestCause::Timeout
        } else {
            RequestCause::Transport(e.to_string())
        }
    }
}

/// 同定APIの呼び出しエラー
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("不正なURL: {0}")]
    InvalidUrl(String),

    #[error("リクエスト失敗: {0}")]
    RequestFailed(RequestCause),

    #[error("不正なレスポンス: {0}")]
    InvalidResponse(String),

    #[error("HTTPエラー {status}: {reason}")]
    HttpResponse {
        status: u16,
        reason: String,
        /// 診断用のレスポンス本文（結果としては解析しない）
        body: String,
    },
}

/// 補完ルックアップのエラー
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("不正なURL: {0}")]
    InvalidUrl(String),

    #[error("リクエスト失敗: {0}")]
    RequestFailed(RequestCause),

    #[error("不正なレスポンス: {0}")]
    InvalidResponse(String),

    #[error("該当ページがありません: {0}")]
    NotFound(String),
}

#[derive(Error, Debug)]
pub enum PlantIdError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`plant-id config --set-api-key YOUR_KEY` または環境変数 PLANT_ID_API_KEY で設定してください")]
    MissingApiKey,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("画像エンコードエラー: {0}")]
    Encoding(String),

    #[error("同定API: {0}")]
    Request(#[from] RequestError),

    #[error("補完ルックアップ: {0}")]
    Lookup(#[from] LookupError),

    #[error("同定処理が異常終了しました: {0}")]
    Aborted(String),

    #[error("植物を同定できませんでした")]
    NoIdentification,

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] plant_id_common::Error),
}

pub type Result<T> = std::result::Result<T, PlantIdError>;
