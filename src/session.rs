//! 表示層向けの同定セッション
//!
//! 同時に進行するリクエストは1つだけ。新しいリクエストは進行中のものを
//! 取り消して置き換える。完了時には世代番号を状態更新の中で照合し、
//! 古い世代の結果は状態に書き込まずに破棄する。

use crate::error::PlantIdError;
use crate::pipeline::Identifier;
use image::DynamicImage;
use plant_id_common::PlantResult;
use std::sync::{Arc, Mutex};
use tokio::sync::{oneshot, watch};
use tokio::task::{AbortHandle, JoinError};
use tracing::{debug, warn};

/// 表示層が購読する状態
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// 最新リクエストの世代番号
    pub generation: u64,
    pub in_progress: bool,
    /// 最後に成功した結果
    pub result: Option<Arc<PlantResult>>,
    pub last_error: Option<String>,
}

/// 1リクエストの結末
#[derive(Debug)]
pub enum Outcome {
    Applied(Arc<PlantResult>),
    /// 同定処理のパニックもここに含む
    Failed(PlantIdError),
    /// 取り消し、または新しいリクエストに置き換えられた
    Discarded,
}

/// submit の戻り値
#[derive(Debug)]
pub struct Ticket {
    pub generation: u64,
    outcome: oneshot::Receiver<Outcome>,
}

impl Ticket {
    pub async fn wait(self) -> Outcome {
        self.outcome.await.unwrap_or(Outcome::Discarded)
    }
}

pub struct Session {
    identifier: Arc<dyn Identifier>,
    state: Arc<watch::Sender<SessionState>>,
    task: Mutex<Option<AbortHandle>>,
}

impl Session {
    pub fn new(identifier: Arc<dyn Identifier>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            identifier,
            state: Arc::new(state),
            task: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// 画像の同定を開始（進行中のリクエストは取り消す）
    ///
    /// Tokio ランタイム内から呼ぶこと。
    pub fn submit(&self, image: DynamicImage) -> Ticket {
        let mut generation = 0;
        self.state.send_modify(|s| {
            s.generation += 1;
            s.in_progress = true;
            generation = s.generation;
        });

        let (tx, rx) = oneshot::channel();
        let identifier = Arc::clone(&self.identifier);
        let state = Arc::clone(&self.state);

        // 取り消し対象は同定処理のみ。見張り側は必ず結末を送る
        let work = tokio::spawn(async move { identifier.identify(image).await });
        let abort = work.abort_handle();

        tokio::spawn(async move {
            let outcome = match work.await {
                Ok(result) => complete(&state, generation, result),
                Err(e) if e.is_panic() => {
                    let message = panic_message(e);
                    warn!(generation, %message, "同定処理がパニック");
                    complete(&state, generation, Err(PlantIdError::Aborted(message)))
                }
                Err(_) => Outcome::Discarded,
            };
            let _ = tx.send(outcome);
        });

        self.replace_task(Some(abort));

        Ticket {
            generation,
            outcome: rx,
        }
    }

    /// 進行中のリクエストを取り消す（結果は変更しない）
    pub fn cancel(&self) {
        self.state.send_modify(|s| {
            s.generation += 1;
            s.in_progress = false;
        });
        self.replace_task(None);
    }

    fn replace_task(&self, next: Option<AbortHandle>) {
        let mut slot = self.task.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = slot.take() {
            previous.abort();
        }
        *slot = next;
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.replace_task(None);
    }
}

fn panic_message(e: JoinError) -> String {
    let payload = e.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "不明なパニック".to_string()
    }
}

/// 世代が一致する場合のみ状態へ反映
fn complete(
    state: &watch::Sender<SessionState>,
    generation: u64,
    result: crate::error::Result<PlantResult>,
) -> Outcome {
    let result = result.map(Arc::new);
    let mut applied = false;

    state.send_if_modified(|s| {
        if s.generation != generation {
            debug!(generation, current = s.generation, "古いリクエストの結果を破棄");
            return false;
        }

        s.in_progress = false;
        match &result {
            Ok(plant) => {
                s.result = Some(Arc::clone(plant));
                s.last_error = None;
            }
            Err(e) => s.last_error = Some(e.to_string()),
        }
        applied = true;
        true
    });

    match result {
        _ if !applied => Outcome::Discarded,
        Ok(plant) => Outcome::Applied(plant),
        Err(e) => Outcome::Failed(e),
    }
}
