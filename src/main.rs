use clap::Parser;
use indicatif::ProgressBar;
use plant_id_common::PlantResult;
use plant_id_rust::{batch, cli, config, encoder, error, logging, scanner};
use plant_id_rust::{EnrichmentLookup, Outcome, Pipeline, Session, SessionState};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Identify { image, json, no_enrich, latitude, longitude, shape, health } => {
            if !json {
                println!("🌿 plant-id - 植物同定\n");
            }

            let config = Config {
                enrichment: config.enrichment && !no_enrich,
                request_shape: shape.map(|s| s.0).unwrap_or(config.request_shape),
                health: health.map(|h| h.0).unwrap_or(config.health),
                ..config
            };

            // 座標の指定が無ければEXIFのGPS情報を使う
            let (latitude, longitude) = match (latitude, longitude) {
                (Some(lat), Some(lon)) => (Some(lat), Some(lon)),
                _ => scanner::read_exif(&image)
                    .map(|info| (info.latitude, info.longitude))
                    .unwrap_or((None, None)),
            };

            let pipeline = Pipeline::from_config(&config)?;
            let options = pipeline.options().with_location(latitude, longitude);
            let pipeline = pipeline.with_options(options);

            let picture = encoder::open(&image)?;

            let session = Session::new(Arc::new(pipeline));
            let spinner = spawn_spinner(session.subscribe(), !json);
            let ticket = session.submit(picture);

            let outcome = tokio::select! {
                outcome = ticket.wait() => outcome,
                _ = tokio::signal::ctrl_c() => {
                    session.cancel();
                    Outcome::Discarded
                }
            };
            let _ = spinner.await;

            match outcome {
                Outcome::Applied(result) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(result.as_ref())?);
                    } else {
                        print_result(&result);
                        println!("\n✅ 同定完了");
                    }
                }
                Outcome::Failed(e) => return Err(e),
                Outcome::Discarded => println!("取り消しました"),
            }
        }

        Commands::Batch { folder, output, no_enrich } => {
            println!("🌿 plant-id - 一括同定\n");

            // 1. 画像スキャン
            println!("[1/3] 写真をスキャン中...");
            let images = scanner::scan_folder(&folder)?;
            println!("✔ {}枚の写真を検出\n", images.len());

            if images.is_empty() {
                return Err(error::PlantIdError::NoImagesFound(
                    folder.display().to_string()
                ));
            }

            // 2. 同定
            println!("[2/3] 同定中...");
            let config = Config {
                enrichment: config.enrichment && !no_enrich,
                ..config
            };
            let pipeline = Pipeline::from_config(&config)?;
            let records = batch::identify_images(&pipeline, &images, cli.verbose).await;
            let succeeded = records.iter().filter(|r| r.is_success()).count();
            println!("✔ 同定完了 ({}/{}件)\n", succeeded, records.len());

            // 3. 結果保存
            println!("[3/3] 結果を保存中...");
            let output = output.unwrap_or_else(|| folder.join("plants.json"));
            let json = serde_json::to_string_pretty(&records)?;
            std::fs::write(&output, json)?;
            println!("✔ 結果を保存: {}", output.display());

            println!("\n✅ 完了");
        }

        Commands::Lookup { name } => {
            let lookup = EnrichmentLookup::new(&config)?;
            let record = lookup.lookup(&name).await?;
            println!("📖 {}\n", record.common_name);
            println!("{}", record.description);
        }

        Commands::Config { set_api_key, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定:");
                println!("  同定API: {}", config.identification_url);
                println!("  補完API: {}", config.enrichment_url);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  リクエスト形式: {:?}", config.request_shape);
                println!("  類似画像: {}", config.similar_images);
                println!("  説明の補完: {}", if config.enrichment { "有効" } else { "無効" });
                println!("  APIキー: {}", if config.get_api_key().is_ok() { "設定済み" } else { "未設定" });
                println!("  設定ファイル: {}", Config::config_path()?.display());
            }
        }
    }

    Ok(())
}

/// 進行中フラグが立っている間スピナーを表示
fn spawn_spinner(
    mut state: watch::Receiver<SessionState>,
    visible: bool,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let spinner = if visible { ProgressBar::new_spinner() } else { ProgressBar::hidden() };
        spinner.set_message("同定中...");
        spinner.enable_steady_tick(Duration::from_millis(100));

        // submit 済みかつ進行中でなくなるまで
        let _ = state.wait_for(|s| s.generation > 0 && !s.in_progress).await;

        spinner.finish_and_clear();
    })
}

fn print_result(result: &PlantResult) {
    println!("🌱 {}", result.plant_name);
    if !result.common_name.is_empty() {
        println!("   一般名: {}", result.common_name);
    }
    if !result.confidence_label.is_empty() {
        println!("   {}", result.confidence_label);
    }
    if !result.description.is_empty() {
        println!("\n{}", result.description);
    }
}
