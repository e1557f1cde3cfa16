// region:    --- Imports
use crate::auction::engine::AuctionEngine;
use crate::config::Config;
use crate::database::DatabaseManager;
use crate::scheduler::SweepScheduler;
use crate::store::PostgresMarketStore;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
// endregion: --- Imports

// region:    --- Modules
mod auction;
mod bidding;
mod config;
mod database;
mod handlers;
mod marketplace;
mod query;
mod scheduler;
mod store;

// endregion: --- Modules

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    // 설정 읽기
    let config = Config::from_env();

    // DatabaseManager 생성
    let db_manager = Arc::new(DatabaseManager::new(&config.database_url).await?);

    // 데이터베이스 초기화
    if let Err(e) = db_manager.initialize_database().await {
        error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> 데이터베이스 초기화 성공", "Main");

    // 저장소와 경매 엔진 생성 (프로세스당 한 번 생성해 명시적으로 주입)
    let store = Arc::new(PostgresMarketStore::new(Arc::clone(&db_manager)));
    let engine = Arc::new(AuctionEngine::new(store, config.auction()));

    // 주기적 스윕 시작 (조회 전 지연 스윕과 경합해도 안전)
    let scheduler = SweepScheduler::new(Arc::clone(&engine), config.sweep_interval_secs);
    scheduler.start().await;

    // 테스트 페이지를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // 라우터 설정
    let routes_all = Router::new()
        .route("/bid", post(handlers::handle_place_bid))
        .route("/sweep", post(handlers::handle_sweep))
        .route("/contents", get(handlers::handle_get_contents))
        .route("/contents/:id", get(handlers::handle_get_content))
        .route("/contents/:id/bids", get(handlers::handle_get_content_bids))
        .route(
            "/contents/:id/winning-bid",
            get(handlers::handle_get_winning_bid),
        )
        .layer(cors)
        .with_state((db_manager, engine));

    // 리스너 생성
    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
