// region:    --- Imports
use crate::auction::engine::AuctionEngine;
use crate::bidding::commands::PlaceBidCommand;
use crate::database::DatabaseManager;
use crate::marketplace::error::MarketError;
use crate::query;
use crate::store::PostgresMarketStore;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

// endregion: --- Imports

type AppState = (Arc<DatabaseManager>, Arc<AuctionEngine<PostgresMarketStore>>);

// region:    --- Command Handlers

/// 입찰 요청 처리
pub async fn handle_place_bid(
    State((_db_manager, engine)): State<AppState>,
    Json(cmd): Json<PlaceBidCommand>,
) -> impl IntoResponse {
    match engine.place_bid(cmd, Utc::now()).await {
        Ok(result) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "입찰이 성공적으로 처리되었습니다.",
                "bid_id": result.bid_id,
                "bid_amount": result.amount,
                "is_winning": result.is_winning
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// 수동 스윕 요청 처리
pub async fn handle_sweep(State((_db_manager, engine)): State<AppState>) -> impl IntoResponse {
    info!("{:<12} --> 수동 스윕 요청", "Command");
    match engine.resolve_expired_auctions(Utc::now()).await {
        Ok(resolved) => (
            StatusCode::OK,
            Json(serde_json::json!({ "resolved": resolved })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

// endregion: --- Command Handlers

// region:    --- Query Handlers

/// 공개 리스팅 조회
/// 조회 전에 지연 스윕을 먼저 실행해 기한이 지난 경매를 정리한다.
pub async fn handle_get_contents(
    State((db_manager, engine)): State<AppState>,
) -> impl IntoResponse {
    info!("{:<12} --> 공개 리스팅 조회", "HandlerQuery");

    // 스윕 실패는 조회를 막지 않는다, 해당 리스팅은 다음 스윕에서 정리됨
    if let Err(e) = engine.resolve_expired_auctions(Utc::now()).await {
        warn!("{:<12} --> 조회 전 스윕 실패: {}", "HandlerQuery", e);
    }

    match query::handlers::get_active_listings(&db_manager).await {
        Ok(listings) => Json(listings).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// 리스팅 조회
pub async fn handle_get_content(
    State((db_manager, _engine)): State<AppState>,
    Path(listing_id): Path<i64>,
) -> impl IntoResponse {
    info!("{:<12} --> 리스팅 조회 id: {}", "HandlerQuery", listing_id);
    match query::handlers::get_listing(&db_manager, listing_id).await {
        Ok(Some(listing)) => Json(listing).into_response(),
        Ok(None) => error_response(MarketError::ListingNotFound),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// 리스팅 입찰 이력 조회
pub async fn handle_get_content_bids(
    State((db_manager, _engine)): State<AppState>,
    Path(listing_id): Path<i64>,
) -> impl IntoResponse {
    info!(
        "{:<12} --> 리스팅 입찰 이력 조회 id: {}",
        "HandlerQuery", listing_id
    );
    match query::handlers::get_listing_bids(&db_manager, listing_id).await {
        Ok(bids) => Json(bids).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// 낙찰 입찰 조회
pub async fn handle_get_winning_bid(
    State((db_manager, _engine)): State<AppState>,
    Path(listing_id): Path<i64>,
) -> impl IntoResponse {
    info!("{:<12} --> 낙찰 입찰 조회 id: {}", "HandlerQuery", listing_id);
    match query::handlers::get_winning_bid(&db_manager, listing_id).await {
        Ok(bid) => Json(bid).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

// endregion: --- Query Handlers

// region:    --- Error Mapping

/// 코어 오류를 HTTP 응답으로 변환
fn error_response(e: MarketError) -> Response {
    let status = match &e {
        MarketError::ListingNotFound => StatusCode::NOT_FOUND,
        MarketError::AuctionClosed
        | MarketError::BidTooLow { .. }
        | MarketError::UnsupportedCurrency(_) => StatusCode::BAD_REQUEST,
        MarketError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        MarketError::ConcurrentModification => StatusCode::CONFLICT,
    };
    (
        status,
        Json(serde_json::json!({
            "error": e.to_string(),
            "code": e.code()
        })),
    )
        .into_response()
}

// endregion: --- Error Mapping
