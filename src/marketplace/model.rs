use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 리스팅 모델 (판매 등록된 콘텐츠)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Listing {
    pub id: i64,
    pub creator_id: i64,
    pub title: String,
    pub available: bool,
    pub biddable: bool,
    // 선택적 희망가, 입찰/낙찰 판정에는 관여하지 않음
    pub ask_price: Option<i64>,
    // None이면 경매 기한 없음
    pub end_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// 입찰 모델
// (listing_id, bidder_id) 쌍당 행은 최대 하나, 재입찰은 기존 행을 갱신한다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub id: i64,
    pub listing_id: i64,
    pub bidder_id: i64,
    pub amount: i64,
    pub currency: String,
    // 현재 선두 여부, 경매 종료 전까지 재계산됨
    pub is_winning: bool,
    // 최종 낙찰 여부, 한번 true가 되면 불변
    pub has_won: bool,
    pub created_at: DateTime<Utc>,
    pub won_at: Option<DateTime<Utc>>,
}

/// 입찰 조회 필터
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidFilter {
    /// 리스팅의 모든 입찰
    All,
    /// 아직 낙찰되지 않은 입찰(has_won = false)
    Open,
}

/// 입찰 처리 결과
#[derive(Debug, Clone, Serialize)]
pub struct BidResult {
    pub bid_id: i64,
    pub listing_id: i64,
    pub amount: i64,
    pub is_winning: bool,
}
