/// 영속성 인터페이스
/// 코어는 이 트레이트를 통해서만 리스팅/입찰 상태를 읽고 쓴다.
/// 호출 간에 상태를 캐시하지 않으며, 매 연산마다 저장소를 다시 읽는다.
// region:    --- Imports
use crate::database::DatabaseManager;
use crate::marketplace::error::MarketError;
use crate::marketplace::model::{Bid, BidFilter, Listing};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

// endregion: --- Imports

pub mod memory;

// region:    --- Market Store Trait

/// 리스팅/입찰 저장소 트레이트
#[async_trait]
pub trait MarketStore: Send + Sync {
    /// 리스팅 조회
    async fn get_listing(&self, listing_id: i64) -> Result<Option<Listing>, MarketError>;

    /// 리스팅 저장
    async fn save_listing(&self, listing: &Listing) -> Result<(), MarketError>;

    /// 경매 기한이 지난 공개 리스팅 조회 (biddable, available, end_time <= now)
    async fn get_expired_listings(&self, now: DateTime<Utc>) -> Result<Vec<Listing>, MarketError>;

    /// 리스팅의 입찰 조회, 금액 내림차순 / 같은 금액은 created_at 오름차순 정렬
    async fn get_bids_for_listing(
        &self,
        listing_id: i64,
        filter: BidFilter,
    ) -> Result<Vec<Bid>, MarketError>;

    /// 입찰 확정 커밋: 입찰 저장과 선두 플래그 반영을 하나의 원자적 단위로 수행.
    /// 같은 (listing_id, bidder_id) 행이 있으면 금액/통화/시각을 갱신하고,
    /// 리스팅의 모든 행에 leader_bidder_id 기준으로 선두 플래그를 다시 쓴다.
    /// 저장된 행(id 포함)을 반환하며, 실패 시 아무것도 반영되지 않는다.
    async fn commit_bid(&self, bid: &Bid, leader_bidder_id: i64) -> Result<Bid, MarketError>;

    /// 낙찰 확정 커밋: 입찰 상태 반영과 리스팅 종료를 하나의 원자적 단위로 수행.
    /// 리스팅이 이미 종료된 경우 ConcurrentModification을 반환한다.
    async fn commit_resolution(&self, listing: &Listing, bids: &[Bid]) -> Result<(), MarketError>;
}

// endregion: --- Market Store Trait

// region:    --- Queries

const GET_LISTING: &str = "SELECT id, creator_id, title, available, biddable, ask_price, end_time, created_at FROM listings WHERE id = $1";

const UPDATE_LISTING: &str = "UPDATE listings SET available = $2, biddable = $3, ask_price = $4, end_time = $5 WHERE id = $1";

const GET_EXPIRED_LISTINGS: &str = r#"
    SELECT id, creator_id, title, available, biddable, ask_price, end_time, created_at
    FROM listings
    WHERE available = TRUE AND biddable = TRUE AND end_time IS NOT NULL AND end_time <= $1
    ORDER BY end_time ASC
"#;

const GET_BIDS: &str = r#"
    SELECT id, listing_id, bidder_id, amount, currency, is_winning, has_won, created_at, won_at
    FROM bids
    WHERE listing_id = $1
    ORDER BY amount DESC, created_at ASC, id ASC
"#;

const GET_OPEN_BIDS: &str = r#"
    SELECT id, listing_id, bidder_id, amount, currency, is_winning, has_won, created_at, won_at
    FROM bids
    WHERE listing_id = $1 AND has_won = FALSE
    ORDER BY amount DESC, created_at ASC, id ASC
"#;

const UPSERT_BID: &str = r#"
    INSERT INTO bids (listing_id, bidder_id, amount, currency, is_winning, has_won, created_at, won_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
    ON CONFLICT (listing_id, bidder_id)
    DO UPDATE SET amount = EXCLUDED.amount, currency = EXCLUDED.currency,
                  created_at = EXCLUDED.created_at, is_winning = FALSE
    RETURNING id, listing_id, bidder_id, amount, currency, is_winning, has_won, created_at, won_at
"#;

const UPDATE_BID_STATE: &str = "UPDATE bids SET amount = $2, currency = $3, is_winning = $4, has_won = $5, created_at = $6, won_at = $7 WHERE id = $1";

const SET_LEADER: &str =
    "UPDATE bids SET is_winning = (bidder_id = $2) WHERE listing_id = $1 AND is_winning <> (bidder_id = $2)";

const CLOSE_LISTING: &str = "UPDATE listings SET available = FALSE, biddable = FALSE WHERE id = $1 AND biddable = TRUE RETURNING id";

// endregion: --- Queries

// region:    --- Postgres Market Store

/// 저장소 구현체 (Postgres)
pub struct PostgresMarketStore {
    db: Arc<DatabaseManager>,
}

impl PostgresMarketStore {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MarketStore for PostgresMarketStore {
    async fn get_listing(&self, listing_id: i64) -> Result<Option<Listing>, MarketError> {
        let listing = sqlx::query_as::<_, Listing>(GET_LISTING)
            .bind(listing_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(listing)
    }

    async fn save_listing(&self, listing: &Listing) -> Result<(), MarketError> {
        sqlx::query(UPDATE_LISTING)
            .bind(listing.id)
            .bind(listing.available)
            .bind(listing.biddable)
            .bind(listing.ask_price)
            .bind(listing.end_time)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    async fn get_expired_listings(&self, now: DateTime<Utc>) -> Result<Vec<Listing>, MarketError> {
        let listings = sqlx::query_as::<_, Listing>(GET_EXPIRED_LISTINGS)
            .bind(now)
            .fetch_all(self.db.pool())
            .await?;
        Ok(listings)
    }

    async fn get_bids_for_listing(
        &self,
        listing_id: i64,
        filter: BidFilter,
    ) -> Result<Vec<Bid>, MarketError> {
        let query = match filter {
            BidFilter::All => GET_BIDS,
            BidFilter::Open => GET_OPEN_BIDS,
        };
        let bids = sqlx::query_as::<_, Bid>(query)
            .bind(listing_id)
            .fetch_all(self.db.pool())
            .await?;
        Ok(bids)
    }

    async fn commit_bid(&self, bid: &Bid, leader_bidder_id: i64) -> Result<Bid, MarketError> {
        let bid = bid.clone();
        self.db
            .transaction(move |tx| {
                Box::pin(async move {
                    let saved = sqlx::query_as::<_, Bid>(UPSERT_BID)
                        .bind(bid.listing_id)
                        .bind(bid.bidder_id)
                        .bind(bid.amount)
                        .bind(&bid.currency)
                        .bind(bid.is_winning)
                        .bind(bid.has_won)
                        .bind(bid.created_at)
                        .bind(bid.won_at)
                        .fetch_one(&mut **tx)
                        .await?;

                    sqlx::query(SET_LEADER)
                        .bind(bid.listing_id)
                        .bind(leader_bidder_id)
                        .execute(&mut **tx)
                        .await?;

                    Ok::<_, MarketError>(saved)
                })
            })
            .await
    }

    async fn commit_resolution(&self, listing: &Listing, bids: &[Bid]) -> Result<(), MarketError> {
        let listing = listing.clone();
        let bids = bids.to_vec();
        self.db
            .transaction(move |tx| {
                Box::pin(async move {
                    // 조건부 종료: 이미 닫힌 리스팅이면 전체 롤백
                    let closed = sqlx::query(CLOSE_LISTING)
                        .bind(listing.id)
                        .fetch_optional(&mut **tx)
                        .await?;
                    if closed.is_none() {
                        return Err(MarketError::ConcurrentModification);
                    }

                    for bid in &bids {
                        sqlx::query(UPDATE_BID_STATE)
                            .bind(bid.id)
                            .bind(bid.amount)
                            .bind(&bid.currency)
                            .bind(bid.is_winning)
                            .bind(bid.has_won)
                            .bind(bid.created_at)
                            .bind(bid.won_at)
                            .execute(&mut **tx)
                            .await?;
                    }
                    Ok(())
                })
            })
            .await
    }
}

// endregion: --- Postgres Market Store
