/// 경매 코어 엔진
/// 1. 낙찰 스윕: 기한이 지난 리스팅을 골라 승자를 확정하고 리스팅을 닫는다.
/// 2. 입찰 접수는 bidding::commands에서 같은 엔진 위에 구현된다.
/// 리스팅 단위 직렬화는 리스팅 id를 키로 하는 비동기 뮤텍스로 보장한다.
// region:    --- Imports
use crate::marketplace::error::MarketError;
use crate::marketplace::model::{Bid, BidFilter};
use crate::store::MarketStore;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Auction Engine

/// 경매 코어 설정 (호출자/환경에서 주입)
#[derive(Debug, Clone)]
pub struct AuctionConfig {
    pub minimum_bid_amount: i64,
    pub currencies: Vec<String>,
}

/// 경매 엔진
pub struct AuctionEngine<S: MarketStore> {
    pub(crate) store: Arc<S>,
    pub(crate) config: AuctionConfig,
    listing_locks: StdMutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl<S: MarketStore> AuctionEngine<S> {
    pub fn new(store: Arc<S>, config: AuctionConfig) -> Self {
        Self {
            store,
            config,
            listing_locks: StdMutex::new(HashMap::new()),
        }
    }

    /// 리스팅 단위 락 가져오기
    pub(crate) fn listing_lock(&self, listing_id: i64) -> Arc<Mutex<()>> {
        let mut locks = self
            .listing_locks
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        Arc::clone(locks.entry(listing_id).or_default())
    }

    /// 기한이 지난 경매 일괄 종료, 처리된 리스팅 id 목록 반환
    pub async fn resolve_expired_auctions(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<i64>, MarketError> {
        let expired = self.store.get_expired_listings(now).await?;
        let mut resolved = Vec::new();

        for listing in expired {
            match self.resolve_listing(listing.id, now).await {
                Ok(true) => {
                    info!(
                        "{:<12} --> 리스팅 {} 경매 종료 처리 완료",
                        "Resolver", listing.id
                    );
                    resolved.push(listing.id);
                }
                Ok(false) => {}
                // 한 리스팅의 실패는 스윕 전체를 막지 않는다, 다음 스윕에서 재시도
                Err(e) => warn!(
                    "{:<12} --> 리스팅 {} 경매 종료 처리 실패: {}",
                    "Resolver", listing.id, e
                ),
            }
        }

        Ok(resolved)
    }

    /// 단일 리스팅 낙찰 처리
    /// 처리했으면 true, 선택 조건을 더 이상 만족하지 않으면(no-op) false
    async fn resolve_listing(
        &self,
        listing_id: i64,
        now: DateTime<Utc>,
    ) -> Result<bool, MarketError> {
        let lock = self.listing_lock(listing_id);
        let _guard = lock.lock().await;

        // 락 획득 후 재조회: 경쟁 스윕이 먼저 처리했으면 no-op
        let Some(mut listing) = self.store.get_listing(listing_id).await? else {
            return Ok(false);
        };
        if !listing.available || !listing.biddable {
            return Ok(false);
        }
        match listing.end_time {
            Some(end_time) if end_time <= now => {}
            _ => return Ok(false),
        }

        // 이미 낙찰된 행은 제외하고 조회(has_won = false), 재처리 방지
        let mut bids = self
            .store
            .get_bids_for_listing(listing_id, BidFilter::Open)
            .await?;

        if let Some(winner_id) = best_bid(&bids).map(|b| b.id) {
            for bid in bids.iter_mut() {
                if bid.id == winner_id {
                    bid.is_winning = true;
                    bid.has_won = true;
                    bid.won_at = Some(now);
                } else {
                    bid.is_winning = false;
                    bid.has_won = false;
                }
            }
        }

        // 낙찰 표시와 리스팅 종료는 하나의 원자적 커밋
        listing.available = false;
        listing.biddable = false;
        self.store.commit_resolution(&listing, &bids).await?;

        Ok(true)
    }
}

/// 최고 입찰 선택: 금액 최대, 동률이면 더 이른 created_at
pub(crate) fn best_bid(bids: &[Bid]) -> Option<&Bid> {
    bids.iter().reduce(|best, bid| {
        if bid.amount > best.amount
            || (bid.amount == best.amount && bid.created_at < best.created_at)
        {
            bid
        } else {
            best
        }
    })
}

// endregion: --- Auction Engine
