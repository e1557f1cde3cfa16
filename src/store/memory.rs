/// 인메모리 저장소 구현체
/// 단위 테스트와 로컬 개발 환경에서 Postgres 없이 코어를 구동하기 위한 구현.
/// 정렬과 갱신 규칙은 Postgres 구현과 동일하게 유지한다.
// region:    --- Imports
use crate::marketplace::error::MarketError;
use crate::marketplace::model::{Bid, BidFilter, Listing};
use crate::store::MarketStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

// endregion: --- Imports

// region:    --- Memory Market Store

#[derive(Default)]
struct Inner {
    listings: HashMap<i64, Listing>,
    bids: HashMap<i64, Bid>,
    next_listing_id: i64,
    next_bid_id: i64,
}

/// 인메모리 저장소
#[derive(Default)]
pub struct MemoryMarketStore {
    inner: Mutex<Inner>,
}

impl MemoryMarketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 리스팅 등록 (id가 0이면 새 id 할당)
    pub fn insert_listing(&self, mut listing: Listing) -> Listing {
        let mut inner = self.lock();
        if listing.id == 0 {
            inner.next_listing_id += 1;
            listing.id = inner.next_listing_id;
        }
        inner.listings.insert(listing.id, listing.clone());
        listing
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Postgres 구현과 같은 정렬: 금액 내림차순, created_at 오름차순, id 오름차순
    fn sort_bids(bids: &mut [Bid]) {
        bids.sort_by(|a, b| {
            b.amount
                .cmp(&a.amount)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
    }
}

#[async_trait]
impl MarketStore for MemoryMarketStore {
    async fn get_listing(&self, listing_id: i64) -> Result<Option<Listing>, MarketError> {
        Ok(self.lock().listings.get(&listing_id).cloned())
    }

    async fn save_listing(&self, listing: &Listing) -> Result<(), MarketError> {
        // Postgres 구현과 동일하게 경매 필드만 갱신 (title/creator_id는 불변)
        let mut inner = self.lock();
        if let Some(row) = inner.listings.get_mut(&listing.id) {
            row.available = listing.available;
            row.biddable = listing.biddable;
            row.ask_price = listing.ask_price;
            row.end_time = listing.end_time;
        }
        Ok(())
    }

    async fn get_expired_listings(&self, now: DateTime<Utc>) -> Result<Vec<Listing>, MarketError> {
        let inner = self.lock();
        let mut expired: Vec<Listing> = inner
            .listings
            .values()
            .filter(|l| {
                l.available && l.biddable && l.end_time.map(|end| end <= now).unwrap_or(false)
            })
            .cloned()
            .collect();
        expired.sort_by_key(|l| (l.end_time, l.id));
        Ok(expired)
    }

    async fn get_bids_for_listing(
        &self,
        listing_id: i64,
        filter: BidFilter,
    ) -> Result<Vec<Bid>, MarketError> {
        let inner = self.lock();
        let mut bids: Vec<Bid> = inner
            .bids
            .values()
            .filter(|b| b.listing_id == listing_id)
            .filter(|b| match filter {
                BidFilter::All => true,
                BidFilter::Open => !b.has_won,
            })
            .cloned()
            .collect();
        Self::sort_bids(&mut bids);
        Ok(bids)
    }

    async fn commit_bid(&self, bid: &Bid, leader_bidder_id: i64) -> Result<Bid, MarketError> {
        let mut inner = self.lock();

        // 같은 (listing_id, bidder_id) 행이 있으면 갱신, 아니면 새 행 삽입
        let existing_id = inner
            .bids
            .values()
            .find(|b| b.listing_id == bid.listing_id && b.bidder_id == bid.bidder_id)
            .map(|b| b.id);

        let saved_id = match existing_id {
            Some(id) => {
                let row = inner
                    .bids
                    .get_mut(&id)
                    .ok_or(MarketError::ConcurrentModification)?;
                row.amount = bid.amount;
                row.currency = bid.currency.clone();
                row.created_at = bid.created_at;
                id
            }
            None => {
                inner.next_bid_id += 1;
                let mut saved = bid.clone();
                saved.id = inner.next_bid_id;
                let id = saved.id;
                inner.bids.insert(id, saved);
                id
            }
        };

        // 선두 플래그는 저장과 같은 락 구간에서 다시 쓴다
        for row in inner
            .bids
            .values_mut()
            .filter(|b| b.listing_id == bid.listing_id)
        {
            row.is_winning = row.bidder_id == leader_bidder_id;
        }

        inner
            .bids
            .get(&saved_id)
            .cloned()
            .ok_or(MarketError::ConcurrentModification)
    }

    async fn commit_resolution(&self, listing: &Listing, bids: &[Bid]) -> Result<(), MarketError> {
        let mut inner = self.lock();

        // 조건부 종료: 이미 닫힌 리스팅이면 아무것도 반영하지 않음
        let current = inner
            .listings
            .get_mut(&listing.id)
            .ok_or(MarketError::ListingNotFound)?;
        if !current.biddable {
            return Err(MarketError::ConcurrentModification);
        }
        current.available = listing.available;
        current.biddable = listing.biddable;
        for bid in bids {
            inner.bids.insert(bid.id, bid.clone());
        }
        Ok(())
    }
}

// endregion: --- Memory Market Store
