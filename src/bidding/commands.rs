/// 입찰 접수 처리
/// 검증 실패 시 어떤 쓰기도 일어나지 않으며, 선두 재계산은
/// 방금 쓴 입찰만이 아니라 리스팅 전체 스냅샷을 기준으로 한다.
// region:    --- Imports
use crate::auction::engine::{best_bid, AuctionEngine};
use crate::marketplace::error::MarketError;
use crate::marketplace::model::{Bid, BidFilter, BidResult};
use crate::store::MarketStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

// endregion: --- Imports

// region:    --- Commands

/// 입찰 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceBidCommand {
    pub listing_id: i64,
    pub bidder_id: i64,
    pub amount: i64,
    pub currency: String,
}

impl<S: MarketStore> AuctionEngine<S> {
    /// 입찰 처리
    pub async fn place_bid(
        &self,
        cmd: PlaceBidCommand,
        now: DateTime<Utc>,
    ) -> Result<BidResult, MarketError> {
        info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Command", cmd);

        // 저장소 접근 전 검증: 실패 시 부분 쓰기 없음
        // 금액 양수 조건은 설정된 최소 금액과 무관하게 강제한다
        if cmd.amount <= 0 || cmd.amount < self.config.minimum_bid_amount {
            return Err(MarketError::BidTooLow {
                minimum: self.config.minimum_bid_amount.max(1),
            });
        }
        if !self.config.currencies.iter().any(|c| c == &cmd.currency) {
            return Err(MarketError::UnsupportedCurrency(cmd.currency));
        }

        // 리스팅 단위 직렬화: 검증-저장-선두 재계산이 하나의 구간
        let lock = self.listing_lock(cmd.listing_id);
        let _guard = lock.lock().await;

        let listing = self
            .store
            .get_listing(cmd.listing_id)
            .await?
            .ok_or(MarketError::ListingNotFound)?;
        if !listing.available || !listing.biddable {
            return Err(MarketError::AuctionClosed);
        }
        if let Some(end_time) = listing.end_time {
            if now >= end_time {
                return Err(MarketError::AuctionClosed);
            }
        }

        // 같은 입찰자의 재입찰은 기존 행 갱신, 아니면 새 행 삽입
        let bid = Bid {
            id: 0,
            listing_id: cmd.listing_id,
            bidder_id: cmd.bidder_id,
            amount: cmd.amount,
            currency: cmd.currency,
            is_winning: false,
            has_won: false,
            created_at: now,
            won_at: None,
        };

        // 선두 재계산: 락 구간에서 읽은 전체 스냅샷에 이번 입찰을 반영한 집합 기준, 멱등
        // (재입찰이면 해당 입찰자의 기존 행이 이번 입찰로 대체된다)
        let existing = self
            .store
            .get_bids_for_listing(cmd.listing_id, BidFilter::All)
            .await?;
        let mut candidates: Vec<Bid> = existing
            .into_iter()
            .filter(|b| b.bidder_id != cmd.bidder_id)
            .collect();
        candidates.push(bid.clone());
        let leader_bidder_id = best_bid(&candidates)
            .map(|b| b.bidder_id)
            .unwrap_or(cmd.bidder_id);

        // 입찰 저장과 선두 플래그 반영은 하나의 원자적 커밋, 실패 시 부분 쓰기 없음
        let saved = self.store.commit_bid(&bid, leader_bidder_id).await?;

        info!(
            "{:<12} --> 입찰 저장 완료: 리스팅 {}, 입찰 {}, 선두 {}",
            "Command",
            cmd.listing_id,
            saved.id,
            saved.bidder_id == leader_bidder_id
        );

        Ok(BidResult {
            bid_id: saved.id,
            listing_id: cmd.listing_id,
            amount: saved.amount,
            is_winning: saved.bidder_id == leader_bidder_id,
        })
    }
}

// endregion: --- Commands
