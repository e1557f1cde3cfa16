/// 스윕 스케줄러
/// 주기적으로 낙찰 스윕을 트리거하는 순수 트리거 역할.
/// 공개 리스팅 조회 전의 지연 스윕(handlers)과 동시에 돌아도 안전하다.
/// 안전성은 Winner Resolver의 멱등성에 위임한다.
// region:    --- Imports
use crate::auction::engine::AuctionEngine;
use crate::store::MarketStore;
use chrono::Utc;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{debug, error};

// endregion: --- Imports

// region:    --- Sweep Scheduler

/// 스윕 스케줄러
pub struct SweepScheduler<S: MarketStore + 'static> {
    engine: Arc<AuctionEngine<S>>,
    interval_secs: u64,
}

impl<S: MarketStore + 'static> SweepScheduler<S> {
    pub fn new(engine: Arc<AuctionEngine<S>>, interval_secs: u64) -> Self {
        Self {
            engine,
            interval_secs,
        }
    }

    /// 스윕 스케줄러 시작
    pub async fn start(&self) {
        let engine = Arc::clone(&self.engine);
        let mut tick = interval(Duration::from_secs(self.interval_secs.max(1)));
        tokio::spawn(async move {
            loop {
                tick.tick().await;
                match engine.resolve_expired_auctions(Utc::now()).await {
                    Ok(resolved) if resolved.is_empty() => {
                        debug!("{:<12} --> 스윕 완료: 종료 대상 없음", "Scheduler");
                    }
                    Ok(resolved) => {
                        debug!(
                            "{:<12} --> 스윕 완료: {}건 종료 처리 {:?}",
                            "Scheduler",
                            resolved.len(),
                            resolved
                        );
                    }
                    Err(e) => {
                        error!("{:<12} --> 스윕 중 오류 발생: {:?}", "Scheduler", e);
                    }
                }
            }
        });
    }
}

// endregion: --- Sweep Scheduler
