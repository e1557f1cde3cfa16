use thiserror::Error;

/// 경매 코어 오류 타입
/// 입찰 처리에서는 호출자에게 그대로 전파되고, 낙찰 스윕에서는 리스팅 단위로 격리된다.
#[derive(Debug, Error)]
pub enum MarketError {
    #[error("리스팅을 찾을 수 없습니다")]
    ListingNotFound,

    #[error("경매가 이미 종료되었습니다")]
    AuctionClosed,

    #[error("입찰 금액이 최소 입찰 금액({minimum})보다 낮습니다")]
    BidTooLow { minimum: i64 },

    #[error("지원하지 않는 통화입니다: {0}")]
    UnsupportedCurrency(String),

    // 일시적 저장소 오류, 호출자가 재시도 가능
    #[error("저장소를 사용할 수 없습니다: {0}")]
    StorageUnavailable(String),

    // 동시 수정 감지, 단일 리스팅 작업을 재시도하면 됨
    #[error("동시 수정으로 인해 작업이 취소되었습니다")]
    ConcurrentModification,
}

impl MarketError {
    /// API 응답에 실리는 오류 코드
    pub fn code(&self) -> &'static str {
        match self {
            MarketError::ListingNotFound => "LISTING_NOT_FOUND",
            MarketError::AuctionClosed => "AUCTION_CLOSED",
            MarketError::BidTooLow { .. } => "LOW_BID",
            MarketError::UnsupportedCurrency(_) => "UNSUPPORTED_CURRENCY",
            MarketError::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
            MarketError::ConcurrentModification => "CONFLICT",
        }
    }
}

impl From<sqlx::Error> for MarketError {
    fn from(e: sqlx::Error) -> Self {
        MarketError::StorageUnavailable(e.to_string())
    }
}
