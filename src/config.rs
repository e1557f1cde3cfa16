/// 환경 변수 기반 프로세스 설정
/// 최소 입찰 금액과 통화 목록은 코어가 소유하지 않고 설정으로 주입된다.
// region:    --- Imports
use crate::auction::engine::AuctionConfig;
use std::env;

// endregion: --- Imports

// region:    --- Config

/// 서비스 설정
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub minimum_bid_amount: i64,
    pub currencies: Vec<String>,
    pub sweep_interval_secs: u64,
}

impl Config {
    /// 환경 변수에서 설정 읽기 (DATABASE_URL 외에는 기본값 사용)
    pub fn from_env() -> Self {
        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        // 입찰 금액은 항상 양수여야 하므로 최소값도 1 밑으로 내려가지 않는다
        let minimum_bid_amount = env::var("MIN_BID_AMOUNT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1_000_i64)
            .max(1);

        let currencies = env::var("CURRENCIES")
            .unwrap_or_else(|_| "USDC,SOL".to_string())
            .split(',')
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        let sweep_interval_secs = env::var("SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        Self {
            database_url,
            bind_addr,
            minimum_bid_amount,
            currencies,
            sweep_interval_secs,
        }
    }

    /// 경매 코어에 주입할 설정
    pub fn auction(&self) -> AuctionConfig {
        AuctionConfig {
            minimum_bid_amount: self.minimum_bid_amount,
            currencies: self.currencies.clone(),
        }
    }
}

// endregion: --- Config
