/// 공개 리스팅 조회 (입찰 가능 상태)
pub const GET_ACTIVE_LISTINGS: &str =
    "SELECT id, creator_id, title, available, biddable, ask_price, end_time, created_at FROM listings WHERE available = TRUE AND biddable = TRUE ORDER BY created_at DESC";

/// 리스팅 조회
pub const GET_LISTING: &str =
    "SELECT id, creator_id, title, available, biddable, ask_price, end_time, created_at FROM listings WHERE id = $1";

/// 리스팅 입찰 이력 조회
pub const GET_LISTING_BIDS: &str = r#"
    SELECT id, listing_id, bidder_id, amount, currency, is_winning, has_won, created_at, won_at
    FROM bids
    WHERE listing_id = $1
    ORDER BY amount DESC, created_at ASC
"#;

/// 낙찰 입찰 조회
pub const GET_WINNING_BID: &str = r#"
    SELECT id, listing_id, bidder_id, amount, currency, is_winning, has_won, created_at, won_at
    FROM bids
    WHERE listing_id = $1 AND has_won = TRUE
"#;
