/// Market symbol identifying a tradeable instrument (e.g. "AAPL", "VWCE.DEX").
pub type Ticker = String;
