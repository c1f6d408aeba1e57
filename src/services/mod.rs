pub mod alert_filter;
pub mod whale_view;

pub use alert_filter::significant_transfers;
pub use whale_view::{segment_portfolio, whale_portfolio, SegmentPortfolio};
