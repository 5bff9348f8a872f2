pub mod betting_service;
pub mod settlement_service;

pub use betting_service::{BettingService, CreateBetRequest, CreatedBet, MatchRef};
pub use settlement_service::{ResultRequest, SettlementOutcome, SettlementService};
