mod admin;
mod depositor;
mod draw;
mod error;
mod events;
mod ledger;
mod lender;
mod state;
mod ticket_math;
mod token_gateway;
mod types;

pub use state::Contract;
