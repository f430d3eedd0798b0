pub mod request;
pub mod server;

pub use request::{
    DateRangeRequest, ExecuteOutcome, ExecuteServerRequest, UpdateOutcome, UpdateServerRequest,
};
pub use server::{ServerDetail, ServerInfo};
