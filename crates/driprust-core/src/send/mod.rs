//! Send Module - SMS transport and batch dispatch

mod batch;
mod gateway;
mod transport;

pub use batch::{BatchReport, BatchSender, ContactSendResult};
pub use gateway::SmsGatewayClient;
pub use transport::{SmsTransport, TransportError};
