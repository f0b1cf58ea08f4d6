pub mod bridge;
pub mod device_context;
pub mod receive;
pub mod transmit;
