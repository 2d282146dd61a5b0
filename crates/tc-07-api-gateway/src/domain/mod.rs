pub mod config;
pub mod dto;
pub mod error;
pub mod proxy;

pub use config::GatewayConfig;
pub use dto::{
    BatchClaimRequest, BatchClaimResponse, ClaimRequest, ClaimResponse, HealthResponse,
    PaintBatchRequest, PaintBatchResponse,
};
pub use error::{codes, ApiError};
pub use proxy::TrustedProxyConfig;
