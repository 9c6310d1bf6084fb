//! Transport backends

mod builder;

#[cfg(all(feature = "bitreq", not(target_arch = "wasm32")))]
pub mod bitreq_backend;

#[cfg(all(feature = "reqwest", not(target_arch = "wasm32")))]
pub mod reqwest_backend;

#[cfg(all(feature = "bitreq", not(target_arch = "wasm32")))]
pub use bitreq_backend::BitreqTransport;
pub use builder::TransportBuilder;
#[cfg(all(feature = "reqwest", not(target_arch = "wasm32")))]
pub use reqwest_backend::ReqwestTransport;

/// Transport used by [`RequestExecutor::new`](crate::RequestExecutor::new)
#[cfg(all(feature = "bitreq", not(target_arch = "wasm32")))]
pub type DefaultTransport = BitreqTransport;

/// Transport used by [`RequestExecutor::new`](crate::RequestExecutor::new)
#[cfg(all(
    feature = "reqwest",
    not(feature = "bitreq"),
    not(target_arch = "wasm32")
))]
pub type DefaultTransport = ReqwestTransport;
