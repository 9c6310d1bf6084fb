//! Transport trait
//!
//! The transport performs the actual network exchange. The executor hands it
//! a fully resolved request and gets back the raw status and body, or a
//! structured [`TransportError`] telling a cancellation apart from an
//! unreachable network.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TransportError;
use crate::request::ResolvedRequest;
use crate::response::TransportResponse;

/// Performs one HTTP exchange
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// Send `request` and return the raw response
    ///
    /// Implementations should stop work and return
    /// [`TransportError::Cancelled`] once `cancel` fires. The executor drops
    /// the returned future on cancellation regardless, so an implementation
    /// that never looks at the token is still cut off.
    async fn send(
        &self,
        request: ResolvedRequest,
        cancel: CancellationToken,
    ) -> Result<TransportResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(
        &self,
        request: ResolvedRequest,
        cancel: CancellationToken,
    ) -> Result<TransportResponse, TransportError> {
        (**self).send(request, cancel).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn send(
        &self,
        request: ResolvedRequest,
        cancel: CancellationToken,
    ) -> Result<TransportResponse, TransportError> {
        (**self).send(request, cancel).await
    }
}
