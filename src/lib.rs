//! Scope-local batched resolution of wallet addresses to their labels.
//!
//! A [`Scope`] lives for one page-data request. Lookups issued within one
//! window are coalesced into a single [`BatchFn`] call, repeated lookups of a
//! key are served from the scope's write-once cache, and every caller gets its
//! own per-key outcome back.

pub mod address;
mod batch;
mod batch_fn;
mod cache;
pub mod config;
mod demux;
mod dispatch;
pub mod error;
pub mod holders;
pub mod labels;
pub mod resultset;
mod runtime;
mod scope;
pub mod token;

#[cfg(test)]
mod tests;

pub use batch::Outcome;
pub use batch_fn::BatchFn;
pub use cache::ScopeCache;
pub use config::{Config, LabelsConfig, LoaderConfig};
pub use error::{ContractViolation, LoadError};
pub use labels::{AccountLabels, LabelScope, LabelStore};
pub use scope::Scope;

use std::{future::Future, pin::Pin};

/// A trait alias. Read as "a function which returns a pinned box containing a future"
pub trait WaitForWorkFn:
    Fn() -> Pin<Box<dyn Future<Output = ()> + Send + Sync>> + Send + Sync + 'static
{
}

impl<T> WaitForWorkFn for T where
    T: Fn() -> Pin<Box<dyn Future<Output = ()> + Send + Sync>> + Send + Sync + 'static
{
}

pub(crate) fn yield_fn(count: usize) -> impl WaitForWorkFn {
    move || {
        Box::pin(async move {
            // yield for other requests to join the window
            for _ in 0..count {
                runtime::yield_now().await;
            }
        })
    }
}
