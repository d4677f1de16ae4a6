// runtime-async-std
#[cfg(feature = "runtime-async-std")]
pub type Mutex<T> = async_std::sync::Mutex<T>;

#[cfg(feature = "runtime-async-std")]
pub use async_std::task::yield_now;

/// Runs blocking work off the executor thread.
#[cfg(feature = "runtime-async-std")]
pub(crate) async fn spawn_blocking<F, T>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    async_std::task::spawn_blocking(f).await
}

// runtime-tokio
#[cfg(all(feature = "runtime-tokio", not(feature = "runtime-async-std")))]
pub type Mutex<T> = tokio::sync::Mutex<T>;

#[cfg(all(feature = "runtime-tokio", not(feature = "runtime-async-std")))]
pub use tokio::task::yield_now;

/// Runs blocking work off the executor thread, or inline when no tokio
/// runtime is current.
#[cfg(all(feature = "runtime-tokio", not(feature = "runtime-async-std")))]
pub(crate) async fn spawn_blocking<F, T>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let handle = match tokio::runtime::Handle::try_current() {
        Ok(handle) => handle,
        Err(_) => return f(),
    };
    match handle.spawn_blocking(f).await {
        Ok(value) => value,
        Err(err) => std::panic::resume_unwind(err.into_panic()),
    }
}

#[cfg(not(any(feature = "runtime-async-std", feature = "runtime-tokio")))]
compile_error!("enable one of the `runtime-async-std` or `runtime-tokio` features");
