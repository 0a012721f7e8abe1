pub mod config;
pub mod goal;
pub mod sequence;

use std::future::Future;

/// Drive an interactive session to completion on a fresh runtime.
///
/// The runtime is shut down in the background afterwards: tokio's stdin
/// reader sits on a blocking thread that would otherwise hold the process
/// open until the next line of input.
pub fn block_on<F>(session: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: Future<Output = Result<(), Box<dyn std::error::Error>>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(session);
    runtime.shutdown_background();
    result
}
