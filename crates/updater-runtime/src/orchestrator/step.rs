use std::fmt::Display;
use std::future::Future;
use std::time::Instant;

use tracing::{error, info};

/// Run one cycle step, logging entry, exit and duration.
pub(crate) async fn timed<F, T, E>(step: &str, fut: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    info!(step, "Step started");
    let started = Instant::now();
    let result = fut.await;
    let duration_ms = started.elapsed().as_millis() as u64;
    match &result {
        Ok(_) => info!(step, duration_ms, "Step finished"),
        Err(e) => error!(step, duration_ms, error = %e, "Step failed"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_passes_result_through() {
        let ok: Result<u64, String> = tokio_test::block_on(timed("latest_block", async { Ok(7) }));
        assert_eq!(ok, Ok(7));

        let err: Result<u64, String> =
            tokio_test::block_on(timed("reload", async { Err("refused".to_string()) }));
        assert_eq!(err, Err("refused".to_string()));
    }
}
