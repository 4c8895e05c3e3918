use std::time::Duration;

/// Runs the fixed delays between stages. Swap in [`InstantPacer`] for deterministic tests.
#[async_trait::async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioPacer;

#[async_trait::async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Skips every delay.
#[derive(Debug, Default, Clone, Copy)]
pub struct InstantPacer;

#[async_trait::async_trait]
impl Pacer for InstantPacer {
    async fn pause(&self, _duration: Duration) {}
}
