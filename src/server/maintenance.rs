use std::sync::Arc;

use tokio::task::JoinHandle;

use super::SunnySaysServer;

impl SunnySaysServer {
    /// Periodic reclamation of ended and stale waiting rooms.
    pub async fn cleanup_task(&self) {
        let mut interval = tokio::time::interval(self.config.room_cleanup_interval);

        loop {
            interval.tick().await;

            let removed = self.registry.sweep().await;
            if !removed.is_empty() {
                tracing::info!(count = removed.len(), "Cleaned up rooms");
                for room_id in &removed {
                    tracing::debug!(%room_id, "Room reclaimed");
                }
            }
        }
    }

    pub fn spawn_cleanup_task(self: &Arc<Self>) -> JoinHandle<()> {
        let server = Arc::clone(self);
        tokio::spawn(async move { server.cleanup_task().await })
    }
}
