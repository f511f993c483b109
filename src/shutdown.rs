use tokio::sync::watch;

/// Fires the cancellation signal. Firing is one-way and idempotent.
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

/// Observed by the scheduler between rounds and by every in-flight target pipeline.
#[derive(Clone)]
pub struct CancellationSignal {
    rx: watch::Receiver<bool>,
}

impl CancellationSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the trigger fires. Pends forever if the trigger is dropped unfired.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        let fired = rx.wait_for(|cancelled| *cancelled).await.is_ok();
        if !fired {
            std::future::pending::<()>().await;
        }
    }
}

pub fn channel() -> (ShutdownTrigger, CancellationSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, CancellationSignal { rx })
}

/// Waits for SIGTERM or SIGINT and fires the trigger.
#[cfg(unix)]
pub async fn wait_for_system_signal(trigger: ShutdownTrigger) -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => log::info!("Received SIGTERM, shutting down"),
        _ = sigint.recv() => log::info!("Received SIGINT, shutting down"),
    }
    trigger.trigger();
    Ok(())
}

#[cfg(not(unix))]
pub async fn wait_for_system_signal(trigger: ShutdownTrigger) -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    log::info!("Received Ctrl+C, shutting down");
    trigger.trigger();
    Ok(())
}
