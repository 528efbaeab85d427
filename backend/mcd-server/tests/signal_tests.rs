//! In-process shutdown signal fan-in

use mcd_server::ShutdownSignal;
use mcd_supervisor::ShutdownKind;

#[tokio::test]
async fn given_subscriber_when_raised_then_kinds_received_in_order() {
    let signal = ShutdownSignal::new();
    let mut rx = signal.subscribe();

    signal.raise(ShutdownKind::Graceful);
    signal.raise(ShutdownKind::Immediate);

    assert_eq!(rx.recv().await.unwrap(), ShutdownKind::Graceful);
    assert_eq!(rx.recv().await.unwrap(), ShutdownKind::Immediate);
}

#[test]
fn given_no_subscriber_when_raised_then_does_not_panic() {
    let signal = ShutdownSignal::default();

    signal.raise(ShutdownKind::Immediate);
}

#[cfg(unix)]
mod os_signals {
    use mcd_server::{ShutdownSignal, listen_os_signals};
    use mcd_supervisor::ShutdownKind;

    use std::process::Command;
    use std::time::Duration;

    use serial_test::serial;

    async fn kind_raised_by(signal_name: &str) -> ShutdownKind {
        let shutdown = ShutdownSignal::new();
        let mut requests = shutdown.subscribe();
        listen_os_signals(shutdown).unwrap();

        let status = Command::new("kill")
            .arg(format!("-{signal_name}"))
            .arg(std::process::id().to_string())
            .status()
            .unwrap();
        assert!(status.success());

        tokio::time::timeout(Duration::from_secs(5), requests.recv())
            .await
            .expect("signal was not turned into a shutdown request")
            .unwrap()
    }

    #[tokio::test]
    #[serial]
    async fn given_listener_when_sigquit_then_graceful_raised() {
        assert_eq!(kind_raised_by("QUIT").await, ShutdownKind::Graceful);
    }

    #[tokio::test]
    #[serial]
    async fn given_listener_when_sigterm_then_immediate_raised() {
        assert_eq!(kind_raised_by("TERM").await, ShutdownKind::Immediate);
    }

    #[tokio::test]
    #[serial]
    async fn given_listener_when_sigint_then_immediate_raised() {
        assert_eq!(kind_raised_by("INT").await, ShutdownKind::Immediate);
    }
}
