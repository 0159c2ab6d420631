//! Dispatch behaviour under contention.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use provider_balancer::{BalancerError, HealthCheckMode, Provider, SelectionAlgorithm};

mod common;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_in_flight_never_exceeds_capacity() {
    let lb = common::balancer(SelectionAlgorithm::Random, 5);
    lb.register(&[
        common::static_provider("a", 2),
        common::static_provider("b", 3),
    ])
    .unwrap();
    let capacity = lb.maximum_supported_requests();
    assert_eq!(capacity, 5);

    let peak = Arc::new(AtomicUsize::new(0));
    let mut tasks = Vec::new();
    for i in 0..60 {
        let lb = lb.clone();
        let observer = lb.clone();
        let peak = peak.clone();
        tasks.push(tokio::spawn(async move {
            lb.dispatch(|_| async move {
                peak.fetch_max(observer.processing_requests(), Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(1 + (i % 5))).await;
                Ok::<_, BalancerError>(())
            })
            .await
        }));
    }

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let peak = peak.load(Ordering::SeqCst);
    assert!(peak >= 1);
    assert!(peak <= capacity, "peak {peak} exceeded capacity {capacity}");
    assert_eq!(lb.processing_requests(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_saturated_dispatch_waits_for_capacity() {
    let lb = common::balancer(SelectionAlgorithm::RoundRobin, 2);
    let provider = common::static_provider("only", 1);
    lb.register(&[provider.clone()]).unwrap();

    let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
    let holder = {
        let lb = lb.clone();
        tokio::spawn(async move {
            lb.dispatch(|_| async move {
                let _ = release_rx.await;
                Ok::<_, BalancerError>(())
            })
            .await
        })
    };
    tokio::time::sleep(Duration::from_millis(5)).await;
    assert_eq!(lb.processing_requests(), 1);

    let waiter = {
        let lb = lb.clone();
        tokio::spawn(async move {
            lb.dispatch(|p| async move { Ok::<_, BalancerError>(p.id().to_string()) })
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!waiter.is_finished());

    release_tx.send(()).unwrap();
    holder.await.unwrap().unwrap();
    assert_eq!(waiter.await.unwrap().unwrap(), "only");
    assert_eq!(lb.processing_requests(), 0);
    assert_eq!(provider.load().current_load, 0);
}

#[tokio::test(start_paused = true)]
async fn test_dispatch_waits_for_capable_provider() {
    let lb = common::balancer(SelectionAlgorithm::RoundRobin, 2);
    let provider = common::SwitchProvider::new(
        "sleepy",
        3,
        HealthCheckMode::None,
        false,
    );
    let registered: Arc<dyn Provider> = provider.clone();
    lb.register(&[registered]).unwrap();

    let dispatch = {
        let lb = lb.clone();
        tokio::spawn(async move {
            lb.dispatch(|_| async { Ok::<_, BalancerError>(()) }).await
        })
    };

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(!dispatch.is_finished());

    provider.set_alive(true);
    dispatch.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_round_robin_dispatch_cycles_providers() {
    let lb = common::balancer(SelectionAlgorithm::RoundRobin, 3);
    lb.register(&[
        common::static_provider("a", 1),
        common::static_provider("b", 1),
        common::static_provider("c", 1),
    ])
    .unwrap();

    let mut order = Vec::new();
    for _ in 0..4 {
        let id = lb
            .dispatch(|p| async move { Ok::<_, BalancerError>(p.id().to_string()) })
            .await
            .unwrap();
        order.push(id);
    }
    assert_eq!(order, vec!["a", "b", "c", "a"]);
}

#[tokio::test]
async fn test_removed_provider_finishes_in_flight_work() {
    let lb = common::balancer(SelectionAlgorithm::RoundRobin, 2);
    let provider = common::static_provider("a", 2);
    lb.register(&[provider.clone()]).unwrap();

    let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();
    let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
    let in_flight = {
        let lb = lb.clone();
        tokio::spawn(async move {
            lb.dispatch(|_| async move {
                let _ = started_tx.send(());
                let _ = release_rx.await;
                Ok::<_, BalancerError>(())
            })
            .await
        })
    };
    started_rx.await.unwrap();

    lb.remove(&*provider);
    assert_eq!(lb.maximum_supported_requests(), 0);
    assert!(lb.pool().is_empty());

    release_tx.send(()).unwrap();
    in_flight.await.unwrap().unwrap();
    assert_eq!(provider.load().current_load, 0);
    assert_eq!(lb.processing_requests(), 0);

    let result = lb.dispatch(|_| async { Ok::<_, BalancerError>(()) }).await;
    assert_eq!(result, Err(BalancerError::NoProviders));
}
