use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::time::{sleep, Instant};

fn counting_task(runs: &Arc<AtomicUsize>) -> impl FnOnce() -> std::future::Ready<()> {
    let runs = runs.clone();
    move || {
        runs.fetch_add(1, Ordering::SeqCst);
        std::future::ready(())
    }
}

#[tokio::test(start_paused = true)]
async fn burst_inside_window_runs_once() {
    let delayer = ThrottledDelayer::new(Duration::from_millis(500));
    let runs = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let (first, second) = tokio::join!(delayer.trigger(counting_task(&runs)), async {
        sleep(Duration::from_millis(100)).await;
        delayer.trigger(counting_task(&runs)).await
    });

    assert!(!first);
    assert!(second);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(start.elapsed(), Duration::from_millis(600));
    assert!(!delayer.is_triggered());
}

#[tokio::test(start_paused = true)]
async fn superseded_caller_waits_for_the_surviving_task() {
    let delayer = ThrottledDelayer::new(Duration::from_millis(500));
    let start = Instant::now();

    let (first_done, _) = tokio::join!(
        async {
            delayer.trigger(|| async {}).await;
            start.elapsed()
        },
        async {
            sleep(Duration::from_millis(100)).await;
            delayer
                .trigger(|| async {
                    sleep(Duration::from_millis(300)).await;
                })
                .await
        }
    );

    assert_eq!(first_done, Duration::from_millis(900));
}

#[tokio::test(start_paused = true)]
async fn trigger_during_execution_runs_after_it() {
    let delayer = ThrottledDelayer::new(Duration::from_millis(100));
    let order = Mutex::new(Vec::new());

    let (first, second) = tokio::join!(
        delayer.trigger(|| async {
            order.lock().unwrap().push("first start");
            sleep(Duration::from_secs(1)).await;
            order.lock().unwrap().push("first end");
        }),
        async {
            sleep(Duration::from_millis(500)).await;
            assert!(delayer.is_triggered());
            delayer
                .trigger(|| async {
                    order.lock().unwrap().push("second");
                })
                .await
        }
    );

    assert!(first);
    assert!(second);
    assert_eq!(
        order.into_inner().unwrap(),
        vec!["first start", "first end", "second"]
    );
}

#[tokio::test(start_paused = true)]
async fn dropped_trigger_does_not_wedge_the_delayer() {
    let delayer = ThrottledDelayer::new(Duration::from_millis(500));
    let runs = Arc::new(AtomicUsize::new(0));

    let cancelled = tokio::time::timeout(
        Duration::from_millis(100),
        delayer.trigger(counting_task(&runs)),
    )
    .await;
    assert!(cancelled.is_err());
    assert!(!delayer.is_triggered());

    assert!(delayer.trigger(counting_task(&runs)).await);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}
