/// Concurrent access tests
///
/// These verify that one container shared across threads keeps its
/// guarantees under racing first resolutions: singleton identity, a single
/// on-load hook run, and stable class identity behind factories.

use lodestone::{Class, Container, CreateArgs, Deps, EntryOptions};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

struct SlowService {
    marker: u64,
}

fn slow_class(constructions: Arc<AtomicUsize>) -> Class {
    Class::builder("SlowService")
        .construct(move |_: &Deps, _: &CreateArgs| {
            constructions.fetch_add(1, Ordering::SeqCst);
            // Widen the race window so first lookups genuinely overlap.
            thread::sleep(Duration::from_millis(5));
            Ok(SlowService { marker: 42 })
        })
        .build()
        .unwrap()
}

#[test]
fn racing_first_lookups_share_one_singleton() {
    let constructions = Arc::new(AtomicUsize::new(0));
    let container = Container::new();
    container
        .register_with(
            "service:slow",
            slow_class(constructions.clone()),
            EntryOptions::new().singleton(true).instantiate(true),
        )
        .unwrap();

    let thread_count = 8;
    let barrier = Arc::new(Barrier::new(thread_count));
    let handles: Vec<_> = (0..thread_count)
        .map(|_| {
            let container = container.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                container.lookup_as::<SlowService>("service:slow").unwrap()
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    // Every thread got the same instance, and later lookups agree with it.
    let settled = container.lookup_as::<SlowService>("service:slow").unwrap();
    assert_eq!(settled.marker, 42);
    for instance in &results {
        assert!(Arc::ptr_eq(instance, &settled));
    }
}

#[test]
fn racing_first_resolutions_run_the_hook_once() {
    let hook_runs = Arc::new(AtomicUsize::new(0));
    let runs = hook_runs.clone();
    let class = Class::builder("Hooked")
        .construct(|_: &Deps, _: &CreateArgs| Ok(()))
        .on_load(move |_class, _meta| {
            runs.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(2));
        })
        .build()
        .unwrap();

    let container = Container::new();
    container.register("model:post", class).unwrap();

    let thread_count = 8;
    let barrier = Arc::new(Barrier::new(thread_count));
    let handles: Vec<_> = (0..thread_count)
        .map(|_| {
            let container = container.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                container.lookup("model:post").unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(hook_runs.load(Ordering::SeqCst), 1);
}

#[test]
fn racing_factory_requests_agree_on_the_class() {
    let constructions = Arc::new(AtomicUsize::new(0));
    let container = Container::new();
    container
        .register("service:slow", slow_class(constructions))
        .unwrap();

    let thread_count = 8;
    let barrier = Arc::new(Barrier::new(thread_count));
    let handles: Vec<_> = (0..thread_count)
        .map(|_| {
            let container = container.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                container.factory_for("service:slow").unwrap()
            })
        })
        .collect();

    let factories: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let first = &factories[0];
    for factory in &factories[1..] {
        assert!(factory.class().ptr_eq(first.class()));
    }
}

#[test]
fn concurrent_mixed_lookups_stay_consistent() {
    let container = Container::new();
    container
        .register_with(
            "service:shared",
            Class::builder("Shared")
                .construct(|_: &Deps, _: &CreateArgs| Ok(AtomicUsize::new(0)))
                .build()
                .unwrap(),
            EntryOptions::new().singleton(true).instantiate(true),
        )
        .unwrap();

    let thread_count = 8;
    let operations_per_thread = 50;
    let barrier = Arc::new(Barrier::new(thread_count));
    let handles: Vec<_> = (0..thread_count)
        .map(|_| {
            let container = container.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..operations_per_thread {
                    let counter = container
                        .lookup_as::<AtomicUsize>("service:shared")
                        .unwrap();
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // All increments landed on the one shared instance.
    let counter = container.lookup_as::<AtomicUsize>("service:shared").unwrap();
    assert_eq!(
        counter.load(Ordering::SeqCst),
        thread_count * operations_per_thread
    );
}
