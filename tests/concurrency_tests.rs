use sovran_multimethod::{DispatchError, DispatchRegistry};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_concurrent_distinct_signatures_all_land() {
    let registry = DispatchRegistry::new();
    let barrier = Arc::new(Barrier::new(2));

    // Both threads race to create the table for "k"
    let mut handles = vec![];
    {
        let registry = registry.clone();
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            registry.register_fn("k", |_: i32| "s1").map(|_| ())
        }));
    }
    {
        let registry = registry.clone();
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            registry.register_fn("k", |_: String| "s2").map(|_| ())
        }));
    }

    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    assert_eq!(registry.dispatch::<&str, _>("k", (1,)).unwrap(), "s1");
    assert_eq!(
        registry
            .dispatch::<&str, _>("k", ("x".to_string(),))
            .unwrap(),
        "s2"
    );
    assert_eq!(registry.len().unwrap(), 1);
}

#[test]
fn test_many_threads_many_signatures() {
    let registry = DispatchRegistry::new();

    // Each thread owns a distinct arity, so no two collide
    let mut handles = vec![];
    for arity in 0..4usize {
        let registry = registry.clone();
        handles.push(thread::spawn(move || match arity {
            0 => registry.register_fn("arity", || 0usize).map(|_| ()),
            1 => registry.register_fn("arity", |_: u8| 1usize).map(|_| ()),
            2 => registry.register_fn("arity", |_: u8, _: u8| 2usize).map(|_| ()),
            _ => registry
                .register_fn("arity", |_: u8, _: u8, _: u8| 3usize)
                .map(|_| ()),
        }));
    }
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    let arity = registry.dispatcher::<usize>("arity").unwrap();
    assert_eq!(arity.signatures().unwrap().len(), 4);
    assert_eq!(arity.call(()).unwrap(), 0);
    assert_eq!(arity.call((0u8,)).unwrap(), 1);
    assert_eq!(arity.call((0u8, 0u8)).unwrap(), 2);
    assert_eq!(arity.call((0u8, 0u8, 0u8)).unwrap(), 3);
}

#[test]
fn test_concurrent_identical_signatures_one_wins() {
    let registry = DispatchRegistry::new();
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));

    let mut handles = vec![];
    for id in 0..threads {
        let registry = registry.clone();
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            registry
                .register_fn("same", move |_: i32| id)
                .map(|_| id)
        }));
    }

    let results: Vec<Result<usize, DispatchError>> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();

    let winners: Vec<usize> = results.iter().filter_map(|r| r.as_ref().ok().copied()).collect();
    assert_eq!(winners.len(), 1);
    for result in &results {
        if let Err(err) = result {
            assert!(matches!(err, DispatchError::RegistrationConflict { .. }));
        }
    }

    // The table holds the winner's implementation
    assert_eq!(registry.dispatch::<usize, _>("same", (0,)).unwrap(), winners[0]);
}

#[test]
fn test_dispatch_while_registering() {
    let registry = DispatchRegistry::new();
    let counter = registry.register_fn("count", |n: u64| n + 1).unwrap();

    let mut handles = vec![];
    for _ in 0..4 {
        let counter = counter.clone();
        handles.push(thread::spawn(move || {
            for n in 0..500u64 {
                assert_eq!(counter.call((n,)).unwrap(), n + 1);
            }
        }));
    }

    // Writers add signatures the readers never ask for
    let writer = {
        let registry = registry.clone();
        thread::spawn(move || {
            registry.register_fn("count", |n: u32| u64::from(n)).unwrap();
            registry.register_fn("count", |n: u16| u64::from(n)).unwrap();
            registry.register_fn("count", |n: u8| u64::from(n)).unwrap();
        })
    };

    for handle in handles {
        handle.join().unwrap();
    }
    writer.join().unwrap();

    assert_eq!(counter.signatures().unwrap().len(), 4);
    assert_eq!(counter.call((7u8,)).unwrap(), 7);
}

#[test]
fn test_dispatcher_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DispatchRegistry>();
    assert_send_sync::<sovran_multimethod::Dispatcher<String>>();
    assert_send_sync::<sovran_multimethod::DispatchTable<String>>();
}
