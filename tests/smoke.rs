mod common;

use common::LoadFnWithHistory;
use futures::executor::block_on;
use futures::future;
use labelloader::Scope;
use std::thread;

#[test]
fn smoke() {
    let scope: Scope<usize, usize, _> = Scope::new(LoadFnWithHistory::default());
    let v = future::join3(scope.resolve(1), scope.resolve(2), scope.resolve(4));
    assert_eq!((Ok(None), Ok(Some(20)), Ok(Some(40))), block_on(v));

    let v = scope.resolve_many(vec![10, 20, 2, 30]);
    assert_eq!(
        vec![Ok(Some(100)), Ok(Some(200)), Ok(Some(20)), Ok(Some(300))],
        block_on(v)
    );
}

#[test]
fn nested_resolve() {
    let scope: Scope<usize, usize, _> = Scope::new(LoadFnWithHistory::default());
    let scope_ref = &scope;
    let v1 = async move {
        let v = scope_ref.resolve(2).await.unwrap().unwrap();
        scope_ref.resolve(v).await
    };
    let v2 = async move {
        let v = scope_ref.resolve(4).await.unwrap().unwrap();
        scope_ref.resolve(v).await
    };
    assert_eq!((Ok(Some(200)), Ok(Some(400))), block_on(future::join(v1, v2)));
}

#[test]
fn test_resolve_across_threads() {
    let mut i = 0;
    while i < 200 {
        let load_fn = LoadFnWithHistory::default();
        let scope: Scope<usize, usize, _> = Scope::new(load_fn.clone());

        let s1 = scope.clone();
        let h1 = thread::spawn(move || {
            let r1 = s1.resolve(1);
            let r2 = s1.resolve(2);
            let r3 = s1.resolve(3);
            let r4 = s1.resolve_many(vec![2, 3, 4, 5, 6, 7, 8]);
            let (_v1, v2, _v3, v4) = block_on(future::join4(r1, r2, r3, r4));
            assert_eq!(Ok(Some(20)), v2);
            assert_eq!(7, v4.len());
            assert_eq!(Ok(None), v4[1]);
            assert_eq!(Ok(Some(80)), v4[6]);
        });

        let s2 = scope.clone();
        let h2 = thread::spawn(move || {
            let r1 = s2.resolve(1);
            let r2 = s2.resolve(2);
            let r3 = s2.resolve(3);
            let r4 = s2.resolve(4);
            let fv = block_on(future::join4(r1, r2, r3, r4));
            assert_eq!((Ok(None), Ok(Some(20)), Ok(None), Ok(Some(40))), fv);
        });

        let s3 = scope.clone();
        let h3 = thread::spawn(move || {
            let r1 = s3.resolve_many(vec![12, 13, 14, 1, 2, 3, 4]);
            let r2 = s3.resolve_many(vec![9, 10, 11, 12, 13, 14]);
            let (v1, v2) = block_on(future::join(r1, r2));
            assert_eq!(Ok(Some(120)), v1[0]);
            assert_eq!(Ok(Some(140)), v2[5]);
        });

        h1.join().unwrap();
        h2.join().unwrap();
        h3.join().unwrap();
        i += 1;

        let max_batch_loaded = load_fn.max_batch_loaded.lock().unwrap();
        assert!(*max_batch_loaded > 1);
        let loaded_keys = load_fn.loaded_keys.lock().unwrap();
        assert_eq!(14, loaded_keys.len());
    }
}
