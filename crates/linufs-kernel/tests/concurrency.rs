//! Many tasks sharing one store on a multi-thread runtime.

use std::collections::HashSet;
use std::sync::Arc;

use linufs_kernel::{
    Ino, LocalConfig, LocalStore, LoopbackAdmin, NodeKind, NodeStore, RemoteStore, StoreError,
};

const TASKS: usize = 64;
const SMALL_ROOT: Ino = Ino::new(1);

fn local() -> Arc<LocalStore> {
    Arc::new(
        LocalStore::with_config(&LocalConfig {
            seed_demo: false,
            ..LocalConfig::default()
        })
        .unwrap(),
    )
}

async fn hammer_create(store: Arc<dyn NodeStore>) {
    let root = store.root_number();
    let mut handles = Vec::new();
    for i in 0..TASKS {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .create(root, &format!("node-{i}"), NodeKind::File)
                .await
        }));
    }

    let mut numbers = HashSet::new();
    for handle in handles {
        let ino = handle.await.unwrap().unwrap();
        assert!(numbers.insert(ino), "identifier {ino} handed out twice");
    }

    let batch = store.list(root).await.unwrap();
    assert_eq!(batch.len(), TASKS);
    for node in &batch {
        assert!(numbers.contains(&node.number));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_get_distinct_identifiers() {
    hammer_create(local()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_over_loopback() {
    // The admin listing holds at most 8 entries, so spread across directories.
    let store: Arc<dyn NodeStore> = Arc::new(RemoteStore::new(Arc::new(LoopbackAdmin::default())));
    let root = store.root_number();

    let mut handles = Vec::new();
    for i in 0..TASKS {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let dir_name = format!("d{}", i % 8);
            let dir = match store.create(root, &dir_name, NodeKind::Directory).await {
                Ok(dir) => dir,
                Err(_) => store.lookup(root, &dir_name).await?.map(|n| n.number).ok_or_else(|| {
                    StoreError::not_found(dir_name.clone())
                })?,
            };
            store.create(dir, &format!("f{i}"), NodeKind::File).await
        }));
    }

    let mut numbers = HashSet::new();
    for handle in handles {
        assert!(numbers.insert(handle.await.unwrap().unwrap()));
    }
    assert_eq!(store.list(root).await.unwrap().len(), 8);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_stop_at_exhaustion() {
    let store = Arc::new(
        LocalStore::with_config(&LocalConfig {
            root: 1,
            ino_min: 10,
            ino_max: 19,
            seed_demo: false,
            ..LocalConfig::default()
        })
        .unwrap(),
    );

    let mut handles = Vec::new();
    for i in 0..25 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.create(SMALL_ROOT, &format!("n{i}"), NodeKind::File).await
        }));
    }

    let mut created = 0;
    let mut exhausted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(StoreError::Exhausted) => exhausted += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(created, 10);
    assert_eq!(exhausted, 15);
    assert_eq!(store.len(), 10);

    // Freed identifiers are handed out again.
    let batch = store.list(SMALL_ROOT).await.unwrap();
    let victim = batch.get(0).unwrap().clone();
    store.remove(SMALL_ROOT, &victim.name).await.unwrap();
    let again = store.create(SMALL_ROOT, "again", NodeKind::File).await.unwrap();
    assert_eq!(again, victim.number);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writers_keep_content_consistent() {
    let store = local();
    let ino = store
        .create(store.root_number(), "shared", NodeKind::File)
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..TASKS {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let byte = b'a' + (i % 26) as u8;
            let data = vec![byte; 50];
            store.write(ino, 0, &data).await.unwrap();
            let mut buf = [0u8; 50];
            store.read(ino, 0, &mut buf).await.unwrap()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), 50);
    }

    // Each write is atomic, so the content is one writer's bytes.
    let content = store.read_all(ino).await.unwrap();
    assert_eq!(content.len(), 50);
    assert!(content.iter().all(|&b| b == content[0]));
}
