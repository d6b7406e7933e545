use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tempfile::tempdir;
use tumor_lens_lib::services::db::PredictionLog;

#[test]
fn concurrent_appends_lose_nothing() {
    let dir = tempdir().expect("tempdir");
    let log = PredictionLog::open(dir.path().join("predictions.db")).unwrap();

    let writers: Vec<_> = (0..8)
        .map(|w| {
            let log = log.clone();
            thread::spawn(move || {
                for i in 0..25 {
                    let score = ((w * 25 + i) % 100) as f32 / 100.0;
                    log.append(&format!("w{}_{}.png", w, i), score).unwrap();
                }
            })
        })
        .collect();
    for handle in writers {
        handle.join().unwrap();
    }

    let records = log.list_all().unwrap();
    assert_eq!(records.len(), 200);
    let ids: HashSet<i64> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids.len(), 200);
    let names: HashSet<&str> = records.iter().map(|r| r.filename.as_str()).collect();
    assert_eq!(names.len(), 200);
}

#[test]
fn reads_during_writes_only_see_whole_rows() {
    let dir = tempdir().expect("tempdir");
    let log = PredictionLog::open(dir.path().join("predictions.db")).unwrap();
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let log = log.clone();
        let done = done.clone();
        thread::spawn(move || {
            for i in 0..100 {
                log.append(&format!("scan_{}.jpg", i), 0.75).unwrap();
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    let mut last_seen = 0;
    while !done.load(Ordering::SeqCst) {
        let records = log.list_all().unwrap();
        assert!(records.len() >= last_seen);
        for r in &records {
            assert!(r.filename.starts_with("scan_"));
            assert_eq!(r.result, "Tumor Detected");
            assert_eq!(r.confidence, 0.75);
        }
        last_seen = records.len();
    }
    writer.join().unwrap();

    assert_eq!(log.list_all().unwrap().len(), 100);
}

#[test]
fn ids_increase_in_insertion_order() {
    let dir = tempdir().expect("tempdir");
    let log = PredictionLog::open(dir.path().join("predictions.db")).unwrap();

    let appended: Vec<i64> = (0..10)
        .map(|i| log.append(&format!("{}.png", i), 0.3).unwrap().id)
        .collect();
    assert!(appended.windows(2).all(|w| w[1] > w[0]));

    let mut listed: Vec<i64> = log.list_all().unwrap().iter().map(|r| r.id).collect();
    listed.reverse();
    assert_eq!(listed, appended);
}

#[test]
fn scan_can_be_restarted() {
    let dir = tempdir().expect("tempdir");
    let log = PredictionLog::open(dir.path().join("predictions.db")).unwrap();
    log.append("a.png", 0.1).unwrap();
    log.append("b.png", 0.9).unwrap();

    let mut first = Vec::new();
    log.scan(|r| first.push(r.filename)).unwrap();
    let mut second = Vec::new();
    log.scan(|r| second.push(r.filename)).unwrap();
    assert_eq!(first, vec!["b.png", "a.png"]);
    assert_eq!(first, second);

    log.append("c.png", 0.4).unwrap();
    let mut third = Vec::new();
    log.scan(|r| third.push(r.filename)).unwrap();
    assert_eq!(third, vec!["c.png", "b.png", "a.png"]);
}
