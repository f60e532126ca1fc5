use std::sync::{Arc, Mutex};

use pmlog::{LogLevel, LogSink, init};

#[test]
fn test_global_logger() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink_seen = Arc::clone(&seen);
    init(
        LogLevel::Debug,
        LogSink::callback(move |msg| sink_seen.lock().unwrap().push(msg)),
    )
    .unwrap();

    log::trace!("dropped");
    log::debug!("cascade of {} records", 3);
    std::thread::Builder::new()
        .name("pm-job-test".to_string())
        .spawn(|| log::warn!("from the monitor"))
        .unwrap()
        .join()
        .unwrap();

    {
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].level, LogLevel::Debug);
        assert_eq!(seen[0].message, "cascade of 3 records");
        assert_eq!(seen[0].module, "global");
        assert_eq!(seen[1].thread_name.as_deref(), Some("pm-job-test"));
    }

    assert!(init(LogLevel::Info, LogSink::default()).is_err());
}
