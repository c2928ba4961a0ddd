use corral_domain::profile::{LogConfig, LogLevel, LogRotation, RemoteLogConfig, SizeUnit};
use corral_logger::Logger;
use std::time::Duration;

#[test]
fn from_profile_binds_all_sinks() {
    let tmp_dir = tempfile::tempdir().expect("tempdir");

    let cfg = LogConfig {
        folder: tmp_dir.path().join("logs").display().to_string(),
        file: None,
        level: LogLevel::Info,
        rotation: LogRotation { size: 64, unit: SizeUnit::Kb, keep: 3 },
        // Remote shipping requested; setup problems must never fail init.
        remote: RemoteLogConfig {
            enabled: true,
            endpoint: None,
            group: Some("integration".to_owned()),
            stream: None,
            retention_days: 1,
        },
    };

    let logger = Logger::from_profile("ReportsApi", &cfg).expect("profile-driven init");
    assert!(logger.guard().is_some(), "profile config always carries a file sink");

    tracing::info!("profile bound");
    std::thread::sleep(Duration::from_millis(20));
    logger.flush();

    let file = tmp_dir.path().join("logs").join("reports-api.log");
    assert!(file.exists(), "file stem derives from the kebab-cased app name");
}
