use super::*;
use crate::test_utils::init_test_db;

#[tokio::test(flavor = "multi_thread")]
async fn test_defaults_on_empty_db() {
    let ctx = init_test_db().await;
    let service = ConfigService::new_for_test(ctx.pool.clone());

    let settings = service.get_settings();
    assert_eq!(settings, AppSettings::default());
    assert_eq!(settings.exe_scan_depth, DEFAULT_EXE_SCAN_DEPTH);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_save_and_reload() {
    let ctx = init_test_db().await;
    let service = ConfigService::new_for_test(ctx.pool.clone());

    let mut settings = service.get_settings();
    settings.last_import_dir = Some("D:/Games/VN".into());
    settings.exe_scan_depth = 2;
    settings.bangumi_access_token = Some("tok".into());
    service.save_settings(settings.clone()).unwrap();

    // A second service over the same pool sees the persisted values.
    let reloaded = ConfigService::new_for_test(ctx.pool.clone());
    assert_eq!(reloaded.get_settings(), settings);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cleared_token_stays_cleared() {
    let ctx = init_test_db().await;
    let service = ConfigService::new_for_test(ctx.pool.clone());

    let mut settings = service.get_settings();
    settings.bangumi_access_token = Some("tok".into());
    service.save_settings(settings.clone()).unwrap();

    settings.bangumi_access_token = None;
    service.save_settings(settings).unwrap();

    let reloaded = ConfigService::new_for_test(ctx.pool.clone());
    assert_eq!(reloaded.get_settings().bangumi_access_token, None);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_depth_falls_back_to_default() {
    let ctx = init_test_db().await;
    crate::database::settings_repo::set_setting(&ctx.pool, "exe_scan_depth", "zero")
        .await
        .unwrap();
    crate::database::settings_repo::set_setting(&ctx.pool, "last_import_dir", "")
        .await
        .unwrap();

    let service = ConfigService::new_for_test(ctx.pool.clone());
    let settings = service.get_settings();
    assert_eq!(settings.exe_scan_depth, DEFAULT_EXE_SCAN_DEPTH);
    assert_eq!(settings.last_import_dir, None);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_set_last_import_dir() {
    let ctx = init_test_db().await;
    let service = ConfigService::new_for_test(ctx.pool.clone());

    service.set_last_import_dir("E:/VN").unwrap();
    assert_eq!(
        service.get_settings().last_import_dir.as_deref(),
        Some("E:/VN")
    );
}
