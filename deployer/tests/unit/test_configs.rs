//! Generated configuration tests

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use nasdeploy::deploy::config::{
    ConfigFile, ConfigPolicy, CLIENT_ID_KEY, CLIENT_SECRET_KEY, FILES_DIRECTORY_KEY,
    FILE_SERVER_BASE_URL_KEY,
};
use nasdeploy::deploy::prompt::ScriptedPrompter;
use nasdeploy::storage::settings::Settings;
use secrecy::ExposeSecret;

use crate::support::{Fixture, RecordingRunner};

const HOST: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20));

async fn load_both(fx: &Fixture) -> (ConfigFile, ConfigFile) {
    let web = ConfigFile::load(&fx.options().web_app.config_file).await.unwrap();
    let fs = ConfigFile::load(&fx.options().file_server.config_file)
        .await
        .unwrap();
    (web, fs)
}

#[tokio::test]
async fn test_both_apps_share_credentials() {
    let prompter = ScriptedPrompter::new(false).with_answer("/mnt/storage");
    let fx = Fixture::new(RecordingRunner::new(), Arc::new(prompter));
    fx.options()
        .web_app
        .config_file
        .write_string("import os\n\nDEBUG = False\n")
        .await
        .unwrap();

    let generated = fx.orchestrator.build_configs_for_host(HOST).await.unwrap();
    let (web, fs) = load_both(&fx).await;

    assert_eq!(web.get(CLIENT_ID_KEY), fs.get(CLIENT_ID_KEY));
    assert_eq!(web.get(CLIENT_SECRET_KEY), fs.get(CLIENT_SECRET_KEY));
    assert_eq!(
        web.get(CLIENT_ID_KEY).as_deref(),
        Some(generated.credentials.client_id.as_str())
    );

    let secret = fs.get(CLIENT_SECRET_KEY).unwrap();
    assert_eq!(secret, generated.credentials.client_secret.expose_secret());
    assert_eq!(secret.len(), 16);
    assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));

    // existing content survives
    assert_eq!(&web.lines()[..3], ["import os", "", "DEBUG = False"]);
}

#[tokio::test]
async fn test_endpoint_and_storage_keys() {
    let prompter = ScriptedPrompter::new(false).with_answer("  /mnt/storage  ");
    let fx = Fixture::new(RecordingRunner::new(), Arc::new(prompter));

    let generated = fx.orchestrator.build_configs_for_host(HOST).await.unwrap();
    let (web, fs) = load_both(&fx).await;

    assert_eq!(
        web.get(FILE_SERVER_BASE_URL_KEY).as_deref(),
        Some("http://192.168.1.20:5000/nas_server/api/v1.0")
    );
    assert_eq!(fs.get(FILE_SERVER_BASE_URL_KEY), None);
    assert_eq!(fs.get(FILES_DIRECTORY_KEY).as_deref(), Some("/mnt/storage"));
    assert_eq!(web.get(FILES_DIRECTORY_KEY), None);
    assert_eq!(generated.files_directory.as_deref(), Some("/mnt/storage"));
}

#[tokio::test]
async fn test_blank_storage_answer_is_skipped() {
    let fx = Fixture::new(
        RecordingRunner::new(),
        Arc::new(ScriptedPrompter::new(false).with_answer("   ")),
    );

    let generated = fx.orchestrator.build_configs_for_host(HOST).await.unwrap();
    let (_, fs) = load_both(&fx).await;

    assert_eq!(fs.get(FILES_DIRECTORY_KEY), None);
    assert!(generated.files_directory.is_none());
    assert!(fx.runner.commands().is_empty());
}

#[tokio::test]
async fn test_rerun_upserts() {
    let fx = Fixture::new(RecordingRunner::new(), Arc::new(ScriptedPrompter::new(false)));

    let first = fx.orchestrator.build_configs_for_host(HOST).await.unwrap();
    let second = fx.orchestrator.build_configs_for_host(HOST).await.unwrap();
    let (web, fs) = load_both(&fx).await;

    for config in [&web, &fs] {
        assert_eq!(config.count(CLIENT_ID_KEY), 1);
        assert_eq!(config.count(CLIENT_SECRET_KEY), 1);
    }
    assert_eq!(web.count(FILE_SERVER_BASE_URL_KEY), 1);
    assert_ne!(first.credentials.client_id, second.credentials.client_id);
    assert_eq!(
        fs.get(CLIENT_ID_KEY).as_deref(),
        Some(second.credentials.client_id.as_str())
    );
}

#[tokio::test]
async fn test_rerun_appends_under_legacy_policy() {
    let settings = Settings {
        config_policy: ConfigPolicy::Append,
        ..Settings::default()
    };
    let fx = Fixture::with_settings(
        RecordingRunner::new(),
        Arc::new(ScriptedPrompter::new(false)),
        settings,
    );

    fx.orchestrator.build_configs_for_host(HOST).await.unwrap();
    let second = fx.orchestrator.build_configs_for_host(HOST).await.unwrap();
    let (web, fs) = load_both(&fx).await;

    assert_eq!(web.count(CLIENT_ID_KEY), 2);
    assert_eq!(fs.count(CLIENT_SECRET_KEY), 2);
    // the last line wins when the module is imported
    assert_eq!(
        web.get(CLIENT_ID_KEY).as_deref(),
        Some(second.credentials.client_id.as_str())
    );
}
