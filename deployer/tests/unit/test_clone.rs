//! Clone tests

use std::sync::Arc;

use nasdeploy::deploy::prompt::ScriptedPrompter;
use nasdeploy::deploy::venv;
use nasdeploy::errors::DeployError;
use nasdeploy::filesys::dir::Dir;
use nasdeploy::models::app::{AppKind, Selector};
use nasdeploy::storage::layout::StorageLayout;
use nasdeploy::storage::settings::Settings;

use crate::support::{Fixture, RecordingRunner};

fn fixture(runner: RecordingRunner) -> Fixture {
    Fixture::new(runner, Arc::new(ScriptedPrompter::new(false)))
}

#[tokio::test]
async fn test_clone_removes_stale_checkout() {
    let fx = fixture(RecordingRunner::new());
    let web_dir = fx.options().web_app.install_dir.clone();
    web_dir.create().await.unwrap();
    web_dir.file("stale.py").write_string("old").await.unwrap();
    web_dir.subdir("old_pkg").create().await.unwrap();

    fx.orchestrator
        .clone_apps(Selector::One(AppKind::WebApp))
        .await
        .unwrap();

    let names = web_dir.entry_names().await.unwrap();
    assert_eq!(names, vec!["README.md".to_string(), "activate".to_string()]);
    assert!(!fx.options().file_server.install_dir.exists().await);
}

#[tokio::test]
async fn test_clone_commands() {
    let fx = fixture(RecordingRunner::new());

    fx.orchestrator
        .clone_apps(Selector::One(AppKind::FileServer))
        .await
        .unwrap();

    let app = &fx.options().file_server;
    let commands = fx.runner.commands();
    assert_eq!(commands.len(), 2);
    assert_eq!(
        commands[0].line,
        format!(
            "git clone https://github.com/rjhowar2/nas-file-server {}",
            app.install_dir.path().display()
        )
    );
    assert_eq!(commands[1].line, "virtualenv venv");
    assert_eq!(commands[1].cwd.as_deref(), Some(app.install_dir.path()));
}

#[cfg(unix)]
#[tokio::test]
async fn test_clone_links_activation_script() {
    let fx = fixture(RecordingRunner::new());

    fx.orchestrator
        .clone_apps(Selector::One(AppKind::WebApp))
        .await
        .unwrap();

    let app = &fx.options().web_app;
    let target = std::fs::read_link(app.activate_link().path()).unwrap();
    assert_eq!(target, app.activate_script());
}

#[tokio::test]
async fn test_clone_all_in_order() {
    let fx = fixture(RecordingRunner::new());

    fx.orchestrator.clone_apps(Selector::All).await.unwrap();

    let lines = fx.runner.lines();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].contains("easyNAS"));
    assert_eq!(lines[1], "virtualenv venv");
    assert!(lines[2].contains("nas-file-server"));
    assert_eq!(lines[3], "virtualenv venv");
}

#[tokio::test]
async fn test_clone_failure_stops_pipeline() {
    let fx = fixture(RecordingRunner::failing_on("git clone"));

    let err = fx.orchestrator.clone_apps(Selector::All).await.unwrap_err();

    assert!(matches!(err, DeployError::CommandFailed { .. }));
    // no virtualenv and no second clone
    assert_eq!(fx.runner.lines().len(), 1);
    // the recreated directory is left behind
    let web_dir: &Dir = &fx.options().web_app.install_dir;
    assert!(web_dir.exists().await);
    assert!(web_dir.entry_names().await.unwrap().is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn test_clone_with_relative_base_dir() {
    let dir = tempfile::tempdir().unwrap();
    let layout = StorageLayout::anchored("deploy", dir.path());
    let fx = Fixture::with_layout(
        dir,
        layout,
        RecordingRunner::new(),
        Arc::new(ScriptedPrompter::new(false)),
        Settings::default(),
    );

    fx.orchestrator
        .clone_apps(Selector::One(AppKind::WebApp))
        .await
        .unwrap();

    let app = &fx.options().web_app;
    assert!(app.install_dir.path().starts_with(fx.dir.path()));
    // stand in for the script virtualenv would have written
    app.install_dir
        .subdir("venv")
        .subdir("bin")
        .file("activate")
        .write_string("export VIRTUAL_ENV=venv\n")
        .await
        .unwrap();

    let target = std::fs::read_link(app.activate_link().path()).unwrap();
    assert!(target.is_absolute());
    assert_eq!(
        app.activate_link().read_string().await.unwrap(),
        "export VIRTUAL_ENV=venv\n"
    );

    let command = venv::in_venv(app, "pip install -r requirements.txt");
    assert!(command.activate.as_deref().unwrap().is_absolute());
}
