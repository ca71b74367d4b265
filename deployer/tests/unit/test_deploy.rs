//! Deploy, kill and status tests

use std::sync::Arc;

use nasdeploy::deploy::process;
use nasdeploy::deploy::prompt::ScriptedPrompter;
use nasdeploy::errors::DeployError;
use nasdeploy::models::app::{AppKind, Selector};

use crate::support::{Fixture, RecordingRunner};

fn fixture(runner: RecordingRunner, confirm: bool) -> Fixture {
    let fx = Fixture::new(runner, Arc::new(ScriptedPrompter::new(confirm)));
    fx.create_install_dirs();
    fx
}

#[tokio::test]
async fn test_file_server_commands() {
    let fx = fixture(RecordingRunner::new(), false);

    fx.orchestrator.deploy_file_server(true).await.unwrap();

    let app = &fx.options().file_server;
    let commands = fx.runner.commands();
    let lines: Vec<&str> = commands.iter().map(|c| c.line.as_str()).collect();
    assert_eq!(
        lines,
        vec![
            "pip install -r requirements.txt".to_string(),
            "python build_test_dirs.py".to_string(),
            format!(
                "gunicorn --daemon --bind 0.0.0.0:5000 --pid {} runserver:app",
                app.pid_file.path().display()
            ),
        ]
    );
    for command in &commands {
        assert_eq!(command.cwd.as_deref(), Some(app.install_dir.path()));
        assert_eq!(command.activate.as_deref(), Some(app.activate_link().path()));
        assert!(!command.interactive);
    }
}

#[tokio::test]
async fn test_web_app_with_database_init() {
    let fx = fixture(RecordingRunner::new(), false);

    fx.orchestrator.deploy_web_app(true).await.unwrap();

    let commands = fx.runner.commands();
    assert_eq!(commands.len(), 4);
    assert_eq!(commands[1].line, "python manage.py migrate");
    assert_eq!(commands[2].line, "python manage.py createsuperuser");
    assert!(commands[2].interactive);
    assert!(commands[3]
        .line
        .starts_with("gunicorn --daemon --bind 0.0.0.0:8000 --pid "));
    assert!(commands[3].line.ends_with(" easyNAS.wsgi:application"));
    for command in &commands {
        assert_eq!(
            command.env,
            vec![(
                "DJANGO_SETTINGS_MODULE".to_string(),
                "easyNAS.settings.dev".to_string()
            )]
        );
    }
}

#[tokio::test]
async fn test_deploy_selector_skips_database_init() {
    let fx = fixture(RecordingRunner::new(), false);

    fx.orchestrator
        .deploy(Selector::One(AppKind::WebApp))
        .await
        .unwrap();

    let lines = fx.runner.lines();
    assert_eq!(lines.len(), 2);
    assert!(!lines.iter().any(|l| l.contains("manage.py")));
}

#[tokio::test]
async fn test_failed_install_does_not_start() {
    let fx = fixture(RecordingRunner::failing_on("pip install"), false);

    let err = fx.orchestrator.deploy(Selector::All).await.unwrap_err();

    assert!(matches!(err, DeployError::CommandFailed { .. }));
    assert_eq!(fx.runner.lines(), vec!["pip install -r requirements.txt"]);
}

#[tokio::test]
async fn test_deploy_then_kill_all() {
    let fx = fixture(RecordingRunner::spawning_services(), false);

    fx.orchestrator.deploy(Selector::All).await.unwrap();

    let statuses = fx.orchestrator.status(Selector::All).await;
    assert_eq!(statuses.len(), 2);
    assert!(statuses.iter().all(|s| s.alive && s.pid.is_some()));

    fx.orchestrator.kill(Selector::All).await.unwrap();

    assert_eq!(fx.runner.reap_killed(), 2);
    for kind in [AppKind::WebApp, AppKind::FileServer] {
        let pid = process::read_pid(&fx.options().app(kind).pid_file)
            .await
            .unwrap();
        assert!(!process::is_alive(pid));
    }
}

#[tokio::test]
async fn test_kill_stops_at_first_missing_pid_file() {
    let fx = fixture(RecordingRunner::spawning_services(), false);
    fx.orchestrator.deploy_file_server(false).await.unwrap();

    let err = fx.orchestrator.kill(Selector::All).await.unwrap_err();

    assert!(matches!(err, DeployError::PidFile { .. }));
    let pid = process::read_pid(&fx.options().file_server.pid_file)
        .await
        .unwrap();
    // the web app is visited first, so the file server was never signalled
    assert!(process::is_alive(pid));
}

#[tokio::test]
async fn test_kill_dead_process_fails() {
    let fx = fixture(RecordingRunner::spawning_services(), false);
    fx.orchestrator.deploy_file_server(false).await.unwrap();
    let selector = Selector::One(AppKind::FileServer);

    fx.orchestrator.kill(selector).await.unwrap();
    assert_eq!(fx.runner.reap_killed(), 1);

    let err = fx.orchestrator.kill(selector).await.unwrap_err();
    assert!(matches!(err, DeployError::Signal { .. }));
}

#[tokio::test]
async fn test_redeploy_orphans_previous_process() {
    let fx = fixture(RecordingRunner::spawning_services(), false);
    let pid_file = fx.options().file_server.pid_file.clone();

    fx.orchestrator.deploy_file_server(false).await.unwrap();
    let first = process::read_pid(&pid_file).await.unwrap();
    fx.orchestrator.deploy_file_server(false).await.unwrap();
    let second = process::read_pid(&pid_file).await.unwrap();

    assert_ne!(first, second);
    assert_eq!(fx.runner.service_count(), 2);

    fx.orchestrator
        .kill(Selector::One(AppKind::FileServer))
        .await
        .unwrap();
    assert!(process::is_alive(first));
}

#[tokio::test]
async fn test_status_without_deploy() {
    let fx = fixture(RecordingRunner::new(), false);

    let statuses = fx.orchestrator.status(Selector::One(AppKind::WebApp)).await;

    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].app, AppKind::WebApp);
    assert_eq!(statuses[0].pid, None);
    assert!(!statuses[0].alive);
}

#[tokio::test]
async fn test_build_app_declined_web_app() {
    let fx = Fixture::new(RecordingRunner::new(), Arc::new(ScriptedPrompter::new(false)));

    fx.orchestrator.build_app().await.unwrap();

    let lines = fx.runner.lines();
    assert_eq!(lines.len(), 6);
    assert!(lines[0].starts_with("git clone https://github.com/rjhowar2/easyNAS "));
    assert!(lines[2].starts_with("git clone https://github.com/rjhowar2/nas-file-server "));
    assert_eq!(lines[4], "pip install -r requirements.txt");
    assert!(lines[5].contains("0.0.0.0:5000"));
    assert!(fx.options().web_app.config_file.exists().await);
    assert!(fx.options().file_server.config_file.exists().await);
}

#[tokio::test]
async fn test_build_app_confirmed_web_app() {
    let fx = Fixture::new(RecordingRunner::new(), Arc::new(ScriptedPrompter::new(true)));

    fx.orchestrator.build_app().await.unwrap();

    let lines = fx.runner.lines();
    assert_eq!(lines.len(), 10);
    assert_eq!(&lines[6..9], [
        "pip install -r requirements.txt",
        "python manage.py migrate",
        "python manage.py createsuperuser",
    ]);
    assert!(lines[9].contains("0.0.0.0:8000"));
}
