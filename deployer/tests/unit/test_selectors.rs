//! Selector validation through the task dispatcher

use std::sync::Arc;

use nasdeploy::app::run::{run, Task};
use nasdeploy::deploy::prompt::ScriptedPrompter;
use nasdeploy::errors::DeployError;

use crate::support::{Fixture, RecordingRunner};

#[tokio::test]
async fn test_invalid_selectors_touch_nothing() {
    let fx = Fixture::new(RecordingRunner::new(), Arc::new(ScriptedPrompter::new(true)));
    let tasks = [
        Task::Clone("everything".to_string()),
        Task::Deploy("web".to_string()),
        Task::Deploy(String::new()),
        Task::Kill("File_Server".to_string()),
        Task::Status("db".to_string()),
    ];

    for task in tasks {
        let err = run(&fx.orchestrator, task.clone()).await.unwrap_err();
        assert!(
            matches!(err, DeployError::InvalidSelector(_)),
            "{:?} gave {:?}",
            task,
            err
        );
        assert_eq!(err.exit_code(), 2);
    }

    assert!(fx.runner.commands().is_empty());
    assert!(!fx.options().web_app.install_dir.exists().await);
    assert!(!fx.options().file_server.install_dir.exists().await);
}

#[tokio::test]
async fn test_valid_selector_reaches_orchestrator() {
    let fx = Fixture::new(RecordingRunner::new(), Arc::new(ScriptedPrompter::new(true)));

    run(&fx.orchestrator, Task::Clone("web_app".to_string()))
        .await
        .unwrap();

    assert_eq!(fx.runner.lines().len(), 2);
}
