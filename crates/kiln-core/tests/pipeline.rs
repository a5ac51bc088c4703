mod support;

use std::collections::BTreeMap;
use std::path::Path;

use tempfile::TempDir;

use kiln_core::config::{BootstrapConfig, RepositoryDescriptor, RuntimeTag};
use kiln_core::desktop::{DesktopConfigAssembler, PublishOutcome, publish_desktop_config};
use kiln_core::pipeline::SetupPipeline;

use support::{AlwaysUp, FakeRunner};

fn repo(name: &str, env: &[(&str, &str)]) -> RepositoryDescriptor {
    RepositoryDescriptor {
        url: format!("https://github.com/org/{name}.git"),
        name: name.to_string(),
        runtime: RuntimeTag::Node,
        env_vars: Some(
            env.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        ),
    }
}

fn config(repos: Vec<RepositoryDescriptor>) -> BootstrapConfig {
    BootstrapConfig {
        repositories: repos,
        ..BootstrapConfig::default()
    }
}

fn trello() -> RepositoryDescriptor {
    repo(
        "mcp-trello",
        &[("TRELLO_API_KEY", "key"), ("TRELLO_TOKEN", "token")],
    )
}

#[tokio::test]
async fn trello_missing_token_runs_no_install_commands() {
    let temp = TempDir::new().unwrap();
    let config = config(vec![repo("mcp-trello", &[("TRELLO_API_KEY", "key")])]);
    let runner = FakeRunner::default();

    let report = SetupPipeline::new(&config, temp.path(), &runner, &AlwaysUp)
        .run()
        .await
        .unwrap();

    assert!(report.installed.is_empty());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "mcp-trello");
    assert!(report.failed[0].1.contains("TRELLO_TOKEN"));
    assert!(runner.setup_calls().is_empty());
}

#[tokio::test]
async fn unclassifiable_repository_fails_and_blocks_publication() {
    let temp = TempDir::new().unwrap();
    let base = temp.path().join("servers");
    let output = temp.path().join("claude_desktop_config.json");
    let config = config(vec![trello(), repo("mystery-server", &[])]);
    let runner = FakeRunner::default();

    let report = SetupPipeline::new(&config, &base, &runner, &AlwaysUp)
        .run()
        .await
        .unwrap();

    assert_eq!(report.installed, vec!["mcp-trello"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "mystery-server");

    let assembler = DesktopConfigAssembler::new(&config, &base, temp.path());
    let published = publish_desktop_config(&report, &assembler, &output).unwrap();
    assert_eq!(
        published,
        PublishOutcome::Skipped {
            failed: 1,
            pending: 0
        }
    );
    assert!(!output.exists());
}

#[tokio::test]
async fn failed_run_leaves_existing_config_untouched() {
    let temp = TempDir::new().unwrap();
    let base = temp.path().join("servers");
    let output = temp.path().join("claude_desktop_config.json");
    std::fs::write(&output, "{ \"previous\": true }").unwrap();
    let config = config(vec![repo("mystery-server", &[])]);
    let runner = FakeRunner::default();

    let report = SetupPipeline::new(&config, &base, &runner, &AlwaysUp)
        .run()
        .await
        .unwrap();
    let assembler = DesktopConfigAssembler::new(&config, &base, temp.path());
    publish_desktop_config(&report, &assembler, &output).unwrap();

    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "{ \"previous\": true }"
    );
}

#[tokio::test]
async fn successful_run_writes_config() {
    let temp = TempDir::new().unwrap();
    let base = temp.path().join("servers");
    let output = temp.path().join("out").join("claude_desktop_config.json");
    let config = config(vec![trello()]);
    let runner = FakeRunner::default();

    let report = SetupPipeline::new(&config, &base, &runner, &AlwaysUp)
        .run()
        .await
        .unwrap();
    let assembler = DesktopConfigAssembler::new(&config, &base, temp.path());
    let published = publish_desktop_config(&report, &assembler, &output).unwrap();

    assert_eq!(published, PublishOutcome::Written(output.clone()));
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let servers = json["mcpServers"].as_object().unwrap();
    assert!(servers.contains_key("trello"));
    assert!(servers.contains_key("fetch"));
    assert!(servers.contains_key("brave-search"));
    assert_eq!(servers["trello"]["env"]["TRELLO_TOKEN"], "token");

    let programs: Vec<String> = runner
        .setup_calls()
        .iter()
        .map(|spec| spec.args.join(" "))
        .collect();
    assert_eq!(programs, vec!["install dotenv", "install", "run build"]);
}

#[tokio::test]
async fn existing_directory_is_already_configured() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("mcp-trello")).unwrap();
    let config = config(vec![trello()]);
    let runner = FakeRunner::default();

    let report = SetupPipeline::new(&config, temp.path(), &runner, &AlwaysUp)
        .run()
        .await
        .unwrap();

    assert_eq!(report.installed, vec!["mcp-trello"]);
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn nested_subfolder_is_set_up() {
    let temp = TempDir::new().unwrap();
    let config = config(vec![trello()]);
    let runner = FakeRunner::nested();

    let report = SetupPipeline::new(&config, temp.path(), &runner, &AlwaysUp)
        .run()
        .await
        .unwrap();

    assert_eq!(report.installed, vec!["mcp-trello"]);
    let nested = temp.path().join("mcp-trello").join("mcp-trello");
    for spec in runner.setup_calls() {
        assert_eq!(spec.cwd.as_deref(), Some(nested.as_path()));
    }
    assert!(nested.join(".env").exists());
}

#[tokio::test]
async fn pending_calendar_blocks_publication() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("claude_desktop_config.json");
    let config = config(vec![repo(
        "mcp-google-calendar",
        &[("GOOGLE_CLIENT_ID", "id"), ("GOOGLE_CLIENT_SECRET", "secret")],
    )]);
    let runner = FakeRunner::default();

    let report = SetupPipeline::new(&config, temp.path(), &runner, &AlwaysUp)
        .run()
        .await
        .unwrap();

    assert!(report.failed.is_empty());
    assert_eq!(report.pending.len(), 1);
    assert!(!report.pending[0].1.is_empty());

    let assembler = DesktopConfigAssembler::new(&config, temp.path(), temp.path());
    let published = publish_desktop_config(&report, &assembler, &output).unwrap();
    assert!(matches!(published, PublishOutcome::Skipped { pending: 1, .. }));
    assert!(!output.exists());
}

#[test]
fn desktop_config_has_no_backslashes() {
    let mut config = config(vec![
        repo("mcp-trello", &[]),
        repo("whatsapp-mcp", &[]),
    ]);
    config
        .properties
        .insert("UV_PATH", "C:\\Users\\dev\\.local\\bin\\uv.exe");
    let base = Path::new("C:\\mcp\\servers");
    let home = Path::new("C:\\Users\\dev");

    let desktop = DesktopConfigAssembler::new(&config, base, home)
        .assemble(&["mcp-trello".to_string(), "whatsapp-mcp".to_string()])
        .unwrap();

    assert_eq!(
        desktop.mcp_servers["whatsapp"].command,
        "C:/Users/dev/.local/bin/uv.exe"
    );
    let filesystem = &desktop.mcp_servers["filesystem"].args;
    assert!(filesystem.contains(&"C:/Users/dev/Desktop".to_string()), "{filesystem:?}");
    assert!(filesystem.contains(&"C:/Users/dev/Downloads".to_string()), "{filesystem:?}");
    for entry in desktop.mcp_servers.values() {
        assert!(!entry.command.contains('\\'), "{}", entry.command);
        for arg in &entry.args {
            assert!(!arg.contains('\\'), "{arg}");
        }
    }
}
