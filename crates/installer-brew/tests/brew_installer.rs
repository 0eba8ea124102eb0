mod support;

use std::collections::BTreeMap;
use std::sync::Arc;

use installer_brew::{BrewInstaller, BrewVersionFinder};
use installer_core::{FromTarget, Installer, InstallerError, InstallerKind, VersionFinder};
use installer_exec::Context;
use support::{FakeHost, Formula, Reply, remote};

const JQ_FILES: &str = "/opt/homebrew/Cellar/jq/1.7.1/bin/jq\n/opt/homebrew/Cellar/jq/1.7.1/share/man/man1/jq.1\n";
const JQ_INFO: &str = r#"{"formulae":[{"name":"jq","installed":[{"version":"1.7.1","installed_on_request":true}]}],"casks":[]}"#;
const PYTHON_INFO: &str = r#"{"formulae":[{"name":"python@3.11","installed":[{"version":"3.11.6_1"}]}],"casks":[]}"#;
const FIREFOX_INFO: &str = r#"{"formulae":[],"casks":[{"token":"firefox","installed":"121.0"}]}"#;

fn jq() -> Formula {
    Formula {
        name: "jq",
        ..Formula::default()
    }
}

fn jq_host() -> Arc<FakeHost> {
    Arc::new(
        FakeHost::new()
            .reply("brew list jq", Reply::ok(JQ_FILES))
            .reply("brew info --json=v2 --formula jq", Reply::ok(JQ_INFO)),
    )
}

#[tokio::test]
async fn install_runs_brew_without_sudo() {
    let host = Arc::new(FakeHost::new());
    let brew = BrewInstaller::from_target(remote(&host));

    brew.install(&Context::background(), &jq())
        .await
        .expect("install should succeed");

    assert_eq!(host.commands(), vec!["brew install jq".to_string()]);
    assert_eq!(Installer::<Formula>::kind(&brew), InstallerKind::Brew);
}

#[tokio::test]
async fn install_cask_with_version_and_environment() {
    let host = Arc::new(FakeHost::new());
    let brew = BrewInstaller::from_target(remote(&host));
    let firefox = Formula {
        name: "firefox",
        version: Some("121.0"),
        cask: true,
        environment: BTreeMap::from([(
            "HOMEBREW_GITHUB_API_TOKEN".to_string(),
            "ghp_x".to_string(),
        )]),
        ..Formula::default()
    };

    brew.install(&Context::background(), &firefox)
        .await
        .expect("install should succeed");

    assert_eq!(
        host.commands(),
        vec![r#"HOMEBREW_GITHUB_API_TOKEN="ghp_x" brew install --cask firefox@121.0"#.to_string()]
    );
}

#[tokio::test]
async fn find_installed_reads_version_and_binary() {
    let host = jq_host();
    let brew = BrewInstaller::from_target(remote(&host));

    let found = brew
        .find_installed(&Context::background(), &jq())
        .await
        .expect("probe should succeed")
        .expect("jq should be present");

    assert_eq!(found.kind, InstallerKind::Brew);
    assert_eq!(found.id(), "brew:jq@1.7.1");
    assert_eq!(found.path(), Some("/opt/homebrew/Cellar/jq/1.7.1/bin/jq"));
    assert_eq!(
        host.commands(),
        vec![
            "brew list jq".to_string(),
            "brew info --json=v2 --formula jq".to_string()
        ]
    );
}

#[tokio::test]
async fn versioned_formula_is_satisfied_by_patch_release() {
    let host = Arc::new(
        FakeHost::new()
            .reply("brew list python@3.11", Reply::ok("/opt/homebrew/Cellar/python@3.11/3.11.6_1/bin/python3.11\n"))
            .reply("brew info", Reply::ok(PYTHON_INFO)),
    );
    let finder = BrewVersionFinder::from_target(remote(&host));
    let python = Formula {
        name: "python@3.11",
        ..Formula::default()
    };

    let info = finder
        .find_installed(&Context::background(), &python)
        .await
        .expect("3.11.6_1 satisfies 3.11");

    assert_eq!(info.named_version.name, "python");
    assert_eq!(
        info.named_version.version.map(|v| v.to_string()),
        Some("3.11.6_1".to_string())
    );
    assert_eq!(info.path, None);
    assert_eq!(
        host.commands(),
        vec![
            "brew list python@3.11".to_string(),
            "brew info --json=v2 --formula python@3.11".to_string()
        ]
    );
}

#[tokio::test]
async fn other_installed_version_is_a_mismatch() {
    let pinned = Formula {
        name: "jq",
        version: Some("1.6"),
        ..Formula::default()
    };
    let host = Arc::new(
        FakeHost::new()
            .reply("brew list jq@1.6", Reply::ok(JQ_FILES))
            .reply("brew info", Reply::ok(JQ_INFO)),
    );
    let finder = BrewVersionFinder::from_target(remote(&host));

    let err = finder
        .find_installed(&Context::background(), &pinned)
        .await
        .expect_err("1.7.1 does not satisfy 1.6");

    assert!(matches!(err, InstallerError::VersionMismatch { .. }));
    assert!(err.is_absent());
}

#[tokio::test]
async fn cask_version_comes_from_installed_field() {
    let host = Arc::new(
        FakeHost::new()
            .reply("brew list --cask firefox", Reply::ok("/Applications/Firefox.app\n"))
            .reply("brew info --json=v2 --cask firefox", Reply::ok(FIREFOX_INFO)),
    );
    let brew = BrewInstaller::from_target(remote(&host));
    let firefox = Formula {
        name: "firefox",
        cask: true,
        ..Formula::default()
    };

    let found = brew
        .find_installed(&Context::background(), &firefox)
        .await
        .expect("probe should succeed")
        .expect("firefox should be present");

    assert_eq!(found.version().map(ToString::to_string), Some("121.0".to_string()));
    assert_eq!(found.path(), None);
}

#[tokio::test]
async fn missing_keg_is_not_installed() {
    let host = Arc::new(
        FakeHost::new().reply("brew list", Reply::fail(1, "Error: No such keg: /opt/homebrew/Cellar/jq\n")),
    );
    let finder = BrewVersionFinder::from_target(remote(&host));

    let err = finder
        .find_installed(&Context::background(), &jq())
        .await
        .expect_err("missing keg should be reported");

    assert_eq!(err, InstallerError::not_installed("jq"));
}

#[tokio::test]
async fn unparsable_info_is_a_parse_error() {
    let host = Arc::new(
        FakeHost::new()
            .reply("brew list", Reply::ok(JQ_FILES))
            .reply("brew info", Reply::ok("Warning: something odd happened\n")),
    );
    let finder = BrewVersionFinder::from_target(remote(&host));

    let err = finder
        .find_installed(&Context::background(), &jq())
        .await
        .expect_err("no JSON should fail");

    assert!(matches!(err, InstallerError::Parse { .. }));
    assert!(!err.is_absent());
}

#[tokio::test]
async fn uninstall_skips_absent_formula() {
    let host = Arc::new(
        FakeHost::new().reply("brew list", Reply::fail(1, "Error: No such keg: /opt/homebrew/Cellar/jq\n")),
    );
    let brew = BrewInstaller::from_target(remote(&host));

    let removed = brew
        .uninstall(&Context::background(), &jq())
        .await
        .expect("absent formula is not an error");

    assert!(!removed);
    assert_eq!(host.commands(), vec!["brew list jq".to_string()]);
}

#[tokio::test]
async fn uninstall_removes_present_formula() {
    let host = jq_host();
    let brew = BrewInstaller::from_target(remote(&host));

    let removed = brew
        .uninstall(&Context::background(), &jq())
        .await
        .expect("removal should succeed");

    assert!(removed);
    assert_eq!(host.commands().last().map(String::as_str), Some("brew uninstall jq"));
}
