//! Extension manager behaviour against in-memory platform fakes

mod common;

use common::*;
use devboot_errors::{InstallError, PlatformError, UserFacingError};
use devboot_events::{AppEvent, LogSeverity, PackageEvent};
use devboot_packages::{ExtensionManager, ExtensionSettings, PackageManager};
use devboot_platform::{OutputChunk, Platform};
use devboot_types::{
    AppType, ExitCodePolicy, InstallCommandTable, Os, PackageInfo, PackagesData, UnknownIdePolicy,
};
use futures::future::join_all;
use proptest::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;

const CHANNEL: &str = "vscode-extensions";

fn extension_manager(
    packages: Arc<PackagesData>,
    platform: Arc<Platform>,
    settings: ExtensionSettings,
) -> (ExtensionManager, devboot_events::EventReceiver) {
    let (tx, rx) = devboot_events::channel();
    let manager = ExtensionManager::new(
        CHANNEL,
        packages,
        Arc::new(InstallCommandTable::default()),
        platform,
        Some(tx),
    )
    .with_settings(settings)
    .with_os(Os::Darwin);
    (manager, rx)
}

fn install_error(err: &devboot_errors::Error) -> &InstallError {
    err.as_install().expect("installation error")
}

#[tokio::test]
async fn test_installs_extension_when_command_is_present() {
    let (platform, world) = FakePlatform::default().build();
    let (manager, _rx) = extension_manager(vscode_catalog(), platform, ExtensionSettings::default());

    let result = manager
        .install(&PackageInfo::extension("ms-python.python", "VSCode"))
        .await
        .unwrap();

    assert_eq!(result.name, "ms-python.python");
    assert_eq!(result.exit_code, Some(0));
    assert_eq!(world.runs(), ["code --install-extension ms-python.python"]);
    assert!(world.links().is_empty());
    assert_eq!(world.app_probes(), 0);
}

#[tokio::test]
async fn test_missing_catalog_entry_is_a_configuration_error() {
    let (platform, world) = FakePlatform {
        command_present: false,
        ..FakePlatform::default()
    }
    .build();
    let (manager, _rx) = extension_manager(
        Arc::new(PackagesData::default()),
        platform,
        ExtensionSettings::default(),
    );

    let err = manager
        .install(&PackageInfo::extension("ms-python.python", "VSCode"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "VSCode info was not found.");
    assert!(matches!(
        install_error(&err),
        InstallError::AppInfoNotFound { app } if app == "VSCode"
    ));
    assert_eq!(err.user_code(), Some("install.configuration"));
    assert!(world.runs().is_empty());
}

#[tokio::test]
async fn test_catalog_entry_for_other_platform_is_not_used() {
    let (platform, world) = FakePlatform {
        command_present: false,
        ..FakePlatform::default()
    }
    .build();
    let (manager, _rx) = extension_manager(vscode_catalog(), platform, ExtensionSettings::default());
    let manager = manager.with_os(Os::Linux);

    let err = manager
        .uninstall(&PackageInfo::extension("ms-python.python", "VSCode"))
        .await
        .unwrap_err();

    assert!(matches!(
        install_error(&err),
        InstallError::AppInfoNotFound { .. }
    ));
    assert!(world.runs().is_empty());
}

#[tokio::test]
async fn test_unknown_ide_type_uninstall_has_no_side_effects() {
    let (platform, world) = FakePlatform::default().build();
    let (manager, mut rx) = extension_manager(vscode_catalog(), platform, ExtensionSettings::default());

    manager
        .uninstall(&PackageInfo::extension("some.extension", "Unknown"))
        .await
        .unwrap();

    assert!(world.runs().is_empty());
    assert_eq!(world.probes(), 0);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_unknown_ide_type_rejected_when_configured() {
    let (platform, world) = FakePlatform::default().build();
    let settings = ExtensionSettings::default().with_unknown_ide_type(UnknownIdePolicy::Reject);
    let (manager, _rx) = extension_manager(vscode_catalog(), platform, settings);

    let err = manager
        .install(&PackageInfo::extension("some.extension", "Sublime"))
        .await
        .unwrap_err();

    assert!(matches!(
        install_error(&err),
        InstallError::UnsupportedExtensionType { ide_type } if ide_type == "Sublime"
    ));
    assert!(world.runs().is_empty());
}

#[tokio::test]
async fn test_missing_ide_type_option_is_unknown() {
    let (platform, world) = FakePlatform::default().build();
    let (manager, _rx) = extension_manager(vscode_catalog(), platform, ExtensionSettings::default());

    let result = manager
        .install(&PackageInfo::new("ms-python.python", Default::default()))
        .await
        .unwrap();

    assert_eq!(result.exit_code, None);
    assert!(world.runs().is_empty());
}

#[tokio::test]
async fn test_self_heal_links_shim_from_installed_app() {
    let (platform, world) = FakePlatform {
        command_present: false,
        ..FakePlatform::default()
    }
    .build();
    let (manager, mut rx) = extension_manager(vscode_catalog(), platform, ExtensionSettings::default());

    manager
        .install(&PackageInfo::extension("ms-python.python", "VSCode"))
        .await
        .unwrap();

    assert_eq!(
        world.links(),
        [(
            PathBuf::from(
                "/Applications/Visual Studio Code.app/Contents/Resources/app/bin/code"
            ),
            "code".to_string()
        )]
    );
    assert_eq!(world.runs(), ["code --install-extension ms-python.python"]);

    let logs = log_events(&drain(&mut rx));
    let lifecycle: Vec<_> = logs.iter().filter(|log| log.significant).collect();
    assert_eq!(lifecycle.len(), 2);
    assert_eq!(lifecycle[0].severity, LogSeverity::Warn);
    assert_eq!(lifecycle[1].severity, LogSeverity::Info);
    assert!(lifecycle.iter().all(|log| log.channel == CHANNEL));
}

#[tokio::test]
async fn test_self_heal_runs_on_every_call() {
    let (platform, world) = FakePlatform {
        command_present: false,
        link_makes_command_available: false,
        ..FakePlatform::default()
    }
    .build();
    let (manager, _rx) = extension_manager(vscode_catalog(), platform, ExtensionSettings::default());
    let package = PackageInfo::extension("ms-python.python", "VSCode");

    manager.install(&package).await.unwrap();
    manager.uninstall(&package).await.unwrap();

    assert_eq!(world.probes(), 2);
    assert_eq!(world.links().len(), 2);
    assert_eq!(
        world.runs(),
        [
            "code --install-extension ms-python.python",
            "code --uninstall-extension ms-python.python"
        ]
    );
}

#[tokio::test]
async fn test_self_heal_requires_installed_app() {
    let (platform, world) = FakePlatform {
        command_present: false,
        app_installed: false,
        ..FakePlatform::default()
    }
    .build();
    let (manager, _rx) = extension_manager(vscode_catalog(), platform, ExtensionSettings::default());

    let err = manager
        .install(&PackageInfo::extension("ms-python.python", "VSCode"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "VSCode was not installed.");
    assert!(matches!(
        install_error(&err),
        InstallError::PrerequisiteMissing { .. }
    ));
    assert!(world.links().is_empty());
    assert!(world.runs().is_empty());
}

#[tokio::test]
async fn test_self_heal_rejects_unsupported_mechanism() {
    let (platform, world) = FakePlatform {
        command_present: false,
        ..FakePlatform::default()
    }
    .build();
    let catalog = Arc::new(PackagesData::new(vec![vscode_base(AppType::Other(
        "pkg".to_string(),
    ))]));
    let (manager, _rx) = extension_manager(catalog, platform, ExtensionSettings::default());

    let err = manager
        .install(&PackageInfo::extension("ms-python.python", "VSCode"))
        .await
        .unwrap_err();

    assert!(matches!(
        install_error(&err),
        InstallError::UnsupportedMechanism { mechanism, .. } if mechanism == "pkg"
    ));
    assert_eq!(world.app_probes(), 0);
    assert!(world.runs().is_empty());
}

#[tokio::test]
async fn test_concurrent_installs_each_heal_and_run_once() {
    let (platform, world) = FakePlatform {
        command_present: false,
        link_makes_command_available: false,
        ..FakePlatform::default()
    }
    .build();
    let (manager, _rx) = extension_manager(vscode_catalog(), platform, ExtensionSettings::default());
    let packages = [
        PackageInfo::extension("ms-python.python", "VSCode"),
        PackageInfo::extension("rust-lang.rust-analyzer", "VSCode"),
        PackageInfo::extension("esbenp.prettier-vscode", "VSCode"),
    ];

    let results = join_all(packages.iter().map(|package| manager.install(package))).await;

    for (package, result) in packages.iter().zip(results) {
        assert_eq!(result.unwrap().name, package.name);
    }
    assert_eq!(world.links().len(), packages.len());
    let mut runs = world.runs();
    runs.sort();
    assert_eq!(
        runs,
        [
            "code --install-extension esbenp.prettier-vscode",
            "code --install-extension ms-python.python",
            "code --install-extension rust-lang.rust-analyzer",
        ]
    );
}

#[tokio::test]
async fn test_concurrent_install_and_uninstall_share_a_manager() {
    let (platform, world) = FakePlatform {
        command_present: false,
        ..FakePlatform::default()
    }
    .build();
    let (manager, _rx) = extension_manager(vscode_catalog(), platform, ExtensionSettings::default());
    let python = PackageInfo::extension("ms-python.python", "VSCode");
    let prettier = PackageInfo::extension("esbenp.prettier-vscode", "VSCode");

    let (installed, uninstalled) =
        futures::join!(manager.install(&python), manager.uninstall(&prettier));

    installed.unwrap();
    uninstalled.unwrap();
    assert!(!world.links().is_empty());
    assert_eq!(world.runs().len(), 2);
}

#[tokio::test]
async fn test_unregistered_shim_skips_linking() {
    let (platform, world) = FakePlatform {
        command_present: false,
        ..FakePlatform::default()
    }
    .build();
    let (tx, mut rx) = devboot_events::channel();
    let manager = ExtensionManager::new(
        CHANNEL,
        vscode_catalog(),
        Arc::new(InstallCommandTable::new(Vec::new())),
        platform,
        Some(tx),
    )
    .with_os(Os::Darwin);

    let result = manager
        .install(&PackageInfo::extension("ms-python.python", "VSCode"))
        .await
        .unwrap();

    assert_eq!(result.exit_code, Some(0));
    assert!(world.links().is_empty());
    assert_eq!(world.runs(), ["code --install-extension ms-python.python"]);

    let logs = log_events(&drain(&mut rx));
    let lifecycle: Vec<_> = logs.iter().filter(|log| log.significant).collect();
    assert_eq!(lifecycle.len(), 2);
    assert!(lifecycle.iter().all(|log| log.severity == LogSeverity::Warn));
    assert!(lifecycle[1].text.contains("not linking"));
}

#[tokio::test]
async fn test_link_failure_is_an_io_error() {
    let (platform, world) = FakePlatform {
        command_present: false,
        link_error: Some(PlatformError::PermissionDenied {
            operation: "install_to_path".to_string(),
            message: "Permission denied (os error 13)".to_string(),
        }),
        ..FakePlatform::default()
    }
    .build();
    let (manager, _rx) = extension_manager(vscode_catalog(), platform, ExtensionSettings::default());

    let err = manager
        .install(&PackageInfo::extension("ms-python.python", "VSCode"))
        .await
        .unwrap_err();

    assert!(matches!(
        install_error(&err),
        InstallError::CommandLinkFailed { command, .. } if command == "code"
    ));
    assert_eq!(err.user_code(), Some("install.io"));
    assert!(world.runs().is_empty());
}

#[tokio::test]
async fn test_command_runs_without_reverification_by_default() {
    let (platform, world) = FakePlatform {
        command_present: false,
        link_makes_command_available: false,
        ..FakePlatform::default()
    }
    .build();
    let (manager, _rx) = extension_manager(vscode_catalog(), platform, ExtensionSettings::default());

    manager
        .install(&PackageInfo::extension("ms-python.python", "VSCode"))
        .await
        .unwrap();

    assert_eq!(world.probes(), 1);
    assert_eq!(world.runs().len(), 1);
}

#[tokio::test]
async fn test_reverification_after_heal() {
    let settings = ExtensionSettings::default().with_reverify_after_heal(true);

    let (platform, world) = FakePlatform {
        command_present: false,
        link_makes_command_available: false,
        ..FakePlatform::default()
    }
    .build();
    let (unhealed, _rx) = extension_manager(vscode_catalog(), platform, settings);
    let err = unhealed
        .install(&PackageInfo::extension("ms-python.python", "VSCode"))
        .await
        .unwrap_err();
    assert!(matches!(
        install_error(&err),
        InstallError::CommandUnavailable { .. }
    ));
    assert!(world.runs().is_empty());

    let (platform, world) = FakePlatform {
        command_present: false,
        ..FakePlatform::default()
    }
    .build();
    let (healed, _rx) = extension_manager(vscode_catalog(), platform, settings);
    healed
        .install(&PackageInfo::extension("ms-python.python", "VSCode"))
        .await
        .unwrap();
    assert_eq!(world.probes(), 2);
    assert_eq!(world.runs().len(), 1);
}

#[tokio::test]
async fn test_output_chunks_are_forwarded_in_order() {
    let (platform, _world) = FakePlatform {
        output: vec![
            OutputChunk::stdout("Installing extensions...\n"),
            OutputChunk::stderr("(node) warning\n"),
            OutputChunk::stdout("Extension 'ms-python.python' was successfully installed.\n"),
        ],
        ..FakePlatform::default()
    }
    .build();
    let (manager, mut rx) = extension_manager(vscode_catalog(), platform, ExtensionSettings::default());

    manager
        .install(&PackageInfo::extension("ms-python.python", "VSCode"))
        .await
        .unwrap();

    let forwarded: Vec<_> = log_events(&drain(&mut rx))
        .into_iter()
        .filter(|log| !log.significant)
        .collect();
    let texts: Vec<_> = forwarded.iter().map(|log| log.text.as_str()).collect();
    assert_eq!(
        texts,
        [
            "Installing extensions...\n",
            "(node) warning\n",
            "Extension 'ms-python.python' was successfully installed.\n"
        ]
    );
    assert!(forwarded
        .iter()
        .all(|log| log.channel == CHANNEL && log.severity == LogSeverity::Log));
}

#[tokio::test]
async fn test_spawn_failure_is_logged_then_propagated() {
    let (platform, _world) = FakePlatform {
        spawn_error: Some("No such file or directory (os error 2)".to_string()),
        ..FakePlatform::default()
    }
    .build();
    let (manager, mut rx) = extension_manager(vscode_catalog(), platform, ExtensionSettings::default());

    let err = manager
        .install(&PackageInfo::extension("ms-python.python", "VSCode"))
        .await
        .unwrap_err();

    assert!(matches!(
        install_error(&err),
        InstallError::SpawnFailed { message, .. } if message.contains("os error 2")
    ));
    assert!(err.is_retryable());

    let events = drain(&mut rx);
    let errors: Vec<_> = log_events(&events)
        .into_iter()
        .filter(|log| log.severity == LogSeverity::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].text.contains("os error 2"));
    assert!(events.iter().any(|event| matches!(
        event,
        AppEvent::Package(PackageEvent::OperationFailed { failure, .. })
            if failure.code.as_deref() == Some("install.spawn")
    )));
}

#[tokio::test]
async fn test_nonzero_exit_is_reported_by_default() {
    let (platform, _world) = FakePlatform {
        exit: Some(1),
        ..FakePlatform::default()
    }
    .build();
    let (manager, _rx) = extension_manager(vscode_catalog(), platform, ExtensionSettings::default());
    let package = PackageInfo::extension("ms-python.python", "VSCode");

    let result = manager.install(&package).await.unwrap();
    assert_eq!(result.exit_code, Some(1));
    manager.uninstall(&package).await.unwrap();
}

#[tokio::test]
async fn test_nonzero_exit_rejected_when_configured() {
    let (platform, _world) = FakePlatform {
        exit: Some(1),
        ..FakePlatform::default()
    }
    .build();
    let settings = ExtensionSettings::default().with_exit_code_policy(ExitCodePolicy::Reject);
    let (manager, _rx) = extension_manager(vscode_catalog(), platform, settings);

    let err = manager
        .uninstall(&PackageInfo::extension("ms-python.python", "VSCode"))
        .await
        .unwrap_err();
    assert!(matches!(
        install_error(&err),
        InstallError::NonZeroExit { code: Some(1), .. }
    ));
}

#[tokio::test]
async fn test_lifecycle_events_bracket_the_operation() {
    let (platform, _world) = FakePlatform::default().build();
    let (manager, mut rx) = extension_manager(vscode_catalog(), platform, ExtensionSettings::default());

    manager
        .install(&PackageInfo::extension("ms-python.python", "VSCode"))
        .await
        .unwrap();

    let packages: Vec<_> = drain(&mut rx)
        .into_iter()
        .filter_map(|event| match event {
            AppEvent::Package(event) => Some(event),
            _ => None,
        })
        .collect();
    assert_eq!(packages.len(), 2);
    assert!(matches!(packages[0], PackageEvent::OperationStarted { .. }));
    assert!(matches!(
        packages[1],
        PackageEvent::OperationCompleted {
            exit_code: Some(0),
            ..
        }
    ));
}

#[tokio::test]
async fn test_package_events_are_correlated_by_package() {
    let (platform, _world) = FakePlatform::default().build();
    let (manager, mut rx) = extension_manager(vscode_catalog(), platform, ExtensionSettings::default());

    manager
        .install(&PackageInfo::extension("ms-python.python", "VSCode"))
        .await
        .unwrap();

    let mut package_metas = Vec::new();
    while let Ok(message) = rx.try_recv() {
        if matches!(message.event, AppEvent::Package(_)) {
            package_metas.push(message.meta);
        }
    }
    assert_eq!(package_metas.len(), 2);
    for meta in package_metas {
        assert_eq!(meta.correlation_id.as_deref(), Some("ms-python.python"));
        assert_eq!(meta.labels.get("manager").map(String::as_str), Some("extension"));
    }
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #[test]
    fn prop_unregistered_ide_type_is_a_silent_noop(
        name in "[a-z]{1,8}\\.[a-z]{1,8}",
        ide_type in "[A-Za-z]{0,10}".prop_filter("registered", |t| t != "VSCode"),
        command_present in any::<bool>(),
    ) {
        let (platform, world) = FakePlatform { command_present, ..FakePlatform::default() }.build();
        let (manager, mut rx) = extension_manager(vscode_catalog(), platform, ExtensionSettings::default());
        let package = PackageInfo::extension(name.clone(), ide_type);

        let result = block_on(manager.install(&package)).unwrap();
        block_on(manager.uninstall(&package)).unwrap();

        prop_assert_eq!(result.name, name);
        prop_assert_eq!(result.exit_code, None);
        prop_assert!(world.runs().is_empty());
        prop_assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn prop_present_command_never_heals(name in "[a-z]{1,8}\\.[a-z0-9-]{1,12}") {
        let (platform, world) = FakePlatform::default().build();
        let (manager, _rx) = extension_manager(
            Arc::new(PackagesData::default()),
            platform,
            ExtensionSettings::default(),
        );
        let package = PackageInfo::extension(name, "VSCode");

        block_on(manager.install(&package)).unwrap();
        block_on(manager.uninstall(&package)).unwrap();

        prop_assert!(world.links().is_empty());
        prop_assert_eq!(world.app_probes(), 0);
        prop_assert_eq!(world.runs().len(), 2);
    }

    #[test]
    fn prop_absent_command_without_catalog_entry_never_spawns(
        name in "[a-z]{1,8}\\.[a-z0-9-]{1,12}",
        uninstall in any::<bool>(),
    ) {
        let (platform, world) = FakePlatform { command_present: false, ..FakePlatform::default() }.build();
        let (manager, _rx) = extension_manager(
            Arc::new(PackagesData::default()),
            platform,
            ExtensionSettings::default(),
        );
        let package = PackageInfo::extension(name, "VSCode");

        let err = if uninstall {
            block_on(manager.uninstall(&package)).unwrap_err()
        } else {
            block_on(manager.install(&package)).unwrap_err()
        };

        let is_configuration_error = matches!(
            err.as_install(),
            Some(InstallError::AppInfoNotFound { .. })
        );
        prop_assert!(is_configuration_error);
        prop_assert!(world.runs().is_empty());
    }
}
