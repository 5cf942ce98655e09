//! Subprocess runs whose output is forwarded to the log sink

use devboot_errors::{InstallError, PlatformError, UserFacingError};
use devboot_events::{
    AppEvent, EventEmitter, EventMeta, FailureContext, LogSeverity, LogSink, PackageEvent,
    PackageOperation,
};
use devboot_platform::{
    OutputChunk, PlatformCommand, PlatformContext, ProcessExit, ProcessOperations,
};

/// Run `cmd`, writing every output chunk to `channel` as it arrives.
pub(crate) async fn run_logged<S>(
    process: &dyn ProcessOperations,
    ctx: &PlatformContext,
    sink: &S,
    channel: &str,
    cmd: PlatformCommand,
) -> Result<ProcessExit, InstallError>
where
    S: LogSink + Sync + ?Sized,
{
    let command = cmd.to_string();
    let on_output = |chunk: OutputChunk| sink.write(channel, &chunk.text, false, LogSeverity::Log);

    process
        .run(ctx, cmd, &on_output)
        .await
        .map_err(|e| spawn_failed(&command, &e))
}

fn spawn_failed(command: &str, err: &PlatformError) -> InstallError {
    let message = match err {
        PlatformError::ProcessExecutionFailed { message, .. } => message.clone(),
        other => other.to_string(),
    };
    InstallError::SpawnFailed {
        command: command.to_string(),
        message,
    }
}

/// Emit the lifecycle event closing an operation; failures are also logged.
pub(crate) fn report_outcome<S, E>(
    sink: &S,
    manager: &str,
    channel: &str,
    package: &str,
    operation: PackageOperation,
    outcome: &Result<Option<i32>, E>,
) where
    S: EventEmitter + ?Sized,
    E: UserFacingError,
{
    let event = match outcome {
        Ok(exit_code) => PackageEvent::OperationCompleted {
            manager: manager.to_string(),
            package: package.to_string(),
            operation,
            exit_code: *exit_code,
        },
        Err(e) => {
            sink.write(channel, &e.user_message(), true, LogSeverity::Error);
            PackageEvent::OperationFailed {
                manager: manager.to_string(),
                package: package.to_string(),
                operation,
                failure: FailureContext::from_error(e),
            }
        }
    };
    emit_package_event(sink, manager, package, event);
}

pub(crate) fn report_started<S>(sink: &S, manager: &str, package: &str, operation: PackageOperation)
where
    S: EventEmitter + ?Sized,
{
    let event = PackageEvent::OperationStarted {
        manager: manager.to_string(),
        package: package.to_string(),
        operation,
    };
    emit_package_event(sink, manager, package, event);
}

/// Package events are correlated by package name and labelled with the manager.
fn emit_package_event<S>(sink: &S, manager: &str, package: &str, event: PackageEvent)
where
    S: EventEmitter + ?Sized,
{
    let event = AppEvent::Package(event);
    let meta = EventMeta::new(event.log_level(), event.event_source())
        .with_correlation_id(package)
        .with_label("manager", manager);
    sink.emit_with_meta(meta, event);
}
