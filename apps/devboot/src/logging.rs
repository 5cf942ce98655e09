//! Structured logging integration for events
//!
//! Every event received from the installation layer is mirrored into the
//! tracing subscriber with structured fields, next to whatever the event
//! handler shows on the terminal.

use devboot_events::{
    AppEvent, EventMessage, GeneralEvent, LogSeverity, PackageEvent, PlatformEvent,
};
use tracing::{debug, error, info, trace, warn};

/// Log an event through tracing at a level matching the event
pub fn log_event_with_tracing(message: &EventMessage) {
    let meta = &message.meta;
    match &message.event {
        AppEvent::Log(log) => match log.severity {
            LogSeverity::Log => trace!(
                source = meta.source.as_str(),
                channel = %log.channel,
                bytes = log.text.len(),
                "subprocess output"
            ),
            LogSeverity::Info => info!(
                source = meta.source.as_str(),
                channel = %log.channel,
                significant = log.significant,
                "{}",
                log.text
            ),
            LogSeverity::Warn => warn!(
                source = meta.source.as_str(),
                channel = %log.channel,
                significant = log.significant,
                "{}",
                log.text
            ),
            LogSeverity::Error => error!(
                source = meta.source.as_str(),
                channel = %log.channel,
                significant = log.significant,
                "{}",
                log.text
            ),
        },

        AppEvent::Package(package_event) => match package_event {
            PackageEvent::OperationStarted {
                manager,
                package,
                operation,
            } => {
                debug!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    manager = %manager,
                    package = %package,
                    operation = %operation,
                    "Package operation started"
                );
            }
            PackageEvent::OperationCompleted {
                manager,
                package,
                operation,
                exit_code,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    manager = %manager,
                    package = %package,
                    operation = %operation,
                    exit_code = ?exit_code,
                    "Package operation completed"
                );
            }
            PackageEvent::OperationFailed {
                manager,
                package,
                operation,
                failure,
            } => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    manager = %manager,
                    package = %package,
                    operation = %operation,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Package operation failed"
                );
            }
        },

        AppEvent::Platform(platform_event) => match platform_event {
            PlatformEvent::OperationStarted { context } => {
                debug!(
                    source = meta.source.as_str(),
                    kind = ?context.kind,
                    operation = %context.operation,
                    target = ?context.target,
                    command = ?context.command.as_ref().map(|c| &c.program),
                    "Platform operation started"
                );
            }
            PlatformEvent::OperationCompleted { context, metrics } => {
                debug!(
                    source = meta.source.as_str(),
                    kind = ?context.kind,
                    operation = %context.operation,
                    target = ?context.target,
                    duration_ms = ?metrics.as_ref().and_then(|m| m.duration_ms),
                    exit_code = ?metrics.as_ref().and_then(|m| m.exit_code),
                    "Platform operation completed"
                );
            }
            PlatformEvent::OperationFailed {
                context,
                failure,
                metrics,
            } => {
                warn!(
                    source = meta.source.as_str(),
                    kind = ?context.kind,
                    operation = %context.operation,
                    target = ?context.target,
                    code = ?failure.code,
                    message = %failure.message,
                    duration_ms = ?metrics.as_ref().and_then(|m| m.duration_ms),
                    "Platform operation failed"
                );
            }
        },

        AppEvent::General(general_event) => match general_event {
            GeneralEvent::Warning { message, context } => {
                warn!(source = meta.source.as_str(), context = ?context, "{message}");
            }
            GeneralEvent::Error { message, details } => {
                error!(source = meta.source.as_str(), details = ?details, "{message}");
            }
            GeneralEvent::DebugLog { message, context } => {
                debug!(source = meta.source.as_str(), context = ?context, "{message}");
            }
            GeneralEvent::ConfigurationValidated { source, warnings } => {
                info!(
                    config_source = %source,
                    warnings = warnings.len(),
                    "Configuration validated"
                );
            }
        },
    }
}
