use crate::error::LoggerError;
use corral_domain::profile::RemoteLogConfig;
use opentelemetry::{KeyValue, global};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    trace::{SdkTracerProvider, TraceError},
};

/// A guard that shuts down the global remote-shipping provider on drop.
#[derive(Debug)]
pub struct RemoteShippingGuard {
    provider: SdkTracerProvider,
}

impl RemoteShippingGuard {
    /// Explicitly shuts down the provider.
    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for RemoteShippingGuard {
    fn drop(&mut self) {
        let _ = self.provider.shutdown();
    }
}

/// Installs an OTLP pipeline and sets it as the global tracer provider.
///
/// The exporter respects the standard OTEL environment variables
/// (`OTEL_EXPORTER_OTLP_ENDPOINT` and friends); an explicit endpoint in the
/// profile wins. Group, stream and retention from the profile are attached
/// as resource attributes so the collector can route the records.
///
/// # Errors
/// Returns [`LoggerError::InvalidConfiguration`] if `service_name` is empty.
/// Returns [`LoggerError::RemoteShipping`] if the pipeline fails to build.
pub fn init_remote_shipping(
    service_name: impl Into<String>,
    remote: &RemoteLogConfig,
) -> Result<RemoteShippingGuard, LoggerError> {
    let service_name = service_name.into();
    if service_name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "service_name cannot be empty".into(),
            context: None,
        });
    }

    let mut attributes = vec![KeyValue::new("service.name", service_name)];
    if let Some(group) = &remote.group {
        attributes.push(KeyValue::new("log.group", group.clone()));
    }
    if let Some(stream) = &remote.stream {
        attributes.push(KeyValue::new("log.stream", stream.clone()));
    }
    attributes.push(KeyValue::new("log.retention_days", i64::from(remote.retention_days)));

    let resource = Resource::builder_empty().with_attributes(attributes).build();

    let mut exporter_builder = opentelemetry_otlp::SpanExporter::builder().with_tonic();
    if let Some(endpoint) = &remote.endpoint {
        exporter_builder = exporter_builder.with_endpoint(endpoint.clone());
    }
    let exporter = exporter_builder.build().map_err(|source| LoggerError::RemoteShipping {
        source: TraceError::Other(Box::new(source)),
        context: Some("Failed to build OTLP exporter".into()),
    })?;

    let provider =
        SdkTracerProvider::builder().with_batch_exporter(exporter).with_resource(resource).build();

    global::set_tracer_provider(provider.clone());

    Ok(RemoteShippingGuard { provider })
}
