// [libs/shared/observability/src/lib.rs]
/*!
 * =================================================================
 * APARATO: OBSERVABILITY BOOTSTRAP
 * CLASIFICACION: SHARED UTILITY (ESTRATO L4)
 * RESPONSABILIDAD: INICIALIZACION DE TRAZADO Y CAPTURA DE PANICOS
 *
 * Every long-running task in the fabric (pollers, the discovery
 * receiver, the engine's room actors) may panic on a worker thread far
 * from `main`. This installs one global subscriber plus a panic hook
 * that routes the panic location and payload through the same
 * tracing pipeline, so a crashed task leaves a trace instead of a
 * silent thread death.
 * =================================================================
 */

use std::panic;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as fmt_layer, EnvFilter};

/// Initializes the global tracing subscriber for `service_name`.
///
/// Development builds get a compact, human-readable console layer;
/// release builds get flattened JSON suitable for ingestion by an
/// external log pipeline (shipping logs anywhere is out of scope for
/// this crate).
///
/// # Panics
/// Panics if a global subscriber has already been installed.
pub fn init_tracing(service_name: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if cfg!(debug_assertions) { "debug" } else { "info" };
        format!("{service_name}={level},reqwest=warn,rumqttc=warn").into()
    });

    if cfg!(debug_assertions) {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer::layer().compact().with_target(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer::layer().json().flatten_event(true))
            .init();
    }

    install_panic_hook(service_name);

    tracing::info!("observability initialized for {service_name}");
}

fn install_panic_hook(service_name: &str) {
    let service_name = service_name.to_string();

    panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_else(|| "unknown".to_string());

        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| panic_info.payload().downcast_ref::<String>().map(String::as_str))
            .unwrap_or("<non-string panic payload>");

        tracing::error!(
            target: "panic_monitor",
            service = %service_name,
            location = %location,
            "task panicked: {payload}"
        );
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_tracing_does_not_panic_on_first_call() {
        // Only one subscriber can be installed process-wide, so this
        // is deliberately the single test in the crate that calls it.
        init_tracing("fabric-observability-test");
    }
}
