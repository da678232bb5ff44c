// [libs/shared/errors/src/lib.rs]
/*!
 * =================================================================
 * APARATO: SHARED ERROR TAXONOMY
 * CLASIFICACION: SHARED KERNEL (ESTRATO L4)
 * RESPONSABILIDAD: CLASIFICACION UNIFORME DE FALLOS ENTRE SUBSISTEMAS
 *
 * Every subsystem in the fabric (crypto, Tapo client, polling,
 * discovery, automation engine) tags its failures with the same
 * `{kind, severity, context, source}` shape so a caller several
 * layers up can triage without matching on subsystem-local error
 * enums. Leaf crates still define their own `thiserror` enums for
 * precise `match`ing close to the call site; `FabricError` is what
 * those enums convert into at a module boundary.
 * =================================================================
 */

use std::fmt;

/// Broad failure category, shared across every subsystem.
///
/// Kept deliberately small and closed (no `#[non_exhaustive]`) —
/// these seven kinds cover every failure category this fabric
/// produces and nothing else is expected to need its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Connection,
    Auth,
    Protocol,
    Device,
    Validation,
    Timeout,
    Service,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Connection => "connection",
            ErrorKind::Auth => "auth",
            ErrorKind::Protocol => "protocol",
            ErrorKind::Device => "device",
            ErrorKind::Validation => "validation",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Service => "service",
        };
        f.write_str(label)
    }
}

/// Operational severity. Drives whether a caller logs-and-continues,
/// surfaces to an external API, or treats the failure as fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        f.write_str(label)
    }
}

/// A tagged failure carrying a kind, a severity, human-readable
/// context, and an optional boxed cause.
#[derive(Debug)]
pub struct FabricError {
    kind: ErrorKind,
    severity: Severity,
    context: String,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl FabricError {
    pub fn new(kind: ErrorKind, severity: Severity, context: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            context: context.into(),
            source: None,
        }
    }

    pub fn with_source(
        mut self,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    /// Shorthand for a `Connection`-kind failure at `Medium` severity —
    /// the common case for a transient network hiccup the caller will
    /// retry on the next tick.
    pub fn connection(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::Connection, Severity::Medium, context)
    }

    pub fn auth(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::Auth, Severity::High, context)
    }

    pub fn protocol(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::Protocol, Severity::High, context)
    }

    pub fn device(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::Device, Severity::Medium, context)
    }

    pub fn validation(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, Severity::Low, context)
    }

    pub fn timeout(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, Severity::Medium, context)
    }

    pub fn service(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::Service, Severity::Low, context)
    }

    /// Fatal configuration or repeated-failure escalation, by default
    pub fn critical(kind: ErrorKind, context: impl Into<String>) -> Self {
        Self::new(kind, Severity::Critical, context)
    }
}

impl fmt::Display for FabricError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}/{}] {}", self.kind, self.severity, self.context)
    }
}

impl std::error::Error for FabricError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|boxed| boxed.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_severity() {
        let err = FabricError::connection("handshake timed out");
        let rendered = err.to_string();
        assert!(rendered.contains("connection"));
        assert!(rendered.contains("medium"));
        assert!(rendered.contains("handshake timed out"));
    }

    #[test]
    fn with_source_is_retrievable_via_error_trait() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err = FabricError::device("device poll failed").with_source(io_err);
        let source = std::error::Error::source(&err).expect("source present");
        assert_eq!(source.to_string(), "boom");
    }

    #[test]
    fn severity_ordering_supports_escalation_checks() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }
}
