// [libs/infra/polling/src/lib.rs]
/*!
 * =================================================================
 * APARATO: POLLING SERVICE
 * CLASIFICACION: INFRASTRUCTURE (ESTRATO L3)
 * RESPONSABILIDAD: SUPERVISAR N CLIENTES TAPO CONCURRENTES
 *
 * Drives many `fabric-infra-tapo-client` sessions concurrently: one
 * poller task per device, each a single owner of its `DeviceSession`
 * so the sequence-number invariant never needs a lock across an I/O
 * await point. `PollingService` is the single entry
 * point; `poller`/`sink`/`status` are implementation detail reachable
 * only through it.
 * =================================================================
 */

mod poller;
mod service;
mod sink;
mod status;

pub use poller::PollerCommand;
pub use service::PollingService;
pub use sink::{ReadingSink, TracingSink};
pub use status::DeviceStatus;
