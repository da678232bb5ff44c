// [libs/infra/discovery/src/lib.rs]
/*!
 * =================================================================
 * APARATO: ASSET DISCOVERY PROTOCOL
 * CLASIFICACION: INFRASTRUCTURE (ESTRATO L3)
 * RESPONSABILIDAD: ANUNCIO/CONSULTA UDP MULTICAST ENTRE NODOS
 *
 * A peer-to-peer protocol over UDP multicast: nodes announce
 * themselves, query for peers matching a filter, and answer queries
 * on behalf of their own local asset. `DiscoveryNode` is the single
 * entry point — it owns the socket, the asset table, and the four
 * fan-out channels (discovered/updated/lost/query-received) that
 * in-process listeners subscribe to.
 * =================================================================
 */

mod config;
mod events;
mod filter;
mod node;
mod socket;
mod table;

pub use config::DiscoveryConfig;
pub use events::{DiscoveryEvent, DiscoveryEvents};
pub use filter::QueryFilter;
pub use node::DiscoveryNode;
pub use table::AssetTable;

pub const MULTICAST_GROUP: std::net::Ipv4Addr = std::net::Ipv4Addr::new(239, 255, 42, 42);
pub const MULTICAST_PORT: u16 = 42424;
