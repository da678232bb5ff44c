// [libs/domain/models/src/lib.rs]
/*!
 * =================================================================
 * APARATO: SHARED DOMAIN MODELS
 * CLASIFICACION: DOMAIN (ESTRATO L2)
 * RESPONSABILIDAD: TIPOS DE DATOS COMPARTIDOS ENTRE TODOS LOS ESTRATOS
 *
 * Every shared entity (device descriptor/session, energy reading,
 * room sensor state, thermostat configuration, asset record,
 * automation rule) plus the wire-message payload shapes live here so
 * that `fabric-infra-tapo-client`, `fabric-infra-polling`,
 * `fabric-infra-discovery`, and `fabric-domain-automation-engine` share
 * one vocabulary instead of redefining near-identical structs at each
 * crate boundary.
 * =================================================================
 */

pub mod asset;
pub mod device;
pub mod messages;
pub mod room;
pub mod rule;
pub mod thermostat;
pub mod topics;

pub use asset::{AssetRecord, AssetStatus, ServiceEntry};
pub use device::{
    DeviceDescriptor, DeviceInfo, DeviceSession, DriverKind, EnergyReading, EnergyUsage,
};
pub use room::{LightState, RoomId, RoomSensorState};
pub use rule::{AutomationRule, RuleAction, RuleCondition};
pub use thermostat::{ThermostatConfig, ThermostatMode, ThermostatStatus};
