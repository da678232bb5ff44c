// [libs/infra/tapo-client/src/lib.rs]
/*!
 * =================================================================
 * APARATO: TAPO DEVICE CLIENT
 * CLASIFICACION: INFRASTRUCTURE (ESTRATO L3)
 * RESPONSABILIDAD: DRIVERS LEGACY Y KLAP TRAS UNA SOLA FACHADA
 *
 * Two interchangeable protocol drivers for TP-Link Tapo smart plugs
 *: Legacy (RSA handshake + base64 credentials + bearer
 * token) and KLAP (two-phase hash handshake + per-request AES-128-GCM).
 * Both are private modules; `client::TapoClient` is the only type
 * callers need.
 * =================================================================
 */

mod client;
mod errors;
mod klap;
mod legacy;

pub use client::{DeviceClient, TapoClient};
pub use errors::TapoError;
