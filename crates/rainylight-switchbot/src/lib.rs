//! SwitchBot cloud API integration for rainylight.
//!
//! Provides request signing and a device client for listing devices,
//! reading status and posting commands.

pub mod client;
pub mod error;
pub mod sign;
pub mod types;

pub use client::DeviceClient;
pub use error::{RemoteCommandError, SwitchBotError};
pub use sign::{sign, sign_at, Signature, SignedRequestHeaders};
pub use types::{
    CommandAck, Device, DeviceCommand, DeviceList, DeviceStatus, InfraredRemote, RawResponse, Rgb,
};
