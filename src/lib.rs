//! Reading, writing and protecting LoRaWAN data frames.
//!
//! The crate converts between the structured form of a LoRaWAN `PHYPayload`
//! and its exact wire bytes, and implements the two cryptographic operations a
//! data frame needs: FRMPayload encryption and MIC computation.
//!
//! Parsing never decrypts: it yields the FRMPayload as it was on the air.
//! Decryption and MIC checks are separate, explicit calls.
//!
//! # Examples
//!
//! ```
//! # #[cfg(feature = "default-crypto")]
//! # {
//! use lorawan_frame::parser::{parse, MacPayload};
//!
//! let data = [
//!     0x40, 0x04, 0x03, 0x02, 0x01, 0x80, 0x01, 0x00, 0x01, 0xa6, 0x94, 0x64, 0x26, 0x15,
//!     0xd6, 0xc3, 0xb5, 0x82,
//! ];
//! let phy = parse(&data).unwrap();
//! assert!(phy.validate_mic([2; 16]).unwrap());
//!
//! let plain = phy.decrypt_frm_payload([1; 16]).unwrap();
//! assert_eq!(&plain[..], b"hello");
//! if let MacPayload::Data(data) = phy.mac_payload() {
//!     assert_eq!(data.f_port(), Some(1));
//! }
//! # }
//! ```
#![no_std]
#![deny(rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub(crate) mod fmt;

pub mod creator;
pub mod data;
pub mod error;
pub mod header;
pub mod join;
pub mod keys;
pub mod packet_length;
pub mod parser;
pub mod securityhelpers;
pub mod string;

#[cfg(feature = "default-crypto")]
#[cfg_attr(docsrs, doc(cfg(feature = "default-crypto")))]
pub mod default_crypto;

pub use error::Error;
