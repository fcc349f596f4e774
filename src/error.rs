//! Errors reported by the codecs and the cryptographic helpers.
use core::fmt;

use crate::header::{MType, MHDR};
use crate::keys::MIC;

/// The part of a frame an [`Error`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Structure {
    PhyPayload,
    DataPayload,
    FHDR,
    FOpts,
    FRMPayload,
    MicInput,
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Structure::PhyPayload => "PHYPayload",
            Structure::DataPayload => "MACPayload",
            Structure::FHDR => "FHDR",
            Structure::FOpts => "FOpts",
            Structure::FRMPayload => "FRMPayload",
            Structure::MicInput => "MIC input",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Error {
    /// The buffer is shorter than the smallest valid encoding of `structure`.
    TooShort { structure: Structure, required: usize, actual: usize },
    /// `structure` exceeds the largest size a LoRaWAN frame can carry.
    TooLong { structure: Structure, max: usize, actual: usize },
    /// FCtrl.FOptsLen announces more option bytes than the buffer holds.
    TruncatedOptions { declared: u8, available: usize },
    /// FCtrl.FOptsLen does not match the number of FOpts bytes of a
    /// deserialized FHDR.
    FOptsLenMismatch { declared: u8, actual: usize },
    /// The MHDR carries a major version other than LoRaWAN R1.
    ///
    /// The header and the MIC were decoded and are returned here; the MAC
    /// payload was not parsed.
    UnsupportedVersion { mhdr: MHDR, mic: MIC },
    /// The message type is RFU or proprietary.
    UnsupportedMessageType(MType),
    /// Join-request and join-accept payloads are recognised but have no codec.
    NotImplemented(MType),
    /// The key does not have the 16 bytes AES-128 requires.
    InvalidKey { len: usize },
    /// The crypto backend could not set up the block cipher or the CMAC.
    CipherInit,
    /// The crypto backend failed while computing the CMAC.
    IntegrityComputation,
    /// A MIC was requested for a message type that has no uplink/downlink
    /// direction.
    UnsupportedDirection(MType),
    /// More than 15 bytes of FOpts.
    FOptsTooLong { len: usize },
    /// A non-empty FRMPayload needs an FPort.
    FRMPayloadWithoutFPort,
    /// The MAC payload variant does not belong to the message type of the MHDR.
    PayloadMismatch(MType),
    /// MAC commands in FOpts can not be combined with FPort 0.
    MacCommandsInFOptsWithFPortZero,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TooShort { structure, required, actual } => {
                write!(f, "{structure} needs at least {required} bytes, got {actual}")
            }
            Error::TooLong { structure, max, actual } => {
                write!(f, "{structure} can be at most {max} bytes, got {actual}")
            }
            Error::TruncatedOptions { declared, available } => {
                write!(f, "FCtrl declares {declared} FOpts bytes, only {available} available")
            }
            Error::FOptsLenMismatch { declared, actual } => {
                write!(f, "FCtrl declares {declared} FOpts bytes, FOpts has {actual}")
            }
            Error::UnsupportedVersion { mhdr, .. } => {
                write!(f, "major version {:?} not supported", mhdr.major())
            }
            Error::UnsupportedMessageType(mtype) => {
                write!(f, "message type {mtype:?} not supported")
            }
            Error::NotImplemented(mtype) => write!(f, "{mtype:?} messages are not implemented"),
            Error::InvalidKey { len } => write!(f, "AES-128 key must be 16 bytes, got {len}"),
            Error::CipherInit => f.write_str("failed to initialize the block cipher"),
            Error::IntegrityComputation => f.write_str("failed to compute the CMAC"),
            Error::UnsupportedDirection(mtype) => {
                write!(f, "message type {mtype:?} is neither uplink nor downlink")
            }
            Error::FOptsTooLong { len } => write!(f, "FOpts can be at most 15 bytes, got {len}"),
            Error::FRMPayloadWithoutFPort => f.write_str("FRMPayload present without FPort"),
            Error::PayloadMismatch(mtype) => {
                write!(f, "MAC payload does not match message type {mtype:?}")
            }
            Error::MacCommandsInFOptsWithFPortZero => {
                f.write_str("FOpts must be empty when FPort is 0")
            }
        }
    }
}
