//! Single-byte control fields: the MAC header (MHDR) and the frame control
//! byte (FCtrl).
//!
//! # Examples
//!
//! ```
//! use lorawan_frame::header::{FCtrl, MType, Major, MHDR};
//!
//! let mhdr = MHDR::from(0xa0);
//! assert_eq!(mhdr.mtype(), MType::ConfirmedDataDown);
//! assert_eq!(mhdr.major(), Major::LoRaWANR1);
//!
//! let fctrl = FCtrl { adr: true, ack: true, f_opts_len: 3, ..Default::default() };
//! assert_eq!(fctrl.to_byte(), 0xa3);
//! ```

/// MType gives the possible message types of the PhyPayload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum MType {
    JoinRequest,
    JoinAccept,
    UnconfirmedDataUp,
    UnconfirmedDataDown,
    ConfirmedDataUp,
    ConfirmedDataDown,
    RFU,
    Proprietary,
}

impl MType {
    /// Decodes the 3-bit message type. Only the lowest three bits are used.
    pub fn from_bits(bits: u8) -> MType {
        match bits & 0x07 {
            0 => MType::JoinRequest,
            1 => MType::JoinAccept,
            2 => MType::UnconfirmedDataUp,
            3 => MType::UnconfirmedDataDown,
            4 => MType::ConfirmedDataUp,
            5 => MType::ConfirmedDataDown,
            6 => MType::RFU,
            _ => MType::Proprietary,
        }
    }

    /// The 3-bit value of the message type.
    pub fn bits(self) -> u8 {
        match self {
            MType::JoinRequest => 0,
            MType::JoinAccept => 1,
            MType::UnconfirmedDataUp => 2,
            MType::UnconfirmedDataDown => 3,
            MType::ConfirmedDataUp => 4,
            MType::ConfirmedDataDown => 5,
            MType::RFU => 6,
            MType::Proprietary => 7,
        }
    }

    /// Gives the direction of a data message, `None` for all other types.
    pub fn direction(self) -> Option<Direction> {
        match self {
            MType::UnconfirmedDataUp | MType::ConfirmedDataUp => Some(Direction::Uplink),
            MType::UnconfirmedDataDown | MType::ConfirmedDataDown => Some(Direction::Downlink),
            MType::JoinRequest | MType::JoinAccept | MType::RFU | MType::Proprietary => None,
        }
    }

    /// Whether the message type carries a data MAC payload.
    pub fn is_data(self) -> bool {
        self.direction().is_some()
    }

    /// Whether the message type asks for an acknowledgement.
    pub fn is_confirmed(self) -> bool {
        matches!(self, MType::ConfirmedDataUp | MType::ConfirmedDataDown)
    }
}

/// Direction of a data frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Direction {
    /// End-device to network.
    Uplink,
    /// Network to end-device.
    Downlink,
}

impl Direction {
    /// The `Dir` byte of the `A_i` and `B0` blocks.
    pub fn as_byte(self) -> u8 {
        match self {
            Direction::Uplink => 0x00,
            Direction::Downlink => 0x01,
        }
    }

    pub fn is_downlink(self) -> bool {
        self == Direction::Downlink
    }
}

impl From<bool> for Direction {
    /// `true` means downlink.
    fn from(is_downlink: bool) -> Self {
        if is_downlink {
            Direction::Downlink
        } else {
            Direction::Uplink
        }
    }
}

/// Major gives the supported LoRaWAN payload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Major {
    LoRaWANR1,
    RFU1,
    RFU2,
    RFU3,
}

impl Major {
    /// Decodes the 2-bit major version. Only the lowest two bits are used.
    pub fn from_bits(bits: u8) -> Major {
        match bits & 0x03 {
            0 => Major::LoRaWANR1,
            1 => Major::RFU1,
            2 => Major::RFU2,
            _ => Major::RFU3,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            Major::LoRaWANR1 => 0,
            Major::RFU1 => 1,
            Major::RFU2 => 2,
            Major::RFU3 => 3,
        }
    }
}

/// MHDR represents LoRaWAN MHDR.
///
/// Bits 7..5 hold the message type and bits 1..0 the major version. Bits 4..2
/// are reserved; they are ignored when decoding and written as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct MHDR {
    mtype: MType,
    major: Major,
}

impl MHDR {
    pub fn new(mtype: MType, major: Major) -> MHDR {
        MHDR { mtype, major }
    }

    /// Decodes an MHDR byte. Decoding never fails; callers check
    /// [`major`](Self::major) and [`mtype`](Self::mtype) before using the
    /// rest of the frame.
    pub fn from_byte(byte: u8) -> MHDR {
        MHDR { mtype: MType::from_bits(byte >> 5), major: Major::from_bits(byte) }
    }

    /// Gives the binary representation of the MHDR.
    pub fn to_byte(&self) -> u8 {
        (self.mtype.bits() << 5) | self.major.bits()
    }

    /// Gives the type of message that PhyPayload is carrying.
    pub fn mtype(&self) -> MType {
        self.mtype
    }

    /// Gives the version of LoRaWAN payload format.
    pub fn major(&self) -> Major {
        self.major
    }
}

impl From<u8> for MHDR {
    fn from(v: u8) -> Self {
        MHDR::from_byte(v)
    }
}

impl From<MType> for MHDR {
    /// An R1 header for the given message type.
    fn from(mtype: MType) -> Self {
        MHDR::new(mtype, Major::LoRaWANR1)
    }
}

/// FCtrl represents the FCtrl from FHDR.
///
/// `f_opts_len` only uses its lowest four bits. When an FCtrl is placed into an
/// [`FHDR`](crate::data::FHDR) the value is replaced by the actual FOpts length.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct FCtrl {
    pub adr: bool,
    pub adr_ack_req: bool,
    pub ack: bool,
    /// Only meaningful on downlinks, always encoded.
    pub f_pending: bool,
    pub f_opts_len: u8,
}

impl FCtrl {
    pub fn from_byte(byte: u8) -> FCtrl {
        FCtrl {
            adr: byte & (1 << 7) != 0,
            adr_ack_req: byte & (1 << 6) != 0,
            ack: byte & (1 << 5) != 0,
            f_pending: byte & (1 << 4) != 0,
            f_opts_len: byte & 0x0f,
        }
    }

    /// Gives the binary representation of the FCtrl.
    pub fn to_byte(&self) -> u8 {
        u8::from(self.adr) << 7
            | u8::from(self.adr_ack_req) << 6
            | u8::from(self.ack) << 5
            | u8::from(self.f_pending) << 4
            | (self.f_opts_len & 0x0f)
    }

    pub fn set_ack(&mut self) -> &mut Self {
        self.ack = true;
        self
    }
}

impl From<u8> for FCtrl {
    fn from(v: u8) -> Self {
        FCtrl::from_byte(v)
    }
}
