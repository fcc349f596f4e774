//! The data MAC payload: `FHDR | [FPort] | [FRMPayload]`.
//!
//! # Examples
//!
//! ```
//! use lorawan_frame::data::{DataPayload, DevAddr, FHDR};
//! use lorawan_frame::header::FCtrl;
//!
//! let fhdr = FHDR::new(DevAddr::new(0x01020304), FCtrl::default(), 1, &[0x02]).unwrap();
//! let payload = DataPayload::new(fhdr, Some(1), b"hi").unwrap();
//! assert_eq!(
//!     &payload.to_bytes()[..],
//!     &[0x04, 0x03, 0x02, 0x01, 0x01, 0x01, 0x00, 0x02, 0x01, b'h', b'i']
//! );
//! assert_eq!(DataPayload::parse(&payload.to_bytes()), Ok(payload));
//! ```
use crate::error::{Error, Structure};
use crate::header::{Direction, FCtrl, MHDR};
use crate::keys::{CryptoFactory, MIC};
use crate::packet_length::phy::mac::fhdr::{DEV_ADDR_LEN, FHDR_MAX_LEN, FHDR_MIN_LEN, FOPTS_MAX_LEN};
use crate::packet_length::phy::mac::{FPORT_LEN, FRM_PAYLOAD_MAX_LEN};
use crate::packet_length::phy::MAC_PAYLOAD_MAX_LEN;
use crate::securityhelpers::{compute_fcnt, crypt_with_full_fcnt, data_mic_with_full_fcnt};

#[cfg(feature = "default-crypto")]
use crate::default_crypto::DefaultFactory;

/// Frame options, at most 15 bytes.
pub type FOptsBuf = heapless::Vec<u8, FOPTS_MAX_LEN>;
/// An FRMPayload, plain or encrypted.
pub type FRMPayloadBuf = heapless::Vec<u8, FRM_PAYLOAD_MAX_LEN>;
/// Encoded FHDR.
pub type FHDRBytes = heapless::Vec<u8, FHDR_MAX_LEN>;
/// Encoded data MAC payload.
pub type MacPayloadBytes = heapless::Vec<u8, MAC_PAYLOAD_MAX_LEN>;

/// DevAddr represents a 32-bit device address.
///
/// The value is the one printed in MSB order, e.g. `0x26011BDA`. On the air
/// the address is sent little-endian.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct DevAddr(u32);

impl DevAddr {
    pub const fn new(addr: u32) -> DevAddr {
        DevAddr(addr)
    }

    pub fn from_le_bytes(bytes: [u8; DEV_ADDR_LEN]) -> DevAddr {
        DevAddr(u32::from_le_bytes(bytes))
    }

    /// Wire representation of the address.
    pub fn to_le_bytes(self) -> [u8; DEV_ADDR_LEN] {
        self.0.to_le_bytes()
    }

    /// The 7 most significant bits.
    pub fn nwk_id(self) -> u8 {
        (self.0 >> 25) as u8
    }
}

impl From<u32> for DevAddr {
    fn from(v: u32) -> Self {
        DevAddr(v)
    }
}

impl From<DevAddr> for u32 {
    fn from(v: DevAddr) -> Self {
        v.0
    }
}

/// FHDR represents the frame header of a data MAC payload.
///
/// The FOptsLen nibble of `fctrl` always equals the number of FOpts bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "serde_types::SerdeFHDR")
)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct FHDR {
    dev_addr: DevAddr,
    fctrl: FCtrl,
    fcnt: u16,
    fopts: FOptsBuf,
}

impl FHDR {
    /// Creates an FHDR, updating the FOptsLen of `fctrl` to `fopts.len()`.
    ///
    /// Fails with [`Error::FOptsTooLong`] for more than 15 bytes of options.
    pub fn new(dev_addr: DevAddr, fctrl: FCtrl, fcnt: u16, fopts: &[u8]) -> Result<FHDR, Error> {
        let fopts =
            FOptsBuf::from_slice(fopts).map_err(|_| Error::FOptsTooLong { len: fopts.len() })?;
        let fctrl = FCtrl { f_opts_len: fopts.len() as u8, ..fctrl };
        Ok(FHDR { dev_addr, fctrl, fcnt, fopts })
    }

    /// Decodes the FHDR at the start of `bytes`; trailing bytes are ignored.
    pub fn parse(bytes: &[u8]) -> Result<FHDR, Error> {
        if bytes.len() < FHDR_MIN_LEN {
            return Err(Error::TooShort {
                structure: Structure::FHDR,
                required: FHDR_MIN_LEN,
                actual: bytes.len(),
            });
        }
        let dev_addr = DevAddr::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let fctrl = FCtrl::from_byte(bytes[4]);
        let fcnt = u16::from_le_bytes([bytes[5], bytes[6]]);

        let declared = fctrl.f_opts_len;
        let available = bytes.len() - FHDR_MIN_LEN;
        if usize::from(declared) > available {
            return Err(Error::TruncatedOptions { declared, available });
        }
        let fopts = &bytes[FHDR_MIN_LEN..FHDR_MIN_LEN + usize::from(declared)];
        let fopts =
            FOptsBuf::from_slice(fopts).map_err(|_| Error::FOptsTooLong { len: fopts.len() })?;

        Ok(FHDR { dev_addr, fctrl, fcnt, fopts })
    }

    pub fn dev_addr(&self) -> DevAddr {
        self.dev_addr
    }

    pub fn fctrl(&self) -> FCtrl {
        self.fctrl
    }

    /// The 16 bits of the frame counter that are transmitted.
    pub fn fcnt(&self) -> u16 {
        self.fcnt
    }

    /// MAC commands piggybacked in the header.
    pub fn fopts(&self) -> &[u8] {
        &self.fopts
    }

    /// Encoded length, between 7 and 22 bytes.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        FHDR_MIN_LEN + self.fopts.len()
    }

    /// Encodes into the start of `buf`, which must hold at least
    /// [`len`](Self::len) bytes.
    fn encode(&self, buf: &mut [u8]) -> usize {
        buf[0..4].copy_from_slice(&self.dev_addr.to_le_bytes());
        buf[4] = self.fctrl.to_byte();
        buf[5..7].copy_from_slice(&self.fcnt.to_le_bytes());
        buf[FHDR_MIN_LEN..self.len()].copy_from_slice(&self.fopts);
        self.len()
    }

    pub fn to_bytes(&self) -> FHDRBytes {
        let mut buf = [0u8; FHDR_MAX_LEN];
        let len = self.encode(&mut buf);
        buf[..len].iter().copied().collect()
    }
}

/// DataPayload represents the MAC payload of a data frame.
///
/// Invariants:
/// * a non-empty FRMPayload always comes with an FPort,
/// * the encoded size never exceeds 250 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "serde_types::SerdeDataPayload")
)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct DataPayload {
    fhdr: FHDR,
    f_port: Option<u8>,
    frm_payload: FRMPayloadBuf,
}

impl DataPayload {
    pub fn new(fhdr: FHDR, f_port: Option<u8>, frm_payload: &[u8]) -> Result<DataPayload, Error> {
        if f_port.is_none() && !frm_payload.is_empty() {
            return Err(Error::FRMPayloadWithoutFPort);
        }
        let len = fhdr.len() + f_port.map_or(0, |_| FPORT_LEN) + frm_payload.len();
        if len > MAC_PAYLOAD_MAX_LEN {
            return Err(Error::TooLong {
                structure: Structure::DataPayload,
                max: MAC_PAYLOAD_MAX_LEN,
                actual: len,
            });
        }
        // FHDR is at most 22 bytes, so the payload fits whenever the total does.
        let frm_payload = FRMPayloadBuf::from_slice(frm_payload).map_err(|_| Error::TooLong {
            structure: Structure::FRMPayload,
            max: FRM_PAYLOAD_MAX_LEN,
            actual: frm_payload.len(),
        })?;
        Ok(DataPayload { fhdr, f_port, frm_payload })
    }

    /// Decodes a data MAC payload.
    ///
    /// Any byte left after the FHDR is the FPort; the rest is the FRMPayload.
    pub fn parse(bytes: &[u8]) -> Result<DataPayload, Error> {
        if bytes.len() < FHDR_MIN_LEN {
            return Err(Error::TooShort {
                structure: Structure::DataPayload,
                required: FHDR_MIN_LEN,
                actual: bytes.len(),
            });
        }
        if bytes.len() > MAC_PAYLOAD_MAX_LEN {
            return Err(Error::TooLong {
                structure: Structure::DataPayload,
                max: MAC_PAYLOAD_MAX_LEN,
                actual: bytes.len(),
            });
        }
        let fhdr = FHDR::parse(bytes).map_err(|e| {
            debug!("invalid FHDR in data payload: {}", e);
            e
        })?;
        let (f_port, frm_payload) = match &bytes[fhdr.len()..] {
            [] => (None, &[][..]),
            [port, rest @ ..] => (Some(*port), rest),
        };
        trace!("data payload: fport {}, {} payload bytes", f_port, frm_payload.len());
        DataPayload::new(fhdr, f_port, frm_payload)
    }

    pub fn fhdr(&self) -> &FHDR {
        &self.fhdr
    }

    pub fn f_port(&self) -> Option<u8> {
        self.f_port
    }

    /// The FRMPayload as it is carried in the frame, usually encrypted.
    pub fn frm_payload(&self) -> &[u8] {
        &self.frm_payload
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.fhdr.len() + self.f_port.map_or(0, |_| FPORT_LEN) + self.frm_payload.len()
    }

    /// Encodes into the start of `buf`, which must hold at least
    /// [`len`](Self::len) bytes.
    pub(crate) fn encode(&self, buf: &mut [u8]) -> usize {
        let mut pos = self.fhdr.encode(buf);
        if let Some(port) = self.f_port {
            buf[pos] = port;
            pos += FPORT_LEN;
        }
        buf[pos..pos + self.frm_payload.len()].copy_from_slice(&self.frm_payload);
        pos + self.frm_payload.len()
    }

    pub fn to_bytes(&self) -> MacPayloadBytes {
        let mut buf = [0u8; MAC_PAYLOAD_MAX_LEN];
        let len = self.encode(&mut buf);
        buf[..len].iter().copied().collect()
    }

    /// Encrypts or decrypts the FRMPayload with the header's address and
    /// counter; the counter is zero-extended.
    pub fn crypt_with_factory<F: CryptoFactory, K: AsRef<[u8]>>(
        &self,
        key: K,
        direction: Direction,
        factory: &F,
    ) -> Result<FRMPayloadBuf, Error> {
        self.crypt_with_fcnt_and_factory(key, direction, 0, factory)
    }

    /// Like [`crypt_with_factory`](Self::crypt_with_factory), taking the upper
    /// 16 bits of the counter from `last_fcnt`.
    pub fn crypt_with_fcnt_and_factory<F: CryptoFactory, K: AsRef<[u8]>>(
        &self,
        key: K,
        direction: Direction,
        last_fcnt: u32,
        factory: &F,
    ) -> Result<FRMPayloadBuf, Error> {
        crypt_with_full_fcnt(
            factory,
            key.as_ref(),
            &self.frm_payload,
            direction,
            self.fhdr.dev_addr,
            compute_fcnt(last_fcnt, self.fhdr.fcnt),
        )
    }

    /// Computes the MIC of the frame made of `mhdr` and this payload. The
    /// counter is zero-extended.
    pub fn compute_mic_with_factory<F: CryptoFactory, K: AsRef<[u8]>>(
        &self,
        mhdr: MHDR,
        key: K,
        factory: &F,
    ) -> Result<MIC, Error> {
        self.compute_mic_with_fcnt_and_factory(mhdr, key, 0, factory)
    }

    pub fn compute_mic_with_fcnt_and_factory<F: CryptoFactory, K: AsRef<[u8]>>(
        &self,
        mhdr: MHDR,
        key: K,
        last_fcnt: u32,
        factory: &F,
    ) -> Result<MIC, Error> {
        data_mic_with_full_fcnt(
            factory,
            key.as_ref(),
            mhdr,
            &self.fhdr.to_bytes(),
            self.f_port,
            &self.frm_payload,
            self.fhdr.dev_addr,
            compute_fcnt(last_fcnt, self.fhdr.fcnt),
        )
    }
}

#[cfg(feature = "default-crypto")]
#[cfg_attr(docsrs, doc(cfg(feature = "default-crypto")))]
impl DataPayload {
    pub fn crypt<K: AsRef<[u8]>>(
        &self,
        key: K,
        direction: Direction,
    ) -> Result<FRMPayloadBuf, Error> {
        self.crypt_with_factory(key, direction, &DefaultFactory)
    }

    pub fn crypt_with_fcnt<K: AsRef<[u8]>>(
        &self,
        key: K,
        direction: Direction,
        last_fcnt: u32,
    ) -> Result<FRMPayloadBuf, Error> {
        self.crypt_with_fcnt_and_factory(key, direction, last_fcnt, &DefaultFactory)
    }

    pub fn compute_mic<K: AsRef<[u8]>>(&self, mhdr: MHDR, key: K) -> Result<MIC, Error> {
        self.compute_mic_with_factory(mhdr, key, &DefaultFactory)
    }

    pub fn compute_mic_with_fcnt<K: AsRef<[u8]>>(
        &self,
        mhdr: MHDR,
        key: K,
        last_fcnt: u32,
    ) -> Result<MIC, Error> {
        self.compute_mic_with_fcnt_and_factory(mhdr, key, last_fcnt, &DefaultFactory)
    }
}

/// Deserialization goes through the constructors so that decoded values
/// keep the invariants of [`FHDR`] and [`DataPayload`].
#[cfg(feature = "serde")]
mod serde_types {
    use super::*;

    #[derive(serde::Deserialize)]
    pub(super) struct SerdeFHDR {
        dev_addr: DevAddr,
        fctrl: FCtrl,
        fcnt: u16,
        fopts: FOptsBuf,
    }

    impl TryFrom<SerdeFHDR> for FHDR {
        type Error = Error;

        fn try_from(value: SerdeFHDR) -> Result<Self, Self::Error> {
            if usize::from(value.fctrl.f_opts_len) != value.fopts.len() {
                return Err(Error::FOptsLenMismatch {
                    declared: value.fctrl.f_opts_len,
                    actual: value.fopts.len(),
                });
            }
            FHDR::new(value.dev_addr, value.fctrl, value.fcnt, &value.fopts)
        }
    }

    #[derive(serde::Deserialize)]
    pub(super) struct SerdeDataPayload {
        fhdr: FHDR,
        f_port: Option<u8>,
        frm_payload: FRMPayloadBuf,
    }

    impl TryFrom<SerdeDataPayload> for DataPayload {
        type Error = Error;

        fn try_from(value: SerdeDataPayload) -> Result<Self, Self::Error> {
            DataPayload::new(value.fhdr, value.f_port, &value.frm_payload)
        }
    }
}
