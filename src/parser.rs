//! Provides types and methods for parsing LoRaWAN PHYPayloads.
//!
//! # Examples
//!
//! ```
//! use lorawan_frame::header::MType;
//! use lorawan_frame::parser::{parse, MacPayload};
//!
//! let data = [0x40, 0x04, 0x03, 0x02, 0x01, 0x80, 0x01, 0x00, 0x01, 0xa6, 0x94, 0x64, 0x26,
//!     0x15, 0xd6, 0xc3, 0xb5, 0x82];
//! let phy = parse(&data).unwrap();
//! assert_eq!(phy.mhdr().mtype(), MType::UnconfirmedDataUp);
//! if let MacPayload::Data(data_payload) = phy.mac_payload() {
//!     assert_eq!(data_payload.fhdr().fcnt(), 1);
//! }
//! assert_eq!(&phy.to_bytes().unwrap()[..], &data[..]);
//! ```
use crate::data::{DataPayload, FRMPayloadBuf, MacPayloadBytes};
use crate::error::{Error, Structure};
use crate::header::{MType, Major, MHDR};
use crate::join::{JoinAcceptPayload, JoinRequestPayload};
use crate::keys::{CryptoFactory, MIC};
use crate::packet_length::phy::{MHDR_LEN, MIC_LEN, PHY_PAYLOAD_MAX_LEN, PHY_PAYLOAD_MIN_LEN};

#[cfg(feature = "default-crypto")]
use crate::default_crypto::DefaultFactory;

/// Encoded PHYPayload.
pub type PhyPayloadBytes = heapless::Vec<u8, PHY_PAYLOAD_MAX_LEN>;

/// Behaviour shared by every kind of MAC payload.
pub trait SerializableMacPayload {
    /// The message type the payload is carried under.
    fn mtype_matches(&self, mtype: MType) -> bool;

    fn serialize(&self) -> Result<MacPayloadBytes, Error>;

    /// Computes the MIC of the frame made of `mhdr` and this payload.
    fn compute_mic_with_factory<F: CryptoFactory, K: AsRef<[u8]>>(
        &self,
        mhdr: MHDR,
        key: K,
        factory: &F,
    ) -> Result<MIC, Error>;
}

impl SerializableMacPayload for DataPayload {
    fn mtype_matches(&self, mtype: MType) -> bool {
        mtype.is_data()
    }

    fn serialize(&self) -> Result<MacPayloadBytes, Error> {
        Ok(self.to_bytes())
    }

    fn compute_mic_with_factory<F: CryptoFactory, K: AsRef<[u8]>>(
        &self,
        mhdr: MHDR,
        key: K,
        factory: &F,
    ) -> Result<MIC, Error> {
        DataPayload::compute_mic_with_factory(self, mhdr, key, factory)
    }
}

impl SerializableMacPayload for JoinRequestPayload {
    fn mtype_matches(&self, mtype: MType) -> bool {
        mtype == Self::MTYPE
    }

    fn serialize(&self) -> Result<MacPayloadBytes, Error> {
        self.to_bytes()
    }

    fn compute_mic_with_factory<F: CryptoFactory, K: AsRef<[u8]>>(
        &self,
        mhdr: MHDR,
        key: K,
        factory: &F,
    ) -> Result<MIC, Error> {
        JoinRequestPayload::compute_mic_with_factory(self, mhdr, key, factory)
    }
}

impl SerializableMacPayload for JoinAcceptPayload {
    fn mtype_matches(&self, mtype: MType) -> bool {
        mtype == Self::MTYPE
    }

    fn serialize(&self) -> Result<MacPayloadBytes, Error> {
        self.to_bytes()
    }

    fn compute_mic_with_factory<F: CryptoFactory, K: AsRef<[u8]>>(
        &self,
        mhdr: MHDR,
        key: K,
        factory: &F,
    ) -> Result<MIC, Error> {
        JoinAcceptPayload::compute_mic_with_factory(self, mhdr, key, factory)
    }
}

/// MacPayload is the payload carried between the MHDR and the MIC.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum MacPayload {
    Data(DataPayload),
    JoinRequest(JoinRequestPayload),
    JoinAccept(JoinAcceptPayload),
}

impl SerializableMacPayload for MacPayload {
    fn mtype_matches(&self, mtype: MType) -> bool {
        match self {
            MacPayload::Data(p) => p.mtype_matches(mtype),
            MacPayload::JoinRequest(p) => p.mtype_matches(mtype),
            MacPayload::JoinAccept(p) => p.mtype_matches(mtype),
        }
    }

    fn serialize(&self) -> Result<MacPayloadBytes, Error> {
        match self {
            MacPayload::Data(p) => p.serialize(),
            MacPayload::JoinRequest(p) => p.serialize(),
            MacPayload::JoinAccept(p) => p.serialize(),
        }
    }

    fn compute_mic_with_factory<F: CryptoFactory, K: AsRef<[u8]>>(
        &self,
        mhdr: MHDR,
        key: K,
        factory: &F,
    ) -> Result<MIC, Error> {
        match self {
            MacPayload::Data(p) => {
                SerializableMacPayload::compute_mic_with_factory(p, mhdr, key, factory)
            }
            MacPayload::JoinRequest(p) => {
                SerializableMacPayload::compute_mic_with_factory(p, mhdr, key, factory)
            }
            MacPayload::JoinAccept(p) => {
                SerializableMacPayload::compute_mic_with_factory(p, mhdr, key, factory)
            }
        }
    }
}

impl From<DataPayload> for MacPayload {
    fn from(p: DataPayload) -> Self {
        MacPayload::Data(p)
    }
}

impl From<JoinRequestPayload> for MacPayload {
    fn from(p: JoinRequestPayload) -> Self {
        MacPayload::JoinRequest(p)
    }
}

impl From<JoinAcceptPayload> for MacPayload {
    fn from(p: JoinAcceptPayload) -> Self {
        MacPayload::JoinAccept(p)
    }
}

/// PhyPayload represents a complete LoRaWAN frame: `MHDR | MACPayload | MIC`.
///
/// A value always has an R1 header and a payload variant that matches the
/// header's message type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "SerdePhyPayload")
)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct PhyPayload {
    mhdr: MHDR,
    payload: MacPayload,
    mic: MIC,
}

impl PhyPayload {
    /// Assembles a frame from its parts without checking the MIC.
    ///
    /// # Errors
    ///
    /// * [`Error::UnsupportedVersion`] if the major version is not R1.
    /// * [`Error::PayloadMismatch`] if `payload` does not belong to the
    ///   message type of `mhdr`.
    pub fn new(mhdr: MHDR, payload: impl Into<MacPayload>, mic: MIC) -> Result<PhyPayload, Error> {
        if mhdr.major() != Major::LoRaWANR1 {
            return Err(Error::UnsupportedVersion { mhdr, mic });
        }
        let payload = payload.into();
        if !payload.mtype_matches(mhdr.mtype()) {
            return Err(Error::PayloadMismatch(mhdr.mtype()));
        }
        Ok(PhyPayload { mhdr, payload, mic })
    }

    /// Assembles a frame and computes its MIC with `key`.
    pub fn with_mic_and_factory<F: CryptoFactory, K: AsRef<[u8]>>(
        mhdr: MHDR,
        payload: impl Into<MacPayload>,
        key: K,
        factory: &F,
    ) -> Result<PhyPayload, Error> {
        let mut phy = PhyPayload::new(mhdr, payload, MIC::default())?;
        phy.mic = phy.calculate_mic_with_factory(key, factory)?;
        Ok(phy)
    }

    pub fn mhdr(&self) -> MHDR {
        self.mhdr
    }

    pub fn mac_payload(&self) -> &MacPayload {
        &self.payload
    }

    /// The data payload, if the frame is a data frame.
    pub fn data_payload(&self) -> Option<&DataPayload> {
        match &self.payload {
            MacPayload::Data(p) => Some(p),
            MacPayload::JoinRequest(_) | MacPayload::JoinAccept(_) => None,
        }
    }

    /// The MIC carried by the frame.
    pub fn mic(&self) -> MIC {
        self.mic
    }

    pub fn to_bytes(&self) -> Result<PhyPayloadBytes, Error> {
        let payload = self.payload.serialize()?;
        let mut res = PhyPayloadBytes::new();
        // 1 + 250 + 4 bytes always fit
        res.push(self.mhdr.to_byte()).map_err(|_| too_long(MHDR_LEN))?;
        res.extend_from_slice(&payload).map_err(|_| too_long(MHDR_LEN + payload.len()))?;
        res.extend_from_slice(&self.mic.0)
            .map_err(|_| too_long(MHDR_LEN + payload.len() + MIC_LEN))?;
        Ok(res)
    }

    /// Computes the MIC the frame should carry, zero-extending the counter.
    pub fn calculate_mic_with_factory<F: CryptoFactory, K: AsRef<[u8]>>(
        &self,
        key: K,
        factory: &F,
    ) -> Result<MIC, Error> {
        self.payload.compute_mic_with_factory(self.mhdr, key, factory)
    }

    /// Computes the MIC the frame should carry; the upper 16 bits of the
    /// counter are taken from `last_fcnt`.
    pub fn calculate_mic_with_fcnt_and_factory<F: CryptoFactory, K: AsRef<[u8]>>(
        &self,
        key: K,
        last_fcnt: u32,
        factory: &F,
    ) -> Result<MIC, Error> {
        match &self.payload {
            MacPayload::Data(p) => {
                p.compute_mic_with_fcnt_and_factory(self.mhdr, key, last_fcnt, factory)
            }
            payload => payload.compute_mic_with_factory(self.mhdr, key, factory),
        }
    }

    /// Checks the carried MIC against the one computed with `key`.
    pub fn validate_mic_with_factory<F: CryptoFactory, K: AsRef<[u8]>>(
        &self,
        key: K,
        factory: &F,
    ) -> Result<bool, Error> {
        let valid = self.calculate_mic_with_factory(key, factory)? == self.mic;
        if !valid {
            debug!("MIC mismatch for {}", self.mhdr.mtype());
        }
        Ok(valid)
    }

    pub fn validate_mic_with_fcnt_and_factory<F: CryptoFactory, K: AsRef<[u8]>>(
        &self,
        key: K,
        last_fcnt: u32,
        factory: &F,
    ) -> Result<bool, Error> {
        let valid = self.calculate_mic_with_fcnt_and_factory(key, last_fcnt, factory)? == self.mic;
        if !valid {
            debug!("MIC mismatch for {}", self.mhdr.mtype());
        }
        Ok(valid)
    }

    /// Decrypts the FRMPayload of a data frame.
    ///
    /// Use the AppSKey for FPort 1..=255 and the NwkSKey for FPort 0. Frames
    /// that are not data frames fail with [`Error::NotImplemented`].
    pub fn decrypt_frm_payload_with_factory<F: CryptoFactory, K: AsRef<[u8]>>(
        &self,
        key: K,
        factory: &F,
    ) -> Result<FRMPayloadBuf, Error> {
        self.decrypt_frm_payload_with_fcnt_and_factory(key, 0, factory)
    }

    pub fn decrypt_frm_payload_with_fcnt_and_factory<F: CryptoFactory, K: AsRef<[u8]>>(
        &self,
        key: K,
        last_fcnt: u32,
        factory: &F,
    ) -> Result<FRMPayloadBuf, Error> {
        let mtype = self.mhdr.mtype();
        let direction = mtype.direction().ok_or(Error::NotImplemented(mtype))?;
        match &self.payload {
            MacPayload::Data(p) => {
                p.crypt_with_fcnt_and_factory(key, direction, last_fcnt, factory)
            }
            MacPayload::JoinRequest(_) | MacPayload::JoinAccept(_) => {
                Err(Error::NotImplemented(mtype))
            }
        }
    }
}

#[cfg(feature = "default-crypto")]
#[cfg_attr(docsrs, doc(cfg(feature = "default-crypto")))]
impl PhyPayload {
    /// Assembles a frame and computes its MIC with `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use lorawan_frame::data::{DataPayload, DevAddr, FHDR};
    /// use lorawan_frame::header::{FCtrl, MType, MHDR};
    /// use lorawan_frame::parser::PhyPayload;
    ///
    /// let fhdr = FHDR::new(DevAddr::new(0x01020304), FCtrl::default(), 3, &[]).unwrap();
    /// let data = DataPayload::new(fhdr, None, &[]).unwrap();
    /// let phy = PhyPayload::with_mic(MType::UnconfirmedDataUp.into(), data, [2; 16]).unwrap();
    /// assert!(phy.validate_mic([2; 16]).unwrap());
    /// ```
    pub fn with_mic<K: AsRef<[u8]>>(
        mhdr: MHDR,
        payload: impl Into<MacPayload>,
        key: K,
    ) -> Result<PhyPayload, Error> {
        PhyPayload::with_mic_and_factory(mhdr, payload, key, &DefaultFactory)
    }

    pub fn calculate_mic<K: AsRef<[u8]>>(&self, key: K) -> Result<MIC, Error> {
        self.calculate_mic_with_factory(key, &DefaultFactory)
    }

    pub fn calculate_mic_with_fcnt<K: AsRef<[u8]>>(
        &self,
        key: K,
        last_fcnt: u32,
    ) -> Result<MIC, Error> {
        self.calculate_mic_with_fcnt_and_factory(key, last_fcnt, &DefaultFactory)
    }

    pub fn validate_mic<K: AsRef<[u8]>>(&self, key: K) -> Result<bool, Error> {
        self.validate_mic_with_factory(key, &DefaultFactory)
    }

    pub fn validate_mic_with_fcnt<K: AsRef<[u8]>>(
        &self,
        key: K,
        last_fcnt: u32,
    ) -> Result<bool, Error> {
        self.validate_mic_with_fcnt_and_factory(key, last_fcnt, &DefaultFactory)
    }

    pub fn decrypt_frm_payload<K: AsRef<[u8]>>(&self, key: K) -> Result<FRMPayloadBuf, Error> {
        self.decrypt_frm_payload_with_factory(key, &DefaultFactory)
    }

    pub fn decrypt_frm_payload_with_fcnt<K: AsRef<[u8]>>(
        &self,
        key: K,
        last_fcnt: u32,
    ) -> Result<FRMPayloadBuf, Error> {
        self.decrypt_frm_payload_with_fcnt_and_factory(key, last_fcnt, &DefaultFactory)
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct SerdePhyPayload {
    mhdr: MHDR,
    payload: MacPayload,
    mic: MIC,
}

#[cfg(feature = "serde")]
impl TryFrom<SerdePhyPayload> for PhyPayload {
    type Error = Error;

    fn try_from(value: SerdePhyPayload) -> Result<Self, Self::Error> {
        PhyPayload::new(value.mhdr, value.payload, value.mic)
    }
}

fn too_long(actual: usize) -> Error {
    Error::TooLong { structure: Structure::PhyPayload, max: PHY_PAYLOAD_MAX_LEN, actual }
}

/// Parses a PHYPayload.
///
/// The MIC is not validated; see [`PhyPayload::validate_mic`].
///
/// # Errors
///
/// * [`Error::TooShort`] for less than 5 bytes, or less than the data payload
///   needs.
/// * [`Error::TooLong`] for more than 255 bytes.
/// * [`Error::UnsupportedVersion`] if the major version is not R1. The error
///   carries the decoded MHDR and MIC.
/// * [`Error::NotImplemented`] for join-request and join-accept frames.
/// * [`Error::UnsupportedMessageType`] for RFU and proprietary frames.
/// * [`Error::TruncatedOptions`] from the FHDR.
pub fn parse(bytes: &[u8]) -> Result<PhyPayload, Error> {
    if bytes.len() < PHY_PAYLOAD_MIN_LEN {
        return Err(Error::TooShort {
            structure: Structure::PhyPayload,
            required: PHY_PAYLOAD_MIN_LEN,
            actual: bytes.len(),
        });
    }
    if bytes.len() > PHY_PAYLOAD_MAX_LEN {
        return Err(too_long(bytes.len()));
    }

    let mhdr = MHDR::from_byte(bytes[0]);
    let mic_start = bytes.len() - MIC_LEN;
    let mut mic = MIC::default();
    mic.0.copy_from_slice(&bytes[mic_start..]);
    if mhdr.major() != Major::LoRaWANR1 {
        warn!("unsupported major version {}", mhdr.major());
        return Err(Error::UnsupportedVersion { mhdr, mic });
    }

    let mac_payload = &bytes[MHDR_LEN..mic_start];
    let payload = match mhdr.mtype() {
        MType::UnconfirmedDataUp
        | MType::UnconfirmedDataDown
        | MType::ConfirmedDataUp
        | MType::ConfirmedDataDown => MacPayload::Data(DataPayload::parse(mac_payload)?),
        MType::JoinRequest => MacPayload::JoinRequest(JoinRequestPayload::parse(mac_payload)?),
        MType::JoinAccept => MacPayload::JoinAccept(JoinAcceptPayload::parse(mac_payload)?),
        mtype @ (MType::RFU | MType::Proprietary) => {
            debug!("dropping {} frame", mtype);
            return Err(Error::UnsupportedMessageType(mtype));
        }
    };
    trace!("parsed {} frame of {} bytes", mhdr.mtype(), bytes.len());

    Ok(PhyPayload { mhdr, payload, mic })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data::{DevAddr, FHDR};
    use crate::header::FCtrl;

    fn data_payload() -> DataPayload {
        let fhdr = FHDR::new(DevAddr::new(0xabcd1234), FCtrl::default(), 0x5602, &[]).unwrap();
        DataPayload::new(fhdr, Some(6), &[0x54, 0x54, 0x4e]).unwrap()
    }

    #[test]
    fn new_rejects_mismatched_payload() {
        let mhdr = MHDR::from(MType::JoinRequest);
        assert_eq!(
            PhyPayload::new(mhdr, data_payload(), MIC([0; 4])),
            Err(Error::PayloadMismatch(MType::JoinRequest))
        );
        assert_eq!(
            PhyPayload::new(MHDR::from(MType::UnconfirmedDataUp), JoinAcceptPayload, MIC([0; 4])),
            Err(Error::PayloadMismatch(MType::UnconfirmedDataUp))
        );
    }

    #[test]
    fn new_rejects_other_major_versions() {
        let mhdr = MHDR::new(MType::UnconfirmedDataUp, Major::RFU1);
        assert_eq!(
            PhyPayload::new(mhdr, data_payload(), MIC([1, 2, 3, 4])),
            Err(Error::UnsupportedVersion { mhdr, mic: MIC([1, 2, 3, 4]) })
        );
    }

    #[test]
    fn to_bytes_layout() {
        let phy = PhyPayload::new(
            MHDR::from(MType::ConfirmedDataDown),
            data_payload(),
            MIC([0xd5, 0x3f, 0x56, 0xad]),
        )
        .unwrap();
        assert_eq!(
            &phy.to_bytes().unwrap()[..],
            &[
                0xa0, 0x34, 0x12, 0xcd, 0xab, 0x00, 0x02, 0x56, 0x06, 0x54, 0x54, 0x4e, 0xd5, 0x3f,
                0x56, 0xad
            ][..]
        );
        assert_eq!(phy.data_payload(), Some(&data_payload()));
    }

    #[test]
    fn parse_too_short_and_too_long() {
        assert_eq!(
            parse(&[0x40, 0, 0, 0]),
            Err(Error::TooShort { structure: Structure::PhyPayload, required: 5, actual: 4 })
        );
        assert_eq!(parse(&[0x40; 256]), Err(too_long(256)));
    }

    #[test]
    fn parse_data_frame_needs_full_fhdr() {
        assert_eq!(
            parse(&[0x40, 1, 2, 3, 4, 5]),
            Err(Error::TooShort { structure: Structure::DataPayload, required: 7, actual: 1 })
        );
    }

    #[test]
    fn parse_reports_version_with_header_and_mic() {
        let bytes = [0x41, 0, 0, 0, 0, 0, 0, 0, 9, 8, 7, 6];
        assert_eq!(
            parse(&bytes),
            Err(Error::UnsupportedVersion {
                mhdr: MHDR::new(MType::UnconfirmedDataUp, Major::RFU1),
                mic: MIC([9, 8, 7, 6]),
            })
        );
    }

    #[test]
    fn parse_dispatch() {
        let mut bytes = [0u8; 12];
        for bits in 0..8u8 {
            bytes[0] = bits << 5;
            let mtype = MType::from_bits(bits);
            let res = parse(&bytes);
            match mtype {
                MType::JoinRequest | MType::JoinAccept => {
                    assert_eq!(res, Err(Error::NotImplemented(mtype)))
                }
                MType::RFU | MType::Proprietary => {
                    assert_eq!(res, Err(Error::UnsupportedMessageType(mtype)))
                }
                _ => assert_eq!(res.unwrap().mhdr().mtype(), mtype),
            }
        }
    }

    #[test]
    fn join_frames_can_not_be_serialized() {
        let phy =
            PhyPayload::new(MHDR::from(MType::JoinAccept), JoinAcceptPayload, MIC([0; 4])).unwrap();
        assert_eq!(phy.to_bytes(), Err(Error::NotImplemented(MType::JoinAccept)));
        assert_eq!(phy.data_payload(), None);
    }
}
