//! Provides a builder for data frames.
//!
//! See [`DataPayloadCreator::build`] for an example.
use crate::data::{DataPayload, DevAddr, FHDR};
use crate::error::Error;
use crate::header::{FCtrl, MType, MHDR};
use crate::keys::{AppSKey, CryptoFactory, NwkSKey};
use crate::packet_length::phy::mac::fhdr::FOPTS_MAX_LEN;
use crate::parser::PhyPayload;
use crate::securityhelpers::crypt_with_full_fcnt;

/// DataPayloadCreator serves for creating data frames.
///
/// The frame starts as an unconfirmed uplink without port, options or
/// payload. The FRMPayload is encrypted with the [`AppSKey`] for FPort
/// 1..=255 and with the [`NwkSKey`] for FPort 0; the MIC is always computed
/// with the [`NwkSKey`].
///
/// # Example
///
/// ```
/// use lorawan_frame::creator::DataPayloadCreator;
/// use lorawan_frame::data::DevAddr;
/// use lorawan_frame::default_crypto::DefaultFactory;
/// use lorawan_frame::header::FCtrl;
/// use lorawan_frame::keys::{AppSKey, NwkSKey};
///
/// let nwk_skey = NwkSKey::from([2; 16]);
/// let app_skey = AppSKey::from([1; 16]);
/// let phy = DataPayloadCreator::new()
///     .set_confirmed(true)
///     .set_uplink(true)
///     .set_f_port(42)
///     .set_dev_addr(DevAddr::new(0x01020304))
///     .set_fctrl(FCtrl { adr: true, ..Default::default() })
///     .set_fcnt(76543)
///     .build(b"hello lora", &nwk_skey, &app_skey, &DefaultFactory)
///     .unwrap();
/// assert!(phy.validate_mic_with_fcnt(nwk_skey, 76543).unwrap());
/// assert_eq!(&phy.decrypt_frm_payload_with_fcnt(app_skey, 76543).unwrap()[..], b"hello lora");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPayloadCreator {
    confirmed: bool,
    uplink: bool,
    dev_addr: DevAddr,
    fctrl: FCtrl,
    fcnt: u32,
    f_port: Option<u8>,
    fopts: heapless::Vec<u8, FOPTS_MAX_LEN>,
}

impl Default for DataPayloadCreator {
    fn default() -> Self {
        DataPayloadCreator {
            confirmed: false,
            uplink: true,
            dev_addr: DevAddr::default(),
            fctrl: FCtrl::default(),
            fcnt: 0,
            f_port: None,
            fopts: heapless::Vec::new(),
        }
    }
}

impl DataPayloadCreator {
    /// Creates a creator for an unconfirmed uplink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the packet is uplink or downlink.
    pub fn set_uplink(&mut self, uplink: bool) -> &mut Self {
        self.uplink = uplink;
        self
    }

    /// Sets whether the packet is confirmed or unconfirmed.
    pub fn set_confirmed(&mut self, confirmed: bool) -> &mut Self {
        self.confirmed = confirmed;
        self
    }

    pub fn set_dev_addr(&mut self, dev_addr: DevAddr) -> &mut Self {
        self.dev_addr = dev_addr;
        self
    }

    /// Sets the FCtrl header. The FOptsLen is taken from the options passed
    /// to [`set_fopts`](Self::set_fopts).
    pub fn set_fctrl(&mut self, fctrl: FCtrl) -> &mut Self {
        self.fctrl = fctrl;
        self
    }

    /// Sets the full frame counter.
    ///
    /// NOTE: In the packet header the value will be truncated to u16.
    pub fn set_fcnt(&mut self, fcnt: u32) -> &mut Self {
        self.fcnt = fcnt;
        self
    }

    pub fn set_f_port(&mut self, f_port: u8) -> &mut Self {
        self.f_port = Some(f_port);
        self
    }

    /// Sets the MAC commands piggybacked in the FHDR.
    ///
    /// Fails with [`Error::FOptsTooLong`] for more than 15 bytes.
    pub fn set_fopts(&mut self, fopts: &[u8]) -> Result<&mut Self, Error> {
        self.fopts = heapless::Vec::from_slice(fopts)
            .map_err(|_| Error::FOptsTooLong { len: fopts.len() })?;
        Ok(self)
    }

    fn mtype(&self) -> MType {
        match (self.confirmed, self.uplink) {
            (false, true) => MType::UnconfirmedDataUp,
            (false, false) => MType::UnconfirmedDataDown,
            (true, true) => MType::ConfirmedDataUp,
            (true, false) => MType::ConfirmedDataDown,
        }
    }

    /// Encrypts `payload`, computes the MIC and returns the finished frame.
    ///
    /// # Errors
    ///
    /// * [`Error::FRMPayloadWithoutFPort`] if `payload` is not empty and no
    ///   port was set.
    /// * [`Error::MacCommandsInFOptsWithFPortZero`] if FOpts were set
    ///   together with port 0.
    /// * [`Error::TooLong`] if the frame does not fit into 255 bytes.
    pub fn build<F: CryptoFactory>(
        &self,
        payload: &[u8],
        nwk_skey: &NwkSKey,
        app_skey: &AppSKey,
        factory: &F,
    ) -> Result<PhyPayload, Error> {
        if self.f_port == Some(0) && !self.fopts.is_empty() {
            return Err(Error::MacCommandsInFOptsWithFPortZero);
        }
        if self.f_port.is_none() && !payload.is_empty() {
            return Err(Error::FRMPayloadWithoutFPort);
        }
        let mtype = self.mtype();
        let direction = mtype.direction().ok_or(Error::UnsupportedDirection(mtype))?;

        let enc_key: &[u8] = match self.f_port {
            Some(0) => nwk_skey.as_ref(),
            _ => app_skey.as_ref(),
        };
        let encrypted =
            crypt_with_full_fcnt(factory, enc_key, payload, direction, self.dev_addr, self.fcnt)?;

        let fhdr = FHDR::new(self.dev_addr, self.fctrl, self.fcnt as u16, &self.fopts)?;
        let data = DataPayload::new(fhdr, self.f_port, &encrypted)?;
        let mhdr = MHDR::from(mtype);
        let mic = data.compute_mic_with_fcnt_and_factory(mhdr, nwk_skey, self.fcnt, factory)?;
        trace!("built {} frame, fcnt {}", mtype, self.fcnt);

        PhyPayload::new(mhdr, data, mic)
    }
}
