//! FRMPayload encryption and MIC computation for data frames.
//!
//! Both operations build 16-byte blocks that share one layout:
//!
//! ```text
//! | tag | 0x00 x4 | Dir | DevAddr (LE) | FCnt (32 bit, LE) | 0x00 | i / len(msg) |
//! ```
//!
//! The keystream uses tag `0x01` and a block counter starting at 1 in the last
//! byte, the MIC block `B0` uses tag `0x49` and the message length.
use crate::data::{DevAddr, FRMPayloadBuf};
use crate::error::{Error, Structure};
use crate::header::{Direction, MHDR};
use crate::keys::{CryptoFactory, Encrypter, Mac, AES128, MIC};
use crate::packet_length::crypto::{AES_BLOCK_LEN, KEYSTREAM_BLOCK_TAG, MIC_BLOCK_TAG};
use crate::packet_length::phy::mac::FRM_PAYLOAD_MAX_LEN;

#[cfg(feature = "default-crypto")]
use crate::default_crypto::DefaultFactory;

/// Rebuilds the full 32-bit frame counter from the caller's last known counter
/// and the 16 bits transmitted in the FHDR.
///
/// The upper half comes from `last_fcnt`, the lower half from `fcnt`. Tracking
/// roll-overs of the lower half is left to the caller.
pub fn compute_fcnt(last_fcnt: u32, fcnt: u16) -> u32 {
    ((last_fcnt >> 16) << 16) ^ u32::from(fcnt)
}

fn generate_helper_block(
    first: u8,
    direction: Direction,
    dev_addr: DevAddr,
    fcnt: u32,
    res: &mut [u8; AES_BLOCK_LEN],
) {
    res[0] = first;
    // res[1..5] are 0
    res[5] = direction.as_byte();
    res[6..10].copy_from_slice(&dev_addr.to_le_bytes());
    res[10..14].copy_from_slice(&fcnt.to_le_bytes());
    // res[14] is 0
    // res[15] is to be set later
}

/// XORs `data` in place with the keystream `S_1 | S_2 | ...`.
///
/// `data` must not exceed 255 blocks; the public entry points limit it to
/// [`FRM_PAYLOAD_MAX_LEN`].
pub(crate) fn encrypt_frm_data_payload<E: Encrypter>(
    data: &mut [u8],
    direction: Direction,
    dev_addr: DevAddr,
    fcnt: u32,
    aes_enc: &E,
) {
    let mut a = [0u8; AES_BLOCK_LEN];
    generate_helper_block(KEYSTREAM_BLOCK_TAG, direction, dev_addr, fcnt, &mut a);

    for (i, chunk) in data.chunks_mut(AES_BLOCK_LEN).enumerate() {
        a[15] = (i + 1) as u8;
        let mut s = a;
        aes_enc.encrypt_block(&mut s);
        chunk.iter_mut().zip(s.iter()).for_each(|(d, k)| *d ^= k);
    }
}

/// Computes the data MIC over the concatenation of `msg_parts`.
pub(crate) fn calculate_data_mic<M: Mac>(
    msg_parts: &[&[u8]],
    direction: Direction,
    dev_addr: DevAddr,
    fcnt: u32,
    mac: M,
) -> Result<MIC, Error> {
    let msg_len: usize = msg_parts.iter().map(|p| p.len()).sum();
    let len = u8::try_from(msg_len).map_err(|_| Error::TooLong {
        structure: Structure::MicInput,
        max: u8::MAX as usize,
        actual: msg_len,
    })?;

    let mut b0 = [0u8; AES_BLOCK_LEN];
    generate_helper_block(MIC_BLOCK_TAG, direction, dev_addr, fcnt, &mut b0);
    b0[15] = len;

    let mut cipher = mac;
    cipher.input(&b0)?;
    for part in msg_parts {
        cipher.input(part)?;
    }
    let result = cipher.result()?;

    let mut mic = [0u8; 4];
    mic.copy_from_slice(&result[0..4]);
    Ok(MIC(mic))
}

pub(crate) fn crypt_with_full_fcnt<F: CryptoFactory>(
    factory: &F,
    key: &[u8],
    data: &[u8],
    direction: Direction,
    dev_addr: DevAddr,
    fcnt: u32,
) -> Result<FRMPayloadBuf, Error> {
    let key = AES128::try_from(key)?;
    let mut res = FRMPayloadBuf::from_slice(data).map_err(|_| Error::TooLong {
        structure: Structure::FRMPayload,
        max: FRM_PAYLOAD_MAX_LEN,
        actual: data.len(),
    })?;
    let aes_enc = factory.new_enc(&key).map_err(|e| {
        warn!("cipher setup failed: {}", e);
        e
    })?;
    encrypt_frm_data_payload(&mut res, direction, dev_addr, fcnt, &aes_enc);
    Ok(res)
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn data_mic_with_full_fcnt<F: CryptoFactory>(
    factory: &F,
    key: &[u8],
    mhdr: MHDR,
    fhdr: &[u8],
    f_port: Option<u8>,
    frm_payload: &[u8],
    dev_addr: DevAddr,
    fcnt: u32,
) -> Result<MIC, Error> {
    let mtype = mhdr.mtype();
    let direction = mtype.direction().ok_or(Error::UnsupportedDirection(mtype))?;
    let key = AES128::try_from(key)?;
    let mac = factory.new_mac(&key).map_err(|e| {
        warn!("CMAC setup failed: {}", e);
        e
    })?;

    let mhdr_byte = [mhdr.to_byte()];
    match f_port {
        Some(port) => calculate_data_mic(
            &[&mhdr_byte, fhdr, &[port], frm_payload],
            direction,
            dev_addr,
            fcnt,
            mac,
        ),
        None => {
            calculate_data_mic(&[&mhdr_byte, fhdr, frm_payload], direction, dev_addr, fcnt, mac)
        }
    }
}

/// Encrypts or decrypts an FRMPayload.
///
/// The operation is its own inverse: applying it twice with the same
/// arguments gives back the input. The 16-bit `fcnt` is zero-extended to 32
/// bits.
///
/// # Errors
///
/// * [`Error::InvalidKey`] if `key` is not 16 bytes long.
/// * [`Error::TooLong`] if `data` exceeds [`FRM_PAYLOAD_MAX_LEN`].
/// * [`Error::CipherInit`] if the factory can not create the cipher.
pub fn crypt_frm_payload_with_factory<F: CryptoFactory, K: AsRef<[u8]>>(
    factory: &F,
    key: K,
    data: &[u8],
    direction: Direction,
    dev_addr: DevAddr,
    fcnt: u16,
) -> Result<FRMPayloadBuf, Error> {
    crypt_with_full_fcnt(factory, key.as_ref(), data, direction, dev_addr, u32::from(fcnt))
}

/// Encrypts or decrypts an FRMPayload using the [`DefaultFactory`].
///
/// # Examples
///
/// ```
/// use lorawan_frame::data::DevAddr;
/// use lorawan_frame::header::Direction;
/// use lorawan_frame::securityhelpers::crypt_frm_payload;
///
/// let key = [0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09,
///     0xcf, 0x4f, 0x3c];
/// let encrypted =
///     crypt_frm_payload(key, b"hello", Direction::Uplink, DevAddr::new(0x26011bda), 7).unwrap();
/// let decrypted =
///     crypt_frm_payload(key, &encrypted, Direction::Uplink, DevAddr::new(0x26011bda), 7).unwrap();
/// assert_eq!(&decrypted[..], b"hello");
/// ```
#[cfg(feature = "default-crypto")]
#[cfg_attr(docsrs, doc(cfg(feature = "default-crypto")))]
pub fn crypt_frm_payload<K: AsRef<[u8]>>(
    key: K,
    data: &[u8],
    direction: Direction,
    dev_addr: DevAddr,
    fcnt: u16,
) -> Result<FRMPayloadBuf, Error> {
    crypt_frm_payload_with_factory(&DefaultFactory, key, data, direction, dev_addr, fcnt)
}

/// Computes the MIC of a data frame from its parts.
///
/// The MIC covers `MHDR | FHDR | FPort | FRMPayload`, prefixed by the `B0`
/// block. The direction is taken from the message type of `mhdr` and the
/// 16-bit `fcnt` is zero-extended to 32 bits.
///
/// # Errors
///
/// * [`Error::UnsupportedDirection`] unless `mhdr` is one of the four data
///   message types.
/// * [`Error::InvalidKey`] if `key` is not 16 bytes long.
/// * [`Error::TooLong`] if the message exceeds 255 bytes.
/// * [`Error::CipherInit`] and [`Error::IntegrityComputation`] from the backend.
#[allow(clippy::too_many_arguments)]
pub fn compute_data_mic_with_factory<F: CryptoFactory, K: AsRef<[u8]>>(
    factory: &F,
    mhdr: MHDR,
    fhdr: &[u8],
    f_port: Option<u8>,
    frm_payload: &[u8],
    key: K,
    dev_addr: DevAddr,
    fcnt: u16,
) -> Result<MIC, Error> {
    data_mic_with_full_fcnt(
        factory,
        key.as_ref(),
        mhdr,
        fhdr,
        f_port,
        frm_payload,
        dev_addr,
        u32::from(fcnt),
    )
}

/// Computes the MIC of a data frame from its parts using the [`DefaultFactory`].
///
/// # Examples
///
/// ```
/// use lorawan_frame::data::DevAddr;
/// use lorawan_frame::header::{MType, MHDR};
/// use lorawan_frame::keys::MIC;
/// use lorawan_frame::securityhelpers::compute_data_mic;
///
/// let fhdr = [0x04, 0x03, 0x02, 0x01, 0x80, 0x01, 0x00];
/// let mic = compute_data_mic(
///     MHDR::from(MType::UnconfirmedDataUp),
///     &fhdr,
///     Some(1),
///     &[0xa6, 0x94, 0x64, 0x26, 0x15],
///     [2; 16],
///     DevAddr::new(0x01020304),
///     1,
/// );
/// assert_eq!(mic, Ok(MIC([0xd6, 0xc3, 0xb5, 0x82])));
/// ```
#[cfg(feature = "default-crypto")]
#[cfg_attr(docsrs, doc(cfg(feature = "default-crypto")))]
pub fn compute_data_mic<K: AsRef<[u8]>>(
    mhdr: MHDR,
    fhdr: &[u8],
    f_port: Option<u8>,
    frm_payload: &[u8],
    key: K,
    dev_addr: DevAddr,
    fcnt: u16,
) -> Result<MIC, Error> {
    compute_data_mic_with_factory(
        &DefaultFactory,
        mhdr,
        fhdr,
        f_port,
        frm_payload,
        key,
        dev_addr,
        fcnt,
    )
}
