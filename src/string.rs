//! Hex-string conversions for keys, device addresses and MICs.
//!
//! All values are written most significant byte first, the way network
//! servers print them.
#[cfg(feature = "with-to-string")]
use core::fmt;
use core::str::FromStr;

use crate::data::DevAddr;
use crate::keys::*;

pub use hex::FromHexError;

/// Writes `bytes` as lowercase hex without allocating.
#[cfg(feature = "with-to-string")]
fn write_hex<const N: usize>(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    let mut buf = [0u8; N];
    hex::encode_to_slice(bytes, &mut buf).map_err(|_| fmt::Error)?;
    f.write_str(core::str::from_utf8(&buf).map_err(|_| fmt::Error)?)
}

macro_rules! fixed_len_struct_impl_string_msb {
    (
        $type:ident, $size:expr;
    ) => {
        impl FromStr for $type {
            type Err = FromHexError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let mut res = [0; $size];
                hex::decode_to_slice(s.as_bytes(), &mut res)?;
                Ok(Self::from(res))
            }
        }

        #[cfg(feature = "with-to-string")]
        impl fmt::Display for $type {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write_hex::<{ $size * 2 }>(f, self.as_ref())
            }
        }
    };
}

fixed_len_struct_impl_string_msb! {
    AES128, 16;
}

fixed_len_struct_impl_string_msb! {
    AppSKey, 16;
}

fixed_len_struct_impl_string_msb! {
    NwkSKey, 16;
}

fixed_len_struct_impl_string_msb! {
    MIC, 4;
}

impl FromStr for DevAddr {
    type Err = FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut res = [0; 4];
        hex::decode_to_slice(s.as_bytes(), &mut res)?;
        Ok(DevAddr::new(u32::from_be_bytes(res)))
    }
}

#[cfg(feature = "with-to-string")]
impl fmt::Display for DevAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", u32::from(*self))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[cfg(feature = "with-to-string")]
    extern crate std;
    #[cfg(feature = "with-to-string")]
    use std::string::ToString;

    #[cfg(feature = "with-to-string")]
    #[test]
    fn test_appskey_to_string() {
        let appskey = AppSKey::from([
            0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef, 0xfd, 0xb9, 0x75, 0x31, 0x24, 0x68,
            0xac, 0xed,
        ]);
        assert_eq!(appskey.to_string(), "0123456789abcdeffdb975312468aced");
    }

    #[test]
    fn test_nwkskey_from_str() {
        let nwkskey = NwkSKey::from_str("00112233445566778899aabbccddeeff").unwrap();
        assert_eq!(
            nwkskey,
            NwkSKey::from([
                0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD,
                0xEE, 0xFF
            ])
        );
    }

    #[test]
    fn test_devaddr_from_str() {
        assert_eq!(DevAddr::from_str("26011BDA"), Ok(DevAddr::new(0x26011bda)));
    }

    #[cfg(feature = "with-to-string")]
    #[test]
    fn test_devaddr_to_string() {
        assert_eq!(DevAddr::new(0x0001_0203).to_string(), "00010203");
        assert_eq!(MIC([0xd6, 0xc3, 0xb5, 0x82]).to_string(), "d6c3b582");
    }

    #[test]
    fn test_mic_from_small_str() {
        assert_eq!(MIC::from_str("d6c3b"), Err(FromHexError::OddLength));
    }

    #[test]
    fn test_key_from_large_str() {
        let result = AES128::from_str("00112233445566778899aabbccddeeff00");
        assert_eq!(result, Err(FromHexError::InvalidStringLength));
    }
}
