//! Key material and the traits that abstract the crypto primitives.
use crate::packet_length::crypto::{AES_BLOCK_LEN, KEY_LEN};
use crate::Error;

macro_rules! lorawan_key {
    (
        $(#[$outer:meta])*
        pub struct $type:ident(AES128);
    ) => {
        $(#[$outer])*
        #[doc = concat!(
            "# Usage\n\n",
            "## Creating from a hex-encoded MSB string:\n",
            "```\n",
            "use lorawan_frame::keys::", stringify!($type), ";\n",
            "use core::str::FromStr;\n",
            "let key = ", stringify!($type), "::from_str(\"00112233445566778899aabbccddeeff\").unwrap();\n",
            "```\n\n",
            "## Creating from a byte array in MSB format:\n",
            "```\n",
            "use lorawan_frame::keys::", stringify!($type), ";\n",
            "let key = ", stringify!($type), "::from([\n",
            "    0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF\n",
            "]);\n",
            "```\n"
        )]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
        pub struct $type(pub(crate) AES128);

        impl $type {
            pub const fn byte_len() -> usize {
                KEY_LEN
            }

            pub fn inner(&self) -> &AES128 {
                &self.0
            }
        }

        impl From<[u8; KEY_LEN]> for $type {
            fn from(key: [u8; KEY_LEN]) -> Self {
                $type(AES128(key))
            }
        }

        impl From<AES128> for $type {
            fn from(key: AES128) -> Self {
                $type(key)
            }
        }

        impl AsRef<[u8]> for $type {
            fn as_ref(&self) -> &[u8] {
                &self.0 .0
            }
        }
    };
}

lorawan_key!(
    /// The [`AppSKey`] is an application session key (AES-128) specific to
    /// the end-device. It encrypts FRMPayloads sent on FPort 1..=255.
    pub struct AppSKey(AES128);
);

lorawan_key!(
    /// The [`NwkSKey`] is a network session key (AES-128) specific to the end-device.
    ///
    /// It computes the MIC of every data frame and encrypts FRMPayloads that
    /// carry MAC commands (FPort 0).
    pub struct NwkSKey(AES128);
);

/// [`AES128`] represents 128-bit AES key.
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct AES128(pub [u8; KEY_LEN]);

impl From<[u8; KEY_LEN]> for AES128 {
    fn from(v: [u8; KEY_LEN]) -> Self {
        AES128(v)
    }
}

impl TryFrom<&[u8]> for AES128 {
    type Error = Error;

    /// Fails with [`Error::InvalidKey`] unless `v` is exactly 16 bytes.
    fn try_from(v: &[u8]) -> Result<Self, Self::Error> {
        let key: [u8; KEY_LEN] = v.try_into().map_err(|_| Error::InvalidKey { len: v.len() })?;
        Ok(AES128(key))
    }
}

impl AsRef<[u8]> for AES128 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// [`MIC`] represents LoRaWAN message integrity code (MIC).
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash)]
pub struct MIC(pub [u8; 4]);

impl From<[u8; 4]> for MIC {
    fn from(v: [u8; 4]) -> Self {
        MIC(v)
    }
}

impl AsRef<[u8]> for MIC {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Trait for implementations of AES128 encryption.
pub trait Encrypter {
    fn encrypt_block(&self, block: &mut [u8; AES_BLOCK_LEN]);
}

/// Trait for implementations of CMAC (RFC4493).
///
/// Both methods may fail for backends that delegate to hardware; failures are
/// reported as [`Error::IntegrityComputation`].
pub trait Mac {
    fn input(&mut self, data: &[u8]) -> Result<(), Error>;
    fn result(self) -> Result<[u8; AES_BLOCK_LEN], Error>;
}

/// Represents an abstraction over the crypto functions.
///
/// This trait provides a way to pick a different implementation of the crypto primitives.
pub trait CryptoFactory {
    type E: Encrypter;
    type M: Mac;

    /// Method that creates an Encrypter.
    fn new_enc(&self, key: &AES128) -> Result<Self::E, Error>;

    /// Method that creates a MAC calculator.
    fn new_mac(&self, key: &AES128) -> Result<Self::M, Error>;
}

impl<F: CryptoFactory> CryptoFactory for &F {
    type E = F::E;
    type M = F::M;

    fn new_enc(&self, key: &AES128) -> Result<Self::E, Error> {
        (**self).new_enc(key)
    }

    fn new_mac(&self, key: &AES128) -> Result<Self::M, Error> {
        (**self).new_mac(key)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn aes128_from_slice_checks_length() {
        let bytes = [7u8; 17];
        assert_eq!(AES128::try_from(&bytes[..16]), Ok(AES128([7; 16])));
        assert_eq!(AES128::try_from(&bytes[..]), Err(Error::InvalidKey { len: 17 }));
        assert_eq!(AES128::try_from(&bytes[..3]), Err(Error::InvalidKey { len: 3 }));
    }

    #[test]
    fn session_keys_expose_raw_bytes() {
        let key = NwkSKey::from([2; 16]);
        assert_eq!(key.as_ref(), &[2u8; 16][..]);
        assert_eq!(key.inner(), &AES128([2; 16]));
        assert_eq!(NwkSKey::byte_len(), 16);
    }
}
