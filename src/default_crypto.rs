//! Provides a default software implementation for LoRaWAN's cryptographic functions.
use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::Aes128;
use cmac::Cmac as RustCmac;

use super::keys::*;
use crate::packet_length::crypto::AES_BLOCK_LEN;
use crate::Error;

pub type Cmac = RustCmac<Aes128>;

/// Provides a default implementation for build object for using the crypto functions.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultFactory;

impl CryptoFactory for DefaultFactory {
    type E = Aes128;
    type M = Cmac;

    fn new_enc(&self, key: &AES128) -> Result<Self::E, Error> {
        Aes128::new_from_slice(&key.0[..]).map_err(|_| Error::CipherInit)
    }

    fn new_mac(&self, key: &AES128) -> Result<Self::M, Error> {
        <Cmac as cmac::Mac>::new_from_slice(&key.0[..]).map_err(|_| Error::CipherInit)
    }
}

impl Encrypter for Aes128 {
    fn encrypt_block(&self, block: &mut [u8; AES_BLOCK_LEN]) {
        BlockEncrypt::encrypt_block(self, GenericArray::from_mut_slice(&mut block[..]));
    }
}

impl Mac for Cmac {
    fn input(&mut self, data: &[u8]) -> Result<(), Error> {
        cmac::Mac::update(self, data);
        Ok(())
    }

    fn result(self) -> Result<[u8; AES_BLOCK_LEN], Error> {
        let tag = cmac::Mac::finalize(self).into_bytes();
        let mut res = [0u8; AES_BLOCK_LEN];
        res.copy_from_slice(&tag[..]);
        Ok(res)
    }
}
