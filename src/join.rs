//! Join-request and join-accept payloads.
//!
//! Both kinds are recognised by [`parse`](crate::parser::parse) so that frames
//! can be routed, but no codec exists for them: every operation fails with
//! [`Error::NotImplemented`].
use crate::data::MacPayloadBytes;
use crate::error::Error;
use crate::header::{MType, MHDR};
use crate::keys::{CryptoFactory, MIC};

macro_rules! unsupported_join_payload {
    (
        $(#[$outer:meta])*
        pub struct $type:ident => $mtype:expr;
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
        pub struct $type;

        impl $type {
            /// The message type this payload belongs to.
            pub const MTYPE: MType = $mtype;

            pub fn parse(_bytes: &[u8]) -> Result<$type, Error> {
                debug!("{} payload rejected", Self::MTYPE);
                Err(Error::NotImplemented(Self::MTYPE))
            }

            pub fn to_bytes(&self) -> Result<MacPayloadBytes, Error> {
                Err(Error::NotImplemented(Self::MTYPE))
            }

            pub fn compute_mic_with_factory<F: CryptoFactory, K: AsRef<[u8]>>(
                &self,
                _mhdr: MHDR,
                _key: K,
                _factory: &F,
            ) -> Result<MIC, Error> {
                Err(Error::NotImplemented(Self::MTYPE))
            }
        }
    };
}

unsupported_join_payload!(
    /// Placeholder for the payload of a join-request frame.
    pub struct JoinRequestPayload => MType::JoinRequest;
);

unsupported_join_payload!(
    /// Placeholder for the payload of a join-accept frame.
    pub struct JoinAcceptPayload => MType::JoinAccept;
);
