//! Lengths of the LoRaWAN frame fields and the limits derived from them.
pub mod phy {
    pub const MHDR_LEN: usize = 1;
    pub const MIC_LEN: usize = 4;

    /// A LoRa radio frame carries at most 255 bytes.
    pub const PHY_PAYLOAD_MAX_LEN: usize = 255;
    pub const PHY_PAYLOAD_MIN_LEN: usize = MHDR_LEN + MIC_LEN;
    /// The smallest data frame: MHDR, FHDR without FOpts and MIC.
    pub const DATA_PHY_PAYLOAD_MIN_LEN: usize = MHDR_LEN + mac::MAC_PAYLOAD_MIN + MIC_LEN;

    pub const MAC_PAYLOAD_MAX_LEN: usize = PHY_PAYLOAD_MAX_LEN - MHDR_LEN - MIC_LEN;

    pub mod mac {
        pub const FPORT_LEN: usize = 1;
        pub mod fhdr {
            pub const DEV_ADDR_LEN: usize = 4;
            pub const FCTRL_LEN: usize = 1;
            pub const FCNT_LEN: usize = 2;
            pub const FOPTS_MIN_LEN: usize = 0;
            pub const FOPTS_MAX_LEN: usize = 15;

            pub const FHDR_MIN_LEN: usize = DEV_ADDR_LEN + FCTRL_LEN + FCNT_LEN + FOPTS_MIN_LEN;
            pub const FHDR_MAX_LEN: usize = DEV_ADDR_LEN + FCTRL_LEN + FCNT_LEN + FOPTS_MAX_LEN;
        }
        pub const MAC_PAYLOAD_MIN: usize = fhdr::FHDR_MIN_LEN;
        pub const FRM_PAYLOAD_MAX_LEN: usize =
            super::MAC_PAYLOAD_MAX_LEN - fhdr::FHDR_MIN_LEN - FPORT_LEN;
    }
}

pub mod crypto {
    pub const AES_BLOCK_LEN: usize = 16;
    pub const KEY_LEN: usize = 16;

    /// First byte of the `B0` block prepended to the MIC input.
    pub const MIC_BLOCK_TAG: u8 = 0x49;
    /// First byte of the `A_i` blocks that produce the FRMPayload keystream.
    pub const KEYSTREAM_BLOCK_TAG: u8 = 0x01;
}
