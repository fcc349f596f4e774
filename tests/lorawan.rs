use lorawan_frame::data::{DataPayload, DevAddr, FHDR};
use lorawan_frame::error::Structure;
use lorawan_frame::header::{Direction, FCtrl, MType, Major, MHDR};
use lorawan_frame::join::{JoinAcceptPayload, JoinRequestPayload};
use lorawan_frame::keys::{AppSKey, NwkSKey, MIC};
use lorawan_frame::parser::{parse, MacPayload, PhyPayload, SerializableMacPayload};
use lorawan_frame::securityhelpers::{compute_data_mic, crypt_frm_payload};
use lorawan_frame::Error;

fn data_payload() -> Vec<u8> {
    vec![
        0x40, 0x04, 0x03, 0x02, 0x01, 0x80, 0x01, 0x00, 0x01, 0xa6, 0x94, 0x64, 0x26, 0x15, 0xd6,
        0xc3, 0xb5, 0x82,
    ]
}

fn test_key() -> [u8; 16] {
    [
        0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf, 0x4f,
        0x3c,
    ]
}

fn mic_fhdr() -> Vec<u8> {
    hex::decode("3412cdab000256").unwrap()
}

#[test]
fn test_fctrl_encoding() {
    let fctrl =
        FCtrl { adr: true, adr_ack_req: false, ack: true, f_pending: false, f_opts_len: 3 };
    assert_eq!(fctrl.to_byte(), 0xa3);
    let fctrl =
        FCtrl { adr: false, adr_ack_req: true, ack: false, f_pending: true, f_opts_len: 15 };
    assert_eq!(fctrl.to_byte(), 0x5f);
    assert_eq!(FCtrl::from_byte(0x5f), fctrl);
}

#[test]
fn test_fctrl_round_trip() {
    for byte in 0..=u8::MAX {
        assert_eq!(FCtrl::from_byte(byte).to_byte(), byte);
    }
}

#[test]
fn test_mhdr_round_trip() {
    for bits in 0..8u8 {
        for major in 0..4u8 {
            let byte = bits << 5 | major;
            let mhdr = MHDR::from_byte(byte);
            assert_eq!(mhdr.mtype(), MType::from_bits(bits));
            assert_eq!(mhdr.major(), Major::from_bits(major));
            assert_eq!(mhdr.to_byte(), byte);
        }
    }
}

#[test]
fn test_fhdr_serialization() {
    let fhdr = FHDR::new(DevAddr::new(2882343476), FCtrl::default(), 22018, &[]).unwrap();
    assert_eq!(&fhdr.to_bytes()[..], &mic_fhdr()[..]);
    assert_eq!(FHDR::parse(&fhdr.to_bytes()), Ok(fhdr));
}

#[test]
fn test_fhdr_with_options_round_trip() {
    let fctrl = FCtrl { adr: true, f_pending: true, ..Default::default() };
    let fhdr = FHDR::new(DevAddr::new(0x26011bda), fctrl, 0xffff, &[0x02; 15]).unwrap();
    let bytes = fhdr.to_bytes();
    assert_eq!(bytes.len(), 22);
    assert_eq!(bytes[4], 0x9f);
    assert_eq!(FHDR::parse(&bytes), Ok(fhdr));
}

#[test]
fn test_fhdr_truncated_options() {
    assert_eq!(
        FHDR::parse(&hex::decode("3412cdab030256aabb").unwrap()),
        Err(Error::TruncatedOptions { declared: 3, available: 2 })
    );
}

#[test]
fn test_data_payload_round_trip() {
    let fhdr = FHDR::new(DevAddr::new(0x01020304), FCtrl::default(), 7, &[0x03, 0x00]).unwrap();
    for (f_port, frm_payload) in
        [(None, &b""[..]), (Some(0), &b""[..]), (Some(1), &b"x"[..]), (Some(224), &[0u8; 200][..])]
    {
        let payload = DataPayload::new(fhdr.clone(), f_port, frm_payload).unwrap();
        assert_eq!(DataPayload::parse(&payload.to_bytes()), Ok(payload));
    }
}

#[test]
fn test_parse_data_payload() {
    let phy = parse(&data_payload()).unwrap();
    assert_eq!(phy.mhdr().mtype(), MType::UnconfirmedDataUp);
    assert_eq!(phy.mhdr().major(), Major::LoRaWANR1);
    assert_eq!(phy.mic(), MIC([0xd6, 0xc3, 0xb5, 0x82]));

    let data = match phy.mac_payload() {
        MacPayload::Data(data) => data,
        other => panic!("unexpected payload {other:?}"),
    };
    let fhdr = data.fhdr();
    assert_eq!(fhdr.dev_addr(), DevAddr::new(0x01020304));
    assert_eq!(fhdr.fcnt(), 1);
    assert!(fhdr.fopts().is_empty());
    assert!(fhdr.fctrl().adr);
    assert!(!fhdr.fctrl().ack);
    assert_eq!(data.f_port(), Some(1));
    assert_eq!(data.frm_payload(), &[0xa6, 0x94, 0x64, 0x26, 0x15]);
}

#[test]
fn test_validate_data_mic() {
    let phy = parse(&data_payload()).unwrap();
    let nwk_skey = NwkSKey::from([2; 16]);
    assert!(phy.validate_mic(nwk_skey).unwrap());
    assert!(!phy.validate_mic([3; 16]).unwrap());
    assert_eq!(phy.calculate_mic(nwk_skey), Ok(MIC([0xd6, 0xc3, 0xb5, 0x82])));
}

#[test]
fn test_validate_mic_with_full_counter() {
    let phy = parse(&data_payload()).unwrap();
    assert!(phy.validate_mic_with_fcnt([2; 16], 0x0000_ffff).unwrap());
    assert!(!phy.validate_mic_with_fcnt([2; 16], 0x0001_0000).unwrap());
}

#[test]
fn test_decrypt_frm_payload() {
    let phy = parse(&data_payload()).unwrap();
    let app_skey = AppSKey::from([1; 16]);
    assert_eq!(&phy.decrypt_frm_payload(app_skey).unwrap()[..], b"hello");
}

#[test]
fn test_phy_payload_round_trip() {
    let data = data_payload();
    assert_eq!(&parse(&data).unwrap().to_bytes().unwrap()[..], &data[..]);
}

#[test]
fn test_crypt_known_vector() {
    let plain = b"You look good, Lora";
    let encrypted =
        crypt_frm_payload(test_key(), plain, Direction::Downlink, DevAddr::new(2882400018), 43981)
            .unwrap();
    assert_eq!(hex::encode(&encrypted), "ec2a32af5556df4647b4620c509ec73c79e409");

    let encrypted =
        crypt_frm_payload(test_key(), plain, Direction::Downlink, DevAddr::new(2882343476), 22018)
            .unwrap();
    assert_eq!(hex::encode(&encrypted), "396bcc430fc793d6e025cb6ac97621c95209f5");
}

#[test]
fn test_crypt_multiple_blocks() {
    let plain: Vec<u8> = (0..33).collect();
    let encrypted =
        crypt_frm_payload(test_key(), &plain, Direction::Uplink, DevAddr::new(0x26011bda), 7)
            .unwrap();
    assert_eq!(
        hex::encode(&encrypted),
        "a54f4e5fe96ba37782753291341778b93ec35b6c2184c99a2ddea45e976f73f7df"
    );
}

#[test]
fn test_crypt_is_involution() {
    let addr = DevAddr::new(0xdeadbeef);
    for len in [0usize, 1, 15, 16, 17, 242] {
        let plain: Vec<u8> = (0..len).map(|i| (i * 7) as u8).collect();
        for direction in [Direction::Uplink, Direction::Downlink] {
            let encrypted = crypt_frm_payload([9; 16], &plain, direction, addr, 513).unwrap();
            let decrypted = crypt_frm_payload([9; 16], &encrypted, direction, addr, 513).unwrap();
            assert_eq!(&decrypted[..], &plain[..]);
        }
    }
}

#[test]
fn test_crypt_rejects_bad_input() {
    assert_eq!(
        crypt_frm_payload(&[0u8; 15][..], b"a", Direction::Uplink, DevAddr::new(1), 1),
        Err(Error::InvalidKey { len: 15 })
    );
    assert_eq!(
        crypt_frm_payload([0; 16], &[0; 243], Direction::Uplink, DevAddr::new(1), 1),
        Err(Error::TooLong { structure: Structure::FRMPayload, max: 242, actual: 243 })
    );
}

#[test]
fn test_compute_data_mic_known_vectors() {
    let addr = DevAddr::new(2882343476);
    let frm = [0x54, 0x54, 0x4e];
    let cases = [
        (0xa0, Some(6), &frm[..], "d53f56ad"),
        (0x40, Some(6), &frm[..], "3cf7474f"),
        (0x60, Some(6), &frm[..], "e5419c7b"),
        (0x80, None, &[][..], "958f81b6"),
    ];
    for (mhdr, f_port, frm_payload, expected) in cases {
        let mic = compute_data_mic(
            MHDR::from(mhdr),
            &mic_fhdr(),
            f_port,
            frm_payload,
            test_key(),
            addr,
            22018,
        )
        .unwrap();
        assert_eq!(hex::encode(mic.0), expected);
    }
}

#[test]
fn test_compute_data_mic_is_sensitive_to_every_input() {
    let addr = DevAddr::new(2882343476);
    let reference = compute_data_mic(
        MHDR::from(0xa0),
        &mic_fhdr(),
        Some(6),
        &[0x54, 0x54, 0x4e],
        test_key(),
        addr,
        22018,
    )
    .unwrap();

    let mut other_key = test_key();
    other_key[15] ^= 1;
    let variants = [
        compute_data_mic(MHDR::from(0xa0), &mic_fhdr(), Some(6), b"TTO", test_key(), addr, 22018),
        compute_data_mic(MHDR::from(0xa0), &mic_fhdr(), Some(7), b"TTN", test_key(), addr, 22018),
        compute_data_mic(MHDR::from(0xa0), &mic_fhdr(), Some(6), b"TTN", other_key, addr, 22018),
        compute_data_mic(MHDR::from(0xa0), &mic_fhdr(), Some(6), b"TTN", test_key(), addr, 22019),
        compute_data_mic(
            MHDR::from(0xa0),
            &mic_fhdr(),
            Some(6),
            b"TTN",
            test_key(),
            DevAddr::new(2882343477),
            22018,
        ),
        compute_data_mic(MHDR::from(0xa0), &[0; 7], Some(6), b"TTN", test_key(), addr, 22018),
        compute_data_mic(MHDR::from(0x60), &mic_fhdr(), Some(6), b"TTN", test_key(), addr, 22018),
    ];
    for variant in variants {
        assert_ne!(variant.unwrap(), reference);
    }
}

#[test]
fn test_compute_data_mic_needs_data_type() {
    for mhdr in [0x00, 0x20, 0xc0, 0xe0] {
        let mhdr = MHDR::from(mhdr);
        assert_eq!(
            compute_data_mic(mhdr, &mic_fhdr(), None, &[], test_key(), DevAddr::new(1), 1),
            Err(Error::UnsupportedDirection(mhdr.mtype()))
        );
    }
}

#[test]
fn test_with_mic_matches_parsed_frame() {
    let fhdr = FHDR::new(DevAddr::new(2882343476), FCtrl::default(), 22018, &[]).unwrap();
    let data = DataPayload::new(fhdr, Some(6), &[0x54, 0x54, 0x4e]).unwrap();
    let phy = PhyPayload::with_mic(MHDR::from(MType::ConfirmedDataDown), data, test_key()).unwrap();
    let bytes = phy.to_bytes().unwrap();
    assert_eq!(hex::encode(&bytes), "a03412cdab0002560654544ed53f56ad");
    let parsed = parse(&bytes).unwrap();
    assert_eq!(parsed, phy);
    assert!(parsed.validate_mic(test_key()).unwrap());
}

#[test]
fn test_parse_boundaries() {
    for len in 0..5 {
        assert!(matches!(
            parse(&data_payload()[..len]),
            Err(Error::TooShort { structure: Structure::PhyPayload, required: 5, .. })
        ));
    }
    for len in 5..12 {
        assert!(matches!(
            parse(&data_payload()[..len]),
            Err(Error::TooShort { structure: Structure::DataPayload, required: 7, .. })
        ));
    }
}

#[test]
fn test_parse_unsupported_version() {
    let mut data = data_payload();
    data[0] |= 0x02;
    assert_eq!(
        parse(&data),
        Err(Error::UnsupportedVersion {
            mhdr: MHDR::new(MType::UnconfirmedDataUp, Major::RFU2),
            mic: MIC([0xd6, 0xc3, 0xb5, 0x82]),
        })
    );
}

#[test]
fn test_parse_dispatch_join_and_unsupported() {
    let mut data = data_payload();
    data[0] = 0x00;
    assert_eq!(parse(&data), Err(Error::NotImplemented(MType::JoinRequest)));
    data[0] = 0x20;
    assert_eq!(parse(&data), Err(Error::NotImplemented(MType::JoinAccept)));
    data[0] = 0xc0;
    assert_eq!(parse(&data), Err(Error::UnsupportedMessageType(MType::RFU)));
    data[0] = 0xe0;
    assert_eq!(parse(&data), Err(Error::UnsupportedMessageType(MType::Proprietary)));
}

#[test]
fn test_join_payloads_are_not_implemented() {
    let payload = MacPayload::from(JoinRequestPayload);
    assert_eq!(payload.serialize(), Err(Error::NotImplemented(MType::JoinRequest)));
    let phy = PhyPayload::new(MHDR::from(MType::JoinAccept), JoinAcceptPayload, MIC([0; 4]))
        .unwrap();
    assert_eq!(phy.calculate_mic([0; 16]), Err(Error::NotImplemented(MType::JoinAccept)));
    assert_eq!(phy.decrypt_frm_payload([0; 16]), Err(Error::NotImplemented(MType::JoinAccept)));
}

#[cfg(feature = "serde")]
#[test]
fn test_serde_round_trip() {
    let phy = parse(&data_payload()).unwrap();
    let json = serde_json::to_string(&phy).unwrap();
    let back: PhyPayload = serde_json::from_str(&json).unwrap();
    assert_eq!(back, phy);
}

#[cfg(feature = "serde")]
#[test]
fn test_serde_rejects_oversized_data_payload() {
    let fhdr = FHDR::new(DevAddr::new(1), FCtrl::default(), 0, &[0x02; 15]).unwrap();
    let payload = DataPayload::new(fhdr, Some(1), &[0; 10]).unwrap();
    let mut value = serde_json::to_value(&payload).unwrap();
    value["frm_payload"] = serde_json::json!(vec![0u8; 242]);
    let err = serde_json::from_value::<DataPayload>(value).unwrap_err();
    assert!(err.to_string().contains("at most 250 bytes, got 265"), "{err}");
}

#[cfg(feature = "serde")]
#[test]
fn test_serde_rejects_inconsistent_options_length() {
    let fhdr = FHDR::new(DevAddr::new(1), FCtrl::default(), 0, &[0x07; 3]).unwrap();
    let mut value = serde_json::to_value(&fhdr).unwrap();
    assert_eq!(serde_json::from_value::<FHDR>(value.clone()).unwrap(), fhdr);
    value["fctrl"]["f_opts_len"] = serde_json::json!(0);
    let err = serde_json::from_value::<FHDR>(value).unwrap_err();
    assert!(err.to_string().contains("declares 0 FOpts bytes, FOpts has 3"), "{err}");
}

#[cfg(feature = "serde")]
#[test]
fn test_serde_rejects_invalid_phy_payload() {
    let phy = parse(&data_payload()).unwrap();
    let value = serde_json::to_value(&phy).unwrap();

    let mut other_major = value.clone();
    other_major["mhdr"]["major"] = serde_json::json!("RFU3");
    let err = serde_json::from_value::<PhyPayload>(other_major).unwrap_err();
    assert!(err.to_string().contains("not supported"), "{err}");

    let mut join_header = value;
    join_header["mhdr"]["mtype"] = serde_json::json!("JoinRequest");
    let err = serde_json::from_value::<PhyPayload>(join_header).unwrap_err();
    assert!(err.to_string().contains("does not match"), "{err}");
}

#[test]
fn test_crypt_with_downlink_flag() {
    let crypt = |is_downlink: bool| {
        crypt_frm_payload(
            test_key(),
            b"You look good, Lora",
            Direction::from(is_downlink),
            DevAddr::new(2882400018),
            43981,
        )
        .unwrap()
    };
    assert_eq!(hex::encode(crypt(true)), "ec2a32af5556df4647b4620c509ec73c79e409");
    assert_ne!(crypt(false), crypt(true));
}
