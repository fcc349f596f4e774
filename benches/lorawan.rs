use criterion::{black_box, criterion_group, criterion_main, Criterion};

use lorawan_frame::creator::DataPayloadCreator;
use lorawan_frame::data::DevAddr;
use lorawan_frame::default_crypto::DefaultFactory;
use lorawan_frame::header::{Direction, MType, Major};
use lorawan_frame::keys::{AppSKey, NwkSKey};
use lorawan_frame::parser::parse;
use lorawan_frame::securityhelpers::crypt_frm_payload;

const DATA_PAYLOAD: [u8; 18] = [
    0x40, 0x04, 0x03, 0x02, 0x01, 0x80, 0x01, 0x00, 0x01, 0xa6, 0x94, 0x64, 0x26, 0x15, 0xd6,
    0xc3, 0xb5, 0x82,
];

fn bench_complete_data_payload_fhdr(c: &mut Criterion) {
    c.bench_function("data_payload_headers_parsing", |b| {
        b.iter(|| {
            let phy = parse(black_box(&DATA_PAYLOAD)).unwrap();
            assert_eq!(phy.mhdr().mtype(), MType::UnconfirmedDataUp);
            assert_eq!(phy.mhdr().major(), Major::LoRaWANR1);

            let fhdr = phy.data_payload().unwrap().fhdr();
            assert_eq!(fhdr.fcnt(), 1u16);
            assert!(fhdr.fopts().is_empty());
            assert!(fhdr.fctrl().adr, "ADR");
            assert!(!fhdr.fctrl().ack, "no ack");
        })
    });
}

fn bench_complete_data_payload_mic_validation(c: &mut Criterion) {
    let nwk_skey = NwkSKey::from([2; 16]);
    c.bench_function("data_payload_mic_validation", |b| {
        b.iter(|| {
            let phy = parse(black_box(&DATA_PAYLOAD)).unwrap();
            assert!(phy.validate_mic(nwk_skey).unwrap());
        })
    });
}

fn bench_complete_data_payload_decrypt(c: &mut Criterion) {
    let app_skey = AppSKey::from([1; 16]);
    c.bench_function("data_payload_decrypt", |b| {
        b.iter(|| {
            let phy = parse(black_box(&DATA_PAYLOAD)).unwrap();
            assert_eq!(&phy.decrypt_frm_payload(app_skey).unwrap()[..], b"hello");
        })
    });
}

fn bench_max_frm_payload_crypt(c: &mut Criterion) {
    let payload = [0x5a; 242];
    c.bench_function("frm_payload_crypt_242", |b| {
        b.iter(|| {
            crypt_frm_payload(
                [1; 16],
                black_box(&payload),
                Direction::Uplink,
                DevAddr::new(0x26011bda),
                black_box(7),
            )
            .unwrap()
        })
    });
}

fn bench_data_payload_creator(c: &mut Criterion) {
    let nwk_skey = NwkSKey::from([2; 16]);
    let app_skey = AppSKey::from([1; 16]);
    let mut creator = DataPayloadCreator::new();
    creator.set_f_port(1).set_dev_addr(DevAddr::new(0x01020304)).set_fcnt(76543);
    c.bench_function("data_payload_creator", |b| {
        b.iter(|| {
            creator
                .build(black_box(b"hello lora"), &nwk_skey, &app_skey, &DefaultFactory)
                .unwrap()
                .to_bytes()
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_complete_data_payload_fhdr,
    bench_complete_data_payload_mic_validation,
    bench_complete_data_payload_decrypt,
    bench_max_frm_payload_crypt,
    bench_data_payload_creator
);
criterion_main!(benches);
