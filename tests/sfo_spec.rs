mod common;

use common::{sample_sfo, SfoBuilder};
use vita_pkginfo::pkg::format::sfo;
use vita_pkginfo::{DecimalVersion, FieldError, PkgError};

#[test]
fn sfo_fields_are_decoded() {
    let fields = sfo::read_fields(&sample_sfo("gd")).expect("read fields");

    assert_eq!(fields.title, "Sample Game");
    assert_eq!(fields.content_id, "UP1234-ABCD12345_00-0000000000000000");
    assert_eq!(fields.title_id, "ABCD12345");
    assert_eq!(fields.min_firmware, DecimalVersion(3.6));
    assert_eq!(fields.app_version, Some(DecimalVersion(1.05)));
    assert_eq!(fields.category, "gd");
    assert!(fields.issues.is_empty(), "{:?}", fields.issues);
}

#[test]
fn every_newline_in_title_becomes_a_space() {
    let blob = SfoBuilder::new().pair("TITLE", "A\nB\n\nC\n").build();
    let fields = sfo::read_fields(&blob).expect("read fields");
    assert_eq!(fields.title, "A B  C ");
}

#[test]
fn missing_keys_keep_defaults() {
    let blob = SfoBuilder::new().pair("STITLE", "Short").build();
    let fields = sfo::read_fields(&blob).expect("read fields");

    assert_eq!(fields.title, "Undefined");
    assert_eq!(fields.content_id, "Undefined");
    assert_eq!(fields.title_id, "Undefined");
    assert_eq!(fields.min_firmware, DecimalVersion(0.0));
    assert_eq!(fields.app_version, None);
    assert_eq!(fields.category, "");
    assert!(fields.issues.is_empty());
}

#[test]
fn empty_table_is_valid() {
    let blob = SfoBuilder::new().build();
    let fields = sfo::read_fields(&blob).expect("read fields");
    assert_eq!(fields.title, "Undefined");
}

#[test]
fn short_content_id_gives_short_title_id() {
    let blob = SfoBuilder::new().pair("CONTENT_ID", "EP0001-PCSB").build();
    let fields = sfo::read_fields(&blob).expect("read fields");
    assert_eq!(fields.title_id, "PCSB");
}

#[test]
fn later_duplicate_keys_win() {
    let blob = SfoBuilder::new()
        .pair("TITLE", "First")
        .pair("TITLE", "Second")
        .build();
    let fields = sfo::read_fields(&blob).expect("read fields");
    assert_eq!(fields.title, "Second");
}

#[test]
fn inner_magic_must_match_exactly() {
    let mut blob = sample_sfo("gd");
    blob[..4].copy_from_slice(b"PSF\0");

    match sfo::read_fields(&blob) {
        Err(PkgError::BadMagic { structure, found }) => {
            assert_eq!(structure, "param.sfo");
            assert_eq!(found, b"PSF\0".to_vec());
        }
        other => panic!("expected BadMagic, got {:?}", other),
    }
}

#[test]
fn short_blob_is_truncated() {
    let blob = sample_sfo("gd");
    let err = sfo::read_fields(&blob[..19]).expect_err("short blob");
    assert!(matches!(err, PkgError::TruncatedInput { .. }), "{:?}", err);
}

#[test]
fn index_past_end_of_blob_is_truncated() {
    let mut blob = SfoBuilder::new().pair("TITLE", "x").build();
    blob[16..20].copy_from_slice(&1000u32.to_le_bytes());

    let err = sfo::read_fields(&blob).expect_err("index overruns blob");
    assert!(matches!(err, PkgError::TruncatedInput { .. }), "{:?}", err);
}

#[test]
fn unterminated_final_value_reads_to_end_of_blob() {
    let mut blob = SfoBuilder::new()
        .pair("CATEGORY", "gd")
        .pair("TITLE", "Cut Off")
        .build();
    assert_eq!(blob.pop(), Some(0));

    let fields = sfo::read_fields(&blob).expect("read fields");
    assert_eq!(fields.title, "Cut Off");
    assert_eq!(fields.category, "gd");
}

#[test]
fn invalid_utf8_value_is_skipped_and_recorded() {
    let blob = SfoBuilder::new()
        .raw_pair(b"TITLE", &[0x47, 0xFF, 0xFE])
        .pair("CONTENT_ID", "JP0001-PCSG00001_00-0000000000000000")
        .build();

    let fields = sfo::read_fields(&blob).expect("read fields");
    assert_eq!(fields.title, "Undefined");
    assert_eq!(fields.title_id, "PCSG00001");
    assert_eq!(
        fields.issues,
        vec![FieldError::Decode {
            key: "TITLE".to_string()
        }]
    );
}

#[test]
fn unparsable_versions_fall_back_and_are_recorded() {
    let blob = SfoBuilder::new()
        .pair("PSP2_DISP_VER", "3.6x")
        .pair("APP_VER", "")
        .pair("CATEGORY", "gd")
        .build();

    let fields = sfo::read_fields(&blob).expect("read fields");
    assert_eq!(fields.min_firmware, DecimalVersion(0.0));
    assert_eq!(fields.app_version, None);
    assert_eq!(fields.category, "gd");
    assert_eq!(
        fields.issues,
        vec![
            FieldError::InvalidNumeric {
                key: "PSP2_DISP_VER".to_string(),
                value: "3.6x".to_string(),
            },
            FieldError::InvalidNumeric {
                key: "APP_VER".to_string(),
                value: String::new(),
            },
        ]
    );
}

#[test]
fn unknown_keys_are_ignored_even_when_not_utf8() {
    let blob = SfoBuilder::new()
        .raw_pair(b"PARENTAL_LEVEL", &[0x05, 0x00])
        .raw_pair(b"ATTRIBUTE", &[0xFF])
        .pair("TITLE", "Ok")
        .build();

    let fields = sfo::read_fields(&blob).expect("read fields");
    assert_eq!(fields.title, "Ok");
    assert!(fields.issues.is_empty(), "{:?}", fields.issues);
}
