use chrono::NaiveDate;
use mmecore::mme::LINE_COUNT;
use mmecore::model::{Point, Profile, Robustness, TestList, TestRecord, VehicleDimensions, VehicleInfo};
use mmecore::prelude::FixedClock;
use mmecore::{Emitter, EmitterConfig};
use std::fs;
use tempfile::tempdir;

fn vehicle_info() -> VehicleInfo {
    VehicleInfo {
        year: "2024".into(),
        number: "12345".into(),
        oem: "OEM1".into(),
        make: "Acme".into(),
        model: "X1".into(),
        vin: "VIN1".into(),
        sw_version: "1.0".into(),
    }
}

fn vehicle_dimensions() -> VehicleDimensions {
    VehicleDimensions {
        length: 1200.0,
        width: 1800.0,
        front_overhang: Some(900.0),
        profile: Profile::from_authored(
            vec![Point::new(0.0, -900.0), Point::new(-40.0, 0.0), Point::new(0.0, 900.0)],
            vec![Point::new(200.0, 900.0), Point::new(1000.0, 900.0)],
            vec![Point::new(1200.0, -850.0), Point::new(1200.0, 850.0)],
        ),
    }
}

fn elk_at_50() -> TestRecord {
    TestRecord::builder("ELK", "AEBC")
        .selected("speed", 50_i64, "50")
        .robustness(Robustness::new("None"))
        .build()
        .unwrap()
}

fn emitter() -> Emitter<FixedClock> {
    let clock = FixedClock(
        NaiveDate::from_ymd_opt(2024, 11, 2)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap(),
    );
    Emitter::with_clock(EmitterConfig::default(), clock).unwrap()
}

#[test]
fn scenario_produces_expected_tree() {
    let root = tempdir().unwrap();
    let mut tests = TestList::new();
    tests.push(elk_at_50());

    let report = emitter()
        .emit_batch(root.path(), &tests, &vehicle_dimensions(), &vehicle_info())
        .unwrap();
    assert!(report.is_complete());

    let leaf = root
        .path()
        .join("24-OEM1-12345-Acme_X1")
        .join("24-OEM1-12345-Acme_X1-AEBC")
        .join("12345-ELK-50");
    assert_eq!(report.emitted[0].folder, leaf);
    assert!(leaf.join("Channel").is_dir());
    assert!(leaf.join("Movie").is_dir());
    assert_eq!(fs::read_dir(leaf.join("Channel")).unwrap().count(), 0);

    let mme = fs::read_to_string(leaf.join("12345-ELK-50.mme")).unwrap();
    let lines: Vec<_> = mme.lines().collect();
    assert_eq!(lines.len(), LINE_COUNT);
    assert_eq!(lines[5], "Timestamp:\t2024/11/02,14:30");
    assert_eq!(lines[16], "Dimensions of TOB 1:\t1200.0,1800.0");
    assert_eq!(
        lines[17],
        "Shape Front TOB 1:\t(0.0;900.0), (-40.0;0.0), (0.0;-900.0)"
    );
    assert_eq!(
        lines[18],
        "Shape Left Side TOB 1:\t(1000.0;-900.0), (200.0;-900.0)"
    );
    assert!(mme.ends_with('\n'));
}

#[test]
fn rerun_adds_suffixed_folder_and_leaves_first_untouched() {
    let root = tempdir().unwrap();
    let tests = vec![elk_at_50()];
    let emitter = emitter();

    let first = emitter
        .emit_batch(root.path(), &tests, &vehicle_dimensions(), &vehicle_info())
        .unwrap();
    let first_file = first.emitted[0].mme_path.clone();
    fs::write(first.emitted[0].folder.join("Channel").join("run.bin"), b"data").unwrap();
    let before = fs::read_to_string(&first_file).unwrap();

    let second = emitter
        .emit_batch(root.path(), &tests, &vehicle_dimensions(), &vehicle_info())
        .unwrap();
    let emitted = &second.emitted[0];
    assert!(emitted.folder.ends_with("12345-ELK-50_2"));
    assert_eq!(emitted.mme_path.file_name().unwrap(), "12345-ELK-50_2.mme");
    assert!(emitted.folder.join("Channel").is_dir());

    assert_eq!(fs::read_to_string(&first_file).unwrap(), before);
    assert!(first.emitted[0].folder.join("Channel").join("run.bin").exists());
}
