//! Integration tests for per-echo output of a single series.

use std::path::PathBuf;

use xa30_core::image::OfficialImage;
use xa30_core::{ImageOutcome, Materialized, Sidecar, process_image};

use crate::common::{ECHO_US, Fixture, SHAPE, voxel};

fn patched(outcome: ImageOutcome) -> Materialized {
    match outcome {
        ImageOutcome::Patched(done) => done,
        ImageOutcome::Skipped { dicom } => {
            unreachable!("Expected patched series, skipped {}", dicom.display())
        }
    }
}

fn assert_echo_data(image: &OfficialImage, echo: usize) {
    let [nx, ny, nz] = SHAPE;
    for x in 0..nx {
        for y in 0..ny {
            for z in 0..nz {
                assert_eq!(
                    image.data[[x, y, z]],
                    f64::from(voxel(x, y, z, echo, 0)),
                    "voxel ({x}, {y}, {z}) of echo {echo}"
                );
            }
        }
    }
}

#[test]
fn test_two_echoes_rename_first_and_write_second() {
    let fixture = Fixture::new();
    let dicom = fixture.dicom("gre", &ECHO_US[..2]);
    fixture.dat_files(&dicom, 2, 1);
    let base = fixture.official("gre", 1, ".nii");

    let done = patched(process_image(&base, &dicom).unwrap());

    assert_eq!(
        fixture.outputs(),
        vec!["gre_e1.json", "gre_e1.nii", "gre_e2.json", "gre_e2.nii"]
    );
    assert_eq!(done.renamed.len(), 2);
    assert_eq!(
        done.written,
        vec![
            fixture.out_dir.join("gre_e2.nii"),
            fixture.out_dir.join("gre_e2.json"),
        ]
    );

    let meta = Sidecar::load(&fixture.out_dir.join("gre_e2.json")).unwrap();
    assert_eq!(meta.echo_time, Some(0.005));
    assert_eq!(meta.conversion_software.as_deref(), Some("dcmdat2niix"));
    assert_eq!(meta.image_type_text.as_ref().unwrap()[3], "TE2");
    assert_eq!(meta.extra["SeriesNumber"], 7);

    // The first echo's sidecar moves untouched
    let first = Sidecar::load(&fixture.out_dir.join("gre_e1.json")).unwrap();
    assert_eq!(first.conversion_software.as_deref(), Some("dcm2niix"));

    let second = OfficialImage::open(&fixture.out_dir.join("gre_e2")).unwrap();
    assert!(second.is_single_frame());
    assert_echo_data(&second, 1);
}

#[test]
fn test_single_echo_only_ensures_marker() {
    let fixture = Fixture::new();
    let dicom = fixture.dicom("gre", &ECHO_US[..1]);
    fixture.dat_files(&dicom, 1, 1);
    let base = fixture.official("gre", 1, ".nii");

    let done = patched(process_image(&base, &dicom).unwrap());

    assert_eq!(fixture.outputs(), vec!["gre_e1.json", "gre_e1.nii"]);
    assert!(done.written.is_empty());
}

#[test]
fn test_marked_single_echo_is_untouched() {
    let fixture = Fixture::new();
    let dicom = fixture.dicom("gre", &ECHO_US[..1]);
    fixture.dat_files(&dicom, 1, 1);
    let base = fixture.official("gre_e1", 1, ".nii");

    let done = patched(process_image(&base, &dicom).unwrap());

    assert_eq!(done, Materialized::default());
    assert_eq!(fixture.outputs(), vec!["gre_e1.json", "gre_e1.nii"]);
}

#[test]
fn test_three_echoes_numbering() {
    let fixture = Fixture::new();
    let dicom = fixture.dicom("gre", &ECHO_US);
    fixture.dat_files(&dicom, 3, 1);
    let base = fixture.official("gre_e1", 1, ".nii");

    patched(process_image(&base, &dicom).unwrap());

    for (echo, expected) in [(1, 0.005), (2, 0.0075)] {
        let echo_base = fixture.out_dir.join(format!("gre_e{}", echo + 1));
        let meta = Sidecar::load(&PathBuf::from(format!("{}.json", echo_base.display()))).unwrap();
        assert_eq!(meta.echo_time, Some(expected));
        assert_eq!(
            meta.image_type_text.as_ref().unwrap()[3],
            format!("TE{}", echo + 1)
        );
        assert_echo_data(&OfficialImage::open(&echo_base).unwrap(), echo);
    }
}

#[test]
fn test_echo_synonym_keeps_names() {
    let fixture = Fixture::new();
    let dicom = fixture.dicom("gre", &ECHO_US[..2]);
    fixture.dat_files(&dicom, 2, 1);
    let base = fixture.official("gre_echo1", 1, ".nii");

    let done = patched(process_image(&base, &dicom).unwrap());

    assert!(done.renamed.is_empty());
    assert_eq!(
        fixture.outputs(),
        vec![
            "gre_echo1.json",
            "gre_echo1.nii",
            "gre_echo2.json",
            "gre_echo2.nii"
        ]
    );
}

#[test]
fn test_phase_first_echo_is_rewritten() {
    let fixture = Fixture::new();
    let dicom = fixture.dicom("gre_ph", &ECHO_US[..2]);
    fixture.dat_files(&dicom, 2, 1);
    let base = fixture.official("gre_ph", 1, ".nii");

    let done = patched(process_image(&base, &dicom).unwrap());

    assert_eq!(
        fixture.outputs(),
        vec![
            "gre_e1_ph.json",
            "gre_e1_ph.nii",
            "gre_e2_ph.json",
            "gre_e2_ph.nii"
        ]
    );
    assert_eq!(done.written[0], fixture.out_dir.join("gre_e1_ph.nii"));

    // Echo 1 now holds the decoded samples instead of the converter's
    let first = OfficialImage::open(&fixture.out_dir.join("gre_e1_ph")).unwrap();
    assert_echo_data(&first, 0);
}

#[test]
fn test_multi_frame_series() {
    let fixture = Fixture::new();
    let dicom = fixture.dicom("gre", &ECHO_US[..2]);
    fixture.dat_files(&dicom, 2, 3);
    let base = fixture.official("gre_e1", 3, ".nii");

    patched(process_image(&base, &dicom).unwrap());

    let second = OfficialImage::open(&fixture.out_dir.join("gre_e2")).unwrap();
    assert_eq!(second.shape(), &[4, 3, 2, 3]);
    assert_eq!(second.data[[1, 2, 1, 2]], f64::from(voxel(1, 2, 1, 1, 2)));
}

#[test]
fn test_compressed_images_stay_compressed() {
    let fixture = Fixture::new();
    let dicom = fixture.dicom("gre", &ECHO_US[..2]);
    fixture.dat_files(&dicom, 2, 1);
    let base = fixture.official("gre", 1, ".nii.gz");

    patched(process_image(&base, &dicom).unwrap());

    assert_eq!(
        fixture.outputs(),
        vec![
            "gre_e1.json",
            "gre_e1.nii.gz",
            "gre_e2.json",
            "gre_e2.nii.gz"
        ]
    );
}

#[test]
fn test_no_dat_files_skips_series() {
    let fixture = Fixture::new();
    let dicom = fixture.dicom("gre", &ECHO_US[..2]);
    let base = fixture.official("gre", 1, ".nii");

    let outcome = process_image(&base, &dicom).unwrap();

    assert_eq!(outcome, ImageOutcome::Skipped { dicom });
    assert_eq!(fixture.outputs(), vec!["gre.json", "gre.nii"]);
}

#[test]
fn test_no_dat_files_skips_without_echo_times() {
    let fixture = Fixture::new();
    let dicom = fixture.dicom("localizer", &[]);
    let base = fixture.official("localizer", 1, ".nii");

    let outcome = process_image(&base, &dicom).unwrap();
    assert!(matches!(outcome, ImageOutcome::Skipped { .. }));
}
