use approx::assert_relative_eq;
use std::path::Path;

use lidarpost::l3d::io::las::{read_las, write_las, LasReadOptions, QuantizationParams};
use lidarpost::l3d::io::text::read_transform_matrix;
use lidarpost::l3d::pointcloud::{PointAttributes, PointCloud};
use lidarpost::l3d::Cloud3dError;
use lidarpost::workflows::{
    clean_directory, clean_las_file, compute_transformation_matrix, corrected_path,
    transform_las_file, TransformOptions, WorkflowError,
};

// half of the default 0.00025 quantum plus some slack
const QUANTUM_EPS: f64 = 1.3e-4;

fn livox_cloud() -> Result<PointCloud, Cloud3dError> {
    let points = vec![
        [0.0, 0.0, 0.0],
        [12.5, -3.25, 1.0],
        [0.0, 0.0, 0.0],
        [13.0, -3.0, 1.5],
        [14.125, -2.5, 0.75],
        [0.0, 0.0, 0.0],
    ];
    let attributes = PointAttributes::from([
        ("intensity".to_string(), vec![0.0, 10.0, 0.0, 20.0, 30.0, 0.0]),
        ("reflectance".to_string(), vec![0.0, 0.5, 0.0, 0.25, 0.125, 0.0]),
    ]);
    PointCloud::new(points, Some(attributes))
}

fn write_metadata(path: &Path, phi_incr: f64) -> std::io::Result<()> {
    std::fs::write(
        path,
        format!(
            "FOV and resolution\n\
             theta_min theta_max theta_incr phi_min phi_max phi_incr\n\
             30.0 130.0 0.013 0.0 360.0 {phi_incr}\n"
        ),
    )
}

#[test]
fn clean_file_removes_zero_points() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("scan.las");
    write_las(&input, &livox_cloud()?, &QuantizationParams::default())?;

    let output = corrected_path(&input)?;
    assert_eq!(output, dir.path().join("scan_corr.las"));

    let cleaned = clean_las_file(&input, Some(&output))?;
    assert_eq!(cleaned.len(), 3);

    let written = read_las(&output, &LasReadOptions::with_attributes())?;
    assert_eq!(written.len(), 3);
    for (p, q) in written.points().iter().zip(cleaned.points()) {
        for i in 0..3 {
            assert_relative_eq!(p[i], q[i], epsilon = QUANTUM_EPS);
        }
    }
    assert_eq!(written.attribute("intensity"), Some(&[10.0, 20.0, 30.0][..]));
    assert_eq!(
        written.attribute("reflectance"),
        Some(&[0.5, 0.25, 0.125][..])
    );
    Ok(())
}

#[test]
fn clean_file_without_output() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("scan.las");
    write_las(&input, &livox_cloud()?, &QuantizationParams::default())?;

    let cleaned = clean_las_file(&input, None)?;
    assert_eq!(cleaned.len(), 3);
    assert!(!dir.path().join("scan_corr.las").exists());
    Ok(())
}

#[test]
fn clean_directory_continues_after_failure() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let cloud = livox_cloud()?;
    write_las(dir.path().join("a.las"), &cloud, &QuantizationParams::default())?;
    write_las(dir.path().join("c.las"), &cloud, &QuantizationParams::default())?;
    std::fs::write(dir.path().join("b.las"), b"not a point cloud")?;
    std::fs::write(dir.path().join("notes.txt"), b"ignored")?;
    write_las(
        dir.path().join("d_corr.las"),
        &cloud,
        &QuantizationParams::default(),
    )?;

    let results = clean_directory(dir.path())?;
    let names = results
        .iter()
        .map(|file| file.input.file_name().map(|n| n.to_string_lossy().to_string()))
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec![
            Some("a.las".to_string()),
            Some("b.las".to_string()),
            Some("c.las".to_string())
        ]
    );

    assert!(results[0].result.is_ok());
    assert!(matches!(results[1].result, Err(WorkflowError::Las(_))));
    assert!(results[2].result.is_ok());

    let cleaned = read_las(dir.path().join("c_corr.las"), &LasReadOptions::default())?;
    assert_eq!(cleaned.len(), 3);
    assert!(!dir.path().join("b_corr.las").exists());
    Ok(())
}

#[test]
fn transform_file_with_sibling_files() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("161113_000123.las");
    let cloud = PointCloud::new(
        vec![[1.0, 2.0, 3.0], [-4.0, 0.5, 9.0], [10.0, 10.0, 10.0]],
        Some(PointAttributes::from([(
            "intensity".to_string(),
            vec![1.0, 2.0, 3.0],
        )])),
    )?;
    write_las(&input, &cloud, &QuantizationParams::default())?;

    write_metadata(&dir.path().join("161113_000123_meta.txt"), 0.013)?;
    // rotation of 90 degrees about z followed by a shift
    std::fs::write(
        dir.path().join("161113_000123_trafomat.txt"),
        "0 -1 0 100\n1 0 0 200\n0 0 1 -5\n0 0 0 1\n",
    )?;

    let output = dir.path().join("161113_000123_trafo.las");
    let report = transform_las_file(&input, &output, &TransformOptions::default())?;
    assert!(report.metadata.highres());
    assert_relative_eq!(report.metadata.phi_incr(), 0.013);
    assert_eq!(report.points_read, 3);
    assert_eq!(report.output, output);

    let transformed = read_las(&output, &LasReadOptions::with_attributes())?;
    let expected = [[98.0, 201.0, -2.0], [99.5, 196.0, 4.0], [90.0, 210.0, 5.0]];
    for (p, q) in transformed.points().iter().zip(&expected) {
        for i in 0..3 {
            assert_relative_eq!(p[i], q[i], epsilon = QUANTUM_EPS);
        }
    }
    assert_eq!(transformed.attribute("intensity"), Some(&[1.0, 2.0, 3.0][..]));
    Ok(())
}

#[test]
fn transform_file_with_explicit_side_files() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("scan.las");
    write_las(
        &input,
        &PointCloud::from_points(vec![[1.0, 1.0, 1.0]]),
        &QuantizationParams::default(),
    )?;

    let meta = dir.path().join("meta.txt");
    write_metadata(&meta, 0.1)?;
    let trafomat = dir.path().join("matrix.txt");
    std::fs::write(&trafomat, "1,0,0,5\n0,1,0,5\n0,0,1,5\n")?;

    let options = TransformOptions {
        metadata: Some(meta),
        trafomat: Some(trafomat),
        read: LasReadOptions::default(),
        ..Default::default()
    };
    let output = dir.path().join("out.las");
    let report = transform_las_file(&input, &output, &options)?;
    assert!(!report.metadata.highres());

    let transformed = read_las(&output, &LasReadOptions::default())?;
    assert!(transformed.attributes().is_none());
    for i in 0..3 {
        assert_relative_eq!(transformed.points()[0][i], 6.0, epsilon = QUANTUM_EPS);
    }
    Ok(())
}

#[test]
fn transform_file_missing_metadata() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("scan.las");
    write_las(
        &input,
        &PointCloud::from_points(vec![[1.0, 1.0, 1.0]]),
        &QuantizationParams::default(),
    )?;

    let res = transform_las_file(
        &input,
        dir.path().join("out.las"),
        &TransformOptions::default(),
    );
    assert!(matches!(res, Err(WorkflowError::Metadata(_))));
    assert!(!dir.path().join("out.las").exists());
    Ok(())
}

#[test]
fn compute_matrix_from_picking_lists() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let source = dir.path().join("picking_list_livox.txt");
    let target = dir.path().join("picking_list_riegl.txt");
    let output = dir.path().join("M_riegl_livox.txt");

    std::fs::write(&source, "1,0,0,0\n2,1,0,0\n3,0,1,0\n4,0,0,1\n")?;
    std::fs::write(&target, "1,5,5,5\n2,6,5,5\n3,5,6,5\n4,5,5,6\n")?;

    let fit = compute_transformation_matrix(&source, &target, &output)?;
    assert_eq!(fit.rank, 4);
    assert_relative_eq!(fit.rmse, 0.0, epsilon = 1e-9);

    let saved = read_transform_matrix(&output)?;
    let rotation = saved.rotation();
    for i in 0..3 {
        assert_relative_eq!(saved.translation()[i], 5.0, epsilon = 1e-9);
        for j in 0..3 {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert_relative_eq!(rotation[i][j], expected, epsilon = 1e-9);
        }
    }

    let text = std::fs::read_to_string(&output)?;
    assert_eq!(text.lines().count(), 4);
    assert_eq!(
        text.lines().last(),
        Some("0.000000000000000 0.000000000000000 0.000000000000000 1.000000000000000")
    );
    Ok(())
}

#[test]
fn compute_matrix_mismatched_lists() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let source = dir.path().join("source.txt");
    let target = dir.path().join("target.txt");
    let output = dir.path().join("matrix.txt");

    std::fs::write(&source, "1,0,0,0\n2,1,0,0\n3,0,1,0\n4,0,0,1\n5,1,1,1\n")?;
    std::fs::write(&target, "1,5,5,5\n2,6,5,5\n3,5,6,5\n4,5,5,6\n")?;

    let res = compute_transformation_matrix(&source, &target, &output);
    assert!(matches!(
        res,
        Err(WorkflowError::Cloud(Cloud3dError::DimensionMismatch {
            expected: 5,
            actual: 4
        }))
    ));
    assert!(!output.exists());
    Ok(())
}
