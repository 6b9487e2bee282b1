use gridnms::{
    iou, Anchor, DecodeConfig, GridDecoder, GridNmsError, GridSpec, RawOutput, Rect, Thresholds,
};

#[test]
fn rect_area_is_never_negative() {
    assert_eq!(Rect::new(0, 0, 5, 5).area(), 25);
    assert_eq!(Rect::new(1, 2, 6, 7).area(), 25);
    assert_eq!(Rect::new(3, 3, 3, 9).area(), 0);
    assert_eq!(Rect::new(6, 6, 1, 1).area(), 0);
    assert!(Rect::new(6, 6, 1, 1).is_empty());
}

#[test]
fn iou_matches_reference_example() {
    let a = Rect::new(0, 0, 5, 5);
    let b = Rect::new(1, 1, 6, 6);
    assert_eq!(a.intersection(&b), Rect::new(1, 1, 5, 5));

    let expected = 16.0 / (50.0 - 16.0);
    assert_eq!(iou(&a, &b), expected);
    assert_eq!(iou(&b, &a), expected);
    assert!((expected - 0.4706).abs() < 1e-4);
}

#[test]
fn iou_of_identical_rect_is_one() {
    let a = Rect::new(10, 20, 40, 90);
    assert_eq!(a.iou(&a), 1.0);
}

#[test]
fn iou_of_disjoint_rects_is_zero() {
    let a = Rect::new(0, 0, 10, 10);
    let b = Rect::new(20, 20, 30, 30);
    assert_eq!(iou(&a, &b), 0.0);

    let degenerate = Rect::new(50, 50, 50, 50);
    assert_eq!(iou(&a, &degenerate), 0.0);
    assert!(iou(&degenerate, &degenerate).is_nan());
}

#[test]
fn rect_scaling_truncates_corners() {
    let r = Rect::new(10, 15, 33, 41);
    assert_eq!(r.scaled(1.0), r);
    assert_eq!(r.scaled(2.5), Rect::new(25, 37, 82, 102));
    assert_eq!(r.scaled(0.5), Rect::new(5, 7, 16, 20));
}

#[test]
fn raw_output_checks_element_count() {
    let data = vec![0.0f32; 2 * 3 * 4];
    let view = RawOutput::new(&data, 2, 3, 4).unwrap();
    assert_eq!(view.height(), 2);
    assert_eq!(view.width(), 3);
    assert_eq!(view.channels(), 4);
    assert_eq!(view.len(), 24);

    let err = RawOutput::new(&data, 2, 3, 5).err().unwrap();
    assert_eq!(
        err,
        GridNmsError::ShapeMismatch {
            expected: 30,
            got: 24,
        }
    );
}

#[test]
fn raw_output_cells_are_row_major_with_height_outer() {
    let data: Vec<f32> = (0..24).map(|v| v as f32).collect();
    let view = RawOutput::new(&data, 2, 3, 4).unwrap();
    assert_eq!(view.cell(0, 0).unwrap(), &[0.0, 1.0, 2.0, 3.0]);
    assert_eq!(view.cell(2, 0).unwrap(), &[8.0, 9.0, 10.0, 11.0]);
    assert_eq!(view.cell(1, 1).unwrap(), &[16.0, 17.0, 18.0, 19.0]);
    assert_eq!(view.get(2, 1, 3), Some(23.0));
    assert!(view.cell(3, 0).is_none());
    assert!(view.cell(0, 2).is_none());
    assert!(view.get(0, 0, 4).is_none());
}

#[test]
fn thresholds_reject_out_of_range_values() {
    let ok = Thresholds::new(0.6, 0.9).unwrap();
    assert_eq!(ok.confidence(), 0.6);
    assert_eq!(ok.class_probability(), 0.9);
    assert_eq!(Thresholds::with_confidence(0.1).unwrap().class_probability(), 0.9);

    let err = Thresholds::new(-0.1, 0.9).err().unwrap();
    assert_eq!(
        err,
        GridNmsError::InvalidConfiguration {
            field: "confidence_threshold",
            reason: "must lie in [0, 1]",
        }
    );

    let err = Thresholds::new(0.5, 1.5).err().unwrap();
    assert_eq!(
        err,
        GridNmsError::InvalidConfiguration {
            field: "class_probability_threshold",
            reason: "must lie in [0, 1]",
        }
    );

    let err = Thresholds::new(f64::NAN, 0.5).err().unwrap();
    assert_eq!(
        err,
        GridNmsError::InvalidConfiguration {
            field: "confidence_threshold",
            reason: "must be finite",
        }
    );
}

#[test]
fn anchors_from_flat_pairs() {
    let anchors = Anchor::from_flat(&[1.0, 2.0, 3.0, 4.0]).unwrap();
    assert_eq!(anchors, vec![Anchor::new(1.0, 2.0), Anchor::new(3.0, 4.0)]);

    let err = Anchor::from_flat(&[1.0, 2.0, 3.0]).err().unwrap();
    assert!(matches!(
        err,
        GridNmsError::InvalidConfiguration {
            field: "anchors",
            ..
        }
    ));
}

#[test]
fn decoder_rejects_invalid_configuration() {
    let mut cfg = DecodeConfig::tiny_yolo_faces();
    cfg.anchors.clear();
    assert!(matches!(
        GridDecoder::new(cfg).err().unwrap(),
        GridNmsError::InvalidConfiguration {
            field: "anchors",
            ..
        }
    ));

    let mut cfg = DecodeConfig::tiny_yolo_faces();
    cfg.anchors[2] = Anchor::new(0.0, 1.0);
    assert!(GridDecoder::new(cfg).is_err());

    let mut cfg = DecodeConfig::tiny_yolo_faces();
    cfg.labels.clear();
    assert!(matches!(
        GridDecoder::new(cfg).err().unwrap(),
        GridNmsError::InvalidConfiguration {
            field: "labels",
            ..
        }
    ));

    let mut cfg = DecodeConfig::tiny_yolo_faces();
    cfg.grid = GridSpec {
        width: 0,
        height: 13,
        block_size: 32,
    };
    assert!(GridDecoder::new(cfg).is_err());

    let mut cfg = DecodeConfig::tiny_yolo_faces();
    cfg.grid.block_size = 0;
    assert!(GridDecoder::new(cfg).is_err());
}

#[test]
fn tiny_yolo_preset_layout() {
    let cfg = DecodeConfig::tiny_yolo_faces();
    assert_eq!(cfg.boxes_per_cell(), 5);
    assert_eq!(cfg.num_classes(), 1);
    assert_eq!(cfg.slot_channels(), 6);
    assert_eq!(cfg.cell_channels(), 30);
    assert_eq!(cfg.candidate_count(), 845);
    assert_eq!(cfg.expected_len(), 13 * 13 * 30);
    assert_eq!(cfg.grid.image_width(), 416);
    assert_eq!(cfg.grid.image_height(), 416);
}
