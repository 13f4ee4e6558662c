//! End-to-end tests: CSV in, circles built, saved, reloaded, classified.

use std::fmt::Write as _;

use hypercircles::adapters::eval::{cross_validate, evaluate, EvalConfig};
use hypercircles::core::metric::Metric;
use hypercircles::{
    BuildConfig, CircleSet, CircleStore, Construction, CsvSource, Dataset, FileStore,
    LabeledPoint, MetricKind, Point, PointSource, Prediction, Strategy, VotingMode,
};

/// Points on a scrambled grid, split by a wavy boundary
fn wavy(count: usize) -> Vec<LabeledPoint> {
    (0..count)
        .map(|i| {
            let x = ((i * 37) % 101) as f32 / 10.0;
            let y = ((i * 61) % 97) as f32 / 10.0;
            let class = if y > 5.0 + 2.0 * x.sin() { 1 } else { 0 };
            LabeledPoint::new(Point::new(vec![x, y]), class)
        })
        .collect()
}

fn to_csv(points: &[LabeledPoint]) -> String {
    let mut csv = String::from("x,y,label\n");
    for p in points {
        let label = if p.class == 0 { "below" } else { "above" };
        writeln!(csv, "{},{},{}", p.dims()[0], p.dims()[1], label).unwrap();
    }
    csv
}

fn assert_pure(model: &CircleSet, points: &[LabeledPoint]) {
    let metric = model.metric();
    for c in model.circles() {
        for p in points.iter().filter(|p| p.class != c.class) {
            let d = metric.distance(c.center.dims(), p.dims());
            assert!(d > c.radius, "{} point at {} inside radius {}", metric, d, c.radius);
        }
    }
}

#[test]
fn test_saved_model_classifies_identically() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("train.csv");
    std::fs::write(&csv_path, to_csv(&wavy(300))).unwrap();

    let train = CsvSource::new(&csv_path).load().unwrap();
    assert_eq!(train.len(), 300);
    assert_eq!(train.num_classes(), 2);

    let model = CircleSet::build(train.points(), train.num_classes(), &BuildConfig::default()).unwrap();
    let store = FileStore::new(dir.path().join("model.hcs"));
    store.save(&model).unwrap();
    let loaded = store.load().unwrap();

    let mut strategies: Vec<Strategy> = VotingMode::ALL.iter().map(|&m| Strategy::Circles(m)).collect();
    strategies.extend(Strategy::KNN_FAMILY);

    for q in wavy(60).iter().map(|p| Point::new(vec![p.dims()[0] + 0.05, p.dims()[1] - 0.05])) {
        for &strategy in &strategies {
            let before = model.classify(train.points(), &q, strategy, 5).unwrap();
            let after = loaded.classify(train.points(), &q, strategy, 5).unwrap();
            assert_eq!(before, after, "{} disagrees at {:?}", strategy, q.dims());
        }
    }
}

#[test]
fn test_circles_pure_for_every_metric() {
    let points = wavy(250);

    for metric in [MetricKind::Euclidean, MetricKind::Manhattan, MetricKind::Cubic] {
        for construction in [Construction::NearestNeighbor, Construction::MaxPureDistance] {
            let config = BuildConfig::default()
                .with_metric(metric)
                .with_construction(construction);
            let model = CircleSet::build(&points, 2, &config).unwrap();

            assert!(!model.is_empty());
            assert_pure(&model, &points);

            let stats = model.stats();
            assert_eq!(stats.points, 250);
            assert!(stats.constructed <= stats.points);
            assert!(stats.merged <= stats.constructed);
            assert!(stats.pruned <= stats.merged);
            assert_eq!(stats.pruned, model.len());

            let per_class: u32 = model.circles_per_class().iter().sum();
            assert_eq!(per_class as usize, model.len());
        }
    }
}

#[test]
fn test_merging_compacts() {
    let points = wavy(300);
    let unmerged = CircleSet::build(&points, 2, &BuildConfig::default().with_merge(false).with_prune(false)).unwrap();
    let merged = CircleSet::build(&points, 2, &BuildConfig::default()).unwrap();

    assert!(merged.len() < unmerged.len());
}

#[test]
fn test_training_points_never_misclassified_by_circles() {
    let points = wavy(200);
    let model = CircleSet::build(&points, 2, &BuildConfig::default()).unwrap();

    for mode in VotingMode::ALL {
        for p in &points {
            let prediction = model.classify(&points, &p.point, Strategy::Circles(mode), 5).unwrap();
            if let Prediction::Class(c) = prediction {
                assert_eq!(c, p.class, "{} misclassified a training point", mode);
            }
        }
    }
}

#[test]
fn test_cross_validation_on_wavy_data() {
    let mut data = Dataset::new(2).unwrap();
    for p in wavy(400) {
        let label = if p.class == 0 { "below" } else { "above" };
        data.push_labeled(p.point, label).unwrap();
    }

    let cv = cross_validate(&data, 5, &BuildConfig::default(), &EvalConfig::default()).unwrap();

    assert_eq!(cv.folds.len(), 5);
    assert!(cv.mean_accuracy > 0.8, "mean accuracy {}", cv.mean_accuracy);
    assert!(cv.mean_circles > 1.0);
}

#[test]
fn test_test_file_shares_label_space() {
    let dir = tempfile::tempdir().unwrap();
    let train_path = dir.path().join("train.csv");
    let test_path = dir.path().join("test.csv");
    std::fs::write(&train_path, "a,b,kind\n0,0,cat\n0,1,cat\n9,9,dog\n9,8,dog\n").unwrap();
    // labels appear in the opposite order here
    std::fs::write(&test_path, "a,b,kind\n9,8.5,dog\n0,0.5,cat\n").unwrap();

    let train = CsvSource::new(&train_path).load().unwrap();
    let test = CsvSource::new(&test_path).load_with_labels(&train).unwrap();
    let model = CircleSet::build(train.points(), train.num_classes(), &BuildConfig::default()).unwrap();

    let report = evaluate(&model, &train, &test, &EvalConfig::default()).unwrap();
    assert_eq!(report.accuracy, 1.0);
    assert_eq!(report.unclassified, 0);
}
