use std::fs;
use std::path::PathBuf;

use digitnet::data::idx::{MnistFiles, IMAGES_MAGIC, LABELS_MAGIC};
use digitnet::{evaluate, train, ActivationFunction, CostFunction, NetworkSpec, TrainConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// 2x2 "digits": class 0 lights the left column, class 1 the right one.
fn synthetic_idx(n: usize, rng: &mut ChaCha8Rng) -> (Vec<u8>, Vec<u8>) {
    let mut img = Vec::new();
    img.extend_from_slice(&IMAGES_MAGIC.to_be_bytes());
    img.extend_from_slice(&(n as u32).to_be_bytes());
    img.extend_from_slice(&2u32.to_be_bytes());
    img.extend_from_slice(&2u32.to_be_bytes());

    let mut lbl = Vec::new();
    lbl.extend_from_slice(&LABELS_MAGIC.to_be_bytes());
    lbl.extend_from_slice(&(n as u32).to_be_bytes());

    for i in 0..n {
        let label = (i % 2) as u8;
        let mut pixels = [0u8; 4];
        for (col, px) in [0usize, 1, 0, 1].iter().zip(pixels.iter_mut()) {
            // row-major 2x2; column 0 is lit for class 0, column 1 for class 1
            *px = if *col == label as usize { rng.gen_range(200..=255u8) } else { rng.gen_range(0..=40u8) };
        }
        img.extend_from_slice(&pixels);
        lbl.push(label);
    }
    (img, lbl)
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("digitnet-{name}-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn trains_from_idx_files() {
    let dir = scratch_dir("idx");
    let mut rng = ChaCha8Rng::seed_from_u64(21);
    let files = MnistFiles::in_dir(&dir);

    let (img, lbl) = synthetic_idx(200, &mut rng);
    fs::write(&files.train_images, &img).unwrap();
    fs::write(&files.train_labels, &lbl).unwrap();
    let (img, lbl) = synthetic_idx(40, &mut rng);
    fs::write(&files.test_images, &img).unwrap();
    fs::write(&files.test_labels, &lbl).unwrap();

    files.verify().unwrap();
    let mut train_set = files.load_train(2).unwrap();
    let test_set = files.load_test(2).unwrap();
    assert_eq!(train_set.count(), 200);
    assert_eq!(test_set.count(), 40);

    let spec = NetworkSpec {
        layers: vec![4, 6, 2],
        activation: ActivationFunction::Sigmoid,
        cost: CostFunction::CrossEntropy,
    };
    let config = TrainConfig::new(spec, 20, 10, 1.0).with_momentum(0.9).with_seed(3);
    let mut net = config.network.build(&mut rng).unwrap();

    let history = train(&mut net, &mut train_set, &test_set, &config, &mut rng).unwrap();
    let last = history.last().unwrap();
    assert_eq!(last.batches, 20);
    assert!(last.accuracy() >= 0.9, "accuracy {}", last.accuracy());
    assert_eq!(evaluate(&mut net, &test_set).unwrap(), last.correct);

    let dump = dir.join("weights.txt");
    net.save_text(&dump).unwrap();
    let text = fs::read_to_string(&dump).unwrap();
    // 6 + 2 weight rows, a blank separator, 6 + 2 bias rows
    assert_eq!(text.lines().count(), 17);
    assert_eq!(text.lines().nth(8), Some(""));
    assert_eq!(text.lines().next().unwrap().split(' ').count(), 4);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn verify_rejects_swapped_files() {
    let dir = scratch_dir("swap");
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let files = MnistFiles::in_dir(&dir);
    let (img, lbl) = synthetic_idx(4, &mut rng);
    fs::write(&files.train_images, &lbl).unwrap();
    fs::write(&files.train_labels, &img).unwrap();
    fs::write(&files.test_images, &img).unwrap();
    fs::write(&files.test_labels, &lbl).unwrap();

    assert!(files.verify().is_err());
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn verify_reports_missing_files() {
    let files = MnistFiles::in_dir(std::env::temp_dir().join("digitnet-does-not-exist"));
    assert!(files.verify().is_err());
}
