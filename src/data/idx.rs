//! IDX binary files as distributed for MNIST.
//!
//! ```text
//! IDX3 images                          IDX1 labels
//! 0..4    magic 0x00000803             0..4   magic 0x00000801
//! 4..8    N       (big-endian u32)     4..8   N (big-endian u32)
//! 8..12   rows                         8..    N bytes, one class index each
//! 12..16  cols
//! 16..    N * rows * cols bytes, row-major, uint8
//! ```

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::data::dataset::{Dataset, Sample};
use crate::error::{NetError, Result};
use crate::math::matrix::Matrix;

pub const IMAGES_MAGIC: u32 = 0x0000_0803;
pub const LABELS_MAGIC: u32 = 0x0000_0801;

pub const TRAIN_IMAGES: &str = "train-images.idx3-ubyte";
pub const TRAIN_LABELS: &str = "train-labels.idx1-ubyte";
pub const TEST_IMAGES: &str = "t10k-images.idx3-ubyte";
pub const TEST_LABELS: &str = "t10k-labels.idx1-ubyte";

/// Paths of the four MNIST files inside one directory.
#[derive(Debug, Clone)]
pub struct MnistFiles {
    pub train_images: PathBuf,
    pub train_labels: PathBuf,
    pub test_images: PathBuf,
    pub test_labels: PathBuf,
}

impl MnistFiles {
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> MnistFiles {
        let dir = dir.as_ref();
        MnistFiles {
            train_images: dir.join(TRAIN_IMAGES),
            train_labels: dir.join(TRAIN_LABELS),
            test_images: dir.join(TEST_IMAGES),
            test_labels: dir.join(TEST_LABELS),
        }
    }

    /// Checks that all four files exist and start with the right magic number.
    pub fn verify(&self) -> Result<()> {
        for (path, magic) in [
            (&self.train_images, IMAGES_MAGIC),
            (&self.train_labels, LABELS_MAGIC),
            (&self.test_images, IMAGES_MAGIC),
            (&self.test_labels, LABELS_MAGIC),
        ] {
            let mut head = [0u8; 4];
            File::open(path)?.read_exact(&mut head)?;
            let found = u32::from_be_bytes(head);
            if found != magic {
                return Err(NetError::Dataset(format!(
                    "{}: magic number {found:#010x}, expected {magic:#010x}",
                    path.display()
                )));
            }
        }
        Ok(())
    }

    pub fn load_train(&self, n_classes: usize) -> Result<Dataset> {
        load_idx_pair(&self.train_images, &self.train_labels, n_classes)
    }

    pub fn load_test(&self, n_classes: usize) -> Result<Dataset> {
        load_idx_pair(&self.test_images, &self.test_labels, n_classes)
    }
}

/// Reads an image file and a label file from disk and parses them.
pub fn load_idx_pair<P: AsRef<Path>, Q: AsRef<Path>>(
    images: P,
    labels: Q,
    n_classes: usize,
) -> Result<Dataset> {
    let image_bytes = std::fs::read(images.as_ref())?;
    let label_bytes = std::fs::read(labels.as_ref())?;
    let dataset = parse_idx_pair(&image_bytes, &label_bytes, n_classes)?;
    info!(
        images = %images.as_ref().display(),
        count = dataset.count(),
        "dataset loaded"
    );
    Ok(dataset)
}

fn be_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
}

/// Parses an IDX3 image buffer and an IDX1 label buffer into a dataset.
///
/// Inputs are `(rows * cols, 1)` columns with pixels scaled from `0..=255`
/// to `[0, 1]`; targets are one-hot columns of length `n_classes`.
pub fn parse_idx_pair(image_bytes: &[u8], label_bytes: &[u8], n_classes: usize) -> Result<Dataset> {
    if n_classes < 2 {
        return Err(NetError::Dataset(format!("n_classes must be at least 2, got {n_classes}")));
    }

    // ── Image header ────────────────────────────────────────────────────────

    if image_bytes.len() < 16 {
        return Err(NetError::Dataset(format!(
            "image file too short: need 16 header bytes, got {}",
            image_bytes.len()
        )));
    }
    let magic = be_u32(image_bytes, 0);
    if magic != IMAGES_MAGIC {
        return Err(NetError::Dataset(format!(
            "image file magic number {magic:#010x}, expected {IMAGES_MAGIC:#010x}"
        )));
    }

    let n_items = be_u32(image_bytes, 4) as usize;
    let rows = be_u32(image_bytes, 8) as usize;
    let cols = be_u32(image_bytes, 12) as usize;

    let n_pixels = rows
        .checked_mul(cols)
        .ok_or_else(|| NetError::Dataset(format!("rows * cols overflows ({rows} x {cols})")))?;
    let data_len = n_items
        .checked_mul(n_pixels)
        .ok_or_else(|| NetError::Dataset(format!("{n_items} images of {n_pixels} pixels overflows")))?;
    if n_pixels == 0 {
        return Err(NetError::Dataset(format!("image size {rows} x {cols} is empty")));
    }
    if image_bytes.len() < 16 + data_len {
        return Err(NetError::Dataset(format!(
            "image file declares {n_items} images of {rows}x{cols} but holds only {} bytes",
            image_bytes.len()
        )));
    }

    // ── Label header ────────────────────────────────────────────────────────

    if label_bytes.len() < 8 {
        return Err(NetError::Dataset(format!(
            "label file too short: need 8 header bytes, got {}",
            label_bytes.len()
        )));
    }
    let magic = be_u32(label_bytes, 0);
    if magic != LABELS_MAGIC {
        return Err(NetError::Dataset(format!(
            "label file magic number {magic:#010x}, expected {LABELS_MAGIC:#010x}"
        )));
    }
    let label_count = be_u32(label_bytes, 4) as usize;
    if label_count != n_items {
        return Err(NetError::Dataset(format!(
            "image file declares {n_items} items but label file declares {label_count}"
        )));
    }
    if label_bytes.len() < 8 + n_items {
        return Err(NetError::Dataset(format!(
            "label file declares {n_items} labels but holds only {} bytes",
            label_bytes.len()
        )));
    }

    // ── Samples ─────────────────────────────────────────────────────────────

    let pixels = image_bytes[16..16 + data_len].chunks_exact(n_pixels);
    let labels = &label_bytes[8..8 + n_items];

    let samples = pixels
        .zip(labels.iter())
        .map(|(chunk, &label)| {
            let values: Vec<f64> = chunk.iter().map(|&px| px as f64 / 255.0).collect();
            Sample::from_label(Matrix::column(&values), label as usize, n_classes)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Dataset::new(samples))
}
