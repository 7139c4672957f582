#[macro_use]
extern crate log;

mod visual;

pub use visual::visual;

pub type Series = Vec<(f64, f64)>;

/// Pair every value with its index
pub fn indexed(vals: &[f64]) -> Series {
    vals.iter().enumerate().map(|(i, v)| (i as f64, *v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexed_series() {
        assert_eq!(indexed(&[0.5, -1.0]), vec![(0.0, 0.5), (1.0, -1.0)]);
    }
}
