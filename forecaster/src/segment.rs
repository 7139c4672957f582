use nalgebra::{DMatrix, DVector};

use crate::{ForecastError, Result};

/// Cut a series into consecutive, non-overlapping windows.
/// Row i of the result is window i.
pub fn segment(series: &[f64], window_len: usize) -> Result<DMatrix<f64>> {
    if window_len == 0 || series.len() % window_len != 0 {
        return Err(ForecastError::Indivisible {
            len: series.len(),
            window_len,
        });
    }

    Ok(DMatrix::from_row_slice(series.len() / window_len, window_len, series))
}

/// Concatenate the rows of `windows`, the inverse of [`segment`]
pub fn unsegment(windows: &DMatrix<f64>) -> Vec<f64> {
    windows.transpose().as_slice().to_vec()
}

/// Discard the first `washout` states, as the state has to stabilize first.
/// At least one state has to remain.
pub fn washout(states: &DMatrix<f64>, washout: usize) -> Result<DMatrix<f64>> {
    let len = states.nrows();
    if washout >= len {
        return Err(ForecastError::Washout { washout, len });
    }

    Ok(states.rows(washout, len - washout).into_owned())
}

/// Concatenate a state sequence into one vector, row after row
pub fn flatten(states: &DMatrix<f64>) -> DVector<f64> {
    DVector::from_vec(unsegment(states))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> Vec<f64> {
        (0..12).map(|v| v as f64).collect()
    }

    #[test]
    fn segment_keeps_order() {
        let windows = segment(&series(), 4).unwrap();
        assert_eq!(windows.shape(), (3, 4));
        assert_eq!(windows.row(1).iter().cloned().collect::<Vec<f64>>(), vec![4.0, 5.0, 6.0, 7.0]);
        assert_eq!(unsegment(&windows), series());
    }

    #[test]
    fn segment_indivisible() {
        match segment(&series(), 5) {
            Err(ForecastError::Indivisible { len: 12, window_len: 5 }) => {}
            other => panic!("unexpected: {:?}", other),
        }
        assert!(segment(&series(), 0).is_err());
        assert_eq!(segment(&[], 3).unwrap().nrows(), 0);
    }

    #[test]
    fn washout_boundaries() {
        let states = segment(&series(), 3).unwrap();

        // no-op
        assert_eq!(washout(&states, 0).unwrap(), states);

        // exactly one state remains
        let last = washout(&states, 3).unwrap();
        assert_eq!(last.shape(), (1, 3));
        assert_eq!(flatten(&last).as_slice(), &[9.0, 10.0, 11.0]);

        match washout(&states, 4) {
            Err(ForecastError::Washout { washout: 4, len: 4 }) => {}
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn flatten_row_major() {
        let states = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(flatten(&states).as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }
}
