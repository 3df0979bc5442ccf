use ndarray::Array2;

pub mod tabular;
pub mod titanic;

/// Feature rows with their 0/1 labels
pub struct Dataset {
    pub data: Array2<f64>,
    pub target: Array2<f64>, // n x 1
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    pub fn num_features(&self) -> usize {
        self.data.ncols()
    }
}
