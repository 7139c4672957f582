use nalgebra::DMatrix;

/// A reservoir unit, mapping a sequence of fixed width inputs onto a sequence
/// of fixed width states through a nonlinear recurrence.
///
/// The recurrence is fixed after construction, so `advance` takes `&self`
/// and always starts from the initial state. This allows a single reservoir
/// to be shared by concurrent forward passes.
pub trait Reservoir: Send + Sync {
    /// The reservoir parameters
    fn params(&self) -> &dyn ReservoirParams;

    /// Feed a sequence of inputs through the reservoir
    ///
    /// # Arguments:
    /// inputs: A Matrix where each of the N rows is one input of width `input_dim`
    ///
    /// # Returns:
    /// A Matrix with N rows, where row i is the state after observing inputs 0..=i
    fn advance(&self, inputs: &DMatrix<f64>) -> DMatrix<f64>;
}

/// Any reservoir parameter struct must implement this.
pub trait ReservoirParams {
    /// The value of the initial state
    fn initial_state_value(&self) -> f64;

    /// The number of inner nodes (`neurons`) in the network
    fn reservoir_size(&self) -> usize;

    /// The width of a single input vector
    fn input_dim(&self) -> usize;
}
