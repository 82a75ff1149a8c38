//! Axis-aligned neighborhood of a search state.

use pt_types::{ParameterBounds, ParameterVector, State};

/// Unscored neighbors of `state`, one step along each axis in each direction.
///
/// Order is `c - step`, `c + step`, `degree - step`, `degree + step`; the
/// climber adopts the first improving neighbor, so the order is significant.
/// Moves that would leave `bounds` are omitted, leaving between zero and four
/// neighbors (two to four for any non-degenerate bounds).
pub fn generate_neighbors(state: &State, bounds: &ParameterBounds) -> Vec<State> {
    let current = state.params();
    let mut neighbors = Vec::with_capacity(4);

    for delta in [-bounds.c_step, bounds.c_step] {
        let c = current.c + delta;
        if bounds.contains_c(c) {
            neighbors.push(State::new(ParameterVector::new(c, current.degree)));
        }
    }

    let down = current.degree.checked_sub(bounds.degree_step);
    let up = current.degree.checked_add(bounds.degree_step);
    for degree in [down, up].into_iter().flatten() {
        if bounds.contains_degree(degree) {
            neighbors.push(State::new(ParameterVector::new(current.c, degree)));
        }
    }

    neighbors
}
