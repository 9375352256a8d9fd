use crate::{
    grid::PossibilityGrid,
    propagator::{ConstraintPropagator, PropagationError, PropagationReport},
    rules::ConstraintRule,
};
use log::trace;

/// One cell whose neighbors are still being visited.
#[derive(Debug, Clone)]
struct Frame {
    x: usize,
    y: usize,
    neighbors: Vec<(usize, usize)>,
    next: usize,
}

/// Depth-first propagator driven by an explicit stack.
///
/// Visits cells in the same order as a recursive walk would: a neighbor
/// whose options shrank is fully propagated before the next sibling is
/// looked at. Exclusions are recomputed from the source's current state for
/// every neighbor, since a deeper step may have narrowed the source itself.
#[derive(Debug, Clone, Default)]
pub struct DepthFirstPropagator {
    stack: Vec<Frame>,
}

impl DepthFirstPropagator {
    /// A propagator with an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Auto-resolves a singleton cell and pushes its frame.
    fn open<R: ConstraintRule>(
        &mut self,
        grid: &mut PossibilityGrid<R::Symbol>,
        (x, y): (usize, usize),
        rule: &R,
        report: &mut PropagationReport,
    ) -> Result<(), PropagationError> {
        let neighbors = rule.neighbors(x, y, grid.width, grid.height);
        let cell = grid
            .get_mut(x, y)
            .ok_or(PropagationError::InvalidCoordinate(x, y))?;
        if let Some(value) = cell.resolve_singleton() {
            trace!("Auto-resolved ({x}, {y}) to {value:?}");
            report.auto_resolved += 1;
        }
        report.visited += 1;
        self.stack.push(Frame {
            x,
            y,
            neighbors,
            next: 0,
        });
        Ok(())
    }
}

impl ConstraintPropagator for DepthFirstPropagator {
    fn propagate<R: ConstraintRule>(
        &mut self,
        grid: &mut PossibilityGrid<R::Symbol>,
        origin: (usize, usize),
        rule: &R,
    ) -> Result<PropagationReport, PropagationError> {
        self.stack.clear();
        let mut report = PropagationReport::default();
        self.open(grid, origin, rule, &mut report)?;

        loop {
            let step = match self.stack.last_mut() {
                None => break,
                Some(frame) => {
                    let neighbor = frame.neighbors.get(frame.next).copied();
                    frame.next += 1;
                    neighbor.map(|n| ((frame.x, frame.y), n))
                }
            };
            let Some(((sx, sy), (nx, ny))) = step else {
                self.stack.pop();
                continue;
            };

            let exclusions = grid
                .get(sx, sy)
                .map(|source| rule.exclusions(source))
                .ok_or(PropagationError::InvalidCoordinate(sx, sy))?;
            let neighbor = grid
                .get_mut(nx, ny)
                .ok_or(PropagationError::InvalidCoordinate(nx, ny))?;
            if neighbor.is_resolved() || exclusions.is_empty() {
                continue;
            }
            let removed = neighbor.remove_options(&exclusions)?;
            if removed > 0 {
                report.removed += removed;
                self.open(grid, (nx, ny), rule, &mut report)?;
            }
        }

        Ok(report)
    }
}
