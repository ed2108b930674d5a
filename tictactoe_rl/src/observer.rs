use tracing::debug;

/// Receives one event per accepted move. Rules and decisions never depend
/// on an observer; every method defaults to doing nothing.
pub trait BoardObserver {
    /// A new game started; redraw the empty grid.
    fn clear(&mut self) {}
    fn draw_x(&mut self, _row: usize, _col: usize) {}
    fn draw_o(&mut self, _row: usize, _col: usize) {}
}

#[derive(Debug, Default)]
pub struct NoopObserver;

impl BoardObserver for NoopObserver {}

/// Logs board events through `tracing`.
#[derive(Debug, Default)]
pub struct TraceObserver {
    pub events: usize,
}

impl BoardObserver for TraceObserver {
    fn clear(&mut self) {
        self.events += 1;
        debug!("board cleared");
    }
    fn draw_x(&mut self, row: usize, col: usize) {
        self.events += 1;
        debug!(row, col, "draw X");
    }
    fn draw_o(&mut self, row: usize, col: usize) {
        self.events += 1;
        debug!(row, col, "draw O");
    }
}
