use crate::gateway::Cursor;

/// Cursor bookkeeping for one paginated listing.
///
/// Every reset starts a new generation. A response is applied only if it
/// belongs to the current generation, so a page requested before a refetch
/// can never be appended to the refetched list.
#[derive(Debug, Clone, Default)]
pub(crate) struct Pager {
    cursor: Option<Cursor>,
    generation: u64,
}

impl Pager {
    /// Forget the cursor and invalidate every request still in flight.
    pub(crate) fn reset(&mut self) -> u64 {
        self.cursor = None;
        self.generation += 1;
        self.generation
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    pub(crate) fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    pub(crate) fn advance(&mut self, cursor: Option<Cursor>) {
        self.cursor = cursor;
    }
}
