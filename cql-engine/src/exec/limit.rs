use crate::{
    error::EngineError,
    exec::{ExecContext, Executor, ExecutorRef},
    row::Row,
    schema::Schema,
};

/// Limit/offset: skips the first `offset` child rows, then emits up to
/// `limit` rows. `limit == None` disables the ceiling.
pub struct LimitExec<'a> {
    limit: Option<usize>,
    offset: usize,
    skipped: usize,
    emitted: usize,
    child: ExecutorRef<'a>,
}

impl<'a> LimitExec<'a> {
    /// Creates a limit layer over `child`.
    pub fn new(limit: Option<usize>, offset: usize, child: ExecutorRef<'a>) -> Self {
        LimitExec {
            limit,
            offset,
            skipped: 0,
            emitted: 0,
            child,
        }
    }
}

impl Executor for LimitExec<'_> {
    fn init(&mut self, ctx: &mut ExecContext<'_>) -> Result<(), EngineError> {
        self.skipped = 0;
        self.emitted = 0;
        self.child.init(ctx)
    }

    fn next(&mut self, ctx: &mut ExecContext<'_>) -> Result<Option<Row>, EngineError> {
        while self.skipped < self.offset {
            if self.child.next(ctx)?.is_none() {
                return Ok(None);
            }
            self.skipped += 1;
        }
        if let Some(limit) = self.limit {
            if self.emitted >= limit {
                return Ok(None);
            }
        }
        match self.child.next(ctx)? {
            Some(row) => {
                self.emitted += 1;
                Ok(Some(row))
            }
            None => Ok(None),
        }
    }

    fn schema(&self) -> &Schema {
        self.child.schema()
    }
}
