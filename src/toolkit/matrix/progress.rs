use tracing::{debug, info};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildProgress {
    pub stage: &'static str,
    pub done: usize,
    pub total: usize,
}

impl BuildProgress {
    pub fn percent(&self) -> usize {
        if self.total == 0 {
            100
        } else {
            self.done * 100 / self.total
        }
    }
}


pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: BuildProgress);
}

impl<F> ProgressSink for F
where
    F: Fn(BuildProgress) + Send + Sync,
{
    fn report(&self, progress: BuildProgress) {
        self(progress)
    }
}


/// Reports through `tracing`: every row at debug, every tenth at info.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn report(&self, progress: BuildProgress) {
        let step = (progress.total / 10).max(1);
        if progress.done == progress.total || progress.done % step == 0 {
            info!("{}: {}/{} ({}%)", progress.stage, progress.done, progress.total, progress.percent());
        } else {
            debug!("{}: {}/{}", progress.stage, progress.done, progress.total);
        }
    }
}
