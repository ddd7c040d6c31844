/// Progress events emitted by the scoring workflow.
#[derive(Debug, Clone)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    /// Worker fan-out is starting; `total` streams will run.
    StreamsStart { total: u64 },
    /// One worker stream finished and recorded `events` histories.
    StreamFinished { stream: usize, events: u64 },

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Optional observer for workflow progress. With no callback installed,
/// reporting is a no-op.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn callback_receives_events_in_order() {
        let seen: Mutex<Vec<String>> = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            seen.lock().unwrap().push(format!("{event:?}"));
        }));

        reporter.report(Progress::PhaseStart { name: "Loading" });
        reporter.report(Progress::StreamFinished {
            stream: 0,
            events: 10,
        });
        reporter.report(Progress::PhaseFinish);
        drop(reporter);

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen[0].contains("Loading"));
    }

    #[test]
    fn reporting_without_callback_is_a_no_op() {
        let reporter = ProgressReporter::new();
        reporter.report(Progress::PhaseFinish);
    }
}
