//! Render progress notifications.
//!
//! The renderer reports each stage to a [`ProgressSink`]. Sinks are
//! fire-and-forget: a dropped receiver or a slow callback never changes the
//! document that comes out.

use std::fmt;

use crossbeam_channel::Sender;
use log::trace;

/// Stages of one render, in the order they are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressStage {
    ResolvingCoordinates,
    LoadingCatalogue,
    ComputingPositions,
    ComposingLayers,
    Assembling,
    Done,
}

impl ProgressStage {
    /// Overall completion when this stage starts
    pub fn percent(&self) -> f32 {
        match self {
            ProgressStage::ResolvingCoordinates => 5.0,
            ProgressStage::LoadingCatalogue => 15.0,
            ProgressStage::ComputingPositions => 35.0,
            ProgressStage::ComposingLayers => 70.0,
            ProgressStage::Assembling => 90.0,
            ProgressStage::Done => 100.0,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ProgressStage::ResolvingCoordinates => "Resolving coordinates",
            ProgressStage::LoadingCatalogue => "Loading star catalogue",
            ProgressStage::ComputingPositions => "Computing celestial positions",
            ProgressStage::ComposingLayers => "Composing chart layers",
            ProgressStage::Assembling => "Assembling document",
            ProgressStage::Done => "Chart complete",
        }
    }
}

impl fmt::Display for ProgressStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// One progress notification.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub stage: ProgressStage,
    pub percent: f32,
    pub message: String,
}

impl From<ProgressStage> for ProgressEvent {
    fn from(stage: ProgressStage) -> Self {
        Self {
            stage,
            percent: stage.percent(),
            message: stage.message().to_string(),
        }
    }
}

/// Receiver of progress events.
pub trait ProgressSink: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

impl ProgressSink for Sender<ProgressEvent> {
    fn report(&self, event: ProgressEvent) {
        // A closed channel just means nobody is listening any more
        if self.send(event).is_err() {
            trace!("Progress receiver dropped");
        }
    }
}

/// Adapts a closure into a sink.
pub struct CallbackProgress<F>(pub F);

impl<F> ProgressSink for CallbackProgress<F>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn report(&self, event: ProgressEvent) {
        (self.0)(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::sync::Mutex;

    #[test]
    fn test_channel_sink() {
        let (tx, rx) = unbounded();
        tx.report(ProgressStage::LoadingCatalogue.into());
        let event = rx.try_recv().unwrap();
        assert_eq!(event.stage, ProgressStage::LoadingCatalogue);
        assert_eq!(event.percent, 15.0);
    }

    #[test]
    fn test_dropped_receiver_is_harmless() {
        let (tx, rx) = unbounded::<ProgressEvent>();
        drop(rx);
        tx.report(ProgressStage::Done.into());
    }

    #[test]
    fn test_callback_sink() {
        let seen = Mutex::new(Vec::new());
        let sink = CallbackProgress(|e: ProgressEvent| seen.lock().unwrap().push(e.percent));
        sink.report(ProgressStage::ResolvingCoordinates.into());
        sink.report(ProgressStage::Done.into());
        assert_eq!(*seen.lock().unwrap(), vec![5.0, 100.0]);
    }

    #[test]
    fn test_percentages_increase() {
        let stages = [
            ProgressStage::ResolvingCoordinates,
            ProgressStage::LoadingCatalogue,
            ProgressStage::ComputingPositions,
            ProgressStage::ComposingLayers,
            ProgressStage::Assembling,
            ProgressStage::Done,
        ];
        assert!(stages.windows(2).all(|w| w[0].percent() < w[1].percent()));
    }
}
