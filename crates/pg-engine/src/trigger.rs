//! Trigger events and the sink the scheduler fires them into.

/// Receiver of scheduled hits. Implemented by [`VoiceEngine`](crate::VoiceEngine).
///
/// Called from the audio callback: implementations must not block or allocate.
pub trait TriggerSink {
    fn trigger(&mut self, sample_id: u8, velocity: f32, pan: f32);
}

/// One resolved hit: which sample, how loud, where in the stereo field.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Trigger {
    pub sample_id: u8,
    pub velocity: f32,
    pub pan: f32,
}

impl Trigger {
    /// Deliver this hit to `sink`.
    pub fn fire<S: TriggerSink + ?Sized>(self, sink: &mut S) {
        sink.trigger(self.sample_id, self.velocity, self.pan);
    }
}
