// Voices, note allocation, the engine facade and its control messages.
// The engine is the only type the render context touches.

pub mod allocator;
pub mod engine;
pub mod message;
pub mod voice;

pub use allocator::{Allocation, NoteAllocator};
pub use engine::SynthEngine;
pub use message::{MessageReceiver, SynthMessage};
pub use voice::{Voice, VoiceCell, VoiceSnapshot, VoiceStatus};
