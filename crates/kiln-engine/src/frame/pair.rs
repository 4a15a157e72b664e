use crate::command::CommandBuffer;
use crate::config::CommandBufferConfig;

/// Two command buffers used alternately on a single thread.
///
/// Each frame records into the buffer the previous frame did not use, so the
/// last executed frame stays inspectable until the next flip.
#[derive(Debug)]
pub struct CommandBufferPair {
    buffers: [CommandBuffer; 2],
    active: usize,
}

impl CommandBufferPair {
    pub fn new(config: &CommandBufferConfig) -> Self {
        Self {
            buffers: [CommandBuffer::from_config(config), CommandBuffer::from_config(config)],
            active: 1,
        }
    }

    /// Switches to the other buffer and resets it for recording.
    pub fn flip(&mut self) -> &mut CommandBuffer {
        self.active ^= 1;
        let buffer = &mut self.buffers[self.active];
        buffer.begin();
        buffer
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &CommandBuffer {
        &self.buffers[self.active]
    }

    pub fn active_mut(&mut self) -> &mut CommandBuffer {
        &mut self.buffers[self.active]
    }

    /// The buffer recorded the frame before the active one.
    pub fn previous(&self) -> &CommandBuffer {
        &self.buffers[self.active ^ 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandRecorder, DrawParams};
    use crate::coords::Vec2;

    #[test]
    fn flip_alternates_and_isolates() {
        let config = CommandBufferConfig { byte_capacity: 4096, max_commands: 8 };
        let mut pair = CommandBufferPair::new(&config);
        let tri = [Vec2::zero(); 3];

        let first = pair.flip();
        let mut rec = CommandRecorder::new(first);
        rec.draw(DrawParams::new(&tri));
        rec.draw(DrawParams::new(&tri));
        let a = pair.active_index();

        let second = pair.flip();
        CommandRecorder::new(second).draw(DrawParams::new(&tri));
        assert_ne!(pair.active_index(), a);

        assert_eq!(pair.active().len(), 1);
        assert_eq!(pair.previous().len(), 2);

        pair.flip();
        assert_eq!(pair.active_index(), a);
        assert!(pair.active().is_empty());
        assert_eq!(pair.previous().len(), 1);
    }
}
