use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::coords::Vec2;

use super::hash::path_key;
use super::table::HandleTable;
use super::{EffectHandle, ResourceError};

/// Maximum particles a single effect instance may hold.
pub const MAX_PARTICLES: usize = 4096;

/// Shared definition of a particle effect.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectDesc {
    pub capacity: usize,
    pub gravity: Vec2,
}

impl Default for EffectDesc {
    fn default() -> Self {
        Self { capacity: 256, gravity: Vec2::new(0.0, 9.8) }
    }
}

impl EffectDesc {
    /// Reads `key = value` lines; unknown keys and blank or `#` lines are ignored.
    fn parse(text: &str) -> Result<Self, &'static str> {
        let mut desc = Self::default();
        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line.split_once('=').ok_or("expected key = value")?;
            let value = value.trim();
            match key.trim() {
                "capacity" => {
                    desc.capacity = value.parse().map_err(|_| "capacity is not an integer")?;
                    if desc.capacity == 0 || desc.capacity > MAX_PARTICLES {
                        return Err("capacity out of range");
                    }
                }
                "gravity_x" => desc.gravity.x = value.parse().map_err(|_| "gravity_x is not a number")?,
                "gravity_y" => desc.gravity.y = value.parse().map_err(|_| "gravity_y is not a number")?,
                _ => {}
            }
        }
        Ok(desc)
    }
}

/// Live particles of one effect instance, stored as parallel arrays.
#[derive(Debug, Clone, Default)]
pub struct ParticleSet {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub vx: Vec<f32>,
    pub vy: Vec<f32>,
    capacity: usize,
    gravity: Vec2,
}

impl ParticleSet {
    pub fn new(desc: &EffectDesc) -> Self {
        let n = desc.capacity;
        Self {
            x: Vec::with_capacity(n),
            y: Vec::with_capacity(n),
            vx: Vec::with_capacity(n),
            vy: Vec::with_capacity(n),
            capacity: n,
            gravity: desc.gravity,
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Adds a particle; returns false once the instance is full.
    pub fn spawn(&mut self, position: Vec2, velocity: Vec2) -> bool {
        if self.len() >= self.capacity {
            return false;
        }
        self.x.push(position.x);
        self.y.push(position.y);
        self.vx.push(velocity.x);
        self.vy.push(velocity.y);
        true
    }

    /// One integration step: gravity into velocity, then velocity into position.
    pub fn update(&mut self) {
        let g = self.gravity;
        for vx in &mut self.vx {
            *vx += g.x;
        }
        for vy in &mut self.vy {
            *vy += g.y;
        }
        for (x, vx) in self.x.iter_mut().zip(&self.vx) {
            *x += vx;
        }
        for (y, vy) in self.y.iter_mut().zip(&self.vy) {
            *y += vy;
        }
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.x.iter().zip(&self.y).map(|(&x, &y)| Vec2::new(x, y))
    }

    pub fn clear(&mut self) {
        self.x.clear();
        self.y.clear();
        self.vx.clear();
        self.vy.clear();
    }
}

/// Effect definitions keyed by path hash.
#[derive(Debug)]
pub struct EffectRegistry {
    table: RwLock<HandleTable<u64, EffectDesc>>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self { table: RwLock::new(HandleTable::new()) }
    }

    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn try_load(&self, path: impl AsRef<Path>) -> Result<EffectHandle, ResourceError> {
        let path = path.as_ref();
        let key = path_key(path);
        let existing = self.table.read().lookup(&key);
        if let Some(index) = existing {
            return Ok(EffectHandle(index));
        }

        let text = std::fs::read_to_string(path).map_err(|e| ResourceError::io(path, e))?;
        let desc = EffectDesc::parse(&text)
            .map_err(|reason| ResourceError::Malformed { path: path.to_path_buf(), reason })?;
        log::debug!("loaded effect {} (capacity {})", path.display(), desc.capacity);

        self.table.write().insert(key, desc).map(EffectHandle)
    }

    /// Like [`try_load`](Self::try_load), but logs failures and returns
    /// [`EffectHandle::INVALID`].
    pub fn load(&self, path: impl AsRef<Path>) -> EffectHandle {
        self.try_load(path).unwrap_or_else(|e| {
            log::warn!("effect load failed: {e}");
            EffectHandle::INVALID
        })
    }

    /// Registers a definition under `name` without touching the file system.
    pub fn insert(&self, name: &str, desc: EffectDesc) -> Result<EffectHandle, ResourceError> {
        self.table
            .write()
            .get_or_insert_with(super::hash::fnv1_64(name.as_bytes()), || desc)
            .map(EffectHandle)
    }

    pub fn get(&self, handle: EffectHandle) -> Option<Arc<EffectDesc>> {
        if !handle.is_valid() {
            return None;
        }
        self.table.read().get(handle.index())
    }

    /// Creates an empty particle set for `handle`.
    pub fn instantiate(&self, handle: EffectHandle) -> Option<ParticleSet> {
        self.get(handle).map(|desc| ParticleSet::new(&desc))
    }
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reads_known_keys() {
        let desc = EffectDesc::parse("# sparks\ncapacity = 8\ngravity_y = 0.5\ncolor = red\n").unwrap();
        assert_eq!(desc.capacity, 8);
        assert_eq!(desc.gravity, Vec2::new(0.0, 0.5));
        assert!(EffectDesc::parse("capacity = 0").is_err());
        assert!(EffectDesc::parse("capacity").is_err());
    }

    #[test]
    fn update_applies_gravity_then_velocity() {
        let desc = EffectDesc { capacity: 2, gravity: Vec2::new(0.0, 1.0) };
        let mut set = ParticleSet::new(&desc);
        assert!(set.spawn(Vec2::new(10.0, 10.0), Vec2::new(2.0, 0.0)));
        set.update();
        assert_eq!(set.positions().next(), Some(Vec2::new(12.0, 11.0)));
        set.update();
        assert_eq!(set.positions().next(), Some(Vec2::new(14.0, 13.0)));
    }

    #[test]
    fn spawn_respects_capacity() {
        let desc = EffectDesc { capacity: 1, ..EffectDesc::default() };
        let mut set = ParticleSet::new(&desc);
        assert!(set.spawn(Vec2::zero(), Vec2::zero()));
        assert!(!set.spawn(Vec2::zero(), Vec2::zero()));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn instantiate_unknown_is_none() {
        let effects = EffectRegistry::new();
        assert!(effects.instantiate(EffectHandle::INVALID).is_none());
        let h = effects.insert("sparks", EffectDesc::default()).unwrap();
        assert_eq!(effects.instantiate(h).map(|s| s.len()), Some(0));
        assert_eq!(effects.load("/missing/effect.fx"), EffectHandle::INVALID);
    }
}
