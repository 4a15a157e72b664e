use std::f32::consts::TAU;
use std::path::PathBuf;

use kiln_engine::command::{DrawParams, SortKey, TextParams};
use kiln_engine::coords::{Transform, Vec2};
use kiln_engine::core::{DrawCtx, Game, GameControl, TickCtx};
use kiln_engine::input::KeyCode;
use kiln_engine::paint::PackedColor;
use kiln_engine::render::{FillMode, PrimitiveTopology, SamplerState};
use kiln_engine::resources::{EffectDesc, FontHandle, ParticleSet, Resources, TextureHandle};

const CAPTION: &str = "kiln: arena-recorded commands, sorted and streamed every frame";
const CHECKER_SIZE: u32 = 8;

/// Optional files the demo loads at start.
#[derive(Debug, Default)]
pub struct DemoAssets {
    pub font: Option<(PathBuf, u32)>,
    pub texture: Option<PathBuf>,
}

pub struct Demo {
    assets: DemoAssets,
    font: FontHandle,
    sprite: TextureHandle,
    sparks: ParticleSet,

    angle: f32,
    revealed: u32,
    wireframe: bool,
    burst: bool,
}

impl Demo {
    pub fn new(assets: DemoAssets) -> Self {
        Self {
            assets,
            font: FontHandle::INVALID,
            sprite: TextureHandle::INVALID,
            sparks: ParticleSet::default(),
            angle: 0.0,
            revealed: 0,
            wireframe: false,
            burst: true,
        }
    }

    fn checkerboard() -> Vec<u8> {
        let mut pixels = Vec::with_capacity((CHECKER_SIZE * CHECKER_SIZE * 4) as usize);
        for y in 0..CHECKER_SIZE {
            for x in 0..CHECKER_SIZE {
                let texel = if (x + y) % 2 == 0 { [240, 200, 80, 255] } else { [40, 40, 60, 128] };
                pixels.extend_from_slice(&texel);
            }
        }
        pixels
    }
}

impl Game for Demo {
    fn start(&mut self, resources: &Resources) {
        if let Some((path, size)) = &self.assets.font {
            self.font = resources.load_font(path, *size);
        }

        self.sprite = match &self.assets.texture {
            Some(path) => resources.load_texture(path),
            None => resources
                .textures()
                .insert_rgba8("demo/checker", CHECKER_SIZE, CHECKER_SIZE, Self::checkerboard())
                .unwrap_or_else(|e| {
                    log::warn!("checkerboard texture: {e}");
                    TextureHandle::INVALID
                }),
        };

        let desc = EffectDesc { capacity: 512, gravity: Vec2::new(0.0, 0.15) };
        let sparks = resources
            .effects()
            .insert("demo/sparks", desc)
            .ok()
            .and_then(|handle| resources.effects().instantiate(handle));
        if let Some(sparks) = sparks {
            self.sparks = sparks;
        }
    }

    fn tick(&mut self, ctx: &mut TickCtx<'_>) -> GameControl {
        let step = ctx.step as f32;
        let speed = if ctx.keyboard.is_down(KeyCode::ShiftLeft) { 3.0 } else { 1.0 };
        self.angle = (self.angle + step * speed) % TAU;

        // One character every 50 ms.
        if ctx.tick_index % 3 == 0 {
            self.revealed = (self.revealed + 1) % (CAPTION.chars().count() as u32 + 20);
        }

        if self.burst {
            self.burst = false;
            self.sparks.clear();
            for i in 0..64 {
                let dir = Vec2::from_angle(i as f32 / 64.0 * TAU);
                self.sparks.spawn(Vec2::new(200.0, 200.0), Vec2::new(dir.x * 4.0, dir.y * 4.0 - 3.0));
            }
        }
        self.sparks.update();

        GameControl::Continue
    }

    fn draw(&mut self, ctx: &mut DrawCtx<'_>) {
        let size = ctx.viewport;
        let center = Vec2::new(size.x * 0.5, size.y * 0.5);
        let fill = if self.wireframe { FillMode::Wireframe } else { FillMode::Solid };

        // Background first regardless of record order.
        let backdrop = [Vec2::zero(), Vec2::new(size.x, 0.0), Vec2::new(0.0, size.y), Vec2::new(size.x, size.y)];
        ctx.commands.draw(DrawParams {
            topology: PrimitiveTopology::TriangleStrip,
            color: PackedColor::from_rgba_u8(18, 20, 28, 255),
            key: SortKey(-10),
            ..DrawParams::new(&backdrop)
        });

        let triangle = [Vec2::new(0.0, -120.0), Vec2::new(104.0, 60.0), Vec2::new(-104.0, 60.0)];
        let spin = Transform::translation(center.x, center.y) * Transform::rotation(self.angle);
        ctx.commands.draw(DrawParams {
            fill_mode: fill,
            color: PackedColor::from_rgba_u8(90, 170, 255, 200),
            transform: spin,
            ..DrawParams::new(&triangle)
        });
        let outline: Vec<Vec2> = triangle.iter().map(|&p| spin.transform_point(p)).collect();
        ctx.commands.draw_outline(&outline, PackedColor::WHITE);

        if self.sprite.is_valid() {
            let quad = [Vec2::zero(), Vec2::new(128.0, 0.0), Vec2::new(128.0, 128.0), Vec2::new(0.0, 128.0)];
            let uv = [Vec2::zero(), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(0.0, 1.0)];
            ctx.commands.draw(DrawParams {
                texcoords: Some(&uv),
                indices: Some(&[0, 1, 2, 0, 2, 3]),
                texture: Some(self.sprite),
                sampler: SamplerState::Point,
                transform: Transform::translation(size.x - 160.0, 32.0),
                ..DrawParams::new(&quad)
            });
        }

        if !self.sparks.is_empty() {
            let sparks = &self.sparks;
            let streaks: Vec<Vec2> = sparks
                .positions()
                .zip(sparks.vx.iter().zip(&sparks.vy))
                .flat_map(|(p, (vx, vy))| [p, Vec2::new(p.x - vx * 2.0, p.y - vy * 2.0)])
                .collect();
            ctx.commands.draw(DrawParams {
                topology: PrimitiveTopology::LineList,
                color: PackedColor::from_rgba_u8(255, 140, 40, 255),
                ..DrawParams::new(&streaks)
            });
        }

        if self.font.is_valid() {
            ctx.commands.draw_text(TextParams {
                position: Vec2::new(32.0, size.y - 96.0),
                width: size.x * 0.5,
                range: Some((0, self.revealed)),
                key: SortKey(10),
                ..TextParams::new(self.font, CAPTION)
            });
        }
    }

    fn key_down(&mut self, key: KeyCode) -> GameControl {
        match key {
            KeyCode::Escape => return GameControl::Exit,
            KeyCode::Space => self.burst = true,
            KeyCode::KeyW => self.wireframe = !self.wireframe,
            _ => {}
        }
        GameControl::Continue
    }

    fn resized(&mut self, width: u32, height: u32) {
        log::debug!("drawable resized to {width}x{height}");
    }
}
