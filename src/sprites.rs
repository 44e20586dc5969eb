use bevy::prelude::*;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use std::collections::HashMap;

use crate::components::SpriteKind;

pub struct SpritePlugin;

impl Plugin for SpritePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(SpriteAssets::default())
            .add_systems(PreStartup, init_sprites);
    }
}

/// Procedural textures keyed by what they draw.
#[derive(Resource, Default)]
pub struct SpriteAssets {
    pub textures: HashMap<SpriteKind, Handle<Image>>,
}

impl SpriteAssets {
    pub fn get(&self, kind: SpriteKind) -> Option<&Handle<Image>> {
        self.textures.get(&kind)
    }
}

const ALL_KINDS: [SpriteKind; 8] = [
    SpriteKind::PlayerOne,
    SpriteKind::PlayerTwo,
    SpriteKind::Platform,
    SpriteKind::Ground,
    SpriteKind::Coin,
    SpriteKind::PatrolEnemy,
    SpriteKind::HoverEnemy,
    SpriteKind::Fireball,
];

fn init_sprites(mut images: ResMut<Assets<Image>>, mut sprite_assets: ResMut<SpriteAssets>) {
    for kind in ALL_KINDS {
        let canvas = draw(kind);
        sprite_assets
            .textures
            .insert(kind, images.add(make_image(canvas.width, canvas.height, canvas.data)));
    }
    println!(
        "[Duodash Sprites] Generated {} procedural textures",
        sprite_assets.textures.len()
    );
}

pub fn draw(kind: SpriteKind) -> Canvas {
    match kind {
        SpriteKind::PlayerOne => draw_hedgehog(HedgehogColors {
            body: rgb(0x0080ff),
            spikes: rgb(0x0060dd),
            muzzle: rgb(0xffe4b5),
            iris: rgb(0x000000),
            shoes: rgb(0xff0000),
            arms: None,
        }),
        SpriteKind::PlayerTwo => draw_hedgehog(HedgehogColors {
            body: rgb(0x1a1a1a),
            spikes: rgb(0xff0000),
            muzzle: rgb(0xd0d0d0),
            iris: rgb(0xff0000),
            shoes: rgb(0x1a1a1a),
            arms: Some(rgb(0xff0000)),
        }),
        SpriteKind::Platform => draw_platform(),
        SpriteKind::Ground => draw_ground(),
        SpriteKind::Coin => {
            let mut c = Canvas::new(16, 16);
            c.fill_circle(8.0, 8.0, 8.0, rgb(0xffff00));
            c.fill_circle(8.0, 8.0, 4.0, rgb(0xffa500));
            c
        }
        SpriteKind::PatrolEnemy => draw_mushroom(),
        SpriteKind::HoverEnemy => draw_dragon(),
        SpriteKind::Fireball => {
            let mut c = Canvas::new(12, 12);
            c.fill_circle(6.0, 6.0, 5.0, rgb(0xff4500));
            c.fill_circle(6.0, 6.0, 3.0, rgb(0xff0000));
            c.fill_circle(5.0, 5.0, 1.5, rgb(0xffff00));
            c
        }
    }
}

struct HedgehogColors {
    body: Rgba,
    spikes: Rgba,
    muzzle: Rgba,
    iris: Rgba,
    shoes: Rgba,
    arms: Option<Rgba>,
}

fn draw_hedgehog(colors: HedgehogColors) -> Canvas {
    let mut c = Canvas::new(20, 20);
    c.fill_circle(10.0, 10.0, 7.0, colors.body);
    c.fill_triangle([(14.0, 8.0), (18.0, 6.0), (16.0, 10.0)], colors.spikes);
    c.fill_triangle([(14.0, 10.0), (18.0, 12.0), (16.0, 10.0)], colors.spikes);
    c.fill_triangle([(13.0, 12.0), (16.0, 15.0), (14.0, 12.0)], colors.spikes);
    c.fill_circle(9.0, 11.0, 4.0, colors.muzzle);
    if let Some(arms) = colors.arms {
        c.fill_rect(4, 10, 2, 4, arms);
        c.fill_rect(14, 10, 2, 4, arms);
    }
    let white = rgb(0xffffff);
    c.fill_ellipse(7.0, 8.0, 2.5, 2.0, white);
    c.fill_ellipse(11.0, 8.0, 2.5, 2.0, white);
    c.fill_circle(7.0, 8.0, 1.0, colors.iris);
    c.fill_circle(11.0, 8.0, 1.0, colors.iris);
    c.fill_ellipse(6.0, 16.0, 1.5, 1.0, colors.shoes);
    c.fill_ellipse(12.0, 16.0, 1.5, 1.0, colors.shoes);
    c.fill_rect(5, 15, 3, 1, white);
    c.fill_rect(11, 15, 3, 1, white);
    c
}

fn draw_platform() -> Canvas {
    let mut c = Canvas::new(64, 16);
    c.fill_rect(0, 0, 64, 16, rgb(0x00ff00));
    for x in (0..64).step_by(4) {
        c.fill_rect(x, 0, 2, 4, rgb(0x008000));
    }
    c
}

fn draw_ground() -> Canvas {
    let (w, h) = (128u32, 32u32);
    let mut c = Canvas::new(w, h);
    let mortar = Rgba(60, 30, 10, 255);
    for y in 0..h {
        let row = y / 8;
        let offset = if row % 2 == 0 { 0 } else { 8 };
        for x in 0..w {
            let bx = (x + offset) % 16;
            let color = if bx == 0 || y % 8 == 0 {
                mortar
            } else {
                let shade = ((row * 9) % 16) as u8;
                Rgba(0x8b + shade / 2, 0x45, 0x13, 255)
            };
            set_pixel(&mut c.data, w, x, y, color);
        }
    }
    c
}

fn draw_mushroom() -> Canvas {
    let mut c = Canvas::new(24, 24);
    c.fill_circle(12.0, 8.0, 10.0, rgb(0xff0000));
    c.fill_circle(8.0, 6.0, 3.0, rgb(0xffffff));
    c.fill_circle(16.0, 6.0, 3.0, rgb(0xffffff));
    c.fill_rect(8, 12, 8, 8, rgb(0xffe4b5));
    c.fill_rect(9, 14, 2, 2, rgb(0x000000));
    c.fill_rect(13, 14, 2, 2, rgb(0x000000));
    c
}

fn draw_dragon() -> Canvas {
    let mut c = Canvas::new(24, 20);
    c.fill_ellipse(12.0, 10.0, 7.0, 6.0, rgb(0xff4500));
    c.fill_triangle([(6.0, 8.0), (4.0, 4.0), (8.0, 6.0)], rgb(0x8b0000));
    c.fill_triangle([(18.0, 8.0), (20.0, 4.0), (16.0, 6.0)], rgb(0x8b0000));
    c.fill_circle(8.0, 9.0, 2.0, rgb(0xffff00));
    c.fill_circle(16.0, 9.0, 2.0, rgb(0xffff00));
    c.fill_circle(8.0, 9.0, 0.8, rgb(0xff0000));
    c.fill_circle(16.0, 9.0, 0.8, rgb(0xff0000));
    c.fill_circle(9.0, 13.0, 1.2, rgb(0x000000));
    c.fill_circle(15.0, 13.0, 1.2, rgb(0x000000));
    c.fill_triangle([(2.0, 10.0), (0.0, 6.0), (4.0, 12.0)], rgb(0xdc143c));
    c.fill_triangle([(22.0, 10.0), (24.0, 6.0), (20.0, 12.0)], rgb(0xdc143c));
    c
}

/// RGBA8 pixel buffer with a few fill primitives.
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; (width * height * 4) as usize],
        }
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        self.data.get(idx..idx + 4).and_then(|p| p.try_into().ok())
    }

    fn fill_where(&mut self, color: Rgba, inside: impl Fn(f32, f32) -> bool) {
        for y in 0..self.height {
            for x in 0..self.width {
                if inside(x as f32 + 0.5, y as f32 + 0.5) {
                    set_pixel(&mut self.data, self.width, x, y, color);
                }
            }
        }
    }

    fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgba) {
        for py in y..(y + h).min(self.height) {
            for px in x..(x + w).min(self.width) {
                set_pixel(&mut self.data, self.width, px, py, color);
            }
        }
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: Rgba) {
        self.fill_ellipse(cx, cy, r, r, color);
    }

    fn fill_ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, color: Rgba) {
        self.fill_where(color, |x, y| {
            let dx = (x - cx) / rx;
            let dy = (y - cy) / ry;
            dx * dx + dy * dy <= 1.0
        });
    }

    fn fill_triangle(&mut self, pts: [(f32, f32); 3], color: Rgba) {
        let edge = |a: (f32, f32), b: (f32, f32), x: f32, y: f32| {
            (b.0 - a.0) * (y - a.1) - (b.1 - a.1) * (x - a.0)
        };
        let [a, b, c] = pts;
        self.fill_where(color, |x, y| {
            let e0 = edge(a, b, x, y);
            let e1 = edge(b, c, x, y);
            let e2 = edge(c, a, x, y);
            (e0 >= 0.0 && e1 >= 0.0 && e2 >= 0.0) || (e0 <= 0.0 && e1 <= 0.0 && e2 <= 0.0)
        });
    }
}

fn make_image(width: u32, height: u32, data: Vec<u8>) -> Image {
    Image::new(
        Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data,
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::default(),
    )
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Rgba(u8, u8, u8, u8);

fn rgb(hex: u32) -> Rgba {
    Rgba((hex >> 16) as u8, (hex >> 8) as u8, hex as u8, 255)
}

fn set_pixel(data: &mut [u8], width: u32, x: u32, y: u32, color: Rgba) {
    let idx = ((y * width + x) * 4) as usize;
    if idx + 3 < data.len() {
        data[idx] = color.0;
        data[idx + 1] = color.1;
        data[idx + 2] = color.2;
        data[idx + 3] = color.3;
    }
}
