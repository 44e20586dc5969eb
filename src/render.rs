use crate::components::*;
use crate::sprites::SpriteAssets;
use bevy::prelude::*;

pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                attach_sprites,
                sync_game_position_to_transform,
                apply_sprite_state,
                sync_coin_visibility,
            )
                .chain(),
        );
    }
}

/// Draw order, back to front.
pub fn sprite_depth(kind: SpriteKind) -> f32 {
    match kind {
        SpriteKind::Ground | SpriteKind::Platform => 0.0,
        SpriteKind::Coin => 1.0,
        SpriteKind::PatrolEnemy | SpriteKind::HoverEnemy => 2.0,
        SpriteKind::Fireball => 3.0,
        SpriteKind::PlayerOne | SpriteKind::PlayerTwo => 4.0,
    }
}

/// y-down world position to y-up Bevy translation.
pub fn world_to_translation(pos: &GamePosition, z: f32) -> Vec3 {
    Vec3::new(pos.x, -pos.y, z)
}

pub fn sprite_tint(flashing: bool, defeated: bool) -> Color {
    let base = if defeated {
        Color::srgb(1.0, 0.0, 0.0)
    } else {
        Color::WHITE
    };
    if flashing {
        base.with_alpha(0.5)
    } else {
        base
    }
}

fn attach_sprites(
    mut commands: Commands,
    assets: Res<SpriteAssets>,
    query: Query<(Entity, &SpriteKind, &Collider, &GamePosition), Added<SpriteKind>>,
) {
    for (entity, kind, collider, pos) in query.iter() {
        let Some(image) = assets.get(*kind) else {
            continue;
        };
        let sprite = Sprite {
            image: image.clone(),
            custom_size: Some(Vec2::new(collider.width, collider.height)),
            ..default()
        };
        commands.entity(entity).insert((
            sprite,
            Transform::from_translation(world_to_translation(pos, sprite_depth(*kind))),
        ));
    }
}

fn sync_game_position_to_transform(
    mut query: Query<(&GamePosition, &SpriteKind, &mut Transform), Changed<GamePosition>>,
) {
    for (pos, kind, mut transform) in query.iter_mut() {
        transform.translation = world_to_translation(pos, sprite_depth(*kind));
    }
}

fn apply_sprite_state(
    mut query: Query<(
        &mut Sprite,
        Option<&Facing>,
        Option<&HitFlash>,
        Option<&DefeatTint>,
    )>,
) {
    for (mut sprite, facing, flash, defeat) in query.iter_mut() {
        let flip = facing.map(|f| !f.right).unwrap_or(false);
        if sprite.flip_x != flip {
            sprite.flip_x = flip;
        }
        let tint = sprite_tint(flash.is_some(), defeat.is_some());
        if sprite.color != tint {
            sprite.color = tint;
        }
    }
}

fn sync_coin_visibility(mut query: Query<(&Coin, &mut Visibility), Changed<Coin>>) {
    for (coin, mut visibility) in query.iter_mut() {
        *visibility = if coin.active {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
}
