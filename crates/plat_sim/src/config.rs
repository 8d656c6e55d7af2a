//! Gameplay tuning loaded from `assets/config/tuning.json`.
//!
//! Every field has a default, so a tuning file only needs to name the values
//! it changes. A missing file is not an error for the host; it falls back to
//! `SimConfig::default()`.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::catalog::{CatalogConfig, SpriteCatalog, TextureId};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimConfig {
    pub version: String,
    pub world: WorldConfig,
    pub player: PlayerConfig,
    pub enemy: EnemyConfig,
    pub bullet: BulletConfig,
    pub effects: EffectsConfig,
    pub parallax: Vec<ParallaxLayerConfig>,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WorldConfig {
    pub logical_width: f32,
    pub logical_height: f32,
    pub tile_size: f32,
    pub gravity: f32,
    pub jump_impulse: f32,
    pub restart_on_death: bool,
    pub rng_seed: Option<u64>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct ColliderConfig {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PlayerConfig {
    pub acceleration: f32,
    pub max_speed: f32,
    pub health: i32,
    pub collider: ColliderConfig,
    pub weapon_cooldown: f32,
    pub death_delay: f32,
    pub idle_decel_factor: f32,
    pub death_hop: f32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EnemyConfig {
    pub acceleration: f32,
    pub max_speed: f32,
    pub initial_speed: f32,
    pub health: i32,
    pub collider: ColliderConfig,
    pub damage_duration: f32,
    /// Upward position nudge applied on the killing hit.
    pub death_hop: f32,
    /// Horizontal velocity kick applied on every hit, along the enemy's facing.
    pub hit_nudge: f32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BulletConfig {
    pub muzzle_speed: f32,
    /// Width of the band the vertical spread is drawn from, centred on zero.
    pub spread: f32,
    /// Lateral spawn offset when facing right; facing left spawns at 0.
    pub muzzle_offset: f32,
    pub max_speed: f32,
    /// Pool size above which growth is logged.
    pub pool_hint: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EffectsConfig {
    pub flash_duration: f32,
    pub flash_tint: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ParallaxLayerConfig {
    pub texture: String,
    pub factor: f32,
    #[serde(default = "default_parallax_y")]
    pub y: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            world: WorldConfig::default(),
            player: PlayerConfig::default(),
            enemy: EnemyConfig::default(),
            bullet: BulletConfig::default(),
            effects: EffectsConfig::default(),
            parallax: default_parallax_layers(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            logical_width: 640.0,
            logical_height: 480.0,
            tile_size: 32.0,
            gravity: 700.0,
            jump_impulse: -350.0,
            restart_on_death: false,
            rng_seed: None,
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            acceleration: 300.0,
            max_speed: 150.0,
            health: 3,
            collider: ColliderConfig {
                x: 2.0,
                y: 1.0,
                w: 28.0,
                h: 31.0,
            },
            weapon_cooldown: 0.1,
            death_delay: 2.0,
            idle_decel_factor: 1.5,
            death_hop: -350.0,
        }
    }
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            acceleration: 300.0,
            max_speed: 100.0,
            initial_speed: 50.0,
            health: 3,
            collider: ColliderConfig {
                x: 2.0,
                y: 2.0,
                w: 28.0,
                h: 30.0,
            },
            damage_duration: 0.5,
            death_hop: 10.0,
            hit_nudge: 25.0,
        }
    }
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            muzzle_speed: 300.0,
            spread: 40.0,
            muzzle_offset: 24.0,
            max_speed: 1000.0,
            pool_hint: 64,
        }
    }
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            flash_duration: 0.05,
            flash_tint: 2.5,
        }
    }
}

fn default_parallax_layers() -> Vec<ParallaxLayerConfig> {
    [("bg_far", 0.075), ("bg_mid", 0.15), ("bg_near", 0.3)]
        .into_iter()
        .map(|(texture, factor)| ParallaxLayerConfig {
            texture: texture.to_string(),
            factor,
            y: default_parallax_y(),
        })
        .collect()
}

const fn default_parallax_y() -> f32 {
    200.0
}

impl SimConfig {
    /// Resolve texture / clip overrides into a catalog.
    pub fn sprite_catalog(&self) -> Result<SpriteCatalog, String> {
        SpriteCatalog::from_config(&self.catalog)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.version != "0.1" {
            return Err(format!(
                "Config validation failed: unsupported version '{}'",
                self.version
            ));
        }
        let world = &self.world;
        if world.logical_width <= 0.0 || world.logical_height <= 0.0 {
            return Err("Config validation failed: logical size must be > 0".to_string());
        }
        if world.tile_size <= 0.0 {
            return Err("Config validation failed: tile_size must be > 0".to_string());
        }
        for (name, collider) in [
            ("player", &self.player.collider),
            ("enemy", &self.enemy.collider),
        ] {
            if collider.w < 0.0 || collider.h < 0.0 {
                return Err(format!(
                    "Config validation failed: {name} collider has negative size"
                ));
            }
        }
        for (name, value) in [
            ("player.weapon_cooldown", self.player.weapon_cooldown),
            ("player.death_delay", self.player.death_delay),
            ("enemy.damage_duration", self.enemy.damage_duration),
            ("effects.flash_duration", self.effects.flash_duration),
        ] {
            if value <= 0.0 {
                return Err(format!("Config validation failed: {name} must be > 0"));
            }
        }
        if self.player.health <= 0 || self.enemy.health <= 0 {
            return Err("Config validation failed: health must be > 0".to_string());
        }
        if self.player.max_speed < 0.0
            || self.enemy.max_speed < 0.0
            || self.bullet.max_speed < 0.0
        {
            return Err("Config validation failed: max_speed must be >= 0".to_string());
        }
        for layer in &self.parallax {
            if TextureId::from_name(&layer.texture).is_none() {
                return Err(format!(
                    "Config validation failed: parallax layer uses unknown texture '{}'",
                    layer.texture
                ));
            }
        }
        self.sprite_catalog().map(|_| ())
    }
}

/// Validated tuning plus the catalog resolved from it, shared read-only by
/// every update and collision response.
#[derive(Debug, Clone)]
pub struct SimContext {
    pub config: SimConfig,
    pub catalog: SpriteCatalog,
}

impl SimContext {
    pub fn new(config: SimConfig) -> Result<Self, String> {
        config.validate()?;
        let catalog = config.sprite_catalog()?;
        Ok(Self { config, catalog })
    }
}

impl Default for SimContext {
    fn default() -> Self {
        Self {
            config: SimConfig::default(),
            catalog: SpriteCatalog::default(),
        }
    }
}

pub fn load_config_from_path(path: &Path) -> Result<SimConfig, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let config: SimConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "plat_config_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn defaults_are_valid() {
        SimConfig::default().validate().expect("defaults should validate");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let path = temp_file_path("partial");
        fs::write(
            &path,
            r#"{
              "version": "0.1",
              "world": { "gravity": 900.0 },
              "player": { "health": 5 },
              "catalog": { "clips": { "run": { "frames": 3, "duration_ms": 240 } } }
            }"#,
        )
        .expect("write temp file");

        let config = load_config_from_path(&path).expect("partial config should load");
        assert_eq!(config.world.gravity, 900.0);
        assert_eq!(config.world.tile_size, 32.0);
        assert_eq!(config.player.health, 5);
        assert_eq!(config.player.max_speed, 150.0);
        assert_eq!(config.parallax.len(), 3);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn shipped_tuning_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/config/tuning.json");
        let config = load_config_from_path(&path).expect("shipped tuning should load");
        let defaults = SimConfig::default();
        assert_eq!(config.player.collider, defaults.player.collider);
        assert_eq!(config.enemy.collider, defaults.enemy.collider);
        assert_eq!(config.world.gravity, defaults.world.gravity);
        assert_eq!(config.parallax.len(), 3);
        let ctx = SimContext::new(config).expect("shipped tuning builds a context");
        assert_eq!(ctx.catalog.frame_side(TextureId::BulletHit), 16.0);
    }

    #[test]
    fn rejects_bad_version() {
        let path = temp_file_path("bad_version");
        fs::write(&path, r#"{ "version": "2.0" }"#).expect("write temp file");
        let err = load_config_from_path(&path).expect_err("bad version should fail");
        assert!(err.contains("unsupported version"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_zero_cooldown() {
        let mut config = SimConfig::default();
        config.player.weapon_cooldown = 0.0;
        let err = config.validate().expect_err("zero cooldown should fail");
        assert!(err.contains("player.weapon_cooldown"));
    }

    #[test]
    fn rejects_unknown_parallax_texture() {
        let mut config = SimConfig::default();
        config.parallax[0].texture = "clouds".to_string();
        let err = config.validate().expect_err("unknown texture should fail");
        assert!(err.contains("unknown texture 'clouds'"));
    }
}
